//! Bearer-token authorization gate.
//!
//! [`BearerAuth`] wraps protected routes. It reads `Authorization: Bearer
//! <token>`, verifies the token through the [`TokenService`] port and stores
//! the resulting [`AuthenticatedUser`] in the request extensions. Requests
//! without a valid token never reach the wrapped service.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{InvalidTokenError, TokenService};
use crate::domain::{AuthenticatedUser, Error as DomainError};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rejection {
    MissingHeader,
    NotBearer,
    Invalid(InvalidTokenError),
}

impl Rejection {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_token",
            Self::NotBearer => "invalid_scheme",
            Self::Invalid(InvalidTokenError::Malformed) => "malformed_token",
            Self::Invalid(InvalidTokenError::BadSignature) => "invalid_signature",
            Self::Invalid(InvalidTokenError::Expired) => "token_expired",
        }
    }

    fn into_error(self) -> DomainError {
        let message = match self {
            Self::MissingHeader => "missing bearer token",
            Self::NotBearer => "authorization header must use the Bearer scheme",
            Self::Invalid(_) => "invalid or expired token",
        };
        DomainError::unauthorized(message).with_details(json!({ "code": self.code() }))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, Rejection> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or(Rejection::MissingHeader)?;
    let value = header.to_str().map_err(|_| Rejection::NotBearer)?;
    let scheme_len = BEARER_PREFIX.len();
    if value.len() < scheme_len || !value[..scheme_len].eq_ignore_ascii_case(BEARER_PREFIX) {
        return Err(Rejection::NotBearer);
    }
    let token = value[scheme_len..].trim();
    if token.is_empty() {
        return Err(Rejection::MissingHeader);
    }
    Ok(token)
}

/// Middleware factory enforcing bearer authentication.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use actix_web::{App, web};
/// use animelist::middleware::BearerAuth;
/// use animelist::outbound::token::{JwtSecret, JwtTokenService};
/// use mockable::DefaultClock;
///
/// let tokens = JwtTokenService::new(
///     &JwtSecret::ephemeral(),
///     chrono::Duration::hours(24),
///     Arc::new(DefaultClock),
/// );
/// let app = App::new().service(web::scope("/private").wrap(BearerAuth::new(Arc::new(tokens))));
/// ```
#[derive(Clone)]
pub struct BearerAuth {
    tokens: Arc<dyn TokenService>,
}

impl BearerAuth {
    /// Build a gate verifying tokens with `tokens`.
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BearerAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = BearerAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BearerAuthMiddleware {
            service,
            tokens: Arc::clone(&self.tokens),
        }))
    }
}

/// Service wrapper produced by [`BearerAuth`].
pub struct BearerAuthMiddleware<S> {
    service: S,
    tokens: Arc<dyn TokenService>,
}

impl<S> BearerAuthMiddleware<S> {
    fn authenticate(&self, req: &ServiceRequest) -> Result<AuthenticatedUser, Rejection> {
        let token = bearer_token(req)?;
        self.tokens.verify(token).map_err(Rejection::Invalid)
    }
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.authenticate(&req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => Box::pin(async move {
                debug!(reason = %rejection, path = %req.path(), "request rejected by bearer gate");
                let response = rejection.into_error().error_response();
                Ok(req.into_response(response).map_into_right_body())
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Gate behaviour against a mocked token verifier.
    use super::*;
    use crate::domain::UserId;
    use crate::domain::ports::MockTokenService;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::Value;

    const VALID: &str = "valid-token";

    fn owner() -> UserId {
        UserId::from_uuid(uuid::Uuid::from_u128(7))
    }

    fn gate() -> BearerAuth {
        let mut tokens = MockTokenService::new();
        tokens.expect_verify().returning(|token| match token {
            VALID => Ok(AuthenticatedUser::new(owner(), Utc::now())),
            "expired" => Err(InvalidTokenError::expired()),
            _ => Err(InvalidTokenError::bad_signature()),
        });
        BearerAuth::new(Arc::new(tokens))
    }

    async fn echo_owner(req: actix_web::HttpRequest) -> HttpResponse {
        let user = req.extensions().get::<AuthenticatedUser>().copied();
        match user {
            Some(user) => HttpResponse::Ok().body(user.user_id().to_string()),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    #[actix_web::test]
    async fn valid_tokens_attach_identity() {
        let app = actix_test::init_service(
            App::new().service(web::scope("").wrap(gate()).route("/me", web::get().to(echo_owner))),
        )
        .await;
        let req = actix_test::TestRequest::get()
            .uri("/me")
            .insert_header((AUTHORIZATION, format!("Bearer {VALID}")))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_test::read_body(res).await;
        assert_eq!(body, owner().to_string());
    }

    #[rstest]
    #[case(None, "missing_token")]
    #[case(Some("Basic YWRhOnNlY3JldA=="), "invalid_scheme")]
    #[case(Some("Bearer "), "missing_token")]
    #[case(Some("Bearer expired"), "token_expired")]
    #[case(Some("Bearer forged"), "invalid_signature")]
    #[actix_web::test]
    async fn rejected_requests_get_401(#[case] header: Option<&str>, #[case] code: &str) {
        let app = actix_test::init_service(
            App::new().service(web::scope("").wrap(gate()).route("/me", web::get().to(echo_owner))),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/me");
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value.to_owned()));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.get("code").and_then(Value::as_str), Some("unauthorized"));
        assert_eq!(
            body.pointer("/details/code").and_then(Value::as_str),
            Some(code)
        );
    }

    #[rstest]
    fn scheme_match_ignores_case() {
        let req = actix_test::TestRequest::get()
            .insert_header((AUTHORIZATION, "bearer abc"))
            .to_srv_request();
        assert_eq!(bearer_token(&req), Ok("abc"));
    }
}
