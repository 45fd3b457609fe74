//! Identity extraction for handlers behind the bearer gate.
//!
//! [`crate::middleware::BearerAuth`] stores the verified identity in the
//! request extensions; this extractor hands it to handlers. A handler mounted
//! without the gate fails closed with `401 Unauthorized`.

use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{AuthenticatedUser, Error};

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let identity = req.extensions().get::<AuthenticatedUser>().copied();
        ready(identity.ok_or_else(|| {
            warn!(path = %req.path(), "identity requested on a route without the bearer gate");
            Error::unauthorized("login required")
        }))
    }
}
