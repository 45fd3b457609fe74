//! Correlation identifier carried by every request.
//!
//! The [`Trace`](crate::Trace) middleware adopts a well-formed identifier sent
//! by the client in the `trace-id` header, or mints a new one, and runs the
//! request inside [`TraceId::scope`]. Error payloads read it back through
//! [`TraceId::current`]. The value lives in a Tokio task-local: work spawned
//! onto another task must be wrapped in `scope` again.

use std::fmt;
use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

/// Request and response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Per-request correlation identifier.
///
/// # Examples
/// ```
/// use animelist::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id = TraceId::from_header(b"6f1c2a9e-3b8d-4c57-9a41-0d2e7b6c5f10").unwrap();
/// assert_eq!(id.scope(async { TraceId::current() }).await, Some(id));
/// assert_eq!(TraceId::current(), None);
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Adopt an identifier supplied by the client.
    ///
    /// Only non-nil UUIDs are accepted; anything else yields `None` and the
    /// caller mints a fresh identifier.
    pub fn from_header(value: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(value).ok()?.trim();
        Uuid::parse_str(text)
            .ok()
            .filter(|uuid| !uuid.is_nil())
            .map(Self)
    }

    /// Identifier of the request being served, if any.
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with this identifier as the current one.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CURRENT.scope(self, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"not-a-uuid".as_slice())]
    #[case(b"00000000-0000-0000-0000-000000000000".as_slice())]
    #[case(b"\xff\xfe".as_slice())]
    fn unusable_header_values_are_ignored(#[case] value: &[u8]) {
        assert_eq!(TraceId::from_header(value), None);
    }

    #[rstest]
    fn header_value_is_adopted_verbatim() {
        let raw = "6f1c2a9e-3b8d-4c57-9a41-0d2e7b6c5f10";
        let id = TraceId::from_header(format!(" {raw} ").as_bytes()).expect("valid id");
        assert_eq!(id.to_string(), raw);
    }

    #[tokio::test]
    async fn scope_is_visible_to_nested_futures_only() {
        let id = TraceId::generate();
        let nested = id.scope(async { async { TraceId::current() }.await }).await;
        assert_eq!(nested, Some(id));
        assert_eq!(TraceId::current(), None);
    }
}
