//! Per-request state written by the gates and read by the handler.

use crate::claims::SubjectId;
use crate::validate::ValidatedBody;

/// Values produced for exactly one request.
///
/// A fresh context is created for every request and dropped with it; it is
/// never pooled or shared, so one caller's identity or body cannot be seen
/// by another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    identity: Option<SubjectId>,
    validated_body: Option<ValidatedBody>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller verified by the authentication gate. `None` on excluded paths.
    pub fn identity(&self) -> Option<&SubjectId> {
        self.identity.as_ref()
    }

    /// Body accepted by the schema validation gate. `None` on routes without
    /// a schema and on bodiless methods.
    pub fn validated_body(&self) -> Option<&ValidatedBody> {
        self.validated_body.as_ref()
    }

    pub fn set_identity(&mut self, identity: SubjectId) {
        self.identity = Some(identity);
    }

    pub fn set_validated_body(&mut self, body: ValidatedBody) {
        self.validated_body = Some(body);
    }

    pub fn take_validated_body(&mut self) -> Option<ValidatedBody> {
        self.validated_body.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_is_empty() {
        let ctx = RequestContext::new();
        assert!(ctx.identity().is_none());
        assert!(ctx.validated_body().is_none());
    }

    #[test]
    fn test_set_and_take() {
        let mut ctx = RequestContext::new();
        ctx.set_identity(SubjectId::new("user-1"));
        ctx.set_validated_body(ValidatedBody::default());

        assert_eq!(ctx.identity().map(SubjectId::as_str), Some("user-1"));
        assert_eq!(ctx.take_validated_body(), Some(ValidatedBody::default()));
        assert!(ctx.validated_body().is_none());
        assert_eq!(ctx.identity().map(SubjectId::as_str), Some("user-1"));
    }
}
