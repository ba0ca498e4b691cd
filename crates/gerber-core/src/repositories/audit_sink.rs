//! Audit/log sink (port). Calls are fire-and-forget.

pub trait AuditSink: Send + Sync {
    fn record_error(&self, message: &str, user_id: Option<&str>);
    fn record_user_action(&self, user_id: &str, description: &str);
    /// Error reported by a frontend client.
    fn record_client_error(&self, message: &str, user_id: Option<&str>);
}
