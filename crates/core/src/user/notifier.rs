//! Delivery of password reset tokens.

use tracing::info;

/// Sends a password reset token to the account owner.
pub trait ResetNotifier: Send + Sync {
    /// Deliver `token` to `email`.
    fn send_reset(&self, email: &str, token: &str);
}

/// Writes reset tokens to the log. For development setups without mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogResetNotifier;

impl ResetNotifier for LogResetNotifier {
    fn send_reset(&self, email: &str, token: &str) {
        info!(email = %email, token = %token, "Password reset token issued");
    }
}
