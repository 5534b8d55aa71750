//! Driven port used by the readiness endpoint to check dependencies.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// A dependency failed its readiness check.
    pub enum ReadinessError {
        /// The dependency did not answer.
        Unavailable { dependency: String, message: String } => "{dependency} unavailable: {message}",
    }
}

/// Check that a backing service answers requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Succeeds when the dependency can serve traffic.
    async fn check(&self) -> Result<(), ReadinessError>;
}
