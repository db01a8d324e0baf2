//! User-facing failure notifications.
//!
//! Remote failures are never fatal and never propagate out of the engine;
//! they surface as transient notifications through a sink the host injects
//! at construction time. There is no ambient global notification bus.

use std::fmt;

/// How loudly to surface a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Capability for reporting failures to the user.
///
/// Implementations must not block: the engine calls this from reconcile
/// paths that run on the event loop.
pub trait NotifySink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Default sink that routes notifications into `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotifySink for TracingSink {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(target: "wheelhouse::notify", "{}", message),
            Severity::Warning => tracing::warn!(target: "wheelhouse::notify", "{}", message),
            Severity::Error => tracing::error!(target: "wheelhouse::notify", "{}", message),
        }
    }
}
