//! Background execution port

use std::fmt;

/// Opaque identifier of an extended-execution grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrantId(pub u64);

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grant-{}", self.0)
    }
}

/// Called by the platform when a grant's time budget runs out.
/// The handler is expected to end the grant.
pub type ExpiryHandler = Box<dyn FnOnce(GrantId) + Send + 'static>;

/// Port for the platform's extended-execution mechanism
pub trait BackgroundExecution: Send + Sync {
    /// Request an extended-execution grant.
    ///
    /// # Returns
    /// The grant id, or `None` if the platform refused
    fn begin(&self, name: &str, on_expiry: ExpiryHandler) -> Option<GrantId>;

    /// Release a grant. Must be called exactly once per granted id.
    fn end(&self, grant: GrantId);
}
