/// Statistics tracking for the handler registry
use serde::{Deserialize, Serialize};

/// Snapshot of registry size for monitoring
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Number of handler lists ever constructed
    pub handler_lists: usize,
    /// Number of event types with a memoized chain
    pub resolved_types: usize,
    /// Registrations currently stored across all handler lists
    pub registrations: usize,
}
