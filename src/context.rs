use crate::gateway::TableGateway;
use std::sync::Arc;

/// Shared handles and limits for the data retrieval core.
///
/// Constructed once at process start and passed by reference into every
/// component; there is no other process-wide state. The gateway handle is
/// read-only and safe for unlimited concurrent readers.
pub struct DataContext {
    pub gateway: Arc<dyn TableGateway>,
    /// Bases per sequence chunk row in the genome tables.
    pub chunk_length: u64,
    /// Largest sequence span a single request may ask for.
    pub max_sequence_span: u64,
}

impl DataContext {
    pub fn new(gateway: Arc<dyn TableGateway>, chunk_length: u64, max_sequence_span: u64) -> Self {
        assert!(chunk_length > 0, "chunk length must be positive");
        Self {
            gateway,
            chunk_length,
            max_sequence_span,
        }
    }
}
