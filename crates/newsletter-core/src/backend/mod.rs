// # Backend Implementations
//
// In-process implementations of the backend traits. The hosted master data
// backend lives in the `newsletter-masterdata` crate.

pub mod analytics;
pub mod memory;

pub use analytics::{ChannelAnalyticsSink, TracingAnalyticsSink};
pub use memory::{MemoryDocumentStore, MemoryNativeWriter, StoredDocument};
