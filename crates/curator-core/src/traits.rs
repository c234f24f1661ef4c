use crate::types::{SourceId, SourceList};

/// Anything that can hand over the completed result set of one query variant.
///
/// Implementations own the fetching (HTTP, disk, fixtures); the engine only
/// ever sees the returned `SourceList`.
pub trait SourceProvider: Send + Sync {
    fn source_id(&self) -> SourceId;
    fn fetch(&self) -> anyhow::Result<SourceList>;
}

impl SourceProvider for SourceList {
    fn source_id(&self) -> SourceId { self.source_id.clone() }
    fn fetch(&self) -> anyhow::Result<SourceList> { Ok(self.clone()) }
}
