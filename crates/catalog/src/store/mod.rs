//! Persistence substrate seam.
//!
//! The catalog only ever needs three operations from the document store:
//! enumerate partitions, find matching documents with skip/limit, and count
//! matching documents. [`DocumentStore`] captures exactly that.

mod json_dir;

#[cfg(any(test, feature = "testing"))]
mod memory;

pub use json_dir::JsonDirStore;
#[cfg(any(test, feature = "testing"))]
pub use memory::{FindCall, MemoryStore};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::predicate::MatchPredicate;

/// A document as stored in a partition, before normalization.
pub type RawDocument = Map<String, Value>;

/// Error type for DocumentStore operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("partition not found: {0}")]
	PartitionNotFound(String),
	#[error("storage error: {0}")]
	Storage(String),
	#[error("serialization error: {0}")]
	Serialization(String),
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

/// Read access to a partitioned document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Names of every partition currently in the store.
	async fn list_partitions(&self) -> Result<Vec<String>, StoreError>;

	/// Matching documents of one partition in natural storage order,
	/// skipping `skip` matches and returning at most `limit`.
	async fn find(
		&self,
		partition: &str,
		predicate: &MatchPredicate,
		skip: u64,
		limit: u64,
	) -> Result<Vec<RawDocument>, StoreError>;

	/// Number of matching documents in one partition.
	async fn count(&self, partition: &str, predicate: &MatchPredicate) -> Result<u64, StoreError>;
}

/// Apply a predicate and a skip/limit window to an in-memory document list.
pub(crate) fn scan<'a>(
	docs: impl IntoIterator<Item = &'a RawDocument>,
	predicate: &MatchPredicate,
	skip: u64,
	limit: u64,
) -> Vec<RawDocument> {
	docs
		.into_iter()
		.filter(|doc| predicate.matches(doc))
		.skip(usize::try_from(skip).unwrap_or(usize::MAX))
		.take(usize::try_from(limit).unwrap_or(usize::MAX))
		.cloned()
		.collect()
}

pub(crate) fn count_matching<'a>(
	docs: impl IntoIterator<Item = &'a RawDocument>,
	predicate: &MatchPredicate,
) -> u64 {
	docs.into_iter().filter(|doc| predicate.matches(doc)).count() as u64
}
