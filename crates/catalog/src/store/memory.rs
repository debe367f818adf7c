//! In-memory implementation of DocumentStore for testing.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentStore, RawDocument, StoreError, count_matching, scan};
use crate::predicate::MatchPredicate;

#[derive(Default)]
struct MemoryState {
	/// Partitions in enumeration order.
	partitions: Vec<(String, Vec<RawDocument>)>,
	failing_counts: HashSet<String>,
	failing_finds: HashSet<String>,
	failing_listing: bool,
	find_calls: Vec<FindCall>,
	count_calls: usize,
}

/// A recorded `find` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCall {
	pub partition: String,
	pub skip: u64,
	pub limit: u64,
}

/// In-memory implementation of DocumentStore.
///
/// Partitions enumerate in insertion order. Individual operations can be made
/// to fail so callers can exercise partial-failure handling.
#[derive(Default)]
pub struct MemoryStore {
	state: Mutex<MemoryState>,
}

impl MemoryStore {
	/// Create a new empty memory store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a partition holding the given documents. Non-object values are ignored.
	pub fn with_partition(self, name: &str, docs: Vec<Value>) -> Self {
		self.insert_partition(name, docs);
		self
	}

	/// Add or replace a partition.
	pub fn insert_partition(&self, name: &str, docs: Vec<Value>) {
		let docs: Vec<RawDocument> = docs
			.into_iter()
			.filter_map(|doc| match doc {
				Value::Object(map) => Some(map),
				_ => None,
			})
			.collect();
		let mut state = self.state.lock().unwrap();
		match state.partitions.iter_mut().find(|(n, _)| n == name) {
			Some((_, existing)) => *existing = docs,
			None => state.partitions.push((name.to_string(), docs)),
		}
	}

	/// Remove a partition, as if it had been dropped between requests.
	pub fn remove_partition(&self, name: &str) {
		self.state.lock().unwrap().partitions.retain(|(n, _)| n != name);
	}

	/// Make `count` fail for the named partition.
	pub fn fail_count(&self, name: &str) {
		self.state.lock().unwrap().failing_counts.insert(name.to_string());
	}

	/// Make `find` fail for the named partition.
	pub fn fail_find(&self, name: &str) {
		self.state.lock().unwrap().failing_finds.insert(name.to_string());
	}

	/// Make partition enumeration fail.
	pub fn fail_listing(&self) {
		self.state.lock().unwrap().failing_listing = true;
	}

	/// Every `find` call made so far, in order.
	pub fn find_calls(&self) -> Vec<FindCall> {
		self.state.lock().unwrap().find_calls.clone()
	}

	/// Number of `count` calls made so far.
	pub fn count_calls(&self) -> usize {
		self.state.lock().unwrap().count_calls
	}
}

#[async_trait]
impl DocumentStore for MemoryStore {
	async fn list_partitions(&self) -> Result<Vec<String>, StoreError> {
		let state = self.state.lock().unwrap();
		if state.failing_listing {
			return Err(StoreError::Storage("listing unavailable".to_string()));
		}
		Ok(state.partitions.iter().map(|(n, _)| n.clone()).collect())
	}

	async fn find(
		&self,
		partition: &str,
		predicate: &MatchPredicate,
		skip: u64,
		limit: u64,
	) -> Result<Vec<RawDocument>, StoreError> {
		let mut state = self.state.lock().unwrap();
		state.find_calls.push(FindCall {
			partition: partition.to_string(),
			skip,
			limit,
		});
		if state.failing_finds.contains(partition) {
			return Err(StoreError::Storage(format!("find failed for {partition}")));
		}
		let (_, docs) = state
			.partitions
			.iter()
			.find(|(n, _)| n == partition)
			.ok_or_else(|| StoreError::PartitionNotFound(partition.to_string()))?;
		Ok(scan(docs, predicate, skip, limit))
	}

	async fn count(&self, partition: &str, predicate: &MatchPredicate) -> Result<u64, StoreError> {
		let mut state = self.state.lock().unwrap();
		state.count_calls += 1;
		if state.failing_counts.contains(partition) {
			return Err(StoreError::Storage(format!("count failed for {partition}")));
		}
		let (_, docs) = state
			.partitions
			.iter()
			.find(|(n, _)| n == partition)
			.ok_or_else(|| StoreError::PartitionNotFound(partition.to_string()))?;
		Ok(count_matching(docs, predicate))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::predicate::CourseFilters;

	#[tokio::test]
	async fn test_memory_store_basic() {
		let store = MemoryStore::new()
			.with_partition("a", vec![json!({"course_name": "x"}), json!({"course_name": "y"})])
			.with_partition("b", vec![json!({"course_name": "z"}), json!("not an object")]);

		assert_eq!(store.list_partitions().await.unwrap(), vec!["a", "b"]);
		assert_eq!(store.count("a", &MatchPredicate::all()).await.unwrap(), 2);
		assert_eq!(store.count("b", &MatchPredicate::all()).await.unwrap(), 1);

		let docs = store.find("a", &MatchPredicate::all(), 1, 10).await.unwrap();
		assert_eq!(docs.len(), 1);
		assert_eq!(docs[0]["course_name"], "y");
		assert_eq!(
			store.find_calls(),
			vec![FindCall {
				partition: "a".to_string(),
				skip: 1,
				limit: 10
			}]
		);
	}

	#[tokio::test]
	async fn test_memory_store_predicate() {
		let store = MemoryStore::new().with_partition(
			"a",
			vec![json!({"category": "핵심"}), json!({"category": "균형"}), json!({"category": "핵심"})],
		);
		let predicate = MatchPredicate::build(&CourseFilters {
			category: Some("핵심".to_string()),
			..Default::default()
		});
		assert_eq!(store.count("a", &predicate).await.unwrap(), 2);
		assert_eq!(store.find("a", &predicate, 0, 1).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_memory_store_failures() {
		let store = MemoryStore::new().with_partition("a", vec![]);
		assert!(matches!(
			store.count("missing", &MatchPredicate::all()).await,
			Err(StoreError::PartitionNotFound(_))
		));

		store.fail_count("a");
		store.fail_find("a");
		assert!(store.count("a", &MatchPredicate::all()).await.is_err());
		assert!(store.find("a", &MatchPredicate::all(), 0, 1).await.is_err());

		store.fail_listing();
		assert!(store.list_partitions().await.is_err());
	}

	#[tokio::test]
	async fn test_memory_store_replace_and_remove() {
		let store = MemoryStore::new().with_partition("a", vec![json!({})]);
		store.insert_partition("a", vec![json!({}), json!({})]);
		assert_eq!(store.count("a", &MatchPredicate::all()).await.unwrap(), 2);

		store.remove_partition("a");
		assert!(store.list_partitions().await.unwrap().is_empty());
	}
}
