// Directory-backed document store
//
// Every `<name>.json` file in the root directory is one partition holding a
// JSON array of documents. Files are re-read on every call; partitions can be
// added or removed between requests without restarting.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{DocumentStore, RawDocument, StoreError, count_matching, scan};
use crate::predicate::MatchPredicate;

const PARTITION_EXTENSION: &str = "json";

/// Read-only document store over a directory of JSON partition files.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
	root: PathBuf,
}

impl JsonDirStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn partition_path(&self, partition: &str) -> Result<PathBuf, StoreError> {
		if partition.is_empty()
			|| partition.contains(['/', '\\'])
			|| partition.starts_with('.')
		{
			return Err(StoreError::PartitionNotFound(partition.to_string()));
		}
		Ok(self.root.join(format!("{partition}.{PARTITION_EXTENSION}")))
	}

	async fn load(&self, partition: &str) -> Result<Vec<RawDocument>, StoreError> {
		let path = self.partition_path(partition)?;
		let content = match fs_err::tokio::read_to_string(&path).await {
			Ok(content) => content,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				return Err(StoreError::PartitionNotFound(partition.to_string()));
			},
			Err(e) => return Err(e.into()),
		};
		let values: Vec<Value> = serde_json::from_str(&content)
			.map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))?;

		let total = values.len();
		let docs: Vec<RawDocument> = values
			.into_iter()
			.filter_map(|value| match value {
				Value::Object(map) => Some(map),
				_ => None,
			})
			.collect();
		if docs.len() != total {
			debug!(
				target: "catalog",
				partition,
				skipped = total - docs.len(),
				"ignoring non-object entries"
			);
		}
		Ok(docs)
	}
}

#[async_trait]
impl DocumentStore for JsonDirStore {
	async fn list_partitions(&self) -> Result<Vec<String>, StoreError> {
		let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
			StoreError::Storage(format!("failed to read {}: {}", self.root.display(), e))
		})?;

		let mut names = Vec::new();
		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			if path.extension().and_then(|e| e.to_str()) != Some(PARTITION_EXTENSION) {
				continue;
			}
			if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
				names.push(stem.to_string());
			}
		}
		// Directory iteration order is unspecified.
		names.sort();
		Ok(names)
	}

	async fn find(
		&self,
		partition: &str,
		predicate: &MatchPredicate,
		skip: u64,
		limit: u64,
	) -> Result<Vec<RawDocument>, StoreError> {
		let docs = self.load(partition).await?;
		Ok(scan(&docs, predicate, skip, limit))
	}

	async fn count(&self, partition: &str, predicate: &MatchPredicate) -> Result<u64, StoreError> {
		let docs = self.load(partition).await?;
		Ok(count_matching(&docs, predicate))
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use serde_json::json;

	use super::*;

	fn write_partition(dir: &Path, name: &str, docs: Value) {
		std::fs::write(dir.join(format!("{name}.json")), docs.to_string()).unwrap();
	}

	#[tokio::test]
	async fn test_lists_json_files_sorted() {
		let dir = tempfile::tempdir().unwrap();
		write_partition(dir.path(), "core_general", json!([]));
		write_partition(dir.path(), "courses_2024_major", json!([]));
		std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

		let store = JsonDirStore::new(dir.path());
		assert_eq!(
			store.list_partitions().await.unwrap(),
			vec!["core_general", "courses_2024_major"]
		);
	}

	#[tokio::test]
	async fn test_find_and_count() {
		let dir = tempfile::tempdir().unwrap();
		write_partition(
			dir.path(),
			"p",
			json!([{"course_name": "a"}, 42, {"course_name": "b"}, {"course_name": "c"}]),
		);
		let store = JsonDirStore::new(dir.path());

		assert_eq!(store.count("p", &MatchPredicate::all()).await.unwrap(), 3);
		let docs = store.find("p", &MatchPredicate::all(), 1, 1).await.unwrap();
		assert_eq!(docs.len(), 1);
		assert_eq!(docs[0]["course_name"], "b");
	}

	#[tokio::test]
	async fn test_missing_and_invalid_partitions() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("broken.json"), "{not json").unwrap();
		let store = JsonDirStore::new(dir.path());

		assert_matches!(
			store.count("absent", &MatchPredicate::all()).await,
			Err(StoreError::PartitionNotFound(_))
		);
		assert_matches!(
			store.count("../etc/passwd", &MatchPredicate::all()).await,
			Err(StoreError::PartitionNotFound(_))
		);
		assert_matches!(
			store.find("broken", &MatchPredicate::all(), 0, 10).await,
			Err(StoreError::Serialization(_))
		);
	}

	#[tokio::test]
	async fn test_missing_root_fails_listing() {
		let store = JsonDirStore::new("/nonexistent/catalog/data");
		assert_matches!(store.list_partitions().await, Err(StoreError::Storage(_)));
	}
}
