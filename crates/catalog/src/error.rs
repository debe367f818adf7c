// Catalog error types

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced to callers of the catalog.
///
/// Per-partition find/count failures never appear here; they are absorbed by
/// the pagination engine and the counter. Only partition enumeration failures
/// and rejected requests reach the caller.
#[derive(Error, Debug)]
pub enum CatalogError {
	#[error("failed to enumerate partitions: {0}")]
	Configuration(#[source] StoreError),

	#[error("invalid request: {0}")]
	InvalidRequest(String),

	#[error("match count unavailable for partition '{partition}'")]
	UnknownCount { partition: String },

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error("failed to read configuration: {0}")]
	Io(#[from] std::io::Error),

	#[error("failed to parse configuration: {0}")]
	Yaml(#[from] serde_yaml::Error),
}

impl CatalogError {
	pub fn invalid_request(message: impl Into<String>) -> Self {
		Self::InvalidRequest(message.into())
	}

	pub fn unknown_count(partition: impl Into<String>) -> Self {
		Self::UnknownCount {
			partition: partition.into(),
		}
	}
}
