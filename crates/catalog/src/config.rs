// Catalog configuration
//
// Loaded from YAML (camelCase keys), with the partition list overridable
// through the `COURSE_COLLECTIONS` environment variable.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::CatalogError;

/// Environment variable holding a comma-separated, ordered partition list.
pub const PARTITIONS_ENV: &str = "COURSE_COLLECTIONS";

/// General-education partitions appended after discovered major partitions.
pub const DEFAULT_GENERAL_PARTITIONS: &[&str] = &[
	"core_general",
	"balance_general",
	"basic_general",
	"courses_NormalStudy",
];

/// What the pagination engine does with a partition whose count failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCountPolicy {
	/// Probe the partition with the current remaining skip.
	#[default]
	Probe,
	/// Treat the partition as contributing nothing.
	Skip,
	/// Fail the whole request.
	Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogConfig {
	/// Explicit ordered partition list. Empty means discover by convention.
	pub partitions: Vec<String>,

	/// Allow-list of general-education partitions retained during discovery.
	pub general_partitions: Vec<String>,

	/// Upper bound for a request's `limit`.
	pub max_limit: u64,

	/// `limit` applied when a request does not specify one.
	pub default_limit: u64,

	pub unknown_count: UnknownCountPolicy,

	/// Maximum number of partition counts issued concurrently.
	pub count_concurrency: usize,
}

impl Default for CatalogConfig {
	fn default() -> Self {
		Self {
			partitions: Vec::new(),
			general_partitions: DEFAULT_GENERAL_PARTITIONS.iter().map(|s| s.to_string()).collect(),
			max_limit: 100,
			default_limit: 20,
			unknown_count: UnknownCountPolicy::default(),
			count_concurrency: 16,
		}
	}
}

impl CatalogConfig {
	/// Parse a YAML document. Missing keys take their defaults.
	pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
		let config: CatalogConfig = serde_yaml::from_str(content)?;
		config.validate()?;
		Ok(config)
	}

	/// Load configuration from a YAML file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
		let path = path.as_ref();
		info!(target: "catalog", "Loading catalog configuration from {}", path.display());
		let content = fs_err::tokio::read_to_string(path).await?;
		Self::from_yaml(&content)
	}

	/// Apply the `COURSE_COLLECTIONS` override, if set.
	pub fn with_env_overrides(self) -> Self {
		match std::env::var(PARTITIONS_ENV) {
			Ok(value) => self.with_partition_list(&value),
			Err(_) => self,
		}
	}

	/// Replace the explicit partition list with a comma-separated list.
	///
	/// Blank entries are dropped; a list with no entries leaves the current
	/// configuration untouched.
	pub fn with_partition_list(mut self, value: &str) -> Self {
		let names: Vec<String> = value
			.split(',')
			.map(str::trim)
			.filter(|name| !name.is_empty())
			.map(str::to_string)
			.collect();
		if !names.is_empty() {
			self.partitions = names;
		}
		self
	}

	pub fn validate(&self) -> Result<(), CatalogError> {
		if self.max_limit == 0 {
			return Err(CatalogError::Config("maxLimit must be at least 1".to_string()));
		}
		if self.default_limit == 0 || self.default_limit > self.max_limit {
			return Err(CatalogError::Config(format!(
				"defaultLimit must be between 1 and {}",
				self.max_limit
			)));
		}
		if self.count_concurrency == 0 {
			return Err(CatalogError::Config(
				"countConcurrency must be at least 1".to_string(),
			));
		}
		Ok(())
	}
}
