// Request boundary types

use serde::Deserialize;

use crate::error::CatalogError;
use crate::predicate::CourseFilters;

/// A list/count request as received from the routing layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CourseQuery {
	#[serde(flatten)]
	pub filters: CourseFilters,
	/// Page size; the configured default applies when absent.
	pub limit: Option<u64>,
	pub skip: u64,
	/// Restrict the request to one partition.
	#[serde(alias = "collection")]
	pub partition: Option<String>,
}

impl CourseQuery {
	pub fn new(filters: CourseFilters) -> Self {
		Self {
			filters,
			..Default::default()
		}
	}

	pub fn with_page(mut self, skip: u64, limit: u64) -> Self {
		self.skip = skip;
		self.limit = Some(limit);
		self
	}

	pub fn in_partition(mut self, partition: impl Into<String>) -> Self {
		self.partition = Some(partition.into());
		self
	}

	/// The single partition to query, if one was named.
	pub fn partition(&self) -> Option<&str> {
		self.partition.as_deref().map(str::trim).filter(|p| !p.is_empty())
	}

	/// Resolve and validate the page size.
	pub fn resolved_limit(&self, default_limit: u64, max_limit: u64) -> Result<u64, CatalogError> {
		let limit = self.limit.unwrap_or(default_limit);
		if limit == 0 || limit > max_limit {
			return Err(CatalogError::invalid_request(format!(
				"limit must be between 1 and {max_limit}, got {limit}"
			)));
		}
		Ok(limit)
	}
}
