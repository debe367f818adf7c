// Partition registry
//
// Resolves the ordered partition list for every top-level request. The list
// is never cached, so partitions created or dropped between requests are
// picked up on the next one.

use std::sync::Arc;

use tracing::debug;

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::inference::is_major_partition;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct PartitionRegistry {
	store: Arc<dyn DocumentStore>,
	/// Operator-supplied order; takes precedence over discovery.
	explicit: Vec<String>,
	/// Allow-list appended after discovered major partitions.
	general: Vec<String>,
}

impl PartitionRegistry {
	pub fn new(store: Arc<dyn DocumentStore>, config: &CatalogConfig) -> Self {
		Self {
			store,
			explicit: config.partitions.clone(),
			general: config.general_partitions.clone(),
		}
	}

	pub fn is_explicit(&self) -> bool {
		!self.explicit.is_empty()
	}

	/// The ordered partitions to federate over.
	///
	/// An explicit list is returned verbatim. Otherwise major partitions are
	/// discovered by name (sorted, so traversal order is stable across calls
	/// regardless of the store's enumeration order), followed by the
	/// allow-listed general-education partitions that exist, in allow-list
	/// order.
	pub async fn list_partitions(&self) -> Result<Vec<String>, CatalogError> {
		if self.is_explicit() {
			return Ok(self.explicit.clone());
		}

		let all = self
			.store
			.list_partitions()
			.await
			.map_err(CatalogError::Configuration)?;

		let mut partitions: Vec<String> = all.iter().filter(|n| is_major_partition(n)).cloned().collect();
		partitions.sort();
		for name in &self.general {
			if all.contains(name) && !partitions.contains(name) {
				partitions.push(name.clone());
			}
		}

		debug!(target: "catalog", discovered = partitions.len(), "resolved partitions");
		Ok(partitions)
	}
}
