// Federated counter
//
// Sums per-partition match counts. Counts carry no ordering dependency, so
// every partition is counted concurrently and combined with a plain sum. A
// failing partition contributes 0.

use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::inference::infer_defaults;
use crate::predicate::MatchPredicate;
use crate::registry::PartitionRegistry;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct FederatedCounter {
	store: Arc<dyn DocumentStore>,
	registry: PartitionRegistry,
	concurrency: usize,
}

impl FederatedCounter {
	pub fn new(store: Arc<dyn DocumentStore>, registry: PartitionRegistry, config: &CatalogConfig) -> Self {
		Self {
			store,
			registry,
			concurrency: config.count_concurrency.max(1),
		}
	}

	/// Total matches across every registry partition.
	pub async fn count_total(&self, predicate: &MatchPredicate) -> Result<u64, CatalogError> {
		let partitions = self.registry.list_partitions().await?;
		let total = stream::iter(partitions)
			.map(|partition| async move { self.count_partition(&partition, predicate).await })
			.buffer_unordered(self.concurrency)
			.fold(0u64, |acc, n| async move { acc + n })
			.await;
		debug!(target: "catalog", total, "counted partitions");
		Ok(total)
	}

	/// Matches in a single partition; 0 if the count fails.
	pub async fn count_partition(&self, partition: &str, predicate: &MatchPredicate) -> u64 {
		let scoped = predicate.scoped_to(&infer_defaults(partition));
		match self.store.count(partition, &scoped).await {
			Ok(count) => count,
			Err(e) => {
				warn!(target: "catalog", partition, "count failed, contributing 0: {}", e);
				0
			},
		}
	}
}
