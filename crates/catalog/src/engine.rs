// Federated pagination engine
//
// Produces one globally skip/limit-bounded page across every registry
// partition. Partition counts are gathered concurrently up front; the fetch
// pass is sequential because the skip carried into partition N+1 depends on
// how much of it partition N consumed.

use std::sync::Arc;

use futures::{StreamExt, stream};
use tracing::{debug, warn};

use crate::config::{CatalogConfig, UnknownCountPolicy};
use crate::error::CatalogError;
use crate::inference::{InferredDefaults, infer_defaults};
use crate::normalize::{CourseRecord, normalize};
use crate::predicate::MatchPredicate;
use crate::registry::PartitionRegistry;
use crate::store::DocumentStore;

/// Running skip/take counters threaded through the partition walk.
///
/// Every transition returns a new budget; nothing is mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationBudget {
	pub remaining_skip: u64,
	pub remaining_take: u64,
}

/// What to do with the next partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionPlan {
	/// Every match in the partition falls inside the remaining skip.
	Skip,
	/// Fetch up to `take` matches starting at local offset `skip`.
	Fetch { skip: u64, take: u64 },
}

impl PaginationBudget {
	pub fn new(skip: u64, take: u64) -> Self {
		Self {
			remaining_skip: skip,
			remaining_take: take,
		}
	}

	pub fn is_exhausted(&self) -> bool {
		self.remaining_take == 0
	}

	/// Plan the next partition given its match count, if known.
	///
	/// A partition with an unknown count is always fetched with the current
	/// remaining skip. Once a partition is fetched the skip is fully spent.
	pub fn plan(self, count: Option<u64>) -> (PartitionPlan, Self) {
		match count {
			Some(count) if self.remaining_skip >= count => (
				PartitionPlan::Skip,
				Self {
					remaining_skip: self.remaining_skip - count,
					..self
				},
			),
			_ => (
				PartitionPlan::Fetch {
					skip: self.remaining_skip,
					take: self.remaining_take,
				},
				Self {
					remaining_skip: 0,
					..self
				},
			),
		}
	}

	/// Account for `emitted` records appended to the page.
	pub fn emitted(self, emitted: u64) -> Self {
		Self {
			remaining_take: self.remaining_take.saturating_sub(emitted),
			..self
		}
	}
}

/// A partition prepared for one request.
struct ScopedPartition {
	name: String,
	defaults: InferredDefaults,
	predicate: MatchPredicate,
}

impl ScopedPartition {
	fn new(name: String, predicate: &MatchPredicate) -> Self {
		let defaults = infer_defaults(&name);
		let predicate = predicate.scoped_to(&defaults);
		Self {
			name,
			defaults,
			predicate,
		}
	}
}

#[derive(Clone)]
pub struct PaginationEngine {
	store: Arc<dyn DocumentStore>,
	registry: PartitionRegistry,
	unknown_count: UnknownCountPolicy,
	count_concurrency: usize,
}

impl PaginationEngine {
	pub fn new(store: Arc<dyn DocumentStore>, registry: PartitionRegistry, config: &CatalogConfig) -> Self {
		Self {
			store,
			registry,
			unknown_count: config.unknown_count,
			count_concurrency: config.count_concurrency.max(1),
		}
	}

	/// Fetch one page of normalized records across all partitions.
	///
	/// Records appear in registry order, then natural storage order within a
	/// partition. Only partition enumeration failures are returned as errors
	/// (plus unknown counts under [`UnknownCountPolicy::Fail`]).
	pub async fn fetch_page(
		&self,
		predicate: &MatchPredicate,
		skip: u64,
		limit: u64,
	) -> Result<Vec<CourseRecord>, CatalogError> {
		let partitions: Vec<ScopedPartition> = self
			.registry
			.list_partitions()
			.await?
			.into_iter()
			.map(|name| ScopedPartition::new(name, predicate))
			.collect();
		if partitions.is_empty() || limit == 0 {
			return Ok(Vec::new());
		}

		let counts = self.prefetch_counts(&partitions).await;

		let mut budget = PaginationBudget::new(skip, limit);
		let mut page = Vec::new();
		for (partition, count) in partitions.iter().zip(counts) {
			if budget.is_exhausted() {
				break;
			}

			if count.is_none() {
				match self.unknown_count {
					UnknownCountPolicy::Probe => {},
					UnknownCountPolicy::Skip => {
						debug!(target: "catalog", partition = %partition.name, "skipping partition with unknown count");
						continue;
					},
					UnknownCountPolicy::Fail => return Err(CatalogError::unknown_count(&partition.name)),
				}
			}

			let (plan, next) = budget.plan(count);
			budget = next;
			let PartitionPlan::Fetch { skip, take } = plan else {
				debug!(target: "catalog", partition = %partition.name, ?count, "partition consumed by skip");
				continue;
			};

			let records = self.fetch_partition_scoped(partition, skip, take).await;
			budget = budget.emitted(records.len() as u64);
			page.extend(records);
		}

		Ok(page)
	}

	/// Fetch from a single named partition, bypassing the registry.
	pub async fn fetch_partition(
		&self,
		partition: &str,
		predicate: &MatchPredicate,
		skip: u64,
		limit: u64,
	) -> Vec<CourseRecord> {
		let scoped = ScopedPartition::new(partition.to_string(), predicate);
		self.fetch_partition_scoped(&scoped, skip, limit).await
	}

	async fn fetch_partition_scoped(&self, partition: &ScopedPartition, skip: u64, take: u64) -> Vec<CourseRecord> {
		if take == 0 {
			return Vec::new();
		}
		match self.store.find(&partition.name, &partition.predicate, skip, take).await {
			Ok(docs) => {
				let records: Vec<CourseRecord> = docs
					.iter()
					.filter_map(|doc| normalize(doc, &partition.defaults))
					.take(usize::try_from(take).unwrap_or(usize::MAX))
					.collect();
				debug!(
					target: "catalog",
					partition = %partition.name,
					skip,
					take,
					fetched = docs.len(),
					emitted = records.len(),
					"fetched partition"
				);
				records
			},
			Err(e) => {
				warn!(target: "catalog", partition = %partition.name, "find failed, partition contributes nothing: {}", e);
				Vec::new()
			},
		}
	}

	/// Match counts for every partition, in partition order. `None` marks a
	/// failed count.
	async fn prefetch_counts(&self, partitions: &[ScopedPartition]) -> Vec<Option<u64>> {
		stream::iter(partitions)
			.map(|partition| async move {
				match self.store.count(&partition.name, &partition.predicate).await {
					Ok(count) => Some(count),
					Err(e) => {
						warn!(target: "catalog", partition = %partition.name, "count failed, treating as unknown: {}", e);
						None
					},
				}
			})
			.buffered(self.count_concurrency)
			.collect()
			.await
	}
}
