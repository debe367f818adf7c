// Course catalog facade
//
// Entry point used by the request layer and by the enrollment, graduation
// and timetable consumers that resolve courses by code.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use itertools::Itertools;
use tracing::{debug, warn};

use crate::assemble::assemble;
use crate::config::CatalogConfig;
use crate::counter::FederatedCounter;
use crate::engine::PaginationEngine;
use crate::error::CatalogError;
use crate::inference::infer_defaults;
use crate::normalize::{CourseRecord, normalize};
use crate::predicate::MatchPredicate;
use crate::query::CourseQuery;
use crate::registry::PartitionRegistry;
use crate::store::DocumentStore;

/// Matches inspected per partition when resolving a code.
const LOOKUP_WINDOW: u64 = 8;

#[derive(Clone)]
pub struct CourseCatalog {
	store: Arc<dyn DocumentStore>,
	registry: PartitionRegistry,
	engine: PaginationEngine,
	counter: FederatedCounter,
	default_limit: u64,
	max_limit: u64,
}

impl CourseCatalog {
	pub fn new(store: Arc<dyn DocumentStore>, config: &CatalogConfig) -> Result<Self, CatalogError> {
		config.validate()?;
		let registry = PartitionRegistry::new(store.clone(), config);
		Ok(Self {
			engine: PaginationEngine::new(store.clone(), registry.clone(), config),
			counter: FederatedCounter::new(store.clone(), registry.clone(), config),
			store,
			registry,
			default_limit: config.default_limit,
			max_limit: config.max_limit,
		})
	}

	/// The partitions a federated request would currently walk.
	pub async fn partitions(&self) -> Result<Vec<String>, CatalogError> {
		self.registry.list_partitions().await
	}

	/// List courses matching the query, ordered by `(requirement_id, course_code)`.
	pub async fn list(&self, query: &CourseQuery) -> Result<Vec<CourseRecord>, CatalogError> {
		let limit = query.resolved_limit(self.default_limit, self.max_limit)?;
		let predicate = MatchPredicate::build(&query.filters);
		debug!(
			target: "catalog",
			partition = query.partition(),
			skip = query.skip,
			limit,
			"listing courses"
		);

		let records = match query.partition() {
			Some(partition) => {
				self
					.engine
					.fetch_partition(partition, &predicate, query.skip, limit)
					.await
			},
			None => self.engine.fetch_page(&predicate, query.skip, limit).await?,
		};
		Ok(assemble(records))
	}

	/// Count courses matching the query's filters. Pagination fields are ignored.
	pub async fn count(&self, query: &CourseQuery) -> Result<u64, CatalogError> {
		let predicate = MatchPredicate::build(&query.filters);
		match query.partition() {
			Some(partition) => Ok(self.counter.count_partition(partition, &predicate).await),
			None => self.counter.count_total(&predicate).await,
		}
	}

	/// First course with the given code, walking partitions in registry order.
	pub async fn lookup_by_code(&self, code: &str) -> Result<Option<CourseRecord>, CatalogError> {
		let partitions = self.registry.list_partitions().await?;
		Ok(self.lookup_in(&partitions, code).await)
	}

	/// Resolve several course codes at once. Codes without a match are absent
	/// from the result.
	pub async fn lookup_many(&self, codes: &[&str]) -> Result<HashMap<String, CourseRecord>, CatalogError> {
		let partitions = self.registry.list_partitions().await?;
		let codes: Vec<&str> = codes.iter().copied().unique().collect();
		let found = join_all(codes.iter().map(|code| self.lookup_in(&partitions, code))).await;
		Ok(
			codes
				.into_iter()
				.zip(found)
				.filter_map(|(code, record)| record.map(|r| (code.to_string(), r)))
				.collect(),
		)
	}

	async fn lookup_in(&self, partitions: &[String], code: &str) -> Option<CourseRecord> {
		let predicate = MatchPredicate::for_code(code);
		for partition in partitions {
			let defaults = infer_defaults(partition);
			let scoped = predicate.scoped_to(&defaults);
			match self.store.find(partition, &scoped, 0, LOOKUP_WINDOW).await {
				Ok(docs) => {
					if let Some(record) = docs.iter().find_map(|doc| normalize(doc, &defaults)) {
						return Some(record);
					}
				},
				Err(e) => {
					warn!(target: "catalog", partition = %partition, code, "lookup failed: {}", e);
				},
			}
		}
		None
	}
}
