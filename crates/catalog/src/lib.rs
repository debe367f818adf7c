// Federated course catalog
//
// Turns one logical list/search/count request over the course catalog into
// per-partition queries against a document store:
// - Partition resolution (explicit list or naming-convention discovery)
// - Metadata inference from partition names
// - Heterogeneous record normalization into `CourseRecord`
// - Global skip/limit pagination across partitions
// - Deterministic ordering of the assembled page

pub mod assemble;
mod catalog;
pub mod config;
pub mod counter;
pub mod engine;
mod error;
pub mod inference;
pub mod normalize;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod store;

pub use catalog::CourseCatalog;
pub use config::{CatalogConfig, UnknownCountPolicy};
pub use counter::FederatedCounter;
pub use engine::{PaginationBudget, PaginationEngine, PartitionPlan};
pub use error::CatalogError;
pub use inference::{InferredDefaults, infer_defaults};
pub use normalize::{CourseRecord, normalize};
pub use predicate::{CourseFilters, MatchPredicate};
pub use query::CourseQuery;
pub use registry::PartitionRegistry;
pub use store::{DocumentStore, JsonDirStore, RawDocument, StoreError};

#[cfg(any(test, feature = "testing"))]
pub use store::{FindCall, MemoryStore};
