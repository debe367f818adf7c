//! catalogctl
//!
//! Command-line front end for the federated course catalog over a directory
//! of JSON partition files (`<partition>.json`, each a JSON array of course
//! documents).
//!
//! ```bash
//! catalogctl --data-dir ./data list --q 자료 --year 2024 --limit 10
//! catalogctl --data-dir ./data count --group 교양
//! catalogctl --data-dir ./data lookup 4470012 4470013
//! catalogctl --data-dir ./data partitions
//! catalogctl infer courses_2024_major_sci
//! ```
//!
//! `COURSE_COLLECTIONS` (comma-separated) pins the partition list and order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use course_catalog::{CatalogConfig, CourseCatalog, CourseFilters, CourseQuery, JsonDirStore, infer_defaults};
use serde::Serialize;
use tracing::info;

mod telemetry;

use telemetry::LogFormat;

#[derive(Parser)]
#[command(name = "catalogctl", version, about = "Query the federated course catalog")]
struct Cli {
	/// Directory holding one JSON file per partition
	#[arg(long, env = "CATALOG_DATA_DIR", default_value = "data", global = true)]
	data_dir: PathBuf,

	/// YAML configuration file
	#[arg(long, env = "CATALOG_CONFIG", global = true)]
	config: Option<PathBuf>,

	/// Log output format
	#[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
	log_format: LogFormat,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// List courses
	List {
		#[command(flatten)]
		filters: FilterArgs,
		/// Number of matches to skip
		#[arg(long, default_value_t = 0)]
		skip: u64,
		/// Page size
		#[arg(long)]
		limit: Option<u64>,
	},
	/// Count matching courses
	Count {
		#[command(flatten)]
		filters: FilterArgs,
	},
	/// Resolve courses by course code
	Lookup {
		#[arg(required = true)]
		codes: Vec<String>,
	},
	/// Show the partitions a federated request walks
	Partitions,
	/// Show the defaults inferred from a partition name
	Infer { partition: String },
}

#[derive(Args)]
struct FilterArgs {
	/// Case-insensitive substring search
	#[arg(long, alias = "query")]
	q: Option<String>,
	#[arg(long)]
	year: Option<i64>,
	#[arg(long)]
	group: Option<String>,
	#[arg(long)]
	category: Option<String>,
	#[arg(long)]
	major_track: Option<String>,
	#[arg(long)]
	general_type: Option<String>,
	/// Query a single partition only
	#[arg(long, alias = "collection")]
	partition: Option<String>,
}

impl FilterArgs {
	fn into_query(self) -> CourseQuery {
		let query = CourseQuery::new(CourseFilters {
			query: self.q,
			year: self.year,
			group: self.group,
			category: self.category,
			major_track: self.major_track,
			general_type: self.general_type,
		});
		match self.partition {
			Some(partition) => query.in_partition(partition),
			None => query,
		}
	}
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

async fn load_config(path: Option<&PathBuf>) -> Result<CatalogConfig> {
	let config = match path {
		Some(path) => CatalogConfig::from_file(path)
			.await
			.with_context(|| format!("loading {}", path.display()))?,
		None => CatalogConfig::default(),
	};
	Ok(config.with_env_overrides())
}

async fn open_catalog(data_dir: &Path, config: Option<&PathBuf>) -> Result<CourseCatalog> {
	let config = load_config(config).await?;
	info!(data_dir = %data_dir.display(), explicit = !config.partitions.is_empty(), "starting catalog");
	let store = Arc::new(JsonDirStore::new(data_dir));
	CourseCatalog::new(store, &config).context("invalid catalog configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	telemetry::init(cli.log_format)?;

	match cli.command {
		Command::Infer { partition } => print_json(&infer_defaults(&partition)),
		Command::List { filters, skip, limit } => {
			let catalog = open_catalog(&cli.data_dir, cli.config.as_ref()).await?;
			let mut query = filters.into_query();
			query.skip = skip;
			query.limit = limit;
			print_json(&catalog.list(&query).await?)
		},
		Command::Count { filters } => {
			let catalog = open_catalog(&cli.data_dir, cli.config.as_ref()).await?;
			print_json(&catalog.count(&filters.into_query()).await?)
		},
		Command::Lookup { codes } => {
			let catalog = open_catalog(&cli.data_dir, cli.config.as_ref()).await?;
			let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
			print_json(&catalog.lookup_many(&codes).await?)
		},
		Command::Partitions => {
			let catalog = open_catalog(&cli.data_dir, cli.config.as_ref()).await?;
			print_json(&catalog.partitions().await?)
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_infer_needs_no_data_dir() {
		let cli = Cli::try_parse_from(["catalogctl", "infer", "courses_2024_major_sw"]).unwrap();
		assert!(cli.config.is_none());
		match cli.command {
			Command::Infer { partition } => assert_eq!(partition, "courses_2024_major_sw"),
			_ => panic!("expected infer"),
		}
	}

	#[test]
	fn test_list_flags_build_query() {
		let cli = Cli::try_parse_from([
			"catalogctl",
			"list",
			"--q",
			"자료",
			"--year",
			"2024",
			"--collection",
			"courses_2024_major",
			"--skip",
			"10",
		])
		.unwrap();
		let Command::List { filters, skip, limit } = cli.command else {
			panic!("expected list");
		};
		let query = filters.into_query();
		assert_eq!(query.filters.query.as_deref(), Some("자료"));
		assert_eq!(query.filters.year, Some(2024));
		assert_eq!(query.partition(), Some("courses_2024_major"));
		assert_eq!(skip, 10);
		assert_eq!(limit, None);
	}
}
