// End-to-end tests over the directory-backed store

use std::path::Path;
use std::sync::Arc;

use course_catalog::{CatalogConfig, CourseCatalog, CourseFilters, CourseQuery, JsonDirStore};
use serde_json::{Value, json};
use tempfile::TempDir;

fn write_partition(dir: &Path, name: &str, docs: Value) -> anyhow::Result<()> {
	std::fs::write(dir.join(format!("{name}.json")), serde_json::to_string_pretty(&docs)?)?;
	Ok(())
}

fn catalog_dir() -> anyhow::Result<TempDir> {
	let dir = tempfile::tempdir()?;
	write_partition(
		dir.path(),
		"courses_2025_major_sw",
		json!([
			{"requirement_id": "M2", "course_name": "웹프로그래밍", "course_code": "SW201", "category": "전공선택"},
			{"requirement_id": "M1", "course_name": "자료구조", "course_code": "SW101", "category": "전공필수", "credits": 3}
		]),
	)?;
	write_partition(
		dir.path(),
		"core_general",
		json!([
			{"requirement_id": "G1", "course_name": "글쓰기와 토론", "course_code": 9001, "plan_keywords": "토론, 발표"}
		]),
	)?;
	write_partition(dir.path(), "users", json!([{"student_id": "2024001"}]))?;
	Ok(dir)
}

#[tokio::test]
async fn test_discovers_and_lists() -> anyhow::Result<()> {
	let dir = catalog_dir()?;
	let catalog = CourseCatalog::new(Arc::new(JsonDirStore::new(dir.path())), &CatalogConfig::default())?;

	assert_eq!(catalog.partitions().await?, vec!["courses_2025_major_sw", "core_general"]);

	let page = catalog.list(&CourseQuery::default()).await?;
	let codes: Vec<_> = page.iter().filter_map(|r| r.course_code.as_deref()).collect();
	assert_eq!(codes, vec!["9001", "SW101", "SW201"]);
	assert_eq!(catalog.count(&CourseQuery::default()).await?, 3);

	let general = &page[0];
	assert_eq!(general.general_type.as_deref(), Some("핵심 교양"));
	assert_eq!(
		general.plan_keywords,
		Some(vec!["토론".to_string(), "발표".to_string()])
	);
	Ok(())
}

#[tokio::test]
async fn test_filtered_count_and_list() -> anyhow::Result<()> {
	let dir = catalog_dir()?;
	let catalog = CourseCatalog::new(Arc::new(JsonDirStore::new(dir.path())), &CatalogConfig::default())?;

	let query = CourseQuery::new(CourseFilters {
		year: Some(2025),
		category: Some("전공필수".to_string()),
		..Default::default()
	});
	let page = catalog.list(&query).await?;
	assert_eq!(page.len(), 1);
	assert_eq!(page[0].course_name, "자료구조");
	assert_eq!(page[0].major_track.as_deref(), Some("컴퓨터 소프트웨어"));
	assert_eq!(page[0].credits, Some(3));
	assert_eq!(catalog.count(&query).await?, 1);
	Ok(())
}

#[tokio::test]
async fn test_partition_removed_between_requests() -> anyhow::Result<()> {
	let dir = catalog_dir()?;
	let catalog = CourseCatalog::new(Arc::new(JsonDirStore::new(dir.path())), &CatalogConfig::default())?;
	assert_eq!(catalog.count(&CourseQuery::default()).await?, 3);

	std::fs::remove_file(dir.path().join("core_general.json"))?;
	assert_eq!(catalog.count(&CourseQuery::default()).await?, 2);
	assert_eq!(catalog.list(&CourseQuery::default()).await?.len(), 2);
	Ok(())
}
