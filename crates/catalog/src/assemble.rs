// Response assembler

use std::cmp::Ordering;

use crate::normalize::CourseRecord;

fn sort_key(record: &CourseRecord) -> (&str, &str) {
	(
		record.requirement_id.as_deref().unwrap_or(""),
		record.course_code.as_deref().unwrap_or(""),
	)
}

fn compare(a: &CourseRecord, b: &CourseRecord) -> Ordering {
	sort_key(a).cmp(&sort_key(b))
}

/// Final ordering of a page: stable sort by `(requirement_id, course_code)`
/// with absent values ordering as the empty string. Records without a name
/// are dropped.
pub fn assemble(records: Vec<CourseRecord>) -> Vec<CourseRecord> {
	let mut records: Vec<CourseRecord> = records.into_iter().filter(CourseRecord::has_name).collect();
	records.sort_by(compare);
	records
}
