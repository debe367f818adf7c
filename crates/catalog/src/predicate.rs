// Predicate builder
//
// Compiles request filters once into a partition-agnostic `MatchPredicate`.
// Before a partition is counted or scanned the predicate is scoped to that
// partition's inferred defaults, so that a record omitting `year` inside
// `courses_2024_major` still matches `year = 2024`.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::inference::InferredDefaults;
use crate::normalize::{KEYWORD_FIELDS, coerce_int, resolved_name, scalar_text};

/// Fields searched by the free-text query, in addition to the resolved course
/// name and every keyword field.
const TEXT_FIELDS: &[&str] = &[
	"professor",
	"course_code",
	"category",
	"requirement_id",
	"note",
];

/// Fields whose absence can be covered by a partition default.
const INFERABLE_FIELDS: &[&str] = &["year", "group", "major_track", "general_type"];

/// Request filters, as received from the request boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CourseFilters {
	#[serde(alias = "q")]
	pub query: Option<String>,
	pub year: Option<i64>,
	pub group: Option<String>,
	pub category: Option<String>,
	pub major_track: Option<String>,
	pub general_type: Option<String>,
}

/// Exact-match constraint on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equality {
	pub field: &'static str,
	/// Expected value in canonical text form.
	pub value: String,
	/// Whether an absent or null field satisfies the constraint.
	pub or_missing: bool,
	/// Compare after integer coercion, so `2024.0` and `"2024"` equal `2024`.
	pub integer: bool,
}

impl Equality {
	fn new(field: &'static str, value: impl Into<String>) -> Self {
		Self {
			field,
			value: value.into(),
			or_missing: false,
			integer: false,
		}
	}

	fn integer(field: &'static str, value: i64) -> Self {
		Self {
			integer: true,
			..Self::new(field, value.to_string())
		}
	}

	fn matches(&self, doc: &Map<String, Value>) -> bool {
		match doc.get(self.field) {
			None | Some(Value::Null) => self.or_missing,
			Some(v) if self.integer => coerce_int(v).is_some_and(|n| n.to_string() == self.value),
			Some(v) => scalar_text(v).is_some_and(|text| text == self.value),
		}
	}
}

/// Compiled request filters.
///
/// Equality constraints and the text constraint combine conjunctively; the
/// text constraint is a case-insensitive substring match over any of the
/// text-bearing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchPredicate {
	equals: Vec<Equality>,
	/// Lowercased needle.
	text: Option<String>,
	/// Only records that normalize to a named course match. Set on
	/// partition-scoped predicates so store counts and skips line up with
	/// the records a page actually emits.
	named_only: bool,
}

impl MatchPredicate {
	/// Predicate matching every record.
	pub fn all() -> Self {
		Self::default()
	}

	/// Compile request filters. Omitted or empty filters impose no constraint.
	pub fn build(filters: &CourseFilters) -> Self {
		let mut equals = Vec::new();
		if let Some(year) = filters.year {
			equals.push(Equality::integer("year", year));
		}
		let textual = [
			("group", &filters.group),
			("category", &filters.category),
			("major_track", &filters.major_track),
			("general_type", &filters.general_type),
		];
		for (field, value) in textual {
			if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
				equals.push(Equality::new(field, value));
			}
		}

		let text = filters
			.query
			.as_deref()
			.map(str::trim)
			.filter(|q| !q.is_empty())
			.map(str::to_lowercase);

		Self {
			equals,
			text,
			named_only: false,
		}
	}

	/// Predicate selecting records by exact course code.
	pub fn for_code(code: &str) -> Self {
		Self {
			equals: vec![Equality::new("course_code", code)],
			text: None,
			named_only: false,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.equals.is_empty() && self.text.is_none()
	}

	pub fn equalities(&self) -> &[Equality] {
		&self.equals
	}

	pub fn text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	/// Specialize the predicate for a partition.
	///
	/// An equality on an inferable field is also satisfied by records that
	/// omit the field when the partition default equals the requested value.
	/// Records without a resolvable name never match a scoped predicate.
	pub fn scoped_to(&self, defaults: &InferredDefaults) -> Self {
		let equals = self
			.equals
			.iter()
			.map(|eq| {
				let mut eq = eq.clone();
				if INFERABLE_FIELDS.contains(&eq.field) {
					eq.or_missing = defaults.text_for(eq.field).is_some_and(|d| d == eq.value);
				}
				eq
			})
			.collect();
		Self {
			equals,
			text: self.text.clone(),
			named_only: true,
		}
	}

	/// Evaluate the predicate against a raw document.
	pub fn matches(&self, doc: &Map<String, Value>) -> bool {
		if !self.equals.iter().all(|eq| eq.matches(doc)) {
			return false;
		}
		let name = resolved_name(doc);
		if self.named_only && name.is_none() {
			return false;
		}
		match &self.text {
			None => true,
			Some(needle) => {
				name.is_some_and(|name| name.to_lowercase().contains(needle.as_str()))
					|| TEXT_FIELDS
						.iter()
						.chain(KEYWORD_FIELDS.iter())
						.filter_map(|field| doc.get(*field))
						.any(|value| contains_ci(value, needle))
			},
		}
	}
}

fn contains_ci(value: &Value, needle: &str) -> bool {
	match value {
		Value::Array(items) => items.iter().any(|item| contains_ci(item, needle)),
		other => scalar_text(other).is_some_and(|text| text.to_lowercase().contains(needle)),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::inference::infer_defaults;

	fn doc(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("expected object"),
		}
	}

	#[test]
	fn test_empty_filters_match_everything() {
		let p = MatchPredicate::build(&CourseFilters::default());
		assert!(p.is_empty());
		assert!(p.matches(&doc(json!({}))));
		assert!(p.matches(&doc(json!({"course_name": "운영체제"}))));
	}

	#[test]
	fn test_empty_strings_impose_no_constraint() {
		let p = MatchPredicate::build(&CourseFilters {
			query: Some("   ".to_string()),
			group: Some(String::new()),
			..Default::default()
		});
		assert!(p.is_empty());
	}

	#[test]
	fn test_equality_constraints_are_conjunctive() {
		let p = MatchPredicate::build(&CourseFilters {
			year: Some(2024),
			category: Some("전공필수".to_string()),
			..Default::default()
		});
		assert_eq!(p.equalities().len(), 2);
		assert!(p.matches(&doc(json!({"year": 2024, "category": "전공필수"}))));
		assert!(!p.matches(&doc(json!({"year": 2024, "category": "전공선택"}))));
		assert!(!p.matches(&doc(json!({"year": 2023, "category": "전공필수"}))));
	}

	#[test]
	fn test_absent_field_does_not_match() {
		let p = MatchPredicate::build(&CourseFilters {
			year: Some(2024),
			..Default::default()
		});
		assert!(!p.matches(&doc(json!({"course_name": "자료구조"}))));
		assert!(!p.matches(&doc(json!({"year": null}))));
	}

	#[test]
	fn test_equality_compares_canonical_text() {
		let p = MatchPredicate::build(&CourseFilters {
			year: Some(2024),
			..Default::default()
		});
		assert!(p.matches(&doc(json!({"year": "2024"}))));

		let p = MatchPredicate::for_code("1234");
		assert!(p.matches(&doc(json!({"course_code": 1234}))));
		assert!(!p.matches(&doc(json!({"course_code": "12345"}))));
	}

	#[test]
	fn test_text_query_case_insensitive_substring() {
		let p = MatchPredicate::build(&CourseFilters {
			query: Some("DATA".to_string()),
			..Default::default()
		});
		assert_eq!(p.text(), Some("data"));
		assert!(p.matches(&doc(json!({"course_name": "Big Data Systems"}))));
		assert!(p.matches(&doc(json!({"professor": "kim", "note": "uses database labs"}))));
		assert!(p.matches(&doc(json!({"plan_keywords": ["spark", "dataflow"]}))));
		assert!(p.matches(&doc(json!({"etc_keywords": "team, datathon"}))));
		assert!(!p.matches(&doc(json!({"course_name": "Compilers", "classroom": "data hall"}))));
	}

	#[test]
	fn test_text_query_searches_resolved_name() {
		let p = MatchPredicate::build(&CourseFilters {
			query: Some("글쓰기".to_string()),
			..Default::default()
		});
		assert!(p.matches(&doc(json!({"title": "글쓰기와 토론"}))));
		assert!(p.matches(&doc(json!({"course_name": "", "과목명": "대학 글쓰기"}))));
		// Only the name normalization would pick is searched.
		assert!(!p.matches(&doc(json!({"name": "철학", "title": "글쓰기"}))));
	}

	#[test]
	fn test_year_equality_uses_integer_coercion() {
		let p = MatchPredicate::build(&CourseFilters {
			year: Some(2024),
			..Default::default()
		});
		assert!(p.matches(&doc(json!({"year": 2024.0}))));
		assert!(p.matches(&doc(json!({"year": " 2024 "}))));
		assert!(!p.matches(&doc(json!({"year": 2024.5}))));
		assert!(!p.matches(&doc(json!({"year": "twenty"}))));
	}

	#[test]
	fn test_scoped_predicate_requires_a_name() {
		let defaults = infer_defaults("core_general");
		let scoped = MatchPredicate::all().scoped_to(&defaults);
		assert!(MatchPredicate::all().matches(&doc(json!({"professor": "박"}))));
		assert!(!scoped.matches(&doc(json!({"professor": "박"}))));
		assert!(!scoped.matches(&doc(json!({"course_name": "  "}))));
		assert!(scoped.matches(&doc(json!({"title": "글쓰기"}))));
	}

	#[test]
	fn test_text_query_matches_numeric_code() {
		let p = MatchPredicate::build(&CourseFilters {
			query: Some("0012".to_string()),
			..Default::default()
		});
		assert!(p.matches(&doc(json!({"course_code": "CS0012"}))));
		assert!(!p.matches(&doc(json!({"course_code": 12}))));
	}

	#[test]
	fn test_text_and_equality_combine() {
		let p = MatchPredicate::build(&CourseFilters {
			query: Some("net".to_string()),
			group: Some("전공".to_string()),
			..Default::default()
		});
		assert!(p.matches(&doc(json!({"group": "전공", "course_name": "Networks"}))));
		assert!(!p.matches(&doc(json!({"group": "교양", "course_name": "Networks"}))));
		assert!(!p.matches(&doc(json!({"group": "전공", "course_name": "Compilers"}))));
	}

	#[test]
	fn test_scoped_predicate_uses_partition_defaults() {
		let p = MatchPredicate::build(&CourseFilters {
			year: Some(2024),
			group: Some("전공".to_string()),
			category: Some("전공선택".to_string()),
			..Default::default()
		});

		let scoped = p.scoped_to(&infer_defaults("courses_2024_major_sw"));
		let record = doc(json!({"category": "전공선택", "course_name": "웹프로그래밍"}));
		assert!(!p.matches(&record));
		assert!(scoped.matches(&record));

		// An explicit value still wins over the default.
		assert!(!scoped.matches(&doc(json!({"year": 2023, "category": "전공선택"}))));

		// Category is never inferred.
		assert!(!scoped.matches(&doc(json!({"course_name": "웹프로그래밍"}))));

		// A partition whose default differs does not relax the constraint.
		let other = p.scoped_to(&infer_defaults("courses_2023_major_sw"));
		assert!(!other.matches(&record));
	}
}
