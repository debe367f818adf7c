//! Record normalization.
//!
//! Partitions evolved independently, so the same concept shows up under
//! different keys and types: numeric course codes, comma-joined keyword
//! strings, `credit` instead of `credits`, a `time` string instead of
//! `timeslot`. [`normalize`] folds one raw document plus its partition's
//! [`InferredDefaults`] into the canonical [`CourseRecord`], degrading field
//! by field. The only condition that drops a record is a missing name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::inference::InferredDefaults;

/// List-valued keyword fields.
pub const KEYWORD_FIELDS: &[&str] = &[
	"plan_keywords",
	"test_keywords",
	"assignment_keywords",
	"method_keywords",
	"etc_keywords",
];

/// Keys consulted for the course name, in priority order.
const NAME_KEYS: &[&str] = &["course_name", "name", "title", "course_title", "과목명"];

/// Keys consulted for an explicit schedule string, in priority order.
const TIMESLOT_KEYS: &[&str] = &["timeslot", "time", "schedule", "시간"];

/// Keys consulted for the section label, in priority order.
const CLASS_KEYS: &[&str] = &["class", "section", "classroom"];

/// Canonical course representation returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
	pub requirement_id: Option<String>,
	pub category: Option<String>,
	pub course_name: String,
	pub course_code: Option<String>,
	pub professor: Option<String>,
	pub day: Option<String>,
	pub period: Option<String>,
	pub classroom: Option<String>,
	pub timeslot: Option<String>,
	pub credits: Option<i64>,
	pub class: Option<String>,
	pub plan_keywords: Option<Vec<String>>,
	pub test_keywords: Option<Vec<String>>,
	pub assignment_keywords: Option<Vec<String>>,
	pub method_keywords: Option<Vec<String>>,
	pub etc_keywords: Option<Vec<String>>,
	pub note: Option<String>,
	pub group: Option<String>,
	pub year: Option<i64>,
	pub major_track: Option<String>,
	pub general_type: Option<String>,
	pub source_collection: String,
	pub source_sheet: Option<String>,
	#[serde(rename = "설명란")]
	pub description: Option<String>,
	#[serde(rename = "비고")]
	pub remarks: Option<String>,
}

impl CourseRecord {
	/// Whether the record carries a usable name.
	pub fn has_name(&self) -> bool {
		!self.course_name.trim().is_empty()
	}
}

/// Text form of a scalar JSON value. Arrays, objects and null have none.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		Value::Null | Value::Array(_) | Value::Object(_) => None,
	}
}

fn text(raw: &Map<String, Value>, key: &str) -> Option<String> {
	raw.get(key).and_then(scalar_text)
}

fn first_text(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
	keys
		.iter()
		.filter_map(|key| text(raw, key))
		.find(|value| !value.trim().is_empty())
}

pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
	match value {
		Value::Number(n) => n
			.as_i64()
			.or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
		Value::String(s) => {
			let s = s.trim();
			s.parse::<i64>()
				.ok()
				.or_else(|| s.parse::<f64>().ok().filter(|f| f.fract() == 0.0).map(|f| f as i64))
		},
		_ => None,
	}
}

/// The course name as normalization resolves it: the first non-blank value
/// under the name fallback keys.
pub(crate) fn resolved_name(raw: &Map<String, Value>) -> Option<String> {
	first_text(raw, NAME_KEYS)
}

fn is_absent(raw: &Map<String, Value>, key: &str) -> bool {
	matches!(raw.get(key), None | Some(Value::Null))
}

/// Split a keyword value into trimmed, non-empty tokens.
///
/// Returns `None` when nothing remains so that "no keywords" serializes the
/// same way as a missing field.
pub fn split_keywords(value: &Value) -> Option<Vec<String>> {
	let tokens: Vec<String> = match value {
		Value::String(s) => s
			.split(',')
			.map(str::trim)
			.filter(|t| !t.is_empty())
			.map(str::to_string)
			.collect(),
		Value::Array(items) => items
			.iter()
			.filter_map(scalar_text)
			.map(|t| t.trim().to_string())
			.filter(|t| !t.is_empty())
			.collect(),
		other => scalar_text(other)
			.map(|t| t.trim().to_string())
			.filter(|t| !t.is_empty())
			.into_iter()
			.collect(),
	};
	(!tokens.is_empty()).then_some(tokens)
}

fn keywords(raw: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
	raw.get(key).and_then(split_keywords)
}

fn filled(raw: &Map<String, Value>, key: &str, default: &Option<String>) -> Option<String> {
	if is_absent(raw, key) {
		default.clone()
	} else {
		text(raw, key)
	}
}

/// Normalize a raw partition document into a [`CourseRecord`].
///
/// Returns `None` only when no name can be resolved. Internal identifiers
/// such as `_id` are never carried over.
pub fn normalize(raw: &Map<String, Value>, defaults: &InferredDefaults) -> Option<CourseRecord> {
	let course_name = resolved_name(raw)?;

	let year = if is_absent(raw, "year") {
		defaults.year
	} else {
		raw.get("year").and_then(coerce_int)
	};

	let day = text(raw, "day");
	let period = text(raw, "period");
	let timeslot = first_text(raw, TIMESLOT_KEYS).or_else(|| match (&day, &period) {
		(Some(day), Some(period)) => Some(format!("{day} {period}교시")),
		_ => None,
	});

	let credits = ["credits", "credit"]
		.iter()
		.filter_map(|key| raw.get(*key))
		.find_map(coerce_int);

	Some(CourseRecord {
		requirement_id: text(raw, "requirement_id"),
		category: text(raw, "category"),
		course_name,
		course_code: text(raw, "course_code"),
		professor: text(raw, "professor"),
		day,
		period,
		classroom: text(raw, "classroom"),
		timeslot,
		credits,
		class: first_text(raw, CLASS_KEYS),
		plan_keywords: keywords(raw, "plan_keywords"),
		test_keywords: keywords(raw, "test_keywords"),
		assignment_keywords: keywords(raw, "assignment_keywords"),
		method_keywords: keywords(raw, "method_keywords"),
		etc_keywords: keywords(raw, "etc_keywords"),
		note: text(raw, "note"),
		group: filled(raw, "group", &defaults.group),
		year,
		major_track: filled(raw, "major_track", &defaults.major_track),
		general_type: filled(raw, "general_type", &defaults.general_type),
		source_collection: defaults.source_collection.clone(),
		source_sheet: text(raw, "source_sheet"),
		description: text(raw, "설명란"),
		remarks: text(raw, "비고"),
	})
}
