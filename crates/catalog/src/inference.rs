//! Metadata inference from partition names.
//!
//! Partitions follow a naming convention that encodes the academic year and
//! department track (`courses_2024_major_sci`) or name one of the fixed
//! general-education partitions (`core_general`). Records inside a partition
//! frequently omit the fields the name already implies, so the defaults
//! derived here fill those gaps during normalization.
//!
//! The rules are an ordered table; the first matching rule decides `group`,
//! `major_track` and `general_type`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

pub const GROUP_MAJOR: &str = "전공";
pub const GROUP_GENERAL: &str = "교양";
pub const GROUP_ELECTIVE: &str = "일반선택/교직";

/// Field values implied by a partition's name.
///
/// `source_collection` is always present. Every other member is only a
/// fallback: it never replaces a value the raw record supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InferredDefaults {
	pub source_collection: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub year: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub group: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub major_track: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub general_type: Option<String>,
}

impl InferredDefaults {
	fn for_partition(name: &str) -> Self {
		Self {
			source_collection: name.to_string(),
			..Default::default()
		}
	}

	/// Default value for one of the inferable fields, rendered as text.
	pub fn text_for(&self, field: &str) -> Option<String> {
		match field {
			"year" => self.year.map(|y| y.to_string()),
			"group" => self.group.clone(),
			"major_track" => self.major_track.clone(),
			"general_type" => self.general_type.clone(),
			_ => None,
		}
	}
}

enum NameMatcher {
	Pattern(Regex),
	Exact(&'static str),
}

struct InferenceRule {
	matcher: NameMatcher,
	apply: fn(&mut InferredDefaults, Option<&Captures>),
}

impl InferenceRule {
	fn exact(name: &'static str, apply: fn(&mut InferredDefaults, Option<&Captures>)) -> Self {
		Self {
			matcher: NameMatcher::Exact(name),
			apply,
		}
	}

	/// Returns true if the rule matched and was applied.
	fn apply_to(&self, name: &str, defaults: &mut InferredDefaults) -> bool {
		match &self.matcher {
			NameMatcher::Pattern(re) => match re.captures(name) {
				Some(caps) => {
					(self.apply)(defaults, Some(&caps));
					true
				},
				None => false,
			},
			NameMatcher::Exact(exact) if *exact == name => {
				(self.apply)(defaults, None);
				true
			},
			NameMatcher::Exact(_) => false,
		}
	}
}

static MAJOR_PARTITION: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^courses_(\d{4})_major(.*)$").expect("static regex is valid"));

static RULES: Lazy<Vec<InferenceRule>> = Lazy::new(|| {
	vec![
		InferenceRule {
			matcher: NameMatcher::Pattern(MAJOR_PARTITION.clone()),
			apply: apply_major,
		},
		InferenceRule::exact("courses_NormalStudy", |d, _| {
			d.group = Some(GROUP_ELECTIVE.to_string());
			d.general_type = Some("일반선택".to_string());
		}),
		InferenceRule::exact("core_general", |d, _| general(d, "핵심 교양")),
		InferenceRule::exact("balance_general", |d, _| general(d, "균형 교양")),
		InferenceRule::exact("basic_general", |d, _| general(d, "기초 교양")),
	]
});

fn apply_major(defaults: &mut InferredDefaults, caps: Option<&Captures>) {
	let Some(caps) = caps else {
		return;
	};
	defaults.year = caps.get(1).and_then(|m| m.as_str().parse().ok());
	defaults.group = Some(GROUP_MAJOR.to_string());
	defaults.major_track = match caps.get(2).map(|m| m.as_str()) {
		Some("_sci") => Some("컴퓨터 과학".to_string()),
		Some("_sw") => Some("컴퓨터 소프트웨어".to_string()),
		Some("_bd") => Some("빅데이터".to_string()),
		_ => None,
	};
}

fn general(defaults: &mut InferredDefaults, general_type: &str) {
	defaults.group = Some(GROUP_GENERAL.to_string());
	defaults.general_type = Some(general_type.to_string());
}

/// Whether a partition name follows the `courses_{year}_major{suffix}` convention.
pub fn is_major_partition(name: &str) -> bool {
	MAJOR_PARTITION.is_match(name)
}

/// Derive the default field values implied by a partition name.
pub fn infer_defaults(partition: &str) -> InferredDefaults {
	let mut defaults = InferredDefaults::for_partition(partition);
	for rule in RULES.iter() {
		if rule.apply_to(partition, &mut defaults) {
			break;
		}
	}
	defaults
}
