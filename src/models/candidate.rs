use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::time::instant_from_json;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CandidateStatus {
    New,
    Shortlisted,
    Interviewed,
    Selected,
    Joined,
    Rejected,
    Dropped,
    Hold,
    Other(String),
}

impl CandidateStatus {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        match value.to_ascii_lowercase().as_str() {
            "new" => CandidateStatus::New,
            "shortlisted" => CandidateStatus::Shortlisted,
            "interviewed" => CandidateStatus::Interviewed,
            "selected" => CandidateStatus::Selected,
            "joined" => CandidateStatus::Joined,
            "rejected" => CandidateStatus::Rejected,
            "dropped" => CandidateStatus::Dropped,
            "hold" | "on hold" => CandidateStatus::Hold,
            _ => CandidateStatus::Other(value.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CandidateStatus::New => "New",
            CandidateStatus::Shortlisted => "Shortlisted",
            CandidateStatus::Interviewed => "Interviewed",
            CandidateStatus::Selected => "Selected",
            CandidateStatus::Joined => "Joined",
            CandidateStatus::Rejected => "Rejected",
            CandidateStatus::Dropped => "Dropped",
            CandidateStatus::Hold => "Hold",
            CandidateStatus::Other(label) => label,
        }
    }
}

impl From<String> for CandidateStatus {
    fn from(value: String) -> Self {
        CandidateStatus::parse(&value)
    }
}

impl From<CandidateStatus> for String {
    fn from(value: CandidateStatus) -> Self {
        value.label().to_string()
    }
}

/// Party held responsible for a Rejected or Dropped outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribution {
    Client,
    Mentor,
}

impl Attribution {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("client") {
            Some(Attribution::Client)
        } else if value.eq_ignore_ascii_case("mentor") {
            Some(Attribution::Mentor)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: CandidateStatus,
    pub timestamp: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: String,
    pub status: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub status: CandidateStatus,
    pub status_history: Vec<StatusEntry>,
    pub interview_stage_history: Vec<StageEntry>,
    pub joining_date: Option<DateTime<Utc>>,
    pub selection_date: Option<DateTime<Utc>>,
    pub rejected_by: Option<Attribution>,
    pub dropped_by: Option<Attribution>,
    pub dynamic_fields: Map<String, JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Looks up a job-defined field. Stored keys are inconsistently cased
    /// (`candidateName` vs `CandidateName`), so the exact key is tried first,
    /// then the key with its leading letter case flipped, then any key that
    /// matches ignoring case.
    pub fn dynamic_field(&self, key: &str) -> Option<&JsonValue> {
        if let Some(value) = self.dynamic_fields.get(key) {
            return Some(value);
        }
        if let Some(value) = self.dynamic_fields.get(&flip_leading_case(key)) {
            return Some(value);
        }
        self.dynamic_fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn dynamic_text(&self, key: &str) -> Option<String> {
        match self.dynamic_field(key)? {
            JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn display_name(&self) -> Option<String> {
        self.dynamic_text("candidateName")
    }

    pub fn history_contains(&self, status: &CandidateStatus) -> bool {
        self.status_history.iter().any(|e| &e.status == status)
    }

    /// The current status should equal the last appended history entry.
    /// An empty history carries no signal and is treated as consistent.
    pub fn status_matches_history(&self) -> bool {
        match self.status_history.last() {
            Some(entry) => entry.status == self.status,
            None => true,
        }
    }
}

fn flip_leading_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CandidateRecord {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub status: String,
    pub status_history: Option<JsonValue>,
    pub interview_stage_history: Option<JsonValue>,
    pub joining_date: Option<DateTime<Utc>>,
    pub selection_date: Option<DateTime<Utc>>,
    pub rejected_by: Option<String>,
    pub dropped_by: Option<String>,
    pub dynamic_fields: Option<JsonValue>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CandidateRecord> for Candidate {
    fn from(value: CandidateRecord) -> Self {
        let dynamic_fields = match value.dynamic_fields {
            Some(JsonValue::Object(map)) => map,
            _ => Map::new(),
        };

        Self {
            id: value.id,
            job_id: value.job_id,
            created_by: value.created_by,
            status: CandidateStatus::parse(&value.status),
            status_history: parse_status_history(value.status_history.as_ref()),
            interview_stage_history: parse_stage_history(value.interview_stage_history.as_ref()),
            joining_date: value.joining_date,
            selection_date: value.selection_date,
            rejected_by: stored_attribution(value.id, "rejected_by", value.rejected_by.as_deref()),
            dropped_by: stored_attribution(value.id, "dropped_by", value.dropped_by.as_deref()),
            dynamic_fields,
            created_at: value.created_at,
        }
    }
}

/// Reads an explicit attribution column. Blank means unset; any other value
/// that is not a known party is logged and treated as unset.
pub fn stored_attribution(candidate_id: Uuid, column: &str, raw: Option<&str>) -> Option<Attribution> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;
    let parsed = Attribution::parse(value);
    if parsed.is_none() {
        tracing::warn!(
            %candidate_id,
            column,
            value,
            "Ignoring unrecognized attribution value"
        );
    }
    parsed
}

fn field<'a>(entry: &'a Map<String, JsonValue>, camel: &str, snake: &str) -> Option<&'a JsonValue> {
    entry.get(camel).or_else(|| entry.get(snake))
}

fn text(value: Option<&JsonValue>) -> Option<String> {
    value.and_then(JsonValue::as_str).map(str::to_string)
}

/// Reads the stored status log. Entries without a status label are dropped;
/// entries with an unreadable timestamp are kept without one.
pub fn parse_status_history(raw: Option<&JsonValue>) -> Vec<StatusEntry> {
    let Some(JsonValue::Array(items)) = raw else {
        if let Some(other) = raw.filter(|v| !v.is_null()) {
            tracing::warn!("Ignoring non-array status history: {}", other);
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(JsonValue::as_object)
        .filter_map(|entry| {
            let status = entry.get("status").and_then(JsonValue::as_str)?;
            Some(StatusEntry {
                status: CandidateStatus::parse(status),
                timestamp: entry.get("timestamp").and_then(instant_from_json),
                updated_by: text(field(entry, "updatedBy", "updated_by"))
                    .and_then(|s| Uuid::parse_str(&s).ok()),
                comment: text(entry.get("comment")),
            })
        })
        .collect()
}

pub fn parse_stage_history(raw: Option<&JsonValue>) -> Vec<StageEntry> {
    let Some(JsonValue::Array(items)) = raw else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(JsonValue::as_object)
        .filter_map(|entry| {
            let stage = entry.get("stage").and_then(JsonValue::as_str)?;
            Some(StageEntry {
                stage: stage.to_string(),
                status: text(entry.get("status")),
                timestamp: entry.get("timestamp").and_then(instant_from_json),
                comment: text(entry.get("comment")),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate_with_fields(fields: JsonValue) -> Candidate {
        Candidate::from(CandidateRecord {
            id: Uuid::new_v4(),
            job_id: None,
            created_by: None,
            status: "New".to_string(),
            status_history: None,
            interview_stage_history: None,
            joining_date: None,
            selection_date: None,
            rejected_by: None,
            dropped_by: None,
            dynamic_fields: Some(fields),
            created_at: None,
        })
    }

    #[test]
    fn dynamic_field_lookup_tolerates_key_casing() {
        let lower = candidate_with_fields(json!({ "candidateName": "Asha" }));
        let upper = candidate_with_fields(json!({ "CandidateName": "Ravi" }));
        let shouting = candidate_with_fields(json!({ "CANDIDATENAME": "Mei" }));

        assert_eq!(lower.display_name().as_deref(), Some("Asha"));
        assert_eq!(upper.display_name().as_deref(), Some("Ravi"));
        assert_eq!(shouting.display_name().as_deref(), Some("Mei"));
    }

    #[test]
    fn stored_attribution_ignores_blank_and_unknown_values() {
        let id = Uuid::new_v4();
        assert_eq!(stored_attribution(id, "rejected_by", Some(" client ")), Some(Attribution::Client));
        assert_eq!(stored_attribution(id, "dropped_by", Some("MENTOR")), Some(Attribution::Mentor));
        assert_eq!(stored_attribution(id, "rejected_by", Some("  ")), None);
        assert_eq!(stored_attribution(id, "rejected_by", None), None);
        assert_eq!(stored_attribution(id, "dropped_by", Some("recruiter")), None);
    }

    #[test]
    fn exact_key_wins_over_case_variants() {
        let both = candidate_with_fields(json!({ "CandidateName": "B", "candidateName": "A" }));
        assert_eq!(both.display_name().as_deref(), Some("A"));
    }

    #[test]
    fn status_history_skips_unusable_entries() {
        let raw = json!([
            { "status": "New", "timestamp": "2024-01-02T10:00:00Z" },
            "garbage",
            { "timestamp": "2024-01-03T10:00:00Z" },
            { "status": "shortlisted", "timestamp": "not a date", "updatedBy": "nope" }
        ]);
        let history = parse_status_history(Some(&raw));

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, CandidateStatus::New);
        assert!(history[0].timestamp.is_some());
        assert_eq!(history[1].status, CandidateStatus::Shortlisted);
        assert!(history[1].timestamp.is_none());
        assert!(history[1].updated_by.is_none());
    }

    #[test]
    fn non_array_history_reads_as_empty() {
        assert!(parse_status_history(Some(&json!({ "status": "New" }))).is_empty());
        assert!(parse_status_history(None).is_empty());
    }

    #[test]
    fn status_parsing_ignores_case_and_keeps_unknown_labels() {
        assert_eq!(CandidateStatus::parse(" rejected "), CandidateStatus::Rejected);
        assert_eq!(
            CandidateStatus::parse("Offer Made"),
            CandidateStatus::Other("Offer Made".to_string())
        );
    }
}
