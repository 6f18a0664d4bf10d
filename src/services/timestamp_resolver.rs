use chrono::{DateTime, Utc};

use crate::models::candidate::{Candidate, CandidateStatus};

/// Best-known instant at which the candidate reached one of `targets`.
///
/// Dedicated date fields carry corrected or backfilled values, so they win
/// over the history log. Among matching history entries the most recent one
/// is used, since a candidate can re-enter a status. Without a match the
/// `fallback`, then the record's creation time, is returned.
pub fn resolve(
    candidate: &Candidate,
    targets: &[CandidateStatus],
    fallback: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if targets.contains(&CandidateStatus::Joined) {
        if let Some(joined) = candidate.joining_date {
            return Some(joined);
        }
    }
    if targets.contains(&CandidateStatus::Selected) {
        if let Some(selected) = candidate.selection_date {
            return Some(selected);
        }
    }

    candidate
        .status_history
        .iter()
        .filter(|entry| targets.contains(&entry.status))
        .filter_map(|entry| entry.timestamp)
        .max()
        .or(fallback)
        .or(candidate.created_at)
}

pub fn resolve_one(candidate: &Candidate, target: &CandidateStatus) -> Option<DateTime<Utc>> {
    resolve(candidate, std::slice::from_ref(target), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::StatusEntry;
    use chrono::TimeZone;
    use serde_json::Map;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn entry(status: CandidateStatus, when: Option<DateTime<Utc>>) -> StatusEntry {
        StatusEntry {
            status,
            timestamp: when,
            updated_by: None,
            comment: None,
        }
    }

    fn candidate(history: Vec<StatusEntry>) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            job_id: None,
            created_by: None,
            status: CandidateStatus::New,
            status_history: history,
            interview_stage_history: Vec::new(),
            joining_date: None,
            selection_date: None,
            rejected_by: None,
            dropped_by: None,
            dynamic_fields: Map::new(),
            created_at: Some(at(2024, 1, 1)),
        }
    }

    #[test]
    fn joining_date_wins_over_history() {
        let mut c = candidate(vec![entry(CandidateStatus::Joined, Some(at(2024, 2, 20)))]);
        c.joining_date = Some(at(2024, 3, 1));

        assert_eq!(resolve_one(&c, &CandidateStatus::Joined), Some(at(2024, 3, 1)));
    }

    #[test]
    fn selection_date_only_applies_to_selected_target() {
        let mut c = candidate(vec![entry(CandidateStatus::Shortlisted, Some(at(2024, 1, 5)))]);
        c.selection_date = Some(at(2024, 2, 2));

        assert_eq!(resolve_one(&c, &CandidateStatus::Selected), Some(at(2024, 2, 2)));
        assert_eq!(resolve_one(&c, &CandidateStatus::Shortlisted), Some(at(2024, 1, 5)));
    }

    #[test]
    fn latest_matching_history_entry_is_used() {
        let c = candidate(vec![
            entry(CandidateStatus::Hold, Some(at(2024, 1, 10))),
            entry(CandidateStatus::Shortlisted, Some(at(2024, 1, 12))),
            entry(CandidateStatus::Hold, Some(at(2024, 2, 3))),
            entry(CandidateStatus::Hold, None),
        ]);

        assert_eq!(resolve_one(&c, &CandidateStatus::Hold), Some(at(2024, 2, 3)));
        assert_eq!(
            resolve(&c, &[CandidateStatus::Shortlisted, CandidateStatus::Hold], None),
            Some(at(2024, 2, 3))
        );
    }

    #[test]
    fn falls_back_to_supplied_instant_then_creation_time() {
        let mut c = candidate(Vec::new());
        assert_eq!(
            resolve(&c, &[CandidateStatus::Rejected], Some(at(2024, 5, 5))),
            Some(at(2024, 5, 5))
        );
        assert_eq!(resolve_one(&c, &CandidateStatus::Rejected), Some(at(2024, 1, 1)));

        c.created_at = None;
        assert_eq!(resolve_one(&c, &CandidateStatus::Rejected), None);
    }
}
