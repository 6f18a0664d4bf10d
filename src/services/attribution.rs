use crate::models::candidate::{Attribution, Candidate, CandidateStatus};

type ExplicitField = fn(&Candidate) -> Option<Attribution>;

/// Terminal outcomes that carry an attribution, and the field that records it
/// explicitly on newer records.
fn explicit_field_for(main_status: &CandidateStatus) -> Option<ExplicitField> {
    match main_status {
        CandidateStatus::Rejected => Some(|c: &Candidate| c.rejected_by),
        CandidateStatus::Dropped => Some(|c: &Candidate| c.dropped_by),
        _ => None,
    }
}

/// Records written before the explicit field existed are attributed from the
/// status log: reaching an interview means the client made the call, a
/// shortlist without an interview means the mentor filtered the candidate out.
fn infer_from_history(candidate: &Candidate) -> Option<Attribution> {
    if candidate.history_contains(&CandidateStatus::Interviewed) {
        Some(Attribution::Client)
    } else if candidate.history_contains(&CandidateStatus::Shortlisted) {
        Some(Attribution::Mentor)
    } else {
        None
    }
}

/// Responsible party for a candidate sitting in `main_status`, or `None` when
/// the candidate is not in that status or cannot be attributed.
pub fn classify(candidate: &Candidate, main_status: &CandidateStatus) -> Option<Attribution> {
    let explicit = explicit_field_for(main_status)?;
    if &candidate.status != main_status {
        return None;
    }
    explicit(candidate).or_else(|| infer_from_history(candidate))
}

pub fn matches(candidate: &Candidate, main_status: &CandidateStatus, wanted: Attribution) -> bool {
    classify(candidate, main_status) == Some(wanted)
}
