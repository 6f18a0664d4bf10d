use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::client::Client;
use crate::models::job::Job;
use crate::models::report::{
    ColumnRule, CountWindows, DataQuality, JobReportRow, LineupRow, RecruiterRef, Report,
    ReportColumn, ReportCounts, ReportFilters, ReportSettings,
};
use crate::models::user::User;
use crate::services::attribution;
use crate::services::snapshot_service::{Snapshot, SnapshotService};
use crate::services::timestamp_resolver;
use crate::services::visibility::{VisibilityScope, VisibleIds};
use crate::utils::time::calendar_date;

const UNKNOWN_RECRUITER: &str = "Unknown";

/// Loads a fresh snapshot per request and runs the aggregation over it.
#[derive(Clone)]
pub struct ReportService {
    snapshots: SnapshotService,
    settings: ReportSettings,
}

impl ReportService {
    pub fn new(pool: PgPool, settings: ReportSettings) -> Self {
        Self {
            snapshots: SnapshotService::new(pool),
            settings,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    async fn snapshot_and_scope(
        &self,
        actor: Uuid,
        claimed_role: Option<&str>,
    ) -> Result<(Snapshot, VisibilityScope)> {
        let snapshot = self.snapshots.load().await?;
        let scope = VisibilityScope::for_actor(&snapshot.users, &snapshot.jobs, actor, claimed_role);
        Ok((snapshot, scope))
    }

    pub async fn visible_ids(&self, actor: Uuid, claimed_role: Option<&str>) -> Result<VisibleIds> {
        let (_, scope) = self.snapshot_and_scope(actor, claimed_role).await?;
        Ok(scope.visible_ids())
    }

    pub async fn client_jobs(
        &self,
        actor: Uuid,
        claimed_role: Option<&str>,
        filters: &ReportFilters,
    ) -> Result<Report<JobReportRow>> {
        let (snapshot, scope) = self.snapshot_and_scope(actor, claimed_role).await?;
        Ok(aggregate_client_jobs(&snapshot, &scope, filters))
    }

    pub async fn daily_lineup(
        &self,
        actor: Uuid,
        claimed_role: Option<&str>,
        filters: &ReportFilters,
    ) -> Result<Report<LineupRow>> {
        let (snapshot, scope) = self.snapshot_and_scope(actor, claimed_role).await?;
        Ok(aggregate_daily_lineup(&snapshot, &scope, filters))
    }
}

/// Rows carry their counts; the aggregation fills them in after filtering.
pub trait CountedRow {
    fn counts(&self) -> &ReportCounts;
    fn counts_mut(&mut self) -> &mut ReportCounts;
}

impl CountedRow for JobReportRow {
    fn counts(&self) -> &ReportCounts {
        &self.counts
    }

    fn counts_mut(&mut self) -> &mut ReportCounts {
        &mut self.counts
    }
}

impl CountedRow for LineupRow {
    fn counts(&self) -> &ReportCounts {
        &self.counts
    }

    fn counts_mut(&mut self) -> &mut ReportCounts {
        &mut self.counts
    }
}

struct Directory<'a> {
    users: HashMap<Uuid, &'a User>,
    clients: HashMap<Uuid, &'a Client>,
}

impl<'a> Directory<'a> {
    fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            users: snapshot.users.iter().map(|u| (u.id, u)).collect(),
            clients: snapshot.clients.iter().map(|c| (c.id, c)).collect(),
        }
    }

    fn recruiter(&self, id: Uuid) -> RecruiterRef {
        RecruiterRef {
            id,
            name: self
                .users
                .get(&id)
                .map(|u| u.name.clone())
                .unwrap_or_else(|| UNKNOWN_RECRUITER.to_string()),
        }
    }

    fn client_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.clients.get(&id))
            .map(|c| c.company_name.clone())
    }
}

/// A row before filtering, with the candidates and lookup values the filters
/// inspect.
struct Draft<'a, R> {
    row: R,
    candidates: Vec<&'a Candidate>,
    job_title: String,
    client_id: Option<Uuid>,
    client_name: Option<String>,
    recruiters: Vec<RecruiterRef>,
}

impl<R> Draft<'_, R> {
    fn matches_search(&self, needle: &str) -> bool {
        contains_ignore_case(&self.job_title, needle)
            || self
                .client_name
                .as_deref()
                .is_some_and(|name| contains_ignore_case(name, needle))
            || self
                .recruiters
                .iter()
                .any(|r| contains_ignore_case(&r.name, needle))
            || self
                .candidates
                .iter()
                .filter_map(|c| c.display_name())
                .any(|name| contains_ignore_case(&name, needle))
    }

    /// `counts` are the row's column counts under the active windows, so the
    /// status filter agrees with what the row displays.
    fn matches(&self, filters: &ReportFilters, counts: &ReportCounts) -> bool {
        if let Some(needle) = filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
            if !self.matches_search(needle.trim()) {
                return false;
            }
        }
        if let Some(status) = &filters.status {
            if counts.in_status(status) == 0 {
                return false;
            }
        }
        if let Some(client) = &filters.client {
            if !client.matches(self.client_id, self.client_name.as_deref()) {
                return false;
            }
        }
        if let Some(title) = filters.job_title.as_deref() {
            if !contains_ignore_case(&self.job_title, title) {
                return false;
            }
        }
        if let Some(recruiter) = filters.recruiter {
            if !self.recruiters.iter().any(|r| r.id == recruiter) {
                return false;
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Candidates in `status` that also pass `extra`; when the status window is
/// active the status must have been reached inside it.
fn count_in_status(
    candidates: &[&Candidate],
    status: &CandidateStatus,
    windows: &CountWindows,
    extra: impl Fn(&Candidate) -> bool,
) -> i64 {
    candidates
        .iter()
        .copied()
        .filter(|&c| &c.status == status && extra(c))
        .filter(|&c| {
            !windows.windows_status()
                || windows.admits_status_change(timestamp_resolver::resolve_one(c, status))
        })
        .count() as i64
}

/// Per-column counts for one row's candidates.
pub fn count_candidates(candidates: &[&Candidate], windows: &CountWindows) -> ReportCounts {
    let mut counts = ReportCounts::default();
    for column in ReportColumn::ALL {
        let value = match column.rule() {
            ColumnRule::Total => candidates
                .iter()
                .filter(|c| windows.admits_upload(c.created_at))
                .count() as i64,
            ColumnRule::Status(status) => count_in_status(candidates, &status, windows, |_| true),
            ColumnRule::Attributed(status, party) => {
                count_in_status(candidates, &status, windows, |c| {
                    attribution::matches(c, &status, party)
                })
            }
        };
        counts.set(column, value);
    }
    counts
}

fn finish<R: CountedRow>(drafts: Vec<Draft<'_, R>>, filters: &ReportFilters) -> Report<R> {
    let mut totals = ReportCounts::default();
    let mut mismatched = BTreeSet::new();
    let mut rows = Vec::new();

    for draft in drafts {
        let counts = count_candidates(&draft.candidates, &filters.windows);
        if !draft.matches(filters, &counts) {
            continue;
        }
        let Draft {
            mut row,
            candidates,
            ..
        } = draft;

        for candidate in &candidates {
            if !candidate.status_matches_history() && mismatched.insert(candidate.id) {
                tracing::debug!(
                    candidate_id = %candidate.id,
                    status = candidate.status.label(),
                    "Candidate status differs from its last history entry"
                );
            }
        }

        *row.counts_mut() = counts;
        totals.accumulate(row.counts());
        rows.push(row);
    }

    let total_count = rows.len();
    let limit = filters.limit.max(1) as usize;
    let page = filters.page.max(1);
    let total_pages = total_count.div_ceil(limit);
    let rows = rows
        .into_iter()
        .skip((page as usize - 1) * limit)
        .take(limit)
        .collect();

    Report {
        rows,
        totals,
        total_count,
        total_pages,
        current_page: page,
        data_quality: DataQuality {
            status_mismatches: mismatched.len(),
        },
    }
}

fn visible_candidates<'a>(
    snapshot: &'a Snapshot,
    scope: &'a VisibilityScope,
) -> impl Iterator<Item = &'a Candidate> + 'a {
    snapshot
        .candidates
        .iter()
        .filter(move |c| scope.allows_candidate(c))
}

/// One row per open job the actor can see. The global window selects jobs by
/// their creation date; each row counts the job's candidates over their whole
/// lifetime, subject only to the local count windows.
pub fn aggregate_client_jobs(
    snapshot: &Snapshot,
    scope: &VisibilityScope,
    filters: &ReportFilters,
) -> Report<JobReportRow> {
    let directory = Directory::new(snapshot);

    let mut by_job: HashMap<Uuid, Vec<&Candidate>> = HashMap::new();
    for candidate in visible_candidates(snapshot, scope) {
        if let Some(job_id) = candidate.job_id {
            by_job.entry(job_id).or_default().push(candidate);
        }
    }

    let mut jobs: Vec<&Job> = snapshot
        .jobs
        .iter()
        .filter(|job| job.status.is_open())
        .filter(|job| scope.allows_job(job) || scope.works_on(job))
        .filter(|job| filters.date_range.contains(job.created_at))
        .collect();
    jobs.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.title.cmp(&b.title))
    });

    let drafts = jobs
        .into_iter()
        .map(|job| {
            let lead_recruiter = job.lead_recruiter.map(|id| directory.recruiter(id));
            let assigned_recruiters: Vec<RecruiterRef> = job
                .assigned_recruiters
                .iter()
                .map(|id| directory.recruiter(*id))
                .collect();
            let recruiters = lead_recruiter
                .iter()
                .cloned()
                .chain(assigned_recruiters.iter().cloned())
                .collect();
            let client_name = directory.client_name(job.client_id);

            Draft {
                row: JobReportRow {
                    job_id: job.id,
                    job_title: job.title.clone(),
                    client_id: job.client_id,
                    client_name: client_name.clone(),
                    lead_recruiter,
                    assigned_recruiters,
                    no_of_positions: job.no_of_positions,
                    job_created_at: job.created_at,
                    counts: ReportCounts::default(),
                },
                candidates: by_job.remove(&job.id).unwrap_or_default(),
                job_title: job.title.clone(),
                client_id: job.client_id,
                client_name,
                recruiters,
            }
        })
        .collect();

    let report = finish(drafts, filters);
    tracing::info!(
        actor = %scope.actor(),
        designation = scope.designation().label(),
        total_count = report.total_count,
        page = report.current_page,
        "Client/job report aggregated"
    );
    report
}

/// One row per (uploading recruiter, job, upload date). The global window
/// applies to the upload date here rather than to job creation.
pub fn aggregate_daily_lineup(
    snapshot: &Snapshot,
    scope: &VisibilityScope,
    filters: &ReportFilters,
) -> Report<LineupRow> {
    let directory = Directory::new(snapshot);
    let jobs: HashMap<Uuid, &Job> = snapshot.jobs.iter().map(|j| (j.id, j)).collect();
    let offset = filters.date_range.offset;

    let mut groups: BTreeMap<(NaiveDate, Option<Uuid>, Uuid), Vec<&Candidate>> = BTreeMap::new();
    let mut skipped = 0usize;
    for candidate in visible_candidates(snapshot, scope) {
        let (Some(job_id), Some(created_at)) = (candidate.job_id, candidate.created_at) else {
            skipped += 1;
            continue;
        };
        if !jobs.contains_key(&job_id) {
            skipped += 1;
            continue;
        }
        let date = calendar_date(created_at, offset);
        if !filters.date_range.contains_date(date) {
            continue;
        }
        groups
            .entry((date, candidate.created_by, job_id))
            .or_default()
            .push(candidate);
    }
    if skipped > 0 {
        tracing::debug!(skipped, "Candidates without a known job or upload date left out of lineup");
    }

    let mut drafts: Vec<Draft<'_, LineupRow>> = groups
        .into_iter()
        .filter_map(|((date, recruiter_id, job_id), candidates)| {
            let job = jobs.get(&job_id)?;
            let recruiter = recruiter_id.map(|id| directory.recruiter(id));
            let client_name = directory.client_name(job.client_id);

            Some(Draft {
                row: LineupRow {
                    date,
                    recruiter_id,
                    recruiter_name: recruiter
                        .as_ref()
                        .map(|r| r.name.clone())
                        .unwrap_or_else(|| UNKNOWN_RECRUITER.to_string()),
                    job_id,
                    job_title: job.title.clone(),
                    client_id: job.client_id,
                    client_name: client_name.clone(),
                    counts: ReportCounts::default(),
                },
                candidates,
                job_title: job.title.clone(),
                client_id: job.client_id,
                client_name,
                recruiters: recruiter.into_iter().collect(),
            })
        })
        .collect();

    drafts.sort_by(|a, b| {
        b.row
            .date
            .cmp(&a.row.date)
            .then_with(|| a.row.recruiter_name.cmp(&b.row.recruiter_name))
            .then_with(|| a.row.job_title.cmp(&b.row.job_title))
    });

    let report = finish(drafts, filters);
    tracing::info!(
        actor = %scope.actor(),
        designation = scope.designation().label(),
        total_count = report.total_count,
        page = report.current_page,
        "Daily lineup report aggregated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{Attribution, StatusEntry};
    use crate::models::job::JobStatus;
    use crate::models::report::{DateWindow, LocalFilterMode};
    use crate::models::user::Designation;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use serde_json::{json, Map};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn candidate(status: CandidateStatus, history: &[(CandidateStatus, DateTime<Utc>)]) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            job_id: None,
            created_by: None,
            status,
            status_history: history
                .iter()
                .map(|(status, when)| StatusEntry {
                    status: status.clone(),
                    timestamp: Some(*when),
                    updated_by: None,
                    comment: None,
                })
                .collect(),
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
    fn rejected_columns_split_by_attribution_without_double_counting() {
        let client_side = candidate(
            CandidateStatus::Rejected,
            &[
                (CandidateStatus::Interviewed, at(2024, 1, 5)),
                (CandidateStatus::Rejected, at(2024, 1, 6)),
            ],
        );
        let mentor_side = candidate(
            CandidateStatus::Rejected,
            &[
                (CandidateStatus::Shortlisted, at(2024, 1, 5)),
                (CandidateStatus::Rejected, at(2024, 1, 6)),
            ],
        );
        let unknown = candidate(CandidateStatus::Rejected, &[(CandidateStatus::Rejected, at(2024, 1, 6))]);
        let mut explicit = candidate(CandidateStatus::Dropped, &[(CandidateStatus::Interviewed, at(2024, 1, 5))]);
        explicit.dropped_by = Some(Attribution::Mentor);

        let all = [&client_side, &mentor_side, &unknown, &explicit];
        let counts = count_candidates(&all, &CountWindows::default());

        assert_eq!(counts.get(ReportColumn::Total), 4);
        assert_eq!(counts.get(ReportColumn::RejectedByClient), 1);
        assert_eq!(counts.get(ReportColumn::RejectedByMentor), 1);
        assert_eq!(counts.get(ReportColumn::DroppedByClient), 0);
        assert_eq!(counts.get(ReportColumn::DroppedByMentor), 1);
    }

    #[test]
    fn status_window_uses_resolved_status_date() {
        let mut joined_late = candidate(CandidateStatus::Joined, &[(CandidateStatus::Joined, at(2024, 2, 20))]);
        joined_late.joining_date = Some(at(2024, 3, 1));
        let joined_feb = candidate(CandidateStatus::Joined, &[(CandidateStatus::Joined, at(2024, 2, 10))]);

        let february = DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 2, 1),
            NaiveDate::from_ymd_opt(2024, 2, 29),
            utc(),
        );
        let windows = CountWindows::from_mode(LocalFilterMode::Status, february);
        let counts = count_candidates(&[&joined_late, &joined_feb], &windows);

        assert_eq!(counts.get(ReportColumn::Joined), 1);
        // Total is not windowed in status mode
        assert_eq!(counts.get(ReportColumn::Total), 2);
    }

    #[test]
    fn empty_snapshot_yields_empty_report() {
        let snapshot = Snapshot::default();
        let actor = Uuid::new_v4();
        let scope = VisibilityScope::build(&snapshot.users, &snapshot.jobs, actor, Designation::Admin);
        let filters = ReportFilters::unfiltered(&ReportSettings::default());

        let report = aggregate_client_jobs(&snapshot, &scope, &filters);
        assert!(report.rows.is_empty());
        assert_eq!(report.total_count, 0);
        assert_eq!(report.total_pages, 0);
        assert_eq!(report.totals, ReportCounts::default());

        let lineup = aggregate_daily_lineup(&snapshot, &scope, &filters);
        assert_eq!(lineup.total_pages, 0);
    }

    #[test]
    fn search_matches_candidate_names_under_either_key_casing() {
        let admin = User {
            id: Uuid::new_v4(),
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            designation: Designation::Admin,
            reporter: None,
            is_active: true,
            created_at: None,
        };
        let job = Job {
            id: Uuid::new_v4(),
            title: "Data Analyst".to_string(),
            status: JobStatus::Open,
            client_id: None,
            assigned_recruiters: Vec::new(),
            lead_recruiter: None,
            no_of_positions: 2,
            created_by: Some(admin.id),
            created_at: Some(at(2024, 1, 1)),
        };
        let mut c = candidate(CandidateStatus::New, &[]);
        c.job_id = Some(job.id);
        c.dynamic_fields = json!({ "CandidateName": "Priya Raman" })
            .as_object()
            .cloned()
            .unwrap_or_default();

        let snapshot = Snapshot {
            users: vec![admin.clone()],
            jobs: vec![job],
            clients: Vec::new(),
            candidates: vec![c],
        };
        let scope = VisibilityScope::build(&snapshot.users, &snapshot.jobs, admin.id, Designation::Admin);
        let mut filters = ReportFilters::unfiltered(&ReportSettings::default());

        filters.search = Some("priya".to_string());
        assert_eq!(aggregate_client_jobs(&snapshot, &scope, &filters).total_count, 1);

        filters.search = Some("nobody".to_string());
        assert_eq!(aggregate_client_jobs(&snapshot, &scope, &filters).total_count, 0);
    }

    #[test]
    fn status_filter_follows_attribution_columns() {
        let admin = User {
            id: Uuid::new_v4(),
            name: "Root".to_string(),
            email: "root@example.com".to_string(),
            designation: Designation::Admin,
            reporter: None,
            is_active: true,
            created_at: None,
        };
        let job = Job {
            id: Uuid::new_v4(),
            title: "QA Lead".to_string(),
            status: JobStatus::Open,
            client_id: None,
            assigned_recruiters: Vec::new(),
            lead_recruiter: None,
            no_of_positions: 1,
            created_by: Some(admin.id),
            created_at: Some(at(2024, 1, 1)),
        };
        // rejected with no explicit party and no interview or shortlist on record
        let mut unattributed = candidate(CandidateStatus::Rejected, &[(CandidateStatus::Rejected, at(2024, 1, 9))]);
        unattributed.job_id = Some(job.id);

        let mut snapshot = Snapshot {
            users: vec![admin.clone()],
            jobs: vec![job.clone()],
            clients: Vec::new(),
            candidates: vec![unattributed],
        };
        let scope = VisibilityScope::build(&snapshot.users, &snapshot.jobs, admin.id, Designation::Admin);
        let mut filters = ReportFilters::unfiltered(&ReportSettings::default());
        filters.status = Some(CandidateStatus::Rejected);

        let report = aggregate_client_jobs(&snapshot, &scope, &filters);
        assert_eq!(report.total_count, 0);
        assert_eq!(report.totals.in_status(&CandidateStatus::Rejected), 0);

        let mut by_mentor = candidate(CandidateStatus::Rejected, &[(CandidateStatus::Rejected, at(2024, 1, 9))]);
        by_mentor.job_id = Some(job.id);
        by_mentor.rejected_by = Some(Attribution::Mentor);
        snapshot.candidates.push(by_mentor);

        let report = aggregate_client_jobs(&snapshot, &scope, &filters);
        assert_eq!(report.total_count, 1);
        assert_eq!(report.rows[0].counts.get(ReportColumn::RejectedByMentor), 1);
        assert_eq!(report.totals.in_status(&CandidateStatus::Rejected), 1);
    }
}
