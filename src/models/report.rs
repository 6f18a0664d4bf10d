use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::candidate::{Attribution, CandidateStatus};
use crate::utils::time::calendar_date;

/// A count column of a report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportColumn {
    Total,
    New,
    Shortlisted,
    Interviewed,
    Selected,
    Joined,
    Hold,
    RejectedByClient,
    RejectedByMentor,
    DroppedByClient,
    DroppedByMentor,
}

/// How a column selects candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRule {
    Total,
    Status(CandidateStatus),
    Attributed(CandidateStatus, Attribution),
}

impl ColumnRule {
    /// Candidate status the column counts; `None` for the Total column.
    pub fn status(&self) -> Option<&CandidateStatus> {
        match self {
            ColumnRule::Total => None,
            ColumnRule::Status(status) | ColumnRule::Attributed(status, _) => Some(status),
        }
    }
}

impl ReportColumn {
    pub const ALL: [ReportColumn; 11] = [
        ReportColumn::Total,
        ReportColumn::New,
        ReportColumn::Shortlisted,
        ReportColumn::Interviewed,
        ReportColumn::Selected,
        ReportColumn::Joined,
        ReportColumn::Hold,
        ReportColumn::RejectedByClient,
        ReportColumn::RejectedByMentor,
        ReportColumn::DroppedByClient,
        ReportColumn::DroppedByMentor,
    ];

    pub fn rule(&self) -> ColumnRule {
        match self {
            ReportColumn::Total => ColumnRule::Total,
            ReportColumn::New => ColumnRule::Status(CandidateStatus::New),
            ReportColumn::Shortlisted => ColumnRule::Status(CandidateStatus::Shortlisted),
            ReportColumn::Interviewed => ColumnRule::Status(CandidateStatus::Interviewed),
            ReportColumn::Selected => ColumnRule::Status(CandidateStatus::Selected),
            ReportColumn::Joined => ColumnRule::Status(CandidateStatus::Joined),
            ReportColumn::Hold => ColumnRule::Status(CandidateStatus::Hold),
            ReportColumn::RejectedByClient => {
                ColumnRule::Attributed(CandidateStatus::Rejected, Attribution::Client)
            }
            ReportColumn::RejectedByMentor => {
                ColumnRule::Attributed(CandidateStatus::Rejected, Attribution::Mentor)
            }
            ReportColumn::DroppedByClient => {
                ColumnRule::Attributed(CandidateStatus::Dropped, Attribution::Client)
            }
            ReportColumn::DroppedByMentor => {
                ColumnRule::Attributed(CandidateStatus::Dropped, Attribution::Mentor)
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportColumn::Total => "Total",
            ReportColumn::New => "New",
            ReportColumn::Shortlisted => "Shortlisted",
            ReportColumn::Interviewed => "Interviewed",
            ReportColumn::Selected => "Selected",
            ReportColumn::Joined => "Joined",
            ReportColumn::Hold => "Hold",
            ReportColumn::RejectedByClient => "Rejected (Client)",
            ReportColumn::RejectedByMentor => "Rejected (Mentor)",
            ReportColumn::DroppedByClient => "Dropped (Client)",
            ReportColumn::DroppedByMentor => "Dropped (Mentor)",
        }
    }
}

/// Per-column counts. Every column is always present, zero included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReportCounts(BTreeMap<ReportColumn, i64>);

impl Default for ReportCounts {
    fn default() -> Self {
        Self(ReportColumn::ALL.iter().map(|c| (*c, 0)).collect())
    }
}

impl ReportCounts {
    pub fn get(&self, column: ReportColumn) -> i64 {
        self.0.get(&column).copied().unwrap_or(0)
    }

    pub fn set(&mut self, column: ReportColumn, value: i64) {
        self.0.insert(column, value);
    }

    /// Sum of the columns counting `status`. Rejected and Dropped span their
    /// two attribution columns; a status without a column sums to zero.
    pub fn in_status(&self, status: &CandidateStatus) -> i64 {
        ReportColumn::ALL
            .iter()
            .filter(|column| column.rule().status() == Some(status))
            .map(|column| self.get(*column))
            .sum()
    }

    pub fn accumulate(&mut self, other: &ReportCounts) {
        for column in ReportColumn::ALL {
            *self.0.entry(column).or_insert(0) += other.get(column);
        }
    }
}

/// Inclusive calendar-date window evaluated in a fixed offset. A missing
/// bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub offset: FixedOffset,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>, offset: FixedOffset) -> Self {
        Self { start, end, offset }
    }

    pub fn unbounded(offset: FixedOffset) -> Self {
        Self::new(None, None, offset)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }

    /// An unknown instant only passes a fully open window.
    pub fn contains(&self, instant: Option<DateTime<Utc>>) -> bool {
        match instant {
            Some(at) => self.contains_date(calendar_date(at, self.offset)),
            None => self.is_unbounded(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalFilterMode {
    #[default]
    None,
    Total,
    Status,
    Both,
}

impl LocalFilterMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Some(LocalFilterMode::None),
            "total" => Some(LocalFilterMode::Total),
            "status" => Some(LocalFilterMode::Status),
            "both" => Some(LocalFilterMode::Both),
            _ => None,
        }
    }
}

/// The per-column (local) date axis, independent of the report's global
/// window. `total` windows the Total column by upload date, `status` windows
/// status columns by the resolved status-change date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountWindows {
    pub total: Option<DateWindow>,
    pub status: Option<DateWindow>,
}

impl CountWindows {
    pub fn from_mode(mode: LocalFilterMode, range: DateWindow) -> Self {
        match mode {
            LocalFilterMode::None => Self::default(),
            LocalFilterMode::Total => Self {
                total: Some(range),
                status: None,
            },
            LocalFilterMode::Status => Self {
                total: None,
                status: Some(range),
            },
            LocalFilterMode::Both => Self {
                total: Some(range),
                status: Some(range),
            },
        }
    }

    pub fn admits_upload(&self, created_at: Option<DateTime<Utc>>) -> bool {
        self.total.map_or(true, |window| window.contains(created_at))
    }

    pub fn windows_status(&self) -> bool {
        self.status.is_some()
    }

    pub fn admits_status_change(&self, changed_at: Option<DateTime<Utc>>) -> bool {
        self.status.map_or(true, |window| window.contains(changed_at))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFilter {
    Id(Uuid),
    Name(String),
}

impl ClientFilter {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) => ClientFilter::Id(id),
            Err(_) => ClientFilter::Name(raw.trim().to_string()),
        }
    }

    pub fn matches(&self, client_id: Option<Uuid>, company_name: Option<&str>) -> bool {
        match self {
            ClientFilter::Id(id) => client_id == Some(*id),
            ClientFilter::Name(name) => company_name.is_some_and(|n| n.eq_ignore_ascii_case(name)),
        }
    }
}

/// Validated report request.
#[derive(Debug, Clone)]
pub struct ReportFilters {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<CandidateStatus>,
    pub client: Option<ClientFilter>,
    pub job_title: Option<String>,
    pub recruiter: Option<Uuid>,
    pub date_range: DateWindow,
    pub windows: CountWindows,
}

impl ReportFilters {
    pub fn unfiltered(settings: &ReportSettings) -> Self {
        Self {
            page: 1,
            limit: settings.default_limit,
            search: None,
            status: None,
            client: None,
            job_title: None,
            recruiter: None,
            date_range: DateWindow::unbounded(settings.utc_offset),
            windows: CountWindows::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportSettings {
    pub default_limit: u32,
    pub max_limit: u32,
    pub utc_offset: FixedOffset,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            utc_offset: Utc.fix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecruiterRef {
    pub id: Uuid,
    pub name: String,
}

/// One open job of the client/job report.
#[derive(Debug, Clone, Serialize)]
pub struct JobReportRow {
    pub job_id: Uuid,
    pub job_title: String,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub lead_recruiter: Option<RecruiterRef>,
    pub assigned_recruiters: Vec<RecruiterRef>,
    pub no_of_positions: i32,
    pub job_created_at: Option<DateTime<Utc>>,
    pub counts: ReportCounts,
}

/// One (recruiter, job, upload date) group of the daily lineup report.
#[derive(Debug, Clone, Serialize)]
pub struct LineupRow {
    pub date: NaiveDate,
    pub recruiter_id: Option<Uuid>,
    pub recruiter_name: String,
    pub job_id: Uuid,
    pub job_title: String,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub counts: ReportCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub status_mismatches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report<R> {
    pub rows: Vec<R>,
    pub totals: ReportCounts,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: u32,
    pub data_quality: DataQuality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_status_sums_the_columns_counting_that_status() {
        let mut counts = ReportCounts::default();
        counts.set(ReportColumn::Total, 9);
        counts.set(ReportColumn::Joined, 2);
        counts.set(ReportColumn::RejectedByClient, 3);
        counts.set(ReportColumn::RejectedByMentor, 1);
        counts.set(ReportColumn::DroppedByMentor, 4);

        assert_eq!(counts.in_status(&CandidateStatus::Joined), 2);
        assert_eq!(counts.in_status(&CandidateStatus::Rejected), 4);
        assert_eq!(counts.in_status(&CandidateStatus::Dropped), 4);
        assert_eq!(counts.in_status(&CandidateStatus::New), 0);
        assert_eq!(counts.in_status(&CandidateStatus::Other("Offer".to_string())), 0);
    }
}
