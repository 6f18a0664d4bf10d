use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::candidate::CandidateStatus;
use crate::models::report::{
    ClientFilter, CountWindows, DateWindow, JobReportRow, LineupRow, LocalFilterMode, Report,
    ReportFilters, ReportSettings,
};
use crate::services::visibility::VisibleIds;
use crate::utils::time::parse_date_param;

/// Query string shared by both report endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// 1-based page number
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    /// Rows per page, clamped to the configured maximum
    #[validate(range(min = 1))]
    pub limit: Option<u32>,
    /// Matches job title, client, recruiter or candidate name
    #[validate(length(max = 200))]
    pub search: Option<String>,
    /// Keep rows counting at least one candidate in this status
    pub status: Option<String>,
    /// Client id or company name
    pub client: Option<String>,
    /// Job title substring
    #[validate(length(max = 200))]
    pub job_title: Option<String>,
    /// Recruiter user id
    pub recruiter: Option<String>,
    /// Start of the report range (job opened, or lineup upload day)
    pub start_date: Option<String>,
    /// End of the report range
    pub end_date: Option<String>,
    /// none, total, status or both
    pub local_filter_mode: Option<String>,
    /// Start of the count window
    pub local_start_date: Option<String>,
    /// End of the count window
    pub local_end_date: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn date_window(
    start: &Option<String>,
    end: &Option<String>,
    label: &str,
    settings: &ReportSettings,
) -> Result<DateWindow> {
    let parse = |raw: Option<&str>, field: &str| -> Result<_> {
        raw.map(|value| {
            parse_date_param(value, settings.utc_offset)
                .ok_or_else(|| Error::BadRequest(format!("Invalid {} '{}'", field, value)))
        })
        .transpose()
    };
    let start = parse(non_empty(start), &format!("{} start date", label))?;
    let end = parse(non_empty(end), &format!("{} end date", label))?;

    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(Error::BadRequest(format!(
                "{} start date {} is after end date {}",
                label, s, e
            )));
        }
    }
    Ok(DateWindow::new(start, end, settings.utc_offset))
}

impl ReportQuery {
    pub fn into_filters(self, settings: &ReportSettings) -> Result<ReportFilters> {
        self.validate()?;

        let mode = match non_empty(&self.local_filter_mode) {
            Some(raw) => LocalFilterMode::parse(raw).ok_or_else(|| {
                Error::BadRequest(format!(
                    "Unknown local_filter_mode '{}', expected none, total, status or both",
                    raw
                ))
            })?,
            None => LocalFilterMode::None,
        };

        let recruiter = non_empty(&self.recruiter)
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map_err(|_| Error::BadRequest(format!("Invalid recruiter id '{}'", raw)))
            })
            .transpose()?;

        let date_range = date_window(&self.start_date, &self.end_date, "report", settings)?;
        let local_range = date_window(&self.local_start_date, &self.local_end_date, "local", settings)?;

        Ok(ReportFilters {
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(settings.default_limit)
                .clamp(1, settings.max_limit.max(1)),
            search: non_empty(&self.search).map(str::to_string),
            status: non_empty(&self.status).map(CandidateStatus::parse),
            client: non_empty(&self.client).map(ClientFilter::parse),
            job_title: non_empty(&self.job_title).map(str::to_string),
            recruiter,
            date_range,
            windows: CountWindows::from_mode(mode, local_range),
        })
    }
}

pub type ClientJobReportResponse = Report<JobReportRow>;
pub type DailyLineupResponse = Report<LineupRow>;
pub type VisibleIdsResponse = VisibleIds;
