use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Open,
    Closed,
    OnHold,
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("open") {
            JobStatus::Open
        } else if value.eq_ignore_ascii_case("closed") {
            JobStatus::Closed
        } else if value.eq_ignore_ascii_case("on hold")
            || value.eq_ignore_ascii_case("onhold")
            || value.eq_ignore_ascii_case("hold")
        {
            JobStatus::OnHold
        } else {
            JobStatus::Other(value.to_string())
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, JobStatus::Open)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub status: JobStatus,
    pub client_id: Option<Uuid>,
    pub assigned_recruiters: Vec<Uuid>,
    pub lead_recruiter: Option<Uuid>,
    pub no_of_positions: i32,
    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Job {
    /// True when the user leads the job or is one of its assigned recruiters.
    pub fn is_staffed_by(&self, user_id: Uuid) -> bool {
        self.lead_recruiter == Some(user_id) || self.assigned_recruiters.contains(&user_id)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub client_id: Option<Uuid>,
    pub assigned_recruiters: Option<Vec<Uuid>>,
    pub lead_recruiter: Option<Uuid>,
    pub no_of_positions: Option<i32>,
    pub created_by: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<JobRecord> for Job {
    fn from(value: JobRecord) -> Self {
        Self {
            id: value.id,
            title: value.title,
            status: JobStatus::parse(&value.status),
            client_id: value.client_id,
            assigned_recruiters: value.assigned_recruiters.unwrap_or_default(),
            lead_recruiter: value.lead_recruiter,
            no_of_positions: value.no_of_positions.unwrap_or(0),
            created_by: value.created_by,
            created_at: value.created_at,
        }
    }
}
