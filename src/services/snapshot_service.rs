use crate::error::Result;
use crate::models::candidate::{Candidate, CandidateRecord};
use crate::models::client::Client;
use crate::models::job::{Job, JobRecord};
use crate::models::user::{User, UserRecord};
use sqlx::PgPool;

/// The four collections a report is computed over, as read at request time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub jobs: Vec<Job>,
    pub clients: Vec<Client>,
    pub candidates: Vec<Candidate>,
}

/// Read-only adapter over the recruitment tables. The reads are independent
/// and not wrapped in a transaction; a concurrent write between them can show
/// up as a mix of old and new state, which reports tolerate.
#[derive(Clone)]
pub struct SnapshotService {
    pool: PgPool,
}

impl SnapshotService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn load_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, designation, reporter, is_active, created_at
            FROM users
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn load_jobs(&self) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRecord>(
            r#"
            SELECT id, title, status, client_id, assigned_recruiters, lead_recruiter,
                   no_of_positions, created_by, created_at
            FROM jobs
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn load_clients(&self) -> Result<Vec<Client>> {
        let rows = sqlx::query_as::<_, Client>("SELECT id, company_name FROM clients")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn load_candidates(&self) -> Result<Vec<Candidate>> {
        let rows = sqlx::query_as::<_, CandidateRecord>(
            r#"
            SELECT id, job_id, created_by, status, status_history, interview_stage_history,
                   joining_date, selection_date, rejected_by, dropped_by, dynamic_fields, created_at
            FROM candidates
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn load(&self) -> Result<Snapshot> {
        let (users, jobs, clients, candidates) = tokio::try_join!(
            self.load_users(),
            self.load_jobs(),
            self.load_clients(),
            self.load_candidates(),
        )?;

        tracing::debug!(
            users = users.len(),
            jobs = jobs.len(),
            clients = clients.len(),
            candidates = candidates.len(),
            "Loaded report snapshot"
        );

        Ok(Snapshot {
            users,
            jobs,
            clients,
            candidates,
        })
    }
}
