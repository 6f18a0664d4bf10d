use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::user::{Designation, User};
use crate::services::hierarchy::OrgHierarchyResolver;

/// What an actor may access: the creators whose uploads they see plus, for
/// mentors and managers, the jobs they are staffed on.
#[derive(Debug, Clone)]
pub struct VisibilityScope {
    actor: Uuid,
    designation: Designation,
    unrestricted: bool,
    allowed_creators: BTreeSet<Uuid>,
    assigned_job_ids: BTreeSet<Uuid>,
}

/// Actor-facing summary of a scope.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleIds {
    pub actor: Uuid,
    pub designation: Designation,
    pub unrestricted: bool,
    pub user_ids: BTreeSet<Uuid>,
    pub assigned_job_ids: BTreeSet<Uuid>,
}

impl VisibilityScope {
    pub fn build(users: &[User], jobs: &[Job], actor: Uuid, designation: Designation) -> Self {
        let resolver = OrgHierarchyResolver::new(users);
        let known_actor = resolver.find(actor).is_some();
        let allowed_creators = resolver.resolve(actor, designation);

        // a plain recruiter's visibility stays limited to their own uploads,
        // even on jobs shared with peers
        let assigned_job_ids = if known_actor && designation.receives_assignment_grant() {
            jobs.iter()
                .filter(|job| job.is_staffed_by(actor))
                .map(|job| job.id)
                .collect()
        } else {
            BTreeSet::new()
        };

        Self {
            actor,
            designation,
            unrestricted: known_actor && designation == Designation::Admin,
            allowed_creators,
            assigned_job_ids,
        }
    }

    /// Scope for an authenticated actor. The stored designation is
    /// authoritative; the token's claimed role only stands in when the actor
    /// has no user record, in which case resolution fails closed anyway.
    pub fn for_actor(users: &[User], jobs: &[Job], actor: Uuid, claimed_role: Option<&str>) -> Self {
        let designation = users
            .iter()
            .find(|u| u.id == actor)
            .map(|u| u.designation)
            .or_else(|| claimed_role.map(Designation::parse))
            .unwrap_or(Designation::Other);
        Self::build(users, jobs, actor, designation)
    }

    pub fn actor(&self) -> Uuid {
        self.actor
    }

    pub fn designation(&self) -> Designation {
        self.designation
    }

    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    pub fn allowed_creators(&self) -> &BTreeSet<Uuid> {
        &self.allowed_creators
    }

    pub fn allows_candidate(&self, candidate: &Candidate) -> bool {
        if self.unrestricted {
            return true;
        }
        let by_creator = candidate
            .created_by
            .is_some_and(|creator| self.allowed_creators.contains(&creator));
        let by_assignment = candidate
            .job_id
            .is_some_and(|job_id| self.assigned_job_ids.contains(&job_id));
        by_creator || by_assignment
    }

    pub fn allows_job(&self, job: &Job) -> bool {
        if self.unrestricted {
            return true;
        }
        job.created_by
            .is_some_and(|creator| self.allowed_creators.contains(&creator))
    }

    /// The actor leads or is assigned to the job, whatever their designation.
    pub fn works_on(&self, job: &Job) -> bool {
        job.is_staffed_by(self.actor)
    }

    pub fn visible_ids(&self) -> VisibleIds {
        VisibleIds {
            actor: self.actor,
            designation: self.designation,
            unrestricted: self.unrestricted,
            user_ids: self.allowed_creators.clone(),
            assigned_job_ids: self.assigned_job_ids.clone(),
        }
    }
}
