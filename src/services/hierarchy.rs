use std::collections::BTreeSet;

use uuid::Uuid;

use crate::models::user::{Designation, User};

/// Resolves whose work a user may see from the `reporter` tree.
///
/// The tree is walked a fixed number of hops (Manager -> Mentor -> Recruiter)
/// rather than recursively, so a malformed cycle in stored data cannot expand
/// or hang the resolution.
pub struct OrgHierarchyResolver<'a> {
    users: &'a [User],
}

impl<'a> OrgHierarchyResolver<'a> {
    pub fn new(users: &'a [User]) -> Self {
        Self { users }
    }

    pub fn find(&self, user_id: Uuid) -> Option<&'a User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// Direct reports of `reporter` holding `designation`.
    fn reports_of(&self, reporter: Uuid, designation: Designation) -> impl Iterator<Item = Uuid> + 'a {
        let users = self.users;
        users
            .iter()
            .filter(move |u| u.reporter == Some(reporter) && u.designation == designation)
            .map(|u| u.id)
    }

    pub fn resolve(&self, user_id: Uuid, designation: Designation) -> BTreeSet<Uuid> {
        let mut visible = BTreeSet::from([user_id]);

        if self.find(user_id).is_none() {
            tracing::warn!(%user_id, "Actor not found in user directory, restricting visibility to self");
            return visible;
        }

        match designation {
            Designation::Admin => {
                visible.extend(self.users.iter().map(|u| u.id));
            }
            Designation::Manager => {
                let mentors: Vec<Uuid> = self.reports_of(user_id, Designation::Mentor).collect();
                for mentor in &mentors {
                    visible.extend(self.reports_of(*mentor, Designation::Recruiter));
                }
                visible.extend(mentors);
            }
            Designation::Mentor => {
                visible.extend(self.reports_of(user_id, Designation::Recruiter));
            }
            Designation::Recruiter | Designation::Finance | Designation::Other => {}
        }

        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(designation: Designation, reporter: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            name: format!("{:?}", designation),
            email: "someone@example.com".to_string(),
            designation,
            reporter,
            is_active: true,
            created_at: None,
        }
    }

    struct Org {
        users: Vec<User>,
        manager: Uuid,
        mentor_a: Uuid,
        mentor_b: Uuid,
        recruiter_a1: Uuid,
        recruiter_a2: Uuid,
        recruiter_b1: Uuid,
    }

    fn org() -> Org {
        let admin = user(Designation::Admin, None);
        let manager = user(Designation::Manager, Some(admin.id));
        let other_manager = user(Designation::Manager, Some(admin.id));
        let mentor_a = user(Designation::Mentor, Some(manager.id));
        let mentor_b = user(Designation::Mentor, Some(manager.id));
        let foreign_mentor = user(Designation::Mentor, Some(other_manager.id));
        let recruiter_a1 = user(Designation::Recruiter, Some(mentor_a.id));
        let recruiter_a2 = user(Designation::Recruiter, Some(mentor_a.id));
        let recruiter_b1 = user(Designation::Recruiter, Some(mentor_b.id));
        let foreign_recruiter = user(Designation::Recruiter, Some(foreign_mentor.id));
        // reports straight to the manager, skipping the mentor level
        let direct_recruiter = user(Designation::Recruiter, Some(manager.id));
        // a level below recruiters is never reached
        let deep = user(Designation::Recruiter, Some(recruiter_a1.id));

        Org {
            manager: manager.id,
            mentor_a: mentor_a.id,
            mentor_b: mentor_b.id,
            recruiter_a1: recruiter_a1.id,
            recruiter_a2: recruiter_a2.id,
            recruiter_b1: recruiter_b1.id,
            users: vec![
                admin,
                manager,
                other_manager,
                mentor_a,
                mentor_b,
                foreign_mentor,
                recruiter_a1,
                recruiter_a2,
                recruiter_b1,
                foreign_recruiter,
                direct_recruiter,
                deep,
            ],
        }
    }

    #[test]
    fn manager_sees_two_hops_exactly() {
        let org = org();
        let resolver = OrgHierarchyResolver::new(&org.users);

        let visible = resolver.resolve(org.manager, Designation::Manager);
        let expected = BTreeSet::from([
            org.manager,
            org.mentor_a,
            org.mentor_b,
            org.recruiter_a1,
            org.recruiter_a2,
            org.recruiter_b1,
        ]);
        assert_eq!(visible, expected);
    }

    #[test]
    fn mentor_sees_own_recruiters() {
        let org = org();
        let resolver = OrgHierarchyResolver::new(&org.users);

        let visible = resolver.resolve(org.mentor_a, Designation::Mentor);
        assert_eq!(
            visible,
            BTreeSet::from([org.mentor_a, org.recruiter_a1, org.recruiter_a2])
        );
    }

    #[test]
    fn recruiter_and_unknown_roles_see_only_themselves() {
        let org = org();
        let resolver = OrgHierarchyResolver::new(&org.users);

        for designation in [Designation::Recruiter, Designation::Finance, Designation::Other] {
            assert_eq!(
                resolver.resolve(org.recruiter_a1, designation),
                BTreeSet::from([org.recruiter_a1])
            );
        }
        // a mentor's id resolved with a recruiter designation does not expand
        assert_eq!(
            resolver.resolve(org.mentor_a, Designation::Recruiter),
            BTreeSet::from([org.mentor_a])
        );
    }

    #[test]
    fn admin_sees_everyone() {
        let org = org();
        let resolver = OrgHierarchyResolver::new(&org.users);
        let admin = org.users[0].id;

        let visible = resolver.resolve(admin, Designation::Admin);
        assert_eq!(visible.len(), org.users.len());
    }

    #[test]
    fn unknown_actor_fails_closed() {
        let org = org();
        let resolver = OrgHierarchyResolver::new(&org.users);
        let stranger = Uuid::new_v4();

        assert_eq!(
            resolver.resolve(stranger, Designation::Admin),
            BTreeSet::from([stranger])
        );
        assert_eq!(
            resolver.resolve(stranger, Designation::Manager),
            BTreeSet::from([stranger])
        );
    }

    #[test]
    fn reporter_cycle_does_not_loop() {
        let mut a = user(Designation::Mentor, None);
        let mut b = user(Designation::Recruiter, None);
        a.reporter = Some(b.id);
        b.reporter = Some(a.id);
        let users = vec![a.clone(), b.clone()];
        let resolver = OrgHierarchyResolver::new(&users);

        assert_eq!(
            resolver.resolve(a.id, Designation::Mentor),
            BTreeSet::from([a.id, b.id])
        );
    }
}
