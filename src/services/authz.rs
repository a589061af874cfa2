use uuid::Uuid;

use crate::middleware::AuthContext;
use crate::models::user::Role;

/// Action a caller is attempting, independent of transport (HTTP or
/// socket command). The authorisation predicate in this module is the
/// single source of truth consumed by both facades (spec section 4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Mutate,
    AcknowledgeAlert,
    ResolveAlert,
    AssignCompliance,
    ReviewCompliance,
    BulkCleanup,
    OverrideAttendance,
}

/// The resource a caller is acting on. `owner_id` is `None` for resources
/// with no single owner (e.g. system-wide aggregates), which only
/// supervisors may read.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub owner_id: Option<Uuid>,
}

impl Target {
    pub fn owned_by(user_id: Uuid) -> Self {
        Self { owner_id: Some(user_id) }
    }

    pub fn unowned() -> Self {
        Self { owner_id: None }
    }
}

/// Employees may read/mutate only resources they own; supervisors read
/// everything and are the only actors permitted for destructive or
/// policy operations (spec section 4.B).
pub fn allow(action: Action, actor: &AuthContext, target: Target) -> bool {
    match action {
        Action::ResolveAlert | Action::AssignCompliance | Action::ReviewCompliance | Action::BulkCleanup | Action::OverrideAttendance => {
            actor.role.is_supervisor()
        }
        Action::Read | Action::Mutate | Action::AcknowledgeAlert => match target.owner_id {
            Some(owner_id) => actor.role.is_supervisor() || owner_id == actor.user_id,
            None => actor.role.is_supervisor(),
        },
    }
}

pub fn require_supervisor(role: Role) -> bool {
    role.is_supervisor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(user_id: Uuid, role: Role) -> AuthContext {
        AuthContext {
            user_id,
            email: "test@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn employee_may_act_on_own_resource() {
        let me = Uuid::new_v4();
        let actor = ctx(me, Role::Employee);
        assert!(allow(Action::Read, &actor, Target::owned_by(me)));
        assert!(allow(Action::AcknowledgeAlert, &actor, Target::owned_by(me)));
    }

    #[test]
    fn employee_may_not_act_on_others_resource() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let actor = ctx(me, Role::Employee);
        assert!(!allow(Action::Read, &actor, Target::owned_by(other)));
        assert!(!allow(Action::AcknowledgeAlert, &actor, Target::owned_by(other)));
    }

    #[test]
    fn only_supervisor_resolves_alerts() {
        let me = Uuid::new_v4();
        let employee = ctx(me, Role::Employee);
        let supervisor = ctx(me, Role::Supervisor);
        assert!(!allow(Action::ResolveAlert, &employee, Target::owned_by(me)));
        assert!(allow(Action::ResolveAlert, &supervisor, Target::owned_by(me)));
    }

    #[test]
    fn unowned_target_requires_supervisor() {
        let me = Uuid::new_v4();
        let employee = ctx(me, Role::Employee);
        let supervisor = ctx(me, Role::Supervisor);
        assert!(!allow(Action::Read, &employee, Target::unowned()));
        assert!(allow(Action::Read, &supervisor, Target::unowned()));
    }
}
