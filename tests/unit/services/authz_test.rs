use sentrywear_backend::middleware::AuthContext;
use sentrywear_backend::models::user::Role;
use sentrywear_backend::services::authz::{allow, Action, Target};
use uuid::Uuid;

fn actor(role: Role, user_id: Uuid) -> AuthContext {
    AuthContext { user_id, email: "actor@example.com".to_string(), role }
}

#[test]
fn employee_may_acknowledge_their_own_alert() {
    let user_id = Uuid::new_v4();
    let employee = actor(Role::Employee, user_id);
    assert!(allow(Action::AcknowledgeAlert, &employee, Target::owned_by(user_id)));
}

#[test]
fn employee_may_not_acknowledge_someone_elses_alert() {
    let employee = actor(Role::Employee, Uuid::new_v4());
    assert!(!allow(Action::AcknowledgeAlert, &employee, Target::owned_by(Uuid::new_v4())));
}

#[test]
fn employee_may_not_resolve_alerts_even_their_own() {
    let user_id = Uuid::new_v4();
    let employee = actor(Role::Employee, user_id);
    assert!(!allow(Action::ResolveAlert, &employee, Target::owned_by(user_id)));
}

#[test]
fn supervisor_may_resolve_any_alert() {
    let supervisor = actor(Role::Supervisor, Uuid::new_v4());
    assert!(allow(Action::ResolveAlert, &supervisor, Target::owned_by(Uuid::new_v4())));
}

#[test]
fn only_supervisors_may_read_unowned_aggregates() {
    let employee = actor(Role::Employee, Uuid::new_v4());
    let supervisor = actor(Role::Supervisor, Uuid::new_v4());

    assert!(!allow(Action::Read, &employee, Target::unowned()));
    assert!(allow(Action::Read, &supervisor, Target::unowned()));
}

#[test]
fn bulk_cleanup_and_compliance_review_are_supervisor_only() {
    let employee = actor(Role::Employee, Uuid::new_v4());
    let supervisor = actor(Role::Supervisor, Uuid::new_v4());

    assert!(!allow(Action::BulkCleanup, &employee, Target::unowned()));
    assert!(allow(Action::BulkCleanup, &supervisor, Target::unowned()));

    assert!(!allow(Action::ReviewCompliance, &employee, Target::unowned()));
    assert!(allow(Action::ReviewCompliance, &supervisor, Target::unowned()));

    assert!(!allow(Action::AssignCompliance, &employee, Target::unowned()));
    assert!(allow(Action::AssignCompliance, &supervisor, Target::unowned()));
}
