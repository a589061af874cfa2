use rust_decimal::Decimal;
use sentrywear_backend::models::user::Role;
use sentrywear_backend::models::vital::Vital;
use sentrywear_backend::services::event_bus::EventBus;
use uuid::Uuid;

fn sample_vital(device_id: Uuid) -> Vital {
    Vital {
        id: Uuid::new_v4(),
        device_id,
        timestamp: chrono::Utc::now().naive_utc(),
        heart_rate: Some(88),
        spo2: Some(97),
        temperature: Some(Decimal::new(370, 1)),
        latitude: None,
        longitude: None,
        gps_accuracy: None,
        fall_detected: false,
        co: None,
        h2s: None,
        ch4: None,
    }
}

#[tokio::test]
async fn vital_update_reaches_owner_and_supervisors_but_not_other_employees() {
    let bus = EventBus::new();
    let employee_id = Uuid::new_v4();
    let other_employee_id = Uuid::new_v4();

    let mut employee_handle = bus.register(employee_id, Role::Employee, "worker-1".to_string()).await;
    let supervisor_handle = bus.register(Uuid::new_v4(), Role::Supervisor, "lead".to_string()).await;
    let mut other_handle = bus.register(other_employee_id, Role::Employee, "worker-2".to_string()).await;

    bus.join_room(employee_handle.connection_id, &format!("vitals_{employee_id}")).await;

    let vital = sample_vital(Uuid::new_v4());
    bus.publish_vital_update(employee_id, &vital).await;

    let received = employee_handle.receiver.try_recv().expect("owner should receive its own vital update");
    assert_eq!(received.event, "vital_update");

    let mut supervisor_receiver = supervisor_handle.receiver;
    let supervisor_received = supervisor_receiver.try_recv().expect("supervisors room should receive every vital update");
    assert_eq!(supervisor_received.event, "vital_update");

    assert!(other_handle.receiver.try_recv().is_err());
}

#[tokio::test]
async fn critical_alert_fans_out_an_extra_event_to_supervisors() {
    use sentrywear_backend::models::alert::{Alert, AlertType, Severity};

    let bus = EventBus::new();
    let supervisor_handle = bus.register(Uuid::new_v4(), Role::Supervisor, "lead".to_string()).await;
    let mut receiver = supervisor_handle.receiver;

    let alert = Alert {
        id: Uuid::new_v4(),
        device_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        alert_type: AlertType::Co,
        severity: Severity::Critical,
        message: "co above critical threshold".to_string(),
        value: Some(Decimal::new(250, 0)),
        threshold: Some(Decimal::new(200, 0)),
        acknowledged: false,
        acknowledged_by: None,
        acknowledged_at: None,
        resolved: false,
        resolved_at: None,
        timestamp: chrono::Utc::now().naive_utc(),
    };

    bus.publish_alert_created(&alert).await;

    let first = receiver.try_recv().expect("new_alert event");
    assert_eq!(first.event, "new_alert");

    let second = receiver.try_recv().expect("critical_alert follow-up event");
    assert_eq!(second.event, "critical_alert");
}

#[tokio::test]
async fn deregister_notifies_supervisors_of_employee_disconnect() {
    let bus = EventBus::new();
    let supervisor_handle = bus.register(Uuid::new_v4(), Role::Supervisor, "lead".to_string()).await;
    let mut receiver = supervisor_handle.receiver;

    let employee_handle = bus.register(Uuid::new_v4(), Role::Employee, "worker".to_string()).await;
    bus.deregister(employee_handle.connection_id).await;

    let notification = receiver.try_recv().expect("employee_disconnected event");
    assert_eq!(notification.event, "employee_disconnected");
}
