use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::models::alert::Alert;
use crate::models::attendance::AttendanceDay;
use crate::models::user::Role;
use crate::models::vital::Vital;

/// Bounded so a slow subscriber cannot grow memory without limit; overflow
/// drops the oldest message for that subscriber (spec section 5).
const OUTBOUND_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub event: String,
    pub payload: Value,
}

impl OutboundMessage {
    pub fn new(event: &str, payload: Value) -> Self {
        Self {
            event: event.to_string(),
            payload,
        }
    }

    pub fn to_wire_json(&self) -> Value {
        json!({
            "event": self.event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "data": self.payload,
        })
    }
}

struct Connection {
    user_id: Uuid,
    role: Role,
    display_name: String,
    sender: mpsc::Sender<OutboundMessage>,
    location_sharing: bool,
    dropped_count: AtomicU64,
    last_seen: Instant,
}

/// In-memory graph of connections and rooms (spec section 4.G /
/// section 9 re-architecture guidance): two adjacency sets keyed by
/// stable ids, a single `RwLock` serialising every mutation. Join/leave
/// and publish iteration are the only mutators.
pub struct EventBusInner {
    connections: RwLock<HashMap<Uuid, Connection>>,
    rooms: RwLock<HashMap<String, HashSet<Uuid>>>,
}

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ConnectionHandle {
    pub connection_id: Uuid,
    pub receiver: mpsc::Receiver<OutboundMessage>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                connections: RwLock::new(HashMap::new()),
                rooms: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Registers a new authenticated connection and joins its default
    /// rooms: `user_{own_id}` plus the role room (spec section 4.G).
    pub async fn register(&self, user_id: Uuid, role: Role, display_name: String) -> ConnectionHandle {
        let connection_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);

        let connection = Connection {
            user_id,
            role,
            display_name,
            sender: tx,
            location_sharing: false,
            dropped_count: AtomicU64::new(0),
            last_seen: Instant::now(),
        };

        self.inner.connections.write().await.insert(connection_id, connection);

        self.join_room(connection_id, &format!("user_{user_id}")).await;
        self.join_room(connection_id, role_room(role)).await;

        ConnectionHandle { connection_id, receiver: rx }
    }

    /// Removes a connection from every room it belongs to and, if it was
    /// an employee, fans out `EmployeeDisconnected` to supervisors.
    pub async fn deregister(&self, connection_id: Uuid) {
        let removed = self.inner.connections.write().await.remove(&connection_id);

        let mut rooms = self.inner.rooms.write().await;
        for members in rooms.values_mut() {
            members.remove(&connection_id);
        }
        rooms.retain(|_, members| !members.is_empty());
        drop(rooms);

        if let Some(connection) = removed {
            if connection.role == Role::Employee {
                self.publish_to_room(
                    "supervisors",
                    OutboundMessage::new(
                        "employee_disconnected",
                        json!({ "user_id": connection.user_id, "display_name": connection.display_name }),
                    ),
                )
                .await;
            }
        }
    }

    pub async fn join_room(&self, connection_id: Uuid, room: &str) {
        self.inner
            .rooms
            .write()
            .await
            .entry(room.to_string())
            .or_default()
            .insert(connection_id);
    }

    pub async fn leave_room(&self, connection_id: Uuid, room: &str) {
        let mut rooms = self.inner.rooms.write().await;
        if let Some(members) = rooms.get_mut(room) {
            members.remove(&connection_id);
            if members.is_empty() {
                rooms.remove(room);
            }
        }
    }

    pub async fn connection_role(&self, connection_id: Uuid) -> Option<Role> {
        self.inner.connections.read().await.get(&connection_id).map(|c| c.role)
    }

    pub async fn connection_user_id(&self, connection_id: Uuid) -> Option<Uuid> {
        self.inner.connections.read().await.get(&connection_id).map(|c| c.user_id)
    }

    pub async fn set_location_sharing(&self, connection_id: Uuid, enabled: bool) {
        if let Some(connection) = self.inner.connections.write().await.get_mut(&connection_id) {
            connection.location_sharing = enabled;
        }
    }

    /// Records liveness for a connection; called on every inbound `heartbeat`
    /// command (spec section 4.G). Connections that stop heartbeating are
    /// reaped by [`EventBus::reap_idle`].
    pub async fn touch(&self, connection_id: Uuid) {
        if let Some(connection) = self.inner.connections.write().await.get_mut(&connection_id) {
            connection.last_seen = Instant::now();
        }
    }

    /// Drops every connection that hasn't heartbeated within `idle_timeout`,
    /// running the same room-cleanup and `employee_disconnected` fan-out as
    /// an explicit [`EventBus::deregister`] (spec section 6's socket idle
    /// timeout knob). Returns the number of connections reaped.
    pub async fn reap_idle(&self, idle_timeout: Duration) -> usize {
        let stale: Vec<Uuid> = {
            let connections = self.inner.connections.read().await;
            connections
                .iter()
                .filter(|(_, connection)| connection.last_seen.elapsed() > idle_timeout)
                .map(|(id, _)| *id)
                .collect()
        };

        for connection_id in &stale {
            self.deregister(*connection_id).await;
        }

        stale.len()
    }

    /// Sends to a single connection. Drops the message (incrementing the
    /// per-connection counter) rather than blocking if the outbound queue
    /// is full — the subscriber stays connected (spec section 4.G failure
    /// semantics).
    async fn send_to(&self, connection_id: Uuid, message: OutboundMessage) {
        let connections = self.inner.connections.read().await;
        let Some(connection) = connections.get(&connection_id) else {
            return;
        };

        if connection.sender.try_send(message).is_err() {
            connection.dropped_count.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(connection_id = %connection_id, "dropped outbound message, queue full");
        }
    }

    pub async fn publish_to_room(&self, room: &str, message: OutboundMessage) {
        let members: Vec<Uuid> = {
            let rooms = self.inner.rooms.read().await;
            rooms.get(room).map(|set| set.iter().copied().collect()).unwrap_or_default()
        };

        for connection_id in members {
            self.send_to(connection_id, message.clone()).await;
        }
    }

    pub async fn publish_to_connection(&self, connection_id: Uuid, message: OutboundMessage) {
        self.send_to(connection_id, message).await;
    }

    pub async fn broadcast_all(&self, message: OutboundMessage) {
        let ids: Vec<Uuid> = self.inner.connections.read().await.keys().copied().collect();
        for connection_id in ids {
            self.send_to(connection_id, message.clone()).await;
        }
    }

    /// `VitalUpdate(user_id, reading)` → `vitals_{user_id}` and `supervisors`.
    pub async fn publish_vital_update(&self, user_id: Uuid, vital: &Vital) {
        let message = OutboundMessage::new("vital_update", json!({ "user_id": user_id, "vital": vital }));
        self.publish_to_room(&format!("vitals_{user_id}"), message.clone()).await;
        self.publish_to_room("supervisors", message).await;
    }

    /// `AlertCreated(alert)`: `user_{alert.user_id}` and `supervisors`
    /// always; critical severity additionally fans a `critical_alert`
    /// event to `supervisors` with `requires_immediate=true` (spec
    /// section 4.G, testable property 7).
    pub async fn publish_alert_created(&self, alert: &Alert) {
        let message = OutboundMessage::new("new_alert", json!({ "alert": alert }));
        self.publish_to_room(&format!("user_{}", alert.user_id), message.clone()).await;
        self.publish_to_room("supervisors", message).await;

        if alert.severity == crate::models::alert::Severity::Critical {
            let critical = OutboundMessage::new(
                "critical_alert",
                json!({ "alert": alert, "requires_immediate": true }),
            );
            self.publish_to_room("supervisors", critical).await;
        }
    }

    /// `AlertAcknowledged(alert)` → `supervisors` plus the acknowledging
    /// connection.
    pub async fn publish_alert_acknowledged(&self, alert: &Alert, acknowledging_connection: Option<Uuid>) {
        let message = OutboundMessage::new("alert_acknowledged", json!({ "alert": alert }));
        self.publish_to_room("supervisors", message.clone()).await;
        if let Some(connection_id) = acknowledging_connection {
            self.publish_to_connection(connection_id, message).await;
        }
    }

    /// `AlertResolved(alert)` → `supervisors`.
    pub async fn publish_alert_resolved(&self, alert: &Alert) {
        let message = OutboundMessage::new("alert_resolved", json!({ "alert": alert }));
        self.publish_to_room("supervisors", message).await;
    }

    /// `AttendanceUpdate(attendance)` → `user_{user_id}` and `supervisors`.
    pub async fn publish_attendance_update(&self, attendance: &AttendanceDay) {
        let message = OutboundMessage::new("attendance_update", json!({ "attendance": attendance }));
        self.publish_to_room(&format!("user_{}", attendance.user_id), message.clone()).await;
        self.publish_to_room("supervisors", message).await;
    }

    /// `LocationUpdate` (a location-only projection of a reading) → `supervisors`.
    pub async fn publish_location_update(&self, user_id: Uuid, vital: &Vital) {
        if vital.latitude.is_none() && vital.longitude.is_none() {
            return;
        }
        let message = OutboundMessage::new(
            "location_update",
            json!({
                "user_id": user_id,
                "latitude": vital.latitude,
                "longitude": vital.longitude,
                "gps_accuracy": vital.gps_accuracy,
                "timestamp": vital.timestamp,
            }),
        );
        self.publish_to_room("supervisors", message).await;
    }

    /// `SystemMessage(severity, text)` → every connection.
    pub async fn publish_system_message(&self, severity: &str, text: &str) {
        let message = OutboundMessage::new("system_message", json!({ "severity": severity, "message": text }));
        self.broadcast_all(message).await;
    }
}

fn role_room(role: Role) -> &'static str {
    match role {
        Role::Employee => "employees",
        Role::Supervisor => "supervisors",
    }
}

/// Allow-list grammar for ad-hoc `join_room` targets (spec section 4.G):
/// `user_{id}`, `vitals_{id}`, `supervisors`, `employees`, or any of
/// `alerts_*|vitals_*|location_*`.
pub fn room_name_allowed(room: &str) -> bool {
    if room == "supervisors" || room == "employees" {
        return true;
    }
    if let Some(rest) = room.strip_prefix("user_") {
        return !rest.is_empty();
    }
    for prefix in ["alerts_", "vitals_", "location_"] {
        if let Some(rest) = room.strip_prefix(prefix) {
            return !rest.is_empty();
        }
    }
    false
}

#[derive(Debug, Serialize)]
pub struct ConnectionEstablished {
    pub connection_id: Uuid,
    pub rooms: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_grammar_accepts_documented_patterns() {
        assert!(room_name_allowed("supervisors"));
        assert!(room_name_allowed("employees"));
        assert!(room_name_allowed("user_42"));
        assert!(room_name_allowed("vitals_42"));
        assert!(room_name_allowed("alerts_critical"));
        assert!(room_name_allowed("location_zone1"));
    }

    #[test]
    fn room_grammar_rejects_arbitrary_strings() {
        assert!(!room_name_allowed("anything"));
        assert!(!room_name_allowed("user_"));
        assert!(!room_name_allowed(""));
    }

    #[tokio::test]
    async fn register_joins_default_rooms() {
        let bus = EventBus::new();
        let user_id = Uuid::new_v4();
        let handle = bus.register(user_id, Role::Employee, "worker".to_string()).await;

        let rooms = bus.inner.rooms.read().await;
        assert!(rooms.get(&format!("user_{user_id}")).unwrap().contains(&handle.connection_id));
        assert!(rooms.get("employees").unwrap().contains(&handle.connection_id));
    }

    #[tokio::test]
    async fn deregister_removes_from_all_rooms() {
        let bus = EventBus::new();
        let user_id = Uuid::new_v4();
        let handle = bus.register(user_id, Role::Employee, "worker".to_string()).await;
        bus.deregister(handle.connection_id).await;

        let rooms = bus.inner.rooms.read().await;
        assert!(!rooms.contains_key(&format!("user_{user_id}")));
    }
}
