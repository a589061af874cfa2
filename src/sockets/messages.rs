use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Inbound commands a connected client may send, translated one-to-one
/// into Event Bus operations (spec section 4.G's command table). Frames
/// that don't match any variant are rejected by the dispatcher without
/// disconnecting the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum InboundCommand {
    SubscribeVitals { user_id: Uuid },
    UnsubscribeVitals { user_id: Uuid },
    JoinRoom { room: String },
    LeaveRoom { room: String },
    AcknowledgeAlert { id: Uuid },
    ToggleLocationSharing { enabled: bool },
    Heartbeat,
}

/// Full `{event, timestamp, data}` envelope for the one reply sent
/// directly on handshake, before the connection is registered with
/// anything that could publish through the Event Bus.
pub fn connection_established(connection_id: Uuid, rooms: Vec<String>) -> Value {
    json!({
        "event": "connection_established",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "data": { "connection_id": connection_id, "rooms": rooms },
    })
}

/// Payload-only builders; callers wrap these as an `OutboundMessage` and
/// hand them to the Event Bus, which applies the same envelope.
pub fn heartbeat_ack_payload() -> Value {
    json!({})
}

pub fn error_payload(message: impl Into<String>) -> Value {
    json!({ "message": message.into() })
}
