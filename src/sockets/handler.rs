use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use loco_rs::app::AppContext;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state;
use crate::middleware::{self, AuthContext, TokenType};
use crate::models::user::Role;
use crate::services::authz::{self, Action, Target};
use crate::services::event_bus::{room_name_allowed, EventBus, OutboundMessage};
use crate::sockets::messages::{self, InboundCommand};

/// WebSocket upgrades arrive as plain GETs and cannot reliably carry an
/// `Authorization` header across every client environment, so the access
/// token travels as a query parameter instead (spec section 6: "initial
/// handshake carries bearer token").
#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn upgrade(ws: WebSocketUpgrade, State(ctx): State<AppContext>, Query(params): Query<WsParams>) -> Response {
    let settings = &app_state::app_settings().auth;

    let claims = match middleware::validate_token(&params.token, &settings.access_token_secret, TokenType::Access) {
        Ok(claims) => claims,
        Err(_) => return (StatusCode::UNAUTHORIZED, "invalid or expired token").into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, ctx.db, claims.sub, claims.role))
}

async fn handle_socket(socket: WebSocket, db: DatabaseConnection, user_id: Uuid, role: Role) {
    let bus = app_state::event_bus();
    let (mut sender, mut receiver) = socket.split();

    let handle = bus.register(user_id, role, user_id.to_string()).await;
    let mut outbound_rx = handle.receiver;
    let connection_id = handle.connection_id;

    let default_rooms = vec![format!("user_{user_id}"), role_room_name(role)];
    let established = messages::connection_established(connection_id, default_rooms);
    if sender.send(Message::Text(established.to_string())).await.is_err() {
        bus.deregister(connection_id).await;
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(Message::Text(message.to_wire_json().to_string())).await.is_err() {
                break;
            }
        }
    });

    let bus_for_recv = bus.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    handle_command(&bus_for_recv, &db, connection_id, user_id, role, &text).await;
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    bus.deregister(connection_id).await;
}

fn role_room_name(role: Role) -> String {
    match role {
        Role::Employee => "employees".to_string(),
        Role::Supervisor => "supervisors".to_string(),
    }
}

/// Dispatch table for spec section 4.G's inbound command list. Malformed
/// frames and authorisation failures produce an `error` event back to the
/// sender rather than closing the connection.
async fn handle_command(bus: &EventBus, db: &DatabaseConnection, connection_id: Uuid, user_id: Uuid, role: Role, text: &str) {
    let command: InboundCommand = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(_) => {
            send_error(bus, connection_id, "unrecognised command").await;
            return;
        }
    };

    match command {
        InboundCommand::SubscribeVitals { user_id: target_user_id } => {
            let actor = AuthContext { user_id, email: String::new(), role };
            if authz::allow(Action::Read, &actor, Target::owned_by(target_user_id)) {
                bus.join_room(connection_id, &format!("vitals_{target_user_id}")).await;
            } else {
                send_error(bus, connection_id, "Access denied for subscribe_vitals").await;
            }
        }
        InboundCommand::UnsubscribeVitals { user_id: target_user_id } => {
            bus.leave_room(connection_id, &format!("vitals_{target_user_id}")).await;
        }
        InboundCommand::JoinRoom { room } => {
            if room_name_allowed(&room) {
                bus.join_room(connection_id, &room).await;
            } else {
                send_error(bus, connection_id, "room name not permitted").await;
            }
        }
        InboundCommand::LeaveRoom { room } => {
            bus.leave_room(connection_id, &room).await;
        }
        InboundCommand::AcknowledgeAlert { id } => {
            acknowledge_alert(bus, db, connection_id, user_id, role, id).await;
        }
        InboundCommand::ToggleLocationSharing { enabled } => {
            if role == Role::Employee {
                bus.set_location_sharing(connection_id, enabled).await;
                bus.publish_to_room(
                    "supervisors",
                    OutboundMessage::new("location_sharing_changed", serde_json::json!({ "user_id": user_id, "enabled": enabled })),
                )
                .await;
            } else {
                send_error(bus, connection_id, "only employees may toggle their own location sharing").await;
            }
        }
        InboundCommand::Heartbeat => {
            bus.touch(connection_id).await;
            bus.publish_to_connection(connection_id, OutboundMessage::new("heartbeat_ack", messages::heartbeat_ack_payload())).await;
        }
    }
}

async fn send_error(bus: &EventBus, connection_id: Uuid, message: &str) {
    bus.publish_to_connection(connection_id, OutboundMessage::new("error", messages::error_payload(message))).await;
}

/// Delegates to the same lifecycle path used by the HTTP facade (spec
/// section 4.G: "delegates to section 4.D, then broadcasts"), then
/// fans the acknowledgement out over the socket instead of returning an
/// HTTP response.
async fn acknowledge_alert(bus: &EventBus, db: &DatabaseConnection, connection_id: Uuid, user_id: Uuid, role: Role, alert_id: Uuid) {
    let actor = AuthContext { user_id, email: String::new(), role };

    match crate::services::alert_service::acknowledge(db, alert_id, &actor).await {
        Ok(alert) => bus.publish_alert_acknowledged(&alert, Some(connection_id)).await,
        Err(err) => send_error(bus, connection_id, &err.to_string()).await,
    }
}
