//! Wire-format event types for the squad gateway.
//!
//! Every inbound payload is a tagged union with explicit required fields;
//! anything that does not parse is rejected as invalid input rather than
//! crashing a handler on a missing property.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::store::Member;

// ---------------------------------------------------------------------------
// Client → Server events
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    CreateSquad(CreateSquadPayload),
    JoinSquad(JoinSquadPayload),
    ChatMessage(ChatMessagePayload),
    SendPosition(SendPositionPayload),
}

#[derive(Debug, Deserialize)]
pub struct CreateSquadPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinSquadPayload {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessagePayload {
    #[serde(rename = "squadCode")]
    pub squad_code: String,
    pub user: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SendPositionPayload {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Event names dispatched to clients.
pub struct EventName;

impl EventName {
    pub const SQUAD_JOINED: &'static str = "squad_joined";
    pub const SQUAD_MEMBERS_UPDATE: &'static str = "squad_members_update";
    pub const CHAT_BROADCAST: &'static str = "chat_broadcast";
    pub const POSITION: &'static str = "amigo_movimiento";
    pub const ERROR: &'static str = "error_msg";
}

/// Author name attached to server-generated chat notices.
pub const SYSTEM_USER: &str = "SYSTEM";

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct ServerEvent {
    pub event: &'static str,
    pub data: Value,
}

impl ServerEvent {
    /// Confirmation to the requester after a successful create or join.
    pub fn squad_joined(code: &str, members: &[Member]) -> Self {
        Self {
            event: EventName::SQUAD_JOINED,
            data: serde_json::json!({
                "code": code,
                "members": members,
            }),
        }
    }

    /// Full refreshed member list, sent to the whole room.
    pub fn members_update(members: &[Member]) -> Self {
        Self {
            event: EventName::SQUAD_MEMBERS_UPDATE,
            data: serde_json::json!({ "members": members }),
        }
    }

    /// A user chat message, relayed verbatim to the room.
    pub fn chat_broadcast(squad_code: &str, user: &str, text: &str) -> Self {
        Self {
            event: EventName::CHAT_BROADCAST,
            data: serde_json::json!({
                "squadCode": squad_code,
                "user": user,
                "text": text,
            }),
        }
    }

    /// A server-generated notice, rendered in the room chat.
    pub fn system_notice(text: &str) -> Self {
        Self {
            event: EventName::CHAT_BROADCAST,
            data: serde_json::json!({
                "user": SYSTEM_USER,
                "text": text,
                "type": "system",
            }),
        }
    }

    /// Live position relay, tagged with the sender's connection id.
    pub fn position(connection_id: &str, lat: f64, lng: f64) -> Self {
        Self {
            event: EventName::POSITION,
            data: serde_json::json!({
                "connection_id": connection_id,
                "lat": lat,
                "lng": lng,
            }),
        }
    }

    /// User-visible error, sent to the requester only.
    pub fn error(text: &str) -> Self {
        Self {
            event: EventName::ERROR,
            data: serde_json::json!({ "text": text }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_squad() {
        let raw = r#"{"event":"join_squad","data":{"code":"ab1z","name":"Alice"}}"#;
        match serde_json::from_str::<ClientEvent>(raw).unwrap() {
            ClientEvent::JoinSquad(p) => {
                assert_eq!(p.code, "ab1z");
                assert_eq!(p.name, "Alice");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn parses_chat_message_with_camel_case_code() {
        let raw = r#"{"event":"chat_message","data":{"squadCode":"AB1Z","user":"Alice","text":"hola"}}"#;
        match serde_json::from_str::<ClientEvent>(raw).unwrap() {
            ClientEvent::ChatMessage(p) => {
                assert_eq!(p.squad_code, "AB1Z");
                assert_eq!(p.text, "hola");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_event() {
        let raw = r#"{"event":"steal_squad","data":{}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        let raw = r#"{"event":"join_squad","data":{"code":"AB1Z"}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());

        let raw = r#"{"event":"send_position","data":{"lat":1.0}}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn system_notice_is_tagged() {
        let event = ServerEvent::system_notice("prueba");
        assert_eq!(event.event, EventName::CHAT_BROADCAST);
        assert_eq!(event.data["user"], SYSTEM_USER);
        assert_eq!(event.data["type"], "system");
    }
}
