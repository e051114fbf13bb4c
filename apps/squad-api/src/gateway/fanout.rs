//! Broadcast hub for fanning squad events out to connected clients.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connection
//! subscribes once and filters events locally against its current squad
//! association. Delivery is fire-and-forget: a connection that is already
//! gone simply never receives the message.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::events::ServerEvent;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// A payload fanned out to every connection in a squad room.
#[derive(Debug, Clone)]
pub struct RoomPayload {
    /// Squad code identifying the room.
    pub room: String,
    /// Connection that must not receive this event (position relay sender).
    pub exclude: Option<String>,
    pub event: ServerEvent,
}

/// The global room broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct RoomBroadcast {
    sender: broadcast::Sender<Arc<RoomPayload>>,
}

impl Default for RoomBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the hub. Each connection's event loop calls this once.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RoomPayload>> {
        self.sender.subscribe()
    }

    /// Deliver an event to every connection associated with `room`.
    pub fn send_room(&self, room: &str, event: ServerEvent) {
        self.dispatch(RoomPayload {
            room: room.to_string(),
            exclude: None,
            event,
        });
    }

    /// Same as `send_room`, but skip one connection.
    pub fn send_room_except(&self, room: &str, exclude: &str, event: ServerEvent) {
        self.dispatch(RoomPayload {
            room: room.to_string(),
            exclude: Some(exclude.to_string()),
            event,
        });
    }

    fn dispatch(&self, payload: RoomPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }
}
