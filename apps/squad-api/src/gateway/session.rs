//! The squad protocol state machine.
//!
//! One `SessionManager` handles every client event: it validates the event
//! against the registry and store, applies the mutation, and emits the room
//! broadcasts. The direct reply for the requester, if any, is returned to
//! the connection loop so it can be written to that socket alone.
//!
//! Per connection the states are `Unjoined → InSquad → Unjoined`; a squad
//! disappearing underneath its members is handled by the store.

use std::sync::Arc;

use super::codes;
use super::events::{
    ChatMessagePayload, ClientEvent, CreateSquadPayload, JoinSquadPayload, SendPositionPayload,
    ServerEvent,
};
use super::fanout::RoomBroadcast;
use super::registry::ConnectionRegistry;
use super::store::{SquadError, SquadStore};

/// System notice when someone joins a squad room.
const NOTICE_JOINED: &str = "Un nuevo operativo se ha unido a la frecuencia.";

pub struct SessionManager {
    squads: Arc<SquadStore>,
    registry: Arc<ConnectionRegistry>,
    broadcast: RoomBroadcast,
}

impl SessionManager {
    pub fn new(
        squads: Arc<SquadStore>,
        registry: Arc<ConnectionRegistry>,
        broadcast: RoomBroadcast,
    ) -> Self {
        Self {
            squads,
            registry,
            broadcast,
        }
    }

    /// Handle one client event. Returns the direct reply for the requester,
    /// if any; room-wide effects go through the broadcast hub.
    pub fn handle(&self, connection_id: &str, event: ClientEvent) -> Option<ServerEvent> {
        match event {
            ClientEvent::CreateSquad(payload) => self.create_squad(connection_id, payload),
            ClientEvent::JoinSquad(payload) => self.join_squad(connection_id, payload),
            ClientEvent::ChatMessage(payload) => self.chat_message(connection_id, payload),
            ClientEvent::SendPosition(payload) => self.send_position(connection_id, payload),
        }
    }

    fn create_squad(&self, connection_id: &str, payload: CreateSquadPayload) -> Option<ServerEvent> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Some(Self::reject(SquadError::invalid(
                "Falta el nombre del operativo.",
            )));
        }
        if self.registry.squad_of(connection_id).is_some() {
            return Some(Self::reject(SquadError::invalid(
                "Ya perteneces a un escuadrón.",
            )));
        }

        match self.squads.create(connection_id, name) {
            Ok((code, members)) => {
                self.registry.associate(connection_id, &code);
                tracing::info!(%connection_id, %code, leader = %name, "squad created");
                Some(ServerEvent::squad_joined(&code, &members))
            }
            Err(err) => {
                tracing::warn!(%connection_id, ?err, "squad creation failed");
                Some(Self::reject(err))
            }
        }
    }

    fn join_squad(&self, connection_id: &str, payload: JoinSquadPayload) -> Option<ServerEvent> {
        let name = payload.name.trim();
        let code = codes::normalize(&payload.code);
        if name.is_empty() {
            return Some(Self::reject(SquadError::invalid(
                "Falta el nombre del operativo.",
            )));
        }
        if !codes::is_well_formed(&code) {
            return Some(Self::reject(SquadError::invalid(
                "Código de escuadrón inválido.",
            )));
        }
        if self.registry.squad_of(connection_id).is_some() {
            return Some(Self::reject(SquadError::invalid(
                "Ya perteneces a un escuadrón.",
            )));
        }

        match self.squads.join(&code, connection_id, name) {
            Ok(members) => {
                self.registry.associate(connection_id, &code);
                tracing::info!(%connection_id, %code, member = %name, "joined squad");
                self.broadcast
                    .send_room(&code, ServerEvent::members_update(&members));
                self.broadcast
                    .send_room(&code, ServerEvent::system_notice(NOTICE_JOINED));
                Some(ServerEvent::squad_joined(&code, &members))
            }
            Err(err) => {
                tracing::debug!(%connection_id, %code, ?err, "join rejected");
                Some(Self::reject(err))
            }
        }
    }

    /// Stateless relay: no history is kept, the room is the only record.
    fn chat_message(&self, connection_id: &str, payload: ChatMessagePayload) -> Option<ServerEvent> {
        let code = codes::normalize(&payload.squad_code);
        match self.registry.squad_of(connection_id) {
            Some(current) if current == code => {
                self.broadcast.send_room(
                    &code,
                    ServerEvent::chat_broadcast(&code, &payload.user, &payload.text),
                );
                None
            }
            _ => Some(Self::reject(SquadError::invalid(
                "No perteneces a ese escuadrón.",
            ))),
        }
    }

    fn send_position(&self, connection_id: &str, payload: SendPositionPayload) -> Option<ServerEvent> {
        match self.registry.squad_of(connection_id) {
            Some(code) => {
                self.broadcast.send_room_except(
                    &code,
                    connection_id,
                    ServerEvent::position(connection_id, payload.lat, payload.lng),
                );
                None
            }
            None => Some(Self::reject(SquadError::invalid(
                "No perteneces a ningún escuadrón.",
            ))),
        }
    }

    /// Disconnect cleanup. Idempotent and safe to run for connections that
    /// never joined a squad.
    pub fn disconnect(&self, connection_id: &str) {
        self.registry.disconnect(connection_id);

        if let Some(removal) = self.squads.remove(connection_id) {
            match removal.survivors {
                Some(survivors) => {
                    tracing::info!(
                        %connection_id,
                        code = %removal.code,
                        member = %removal.display_name,
                        remaining = survivors.len(),
                        "member disconnected"
                    );
                    self.broadcast
                        .send_room(&removal.code, ServerEvent::members_update(&survivors));
                    self.broadcast.send_room(
                        &removal.code,
                        ServerEvent::system_notice(&format!(
                            "{} ha perdido la conexión.",
                            removal.display_name
                        )),
                    );
                }
                None => {
                    tracing::info!(
                        %connection_id,
                        code = %removal.code,
                        "last member disconnected; squad destroyed"
                    );
                }
            }
        }
    }

    fn reject(err: SquadError) -> ServerEvent {
        ServerEvent::error(&err.user_message())
    }
}
