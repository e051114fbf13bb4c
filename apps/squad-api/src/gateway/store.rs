//! Authoritative squad state: membership, roles, and code allocation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;

use super::codes;

/// Maximum number of members in a squad.
pub const SQUAD_CAPACITY: usize = 5;

/// Member role within a squad. The creating member is the LEADER; everyone
/// joining afterwards is a SOLDIER. There is no leader succession: a squad
/// whose leader departs simply continues without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Leader,
    Soldier,
}

/// A seat in a squad's ordered member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub connection_id: String,
    pub display_name: String,
    pub role: Role,
}

struct Squad {
    members: Vec<Member>,
}

/// Why a squad mutation was rejected. All variants are recoverable by the
/// requester and surfaced to that connection only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquadError {
    /// No live squad has this code.
    NotFound,
    /// The squad already has `SQUAD_CAPACITY` members.
    Full,
    /// Missing or malformed field in the request.
    InvalidInput(String),
    /// Code generation hit its retry bound.
    AllocationExhausted,
}

impl SquadError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// User-facing message, sent back to the requester as `error_msg`.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => "Escuadrón no encontrado.".to_string(),
            Self::Full => "El escuadrón está completo.".to_string(),
            Self::InvalidInput(message) => message.clone(),
            Self::AllocationExhausted => {
                "No se pudo asignar un código de escuadrón.".to_string()
            }
        }
    }
}

/// Outcome of removing a connection from its squad.
#[derive(Debug)]
pub struct Removal {
    pub code: String,
    pub display_name: String,
    /// Remaining member list, or `None` when the squad was destroyed.
    pub survivors: Option<Vec<Member>>,
}

/// Shared store of all live squads, keyed by code.
///
/// Uses `DashMap` for shard-level concurrency and `parking_lot::Mutex` per
/// squad so mutations on the same code are serialized: two concurrent joins
/// can never both observe four members and overflow the capacity.
pub struct SquadStore {
    squads: DashMap<String, Mutex<Squad>>,
}

impl Default for SquadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SquadStore {
    pub fn new() -> Self {
        Self {
            squads: DashMap::new(),
        }
    }

    /// Allocate a fresh code and create a squad with a single LEADER seat.
    ///
    /// The entry API reserves the code and inserts the squad in one step, so
    /// a concurrent `create` drawing the same code redraws instead of
    /// clobbering. Fails only when the redraw bound is exhausted.
    pub fn create(
        &self,
        connection_id: &str,
        name: &str,
    ) -> Result<(String, Vec<Member>), SquadError> {
        for _ in 0..codes::MAX_ATTEMPTS {
            let code = codes::random_code();
            match self.squads.entry(code.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let members = vec![Member {
                        connection_id: connection_id.to_string(),
                        display_name: name.to_string(),
                        role: Role::Leader,
                    }];
                    slot.insert(Mutex::new(Squad {
                        members: members.clone(),
                    }));
                    return Ok((code, members));
                }
            }
        }
        Err(SquadError::AllocationExhausted)
    }

    /// Join a live squad, or reconnect if `name` already holds a seat.
    ///
    /// Reconnect semantics: a member with the same display name keeps its
    /// seat and role; only its connection id is rewritten. The capacity
    /// check happens before any mutation.
    pub fn join(
        &self,
        code: &str,
        connection_id: &str,
        name: &str,
    ) -> Result<Vec<Member>, SquadError> {
        let entry = self.squads.get(code).ok_or(SquadError::NotFound)?;
        let mut squad = entry.lock();

        if let Some(seat) = squad
            .members
            .iter_mut()
            .find(|m| m.display_name == name)
        {
            seat.connection_id = connection_id.to_string();
            return Ok(squad.members.clone());
        }

        if squad.members.len() >= SQUAD_CAPACITY {
            return Err(SquadError::Full);
        }

        squad.members.push(Member {
            connection_id: connection_id.to_string(),
            display_name: name.to_string(),
            role: Role::Soldier,
        });
        Ok(squad.members.clone())
    }

    /// Remove a connection from whichever squad holds it.
    ///
    /// Destroys the squad in the same atomic step when the last seat
    /// empties. A connection id should only ever be in one squad; if it were
    /// not, only the first match is removed. Returns `None` when the
    /// connection held no seat (disconnect before ever joining).
    pub fn remove(&self, connection_id: &str) -> Option<Removal> {
        let code = self.squads.iter().find_map(|entry| {
            let squad = entry.value().lock();
            squad
                .members
                .iter()
                .any(|m| m.connection_id == connection_id)
                .then(|| entry.key().clone())
        })?;

        let mut display_name = None;
        let mut survivors = None;

        // remove_if holds the shard write lock across the predicate, so the
        // seat removal and the conditional squad teardown are one step.
        self.squads.remove_if(&code, |_, slot| {
            let mut squad = slot.lock();
            if let Some(pos) = squad
                .members
                .iter()
                .position(|m| m.connection_id == connection_id)
            {
                display_name = Some(squad.members.remove(pos).display_name);
            }
            if squad.members.is_empty() {
                true
            } else {
                survivors = Some(squad.members.clone());
                false
            }
        });

        display_name.map(|display_name| Removal {
            code,
            display_name,
            survivors,
        })
    }

    /// Member list of a live squad.
    pub fn get(&self, code: &str) -> Option<Vec<Member>> {
        self.squads.get(code).map(|entry| entry.lock().members.clone())
    }

    /// Number of live squads.
    pub fn len(&self) -> usize {
        self.squads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squads.is_empty()
    }
}
