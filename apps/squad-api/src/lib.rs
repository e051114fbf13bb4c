pub mod config;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::fanout::RoomBroadcast;
use gateway::registry::ConnectionRegistry;
use gateway::store::SquadStore;
use ledger::ScoreLedger;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub squads: Arc<SquadStore>,
    pub registry: Arc<ConnectionRegistry>,
    pub broadcast: RoomBroadcast,
    pub ledger: Arc<dyn ScoreLedger>,
    pub config: Arc<Config>,
}
