use std::sync::Arc;

use axum::Router;

use squad_api::config::Config;
use squad_api::gateway::fanout::RoomBroadcast;
use squad_api::gateway::registry::ConnectionRegistry;
use squad_api::gateway::store::SquadStore;
use squad_api::ledger::{MemoryLedger, ScoreLedger};
use squad_api::AppState;

/// Build an isolated test AppState: fresh stores, in-memory ledger.
pub fn test_state() -> AppState {
    let ledger: Arc<dyn ScoreLedger> = Arc::new(MemoryLedger::new());
    AppState {
        squads: Arc::new(SquadStore::new()),
        registry: Arc::new(ConnectionRegistry::new()),
        broadcast: RoomBroadcast::new(),
        ledger,
        config: Arc::new(Config { port: 0 }),
    }
}

/// Build the full application router wired to the test state.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = squad_api::routes::router().with_state(state.clone());
    (app, state)
}
