use std::sync::Arc;

use chatlink_bot::BotServices;
use chatlink_db::Stores;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Linking, ledger, router and dispatcher, built once at startup.
    pub services: BotServices,
    /// Storage seams, used directly by health checks and background jobs.
    pub stores: Stores,
    pub config: Arc<ServerConfig>,
}
