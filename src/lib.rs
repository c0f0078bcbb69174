use std::sync::Arc;

use agents::AgentManager;
use config::Config;
use database::Database;

pub mod agents;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub database: Arc<dyn Database>,
    pub agents: Arc<AgentManager>,
}

impl AppState {
    pub fn new(
        config: Config,
        database: Arc<dyn Database>,
        generator: Arc<dyn agents::ContentGenerator>,
    ) -> Self {
        let agents = Arc::new(AgentManager::new(database.clone(), generator));
        Self {
            config,
            database,
            agents,
        }
    }
}
