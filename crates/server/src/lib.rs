use std::sync::Arc;

use assistant::Assistant;
use db::DBService;

pub mod error;
pub mod routes;

/// Shared application state: the database pool and the message router with
/// its injected store and completion provider.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub assistant: Arc<Assistant>,
}

impl AppState {
    pub fn new(db: DBService, assistant: Assistant) -> Self {
        Self {
            db,
            assistant: Arc::new(assistant),
        }
    }
}
