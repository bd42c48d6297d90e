pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::ModelService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(model: Arc<ModelService>) -> Self {
        Self {
            model,
            started_at: Instant::now(),
        }
    }
}
