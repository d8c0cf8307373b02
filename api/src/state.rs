use axum::extract::FromRef;
use checker::FieldValidator;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<FieldValidator>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(validator: FieldValidator) -> Self {
        Self {
            validator: Arc::new(validator),
            started_at: Instant::now(),
        }
    }
}

impl FromRef<AppState> for Arc<FieldValidator> {
    fn from_ref(state: &AppState) -> Self {
        state.validator.clone()
    }
}
