use crate::auth::TokenVerifier;
use crate::manager::DemandManager;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub manager: DemandManager,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(manager: DemandManager, verifier: Arc<dyn TokenVerifier>) -> Self {
        AppState { manager, verifier }
    }
}
