use std::sync::Arc;

use crate::prescription::PrescriptionService;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    pub prescriptions: Arc<PrescriptionService>,
}

impl AppState {
    pub fn new(prescriptions: Arc<PrescriptionService>) -> Self {
        Self { prescriptions }
    }
}
