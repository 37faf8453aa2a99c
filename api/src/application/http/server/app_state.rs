use std::sync::Arc;

use labellens_core::application::LabelLensService;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: LabelLensService,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: LabelLensService) -> Self {
        Self { args, service }
    }
}
