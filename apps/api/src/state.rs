use std::sync::Arc;

use crate::generation::ResumeGenerator;
use crate::pipeline::RenderPipeline;
use crate::profiles::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: RenderPipeline,
    /// `None` when no database is configured.
    pub profiles: Option<Arc<dyn ProfileStore>>,
    /// `None` when no generator is wired in; the generate route answers 501.
    pub generator: Option<Arc<dyn ResumeGenerator>>,
}

impl AppState {
    pub fn new(pipeline: RenderPipeline) -> Self {
        Self {
            pipeline,
            profiles: None,
            generator: None,
        }
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ResumeGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }
}
