use std::sync::Arc;

use crate::core::registry::ResolverRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ResolverRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self { registry }
    }
}
