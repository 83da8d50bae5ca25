use std::sync::Arc;

use crate::platforms::traits::PlatformResolver;
use crate::platforms::Platform;

/// Read-only set of platform resolvers, built once at startup and
/// shared across requests.
pub struct ResolverRegistry {
    resolvers: Vec<Arc<dyn PlatformResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    pub fn register(&mut self, resolver: Arc<dyn PlatformResolver>) {
        self.resolvers.push(resolver);
    }

    pub fn get(&self, platform: Platform) -> Option<&dyn PlatformResolver> {
        self.resolvers
            .iter()
            .find(|r| r.platform() == platform)
            .map(|r| r.as_ref())
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
