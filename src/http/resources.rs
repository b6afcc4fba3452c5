//! Named groups of REST resources.
//!
//! Applications register axum routers under a group name. The container's
//! resource-packages parameter selects which groups get mounted.

use std::collections::HashMap;

use axum::Router;

/// Resource groups available to a container.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    groups: HashMap<String, Router>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group, replacing any group of the same name.
    pub fn with_group(mut self, name: impl Into<String>, router: Router) -> Self {
        self.insert(name, router);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, router: Router) {
        self.groups.insert(name.into(), router);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Merge the requested groups into one router.
    ///
    /// Unknown names are logged and skipped. Returns the router and the number
    /// of groups mounted. Overlapping routes between groups panic inside axum;
    /// [`build_router`](crate::http::build_router) turns that into an error.
    pub fn mount(&self, requested: &[String]) -> (Router, usize) {
        let mut router = Router::new();
        let mut mounted = 0;
        for name in requested {
            match self.groups.get(name) {
                Some(group) => {
                    tracing::debug!(group = %name, "Mounting resource group");
                    router = router.merge(group.clone());
                    mounted += 1;
                }
                None => tracing::warn!(group = %name, "Unknown resource group, skipped"),
            }
        }
        (router, mounted)
    }
}
