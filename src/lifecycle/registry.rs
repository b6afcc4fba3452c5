//! Set of containers managed by the process.

use std::sync::Arc;

use crate::lifecycle::container::{ContainerError, WebServiceContainer};

/// Append-only collection of containers, one per container role.
///
/// Filled during startup and read by the shutdown coordinator.
#[derive(Default)]
pub struct ContainerRegistry {
    containers: Vec<Arc<dyn WebServiceContainer>>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, container: Arc<dyn WebServiceContainer>) {
        tracing::debug!(container = %container, "Registered container");
        self.containers.push(container);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn WebServiceContainer>> {
        self.containers.iter()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Bring every container up in registration order, stopping at the first failure.
    pub async fn up_all(&self) -> Result<(), ContainerError> {
        for container in &self.containers {
            container.up().await?;
        }
        Ok(())
    }
}
