use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::{
    controller::OrchestrationController,
    error::{Result, ServiceError},
};

/// Trait for storing and retrieving live sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: OrchestrationController) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<OrchestrationController>>;
    async fn delete(&self, id: &str) -> Result<()>;

    /// Like `get`, but a missing session is an error.
    async fn require(&self, id: &str) -> Result<OrchestrationController> {
        self.get(id)
            .await?
            .ok_or_else(|| ServiceError::SessionNotFound(id.to_string()))
    }
}

/// In-memory implementation of SessionStorage
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, OrchestrationController>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, session: OrchestrationController) -> Result<()> {
        self.sessions.insert(session.id().to_string(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<OrchestrationController>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FlowCapabilities, flows::PaperFlows};
    use async_trait::async_trait;
    use prompt_flow::{InvocationError, ModelClient, ModelRequest};

    struct Offline;

    #[async_trait]
    impl ModelClient for Offline {
        async fn invoke(
            &self,
            _request: ModelRequest,
        ) -> std::result::Result<String, InvocationError> {
            Err(InvocationError::new("offline"))
        }
    }

    fn session() -> OrchestrationController {
        OrchestrationController::new(
            Arc::new(PaperFlows::new(Arc::new(Offline))),
            FlowCapabilities::default(),
        )
    }

    #[tokio::test]
    async fn test_require_reports_missing_session() {
        let storage = InMemorySessionStorage::new();
        let session = session();
        let id = session.id().to_string();
        storage.save(session).await.unwrap();

        assert_eq!(storage.require(&id).await.unwrap().id(), id);

        storage.delete(&id).await.unwrap();
        assert!(storage.is_empty());
        assert_eq!(
            storage.require(&id).await.err(),
            Some(ServiceError::SessionNotFound(id.clone()))
        );
    }
}
