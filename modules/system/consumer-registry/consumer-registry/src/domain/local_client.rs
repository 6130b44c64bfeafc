//! Local (in-process) client for the consumer registry.

use std::sync::Arc;

use consumer_registry_sdk::{ConsumerRegistryClient, ConsumerView, Snapshot};

use super::Service;

/// Local client wrapping the service.
///
/// Shared by the control-plane sync task and the request path.
pub struct ConsumerRegistryLocalClient {
    svc: Arc<Service>,
}

impl ConsumerRegistryLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

impl ConsumerRegistryClient for ConsumerRegistryLocalClient {
    fn update(&self, snapshot: &Snapshot) {
        self.svc.update(snapshot);
    }

    fn lookup(&self, namespace: &str, plugin: &str, key: &str) -> Option<Arc<dyn ConsumerView>> {
        self.svc
            .lookup(namespace, plugin, key)
            .map(|c| c as Arc<dyn ConsumerView>)
    }

    fn consumer(&self, namespace: &str, name: &str) -> Option<Arc<dyn ConsumerView>> {
        self.svc
            .consumer(namespace, name)
            .map(|c| c as Arc<dyn ConsumerView>)
    }
}
