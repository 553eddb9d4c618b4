use snipcore::{RegistrationError, Snippet, SnippetBuilder, SnippetDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry of loaded snippets.
///
/// `load` runs a snippet's registration hook against a fresh builder and
/// stores the sealed descriptor. `reload` swaps the stored descriptor
/// atomically: executions already holding the old `Arc` finish with the
/// version they were handed, new executions see the fresh one. This is what
/// makes live-editing of snippet logic possible without restarting the host.
pub struct SnippetRegistry {
    snippets: RwLock<HashMap<String, Arc<SnippetDescriptor>>>,
}

impl SnippetRegistry {
    pub fn new() -> Self {
        Self {
            snippets: RwLock::new(HashMap::new()),
        }
    }

    /// Load a snippet: run its registration hook and store the descriptor.
    pub async fn load(
        &self,
        source: Arc<dyn Snippet>,
    ) -> Result<Arc<SnippetDescriptor>, RegistrationError> {
        let id = source.id().to_string();
        let mut builder = SnippetBuilder::new();
        source.register(&mut builder)?;
        let descriptor = Arc::new(builder.into_descriptor(id.clone(), source));

        tracing::info!(
            snippet = %id,
            inputs = descriptor.inputs.len(),
            outputs = descriptor.outputs.len(),
            parameters = descriptor.parameters.len(),
            dependencies = descriptor.dependencies.len(),
            "registered snippet"
        );

        let mut snippets = self.snippets.write().await;
        snippets.insert(id, descriptor.clone());
        Ok(descriptor)
    }

    /// Re-run registration and replace the prior descriptor wholesale.
    pub async fn reload(
        &self,
        source: Arc<dyn Snippet>,
    ) -> Result<Arc<SnippetDescriptor>, RegistrationError> {
        tracing::info!(snippet = source.id(), "reloading snippet");
        self.load(source).await
    }

    /// Load a batch; one snippet's registration failure does not abort the
    /// others. Returns per-snippet results in input order.
    pub async fn load_all(
        &self,
        sources: Vec<Arc<dyn Snippet>>,
    ) -> Vec<(String, Result<Arc<SnippetDescriptor>, RegistrationError>)> {
        let mut results = Vec::with_capacity(sources.len());
        for source in sources {
            let id = source.id().to_string();
            let result = self.load(source).await;
            if let Err(e) = &result {
                tracing::error!(snippet = %id, error = %e, "failed to register snippet");
            }
            results.push((id, result));
        }
        results
    }

    pub async fn get(&self, id: &str) -> Option<Arc<SnippetDescriptor>> {
        self.snippets.read().await.get(id).cloned()
    }

    pub async fn list(&self) -> Vec<String> {
        self.snippets.read().await.keys().cloned().collect()
    }
}

impl Default for SnippetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
