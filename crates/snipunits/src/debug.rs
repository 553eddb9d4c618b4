use async_trait::async_trait;
use snipcore::{RegistrationError, RunError, Snippet, SnippetBuilder, TypeTag, Value};
use std::collections::HashMap;

/// Logs whatever arrives on `value` and re-emits it unchanged.
pub struct DebugLogSnippet;

#[async_trait]
impl Snippet for DebugLogSnippet {
    fn id(&self) -> &str {
        "debug.log"
    }

    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError> {
        builder.add_optional_input("value", TypeTag::Passthrough)?;
        builder.add_output("value")?;
        Ok(())
    }

    async fn run(
        &self,
        inputs: &HashMap<String, Value>,
        _parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError> {
        let value = inputs.get("value").cloned().unwrap_or(Value::Null);
        tracing::info!(?value, "debug.log");

        let mut outputs = HashMap::new();
        outputs.insert("value".to_string(), value);
        Ok(outputs)
    }
}
