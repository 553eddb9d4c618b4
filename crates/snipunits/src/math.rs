use crate::util::require_i64;
use async_trait::async_trait;
use snipcore::{RegistrationError, RunError, Snippet, SnippetBuilder, TypeTag, Value};
use std::collections::HashMap;

/// `c = a + b` over integers.
pub struct AddSnippet;

#[async_trait]
impl Snippet for AddSnippet {
    fn id(&self) -> &str {
        "math.add"
    }

    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError> {
        builder.add_input_typed("a", TypeTag::Integer)?;
        builder.add_input_typed("b", TypeTag::Integer)?;
        builder.add_output_typed("c", TypeTag::Integer)?;
        Ok(())
    }

    async fn run(
        &self,
        inputs: &HashMap<String, Value>,
        _parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError> {
        let a = require_i64(inputs, "a")?;
        let b = require_i64(inputs, "b")?;

        let mut outputs = HashMap::new();
        outputs.insert("c".to_string(), Value::Integer(a + b));
        Ok(outputs)
    }
}

/// `c = a - b` over integers.
pub struct SubtractSnippet;

#[async_trait]
impl Snippet for SubtractSnippet {
    fn id(&self) -> &str {
        "math.subtract"
    }

    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError> {
        builder.add_input_typed("a", TypeTag::Integer)?;
        builder.add_input_typed("b", TypeTag::Integer)?;
        builder.add_output_typed("c", TypeTag::Integer)?;
        Ok(())
    }

    async fn run(
        &self,
        inputs: &HashMap<String, Value>,
        _parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError> {
        let a = require_i64(inputs, "a")?;
        let b = require_i64(inputs, "b")?;

        let mut outputs = HashMap::new();
        outputs.insert("c".to_string(), Value::Integer(a - b));
        Ok(outputs)
    }
}
