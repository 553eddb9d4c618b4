use crate::util::require_str;
use async_trait::async_trait;
use snipcore::{RegistrationError, RunError, Snippet, SnippetBuilder, TypeTag, Value};
use std::collections::HashMap;

/// Source node: forwards its `str_input` parameter as the `text` output.
pub struct TextParamSnippet;

#[async_trait]
impl Snippet for TextParamSnippet {
    fn id(&self) -> &str {
        "param.text"
    }

    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError> {
        builder.add_parameter("str_input", TypeTag::ShortText)?;
        builder.add_output_typed("text", TypeTag::ShortText)?;
        Ok(())
    }

    async fn run(
        &self,
        _inputs: &HashMap<String, Value>,
        parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError> {
        let s = require_str(parameters, "str_input")?;

        let mut outputs = HashMap::new();
        outputs.insert("text".to_string(), Value::Text(s.to_string()));
        Ok(outputs)
    }
}

/// Source node: appends `"4"` to its `num_input` parameter.
///
/// The parameter is declared short-text, so a value like `"3"` stays text
/// and the result is the concatenation `"34"`, not the number 7.
pub struct NumberTextParamSnippet;

#[async_trait]
impl Snippet for NumberTextParamSnippet {
    fn id(&self) -> &str {
        "param.number_text"
    }

    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError> {
        builder.add_parameter("num_input", TypeTag::ShortText)?;
        builder.add_output_typed("num", TypeTag::ShortText)?;
        Ok(())
    }

    async fn run(
        &self,
        _inputs: &HashMap<String, Value>,
        parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError> {
        let s = require_str(parameters, "num_input")?;

        let mut outputs = HashMap::new();
        outputs.insert("num".to_string(), Value::Text(format!("{s}4")));
        Ok(outputs)
    }
}
