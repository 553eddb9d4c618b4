use crate::util::{require_i64, require_str};
use async_trait::async_trait;
use snipcore::{RegistrationError, RunError, Snippet, SnippetBuilder, TypeTag, Value};
use std::collections::HashMap;

/// Removes the character at `index` from `str`, emitting both the new and
/// the original string.
pub struct RemoveIndexSnippet;

#[async_trait]
impl Snippet for RemoveIndexSnippet {
    fn id(&self) -> &str {
        "string.remove_index"
    }

    fn register(&self, builder: &mut SnippetBuilder) -> Result<(), RegistrationError> {
        builder.add_input_typed("index", TypeTag::Integer)?;
        builder.add_input_typed("str", TypeTag::ShortText)?;
        builder.add_output_typed("new_str", TypeTag::ShortText)?;
        builder.add_output_typed("original_str", TypeTag::ShortText)?;
        Ok(())
    }

    async fn run(
        &self,
        inputs: &HashMap<String, Value>,
        _parameters: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, RunError> {
        let index = require_i64(inputs, "index")?;
        let s = require_str(inputs, "str")?;

        let chars: Vec<char> = s.chars().collect();
        if index < 0 || index as usize >= chars.len() {
            return Err(RunError::Raised(
                "index to remove is out of bounds".to_string(),
            ));
        }

        let new_str: String = chars
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index as usize)
            .map(|(_, c)| c)
            .collect();

        let mut outputs = HashMap::new();
        outputs.insert("new_str".to_string(), Value::Text(new_str));
        outputs.insert("original_str".to_string(), Value::Text(s.to_string()));
        Ok(outputs)
    }
}
