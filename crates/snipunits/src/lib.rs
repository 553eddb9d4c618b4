//! Built-in snippets: the executable corpus shipped with the host.

mod debug;
mod math;
mod params;
mod strings;

pub use debug::DebugLogSnippet;
pub use math::{AddSnippet, SubtractSnippet};
pub use params::{NumberTextParamSnippet, TextParamSnippet};
pub use strings::RemoveIndexSnippet;

use snipcore::Snippet;
use std::sync::Arc;

/// Every built-in snippet, ready to hand to the registry's `load_all`.
pub fn builtin_snippets() -> Vec<Arc<dyn Snippet>> {
    vec![
        Arc::new(AddSnippet),
        Arc::new(SubtractSnippet),
        Arc::new(RemoveIndexSnippet),
        Arc::new(TextParamSnippet),
        Arc::new(NumberTextParamSnippet),
        Arc::new(DebugLogSnippet),
    ]
}

pub(crate) mod util {
    use snipcore::{RunError, Value};
    use std::collections::HashMap;

    pub fn require<'a>(
        map: &'a HashMap<String, Value>,
        name: &str,
    ) -> Result<&'a Value, RunError> {
        map.get(name)
            .ok_or_else(|| RunError::MissingInput(name.to_string()))
    }

    pub fn require_i64(map: &HashMap<String, Value>, name: &str) -> Result<i64, RunError> {
        require(map, name)?
            .as_i64()
            .ok_or_else(|| RunError::Raised(format!("'{name}' is not an integer")))
    }

    pub fn require_str<'a>(
        map: &'a HashMap<String, Value>,
        name: &str,
    ) -> Result<&'a str, RunError> {
        require(map, name)?
            .as_str()
            .ok_or_else(|| RunError::Raised(format!("'{name}' is not text")))
    }
}
