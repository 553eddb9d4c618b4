use crate::{NodeId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a node run's log, timestamped at append time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// What went wrong, and in which node it originated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub origin: NodeId,
}

/// Terminal verdict of a single node invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum Outcome {
    Succeeded { outputs: HashMap<String, Value> },
    Failed { error: ErrorRecord },
}

/// Structured report of one node run, handed to the reporting sink.
/// Transient: rebuilt every execution, never cached across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub node: NodeId,
    pub outcome: Outcome,
    pub log: Vec<LogEntry>,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded { .. })
    }

    pub fn outputs(&self) -> Option<&HashMap<String, Value>> {
        match &self.outcome {
            Outcome::Succeeded { outputs } => Some(outputs),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match &self.outcome {
            Outcome::Failed { error } => Some(error),
            Outcome::Succeeded { .. } => None,
        }
    }
}

/// Scoped accumulator for one node run.
///
/// Exactly one of `set_successful_result` / `set_exception_result` must be
/// called before `finalize`. Calling both, re-calling one, or finalizing
/// with neither is a programming error in the caller and panics.
#[derive(Debug)]
pub struct ResultBuilder {
    node: NodeId,
    log: Vec<LogEntry>,
    outcome: Option<Outcome>,
}

impl ResultBuilder {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            log: Vec::new(),
            outcome: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn log(&mut self, message: impl Into<String>) {
        self.log.push(LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
        });
    }

    pub fn set_successful_result(&mut self, outputs: HashMap<String, Value>) {
        assert!(
            self.outcome.is_none(),
            "result already set for node {}",
            self.node
        );
        self.outcome = Some(Outcome::Succeeded { outputs });
    }

    pub fn set_exception_result(&mut self, error: ErrorRecord) {
        assert!(
            self.outcome.is_none(),
            "result already set for node {}",
            self.node
        );
        self.outcome = Some(Outcome::Failed { error });
    }

    pub fn finalize(self) -> ExecutionResult {
        let outcome = self
            .outcome
            .unwrap_or_else(|| panic!("no result set for node {}", self.node));
        ExecutionResult {
            node: self.node,
            outcome,
            log: self.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn success_path_collects_log_and_outputs() {
        let node = Uuid::new_v4();
        let mut builder = ResultBuilder::new(node);
        builder.log("starting");
        let mut outputs = HashMap::new();
        outputs.insert("c".to_string(), Value::Integer(5));
        builder.set_successful_result(outputs);
        let result = builder.finalize();
        assert!(result.succeeded());
        assert_eq!(result.log.len(), 1);
        assert_eq!(result.outputs().unwrap()["c"], Value::Integer(5));
    }

    #[test]
    #[should_panic(expected = "result already set")]
    fn double_set_panics() {
        let node = Uuid::new_v4();
        let mut builder = ResultBuilder::new(node);
        builder.set_successful_result(HashMap::new());
        builder.set_exception_result(ErrorRecord {
            message: "boom".to_string(),
            origin: node,
        });
    }

    #[test]
    #[should_panic(expected = "no result set")]
    fn finalize_without_result_panics() {
        let builder = ResultBuilder::new(Uuid::new_v4());
        let _ = builder.finalize();
    }
}
