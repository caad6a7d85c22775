//! Mapping protocol verbs onto canonical operations.
//!
//! Every protocol names its operations differently (HTTP methods, RPC
//! method names, proprietary opcodes). The mapper collapses them onto the
//! fixed canonical set before policy evaluation. Classification fails open
//! to `execute` for unmapped verbs: the decision engine still adjudicates,
//! so an unknown verb is never silently allowed.

use authgate_model::{Action, AttrValue, Operation};
use std::collections::{BTreeMap, HashMap};

/// Built-in verb table shared by the stock adapters.
const DEFAULT_MAPPINGS: &[(&str, Operation)] = &[
    // HTTP methods and read-shaped verbs
    ("GET", Operation::Read),
    ("HEAD", Operation::Read),
    ("OPTIONS", Operation::Read),
    ("FETCH", Operation::Read),
    ("LIST", Operation::Read),
    ("QUERY", Operation::Read),
    ("GET_DATA", Operation::Read),
    // Mutating verbs
    ("POST", Operation::Write),
    ("PUT", Operation::Write),
    ("PATCH", Operation::Write),
    ("DELETE", Operation::Write),
    ("UPDATE", Operation::Write),
    ("SAVE", Operation::Write),
    ("UPDATE_DATA", Operation::Write),
    ("DELETE_DATA", Operation::Write),
    // Invocation verbs
    ("RUN", Operation::Execute),
    ("TRIGGER", Operation::Execute),
    ("EXECUTE", Operation::Execute),
    ("CALL", Operation::Execute),
    ("RUN_COMMAND", Operation::Execute),
];

/// Case-insensitive verb-to-operation table.
#[derive(Debug, Clone)]
pub struct ActionMapper {
    table: HashMap<String, Operation>,
}

impl Default for ActionMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionMapper {
    /// A mapper preloaded with the built-in verb table.
    pub fn new() -> Self {
        let table = DEFAULT_MAPPINGS
            .iter()
            .map(|(verb, op)| (verb.to_string(), *op))
            .collect();
        Self { table }
    }

    /// A mapper with no mappings; every verb classifies as `execute`.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add or override a verb mapping.
    pub fn with_mapping(mut self, verb: &str, operation: Operation) -> Self {
        self.table.insert(verb.to_ascii_uppercase(), operation);
        self
    }

    /// Classify a protocol verb. Unmapped verbs default to
    /// [`Operation::Execute`].
    pub fn operation_for(&self, verb: &str) -> Operation {
        self.table
            .get(&verb.to_ascii_uppercase())
            .copied()
            .unwrap_or(Operation::Execute)
    }

    /// Build an action from a verb and pre-extracted parameters.
    pub fn map(&self, verb: &str, parameters: BTreeMap<String, AttrValue>) -> Action {
        Action::with_parameters(self.operation_for(verb), parameters)
    }

    /// Build an action from a verb and an optional structured payload.
    ///
    /// JSON objects become the action's parameter map; a bare scalar is
    /// kept under a `body` key; nulls and arrays contribute nothing.
    pub fn map_body(&self, verb: &str, body: Option<&serde_json::Value>) -> Action {
        let parameters = match body {
            Some(serde_json::Value::Object(map)) => map
                .iter()
                .filter_map(|(k, v)| AttrValue::from_json(v).map(|av| (k.clone(), av)))
                .collect(),
            Some(value) => AttrValue::from_json(value)
                .map(|av| BTreeMap::from([("body".to_string(), av)]))
                .unwrap_or_default(),
            None => BTreeMap::new(),
        };
        self.map(verb, parameters)
    }
}
