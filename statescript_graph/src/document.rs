//! Persisted state-graph layout.
//!
//! A graph document is the unit of save/load and editor round-tripping:
//! states in authoring order, each with its ordered action instances and
//! its transition table. Serialize-then-deserialize must reproduce an
//! identical document, so collections with meaningful order are `Vec`s and
//! keyed tables are `BTreeMap`s.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// One configured action instance inside a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDoc {
    /// Registry key of the variant this instance configures.
    pub variant_key: String,
    /// Parameter key -> value; keys absent here fall back to the
    /// descriptor defaults at load time.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, Value>,
    /// Descriptor outlet key -> symbolic transition key.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transitions: BTreeMap<String, String>,
}

/// One named state: ordered actions plus its transition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDoc {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDoc>,
    /// Symbolic transition key -> target state id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transitions: BTreeMap<String, String>,
}

/// A complete authored state graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDoc {
    pub id: String,
    pub initial_state: String,
    /// Seed values for the machine's shared variable store.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,
    pub states: Vec<StateDoc>,
}

impl GraphDoc {
    pub fn state(&self, id: &str) -> Option<&StateDoc> {
        self.states.iter().find(|state| state.id == id)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading graph document {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("parsing graph document {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json().context("serializing graph document")?;
        fs::write(path, json)
            .with_context(|| format!("writing graph document {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphDoc {
        GraphDoc {
            id: "door".to_string(),
            initial_state: "closed".to_string(),
            variables: BTreeMap::from([
                ("opens".to_string(), Value::Int(0)),
                ("limit".to_string(), Value::Int(3)),
            ]),
            states: vec![
                StateDoc {
                    id: "closed".to_string(),
                    actions: vec![ActionDoc {
                        variant_key: "keyDown".to_string(),
                        settings: BTreeMap::from([(
                            "key".to_string(),
                            Value::String("E".to_string()),
                        )]),
                        transitions: BTreeMap::from([(
                            "keydown".to_string(),
                            "toOpen".to_string(),
                        )]),
                    }],
                    transitions: BTreeMap::from([(
                        "toOpen".to_string(),
                        "open".to_string(),
                    )]),
                },
                StateDoc {
                    id: "open".to_string(),
                    actions: Vec::new(),
                    transitions: BTreeMap::new(),
                },
            ],
        }
    }

    #[test]
    fn json_roundtrip_reproduces_identical_document() {
        let doc = sample();
        let json = doc.to_json().expect("serialize graph");
        let back = GraphDoc::from_json(&json).expect("parse graph");
        assert_eq!(back, doc);
    }

    #[test]
    fn empty_tables_are_omitted_and_defaulted() {
        let json = sample().to_json().expect("serialize graph");
        assert!(!json.contains("\"actions\": []"));
        let minimal = r#"{
            "id": "g",
            "initialState": "only",
            "states": [{ "id": "only" }]
        }"#;
        let doc = GraphDoc::from_json(minimal).expect("parse minimal graph");
        assert!(doc.variables.is_empty());
        assert!(doc.states[0].actions.is_empty());
        assert!(doc.states[0].transitions.is_empty());
    }

    #[test]
    fn file_roundtrip_through_tempdir() -> Result<()> {
        let dir = tempfile::tempdir().context("creating temp dir")?;
        let path = dir.path().join("door.graph.json");
        let doc = sample();
        doc.save(&path)?;
        let loaded = GraphDoc::load(&path)?;
        assert_eq!(loaded, doc);
        Ok(())
    }

    #[test]
    fn state_lookup_by_id() {
        let doc = sample();
        assert!(doc.state("open").is_some());
        assert!(doc.state("missing").is_none());
    }
}
