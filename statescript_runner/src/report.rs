use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use statescript_engine::{ActionRegistry, Machine, TransitionRecord};
use statescript_graph::Value;

/// Everything a run leaves behind, in one serializable record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub graph: String,
    pub ticks: u64,
    pub elapsed: f64,
    pub final_state: String,
    pub discarded_sends: u64,
    pub transitions: Vec<TransitionRecord>,
    pub variables: BTreeMap<String, Value>,
    /// Where the owner entity ended up, for graphs that move or rotate it.
    pub entity_translation: [f32; 3],
    pub entity_rotation_euler: [f32; 3],
}

impl RunSummary {
    pub fn from_machine(graph_id: &str, machine: &Machine) -> Self {
        let owner = &machine.host().owner;
        let (rx, ry, rz) = owner.rotation_euler_xyz();
        RunSummary {
            graph: graph_id.to_string(),
            ticks: machine.ticks(),
            elapsed: machine.elapsed(),
            final_state: machine.current_state_id().to_string(),
            discarded_sends: machine.discarded_sends(),
            transitions: machine.journal().to_vec(),
            variables: machine.variables().values().clone(),
            entity_translation: owner.world_translation().to_array(),
            entity_rotation_euler: [rx, ry, rz],
        }
    }
}

pub fn write_journal(path: &Path, summary: &RunSummary) -> Result<()> {
    let json =
        serde_json::to_string_pretty(summary).context("serializing run summary to JSON")?;
    fs::write(path, &json)
        .with_context(|| format!("writing run summary to {}", path.display()))?;
    println!("Saved run summary to {}", path.display());
    Ok(())
}

/// Dump the builtin descriptor catalog for the authoring tool.
pub fn write_catalog(path: &Path, registry: &ActionRegistry) -> Result<()> {
    let descriptors: Vec<_> = registry.descriptors().collect();
    let json = serde_json::to_string_pretty(&descriptors)
        .context("serializing action descriptor catalog to JSON")?;
    fs::write(path, &json)
        .with_context(|| format!("writing descriptor catalog to {}", path.display()))?;
    println!("Saved descriptor catalog to {}", path.display());
    Ok(())
}
