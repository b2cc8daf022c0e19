use anyhow::{Context, Result};
use statescript_engine::{ActionRegistry, Machine, MachineHost};
use statescript_graph::GraphDoc;

mod cli;
mod report;
mod script;

use report::RunSummary;
use script::EventScript;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse()?;
    let registry = ActionRegistry::builtin();

    if let Some(path) = args.describe_actions.as_ref() {
        report::write_catalog(path, &registry)?;
    }

    let Some(graph_path) = args.graph.as_ref() else {
        return Ok(());
    };

    let doc = GraphDoc::load(graph_path)?;
    let script = match args.script.as_ref() {
        Some(path) => EventScript::load(path)?,
        None => EventScript::default(),
    };

    let host = MachineHost::new();
    let mut machine = Machine::load(&doc, &registry, host.clone())
        .with_context(|| format!("loading graph `{}`", doc.id))?;
    machine.start();

    for tick in 1..=args.ticks {
        for event in script.due(tick) {
            event.apply(&mut machine, &host);
        }
        let applied = machine.journal().len();
        machine.update(args.tpf);
        if args.verbose {
            for record in &machine.journal()[applied..] {
                eprintln!(
                    "[statescript_runner] tick {}: `{}` --{}--> `{}`",
                    record.tick, record.from, record.key, record.to
                );
            }
        }
    }
    machine.unload();

    let summary = RunSummary::from_machine(&doc.id, &machine);
    println!(
        "Graph `{}` ran {} ticks ({:.3}s simulated): {} transition(s), final state `{}`",
        summary.graph,
        summary.ticks,
        summary.elapsed,
        summary.transitions.len(),
        summary.final_state
    );

    if let Some(path) = args.journal_json.as_ref() {
        report::write_journal(path, &summary)?;
    }

    Ok(())
}
