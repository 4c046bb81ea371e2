use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Document, ExportStage, HistoryState, ManualClock, NodeId, NodeSchema};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

use super::load_schema;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Node schema (.json) to start from
    pub input: PathBuf,

    /// Edit script: a JSON array of steps
    pub script: PathBuf,

    /// Print only the final snapshot
    #[arg(short, long)]
    pub quiet: bool,
}

/// One scripted edit. Steps run back to back on a manual clock, so they
/// share an undo step unless separated by a `wait`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Step {
    Set {
        node: NodeId,
        path: String,
        value: Value,
    },
    SetExtra {
        node: NodeId,
        path: String,
        value: Value,
    },
    Unset {
        node: NodeId,
        path: String,
    },
    Merge {
        node: NodeId,
        #[serde(default)]
        props: Option<Map<String, Value>>,
        #[serde(default)]
        extras: Option<Map<String, Value>>,
    },
    Insert {
        parent: NodeId,
        schema: NodeSchema,
        #[serde(default)]
        at: Option<usize>,
    },
    Move {
        node: NodeId,
        parent: NodeId,
        #[serde(default)]
        at: Option<usize>,
    },
    Unlink {
        node: NodeId,
    },
    Remove {
        node: NodeId,
    },
    Wait {
        ms: u64,
    },
    Undo,
    Redo,
    Save,
}

pub fn replay(args: ReplayArgs, config: &Config) -> Result<()> {
    let schema = load_schema(&args.input)?;
    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read {}", args.script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid edit script in {}", args.script.display()))?;

    let clock = ManualClock::new();
    let mut doc = Document::from_schema(&schema, &config.document);
    let history_config = config.document.history.clone().unwrap_or_default();
    doc.attach_history(&history_config, Rc::new(clock.clone()));

    if !args.quiet {
        eprintln!("🔁 {} {} steps", "Replaying".green().bold(), steps.len());
    }

    for (index, step) in steps.iter().enumerate() {
        let outcome = run_step(&mut doc, &clock, step)
            .with_context(|| format!("Step {} failed", index + 1))?;
        if !args.quiet {
            eprintln!("   {} {}", "✓".green(), outcome);
        }
    }

    println!("{}", config.to_json(&doc.export(ExportStage::Serialize))?);

    if !args.quiet {
        if let Some(history) = doc.history() {
            eprintln!();
            eprintln!(
                "   Records: {}  Cursor: {}  State: {}",
                history.records_len(),
                history.cursor(),
                describe_state(history.state())
            );
        }
    }

    Ok(())
}

/// Apply one step, returning a short description of what happened
pub fn run_step(doc: &mut Document, clock: &ManualClock, step: &Step) -> Result<String> {
    debug!(?step, "running step");
    let outcome = match step {
        Step::Set { node, path, value } => {
            let changed = doc.set_prop(node, path, value.clone())?;
            format!("set {node}.{path}{}", unchanged(changed))
        }
        Step::SetExtra { node, path, value } => {
            let changed = doc.set_extra(node, path, value.clone())?;
            format!("set extra {node}.{path}{}", unchanged(changed))
        }
        Step::Unset { node, path } => {
            let changed = doc.unset_prop(node, path)?;
            format!("unset {node}.{path}{}", unchanged(changed))
        }
        Step::Merge { node, props, extras } => {
            let changed = doc.merge_props(node, props.as_ref(), extras.as_ref())?;
            format!("merge into {node}{}", unchanged(changed))
        }
        Step::Insert { parent, schema, at } => {
            let child = doc.create_node(schema);
            let index = doc.insert_child(parent, &child, *at)?;
            format!("insert {child} under {parent} at {index}")
        }
        Step::Move { node, parent, at } => {
            let index = doc.insert_child(parent, node, *at)?;
            format!("move {node} under {parent} at {index}")
        }
        Step::Unlink { node } => {
            let unlinked = doc.unlink_child(node)?;
            format!("unlink {node}{}", unchanged(unlinked))
        }
        Step::Remove { node } => {
            doc.remove_node(node)?;
            format!("remove {node}")
        }
        Step::Wait { ms } => {
            clock.advance(*ms);
            format!("wait {ms}ms")
        }
        Step::Undo => format!("undo{}", unchanged(doc.undo())),
        Step::Redo => format!("redo{}", unchanged(doc.redo())),
        Step::Save => {
            doc.save_point();
            "save point".to_string()
        }
    };
    Ok(outcome)
}

fn unchanged(changed: bool) -> &'static str {
    if changed {
        ""
    } else {
        " (no change)"
    }
}

fn describe_state(state: HistoryState) -> String {
    let mut flags = Vec::new();
    if state.contains(HistoryState::UNDOABLE) {
        flags.push("undoable");
    }
    if state.contains(HistoryState::REDOABLE) {
        flags.push("redoable");
    }
    flags.push(if state.contains(HistoryState::UNMODIFIED) {
        "saved"
    } else {
        "modified"
    });
    format!("{} ({})", flags.join(", "), state.bits())
}
