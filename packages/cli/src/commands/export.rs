use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Document, ExportStage};
use std::path::PathBuf;

use super::load_schema;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Node schema (.json) to load
    pub input: PathBuf,

    /// Export for copy/paste: node ids are dropped
    #[arg(long)]
    pub clone: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Load a schema into a document and export it again, normalizing it:
/// missing ids are generated, unset and empty values are dropped.
pub fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let schema = load_schema(&args.input)?;
    let doc = Document::from_schema(&schema, &config.document);

    let stage = if args.clone {
        ExportStage::Clone
    } else {
        ExportStage::Serialize
    };
    let json = config.to_json(&doc.export(stage))?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)?;
            eprintln!(
                "{} {} nodes → {}",
                "Exported".green().bold(),
                doc.node_count(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
