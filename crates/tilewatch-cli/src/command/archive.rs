use std::path::PathBuf;

use anyhow::Context;
use tilewatch_record::{archive::ExportFormat, store::RecordStore};
use tilewatch_tracker::TrackerSession;

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ExportArg {
    /// Export format; decides the default file name
    #[arg(long, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
    /// Output file path, or `-` for stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ImportArg {
    /// Previously exported history
    path: PathBuf,
}

pub(crate) fn run_export<S>(session: &TrackerSession<S>, arg: &ExportArg) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let path = arg
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(arg.format.file_name()));
    let mut output = Output::for_path(&path)?;
    session
        .export(&mut output)
        .with_context(|| format!("Failed to export history to {}", output.display_path()))?;
    eprintln!(
        "Exported {} games to {}",
        session.history().len(),
        output.display_path()
    );
    Ok(())
}

pub(crate) fn run_import<S>(session: &mut TrackerSession<S>, arg: &ImportArg) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let document = util::read_text_file("import", &arg.path)?;
    let count = session
        .import(&document)
        .with_context(|| format!("Failed to import {}", arg.path.display()))?;
    eprintln!("Imported {count} games from {}", arg.path.display());
    println!("{}", session.status());
    Ok(())
}

pub(crate) fn run_clear<S>(session: &mut TrackerSession<S>) -> anyhow::Result<()>
where
    S: RecordStore,
{
    let count = session.history().len();
    session.clear().context("Failed to clear history")?;
    eprintln!("Cleared {count} games");
    Ok(())
}
