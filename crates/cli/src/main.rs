use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use pathops::fixture::union_fixture;
use pathops::prelude::*;
use serde::Serialize;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "pathops-cli")]
#[command(about = "Union the captured regression paths and print the result")]
struct Cmd {
    /// Submit the second fixture path before the first
    #[arg(long)]
    swap: bool,

    /// Print the verb stream as a JSON array
    #[arg(long)]
    json: bool,

    /// Write a provenance JSON document to this file
    #[arg(long, value_name = "FILE")]
    provenance: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug); warnings only by default
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct VerbRecord {
    verb: &'static str,
    points: Vec<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f32>,
}

impl From<Segment> for VerbRecord {
    fn from(seg: Segment) -> Self {
        let weight = match seg {
            Segment::Conic(_, _, _, w) => Some(w),
            _ => None,
        };
        Self {
            verb: seg.verb().name(),
            points: seg.end_points().iter().map(|p| [p.x, p.y]).collect(),
            weight,
        }
    }
}

fn main() -> ExitCode {
    let cmd = Cmd::parse();
    let level = match cmd.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(&cmd) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the union does not resolve; nothing is printed then.
fn run(cmd: &Cmd) -> Result<bool> {
    let (path1, path2) = union_fixture();
    let (first, second) = if cmd.swap {
        (&path2, &path1)
    } else {
        (&path1, &path2)
    };
    let stdout = io::stdout();
    let emitted = union_and_emit(first, second, cmd.json, &mut stdout.lock())?;
    let ok = emitted.is_some();
    let verbs = emitted.unwrap_or(0);
    tracing::info!(ok, verbs, "done");

    if let Some(target) = &cmd.provenance {
        let payload = provenance::Payload::new(
            serde_json::json!({ "swap": cmd.swap, "json": cmd.json, "op": "union" }),
            serde_json::json!({ "ok": ok, "verbs": verbs }),
        );
        let written = provenance::write_sidecar(target, payload)?;
        tracing::info!(path = %written.display(), "provenance");
    }
    Ok(ok)
}

/// Union `first` and `second` and write the result to `out`. `None` when the
/// builder fails; `out` is left untouched then.
fn union_and_emit<W: Write>(
    first: &Path,
    second: &Path,
    json: bool,
    out: &mut W,
) -> Result<Option<usize>> {
    let mut builder = OpBuilder::new();
    builder.add(first, PathOp::Union);
    builder.add(second, PathOp::Union);
    tracing::info!(operands = builder.len(), "union");

    let mut result = Path::new();
    if !builder.resolve_into(&mut result) {
        return Ok(None);
    }
    emit(&result, json, out).map(Some)
}

fn emit<W: Write>(result: &Path, json: bool, out: &mut W) -> Result<usize> {
    let count = if json {
        let records: Vec<VerbRecord> = result.iter(false).map(VerbRecord::from).collect();
        serde_json::to_writer_pretty(&mut *out, &records).context("writing JSON")?;
        writeln!(out)?;
        records.len()
    } else {
        write_verbs(result, &mut *out).context("writing verb stream")?
    };
    out.flush()?;
    Ok(count)
}
