use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What a driver run records next to its output.
pub struct Payload {
    pub params: Value,
    pub outcome: Value,
}

impl Payload {
    pub fn new(params: Value, outcome: Value) -> Self {
        Self { params, outcome }
    }
}

/// Write the provenance document to `target`: code revision, callsite,
/// library version, params and outcome.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(target: P, payload: Payload) -> Result<PathBuf> {
    let target = target.as_ref();
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "pathops_version": pathops::VERSION,
        "params": payload.params,
        "outcome": payload.outcome
    });
    fs::write(target, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", target.display()))?;
    Ok(target.to_path_buf())
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT") {
        if !from_env.is_empty() {
            return from_env.to_string();
        }
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string())
}
