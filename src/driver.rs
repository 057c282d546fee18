//! Batch generation: many arities in, rendered sources out.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexSet;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::arity::Arity;
use crate::assemble::Generator;
use crate::ast::FunctionDecl;
use crate::emit;
use crate::error::GenError;

#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub arity: Arity,
    pub label: String,
    pub function: FunctionDecl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Source,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
    /// one file per function, named by arity label
    Split(PathBuf),
}

/// Drop repeated requests, keeping first-seen order.
pub fn dedupe(requests: impl IntoIterator<Item = Arity>) -> Vec<Arity> {
    requests.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

/// Generate every request in parallel. Output order matches request order.
pub fn generate_all(generator: &Generator, requests: &[Arity]) -> Result<Vec<Generated>, GenError> {
    info!(count = requests.len(), "generating overloads");
    requests
        .par_iter()
        .map(|arity| -> Result<Generated, GenError> {
            let function = generator.generate(arity)?;
            Ok(Generated { arity: *arity, label: arity.label(), function })
        })
        .collect()
}

pub fn render(generator: &Generator, generated: &[Generated], format: Format) -> Result<String> {
    match format {
        Format::Source => {
            let functions: Vec<FunctionDecl> = generated.iter().map(|g| g.function.clone()).collect();
            Ok(emit::render_file(generator.conventions(), &functions))
        }
        Format::Json => {
            let mut src = serde_json::to_string_pretty(generated).context("failed to serialize function records")?;
            src.push('\n');
            Ok(src)
        }
    }
}

/// Write rendered output; returns the files written (empty for stdout).
pub fn write(generator: &Generator, generated: &[Generated], format: Format, sink: &Sink) -> Result<Vec<PathBuf>> {
    match sink {
        Sink::Stdout => {
            print!("{}", render(generator, generated, format)?);
            Ok(Vec::new())
        }
        Sink::File(path) => {
            write_file(path, &render(generator, generated, format)?)?;
            Ok(vec![path.clone()])
        }
        Sink::Split(dir) => {
            std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
            let ext = match format {
                Format::Source => "cs",
                Format::Json => "json",
            };
            let mut written = Vec::with_capacity(generated.len());
            for g in generated {
                let path = dir.join(format!("{}.{ext}", g.label));
                write_file(&path, &render(generator, std::slice::from_ref(g), format)?)?;
                written.push(path);
            }
            Ok(written)
        }
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}
