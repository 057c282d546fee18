//! Sweeps an arity grid and checks structural properties of every generated overload.
//!
//! ```text
//! cargo run -p dev-test-runner [grid.json]
//! ```
use std::collections::HashSet;
use std::process::ExitCode;

use branchgen::emit::render_function;
use branchgen::{Arity, Conventions, FunctionDecl, Generator, Grid};
use colored::Colorize;
use once_cell::sync::Lazy;
use regex::Regex;

static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

fn default_grid() -> Grid {
    Grid::up_to(4, 3, 1, 14, vec![false, true])
}

fn load_grid(path: &str) -> Result<Grid, String> {
    let src = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    let de = &mut serde_json::Deserializer::from_str(&src);
    serde_path_to_error::deserialize(de).map_err(|e| format!("{path}: at JSON path {} → {}", e.path(), e.inner()))
}

/// Every failed property, as a short message.
fn check(generator: &Generator, arity: &Arity, f: &FunctionDecl) -> Vec<String> {
    let mut failures = Vec::new();

    if f.name != arity.function_name() {
        failures.push(format!("name {} != {}", f.name, arity.function_name()));
    }
    if f.params.len() != arity.zip + arity.redux + 2 {
        failures.push(format!("{} params, expected {}", f.params.len(), arity.zip + arity.redux + 2));
    }
    for name in f.params.iter().map(|p| p.name.as_str()).chain(f.generics.iter().map(String::as_str)) {
        if !IDENT.is_match(name) {
            failures.push(format!("bad identifier {name:?}"));
        }
    }
    let unique: HashSet<&String> = f.generics.iter().collect();
    if unique.len() != f.generics.len() {
        failures.push(format!("repeated type parameters {:?}", f.generics));
    }
    if f.generics.len() != arity.zip + arity.redux + arity.out {
        failures.push(format!("{} type parameters", f.generics.len()));
    }
    if arity.out >= 14 && !f.generics.iter().any(|g| g == "AA") {
        failures.push("14th output is not AA".to_string());
    }
    if f.constraints.len() != f.generics.len() {
        failures.push(format!("{} constraints for {} type parameters", f.constraints.len(), f.generics.len()));
    }

    let first = render_function(generator.conventions(), f);
    match generator.generate(arity) {
        Ok(again) if render_function(generator.conventions(), &again) == first => {}
        Ok(_) => failures.push("output differs between runs".to_string()),
        Err(e) => failures.push(format!("second run failed: {e}")),
    }
    if first.matches("Parallel.For(").count() != 2 {
        failures.push("expected an outer and an inner parallel loop".to_string());
    }

    failures
}

fn main() -> ExitCode {
    let grid = match std::env::args().nth(1) {
        Some(path) => match load_grid(&path) {
            Ok(grid) => grid,
            Err(msg) => {
                eprintln!("{} {msg}", "error:".red().bold());
                return ExitCode::FAILURE;
            }
        },
        None => default_grid(),
    };
    let arities = match grid.expand() {
        Ok(xs) => xs,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let generator = Generator::new(Conventions::default());
    let mut failed = 0usize;
    for arity in &arities {
        let failures = match generator.generate(arity) {
            Ok(f) => check(&generator, arity, &f),
            Err(e) => vec![e.to_string()],
        };
        if failures.is_empty() {
            continue;
        }
        failed += 1;
        eprintln!("{} {}", "✗".red().bold(), arity.label());
        for msg in failures {
            eprintln!("    {msg}");
        }
    }

    if failed == 0 {
        eprintln!("{} {}/{} overloads", "✓ passed".green().bold(), arities.len(), arities.len());
        ExitCode::SUCCESS
    } else {
        eprintln!("{} {failed} of {} overloads", "✗ failed".red().bold(), arities.len());
        ExitCode::FAILURE
    }
}
