//! Minimal CLI: arity grid or manifest → (source | json)
use std::path::PathBuf;
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::arity::{Arity, Grid};
use crate::assemble::Generator;
use crate::conventions::Conventions;
use crate::driver::{self, Format, Sink};
use crate::manifest::Manifest;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate broadcast traversal overloads for synchronized branched trees
#[derive(Parser, Debug)]
#[command(name = "branchgen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate a grid (or manifest) of overloads into one file, a directory, or stdout
    Generate(GenerateOut),
    /// render a single overload
    Show(ShowOut),
}

#[derive(Args, Debug, Clone)]
struct RenderSettings {
    /// output representation
    #[arg(long, value_enum, default_value_t = OutputFormat::Source)]
    format: OutputFormat,

    /// JSON file overriding runtime names (tree type, capability tag, helpers, ...)
    #[arg(long)]
    conventions: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct GridSettings {
    /// largest zip arity (grid starts at 0)
    #[arg(long, default_value_t = 3)]
    max_zip: usize,

    /// largest reduce arity (grid starts at 0)
    #[arg(long, default_value_t = 2)]
    max_redux: usize,

    /// smallest output arity
    #[arg(long, default_value_t = 1)]
    min_out: usize,

    /// largest output arity
    #[arg(long, default_value_t = 3)]
    max_out: usize,

    /// which layout modes to generate
    #[arg(long, value_enum, default_value_t = GraftMode::Both)]
    graft: GraftMode,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    grid: GridSettings,

    /// One or more JSON manifests. May be literal paths or quoted glob patterns.
    /// Replaces the grid flags when given.
    #[arg(long, num_args = 1..)]
    manifest: Vec<String>,

    #[command(flatten)]
    render: RenderSettings,

    /// output file (stdout if omitted)
    #[arg(short, long, conflicts_with = "split")]
    out: Option<PathBuf>,

    /// write one file per overload into this directory
    #[arg(long)]
    split: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ShowOut {
    /// number of zipped trees
    #[arg(long, default_value_t = 1)]
    zip: usize,

    /// number of reduced trees
    #[arg(long, default_value_t = 0)]
    redux: usize,

    /// number of output trees
    #[arg(long, default_value_t = 1)]
    out: usize,

    /// one sub-branch per computed item
    #[arg(long)]
    graft: bool,

    #[command(flatten)]
    render: RenderSettings,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Source,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum GraftMode {
    Yes,
    No,
    Both,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// `RUST_LOG` overrides the default filter. Logs go to stderr; stdout carries output only.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("branchgen=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

impl From<OutputFormat> for Format {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Source => Format::Source,
            OutputFormat::Json => Format::Json,
        }
    }
}

impl GraftMode {
    fn modes(self) -> Vec<bool> {
        match self {
            GraftMode::Yes => vec![true],
            GraftMode::No => vec![false],
            GraftMode::Both => vec![false, true],
        }
    }
}

impl RenderSettings {
    /// Explicit `--conventions` wins over anything a manifest carries.
    fn generator(&self, from_manifest: Option<Conventions>) -> Result<Generator> {
        let conventions = match (&self.conventions, from_manifest) {
            (Some(path), _) => Conventions::load(path)?,
            (None, Some(conv)) => conv,
            (None, None) => Conventions::default(),
        };
        Ok(Generator::new(conventions))
    }
}

impl GenerateOut {
    /// Requests and any manifest-supplied conventions.
    fn load_requests(&self) -> Result<(Vec<Arity>, Option<Conventions>)> {
        if self.manifest.is_empty() {
            let g = &self.grid;
            if g.min_out > g.max_out {
                bail!("--min-out ({}) exceeds --max-out ({})", g.min_out, g.max_out);
            }
            let grid = Grid::up_to(g.max_zip, g.max_redux, g.min_out, g.max_out, g.graft.modes());
            return Ok((grid.expand()?, None));
        }

        let mut requests = Vec::new();
        let mut conventions: Option<Conventions> = None;
        for path in resolve_file_path_patterns(&self.manifest)? {
            let manifest = Manifest::load(&path)?;
            debug!(path = %path.display(), "manifest loaded");
            requests.extend(manifest.arities()?);
            match (&conventions, manifest.conventions) {
                (Some(seen), Some(other)) if *seen != other => {
                    bail!("manifest {} disagrees with an earlier manifest on conventions", path.display());
                }
                (None, Some(other)) => conventions = Some(other),
                _ => {}
            }
        }
        Ok((requests, conventions))
    }

    fn sink(&self) -> Sink {
        match (&self.out, &self.split) {
            (_, Some(dir)) => Sink::Split(dir.clone()),
            (Some(file), None) => Sink::File(file.clone()),
            (None, None) => Sink::Stdout,
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                // 1) collect requests
                let (requests, manifest_conventions) = target.load_requests()?;
                let requests = driver::dedupe(requests);
                let generator = target.render.generator(manifest_conventions)?;

                // 2) generate
                let generated = driver::generate_all(&generator, &requests)?;

                // 3) render & write
                let sink = target.sink();
                let written = driver::write(&generator, &generated, target.render.format.into(), &sink)?;
                info!(functions = generated.len(), files = written.len(), "done");
                match sink {
                    Sink::Stdout => {}
                    Sink::File(path) => eprintln!(
                        "{} {} overloads → {}",
                        "generated".green().bold(),
                        generated.len(),
                        path.display()
                    ),
                    Sink::Split(dir) => eprintln!(
                        "{} {} overloads → {} ({} files)",
                        "generated".green().bold(),
                        generated.len(),
                        dir.display(),
                        written.len()
                    ),
                }
                Ok(())
            }
            Command::Show(target) => {
                let arity = Arity::new(target.zip, target.redux, target.out, target.graft)?;
                let generator = target.render.generator(None)?;
                let function = generator
                    .generate(&arity)
                    .with_context(|| format!("failed to generate {}", arity.label()))?;
                match target.render.format {
                    OutputFormat::Source => {
                        print!("{}", crate::emit::render_function(generator.conventions(), &function));
                    }
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&function)?);
                    }
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLineInterface {
        CommandLineInterface::try_parse_from(std::iter::once("branchgen").chain(args.iter().copied())).unwrap()
    }

    fn generate_out(cli: &CommandLineInterface) -> &GenerateOut {
        match &cli.cmd {
            Command::Generate(g) => g,
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn grid_flags_expand() {
        let cli = parse(&["generate", "--max-zip", "1", "--max-redux", "0", "--max-out", "2", "--graft", "no"]);
        let (requests, conventions) = generate_out(&cli).load_requests().unwrap();
        assert!(conventions.is_none());
        assert_eq!(requests.len(), 4);
        assert!(requests.iter().all(|a| !a.graft));
    }

    #[test]
    fn inverted_out_range_is_rejected() {
        let cli = parse(&["generate", "--min-out", "3", "--max-out", "2"]);
        assert!(generate_out(&cli).load_requests().is_err());
    }

    #[test]
    fn out_and_split_conflict() {
        let args = ["branchgen", "generate", "--out", "a.cs", "--split", "dir"];
        assert!(CommandLineInterface::try_parse_from(args).is_err());
    }

    #[test]
    fn manifests_resolve_through_globs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{ "requests": [{ "zip": 1, "redux": 0, "out": 1 }], "conventions": { "capability": "IGoo" } }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("b.json"),
            r#"{ "requests": [{ "zip": 1, "redux": 0, "out": 1 }, { "zip": 0, "redux": 2, "out": 1 }] }"#,
        )
        .unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let cli = parse(&["generate", "--manifest", &pattern]);
        let (requests, conventions) = generate_out(&cli).load_requests().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(driver::dedupe(requests).len(), 2);
        assert_eq!(conventions.unwrap().capability, "IGoo");
    }

    #[test]
    fn conflicting_manifest_conventions_fail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), r#"{ "conventions": { "capability": "IGoo" } }"#).unwrap();
        std::fs::write(dir.path().join("b.json"), r#"{ "conventions": { "capability": "IThing" } }"#).unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        let cli = parse(&["generate", "--manifest", &pattern]);
        assert!(generate_out(&cli).load_requests().is_err());
    }

    #[test]
    fn empty_glob_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(resolve_file_path_patterns([pattern]).is_err());
    }

    #[test]
    fn sink_selection() {
        assert_eq!(generate_out(&parse(&["generate"])).sink(), Sink::Stdout);
        assert_eq!(
            generate_out(&parse(&["generate", "-o", "x.cs"])).sink(),
            Sink::File(PathBuf::from("x.cs"))
        );
        assert_eq!(
            generate_out(&parse(&["generate", "--split", "gen"])).sink(),
            Sink::Split(PathBuf::from("gen"))
        );
    }
}
