use std::fs::File;
use std::io::BufReader;
use std::path::{
    Path,
    PathBuf,
};

use annocollect::prelude::*;
use anyhow::{
    bail,
    Context,
};
use clap::Args;
use log::{
    info,
    LevelFilter,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    /// Verbosity level (0 = info, 1 = debug, 2 = trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl UtilsArgs {
    /// Initializes logging. `RUST_LOG` overrides the verbosity flag.
    pub(crate) fn setup(&self) -> anyhow::Result<()> {
        let mut builder = pretty_env_logger::formatted_builder();
        builder.filter_level(match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        builder.try_init()?;
        Ok(())
    }
}

/// Arguments shared by every command reading a scope file.
#[derive(Args, Debug, Clone)]
pub(crate) struct ScopeArgs {
    #[arg(long, required = true, help = "Path to the JSON scope description")]
    scope: PathBuf,

    #[arg(long, help = "Path to a JSON selector; unset fields keep defaults")]
    selector: Option<PathBuf>,
}

impl ScopeArgs {
    pub(crate) fn load_scope(&self) -> anyhow::Result<Scope> {
        validate_input(&self.scope)?;
        let scope = Scope::from_path(&self.scope)
            .with_context(|| format!("reading scope {}", self.scope.display()))?;
        info!(
            "Loaded scope {} with {} containers",
            self.scope.display(),
            scope.containers().count()
        );
        Ok(scope)
    }

    pub(crate) fn load_selector(&self) -> anyhow::Result<AnnotSelector> {
        let Some(path) = self.selector.as_ref() else {
            return Ok(AnnotSelector::default());
        };
        validate_input(path)?;
        let reader = BufReader::new(File::open(path)?);
        serde_json::from_reader(reader)
            .with_context(|| format!("parsing selector {}", path.display()))
    }
}

pub(crate) fn validate_input(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!("File {} does not exist", path.display());
    }
    if !path.is_file() {
        bail!("Path {} is not a file", path.display());
    }
    Ok(())
}

/// One TSV line per result.
pub(crate) fn print_results(result: &AnnotResultSet) {
    println!("container\tindex\tkind\tsubtype\tfrom\tto\tstrand\tpartial");
    for item in result.iter() {
        let reference = item.reference();
        let range = item.mapped_range();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            reference.container_id(),
            reference.index(),
            item.kind(),
            reference
                .subtype()
                .map(|s| s.to_string())
                .unwrap_or_else(|| ".".into()),
            range.from(),
            range.to(),
            item.mapped_strand(),
            item.is_partial()
        );
    }
}
