use annocollect::prelude::*;
use anyhow::Context;
use clap::{
    Args,
    ValueEnum,
};
use log::info;

use crate::utils::{
    print_results,
    ScopeArgs,
};

/// Default result cap when `--max` is not given.
const MAX_SIZE_ENV: &str = "ANNOCOLLECT_MAX_SIZE";

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum CliSortOrder {
    Normal,
    Reverse,
    None,
}

impl From<CliSortOrder> for SortOrder {
    fn from(value: CliSortOrder) -> Self {
        match value {
            CliSortOrder::Normal => SortOrder::Normal,
            CliSortOrder::Reverse => SortOrder::Reverse,
            CliSortOrder::None => SortOrder::None,
        }
    }
}

/// Query region shared by the sequence-based commands.
#[derive(Args, Debug, Clone)]
pub(crate) struct RegionArgs {
    #[arg(long, required = true, help = "Sequence id to search")]
    seq: String,

    #[arg(long, help = "Start of the searched range (0-based)")]
    from: Option<u32>,

    #[arg(long, help = "End of the searched range (exclusive)")]
    to: Option<u32>,

    #[arg(long, default_value = ".", help = "Strand of the query: +, - or .")]
    strand: String,
}

impl RegionArgs {
    pub(crate) fn seq_id(&self) -> SeqIdStr {
        SeqIdStr::from(self.seq.as_str())
    }

    pub(crate) fn range(&self) -> SeqRange {
        match (self.from, self.to) {
            (None, None) => SeqRange::whole(),
            (from, to) => {
                SeqRange::wrapped(from.unwrap_or(0), to.unwrap_or(PosType::MAX))
            },
        }
    }

    pub(crate) fn strand(&self) -> Strand {
        // Parsing a strand never fails; unknown symbols are unstranded.
        self.strand.parse().unwrap_or_default()
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CollectArgs {
    #[clap(flatten)]
    scope: ScopeArgs,

    #[clap(flatten)]
    region: RegionArgs,

    #[arg(long, help = "Segment resolution depth")]
    depth: Option<usize>,

    #[arg(long, help = "Maximum number of results [env: ANNOCOLLECT_MAX_SIZE]")]
    max: Option<usize>,

    #[arg(long, value_enum, help = "Result order")]
    sort: Option<CliSortOrder>,

    #[arg(long, help = "Stop descending once genes, CDS or mRNAs are found")]
    adaptive: bool,
}

impl CollectArgs {
    fn max_size(&self) -> anyhow::Result<Option<usize>> {
        if self.max.is_some() {
            return Ok(self.max);
        }
        match std::env::var(MAX_SIZE_ENV) {
            Ok(value) => {
                let max = value
                    .parse()
                    .with_context(|| format!("invalid {} value '{}'", MAX_SIZE_ENV, value))?;
                Ok(Some(max))
            },
            Err(_) => Ok(None),
        }
    }

    fn selector(&self) -> anyhow::Result<AnnotSelector> {
        let mut selector = self.scope.load_selector()?;
        if let Some(depth) = self.depth {
            selector = selector.with_resolve_depth(depth);
        }
        if let Some(sort) = self.sort {
            selector = selector.with_sort_order(sort.into());
        }
        if let Some(max) = self.max_size()? {
            selector = selector.with_max_size(Some(max));
        }
        if self.adaptive {
            selector = selector.with_adaptive_depth(true);
        }
        Ok(selector)
    }

    pub(crate) fn run(&self) -> anyhow::Result<()> {
        let scope = self.scope.load_scope()?;
        let selector = self.selector()?;
        let range = self.region.range();

        let result = AnnotCollector::new(&scope, &selector)
            .collect_by_single_sequence(&self.region.seq_id(), range, self.region.strand())
            .with_context(|| format!("collecting {}:{}", self.region.seq, range))?;
        info!("Collected {} annotations", result.len());
        print_results(&result);
        Ok(())
    }
}
