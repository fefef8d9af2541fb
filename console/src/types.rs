use annocollect::prelude::*;
use anyhow::Context;
use clap::Args;

use crate::collect::RegionArgs;
use crate::utils::ScopeArgs;

#[derive(Args, Debug, Clone)]
pub(crate) struct TypesArgs {
    #[clap(flatten)]
    scope: ScopeArgs,

    #[clap(flatten)]
    region: RegionArgs,

    #[arg(long, help = "Segment resolution depth")]
    depth: Option<usize>,
}

impl TypesArgs {
    pub(crate) fn run(&self) -> anyhow::Result<()> {
        let scope = self.scope.load_scope()?;
        let mut selector = self.scope.load_selector()?.with_collect_types(true);
        if let Some(depth) = self.depth {
            selector = selector.with_resolve_depth(depth);
        }

        let result = AnnotCollector::new(&scope, &selector)
            .collect_by_single_sequence(
                &self.region.seq_id(),
                self.region.range(),
                self.region.strand(),
            )
            .with_context(|| format!("probing types on {}", self.region.seq_id()))?;
        for key in result.annot_types() {
            match key {
                AnnotTypeKey::Feat(subtype) => {
                    println!("{}\t{:?}\t{}", key.kind(), subtype.feat_type(), subtype)
                },
                _ => println!("{}\t.\t.", key.kind()),
            }
        }
        Ok(())
    }
}
