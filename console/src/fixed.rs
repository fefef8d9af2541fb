use annocollect::prelude::*;
use anyhow::{
    anyhow,
    Context,
};
use clap::Args;
use log::info;

use crate::utils::{
    print_results,
    ScopeArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct FixedArgs {
    #[clap(flatten)]
    scope: ScopeArgs,

    #[arg(long, required = true, help = "Id of the container to walk")]
    container: ContainerId,
}

impl FixedArgs {
    pub(crate) fn run(&self) -> anyhow::Result<()> {
        let scope = self.scope.load_scope()?;
        let selector = self.scope.load_selector()?;
        let container = scope
            .container(self.container)
            .ok_or_else(|| anyhow!("Container {} is not in the scope", self.container))?;
        info!("Walking container {} ({})", container.id(), container.label());

        let result = AnnotCollector::new(&scope, &selector)
            .collect_fixed(&container)
            .with_context(|| format!("walking container {}", self.container))?;
        print_results(&result);
        Ok(())
    }
}
