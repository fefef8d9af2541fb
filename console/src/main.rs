mod collect;
mod fixed;
mod types;
mod utils;

use clap::{
    Parser,
    Subcommand,
};
use collect::CollectArgs;
use fixed::FixedArgs;
use types::TypesArgs;
use utils::UtilsArgs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Collect annotations overlapping a region and print them as TSV.
    Collect {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  CollectArgs,
    },

    /// List the annotation types present in a region.
    Types {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  TypesArgs,
    },

    /// Print every annotation of one container.
    Fixed {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  FixedArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        MainMenu::Collect { utils, args } => {
            utils.setup()?;
            args.run()?;
        },
        MainMenu::Types { utils, args } => {
            utils.setup()?;
            args.run()?;
        },
        MainMenu::Fixed { utils, args } => {
            utils.setup()?;
            args.run()?;
        },
    }
    Ok(())
}
