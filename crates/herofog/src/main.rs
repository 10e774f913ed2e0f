mod bootstrap;
mod cli;
mod paths;
mod run;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::run(cli)
}
