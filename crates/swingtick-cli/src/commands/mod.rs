mod rank;
mod signals;

use swingtick_core::MarketApi;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let api = MarketApi::from_env()?;

    let result = match &cli.command {
        Command::Rank(args) => rank::run(args, &api, cli.limit).await,
        Command::Signals(args) => signals::run(args, &api, cli.limit).await,
    };

    // Revoke the cached credential even when the command failed.
    api.close().await;
    result
}
