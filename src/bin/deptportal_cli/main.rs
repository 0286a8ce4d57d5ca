//! deptportal-cli: command-line client for the department portal API.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod context;
mod handlers;
mod io;
mod print;

#[cfg(test)]
mod tests;

use clap::Parser;

use args::{Cli, Commands};
use context::{CliError, build_client, settings_from_cli};
use handlers::{applications, auth, blogs, community, content, events, records};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = settings_from_cli(&cli)?;
    let client = build_client(&settings)?;

    match cli.command {
        Commands::Auth(cmd) => auth::handle(&client, cmd.action).await?,
        Commands::Notices(cmd) => content::handle(&client, cmd.action).await?,
        Commands::Events(cmd) => events::handle(&client, cmd.action).await?,
        Commands::Blogs(cmd) => blogs::handle(&client, cmd.action).await?,
        Commands::Alumni(cmd) => community::alumni(&client, cmd.action).await?,
        Commands::Societies(cmd) => community::societies(&client, cmd.action).await?,
        Commands::Applications(cmd) => applications::handle(&client, cmd.action).await?,
        Commands::Records(cmd) => records::handle(&client, cmd.action).await?,
    }

    Ok(())
}
