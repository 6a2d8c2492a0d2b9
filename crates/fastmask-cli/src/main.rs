//! fastmask - mint a Fastmail masked email alias for a domain.
//!
//! Reads the API token from `$XDG_CONFIG_HOME/fastmask/config.json`,
//! bootstraps a JMAP session, creates one alias, and prints the result
//! as pretty JSON on stdout. Any failure goes to stderr with a non-zero
//! exit status.

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use fastmask_client::{JmapClient, config};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Domain the masked email alias will be used for
    domain: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let token = config::load_token().context("loading API token")?;
    debug!("loaded token {token}");

    let client = JmapClient::new(token)?;
    let identity = client
        .bootstrap()
        .await
        .context("authenticating with Fastmail")?;

    let alias = client
        .create_alias(&identity, &args.domain)
        .await
        .context("creating masked email")?;

    println!("{}", serde_json::to_string_pretty(&alias)?);

    Ok(())
}
