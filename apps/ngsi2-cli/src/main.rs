#![allow(clippy::print_stdout, clippy::print_stderr)]

mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::entities::EntitiesArgs;
use commands::registrations::RegistrationsArgs;
use commands::subscriptions::SubscriptionsArgs;
use commands::types::TypesArgs;
use ngsi2_client::{ClientConfig, Ngsi2Api, Ngsi2Client};
use std::io::Write;
use std::path::PathBuf;

/// Query and manage an NGSIv2 context broker
#[derive(Parser, Debug)]
#[command(name = "ngsi2", version, about)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Broker URL (overrides config and NGSI2__BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Fiware-Service tenant
    #[arg(long)]
    service: Option<String>,

    /// Fiware-ServicePath scope
    #[arg(long)]
    service_path: Option<String>,

    /// Allow plain http:// brokers
    #[arg(long)]
    insecure: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the broker's `/v2` resource index (default)
    Version,
    Entities(EntitiesArgs),
    Types(TypesArgs),
    Subscriptions(SubscriptionsArgs),
    Registrations(RegistrationsArgs),
}

impl Cli {
    /// Layered config: defaults -> YAML -> env (`NGSI2__*`) -> CLI flags.
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load(self.config.as_deref())?;
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if self.service.is_some() {
            config.service.clone_from(&self.service);
        }
        if self.service_path.is_some() {
            config.service_path.clone_from(&self.service_path);
        }
        if self.insecure {
            config.allow_insecure_http = true;
        }
        Ok(config)
    }
}

async fn dispatch(command: Commands, api: &dyn Ngsi2Api, out: &mut dyn Write) -> Result<()> {
    match command {
        Commands::Version => commands::print_json(out, &api.get_v2().await?),
        Commands::Entities(args) => args.run(api, out).await,
        Commands::Types(args) => args.run(api, out).await,
        Commands::Subscriptions(args) => args.run(api, out).await,
        Commands::Registrations(args) => args.run(api, out).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json)?;

    let config = cli.load_config()?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let client = Ngsi2Client::from_config(&config)
        .with_context(|| format!("cannot create client for '{}'", config.base_url))?;
    tracing::info!(base_url = %client.base_url(), "using context broker");

    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command.unwrap_or(Commands::Version), &client, &mut stdout).await
}
