pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "cms")]
#[command(about = "CMS CLI - Tenant domain administration for the CMS API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, env = "CMS_SERVER", default_value = "http://localhost:3000", help = "API base URL")]
    pub server: String,

    #[arg(long, global = true, env = "CMS_TENANT_ID", help = "Send X-Tenant-Id with tenant-scoped calls")]
    pub tenant_id: Option<i32>,

    #[arg(long, global = true, env = "CMS_TENANT_DOMAIN", help = "Send X-Tenant-Domain with tenant-scoped calls")]
    pub tenant_domain: Option<String>,

    #[arg(long, global = true, env = "CMS_TOKEN", hide_env_values = true, help = "Bearer token for portal requests")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show how the server resolves a host to a tenant")]
    Resolve {
        #[arg(help = "Host name, e.g. acme.example.com")]
        host: String,
    },

    #[command(about = "Check reachability of any domain")]
    Health {
        #[arg(help = "Domain name")]
        domain: String,
    },

    #[command(about = "Manage the current tenant's domains")]
    Domain {
        #[command(subcommand)]
        cmd: commands::domain::DomainCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::from_cli(&cli)?;

    match cli.command {
        Commands::Resolve { host } => commands::tools::resolve(&client, &host, output_format).await,
        Commands::Health { domain } => commands::tools::health(&client, &domain, output_format).await,
        Commands::Domain { cmd } => commands::domain::handle(&client, cmd, output_format).await,
    }
}
