use clap::{Subcommand, ValueEnum};
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

use super::tools::output_health;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DomainKind {
    Custom,
    Subdomain,
}

impl DomainKind {
    fn as_str(&self) -> &'static str {
        match self {
            DomainKind::Custom => "custom",
            DomainKind::Subdomain => "subdomain",
        }
    }
}

#[derive(Subcommand)]
pub enum DomainCommands {
    #[command(about = "List the tenant's domains")]
    List,

    #[command(about = "Bind a domain to the tenant")]
    Add {
        #[arg(help = "Domain name")]
        domain: String,

        #[arg(long, help = "Make this the primary domain")]
        primary: bool,

        #[arg(long = "type", value_enum, default_value = "custom")]
        kind: DomainKind,
    },

    #[command(about = "Change domain settings")]
    Update {
        #[arg(help = "Domain id")]
        id: i32,

        #[arg(long)]
        primary: Option<bool>,

        #[arg(long)]
        active: Option<bool>,

        #[arg(long, help = "none, pending, active or failed")]
        ssl_status: Option<String>,
    },

    #[command(about = "Remove a domain")]
    Remove {
        #[arg(help = "Domain id")]
        id: i32,
    },

    #[command(about = "Check reachability of a domain")]
    Health {
        #[arg(help = "Domain id")]
        id: i32,
    },

    #[command(about = "Start ownership verification and print the token")]
    Verify {
        #[arg(help = "Domain id")]
        id: i32,
    },

    #[command(about = "Confirm ownership once the token is published")]
    Confirm {
        #[arg(help = "Domain id")]
        id: i32,
    },
}

const DOMAIN_FIELDS: &[(&str, &str)] = &[
    ("Id", "id"),
    ("Domain", "domain"),
    ("Type", "type"),
    ("Primary", "isPrimary"),
    ("Active", "isActive"),
    ("Verification", "verificationStatus"),
    ("Verified at", "verifiedAt"),
    ("SSL", "sslStatus"),
];

pub async fn handle(client: &ApiClient, cmd: DomainCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DomainCommands::List => {
            let domains = envelope_data(client.get("/api/domains", &[]).await?);
            let rows = domains.as_array().cloned().unwrap_or_default();

            if rows.is_empty() {
                return output_empty_collection(output_format, "domains", "No domains configured");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "domains": rows }))?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<40} {:<10} {:<8} {:<8} {}", "ID", "DOMAIN", "TYPE", "PRIMARY", "ACTIVE", "VERIFICATION");
                    println!("{}", "-".repeat(90));
                    for row in &rows {
                        let field = |key: &str| row.get(key).map(display).unwrap_or_default();
                        let marker = if row.get("isPrimary").and_then(Value::as_bool) == Some(true) { "*" } else { " " };
                        println!(
                            "{:<6} {:<40} {:<10} {:<8} {:<8} {}",
                            field("id"),
                            field("domain"),
                            field("type"),
                            marker,
                            field("isActive"),
                            field("verificationStatus")
                        );
                    }
                }
            }
            Ok(())
        }
        DomainCommands::Add { domain, primary, kind } => {
            let body = json!({ "domain": domain, "isPrimary": primary, "type": kind.as_str() });
            let created = envelope_data(client.post("/api/domains", Some(&body)).await?);

            let message = format!("Domain '{}' added", display(&created["domain"]));

            match output_format {
                OutputFormat::Json => output_success(output_format, &message, Some(created)),
                OutputFormat::Text => {
                    output_success(output_format, &message, None)?;
                    output_fields(output_format, &created, DOMAIN_FIELDS)?;
                    if let Some(token) = created.get("verificationToken").and_then(Value::as_str) {
                        println!("{:<20} {}", "Verification token:", token);
                    }
                    Ok(())
                }
            }
        }
        DomainCommands::Update { id, primary, active, ssl_status } => {
            let mut changes = Map::new();
            if let Some(v) = primary {
                changes.insert("isPrimary".into(), json!(v));
            }
            if let Some(v) = active {
                changes.insert("isActive".into(), json!(v));
            }
            if let Some(v) = ssl_status {
                changes.insert("sslStatus".into(), json!(v.to_lowercase()));
            }
            if changes.is_empty() {
                return Err(anyhow::anyhow!("Nothing to update, pass --primary, --active or --ssl-status"));
            }

            let updated = envelope_data(client.patch(&format!("/api/domains/{}", id), &Value::Object(changes)).await?);
            output_fields(output_format, &updated, DOMAIN_FIELDS)
        }
        DomainCommands::Remove { id } => {
            client.delete(&format!("/api/domains/{}", id)).await?;
            output_success(output_format, &format!("Domain {} removed", id), Some(json!({ "id": id })))
        }
        DomainCommands::Health { id } => {
            let health = envelope_data(client.get(&format!("/api/domains/{}/health", id), &[]).await?);
            output_health(output_format, &health)
        }
        DomainCommands::Verify { id } => {
            let challenge = envelope_data(client.post(&format!("/api/domains/{}/verification", id), None).await?);
            output_fields(
                output_format,
                &challenge,
                &[
                    ("Domain", "domain"),
                    ("Token", "verificationToken"),
                    ("Publish at", "verificationUrl"),
                    ("Expires at", "expiresAt"),
                ],
            )
        }
        DomainCommands::Confirm { id } => {
            let verified = envelope_data(
                client
                    .post(&format!("/api/domains/{}/verification/confirm", id), None)
                    .await?,
            );
            output_success(
                output_format,
                &format!("Domain '{}' verified", display(&verified["domain"])),
                Some(verified),
            )
        }
    }
}
