//! alertctl - command-line client for the Visa Alert Service

use alertctl::{AlertClient, ListParams, DEFAULT_API_BASE};
use alertsrv::{api::models::UpdateAlertRequest, Alert, AlertStatus};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use common::logging::{self, LogConfig};

#[derive(Parser)]
#[command(name = "alertctl")]
#[command(about = "Manage visa appointment alerts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long, global = true, env = "ALERTCTL_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List alerts, newest first
    List {
        /// Country name contains this text (case-insensitive)
        #[arg(long)]
        country: Option<String>,
        /// Only alerts with this status
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show one alert
    Get { id: String },

    /// Create an alert
    Create {
        #[arg(long)]
        country: String,
        #[arg(long)]
        city: String,
        /// Tourist, Business or Student
        #[arg(long)]
        visa_type: String,
    },

    /// Change any subset of an alert's fields
    Update {
        id: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        visa_type: Option<String>,
    },

    /// Set an alert's status (Active, Booked or Expired)
    SetStatus { id: String, status: String },

    /// Delete an alert
    Delete { id: String },

    /// Check that the service is up
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let level = if cli.verbose { "debug" } else { "warn" };
    let _log_guard = logging::init(&LogConfig::new("alertctl").with_level(level))
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    let client = AlertClient::new(&cli.api_base);

    match cli.command {
        Commands::List {
            country,
            status,
            page,
            limit,
        } => {
            let list = client
                .list(&ListParams {
                    country,
                    status,
                    page,
                    limit,
                })
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&list.alerts)?);
            } else {
                print_table(&list.alerts);
                if let Some(total) = list.total {
                    println!("\n{} of {} alerts", list.alerts.len(), total);
                }
            }
        },
        Commands::Get { id } => show(&client.get(&id).await?, cli.json)?,
        Commands::Create {
            country,
            city,
            visa_type,
        } => {
            let alert = client.create(&country, &city, &visa_type).await?;
            println!("{} Created alert {}", "OK".green(), alert.id);
            show(&alert, cli.json)?;
        },
        Commands::Update {
            id,
            status,
            country,
            city,
            visa_type,
        } => {
            let update = UpdateAlertRequest {
                status,
                country,
                city,
                visa_type,
            };
            let alert = client.update(&id, &update).await?;
            println!("{} Updated alert {}", "OK".green(), alert.id);
            show(&alert, cli.json)?;
        },
        Commands::SetStatus { id, status } => {
            let alert = client.set_status(&id, &status).await?;
            println!(
                "{} Alert {} is now {}",
                "OK".green(),
                alert.id,
                paint_status(alert.status, alert.status.as_str())
            );
        },
        Commands::Delete { id } => {
            let message = client.delete(&id).await?;
            println!("{} {}", "OK".green(), message);
        },
        Commands::Health => {
            let status = client.health().await?;
            println!("{} {} ({})", "OK".green(), status, client.base_url());
        },
    }

    Ok(())
}

fn paint_status(status: AlertStatus, text: &str) -> ColoredString {
    match status {
        AlertStatus::Active => text.green(),
        AlertStatus::Booked => text.cyan(),
        AlertStatus::Expired => text.dimmed(),
    }
}

fn show(alert: &Alert, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(alert)?);
    } else {
        print_table(std::slice::from_ref(alert));
    }
    Ok(())
}

fn print_table(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("{}", "No alerts".yellow());
        return;
    }

    println!(
        "{}",
        format!(
            "{:<36}  {:<16}  {:<16}  {:<8}  {:<8}  {}",
            "ID", "COUNTRY", "CITY", "VISA", "STATUS", "CREATED"
        )
        .bold()
    );
    for alert in alerts {
        // Pad before colouring so escape codes don't break alignment
        let status = format!("{:<8}", alert.status.as_str());
        println!(
            "{:<36}  {:<16}  {:<16}  {:<8}  {}  {}",
            alert.id,
            alert.country,
            alert.city,
            alert.visa_type.as_str(),
            paint_status(alert.status, &status),
            alert.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
}
