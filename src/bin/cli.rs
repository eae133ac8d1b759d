//! LabRelay CLI
//!
//! Command-line interface for a running LabRelay server:
//! - Check status
//! - List printers and inspect telemetry and events
//! - Send printer commands
//! - Publish messages

use clap::{Parser, Subcommand};
use labrelay::store::{CommandAction, PrinterCommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "labrelay-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and control lab printers through LabRelay")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// List printers with their latest telemetry
    Devices,

    /// Show latest telemetry of one printer
    Telemetry {
        /// Printer id
        id: String,
    },

    /// Show recent events of one printer
    Events {
        /// Printer id
        id: String,
        /// Maximum number of events
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Send a command to a printer
    Command {
        /// Printer id
        id: String,
        /// Action (start_print, pause_print, resume_print, cancel_print,
        /// set_temperature, home_axes, emergency_stop)
        action: String,
        /// Parameters in key=value format
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },

    /// Publish a message
    Publish {
        /// Topic (default: new-orders)
        #[arg(short, long)]
        topic: Option<String>,
        /// Message content
        content: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let response = client.get(format!("{}/health", cli.api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    if cli.format == "json" {
                        println!("{}", serde_json::to_string_pretty(&health)?);
                        return Ok(());
                    }

                    println!("LabRelay v{}", health["version"].as_str().unwrap_or("?"));
                    println!();
                    println!("Status:    {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Transport: {}", health["transport"].as_str().unwrap_or("unknown"));
                    println!();
                    println!("Printers:  {}", health["connectedDevices"].as_u64().unwrap_or(0));
                    println!("Printing:  {}", health["printingDevices"].as_u64().unwrap_or(0));
                    println!("Events:    {}", health["totalEvents"].as_u64().unwrap_or(0));
                    println!("Jobs:      {}", health["jobs"].as_u64().unwrap_or(0));
                    println!("Equipment: {}", health["equipment"].as_u64().unwrap_or(0));
                    println!("Observers: {}", health["observers"].as_u64().unwrap_or(0));

                    if let Some(topics) = health["registeredTopics"].as_array() {
                        println!();
                        println!("Topics:");
                        for topic in topics {
                            println!("  {}", topic.as_str().unwrap_or("-"));
                        }
                    }

                    if let Some(uptime) = health["uptimeSeconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to LabRelay API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the LabRelay server is running:");
                    eprintln!("  cargo run --bin labrelay");
                    std::process::exit(1);
                }
            }
        }

        Commands::Devices => {
            let data = get_json(&client, &format!("{}/api/v1/printers", cli.api_url)).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            let devices = data["devices"].as_array().cloned().unwrap_or_default();
            if devices.is_empty() {
                println!("No printers have reported telemetry yet.");
            } else {
                println!(
                    "{:<16} {:<10} {:>9} {:>8} {:>8}",
                    "Printer", "Status", "Progress", "Nozzle", "Bed"
                );
                println!("{}", "-".repeat(55));

                for device in &devices {
                    println!(
                        "{:<16} {:<10} {:>8.1}% {:>7.1}C {:>7.1}C",
                        device["printerId"].as_str().unwrap_or("-"),
                        device["status"].as_str().unwrap_or("-"),
                        device["printProgress"].as_f64().unwrap_or(0.0),
                        device["nozzleTemperature"].as_f64().unwrap_or(0.0),
                        device["bedTemperature"].as_f64().unwrap_or(0.0),
                    );
                }

                println!();
                println!(
                    "{} printers, {} printing",
                    data["total"].as_u64().unwrap_or(0),
                    data["printing"].as_u64().unwrap_or(0)
                );
            }
        }

        Commands::Telemetry { id } => {
            let url = format!(
                "{}/api/v1/printers/{}/telemetry",
                cli.api_url,
                urlencoding::encode(&id)
            );
            let data = get_json(&client, &url).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }

        Commands::Events { id, limit } => {
            let url = format!(
                "{}/api/v1/printers/{}/events?limit={}",
                cli.api_url,
                urlencoding::encode(&id),
                limit
            );
            let data = get_json(&client, &url).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            let events = data["events"].as_array().cloned().unwrap_or_default();
            if events.is_empty() {
                println!("No events for {}", id);
            } else {
                for event in &events {
                    println!(
                        "{}  {:<9} {}",
                        event["timestamp"].as_str().unwrap_or("-"),
                        event["eventType"].as_str().unwrap_or("-"),
                        event["message"].as_str().unwrap_or("")
                    );
                }
            }
        }

        Commands::Command { id, action, params } => {
            let action: CommandAction = match action.parse() {
                Ok(action) => action,
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            };

            let mut command = PrinterCommand::new(action);
            for param in params {
                if let Some((k, v)) = param.split_once('=') {
                    command = command.param(k, parse_param_value(v));
                }
            }

            let response = client
                .post(format!(
                    "{}/api/v1/printers/{}/commands",
                    cli.api_url,
                    urlencoding::encode(&id)
                ))
                .json(&command)
                .send()
                .await?;

            if response.status().is_success() {
                let result: Value = response.json().await?;
                println!(
                    "Sent {} to {} on {}",
                    command.action,
                    id,
                    result["topic"].as_str().unwrap_or("-")
                );
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Command failed ({}): {}", status, text);
                std::process::exit(1);
            }
        }

        Commands::Publish { topic, content } => {
            let body = serde_json::json!({
                "topic": topic,
                "message": { "content": content },
            });

            let response = client
                .post(format!("{}/messaging/publish", cli.api_url))
                .json(&body)
                .send()
                .await?;

            if response.status().is_success() {
                let result: Value = response.json().await?;
                println!(
                    "Published {} to {}",
                    result["messageId"].as_str().unwrap_or("-"),
                    result["topic"].as_str().unwrap_or("-")
                );
            } else {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                eprintln!("Publish failed ({}): {}", status, text);
                std::process::exit(1);
            }
        }

        Commands::Config { output } => {
            let config = labrelay::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn get_json(client: &reqwest::Client, url: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        eprintln!("Request failed ({}): {}", status, text);
        std::process::exit(1);
    }

    Ok(response.json().await?)
}

/// Numbers and booleans are sent as JSON values, anything else as a string
fn parse_param_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw)
        .ok()
        .filter(|v| v.is_number() || v.is_boolean())
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
