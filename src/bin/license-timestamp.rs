//! License Timestamp - command-line front end for issuing and checking license timestamps

use anyhow::Context;
use clap::{Parser, Subcommand};
use license_timestamp::{Config, LicenseTimestamp, LicenseVerdict, OperationState};
use std::path::PathBuf;
use std::process;

/// Exit status of `status` when the license is expired or unreadable.
const EXIT_EXPIRED: i32 = 2;

#[derive(Parser)]
#[command(name = "license-timestamp")]
#[command(about = "Issue and verify tamper-evident license timestamps", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Encrypted timestamp file, overriding the configuration
    #[arg(long, global = true)]
    encrypted: Option<PathBuf>,

    /// Checksum file, overriding the configuration
    #[arg(long, global = true)]
    checksum: Option<PathBuf>,

    /// License duration in days, overriding the configuration
    #[arg(long, global = true)]
    duration_days: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp the current time into a new timestamp pair
    Create,

    /// Decode and print the stored timestamp
    Inspect,

    /// Report whether the license is expired
    Status {
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the timestamp pair
    Reset,

    /// Create the pair if missing, inspect it, and report expiry
    Demo,
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run_application() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let mut config =
        license_timestamp::init(path.as_deref()).context("failed to initialize configuration")?;

    if let Some(encrypted) = &cli.encrypted {
        config.license.encrypted_file = encrypted.to_string_lossy().into_owned();
    }
    if let Some(checksum) = &cli.checksum {
        config.license.checksum_file = checksum.to_string_lossy().into_owned();
    }
    if let Some(days) = cli.duration_days {
        config.license.duration_days = days;
    }
    config.validate().context("invalid command-line overrides")?;
    Ok(config)
}

fn print_verdict(verdict: &LicenseVerdict) {
    println!("State: {} ({})", verdict.state, verdict.state.description());
    if let Some(timestamp) = &verdict.timestamp {
        println!("Timestamp: {}", timestamp);
    }
    if let Some(elapsed) = verdict.elapsed_days {
        println!("Elapsed days: {}", elapsed);
    }
    if verdict.expired {
        println!("License has expired.");
    } else {
        println!("License has not expired.");
    }
}

fn run_application() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let license = LicenseTimestamp::from_config(&config)?;

    match &cli.command {
        Commands::Create => {
            let issued = license.create_timestamp_file()?;
            println!("Created timestamp {}", issued.text);
            println!("Checksum: {}", issued.checksum);
        }
        Commands::Inspect => {
            let text = license.inspect_timestamp()?;
            println!("Decrypted timestamp is: {}", text);
        }
        Commands::Status { json } => {
            let verdict = license.evaluate();
            if *json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                println!("License duration: {} days", config.license.duration_days);
                print_verdict(&verdict);
            }
            if verdict.expired {
                process::exit(EXIT_EXPIRED);
            }
        }
        Commands::Reset => {
            license.remove_timestamp_files()?;
            println!("Removed timestamp files");
        }
        Commands::Demo => {
            match license.create_timestamp_file() {
                Ok(issued) => println!("Created timestamp {}", issued.text),
                Err(e) if e.state() == OperationState::FileExist => {
                    println!("Timestamp already exists, keeping it")
                }
                Err(e) => {
                    println!(
                        "Fail to create TimeStamp file. error: {}",
                        e.state().description()
                    );
                    return Err(e.into());
                }
            }
            match license.inspect_timestamp() {
                Ok(text) => println!("Decrypted timestamp is: {}", text),
                Err(e) => println!(
                    "Failed to inspect the timestamp. Error: {}",
                    e.state().description()
                ),
            }
            print_verdict(&license.evaluate());
        }
    }

    Ok(())
}
