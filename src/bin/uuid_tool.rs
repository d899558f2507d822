use anyhow::{Context, Result, anyhow};
use binary_uuid::codec;
use binary_uuid::{SettingsResolver, UuidConfig, Value};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "uuid-tool")]
#[command(about = "Inspect binary UUID keys and column settings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// UUID text -> hex of the stored bytes
    Encode {
        uuid: String,
        #[arg(long)]
        optimize: bool,
    },
    /// Hex of stored bytes -> UUID text
    Decode {
        hex: String,
        #[arg(long)]
        optimize: bool,
    },
    /// Report whether a value is canonical UUID text
    Check { value: String },
    /// Print the effective settings of a column
    Resolve {
        #[arg(long)]
        config: PathBuf,
        /// `table.column`
        column: String,
        /// Sample value for shape detection
        #[arg(long)]
        value: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Encode { uuid, optimize } => encode(&uuid, optimize),
        Command::Decode { hex, optimize } => decode(&hex, optimize),
        Command::Check { value } => {
            if codec::is_uuid_text(&value) {
                println!("{} is canonical UUID text", value);
            } else {
                println!("{} is not canonical UUID text", value);
            }
            Ok(())
        }
        Command::Resolve {
            config,
            column,
            value,
        } => resolve(&config, &column, value),
    }
}

fn encode(uuid: &str, optimize: bool) -> Result<()> {
    let bytes = codec::text_to_binary(uuid, optimize)?
        .ok_or_else(|| anyhow!("'{}' is not a UUID", uuid))?;
    println!("{}", Value::from(bytes));
    Ok(())
}

fn decode(hex: &str, optimize: bool) -> Result<()> {
    let hex = hex.trim_start_matches("0x");
    // the stored bytes are shaped like a UUID, so the simple-form parser reads them
    let bytes = uuid::Uuid::try_parse(hex)
        .with_context(|| format!("'{}' is not 32 hex digits", hex))?
        .into_bytes();
    println!("{}", codec::binary_to_text(&bytes, optimize)?);
    Ok(())
}

fn resolve(config_path: &Path, column: &str, value: Option<String>) -> Result<()> {
    let json = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config '{}'", config_path.display()))?;
    let config = UuidConfig::from_json_str(&json)?;
    let resolver = SettingsResolver::from_config(&config)?;

    let settings = resolver.resolve_column_settings(column);
    let sample = value.map(Value::Text);
    let is_uuid = resolver.is_uuid_column(column, sample.as_ref());

    println!("{}", serde_json::to_string_pretty(&settings)?);
    println!("uuid column: {}", is_uuid);
    Ok(())
}
