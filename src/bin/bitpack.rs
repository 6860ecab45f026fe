//! Bitpack Binary
//!
//! Encodes a JSON list of typed fields into a bit frame, or decodes a frame
//! back into fields using a JSON schema of field kinds.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use densebits::field::{fields_from_file, schema_from_file};
use densebits::{decode_fields, display_stream, encode_fields, Frame, StreamConfig};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bitpack")]
#[command(about = "Dense bit-level field encoder/decoder", long_about = None)]
struct Args {
    /// Path to a stream config JSON file (defaults to lenient mode)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a JSON list of fields into a frame
    Encode {
        /// Path to the fields JSON file
        #[arg(short, long)]
        fields: String,

        /// Show the per-field sizes and a dump of the encoded cells
        #[arg(short, long, default_value_t = false)]
        debug: bool,
    },
    /// Decode a frame into fields
    Decode {
        /// Path to the frame JSON file
        #[arg(short, long)]
        frame: String,

        /// Path to the schema JSON file (list of field kinds)
        #[arg(short, long)]
        schema: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => StreamConfig::from_file(path).context("Failed to load config")?,
        None => StreamConfig::default(),
    };
    info!("stream mode: {:?}", config.mode);

    match args.command {
        Command::Encode { fields, debug } => encode(&fields, debug, &config),
        Command::Decode { frame, schema } => decode(&frame, &schema, &config),
    }
}

fn encode(fields_path: &str, debug: bool, config: &StreamConfig) -> Result<()> {
    let fields = fields_from_file(fields_path).context("Failed to load fields")?;
    if fields.is_empty() {
        warn!("{} contains no fields, emitting an empty frame", fields_path);
    }

    let stream = encode_fields(&fields, config).context("Failed to encode fields")?;

    if debug {
        println!("{}", "=".repeat(60));
        println!("{:<6} {:<6} {:>6}  VALUE", "INDEX", "TYPE", "BITS");
        println!("{}", "-".repeat(60));
        for (index, field) in fields.iter().enumerate() {
            println!(
                "{:<6} {:<6} {:>6}  {}",
                index,
                format!("{:?}", field.kind()).to_lowercase(),
                field.size_bits(),
                field.as_string()
            );
        }
        display_stream(&stream);
    }

    let frame = Frame::from_stream(&stream);
    info!("encoded {} field(s) into {} bits", fields.len(), frame.bits);
    println!("{}", frame.to_json()?);
    Ok(())
}

fn decode(frame_path: &str, schema_path: &str, config: &StreamConfig) -> Result<()> {
    let frame = Frame::from_file(frame_path).context("Failed to load frame")?;
    let kinds = schema_from_file(schema_path).context("Failed to load schema")?;

    let mut stream = frame.into_stream(config).context("Failed to rebuild stream")?;
    let values = decode_fields(&mut stream, &kinds).context("Failed to decode fields")?;

    if !stream.is_empty() {
        info!("{} bit(s) left after the last field", stream.size());
    }
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}
