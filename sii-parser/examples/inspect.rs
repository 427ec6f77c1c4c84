//! Inspect a save file without fully decoding it: container signature,
//! encryption flag, and for BSII payloads the version plus a unit preview.
//!
//! ```text
//! cargo run --example inspect -- game.sii
//! ```

use std::path::PathBuf;

use clap::Parser;

use sii_parser::decoder::BsiiDocument;
use sii_parser::{Signature, SiiFile};

#[derive(Parser)]
#[command(name = "inspect", about = "Show structure information for an SCS save file")]
struct Cli {
    /// Save file to inspect
    input: PathBuf,

    /// How many units to list for binary payloads
    #[clap(long, default_value_t = 10)]
    preview: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Cli::parse();

    let bytes = std::fs::read(&args.input)?;
    let file = SiiFile::decrypt(&bytes)?;

    println!("container: {} bytes", bytes.len());
    println!("encrypted: {}", file.encrypted);
    println!("payload signature: {:?}", file.signature);

    match file.signature {
        Signature::PlainText => {
            let text = String::from_utf8_lossy(&file.data);
            println!("plain text, {} lines", text.lines().count());
        }
        Signature::Binary => {
            let doc = BsiiDocument::parse(&file.data)?;
            println!("BSII version: {}", doc.header.version);
            println!("units: {}", doc.units.len());
            for unit in doc.units.iter().take(args.preview) {
                println!(
                    "  {} : {} ({} fields)",
                    unit.class,
                    unit.id,
                    unit.fields.len()
                );
            }
            if doc.units.len() > args.preview {
                println!("  ... {} more", doc.units.len() - args.preview);
            }
        }
        other => println!("payload not decodable here: {other:?}"),
    }

    Ok(())
}
