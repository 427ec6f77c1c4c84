//! Decrypt and decode a save file to SiiNunit text.
//!
//! ```text
//! cargo run --example decrypt_save -- game.sii -o game.decoded.sii
//! cargo run --example decrypt_save -- game.sii --no-decode -o game.raw
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use sii_parser::SiiFile;

#[derive(Parser)]
#[command(name = "decrypt_save", about = "Decrypt and decode an SCS save file")]
struct Cli {
    /// Save file to read (quicksave `game.sii`, profile `profile.sii`, ...)
    input: PathBuf,

    /// Where to write the result; stdout when omitted
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Only unwrap the ScsC envelope, skip BSII decoding
    #[clap(long)]
    no_decode: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Cli::parse();

    let bytes = std::fs::read(&args.input)?;
    let file = if args.no_decode {
        SiiFile::decrypt(&bytes)?
    } else {
        SiiFile::parse(&bytes)?
    };

    match args.output {
        Some(path) => std::fs::write(path, &file.data)?,
        None => std::io::stdout().write_all(&file.data)?,
    }

    Ok(())
}
