//! Parser for SCS save files (Euro Truck Simulator 2, American Truck
//! Simulator).
//!
//! A save arrives in one of three outer forms: plain SiiNunit text, a
//! binary BSII stream, or an encrypted `ScsC` envelope around either. This
//! crate unwraps the envelope (via `sii-crypto` + zlib), decodes BSII into
//! a typed unit model, and re-serializes it as the same SiiNunit text the
//! game would write.
//!
//! # Example
//!
//! ```no_run
//! use sii_parser::SiiFile;
//!
//! # fn main() -> sii_parser::Result<()> {
//! let file = SiiFile::open("game.sii")?;
//! println!("{}", String::from_utf8_lossy(&file.data));
//! # Ok(())
//! # }
//! ```
//!
//! The lower-level pieces are public too: [`decoder::BsiiDocument`] gives
//! access to decoded units before text rendering, and
//! [`serializer::serialize`] renders a document on its own.

pub mod decoder;
pub mod error;
pub mod file;
mod ioutils;
mod primitives;
pub mod serializer;
pub mod types;

pub use error::{Error, Result};
pub use file::{Signature, SiiFile};
