//! Value model for decoded BSII data.
//!
//! BSII stores every field as a 4-byte type tag followed by a
//! type-determined payload. The tag table below was recovered from the
//! game's save files; a handful of tags are aliases that share one wire
//! shape and fold to a single semantic type here.

use std::fmt;

/// Semantic type of a BSII field, mapped from its wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Length-prefixed UTF-8 string (tag 0x01).
    String,
    /// Array of UTF-8 strings (tag 0x02).
    StringArray,
    /// Base-38 string packed into a `u64` (tag 0x03).
    Token,
    /// Array of packed tokens (tag 0x04).
    TokenArray,
    /// IEEE 754 `f32` (tag 0x05).
    Float,
    /// Array of `f32` (tag 0x06).
    FloatArray,
    /// Two-component float vector (tag 0x07).
    Float2,
    /// Array of two-component float vectors (tag 0x08).
    Float2Array,
    /// Three-component float vector (tag 0x09).
    Float3,
    /// Array of three-component float vectors (tag 0x0A).
    Float3Array,
    /// Three-component `i32` vector (tag 0x11).
    Int3,
    /// Array of three-component `i32` vectors (tag 0x12).
    Int3Array,
    /// Four-component float vector (tag 0x17).
    Float4,
    /// Array of four-component float vectors (tag 0x18).
    Float4Array,
    /// Position + orientation (tag 0x19): seven floats in format version 1,
    /// eight with packed precision bias from version 2 on.
    Placement,
    /// Array of placements (tag 0x1A).
    PlacementArray,
    /// `i32` (tag 0x25).
    Int32,
    /// Array of `i32` (tag 0x26).
    Int32Array,
    /// `u32` (tags 0x27 and 0x2F).
    UInt32,
    /// Array of `u32` (tag 0x28).
    UInt32Array,
    /// `i16` (tag 0x29).
    Int16,
    /// Array of `i16` (tag 0x2A).
    Int16Array,
    /// `u16` (tag 0x2B).
    UInt16,
    /// Array of `u16` (tag 0x2C).
    UInt16Array,
    /// `i64` (tag 0x31).
    Int64,
    /// Array of `i64` (tag 0x32).
    Int64Array,
    /// `u64` (tag 0x33).
    UInt64,
    /// Array of `u64` (tag 0x34).
    UInt64Array,
    /// Single byte, nonzero = true (tag 0x35).
    Bool,
    /// Array of byte booleans (tag 0x36).
    BoolArray,
    /// `u32` index into the owning structure's ordinal table (tag 0x37).
    OrdinalString,
    /// Unit identifier (tags 0x39, 0x3B and 0x3D share one wire shape).
    Id,
    /// Array of unit identifiers (tags 0x3A, 0x3C and 0x3E).
    IdArray,
}

impl DataType {
    /// Map a wire tag to its semantic type, folding alias tags.
    ///
    /// Returns `None` for tags with no known decoding; the decoder treats
    /// those as a non-fatal per-record anomaly.
    pub fn from_u32(tag: u32) -> Option<Self> {
        Some(match tag {
            0x01 => Self::String,
            0x02 => Self::StringArray,
            0x03 => Self::Token,
            0x04 => Self::TokenArray,
            0x05 => Self::Float,
            0x06 => Self::FloatArray,
            0x07 => Self::Float2,
            0x08 => Self::Float2Array,
            0x09 => Self::Float3,
            0x0a => Self::Float3Array,
            0x11 => Self::Int3,
            0x12 => Self::Int3Array,
            0x17 => Self::Float4,
            0x18 => Self::Float4Array,
            0x19 => Self::Placement,
            0x1a => Self::PlacementArray,
            0x25 => Self::Int32,
            0x26 => Self::Int32Array,
            0x27 | 0x2f => Self::UInt32,
            0x28 => Self::UInt32Array,
            0x29 => Self::Int16,
            0x2a => Self::Int16Array,
            0x2b => Self::UInt16,
            0x2c => Self::UInt16Array,
            0x31 => Self::Int64,
            0x32 => Self::Int64Array,
            0x33 => Self::UInt64,
            0x34 => Self::UInt64Array,
            0x35 => Self::Bool,
            0x36 => Self::BoolArray,
            0x37 => Self::OrdinalString,
            0x39 | 0x3b | 0x3d => Self::Id,
            0x3a | 0x3c | 0x3e => Self::IdArray,
            _ => return None,
        })
    }
}

/// Two-component float vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float2 {
    pub a: f32,
    pub b: f32,
}

/// Three-component float vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float3 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

/// Four-component float vector. Serialized as a quaternion,
/// `(a; b, c, d)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Float4 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

/// Three-component `i32` vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int3 {
    pub a: i32,
    pub b: i32,
    pub c: i32,
}

/// Format-version-1 placement: position `(a, b, c)` and orientation
/// `(d; e, f, g)`. Only six floats are stored on the wire; `g` is always 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement7 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub g: f32,
}

/// Format-version-2+ placement: position `(a, b, c)`, a packed bias word
/// `d`, and orientation `(e; f, g, h)`. Decoding folds the bias stored in
/// `d` back into `a` and `c`; `d` itself is never serialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement8 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub g: f32,
    pub h: f32,
}

/// Identity of a decoded unit block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitId {
    /// No identity; renders as the literal `null`.
    Null,
    /// Dotted sequence of unpacked token parts.
    Named(Vec<String>),
    /// Anonymous unit addressed by a 64-bit hash.
    Nameless(u64),
}

impl fmt::Display for UnitId {
    /// Renders the textual identifier.
    ///
    /// Nameless ids split the address into four 16-bit groups, rendered
    /// most-significant-first in lowercase hex. The top two groups drop
    /// leading zeros (vanishing entirely at zero); the low two always keep
    /// four digits. This matches the game's own formatting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Named(parts) => f.write_str(&parts.join(".")),
            Self::Nameless(address) => {
                let g3 = (address >> 48) as u16;
                let g2 = (address >> 32) as u16;
                let g1 = (address >> 16) as u16;
                let g0 = *address as u16;

                f.write_str("_nameless")?;
                if g3 != 0 {
                    write!(f, ".{g3:x}")?;
                }
                if g2 != 0 {
                    write!(f, ".{g2:x}")?;
                }
                write!(f, ".{g1:04x}.{g0:04x}")
            }
        }
    }
}

/// Decoded payload of one field.
///
/// Closed union over every wire shape BSII can carry. `Unset` marks a field
/// whose tag the decoder did not recognize; serializing it is a fatal
/// error, mirroring how unknown tags behave asymmetrically between the two
/// passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unset,
    String(String),
    StringArray(Vec<String>),
    Token(String),
    TokenArray(Vec<String>),
    Float(f32),
    FloatArray(Vec<f32>),
    Float2(Float2),
    Float2Array(Vec<Float2>),
    Float3(Float3),
    Float3Array(Vec<Float3>),
    Int3(Int3),
    Int3Array(Vec<Int3>),
    Float4(Float4),
    Float4Array(Vec<Float4>),
    Placement7(Placement7),
    Placement7Array(Vec<Placement7>),
    Placement8(Placement8),
    Placement8Array(Vec<Placement8>),
    Int32(i32),
    Int32Array(Vec<i32>),
    UInt32(u32),
    UInt32Array(Vec<u32>),
    Int16(i16),
    Int16Array(Vec<i16>),
    UInt16(u16),
    UInt16Array(Vec<u16>),
    Int64(i64),
    Int64Array(Vec<i64>),
    UInt64(u64),
    UInt64Array(Vec<u64>),
    Bool(bool),
    BoolArray(Vec<bool>),
    OrdinalString(String),
    Id(UnitId),
    IdArray(Vec<UnitId>),
}

/// One decoded field: schema name and tag plus the instance value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name from the structure template.
    pub name: String,
    /// Raw wire tag from the template, kept for diagnostics.
    pub tag: u32,
    /// Decoded value.
    pub value: Value,
}

/// One resolved data block: a unit instance decoded against its template.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// Structure id linking the instance to its template.
    pub struct_id: u32,
    /// Unit class name (the template name).
    pub class: String,
    /// Unit identity.
    pub id: UnitId,
    /// Field values in template order.
    pub fields: Vec<Field>,
}
