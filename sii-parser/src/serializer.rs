//! SiiNunit text rendering.
//!
//! Turns a decoded [`BsiiDocument`] back into the textual unit grammar the
//! game itself writes, down to its quirks: floats fall back to a `&`-hex
//! bit pattern whenever decimal would lose precision, a handful of integer
//! sentinel values print as `nil`, and strings are only quoted when they
//! leave the safe alphabet.

use std::fmt::Write;

use crate::decoder::BsiiDocument;
use crate::types::{Field, Float2, Float3, Float4, Int3, Placement7, Placement8, Value};
use crate::{Error, Result};

/// Render a decoded document as SiiNunit text.
///
/// Units whose class name or identifier text is empty are dropped without
/// error. A field that survived decoding with no value (unknown wire tag)
/// is fatal here: emitting a placeholder would corrupt the save.
pub fn serialize(doc: &BsiiDocument) -> Result<String> {
    let mut out = String::new();
    out.push_str("SiiNunit\n{\n");

    for unit in &doc.units {
        let id_text = unit.id.to_string();
        if unit.class.is_empty() || id_text.is_empty() {
            continue;
        }

        writeln!(out, "{} : {} {{", unit.class, id_text)?;
        for field in &unit.fields {
            write_field(&mut out, field)?;
        }
        out.push_str("}\n\n");
    }

    out.push('}');
    Ok(out)
}

fn write_field(out: &mut String, field: &Field) -> Result<()> {
    let name = &field.name;
    match &field.value {
        Value::Unset => {
            return Err(Error::UnknownSerializationTag {
                field: name.clone(),
                tag: field.tag,
            });
        }

        Value::String(s) => writeln!(out, " {name}: {}", quote(s))?,
        Value::StringArray(items) => write_array(out, name, items, |s| quote(s))?,

        // An empty token prints as `""`; array elements print verbatim.
        Value::Token(s) if s.is_empty() => writeln!(out, " {name}: \"\"")?,
        Value::Token(s) => writeln!(out, " {name}: {s}")?,
        Value::TokenArray(items) => write_array(out, name, items, Clone::clone)?,

        Value::Float(v) => writeln!(out, " {name}: {}", format_single(*v))?,
        Value::FloatArray(items) => write_array(out, name, items, |v| format_single(*v))?,

        Value::Float2(v) => writeln!(out, " {name}: {}", format_float2(v))?,
        Value::Float2Array(items) => write_array(out, name, items, format_float2)?,
        Value::Float3(v) => writeln!(out, " {name}: {}", format_float3(v))?,
        Value::Float3Array(items) => write_array(out, name, items, format_float3)?,
        Value::Int3(v) => writeln!(out, " {name}: {}", format_int3(v))?,
        Value::Int3Array(items) => write_array(out, name, items, format_int3)?,
        Value::Float4(v) => writeln!(out, " {name}: {}", format_float4(v))?,
        Value::Float4Array(items) => write_array(out, name, items, format_float4)?,
        Value::Placement7(v) => writeln!(out, " {name}: {}", format_placement7(v))?,
        Value::Placement7Array(items) => write_array(out, name, items, format_placement7)?,
        Value::Placement8(v) => writeln!(out, " {name}: {}", format_placement8(v))?,
        Value::Placement8Array(items) => write_array(out, name, items, format_placement8)?,

        Value::Int32(v) => writeln!(out, " {name}: {v}")?,
        Value::Int32Array(items) => write_array(out, name, items, ToString::to_string)?,

        // 0xFFFFFFFF marks "no value" for scalar u32 fields; same idea
        // below for u16 and i16. Array elements never use the sentinel.
        Value::UInt32(v) if *v == u32::MAX => writeln!(out, " {name}: nil")?,
        Value::UInt32(v) => writeln!(out, " {name}: {v}")?,
        Value::UInt32Array(items) => write_array(out, name, items, ToString::to_string)?,

        Value::Int16(v) if *v == i16::MAX => writeln!(out, " {name}: nil")?,
        Value::Int16(v) => writeln!(out, " {name}: {v}")?,
        Value::Int16Array(items) => write_array(out, name, items, ToString::to_string)?,

        Value::UInt16(v) if *v == u16::MAX => writeln!(out, " {name}: nil")?,
        Value::UInt16(v) => writeln!(out, " {name}: {v}")?,
        Value::UInt16Array(items) => write_array(out, name, items, ToString::to_string)?,

        Value::Int64(v) => writeln!(out, " {name}: {v}")?,
        Value::Int64Array(items) => write_array(out, name, items, ToString::to_string)?,
        Value::UInt64(v) => writeln!(out, " {name}: {v}")?,
        Value::UInt64Array(items) => write_array(out, name, items, ToString::to_string)?,

        Value::Bool(v) => writeln!(out, " {name}: {v}")?,
        Value::BoolArray(items) => write_array(out, name, items, ToString::to_string)?,

        Value::OrdinalString(s) => writeln!(out, " {name}: {s}")?,
        Value::Id(id) => writeln!(out, " {name}: {id}")?,
        Value::IdArray(items) => write_array(out, name, items, ToString::to_string)?,
    }
    Ok(())
}

/// Emit an array field: a count line, then one indexed line per element.
fn write_array<T>(
    out: &mut String,
    name: &str,
    items: &[T],
    mut format_elem: impl FnMut(&T) -> String,
) -> Result<()> {
    writeln!(out, " {name}: {}", items.len())?;
    for (i, item) in items.iter().enumerate() {
        writeln!(out, " {name}[{i}]: {}", format_elem(item))?;
    }
    Ok(())
}

/// Render an `f32` the way the game writes it.
///
/// Whole values below ten million in magnitude print as plain integers;
/// everything else (fractional, huge, non-finite) prints the raw IEEE 754
/// bit pattern as `&`-prefixed hex, which round-trips exactly.
fn format_single(v: f32) -> String {
    if v.fract() == 0.0 && v.abs() < 1e7 {
        format!("{}", v.trunc() as i64)
    } else {
        format!("&{:08x}", v.to_bits())
    }
}

fn format_float2(v: &Float2) -> String {
    format!("({}, {})", format_single(v.a), format_single(v.b))
}

fn format_float3(v: &Float3) -> String {
    format!(
        "({}, {}, {})",
        format_single(v.a),
        format_single(v.b),
        format_single(v.c)
    )
}

fn format_float4(v: &Float4) -> String {
    format!(
        "({}; {}, {}, {})",
        format_single(v.a),
        format_single(v.b),
        format_single(v.c),
        format_single(v.d)
    )
}

fn format_int3(v: &Int3) -> String {
    format!("({}, {}, {})", v.a, v.b, v.c)
}

fn format_placement7(v: &Placement7) -> String {
    format!(
        "({}, {}, {}) ({}; {}, {}, {})",
        format_single(v.a),
        format_single(v.b),
        format_single(v.c),
        format_single(v.d),
        format_single(v.e),
        format_single(v.f),
        format_single(v.g)
    )
}

/// The bias word `d` was folded into `a`/`c` at decode time and is not
/// part of the textual form.
fn format_placement8(v: &Placement8) -> String {
    format!(
        "({}, {}, {}) ({}; {}, {}, {})",
        format_single(v.a),
        format_single(v.b),
        format_single(v.c),
        format_single(v.e),
        format_single(v.f),
        format_single(v.g),
        format_single(v.h)
    )
}

/// Quote a string only when it has to be.
///
/// Optionally-negative digit runs and `[0-9a-zA-Z_]`-only strings render
/// bare; the empty string renders as `""`; anything else is wrapped in
/// double quotes with no escaping (the format has none).
fn quote(s: &str) -> String {
    if s.is_empty() {
        return "\"\"".to_string();
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }

    if s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return s.to_string();
    }

    format!("\"{s}\"")
}
