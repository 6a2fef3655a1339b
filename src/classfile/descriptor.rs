//! Field and method descriptor parsing.
//!
//! Descriptors are the compact encoded signatures the class file uses for
//! types: `I` is int, `Ljava/lang/String;` is a reference type, `[` prefixes
//! an array dimension, and `(IJ)V` is a method taking int and long returning
//! void.

use crate::classfile::DecodeError;

/// Parse a single field descriptor into a readable dotted type name.
pub fn field_type(descriptor: &str) -> Result<String, DecodeError> {
    let mut chars = descriptor.chars();
    let (type_name, _) = parse_one(&mut chars, descriptor)?;
    if chars.next().is_some() {
        return Err(DecodeError::MalformedDescriptor {
            descriptor: descriptor.to_string(),
        });
    }
    Ok(type_name)
}

/// Parse a method descriptor into its ordered parameter types and return type.
pub fn method_signature(descriptor: &str) -> Result<(Vec<String>, String), DecodeError> {
    let malformed = || DecodeError::MalformedDescriptor {
        descriptor: descriptor.to_string(),
    };

    let inner = descriptor.strip_prefix('(').ok_or_else(malformed)?;
    let close = inner.find(')').ok_or_else(malformed)?;
    let (params_str, ret_str) = inner.split_at(close);
    let ret_str = &ret_str[1..];

    let mut params = Vec::new();
    let mut chars = params_str.chars();
    loop {
        let mut peek = chars.clone();
        if peek.next().is_none() {
            break;
        }
        let (type_name, _) = parse_one(&mut chars, descriptor)?;
        params.push(type_name);
    }

    let mut ret_chars = ret_str.chars();
    let (return_type, _) = parse_one(&mut ret_chars, descriptor)?;
    if ret_chars.next().is_some() {
        return Err(malformed());
    }

    Ok((params, return_type))
}

/// Number of local variable slots a parameter list occupies. Long and double
/// take two slots each; everything else takes one.
pub fn parameter_slots(param_types: &[String]) -> Vec<usize> {
    param_types
        .iter()
        .map(|t| match t.as_str() {
            "long" | "double" => 2,
            _ => 1,
        })
        .collect()
}

/// Consume one type from the descriptor stream, returning its readable name
/// and slot width.
fn parse_one(
    chars: &mut std::str::Chars<'_>,
    full: &str,
) -> Result<(String, usize), DecodeError> {
    let malformed = || DecodeError::MalformedDescriptor {
        descriptor: full.to_string(),
    };

    let mut dimensions = 0usize;
    let mut c = chars.next().ok_or_else(malformed)?;
    while c == '[' {
        dimensions += 1;
        c = chars.next().ok_or_else(malformed)?;
    }

    let (base, slots) = match c {
        'B' => ("byte".to_string(), 1),
        'C' => ("char".to_string(), 1),
        'D' => ("double".to_string(), 2),
        'F' => ("float".to_string(), 1),
        'I' => ("int".to_string(), 1),
        'J' => ("long".to_string(), 2),
        'S' => ("short".to_string(), 1),
        'Z' => ("boolean".to_string(), 1),
        'V' => ("void".to_string(), 0),
        'L' => {
            let mut name = String::new();
            loop {
                let c = chars.next().ok_or_else(malformed)?;
                if c == ';' {
                    break;
                }
                name.push(if c == '/' { '.' } else { c });
            }
            (name, 1)
        }
        _ => return Err(malformed()),
    };

    if dimensions > 0 {
        let mut name = base;
        for _ in 0..dimensions {
            name.push_str("[]");
        }
        // Arrays are reference types regardless of element width.
        Ok((name, 1))
    } else {
        Ok((base, slots))
    }
}
