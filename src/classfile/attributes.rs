//! Attribute table parsing.
//!
//! Every attribute is length-prefixed, so each one is handed to a bounded
//! sub-reader: recognized kinds are decoded, unknown kinds are skipped
//! without affecting anything already decoded.

use crate::classfile::DecodeError;
use crate::classfile::constant_pool::{ConstantPool, normalize_binary_name};
use crate::classfile::instructions::{ExceptionEntry, LineEntry};
use crate::classfile::reader::ByteReader;
use crate::domain::metadata::{AnnotationInfo, AnnotationValue, ConstantValue};

use std::collections::BTreeMap;

/// One LocalVariableTable entry, used for best-effort parameter name
/// recovery.
#[derive(Debug, Clone)]
pub struct LocalVarEntry {
    pub start_pc: u16,
    pub name: String,
    pub descriptor: String,
    pub slot: u16,
}

/// Decoded Code attribute body.
#[derive(Debug, Default)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionEntry>,
    pub lines: Vec<LineEntry>,
    pub local_vars: Vec<LocalVarEntry>,
}

/// Attributes attached to a field or method.
#[derive(Debug, Default)]
pub struct MemberAttributes {
    pub signature: Option<String>,
    pub constant: Option<ConstantValue>,
    pub exceptions: Vec<String>,
    pub annotations: Vec<AnnotationInfo>,
    pub deprecated: bool,
    pub code: Option<CodeAttribute>,
}

/// Attributes attached to the class itself.
#[derive(Debug, Default)]
pub struct ClassAttributes {
    pub signature: Option<String>,
    pub annotations: Vec<AnnotationInfo>,
    pub deprecated: bool,
    pub has_record: bool,
}

pub fn read_member_attributes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<MemberAttributes, DecodeError> {
    let mut out = MemberAttributes::default();
    let count = reader.u16()?;
    for _ in 0..count {
        let name_index = reader.u16()?;
        let length = reader.u32()? as usize;
        let body = reader.bytes(length)?;
        let name = pool.utf8(name_index)?;
        let mut sub = ByteReader::new(body);
        match name {
            "Signature" => {
                out.signature = Some(pool.utf8(sub.u16()?)?.to_string());
            }
            "ConstantValue" => {
                out.constant = pool.constant_value(sub.u16()?)?;
            }
            "Exceptions" => {
                let exception_count = sub.u16()?;
                for _ in 0..exception_count {
                    out.exceptions.push(pool.class_name(sub.u16()?)?);
                }
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                read_annotations(&mut sub, pool, &mut out.annotations)?;
            }
            "Deprecated" => {
                out.deprecated = true;
            }
            "Code" => {
                out.code = Some(read_code(&mut sub, pool)?);
            }
            _ => {} // skipped; the body slice was already consumed
        }
    }
    Ok(out)
}

pub fn read_class_attributes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<ClassAttributes, DecodeError> {
    let mut out = ClassAttributes::default();
    let count = reader.u16()?;
    for _ in 0..count {
        let name_index = reader.u16()?;
        let length = reader.u32()? as usize;
        let body = reader.bytes(length)?;
        let name = pool.utf8(name_index)?;
        let mut sub = ByteReader::new(body);
        match name {
            "Signature" => {
                out.signature = Some(pool.utf8(sub.u16()?)?.to_string());
            }
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                read_annotations(&mut sub, pool, &mut out.annotations)?;
            }
            "Deprecated" => {
                out.deprecated = true;
            }
            "Record" => {
                out.has_record = true;
            }
            _ => {}
        }
    }
    Ok(out)
}

fn read_code(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<CodeAttribute, DecodeError> {
    let mut out = CodeAttribute {
        max_stack: reader.u16()?,
        max_locals: reader.u16()?,
        ..Default::default()
    };

    let code_length = reader.u32()? as usize;
    out.code = reader.bytes(code_length)?.to_vec();

    let exception_count = reader.u16()?;
    for _ in 0..exception_count {
        out.exception_table.push(ExceptionEntry {
            start_pc: reader.u16()?,
            end_pc: reader.u16()?,
            handler_pc: reader.u16()?,
            catch_type: reader.u16()?,
        });
    }

    let attr_count = reader.u16()?;
    for _ in 0..attr_count {
        let name_index = reader.u16()?;
        let length = reader.u32()? as usize;
        let body = reader.bytes(length)?;
        let name = pool.utf8(name_index)?;
        let mut sub = ByteReader::new(body);
        match name {
            "LineNumberTable" => {
                let entry_count = sub.u16()?;
                for _ in 0..entry_count {
                    out.lines.push(LineEntry {
                        start_pc: sub.u16()?,
                        line: sub.u16()?,
                    });
                }
            }
            "LocalVariableTable" => {
                let entry_count = sub.u16()?;
                for _ in 0..entry_count {
                    let start_pc = sub.u16()?;
                    let _length = sub.u16()?;
                    let name = pool.utf8(sub.u16()?)?.to_string();
                    let descriptor = pool.utf8(sub.u16()?)?.to_string();
                    let slot = sub.u16()?;
                    out.local_vars.push(LocalVarEntry {
                        start_pc,
                        name,
                        descriptor,
                        slot,
                    });
                }
            }
            _ => {} // StackMapTable and friends are irrelevant here
        }
    }

    Ok(out)
}

fn read_annotations(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    out: &mut Vec<AnnotationInfo>,
) -> Result<(), DecodeError> {
    let count = reader.u16()?;
    for _ in 0..count {
        out.push(read_annotation(reader, pool)?);
    }
    Ok(())
}

/// Decode one annotation: type descriptor plus name -> element_value pairs.
/// Nested annotations and arrays recurse; recursion depth is bounded by the
/// attribute's byte length, so well-formed input always terminates.
fn read_annotation(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<AnnotationInfo, DecodeError> {
    let type_descriptor = pool.utf8(reader.u16()?)?;
    let name = normalize_binary_name(type_descriptor);
    let pair_count = reader.u16()?;
    let mut values = BTreeMap::new();
    for _ in 0..pair_count {
        let element_name = pool.utf8(reader.u16()?)?.to_string();
        let value = read_element_value(reader, pool)?;
        values.insert(element_name, value);
    }
    Ok(AnnotationInfo { name, values })
}

fn read_element_value(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<AnnotationValue, DecodeError> {
    let tag = reader.u8()?;
    let value = match tag {
        b'B' | b'C' | b'I' | b'S' | b'J' => {
            let index = reader.u16()?;
            match pool.constant_value(index)? {
                Some(ConstantValue::Int(v)) => AnnotationValue::Int(v),
                _ => return Err(DecodeError::BadConstantIndex { index }),
            }
        }
        b'Z' => {
            let index = reader.u16()?;
            match pool.constant_value(index)? {
                Some(ConstantValue::Int(v)) => AnnotationValue::Bool(v != 0),
                _ => return Err(DecodeError::BadConstantIndex { index }),
            }
        }
        b'D' | b'F' => {
            let index = reader.u16()?;
            match pool.constant_value(index)? {
                Some(ConstantValue::Float(v)) => AnnotationValue::Float(v),
                Some(ConstantValue::Int(v)) => AnnotationValue::Float(v as f64),
                _ => return Err(DecodeError::BadConstantIndex { index }),
            }
        }
        b's' => AnnotationValue::Str(pool.utf8(reader.u16()?)?.to_string()),
        b'e' => {
            let type_name = normalize_binary_name(pool.utf8(reader.u16()?)?);
            let const_name = pool.utf8(reader.u16()?)?;
            AnnotationValue::EnumConst(format!("{type_name}.{const_name}"))
        }
        b'c' => AnnotationValue::ClassRef(normalize_binary_name(pool.utf8(reader.u16()?)?)),
        b'@' => AnnotationValue::Nested(read_annotation(reader, pool)?),
        b'[' => {
            let count = reader.u16()?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                items.push(read_element_value(reader, pool)?);
            }
            AnnotationValue::Array(items)
        }
        _ => {
            return Err(DecodeError::MalformedAttribute {
                name: "RuntimeVisibleAnnotations".to_string(),
            });
        }
    };
    Ok(value)
}
