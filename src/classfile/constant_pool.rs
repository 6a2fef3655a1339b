//! Constant pool parsing and symbol resolution.
//!
//! The pool is the class file's symbol table: every name, type, and call
//! target elsewhere in the file is a 1-based index into it. Long and Double
//! entries occupy two slots; the second slot is a placeholder.

use crate::classfile::DecodeError;
use crate::classfile::reader::ByteReader;
use crate::domain::metadata::ConstantValue;

#[derive(Debug, Clone)]
pub enum CpEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    Str { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle,
    MethodType,
    Dynamic { name_and_type_index: u16 },
    InvokeDynamic { name_and_type_index: u16 },
    Module,
    Package,
    /// Second slot of a Long/Double entry, and the unused index 0.
    Placeholder,
}

#[derive(Debug)]
pub struct ConstantPool {
    entries: Vec<CpEntry>,
}

impl ConstantPool {
    /// Parse `constant_pool_count` and the entries that follow it.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let count = reader.u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(CpEntry::Placeholder);

        let mut index = 1u16;
        while index < count {
            let tag_offset = reader.offset();
            let tag = reader.u8()?;
            let entry = match tag {
                1 => {
                    let len = reader.u16()? as usize;
                    let bytes = reader.bytes(len)?;
                    // Modified UTF-8 in practice; lossy is fine for names.
                    CpEntry::Utf8(String::from_utf8_lossy(bytes).into_owned())
                }
                3 => CpEntry::Integer(reader.u32()? as i32),
                4 => CpEntry::Float(f32::from_bits(reader.u32()?)),
                5 => {
                    let high = reader.u32()? as u64;
                    let low = reader.u32()? as u64;
                    CpEntry::Long(((high << 32) | low) as i64)
                }
                6 => {
                    let high = reader.u32()? as u64;
                    let low = reader.u32()? as u64;
                    CpEntry::Double(f64::from_bits((high << 32) | low))
                }
                7 => CpEntry::Class {
                    name_index: reader.u16()?,
                },
                8 => CpEntry::Str {
                    string_index: reader.u16()?,
                },
                9 => CpEntry::FieldRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                10 => CpEntry::MethodRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                11 => CpEntry::InterfaceMethodRef {
                    class_index: reader.u16()?,
                    name_and_type_index: reader.u16()?,
                },
                12 => CpEntry::NameAndType {
                    name_index: reader.u16()?,
                    descriptor_index: reader.u16()?,
                },
                15 => {
                    reader.skip(3)?;
                    CpEntry::MethodHandle
                }
                16 => {
                    reader.skip(2)?;
                    CpEntry::MethodType
                }
                17 => {
                    reader.skip(2)?;
                    CpEntry::Dynamic {
                        name_and_type_index: reader.u16()?,
                    }
                }
                18 => {
                    reader.skip(2)?;
                    CpEntry::InvokeDynamic {
                        name_and_type_index: reader.u16()?,
                    }
                }
                19 => {
                    reader.skip(2)?;
                    CpEntry::Module
                }
                20 => {
                    reader.skip(2)?;
                    CpEntry::Package
                }
                _ => {
                    return Err(DecodeError::UnknownConstantTag {
                        tag,
                        offset: tag_offset,
                    });
                }
            };

            let takes_two_slots = matches!(entry, CpEntry::Long(_) | CpEntry::Double(_));
            entries.push(entry);
            if takes_two_slots {
                entries.push(CpEntry::Placeholder);
                index += 1;
            }
            index += 1;
        }

        Ok(Self { entries })
    }

    pub fn get(&self, index: u16) -> Result<&CpEntry, DecodeError> {
        self.entries
            .get(index as usize)
            .ok_or(DecodeError::BadConstantIndex { index })
    }

    pub fn utf8(&self, index: u16) -> Result<&str, DecodeError> {
        match self.get(index)? {
            CpEntry::Utf8(value) => Ok(value),
            _ => Err(DecodeError::BadConstantIndex { index }),
        }
    }

    /// Resolve a Class entry to its dotted FQN.
    pub fn class_name(&self, index: u16) -> Result<String, DecodeError> {
        match self.get(index)? {
            CpEntry::Class { name_index } => {
                Ok(normalize_binary_name(self.utf8(*name_index)?))
            }
            _ => Err(DecodeError::BadConstantIndex { index }),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str), DecodeError> {
        match self.get(index)? {
            CpEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            _ => Err(DecodeError::BadConstantIndex { index }),
        }
    }

    /// Resolve a Methodref or InterfaceMethodref to (owner FQN, name, descriptor).
    pub fn method_ref(&self, index: u16) -> Result<(String, String, String), DecodeError> {
        let (class_index, nat_index) = match self.get(index)? {
            CpEntry::MethodRef {
                class_index,
                name_and_type_index,
            }
            | CpEntry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => return Err(DecodeError::BadConstantIndex { index }),
        };
        let owner = self.class_name(class_index)?;
        let (name, descriptor) = self.name_and_type(nat_index)?;
        Ok((owner, name.to_string(), descriptor.to_string()))
    }

    /// Resolve a Fieldref to (owner FQN, name, descriptor).
    pub fn field_ref(&self, index: u16) -> Result<(String, String, String), DecodeError> {
        match self.get(index)? {
            CpEntry::FieldRef {
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok((owner, name.to_string(), descriptor.to_string()))
            }
            _ => Err(DecodeError::BadConstantIndex { index }),
        }
    }

    /// Resolve a loadable constant (ldc family, ConstantValue attribute).
    pub fn constant_value(&self, index: u16) -> Result<Option<ConstantValue>, DecodeError> {
        let value = match self.get(index)? {
            CpEntry::Integer(v) => Some(ConstantValue::Int(*v as i64)),
            CpEntry::Long(v) => Some(ConstantValue::Int(*v)),
            CpEntry::Float(v) => Some(ConstantValue::Float(*v as f64)),
            CpEntry::Double(v) => Some(ConstantValue::Float(*v)),
            CpEntry::Str { string_index } => {
                Some(ConstantValue::Str(self.utf8(*string_index)?.to_string()))
            }
            CpEntry::Utf8(value) => Some(ConstantValue::Str(value.clone())),
            _ => None,
        };
        Ok(value)
    }
}

/// Normalize the class file's slash-separated binary name to the conventional
/// dotted form. Array descriptors are reduced to their element class name.
pub fn normalize_binary_name(raw: &str) -> String {
    let mut slice = raw;
    while let Some(rest) = slice.strip_prefix('[') {
        slice = rest;
    }
    if let Some(inner) = slice.strip_prefix('L').and_then(|s| s.strip_suffix(';')) {
        slice = inner;
    }
    slice.replace('/', ".")
}
