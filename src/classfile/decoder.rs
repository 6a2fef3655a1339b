//! The class-file decode entry point.
//!
//! One forward pass over the buffer: header, constant pool, declared type,
//! fields, methods, class attributes. Failure at any point returns an error
//! and no `ClassInfo` — there is no partially populated output.

use crate::classfile::attributes::{self, LocalVarEntry};
use crate::classfile::constant_pool::ConstantPool;
use crate::classfile::descriptor;
use crate::classfile::instructions;
use crate::classfile::reader::ByteReader;
use crate::classfile::{DecodeError, DecodeOptions};
use crate::domain::metadata::{
    ClassCategory, ClassInfo, ClassVersion, FieldInfo, InstructionStats, MethodInfo, ParameterInfo,
};

const MAGIC: u32 = 0xcafe_babe;

const ACC_PUBLIC: u16 = 0x0001;
const ACC_PRIVATE: u16 = 0x0002;
const ACC_PROTECTED: u16 = 0x0004;
const ACC_STATIC: u16 = 0x0008;
const ACC_FINAL: u16 = 0x0010;
const ACC_SYNCHRONIZED: u16 = 0x0020;
const ACC_VOLATILE: u16 = 0x0040;
const ACC_TRANSIENT: u16 = 0x0080;
const ACC_NATIVE: u16 = 0x0100;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const ACC_ANNOTATION: u16 = 0x2000;
const ACC_ENUM: u16 = 0x4000;

/// Decode one class file. All-or-nothing: on any error the caller gets no
/// `ClassInfo` at all.
pub fn decode_class(bytes: &[u8], options: &DecodeOptions) -> Result<ClassInfo, DecodeError> {
    if bytes.len() < 10 {
        return Err(DecodeError::Truncated {
            offset: bytes.len(),
            needed: 10,
        });
    }

    let mut reader = ByteReader::new(bytes);
    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic { found: magic });
    }

    let minor = reader.u16()?;
    let major = reader.u16()?;
    let version = ClassVersion {
        major,
        minor,
        label: version_label(major),
    };

    let pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.u16()?;
    let this_class = reader.u16()?;
    let super_class = reader.u16()?;

    let name = pool.class_name(this_class)?;
    let super_name = if super_class == 0 {
        None
    } else {
        Some(pool.class_name(super_class)?)
    };

    let interface_count = reader.u16()?;
    let mut interfaces = Vec::with_capacity(interface_count as usize);
    for _ in 0..interface_count {
        interfaces.push(pool.class_name(reader.u16()?)?);
    }

    let field_count = reader.u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        fields.push(decode_field(&mut reader, &pool)?);
    }

    let method_count = reader.u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        if let Some(method) = decode_method(&mut reader, &pool, options)? {
            methods.push(method);
        }
    }

    let class_attrs = attributes::read_class_attributes(&mut reader, &pool)?;

    let category = class_category(access_flags, class_attrs.has_record);
    let mut modifiers = class_modifiers(access_flags);
    if class_attrs.deprecated {
        modifiers.push("deprecated".to_string());
    }

    let (package, simple_name) = split_fqn(&name);

    Ok(ClassInfo {
        name,
        simple_name,
        package,
        category,
        super_name,
        interfaces,
        modifiers,
        annotations: class_attrs.annotations,
        fields,
        methods,
        version,
    })
}

/// Release label for a format major version. The table covers 45 ("1.1")
/// through 66 ("22"); newer versions use the same linear offset, and
/// versions below the table are reported as unknown rather than rejected.
pub fn version_label(major: u16) -> String {
    match major {
        45 => "1.1".to_string(),
        46 => "1.2".to_string(),
        47 => "1.3".to_string(),
        48 => "1.4".to_string(),
        49..=66 => (major - 44).to_string(),
        67.. => (major - 44).to_string(),
        _ => "unknown".to_string(),
    }
}

/// Fixed precedence: annotation, interface, enum, record, abstract, class.
fn class_category(flags: u16, has_record: bool) -> ClassCategory {
    if flags & ACC_ANNOTATION != 0 {
        ClassCategory::Annotation
    } else if flags & ACC_INTERFACE != 0 {
        ClassCategory::Interface
    } else if flags & ACC_ENUM != 0 {
        ClassCategory::Enum
    } else if has_record {
        ClassCategory::Record
    } else if flags & ACC_ABSTRACT != 0 {
        ClassCategory::AbstractClass
    } else {
        ClassCategory::Class
    }
}

fn split_fqn(fqn: &str) -> (String, String) {
    match fqn.rfind('.') {
        Some(dot) => (fqn[..dot].to_string(), fqn[dot + 1..].to_string()),
        None => (String::new(), fqn.to_string()),
    }
}

fn class_modifiers(flags: u16) -> Vec<String> {
    let mut out = Vec::new();
    let pairs: [(u16, &str); 4] = [
        (ACC_PUBLIC, "public"),
        (ACC_FINAL, "final"),
        (ACC_ABSTRACT, "abstract"),
        (ACC_INTERFACE, "interface"),
    ];
    for (bit, text) in pairs {
        if flags & bit != 0 {
            out.push(text.to_string());
        }
    }
    out
}

fn field_modifiers(flags: u16) -> Vec<String> {
    let pairs: [(u16, &str); 7] = [
        (ACC_PUBLIC, "public"),
        (ACC_PRIVATE, "private"),
        (ACC_PROTECTED, "protected"),
        (ACC_STATIC, "static"),
        (ACC_FINAL, "final"),
        (ACC_VOLATILE, "volatile"),
        (ACC_TRANSIENT, "transient"),
    ];
    pairs
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, text)| text.to_string())
        .collect()
}

fn method_modifiers(flags: u16) -> Vec<String> {
    let pairs: [(u16, &str); 8] = [
        (ACC_PUBLIC, "public"),
        (ACC_PRIVATE, "private"),
        (ACC_PROTECTED, "protected"),
        (ACC_STATIC, "static"),
        (ACC_FINAL, "final"),
        (ACC_SYNCHRONIZED, "synchronized"),
        (ACC_ABSTRACT, "abstract"),
        (ACC_NATIVE, "native"),
    ];
    pairs
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, text)| text.to_string())
        .collect()
}

fn decode_field(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
) -> Result<FieldInfo, DecodeError> {
    let flags = reader.u16()?;
    let name = pool.utf8(reader.u16()?)?.to_string();
    let descriptor = pool.utf8(reader.u16()?)?.to_string();
    let type_name = descriptor::field_type(&descriptor)?;
    let attrs = attributes::read_member_attributes(reader, pool)?;

    let mut modifiers = field_modifiers(flags);
    if attrs.deprecated {
        modifiers.push("deprecated".to_string());
    }

    Ok(FieldInfo {
        name,
        type_name,
        signature: attrs.signature,
        modifiers,
        is_static: flags & ACC_STATIC != 0,
        is_final: flags & ACC_FINAL != 0,
        is_volatile: flags & ACC_VOLATILE != 0,
        is_transient: flags & ACC_TRANSIENT != 0,
        constant: attrs.constant,
        annotations: attrs.annotations,
    })
}

/// Decode one method, or `None` when the include-private toggle filters it
/// out. The attribute table is always consumed so the stream stays in sync.
fn decode_method(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool,
    options: &DecodeOptions,
) -> Result<Option<MethodInfo>, DecodeError> {
    let flags = reader.u16()?;
    let name = pool.utf8(reader.u16()?)?.to_string();
    let raw_descriptor = pool.utf8(reader.u16()?)?.to_string();
    let attrs = attributes::read_member_attributes(reader, pool)?;

    if flags & ACC_PRIVATE != 0 && !options.include_private {
        return Ok(None);
    }

    let (param_types, return_type) = descriptor::method_signature(&raw_descriptor)?;
    let is_static = flags & ACC_STATIC != 0;

    let mut parameters: Vec<ParameterInfo> = param_types
        .iter()
        .enumerate()
        .map(|(index, type_name)| ParameterInfo {
            index,
            type_name: type_name.clone(),
            name: format!("arg{index}"),
            name_recovered: false,
        })
        .collect();

    let mut modifiers = method_modifiers(flags);
    if attrs.deprecated {
        modifiers.push("deprecated".to_string());
    }

    let (invocations, instruction_records, stats) = match &attrs.code {
        Some(code) => {
            recover_parameter_names(&mut parameters, &param_types, &code.local_vars, is_static);
            let classified = instructions::classify(
                &code.code,
                &code.lines,
                &code.exception_table,
                pool,
            );
            (
                classified.invocations,
                classified.instructions,
                classified.stats,
            )
        }
        None => (Vec::new(), Vec::new(), InstructionStats::default()),
    };

    Ok(Some(MethodInfo {
        name,
        return_type,
        parameters,
        modifiers,
        is_static,
        is_abstract: flags & ACC_ABSTRACT != 0,
        is_synchronized: flags & ACC_SYNCHRONIZED != 0,
        is_native: flags & ACC_NATIVE != 0,
        exceptions: attrs.exceptions,
        annotations: attrs.annotations,
        invocations,
        instructions: instruction_records,
        stats,
        descriptor: raw_descriptor,
    }))
}

/// Upgrade positional placeholders from the debug local-variable table.
/// Parameter `i` lives in the slot after the implicit receiver (non-static
/// methods) plus two slots for each preceding long or double.
fn recover_parameter_names(
    parameters: &mut [ParameterInfo],
    param_types: &[String],
    local_vars: &[LocalVarEntry],
    is_static: bool,
) {
    if local_vars.is_empty() {
        return;
    }
    let widths = descriptor::parameter_slots(param_types);
    let mut slot = if is_static { 0u16 } else { 1u16 };
    for (param, width) in parameters.iter_mut().zip(widths) {
        if let Some(entry) = local_vars
            .iter()
            .find(|v| v.slot == slot && v.start_pc == 0 && v.name != "this")
        {
            param.name = entry.name.clone();
            param.name_recovered = true;
        }
        slot += width as u16;
    }
}
