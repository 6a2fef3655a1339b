//! Opcode constants, mnemonics, lengths, and category classification.
//!
//! Range-based families (loads, stores, arithmetic, conversions, ...) are
//! classified by fixed numeric-range membership; singletons by exact match.
//! Anything unrecognized degrades to `Other` rather than failing, since the
//! instruction set grows over time.

use crate::classfile::DecodeError;
use crate::domain::metadata::InstructionCategory;

pub const NOP: u8 = 0x00;
pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const LDC2_W: u8 = 0x14;
pub const IINC: u8 = 0x84;
pub const GOTO: u8 = 0xa7;
pub const JSR: u8 = 0xa8;
pub const RET: u8 = 0xa9;
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;
pub const GETSTATIC: u8 = 0xb2;
pub const PUTSTATIC: u8 = 0xb3;
pub const GETFIELD: u8 = 0xb4;
pub const PUTFIELD: u8 = 0xb5;
pub const INVOKEVIRTUAL: u8 = 0xb6;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;
pub const INVOKEINTERFACE: u8 = 0xb9;
pub const INVOKEDYNAMIC: u8 = 0xba;
pub const NEW: u8 = 0xbb;
pub const NEWARRAY: u8 = 0xbc;
pub const ANEWARRAY: u8 = 0xbd;
pub const ARRAYLENGTH: u8 = 0xbe;
pub const ATHROW: u8 = 0xbf;
pub const CHECKCAST: u8 = 0xc0;
pub const INSTANCEOF: u8 = 0xc1;
pub const MONITORENTER: u8 = 0xc2;
pub const MONITOREXIT: u8 = 0xc3;
pub const WIDE: u8 = 0xc4;
pub const MULTIANEWARRAY: u8 = 0xc5;
pub const IFNULL: u8 = 0xc6;
pub const IFNONNULL: u8 = 0xc7;
pub const GOTO_W: u8 = 0xc8;
pub const JSR_W: u8 = 0xc9;

/// Categorize one opcode. Total: every byte value maps to exactly one
/// category, with `Other` as the sink for unrecognized values.
pub fn category(opcode: u8) -> InstructionCategory {
    use InstructionCategory::*;
    match opcode {
        NOP => NoOp,
        0x01..=0x11 => Push,
        LDC | LDC_W | LDC2_W => LoadConstant,
        0x15..=0x2d => Load,
        0x2e..=0x35 => Array,
        0x36..=0x4e => Store,
        0x4f..=0x56 => Array,
        0x57..=0x5f => Stack,
        0x60..=0x77 => Arithmetic,
        0x78..=0x83 => Bitwise,
        IINC => Increment,
        0x85..=0x93 => Conversion,
        0x94..=0x98 => Comparison,
        0x99..=0xa6 => Jump,
        GOTO | JSR | RET => Jump,
        TABLESWITCH | LOOKUPSWITCH => Switch,
        0xac..=0xb1 => Return,
        GETSTATIC..=PUTFIELD => Field,
        INVOKEVIRTUAL..=INVOKEINTERFACE => Invoke,
        INVOKEDYNAMIC => DynamicInvoke,
        NEW => TypeOp,
        NEWARRAY | ANEWARRAY | ARRAYLENGTH => Array,
        ATHROW => Throw,
        CHECKCAST | INSTANCEOF => TypeOp,
        MONITORENTER | MONITOREXIT => Monitor,
        MULTIANEWARRAY => Array,
        IFNULL | IFNONNULL => Jump,
        GOTO_W | JSR_W => Jump,
        _ => Other,
    }
}

/// Instruction length in bytes, including the opcode itself. Switches are
/// variable length (offset-dependent padding); `wide` depends on the opcode
/// it modifies.
pub fn length(code: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let opcode = *code.get(offset).ok_or(DecodeError::Truncated {
        offset,
        needed: 1,
    })?;
    let len = match opcode {
        0x00..=0x0f => 1,
        0x10 => 2,
        0x11 => 3,
        LDC => 2,
        LDC_W | LDC2_W => 3,
        0x15..=0x19 => 2,
        0x1a..=0x35 => 1,
        0x36..=0x3a => 2,
        0x3b..=0x83 => 1,
        IINC => 3,
        0x85..=0x98 => 1,
        0x99..=0xa8 => 3,
        RET => 2,
        TABLESWITCH => tableswitch_length(code, offset)?,
        LOOKUPSWITCH => lookupswitch_length(code, offset)?,
        0xac..=0xb1 => 1,
        GETSTATIC..=PUTFIELD => 3,
        INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => 3,
        INVOKEINTERFACE | INVOKEDYNAMIC => 5,
        NEW => 3,
        NEWARRAY => 2,
        ANEWARRAY => 3,
        ARRAYLENGTH | ATHROW => 1,
        CHECKCAST | INSTANCEOF => 3,
        MONITORENTER | MONITOREXIT => 1,
        WIDE => wide_length(code, offset)?,
        MULTIANEWARRAY => 4,
        IFNULL | IFNONNULL => 3,
        GOTO_W | JSR_W => 5,
        // breakpoint / impdep1 / impdep2 and reserved values.
        _ => 1,
    };
    Ok(len)
}

/// Padding bytes after a switch opcode so its operands start 4-byte aligned.
pub fn switch_padding(offset: usize) -> usize {
    (4 - ((offset + 1) % 4)) % 4
}

fn tableswitch_length(code: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let padding = switch_padding(offset);
    let base = offset + 1 + padding;
    let low = read_i32(code, base + 4)?;
    let high = read_i32(code, base + 8)?;
    let count = high
        .checked_sub(low)
        .and_then(|v| v.checked_add(1))
        .filter(|&v| v >= 0)
        .ok_or_else(|| DecodeError::MalformedAttribute {
            name: "Code/tableswitch".to_string(),
        })?;
    Ok(1 + padding + 12 + (count as usize) * 4)
}

fn lookupswitch_length(code: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let padding = switch_padding(offset);
    let base = offset + 1 + padding;
    let npairs = read_i32(code, base + 4)?;
    if npairs < 0 {
        return Err(DecodeError::MalformedAttribute {
            name: "Code/lookupswitch".to_string(),
        });
    }
    Ok(1 + padding + 8 + (npairs as usize) * 8)
}

fn wide_length(code: &[u8], offset: usize) -> Result<usize, DecodeError> {
    let modified = *code.get(offset + 1).ok_or(DecodeError::Truncated {
        offset: offset + 1,
        needed: 1,
    })?;
    Ok(if modified == IINC { 6 } else { 4 })
}

pub fn read_u16(code: &[u8], offset: usize) -> Result<u16, DecodeError> {
    let slice = code.get(offset..offset + 2).ok_or(DecodeError::Truncated {
        offset,
        needed: 2,
    })?;
    Ok(u16::from_be_bytes([slice[0], slice[1]]))
}

pub fn read_i16(code: &[u8], offset: usize) -> Result<i16, DecodeError> {
    Ok(read_u16(code, offset)? as i16)
}

pub fn read_i32(code: &[u8], offset: usize) -> Result<i32, DecodeError> {
    let slice = code.get(offset..offset + 4).ok_or(DecodeError::Truncated {
        offset,
        needed: 4,
    })?;
    Ok(i32::from_be_bytes([slice[0], slice[1], slice[2], slice[3]]))
}

/// Human-readable mnemonic for an opcode, `"unknown"` for values outside the
/// defined set.
pub fn mnemonic(opcode: u8) -> &'static str {
    const TABLE: [&str; 202] = [
        "nop", "aconst_null", "iconst_m1", "iconst_0", "iconst_1", "iconst_2", "iconst_3",
        "iconst_4", "iconst_5", "lconst_0", "lconst_1", "fconst_0", "fconst_1", "fconst_2",
        "dconst_0", "dconst_1", "bipush", "sipush", "ldc", "ldc_w", "ldc2_w", "iload", "lload",
        "fload", "dload", "aload", "iload_0", "iload_1", "iload_2", "iload_3", "lload_0",
        "lload_1", "lload_2", "lload_3", "fload_0", "fload_1", "fload_2", "fload_3", "dload_0",
        "dload_1", "dload_2", "dload_3", "aload_0", "aload_1", "aload_2", "aload_3", "iaload",
        "laload", "faload", "daload", "aaload", "baload", "caload", "saload", "istore", "lstore",
        "fstore", "dstore", "astore", "istore_0", "istore_1", "istore_2", "istore_3", "lstore_0",
        "lstore_1", "lstore_2", "lstore_3", "fstore_0", "fstore_1", "fstore_2", "fstore_3",
        "dstore_0", "dstore_1", "dstore_2", "dstore_3", "astore_0", "astore_1", "astore_2",
        "astore_3", "iastore", "lastore", "fastore", "dastore", "aastore", "bastore", "castore",
        "sastore", "pop", "pop2", "dup", "dup_x1", "dup_x2", "dup2", "dup2_x1", "dup2_x2", "swap",
        "iadd", "ladd", "fadd", "dadd", "isub", "lsub", "fsub", "dsub", "imul", "lmul", "fmul",
        "dmul", "idiv", "ldiv", "fdiv", "ddiv", "irem", "lrem", "frem", "drem", "ineg", "lneg",
        "fneg", "dneg", "ishl", "lshl", "ishr", "lshr", "iushr", "lushr", "iand", "land", "ior",
        "lor", "ixor", "lxor", "iinc", "i2l", "i2f", "i2d", "l2i", "l2f", "l2d", "f2i", "f2l",
        "f2d", "d2i", "d2l", "d2f", "i2b", "i2c", "i2s", "lcmp", "fcmpl", "fcmpg", "dcmpl",
        "dcmpg", "ifeq", "ifne", "iflt", "ifge", "ifgt", "ifle", "if_icmpeq", "if_icmpne",
        "if_icmplt", "if_icmpge", "if_icmpgt", "if_icmple", "if_acmpeq", "if_acmpne", "goto",
        "jsr", "ret", "tableswitch", "lookupswitch", "ireturn", "lreturn", "freturn", "dreturn",
        "areturn", "return", "getstatic", "putstatic", "getfield", "putfield", "invokevirtual",
        "invokespecial", "invokestatic", "invokeinterface", "invokedynamic", "new", "newarray",
        "anewarray", "arraylength", "athrow", "checkcast", "instanceof", "monitorenter",
        "monitorexit", "wide", "multianewarray", "ifnull", "ifnonnull", "goto_w", "jsr_w",
    ];
    TABLE.get(opcode as usize).copied().unwrap_or("unknown")
}
