//! Instruction stream classifier.
//!
//! Walks a method's Code attribute in a single forward pass, categorizing
//! every opcode, collecting call sites and control-flow edges, and
//! accumulating per-method statistics. The walk never fails: an operand that
//! runs off the end of the buffer degrades to an `other` record and ends the
//! walk instead of aborting the decode.

use crate::classfile::constant_pool::ConstantPool;
use crate::classfile::opcodes;
use crate::domain::metadata::{
    ConstantValue, FlowEdge, InstructionCategory, InstructionRecord, InstructionStats, Invocation,
};

/// One LineNumberTable entry: instructions at `start_pc` and beyond are on
/// `line` until the next entry.
#[derive(Debug, Clone, Copy)]
pub struct LineEntry {
    pub start_pc: u16,
    pub line: u16,
}

/// One exception-table entry from the Code attribute.
#[derive(Debug, Clone, Copy)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

/// Everything the classifier produces for one method body.
#[derive(Debug, Default)]
pub struct ClassifiedCode {
    pub instructions: Vec<InstructionRecord>,
    pub invocations: Vec<Invocation>,
    pub stats: InstructionStats,
}

/// Classify a method's instruction stream.
pub fn classify(
    code: &[u8],
    lines: &[LineEntry],
    handlers: &[ExceptionEntry],
    pool: &ConstantPool,
) -> ClassifiedCode {
    let mut out = ClassifiedCode::default();

    let mut line_table: Vec<(u32, i32)> = lines
        .iter()
        .map(|e| (e.start_pc as u32, e.line as i32))
        .collect();
    line_table.sort_by_key(|&(pc, _)| pc);

    let mut handler_offsets: Vec<u32> = handlers.iter().map(|h| h.handler_pc as u32).collect();
    handler_offsets.sort_unstable();
    handler_offsets.dedup();

    let mut offset = 0usize;
    while offset < code.len() {
        let pc = offset as u32;
        let line = line_at(&line_table, pc);

        if handler_offsets.binary_search(&pc).is_ok() {
            push_record(
                &mut out,
                line,
                InstructionCategory::Label,
                format!("handler_{pc}:"),
            );
        }

        let opcode = code[offset];
        let length = match opcodes::length(code, offset) {
            Ok(len) if len > 0 && offset + len <= code.len() => len,
            // Desynced or truncated stream: record what we saw and stop.
            _ => {
                push_record(
                    &mut out,
                    line,
                    InstructionCategory::Other,
                    format!("0x{opcode:02x} (truncated)"),
                );
                break;
            }
        };

        let category = opcodes::category(opcode);
        let description = describe(code, offset, opcode, category, pool);

        match category {
            InstructionCategory::Jump => {
                out.stats.jump_count += 1;
                collect_branch_edges(code, offset, length, opcode, &mut out.stats.flow_edges);
            }
            InstructionCategory::Switch => {
                let targets = switch_targets(code, offset, opcode);
                // default branch plus one per case
                out.stats.jump_count += targets.len().max(1) as u32;
                for target in targets {
                    out.stats.flow_edges.push(FlowEdge { from: pc, to: target });
                }
            }
            InstructionCategory::Invoke => {
                out.stats.invoke_count += 1;
                if let Ok(index) = opcodes::read_u16(code, offset + 1) {
                    if let Ok((owner, method, descriptor)) = pool.method_ref(index) {
                        out.invocations.push(Invocation {
                            owner,
                            method,
                            descriptor,
                            line,
                        });
                    }
                }
            }
            // No owner is recoverable from a dynamic call site's pool entry,
            // so it counts as an invoke but yields no Invocation.
            InstructionCategory::DynamicInvoke => {
                out.stats.invoke_count += 1;
            }
            InstructionCategory::Field => {
                out.stats.field_access_count += 1;
            }
            InstructionCategory::Load | InstructionCategory::Store => {
                out.stats.load_store_count += 1;
            }
            _ => {}
        }

        if opcode == opcodes::WIDE {
            // wide iload/istore etc. still count as local variable traffic.
            if let Some(&modified) = code.get(offset + 1) {
                match opcodes::category(modified) {
                    InstructionCategory::Load | InstructionCategory::Store => {
                        out.stats.load_store_count += 1;
                    }
                    _ => {}
                }
            }
        }

        push_record(&mut out, line, category, description);
        offset += length;
    }

    for handler in handlers {
        let line = line_at(&line_table, handler.start_pc as u32);
        push_record(
            &mut out,
            line,
            InstructionCategory::ExceptionRange,
            format!(
                "try [{}, {}) -> handler {}",
                handler.start_pc, handler.end_pc, handler.handler_pc
            ),
        );
    }

    out.stats.estimated_complexity = out.stats.jump_count + 1;
    out
}

fn push_record(
    out: &mut ClassifiedCode,
    line: i32,
    category: InstructionCategory,
    description: String,
) {
    out.instructions.push(InstructionRecord {
        index: out.instructions.len(),
        line,
        category,
        description,
    });
}

fn line_at(table: &[(u32, i32)], pc: u32) -> i32 {
    let mut current = -1;
    for &(start_pc, line) in table {
        if start_pc > pc {
            break;
        }
        current = line;
    }
    current
}

fn collect_branch_edges(
    code: &[u8],
    offset: usize,
    length: usize,
    opcode: u8,
    edges: &mut Vec<FlowEdge>,
) {
    let pc = offset as u32;
    let target = match opcode {
        opcodes::GOTO_W | opcodes::JSR_W => opcodes::read_i32(code, offset + 1)
            .ok()
            .map(|delta| (offset as i64 + delta as i64) as u32),
        // ret jumps through a local variable; the target is not static.
        opcodes::RET => None,
        _ => opcodes::read_i16(code, offset + 1)
            .ok()
            .map(|delta| (offset as i64 + delta as i64) as u32),
    };
    if let Some(target) = target {
        edges.push(FlowEdge { from: pc, to: target });
    }
    if is_conditional(opcode) {
        edges.push(FlowEdge {
            from: pc,
            to: (offset + length) as u32,
        });
    }
}

fn is_conditional(opcode: u8) -> bool {
    matches!(opcode, 0x99..=0xa6 | opcodes::IFNULL | opcodes::IFNONNULL)
}

/// Absolute targets of a tableswitch or lookupswitch: default first, then
/// every case target in table order. Empty on a truncated stream.
fn switch_targets(code: &[u8], offset: usize, opcode: u8) -> Vec<u32> {
    let mut targets = Vec::new();
    let padding = opcodes::switch_padding(offset);
    let base = offset + 1 + padding;

    let abs = |delta: i32| (offset as i64 + delta as i64) as u32;

    let Ok(default) = opcodes::read_i32(code, base) else {
        return targets;
    };
    targets.push(abs(default));

    if opcode == opcodes::TABLESWITCH {
        let (Ok(low), Ok(high)) = (
            opcodes::read_i32(code, base + 4),
            opcodes::read_i32(code, base + 8),
        ) else {
            return targets;
        };
        let count = (high as i64 - low as i64 + 1).max(0) as usize;
        for i in 0..count {
            match opcodes::read_i32(code, base + 12 + i * 4) {
                Ok(delta) => targets.push(abs(delta)),
                Err(_) => break,
            }
        }
    } else {
        let Ok(npairs) = opcodes::read_i32(code, base + 4) else {
            return targets;
        };
        for i in 0..npairs.max(0) as usize {
            match opcodes::read_i32(code, base + 8 + i * 8 + 4) {
                Ok(delta) => targets.push(abs(delta)),
                Err(_) => break,
            }
        }
    }
    targets
}

fn describe(
    code: &[u8],
    offset: usize,
    opcode: u8,
    category: InstructionCategory,
    pool: &ConstantPool,
) -> String {
    let name = opcodes::mnemonic(opcode);
    match category {
        InstructionCategory::Invoke => {
            match opcodes::read_u16(code, offset + 1).ok().and_then(|index| {
                pool.method_ref(index).ok()
            }) {
                Some((owner, method, descriptor)) => {
                    format!("{name} {owner}.{method}{descriptor}")
                }
                None => name.to_string(),
            }
        }
        InstructionCategory::DynamicInvoke => format!("{name} (call site)"),
        InstructionCategory::Field => {
            match opcodes::read_u16(code, offset + 1).ok().and_then(|index| {
                pool.field_ref(index).ok()
            }) {
                Some((owner, field, descriptor)) => {
                    format!("{name} {owner}.{field}:{descriptor}")
                }
                None => name.to_string(),
            }
        }
        InstructionCategory::TypeOp => {
            match opcodes::read_u16(code, offset + 1).ok().and_then(|index| {
                pool.class_name(index).ok()
            }) {
                Some(class) => format!("{name} {class}"),
                None => name.to_string(),
            }
        }
        InstructionCategory::LoadConstant => {
            let index = if opcode == opcodes::LDC {
                code.get(offset + 1).map(|&b| b as u16)
            } else {
                opcodes::read_u16(code, offset + 1).ok()
            };
            match index.and_then(|i| pool.constant_value(i).ok().flatten()) {
                Some(ConstantValue::Str(s)) => format!("{name} \"{s}\""),
                Some(ConstantValue::Int(v)) => format!("{name} {v}"),
                Some(ConstantValue::Float(v)) => format!("{name} {v}"),
                None => name.to_string(),
            }
        }
        InstructionCategory::Jump if opcode != opcodes::RET => {
            let target = if matches!(opcode, opcodes::GOTO_W | opcodes::JSR_W) {
                opcodes::read_i32(code, offset + 1)
                    .ok()
                    .map(|d| offset as i64 + d as i64)
            } else {
                opcodes::read_i16(code, offset + 1)
                    .ok()
                    .map(|d| offset as i64 + d as i64)
            };
            match target {
                Some(t) => format!("{name} -> {t}"),
                None => name.to_string(),
            }
        }
        InstructionCategory::Switch => {
            let cases = switch_targets(code, offset, opcode).len().saturating_sub(1);
            format!("{name} [{cases} cases]")
        }
        InstructionCategory::Increment => {
            match (code.get(offset + 1), code.get(offset + 2)) {
                (Some(&slot), Some(&delta)) => {
                    format!("{name} {slot} by {}", delta as i8)
                }
                _ => name.to_string(),
            }
        }
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::reader::ByteReader;

    fn empty_pool() -> ConstantPool {
        let bytes = 1u16.to_be_bytes();
        let mut reader = ByteReader::new(&bytes);
        ConstantPool::parse(&mut reader).unwrap()
    }

    #[test]
    fn straight_line_code_has_complexity_one() {
        // iconst_1, ireturn
        let code = [0x04, 0xac];
        let result = classify(&code, &[], &[], &empty_pool());
        assert_eq!(result.stats.jump_count, 0);
        assert_eq!(result.stats.estimated_complexity, 1);
        assert_eq!(result.instructions.len(), 2);
        assert_eq!(result.instructions[0].category, InstructionCategory::Push);
        assert_eq!(result.instructions[1].category, InstructionCategory::Return);
    }

    #[test]
    fn conditional_branch_emits_both_edges() {
        // 0: iload_0
        // 1: ifeq 6
        // 4: iconst_1
        // 5: ireturn
        // 6: iconst_0
        // 7: ireturn
        let code = [0x1a, 0x99, 0x00, 0x05, 0x04, 0xac, 0x03, 0xac];
        let result = classify(&code, &[], &[], &empty_pool());
        assert_eq!(result.stats.jump_count, 1);
        assert_eq!(result.stats.estimated_complexity, 2);
        assert!(result.stats.flow_edges.contains(&FlowEdge { from: 1, to: 6 }));
        assert!(result.stats.flow_edges.contains(&FlowEdge { from: 1, to: 4 }));
        assert_eq!(result.stats.load_store_count, 1);
    }

    #[test]
    fn lookupswitch_counts_default_plus_cases() {
        // lookupswitch at offset 0, 2 pairs
        let mut code = vec![opcodes::LOOKUPSWITCH, 0, 0, 0];
        code.extend_from_slice(&28i32.to_be_bytes()); // default
        code.extend_from_slice(&2i32.to_be_bytes()); // npairs
        code.extend_from_slice(&1i32.to_be_bytes());
        code.extend_from_slice(&24i32.to_be_bytes());
        code.extend_from_slice(&2i32.to_be_bytes());
        code.extend_from_slice(&26i32.to_be_bytes());
        let result = classify(&code, &[], &[], &empty_pool());
        assert_eq!(result.stats.jump_count, 3);
        assert_eq!(result.stats.flow_edges.len(), 3);
        assert_eq!(result.instructions[0].category, InstructionCategory::Switch);
    }

    #[test]
    fn line_cursor_follows_table() {
        let code = [0x04, 0xac];
        let lines = [
            LineEntry { start_pc: 0, line: 10 },
            LineEntry { start_pc: 1, line: 11 },
        ];
        let result = classify(&code, &lines, &[], &empty_pool());
        assert_eq!(result.instructions[0].line, 10);
        assert_eq!(result.instructions[1].line, 11);
    }

    #[test]
    fn handlers_produce_label_and_range_records() {
        // 0: iconst_1  1: ireturn  2: iconst_0  3: ireturn
        let code = [0x04, 0xac, 0x03, 0xac];
        let handlers = [ExceptionEntry {
            start_pc: 0,
            end_pc: 2,
            handler_pc: 2,
            catch_type: 0,
        }];
        let result = classify(&code, &[], &handlers, &empty_pool());
        let labels: Vec<_> = result
            .instructions
            .iter()
            .filter(|r| r.category == InstructionCategory::Label)
            .collect();
        assert_eq!(labels.len(), 1);
        let ranges: Vec<_> = result
            .instructions
            .iter()
            .filter(|r| r.category == InstructionCategory::ExceptionRange)
            .collect();
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn truncated_stream_degrades_without_panicking() {
        // invokevirtual missing its operand bytes
        let code = [opcodes::INVOKEVIRTUAL, 0x00];
        let result = classify(&code, &[], &[], &empty_pool());
        assert_eq!(result.instructions.len(), 1);
        assert_eq!(result.instructions[0].category, InstructionCategory::Other);
    }
}
