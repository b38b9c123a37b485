//! Linear-sweep disassembler for UI display
//!
//! Memory holds code and data interleaved with no markers, so the listing is a
//! best effort: words that do not decode are shown as `data` and the sweep
//! moves on by one word.

use crate::interpreter::decode::{decode, Instruction, Mode};

/// One line of a disassembly listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisasmLine {
    pub address: usize,
    pub words: Vec<i64>,
    pub text: String,
    pub is_instruction: bool,
}

/// Format one parameter according to its mode
pub fn format_param(mode: Mode, raw: i64) -> String {
    match mode {
        Mode::Position => format!("[{}]", raw),
        Mode::Immediate => format!("#{}", raw),
        Mode::Relative if raw < 0 => format!("[rb{}]", raw),
        Mode::Relative => format!("[rb+{}]", raw),
    }
}

/// Render a decoded instruction with its raw parameter words
pub fn format_instruction(instr: &Instruction, params: &[i64]) -> String {
    let operands: Vec<String> = instr
        .modes()
        .iter()
        .zip(params)
        .map(|(mode, raw)| format_param(*mode, *raw))
        .collect();

    if operands.is_empty() {
        instr.opcode.mnemonic().to_string()
    } else {
        format!("{} {}", instr.opcode.mnemonic(), operands.join(", "))
    }
}

/// Disassemble at most `max_lines` lines starting at `start`
pub fn disassemble(memory: &[i64], start: usize, max_lines: usize) -> Vec<DisasmLine> {
    sweep(memory, start, max_lines, None)
}

/// Disassemble all of `memory`, guaranteeing a line begins at `sync`.
///
/// An instruction that would straddle `sync` is shown as data instead, so
/// the instruction pointer always lands on a line of its own.
pub fn disassemble_synced(memory: &[i64], sync: usize) -> Vec<DisasmLine> {
    sweep(memory, 0, usize::MAX, Some(sync))
}

fn sweep(memory: &[i64], start: usize, max_lines: usize, sync: Option<usize>) -> Vec<DisasmLine> {
    let mut lines = Vec::new();
    let mut address = start;

    while address < memory.len() && lines.len() < max_lines {
        let word = memory[address];
        let straddles = |width: usize| sync.is_some_and(|s| address < s && address + width > s);

        match decode(word) {
            Ok(instr) if address + instr.width() <= memory.len() && !straddles(instr.width()) => {
                let words = memory[address..address + instr.width()].to_vec();
                let text = format_instruction(&instr, &words[1..]);
                lines.push(DisasmLine {
                    address,
                    words,
                    text,
                    is_instruction: true,
                });
                address += instr.width();
            }
            _ => {
                lines.push(DisasmLine {
                    address,
                    words: vec![word],
                    text: format!("data {}", word),
                    is_instruction: false,
                });
                address += 1;
            }
        }
    }

    lines
}
