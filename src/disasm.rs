//! Formats a compiled instruction stream as a human-readable listing.
//!
//! Grounded on `original_source/src/utils/helpers.py`'s `run_source`, which
//! prints `f'{idx:03}: {instr}'` for each instruction before handing the
//! program to the VM.

use crate::compiler::Instruction;

/// One `NNN: (OPCODE, ARG)` line per instruction, zero-padded to 3 digits.
/// Instructions with no argument print `(OPCODE)` instead.
pub fn listing(code: &[Instruction]) -> String {
    code.iter()
        .enumerate()
        .map(|(idx, instr)| format!("{idx:03}: {}", format_instruction(instr)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::Const(v) => format!("({}, {v})", instr.opcode()),
        Instruction::Load(name) | Instruction::Store(name) => format!("({}, {name})", instr.opcode()),
        Instruction::JumpIfFalse(target) | Instruction::Jump(target) => {
            format!("({}, {target})", instr.opcode())
        }
        _ => format!("({})", instr.opcode()),
    }
}
