//! Rolling disassembly used by the TUI's instruction pane. The 2A03 has
//! no variable-width M/X modes to track while walking the instruction
//! stream, so this just decodes forward.
use crate::console::Console;
use crate::cpu::{self, AddrMode, OpCode};
use crate::memory;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct InstructionWrapper {
    pub location: u16,
    pub branchfrom: Vec<u16>,
    pub branchto: Option<u16>,
    pub text: String,
}

/// Decodes up to `max` instructions starting at `start`, stopping early on
/// a jump/return/break. Branch targets that land inside the decoded
/// window get backfilled into `branchfrom` for the opposite direction.
pub fn debug_instructions(console: &mut Console, start: u16, max: usize) -> Vec<InstructionWrapper> {
    let mut instructions = Vec::new();
    let mut known: HashMap<u16, usize> = HashMap::new();
    let mut branch_indices = Vec::new();
    let mut pc = start;
    let mut cycle = 0usize;

    loop {
        let opcode_byte = memory::read8(console, pc);
        let instr = cpu::decode(opcode_byte);
        let operand_pc = pc.wrapping_add(1);

        let branchto = if instr.mode == AddrMode::Relative {
            let offset = memory::read8(console, operand_pc) as i8;
            let next = operand_pc.wrapping_add(1);
            Some(next.wrapping_add(offset as i16 as u16))
        } else if matches!(instr.opcode, OpCode::Jmp | OpCode::Jsr) && instr.mode == AddrMode::Absolute {
            Some(memory::read16(console, operand_pc))
        } else {
            None
        };

        instructions.push(InstructionWrapper {
            location: pc,
            branchfrom: Vec::new(),
            branchto,
            text: format!("${:04X}: {} {}", pc, instr.opcode, instr.mode),
        });
        known.insert(pc, cycle);
        if branchto.is_some() {
            branch_indices.push(cycle);
        }

        let terminal = matches!(instr.opcode, OpCode::Jmp | OpCode::Rts | OpCode::Rti | OpCode::Brk);
        if terminal || cycle >= max {
            break;
        }
        pc = pc.wrapping_add(instr.size as u16);
        cycle += 1;
    }

    for idx in branch_indices {
        let dest = instructions[idx].branchto.unwrap();
        let loc = instructions[idx].location;
        if let Some(&target) = known.get(&dest) {
            instructions[target].branchfrom.push(loc);
        }
    }
    instructions
}
