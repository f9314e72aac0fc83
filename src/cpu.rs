use crate::memory;
use crate::Console;
use log::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OpCode::Adc => "ADC",
            OpCode::And => "AND",
            OpCode::Asl => "ASL",
            OpCode::Bcc => "BCC",
            OpCode::Bcs => "BCS",
            OpCode::Beq => "BEQ",
            OpCode::Bit => "BIT",
            OpCode::Bmi => "BMI",
            OpCode::Bne => "BNE",
            OpCode::Bpl => "BPL",
            OpCode::Brk => "BRK",
            OpCode::Bvc => "BVC",
            OpCode::Bvs => "BVS",
            OpCode::Clc => "CLC",
            OpCode::Cld => "CLD",
            OpCode::Cli => "CLI",
            OpCode::Clv => "CLV",
            OpCode::Cmp => "CMP",
            OpCode::Cpx => "CPX",
            OpCode::Cpy => "CPY",
            OpCode::Dec => "DEC",
            OpCode::Dex => "DEX",
            OpCode::Dey => "DEY",
            OpCode::Eor => "EOR",
            OpCode::Inc => "INC",
            OpCode::Inx => "INX",
            OpCode::Iny => "INY",
            OpCode::Jmp => "JMP",
            OpCode::Jsr => "JSR",
            OpCode::Lda => "LDA",
            OpCode::Ldx => "LDX",
            OpCode::Ldy => "LDY",
            OpCode::Lsr => "LSR",
            OpCode::Nop => "NOP",
            OpCode::Ora => "ORA",
            OpCode::Pha => "PHA",
            OpCode::Php => "PHP",
            OpCode::Pla => "PLA",
            OpCode::Plp => "PLP",
            OpCode::Rol => "ROL",
            OpCode::Ror => "ROR",
            OpCode::Rti => "RTI",
            OpCode::Rts => "RTS",
            OpCode::Sbc => "SBC",
            OpCode::Sec => "SEC",
            OpCode::Sed => "SED",
            OpCode::Sei => "SEI",
            OpCode::Sta => "STA",
            OpCode::Stx => "STX",
            OpCode::Sty => "STY",
            OpCode::Tax => "TAX",
            OpCode::Tay => "TAY",
            OpCode::Tsx => "TSX",
            OpCode::Txa => "TXA",
            OpCode::Txs => "TXS",
            OpCode::Tya => "TYA",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirectX,
    IndirectIndexedY,
    Relative,
}

impl std::fmt::Display for AddrMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AddrMode::Implied => "Implied",
            AddrMode::Accumulator => "A",
            AddrMode::Immediate => "#",
            AddrMode::ZeroPage => "zp",
            AddrMode::ZeroPageX => "zp,X",
            AddrMode::ZeroPageY => "zp,Y",
            AddrMode::Absolute => "abs",
            AddrMode::AbsoluteX => "abs,X",
            AddrMode::AbsoluteY => "abs,Y",
            AddrMode::Indirect => "(ind)",
            AddrMode::IndexedIndirectX => "(zp,X)",
            AddrMode::IndirectIndexedY => "(zp),Y",
            AddrMode::Relative => "rel",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Nmi,
    /// Reserved: the 2A03's IRQ line is never asserted by anything in this
    /// core (the APU is a stub), but the variant is kept so the enum's
    /// shape doesn't need to change if an IRQ source is added later.
    Irq,
}

#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub c: bool,
    pub z: bool,
    pub i: bool,
    pub d: bool,
    pub v: bool,
    pub n: bool,
}

impl Flags {
    /// Packs the six stored flags into a status byte. `b` selects what
    /// gets written into bit 4 (set for PHP/BRK, clear for NMI/IRQ); bit 5
    /// (U) always reads as 1.
    pub fn to_byte(&self, b: bool) -> u8 {
        let mut byte = 0u8;
        byte |= (self.n as u8) << 7;
        byte |= (self.v as u8) << 6;
        byte |= 1 << 5;
        byte |= (b as u8) << 4;
        byte |= (self.d as u8) << 3;
        byte |= (self.i as u8) << 2;
        byte |= (self.z as u8) << 1;
        byte |= self.c as u8;
        byte
    }

    /// Unpacks a status byte, ignoring B and U (PLP/RTI never resurrect
    /// the break flag as CPU state; `to_byte(false)` of the result always
    /// forces U back to 1).
    pub fn from_byte(&mut self, byte: u8) {
        self.n = byte & 0x80 != 0;
        self.v = byte & 0x40 != 0;
        self.d = byte & 0x08 != 0;
        self.i = byte & 0x04 != 0;
        self.z = byte & 0x02 != 0;
        self.c = byte & 0x01 != 0;
    }
}

impl std::fmt::Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::with_capacity(8);
        s.push(if self.n { 'N' } else { 'n' });
        s.push(if self.v { 'V' } else { 'v' });
        s.push('-');
        s.push('-');
        s.push(if self.d { 'D' } else { 'd' });
        s.push(if self.i { 'I' } else { 'i' });
        s.push(if self.z { 'Z' } else { 'z' });
        s.push(if self.c { 'C' } else { 'c' });
        write!(f, "{}", s)
    }
}

/// The Ricoh 2A03's 6502 core. Mutated only by `reset`/`tick` and the
/// external `trigger_nmi`/`stall_for_dma` entry points.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub flags: Flags,
    pub cycles: u64,
    pub branch_penalty: u8,
    pub stall: u16,
    pub pending_interrupt: Option<Interrupt>,
    decode_warned: bool,
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0,
            pc: 0,
            flags: Flags::default(),
            cycles: 0,
            branch_penalty: 0,
            stall: 0,
            pending_interrupt: None,
            decode_warned: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Normal,
    BranchTaken,
    Jump,
    Subroutine,
    Return,
    Interrupt,
}

#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub opcode: OpCode,
    pub mode: AddrMode,
    pub size: u8,
    pub base_cycles: u8,
    /// False for the 105 byte values that don't correspond to a legal
    /// 6502 opcode; those tolerantly decode to a 1-byte, 2-cycle NOP.
    pub defined: bool,
}

pub fn reset(console: &mut Console) {
    console.cpu.sp = 0xFD;
    console.cpu.flags = Flags {
        i: true,
        ..Flags::default()
    };
    console.cpu.pending_interrupt = None;
    console.cpu.stall = 0;
    console.cpu.pc = memory::read16(console, 0xFFFC);
    trace!("cpu reset, pc=${:04X}", console.cpu.pc);
}

pub fn trigger_nmi(console: &mut Console) {
    console.cpu.pending_interrupt = Some(Interrupt::Nmi);
}

/// Called from the bus on a write to $4014 (OAMDMA).
pub fn stall_for_dma(console: &mut Console) {
    console.cpu.stall += if console.cpu.cycles % 2 == 0 { 513 } else { 514 };
}

/// Advances the CPU by one `tick()`'s worth of work and returns the number
/// of CPU cycles consumed.
pub fn tick(console: &mut Console) -> u8 {
    if console.cpu.stall > 0 {
        console.cpu.stall -= 1;
        return 1;
    }

    if console.cpu.pending_interrupt.take() == Some(Interrupt::Nmi) {
        return service_nmi(console);
    }

    let start_cycles = console.cpu.cycles;
    let opcode_byte = memory::read8(console, console.cpu.pc);
    let instr = decode(opcode_byte);
    if !instr.defined && !console.cpu.decode_warned {
        console.cpu.decode_warned = true;
        warn!(
            "unmapped opcode ${:02X} at ${:04X}, treating as NOP",
            opcode_byte, console.cpu.pc
        );
    }

    let operand = resolve_operand(console, instr.mode);
    let instr_pc = console.cpu.pc;
    console.cpu.pc = console.cpu.pc.wrapping_add(instr.size as u16);
    console.cpu.cycles += instr.base_cycles as u64;
    trace!(
        "${:04X}: {} {} (mode {})",
        instr_pc,
        instr.opcode,
        operand,
        instr.mode
    );

    let result = execute(console, &instr, operand);
    match result {
        ExecutionResult::BranchTaken => {
            console.cpu.cycles += 1 + console.cpu.branch_penalty as u64;
        }
        ExecutionResult::Normal if pays_page_cross(instr.opcode, instr.mode) => {
            console.cpu.cycles += console.cpu.branch_penalty as u64;
        }
        _ => {}
    }

    (console.cpu.cycles - start_cycles) as u8
}

fn service_nmi(console: &mut Console) -> u8 {
    push16(console, console.cpu.pc);
    let status = console.cpu.flags.to_byte(false);
    push8(console, status);
    console.cpu.flags.i = true;
    console.cpu.pc = memory::read16(console, 0xFFFA);
    console.cpu.cycles += 7;
    trace!("NMI serviced, pc=${:04X}", console.cpu.pc);
    7
}

fn pays_page_cross(opcode: OpCode, mode: AddrMode) -> bool {
    matches!(
        mode,
        AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::IndirectIndexedY
    ) && matches!(
        opcode,
        OpCode::Lda
            | OpCode::Ldx
            | OpCode::Ldy
            | OpCode::Eor
            | OpCode::And
            | OpCode::Ora
            | OpCode::Adc
            | OpCode::Sbc
            | OpCode::Cmp
    )
}

/// Formalizes the page-wrap bug in the 6502's 16-bit indirect fetch: when
/// `addr`'s low byte is $FF, the high byte comes from `addr & $FF00`, not
/// the next page.
fn read16_bugged(console: &mut Console, addr: u16) -> u16 {
    let lo = memory::read8(console, addr);
    let hi_addr = (addr & 0xFF00) | (addr.wrapping_add(1) & 0x00FF);
    let hi = memory::read8(console, hi_addr);
    u16::from_le_bytes([lo, hi])
}

fn resolve_operand(console: &mut Console, mode: AddrMode) -> u16 {
    console.cpu.branch_penalty = 0;
    let operand_pc = console.cpu.pc.wrapping_add(1);
    match mode {
        AddrMode::Implied | AddrMode::Accumulator => 0,
        AddrMode::Immediate => operand_pc,
        AddrMode::ZeroPage => memory::read8(console, operand_pc) as u16,
        AddrMode::ZeroPageX => {
            let base = memory::read8(console, operand_pc);
            base.wrapping_add(console.cpu.x) as u16
        }
        AddrMode::ZeroPageY => {
            let base = memory::read8(console, operand_pc);
            base.wrapping_add(console.cpu.y) as u16
        }
        AddrMode::Absolute => memory::read16(console, operand_pc),
        AddrMode::AbsoluteX => {
            let base = memory::read16(console, operand_pc);
            let eff = base.wrapping_add(console.cpu.x as u16);
            if (base & 0xFF00) != (eff & 0xFF00) {
                console.cpu.branch_penalty = 1;
            }
            eff
        }
        AddrMode::AbsoluteY => {
            let base = memory::read16(console, operand_pc);
            let eff = base.wrapping_add(console.cpu.y as u16);
            if (base & 0xFF00) != (eff & 0xFF00) {
                console.cpu.branch_penalty = 1;
            }
            eff
        }
        AddrMode::Indirect => {
            let ptr = memory::read16(console, operand_pc);
            read16_bugged(console, ptr)
        }
        AddrMode::IndexedIndirectX => {
            let zp = memory::read8(console, operand_pc).wrapping_add(console.cpu.x) as u16;
            read16_bugged(console, zp)
        }
        AddrMode::IndirectIndexedY => {
            let zp = memory::read8(console, operand_pc) as u16;
            let base = read16_bugged(console, zp);
            let eff = base.wrapping_add(console.cpu.y as u16);
            if (base & 0xFF00) != (eff & 0xFF00) {
                console.cpu.branch_penalty = 1;
            }
            eff
        }
        AddrMode::Relative => {
            let offset = memory::read8(console, operand_pc) as i8;
            let next_pc = operand_pc.wrapping_add(1);
            let eff = next_pc.wrapping_add(offset as i16 as u16);
            if (next_pc & 0xFF00) != (eff & 0xFF00) {
                console.cpu.branch_penalty = 1;
            }
            eff
        }
    }
}

fn push8(console: &mut Console, value: u8) {
    let addr = 0x0100 | console.cpu.sp as u16;
    memory::write8(console, addr, value);
    console.cpu.sp = console.cpu.sp.wrapping_sub(1);
}

fn pull8(console: &mut Console) -> u8 {
    console.cpu.sp = console.cpu.sp.wrapping_add(1);
    let addr = 0x0100 | console.cpu.sp as u16;
    memory::read8(console, addr)
}

fn push16(console: &mut Console, value: u16) {
    push8(console, (value >> 8) as u8);
    push8(console, (value & 0xFF) as u8);
}

fn pull16(console: &mut Console) -> u16 {
    let lo = pull8(console) as u16;
    let hi = pull8(console) as u16;
    (hi << 8) | lo
}

fn set_nz(console: &mut Console, value: u8) {
    console.cpu.flags.z = value == 0;
    console.cpu.flags.n = value & 0x80 != 0;
}

fn adc_impl(console: &mut Console, operand: u8) {
    let a = console.cpu.a;
    let carry_in = console.cpu.flags.c as u16;
    let sum = a as u16 + operand as u16 + carry_in;
    let result = sum as u8;
    console.cpu.flags.c = sum > 0xFF;
    console.cpu.flags.v = ((a ^ result) & (operand ^ result) & 0x80) != 0;
    console.cpu.a = result;
    set_nz(console, result);
}

fn compare(console: &mut Console, reg: u8, operand: u8) {
    let diff = reg.wrapping_sub(operand);
    console.cpu.flags.c = reg >= operand;
    console.cpu.flags.z = reg == operand;
    console.cpu.flags.n = diff & 0x80 != 0;
}

/// Decodes an opcode byte into `(OpCode, AddrMode, size, base_cycles)`.
/// Returns `None` for the 105 byte values with no legal 6502 encoding.
fn decode_opcode(byte: u8) -> Option<(OpCode, AddrMode, u8, u8)> {
    use AddrMode::*;
    use OpCode::*;
    Some(match byte {
        0x69 => (Adc, Immediate, 2, 2),
        0x65 => (Adc, ZeroPage, 2, 3),
        0x75 => (Adc, ZeroPageX, 2, 4),
        0x6D => (Adc, Absolute, 3, 4),
        0x7D => (Adc, AbsoluteX, 3, 4),
        0x79 => (Adc, AbsoluteY, 3, 4),
        0x61 => (Adc, IndexedIndirectX, 2, 6),
        0x71 => (Adc, IndirectIndexedY, 2, 5),

        0x29 => (And, Immediate, 2, 2),
        0x25 => (And, ZeroPage, 2, 3),
        0x35 => (And, ZeroPageX, 2, 4),
        0x2D => (And, Absolute, 3, 4),
        0x3D => (And, AbsoluteX, 3, 4),
        0x39 => (And, AbsoluteY, 3, 4),
        0x21 => (And, IndexedIndirectX, 2, 6),
        0x31 => (And, IndirectIndexedY, 2, 5),

        0x0A => (Asl, Accumulator, 1, 2),
        0x06 => (Asl, ZeroPage, 2, 5),
        0x16 => (Asl, ZeroPageX, 2, 6),
        0x0E => (Asl, Absolute, 3, 6),
        0x1E => (Asl, AbsoluteX, 3, 7),

        0x90 => (Bcc, Relative, 2, 2),
        0xB0 => (Bcs, Relative, 2, 2),
        0xF0 => (Beq, Relative, 2, 2),
        0x24 => (Bit, ZeroPage, 2, 3),
        0x2C => (Bit, Absolute, 3, 4),
        0x30 => (Bmi, Relative, 2, 2),
        0xD0 => (Bne, Relative, 2, 2),
        0x10 => (Bpl, Relative, 2, 2),
        0x00 => (Brk, Implied, 1, 7),
        0x50 => (Bvc, Relative, 2, 2),
        0x70 => (Bvs, Relative, 2, 2),

        0x18 => (Clc, Implied, 1, 2),
        0xD8 => (Cld, Implied, 1, 2),
        0x58 => (Cli, Implied, 1, 2),
        0xB8 => (Clv, Implied, 1, 2),

        0xC9 => (Cmp, Immediate, 2, 2),
        0xC5 => (Cmp, ZeroPage, 2, 3),
        0xD5 => (Cmp, ZeroPageX, 2, 4),
        0xCD => (Cmp, Absolute, 3, 4),
        0xDD => (Cmp, AbsoluteX, 3, 4),
        0xD9 => (Cmp, AbsoluteY, 3, 4),
        0xC1 => (Cmp, IndexedIndirectX, 2, 6),
        0xD1 => (Cmp, IndirectIndexedY, 2, 5),

        0xE0 => (Cpx, Immediate, 2, 2),
        0xE4 => (Cpx, ZeroPage, 2, 3),
        0xEC => (Cpx, Absolute, 3, 4),
        0xC0 => (Cpy, Immediate, 2, 2),
        0xC4 => (Cpy, ZeroPage, 2, 3),
        0xCC => (Cpy, Absolute, 3, 4),

        0xC6 => (Dec, ZeroPage, 2, 5),
        0xD6 => (Dec, ZeroPageX, 2, 6),
        0xCE => (Dec, Absolute, 3, 6),
        0xDE => (Dec, AbsoluteX, 3, 7),
        0xCA => (Dex, Implied, 1, 2),
        0x88 => (Dey, Implied, 1, 2),

        0x49 => (Eor, Immediate, 2, 2),
        0x45 => (Eor, ZeroPage, 2, 3),
        0x55 => (Eor, ZeroPageX, 2, 4),
        0x4D => (Eor, Absolute, 3, 4),
        0x5D => (Eor, AbsoluteX, 3, 4),
        0x59 => (Eor, AbsoluteY, 3, 4),
        0x41 => (Eor, IndexedIndirectX, 2, 6),
        0x51 => (Eor, IndirectIndexedY, 2, 5),

        0xE6 => (Inc, ZeroPage, 2, 5),
        0xF6 => (Inc, ZeroPageX, 2, 6),
        0xEE => (Inc, Absolute, 3, 6),
        0xFE => (Inc, AbsoluteX, 3, 7),
        0xE8 => (Inx, Implied, 1, 2),
        0xC8 => (Iny, Implied, 1, 2),

        0x4C => (Jmp, Absolute, 3, 3),
        0x6C => (Jmp, Indirect, 3, 5),
        0x20 => (Jsr, Absolute, 3, 6),

        0xA9 => (Lda, Immediate, 2, 2),
        0xA5 => (Lda, ZeroPage, 2, 3),
        0xB5 => (Lda, ZeroPageX, 2, 4),
        0xAD => (Lda, Absolute, 3, 4),
        0xBD => (Lda, AbsoluteX, 3, 4),
        0xB9 => (Lda, AbsoluteY, 3, 4),
        0xA1 => (Lda, IndexedIndirectX, 2, 6),
        0xB1 => (Lda, IndirectIndexedY, 2, 5),

        0xA2 => (Ldx, Immediate, 2, 2),
        0xA6 => (Ldx, ZeroPage, 2, 3),
        0xB6 => (Ldx, ZeroPageY, 2, 4),
        0xAE => (Ldx, Absolute, 3, 4),
        0xBE => (Ldx, AbsoluteY, 3, 4),

        0xA0 => (Ldy, Immediate, 2, 2),
        0xA4 => (Ldy, ZeroPage, 2, 3),
        0xB4 => (Ldy, ZeroPageX, 2, 4),
        0xAC => (Ldy, Absolute, 3, 4),
        0xBC => (Ldy, AbsoluteX, 3, 4),

        0x4A => (Lsr, Accumulator, 1, 2),
        0x46 => (Lsr, ZeroPage, 2, 5),
        0x56 => (Lsr, ZeroPageX, 2, 6),
        0x4E => (Lsr, Absolute, 3, 6),
        0x5E => (Lsr, AbsoluteX, 3, 7),

        0xEA => (Nop, Implied, 1, 2),

        0x09 => (Ora, Immediate, 2, 2),
        0x05 => (Ora, ZeroPage, 2, 3),
        0x15 => (Ora, ZeroPageX, 2, 4),
        0x0D => (Ora, Absolute, 3, 4),
        0x1D => (Ora, AbsoluteX, 3, 4),
        0x19 => (Ora, AbsoluteY, 3, 4),
        0x01 => (Ora, IndexedIndirectX, 2, 6),
        0x11 => (Ora, IndirectIndexedY, 2, 5),

        0x48 => (Pha, Implied, 1, 3),
        0x08 => (Php, Implied, 1, 3),
        0x68 => (Pla, Implied, 1, 4),
        0x28 => (Plp, Implied, 1, 4),

        0x2A => (Rol, Accumulator, 1, 2),
        0x26 => (Rol, ZeroPage, 2, 5),
        0x36 => (Rol, ZeroPageX, 2, 6),
        0x2E => (Rol, Absolute, 3, 6),
        0x3E => (Rol, AbsoluteX, 3, 7),

        0x6A => (Ror, Accumulator, 1, 2),
        0x66 => (Ror, ZeroPage, 2, 5),
        0x76 => (Ror, ZeroPageX, 2, 6),
        0x6E => (Ror, Absolute, 3, 6),
        0x7E => (Ror, AbsoluteX, 3, 7),

        0x40 => (Rti, Implied, 1, 6),
        0x60 => (Rts, Implied, 1, 6),

        0xE9 => (Sbc, Immediate, 2, 2),
        0xE5 => (Sbc, ZeroPage, 2, 3),
        0xF5 => (Sbc, ZeroPageX, 2, 4),
        0xED => (Sbc, Absolute, 3, 4),
        0xFD => (Sbc, AbsoluteX, 3, 4),
        0xF9 => (Sbc, AbsoluteY, 3, 4),
        0xE1 => (Sbc, IndexedIndirectX, 2, 6),
        0xF1 => (Sbc, IndirectIndexedY, 2, 5),

        0x38 => (Sec, Implied, 1, 2),
        0xF8 => (Sed, Implied, 1, 2),
        0x78 => (Sei, Implied, 1, 2),

        0x85 => (Sta, ZeroPage, 2, 3),
        0x95 => (Sta, ZeroPageX, 2, 4),
        0x8D => (Sta, Absolute, 3, 4),
        0x9D => (Sta, AbsoluteX, 3, 5),
        0x99 => (Sta, AbsoluteY, 3, 5),
        0x81 => (Sta, IndexedIndirectX, 2, 6),
        0x91 => (Sta, IndirectIndexedY, 2, 6),

        0x86 => (Stx, ZeroPage, 2, 3),
        0x96 => (Stx, ZeroPageY, 2, 4),
        0x8E => (Stx, Absolute, 3, 4),
        0x84 => (Sty, ZeroPage, 2, 3),
        0x94 => (Sty, ZeroPageX, 2, 4),
        0x8C => (Sty, Absolute, 3, 4),

        0xAA => (Tax, Implied, 1, 2),
        0xA8 => (Tay, Implied, 1, 2),
        0xBA => (Tsx, Implied, 1, 2),
        0x8A => (Txa, Implied, 1, 2),
        0x9A => (Txs, Implied, 1, 2),
        0x98 => (Tya, Implied, 1, 2),

        _ => return None,
    })
}

pub fn decode(byte: u8) -> Instruction {
    match decode_opcode(byte) {
        Some((opcode, mode, size, base_cycles)) => Instruction {
            opcode,
            mode,
            size,
            base_cycles,
            defined: true,
        },
        None => Instruction {
            opcode: OpCode::Nop,
            mode: AddrMode::Implied,
            size: 1,
            base_cycles: 2,
            defined: false,
        },
    }
}

fn execute(console: &mut Console, instr: &Instruction, addr: u16) -> ExecutionResult {
    use OpCode::*;
    match instr.opcode {
        Lda => {
            console.cpu.a = memory::read8(console, addr);
            set_nz(console, console.cpu.a);
        }
        Ldx => {
            console.cpu.x = memory::read8(console, addr);
            set_nz(console, console.cpu.x);
        }
        Ldy => {
            console.cpu.y = memory::read8(console, addr);
            set_nz(console, console.cpu.y);
        }
        Sta => memory::write8(console, addr, console.cpu.a),
        Stx => memory::write8(console, addr, console.cpu.x),
        Sty => memory::write8(console, addr, console.cpu.y),

        Tax => {
            console.cpu.x = console.cpu.a;
            set_nz(console, console.cpu.x);
        }
        Tay => {
            console.cpu.y = console.cpu.a;
            set_nz(console, console.cpu.y);
        }
        Txa => {
            console.cpu.a = console.cpu.x;
            set_nz(console, console.cpu.a);
        }
        Tya => {
            console.cpu.a = console.cpu.y;
            set_nz(console, console.cpu.a);
        }
        Tsx => {
            console.cpu.x = console.cpu.sp;
            set_nz(console, console.cpu.x);
        }
        Txs => console.cpu.sp = console.cpu.x,

        Pha => push8(console, console.cpu.a),
        Php => {
            let byte = console.cpu.flags.to_byte(true);
            push8(console, byte);
        }
        Pla => {
            console.cpu.a = pull8(console);
            set_nz(console, console.cpu.a);
        }
        Plp => {
            let byte = pull8(console);
            console.cpu.flags.from_byte(byte);
        }

        And => {
            let m = memory::read8(console, addr);
            console.cpu.a &= m;
            set_nz(console, console.cpu.a);
        }
        Ora => {
            let m = memory::read8(console, addr);
            console.cpu.a |= m;
            set_nz(console, console.cpu.a);
        }
        Eor => {
            let m = memory::read8(console, addr);
            console.cpu.a ^= m;
            set_nz(console, console.cpu.a);
        }

        Adc => {
            let m = memory::read8(console, addr);
            adc_impl(console, m);
        }
        Sbc => {
            let m = !memory::read8(console, addr);
            adc_impl(console, m);
        }

        Cmp => {
            let m = memory::read8(console, addr);
            compare(console, console.cpu.a, m);
        }
        Cpx => {
            let m = memory::read8(console, addr);
            compare(console, console.cpu.x, m);
        }
        Cpy => {
            let m = memory::read8(console, addr);
            compare(console, console.cpu.y, m);
        }

        Inc => {
            let m = memory::read8(console, addr).wrapping_add(1);
            memory::write8(console, addr, m);
            set_nz(console, m);
        }
        Dec => {
            let m = memory::read8(console, addr).wrapping_sub(1);
            memory::write8(console, addr, m);
            set_nz(console, m);
        }
        Inx => {
            console.cpu.x = console.cpu.x.wrapping_add(1);
            set_nz(console, console.cpu.x);
        }
        Iny => {
            console.cpu.y = console.cpu.y.wrapping_add(1);
            set_nz(console, console.cpu.y);
        }
        Dex => {
            console.cpu.x = console.cpu.x.wrapping_sub(1);
            set_nz(console, console.cpu.x);
        }
        Dey => {
            console.cpu.y = console.cpu.y.wrapping_sub(1);
            set_nz(console, console.cpu.y);
        }

        Asl => {
            if instr.mode == AddrMode::Accumulator {
                console.cpu.flags.c = console.cpu.a & 0x80 != 0;
                console.cpu.a <<= 1;
                set_nz(console, console.cpu.a);
            } else {
                let m = memory::read8(console, addr);
                console.cpu.flags.c = m & 0x80 != 0;
                let result = m << 1;
                memory::write8(console, addr, result);
                set_nz(console, result);
            }
        }
        Lsr => {
            if instr.mode == AddrMode::Accumulator {
                console.cpu.flags.c = console.cpu.a & 0x01 != 0;
                console.cpu.a >>= 1;
                set_nz(console, console.cpu.a);
            } else {
                let m = memory::read8(console, addr);
                console.cpu.flags.c = m & 0x01 != 0;
                let result = m >> 1;
                memory::write8(console, addr, result);
                set_nz(console, result);
            }
        }
        Rol => {
            let old_c = console.cpu.flags.c as u8;
            if instr.mode == AddrMode::Accumulator {
                console.cpu.flags.c = console.cpu.a & 0x80 != 0;
                console.cpu.a = (console.cpu.a << 1) | old_c;
                set_nz(console, console.cpu.a);
            } else {
                let m = memory::read8(console, addr);
                console.cpu.flags.c = m & 0x80 != 0;
                let result = (m << 1) | old_c;
                memory::write8(console, addr, result);
                set_nz(console, result);
            }
        }
        Ror => {
            let old_c = console.cpu.flags.c as u8;
            if instr.mode == AddrMode::Accumulator {
                console.cpu.flags.c = console.cpu.a & 0x01 != 0;
                console.cpu.a = (console.cpu.a >> 1) | (old_c << 7);
                set_nz(console, console.cpu.a);
            } else {
                let m = memory::read8(console, addr);
                console.cpu.flags.c = m & 0x01 != 0;
                let result = (m >> 1) | (old_c << 7);
                memory::write8(console, addr, result);
                set_nz(console, result);
            }
        }

        Bit => {
            let m = memory::read8(console, addr);
            console.cpu.flags.z = (console.cpu.a & m) == 0;
            console.cpu.flags.n = m & 0x80 != 0;
            console.cpu.flags.v = m & 0x40 != 0;
        }

        Bcc => return branch(console, !console.cpu.flags.c, addr),
        Bcs => return branch(console, console.cpu.flags.c, addr),
        Beq => return branch(console, console.cpu.flags.z, addr),
        Bne => return branch(console, !console.cpu.flags.z, addr),
        Bmi => return branch(console, console.cpu.flags.n, addr),
        Bpl => return branch(console, !console.cpu.flags.n, addr),
        Bvc => return branch(console, !console.cpu.flags.v, addr),
        Bvs => return branch(console, console.cpu.flags.v, addr),

        Jmp => {
            console.cpu.pc = addr;
            return ExecutionResult::Jump;
        }
        Jsr => {
            let return_addr = console.cpu.pc.wrapping_sub(1);
            push16(console, return_addr);
            console.cpu.pc = addr;
            return ExecutionResult::Subroutine;
        }
        Rts => {
            console.cpu.pc = pull16(console).wrapping_add(1);
            return ExecutionResult::Return;
        }
        Rti => {
            let byte = pull8(console);
            console.cpu.flags.from_byte(byte);
            console.cpu.pc = pull16(console);
            return ExecutionResult::Return;
        }
        Brk => {
            push16(console, console.cpu.pc);
            let status = console.cpu.flags.to_byte(true);
            push8(console, status);
            console.cpu.flags.i = true;
            console.cpu.pc = memory::read16(console, 0xFFFE);
            return ExecutionResult::Interrupt;
        }

        Clc => console.cpu.flags.c = false,
        Sec => console.cpu.flags.c = true,
        Cli => console.cpu.flags.i = false,
        Sei => console.cpu.flags.i = true,
        Cld => console.cpu.flags.d = false,
        Sed => console.cpu.flags.d = true,
        Clv => console.cpu.flags.v = false,

        Nop => {}
    }
    ExecutionResult::Normal
}

fn branch(console: &mut Console, taken: bool, addr: u16) -> ExecutionResult {
    if taken {
        console.cpu.pc = addr;
        ExecutionResult::BranchTaken
    } else {
        ExecutionResult::Normal
    }
}
