//! ## Instruction Set Summary
//!
//! Every instruction is one 32-bit word. Bits 28–31 hold the opcode; for
//! opcodes 0–12 bits 0–8 hold three 3-bit register fields (C, B, A from
//! least to most significant); opcode 13 instead packs a target register
//! into bits 25–27 and a 25-bit unsigned immediate into bits 0–24.
//!
//! ```text
//! 0   CMOV    Conditional move     A <- B if C != 0
//! 1   LOAD    Segmented load       A <- mem[B][C]
//! 2   STORE   Segmented store      mem[A][B] <- C
//! 3   ADD     Add (mod 2^32)       A <- B + C
//! 4   MUL     Multiply (mod 2^32)  A <- B * C
//! 5   DIV     Divide (unsigned)    A <- B / C
//! 6   NAND    Bitwise NAND         A <- !(B & C)
//! 7   HALT    Halt                 (none)
//! 8   MAP     Map segment          B <- new id of length C
//! 9   UNMAP   Unmap segment        release C
//! 10  OUT     Output               write low byte of C
//! 11  IN      Input                read byte into C
//! 12  LOADP   Load program         clone B into segment 0; ip <- C
//! 13  LOADI   Load immediate       A' <- imm (A' in bits 25-27)
//! ```

use crate::error::Fault;
use crate::Word;

/// The three register fields shared by opcodes 0 through 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreeRegisters {
    pub a: u8,
    pub b: u8,
    pub c: u8,
}

/// A decoded instruction, ready for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Conditional move: `if C != 0 { A = B }`.
    ConditionalMove(ThreeRegisters),
    /// Segmented load: `A = mem[B][C]`.
    SegmentedLoad(ThreeRegisters),
    /// Segmented store: `mem[A][B] = C`.
    SegmentedStore(ThreeRegisters),
    /// `A = B + C`, wrapping modulo 2^32.
    Add(ThreeRegisters),
    /// `A = B * C`, wrapping modulo 2^32.
    Multiply(ThreeRegisters),
    /// `A = B / C`, unsigned; dividing by zero is fatal.
    Divide(ThreeRegisters),
    /// `A = !(B & C)`.
    Nand(ThreeRegisters),
    /// Stop execution. Carries no fields.
    Halt,
    /// `B = map(length = C)`.
    Map(ThreeRegisters),
    /// `unmap(C)`.
    Unmap(ThreeRegisters),
    /// Write the low byte of `C` to standard output.
    Output(ThreeRegisters),
    /// Read one byte from standard input into `C`, or `0xFFFFFFFF` at EOF.
    Input(ThreeRegisters),
    /// Clone segment `B` into segment 0 (a no-op copy when `B == 0`) and set
    /// the instruction pointer to `C`.
    LoadProgram(ThreeRegisters),
    /// Load a 25-bit unsigned immediate into the register named in bits
    /// 25–27.
    LoadImmediate { register: u8, value: u32 },
}

const REGISTER_MASK: u32 = 0b111;
const IMMEDIATE_REGISTER_SHIFT: u32 = 25;
const IMMEDIATE_MASK: u32 = (1 << 25) - 1;
const OPCODE_SHIFT: u32 = 28;

fn three_registers(word: Word) -> ThreeRegisters {
    ThreeRegisters {
        a: ((word >> 6) & REGISTER_MASK) as u8,
        b: ((word >> 3) & REGISTER_MASK) as u8,
        c: (word & REGISTER_MASK) as u8,
    }
}

impl Instruction {
    /// Extracts the opcode from bits 28–31 and decodes the rest of the word
    /// according to its layout. Opcodes 14 and 15 are reserved; decoding one
    /// is a fatal fault rather than a panic, since a malformed or adversarial
    /// program must not be able to crash the host process.
    pub fn decode(word: Word) -> Result<Instruction, Fault> {
        let opcode = word >> OPCODE_SHIFT;
        use Instruction::*;
        Ok(match opcode {
            0 => ConditionalMove(three_registers(word)),
            1 => SegmentedLoad(three_registers(word)),
            2 => SegmentedStore(three_registers(word)),
            3 => Add(three_registers(word)),
            4 => Multiply(three_registers(word)),
            5 => Divide(three_registers(word)),
            6 => Nand(three_registers(word)),
            7 => Halt,
            8 => Map(three_registers(word)),
            9 => Unmap(three_registers(word)),
            10 => Output(three_registers(word)),
            11 => Input(three_registers(word)),
            12 => LoadProgram(three_registers(word)),
            13 => LoadImmediate {
                register: ((word >> IMMEDIATE_REGISTER_SHIFT) & REGISTER_MASK) as u8,
                value: word & IMMEDIATE_MASK,
            },
            _ => return Err(Fault::ReservedOpcode(opcode)),
        })
    }
}
