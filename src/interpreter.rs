//! The dispatch loop: fetch a word from segment 0 at the instruction
//! pointer, decode it, execute it, repeat until a halt instruction or a
//! fault.
//!
//! All mutable execution state – registers, instruction pointer, segment
//! store, halted flag – lives on [`Machine`] itself. Two machines built in
//! the same process (as the integration tests do, one per test) never
//! observe or perturb each other's state; there is no module-level or
//! thread-local singleton anywhere in this crate.

use std::io::{Read, Write};

use log::{debug, info, trace};

use crate::error::Fault;
use crate::instruction::Instruction;
use crate::registers::Registers;
use crate::segments::Segments;
use crate::Word;

/// What happened on the most recently executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    /// The instruction executed normally; the loop should keep going.
    Continue,
    /// A halt instruction executed; the loop should stop.
    Halted,
}

/// A running instance of the machine: registers, the segment store, the
/// instruction pointer, and the halted flag, plus the byte streams the
/// `Input`/`Output` opcodes read from and write to.
pub struct Machine<'a> {
    registers: Registers,
    segments: Segments,
    ip: u32,
    halted: bool,
    input: &'a mut dyn Read,
    output: &'a mut dyn Write,
}

impl<'a> Machine<'a> {
    /// Builds a machine with `words` loaded into segment 0 and every
    /// register at zero. `input` and `output` are wired directly to the
    /// `Input`/`Output` opcodes; pass [`std::io::empty`]/[`std::io::sink`]
    /// when a caller has no use for one side of the byte stream.
    pub fn new(words: Vec<Word>, input: &'a mut dyn Read, output: &'a mut dyn Write) -> Machine<'a> {
        let mut segments = Segments::new();
        let word_count = words.len();
        segments.set_zero(words);
        debug!("machine constructed with {word_count} words in segment 0");
        Machine {
            registers: Registers::new(),
            segments,
            ip: 0,
            halted: false,
            input,
            output,
        }
    }

    /// Current instruction pointer, the offset in segment 0 of the next
    /// instruction to fetch.
    pub fn instruction_pointer(&self) -> u32 {
        self.ip
    }

    /// Current value of register `index`.
    pub fn register(&self, index: u8) -> Word {
        self.registers.get(index)
    }

    /// Whether a halt instruction has executed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Runs to completion: steps until a halt instruction executes or a
    /// fault is raised. Flushes `output` before returning either way, so a
    /// caller observes every byte the program emitted even if it faulted.
    pub fn run(&mut self) -> Result<(), Fault> {
        let result = loop {
            match self.step() {
                Ok(Statement::Continue) => continue,
                Ok(Statement::Halted) => break Ok(()),
                Err(fault) => break Err(fault),
            }
        };
        let _ = self.output.flush();
        if result.is_ok() {
            info!("machine halted cleanly at ip={}", self.ip);
        }
        result
    }

    /// Executes exactly one instruction: fetch, advance, decode, dispatch.
    pub fn step(&mut self) -> Result<Statement, Fault> {
        if self.halted {
            return Ok(Statement::Halted);
        }

        let segment0_len = self.segments.reload_zero(0)?;
        if self.ip >= segment0_len {
            return Err(Fault::InstructionPointerOutOfRange {
                ip: self.ip,
                len: segment0_len,
            });
        }
        let word = self.segments.read(0, self.ip)?;
        self.ip = self.ip.wrapping_add(1);

        let instruction = Instruction::decode(word)?;
        self.dispatch(instruction)
    }

    fn dispatch(&mut self, instruction: Instruction) -> Result<Statement, Fault> {
        use Instruction::*;
        match instruction {
            ConditionalMove(r) => {
                if self.reg(r.c) != 0 {
                    self.set_reg(r.a, self.reg(r.b));
                }
            }
            SegmentedLoad(r) => {
                let value = self.segments.read(self.reg(r.b), self.reg(r.c))?;
                self.set_reg(r.a, value);
            }
            SegmentedStore(r) => {
                self.segments
                    .write(self.reg(r.a), self.reg(r.b), self.reg(r.c))?;
            }
            Add(r) => {
                let value = self.reg(r.b).wrapping_add(self.reg(r.c));
                self.set_reg(r.a, value);
            }
            Multiply(r) => {
                let value = self.reg(r.b).wrapping_mul(self.reg(r.c));
                self.set_reg(r.a, value);
            }
            Divide(r) => {
                let divisor = self.reg(r.c);
                if divisor == 0 {
                    return Err(Fault::DivideByZero);
                }
                self.set_reg(r.a, self.reg(r.b) / divisor);
            }
            Nand(r) => {
                let value = !(self.reg(r.b) & self.reg(r.c));
                self.set_reg(r.a, value);
            }
            Halt => {
                self.halted = true;
                return Ok(Statement::Halted);
            }
            Map(r) => {
                let id = self.segments.map(self.reg(r.c));
                self.set_reg(r.b, id);
                trace!("mapped segment {id} of length {}", self.reg(r.c));
            }
            Unmap(r) => {
                let id = self.reg(r.c);
                self.segments.unmap(id)?;
                trace!("unmapped segment {id}");
            }
            Output(r) => {
                let value = self.reg(r.c);
                if value > 0xFF {
                    return Err(Fault::OutputOutOfRange(value));
                }
                let _ = self.output.write_all(&[value as u8]);
            }
            Input(r) => {
                let mut byte = [0u8; 1];
                let value = match self.input.read(&mut byte) {
                    Ok(0) => 0xFFFF_FFFF,
                    Ok(_) => byte[0] as Word,
                    Err(_) => 0xFFFF_FFFF,
                };
                self.set_reg(r.c, value);
            }
            LoadProgram(r) => {
                let target = self.reg(r.b);
                self.segments.reload_zero(target)?;
                self.ip = self.reg(r.c);
            }
            LoadImmediate { register, value } => {
                self.set_reg(register, value);
            }
        }
        Ok(Statement::Continue)
    }

    #[inline]
    fn reg(&self, index: u8) -> Word {
        self.registers.get(index)
    }

    #[inline]
    fn set_reg(&mut self, index: u8, value: Word) {
        self.registers.set(index, value)
    }
}
