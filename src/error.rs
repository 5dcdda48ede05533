//! Error taxonomy for the machine.
//!
//! A [`StartupError`] can only occur before a [`Machine`](crate::Machine) exists:
//! bad arguments, a missing file, a program body too short to hold a whole
//! word. A [`Fault`] is raised by a running machine and is the UM equivalent
//! of a processor fault: it is never catchable by the executing program and
//! always terminates the run.

use thiserror::Error;

use crate::SegmentId;

/// Failures detected while building a machine, before it ever executes an
/// instruction.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The program file could not be opened or read.
    #[error("failed to read program file {path}: {source}")]
    ReadProgram {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The file held a number of bytes that does not encode a sequence of
    /// whole 32-bit words up to the expected count.
    #[error("program file {path} is truncated: expected {expected} words, found {found} usable bytes")]
    TruncatedProgram {
        path: String,
        expected: usize,
        found: usize,
    },
}

/// A fatal fault raised by a running machine. Not catchable by the program
/// under execution; the dispatch loop stops as soon as one is produced.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Fault {
    /// Division by zero (opcode 5).
    #[error("division by zero")]
    DivideByZero,

    /// `Output` was asked to emit a register value greater than 255.
    #[error("output value {0:#010x} does not fit in a byte")]
    OutputOutOfRange(u32),

    /// A segment operation referenced an identifier that is not currently
    /// mapped (never allocated, or already released).
    #[error("segment {0} is not mapped")]
    UnmappedSegment(SegmentId),

    /// A read or write addressed an offset at or past the end of a segment.
    #[error("offset {offset} is out of range for segment {id} of length {len}")]
    OffsetOutOfRange {
        id: SegmentId,
        offset: u32,
        len: u32,
    },

    /// An attempt to release segment 0, or to release an identifier that is
    /// already free.
    #[error("cannot release segment {0}")]
    InvalidRelease(SegmentId),

    /// The decoder read opcode 14 or 15, both reserved.
    #[error("reserved opcode {0} encountered")]
    ReservedOpcode(u32),

    /// The instruction pointer fell outside segment 0.
    #[error("instruction pointer {ip} is out of range of segment 0 (length {len})")]
    InstructionPointerOutOfRange { ip: u32, len: u32 },
}
