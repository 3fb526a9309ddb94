//! An interpreter for the add/multiply/halt subset of Intcode.
//!
//! Every instruction occupies four cells: an opcode and three operands. The
//! operands are positions in memory, not values: `1 9 10 3` adds the cells at
//! positions 9 and 10 and stores the sum at position 3.

use crate::store::{LoadError, OutOfBounds, ProgramStore, Word};
use failure::Fail;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

/// The position a day-two program reads its first input from.
pub const NOUN: usize = 1;

/// The position a day-two program reads its second input from.
pub const VERB: usize = 2;

const INSN_LEN: usize = 4;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Opcode {
    Add,
    Multiply,
    Halt,
    Unknown(Word),
}

impl From<Word> for Opcode {
    fn from(code: Word) -> Opcode {
        match code {
            1 => Opcode::Add,
            2 => Opcode::Multiply,
            99 => Opcode::Halt,
            code => Opcode::Unknown(code),
        }
    }
}

mod ops {
    use super::Word;

    pub fn add(a: Word, b: Word) -> Option<Word> {
        a.checked_add(b)
    }

    pub fn mul(a: Word, b: Word) -> Option<Word> {
        a.checked_mul(b)
    }
}

/// The three cells following an opcode. Cells past the end of memory are
/// `None`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Operands(pub [Option<Word>; 3]);

impl fmt::Display for Operands {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        for (i, operand) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match operand {
                Some(value) => write!(f, "{}", value)?,
                None => write!(f, "?")?,
            }
        }
        Ok(())
    }
}

/// A decoded instruction. These are never stored; `Interpreter::step`
/// decodes one from memory each time around.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Insn {
    pub opcode: Opcode,
    pub operands: Operands,
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self.opcode {
            Opcode::Add => write!(f, "add {}", self.operands),
            Opcode::Multiply => write!(f, "mul {}", self.operands),
            Opcode::Halt => write!(f, "halt"),
            Opcode::Unknown(code) => write!(f, "op({}) {}", code, self.operands),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Fail, PartialEq)]
pub enum Cause {
    #[fail(display = "instruction extends past the end of memory")]
    Window,

    #[fail(display = "source position {} is out of bounds", _0)]
    Operand(Word),

    #[fail(display = "destination position {} is out of bounds", _0)]
    Destination(Word),

    #[fail(display = "arithmetic overflow")]
    Overflow,

    #[fail(display = "instruction pointer ran off the end of memory")]
    RanOffEnd,
}

/// The ways a run can fail. Any of these leaves the interpreter not ready.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    NotReady,
    UnknownOpcode {
        ip: usize,
        opcode: Word,
        operands: Operands,
    },
    ExecutionFault {
        ip: usize,
        opcode: Option<Word>,
        operands: Operands,
        cause: Cause,
    },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Fault::NotReady => write!(f, "interpreter is not ready to run"),
            Fault::UnknownOpcode {
                ip,
                opcode,
                operands,
            } => write!(
                f,
                "unknown opcode {} at position {} (operands: {})",
                opcode, ip, operands
            ),
            Fault::ExecutionFault {
                ip,
                opcode: Some(opcode),
                operands,
                cause,
            } => write!(
                f,
                "fault at position {} executing {}: {}",
                ip,
                Insn {
                    opcode: Opcode::from(*opcode),
                    operands: *operands
                },
                cause
            ),
            Fault::ExecutionFault {
                ip,
                opcode: None,
                cause,
                ..
            } => write!(f, "fault at position {}: {}", ip, cause),
        }
    }
}

impl Fail for Fault {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    Continue,
    Halted,
}

/// An Intcode interpreter that owns its program's memory.
///
/// The interpreter can be reused: `reset` puts memory back the way it was
/// loaded, after which the inputs can be patched and the program run again.
#[derive(Clone, Debug)]
pub struct Interpreter {
    store: ProgramStore,
    ip: usize,
    ready: bool,

    /// True between a `reset` and the next step. A successful patch made in
    /// this window makes the interpreter ready again.
    rearm: bool,

    trace: bool,
}

impl Interpreter {
    pub fn new(store: ProgramStore) -> Interpreter {
        Interpreter {
            store,
            ip: 0,
            ready: true,
            rearm: false,
            trace: false,
        }
    }

    /// Build an interpreter for `store`, and then apply `patches` in order.
    /// If any patch is out of bounds, the remaining patches are skipped and
    /// the interpreter is left not ready.
    pub fn with_patches(store: ProgramStore, patches: &[(usize, Word)]) -> Interpreter {
        let mut interp = Interpreter::new(store);
        for &(index, value) in patches {
            if interp.store.patch(index, value).is_err() {
                interp.ready = false;
                break;
            }
        }
        interp
    }

    pub fn open<P: AsRef<Path>>(
        path: P,
        patches: &[(usize, Word)],
    ) -> Result<Interpreter, LoadError> {
        Ok(Interpreter::with_patches(ProgramStore::open(path)?, patches))
    }

    pub fn parse(source: &str, patches: &[(usize, Word)]) -> Result<Interpreter, LoadError> {
        Ok(Interpreter::with_patches(ProgramStore::parse(source)?, patches))
    }

    /// Emit a `tracing` event for every instruction executed, and a memory
    /// dump on faults.
    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn store(&self) -> &ProgramStore {
        &self.store
    }

    pub fn memory(&self) -> &[Word] {
        self.store.cells()
    }

    pub fn read(&self, index: usize) -> Result<Word, OutOfBounds> {
        self.store.read(index)
    }

    /// Store `value` at `index`.
    ///
    /// A failed patch changes nothing, readiness included. After a `reset`, a
    /// successful patch makes the interpreter ready again.
    pub fn patch(&mut self, index: usize, value: Word) -> Result<(), OutOfBounds> {
        self.store.patch(index, value)?;
        if self.rearm {
            self.ready = true;
        }
        Ok(())
    }

    pub fn set_inputs(&mut self, noun: Word, verb: Word) -> Result<(), OutOfBounds> {
        self.patch(NOUN, noun)?;
        self.patch(VERB, verb)
    }

    /// Restore memory to its loaded state and rewind to the first
    /// instruction. Readiness is unchanged until the next `patch`.
    pub fn reset(&mut self) {
        self.store.reset();
        self.ip = 0;
        self.rearm = true;
    }

    /// Run until the program halts or faults.
    pub fn run(&mut self) -> Result<(), Fault> {
        loop {
            if self.step()? == Step::Halted {
                return Ok(());
            }
        }
    }

    /// Execute a single instruction. On halt, `ip` stays on the halt
    /// instruction.
    pub fn step(&mut self) -> Result<Step, Fault> {
        if !self.ready {
            return Err(Fault::NotReady);
        }
        self.rearm = false;

        match self.execute() {
            Ok(step) => Ok(step),
            Err(fault) => {
                self.ready = false;
                if self.trace {
                    debug!(%fault, memory = %self, "intcode fault");
                }
                Err(fault)
            }
        }
    }

    fn operands_at(&self, ip: usize) -> Operands {
        let mut operands = Operands::default();
        for (i, operand) in operands.0.iter_mut().enumerate() {
            *operand = self.store.read(ip + 1 + i).ok();
        }
        operands
    }

    fn execute(&mut self) -> Result<Step, Fault> {
        let ip = self.ip;
        let code = self.store.read(ip).map_err(|_| Fault::ExecutionFault {
            ip,
            opcode: None,
            operands: Operands::default(),
            cause: Cause::RanOffEnd,
        })?;
        let insn = Insn {
            opcode: Opcode::from(code),
            operands: self.operands_at(ip),
        };
        if self.trace {
            trace!(ip, %insn, "step");
        }

        let op: fn(Word, Word) -> Option<Word> = match insn.opcode {
            Opcode::Halt => return Ok(Step::Halted),
            Opcode::Add => ops::add,
            Opcode::Multiply => ops::mul,
            Opcode::Unknown(opcode) => {
                return Err(Fault::UnknownOpcode {
                    ip,
                    opcode,
                    operands: insn.operands,
                });
            }
        };

        let fault = |cause| Fault::ExecutionFault {
            ip,
            opcode: Some(code),
            operands: insn.operands,
            cause,
        };

        let (a, b, dest) = match insn.operands.0 {
            [Some(a), Some(b), Some(dest)] => (a, b, dest),
            _ => return Err(fault(Cause::Window)),
        };
        let a_value = self.store.get(a).ok_or_else(|| fault(Cause::Operand(a)))?;
        let b_value = self.store.get(b).ok_or_else(|| fault(Cause::Operand(b)))?;
        let dest_index = self
            .store
            .index_of(dest)
            .ok_or_else(|| fault(Cause::Destination(dest)))?;
        let value = op(a_value, b_value).ok_or_else(|| fault(Cause::Overflow))?;

        self.store
            .patch(dest_index, value)
            .map_err(|_| fault(Cause::Destination(dest)))?;
        self.ip += INSN_LEN;
        Ok(Step::Continue)
    }
}

/// Display memory as space-separated cells, with the cell at the instruction
/// pointer bracketed as `>99<`.
impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        for (i, cell) in self.store.cells().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if i == self.ip {
                write!(f, ">{}<", cell)?;
            } else {
                write!(f, "{}", cell)?;
            }
        }
        Ok(())
    }
}
