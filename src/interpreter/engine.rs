//! Execution engine for the interpreter
//!
//! [`Engine`] owns an [`AddressSpace`], an instruction pointer and a relative
//! base register, and runs the fetch-decode-execute loop one instruction per
//! [`Engine::step`].
//!
//! # Suspension
//!
//! The engine never blocks and never runs past a point its caller has to see:
//!
//! - After an output instruction, [`Engine::run_until_output`] returns
//!   [`OutputEvent::Value`] and stops. Calling it again resumes with the next
//!   instruction.
//! - An input instruction with an empty input queue returns
//!   [`OutputEvent::AwaitingInput`] *without* advancing the instruction
//!   pointer, so the same input instruction re-executes once input is supplied.
//!
//! All resumable state (instruction pointer, relative base, memory, queued
//! input) lives in the engine rather than on the call stack, which is what lets
//! an external scheduler drive several engines one output at a time.
//!
//! # Faults
//!
//! Each instruction resolves every operand and its destination before touching
//! any state, so a fatal [`RuntimeError`] leaves the engine exactly as it was
//! before the failing step.

use crate::interpreter::decode::{decode, Instruction, Mode, Opcode};
use crate::interpreter::errors::RuntimeError;
use crate::memory::{to_address, AddressSpace};
use crate::program::{Program, ProgramError};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Run status of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    #[default]
    Ready,
    AwaitingInput,
    Halted,
}

/// Outcome of a run call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEvent {
    Value(i64),
    AwaitingInput,
    Halted,
}

/// Outcome of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Instruction executed, nothing for the caller to see
    Continue,
    /// An input value was consumed
    Input(i64),
    /// A value was emitted
    Output(i64),
    /// Input instruction found the queue empty; not consumed
    NeedsInput,
    /// Halt executed (or the engine was already halted)
    Halted,
}

/// A single virtual machine
#[derive(Debug, Clone)]
pub struct Engine {
    memory: AddressSpace,
    ip: usize,
    relative_base: i64,
    status: RunStatus,
    inputs: VecDeque<i64>,
    steps: u64,
    step_limit: Option<u64>,
}

impl Engine {
    /// Create an engine with its own copy of `program`
    pub fn new(program: &Program) -> Self {
        debug!(words = program.len(), "engine created");
        Engine {
            memory: AddressSpace::new(program.words()),
            ip: 0,
            relative_base: 0,
            status: RunStatus::Ready,
            inputs: VecDeque::new(),
            steps: 0,
            step_limit: None,
        }
    }

    /// Parse program text and create an engine from it
    pub fn from_text(text: &str) -> Result<Self, ProgramError> {
        Ok(Engine::new(&Program::parse(text)?))
    }

    /// Fail with [`RuntimeError::StepLimitExceeded`] after `limit` executed instructions
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn set_step_limit(&mut self, limit: Option<u64>) {
        self.step_limit = limit;
    }

    /// Queue one input value
    pub fn push_input(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    /// Queue input values and run until the next output, input starvation, or halt.
    ///
    /// Inputs not consumed by this call stay queued for the next one.
    pub fn run_until_output(&mut self, inputs: &[i64]) -> Result<OutputEvent, RuntimeError> {
        self.inputs.extend(inputs.iter().copied());

        loop {
            match self.step()? {
                Step::Continue | Step::Input(_) => {}
                Step::Output(value) => return Ok(OutputEvent::Value(value)),
                Step::NeedsInput => return Ok(OutputEvent::AwaitingInput),
                Step::Halted => return Ok(OutputEvent::Halted),
            }
        }
    }

    /// Run until the engine halts or starves, collecting every output
    pub fn run_to_halt(&mut self, inputs: &[i64]) -> Result<Vec<i64>, RuntimeError> {
        let mut outputs = Vec::new();
        let mut pending = inputs;

        while let OutputEvent::Value(value) = self.run_until_output(pending)? {
            outputs.push(value);
            pending = &[];
        }

        Ok(outputs)
    }

    /// Execute exactly one instruction
    pub fn step(&mut self) -> Result<Step, RuntimeError> {
        if self.status == RunStatus::Halted {
            return Ok(Step::Halted);
        }

        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                return Err(RuntimeError::StepLimitExceeded { limit, ip: self.ip });
            }
        }

        let word = self.memory.get(self.ip);
        let instr = decode(word).map_err(|e| e.at(word, self.ip))?;
        trace!(ip = self.ip, word, op = %instr.opcode, rb = self.relative_base, "step");

        let outcome = self.execute(&instr, word)?;

        match outcome {
            Step::NeedsInput => {
                self.status = RunStatus::AwaitingInput;
            }
            Step::Halted => {
                self.steps += 1;
                self.status = RunStatus::Halted;
                debug!(ip = self.ip, steps = self.steps, "engine halted");
            }
            _ => {
                self.steps += 1;
                self.status = RunStatus::Ready;
            }
        }

        Ok(outcome)
    }

    fn execute(&mut self, instr: &Instruction, word: i64) -> Result<Step, RuntimeError> {
        match instr.opcode {
            Opcode::Add => self.arithmetic(instr, word, "add", i64::checked_add),
            Opcode::Multiply => self.arithmetic(instr, word, "multiply", i64::checked_mul),
            Opcode::LessThan => self.compare(instr, word, |a, b| a < b),
            Opcode::Equals => self.compare(instr, word, |a, b| a == b),

            Opcode::Input => {
                let dest = self.destination(instr, 0, word)?;
                match self.inputs.pop_front() {
                    Some(value) => {
                        self.memory.set(dest, value);
                        self.advance(instr);
                        Ok(Step::Input(value))
                    }
                    None => Ok(Step::NeedsInput),
                }
            }

            Opcode::Output => {
                let value = self.value(instr, 0)?;
                self.advance(instr);
                Ok(Step::Output(value))
            }

            Opcode::JumpIfTrue => self.jump(instr, |test| test != 0),
            Opcode::JumpIfFalse => self.jump(instr, |test| test == 0),

            Opcode::AdjustRelativeBase => {
                let delta = self.value(instr, 0)?;
                self.relative_base = self
                    .relative_base
                    .checked_add(delta)
                    .ok_or(RuntimeError::ArithmeticOverflow {
                        operation: "relative base adjustment",
                        ip: self.ip,
                    })?;
                self.advance(instr);
                Ok(Step::Continue)
            }

            Opcode::Halt => Ok(Step::Halted),
        }
    }

    fn arithmetic(
        &mut self,
        instr: &Instruction,
        word: i64,
        operation: &'static str,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<Step, RuntimeError> {
        let left = self.value(instr, 0)?;
        let right = self.value(instr, 1)?;
        let dest = self.destination(instr, 2, word)?;
        let result = op(left, right).ok_or(RuntimeError::ArithmeticOverflow {
            operation,
            ip: self.ip,
        })?;

        self.memory.set(dest, result);
        self.advance(instr);
        Ok(Step::Continue)
    }

    fn compare(
        &mut self,
        instr: &Instruction,
        word: i64,
        test: fn(i64, i64) -> bool,
    ) -> Result<Step, RuntimeError> {
        let left = self.value(instr, 0)?;
        let right = self.value(instr, 1)?;
        let dest = self.destination(instr, 2, word)?;

        self.memory.set(dest, i64::from(test(left, right)));
        self.advance(instr);
        Ok(Step::Continue)
    }

    fn jump(&mut self, instr: &Instruction, taken: fn(i64) -> bool) -> Result<Step, RuntimeError> {
        let test = self.value(instr, 0)?;
        let target = self.value(instr, 1)?;

        if taken(test) {
            self.ip = to_address(target)?;
        } else {
            self.advance(instr);
        }
        Ok(Step::Continue)
    }

    /// Raw parameter word `index` of the current instruction
    fn param(&self, index: usize) -> i64 {
        self.memory.get(self.ip + 1 + index)
    }

    /// Resolve parameter `index` as a value
    fn value(&self, instr: &Instruction, index: usize) -> Result<i64, RuntimeError> {
        let raw = self.param(index);
        match instr.mode(index) {
            Mode::Position => self.memory.read(raw),
            Mode::Immediate => Ok(raw),
            Mode::Relative => self.memory.read(self.relative_address(raw)?),
        }
    }

    /// Resolve parameter `index` as a write destination
    fn destination(&self, instr: &Instruction, index: usize, word: i64) -> Result<usize, RuntimeError> {
        let raw = self.param(index);
        match instr.mode(index) {
            Mode::Position => to_address(raw),
            Mode::Immediate => Err(RuntimeError::InvalidDestinationMode {
                param: index + 1,
                word,
                ip: self.ip,
            }),
            Mode::Relative => to_address(self.relative_address(raw)?),
        }
    }

    fn relative_address(&self, offset: i64) -> Result<i64, RuntimeError> {
        self.relative_base
            .checked_add(offset)
            .ok_or(RuntimeError::ArithmeticOverflow {
                operation: "relative addressing",
                ip: self.ip,
            })
    }

    fn advance(&mut self, instr: &Instruction) {
        self.ip += instr.width();
    }

    // ========== Getter methods for callers and the UI ==========

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status == RunStatus::Halted
    }

    /// Number of instructions executed so far
    pub fn steps_executed(&self) -> u64 {
        self.steps
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    /// Read a word for inspection
    pub fn peek(&self, address: usize) -> i64 {
        self.memory.get(address)
    }

    /// Inputs queued but not yet consumed
    pub fn pending_inputs(&self) -> &VecDeque<i64> {
        &self.inputs
    }
}
