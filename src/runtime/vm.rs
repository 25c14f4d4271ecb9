use super::budget::{BudgetExceeded, ExecutionBudget};
use super::error::{RuntimeFault, RuntimeFaultKind};
use super::op;
use super::sandbox::Meter;
use super::stack::{PushError, Stack};
use super::trace::{ExecutionTrace, TerminalStatus};
use crate::bytecode::{Address, Instruction, Program};

/// What the loop does after an instruction.
enum Flow {
    Next,
    Jump(Address),
    Halt,
}

/// Why the loop stopped early.
enum Interrupt {
    Fault(RuntimeFaultKind),
    Budget(BudgetExceeded),
}

impl From<RuntimeFaultKind> for Interrupt {
    fn from(kind: RuntimeFaultKind) -> Self {
        Interrupt::Fault(kind)
    }
}

/// Machine state for a single run. Created per run and consumed by it.
pub struct VM<'p> {
    program: &'p Program,
    stack: Stack,
    pc: Address,
    output: Vec<String>,
    output_bytes: usize,
    max_stack_depth: usize,
    max_output_bytes: usize,
}

impl<'p> VM<'p> {
    pub fn new(program: &'p Program, budget: &ExecutionBudget) -> Self {
        Self {
            program,
            stack: Stack::new(budget.max_stack_depth),
            pc: 0,
            output: vec![],
            output_bytes: 0,
            max_stack_depth: budget.max_stack_depth,
            max_output_bytes: budget.max_output_bytes,
        }
    }

    /// Fetch, charge, execute until the program halts, faults or the meter trips.
    pub fn run(mut self, meter: &mut Meter) -> ExecutionTrace {
        let status = loop {
            // running off the end is a normal halt
            let Some(instr) = self.program.get(self.pc) else {
                break TerminalStatus::Halted;
            };

            if let Err(breach) = meter.charge() {
                break TerminalStatus::BudgetExceeded(breach);
            }

            match self.dispatch_instruction(instr) {
                Ok(Flow::Next) => self.pc += 1,
                Ok(Flow::Jump(target)) => self.pc = target,
                Ok(Flow::Halt) => break TerminalStatus::Halted,
                Err(Interrupt::Fault(kind)) => {
                    break TerminalStatus::Faulted(self.fault(kind, instr));
                }
                Err(Interrupt::Budget(breach)) => break TerminalStatus::BudgetExceeded(breach),
            }
        };

        ExecutionTrace {
            output: self.output,
            status,
            instructions_executed: meter.executed(),
        }
    }

    fn dispatch_instruction(&mut self, instr: Instruction) -> Result<Flow, Interrupt> {
        match instr {
            Instruction::Push(val) => self.push(val)?,
            Instruction::Print => {
                let val = self.pop()?;

                self.print(val.to_string())?;
            }
            Instruction::Halt => return Ok(Flow::Halt),
            Instruction::Add => self.binary(|a, b| Ok(op::add(a, b)))?,
            Instruction::Sub => self.binary(|a, b| Ok(op::sub(a, b)))?,
            Instruction::Mul => self.binary(|a, b| Ok(op::multiply(a, b)))?,
            Instruction::Div => self.binary(op::divide)?,
            Instruction::Mod => self.binary(op::modulo)?,
            Instruction::Eq => self.binary(|a, b| Ok(op::equal(a, b)))?,
            Instruction::Lt => self.binary(|a, b| Ok(op::less_than(a, b)))?,
            Instruction::Gt => self.binary(|a, b| Ok(op::greater_than(a, b)))?,
            Instruction::Dup => {
                let val = self.stack.peek().ok_or(RuntimeFaultKind::StackUnderflow {
                    needed: 1,
                    available: 0,
                })?;

                self.push(val)?;
            }
            Instruction::Swap => {
                if !self.stack.swap_top() {
                    return Err(self.underflow(2));
                }
            }
            Instruction::Drop => {
                self.pop()?;
            }
            Instruction::Jump(target) => return self.jump(target),
            Instruction::JumpIf(target) => {
                if op::is_truthy(self.pop()?) {
                    return self.jump(target);
                }
            }
        }

        Ok(Flow::Next)
    }

    fn push(&mut self, val: i64) -> Result<(), Interrupt> {
        self.stack.push(val).map_err(|err| match err {
            PushError::Capacity => Interrupt::Fault(RuntimeFaultKind::StackOverflow),
            PushError::Budget => Interrupt::Budget(BudgetExceeded::StackLimit {
                limit: self.max_stack_depth,
            }),
        })
    }

    fn pop(&mut self) -> Result<i64, Interrupt> {
        self.stack.pop().ok_or_else(|| self.underflow(1))
    }

    fn binary(
        &mut self,
        f: impl FnOnce(i64, i64) -> Result<i64, RuntimeFaultKind>,
    ) -> Result<(), Interrupt> {
        let (a, b) = self.stack.pop_pair().ok_or_else(|| self.underflow(2))?;
        let result = f(a, b)?;

        self.push(result)
    }

    /// Commits one printed line unless it would push the output past its ceiling.
    fn print(&mut self, text: String) -> Result<(), Interrupt> {
        let cost = text.len() + 1;

        if self.output_bytes + cost > self.max_output_bytes {
            return Err(Interrupt::Budget(BudgetExceeded::OutputLimit {
                limit: self.max_output_bytes,
            }));
        }

        self.output_bytes += cost;
        self.output.push(text);

        Ok(())
    }

    fn jump(&self, target: Address) -> Result<Flow, Interrupt> {
        // a target equal to the length runs off the end, which halts
        if target > self.program.len() {
            return Err(Interrupt::Fault(RuntimeFaultKind::InvalidJumpTarget {
                target,
                len: self.program.len(),
            }));
        }

        Ok(Flow::Jump(target))
    }

    fn underflow(&self, needed: usize) -> Interrupt {
        Interrupt::Fault(RuntimeFaultKind::StackUnderflow {
            needed,
            available: self.stack.len(),
        })
    }

    fn fault(&self, kind: RuntimeFaultKind, instr: Instruction) -> RuntimeFault {
        RuntimeFault::new(kind, self.pc, instr.opcode(), self.program.span(self.pc))
    }
}

/// Runs `program` to completion under `budget`.
pub fn execute(program: &Program, budget: &ExecutionBudget) -> ExecutionTrace {
    let mut meter = Meter::new(budget);

    VM::new(program, budget).run(&mut meter)
}
