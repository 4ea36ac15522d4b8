//! contains the exec functions that correspond to the [Instruction] variants, and the [Vm]
//! that drives them.
//!
//! Every `exec_` function gets the pc of the instruction it runs and returns the pc of the
//! next one. Binary operators pop their right operand first, then the left one.

use crate::core::*;
use crate::lexer;
use std::cmp::Ordering;
use std::result::Result as StdResult;
use thiserror::Error;
use tracing::{debug, trace};

pub mod stack;
pub use stack::Stack;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("stack underflow")]
    StackUnderflow,

    #[error("type mismatch: {op} is not defined for {left} and {right}")]
    TypeMismatch {
        op: OpKind,
        left: &'static str,
        right: &'static str,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("malformed number `{literal}`: {reason}")]
    MalformedNumber { literal: String, reason: String },

    #[error("{op} cannot use the {found} `{text}` as operand")]
    InvalidOperand {
        op: OpKind,
        found: TokenKind,
        text: String,
    },

    #[error("jump condition must be a bool or an int, found {found}")]
    InvalidCondition { found: &'static str },

    #[error("jump target {target} is before the start of the program")]
    InvalidJumpTarget { target: i128 },

    /// added by [Vm::step], `pc` is the index of the instruction that failed
    #[error("instruction {pc}: {source}")]
    At {
        pc: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// the error without the [Error::At] wrapper
    pub fn root(&self) -> &Error {
        match self {
            Error::At { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = StdResult<T, Error>;
/// the new pc
pub type ExecResult = Result<usize>;

macro_rules! bail {
    ($($err:tt)*) => {
        return Err(Error::$($err)*)
    };
}

macro_rules! ok_pc {
    ($pc:expr) => {
        Ok($pc)
    };
}

/// Holds the state of one run: the pc and the operand stack. A Vm is meant to run a
/// single program; independent Vms share nothing.
#[derive(Debug, Default)]
pub struct Vm {
    pc: usize,
    stack: Stack,
}

impl Vm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }

    pub fn is_finished(&self, program: &Program) -> bool {
        self.pc >= program.len()
    }

    /// executes the instruction under the pc. Does nothing if the program is finished.
    /// On error the pc still points at the failing instruction
    pub fn step(&mut self, program: &Program) -> Result<()> {
        let Some(instruction) = program.get(self.pc) else {
            return Ok(());
        };
        let pc = self.pc;
        self.pc = dispatch(instruction, pc, &mut self.stack).map_err(|e| Error::At {
            pc,
            source: Box::new(e),
        })?;
        trace!(pc, %instruction, stack = %self.stack, "executed");
        Ok(())
    }

    pub fn run(&mut self, program: &Program) -> Result<()> {
        debug!(instructions = program.len(), "starting run");
        while !self.is_finished(program) {
            self.step(program)?;
        }
        debug!(pc = self.pc, depth = self.stack.len(), "run finished");
        Ok(())
    }
}

/// runs `program` on a fresh [Vm] and returns the final stack, top first
pub fn execute(program: &Program) -> Result<Vec<Value>> {
    let mut vm = Vm::new();
    vm.run(program)?;
    Ok(vm.into_stack().into_snapshot())
}

fn dispatch(instruction: &Instruction, pc: usize, stack: &mut Stack) -> ExecResult {
    use Instruction::*;
    match instruction {
        Push(token) => exec_push(pc, stack, token),
        Add => exec_add(pc, stack),
        Sub => exec_int_op(pc, stack, OpKind::Sub, i64::wrapping_sub),
        Mul => exec_int_op(pc, stack, OpKind::Mul, i64::wrapping_mul),
        Div => exec_div(pc, stack),
        Lt => exec_compare(pc, stack, OpKind::Lt, Ordering::is_lt),
        Gt => exec_compare(pc, stack, OpKind::Gt, Ordering::is_gt),
        Le => exec_compare(pc, stack, OpKind::Le, Ordering::is_le),
        Ge => exec_compare(pc, stack, OpKind::Ge, Ordering::is_ge),
        Jp(token) => exec_jp(pc, token),
        Jpn(token) => exec_jpn(pc, stack, token),
    }
}

pub fn exec_push(pc: usize, stack: &mut Stack, token: &Token) -> ExecResult {
    let value = match token.kind {
        TokenKind::Number => Value::Int(parse_int(&token.text)?),
        TokenKind::String => Value::Str(lexer::unescape(&token.text)),
        TokenKind::Boolean => Value::Bool(token.text == "true"),
        found => bail!(InvalidOperand {
            op: OpKind::Push,
            found,
            text: token.text.clone(),
        }),
    };
    stack.push(value);
    ok_pc!(pc + 1)
}

pub fn exec_add(pc: usize, stack: &mut Stack) -> ExecResult {
    let sum = match pop_operands(stack)? {
        (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
        (Value::Str(mut a), Value::Str(b)) => {
            a.push_str(&b);
            Value::Str(a)
        }
        (a, b) => return Err(type_mismatch(OpKind::Add, &a, &b)),
    };
    stack.push(sum);
    ok_pc!(pc + 1)
}

pub fn exec_int_op(
    pc: usize,
    stack: &mut Stack,
    op: OpKind,
    f: fn(i64, i64) -> i64,
) -> ExecResult {
    let (a, b) = pop_ints(stack, op)?;
    stack.push(f(a, b));
    ok_pc!(pc + 1)
}

pub fn exec_div(pc: usize, stack: &mut Stack) -> ExecResult {
    let (a, b) = pop_ints(stack, OpKind::Div)?;
    if b == 0 {
        bail!(DivisionByZero);
    }
    stack.push(a.wrapping_div(b));
    ok_pc!(pc + 1)
}

pub fn exec_compare(
    pc: usize,
    stack: &mut Stack,
    op: OpKind,
    holds: fn(Ordering) -> bool,
) -> ExecResult {
    let ordering = match pop_operands(stack)? {
        (Value::Int(a), Value::Int(b)) => a.cmp(&b),
        (Value::Str(a), Value::Str(b)) => a.cmp(&b),
        (a, b) => return Err(type_mismatch(op, &a, &b)),
    };
    stack.push(holds(ordering));
    ok_pc!(pc + 1)
}

pub fn exec_jp(pc: usize, token: &Token) -> ExecResult {
    let offset = jump_offset(OpKind::Jp, token)?;
    ok_pc!(jump_target(pc, offset)?)
}

pub fn exec_jpn(pc: usize, stack: &mut Stack, token: &Token) -> ExecResult {
    let offset = jump_offset(OpKind::Jpn, token)?;
    let jump = match stack.pop()? {
        Value::Bool(b) => !b,
        Value::Int(n) => n != 1,
        other => bail!(InvalidCondition {
            found: other.type_name()
        }),
    };
    if jump {
        ok_pc!(jump_target(pc, offset)?)
    } else {
        ok_pc!(pc + 1)
    }
}

/// Parses the text of a number token: `0x`/`0X` prefixed literals are base 16, everything
/// else base 10
pub fn parse_int(literal: &str) -> Result<i64> {
    let (digits, radix) = match literal
        .strip_prefix("0x")
        .or_else(|| literal.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (literal, 10),
    };
    if digits.is_empty() {
        bail!(MalformedNumber {
            literal: literal.into(),
            reason: "no digits".into(),
        });
    }
    i64::from_str_radix(digits, radix).map_err(|e| Error::MalformedNumber {
        literal: literal.into(),
        reason: e.to_string(),
    })
}

/// Offsets are number tokens in either base, like `push` literals. Strings and the other
/// token kinds are rejected instead of being read as decimal text
fn jump_offset(op: OpKind, token: &Token) -> Result<i64> {
    match token.kind {
        TokenKind::Number => parse_int(&token.text),
        found => bail!(InvalidOperand {
            op,
            found,
            text: token.text.clone(),
        }),
    }
}

/// `pc + offset + 1`. Landing past the end is fine, that ends the run
fn jump_target(pc: usize, offset: i64) -> Result<usize> {
    let target = pc as i128 + offset as i128 + 1;
    if target < 0 {
        bail!(InvalidJumpTarget { target });
    }
    Ok(usize::try_from(target).unwrap_or(usize::MAX))
}

/// pops the right operand, then the left one, and returns them as (left, right)
fn pop_operands(stack: &mut Stack) -> Result<(Value, Value)> {
    let b = stack.pop()?;
    let a = stack.pop()?;
    Ok((a, b))
}

fn pop_ints(stack: &mut Stack, op: OpKind) -> Result<(i64, i64)> {
    match pop_operands(stack)? {
        (Value::Int(a), Value::Int(b)) => Ok((a, b)),
        (a, b) => Err(type_mismatch(op, &a, &b)),
    }
}

fn type_mismatch(op: OpKind, a: &Value, b: &Value) -> Error {
    Error::TypeMismatch {
        op,
        left: a.type_name(),
        right: b.type_name(),
    }
}
