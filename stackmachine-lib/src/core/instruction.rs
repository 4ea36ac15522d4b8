//! The instruction set.
//!
//! [`OpKind`] is the registry of supported keywords, [`Instruction`] is a decoded instruction
//! that carries its operand tokens. Neither knows how to execute itself, that is the job of
//! the [vm](crate::vm).

use std::fmt;
use strum_macros::{Display, IntoStaticStr};

use super::Token;

/// All operations the machine understands, displayed as their keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum OpKind {
    Push,
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    Jp,
    Jpn,
}

impl OpKind {
    pub const ALL: [OpKind; 11] = [
        OpKind::Push,
        OpKind::Add,
        OpKind::Sub,
        OpKind::Mul,
        OpKind::Div,
        OpKind::Lt,
        OpKind::Gt,
        OpKind::Le,
        OpKind::Ge,
        OpKind::Jp,
        OpKind::Jpn,
    ];

    /// looks up a keyword. Keywords are case sensitive
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == word)
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// number of operand tokens that follow the keyword
    pub fn arity(self) -> usize {
        use OpKind::*;
        match self {
            Push | Jp | Jpn => 1,
            Add | Sub | Mul | Div | Lt | Gt | Le | Ge => 0,
        }
    }
}

/// A decoded instruction. Variants with a token hold their single operand, unchecked:
/// whether the token kind makes sense is decided when the instruction runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// push the operand onto the stack
    Push(Token),
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Le,
    Ge,
    /// relative jump, `jp 0` falls through
    Jp(Token),
    /// pops a condition and jumps unless it is `true` or `1`
    Jpn(Token),
}

impl Instruction {
    /// Builds an instruction from its kind and operand tokens.
    /// Returns None if the number of operands does not match the arity
    pub fn new(kind: OpKind, operands: Vec<Token>) -> Option<Self> {
        let mut operands = operands.into_iter();
        let instruction = match kind {
            OpKind::Push => Instruction::Push(operands.next()?),
            OpKind::Add => Instruction::Add,
            OpKind::Sub => Instruction::Sub,
            OpKind::Mul => Instruction::Mul,
            OpKind::Div => Instruction::Div,
            OpKind::Lt => Instruction::Lt,
            OpKind::Gt => Instruction::Gt,
            OpKind::Le => Instruction::Le,
            OpKind::Ge => Instruction::Ge,
            OpKind::Jp => Instruction::Jp(operands.next()?),
            OpKind::Jpn => Instruction::Jpn(operands.next()?),
        };
        operands.next().is_none().then_some(instruction)
    }

    pub fn kind(&self) -> OpKind {
        use Instruction::*;
        match self {
            Push(_) => OpKind::Push,
            Add => OpKind::Add,
            Sub => OpKind::Sub,
            Mul => OpKind::Mul,
            Div => OpKind::Div,
            Lt => OpKind::Lt,
            Gt => OpKind::Gt,
            Le => OpKind::Le,
            Ge => OpKind::Ge,
            Jp(_) => OpKind::Jp,
            Jpn(_) => OpKind::Jpn,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn arity(&self) -> usize {
        self.kind().arity()
    }

    pub fn operands(&self) -> &[Token] {
        use Instruction::*;
        match self {
            Push(t) | Jp(t) | Jpn(t) => std::slice::from_ref(t),
            Add | Sub | Mul | Div | Lt | Gt | Le | Ge => &[],
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        for operand in self.operands() {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}
