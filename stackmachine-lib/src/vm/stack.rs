use crate::core::Value;
use crate::vm::*;
use std::fmt;
use std::ops::Deref;

/// type that is used at runtime to represent the stack. Derefs to the values bottom to top
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stack(Vec<Value>);

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.0.push(value.into());
    }

    pub fn pop(&mut self) -> Result<Value> {
        self.0.pop().ok_or(Error::StackUnderflow)
    }

    /// returns the value `depth` slots below the top, 0 is the top
    pub fn peek(&self, depth: usize) -> Option<&Value> {
        self.0.iter().rev().nth(depth)
    }

    /// the values from top to bottom
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.iter().rev().cloned().collect()
    }

    pub fn into_snapshot(self) -> Vec<Value> {
        let mut values = self.0;
        values.reverse();
        values
    }
}

impl Deref for Stack {
    type Target = [Value];
    fn deref(&self) -> &[Value] {
        &self.0
    }
}

/// renders as `[1]["a"][true]`, bottom first, or `[]` when empty
impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "[]");
        }
        for value in &self.0 {
            write!(f, "[{}]", value)?;
        }
        Ok(())
    }
}
