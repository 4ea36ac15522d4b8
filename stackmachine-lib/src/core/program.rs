use std::collections::HashMap;
use std::ops::Deref;

use super::{Instruction, Location};

/// Maps label names (including the `#`) to the index of the instruction they annotate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable(HashMap<String, usize>);

impl LabelTable {
    /// binds `name` to `index`, returns the index it was bound to before, if any
    pub fn bind(&mut self, name: impl Into<String>, index: usize) -> Option<usize> {
        self.0.insert(name.into(), index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }

    /// returns the label that annotates the instruction at `index`. If there are several,
    /// the alphabetically first one is returned, so the answer doesn't depend on hashing
    pub fn label_at(&self, index: usize) -> Option<&str> {
        self.0
            .iter()
            .filter(|(_, &i)| i == index)
            .map(|(name, _)| name.as_str())
            .min()
    }

    /// all bindings, ordered by instruction index
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<_> = self.0.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        entries
    }
}

impl Deref for LabelTable {
    type Target = HashMap<String, usize>;
    fn deref(&self) -> &HashMap<String, usize> {
        &self.0
    }
}

/// A decoded program, ready to be executed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub labels: LabelTable,
    /// has one entry for each instruction, the nth entry is the location of the keyword
    /// that produced the nth instruction
    pub locations: Vec<Location>,
}

impl Program {
    pub fn push(&mut self, instruction: Instruction, at: Location) {
        self.instructions.push(instruction);
        self.locations.push(at);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    pub fn location(&self, pc: usize) -> Option<Location> {
        self.locations.get(pc).copied()
    }

    /// One line per instruction starting at `from`: index, instruction, and label if there
    /// is one. Used for dumps and by the debugger
    pub fn listing(&self, from: usize) -> impl Iterator<Item = String> + '_ {
        self.instructions
            .iter()
            .enumerate()
            .skip(from)
            .map(|(i, inst)| match self.labels.label_at(i) {
                Some(label) => format!("{}: {} {}", i, inst, label),
                None => format!("{}: {}", i, inst),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Token;

    fn sample() -> Program {
        let mut program = Program::default();
        program.push(Instruction::Push(Token::number("1")), Location::default());
        program.push(Instruction::Jp(Token::number("0")), Location { line: 2, col: 1 });
        program.push(Instruction::Add, Location { line: 3, col: 1 });
        program.labels.bind("#b", 1);
        program.labels.bind("#a", 1);
        program.labels.bind("#end", 2);
        program
    }

    #[test]
    fn test_label_lookup() {
        let program = sample();
        assert_eq!(program.labels.index_of("#end"), Some(2));
        assert_eq!(program.labels.index_of("#end"), Some(2));
        assert_eq!(program.labels.index_of("#nope"), None);
        assert_eq!(program.labels.label_at(1), Some("#a"));
        assert_eq!(program.labels.label_at(0), None);
        assert_eq!(
            program.labels.sorted(),
            vec![("#a", 1), ("#b", 1), ("#end", 2)]
        );
    }

    #[test]
    fn test_listing() {
        let program = sample();
        let lines: Vec<_> = program.listing(1).collect();
        assert_eq!(lines, vec!["1: jp 0 #a", "2: add #end"]);
        assert_eq!(program.location(2), Some(Location { line: 3, col: 1 }));
        assert_eq!(program.location(3), None);
    }
}
