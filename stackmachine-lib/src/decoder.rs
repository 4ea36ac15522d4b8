//! Groups tokens into [Instruction]s and resolves labels.
//!
//! A keyword token starts an instruction and takes the next `arity` tokens as operands,
//! whatever kind they are. A label token directly after an instruction names that
//! instruction.

use thiserror::Error;
use tracing::warn;

use crate::core::*;

/// What to do with tokens that can't start an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// unknown keywords, stray tokens and rebound labels are errors
    #[default]
    Strict,
    /// skip them with a warning, a rebound label points at its last instruction
    Lenient,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{at}: `{op}` expects {arity} operand(s), but the program ends after {found}")]
    MissingOperand {
        op: OpKind,
        arity: usize,
        found: usize,
        at: Location,
    },

    #[error("{at}: unknown instruction `{name}`")]
    UnknownInstruction { name: String, at: Location },

    #[error("{at}: expected an instruction, found {kind} `{text}`")]
    UnexpectedToken {
        kind: TokenKind,
        text: String,
        at: Location,
    },

    #[error("{at}: label `{name}` already names instruction {index}")]
    DuplicateLabel {
        name: String,
        index: usize,
        at: Location,
    },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

macro_rules! skip_or_bail {
    ($policy:expr, $($err:tt)+) => {
        match $policy {
            DecodePolicy::Strict => return Err(DecodeError::$($err)+),
            DecodePolicy::Lenient => {
                warn!("skipping: {}", DecodeError::$($err)+);
                continue;
            }
        }
    };
}

pub fn decode(tokens: &[Token], policy: DecodePolicy) -> DecodeResult<Program> {
    let mut program = Program::default();
    let mut tokens = tokens.iter().peekable();

    while let Some(token) = tokens.next() {
        if token.kind != TokenKind::Keyword {
            skip_or_bail!(policy, UnexpectedToken {
                kind: token.kind,
                text: token.text.clone(),
                at: token.at,
            });
        }
        let Some(op) = OpKind::from_keyword(&token.text) else {
            skip_or_bail!(policy, UnknownInstruction {
                name: token.text.clone(),
                at: token.at,
            });
        };

        let operands: Vec<Token> = tokens.by_ref().take(op.arity()).cloned().collect();
        let found = operands.len();
        let Some(instruction) = Instruction::new(op, operands) else {
            return Err(DecodeError::MissingOperand {
                op,
                arity: op.arity(),
                found,
                at: token.at,
            });
        };
        program.push(instruction, token.at);

        if let Some(label) = tokens.next_if(|t| t.kind == TokenKind::Label) {
            let index = program.len() - 1;
            if let Some(previous) = program.labels.index_of(&label.text) {
                let err = DecodeError::DuplicateLabel {
                    name: label.text.clone(),
                    index: previous,
                    at: label.at,
                };
                match policy {
                    DecodePolicy::Strict => return Err(err),
                    DecodePolicy::Lenient => warn!("rebinding: {}", err),
                }
            }
            program.labels.bind(label.text.as_str(), index);
        }
    }

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn decode_src(src: &str, policy: DecodePolicy) -> DecodeResult<Program> {
        decode(&tokenize(src).unwrap(), policy)
    }

    fn names(program: &Program) -> Vec<&'static str> {
        program.instructions.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn test_instructions_take_their_operands() {
        let program = decode_src("push 1 push \"x\" add jp 0 jpn 2 lt", DecodePolicy::Strict)
            .unwrap();
        assert_eq!(names(&program), vec!["push", "push", "add", "jp", "jpn", "lt"]);
        assert_eq!(program.instructions[1].operands(), &[Token::new(
            TokenKind::String,
            "x",
            Location { line: 1, col: 13 }
        )]);
        assert_eq!(program.location(2), Some(Location { line: 1, col: 17 }));
    }

    #[test]
    fn test_operands_are_not_type_checked() {
        let program = decode_src("push add jp true", DecodePolicy::Strict).unwrap();
        assert_eq!(names(&program), vec!["push", "jp"]);
        assert_eq!(program.instructions[0].operands()[0].kind, TokenKind::Keyword);
        assert_eq!(program.instructions[1].operands()[0].kind, TokenKind::Boolean);
    }

    #[test]
    fn test_labels() {
        let src = "push 1 #one\nadd #sum\nlt jp 0 #skip";
        let program = decode_src(src, DecodePolicy::Strict).unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(program.labels.index_of("#one"), Some(0));
        assert_eq!(program.labels.index_of("#sum"), Some(1));
        assert_eq!(program.labels.index_of("#skip"), Some(3));
        assert_eq!(program.labels.len(), 3);
    }

    #[test]
    fn test_decoding_is_deterministic() {
        let tokens = tokenize("push 1 #a push 2 #b add #c jpn 0").unwrap();
        let first = decode(&tokens, DecodePolicy::Strict).unwrap();
        let second = decode(&tokens, DecodePolicy::Strict).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            decode_src("push 1 push", DecodePolicy::Strict),
            Err(DecodeError::MissingOperand {
                op: OpKind::Push,
                arity: 1,
                found: 0,
                at: Location { line: 1, col: 8 }
            })
        );
        assert!(matches!(
            decode_src("jp", DecodePolicy::Lenient),
            Err(DecodeError::MissingOperand { .. })
        ));
    }

    #[test]
    fn test_strict_rejects_unknown_and_stray_tokens() {
        assert_eq!(
            decode_src("push 1 dup", DecodePolicy::Strict),
            Err(DecodeError::UnknownInstruction {
                name: "dup".into(),
                at: Location { line: 1, col: 8 }
            })
        );
        assert!(matches!(
            decode_src("#start push 1", DecodePolicy::Strict),
            Err(DecodeError::UnexpectedToken {
                kind: TokenKind::Label,
                ..
            })
        ));
        assert!(matches!(
            decode_src("push 1 2", DecodePolicy::Strict),
            Err(DecodeError::UnexpectedToken {
                kind: TokenKind::Number,
                ..
            })
        ));
        assert!(matches!(
            decode_src("add #a #b", DecodePolicy::Strict),
            Err(DecodeError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_lenient_skips() {
        let program = decode_src("push 1 dup #x 7 add #y", DecodePolicy::Lenient).unwrap();
        assert_eq!(names(&program), vec!["push", "add"]);
        assert_eq!(program.labels.index_of("#x"), None);
        assert_eq!(program.labels.index_of("#y"), Some(1));
    }

    #[test]
    fn test_duplicate_labels() {
        let src = "push 1 #a push 2 #a";
        assert_eq!(
            decode_src(src, DecodePolicy::Strict),
            Err(DecodeError::DuplicateLabel {
                name: "#a".into(),
                index: 0,
                at: Location { line: 1, col: 18 }
            })
        );
        let program = decode_src(src, DecodePolicy::Lenient).unwrap();
        assert_eq!(program.labels.index_of("#a"), Some(1));
    }
}
