//! glues the lexer and the decoder together

use thiserror::Error;
use tracing::debug;

use crate::core::Program;
use crate::decoder::{self, DecodeError, DecodePolicy};
use crate::lexer::{self, LexError};

/// Everything that can go wrong before a program runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// tokenizes and decodes `src` with [`DecodePolicy::Strict`]
pub fn load(src: &str) -> Result<Program, LoadError> {
    load_with(src, DecodePolicy::default())
}

pub fn load_with(src: &str, policy: DecodePolicy) -> Result<Program, LoadError> {
    let tokens = lexer::tokenize(src)?;
    debug!(tokens = tokens.len(), "tokenized");
    let program = decoder::decode(&tokens, policy)?;
    debug!(
        instructions = program.len(),
        labels = program.labels.len(),
        ?policy,
        "decoded"
    );
    Ok(program)
}
