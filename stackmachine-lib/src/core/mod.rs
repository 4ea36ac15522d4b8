//! contains all important data structures

pub mod token;
pub use token::*;

pub mod instruction;
pub use instruction::*;

pub mod program;
pub use program::*;

pub mod data;
pub use data::*;
