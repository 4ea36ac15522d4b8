//! A small stack machine. Running a program takes three steps:
//! 1. tokenize the source with [`lexer::tokenize`]
//! 1. group the tokens into instructions and resolve the labels with [`decoder::decode`]
//! 1. run the resulting [`core::Program`] on a [`vm::Vm`]
//!
//! [`load`] does the first two steps, [`execute`] the last one:
//!
//! ```
//! use stackmachine_lib::{core::Value, execute, load};
//!
//! let program = load("push 2 push 3 add #sum").unwrap();
//! assert_eq!(program.labels.index_of("#sum"), Some(2));
//! assert_eq!(execute(&program).unwrap(), vec![Value::Int(5)]);
//! ```
//!
//! If you want to look at the machine between instructions, drive it yourself:
//!
//! ```
//! use stackmachine_lib::{load, vm::Vm};
//!
//! let program = load("push 1 push 2").unwrap();
//! let mut vm = Vm::new();
//! while !vm.is_finished(&program) {
//!     vm.step(&program).unwrap();
//!     println!("{}: {}", vm.pc(), vm.stack());
//! }
//! ```
pub mod core;
pub mod decoder;
pub mod lexer;
pub mod loader;
pub mod vm;

pub use decoder::DecodePolicy;
pub use loader::{load, load_with, LoadError};
pub use vm::execute;
