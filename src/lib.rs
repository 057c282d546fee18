//! Generator for broadcast traversal overloads over synchronized branched trees.
//!
//! Each [`Arity`] describes one overload: `zip` trees walked in lockstep, `redux`
//! trees handed over whole branch by branch, and `out` result trees. The
//! [`Generator`] builds a [`FunctionDecl`] for it and [`emit`] renders that as
//! C-family source text.
pub mod arity;
pub mod assemble;
pub mod ast;
pub mod cli;
pub mod conventions;
pub mod driver;
pub mod emit;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod naming;
pub mod path_de;
pub mod synth;

pub use arity::{Arity, Grid};
pub use assemble::{generate, Generator};
pub use ast::FunctionDecl;
pub use conventions::Conventions;
pub use error::{ConfigError, GenError};
