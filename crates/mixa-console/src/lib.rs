//! Console output for Mixa objects
//!
//! Output goes through an environment module that any class can include:
//!
//! - [`env::terminal`]: writes to the process stdout and reads the real
//!   environment
//! - [`env::capture`]: records output and exit requests on the receiver,
//!   falling back to a base environment for anything it does not override
//!
//! [`console`] builds the `Console` mixin on top of an environment. It only
//! ever talks to the environment by sending messages to the receiver, so
//! swapping the environment under an existing class redirects all of its
//! output.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod ansi;
pub mod console;
pub mod env;

pub use console::console;
