//! Mixa Core Runtime
//!
//! This crate provides the module system that everything else is built from:
//! - Module store (own methods, inclusions, dependents)
//! - Linearization of the inclusion graph (ancestor chains)
//! - Lookup and late-bound dispatch with `call_super`
//! - Resolution of effective methods onto method tables, kept live as
//!   modules change
//! - A thin class/object facility for consumers

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod dispatch;
pub mod error;
pub mod method;
pub mod module;
pub mod object;
pub mod resolve;
pub mod value;

pub use dispatch::Call;
pub use error::{MixinError, MixinResult};
pub use method::{Member, Method, MethodBag, Mixin};
pub use module::{DefineContext, Hook, MethodObserver, Module, WeakModule};
pub use object::{Class, Object};
pub use resolve::{Resolved, Target};
pub use value::Value;
