//! Test run reporting for Mixa
//!
//! A test runner describes its progress as a stream of [`Event`]s. Each
//! reporter is a class built from the `Console` mixin plus one method per
//! event; [`Reporter`] instantiates one and forwards events to it.
//!
//! ```text
//! startSuite
//!   startContext
//!     startTest  addFault*  endTest
//!   endContext
//!   update*
//! endSuite
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod dot;
pub mod error;
pub mod event;
pub mod protocol;
pub mod registry;
pub mod reporter;

pub use error::{ReportError, ReportResult};
pub use event::{Event, Fault, FaultKind, Scope, SuiteInfo, Totals};
pub use registry::Registry;
pub use reporter::Reporter;
