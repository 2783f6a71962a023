//! Registration domain module.
//!
//! Drives every resource kind through discovery, registration and teardown,
//! and remembers what each kind registered so shutdown can undo it.
//!
//! ## Architecture
//!
//! - `orchestrator.rs` - `ResourceRegistrationOrchestrator` and its reports
//! - `table.rs` - Per-kind identifier -> handle bookkeeping
//! - `error.rs` - Errors that abort a registration pass

mod error;
mod orchestrator;
mod table;

pub use error::RegistrationError;
pub use orchestrator::{
    KindReport, KindTeardown, RegistrationReport, ResourceRegistrationOrchestrator, UnregistrationReport,
};
pub use table::{LocatedResource, RegistrationTable};
