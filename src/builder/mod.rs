//! Builders that validate a step list and construct machines.
//!
//! - [`MachineBuilder`]: steps carry explicit states; an end state is required.
//! - [`IndexedBuilder`]: state-less steps are numbered `0, 1, 2, ...`; the end
//!   state is appended automatically when missing.
//!
//! Validation is deferred to `build`, so steps can be collected from several
//! sources before the complete list is known.

pub mod error;
pub mod indexed;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use indexed::IndexedBuilder;
pub use machine::MachineBuilder;
