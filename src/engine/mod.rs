//! The step executor.
//!
//! A [`Machine`] holds the current state, a borrow of the caller's data and a
//! forward-only cursor into a shared step sequence. Each call to
//! [`Machine::advance`] runs at most one step.

mod machine;
pub(crate) mod sequence;

pub use machine::Machine;
