//! Core types shared by builders, the machine and the factory.
//!
//! - State identifiers via the `State` trait
//! - Step abstractions: `Step`, `DataStep`, the `EndStep` marker and the
//!   `IndexedStep` adapter
//! - Immutable history of advances

mod history;
mod state;
mod step;

pub use history::{StateHistory, StateTransition};
pub use state::State;
pub use step::{data_fn, from_fn, DataFnStep, DataStep, EndStep, FnStep, IndexedStep, Step};
