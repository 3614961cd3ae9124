//! Stepline: a resumable sequential-step executor.
//!
//! A machine drives a piece of caller-owned data through an ordered list of
//! steps, one step per call to `advance`, until a step declines to advance or
//! an end marker is reached. The only state the caller needs to keep in order
//! to resume later is the current state value.
//!
//! # Core Concepts
//!
//! - **Step**: an async action bound to a state; returns `true` to advance
//! - **End marker**: a synthetic step that never advances, marking the end
//! - **Builder**: collects steps and validates them when a machine is built
//! - **Indexed mode**: state-less steps numbered `0, 1, 2, ...` with the end
//!   marker appended automatically
//! - **Factory**: builds machines from named configurations, resolving step
//!   types through an injected container
//!
//! # Example
//!
//! ```rust
//! use stepline::builder::MachineBuilder;
//! use stepline::core::from_fn;
//! use stepline::state_enum;
//!
//! state_enum! {
//!     enum Order {
//!         Reserve,
//!         Charge,
//!         Shipped,
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let builder = MachineBuilder::new()
//!     .add_step(from_fn(Order::Reserve, |log: &mut Vec<String>| {
//!         log.push("reserved".to_string());
//!         true
//!     }))
//!     .add_step(from_fn(Order::Charge, |log: &mut Vec<String>| {
//!         log.push("charged".to_string());
//!         true
//!     }))
//!     .set_end_state(Order::Shipped);
//!
//! let mut log = Vec::new();
//! let mut machine = builder.build(Order::Reserve, &mut log).unwrap();
//! while machine.advance().await {}
//!
//! assert_eq!(*machine.state(), Order::Shipped);
//! assert_eq!(machine.data().len(), 2);
//! # });
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;
pub mod factory;

// Re-export commonly used types
pub use builder::{BuildError, IndexedBuilder, MachineBuilder};
pub use checkpoint::{Checkpoint, CheckpointError};
pub use core::{DataStep, EndStep, IndexedStep, State, StateHistory, StateTransition, Step};
pub use engine::Machine;
pub use factory::{Container, Factory, FactoryError, Registry, TypeMap};
pub use tokio_util::sync::CancellationToken;
