//! Machine creation from named configurations and an injected container.
//!
//! A [`Registry`] holds named [`Configuration`]s: ordered step references plus
//! an optional end state. A reference is either a ready instance or a step
//! type that a [`Container`] resolves when a machine is created. The
//! [`Factory`] resolves a configuration, feeds it to the matching builder and
//! returns the built machine.
//!
//! Any container can be plugged in through the [`Container`] trait;
//! [`TypeMap`] is a minimal one.

mod configuration;
mod container;
mod error;
mod registry;
mod resolve;

pub use configuration::{Configuration, IndexedConfiguration, StateConfiguration, StepDescriptor};
pub use container::{Container, Instance, TypeMap};
pub use error::FactoryError;
pub use registry::{Registry, DEFAULT_NAME};
pub use resolve::Factory;
