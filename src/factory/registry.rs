//! Named configurations, looked up by the factory.

use crate::core::{DataStep, State, Step};
use crate::factory::configuration::{Configuration, IndexedConfiguration, StateConfiguration};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Name used when a caller does not pick one.
pub const DEFAULT_NAME: &str = "";

type Key = (String, TypeId);

/// Store of named configurations.
///
/// Entries are keyed by name and configuration type, so the same name can
/// hold one configuration per state/data combination without clashing.
///
/// # Example
///
/// ```rust
/// use stepline::core::data_fn;
/// use stepline::factory::{Registry, DEFAULT_NAME};
///
/// let mut registry = Registry::new();
/// registry
///     .indexed::<u32>("nightly")
///     .add_instance(data_fn(|n: &mut u32| { *n += 1; true }));
///
/// assert!(registry.get_indexed::<u32>("nightly").is_some());
/// assert!(registry.get_indexed::<u32>(DEFAULT_NAME).is_none());
/// ```
#[derive(Default)]
pub struct Registry {
    configs: HashMap<Key, Box<dyn Any + Send + Sync>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit-state configuration registered under `name`, created empty
    /// on first use.
    pub fn states<S, D>(&mut self, name: &str) -> &mut StateConfiguration<S, D>
    where
        S: State + 'static,
        D: 'static,
    {
        self.entry(name)
    }

    /// Implicit-integer configuration registered under `name`, created empty
    /// on first use.
    pub fn indexed<D>(&mut self, name: &str) -> &mut IndexedConfiguration<D>
    where
        D: 'static,
    {
        self.entry(name)
    }

    /// Register a complete configuration, replacing any previous one with the
    /// same name and type.
    pub fn insert<S, T>(&mut self, name: impl Into<String>, config: Configuration<S, T>) -> &mut Self
    where
        S: 'static,
        T: ?Sized + 'static,
        Configuration<S, T>: Send + Sync,
    {
        let key = (name.into(), TypeId::of::<Configuration<S, T>>());
        self.configs.insert(key, Box::new(config));
        self
    }

    /// Configuration registered under `name`, if any.
    pub fn get<S, T>(&self, name: &str) -> Option<&Configuration<S, T>>
    where
        S: 'static,
        T: ?Sized + 'static,
    {
        let key = (name.to_owned(), TypeId::of::<Configuration<S, T>>());
        self.configs.get(&key)?.downcast_ref()
    }

    pub fn get_states<S, D>(&self, name: &str) -> Option<&StateConfiguration<S, D>>
    where
        S: State + 'static,
        D: 'static,
    {
        self.get::<S, dyn Step<S, D>>(name)
    }

    pub fn get_indexed<D>(&self, name: &str) -> Option<&IndexedConfiguration<D>>
    where
        D: 'static,
    {
        self.get::<usize, dyn DataStep<D>>(name)
    }

    /// Names with at least one registered configuration.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self.configs.keys().map(|(name, _)| name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    fn entry<S, T>(&mut self, name: &str) -> &mut Configuration<S, T>
    where
        S: 'static,
        T: ?Sized + 'static,
        Configuration<S, T>: Send + Sync,
    {
        let key = (name.to_owned(), TypeId::of::<Configuration<S, T>>());
        let slot = self
            .configs
            .entry(key)
            .or_insert_with(|| Box::new(Configuration::<S, T>::new()));
        match slot.downcast_mut() {
            Some(config) => config,
            // Keys carry the TypeId of the stored value.
            None => unreachable!("configuration stored under a foreign type id"),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names().collect::<Vec<_>>())
            .field("configurations", &self.configs.len())
            .finish()
    }
}
