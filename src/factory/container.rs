//! Resolution of step types through an external container.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased instance handed out by a container.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Narrow view of a dependency container: produce an instance for a type.
///
/// Only type references in a [`Configuration`](crate::factory::Configuration)
/// go through the container; instance references resolve to themselves.
/// Any container can be plugged in by implementing this trait.
pub trait Container: Send + Sync {
    /// Return an instance whose concrete type has the given `TypeId`, or
    /// `None` when the type is not registered.
    fn resolve_any(&self, type_id: TypeId) -> Option<Instance>;
}

impl dyn Container + '_ {
    /// Typed wrapper over [`Container::resolve_any`].
    pub fn resolve<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve_any(TypeId::of::<T>())?.downcast::<T>().ok()
    }
}

enum Registration {
    Shared(Instance),
    Factory(Box<dyn Fn() -> Instance + Send + Sync>),
}

/// Minimal container keyed by type.
///
/// # Example
///
/// ```rust
/// use stepline::factory::{Container, TypeMap};
///
/// struct Greeting(&'static str);
///
/// let mut map = TypeMap::new();
/// map.insert(Greeting("hello"));
///
/// let container: &dyn Container = &map;
/// assert_eq!(container.resolve::<Greeting>().map(|g| g.0), Some("hello"));
/// ```
#[derive(Default)]
pub struct TypeMap {
    entries: HashMap<TypeId, (&'static str, Registration)>,
}

impl TypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one shared instance, returned by every resolution.
    pub fn insert<T>(&mut self, value: T) -> &mut Self
    where
        T: Any + Send + Sync,
    {
        self.entries.insert(
            TypeId::of::<T>(),
            (type_name::<T>(), Registration::Shared(Arc::new(value))),
        );
        self
    }

    /// Register a constructor, called on every resolution.
    pub fn insert_with<T, F>(&mut self, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory = move || Arc::new(factory()) as Instance;
        self.entries.insert(
            TypeId::of::<T>(),
            (type_name::<T>(), Registration::Factory(Box::new(factory))),
        );
        self
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Container for TypeMap {
    fn resolve_any(&self, type_id: TypeId) -> Option<Instance> {
        match &self.entries.get(&type_id)?.1 {
            Registration::Shared(instance) => Some(Arc::clone(instance)),
            Registration::Factory(factory) => Some(factory()),
        }
    }
}

impl fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.entries.values().map(|(name, _)| name))
            .finish()
    }
}
