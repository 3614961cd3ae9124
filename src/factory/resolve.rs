//! Machine creation from named configurations.

use crate::builder::{IndexedBuilder, MachineBuilder};
use crate::core::{DataStep, State, Step};
use crate::engine::Machine;
use crate::factory::configuration::{Configuration, StepDescriptor};
use crate::factory::container::Container;
use crate::factory::error::FactoryError;
use crate::factory::registry::Registry;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, warn};

/// Creates machines from the configurations held in a [`Registry`].
///
/// Type references are resolved through the container every time a machine is
/// created, so transient registrations yield fresh step instances per machine.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use stepline::core::data_fn;
/// use stepline::factory::{Factory, Registry, TypeMap, DEFAULT_NAME};
///
/// let mut registry = Registry::new();
/// registry
///     .indexed::<u32>(DEFAULT_NAME)
///     .add_instance(data_fn(|n: &mut u32| { *n += 1; true }));
///
/// let factory = Factory::new(Arc::new(registry), TypeMap::new());
/// let mut total = 0u32;
/// let machine = factory.create_indexed(DEFAULT_NAME, &mut total).unwrap();
/// assert_eq!(*machine.state(), 0);
/// ```
pub struct Factory<C> {
    registry: Arc<Registry>,
    container: C,
}

impl<C: Container> Factory<C> {
    pub fn new(registry: Arc<Registry>, container: C) -> Self {
        Self {
            registry,
            container,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Create a machine from the explicit-state configuration `name`,
    /// positioned at `state`.
    pub fn create<'d, S, D>(
        &self,
        name: &str,
        state: S,
        data: &'d mut D,
    ) -> Result<Machine<'d, S, D>, FactoryError>
    where
        S: State + 'static,
        D: Send + 'static,
    {
        let (steps, end_state) = self.load::<S, dyn Step<S, D>>(name)?;

        let mut builder = MachineBuilder::new().add_steps(steps);
        if let Some(end) = end_state {
            builder = builder.set_end_state(end);
        }
        Ok(builder.build(state, data)?)
    }

    /// Create a machine from the implicit-integer configuration `name`,
    /// positioned at the first step.
    pub fn create_indexed<'d, D>(
        &self,
        name: &str,
        data: &'d mut D,
    ) -> Result<Machine<'d, usize, D>, FactoryError>
    where
        D: Send + 'static,
    {
        self.create_indexed_at(name, 0, data)
    }

    /// Create a machine from the implicit-integer configuration `name`,
    /// positioned at `state`.
    pub fn create_indexed_at<'d, D>(
        &self,
        name: &str,
        state: usize,
        data: &'d mut D,
    ) -> Result<Machine<'d, usize, D>, FactoryError>
    where
        D: Send + 'static,
    {
        let (steps, end_state) = self.load::<usize, dyn DataStep<D>>(name)?;

        let mut builder = IndexedBuilder::new().add_steps(steps);
        if let Some(end) = end_state {
            builder = builder.set_end_state(end);
        }
        Ok(builder.build_at(state, data)?)
    }

    /// Resolve the configuration `name` into concrete steps, keeping their
    /// registration order.
    fn load<S, T>(&self, name: &str) -> Result<(Vec<Arc<T>>, Option<S>), FactoryError>
    where
        S: Clone + 'static,
        T: ?Sized + 'static,
    {
        let Some(config) = self.registry.get::<S, T>(name) else {
            warn!(config = name, "no configuration registered");
            return Ok((Vec::new(), None));
        };

        let steps = resolve_all(config, &self.container)?;
        debug!(config = name, steps = steps.len(), "resolved configuration");
        Ok((steps, config.end_state().cloned()))
    }
}

/// Resolve every descriptor, collecting all unresolved types.
fn resolve_all<S, T>(
    config: &Configuration<S, T>,
    container: &dyn Container,
) -> Result<Vec<Arc<T>>, FactoryError>
where
    T: ?Sized,
{
    let resolved: Vec<Validation<Arc<T>, NonEmptyVec<&'static str>>> = config
        .steps()
        .iter()
        .map(|descriptor| resolve_one(descriptor, container))
        .collect();

    match Validation::all_vec(resolved) {
        Validation::Success(steps) => Ok(steps),
        Validation::Failure(errors) => {
            let types: Vec<&'static str> = errors.iter().copied().collect();
            warn!(?types, "container could not resolve step types");
            Err(FactoryError::UnresolvedSteps { types })
        }
    }
}

fn resolve_one<T: ?Sized>(
    descriptor: &StepDescriptor<T>,
    container: &dyn Container,
) -> Validation<Arc<T>, NonEmptyVec<&'static str>> {
    match descriptor.resolve(container) {
        Some(step) => Validation::success(step),
        None => Validation::fail(descriptor.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_fn;
    use crate::factory::configuration::IndexedConfiguration;
    use crate::factory::container::TypeMap;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    struct Ticket(usize);

    #[async_trait]
    impl DataStep<Vec<usize>> for Ticket {
        async fn execute(&self, data: &mut Vec<usize>, _cancel: &CancellationToken) -> bool {
            data.push(self.0);
            true
        }
    }

    struct Absent;

    #[async_trait]
    impl DataStep<Vec<usize>> for Absent {
        async fn execute(&self, _data: &mut Vec<usize>, _cancel: &CancellationToken) -> bool {
            true
        }
    }

    struct Other;

    #[async_trait]
    impl DataStep<Vec<usize>> for Other {
        async fn execute(&self, _data: &mut Vec<usize>, _cancel: &CancellationToken) -> bool {
            true
        }
    }

    fn tickets() -> (TypeMap, Arc<AtomicUsize>) {
        let issued = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&issued);
        let mut container = TypeMap::new();
        container.insert_with(move || Ticket(counter.fetch_add(1, Ordering::SeqCst)));
        (container, issued)
    }

    #[test]
    fn empty_configuration_resolves_to_no_steps() {
        let config = IndexedConfiguration::<Vec<usize>>::new();
        let (container, issued) = tickets();

        let steps = resolve_all(&config, &container).unwrap();

        assert!(steps.is_empty());
        assert_eq!(issued.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn resolved_steps_keep_registration_order() {
        let mut config = IndexedConfiguration::<Vec<usize>>::new();
        config
            .add_step::<Ticket>()
            .add_instance(Ticket(100))
            .add_step::<Ticket>();
        let (container, _) = tickets();

        let steps = resolve_all(&config, &container).unwrap();
        let mut log = Vec::new();
        let cancel = CancellationToken::new();
        for step in &steps {
            step.execute(&mut log, &cancel).await;
        }

        assert_eq!(log, vec![0, 100, 1]);
    }

    #[test]
    fn transient_registrations_resolve_fresh_each_time() {
        let mut config = IndexedConfiguration::<Vec<usize>>::new();
        config.add_step::<Ticket>();
        let (container, issued) = tickets();

        resolve_all(&config, &container).unwrap();
        resolve_all(&config, &container).unwrap();

        assert_eq!(issued.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failures_are_collected_in_registration_order() {
        let mut config = IndexedConfiguration::<Vec<usize>>::new();
        config
            .add_step::<Other>()
            .add_step::<Ticket>()
            .add_instance(data_fn(|_: &mut Vec<usize>| true))
            .add_step::<Absent>();
        let (container, _) = tickets();

        match resolve_all(&config, &container) {
            Err(FactoryError::UnresolvedSteps { types }) => {
                assert_eq!(types.len(), 2);
                assert!(types[0].ends_with("Other"));
                assert!(types[1].ends_with("Absent"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected UnresolvedSteps"),
        }
    }

    #[test]
    fn single_descriptor_fails_with_its_type_name() {
        let descriptor = StepDescriptor::<dyn DataStep<Vec<usize>>>::of::<Absent>();
        let (container, _) = tickets();

        match resolve_one(&descriptor, &container) {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.iter().all(|name| name.ends_with("Absent")));
            }
            Validation::Success(_) => panic!("expected a failure"),
        }
    }
}
