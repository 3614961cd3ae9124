//! Named step lists registered ahead of machine creation.

use crate::core::{DataStep, State, Step};
use crate::factory::container::Container;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

type ResolveFn<T> = Arc<dyn Fn(&dyn Container) -> Option<Arc<T>> + Send + Sync>;

enum Source<T: ?Sized> {
    Instance(Arc<T>),
    Type(ResolveFn<T>),
}

/// Reference to a step: either a ready instance or a type resolved through a
/// [`Container`] each time a machine is created.
///
/// `T` is the step trait object, `dyn Step<S, D>` or `dyn DataStep<D>`.
pub struct StepDescriptor<T: ?Sized> {
    type_name: &'static str,
    source: Source<T>,
}

impl<T: ?Sized> StepDescriptor<T> {
    /// Name of the referenced step type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.source, Source::Instance(_))
    }

    /// Instance references resolve to themselves; type references ask the
    /// container.
    pub fn resolve(&self, container: &dyn Container) -> Option<Arc<T>> {
        match &self.source {
            Source::Instance(step) => Some(Arc::clone(step)),
            Source::Type(resolve) => resolve(container),
        }
    }
}

impl<T: ?Sized> Clone for StepDescriptor<T> {
    fn clone(&self) -> Self {
        let source = match &self.source {
            Source::Instance(step) => Source::Instance(Arc::clone(step)),
            Source::Type(resolve) => Source::Type(Arc::clone(resolve)),
        };
        Self {
            type_name: self.type_name,
            source,
        }
    }
}

impl<T: ?Sized> fmt::Debug for StepDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_instance() { "instance" } else { "type" };
        f.debug_struct("StepDescriptor")
            .field("type_name", &self.type_name)
            .field("kind", &kind)
            .finish()
    }
}

impl<S, D> StepDescriptor<dyn Step<S, D>>
where
    S: 'static,
    D: 'static,
{
    /// Reference a step type to be resolved through the container.
    pub fn of<I>() -> Self
    where
        I: Step<S, D> + 'static,
    {
        let resolve = |container: &dyn Container| {
            container
                .resolve::<I>()
                .map(|step| step as Arc<dyn Step<S, D>>)
        };
        Self {
            type_name: type_name::<I>(),
            source: Source::Type(Arc::new(resolve)),
        }
    }

    /// Reference a ready step instance.
    pub fn instance<I>(step: I) -> Self
    where
        I: Step<S, D> + 'static,
    {
        Self {
            type_name: type_name::<I>(),
            source: Source::Instance(Arc::new(step)),
        }
    }
}

impl<D> StepDescriptor<dyn DataStep<D>>
where
    D: 'static,
{
    /// Reference a data step type to be resolved through the container.
    pub fn of<I>() -> Self
    where
        I: DataStep<D> + 'static,
    {
        let resolve = |container: &dyn Container| {
            container
                .resolve::<I>()
                .map(|step| step as Arc<dyn DataStep<D>>)
        };
        Self {
            type_name: type_name::<I>(),
            source: Source::Type(Arc::new(resolve)),
        }
    }

    /// Reference a ready data step instance.
    pub fn instance<I>(step: I) -> Self
    where
        I: DataStep<D> + 'static,
    {
        Self {
            type_name: type_name::<I>(),
            source: Source::Instance(Arc::new(step)),
        }
    }
}

/// Ordered step references plus an optional end state.
///
/// Configurations are only validated when a machine is requested from the
/// [`Factory`](crate::factory::Factory), so they can be filled in several
/// passes.
pub struct Configuration<S, T: ?Sized> {
    steps: Vec<StepDescriptor<T>>,
    end_state: Option<S>,
}

/// Configuration of steps with explicit states.
pub type StateConfiguration<S, D> = Configuration<S, dyn Step<S, D>>;

/// Configuration of data steps numbered by position.
pub type IndexedConfiguration<D> = Configuration<usize, dyn DataStep<D>>;

impl<S, T: ?Sized> Configuration<S, T> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            end_state: None,
        }
    }

    pub fn add(&mut self, descriptor: StepDescriptor<T>) -> &mut Self {
        self.steps.push(descriptor);
        self
    }

    /// Set the end state. A later call replaces an earlier one.
    pub fn set_end_state(&mut self, state: S) -> &mut Self {
        self.end_state = Some(state);
        self
    }

    pub fn steps(&self) -> &[StepDescriptor<T>] {
        &self.steps
    }

    pub fn end_state(&self) -> Option<&S> {
        self.end_state.as_ref()
    }
}

impl<S, D> Configuration<S, dyn Step<S, D>>
where
    S: State + 'static,
    D: 'static,
{
    /// Add a step type resolved through the container.
    pub fn add_step<I>(&mut self) -> &mut Self
    where
        I: Step<S, D> + 'static,
    {
        self.add(StepDescriptor::<dyn Step<S, D>>::of::<I>())
    }

    /// Add a ready step instance.
    pub fn add_instance<I>(&mut self, step: I) -> &mut Self
    where
        I: Step<S, D> + 'static,
    {
        self.add(StepDescriptor::<dyn Step<S, D>>::instance(step))
    }
}

impl<D> Configuration<usize, dyn DataStep<D>>
where
    D: 'static,
{
    /// Add a data step type resolved through the container.
    pub fn add_step<I>(&mut self) -> &mut Self
    where
        I: DataStep<D> + 'static,
    {
        self.add(StepDescriptor::<dyn DataStep<D>>::of::<I>())
    }

    /// Add a ready data step instance.
    pub fn add_instance<I>(&mut self, step: I) -> &mut Self
    where
        I: DataStep<D> + 'static,
    {
        self.add(StepDescriptor::<dyn DataStep<D>>::instance(step))
    }
}

impl<S, T: ?Sized> Default for Configuration<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone, T: ?Sized> Clone for Configuration<S, T> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            end_state: self.end_state.clone(),
        }
    }
}

impl<S: fmt::Debug, T: ?Sized> fmt::Debug for Configuration<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("steps", &self.steps)
            .field("end_state", &self.end_state)
            .finish()
    }
}
