//! Step abstractions executed by the machine.
//!
//! A [`Step`] pairs a state with an async action over the shared data. The
//! action reports whether the machine may move past it. [`DataStep`] is the
//! state-less variant used by the implicit integer mode, where
//! [`IndexedStep`] supplies a sequential index as the state.

use super::state::State;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A unit of work bound to a state.
///
/// `execute` returns `true` when the machine may advance past this step and
/// `false` when it must stay put. Returning `false` is not an error: the next
/// `advance` call runs the same step again, which is how "not ready yet"
/// polling is expressed.
///
/// The cancellation token is forwarded untouched from
/// [`Machine::advance_with`](crate::engine::Machine::advance_with). Steps that
/// do not observe it run to completion.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use stepline::core::Step;
/// use stepline::CancellationToken;
///
/// struct Increment;
///
/// #[async_trait]
/// impl Step<u32, i64> for Increment {
///     fn state(&self) -> u32 {
///         1
///     }
///
///     async fn execute(&self, data: &mut i64, _cancel: &CancellationToken) -> bool {
///         *data += 1;
///         true
///     }
/// }
/// ```
#[async_trait]
pub trait Step<S, D>: Send + Sync {
    /// The state this step is bound to. Read once when the step is added to a
    /// builder.
    fn state(&self) -> S;

    /// Run the step against the shared data.
    async fn execute(&self, data: &mut D, cancel: &CancellationToken) -> bool;
}

/// A step without a state of its own.
///
/// Used with [`IndexedBuilder`](crate::builder::IndexedBuilder), which binds
/// each data step to its position in the sequence.
#[async_trait]
pub trait DataStep<D>: Send + Sync {
    async fn execute(&self, data: &mut D, cancel: &CancellationToken) -> bool;
}

/// Synthetic terminal step. Never allows the machine to advance.
#[derive(Clone, Debug, PartialEq)]
pub struct EndStep<S> {
    state: S,
}

impl<S> EndStep<S> {
    pub fn new(state: S) -> Self {
        Self { state }
    }
}

#[async_trait]
impl<S, D> Step<S, D> for EndStep<S>
where
    S: State,
    D: Send,
{
    fn state(&self) -> S {
        self.state.clone()
    }

    async fn execute(&self, _data: &mut D, _cancel: &CancellationToken) -> bool {
        false
    }
}

/// Adapter giving a [`DataStep`] a sequential integer state.
pub struct IndexedStep<D> {
    inner: Arc<dyn DataStep<D>>,
    index: usize,
}

impl<D> IndexedStep<D> {
    pub fn new(inner: Arc<dyn DataStep<D>>, index: usize) -> Self {
        Self { inner, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<D> fmt::Debug for IndexedStep<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedStep")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<D> Step<usize, D> for IndexedStep<D>
where
    D: Send + 'static,
{
    fn state(&self) -> usize {
        self.index
    }

    async fn execute(&self, data: &mut D, cancel: &CancellationToken) -> bool {
        self.inner.execute(data, cancel).await
    }
}

/// Step backed by a synchronous closure. See [`from_fn`].
pub struct FnStep<S, F> {
    state: S,
    action: F,
}

#[async_trait]
impl<S, D, F> Step<S, D> for FnStep<S, F>
where
    S: State,
    D: Send,
    F: Fn(&mut D) -> bool + Send + Sync,
{
    fn state(&self) -> S {
        self.state.clone()
    }

    async fn execute(&self, data: &mut D, _cancel: &CancellationToken) -> bool {
        (self.action)(data)
    }
}

/// Data step backed by a synchronous closure. See [`data_fn`].
pub struct DataFnStep<F> {
    action: F,
}

#[async_trait]
impl<D, F> DataStep<D> for DataFnStep<F>
where
    D: Send,
    F: Fn(&mut D) -> bool + Send + Sync,
{
    async fn execute(&self, data: &mut D, _cancel: &CancellationToken) -> bool {
        (self.action)(data)
    }
}

/// Build a step from a state and a synchronous action.
///
/// ```rust
/// use stepline::core::from_fn;
///
/// let step = from_fn(3u8, |count: &mut u32| {
///     *count += 1;
///     true
/// });
/// ```
pub fn from_fn<S, D, F>(state: S, action: F) -> FnStep<S, F>
where
    F: Fn(&mut D) -> bool + Send + Sync,
{
    FnStep { state, action }
}

/// Build a data step from a synchronous action.
pub fn data_fn<D, F>(action: F) -> DataFnStep<F>
where
    F: Fn(&mut D) -> bool + Send + Sync,
{
    DataFnStep { action }
}
