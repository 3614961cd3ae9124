//! Core State trait for step identifiers.
//!
//! Every step is bound to a state value. The machine compares states to
//! decide which step is eligible to run next.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Debug;

/// Trait for state identifiers.
///
/// States are small immutable values. They are compared for equality when the
/// machine scans for the next eligible step and serialized when a machine
/// position is captured in a checkpoint.
///
/// # Required Traits
///
/// - `Clone`: the machine keeps its own copy of the current state
/// - `PartialEq`: states are matched against each step's state
/// - `Debug`: used for diagnostics and as the default display name
/// - `Serialize` + `Deserialize`: states are part of checkpoints
///
/// Integer primitives implement `State` out of the box; the implicit integer
/// mode uses `usize`.
///
/// # Example
///
/// ```rust
/// use stepline::core::State;
/// use serde::{Deserialize, Serialize};
/// use std::borrow::Cow;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Stage {
///     Fetch,
///     Verify,
///     Done,
/// }
///
/// impl State for Stage {
///     fn name(&self) -> Cow<'_, str> {
///         match self {
///             Self::Fetch => "Fetch".into(),
///             Self::Verify => "Verify".into(),
///             Self::Done => "Done".into(),
///         }
///     }
/// }
///
/// assert_eq!(Stage::Verify.name(), "Verify");
/// assert_eq!(7usize.name(), "7");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    ///
    /// Defaults to the `Debug` representation.
    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{self:?}"))
    }
}

macro_rules! integer_state {
    ($($ty:ty),* $(,)?) => {
        $(
            impl State for $ty {
                fn name(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_state!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl State for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}
