//! Macros for declaring state enums.

/// Declare a unit-only enum and implement [`State`](crate::core::State) for it.
///
/// The generated `name()` returns the variant name without allocating. The
/// derives expand to `serde` paths, so the calling crate depends on `serde`.
///
/// # Example
///
/// ```
/// use stepline::state_enum;
/// use stepline::core::State;
///
/// state_enum! {
///     pub enum Deploy {
///         Build,
///         Upload,
///         Done,
///     }
/// }
///
/// assert_eq!(Deploy::Upload.name(), "Upload");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                match self {
                    $(Self::$variant => ::std::borrow::Cow::Borrowed(stringify!($variant))),*
                }
            }
        }
    };
}
