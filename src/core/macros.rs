//! Macros for declaring lifecycle state enumerations.

/// Declare a status enum and implement [`State`](crate::core::State) for it.
///
/// Each variant is paired with its wire name. The macro derives the usual
/// value traits, maps serde to the wire names and adds `Display` and
/// `FromStr` implementations that go through [`State::parse`].
///
/// [`State::parse`]: crate::core::State::parse
///
/// # Example
///
/// ```
/// use fleet_lifecycle::core::State;
/// use fleet_lifecycle::state_enum;
///
/// state_enum! {
///     pub enum LampStatus as "LampStatus" {
///         On => "ON",
///         Off => "OFF",
///         Broken => "BROKEN",
///     }
/// }
///
/// assert_eq!(LampStatus::Broken.name(), "BROKEN");
/// assert_eq!("OFF".parse::<LampStatus>().unwrap(), LampStatus::Off);
/// assert_eq!(LampStatus::all().len(), 3);
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $machine:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Debug,
            serde::Serialize,
            serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            const MACHINE: &'static str = $machine;

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),*
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),*]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::core::State::name(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::core::UnknownState;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::core::State>::parse(value)
            }
        }
    };
}
