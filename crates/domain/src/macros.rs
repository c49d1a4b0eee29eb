//! Macro for implementing Display and FromStr for name-like enums
//!
//! Several domain enums (timing state, observable property names) need a
//! stable textual name for logs, the driver and serialized events. The macro
//! provides both directions from one mapping.
//!
//! # Example
//!
//! ```rust
//! use idletally_domain::impl_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Lamp {
//!     On,
//!     Off,
//! }
//!
//! impl_name_conversions!(Lamp {
//!     On => "On",
//!     Off => "Off",
//! });
//!
//! assert_eq!(Lamp::On.to_string(), "On");
//! assert_eq!("off".parse::<Lamp>().unwrap(), Lamp::Off);
//! ```

/// Implements Display and FromStr for an enum from a variant-to-name table
///
/// - Display writes the name exactly as given
/// - FromStr matches names ASCII case-insensitively
#[macro_export]
macro_rules! impl_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable textual name of the variant
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
