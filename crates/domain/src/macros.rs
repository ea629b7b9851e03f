//! Macro for implementing Display and FromStr for small string-keyed enums
//!
//! Storage areas and meeting platforms travel through JSON messages and log
//! fields as lowercase strings. The macro keeps both directions of that
//! mapping in one place.
//!
//! # Example
//!
//! ```rust
//! use autojoin_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Area {
//!     Sync,
//!     Local,
//! }
//!
//! impl_domain_status_conversions!(Area {
//!     Sync => "sync",
//!     Local => "local",
//! });
//!
//! assert_eq!(Area::Sync.to_string(), "sync");
//! assert_eq!("LOCAL".parse::<Area>().unwrap(), Area::Local);
//! ```

/// Implements Display and FromStr traits for string-keyed enums
///
/// - Display writes the mapped lowercase string
/// - FromStr parses case-insensitively and names the enum in its error
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
