//! Open enumerations for API string constants.
//!
//! The service adds new values to its enumerations over time. Every enum
//! declared through [`open_enum!`] parses case-insensitively and keeps any
//! value it does not recognise in an `Other` variant instead of failing, so a
//! response carrying a newer value still decodes.
//!
//! ```
//! use azurerm_provider::api::aadb2c::SkuName;
//!
//! assert_eq!(SkuName::parse("premiump1"), SkuName::PremiumP1);
//! assert_eq!(SkuName::parse("PremiumP9").as_str(), "PremiumP9");
//! ```

/// Declare an open string enumeration.
///
/// Generates the enum (with an extra `Other(String)` variant), the
/// `possible_values`, `parse`, `as_str` and `is_known` helpers, and the
/// `Display`, `FromStr`, `From<&str>`, `Serialize` and `Deserialize` impls.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value not known when this client was written.
            Other(String),
        }

        impl $name {
            /// Every value known to this client, in declaration order.
            pub const fn possible_values() -> &'static [&'static str] {
                &[$( $value ),+]
            }

            /// Parse a value case-insensitively, passing unknown values through.
            pub fn parse(input: &str) -> Self {
                $(
                    if input.eq_ignore_ascii_case($value) {
                        return Self::$variant;
                    }
                )+
                Self::Other(input.to_string())
            }

            /// The wire representation of this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Other(value) => value.as_str(),
                }
            }

            /// Whether this value is one of the known constants.
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::parse(s))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::parse(value)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Ok(Self::parse(&raw))
            }
        }
    };
}

pub(crate) use open_enum;

open_enum! {
    /// Status reported by an asynchronous operation status endpoint.
    pub enum OperationStatus {
        Succeeded => "Succeeded",
        Failed => "Failed",
        Canceled => "Canceled",
        Cancelled => "Cancelled",
        InProgress => "InProgress",
    }
}

impl OperationStatus {
    /// Whether polling can stop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Canceled | Self::Cancelled
        )
    }

    /// Whether the operation ended without succeeding.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Canceled | Self::Cancelled)
    }
}
