//! Typed Resource Manager IDs.
//!
//! Every ARM ID alternates fixed segments (`subscriptions`, `resourceGroups`,
//! `providers/Microsoft.Kusto/clusters`) with user-specified values. The
//! [`resource_id!`] macro declares an ID as a list of `"fixed/prefix" => field`
//! pairs and generates the struct, its constructor, parsers and formatter.

use std::fmt;

use thiserror::Error;

/// Errors produced while parsing a resource ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    /// The input was empty.
    #[error("ID was empty")]
    Empty,

    /// The input did not start with `/`.
    #[error("ID {0:?} must start with '/'")]
    NotAbsolute(String),

    /// A fixed segment did not match.
    #[error("parsing {kind} ID {input:?}: expected segment {expected:?} at position {position} but got {found:?}")]
    UnexpectedSegment {
        /// The kind of ID being parsed.
        kind: &'static str,
        /// The full input.
        input: String,
        /// The fixed segment that was expected.
        expected: &'static str,
        /// What was found instead (empty when the input ended).
        found: String,
        /// Zero-based segment position.
        position: usize,
    },

    /// A user-specified segment was missing or empty.
    #[error("parsing {kind} ID {input:?}: segment {field:?} was missing or empty")]
    MissingValue {
        /// The kind of ID being parsed.
        kind: &'static str,
        /// The full input.
        input: String,
        /// The name of the missing value.
        field: &'static str,
    },

    /// The input had segments beyond the end of the ID.
    #[error("parsing {kind} ID {input:?}: unexpected trailing segments {trailing:?}")]
    TrailingSegments {
        /// The kind of ID being parsed.
        kind: &'static str,
        /// The full input.
        input: String,
        /// The segments left over.
        trailing: String,
    },
}

/// Behaviour shared by every typed resource ID.
pub trait ResourceId: fmt::Display + Send + Sync {
    /// A human-readable name for this kind of ID.
    const KIND: &'static str;

    /// The canonical ID path.
    fn id(&self) -> String;
}

/// Split `input` against a segment layout, returning the user values in order.
pub(crate) fn parse_segments(
    kind: &'static str,
    input: &str,
    layout: &[(&'static str, &'static str)],
    insensitive: bool,
) -> Result<Vec<String>, IdParseError> {
    if input.is_empty() {
        return Err(IdParseError::Empty);
    }
    let Some(rest) = input.strip_prefix('/') else {
        return Err(IdParseError::NotAbsolute(input.to_string()));
    };

    let components: Vec<&str> = rest.split('/').collect();
    let mut position = 0;
    let mut values = Vec::with_capacity(layout.len());

    for (prefix, field) in layout {
        for expected in prefix.split('/') {
            let found = components.get(position).copied().unwrap_or_default();
            let matches = if insensitive {
                found.eq_ignore_ascii_case(expected)
            } else {
                found == expected
            };
            if !matches {
                return Err(IdParseError::UnexpectedSegment {
                    kind,
                    input: input.to_string(),
                    expected,
                    found: found.to_string(),
                    position,
                });
            }
            position += 1;
        }

        match components.get(position) {
            Some(value) if !value.is_empty() => values.push((*value).to_string()),
            _ => {
                return Err(IdParseError::MissingValue {
                    kind,
                    input: input.to_string(),
                    field,
                })
            },
        }
        position += 1;
    }

    if position < components.len() {
        return Err(IdParseError::TrailingSegments {
            kind,
            input: input.to_string(),
            trailing: components[position..].join("/"),
        });
    }

    Ok(values)
}

/// Declare a typed resource ID.
macro_rules! resource_id {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident ($kind:literal) {
            $( $prefix:literal => $field:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            $( #[allow(missing_docs)] pub $field: String, )+
        }

        impl $name {
            const SEGMENTS: &'static [(&'static str, &'static str)] =
                &[$( ($prefix, stringify!($field)) ),+];

            /// Build the ID from its components.
            pub fn new($( $field: impl Into<String> ),+) -> Self {
                Self { $( $field: $field.into(), )+ }
            }

            /// Parse an ID, requiring fixed segments to match exactly.
            pub fn parse(input: &str) -> Result<Self, $crate::api::IdParseError> {
                Self::parse_with(input, false)
            }

            /// Parse an ID, matching fixed segments case-insensitively.
            pub fn parse_insensitively(input: &str) -> Result<Self, $crate::api::IdParseError> {
                Self::parse_with(input, true)
            }

            /// Check that `input` is a well-formed ID of this kind.
            pub fn validate(input: &str) -> Result<(), $crate::api::IdParseError> {
                Self::parse(input).map(|_| ())
            }

            fn parse_with(
                input: &str,
                insensitive: bool,
            ) -> Result<Self, $crate::api::IdParseError> {
                let values = $crate::api::resource_ids::parse_segments(
                    $kind,
                    input,
                    Self::SEGMENTS,
                    insensitive,
                )?;
                let mut values = values.into_iter();
                Ok(Self { $( $field: values.next().unwrap_or_default(), )+ })
            }
        }

        impl $crate::api::ResourceId for $name {
            const KIND: &'static str = $kind;

            fn id(&self) -> String {
                let mut out = String::new();
                $(
                    out.push('/');
                    out.push_str($prefix);
                    out.push('/');
                    out.push_str(&self.$field);
                )+
                out
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(
                    f,
                    "{} {:?}",
                    <Self as $crate::api::ResourceId>::KIND,
                    $crate::api::ResourceId::id(self)
                )
            }
        }
    };
}

pub(crate) use resource_id;

resource_id! {
    /// A subscription-scoped resource group.
    pub struct ResourceGroupId("Resource Group") {
        "subscriptions" => subscription_id,
        "resourceGroups" => resource_group_name,
    }
}

resource_id! {
    /// A custom location, the extended location Arc-enabled resources deploy into.
    pub struct CustomLocationId("Custom Location") {
        "subscriptions" => subscription_id,
        "resourceGroups" => resource_group_name,
        "providers/Microsoft.ExtendedLocation/customLocations" => custom_location_name,
    }
}
