//! Newtype domain identifiers.
//!
//! Every entity the API returns carries an integer primary key. Each one is
//! wrapped in a distinct newtype so a [`StageId`] can never be passed where a
//! [`PipelineId`] is expected, even though both are `u64` on the wire.
//!
//! String-backed newtypes ([`ApiToken`], [`PipelineName`]) reject the empty
//! string at construction time.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(). Deserialisation
// goes through new(), so an empty string is rejected on the wire too.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value, returning `None` if it is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| format!("{} must not be empty", stringify!($name)))
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (server-assigned primary keys).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: server-assigned integers
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a pipeline, the root of the board hierarchy.
    PipelineId
}

u64_id! {
    /// Identifies a stage. Only unique together with its owning [`PipelineId`].
    StageId
}

u64_id! {
    /// Identifies a negotiation (a card on the board).
    NegotiationId
}

// ---------------------------------------------------------------------------
// String-backed values
// ---------------------------------------------------------------------------

string_id! {
    /// Opaque bearer token issued by the login handshake.
    ///
    /// Sent verbatim in the `X-API-Key` header. Has no `Display` impl; use
    /// `as_str()` to put it on the wire.
    ApiToken
}

string_id! {
    /// Name for a pipeline about to be created. Never empty.
    PipelineName
}

impl std::fmt::Display for PipelineName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
