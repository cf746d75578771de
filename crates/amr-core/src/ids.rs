//! Strongly typed identifier wrappers around UUIDs.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Auction bookkeeping keys its maps
//! by `TaskId`; the STN keys vertices by `OrderId`.

use std::fmt;

use uuid::Uuid;

/// Generate a typed ID wrapper around a `Uuid`.
macro_rules! typed_uuid {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub Uuid);

        impl $name {
            /// A fresh random (v4) identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// The all-zero identifier, used as a placeholder in defaults.
            pub const NIL: $name = $name(Uuid::nil());
        }

        impl Default for $name {
            /// Returns `NIL` so uninitialized IDs are visibly invalid.
            fn default() -> Self {
                Self::NIL
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_uuid! {
    /// Identifies one task of a material flow.
    pub struct TaskId;
}

typed_uuid! {
    /// Identifies one order within a task.
    pub struct OrderId;
}

typed_uuid! {
    /// Identifies one protocol message (CFP, bid, …) for logging.
    pub struct MessageId;
}
