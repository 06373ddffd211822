//! Surrogate identifiers for store-assigned entities.

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Raw store identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_entity_id!(
    /// Identifier of a [`Group`](super::Group).
    GroupId
);
define_entity_id!(
    /// Identifier of an [`Idea`](super::Idea).
    IdeaId
);
define_entity_id!(
    /// Identifier of a [`Vote`](super::Vote).
    VoteId
);
define_entity_id!(
    /// Identifier of a [`Project`](super::Project).
    ProjectId
);
define_entity_id!(
    /// Identifier of a [`MembershipRequest`](super::MembershipRequest).
    MembershipRequestId
);
