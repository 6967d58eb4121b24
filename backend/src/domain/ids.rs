//! Record identifiers.
//!
//! Every stored record is keyed by a server-assigned UUID v4. Each record type
//! gets its own newtype so an application id can never be handed to the
//! donation repository by accident.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a path segment or payload value is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} id must be a valid UUID")]
pub struct RecordIdError {
    kind: &'static str,
}

macro_rules! define_record_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[rustfmt::skip]
            pub fn as_uuid(&self) -> &Uuid { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = RecordIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim() != s {
                    return Err(RecordIdError { kind: $kind });
                }
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| RecordIdError { kind: $kind })
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

define_record_id!(
    /// Identifier of a submitted application.
    ApplicationId,
    "application"
);
define_record_id!(
    /// Identifier of a fundraising campaign.
    CampaignId,
    "campaign"
);
define_record_id!(
    /// Identifier of a donation.
    DonationId,
    "donation"
);
define_record_id!(
    /// Identifier of a donor.
    DonorId,
    "donor"
);
define_record_id!(
    /// Identifier of an event.
    EventId,
    "event"
);
define_record_id!(
    /// Identifier of a news post.
    NewsPostId,
    "news post"
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", true)]
    #[case("", false)]
    #[case("not-a-uuid", false)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", false)]
    fn application_id_parsing(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(input.parse::<ApplicationId>().is_ok(), ok);
    }

    #[rstest]
    fn error_names_the_record_kind() {
        let err = "nope".parse::<NewsPostId>().expect_err("invalid id");
        assert_eq!(err.to_string(), "news post id must be a valid UUID");
    }

    #[rstest]
    fn serialises_as_bare_string() {
        let id = DonorId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
