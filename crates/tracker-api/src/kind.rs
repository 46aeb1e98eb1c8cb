// Entity kinds
//
// The backend keys every route and every response envelope on the entity
// kind. Representing the kind as a closed enum keeps URL construction and
// envelope unwrapping in one place and checked at compile time, instead of
// threading free-form strings through the call sites.

use std::fmt;
use std::str::FromStr;

/// The four entity kinds served by the Data Tracker backend.
///
/// Each kind owns its URL path segment and the response keys used to
/// unwrap single-entity and list payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Dataset,
    Order,
    Collection,
    User,
}

impl Kind {
    /// All kinds, in display order.
    pub const ALL: [Self; 4] = [Self::Dataset, Self::Order, Self::Collection, Self::User];

    /// The URL path segment: `/api/v1/{segment}/...`
    pub fn segment(self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Order => "order",
            Self::Collection => "collection",
            Self::User => "user",
        }
    }

    /// Response key for a single entity: `{"dataset": {...}}`
    pub fn singular_key(self) -> &'static str {
        self.segment()
    }

    /// Response key for a list: `{"datasets": [...]}`
    pub fn plural_key(self) -> &'static str {
        match self {
            Self::Dataset => "datasets",
            Self::Order => "orders",
            Self::Collection => "collections",
            Self::User => "users",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Error for parsing an unknown kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for Kind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dataset" => Ok(Self::Dataset),
            "order" => Ok(Self::Order),
            "collection" => Ok(Self::Collection),
            "user" => Ok(Self::User),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn segment_and_keys_pair_up() {
        for kind in Kind::ALL {
            assert_eq!(kind.plural_key(), format!("{}s", kind.segment()));
            assert_eq!(kind.singular_key(), kind.segment());
        }
    }

    #[test]
    fn parses_from_segment() {
        for kind in Kind::ALL {
            let parsed: Kind = kind.segment().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        assert!("gadget".parse::<Kind>().is_err());
    }
}
