//! # Addressing Mode
//!
//! Classifies a request by what it addresses, using only which of the `id`,
//! `relation` and `related` path parameters are present:
//!
//! | `id` | `relation` | `related` | mode         |
//! |------|------------|-----------|--------------|
//! | no   | any        | any       | `Collection` |
//! | yes  | no         | no        | `Single`     |
//! | yes  | yes        | any       | `Relation`   |
//! | yes  | no         | yes       | `Related`    |
//!
//! Rows are checked top to bottom and the first match wins. The table covers
//! every combination today; a presence pattern that matches no row is answered
//! with 400 rather than guessed at.

use crate::error::StatusError;
use crate::request::PathParams;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Collection,
    Single,
    Relation,
    Related,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Collection => "collection",
            Mode::Single => "single",
            Mode::Relation => "relation",
            Mode::Related => "related",
        };
        f.write_str(label)
    }
}

/// Which addressing parameters a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub id: bool,
    pub relation: bool,
    pub related: bool,
}

impl Presence {
    pub fn of(params: &PathParams) -> Self {
        Self {
            id: params.id.is_some(),
            relation: params.relation.is_some(),
            related: params.related.is_some(),
        }
    }
}

/// `Some(b)` requires the parameter's presence to equal `b`; `None` accepts either.
#[derive(Debug, Clone, Copy)]
pub struct ModeRule {
    pub id: Option<bool>,
    pub relation: Option<bool>,
    pub related: Option<bool>,
    pub mode: Mode,
}

impl ModeRule {
    fn matches(&self, presence: Presence) -> bool {
        let check = |want: Option<bool>, have: bool| want.is_none_or(|w| w == have);
        check(self.id, presence.id)
            && check(self.relation, presence.relation)
            && check(self.related, presence.related)
    }
}

pub const MODE_RULES: [ModeRule; 4] = [
    ModeRule {
        id: Some(false),
        relation: None,
        related: None,
        mode: Mode::Collection,
    },
    ModeRule {
        id: Some(true),
        relation: Some(false),
        related: Some(false),
        mode: Mode::Single,
    },
    ModeRule {
        id: Some(true),
        relation: Some(true),
        related: None,
        mode: Mode::Relation,
    },
    ModeRule {
        id: Some(true),
        relation: Some(false),
        related: Some(true),
        mode: Mode::Related,
    },
];

impl Mode {
    /// Classifies the request's path parameters.
    pub fn resolve(params: &PathParams) -> Result<Mode, StatusError> {
        resolve_with(&MODE_RULES, Presence::of(params))
    }
}

/// Runs `presence` through `rules`, first match wins.
pub fn resolve_with(rules: &[ModeRule], presence: Presence) -> Result<Mode, StatusError> {
    rules
        .iter()
        .find(|rule| rule.matches(presence))
        .map(|rule| rule.mode)
        .ok_or_else(|| {
            StatusError::bad_request(format!(
                "Unable to determine mode for request (id: {}, relation: {}, related: {})",
                presence.id, presence.relation, presence.related
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn all_presences() -> Vec<Presence> {
        let mut out = Vec::new();
        for id in [false, true] {
            for relation in [false, true] {
                for related in [false, true] {
                    out.push(Presence {
                        id,
                        relation,
                        related,
                    });
                }
            }
        }
        out
    }

    #[test]
    fn test_every_combination_is_classified() {
        for presence in all_presences() {
            let mode = resolve_with(&MODE_RULES, presence);
            assert!(mode.is_ok(), "unclassified: {:?}", presence);
        }
    }

    #[test]
    fn test_decision_table() {
        assert_eq!(Mode::resolve(&PathParams::collection()).unwrap(), Mode::Collection);
        assert_eq!(Mode::resolve(&PathParams::single("5")).unwrap(), Mode::Single);
        assert_eq!(
            Mode::resolve(&PathParams::relation("5", "book")).unwrap(),
            Mode::Relation
        );
        assert_eq!(
            Mode::resolve(&PathParams::related("5", "book")).unwrap(),
            Mode::Related
        );
    }

    #[test]
    fn test_relation_wins_over_related() {
        let params = PathParams {
            id: Some("5".into()),
            relation: Some("book".into()),
            related: Some("book".into()),
        };
        assert_eq!(Mode::resolve(&params).unwrap(), Mode::Relation);
    }

    #[test]
    fn test_collection_ignores_orphaned_relation_params() {
        let params = PathParams {
            id: None,
            relation: Some("book".into()),
            related: Some("book".into()),
        };
        assert_eq!(Mode::resolve(&params).unwrap(), Mode::Collection);
    }

    #[test]
    fn test_unmatched_presence_is_bad_request() {
        // Drop the relation/related rows to simulate a parameter combination
        // the table does not know about.
        let presence = Presence {
            id: true,
            relation: true,
            related: false,
        };
        let err = resolve_with(&MODE_RULES[..2], presence).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Unable to determine mode"));
    }
}
