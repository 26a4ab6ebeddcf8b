//! Raw change facts — the comparator's ground-truth output.
//!
//! Each `Incompatibility` is one primitive reason a member's v2 shape is
//! not binary-compatible with its v1 shape. Multiple facts may share a
//! subject; `(subject, kind)` is unique within a `ChangeSet`.

use std::fmt;

use serde::Serialize;

use crate::member::MemberId;

/// Primitive incompatibility reasons.
///
/// The structural kinds are emitted by the external comparator; the two
/// `Missing*Marker` kinds are produced by the evolution-metadata policy
/// rule and carry their full clause in the fact text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ReasonKind {
    ReturnTypeChanged,
    MethodRemoved,
    MethodAddedToPublicClass,
    AbstractMethodAddedToClass,
    MethodNowAbstract,
    MethodNoLongerStatic,
    FieldRemoved,
    MissingExperimentalMarker,
    MissingVersionMarker,
}

impl ReasonKind {
    /// Canonical human phrase for this reason.
    pub fn phrase(&self) -> &'static str {
        match self {
            ReasonKind::ReturnTypeChanged => "Method return type has changed",
            ReasonKind::MethodRemoved => "Method has been removed",
            ReasonKind::MethodAddedToPublicClass => "Method added to public class",
            ReasonKind::AbstractMethodAddedToClass => {
                "Abstract method has been added to this class"
            }
            ReasonKind::MethodNowAbstract => "Method is now abstract",
            ReasonKind::MethodNoLongerStatic => "Method is no longer static",
            ReasonKind::FieldRemoved => "Field has been removed",
            ReasonKind::MissingExperimentalMarker => "Is not annotated with @Incubating",
            ReasonKind::MissingVersionMarker => "Is not annotated with @since",
        }
    }

    /// Whether this reason is an evolution-metadata diagnostic rather than
    /// a structural binary incompatibility.
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            ReasonKind::MissingExperimentalMarker | ReasonKind::MissingVersionMarker
        )
    }
}

impl fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phrase())
    }
}

/// One primitive incompatibility: subject, reason kind, human text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incompatibility {
    pub subject: MemberId,
    pub kind: ReasonKind,
    pub text: String,
}

/// Ordered collection of raw change facts for one comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    facts: Vec<Incompatibility>,
}

impl ChangeSet {
    pub fn new() -> Self {
        ChangeSet { facts: Vec::new() }
    }

    /// Add a fact with the kind's canonical phrase as its text.
    pub fn push(&mut self, subject: MemberId, kind: ReasonKind) {
        self.push_with_text(subject, kind, kind.phrase().to_string());
    }

    /// Add a fact with explicit text (metadata facts carry their full clause).
    pub fn push_with_text(&mut self, subject: MemberId, kind: ReasonKind, text: String) {
        self.facts.push(Incompatibility {
            subject,
            kind,
            text,
        });
    }

    pub fn facts(&self) -> &[Incompatibility] {
        &self.facts
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Reasons recorded for one subject, in comparator order.
    pub fn reasons_for(&self, subject: &MemberId) -> Vec<ReasonKind> {
        self.facts
            .iter()
            .filter(|f| &f.subject == subject)
            .map(|f| f.kind)
            .collect()
    }
}
