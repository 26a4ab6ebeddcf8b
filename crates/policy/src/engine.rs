//! Acceptance-rule pipeline.
//!
//! Rules run in a fixed, declared order over the pool of raw change facts.
//! Each rule sees only facts not yet claimed by an earlier rule, may emit
//! new policy facts, and may claim `(subject, reason)` pairs with a
//! justification. Claimed facts leave the pool; whatever remains unclaimed
//! after the last rule becomes the report's error set. Rules are pure
//! functions of the pool, so a run is deterministic for given inputs.

use std::collections::BTreeSet;

use apigate_model::{ChangeSet, Incompatibility, MemberId, ReasonKind};

/// Unique key of a fact within a run.
pub type FactKey = (MemberId, ReasonKind);

/// Read view over the facts a rule is allowed to see: everything emitted
/// so far minus what earlier rules (or earlier claims of this rule's own
/// outcome) already claimed.
pub struct FactPool<'a> {
    facts: &'a [Incompatibility],
    claimed: &'a BTreeSet<FactKey>,
}

impl<'a> FactPool<'a> {
    /// Unclaimed facts, in comparator order.
    pub fn facts(&self) -> impl Iterator<Item = &'a Incompatibility> + '_ {
        self.facts
            .iter()
            .filter(|f| !self.claimed.contains(&(f.subject.clone(), f.kind)))
    }

    /// Whether a `(subject, kind)` fact is pending (present and unclaimed).
    pub fn contains(&self, subject: &MemberId, kind: ReasonKind) -> bool {
        self.facts
            .iter()
            .any(|f| f.kind == kind && &f.subject == subject)
            && !self.claimed.contains(&(subject.clone(), kind))
    }
}

/// A rule's claim over one subject's reasons, kept grouped so the report
/// can render them as one combined statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub subject: MemberId,
    pub reasons: Vec<ReasonKind>,
    pub justification: String,
}

/// What a rule returns: newly contributed policy facts and/or claims over
/// pending facts. An empty outcome is "no opinion".
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    pub emitted: Vec<Incompatibility>,
    pub claims: Vec<Claim>,
}

/// One acceptance-policy rule.
pub trait PolicyRule {
    /// Policy name used in rendered justifications.
    fn name(&self) -> &'static str;

    /// Evaluate against the pending facts. Must be pure: identical pools
    /// yield identical outcomes.
    fn evaluate(&self, pool: &FactPool<'_>) -> RuleOutcome;
}

/// A claimed incompatibility set plus its policy-backed justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceRecord {
    pub subject: MemberId,
    pub reasons: Vec<ReasonKind>,
    pub justification: String,
}

/// Outcome of a full pipeline run, input to the report assembler.
///
/// `facts` preserves emission order (comparator facts first, then rule
/// contributions); every fact key is either in `claimed` or not, so the
/// errors/accepted partition is total by construction.
#[derive(Debug, Clone)]
pub struct EngineResult {
    pub facts: Vec<Incompatibility>,
    pub claimed: BTreeSet<FactKey>,
    pub accepted: Vec<AcceptanceRecord>,
}

impl EngineResult {
    /// Facts no rule claimed, in emission order.
    pub fn unclaimed(&self) -> impl Iterator<Item = &Incompatibility> + '_ {
        self.facts
            .iter()
            .filter(|f| !self.claimed.contains(&(f.subject.clone(), f.kind)))
    }

    /// Stored human text of a fact, if the fact exists.
    pub fn text_for(&self, subject: &MemberId, kind: ReasonKind) -> Option<&str> {
        self.facts
            .iter()
            .find(|f| f.kind == kind && &f.subject == subject)
            .map(|f| f.text.as_str())
    }
}

/// Ordered pipeline of acceptance rules.
pub struct RuleEngine<'a> {
    rules: Vec<Box<dyn PolicyRule + 'a>>,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: Vec<Box<dyn PolicyRule + 'a>>) -> Self {
        RuleEngine { rules }
    }

    /// Apply every rule in order to the raw facts.
    ///
    /// Panics if a rule claims a `(subject, reason)` pair that is not
    /// pending — that is a rule-implementation defect, not a diagnostic.
    pub fn run(&self, seed: &ChangeSet) -> EngineResult {
        let mut facts: Vec<Incompatibility> = seed.facts().to_vec();
        let mut claimed: BTreeSet<FactKey> = BTreeSet::new();
        let mut accepted: Vec<AcceptanceRecord> = Vec::new();

        for rule in &self.rules {
            let outcome = {
                let pool = FactPool {
                    facts: &facts,
                    claimed: &claimed,
                };
                rule.evaluate(&pool)
            };

            for fact in outcome.emitted {
                let key = (fact.subject.clone(), fact.kind);
                let already = facts
                    .iter()
                    .any(|f| f.kind == key.1 && f.subject == key.0);
                if !already {
                    facts.push(fact);
                }
            }

            for claim in outcome.claims {
                for kind in &claim.reasons {
                    let key = (claim.subject.clone(), *kind);
                    let exists = facts
                        .iter()
                        .any(|f| f.kind == key.1 && f.subject == key.0);
                    if !exists || claimed.contains(&key) {
                        panic!(
                            "rule '{}' claimed a fact that is not pending: {} / {:?}",
                            rule.name(),
                            claim.subject,
                            kind
                        );
                    }
                    claimed.insert(key);
                }
                accepted.push(AcceptanceRecord {
                    subject: claim.subject,
                    reasons: claim.reasons,
                    justification: claim.justification,
                });
            }
        }

        EngineResult {
            facts,
            claimed,
            accepted,
        }
    }
}
