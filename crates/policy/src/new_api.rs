//! Evolution-metadata policy for newly introduced API.
//!
//! Any method added to a class that was already public in v1 must carry an
//! experimental marker and a version-introduced marker in v2. A missing
//! marker produces an error-class fact on the new member; whether that
//! fact is later accepted (e.g. by the upgraded-property rule for a
//! sanctioned accessor) is a separate question, so this rule only emits
//! and never claims.

use apigate_model::{ApiSurface, Incompatibility, ReasonKind};

use crate::engine::{FactPool, PolicyRule, RuleOutcome};

pub struct NewApiRule<'a> {
    v1: &'a ApiSurface,
    v2: &'a ApiSurface,
    current_version: String,
}

impl<'a> NewApiRule<'a> {
    pub fn new(v1: &'a ApiSurface, v2: &'a ApiSurface, current_version: &str) -> Self {
        NewApiRule {
            v1,
            v2,
            current_version: current_version.to_string(),
        }
    }
}

impl PolicyRule for NewApiRule<'_> {
    fn name(&self) -> &'static str {
        "Evolution metadata"
    }

    fn evaluate(&self, pool: &FactPool<'_>) -> RuleOutcome {
        let mut emitted = Vec::new();

        for fact in pool.facts() {
            if fact.kind != ReasonKind::MethodAddedToPublicClass {
                continue;
            }
            let was_public = self
                .v1
                .class(&fact.subject.owner)
                .map(|c| c.is_public)
                .unwrap_or(false);
            if !was_public {
                continue;
            }
            // Without a v2 surface entry there is nothing to inspect; the
            // surface/facts mismatch surfaces through the structural facts.
            let Some(member) = self.v2.member(&fact.subject) else {
                continue;
            };

            if !member.tags.experimental {
                emitted.push(Incompatibility {
                    subject: fact.subject.clone(),
                    kind: ReasonKind::MissingExperimentalMarker,
                    text: "Is not annotated with @Incubating.".to_string(),
                });
            }
            if member.tags.since.is_none() {
                emitted.push(Incompatibility {
                    subject: fact.subject.clone(),
                    kind: ReasonKind::MissingVersionMarker,
                    text: format!("Is not annotated with @since {}.", self.current_version),
                });
            }
        }

        RuleOutcome {
            emitted,
            claims: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigate_model::{ApiClass, ApiMember, ChangeSet, MemberId};

    use crate::engine::RuleEngine;

    fn new_method() -> MemberId {
        MemberId::method("com.example.Task", "getFailOnError", "()Lcom/example/Property;")
    }

    fn surface_with_member(experimental: bool, since: Option<&str>, public: bool) -> ApiSurface {
        let mut class = ApiClass::new("com.example.Task", public);
        let mut member = ApiMember::new(new_method());
        member.is_abstract = true;
        member.tags.experimental = experimental;
        member.tags.since = since.map(|s| s.to_string());
        class.add_member(member);
        let mut surface = ApiSurface::new();
        surface.add_class(class);
        surface
    }

    fn added_facts() -> ChangeSet {
        let mut cs = ChangeSet::new();
        cs.push(new_method(), ReasonKind::MethodAddedToPublicClass);
        cs.push(new_method(), ReasonKind::AbstractMethodAddedToClass);
        cs
    }

    fn run(v1: ApiSurface, v2: ApiSurface, facts: &ChangeSet) -> Vec<Incompatibility> {
        let rule = NewApiRule::new(&v1, &v2, "2.0");
        let engine = RuleEngine::new(vec![Box::new(rule)]);
        let result = engine.run(facts);
        result
            .facts
            .iter()
            .filter(|f| f.kind.is_metadata())
            .cloned()
            .collect()
    }

    #[test]
    fn both_markers_missing_emits_both_facts() {
        let v1 = surface_with_member(false, None, true);
        let v2 = surface_with_member(false, None, true);
        let markers = run(v1, v2, &added_facts());
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, ReasonKind::MissingExperimentalMarker);
        assert_eq!(markers[0].text, "Is not annotated with @Incubating.");
        assert_eq!(markers[1].kind, ReasonKind::MissingVersionMarker);
        assert_eq!(markers[1].text, "Is not annotated with @since 2.0.");
    }

    #[test]
    fn fully_tagged_member_emits_nothing() {
        let v1 = surface_with_member(true, Some("2.0"), true);
        let v2 = surface_with_member(true, Some("2.0"), true);
        assert!(run(v1, v2, &added_facts()).is_empty());
    }

    #[test]
    fn only_missing_marker_is_reported() {
        let v1 = surface_with_member(true, None, true);
        let v2 = surface_with_member(true, None, true);
        let markers = run(v1, v2, &added_facts());
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].kind, ReasonKind::MissingVersionMarker);
    }

    #[test]
    fn class_not_public_in_v1_is_exempt() {
        let v1 = surface_with_member(false, None, false);
        let v2 = surface_with_member(false, None, true);
        assert!(run(v1, v2, &added_facts()).is_empty());
    }

    #[test]
    fn class_absent_from_v1_is_exempt() {
        let v1 = ApiSurface::new();
        let v2 = surface_with_member(false, None, true);
        assert!(run(v1, v2, &added_facts()).is_empty());
    }

    #[test]
    fn member_absent_from_v2_surface_emits_nothing() {
        let v1 = surface_with_member(false, None, true);
        let v2 = ApiSurface::new();
        assert!(run(v1, v2, &added_facts()).is_empty());
    }
}
