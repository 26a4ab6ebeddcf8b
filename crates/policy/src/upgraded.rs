//! Upgraded-property acceptance rule.
//!
//! A conventional getter/setter pair replaced by one abstract accessor
//! returning a lazy property breaks binary compatibility in a small,
//! enumerable set of ways. This rule recognizes exactly that shape per
//! manifest entry and claims it; anything beyond the expected set stays in
//! the pool and surfaces as an ordinary error. It is a closed-world
//! matcher: a looser rule would approve unrelated breakage bundled into
//! the same release, a stricter one would reject sanctioned migrations.

use apigate_model::{ApiSurface, MemberId, ReasonKind};

use crate::engine::{Claim, FactPool, PolicyRule, RuleOutcome};
use crate::manifest::{UpgradeManifest, UpgradedProperty};

pub struct UpgradedPropertyRule<'a> {
    manifest: &'a UpgradeManifest,
    v2: &'a ApiSurface,
}

impl<'a> UpgradedPropertyRule<'a> {
    pub fn new(manifest: &'a UpgradeManifest, v2: &'a ApiSurface) -> Self {
        UpgradedPropertyRule { manifest, v2 }
    }

    /// The exact incompatibility set this entry licenses.
    ///
    /// When an old accessor shares the new accessor's name, the comparator
    /// reports the pair as one same-named method whose signature changed,
    /// so the expectation folds into return-type-changed (+ now-abstract
    /// when the v2 member is abstract) and no removal is expected for that
    /// accessor. With no name overlap (the boolean `is*` convention) the
    /// new accessor is expected purely as added (+ abstract-added), and
    /// every old accessor purely as removed.
    fn expected_facts(&self, entry: &UpgradedProperty) -> Vec<(MemberId, ReasonKind)> {
        let new_id = entry.new_accessor_id();
        let is_abstract = self
            .v2
            .member(&new_id)
            .map(|m| m.is_abstract)
            .unwrap_or(false);

        let mut expected = Vec::new();
        if entry.same_named_old_accessor().is_some() {
            expected.push((new_id.clone(), ReasonKind::ReturnTypeChanged));
            if is_abstract {
                expected.push((new_id.clone(), ReasonKind::MethodNowAbstract));
            }
        } else {
            expected.push((new_id.clone(), ReasonKind::MethodAddedToPublicClass));
            if is_abstract {
                expected.push((new_id.clone(), ReasonKind::AbstractMethodAddedToClass));
            }
        }
        for old in entry
            .upgraded_methods
            .iter()
            .filter(|m| m.name != entry.method_name)
        {
            expected.push((entry.old_accessor_id(old), ReasonKind::MethodRemoved));
        }
        expected
    }
}

impl PolicyRule for UpgradedPropertyRule<'_> {
    fn name(&self) -> &'static str {
        "Upgraded property"
    }

    fn evaluate(&self, pool: &FactPool<'_>) -> RuleOutcome {
        let mut claims = Vec::new();

        for entry in self.manifest.entries() {
            let expected = self.expected_facts(entry);

            // Every expected fact must be pending, or the migration did not
            // happen exactly as declared: skip the entry and let its real
            // facts surface as errors.
            if expected.iter().any(|(s, k)| !pool.contains(s, *k)) {
                continue;
            }

            // One grouped claim per subject, in expectation order.
            let mut subjects: Vec<MemberId> = Vec::new();
            for (subject, _) in &expected {
                if !subjects.contains(subject) {
                    subjects.push(subject.clone());
                }
            }
            for subject in subjects {
                let reasons: Vec<ReasonKind> = expected
                    .iter()
                    .filter(|(s, _)| *s == subject)
                    .map(|(_, k)| *k)
                    .collect();
                claims.push(Claim {
                    subject,
                    reasons,
                    justification: self.name().to_string(),
                });
            }

            // A sanctioned migration also covers the metadata diagnostics
            // its new accessor triggered; each rides along as its own
            // record so the report keeps the marker clause visible.
            let new_id = entry.new_accessor_id();
            for kind in [
                ReasonKind::MissingExperimentalMarker,
                ReasonKind::MissingVersionMarker,
            ] {
                if pool.contains(&new_id, kind) {
                    claims.push(Claim {
                        subject: new_id.clone(),
                        reasons: vec![kind],
                        justification: self.name().to_string(),
                    });
                }
            }
        }

        RuleOutcome {
            emitted: vec![],
            claims,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigate_model::{ApiClass, ApiMember, ChangeSet};

    use crate::engine::{AcceptanceRecord, RuleEngine};
    use crate::manifest::UpgradeManifest;

    const PROPERTY: &str = "()Lcom/example/Property;";

    fn new_getter() -> MemberId {
        MemberId::method("com.example.Task", "getSourceCompatibility", PROPERTY)
    }

    fn old_setter() -> MemberId {
        MemberId::method(
            "com.example.Task",
            "setSourceCompatibility",
            "(Ljava/lang/String;)V",
        )
    }

    fn v2_surface(is_abstract: bool) -> ApiSurface {
        let mut class = ApiClass::new("com.example.Task", true);
        let mut member = ApiMember::new(new_getter());
        member.is_abstract = is_abstract;
        class.add_member(member);
        let mut surface = ApiSurface::new();
        surface.add_class(class);
        surface
    }

    fn same_name_manifest() -> UpgradeManifest {
        UpgradeManifest::from_json(
            r#"[{
                "containingType": "com.example.Task",
                "methodName": "getSourceCompatibility",
                "methodDescriptor": "()Lcom/example/Property;",
                "propertyName": "sourceCompatibility",
                "upgradedMethods": [
                    { "name": "getSourceCompatibility", "descriptor": "()Ljava/lang/String;" },
                    { "name": "setSourceCompatibility", "descriptor": "(Ljava/lang/String;)V" }
                ]
            }]"#,
        )
        .unwrap()
    }

    fn same_name_facts() -> ChangeSet {
        let mut cs = ChangeSet::new();
        cs.push(new_getter(), ReasonKind::ReturnTypeChanged);
        cs.push(new_getter(), ReasonKind::MethodNowAbstract);
        cs.push(old_setter(), ReasonKind::MethodRemoved);
        cs
    }

    fn run(
        manifest: &UpgradeManifest,
        v2: &ApiSurface,
        facts: &ChangeSet,
    ) -> (Vec<AcceptanceRecord>, usize) {
        let rule = UpgradedPropertyRule::new(manifest, v2);
        let engine = RuleEngine::new(vec![Box::new(rule)]);
        let result = engine.run(facts);
        let unclaimed = result.unclaimed().count();
        (result.accepted, unclaimed)
    }

    #[test]
    fn same_name_pair_folds_into_changed_plus_abstract() {
        let (accepted, unclaimed) = run(&same_name_manifest(), &v2_surface(true), &same_name_facts());
        assert_eq!(unclaimed, 0);
        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted[0].subject, new_getter());
        assert_eq!(
            accepted[0].reasons,
            vec![ReasonKind::ReturnTypeChanged, ReasonKind::MethodNowAbstract]
        );
        assert_eq!(accepted[0].justification, "Upgraded property");
        assert_eq!(accepted[1].subject, old_setter());
        assert_eq!(accepted[1].reasons, vec![ReasonKind::MethodRemoved]);
    }

    #[test]
    fn non_abstract_accessor_expects_no_abstract_fact() {
        let mut cs = ChangeSet::new();
        cs.push(new_getter(), ReasonKind::ReturnTypeChanged);
        cs.push(old_setter(), ReasonKind::MethodRemoved);
        let (accepted, unclaimed) = run(&same_name_manifest(), &v2_surface(false), &cs);
        assert_eq!(unclaimed, 0);
        assert_eq!(accepted[0].reasons, vec![ReasonKind::ReturnTypeChanged]);
    }

    #[test]
    fn extra_fact_on_involved_subject_stays_unclaimed() {
        let mut cs = same_name_facts();
        cs.push(old_setter(), ReasonKind::MethodNoLongerStatic);
        let (accepted, unclaimed) = run(&same_name_manifest(), &v2_surface(true), &cs);
        // Expected shape accepted, the unrelated fact remains an error.
        assert_eq!(accepted.len(), 2);
        assert_eq!(unclaimed, 1);
    }

    #[test]
    fn missing_expected_fact_rejects_the_whole_entry() {
        // Setter removal never happened: no acceptance at all.
        let mut cs = ChangeSet::new();
        cs.push(new_getter(), ReasonKind::ReturnTypeChanged);
        cs.push(new_getter(), ReasonKind::MethodNowAbstract);
        let (accepted, unclaimed) = run(&same_name_manifest(), &v2_surface(true), &cs);
        assert!(accepted.is_empty());
        assert_eq!(unclaimed, 2);
    }

    #[test]
    fn manifest_subject_absent_from_facts_rejects_the_entry() {
        // Declared migration, but the comparator saw nothing at all.
        let cs = ChangeSet::new();
        let (accepted, unclaimed) = run(&same_name_manifest(), &v2_surface(true), &cs);
        assert!(accepted.is_empty());
        assert_eq!(unclaimed, 0);
    }

    #[test]
    fn boolean_rename_expects_pure_add_and_removes() {
        let manifest = UpgradeManifest::from_json(
            r#"[{
                "containingType": "com.example.Task",
                "methodName": "getFailOnError",
                "methodDescriptor": "()Lcom/example/Property;",
                "propertyName": "failOnError",
                "upgradedMethods": [
                    { "name": "isFailOnError", "descriptor": "()Z" },
                    { "name": "setFailOnError", "descriptor": "(Z)V" }
                ]
            }]"#,
        )
        .unwrap();

        let new_id = MemberId::method("com.example.Task", "getFailOnError", PROPERTY);
        let is_getter = MemberId::method("com.example.Task", "isFailOnError", "()Z");
        let bool_setter = MemberId::method("com.example.Task", "setFailOnError", "(Z)V");

        let mut class = ApiClass::new("com.example.Task", true);
        let mut member = ApiMember::new(new_id.clone());
        member.is_abstract = true;
        class.add_member(member);
        let mut v2 = ApiSurface::new();
        v2.add_class(class);

        let mut cs = ChangeSet::new();
        cs.push(new_id.clone(), ReasonKind::MethodAddedToPublicClass);
        cs.push(new_id.clone(), ReasonKind::AbstractMethodAddedToClass);
        cs.push(is_getter.clone(), ReasonKind::MethodRemoved);
        cs.push(bool_setter.clone(), ReasonKind::MethodRemoved);

        let (accepted, unclaimed) = run(&manifest, &v2, &cs);
        assert_eq!(unclaimed, 0);
        assert_eq!(accepted.len(), 3);
        assert_eq!(accepted[0].subject, new_id);
        assert_eq!(
            accepted[0].reasons,
            vec![
                ReasonKind::MethodAddedToPublicClass,
                ReasonKind::AbstractMethodAddedToClass
            ]
        );
        assert_eq!(accepted[1].subject, is_getter);
        assert_eq!(accepted[1].reasons, vec![ReasonKind::MethodRemoved]);
        assert_eq!(accepted[2].subject, bool_setter);
        assert_eq!(accepted[2].reasons, vec![ReasonKind::MethodRemoved]);
    }

    #[test]
    fn pending_marker_facts_ride_along_with_acceptance() {
        let mut cs = same_name_facts();
        cs.push_with_text(
            new_getter(),
            ReasonKind::MissingExperimentalMarker,
            "Is not annotated with @Incubating.".to_string(),
        );
        let (accepted, unclaimed) = run(&same_name_manifest(), &v2_surface(true), &cs);
        assert_eq!(unclaimed, 0);
        assert_eq!(accepted.len(), 3);
        let marker = &accepted[2];
        assert_eq!(marker.subject, new_getter());
        assert_eq!(marker.reasons, vec![ReasonKind::MissingExperimentalMarker]);
        assert_eq!(marker.justification, "Upgraded property");
    }
}
