//! Acceptance-policy engine for binary compatibility checks.
//!
//! Consumes two public API snapshots, the comparator's raw change facts,
//! and an upgrade manifest; runs the acceptance rules in fixed order and
//! produces a classified report. Facts no policy covers are errors; facts
//! a policy covers are accepted with an auditable justification. A run
//! with any error entry fails the compatibility check.

pub mod engine;
pub mod manifest;
pub mod new_api;
pub mod report;
pub mod upgraded;

pub use engine::{AcceptanceRecord, Claim, FactPool, PolicyRule, RuleEngine, RuleOutcome};
pub use manifest::{ManifestError, UpgradeManifest, UpgradedMethod, UpgradedProperty};
pub use new_api::NewApiRule;
pub use report::{Report, ReportEntry};
pub use upgraded::UpgradedPropertyRule;

use apigate_model::{ApiSurface, ChangeSet};

/// Run the full acceptance pipeline over one comparison.
///
/// The manifest must already be loaded (`UpgradeManifest::from_json`) —
/// manifest parsing is the only fallible step and is kept apart from rule
/// evaluation. Rule order is fixed: the evolution-metadata policy first,
/// so its marker facts are visible to the upgraded-property rule, then the
/// upgraded-property acceptance.
///
/// # Arguments
/// * `v1` / `v2` - public API snapshots before and after the change
/// * `facts` - raw change facts derived from the snapshots
/// * `manifest` - sanctioned upgraded-property migrations
/// * `current_version` - release version required by the `@since` policy
pub fn check(
    v1: &ApiSurface,
    v2: &ApiSurface,
    facts: &ChangeSet,
    manifest: &UpgradeManifest,
    current_version: &str,
) -> Report {
    let rules: Vec<Box<dyn PolicyRule + '_>> = vec![
        Box::new(NewApiRule::new(v1, v2, current_version)),
        Box::new(UpgradedPropertyRule::new(manifest, v2)),
    ];
    let engine = RuleEngine::new(rules);
    Report::assemble(&engine.run(facts))
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use apigate_model::{ApiClass, ApiMember, MemberId, ReasonKind};

    #[test]
    fn empty_inputs_produce_empty_passing_report() {
        let surface = ApiSurface::new();
        let report = check(
            &surface,
            &surface,
            &ChangeSet::new(),
            &UpgradeManifest::empty(),
            "2.0",
        );
        assert!(!report.has_errors());
        assert!(report.accepted().is_empty());
    }

    #[test]
    fn unrelated_removal_is_reported_even_with_manifest_present() {
        let manifest = UpgradeManifest::from_json(
            r#"[{
                "containingType": "com.example.Task",
                "methodName": "getX",
                "methodDescriptor": "()Lcom/example/Property;",
                "propertyName": "x",
                "upgradedMethods": [{ "name": "getX", "descriptor": "()I" }]
            }]"#,
        )
        .unwrap();

        let mut class = ApiClass::new("com.example.Other", true);
        class.add_member(ApiMember::new(MemberId::method(
            "com.example.Other",
            "run",
            "()V",
        )));
        let mut v1 = ApiSurface::new();
        v1.add_class(class.clone());
        let v2 = ApiSurface::new();

        let mut facts = ChangeSet::new();
        facts.push(
            MemberId::method("com.example.Other", "run", "()V"),
            ReasonKind::MethodRemoved,
        );

        let report = check(&v1, &v2, &facts, &manifest, "2.0");
        assert!(report.has_errors());
        assert_eq!(
            report.errors()[0].message,
            "Method com.example.Other.run(): Is not binary compatible."
        );
        assert!(report.accepted().is_empty());
    }
}
