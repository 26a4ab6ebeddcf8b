//! Final report assembly.
//!
//! Merges the pipeline outcome into the caller-facing structure: facts no
//! rule claimed become `errors`, acceptance records become `accepted`.
//! Reasons claimed together on one subject stay grouped so a combined
//! statement like "return type changed + now abstract" renders as one
//! entry. Output ordering is by subject then message for stable diffs.

use serde::Serialize;

use apigate_model::{Incompatibility, MemberId, ReasonKind};

use crate::engine::EngineResult;

/// One rendered report line: subject, full message, underlying reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub subject: MemberId,
    pub message: String,
    pub reasons: Vec<String>,
}

/// Classified outcome of a compatibility run.
///
/// Every raw fact of the run appears in exactly one of `errors` or
/// `accepted` — the engine partitions facts into claimed and unclaimed,
/// and the assembler renders each side completely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    errors: Vec<ReportEntry>,
    accepted: Vec<ReportEntry>,
}

impl Report {
    /// Build the report from a finished pipeline run.
    pub fn assemble(result: &EngineResult) -> Report {
        let mut errors = Vec::new();

        // Unclaimed structural facts, one combined entry per subject.
        let mut groups: Vec<(MemberId, Vec<&Incompatibility>)> = Vec::new();
        let mut metadata: Vec<&Incompatibility> = Vec::new();
        for fact in result.unclaimed() {
            if fact.kind.is_metadata() {
                metadata.push(fact);
                continue;
            }
            match groups.iter_mut().find(|(s, _)| *s == fact.subject) {
                Some((_, facts)) => facts.push(fact),
                None => groups.push((fact.subject.clone(), vec![fact])),
            }
        }
        for (subject, facts) in groups {
            errors.push(ReportEntry {
                message: format!("{}: Is not binary compatible.", subject),
                reasons: facts.iter().map(|f| f.text.clone()).collect(),
                subject,
            });
        }

        // Unclaimed metadata facts each render their own clause, echoing
        // the subject's structural reasons for context.
        for fact in metadata {
            errors.push(ReportEntry {
                subject: fact.subject.clone(),
                message: format!("{}: {}", fact.subject, fact.text),
                reasons: contextual_reasons(result, &fact.subject, fact.kind),
            });
        }

        let mut accepted = Vec::new();
        for record in &result.accepted {
            let is_metadata_record =
                record.reasons.len() == 1 && record.reasons[0].is_metadata();
            if is_metadata_record {
                let kind = record.reasons[0];
                let clause = result
                    .text_for(&record.subject, kind)
                    .unwrap_or_else(|| kind.phrase())
                    .to_string();
                accepted.push(ReportEntry {
                    message: format!(
                        "{}: {} Reason for accepting this: {}",
                        record.subject, clause, record.justification
                    ),
                    reasons: contextual_reasons(result, &record.subject, kind),
                    subject: record.subject.clone(),
                });
            } else {
                accepted.push(ReportEntry {
                    message: format!(
                        "{}: Is not binary compatible. Reason for accepting this: {}",
                        record.subject, record.justification
                    ),
                    reasons: record
                        .reasons
                        .iter()
                        .map(|k| {
                            result
                                .text_for(&record.subject, *k)
                                .unwrap_or_else(|| k.phrase())
                                .to_string()
                        })
                        .collect(),
                    subject: record.subject.clone(),
                });
            }
        }

        errors.sort_by(|a, b| a.subject.cmp(&b.subject).then(a.message.cmp(&b.message)));
        accepted.sort_by(|a, b| a.subject.cmp(&b.subject).then(a.message.cmp(&b.message)));

        Report { errors, accepted }
    }

    /// Incompatibilities not covered by any accepted policy.
    pub fn errors(&self) -> &[ReportEntry] {
        &self.errors
    }

    /// Incompatibilities accepted with a policy-backed justification.
    pub fn accepted(&self) -> &[ReportEntry] {
        &self.accepted
    }

    /// Whether the run fails the compatibility check.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Format as human-readable text.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.errors.is_empty() {
            lines.push("ERRORS:".to_string());
            for entry in &self.errors {
                lines.push(format!("  {}", entry.message));
                for reason in &entry.reasons {
                    lines.push(format!("    - {}", reason));
                }
            }
        }
        if !self.accepted.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("ACCEPTED:".to_string());
            for entry in &self.accepted {
                lines.push(format!("  {}", entry.message));
                for reason in &entry.reasons {
                    lines.push(format!("    - {}", reason));
                }
            }
        }
        lines.join("\n")
    }
}

/// Structural reason phrases recorded for a subject, used as context on a
/// metadata entry; falls back to the metadata phrase itself when the
/// subject has no structural facts.
fn contextual_reasons(
    result: &EngineResult,
    subject: &MemberId,
    fallback: ReasonKind,
) -> Vec<String> {
    let structural: Vec<String> = result
        .facts
        .iter()
        .filter(|f| &f.subject == subject && !f.kind.is_metadata())
        .map(|f| f.text.clone())
        .collect();
    if structural.is_empty() {
        vec![fallback.phrase().to_string()]
    } else {
        structural
    }
}
