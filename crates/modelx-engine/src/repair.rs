//! Consistency repair
//!
//! Scans the whole model for invariant violations and, unless asked for a
//! dry run, fixes them directly through the store. Repair is a recovery
//! tool: its writes share one transaction but never enter the journal.
//!
//! Fixes run kind by kind in `FindingKind::ALL` order, rescanning before
//! each kind, so later kinds see the effect of earlier fixes (a cleared
//! invalid focus is picked up again as a missing lifeline). A failed fix
//! is logged and skipped; the remaining findings are still fixed.

use modelx_core::errors::{ExErrorKind, Result};
use modelx_core::journal::Change;
use modelx_core::model::Table;
use modelx_core::rules::{self, Finding, FindingKind, ModelSnapshot};
use modelx_core::store::{Reader, Store};
use modelx_core::types::schema::EVENT_FINDING;
use serde::Serialize;

use crate::lifelines;
use crate::tx::{self, Batch};

/// Outcome of a repair run
///
/// `found` counts the findings of the initial scan. `fixed` counts every
/// finding fixed, including those surfaced by earlier fixes; it is 0 for
/// a dry run. `log` holds one line per finding and per fix attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub found: usize,
    pub fixed: usize,
    pub findings: Vec<Finding>,
    pub log: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.found == 0
    }
}

fn log_finding(finding: &Finding) {
    tracing::warn!(
        component = module_path!(),
        op = "repair",
        event = EVENT_FINDING,
        finding = finding.kind.name(),
        table = finding.table.name(),
        row_id = finding.row_id.get(),
        err.code = ExErrorKind::ConsistencyViolation.code(),
        "{}",
        finding.message
    );
}

/// Scan and optionally fix; returns the report and the applied changes
pub(crate) fn repair<S: Store + ?Sized>(
    store: &mut S,
    dry_run: bool,
) -> Result<(RepairReport, Vec<Change>)> {
    let snapshot = ModelSnapshot::load(&*store)?;
    let findings = rules::scan(&snapshot);
    for finding in &findings {
        log_finding(finding);
    }

    let mut report = RepairReport {
        found: findings.len(),
        fixed: 0,
        log: findings.iter().map(|f| format!("found {}", f)).collect(),
        findings,
    };
    if dry_run || report.found == 0 {
        return Ok((report, Vec::new()));
    }

    let (attempts, changes) = tx::run(store, |batch| {
        let mut attempts = Vec::new();
        for kind in FindingKind::ALL {
            let snapshot = ModelSnapshot::load(batch.reader())?;
            for finding in rules::find(&snapshot, kind) {
                let result = fix(batch, &snapshot, &finding);
                attempts.push((finding, result));
            }
        }
        Ok(attempts)
    })?;

    for (finding, result) in attempts {
        if !report.findings.contains(&finding) {
            log_finding(&finding);
        }
        match result {
            Ok(()) => {
                report.fixed += 1;
                report.log.push(format!("fixed {}", finding));
            }
            Err(err) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "repair",
                    finding = finding.kind.name(),
                    row_id = finding.row_id.get(),
                    err.code = err.kind().code(),
                    "fix failed: {}",
                    err
                );
                report.log.push(format!("failed {}: {}", finding, err));
            }
        }
    }
    Ok((report, changes))
}

fn fix<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    snapshot: &ModelSnapshot,
    finding: &Finding,
) -> Result<()> {
    match finding.kind {
        FindingKind::OrphanedFeature
        | FindingKind::DanglingRelationship
        | FindingKind::DanglingElement => {
            let row = batch.reader().get_row(finding.table, finding.row_id)?;
            batch.delete(row)
        }
        FindingKind::FocusOutsideScenario | FindingKind::InvalidFocus => {
            let element = batch.reader().get_diagramelement(finding.row_id)?;
            batch.update(element.clone().into(), element.with_focus(None).into())
        }
        FindingKind::DuplicateLifelines => {
            let classifier_id = finding.row_id;
            let lifelines = snapshot.lifelines_of(classifier_id);
            let Some((keep, extras)) = lifelines.split_first() else {
                return Ok(());
            };
            for extra in extras {
                let focusing = batch
                    .reader()
                    .get_diagramelements_by_focused_feature_id(extra.id)?
                    .warn_if_truncated("repair", Table::DiagramElement);
                for element in focusing {
                    batch.update(element.clone().into(), element.with_focus(Some(keep.id)).into())?;
                }
                lifelines::delete_feature(batch, extra)?;
            }
            Ok(())
        }
        FindingKind::MissingLifeline => {
            let element = batch.reader().get_diagramelement(finding.row_id)?;
            let diagram = batch.reader().get_diagram(element.diagram_id)?;
            lifelines::bind_element(batch, diagram.diagram_type, &element)
        }
        FindingKind::OrphanedLifeline => {
            let feature = batch.reader().get_feature(finding.row_id)?;
            lifelines::delete_feature(batch, &feature)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelx_core::model::{
        Classifier, ClassifierType, Diagram, DiagramElement, DiagramType, Feature, FeatureType,
        RowId,
    };
    use modelx_core::store::{MemoryStore, Writer};

    fn seed_inconsistent() -> (MemoryStore, RowId, RowId) {
        let mut store = MemoryStore::new();
        let seq = store
            .insert_row(&Diagram::new(None, DiagramType::UmlSequence, "seq").into())
            .unwrap();
        let class = store
            .insert_row(&Classifier::new(ClassifierType::UmlClass, "A").into())
            .unwrap();
        // scenario element with no lifeline, written around the controllers
        let element = store
            .insert_row(&DiagramElement::new(seq, class).into())
            .unwrap();
        (store, class, element)
    }

    #[test]
    fn test_dry_run_reports_without_fixing() {
        let (mut store, _, element) = seed_inconsistent();
        let (report, changes) = repair(&mut store, true).unwrap();

        assert_eq!(report.found, 1);
        assert_eq!(report.fixed, 0);
        assert!(changes.is_empty());
        assert_eq!(report.findings[0].kind, FindingKind::MissingLifeline);
        assert_eq!(store.get_diagramelement(element).unwrap().focused_feature_id, None);
    }

    #[test]
    fn test_fix_creates_and_focuses_lifeline() {
        let (mut store, class, element) = seed_inconsistent();
        let (report, _) = repair(&mut store, false).unwrap();

        assert_eq!(report.fixed, 1);
        let features = store.get_all_features().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].classifier_id, class);
        assert_eq!(
            store.get_diagramelement(element).unwrap().focused_feature_id,
            Some(features[0].id)
        );
        assert!(repair(&mut store, true).unwrap().0.is_clean());
    }

    #[test]
    fn test_duplicate_lifelines_collapse_to_lowest_id() {
        let (mut store, class, element) = seed_inconsistent();
        let first = store
            .insert_row(&Feature::new(class, FeatureType::Lifeline, "").into())
            .unwrap();
        let second = store
            .insert_row(&Feature::new(class, FeatureType::Lifeline, "").into())
            .unwrap();
        let mut focused = store.get_diagramelement(element).unwrap();
        focused.focused_feature_id = Some(second);
        store.update_row(&focused.into()).unwrap();

        repair(&mut store, false).unwrap();

        assert!(store.get_feature(first).is_ok());
        assert!(store.get_feature(second).unwrap_err().is_not_found());
        assert_eq!(
            store.get_diagramelement(element).unwrap().focused_feature_id,
            Some(first)
        );
    }

    #[test]
    fn test_report_serializes_findings() {
        let (mut store, _, element) = seed_inconsistent();
        let (report, _) = repair(&mut store, true).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["found"], 1);
        assert_eq!(json["findings"][0]["kind"], "missing_lifeline");
        assert_eq!(json["findings"][0]["row_id"], element.get());
    }
}
