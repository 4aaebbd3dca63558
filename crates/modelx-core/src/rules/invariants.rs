use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::errors::Result;
use crate::model::{
    Classifier, Diagram, DiagramElement, Feature, Relationship, RowId, Table,
};
use crate::store::Reader;

/// Full copy of the model used by the scan
#[derive(Debug, Clone, Default)]
pub struct ModelSnapshot {
    pub diagrams: BTreeMap<RowId, Diagram>,
    pub classifiers: BTreeMap<RowId, Classifier>,
    pub features: BTreeMap<RowId, Feature>,
    pub relationships: BTreeMap<RowId, Relationship>,
    pub elements: BTreeMap<RowId, DiagramElement>,
}

impl ModelSnapshot {
    /// Read every row through `reader`
    ///
    /// # Errors
    ///
    /// Propagates reader failures.
    pub fn load<R: Reader + ?Sized>(reader: &R) -> Result<Self> {
        Ok(Self {
            diagrams: reader.get_all_diagrams()?.into_iter().map(|r| (r.id, r)).collect(),
            classifiers: reader
                .get_all_classifiers()?
                .into_iter()
                .map(|r| (r.id, r))
                .collect(),
            features: reader.get_all_features()?.into_iter().map(|r| (r.id, r)).collect(),
            relationships: reader
                .get_all_relationships()?
                .into_iter()
                .map(|r| (r.id, r))
                .collect(),
            elements: reader
                .get_all_diagramelements()?
                .into_iter()
                .map(|r| (r.id, r))
                .collect(),
        })
    }

    pub fn is_scenario_diagram(&self, diagram_id: RowId) -> bool {
        self.diagrams
            .get(&diagram_id)
            .is_some_and(|d| d.is_scenario())
    }

    /// Lifelines owned by a classifier, ascending by id
    pub fn lifelines_of(&self, classifier_id: RowId) -> Vec<&Feature> {
        self.features
            .values()
            .filter(|f| f.classifier_id == classifier_id && f.is_lifeline())
            .collect()
    }

    /// Elements binding a classifier into an existing scenario diagram
    pub fn scenario_bindings(&self, classifier_id: RowId) -> usize {
        self.elements
            .values()
            .filter(|e| e.classifier_id == classifier_id && self.is_scenario_diagram(e.diagram_id))
            .count()
    }
}

/// Category of a consistency finding
///
/// Variants are listed in the order the repair scan fixes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Feature whose owner classifier is missing
    OrphanedFeature,
    /// Relationship with a missing endpoint classifier or feature
    DanglingRelationship,
    /// Element referencing a missing diagram or classifier
    DanglingElement,
    /// Element of a non-scenario diagram with a focus set
    FocusOutsideScenario,
    /// Focus on a missing feature, a non-lifeline, or a foreign lifeline
    InvalidFocus,
    /// Classifier owning more than one lifeline
    DuplicateLifelines,
    /// Scenario element without a focused lifeline
    MissingLifeline,
    /// Lifeline whose classifier is not bound into any scenario diagram
    OrphanedLifeline,
}

impl FindingKind {
    pub const ALL: [FindingKind; 8] = [
        FindingKind::OrphanedFeature,
        FindingKind::DanglingRelationship,
        FindingKind::DanglingElement,
        FindingKind::FocusOutsideScenario,
        FindingKind::InvalidFocus,
        FindingKind::DuplicateLifelines,
        FindingKind::MissingLifeline,
        FindingKind::OrphanedLifeline,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FindingKind::OrphanedFeature => "orphaned_feature",
            FindingKind::DanglingRelationship => "dangling_relationship",
            FindingKind::DanglingElement => "dangling_element",
            FindingKind::FocusOutsideScenario => "focus_outside_scenario",
            FindingKind::InvalidFocus => "invalid_focus",
            FindingKind::DuplicateLifelines => "duplicate_lifelines",
            FindingKind::MissingLifeline => "missing_lifeline",
            FindingKind::OrphanedLifeline => "orphaned_lifeline",
        }
    }
}

/// One violation found by the scan
///
/// `row_id` names the offending row in `table`; for duplicate lifelines it
/// is the owning classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub table: Table,
    pub row_id: RowId,
    pub message: String,
}

impl Finding {
    fn new(kind: FindingKind, table: Table, row_id: RowId, message: String) -> Self {
        Self {
            kind,
            table,
            row_id,
            message,
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.kind.name(),
            self.table,
            self.row_id,
            self.message
        )
    }
}

/// Features whose owner classifier does not exist
pub fn find_orphaned_features(snapshot: &ModelSnapshot) -> Vec<Finding> {
    snapshot
        .features
        .values()
        .filter(|f| !snapshot.classifiers.contains_key(&f.classifier_id))
        .map(|f| {
            Finding::new(
                FindingKind::OrphanedFeature,
                Table::Feature,
                f.id,
                format!("owner classifier {} is missing", f.classifier_id),
            )
        })
        .collect()
}

/// Relationships with a missing endpoint
pub fn find_dangling_relationships(snapshot: &ModelSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    for r in snapshot.relationships.values() {
        let missing_classifier = [r.from_classifier_id, r.to_classifier_id]
            .into_iter()
            .find(|id| !snapshot.classifiers.contains_key(id));
        let missing_feature = [r.from_feature_id, r.to_feature_id]
            .into_iter()
            .flatten()
            .find(|id| !snapshot.features.contains_key(id));

        let message = match (missing_classifier, missing_feature) {
            (Some(id), _) => format!("endpoint classifier {} is missing", id),
            (None, Some(id)) => format!("endpoint feature {} is missing", id),
            (None, None) => continue,
        };
        findings.push(Finding::new(
            FindingKind::DanglingRelationship,
            Table::Relationship,
            r.id,
            message,
        ));
    }
    findings
}

/// Elements whose diagram or classifier does not exist
pub fn find_dangling_elements(snapshot: &ModelSnapshot) -> Vec<Finding> {
    snapshot
        .elements
        .values()
        .filter_map(|e| {
            let message = if !snapshot.diagrams.contains_key(&e.diagram_id) {
                format!("diagram {} is missing", e.diagram_id)
            } else if !snapshot.classifiers.contains_key(&e.classifier_id) {
                format!("classifier {} is missing", e.classifier_id)
            } else {
                return None;
            };
            Some(Finding::new(
                FindingKind::DanglingElement,
                Table::DiagramElement,
                e.id,
                message,
            ))
        })
        .collect()
}

fn is_dangling(snapshot: &ModelSnapshot, e: &DiagramElement) -> bool {
    !snapshot.diagrams.contains_key(&e.diagram_id)
        || !snapshot.classifiers.contains_key(&e.classifier_id)
}

/// Elements of non-scenario diagrams that carry a focus
pub fn find_focus_outside_scenario(snapshot: &ModelSnapshot) -> Vec<Finding> {
    snapshot
        .elements
        .values()
        .filter(|e| !is_dangling(snapshot, e))
        .filter(|e| e.focused_feature_id.is_some() && !snapshot.is_scenario_diagram(e.diagram_id))
        .map(|e| {
            Finding::new(
                FindingKind::FocusOutsideScenario,
                Table::DiagramElement,
                e.id,
                format!("diagram {} is not a scenario diagram", e.diagram_id),
            )
        })
        .collect()
}

/// Scenario elements whose focus does not reference their own lifeline
pub fn find_invalid_focus(snapshot: &ModelSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    for e in snapshot.elements.values() {
        if is_dangling(snapshot, e) || !snapshot.is_scenario_diagram(e.diagram_id) {
            continue;
        }
        let Some(focus) = e.focused_feature_id else {
            continue;
        };
        let message = match snapshot.features.get(&focus) {
            None => format!("focused feature {} is missing", focus),
            Some(f) if !f.is_lifeline() => format!("focused feature {} is not a lifeline", focus),
            Some(f) if f.classifier_id != e.classifier_id => format!(
                "focused lifeline {} belongs to classifier {}",
                focus, f.classifier_id
            ),
            Some(_) => continue,
        };
        findings.push(Finding::new(
            FindingKind::InvalidFocus,
            Table::DiagramElement,
            e.id,
            message,
        ));
    }
    findings
}

/// Classifiers bound into scenario diagrams that own several lifelines
pub fn find_duplicate_lifelines(snapshot: &ModelSnapshot) -> Vec<Finding> {
    snapshot
        .classifiers
        .values()
        .filter(|c| snapshot.scenario_bindings(c.id) > 0)
        .filter_map(|c| {
            let lifelines = snapshot.lifelines_of(c.id);
            (lifelines.len() > 1).then(|| {
                Finding::new(
                    FindingKind::DuplicateLifelines,
                    Table::Classifier,
                    c.id,
                    format!("owns {} lifelines", lifelines.len()),
                )
            })
        })
        .collect()
}

/// Scenario elements with no focus at all
pub fn find_missing_lifelines(snapshot: &ModelSnapshot) -> Vec<Finding> {
    snapshot
        .elements
        .values()
        .filter(|e| !is_dangling(snapshot, e))
        .filter(|e| snapshot.is_scenario_diagram(e.diagram_id) && e.focused_feature_id.is_none())
        .map(|e| {
            let message = if snapshot.lifelines_of(e.classifier_id).is_empty() {
                format!("classifier {} has no lifeline", e.classifier_id)
            } else {
                "scenario element does not focus its lifeline".to_string()
            };
            Finding::new(
                FindingKind::MissingLifeline,
                Table::DiagramElement,
                e.id,
                message,
            )
        })
        .collect()
}

/// Lifelines whose classifier is bound into no scenario diagram
pub fn find_orphaned_lifelines(snapshot: &ModelSnapshot) -> Vec<Finding> {
    snapshot
        .features
        .values()
        .filter(|f| f.is_lifeline() && snapshot.classifiers.contains_key(&f.classifier_id))
        .filter(|f| snapshot.scenario_bindings(f.classifier_id) == 0)
        .map(|f| {
            Finding::new(
                FindingKind::OrphanedLifeline,
                Table::Feature,
                f.id,
                format!(
                    "classifier {} is not bound into any scenario diagram",
                    f.classifier_id
                ),
            )
        })
        .collect()
}

/// Findings of one kind
pub fn find(snapshot: &ModelSnapshot, kind: FindingKind) -> Vec<Finding> {
    match kind {
        FindingKind::OrphanedFeature => find_orphaned_features(snapshot),
        FindingKind::DanglingRelationship => find_dangling_relationships(snapshot),
        FindingKind::DanglingElement => find_dangling_elements(snapshot),
        FindingKind::FocusOutsideScenario => find_focus_outside_scenario(snapshot),
        FindingKind::InvalidFocus => find_invalid_focus(snapshot),
        FindingKind::DuplicateLifelines => find_duplicate_lifelines(snapshot),
        FindingKind::MissingLifeline => find_missing_lifelines(snapshot),
        FindingKind::OrphanedLifeline => find_orphaned_lifelines(snapshot),
    }
}

/// Every finding, grouped by kind in fix order
pub fn scan(snapshot: &ModelSnapshot) -> Vec<Finding> {
    FindingKind::ALL
        .into_iter()
        .flat_map(|kind| find(snapshot, kind))
        .collect()
}
