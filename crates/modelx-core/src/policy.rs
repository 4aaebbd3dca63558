//! Lifeline policy
//!
//! Pure planning functions that keep lifelines consistent with the
//! diagrams that bind their classifiers. Callers read the relevant state
//! through a `Reader`, ask for a plan, and apply the plan themselves; no
//! function here touches a store.
//!
//! Rules maintained:
//! - a classifier bound into a scenario diagram owns exactly one lifeline,
//!   and every scenario element binding it focuses that lifeline
//! - a lifeline exists only while some scenario element binds its owner
//! - focus references never dangle

use crate::errors::{ModelError, Result};
use crate::journal::Change;
use crate::model::{DiagramElement, DiagramType, Feature, FeatureType, Relationship, RowId};

/// Gap left between consecutive sibling list orders
pub const LIST_ORDER_STEP: i32 = 32768;

/// What a new scenario binding needs from the classifier's lifeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifelineAction {
    /// Not a scenario diagram; no lifeline involvement
    Keep,
    /// Focus this existing lifeline
    Reuse(RowId),
    /// Insert this lifeline draft, then focus it
    Create(Feature),
}

/// Plan for a diagram element about to be bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPlan {
    /// The element as it should be written; for `Create` the focus is set
    /// by the caller once the lifeline has an id
    pub element: DiagramElement,
    pub lifeline: LifelineAction,
}

/// List order placing a new feature after all existing ones
pub fn next_list_order(features: &[Feature]) -> i32 {
    features
        .iter()
        .map(|f| f.list_order)
        .max()
        .map_or(0, |max| max.saturating_add(LIST_ORDER_STEP))
}

/// The classifier's lifeline, lowest id first if several exist
pub fn find_lifeline(features: &[Feature]) -> Option<&Feature> {
    features
        .iter()
        .filter(|f| f.is_lifeline())
        .min_by_key(|f| f.id)
}

/// Plan binding `element` into a diagram of `diagram_type`
///
/// `classifier_features` are the current features of the bound classifier.
/// Non-scenario diagrams never carry a focus. Scenario diagrams reuse the
/// existing lifeline or create one placed after the existing features.
pub fn plan_element_create(
    diagram_type: DiagramType,
    element: &DiagramElement,
    classifier_features: &[Feature],
) -> ElementPlan {
    if !diagram_type.is_scenario() {
        return ElementPlan {
            element: element.with_focus(None),
            lifeline: LifelineAction::Keep,
        };
    }

    match find_lifeline(classifier_features) {
        Some(lifeline) => ElementPlan {
            element: element.with_focus(Some(lifeline.id)),
            lifeline: LifelineAction::Reuse(lifeline.id),
        },
        None => {
            let mut draft = Feature::new(element.classifier_id, FeatureType::Lifeline, "");
            draft.list_order = next_list_order(classifier_features);
            ElementPlan {
                element: element.with_focus(None),
                lifeline: LifelineAction::Create(draft),
            }
        }
    }
}

/// Decide whether unbinding `element` orphans its lifeline
///
/// `lifeline` is the current row behind the element's focus, `None` if it
/// is already gone (for instance deleted earlier in the same batch).
/// `remaining_scenario_bindings` counts the elements still binding the
/// classifier into scenario diagrams once this one is released. Returns
/// the lifeline to delete, if any.
pub fn plan_element_release(
    element: &DiagramElement,
    lifeline: Option<&Feature>,
    remaining_scenario_bindings: usize,
) -> Option<RowId> {
    let focused = element.focused_feature_id?;
    let lifeline = lifeline?;
    if lifeline.id != focused || !lifeline.is_lifeline() {
        return None;
    }
    (remaining_scenario_bindings == 0).then_some(lifeline.id)
}

/// Derived changes for deleting a lifeline directly
///
/// The delete is never blocked; every element focusing the lifeline gets
/// its focus cleared instead.
pub fn plan_lifeline_delete(lifeline: &Feature, focusing: &[DiagramElement]) -> Vec<Change> {
    focusing
        .iter()
        .filter(|e| e.focused_feature_id == Some(lifeline.id))
        .map(|e| Change::Update {
            before: e.clone().into(),
            after: e.with_focus(None).into(),
        })
        .collect()
}

/// Derived changes for deleting any feature
///
/// Clears focus references and removes relationships that attach to the
/// feature on either end.
pub fn plan_feature_delete(
    feature: &Feature,
    focusing: &[DiagramElement],
    relationships: &[Relationship],
) -> Vec<Change> {
    let mut changes = plan_lifeline_delete(feature, focusing);
    changes.extend(
        relationships
            .iter()
            .filter(|r| r.touches_feature(feature.id))
            .map(|r| Change::Delete {
                row: r.clone().into(),
            }),
    );
    changes
}

/// Lifelines are managed automatically; reject manual type edits
///
/// # Errors
///
/// `InvalidRequest` when either side of the change is a lifeline.
pub fn check_feature_type_change(old: FeatureType, new: FeatureType) -> Result<()> {
    if old == new {
        return Ok(());
    }
    if old == FeatureType::Lifeline || new == FeatureType::Lifeline {
        return Err(ModelError::invalid(
            "lifeline features are managed automatically; type cannot change to or from lifeline",
        ));
    }
    Ok(())
}

/// Validate a manual focus assignment
///
/// Elements of non-scenario diagrams accept only `None`; elements of
/// scenario diagrams accept only the lifeline owned by their classifier.
///
/// # Errors
///
/// `InvalidRequest` for any other target.
pub fn check_focus(
    element: &DiagramElement,
    diagram_type: DiagramType,
    target: Option<&Feature>,
) -> Result<()> {
    let Some(feature) = target else {
        if diagram_type.is_scenario() {
            return Err(ModelError::invalid(
                "elements of scenario diagrams must focus their lifeline",
            ));
        }
        return Ok(());
    };
    if !diagram_type.is_scenario() {
        return Err(ModelError::invalid(
            "only elements of scenario diagrams can focus a lifeline",
        ));
    }
    if !feature.is_lifeline() {
        return Err(ModelError::invalid(format!(
            "feature {} is not a lifeline",
            feature.id
        )));
    }
    if feature.classifier_id != element.classifier_id {
        return Err(ModelError::invalid(format!(
            "lifeline {} belongs to classifier {}, element binds {}",
            feature.id, feature.classifier_id, element.classifier_id
        )));
    }
    Ok(())
}

/// Names of classifiers and diagrams must not be blank
///
/// # Errors
///
/// `InvalidRequest` for empty or whitespace-only names.
pub fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        Err(ModelError::invalid("name must not be empty"))
    } else {
        Ok(())
    }
}
