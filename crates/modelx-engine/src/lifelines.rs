//! Lifeline maintenance shared by both controllers
//!
//! Each helper reads fresh state through the batch, asks the policy for a
//! plan and applies it. Callers write the triggering change first, so the
//! derived changes always follow it in the journal.

use modelx_core::errors::Result;
use modelx_core::model::{DiagramElement, DiagramType, Feature, RowId, Table};
use modelx_core::policy::{self, LifelineAction};
use modelx_core::store::{Reader, Store};

use crate::tx::Batch;

/// Look up a feature, treating a missing row as `None`
pub(crate) fn find_feature<R: Reader + ?Sized>(reader: &R, id: RowId) -> Result<Option<Feature>> {
    match reader.get_feature(id) {
        Ok(feature) => Ok(Some(feature)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Elements binding `classifier_id` into existing scenario diagrams
pub(crate) fn scenario_bindings<R: Reader + ?Sized>(
    reader: &R,
    classifier_id: RowId,
    excluding: RowId,
) -> Result<usize> {
    let elements = reader
        .get_diagramelements_by_classifier_id(classifier_id)?
        .warn_if_truncated("scenario_bindings", Table::DiagramElement);
    let mut count = 0;
    for element in elements.iter().filter(|e| e.id != excluding) {
        match reader.get_diagram(element.diagram_id) {
            Ok(diagram) if diagram.is_scenario() => count += 1,
            Ok(_) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
    }
    Ok(count)
}

/// Focus a stored element on its classifier's lifeline
///
/// Reuses the lifeline if the classifier owns one, otherwise inserts a
/// new one after the existing features. Non-scenario diagrams get their
/// focus cleared instead.
pub(crate) fn bind_element<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    diagram_type: DiagramType,
    element: &DiagramElement,
) -> Result<()> {
    let features = batch
        .reader()
        .get_features_by_classifier_id(element.classifier_id)?
        .warn_if_truncated("bind_element", Table::Feature);
    let plan = policy::plan_element_create(diagram_type, element, &features);

    let focus = match plan.lifeline {
        LifelineAction::Keep => None,
        LifelineAction::Reuse(id) => Some(id),
        LifelineAction::Create(draft) => {
            let id = batch.insert(draft.into())?;
            tracing::debug!(
                component = module_path!(),
                classifier_id = element.classifier_id.get(),
                feature_id = id.get(),
                "created lifeline"
            );
            Some(id)
        }
    };
    batch.update(element.clone().into(), element.with_focus(focus).into())
}

/// Delete a feature and everything that references it
///
/// Focus references are cleared and relationships attached to the
/// feature are removed, after the feature itself.
pub(crate) fn delete_feature<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    feature: &Feature,
) -> Result<()> {
    batch.delete(feature.clone().into())?;

    let focusing = batch
        .reader()
        .get_diagramelements_by_focused_feature_id(feature.id)?
        .warn_if_truncated("delete_feature", Table::DiagramElement);
    let relationships = batch
        .reader()
        .get_relationships_by_feature_id(feature.id)?
        .warn_if_truncated("delete_feature", Table::Relationship);

    for change in policy::plan_feature_delete(feature, &focusing, &relationships) {
        batch.apply(change)?;
    }
    Ok(())
}

/// Drop the lifeline `element` focused if no scenario binding is left
///
/// Call after the element was deleted or unfocused, or after its diagram
/// stopped being a scenario diagram.
pub(crate) fn release_element<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    element: &DiagramElement,
) -> Result<()> {
    let Some(focus) = element.focused_feature_id else {
        return Ok(());
    };
    let lifeline = find_feature(batch.reader(), focus)?;
    let remaining = scenario_bindings(batch.reader(), element.classifier_id, element.id)?;

    let orphaned = policy::plan_element_release(element, lifeline.as_ref(), remaining);
    if let (Some(_), Some(orphan)) = (orphaned, lifeline) {
        tracing::debug!(
            component = module_path!(),
            classifier_id = element.classifier_id.get(),
            feature_id = orphan.id.get(),
            "deleting orphaned lifeline"
        );
        delete_feature(batch, &orphan)?;
    }
    Ok(())
}

/// Delete an element, then release its lifeline
pub(crate) fn unbind_element<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    element: &DiagramElement,
) -> Result<()> {
    batch.delete(element.clone().into())?;
    release_element(batch, element)
}

/// Delete several elements, then release their lifelines
///
/// All deletes come first so a lifeline shared by the elements is dropped
/// once, without clearing the focus of rows that are about to go anyway.
pub(crate) fn unbind_elements<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    elements: &[DiagramElement],
) -> Result<()> {
    for element in elements {
        batch.delete(element.clone().into())?;
    }
    for element in elements {
        release_element(batch, element)?;
    }
    Ok(())
}

/// Clear an element's focus, then release its lifeline
pub(crate) fn unfocus_element<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    element: &DiagramElement,
) -> Result<()> {
    batch.update(element.clone().into(), element.with_focus(None).into())?;
    release_element(batch, element)
}
