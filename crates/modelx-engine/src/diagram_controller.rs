//! Diagram controller
//!
//! Diagrams and the diagram elements binding classifiers into them.
//! Element creation and deletion, and diagram type changes that cross the
//! scenario boundary, keep lifelines in step through `lifelines`.

use std::collections::BTreeSet;

use modelx_core::errors::{ModelError, Result};
use modelx_core::model::{Diagram, DiagramElement, DiagramType, Relationship, RowId, Table};
use modelx_core::policy;
use modelx_core::store::{Reader, Store};

use crate::lifelines;
use crate::tx::Batch;

// ---------------------------------------------------------------------------
// Diagrams
// ---------------------------------------------------------------------------

pub(crate) fn create_diagram<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    draft: Diagram,
) -> Result<RowId> {
    if !draft.id.is_void() {
        return Err(ModelError::invalid("diagram draft must not carry an id"));
    }
    policy::check_name(&draft.name)?;
    if let Some(parent_id) = draft.parent_id {
        batch.reader().get_diagram(parent_id)?;
    }
    batch.insert(draft.into())
}

fn update_diagram<S, F>(batch: &mut Batch<'_, S>, id: RowId, edit: F) -> Result<()>
where
    S: Store + ?Sized,
    F: FnOnce(&mut Diagram),
{
    let before = batch.reader().get_diagram(id)?;
    let mut after = before.clone();
    edit(&mut after);
    batch.update(before.into(), after.into())
}

pub(crate) fn update_diagram_name<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    name: &str,
) -> Result<()> {
    policy::check_name(name)?;
    update_diagram(batch, id, |d| d.name = name.to_string())
}

pub(crate) fn update_diagram_description<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    description: &str,
) -> Result<()> {
    update_diagram(batch, id, |d| d.description = description.to_string())
}

pub(crate) fn update_diagram_list_order<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    list_order: i32,
) -> Result<()> {
    update_diagram(batch, id, |d| d.list_order = list_order)
}

/// Move a diagram in the tree; moving below itself is rejected
pub(crate) fn update_diagram_parent_id<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    parent_id: Option<RowId>,
) -> Result<()> {
    batch.reader().get_diagram(id)?;
    let mut cursor = parent_id;
    let mut visited = BTreeSet::new();
    while let Some(ancestor) = cursor {
        if ancestor == id {
            return Err(ModelError::invalid(format!(
                "diagram {} cannot become a descendant of itself",
                id
            )));
        }
        if !visited.insert(ancestor) {
            break;
        }
        cursor = batch.reader().get_diagram(ancestor)?.parent_id;
    }
    update_diagram(batch, id, |d| d.parent_id = parent_id)
}

/// Change the diagram type, rebinding elements across the scenario boundary
///
/// Entering scenario: every element gets its classifier's lifeline, one
/// shared lifeline per classifier. Leaving scenario: every element loses
/// its focus and lifelines without remaining scenario bindings are deleted.
pub(crate) fn update_diagram_type<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    diagram_type: DiagramType,
) -> Result<()> {
    let before = batch.reader().get_diagram(id)?;
    let was_scenario = before.is_scenario();
    update_diagram(batch, id, |d| d.diagram_type = diagram_type)?;
    if was_scenario == diagram_type.is_scenario() {
        return Ok(());
    }

    let elements = batch
        .reader()
        .get_diagramelements_by_diagram_id(id)?
        .warn_if_truncated("update_diagram_type", Table::DiagramElement);
    for element in &elements {
        if diagram_type.is_scenario() {
            lifelines::bind_element(batch, diagram_type, element)?;
        } else {
            // re-read: an earlier element may have released a shared lifeline
            let current = batch.reader().get_diagramelement(element.id)?;
            lifelines::unfocus_element(batch, &current)?;
        }
    }
    Ok(())
}

/// Delete a leaf diagram and its elements
pub(crate) fn delete_diagram<S: Store + ?Sized>(batch: &mut Batch<'_, S>, id: RowId) -> Result<()> {
    let diagram = batch.reader().get_diagram(id)?;
    let children = batch.reader().get_diagram_ids_by_parent_id(Some(id))?;
    if !children.is_empty() {
        return Err(ModelError::invalid(format!(
            "diagram {} still has child diagrams",
            id
        )));
    }
    batch.delete(diagram.into())?;

    let elements = batch
        .reader()
        .get_diagramelements_by_diagram_id(id)?
        .warn_if_truncated("delete_diagram", Table::DiagramElement);
    lifelines::unbind_elements(batch, &elements)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Diagram elements
// ---------------------------------------------------------------------------

/// Bind a classifier into a diagram
///
/// Scenario diagrams focus the element on the classifier's lifeline,
/// creating it after the element when the classifier has none.
pub(crate) fn create_diagramelement<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    draft: DiagramElement,
) -> Result<RowId> {
    if !draft.id.is_void() {
        return Err(ModelError::invalid("diagram element draft must not carry an id"));
    }
    let diagram = batch.reader().get_diagram(draft.diagram_id)?;
    batch.reader().get_classifier(draft.classifier_id)?;

    let features = batch
        .reader()
        .get_features_by_classifier_id(draft.classifier_id)?
        .warn_if_truncated("create_diagramelement", Table::Feature);
    let plan = policy::plan_element_create(diagram.diagram_type, &draft, &features);

    let id = batch.insert(plan.element.into())?;
    let stored = batch.reader().get_diagramelement(id)?;
    lifelines::bind_element(batch, diagram.diagram_type, &stored)?;
    Ok(id)
}

pub(crate) fn delete_diagramelement<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
) -> Result<()> {
    let element = batch.reader().get_diagramelement(id)?;
    lifelines::unbind_element(batch, &element)
}

pub(crate) fn update_diagramelement_display_flags<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    display_flags: u32,
) -> Result<()> {
    let before = batch.reader().get_diagramelement(id)?;
    let mut after = before.clone();
    after.display_flags = display_flags;
    batch.update(before.into(), after.into())
}

pub(crate) fn update_diagramelement_focused_feature_id<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    focused_feature_id: Option<RowId>,
) -> Result<()> {
    let before = batch.reader().get_diagramelement(id)?;
    let diagram = batch.reader().get_diagram(before.diagram_id)?;
    let target = focused_feature_id
        .map(|fid| batch.reader().get_feature(fid))
        .transpose()?;
    policy::check_focus(&before, diagram.diagram_type, target.as_ref())?;
    let after = before.with_focus(focused_feature_id);
    batch.update(before.into(), after.into())
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Relationships with both endpoint classifiers bound into the diagram
///
/// A relationship with only one endpoint present is hidden.
pub(crate) fn visible_relationships<R: Reader + ?Sized>(
    reader: &R,
    diagram_id: RowId,
) -> Result<Vec<Relationship>> {
    reader.get_diagram(diagram_id)?;
    let bound: BTreeSet<RowId> = reader
        .get_diagramelements_by_diagram_id(diagram_id)?
        .warn_if_truncated("visible_relationships", Table::DiagramElement)
        .into_iter()
        .map(|e| e.classifier_id)
        .collect();

    let mut seen = BTreeSet::new();
    let mut visible = Vec::new();
    for classifier_id in &bound {
        let relationships = reader
            .get_relationships_by_classifier_id(*classifier_id)?
            .warn_if_truncated("visible_relationships", Table::Relationship);
        for r in relationships {
            if bound.contains(&r.from_classifier_id)
                && bound.contains(&r.to_classifier_id)
                && seen.insert(r.id)
            {
                visible.push(r);
            }
        }
    }
    visible.sort_by_key(|r| (r.list_order, r.id));
    Ok(visible)
}
