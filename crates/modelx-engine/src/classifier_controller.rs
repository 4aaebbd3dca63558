//! Classifier controller
//!
//! Classifiers, their features and the relationships between them. Every
//! function runs inside a `Batch` opened by the facade, so a failure at
//! any step discards the whole operation.

use modelx_core::errors::{ModelError, Result};
use modelx_core::model::{
    Classifier, ClassifierType, Feature, FeatureType, Relationship, RelationshipType, RowId, Table,
};
use modelx_core::policy;
use modelx_core::store::{Reader, Store};

use crate::lifelines;
use crate::tx::Batch;

// ---------------------------------------------------------------------------
// Classifiers
// ---------------------------------------------------------------------------

fn check_unique_name<R: Reader + ?Sized>(reader: &R, name: &str, owner: RowId) -> Result<()> {
    policy::check_name(name)?;
    match reader.get_classifier_by_name(name)? {
        Some(existing) if existing.id != owner => Err(ModelError::DuplicateName {
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn create_classifier<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    draft: Classifier,
) -> Result<RowId> {
    if !draft.id.is_void() {
        return Err(ModelError::invalid("classifier draft must not carry an id"));
    }
    check_unique_name(batch.reader(), &draft.name, RowId::VOID)?;
    batch.insert(draft.into())
}

fn update_classifier<S, F>(batch: &mut Batch<'_, S>, id: RowId, edit: F) -> Result<()>
where
    S: Store + ?Sized,
    F: FnOnce(&mut Classifier),
{
    let before = batch.reader().get_classifier(id)?;
    let mut after = before.clone();
    edit(&mut after);
    batch.update(before.into(), after.into())
}

pub(crate) fn update_classifier_name<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    name: &str,
) -> Result<()> {
    // existence first, so a missing row reports NotFound rather than a name clash
    batch.reader().get_classifier(id)?;
    check_unique_name(batch.reader(), name, id)?;
    update_classifier(batch, id, |c| c.name = name.to_string())
}

pub(crate) fn update_classifier_stereotype<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    stereotype: &str,
) -> Result<()> {
    update_classifier(batch, id, |c| c.stereotype = stereotype.to_string())
}

pub(crate) fn update_classifier_description<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    description: &str,
) -> Result<()> {
    update_classifier(batch, id, |c| c.description = description.to_string())
}

pub(crate) fn update_classifier_main_type<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    main_type: ClassifierType,
) -> Result<()> {
    update_classifier(batch, id, |c| c.main_type = main_type)
}

pub(crate) fn update_classifier_x_order<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    x_order: i32,
) -> Result<()> {
    update_classifier(batch, id, |c| c.x_order = x_order)
}

pub(crate) fn update_classifier_y_order<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    y_order: i32,
) -> Result<()> {
    update_classifier(batch, id, |c| c.y_order = y_order)
}

pub(crate) fn update_classifier_list_order<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    list_order: i32,
) -> Result<()> {
    update_classifier(batch, id, |c| c.list_order = list_order)
}

/// Delete a classifier with everything that hangs off it
///
/// Order: the classifier, then its diagram elements, then the lifelines
/// they released, then its remaining features, then relationships
/// touching it.
pub(crate) fn delete_classifier<S: Store + ?Sized>(batch: &mut Batch<'_, S>, id: RowId) -> Result<()> {
    let classifier = batch.reader().get_classifier(id)?;
    batch.delete(classifier.into())?;

    let elements = batch
        .reader()
        .get_diagramelements_by_classifier_id(id)?
        .warn_if_truncated("delete_classifier", Table::DiagramElement);
    lifelines::unbind_elements(batch, &elements)?;

    let features = batch
        .reader()
        .get_features_by_classifier_id(id)?
        .warn_if_truncated("delete_classifier", Table::Feature);
    for feature in &features {
        // releasing an element may already have removed the lifeline
        if lifelines::find_feature(batch.reader(), feature.id)?.is_some() {
            lifelines::delete_feature(batch, feature)?;
        }
    }

    let relationships = batch
        .reader()
        .get_relationships_by_classifier_id(id)?
        .warn_if_truncated("delete_classifier", Table::Relationship);
    for relationship in relationships {
        batch.delete(relationship.into())?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

pub(crate) fn create_feature<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    classifier_id: RowId,
    mut draft: Feature,
) -> Result<RowId> {
    if !draft.id.is_void() {
        return Err(ModelError::invalid("feature draft must not carry an id"));
    }
    if draft.is_lifeline() {
        return Err(ModelError::invalid(
            "lifeline features are created automatically by scenario diagrams",
        ));
    }
    batch.reader().get_classifier(classifier_id)?;
    draft.classifier_id = classifier_id;
    batch.insert(draft.into())
}

fn update_feature<S, F>(batch: &mut Batch<'_, S>, id: RowId, edit: F) -> Result<()>
where
    S: Store + ?Sized,
    F: FnOnce(&mut Feature),
{
    let before = batch.reader().get_feature(id)?;
    let mut after = before.clone();
    edit(&mut after);
    batch.update(before.into(), after.into())
}

pub(crate) fn update_feature_key<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    key: &str,
) -> Result<()> {
    update_feature(batch, id, |f| f.key = key.to_string())
}

pub(crate) fn update_feature_value<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    value: &str,
) -> Result<()> {
    update_feature(batch, id, |f| f.value = value.to_string())
}

pub(crate) fn update_feature_description<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    description: &str,
) -> Result<()> {
    update_feature(batch, id, |f| f.description = description.to_string())
}

pub(crate) fn update_feature_main_type<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    main_type: FeatureType,
) -> Result<()> {
    let current = batch.reader().get_feature(id)?;
    policy::check_feature_type_change(current.main_type, main_type)?;
    update_feature(batch, id, |f| f.main_type = main_type)
}

pub(crate) fn update_feature_list_order<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    list_order: i32,
) -> Result<()> {
    update_feature(batch, id, |f| f.list_order = list_order)
}

/// Delete a feature; a lifeline is removed even while elements focus it
pub(crate) fn delete_feature<S: Store + ?Sized>(batch: &mut Batch<'_, S>, id: RowId) -> Result<()> {
    let feature = batch.reader().get_feature(id)?;
    lifelines::delete_feature(batch, &feature)
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

fn check_endpoint<R: Reader + ?Sized>(
    reader: &R,
    classifier_id: RowId,
    feature_id: Option<RowId>,
) -> Result<()> {
    reader.get_classifier(classifier_id)?;
    if let Some(feature_id) = feature_id {
        let feature = reader.get_feature(feature_id)?;
        if feature.classifier_id != classifier_id {
            return Err(ModelError::invalid(format!(
                "feature {} belongs to classifier {}, not {}",
                feature_id, feature.classifier_id, classifier_id
            )));
        }
    }
    Ok(())
}

pub(crate) fn create_relationship<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    draft: Relationship,
) -> Result<RowId> {
    if !draft.id.is_void() {
        return Err(ModelError::invalid("relationship draft must not carry an id"));
    }
    check_endpoint(batch.reader(), draft.from_classifier_id, draft.from_feature_id)?;
    check_endpoint(batch.reader(), draft.to_classifier_id, draft.to_feature_id)?;
    batch.insert(draft.into())
}

fn update_relationship<S, F>(batch: &mut Batch<'_, S>, id: RowId, edit: F) -> Result<()>
where
    S: Store + ?Sized,
    F: FnOnce(&mut Relationship),
{
    let before = batch.reader().get_relationship(id)?;
    let mut after = before.clone();
    edit(&mut after);
    batch.update(before.into(), after.into())
}

pub(crate) fn update_relationship_name<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    name: &str,
) -> Result<()> {
    update_relationship(batch, id, |r| r.name = name.to_string())
}

pub(crate) fn update_relationship_description<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    description: &str,
) -> Result<()> {
    update_relationship(batch, id, |r| r.description = description.to_string())
}

pub(crate) fn update_relationship_main_type<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    main_type: RelationshipType,
) -> Result<()> {
    update_relationship(batch, id, |r| r.main_type = main_type)
}

pub(crate) fn update_relationship_list_order<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
    list_order: i32,
) -> Result<()> {
    update_relationship(batch, id, |r| r.list_order = list_order)
}

pub(crate) fn delete_relationship<S: Store + ?Sized>(
    batch: &mut Batch<'_, S>,
    id: RowId,
) -> Result<()> {
    let relationship = batch.reader().get_relationship(id)?;
    batch.delete(relationship.into())
}
