use std::collections::BTreeMap;

use crate::errors::{ModelError, Result};
use crate::model::{
    Classifier, Diagram, DiagramElement, Feature, Relationship, Row, RowId, Table,
};

use super::{ReadLimits, Reader, RowSet, Writer};

#[derive(Debug, Clone)]
struct Tables {
    diagrams: BTreeMap<RowId, Diagram>,
    classifiers: BTreeMap<RowId, Classifier>,
    features: BTreeMap<RowId, Feature>,
    relationships: BTreeMap<RowId, Relationship>,
    diagramelements: BTreeMap<RowId, DiagramElement>,
    next_id: i64,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            diagrams: BTreeMap::new(),
            classifiers: BTreeMap::new(),
            features: BTreeMap::new(),
            relationships: BTreeMap::new(),
            diagramelements: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Tables {
    fn allocate(&mut self, requested: RowId) -> RowId {
        if requested.is_void() {
            let id = RowId::new(self.next_id);
            self.next_id += 1;
            id
        } else {
            self.next_id = self.next_id.max(requested.get() + 1);
            requested
        }
    }

    fn contains(&self, table: Table, id: RowId) -> bool {
        match table {
            Table::Diagram => self.diagrams.contains_key(&id),
            Table::Classifier => self.classifiers.contains_key(&id),
            Table::Feature => self.features.contains_key(&id),
            Table::Relationship => self.relationships.contains_key(&id),
            Table::DiagramElement => self.diagramelements.contains_key(&id),
        }
    }

    fn put(&mut self, row: Row) {
        match row {
            Row::Diagram(r) => {
                self.diagrams.insert(r.id, r);
            }
            Row::Classifier(r) => {
                self.classifiers.insert(r.id, r);
            }
            Row::Feature(r) => {
                self.features.insert(r.id, r);
            }
            Row::Relationship(r) => {
                self.relationships.insert(r.id, r);
            }
            Row::DiagramElement(r) => {
                self.diagramelements.insert(r.id, r);
            }
        }
    }

    fn remove(&mut self, table: Table, id: RowId) -> bool {
        match table {
            Table::Diagram => self.diagrams.remove(&id).is_some(),
            Table::Classifier => self.classifiers.remove(&id).is_some(),
            Table::Feature => self.features.remove(&id).is_some(),
            Table::Relationship => self.relationships.remove(&id).is_some(),
            Table::DiagramElement => self.diagramelements.remove(&id).is_some(),
        }
    }
}

/// In-memory store
///
/// BTreeMap per table, single-threaded. A transaction snapshots all tables
/// on begin and restores the snapshot on rollback. Used by the engine
/// tests and by the CLI when no database file is given.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
    snapshot: Option<Tables>,
    limits: ReadLimits,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: ReadLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    fn ordered<T: Clone>(&self, mut rows: Vec<&T>, key: impl Fn(&T) -> (i32, RowId)) -> Vec<T> {
        rows.sort_by_key(|r| key(r));
        rows.into_iter().cloned().collect()
    }
}

impl Reader for MemoryStore {
    fn get_diagram(&self, id: RowId) -> Result<Diagram> {
        self.tables
            .diagrams
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::not_found(Table::Diagram, id))
    }

    fn get_diagram_by_uuid(&self, uuid: &str) -> Result<Diagram> {
        self.tables
            .diagrams
            .values()
            .find(|d| d.uuid == uuid)
            .cloned()
            .ok_or_else(|| ModelError::UuidNotFound {
                table: Table::Diagram,
                uuid: uuid.to_string(),
            })
    }

    fn get_diagrams_by_parent_id(&self, parent_id: Option<RowId>) -> Result<RowSet<Diagram>> {
        let matching = self
            .tables
            .diagrams
            .values()
            .filter(|d| d.parent_id == parent_id)
            .collect();
        let rows = self.ordered(matching, |d| (d.list_order, d.id));
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_diagram_ids_by_parent_id(&self, parent_id: Option<RowId>) -> Result<RowSet<RowId>> {
        let set = self.get_diagrams_by_parent_id(parent_id)?;
        Ok(RowSet {
            rows: set.rows.into_iter().map(|d| d.id).collect(),
            truncated: set.truncated,
        })
    }

    fn get_classifier(&self, id: RowId) -> Result<Classifier> {
        self.tables
            .classifiers
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::not_found(Table::Classifier, id))
    }

    fn get_classifier_by_name(&self, name: &str) -> Result<Option<Classifier>> {
        Ok(self
            .tables
            .classifiers
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    fn get_classifier_by_uuid(&self, uuid: &str) -> Result<Classifier> {
        self.tables
            .classifiers
            .values()
            .find(|c| c.uuid == uuid)
            .cloned()
            .ok_or_else(|| ModelError::UuidNotFound {
                table: Table::Classifier,
                uuid: uuid.to_string(),
            })
    }

    fn get_feature(&self, id: RowId) -> Result<Feature> {
        self.tables
            .features
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::not_found(Table::Feature, id))
    }

    fn get_features_by_classifier_id(&self, classifier_id: RowId) -> Result<RowSet<Feature>> {
        let matching = self
            .tables
            .features
            .values()
            .filter(|f| f.classifier_id == classifier_id)
            .collect();
        let rows = self.ordered(matching, |f| (f.list_order, f.id));
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_relationship(&self, id: RowId) -> Result<Relationship> {
        self.tables
            .relationships
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::not_found(Table::Relationship, id))
    }

    fn get_relationships_by_classifier_id(
        &self,
        classifier_id: RowId,
    ) -> Result<RowSet<Relationship>> {
        let matching = self
            .tables
            .relationships
            .values()
            .filter(|r| r.touches_classifier(classifier_id))
            .collect();
        let rows = self.ordered(matching, |r| (r.list_order, r.id));
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_relationships_by_feature_id(&self, feature_id: RowId) -> Result<RowSet<Relationship>> {
        let matching = self
            .tables
            .relationships
            .values()
            .filter(|r| r.touches_feature(feature_id))
            .collect();
        let rows = self.ordered(matching, |r| (r.list_order, r.id));
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_diagramelement(&self, id: RowId) -> Result<DiagramElement> {
        self.tables
            .diagramelements
            .get(&id)
            .cloned()
            .ok_or_else(|| ModelError::not_found(Table::DiagramElement, id))
    }

    fn get_diagramelements_by_diagram_id(
        &self,
        diagram_id: RowId,
    ) -> Result<RowSet<DiagramElement>> {
        let rows = self
            .tables
            .diagramelements
            .values()
            .filter(|e| e.diagram_id == diagram_id)
            .cloned()
            .collect();
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_diagramelements_by_classifier_id(
        &self,
        classifier_id: RowId,
    ) -> Result<RowSet<DiagramElement>> {
        let rows = self
            .tables
            .diagramelements
            .values()
            .filter(|e| e.classifier_id == classifier_id)
            .cloned()
            .collect();
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_diagramelements_by_focused_feature_id(
        &self,
        feature_id: RowId,
    ) -> Result<RowSet<DiagramElement>> {
        let rows = self
            .tables
            .diagramelements
            .values()
            .filter(|e| e.focused_feature_id == Some(feature_id))
            .cloned()
            .collect();
        Ok(RowSet::limited(rows, self.limits))
    }

    fn get_all_diagrams(&self) -> Result<Vec<Diagram>> {
        Ok(self.tables.diagrams.values().cloned().collect())
    }

    fn get_all_classifiers(&self) -> Result<Vec<Classifier>> {
        Ok(self.tables.classifiers.values().cloned().collect())
    }

    fn get_all_features(&self) -> Result<Vec<Feature>> {
        Ok(self.tables.features.values().cloned().collect())
    }

    fn get_all_relationships(&self) -> Result<Vec<Relationship>> {
        Ok(self.tables.relationships.values().cloned().collect())
    }

    fn get_all_diagramelements(&self) -> Result<Vec<DiagramElement>> {
        Ok(self.tables.diagramelements.values().cloned().collect())
    }

    fn count_rows(&self, table: Table) -> Result<usize> {
        Ok(match table {
            Table::Diagram => self.tables.diagrams.len(),
            Table::Classifier => self.tables.classifiers.len(),
            Table::Feature => self.tables.features.len(),
            Table::Relationship => self.tables.relationships.len(),
            Table::DiagramElement => self.tables.diagramelements.len(),
        })
    }
}

impl Writer for MemoryStore {
    fn insert_row(&mut self, row: &Row) -> Result<RowId> {
        let table = row.table();
        if !row.id().is_void() && self.tables.contains(table, row.id()) {
            return Err(ModelError::storage(
                "insert_row",
                format!("{} {} already exists", table, row.id()),
            ));
        }
        let id = self.tables.allocate(row.id());
        self.tables.put(row.clone().with_id(id));
        Ok(id)
    }

    fn update_row(&mut self, row: &Row) -> Result<()> {
        let table = row.table();
        if !self.tables.contains(table, row.id()) {
            return Err(ModelError::not_found(table, row.id()));
        }
        self.tables.put(row.clone());
        Ok(())
    }

    fn delete_row(&mut self, table: Table, id: RowId) -> Result<()> {
        if self.tables.remove(table, id) {
            Ok(())
        } else {
            Err(ModelError::not_found(table, id))
        }
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(ModelError::storage(
                "begin_transaction",
                "transaction already open",
            ));
        }
        self.snapshot = Some(self.tables.clone());
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or_else(|| ModelError::storage("commit_transaction", "no open transaction"))
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| ModelError::storage("rollback_transaction", "no open transaction"))?;
        self.tables = snapshot;
        Ok(())
    }
}
