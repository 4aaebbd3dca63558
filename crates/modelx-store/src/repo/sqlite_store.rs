//! SQLite implementation of the store contracts

use std::path::Path;

use modelx_core::config::StoreConfig;
use modelx_core::errors::ModelError;
use modelx_core::model::{
    Classifier, Diagram, DiagramElement, Feature, Relationship, Row, RowId, Table,
};
use modelx_core::store::{ReadLimits, Reader, RowSet, Writer};
use rusqlite::{params, Connection, OptionalExtension, Params};

use super::hydration::{
    classifier_from_row, diagram_from_row, diagramelement_from_row, feature_from_row,
    relationship_from_row, table_name, CLASSIFIER_COLUMNS, DIAGRAMELEMENT_COLUMNS,
    DIAGRAM_COLUMNS, FEATURE_COLUMNS, RELATIONSHIP_COLUMNS,
};
use crate::db;
use crate::errors::{from_rusqlite, is_duplicate_name, Result};
use crate::migrations::apply_migrations;

type Mapper<T> = fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>;

/// Store backed by one SQLite connection
///
/// Transactions are explicit `BEGIN` / `COMMIT` / `ROLLBACK` statements on
/// the connection; outside a transaction every write autocommits.
pub struct SqliteStore {
    conn: Connection,
    limits: ReadLimits,
}

impl SqliteStore {
    /// Open (or create) a model file and bring its schema up to date
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn, config.wal)?;
        Self::from_connection(conn, config.read_limits())
    }

    /// Open a fresh in-memory model
    ///
    /// # Errors
    ///
    /// Fails if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?, ReadLimits::default())
    }

    /// Wrap an existing connection, applying pending migrations
    ///
    /// # Errors
    ///
    /// Fails if a migration fails or a checksum no longer matches.
    pub fn from_connection(mut conn: Connection, limits: ReadLimits) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self { conn, limits })
    }

    pub fn with_limits(mut self, limits: ReadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// SQL `LIMIT` that fetches one row past the configured maximum
    fn fetch_limit(&self) -> i64 {
        self.limits
            .max_rows_per_query
            .map_or(-1, |max| i64::try_from(max).map_or(i64::MAX, |m| m.saturating_add(1)))
    }

    fn query_one<T, P: Params>(&self, sql: &str, params: P, map: Mapper<T>) -> Result<Option<T>> {
        self.conn
            .query_row(sql, params, map)
            .optional()
            .map_err(from_rusqlite)
    }

    fn query_all<T, P: Params>(&self, sql: &str, params: P, map: Mapper<T>) -> Result<Vec<T>> {
        let mut stmt = self.conn.prepare_cached(sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params, map)
            .map_err(from_rusqlite)?
            .collect::<rusqlite::Result<Vec<T>>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    fn query_limited<T, P: Params>(&self, sql: &str, params: P, map: Mapper<T>) -> Result<RowSet<T>> {
        let rows = self.query_all(sql, params, map)?;
        Ok(RowSet::limited(rows, self.limits))
    }

    fn by_id<T>(&self, table: Table, columns: &str, id: RowId, map: Mapper<T>) -> Result<T> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            columns,
            table_name(table)
        );
        self.query_one(&sql, [id.get()], map)?
            .ok_or_else(|| ModelError::not_found(table, id))
    }

    fn by_uuid<T>(&self, table: Table, columns: &str, uuid: &str, map: Mapper<T>) -> Result<T> {
        let sql = format!(
            "SELECT {} FROM {} WHERE uuid = ?1",
            columns,
            table_name(table)
        );
        self.query_one(&sql, [uuid], map)?
            .ok_or_else(|| ModelError::UuidNotFound {
                table,
                uuid: uuid.to_string(),
            })
    }

    fn scan<T>(&self, table: Table, columns: &str, map: Mapper<T>) -> Result<Vec<T>> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", columns, table_name(table));
        self.query_all(&sql, [], map)
    }

    fn write_error(err: rusqlite::Error, row: &Row) -> ModelError {
        match row {
            Row::Classifier(c) if is_duplicate_name(&err) => ModelError::DuplicateName {
                name: c.name.clone(),
            },
            _ => from_rusqlite(err),
        }
    }
}

fn opt(id: Option<RowId>) -> Option<i64> {
    id.map(RowId::get)
}

impl Reader for SqliteStore {
    fn get_diagram(&self, id: RowId) -> Result<Diagram> {
        self.by_id(Table::Diagram, DIAGRAM_COLUMNS, id, diagram_from_row)
    }

    fn get_diagram_by_uuid(&self, uuid: &str) -> Result<Diagram> {
        self.by_uuid(Table::Diagram, DIAGRAM_COLUMNS, uuid, diagram_from_row)
    }

    fn get_diagrams_by_parent_id(&self, parent_id: Option<RowId>) -> Result<RowSet<Diagram>> {
        let sql = format!(
            "SELECT {} FROM diagrams WHERE parent_id IS ?1 ORDER BY list_order, id LIMIT ?2",
            DIAGRAM_COLUMNS
        );
        self.query_limited(&sql, params![opt(parent_id), self.fetch_limit()], diagram_from_row)
    }

    fn get_diagram_ids_by_parent_id(&self, parent_id: Option<RowId>) -> Result<RowSet<RowId>> {
        self.query_limited(
            "SELECT id FROM diagrams WHERE parent_id IS ?1 ORDER BY list_order, id LIMIT ?2",
            params![opt(parent_id), self.fetch_limit()],
            |row| row.get::<_, i64>(0).map(RowId::new),
        )
    }

    fn get_classifier(&self, id: RowId) -> Result<Classifier> {
        self.by_id(Table::Classifier, CLASSIFIER_COLUMNS, id, classifier_from_row)
    }

    fn get_classifier_by_name(&self, name: &str) -> Result<Option<Classifier>> {
        let sql = format!("SELECT {} FROM classifiers WHERE name = ?1", CLASSIFIER_COLUMNS);
        self.query_one(&sql, [name], classifier_from_row)
    }

    fn get_classifier_by_uuid(&self, uuid: &str) -> Result<Classifier> {
        self.by_uuid(Table::Classifier, CLASSIFIER_COLUMNS, uuid, classifier_from_row)
    }

    fn get_feature(&self, id: RowId) -> Result<Feature> {
        self.by_id(Table::Feature, FEATURE_COLUMNS, id, feature_from_row)
    }

    fn get_features_by_classifier_id(&self, classifier_id: RowId) -> Result<RowSet<Feature>> {
        let sql = format!(
            "SELECT {} FROM features WHERE classifier_id = ?1 ORDER BY list_order, id LIMIT ?2",
            FEATURE_COLUMNS
        );
        self.query_limited(
            &sql,
            params![classifier_id.get(), self.fetch_limit()],
            feature_from_row,
        )
    }

    fn get_relationship(&self, id: RowId) -> Result<Relationship> {
        self.by_id(Table::Relationship, RELATIONSHIP_COLUMNS, id, relationship_from_row)
    }

    fn get_relationships_by_classifier_id(
        &self,
        classifier_id: RowId,
    ) -> Result<RowSet<Relationship>> {
        let sql = format!(
            "SELECT {} FROM relationships \
             WHERE from_classifier_id = ?1 OR to_classifier_id = ?1 \
             ORDER BY list_order, id LIMIT ?2",
            RELATIONSHIP_COLUMNS
        );
        self.query_limited(
            &sql,
            params![classifier_id.get(), self.fetch_limit()],
            relationship_from_row,
        )
    }

    fn get_relationships_by_feature_id(&self, feature_id: RowId) -> Result<RowSet<Relationship>> {
        let sql = format!(
            "SELECT {} FROM relationships \
             WHERE from_feature_id = ?1 OR to_feature_id = ?1 \
             ORDER BY list_order, id LIMIT ?2",
            RELATIONSHIP_COLUMNS
        );
        self.query_limited(
            &sql,
            params![feature_id.get(), self.fetch_limit()],
            relationship_from_row,
        )
    }

    fn get_diagramelement(&self, id: RowId) -> Result<DiagramElement> {
        self.by_id(
            Table::DiagramElement,
            DIAGRAMELEMENT_COLUMNS,
            id,
            diagramelement_from_row,
        )
    }

    fn get_diagramelements_by_diagram_id(
        &self,
        diagram_id: RowId,
    ) -> Result<RowSet<DiagramElement>> {
        let sql = format!(
            "SELECT {} FROM diagramelements WHERE diagram_id = ?1 ORDER BY id LIMIT ?2",
            DIAGRAMELEMENT_COLUMNS
        );
        self.query_limited(
            &sql,
            params![diagram_id.get(), self.fetch_limit()],
            diagramelement_from_row,
        )
    }

    fn get_diagramelements_by_classifier_id(
        &self,
        classifier_id: RowId,
    ) -> Result<RowSet<DiagramElement>> {
        let sql = format!(
            "SELECT {} FROM diagramelements WHERE classifier_id = ?1 ORDER BY id LIMIT ?2",
            DIAGRAMELEMENT_COLUMNS
        );
        self.query_limited(
            &sql,
            params![classifier_id.get(), self.fetch_limit()],
            diagramelement_from_row,
        )
    }

    fn get_diagramelements_by_focused_feature_id(
        &self,
        feature_id: RowId,
    ) -> Result<RowSet<DiagramElement>> {
        let sql = format!(
            "SELECT {} FROM diagramelements WHERE focused_feature_id = ?1 ORDER BY id LIMIT ?2",
            DIAGRAMELEMENT_COLUMNS
        );
        self.query_limited(
            &sql,
            params![feature_id.get(), self.fetch_limit()],
            diagramelement_from_row,
        )
    }

    fn get_all_diagrams(&self) -> Result<Vec<Diagram>> {
        self.scan(Table::Diagram, DIAGRAM_COLUMNS, diagram_from_row)
    }

    fn get_all_classifiers(&self) -> Result<Vec<Classifier>> {
        self.scan(Table::Classifier, CLASSIFIER_COLUMNS, classifier_from_row)
    }

    fn get_all_features(&self) -> Result<Vec<Feature>> {
        self.scan(Table::Feature, FEATURE_COLUMNS, feature_from_row)
    }

    fn get_all_relationships(&self) -> Result<Vec<Relationship>> {
        self.scan(Table::Relationship, RELATIONSHIP_COLUMNS, relationship_from_row)
    }

    fn get_all_diagramelements(&self) -> Result<Vec<DiagramElement>> {
        self.scan(
            Table::DiagramElement,
            DIAGRAMELEMENT_COLUMNS,
            diagramelement_from_row,
        )
    }

    fn count_rows(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table_name(table));
        let count: i64 = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(from_rusqlite)?;
        usize::try_from(count).map_err(|e| ModelError::Internal {
            message: e.to_string(),
        })
    }
}

impl Writer for SqliteStore {
    fn insert_row(&mut self, row: &Row) -> Result<RowId> {
        let id = opt(row.id().as_option());
        let result = match row {
            Row::Diagram(d) => self.conn.execute(
                &format!(
                    "INSERT INTO diagrams ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    DIAGRAM_COLUMNS
                ),
                params![
                    id,
                    opt(d.parent_id),
                    d.diagram_type.code(),
                    d.name,
                    d.description,
                    d.list_order,
                    d.flags,
                    d.uuid
                ],
            ),
            Row::Classifier(c) => self.conn.execute(
                &format!(
                    "INSERT INTO classifiers ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    CLASSIFIER_COLUMNS
                ),
                params![
                    id,
                    c.main_type.code(),
                    c.stereotype,
                    c.name,
                    c.description,
                    c.x_order,
                    c.y_order,
                    c.list_order,
                    c.uuid
                ],
            ),
            Row::Feature(f) => self.conn.execute(
                &format!(
                    "INSERT INTO features ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    FEATURE_COLUMNS
                ),
                params![
                    id,
                    f.classifier_id.get(),
                    f.main_type.code(),
                    f.key,
                    f.value,
                    f.description,
                    f.list_order,
                    f.uuid
                ],
            ),
            Row::Relationship(r) => self.conn.execute(
                &format!(
                    "INSERT INTO relationships ({}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    RELATIONSHIP_COLUMNS
                ),
                params![
                    id,
                    r.main_type.code(),
                    r.from_classifier_id.get(),
                    opt(r.from_feature_id),
                    r.to_classifier_id.get(),
                    opt(r.to_feature_id),
                    r.name,
                    r.description,
                    r.list_order,
                    r.uuid
                ],
            ),
            Row::DiagramElement(e) => self.conn.execute(
                &format!(
                    "INSERT INTO diagramelements ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    DIAGRAMELEMENT_COLUMNS
                ),
                params![
                    id,
                    e.diagram_id.get(),
                    e.classifier_id.get(),
                    e.display_flags,
                    opt(e.focused_feature_id),
                    e.uuid
                ],
            ),
        };
        result.map_err(|err| Self::write_error(err, row))?;
        Ok(RowId::new(self.conn.last_insert_rowid()))
    }

    fn update_row(&mut self, row: &Row) -> Result<()> {
        let id = row.id().get();
        let result = match row {
            Row::Diagram(d) => self.conn.execute(
                "UPDATE diagrams SET parent_id = ?2, diagram_type = ?3, name = ?4, \
                 description = ?5, list_order = ?6, flags = ?7, uuid = ?8 WHERE id = ?1",
                params![
                    id,
                    opt(d.parent_id),
                    d.diagram_type.code(),
                    d.name,
                    d.description,
                    d.list_order,
                    d.flags,
                    d.uuid
                ],
            ),
            Row::Classifier(c) => self.conn.execute(
                "UPDATE classifiers SET main_type = ?2, stereotype = ?3, name = ?4, \
                 description = ?5, x_order = ?6, y_order = ?7, list_order = ?8, uuid = ?9 \
                 WHERE id = ?1",
                params![
                    id,
                    c.main_type.code(),
                    c.stereotype,
                    c.name,
                    c.description,
                    c.x_order,
                    c.y_order,
                    c.list_order,
                    c.uuid
                ],
            ),
            Row::Feature(f) => self.conn.execute(
                "UPDATE features SET classifier_id = ?2, main_type = ?3, feature_key = ?4, \
                 feature_value = ?5, description = ?6, list_order = ?7, uuid = ?8 WHERE id = ?1",
                params![
                    id,
                    f.classifier_id.get(),
                    f.main_type.code(),
                    f.key,
                    f.value,
                    f.description,
                    f.list_order,
                    f.uuid
                ],
            ),
            Row::Relationship(r) => self.conn.execute(
                "UPDATE relationships SET main_type = ?2, from_classifier_id = ?3, \
                 from_feature_id = ?4, to_classifier_id = ?5, to_feature_id = ?6, name = ?7, \
                 description = ?8, list_order = ?9, uuid = ?10 WHERE id = ?1",
                params![
                    id,
                    r.main_type.code(),
                    r.from_classifier_id.get(),
                    opt(r.from_feature_id),
                    r.to_classifier_id.get(),
                    opt(r.to_feature_id),
                    r.name,
                    r.description,
                    r.list_order,
                    r.uuid
                ],
            ),
            Row::DiagramElement(e) => self.conn.execute(
                "UPDATE diagramelements SET diagram_id = ?2, classifier_id = ?3, \
                 display_flags = ?4, focused_feature_id = ?5, uuid = ?6 WHERE id = ?1",
                params![
                    id,
                    e.diagram_id.get(),
                    e.classifier_id.get(),
                    e.display_flags,
                    opt(e.focused_feature_id),
                    e.uuid
                ],
            ),
        };
        let changed = result.map_err(|err| Self::write_error(err, row))?;
        if changed == 0 {
            return Err(ModelError::not_found(row.table(), row.id()));
        }
        Ok(())
    }

    fn delete_row(&mut self, table: Table, id: RowId) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table_name(table));
        let changed = self
            .conn
            .execute(&sql, [id.get()])
            .map_err(from_rusqlite)?;
        if changed == 0 {
            return Err(ModelError::not_found(table, id));
        }
        Ok(())
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction() {
            return Err(ModelError::storage(
                "begin_transaction",
                "transaction already open",
            ));
        }
        self.conn.execute_batch("BEGIN").map_err(from_rusqlite)
    }

    fn commit_transaction(&mut self) -> Result<()> {
        if !self.in_transaction() {
            return Err(ModelError::storage("commit_transaction", "no open transaction"));
        }
        self.conn.execute_batch("COMMIT").map_err(from_rusqlite)
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        if !self.in_transaction() {
            return Err(ModelError::storage(
                "rollback_transaction",
                "no open transaction",
            ));
        }
        self.conn.execute_batch("ROLLBACK").map_err(from_rusqlite)
    }
}
