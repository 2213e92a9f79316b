//! # Store Actor
//!
//! The `StoreActor` is the server half of the store. It owns every table and
//! processes [`StoreRequest`]s sequentially, so no table is ever touched by
//! two requests at once.
//!
//! ## Operations
//!
//! * **Insert**: takes the client id or generates the next free one, checks
//!   required attributes and link targets, then stores the record.
//! * **Get**: clones the record out, or `None`.
//! * **Update**: merges `attributes` and applies `links` / `relationships`.
//!   Nulling a required attribute fails with a NOT NULL error.
//! * **Remove**: deletes the record and clears links that pointed at it.
//! * **Find**: equality filters (values within one key are OR-ed), sort keys
//!   and sparse fieldsets.
//! * **Related**: follows a named relation and applies the same query rules
//!   to whatever is on the other side.

use super::client::StoreClient;
use super::error::StoreError;
use super::message::StoreRequest;
use crate::model::{compare_values, link_target, schemas, Cardinality, Record, Relation, Schema};
use jsonapi_handler::{Direction, PrimaryData, Query};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct Table {
    rows: BTreeMap<String, Record>,
    next_id: u64,
}

pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    schemas: HashMap<&'static str, Schema>,
    tables: HashMap<&'static str, Table>,
}

impl StoreActor {
    /// Creates the actor for the sample schemas and a client to reach it.
    ///
    /// `buffer_size` bounds the request channel; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let schemas: HashMap<_, _> = schemas().into_iter().map(|s| (s.type_name, s)).collect();
        let tables = schemas.keys().map(|name| (*name, Table::default())).collect();
        let actor = Self {
            receiver,
            schemas,
            tables,
        };
        (actor, StoreClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        info!(tables = self.tables.len(), "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Get {
                    type_name,
                    id,
                    respond_to,
                } => {
                    let result = self.table(&type_name).map(|t| t.rows.get(&id).cloned());
                    debug!(%type_name, %id, found = matches!(result, Ok(Some(_))), "Get");
                    let _ = respond_to.send(result);
                }
                StoreRequest::Insert {
                    type_name,
                    data,
                    respond_to,
                } => {
                    debug!(%type_name, ?data, "Insert");
                    let result = self.insert(&type_name, &data);
                    log_outcome(&type_name, "Insert", &result);
                    let _ = respond_to.send(result);
                }
                StoreRequest::Update {
                    type_name,
                    id,
                    data,
                    respond_to,
                } => {
                    debug!(%type_name, %id, ?data, "Update");
                    let result = self.update(&type_name, &id, &data);
                    log_outcome(&type_name, "Update", &result);
                    let _ = respond_to.send(result);
                }
                StoreRequest::Remove {
                    type_name,
                    id,
                    respond_to,
                } => {
                    debug!(%type_name, %id, "Remove");
                    let result = self.remove(&type_name, &id);
                    log_outcome(&type_name, "Remove", &result);
                    let _ = respond_to.send(result);
                }
                StoreRequest::Find {
                    type_name,
                    query,
                    respond_to,
                } => {
                    let result = self.find(&type_name, &query);
                    if let Ok(rows) = &result {
                        debug!(%type_name, count = rows.len(), "Find");
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Related {
                    type_name,
                    id,
                    relation,
                    query,
                    respond_to,
                } => {
                    debug!(%type_name, %id, %relation, "Related");
                    let result = self.related(&type_name, &id, &relation, &query);
                    log_outcome(&type_name, "Related", &result);
                    let _ = respond_to.send(result);
                }
            }
        }

        let rows: usize = self.tables.values().map(|t| t.rows.len()).sum();
        info!(rows, "Store shutdown");
    }

    fn schema(&self, type_name: &str) -> Result<&Schema, StoreError> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| StoreError::UnknownType(type_name.to_string()))
    }

    fn table(&self, type_name: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(type_name)
            .ok_or_else(|| StoreError::UnknownType(type_name.to_string()))
    }

    fn table_mut(&mut self, type_name: &str) -> Result<&mut Table, StoreError> {
        self.tables
            .get_mut(type_name)
            .ok_or_else(|| StoreError::UnknownType(type_name.to_string()))
    }

    fn relation(&self, type_name: &str, name: &str) -> Result<Relation, StoreError> {
        self.schema(type_name)?
            .relation(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownRelation {
                type_name: type_name.to_string(),
                relation: name.to_string(),
            })
    }

    fn insert(&mut self, type_name: &str, data: &Value) -> Result<Record, StoreError> {
        let schema = self.schema(type_name)?.clone();
        let attributes = attributes_of(data)?;

        let table = self.table_mut(type_name)?;
        let id = match data.get("id").and_then(link_target) {
            Some(id) if table.rows.contains_key(&id) => {
                return Err(StoreError::DuplicateId {
                    type_name: type_name.to_string(),
                    id,
                })
            }
            Some(id) => id,
            None => loop {
                table.next_id += 1;
                let candidate = table.next_id.to_string();
                if !table.rows.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        let mut record = Record::new(type_name, id);
        for (name, value) in attributes {
            record.attributes.insert(name.clone(), value.clone());
        }
        for required in schema.required {
            if record.attribute(required).is_none_or(Value::is_null) {
                return Err(not_null(type_name, required));
            }
        }

        let links = links_of(data)?;
        let to_many = self.apply_to_one_links(&schema, &mut record, &links)?;
        for (relation, targets) in &to_many {
            self.check_targets(&schema, relation, targets)?;
        }

        self.table_mut(type_name)?
            .rows
            .insert(record.id.clone(), record.clone());
        for (relation, targets) in to_many {
            self.replace_to_many(&schema, &record.id, &relation, &targets)?;
        }
        Ok(record)
    }

    fn update(&mut self, type_name: &str, id: &str, data: &Value) -> Result<Record, StoreError> {
        let schema = self.schema(type_name)?.clone();
        let mut record = self
            .table(type_name)?
            .rows
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                type_name: type_name.to_string(),
                id: id.to_string(),
            })?;

        for (name, value) in attributes_of(data)? {
            if value.is_null() && schema.is_required(name) {
                return Err(not_null(type_name, name));
            }
            record.attributes.insert(name.clone(), value.clone());
        }

        let links = links_of(data)?;
        let to_many = self.apply_to_one_links(&schema, &mut record, &links)?;
        for (relation, targets) in &to_many {
            self.check_targets(&schema, relation, targets)?;
        }

        self.table_mut(type_name)?
            .rows
            .insert(record.id.clone(), record.clone());
        for (relation, targets) in to_many {
            self.replace_to_many(&schema, &record.id, &relation, &targets)?;
        }
        Ok(record)
    }

    fn remove(&mut self, type_name: &str, id: &str) -> Result<(), StoreError> {
        let removed = self.table_mut(type_name)?.rows.remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound {
                type_name: type_name.to_string(),
                id: id.to_string(),
            });
        }

        // Clear to-one links in other tables that pointed at the removed record.
        let pointing: Vec<(&'static str, &'static str)> = self
            .schemas
            .values()
            .flat_map(|s| {
                s.relations
                    .iter()
                    .filter(|r| r.target == type_name && r.cardinality == Cardinality::ToOne)
                    .map(|r| (s.type_name, r.name))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (source, relation) in pointing {
            if let Some(table) = self.tables.get_mut(source) {
                for row in table.rows.values_mut() {
                    if row.link(relation) == Some(id) {
                        row.links.remove(relation);
                    }
                }
            }
        }
        Ok(())
    }

    fn find(&self, type_name: &str, query: &Query) -> Result<Vec<Record>, StoreError> {
        let rows = self.table(type_name)?.rows.values().cloned().collect();
        Ok(apply_query(rows, type_name, query))
    }

    fn related(
        &self,
        type_name: &str,
        id: &str,
        relation: &str,
        query: &Query,
    ) -> Result<PrimaryData<Record>, StoreError> {
        let relation = self.relation(type_name, relation)?;
        let record = self
            .table(type_name)?
            .rows
            .get(id)
            .ok_or_else(|| StoreError::NotFound {
                type_name: type_name.to_string(),
                id: id.to_string(),
            })?;
        let target = self.table(relation.target)?;

        match relation.cardinality {
            Cardinality::ToOne => {
                let found: Vec<Record> = record
                    .link(relation.name)
                    .and_then(|target_id| target.rows.get(target_id))
                    .cloned()
                    .into_iter()
                    .collect();
                Ok(apply_query(found, relation.target, query)
                    .into_iter()
                    .next()
                    .map_or(PrimaryData::Null, PrimaryData::Resource))
            }
            Cardinality::ToMany { inverse } => {
                let children = target
                    .rows
                    .values()
                    .filter(|row| row.link(inverse) == Some(id))
                    .cloned()
                    .collect();
                Ok(PrimaryData::Collection(apply_query(children, relation.target, query)))
            }
        }
    }

    /// Writes to-one links onto `record` and returns the to-many replacements
    /// still to apply once the record is stored.
    fn apply_to_one_links(
        &self,
        schema: &Schema,
        record: &mut Record,
        links: &Map<String, Value>,
    ) -> Result<Vec<(String, Vec<String>)>, StoreError> {
        let mut to_many = Vec::new();
        for (name, value) in links {
            let relation = self.relation(schema.type_name, name)?;
            match relation.cardinality {
                Cardinality::ToOne => match link_target(value) {
                    Some(target_id) => {
                        if !self.table(relation.target)?.rows.contains_key(&target_id) {
                            return Err(StoreError::MissingReference {
                                type_name: schema.type_name.to_string(),
                                relation: relation.name.to_string(),
                                target: target_id,
                            });
                        }
                        record.links.insert(relation.name.to_string(), target_id);
                    }
                    None if value.is_null() => {
                        record.links.remove(relation.name);
                    }
                    None => {
                        return Err(StoreError::Malformed(format!(
                            "{}.{} must link to a resource identifier",
                            schema.type_name, relation.name
                        )))
                    }
                },
                Cardinality::ToMany { .. } => {
                    let targets = match value {
                        Value::Array(items) => items
                            .iter()
                            .map(|item| {
                                link_target(item).ok_or_else(|| {
                                    StoreError::Malformed(format!(
                                        "{}.{} entries must be resource identifiers",
                                        schema.type_name, relation.name
                                    ))
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?,
                        _ => {
                            return Err(StoreError::Malformed(format!(
                                "{}.{} must be an array of resource identifiers",
                                schema.type_name, relation.name
                            )))
                        }
                    };
                    to_many.push((relation.name.to_string(), targets));
                }
            }
        }
        Ok(to_many)
    }

    fn check_targets(
        &self,
        schema: &Schema,
        relation: &str,
        targets: &[String],
    ) -> Result<(), StoreError> {
        let relation = self.relation(schema.type_name, relation)?;
        let table = self.table(relation.target)?;
        match targets.iter().find(|t| !table.rows.contains_key(*t)) {
            Some(missing) => Err(StoreError::MissingReference {
                type_name: schema.type_name.to_string(),
                relation: relation.name.to_string(),
                target: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Points exactly `targets` at `owner` through the inverse to-one link.
    fn replace_to_many(
        &mut self,
        schema: &Schema,
        owner: &str,
        relation: &str,
        targets: &[String],
    ) -> Result<(), StoreError> {
        let relation = self.relation(schema.type_name, relation)?;
        let Cardinality::ToMany { inverse } = relation.cardinality else {
            return Ok(());
        };
        let child_schema = self.schema(relation.target)?.clone();
        let table = self.table_mut(relation.target)?;

        for row in table.rows.values_mut() {
            let listed = targets.contains(&row.id);
            let linked = row.link(inverse) == Some(owner);
            if listed {
                row.links.insert(inverse.to_string(), owner.to_string());
            } else if linked {
                if child_schema.is_required(inverse) {
                    warn!(
                        type_name = child_schema.type_name,
                        id = %row.id,
                        "Orphaning required link"
                    );
                }
                row.links.remove(inverse);
            }
        }
        Ok(())
    }
}

fn not_null(type_name: &str, attribute: &str) -> StoreError {
    StoreError::NotNull {
        type_name: type_name.to_string(),
        attribute: attribute.to_string(),
    }
}

fn attributes_of(data: &Value) -> Result<&Map<String, Value>, StoreError> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match data.get("attributes") {
        None | Some(Value::Null) => Ok(EMPTY.get_or_init(Map::new)),
        Some(Value::Object(attributes)) => Ok(attributes),
        Some(_) => Err(StoreError::Malformed("attributes must be an object".into())),
    }
}

/// Merges `links` (bare linkage) and `relationships` (`{ data: linkage }`).
fn links_of(data: &Value) -> Result<Map<String, Value>, StoreError> {
    let mut out = Map::new();
    if let Some(links) = data.get("links") {
        let links = links
            .as_object()
            .ok_or_else(|| StoreError::Malformed("links must be an object".into()))?;
        out.extend(links.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(relationships) = data.get("relationships") {
        let relationships = relationships
            .as_object()
            .ok_or_else(|| StoreError::Malformed("relationships must be an object".into()))?;
        for (name, relationship) in relationships {
            let linkage = relationship.get("data").cloned().ok_or_else(|| {
                StoreError::Malformed(format!("relationship {} must have data", name))
            })?;
            out.insert(name.clone(), linkage);
        }
    }
    Ok(out)
}

/// Filters, sorts and trims `rows` as `query` asks.
fn apply_query(rows: Vec<Record>, type_name: &str, query: &Query) -> Vec<Record> {
    let mut rows: Vec<Record> = rows
        .into_iter()
        .filter(|row| {
            query.filter.iter().all(|(key, values)| {
                row.filter_text(key)
                    .is_some_and(|text| values.iter().any(|v| *v == text))
            })
        })
        .collect();

    let keys = query.sort_keys();
    if !keys.is_empty() {
        rows.sort_by(|a, b| {
            keys.iter()
                .map(|(field, direction)| {
                    let ordering = if *field == "id" {
                        compare_ids(&a.id, &b.id)
                    } else {
                        compare_values(a.attribute(field), b.attribute(field))
                    };
                    match direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    }
                })
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    if let Some(fields) = query.fields_for(type_name) {
        for row in &mut rows {
            row.retain_fields(fields);
        }
    }
    rows
}

/// Numeric ids compare as numbers so that "10" sorts after "9".
fn compare_ids(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn log_outcome<T>(type_name: &str, op: &'static str, result: &Result<T, StoreError>) {
    match result {
        Ok(_) => info!(%type_name, op, "Ok"),
        Err(e) => warn!(%type_name, op, error = %e, "Failed"),
    }
}
