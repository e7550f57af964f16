//! Record store
//!
//! Mutable, upsert-only collection of validated records: a dense arena plus
//! an id → slot lookup. `put` replaces by identifier and keeps slots stable,
//! so index rebuilds can reuse vectors of unchanged slots.

use crate::schema::Schema;
use ahash::AHashMap;
use rankx_core::{AttributeValue, Error, Record, RecordId, Result, SchemaViolation};
use tracing::{debug, warn};

/// The sole owner of record lifetime within an engine
#[derive(Debug, Clone)]
pub struct RecordStore {
    schema: Schema,
    records: Vec<Record>,
    slots: AHashMap<RecordId, usize>,
}

impl RecordStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
            slots: AHashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.slots.get(id).map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.slots.contains_key(id)
    }

    /// Records in slot order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Slot of a record id, stable across upserts
    pub fn slot(&self, id: &RecordId) -> Option<usize> {
        self.slots.get(id).copied()
    }

    /// Validate and upsert a batch of records
    ///
    /// Every record is validated first and all violations are collected; any
    /// violation rejects the whole batch and leaves the store untouched. A
    /// clean batch upserts every record (replace by id, append otherwise)
    /// and returns the ids that changed, in batch order.
    pub fn put(&mut self, records: Vec<Record>) -> Result<Vec<RecordId>> {
        let mut violations = Vec::new();
        for record in &records {
            self.validate(record, &mut violations);
        }
        if !violations.is_empty() {
            warn!(
                rejected = violations.len(),
                batch = records.len(),
                "batch rejected with schema violations"
            );
            return Err(Error::SchemaViolations(violations));
        }

        let mut changed = Vec::with_capacity(records.len());
        for record in records {
            changed.push(record.id.clone());
            match self.slots.get(&record.id) {
                Some(&slot) => self.records[slot] = record,
                None => {
                    self.slots.insert(record.id.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }
        debug!(upserted = changed.len(), total = self.records.len(), "records ingested");
        Ok(changed)
    }

    /// Upsert a batch of JSON rows
    ///
    /// Each row must be an object carrying the schema's id field plus every
    /// declared attribute; values are coerced by attribute type. Violations
    /// are collected across the whole batch, as in [`RecordStore::put`].
    pub fn put_json(&mut self, rows: Vec<serde_json::Value>) -> Result<Vec<RecordId>> {
        let mut violations = Vec::new();
        let mut records = Vec::with_capacity(rows.len());

        for (row_idx, row) in rows.iter().enumerate() {
            let fallback_id = RecordId::String(format!("row[{}]", row_idx));
            let Some(object) = row.as_object() else {
                violations.push(SchemaViolation {
                    id: fallback_id,
                    attribute: self.schema.id_field().to_string(),
                    reason: "row is not a JSON object".to_string(),
                });
                continue;
            };

            let id = match object.get(self.schema.id_field()) {
                Some(serde_json::Value::String(s)) => RecordId::String(s.clone()),
                Some(value) if value.is_u64() => {
                    RecordId::Integer(value.as_u64().unwrap_or_default())
                }
                Some(_) => {
                    violations.push(SchemaViolation {
                        id: fallback_id,
                        attribute: self.schema.id_field().to_string(),
                        reason: "id must be a string or unsigned integer".to_string(),
                    });
                    continue;
                }
                None => {
                    violations.push(SchemaViolation {
                        id: fallback_id,
                        attribute: self.schema.id_field().to_string(),
                        reason: "missing id field".to_string(),
                    });
                    continue;
                }
            };

            let mut record = Record::new(id.clone());
            for attr in self.schema.attributes() {
                match object.get(&attr.name) {
                    Some(value) => match attr.attr_type.coerce(value) {
                        Some(coerced) => record.set(attr.name.clone(), coerced),
                        None => violations.push(SchemaViolation {
                            id: id.clone(),
                            attribute: attr.name.clone(),
                            reason: format!("value does not coerce to {}", attr.attr_type.name()),
                        }),
                    },
                    None => violations.push(SchemaViolation {
                        id: id.clone(),
                        attribute: attr.name.clone(),
                        reason: "missing required attribute".to_string(),
                    }),
                }
            }
            records.push(record);
        }

        if !violations.is_empty() {
            warn!(
                rejected = violations.len(),
                batch = rows.len(),
                "JSON batch rejected with schema violations"
            );
            return Err(Error::SchemaViolations(violations));
        }
        self.put(records)
    }

    /// Distinct values of a categorical attribute, in first-seen order
    pub fn distinct_categories(&self, attribute: &str) -> Vec<String> {
        let mut seen = AHashMap::new();
        let mut categories = Vec::new();
        for record in &self.records {
            if let Some(value) = record.value(attribute).and_then(AttributeValue::as_str) {
                if seen.insert(value.to_string(), ()).is_none() {
                    categories.push(value.to_string());
                }
            }
        }
        categories
    }

    fn validate(&self, record: &Record, violations: &mut Vec<SchemaViolation>) {
        for attr in self.schema.attributes() {
            match record.value(&attr.name) {
                Some(value) => {
                    if !attr.attr_type.accepts(value) {
                        violations.push(SchemaViolation {
                            id: record.id.clone(),
                            attribute: attr.name.clone(),
                            reason: format!(
                                "expected {}, got {}",
                                attr.attr_type.name(),
                                value.type_name()
                            ),
                        });
                    } else if let AttributeValue::Number(n) = value {
                        if !n.is_finite() {
                            violations.push(SchemaViolation {
                                id: record.id.clone(),
                                attribute: attr.name.clone(),
                                reason: "number must be finite".to_string(),
                            });
                        }
                    }
                }
                None => violations.push(SchemaViolation {
                    id: record.id.clone(),
                    attribute: attr.name.clone(),
                    reason: "missing required attribute".to_string(),
                }),
            }
        }
        for name in record.attribute_names() {
            if !self.schema.has_attribute(name) {
                violations.push(SchemaViolation {
                    id: record.id.clone(),
                    attribute: name.to_string(),
                    reason: "not declared in schema".to_string(),
                });
            }
        }
    }
}
