//! Vector index
//!
//! An ordered registry of spaces bound to one schema, owning the
//! precomputed per-space vector for every record. Tables are frozen at
//! build time; a corpus change produces a new index (`rebuilt_with`) which
//! the engine swaps in atomically.

use ahash::{AHashMap, AHashSet};
use rankx_core::{Error, RecordId, Result, Vector};
use rankx_schema::{RecordStore, Space};
use rayon::prelude::*;
use tracing::info;

/// Frozen per-record vector tables over an ordered set of spaces
#[derive(Debug, Clone)]
pub struct Index {
    spaces: Vec<Space>,
    space_slots: AHashMap<String, usize>,
    ids: Vec<RecordId>,
    id_slots: AHashMap<RecordId, usize>,
    /// tables[space][record_slot]
    tables: Vec<Vec<Vector>>,
    /// Concatenation across spaces, one per record slot
    composites: Vec<Vector>,
}

impl Index {
    /// Embed every record once per space and freeze the tables
    ///
    /// Embedding runs in parallel across records; table order follows store
    /// slot order, so output is deterministic.
    pub fn build(store: &RecordStore, spaces: Vec<Space>) -> Result<Self> {
        let mut space_slots = AHashMap::with_capacity(spaces.len());
        for (pos, space) in spaces.iter().enumerate() {
            if !store.schema().has_attribute(space.attribute()) {
                return Err(Error::UnknownAttribute(space.attribute().to_string()));
            }
            if space_slots.insert(space.name().to_string(), pos).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "duplicate space '{}'",
                    space.name()
                )));
            }
        }

        let tables = spaces
            .iter()
            .map(|space| Self::embed_column(store, space, None))
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<RecordId> = store.records().iter().map(|r| r.id.clone()).collect();
        let id_slots = ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (id.clone(), slot))
            .collect();
        let composites = concat_rows(&tables, ids.len());

        info!(
            records = ids.len(),
            spaces = spaces.len(),
            "index built"
        );
        Ok(Self {
            spaces,
            space_slots,
            ids,
            id_slots,
            tables,
            composites,
        })
    }

    /// Build the successor index after an ingest
    ///
    /// Vectors of unchanged record slots are reused; only `changed` ids and
    /// newly appended records are re-embedded. The result is a fresh index,
    /// never a partial update of `self`.
    pub fn rebuilt_with(&self, store: &RecordStore, changed: &[RecordId]) -> Result<Self> {
        let changed: AHashSet<&RecordId> = changed.iter().collect();

        let tables = self
            .spaces
            .iter()
            .enumerate()
            .map(|(space_idx, space)| {
                let reuse = |slot: usize| -> Option<Vector> {
                    let id = &store.records()[slot].id;
                    let unchanged =
                        slot < self.ids.len() && self.ids[slot] == *id && !changed.contains(id);
                    unchanged.then(|| self.tables[space_idx][slot].clone())
                };
                Self::embed_column(store, space, Some(&reuse))
            })
            .collect::<Result<Vec<_>>>()?;

        let ids: Vec<RecordId> = store.records().iter().map(|r| r.id.clone()).collect();
        let id_slots = ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (id.clone(), slot))
            .collect();
        let composites = concat_rows(&tables, ids.len());

        Ok(Self {
            spaces: self.spaces.clone(),
            space_slots: self.space_slots.clone(),
            ids,
            id_slots,
            tables,
            composites,
        })
    }

    fn embed_column(
        store: &RecordStore,
        space: &Space,
        reuse: Option<&(dyn Fn(usize) -> Option<Vector> + Sync)>,
    ) -> Result<Vec<Vector>> {
        store
            .records()
            .par_iter()
            .enumerate()
            .map(|(slot, record)| {
                if let Some(reuse) = reuse {
                    if let Some(vector) = reuse(slot) {
                        return Ok(vector);
                    }
                }
                let value = record
                    .value(space.attribute())
                    .ok_or_else(|| Error::UnknownAttribute(space.attribute().to_string()))?;
                space.embed(value)
            })
            .collect()
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    pub fn space_count(&self) -> usize {
        self.spaces.len()
    }

    /// Position of a space by name
    pub fn space_position(&self, name: &str) -> Option<usize> {
        self.space_slots.get(name).copied()
    }

    pub fn space(&self, name: &str) -> Option<&Space> {
        self.space_position(name).map(|pos| &self.spaces[pos])
    }

    pub fn record_count(&self) -> usize {
        self.ids.len()
    }

    /// Record ids in slot order
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// A record's vector on one space
    pub fn get_vector(&self, id: &RecordId, space: &str) -> Result<&Vector> {
        let space_idx = self
            .space_position(space)
            .ok_or_else(|| Error::UnknownSpace(space.to_string()))?;
        let slot = self
            .id_slots
            .get(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        Ok(&self.tables[space_idx][*slot])
    }

    /// Per-space vector by record slot; bounds are the caller's invariant
    pub(crate) fn vector_at(&self, space_idx: usize, slot: usize) -> &Vector {
        &self.tables[space_idx][slot]
    }

    /// Concatenation of a record's vectors across all spaces, in space order
    pub fn composite_vector(&self, id: &RecordId) -> Result<&Vector> {
        let slot = *self
            .id_slots
            .get(id)
            .ok_or_else(|| Error::RecordNotFound(id.to_string()))?;
        Ok(&self.composites[slot])
    }

    /// Composite vectors for the whole corpus or a named subset
    ///
    /// The full set is handed to the external projection collaborator; the
    /// engine makes no dimensionality-reduction decisions.
    pub fn composite_vectors(
        &self,
        subset: Option<&[RecordId]>,
    ) -> Result<Vec<(RecordId, Vector)>> {
        match subset {
            Some(ids) => ids
                .iter()
                .map(|id| Ok((id.clone(), self.composite_vector(id)?.clone())))
                .collect(),
            None => Ok(self
                .ids
                .iter()
                .zip(&self.composites)
                .map(|(id, composite)| (id.clone(), composite.clone()))
                .collect()),
        }
    }

    /// Total dimension of a composite vector
    pub fn composite_dim(&self) -> usize {
        self.spaces.iter().map(Space::dim).sum()
    }
}

fn concat_rows(tables: &[Vec<Vector>], records: usize) -> Vec<Vector> {
    (0..records)
        .map(|slot| Vector::concat(tables.iter().map(|table| &table[slot])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankx_core::Record;
    use rankx_schema::{
        AttributeDef, OutOfRangePolicy, Schema, SpaceSpec, UnknownCategoryPolicy,
        VocabularySource,
    };

    fn food_store() -> RecordStore {
        let schema = Schema::new(
            "fdc_id",
            vec![
                AttributeDef::text("description"),
                AttributeDef::categorical("food_category"),
                AttributeDef::numeric("calories", 0.0, 1000.0),
            ],
        )
        .unwrap();
        let mut store = RecordStore::new(schema);
        store
            .put(vec![
                Record::new(1u64)
                    .with("description", "sweet cereal")
                    .with_category("food_category", "breakfast")
                    .with("calories", 120.0),
                Record::new(2u64)
                    .with("description", "grilled chicken")
                    .with_category("food_category", "dinner")
                    .with("calories", 250.0),
            ])
            .unwrap();
        store
    }

    fn food_spaces(store: &RecordStore) -> Vec<Space> {
        let specs = [
            SpaceSpec::Text {
                name: "description".into(),
                attribute: "description".into(),
                model: "test-model".into(),
            },
            SpaceSpec::Categorical {
                name: "category".into(),
                attribute: "food_category".into(),
                vocabulary: VocabularySource::FromCorpus,
                unknown: UnknownCategoryPolicy::Reject,
            },
            SpaceSpec::Number {
                name: "calories".into(),
                attribute: "calories".into(),
                out_of_range: OutOfRangePolicy::Clip,
            },
        ];
        specs
            .iter()
            .map(|spec| Space::from_spec(spec, store).unwrap())
            .collect()
    }

    #[test]
    fn test_build_and_lookup() {
        let store = food_store();
        let index = Index::build(&store, food_spaces(&store)).unwrap();

        assert_eq!(index.record_count(), 2);
        assert_eq!(index.space_count(), 3);

        let v = index
            .get_vector(&RecordId::Integer(1), "calories")
            .unwrap();
        assert_eq!(v.as_slice(), &[0.12]);
    }

    #[test]
    fn test_get_vector_unknown_record() {
        let store = food_store();
        let index = Index::build(&store, food_spaces(&store)).unwrap();
        let err = index
            .get_vector(&RecordId::Integer(99), "calories")
            .unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(_)));
    }

    #[test]
    fn test_get_vector_unknown_space() {
        let store = food_store();
        let index = Index::build(&store, food_spaces(&store)).unwrap();
        let err = index
            .get_vector(&RecordId::Integer(1), "nope")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSpace(_)));
    }

    #[test]
    fn test_duplicate_space_rejected() {
        let store = food_store();
        let mut spaces = food_spaces(&store);
        spaces.push(spaces[0].clone());
        assert!(Index::build(&store, spaces).is_err());
    }

    #[test]
    fn test_composite_vector_concatenation() {
        let store = food_store();
        let index = Index::build(&store, food_spaces(&store)).unwrap();

        let composite = index.composite_vector(&RecordId::Integer(1)).unwrap();
        assert_eq!(composite.dim(), index.composite_dim());

        let all = index.composite_vectors(None).unwrap();
        assert_eq!(all.len(), 2);

        let subset = index
            .composite_vectors(Some(&[RecordId::Integer(2)]))
            .unwrap();
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[0].0, RecordId::Integer(2));
    }

    #[test]
    fn test_rebuilt_with_reuses_unchanged_rows() {
        let mut store = food_store();
        let index = Index::build(&store, food_spaces(&store)).unwrap();

        let changed = store
            .put(vec![Record::new(3u64)
                .with("description", "cereal bar")
                .with_category("food_category", "breakfast")
                .with("calories", 150.0)])
            .unwrap();
        let rebuilt = index.rebuilt_with(&store, &changed).unwrap();

        assert_eq!(rebuilt.record_count(), 3);
        // Unchanged record keeps its vector
        assert_eq!(
            rebuilt.get_vector(&RecordId::Integer(1), "calories").unwrap(),
            index.get_vector(&RecordId::Integer(1), "calories").unwrap()
        );
        assert_eq!(
            rebuilt
                .get_vector(&RecordId::Integer(3), "calories")
                .unwrap()
                .as_slice(),
            &[0.15]
        );
    }

    #[test]
    fn test_rebuilt_with_replaced_record() {
        let mut store = food_store();
        let index = Index::build(&store, food_spaces(&store)).unwrap();

        let changed = store
            .put(vec![Record::new(1u64)
                .with("description", "sweet cereal")
                .with_category("food_category", "breakfast")
                .with("calories", 500.0)])
            .unwrap();
        let rebuilt = index.rebuilt_with(&store, &changed).unwrap();

        assert_eq!(
            rebuilt
                .get_vector(&RecordId::Integer(1), "calories")
                .unwrap()
                .as_slice(),
            &[0.5]
        );
    }
}
