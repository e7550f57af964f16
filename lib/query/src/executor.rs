//! Query execution
//!
//! Evaluates a bound query against an index snapshot and its record store:
//! bind, filter, score, rank, project. Scoring is parallel across candidate
//! records; contributions sum in declared term order and ties break on
//! ascending record id, so the ranked output is exactly reproducible.

use crate::index::Index;
use crate::query::{Binding, Query, Select, TermKind, ValueSource, WeightSource};
use crate::results::{ResultRow, ResultSet};
use ahash::AHashMap;
use rankx_core::{AttributeValue, Error, Record, Result, Vector};
use rankx_schema::RecordStore;
use rayon::prelude::*;
use tracing::debug;

/// A similar term with its parameter resolved and query vector embedded
struct Scorer {
    space_idx: usize,
    space_name: String,
    weight: f32,
}

/// A filter term resolved to attribute name and expected value
struct Gate {
    attribute: String,
    expected: AttributeValue,
}

/// Execute a query against an index snapshot and its record store
///
/// Terms whose parameter is unbound (or bound to empty text) are skipped;
/// a query with no live similar terms still applies its filters and yields
/// a similarity-free ordering with score 0 for every survivor.
pub fn execute(
    query: &Query,
    binding: &Binding,
    index: &Index,
    store: &RecordStore,
) -> Result<ResultSet> {
    let (scorers, query_vectors, gates) = resolve_terms(query, binding, index, store)?;

    let candidates = store.len();
    let mut rows: Vec<ResultRow> = store
        .records()
        .par_iter()
        .enumerate()
        .filter(|(_, record)| passes(record, &gates))
        .map(|(slot, record)| {
            let mut score = 0.0f32;
            let mut contributions = AHashMap::with_capacity(scorers.len());
            for (scorer, query_vector) in scorers.iter().zip(&query_vectors) {
                let record_vector = index.vector_at(scorer.space_idx, slot);
                let contribution =
                    scorer.weight * index.spaces()[scorer.space_idx].similarity(record_vector, query_vector);
                score += contribution;
                *contributions
                    .entry(scorer.space_name.clone())
                    .or_insert(0.0) += contribution;
            }
            ResultRow {
                id: record.id.clone(),
                similarity_score: score,
                attributes: Vec::new(),
                contributions,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.similarity_score
            .total_cmp(&a.similarity_score)
            .then_with(|| a.id.cmp(&b.id))
    });

    project(&mut rows, query.select(), store)?;

    debug!(
        terms = query.terms().len(),
        live_similar = scorers.len(),
        filters = gates.len(),
        candidates,
        results = rows.len(),
        "query executed"
    );
    Ok(ResultSet::new(rows, candidates))
}

type Resolved = (Vec<Scorer>, Vec<Vector>, Vec<Gate>);

fn resolve_terms(
    query: &Query,
    binding: &Binding,
    index: &Index,
    store: &RecordStore,
) -> Result<Resolved> {
    let mut scorers = Vec::new();
    let mut query_vectors = Vec::new();
    let mut gates = Vec::new();

    for term in query.terms() {
        let space_idx = index.space_position(&term.space).ok_or_else(|| {
            Error::InvalidQuery(format!(
                "term references space '{}' not present in the index",
                term.space
            ))
        })?;
        let space = &index.spaces()[space_idx];

        let value = match &term.value {
            ValueSource::Literal(value) => Some(value.clone()),
            ValueSource::Param(name) => binding.value(name).cloned(),
        };
        let Some(value) = value else {
            continue;
        };
        if value.is_empty_text() {
            continue;
        }

        match &term.kind {
            TermKind::Similar { weight } => {
                let weight = match weight {
                    WeightSource::Fixed(w) => *w,
                    WeightSource::Param(name) => binding.weight(name).unwrap_or(1.0),
                };
                // Embed even at weight 0 so embedding failures surface
                query_vectors.push(space.embed(&value)?);
                scorers.push(Scorer {
                    space_idx,
                    space_name: space.name().to_string(),
                    weight,
                });
            }
            TermKind::Filter => {
                let attribute = space.attribute().to_string();
                let attr_def = store
                    .schema()
                    .attribute(&attribute)
                    .ok_or_else(|| Error::UnknownAttribute(attribute.clone()))?;
                if !attr_def.attr_type.accepts(&value) {
                    return Err(Error::InvalidQuery(format!(
                        "filter on space '{}' expects a {} value, got {}",
                        term.space,
                        attr_def.attr_type.name(),
                        value.type_name()
                    )));
                }
                gates.push(Gate {
                    attribute,
                    expected: value,
                });
            }
        }
    }

    Ok((scorers, query_vectors, gates))
}

fn passes(record: &Record, gates: &[Gate]) -> bool {
    gates
        .iter()
        .all(|gate| record.value(&gate.attribute) == Some(&gate.expected))
}

fn project(rows: &mut [ResultRow], select: &Select, store: &RecordStore) -> Result<()> {
    let columns: Vec<String> = match select {
        Select::All => store
            .schema()
            .attribute_names()
            .map(str::to_string)
            .collect(),
        Select::Columns(columns) => {
            for column in columns {
                if !store.schema().has_attribute(column) {
                    return Err(Error::InvalidQuery(format!(
                        "projection references unknown attribute '{}'",
                        column
                    )));
                }
            }
            columns.clone()
        }
    };

    for row in rows {
        let record = store
            .get(&row.id)
            .ok_or_else(|| Error::RecordNotFound(row.id.to_string()))?;
        row.attributes = columns
            .iter()
            .filter_map(|column| {
                record
                    .value(column)
                    .map(|value| (column.clone(), value.clone()))
            })
            .collect();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::param;
    use rankx_core::RecordId;
    use rankx_schema::{
        AttributeDef, OutOfRangePolicy, Schema, Space, SpaceSpec, UnknownCategoryPolicy,
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
                Record::new(3u64)
                    .with("description", "sugary cereal bar")
                    .with_category("food_category", "breakfast")
                    .with("calories", 150.0),
            ])
            .unwrap();
        store
    }

    fn food_index(store: &RecordStore) -> Index {
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
        let spaces: Vec<Space> = specs
            .iter()
            .map(|spec| Space::from_spec(spec, store).unwrap())
            .collect();
        Index::build(store, spaces).unwrap()
    }

    #[test]
    fn test_unknown_space_is_invalid_query() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder().similar("nope", param("q")).build();
        let err = execute(&query, &Binding::new().set("q", "x"), &index, &store).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_filter_type_mismatch_is_invalid_query() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder().filter("category", param("cat")).build();
        let binding = Binding::new().set("cat", "breakfast"); // Text, not Categorical
        let err = execute(&query, &binding, &index, &store).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_unbound_terms_yield_browse_mode() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder()
            .similar("description", param("q"))
            .filter("category", param("cat"))
            .build();

        // Nothing bound: every record survives with score 0, ordered by id
        let result = execute(&query, &Binding::new(), &index, &store).unwrap();
        assert_eq!(result.len(), 3);
        assert!(result.rows().iter().all(|r| r.similarity_score == 0.0));
        let ids: Vec<&RecordId> = result.ids().collect();
        assert_eq!(
            ids,
            vec![
                &RecordId::Integer(1),
                &RecordId::Integer(2),
                &RecordId::Integer(3)
            ]
        );
    }

    #[test]
    fn test_empty_text_treated_as_unbound() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder().similar("description", param("q")).build();
        let result =
            execute(&query, &Binding::new().set("q", "   "), &index, &store).unwrap();
        assert!(result.rows().iter().all(|r| r.similarity_score == 0.0));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let store = food_store();
        let index = food_index(&store);

        let one = Query::builder().filter("category", param("cat")).build();
        let binding = Binding::new().set_category("cat", "breakfast");
        let loose = execute(&one, &binding, &index, &store).unwrap();
        assert_eq!(loose.len(), 2);

        let two = Query::builder()
            .filter("category", param("cat"))
            .filter("calories", AttributeValue::Number(120.0))
            .build();
        let tight = execute(&two, &binding, &index, &store).unwrap();
        assert_eq!(tight.len(), 1);
        // Subset of the single-filter result
        assert!(tight
            .ids()
            .all(|id| loose.ids().any(|other| other == id)));
    }

    #[test]
    fn test_zero_weight_still_embeds() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder()
            .similar_weighted("category", param("cat"), 0.0)
            .build();
        // Outside the frozen vocabulary: embedding fails despite weight 0
        let binding = Binding::new().set_category("cat", "brunch");
        let err = execute(&query, &binding, &index, &store).unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_projection_columns() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder()
            .similar("description", param("q"))
            .select(["description"])
            .build();
        let result = execute(
            &query,
            &Binding::new().set("q", "cereal"),
            &index,
            &store,
        )
        .unwrap();
        let row = &result.rows()[0];
        assert_eq!(row.attributes.len(), 1);
        assert_eq!(row.attributes[0].0, "description");
    }

    #[test]
    fn test_projection_unknown_column() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder()
            .similar("description", param("q"))
            .select(["color"])
            .build();
        let err = execute(
            &query,
            &Binding::new().set("q", "cereal"),
            &index,
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_contribution_breakdown_sums_to_score() {
        let store = food_store();
        let index = food_index(&store);
        let query = Query::builder()
            .similar("description", param("q"))
            .similar_weighted("calories", param("cal"), 0.5)
            .build();
        let binding = Binding::new().set("q", "sugary cereal").set("cal", 150.0);
        let result = execute(&query, &binding, &index, &store).unwrap();
        for row in result.rows() {
            let sum: f32 = row.contributions.values().sum();
            assert!((row.similarity_score - sum).abs() < 1e-5);
        }
    }
}
