//! Materialized query results
//!
//! Ranked result rows carrying the requested attributes, the composite
//! similarity score, and the per-space weighted contribution breakdown,
//! plus summary statistics over a ranked prefix.

use ahash::AHashMap;
use rankx_core::{AttributeValue, RecordId};
use serde::Serialize;

/// One ranked row: identifier, score, projected attributes, breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub id: RecordId,
    pub similarity_score: f32,
    /// Projected attributes in projection order
    pub attributes: Vec<(String, AttributeValue)>,
    /// Weighted per-space score contributions
    pub contributions: AHashMap<String, f32>,
}

impl ResultRow {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value)
    }

    /// Flatten into a JSON object for the presentation collaborator
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert("id".to_string(), serde_json::json!(self.id.to_string()));
        for (name, value) in &self.attributes {
            object.insert(name.clone(), value.to_json());
        }
        object.insert(
            "similarity_score".to_string(),
            serde_json::json!(self.similarity_score),
        );
        serde_json::Value::Object(object)
    }
}

/// Ordered result of one query execution
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
    candidates: usize,
}

impl ResultSet {
    pub(crate) fn new(rows: Vec<ResultRow>, candidates: usize) -> Self {
        Self { rows, candidates }
    }

    /// Rows in rank order, best first
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        self.rows
    }

    /// Explicit prefix; there is no implicit row cap
    pub fn top(&self, k: usize) -> &[ResultRow] {
        &self.rows[..k.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of records considered before filtering
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.rows.iter().map(|row| &row.id)
    }

    /// Mean of a numeric attribute over the top `k` rows
    ///
    /// Returns `None` when no row in the prefix carries the attribute as a
    /// number.
    pub fn mean_numeric(&self, attribute: &str, k: usize) -> Option<f64> {
        let values: Vec<f64> = self
            .top(k)
            .iter()
            .filter_map(|row| row.attribute(attribute).and_then(AttributeValue::as_f64))
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Summary statistics over the ranked rows
    pub fn stats(&self) -> ResultStats {
        if self.rows.is_empty() {
            return ResultStats {
                candidates: self.candidates,
                results: 0,
                mean_score: 0.0,
                best_score: 0.0,
                top_contributing_space: None,
            };
        }

        let mean_score =
            self.rows.iter().map(|r| r.similarity_score).sum::<f32>() / self.rows.len() as f32;
        let best = &self.rows[0];
        let top_contributing_space = best
            .contributions
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.clone());

        ResultStats {
            candidates: self.candidates,
            results: self.rows.len(),
            mean_score,
            best_score: best.similarity_score,
            top_contributing_space,
        }
    }
}

/// Summary of one query execution
#[derive(Debug, Clone, Serialize)]
pub struct ResultStats {
    pub candidates: usize,
    pub results: usize,
    pub mean_score: f32,
    pub best_score: f32,
    /// Space that contributed most to the best row
    pub top_contributing_space: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64, score: f32, calories: f64) -> ResultRow {
        let mut contributions = AHashMap::new();
        contributions.insert("description".to_string(), score * 0.8);
        contributions.insert("calories".to_string(), score * 0.2);
        ResultRow {
            id: RecordId::Integer(id),
            similarity_score: score,
            attributes: vec![
                ("description".to_string(), AttributeValue::Text("x".into())),
                ("calories".to_string(), AttributeValue::Number(calories)),
            ],
            contributions,
        }
    }

    #[test]
    fn test_top_prefix() {
        let set = ResultSet::new(vec![row(1, 0.9, 100.0), row(2, 0.5, 200.0)], 5);
        assert_eq!(set.top(1).len(), 1);
        assert_eq!(set.top(10).len(), 2);
    }

    #[test]
    fn test_mean_numeric() {
        let set = ResultSet::new(
            vec![row(1, 0.9, 100.0), row(2, 0.5, 200.0), row(3, 0.4, 600.0)],
            3,
        );
        assert_eq!(set.mean_numeric("calories", 2), Some(150.0));
        assert_eq!(set.mean_numeric("description", 2), None);
        assert_eq!(ResultSet::new(vec![], 0).mean_numeric("calories", 5), None);
    }

    #[test]
    fn test_stats() {
        let set = ResultSet::new(vec![row(1, 0.8, 100.0), row(2, 0.4, 200.0)], 7);
        let stats = set.stats();
        assert_eq!(stats.candidates, 7);
        assert_eq!(stats.results, 2);
        assert_eq!(stats.best_score, 0.8);
        assert!((stats.mean_score - 0.6).abs() < 1e-6);
        assert_eq!(
            stats.top_contributing_space,
            Some("description".to_string())
        );
    }

    #[test]
    fn test_row_to_json() {
        let json = row(1, 0.9, 100.0).to_json();
        assert_eq!(json["id"], serde_json::json!("1"));
        assert_eq!(json["calories"], serde_json::json!(100.0));
        assert!(json["similarity_score"].is_number());
    }
}
