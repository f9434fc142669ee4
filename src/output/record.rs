//! Schema-less statistics records
//!
//! Column sets differ per sport and per page, so a record is an ordered
//! header-to-cell map instead of a typed struct. Values are the literal cell
//! text; numeric coercion is left to consumers.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered mapping from column header text to cell text
///
/// Iteration order is the column order observed on the page. Within one
/// fetch every record carries an identical key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatFields(IndexMap<String, String>);

impl StatFields {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Appends a column; an existing key keeps its position and takes the new value
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.0.insert(header.into(), value.into());
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.0.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column headers in page order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(header, value)` pairs in page order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for StatFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One entity row (player, athlete, team) from a statistics table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatRecord {
    /// Text of the identifier cell
    pub entity_name: String,

    /// Every column of the row, keyed by header text
    pub fields: StatFields,
}

impl StatRecord {
    pub fn new(entity_name: impl Into<String>, fields: StatFields) -> Self {
        Self {
            entity_name: entity_name.into(),
            fields,
        }
    }

    /// Looks up a single column by header text
    pub fn field(&self, header: &str) -> Option<&str> {
        self.fields.get(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_preserve_insertion_order() {
        let mut fields = StatFields::new();
        fields.insert("Player", "Jordan Smith");
        fields.insert("PTS", "245");
        fields.insert("AST", "31");
        fields.insert("GP", "13");

        let keys: Vec<_> = fields.keys().collect();
        assert_eq!(keys, vec!["Player", "PTS", "AST", "GP"]);
    }

    #[test]
    fn test_fields_reinsert_keeps_position() {
        let mut fields = StatFields::new();
        fields.insert("GP", "12");
        fields.insert("PTS", "200");
        fields.insert("GP", "13");

        let pairs: Vec<_> = fields.iter().collect();
        assert_eq!(pairs, vec![("GP", "13"), ("PTS", "200")]);
    }

    #[test]
    fn test_record_field_lookup() {
        let fields: StatFields = vec![
            ("Player".to_string(), "Avery Jones".to_string()),
            ("REB".to_string(), "7.4".to_string()),
        ]
        .into_iter()
        .collect();

        let record = StatRecord::new("Avery Jones", fields);
        assert_eq!(record.field("REB"), Some("7.4"));
        assert_eq!(record.field("BLK"), None);
        assert_eq!(record.fields.len(), 2);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let mut fields = StatFields::new();
        fields.insert("Player", "Avery Jones");
        fields.insert("MIN", "404");

        let json = serde_json::to_string(&StatRecord::new("Avery Jones", fields)).unwrap();
        assert_eq!(
            json,
            r#"{"entity_name":"Avery Jones","fields":{"Player":"Avery Jones","MIN":"404"}}"#
        );
    }
}
