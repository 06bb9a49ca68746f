//! Typed filter predicates over dialog records
//!
//! Callers compose a [`Predicate`] tree from typed leaves and explicit
//! AND/OR nodes. The store validates the tree and renders it into a
//! parameterized SQL fragment; no user text is ever spliced into SQL.

use rusqlite::types::Value;

use crate::error::{Result, StoreError};

/// Text columns that support substring matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Speaker,
    Text,
}

impl TextField {
    pub fn column(self) -> &'static str {
        match self {
            TextField::Speaker => "speaker",
            TextField::Text => "text",
        }
    }
}

/// A filter over dialog records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Matches every record
    All,

    /// Case-sensitive substring containment; NULL columns never match
    Contains { field: TextField, needle: String },

    /// Exact public id
    IdEquals(i64),

    /// Public id within the closed interval `[lo, hi]`
    IdBetween { lo: i64, hi: i64 },

    And(Vec<Predicate>),

    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(field: TextField, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field,
            needle: needle.into(),
        }
    }

    /// Match records whose `field` contains any of `terms`
    ///
    /// An empty term list produces [`Predicate::All`], so an absent filter
    /// and an empty one compose the same way.
    pub fn any_contains<I, S>(field: TextField, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parts: Vec<Predicate> = terms.into_iter().map(|t| Predicate::contains(field, t)).collect();
        match parts.len() {
            0 => Predicate::All,
            1 => parts.remove(0),
            _ => Predicate::Or(parts),
        }
    }

    /// AND-combine predicates, flattening nested ANDs and dropping `All`
    pub fn and<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::All => {}
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::All,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    /// Check the tree is well formed before it reaches the database
    pub fn validate(&self) -> Result<()> {
        match self {
            Predicate::All | Predicate::IdEquals(_) => Ok(()),
            Predicate::Contains { field, needle } => {
                if needle.is_empty() {
                    return Err(StoreError::InvalidPredicate(format!(
                        "empty substring for {}",
                        field.column()
                    )));
                }
                Ok(())
            }
            Predicate::IdBetween { lo, hi } => {
                if lo > hi {
                    return Err(StoreError::InvalidPredicate(format!("id range {}..={} is empty", lo, hi)));
                }
                Ok(())
            }
            Predicate::And(parts) => parts.iter().try_for_each(Predicate::validate),
            Predicate::Or(parts) => {
                if parts.is_empty() {
                    return Err(StoreError::InvalidPredicate("OR with no alternatives".to_string()));
                }
                parts.iter().try_for_each(Predicate::validate)
            }
        }
    }

    /// Render as a SQL boolean expression, pushing bound values onto `params`
    pub fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Predicate::All => "1".to_string(),
            Predicate::Contains { field, needle } => {
                params.push(Value::Text(needle.clone()));
                format!("instr({}, ?) > 0", field.column())
            }
            Predicate::IdEquals(id) => {
                params.push(Value::Integer(*id));
                "idx = ?".to_string()
            }
            Predicate::IdBetween { lo, hi } => {
                params.push(Value::Integer(*lo));
                params.push(Value::Integer(*hi));
                "idx BETWEEN ? AND ?".to_string()
            }
            Predicate::And(parts) => join(parts, " AND ", "1", params),
            Predicate::Or(parts) => join(parts, " OR ", "0", params),
        }
    }
}

fn join(parts: &[Predicate], sep: &str, empty: &str, params: &mut Vec<Value>) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = parts.iter().map(|p| format!("({})", p.to_sql(params))).collect();
    rendered.join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_contains_single_term_is_leaf() {
        let p = Predicate::any_contains(TextField::Speaker, ["Ana"]);
        assert_eq!(p, Predicate::contains(TextField::Speaker, "Ana"));
    }

    #[test]
    fn test_any_contains_no_terms_is_all() {
        let p = Predicate::any_contains(TextField::Text, Vec::<String>::new());
        assert_eq!(p, Predicate::All);
    }

    #[test]
    fn test_and_flattens_and_drops_all() {
        let p = Predicate::and([
            Predicate::All,
            Predicate::and([Predicate::IdEquals(1), Predicate::contains(TextField::Text, "x")]),
            Predicate::IdBetween { lo: 1, hi: 3 },
        ]);
        match p {
            Predicate::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("Expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_and_of_nothing_is_all() {
        assert_eq!(Predicate::and([Predicate::All, Predicate::All]), Predicate::All);
    }

    #[test]
    fn test_validate_rejects_empty_needle() {
        let err = Predicate::contains(TextField::Speaker, "").validate().unwrap_err();
        assert!(err.to_string().contains("speaker"));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        assert!(Predicate::IdBetween { lo: 5, hi: 4 }.validate().is_err());
        assert!(Predicate::IdBetween { lo: 4, hi: 4 }.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_or() {
        assert!(Predicate::Or(vec![]).validate().is_err());
    }

    #[test]
    fn test_to_sql_binds_every_value() {
        let p = Predicate::and([
            Predicate::any_contains(TextField::Speaker, ["Ana", "Bob"]),
            Predicate::IdBetween { lo: 10, hi: 12 },
        ]);
        let mut params = Vec::new();
        let sql = p.to_sql(&mut params);

        assert_eq!(
            sql,
            "((instr(speaker, ?) > 0) OR (instr(speaker, ?) > 0)) AND (idx BETWEEN ? AND ?)"
        );
        assert_eq!(
            params,
            vec![
                Value::Text("Ana".to_string()),
                Value::Text("Bob".to_string()),
                Value::Integer(10),
                Value::Integer(12),
            ]
        );
    }

    #[test]
    fn test_quotes_in_needle_stay_in_params() {
        let p = Predicate::contains(TextField::Text, "'; DROP TABLE dialog; --");
        let mut params = Vec::new();
        let sql = p.to_sql(&mut params);
        assert!(!sql.contains("DROP"));
        assert_eq!(params.len(), 1);
    }
}
