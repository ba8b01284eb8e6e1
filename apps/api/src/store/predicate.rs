//! Boolean attribute predicates evaluated against stored JSON documents.
//!
//! Semantics follow a document-store filter expression: a condition on an
//! absent attribute is false, except `NotEquals` which holds for absent
//! attributes.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// String attribute equals the value exactly.
    Equals { attr: String, value: String },
    NotEquals { attr: String, value: String },
    /// Substring of a string attribute, or element of a list attribute.
    Contains { attr: String, value: String },
    /// At least one nested condition holds.
    AnyOf(Vec<Condition>),
}

impl Condition {
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Condition::Equals { attr, value } => {
                doc.get(attr).and_then(Value::as_str) == Some(value.as_str())
            }
            Condition::NotEquals { attr, value } => {
                doc.get(attr).and_then(Value::as_str) != Some(value.as_str())
            }
            Condition::Contains { attr, value } => match doc.get(attr) {
                Some(Value::String(s)) => s.contains(value.as_str()),
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| item.as_str() == Some(value.as_str())),
                _ => false,
            },
            Condition::AnyOf(conditions) => conditions.iter().any(|c| c.matches(doc)),
        }
    }
}

/// Conjunction of conditions. An empty predicate matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, attr: &str, value: impl Into<String>) -> Self {
        self.with(Condition::Equals {
            attr: attr.to_string(),
            value: value.into(),
        })
    }

    pub fn ne(self, attr: &str, value: impl Into<String>) -> Self {
        self.with(Condition::NotEquals {
            attr: attr.to_string(),
            value: value.into(),
        })
    }

    pub fn contains(self, attr: &str, value: impl Into<String>) -> Self {
        self.with(Condition::Contains {
            attr: attr.to_string(),
            value: value.into(),
        })
    }

    pub fn any_of(self, conditions: Vec<Condition>) -> Self {
        self.with(Condition::AnyOf(conditions))
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "jobId": "a",
            "status": "active",
            "location": "Pune, India",
            "tags": ["React", "Node"],
            "role": "Frontend Engineer",
            "companyName": "Acme"
        })
    }

    #[test]
    fn test_empty_predicate_matches_everything() {
        assert!(Predicate::new().matches(&doc()));
    }

    #[test]
    fn test_equals_is_exact() {
        assert!(Predicate::new().eq("status", "active").matches(&doc()));
        assert!(!Predicate::new().eq("status", "Active").matches(&doc()));
    }

    #[test]
    fn test_contains_on_string_is_case_sensitive_substring() {
        assert!(Predicate::new().contains("location", "Pune").matches(&doc()));
        assert!(!Predicate::new().contains("location", "pune").matches(&doc()));
    }

    #[test]
    fn test_contains_on_list_is_membership() {
        assert!(Predicate::new().contains("tags", "React").matches(&doc()));
        // membership, not substring of an element
        assert!(!Predicate::new().contains("tags", "Rea").matches(&doc()));
    }

    #[test]
    fn test_absent_attribute_fails_except_not_equals() {
        assert!(!Predicate::new().eq("category", "x").matches(&doc()));
        assert!(!Predicate::new().contains("batch", "2025").matches(&doc()));
        assert!(Predicate::new().ne("category", "x").matches(&doc()));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let p = Predicate::new()
            .eq("status", "active")
            .contains("tags", "Python");
        assert!(!p.matches(&doc()));
    }

    #[test]
    fn test_any_of_is_disjunctive() {
        let p = Predicate::new().any_of(vec![
            Condition::Contains {
                attr: "role".to_string(),
                value: "Acme".to_string(),
            },
            Condition::Contains {
                attr: "companyName".to_string(),
                value: "Acme".to_string(),
            },
        ]);
        assert!(p.matches(&doc()));
    }
}
