use crate::types::SqlValue;

/// Comparison operator of a [`Condition`].
/// Only flat equality is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
}

impl Operator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
        }
    }
}

/// A `column <op> ?` fragment together with the value bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub operator: Operator,
    pub value: SqlValue,
}

impl Condition {
    /// Creates an equality condition: column = value
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            operator: Operator::Eq,
            value: value.into(),
        }
    }
}

/// An ordered list of conditions.
///
/// Used both for `SET` assignments and for `WHERE` conditions. Each fragment
/// and its value are emitted in the same pass, so placeholder order always
/// matches binding order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionList {
    conditions: Vec<Condition>,
}

impl ConditionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list of equality conditions from `(column, value)` pairs.
    pub fn equalities<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            conditions: pairs
                .into_iter()
                .map(|(column, value)| Condition::eq(column, value))
                .collect(),
        }
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Builds the SQL fragment, joining conditions with `separator`, and
    /// appends each bound value to `params`.
    pub fn build_sql(&self, separator: &str, params: &mut Vec<SqlValue>) -> String {
        let mut sql = String::new();
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(separator);
            }
            sql.push_str(&condition.column);
            sql.push(' ');
            sql.push_str(condition.operator.as_sql());
            sql.push_str(" ?");
            params.push(condition.value.clone());
        }
        sql
    }
}

impl FromIterator<Condition> for ConditionList {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_condition() {
        let list = ConditionList::equalities([("name", "John")]);
        let mut params = Vec::new();
        let sql = list.build_sql(" AND ", &mut params);

        assert_eq!(sql, "name = ?");
        assert_eq!(params, vec![SqlValue::Text("John".to_string())]);
    }

    #[test]
    fn test_values_follow_fragment_order() {
        let list: ConditionList = vec![
            Condition::eq("name", "John"),
            Condition::eq("age", 30),
            Condition::eq("active", true),
        ]
        .into_iter()
        .collect();

        let mut params = vec![SqlValue::Int32(99)];
        let sql = list.build_sql(" AND ", &mut params);

        assert_eq!(sql, "name = ? AND age = ? AND active = ?");
        assert_eq!(
            params,
            vec![
                SqlValue::Int32(99),
                SqlValue::from("John"),
                SqlValue::Int32(30),
                SqlValue::Bool(true),
            ]
        );
    }

    #[test]
    fn test_empty_list() {
        let list = ConditionList::new();
        let mut params = Vec::new();
        assert_eq!(list.build_sql(",", &mut params), "");
        assert!(params.is_empty());
    }
}
