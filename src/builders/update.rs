use std::sync::Arc;

use crate::clauses::ConditionList;
use crate::error::{DbError, Result};
use crate::statement::Statement;
use crate::traits::DatabaseDriver;
use crate::types::{Params, SqlValue};

/// UPDATE builder.
///
/// Both clauses use positional placeholders. Parameters are collected while
/// the SET clause and then the WHERE clause are written, so binding order is
/// always clause order.
pub struct UpdateBuilder {
    driver: Arc<dyn DatabaseDriver>,
    table: String,
    assignments: ConditionList,
    conditions: ConditionList,
}

impl UpdateBuilder {
    pub(crate) fn new(driver: Arc<dyn DatabaseDriver>, table: &str) -> Self {
        Self {
            driver,
            table: table.to_string(),
            assignments: ConditionList::new(),
            conditions: ConditionList::new(),
        }
    }

    /// Columns to assign, as `(column, value)` pairs.
    pub fn set<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.assignments = ConditionList::equalities(pairs);
        self
    }

    /// Equality conditions, joined with AND.
    pub fn where_eq<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.conditions = ConditionList::equalities(pairs);
        self
    }

    /// Build the SQL query string and positional parameters.
    fn build_sql(&self) -> Result<(String, Params)> {
        if self.assignments.is_empty() {
            return Err(DbError::EmptyClause("SET"));
        }
        if self.conditions.is_empty() {
            return Err(DbError::EmptyClause("WHERE"));
        }

        let mut params = Vec::with_capacity(self.assignments.len() + self.conditions.len());
        let set_sql = self.assignments.build_sql(",", &mut params);
        let where_sql = self.conditions.build_sql(" AND ", &mut params);

        let sql = format!("UPDATE {} SET {} WHERE {}", self.table, set_sql, where_sql);
        Ok((sql, Params::Positional(params)))
    }

    /// Prepare and execute the statement.
    pub async fn execute(self) -> Result<bool> {
        let (sql, params) = self.build_sql()?;
        let statement = Statement::prepare(self.driver, &sql).await?;
        statement.execute(&params).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::InMemoryTestDriver;

    fn builder(table: &str) -> UpdateBuilder {
        UpdateBuilder::new(Arc::new(InMemoryTestDriver::new()), table)
    }

    #[test]
    fn test_build_update() {
        let builder = builder("users").set([("age", 31)]).where_eq([("id", 5)]);

        let (sql, params) = builder.build_sql().unwrap();
        assert_eq!(sql, "UPDATE users SET age = ? WHERE id = ?");
        assert_eq!(params, Params::positional([31, 5]));
    }

    #[test]
    fn test_set_values_precede_where_values() {
        let builder = builder("users")
            .set([("name", SqlValue::from("Bob")), ("age", SqlValue::from(40))])
            .where_eq([("id", SqlValue::from(7)), ("tenant", SqlValue::from("acme"))]);

        let (sql, params) = builder.build_sql().unwrap();
        assert_eq!(
            sql,
            "UPDATE users SET name = ?,age = ? WHERE id = ? AND tenant = ?"
        );
        assert_eq!(
            params,
            Params::Positional(vec![
                SqlValue::from("Bob"),
                SqlValue::Int32(40),
                SqlValue::Int32(7),
                SqlValue::from("acme"),
            ])
        );
    }

    #[test]
    fn test_empty_clauses_rejected() {
        let no_set = builder("users").where_eq([("id", 1)]);
        assert!(matches!(no_set.build_sql(), Err(DbError::EmptyClause("SET"))));

        let no_where = builder("users").set([("age", 1)]);
        assert!(matches!(no_where.build_sql(), Err(DbError::EmptyClause("WHERE"))));
    }
}
