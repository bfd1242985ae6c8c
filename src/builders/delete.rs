use std::sync::Arc;

use crate::clauses::ConditionList;
use crate::error::{DbError, Result};
use crate::statement::Statement;
use crate::traits::DatabaseDriver;
use crate::types::{Params, SqlValue};

/// DELETE builder. Conditions are bound positionally in iteration order.
pub struct DeleteBuilder {
    driver: Arc<dyn DatabaseDriver>,
    table: String,
    conditions: ConditionList,
}

impl DeleteBuilder {
    pub(crate) fn new(driver: Arc<dyn DatabaseDriver>, table: &str) -> Self {
        Self {
            driver,
            table: table.to_string(),
            conditions: ConditionList::new(),
        }
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

    fn build_sql(&self) -> Result<(String, Params)> {
        if self.conditions.is_empty() {
            return Err(DbError::EmptyClause("WHERE"));
        }

        let mut params = Vec::with_capacity(self.conditions.len());
        let where_sql = self.conditions.build_sql(" AND ", &mut params);

        let sql = format!("DELETE FROM {} WHERE {}", self.table, where_sql);
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

    fn builder(table: &str) -> DeleteBuilder {
        DeleteBuilder::new(Arc::new(InMemoryTestDriver::new()), table)
    }

    #[test]
    fn test_build_delete() {
        let (sql, params) = builder("users").where_eq([("id", 5)]).build_sql().unwrap();
        assert_eq!(sql, "DELETE FROM users WHERE id = ?");
        assert_eq!(params, Params::positional([5]));
    }

    #[test]
    fn test_build_delete_multiple_conditions() {
        let (sql, params) = builder("sessions")
            .where_eq([("user_id", 9), ("device", 2)])
            .build_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM sessions WHERE user_id = ? AND device = ?");
        assert_eq!(params, Params::positional([9, 2]));
    }

    #[test]
    fn test_empty_where_rejected() {
        let empty: [(&str, i32); 0] = [];
        let result = builder("users").where_eq(empty).build_sql();
        assert!(matches!(result, Err(DbError::EmptyClause("WHERE"))));
    }
}
