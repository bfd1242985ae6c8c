use std::sync::Arc;

use crate::error::Result;
use crate::statement::Statement;
use crate::traits::DatabaseDriver;
use crate::types::{Params, SqlValue};

/// INSERT builder.
/// Values are bound by name, one `:column` placeholder per column.
pub struct InsertBuilder {
    driver: Arc<dyn DatabaseDriver>,
    table: String,
    values: Vec<(String, SqlValue)>,
}

impl InsertBuilder {
    pub(crate) fn new(driver: Arc<dyn DatabaseDriver>, table: &str) -> Self {
        Self {
            driver,
            table: table.to_string(),
            values: Vec::new(),
        }
    }

    /// Add `(column, value)` pairs; column order follows iteration order.
    pub fn values<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.values
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Build the SQL string and named parameters.
    fn build_sql(&self) -> (String, Params) {
        let columns: Vec<&str> = self.values.iter().map(|(c, _)| c.as_str()).collect();
        let placeholders: Vec<String> = columns.iter().map(|c| format!(":{}", c)).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(","),
            placeholders.join(",")
        );

        (sql, Params::Named(self.values.clone()))
    }

    /// Prepare and execute the statement.
    pub async fn execute(self) -> Result<bool> {
        let (sql, params) = self.build_sql();
        let statement = Statement::prepare(self.driver, &sql).await?;
        statement.execute(&params).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::InMemoryTestDriver;

    fn builder(table: &str) -> InsertBuilder {
        InsertBuilder::new(Arc::new(InMemoryTestDriver::new()), table)
    }

    #[test]
    fn test_build_insert() {
        let builder = builder("users").values([
            ("name", SqlValue::from("Ann")),
            ("age", SqlValue::from(30)),
        ]);

        let (sql, params) = builder.build_sql();
        assert_eq!(sql, "INSERT INTO users (name,age) VALUES (:name,:age)");
        assert_eq!(
            params,
            Params::Named(vec![
                ("name".to_string(), SqlValue::from("Ann")),
                ("age".to_string(), SqlValue::Int32(30)),
            ])
        );
    }

    #[test]
    fn test_build_insert_keeps_iteration_order() {
        let builder = builder("t").values([("b", 2), ("a", 1), ("c", 3)]);
        let (sql, _) = builder.build_sql();
        assert_eq!(sql, "INSERT INTO t (b,a,c) VALUES (:b,:a,:c)");
    }
}
