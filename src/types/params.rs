use crate::types::SqlValue;

/// Parameters bound to a statement.
///
/// Named parameters keep insertion order. Keys may be given with or without
/// the leading `:` of the placeholder.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    #[default]
    None,
    Positional(Vec<SqlValue>),
    Named(Vec<(String, SqlValue)>),
}

impl Params {
    /// Builds positional parameters from any iterator of values.
    pub fn positional<V, I>(values: I) -> Self
    where
        V: Into<SqlValue>,
        I: IntoIterator<Item = V>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Builds named parameters from `(name, value)` pairs, preserving order.
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<SqlValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Positional(values) => values.len(),
            Params::Named(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a named value. The name is compared without its leading `:`.
    pub fn get_named(&self, name: &str) -> Option<&SqlValue> {
        let name = name.trim_start_matches(':');
        match self {
            Params::Named(pairs) => pairs
                .iter()
                .find(|(key, _)| key.trim_start_matches(':') == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl From<Vec<SqlValue>> for Params {
    fn from(values: Vec<SqlValue>) -> Self {
        Params::Positional(values)
    }
}

impl From<Vec<(String, SqlValue)>> for Params {
    fn from(pairs: Vec<(String, SqlValue)>) -> Self {
        Params::Named(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_lookup_ignores_colon_prefix() {
        let params = Params::named([(":name", "Ann"), ("age", "30")]);
        assert_eq!(params.get_named("name"), Some(&SqlValue::from("Ann")));
        assert_eq!(params.get_named(":age"), Some(&SqlValue::from("30")));
        assert_eq!(params.get_named("missing"), None);
    }

    #[test]
    fn test_len() {
        assert!(Params::None.is_empty());
        assert_eq!(Params::positional([1, 2, 3]).len(), 3);
    }
}
