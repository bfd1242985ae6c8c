mod params;
mod row;
mod sql_value;

pub use params::Params;
pub use row::{QueryResult, RawQueryResult, Row};
pub use sql_value::SqlValue;
