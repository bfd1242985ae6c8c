mod delete;
mod insert;
mod update;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use update::UpdateBuilder;
