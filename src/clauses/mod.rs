mod condition;

pub use condition::{Condition, ConditionList, Operator};
