pub mod error;
pub mod line;
pub mod types;

pub use error::{AdapterError, BoxError, Result};
pub use line::{line_from_row, load_policy_line, load_policy_row, parse_policy_line};
pub use types::{COLUMN_NAMES, CasbinRule, MAX_FIELDS, RuleFilter};
