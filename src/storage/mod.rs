pub mod engine;
pub mod memory;
pub mod postgres;
pub mod table;

pub use engine::RuleStore;
pub use memory::MemoryRuleStore;
pub use postgres::PgRuleStore;
pub use table::RuleTable;
