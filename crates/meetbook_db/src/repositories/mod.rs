//! SQL repositories backing the scheduling core.

pub mod scheduling_sql;
mod schema;

pub use scheduling_sql::SqlSchedulingRepository;
