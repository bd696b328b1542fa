//! MiniDB: a single-node embeddable relational storage engine with a
//! small SQL dialect. See each module for the component it implements;
//! the dependency order runs leaves-first: page -> disk manager ->
//! buffer pool -> slotted page -> tuple/schema -> heap file -> B+Tree ->
//! table -> catalog -> executor -> planner -> lock manager ->
//! transactions/WAL/recovery -> session.

pub mod ast;
pub mod btree;
pub mod catalog;
pub mod error;
pub mod exec;
pub mod logging;
pub mod planner;
pub mod session;
pub mod sql;
pub mod storage;
pub mod table;
pub mod txn;

pub use catalog::Catalog;
pub use error::{MiniDbError, MiniDbResult};
pub use session::{ExecError, ExecOutcome, Session};
pub use storage::schema::{Column, DataType, Schema};
pub use storage::tuple::{CompareOp, Tuple, Value};
