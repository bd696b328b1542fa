//! The minimal SQL AST the planner consumes. This crate never
//! hand-writes a lexer or recursive-descent parser for it — `sql::translate`
//! builds it out of `sqlparser`'s general-purpose SQL AST.

use crate::storage::schema::DataType;
use crate::storage::tuple::{CompareOp, Value};

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

#[derive(Debug, Clone)]
pub struct JoinClause {
    pub table: String,
    pub left_column: String,
    pub right_column: String,
}

#[derive(Debug, Clone)]
pub enum Condition {
    Simple {
        column: String,
        op: CompareOp,
        value: Value,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

#[derive(Debug, Clone)]
pub enum SelectColumns {
    All,
    Named(Vec<String>),
}

#[derive(Debug, Clone)]
pub enum Statement {
    CreateTable {
        name: String,
        columns: Vec<ColumnDef>,
    },
    CreateIndex {
        index_name: String,
        table: String,
        column: String,
    },
    Insert {
        table: String,
        values: Vec<Value>,
    },
    Select {
        columns: SelectColumns,
        table: String,
        join: Option<JoinClause>,
        filter: Option<Condition>,
    },
    Begin,
    Commit,
    Abort,
}
