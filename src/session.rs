//! Statement dispatch: parses SQL text, runs it against the Catalog, and
//! drives the WAL/TransactionManager.

use crate::ast::{SelectColumns, Statement};
use crate::catalog::Catalog;
use crate::error::{MiniDbError, MiniDbResult};
use crate::planner;
use crate::sql::translate;
use crate::storage::rid::Rid;
use crate::storage::schema::{Column, Schema};
use crate::storage::tuple::{Tuple, Value};
use crate::txn::transaction::TransactionManager;
use crate::txn::wal::{LogRecord, Wal};
use std::sync::Arc;

/// One execute() never panics and never throws; every outcome, success or
/// failure, is a value.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    TableCreated(String),
    IndexCreated { table: String, column: String },
    RowInserted(Rid),
    Select { schema: Arc<Schema>, rows: Vec<Tuple> },
    TransactionStarted(u64),
    TransactionCommitted(u64),
    TransactionAborted(u64),
}

/// Distinguishes a failure that originates in the SQL-text translation
/// shim from one that originates in execution against the catalog.
#[derive(Debug, Clone)]
pub enum ExecError {
    Parse(MiniDbError),
    Execute(MiniDbError),
}

pub struct Session<'a> {
    catalog: &'a mut Catalog,
    txn_manager: TransactionManager,
    wal: Wal,
    current_txn: Option<u64>,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        Session {
            catalog,
            txn_manager: TransactionManager::new(),
            wal: Wal::new(),
            current_txn: None,
        }
    }

    pub fn wal(&self) -> &Wal {
        &self.wal
    }

    pub fn current_txn(&self) -> Option<u64> {
        self.current_txn
    }

    pub fn execute(&mut self, sql_text: &str) -> Result<ExecOutcome, ExecError> {
        let statement = translate(sql_text).map_err(ExecError::Parse)?;
        self.dispatch(statement).map_err(ExecError::Execute)
    }

    fn dispatch(&mut self, statement: Statement) -> MiniDbResult<ExecOutcome> {
        match statement {
            Statement::CreateTable { name, columns } => {
                let schema = Schema::new(
                    columns
                        .into_iter()
                        .map(|c| Column::new(c.name, c.data_type, c.nullable))
                        .collect(),
                );
                self.catalog.create_table(&name, schema)?;
                Ok(ExecOutcome::TableCreated(name))
            }
            Statement::CreateIndex { table, column, .. } => {
                planner::plan_create_index(&table, &column, self.catalog)?;
                Ok(ExecOutcome::IndexCreated { table, column })
            }
            Statement::Insert { table, values } => self.execute_insert(table, values),
            Statement::Select {
                columns,
                table,
                join,
                filter,
            } => self.execute_select(&columns, &table, &join, &filter),
            Statement::Begin => self.execute_begin(),
            Statement::Commit => self.execute_commit(),
            Statement::Abort => self.execute_abort(),
        }
    }

    fn execute_insert(&mut self, table: String, values: Vec<Value>) -> MiniDbResult<ExecOutcome> {
        self.bind_current_txn(&table);
        let rid = planner::plan_insert(&table, values.clone(), self.catalog)?;
        if let Some(txn_id) = self.current_txn {
            self.wal.append(LogRecord::Insert {
                txn_id,
                table_name: table,
                values,
            });
        }
        Ok(ExecOutcome::RowInserted(rid))
    }

    fn execute_select(
        &mut self,
        columns: &SelectColumns,
        table: &str,
        join: &Option<crate::ast::JoinClause>,
        filter: &Option<crate::ast::Condition>,
    ) -> MiniDbResult<ExecOutcome> {
        self.bind_current_txn(table);
        if let Some(join) = join {
            self.bind_current_txn(&join.table);
        }
        let mut op = planner::plan_select(columns, table, join, filter, self.catalog)?;
        let schema = op.schema();
        let mut rows = Vec::new();
        while let Some(tuple) = op.next()? {
            rows.push(tuple);
        }
        Ok(ExecOutcome::Select { schema, rows })
    }

    fn execute_begin(&mut self) -> MiniDbResult<ExecOutcome> {
        if self.current_txn.is_some() {
            return Err(MiniDbError::TransactionAlreadyExist);
        }
        let id = self.txn_manager.begin();
        self.current_txn = Some(id);
        self.wal.append(LogRecord::Begin(id));
        Ok(ExecOutcome::TransactionStarted(id))
    }

    fn execute_commit(&mut self) -> MiniDbResult<ExecOutcome> {
        let id = self.current_txn.ok_or(MiniDbError::TransactionNotExist)?;
        self.txn_manager.commit(id)?;
        self.wal.append(LogRecord::Commit(id));
        self.current_txn = None;
        Ok(ExecOutcome::TransactionCommitted(id))
    }

    fn execute_abort(&mut self) -> MiniDbResult<ExecOutcome> {
        let id = self.current_txn.ok_or(MiniDbError::TransactionNotExist)?;
        self.txn_manager.abort(id)?;
        self.wal.append(LogRecord::Abort(id));
        self.current_txn = None;
        Ok(ExecOutcome::TransactionAborted(id))
    }

    fn bind_current_txn(&self, table_name: &str) {
        if let Some(table) = self.catalog.get_table(table_name) {
            table.borrow_mut().bind_txn(self.current_txn);
        }
    }
}
