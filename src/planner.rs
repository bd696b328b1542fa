//! Maps a statement AST to an executor tree, choosing `IndexScan` over
//! `SeqScan` when the where-clause permits it, via a five-step pipeline:
//! resolve table, choose entry, optional join wrap, optional filter
//! wrap, optional project wrap.

use crate::ast::{Condition, JoinClause, SelectColumns};
use crate::catalog::Catalog;
use crate::error::{MiniDbError, MiniDbResult};
use crate::exec::{IndexCondition, Operator};
use crate::storage::rid::Rid;
use crate::storage::schema::Schema;
use crate::storage::tuple::{CompareOp, Tuple, Value};
use crate::table::Table;
use std::sync::Arc;

/// Eligible only when the where-clause is itself a bare `Simple`
/// condition (not wrapped in And/Or/Not) on an integer column that has
/// an index, and the operator is not `!=`.
fn choose_index(table: &Table, filter: &Condition) -> Option<(String, IndexCondition)> {
    let (column, op, value) = match filter {
        Condition::Simple { column, op, value } => (column, op, value),
        _ => return None,
    };
    if *op == CompareOp::Ne {
        return None;
    }
    let v = match value {
        Value::Integer(v) => *v,
        _ => return None,
    };
    if !table.has_index(column) {
        return None;
    }
    let condition = match op {
        CompareOp::Eq => IndexCondition::Eq(v),
        CompareOp::Ge => IndexCondition::Ge(v),
        CompareOp::Gt => IndexCondition::Gt(v),
        CompareOp::Le => IndexCondition::Le(v),
        CompareOp::Lt => IndexCondition::Lt(v),
        CompareOp::Ne => unreachable!("filtered above"),
    };
    Some((column.clone(), condition))
}

pub fn plan_select(
    columns: &SelectColumns,
    table_name: &str,
    join: &Option<JoinClause>,
    filter: &Option<Condition>,
    catalog: &Catalog,
) -> MiniDbResult<Operator> {
    let table_rc = catalog.require_table(table_name)?;

    let index_choice = filter
        .as_ref()
        .and_then(|f| choose_index(&table_rc.borrow(), f));
    let used_index = index_choice.is_some();

    let mut entry = match index_choice {
        Some((column, condition)) => Operator::index_scan(&table_rc, &column, condition),
        None => Operator::seq_scan(&table_rc)?,
    };

    if let Some(join) = join {
        let right_rc = catalog.require_table(&join.table)?;
        let left_schema = entry.schema();
        let right_schema = Arc::new(right_rc.borrow().schema().clone());

        let left_idx = left_schema
            .column_index(&join.left_column)
            .ok_or_else(|| MiniDbError::ColumnNotFound(join.left_column.clone()))?;
        let right_idx = right_schema
            .column_index(&join.right_column)
            .ok_or_else(|| MiniDbError::ColumnNotFound(join.right_column.clone()))?;

        let merged_schema = Arc::new(Schema::concat(&left_schema, &right_schema));
        entry = Operator::nested_loop_join(entry, &right_rc, left_idx, right_idx, merged_schema)?;
    }

    if !used_index {
        if let Some(filter) = filter {
            entry = Operator::filter(entry, filter.clone());
        }
    }

    if let SelectColumns::Named(names) = columns {
        let schema = entry.schema();
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = schema
                .column_index(name)
                .ok_or_else(|| MiniDbError::ColumnNotFound(name.clone()))?;
            indices.push(idx);
        }
        let projected = Arc::new(schema.project(&indices));
        entry = Operator::project(entry, indices, projected);
    }

    Ok(entry)
}

pub fn plan_insert(table_name: &str, values: Vec<Value>, catalog: &Catalog) -> MiniDbResult<Rid> {
    let table_rc = catalog.require_table(table_name)?;
    let schema = Arc::new(table_rc.borrow().schema().clone());
    if values.len() != schema.len() {
        return Err(MiniDbError::ColumnCountMismatch {
            expected: schema.len(),
            actual: values.len(),
        });
    }
    let tuple = Tuple::new(schema, values);
    table_rc.borrow_mut().insert(tuple)
}

pub fn plan_create_index(table_name: &str, column: &str, catalog: &Catalog) -> MiniDbResult<()> {
    let table_rc = catalog.require_table(table_name)?;
    table_rc.borrow_mut().create_index(column)
}
