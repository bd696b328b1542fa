//! Pull-model operators: each exposes `next()`, returning tuples the
//! caller owns. Modeled as a tagged enum rather than a `dyn Trait`
//! object — a closed variant set over five operator kinds needs no
//! dynamic dispatch.

use super::condition::eval;
use crate::ast::Condition;
use crate::error::MiniDbResult;
use crate::storage::rid::Rid;
use crate::storage::schema::Schema;
use crate::storage::tuple::{CompareOp, Tuple};
use crate::table::Table;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub enum IndexCondition {
    Eq(i64),
    Ge(i64),
    Gt(i64),
    Le(i64),
    Lt(i64),
}

pub struct SeqScanState {
    schema: Arc<Schema>,
    rows: Vec<Tuple>,
    cursor: usize,
}

pub struct IndexScanState {
    schema: Arc<Schema>,
    table: Rc<RefCell<Table>>,
    column: String,
    index_condition: IndexCondition,
    rids: Option<Vec<Rid>>,
    cursor: usize,
}

pub struct FilterState {
    child: Box<Operator>,
    condition: Condition,
}

pub struct ProjectState {
    child: Box<Operator>,
    indices: Vec<usize>,
    schema: Arc<Schema>,
}

pub struct NestedLoopJoinState {
    left: Box<Operator>,
    right_rows: Vec<Tuple>,
    left_col_idx: usize,
    right_col_idx: usize,
    schema: Arc<Schema>,
    current_left: Option<Tuple>,
    right_cursor: usize,
}

pub enum Operator {
    SeqScan(SeqScanState),
    IndexScan(IndexScanState),
    Filter(FilterState),
    Project(ProjectState),
    NestedLoopJoin(NestedLoopJoinState),
}

impl Operator {
    pub fn seq_scan(table: &Rc<RefCell<Table>>) -> MiniDbResult<Operator> {
        let mut t = table.borrow_mut();
        let schema = Arc::new(t.schema().clone());
        let rows = t.scan()?.into_iter().map(|(_, tuple)| tuple).collect();
        Ok(Operator::SeqScan(SeqScanState {
            schema,
            rows,
            cursor: 0,
        }))
    }

    pub fn index_scan(
        table: &Rc<RefCell<Table>>,
        column: &str,
        index_condition: IndexCondition,
    ) -> Operator {
        let schema = Arc::new(table.borrow().schema().clone());
        Operator::IndexScan(IndexScanState {
            schema,
            table: Rc::clone(table),
            column: column.to_string(),
            index_condition,
            rids: None,
            cursor: 0,
        })
    }

    pub fn filter(child: Operator, condition: Condition) -> Operator {
        Operator::Filter(FilterState {
            child: Box::new(child),
            condition,
        })
    }

    pub fn project(child: Operator, indices: Vec<usize>, schema: Arc<Schema>) -> Operator {
        Operator::Project(ProjectState {
            child: Box::new(child),
            indices,
            schema,
        })
    }

    pub fn nested_loop_join(
        left: Operator,
        right_table: &Rc<RefCell<Table>>,
        left_col_idx: usize,
        right_col_idx: usize,
        schema: Arc<Schema>,
    ) -> MiniDbResult<Operator> {
        let right_rows = right_table
            .borrow_mut()
            .scan()?
            .into_iter()
            .map(|(_, tuple)| tuple)
            .collect();
        Ok(Operator::NestedLoopJoin(NestedLoopJoinState {
            left: Box::new(left),
            right_rows,
            left_col_idx,
            right_col_idx,
            schema,
            current_left: None,
            right_cursor: 0,
        }))
    }

    pub fn schema(&self) -> Arc<Schema> {
        match self {
            Operator::SeqScan(s) => s.schema.clone(),
            Operator::IndexScan(s) => s.schema.clone(),
            Operator::Filter(s) => s.child.schema(),
            Operator::Project(s) => s.schema.clone(),
            Operator::NestedLoopJoin(s) => s.schema.clone(),
        }
    }

    pub fn next(&mut self) -> MiniDbResult<Option<Tuple>> {
        match self {
            Operator::SeqScan(s) => {
                if s.cursor >= s.rows.len() {
                    return Ok(None);
                }
                let tuple = s.rows[s.cursor].clone();
                s.cursor += 1;
                Ok(Some(tuple))
            }
            Operator::IndexScan(s) => {
                if s.rids.is_none() {
                    let table = s.table.borrow();
                    let tree = table
                        .index(&s.column)
                        .expect("planner only builds IndexScan over an existing index");
                    let rids = match s.index_condition {
                        IndexCondition::Eq(v) => tree.search(v).into_iter().collect(),
                        IndexCondition::Ge(v) => tree.range_scan(v, i64::MAX),
                        IndexCondition::Gt(v) => tree.range_scan(v.saturating_add(1), i64::MAX),
                        IndexCondition::Le(v) => tree.range_scan(i64::MIN, v),
                        IndexCondition::Lt(v) => tree.range_scan(i64::MIN, v.saturating_sub(1)),
                    };
                    s.rids = Some(rids);
                    s.cursor = 0;
                }
                let rids = s.rids.as_ref().unwrap();
                while s.cursor < rids.len() {
                    let rid = rids[s.cursor];
                    s.cursor += 1;
                    if let Some(tuple) = s.table.borrow_mut().get(rid)? {
                        return Ok(Some(tuple));
                    }
                }
                Ok(None)
            }
            Operator::Filter(s) => loop {
                match s.child.next()? {
                    Some(tuple) => {
                        if eval(&s.condition, &tuple) {
                            return Ok(Some(tuple));
                        }
                    }
                    None => return Ok(None),
                }
            },
            Operator::Project(s) => match s.child.next()? {
                Some(tuple) => Ok(Some(tuple.project(&s.indices, s.schema.clone()))),
                None => Ok(None),
            },
            Operator::NestedLoopJoin(s) => loop {
                if s.current_left.is_none() {
                    s.current_left = s.left.next()?;
                    s.right_cursor = 0;
                    if s.current_left.is_none() {
                        return Ok(None);
                    }
                }

                while s.right_cursor < s.right_rows.len() {
                    let right = &s.right_rows[s.right_cursor];
                    s.right_cursor += 1;
                    let left = s.current_left.as_ref().unwrap();
                    if left.values[s.left_col_idx].compare(CompareOp::Eq, &right.values[s.right_col_idx])
                    {
                        return Ok(Some(Tuple::merge(left, right, s.schema.clone())));
                    }
                }
                s.current_left = None;
            },
        }
    }
}
