//! Translates `sqlparser`'s general-purpose SQL AST into this crate's
//! own minimal AST (see `crate::ast`). The lexer and parser are out of
//! scope for this crate; this module is pure format conversion and
//! defines no new SQL surface of its own.

use crate::ast::{ColumnDef, Condition, JoinClause, SelectColumns, Statement};
use crate::error::MiniDbError;
use crate::storage::schema::DataType;
use crate::storage::tuple::{CompareOp, Value};
use sqlparser::ast::{
    self, BinaryOperator, ColumnOption, Expr, Join, JoinConstraint, JoinOperator, Query,
    SelectItem, SetExpr, TableFactor, UnaryOperator,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

pub fn translate(sql_text: &str) -> Result<Statement, MiniDbError> {
    let trimmed = sql_text.trim().trim_end_matches(';').trim();
    match trimmed.to_ascii_uppercase().as_str() {
        "BEGIN" | "START TRANSACTION" => return Ok(Statement::Begin),
        "COMMIT" => return Ok(Statement::Commit),
        "ABORT" | "ROLLBACK" => return Ok(Statement::Abort),
        _ => {}
    }

    let dialect = GenericDialect {};
    let mut ast = Parser::parse_sql(&dialect, sql_text)
        .map_err(|e| MiniDbError::UnexpectedToken(e.to_string()))?;
    if ast.len() != 1 {
        return Err(MiniDbError::UnexpectedToken(
            "expected exactly one statement".to_string(),
        ));
    }
    translate_statement(ast.remove(0))
}

fn translate_statement(stmt: ast::Statement) -> Result<Statement, MiniDbError> {
    match stmt {
        ast::Statement::CreateTable { name, columns, .. } => {
            let columns = columns
                .into_iter()
                .map(|c| {
                    let nullable = !c
                        .options
                        .iter()
                        .any(|o| matches!(o.option, ColumnOption::NotNull));
                    let data_type = translate_data_type(&c.data_type)?;
                    Ok(ColumnDef {
                        name: c.name.value,
                        data_type,
                        nullable,
                    })
                })
                .collect::<Result<Vec<_>, MiniDbError>>()?;
            Ok(Statement::CreateTable {
                name: name.to_string(),
                columns,
            })
        }
        ast::Statement::CreateIndex {
            name,
            table_name,
            columns,
            ..
        } => {
            let column = columns
                .first()
                .map(|c| c.to_string())
                .ok_or_else(|| MiniDbError::UnexpectedToken("CREATE INDEX needs a column".into()))?;
            Ok(Statement::CreateIndex {
                index_name: name.map(|n| n.to_string()).unwrap_or_default(),
                table: table_name.to_string(),
                column,
            })
        }
        ast::Statement::Insert {
            table_name, source, ..
        } => {
            let values = translate_insert_values(*source)?;
            Ok(Statement::Insert {
                table: table_name.to_string(),
                values,
            })
        }
        ast::Statement::Query(query) => translate_select(*query),
        ast::Statement::StartTransaction { .. } => Ok(Statement::Begin),
        ast::Statement::Commit { .. } => Ok(Statement::Commit),
        ast::Statement::Rollback { .. } => Ok(Statement::Abort),
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported statement: {}",
            other
        ))),
    }
}

fn translate_data_type(dt: &ast::DataType) -> Result<DataType, MiniDbError> {
    match dt {
        ast::DataType::Int(_)
        | ast::DataType::Integer(_)
        | ast::DataType::BigInt(_)
        | ast::DataType::SmallInt(_) => Ok(DataType::Integer),
        ast::DataType::Text | ast::DataType::Varchar(_) | ast::DataType::Char(_) | ast::DataType::String => {
            Ok(DataType::Text)
        }
        ast::DataType::Boolean => Ok(DataType::Boolean),
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported column type: {:?}",
            other
        ))),
    }
}

fn translate_insert_values(source: Query) -> Result<Vec<Value>, MiniDbError> {
    match *source.body {
        SetExpr::Values(values) => {
            let row = values
                .0
                .into_iter()
                .next()
                .ok_or_else(|| MiniDbError::UnexpectedToken("INSERT with no values row".into()))?;
            row.into_iter().map(|e| translate_literal(&e)).collect()
        }
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported INSERT source: {:?}",
            other
        ))),
    }
}

fn translate_literal(expr: &Expr) -> Result<Value, MiniDbError> {
    match expr {
        Expr::Value(ast::Value::Number(s, _)) => s
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| MiniDbError::UnexpectedToken(format!("bad integer literal: {}", s))),
        Expr::Value(ast::Value::SingleQuotedString(s)) => Ok(Value::Text(s.as_bytes().to_vec())),
        Expr::Value(ast::Value::Boolean(b)) => Ok(Value::Boolean(*b)),
        Expr::Value(ast::Value::Null) => Ok(Value::Null),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => match translate_literal(expr)? {
            Value::Integer(v) => Ok(Value::Integer(-v)),
            _ => Err(MiniDbError::UnexpectedToken("bad negative literal".into())),
        },
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported literal: {:?}",
            other
        ))),
    }
}

fn translate_select(query: Query) -> Result<Statement, MiniDbError> {
    let select = match *query.body {
        SetExpr::Select(select) => select,
        other => {
            return Err(MiniDbError::UnexpectedToken(format!(
                "unsupported query body: {:?}",
                other
            )))
        }
    };

    let columns = translate_select_columns(&select.projection)?;

    let table_with_joins = select
        .from
        .first()
        .ok_or_else(|| MiniDbError::UnexpectedToken("SELECT without FROM".into()))?;
    let table = table_name_of(&table_with_joins.relation)?;

    let join = match table_with_joins.joins.first() {
        Some(j) => Some(translate_join(j, &table)?),
        None => None,
    };

    let filter = match select.selection {
        Some(expr) => Some(translate_expr(&expr)?),
        None => None,
    };

    Ok(Statement::Select {
        columns,
        table,
        join,
        filter,
    })
}

fn translate_select_columns(items: &[SelectItem]) -> Result<SelectColumns, MiniDbError> {
    if items.len() == 1 && matches!(items[0], SelectItem::Wildcard(_)) {
        return Ok(SelectColumns::All);
    }
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        match item {
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => names.push(ident.value.clone()),
            SelectItem::UnnamedExpr(Expr::CompoundIdentifier(idents)) => {
                names.push(idents.last().unwrap().value.clone())
            }
            other => {
                return Err(MiniDbError::UnexpectedToken(format!(
                    "unsupported select item: {:?}",
                    other
                )))
            }
        }
    }
    Ok(SelectColumns::Named(names))
}

fn table_name_of(factor: &TableFactor) -> Result<String, MiniDbError> {
    match factor {
        TableFactor::Table { name, .. } => Ok(name.to_string()),
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported FROM clause: {:?}",
            other
        ))),
    }
}

fn translate_join(join: &Join, right_table_hint: &str) -> Result<JoinClause, MiniDbError> {
    let table = table_name_of(&join.relation)?;
    let on_expr = match &join.join_operator {
        JoinOperator::Inner(JoinConstraint::On(expr)) => expr,
        other => {
            return Err(MiniDbError::UnexpectedToken(format!(
                "unsupported join operator: {:?}",
                other
            )))
        }
    };

    let (left_ident, right_ident) = match on_expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::Eq,
            right,
        } => (column_name(left)?, column_name(right)?),
        other => {
            return Err(MiniDbError::UnexpectedToken(format!(
                "unsupported join condition: {:?}",
                other
            )))
        }
    };

    // Whichever identifier is qualified by the joined table (or by the
    // hinted right table name) is the right-hand join column.
    let _ = right_table_hint;
    let (left_column, right_column) = if qualifies(on_expr_lhs_table(on_expr), &table) {
        (right_ident, left_ident)
    } else {
        (left_ident, right_ident)
    };

    Ok(JoinClause {
        table,
        left_column,
        right_column,
    })
}

fn on_expr_lhs_table(expr: &Expr) -> Option<String> {
    match expr {
        Expr::BinaryOp { left, .. } => match left.as_ref() {
            Expr::CompoundIdentifier(idents) if idents.len() >= 2 => {
                Some(idents[idents.len() - 2].value.clone())
            }
            _ => None,
        },
        _ => None,
    }
}

fn qualifies(table_of_lhs: Option<String>, right_table: &str) -> bool {
    matches!(table_of_lhs, Some(t) if t.eq_ignore_ascii_case(right_table))
}

fn column_name(expr: &Expr) -> Result<String, MiniDbError> {
    match expr {
        Expr::Identifier(ident) => Ok(ident.value.clone()),
        Expr::CompoundIdentifier(idents) => Ok(idents.last().unwrap().value.clone()),
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported join column reference: {:?}",
            other
        ))),
    }
}

fn translate_expr(expr: &Expr) -> Result<Condition, MiniDbError> {
    match expr {
        Expr::Nested(inner) => translate_expr(inner),
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr,
        } => Ok(Condition::Not(Box::new(translate_expr(expr)?))),
        Expr::BinaryOp { left, op, right } => match op {
            BinaryOperator::And => Ok(Condition::And(
                Box::new(translate_expr(left)?),
                Box::new(translate_expr(right)?),
            )),
            BinaryOperator::Or => Ok(Condition::Or(
                Box::new(translate_expr(left)?),
                Box::new(translate_expr(right)?),
            )),
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq => translate_simple(left, *op, right),
            other => Err(MiniDbError::UnexpectedToken(format!(
                "unsupported operator: {:?}",
                other
            ))),
        },
        other => Err(MiniDbError::UnexpectedToken(format!(
            "unsupported where expression: {:?}",
            other
        ))),
    }
}

fn translate_simple(
    left: &Expr,
    op: BinaryOperator,
    right: &Expr,
) -> Result<Condition, MiniDbError> {
    let (column, value) = match (column_name(left), translate_literal(right)) {
        (Ok(col), Ok(val)) => (col, val),
        _ => {
            let col = column_name(right)?;
            let val = translate_literal(left)?;
            (col, val)
        }
    };
    let op = match op {
        BinaryOperator::Eq => CompareOp::Eq,
        BinaryOperator::NotEq => CompareOp::Ne,
        BinaryOperator::Lt => CompareOp::Lt,
        BinaryOperator::LtEq => CompareOp::Le,
        BinaryOperator::Gt => CompareOp::Gt,
        BinaryOperator::GtEq => CompareOp::Ge,
        _ => unreachable!("filtered by caller"),
    };
    Ok(Condition::Simple { column, op, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_where(sql: &str) -> Condition {
        match translate(sql).expect("translate") {
            Statement::Select { filter, .. } => filter.expect("filter present"),
            other => panic!("expected Select, got {:?}", other),
        }
    }

    #[test]
    fn negative_integer_literal() {
        let cond = parse_where("SELECT * FROM t WHERE id = -5");
        match cond {
            Condition::Simple { column, op, value } => {
                assert_eq!(column, "id");
                assert_eq!(op, CompareOp::Eq);
                assert_eq!(value, Value::Integer(-5));
            }
            other => panic!("expected Simple, got {:?}", other),
        }
    }

    #[test]
    fn not_wraps_its_operand() {
        let cond = parse_where("SELECT * FROM t WHERE NOT id = 5");
        match cond {
            Condition::Not(inner) => match *inner {
                Condition::Simple { op, .. } => assert_eq!(op, CompareOp::Eq),
                other => panic!("expected Simple, got {:?}", other),
            },
            other => panic!("expected Not, got {:?}", other),
        }
    }

    #[test]
    fn and_or_nest_by_sqlparser_precedence() {
        // AND binds tighter than OR: `a OR b AND c` is `a OR (b AND c)`.
        let cond = parse_where("SELECT * FROM t WHERE id = 1 OR id = 2 AND id = 3");
        match cond {
            Condition::Or(left, right) => {
                assert!(matches!(*left, Condition::Simple { .. }));
                assert!(matches!(*right, Condition::And(_, _)));
            }
            other => panic!("expected Or, got {:?}", other),
        }
    }

    #[test]
    fn join_on_clause_with_left_table_qualified_first() {
        let stmt =
            translate("SELECT * FROM users JOIN orders ON users.id = orders.user_id").unwrap();
        match stmt {
            Statement::Select { join: Some(j), .. } => {
                assert_eq!(j.table, "orders");
                assert_eq!(j.left_column, "id");
                assert_eq!(j.right_column, "user_id");
            }
            other => panic!("expected Select with join, got {:?}", other),
        }
    }

    #[test]
    fn join_on_clause_with_right_table_qualified_first() {
        let stmt =
            translate("SELECT * FROM users JOIN orders ON orders.user_id = users.id").unwrap();
        match stmt {
            Statement::Select { join: Some(j), .. } => {
                assert_eq!(j.table, "orders");
                assert_eq!(j.left_column, "id");
                assert_eq!(j.right_column, "user_id");
            }
            other => panic!("expected Select with join, got {:?}", other),
        }
    }

    #[test]
    fn create_index_extracts_table_and_column() {
        let stmt = translate("CREATE INDEX idx ON users (id)").unwrap();
        match stmt {
            Statement::CreateIndex { table, column, .. } => {
                assert_eq!(table, "users");
                assert_eq!(column, "id");
            }
            other => panic!("expected CreateIndex, got {:?}", other),
        }
    }
}
