//! Where-condition evaluation, shared by `Filter` and by the planner's
//! index-selection logic.

use crate::ast::Condition;
use crate::storage::tuple::Tuple;

/// Looks up `column` by name in `tuple`'s schema, returning `false` if
/// absent; `and`/`or`/`not` combine recursively.
pub fn eval(condition: &Condition, tuple: &Tuple) -> bool {
    match condition {
        Condition::Simple { column, op, value } => match tuple.schema.column_index(column) {
            Some(idx) => tuple.values[idx].compare(*op, value),
            None => false,
        },
        Condition::And(l, r) => eval(l, tuple) && eval(r, tuple),
        Condition::Or(l, r) => eval(l, tuple) || eval(r, tuple),
        Condition::Not(c) => !eval(c, tuple),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::{Column, DataType, Schema};
    use crate::storage::tuple::{CompareOp, Value};
    use std::sync::Arc;

    fn tuple() -> Tuple {
        let schema = Arc::new(Schema::new(vec![
            Column::new("id", DataType::Integer, false),
            Column::new("name", DataType::Text, true),
        ]));
        Tuple::new(schema, vec![Value::Integer(20), Value::Text(b"Bob".to_vec())])
    }

    #[test]
    fn simple_condition_on_missing_column_is_false() {
        let cond = Condition::Simple {
            column: "nope".into(),
            op: CompareOp::Eq,
            value: Value::Integer(1),
        };
        assert!(!eval(&cond, &tuple()));
    }

    #[test]
    fn and_or_not_compose() {
        let gt15 = Condition::Simple {
            column: "id".into(),
            op: CompareOp::Gt,
            value: Value::Integer(15),
        };
        let lt10 = Condition::Simple {
            column: "id".into(),
            op: CompareOp::Lt,
            value: Value::Integer(10),
        };
        let cond = Condition::And(Box::new(gt15.clone()), Box::new(Condition::Not(Box::new(lt10))));
        assert!(eval(&cond, &tuple()));

        let cond2 = Condition::Or(Box::new(gt15), Box::new(Condition::Simple {
            column: "id".into(),
            op: CompareOp::Eq,
            value: Value::Integer(999),
        }));
        assert!(eval(&cond2, &tuple()));
    }
}
