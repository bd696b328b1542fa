//! Typed row values and the Tuple wire format: a null bitmap followed by
//! typed payloads in column order.

use super::schema::{Column, DataType, Schema};
use bit_vec::BitVec;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Text(Vec<u8>),
    Boolean(bool),
    Null,
}

impl Value {
    fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Integer(_) => Some(DataType::Integer),
            Value::Text(_) => Some(DataType::Text),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Null => None,
        }
    }

    /// Any comparison involving a null operand, or operands of differing
    /// types, is false. Booleans only support equality/inequality.
    pub fn compare(&self, op: CompareOp, other: &Value) -> bool {
        let (a, b) = match (self.data_type(), other.data_type()) {
            (Some(a), Some(b)) if a == b => (a, b),
            _ => return false,
        };
        let _ = b;
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => op.apply_ord(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => op.apply_ord(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => match op {
                CompareOp::Eq => a == b,
                CompareOp::Ne => a != b,
                _ => false,
            },
            _ => {
                let _ = a;
                false
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn apply_ord(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match (self, ord) {
            (CompareOp::Eq, Equal) => true,
            (CompareOp::Ne, Less) | (CompareOp::Ne, Greater) => true,
            (CompareOp::Lt, Less) => true,
            (CompareOp::Le, Less) | (CompareOp::Le, Equal) => true,
            (CompareOp::Gt, Greater) => true,
            (CompareOp::Ge, Greater) | (CompareOp::Ge, Equal) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tuple {
    pub schema: Arc<Schema>,
    pub values: Vec<Value>,
}

impl Tuple {
    pub fn new(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        Tuple { schema, values }
    }

    fn null_bitmap_len(n: usize) -> usize {
        (n + 7) / 8
    }

    pub fn serialize(&self) -> Vec<u8> {
        let n = self.values.len();
        let mut bitmap = BitVec::from_elem(n, false);
        for (i, v) in self.values.iter().enumerate() {
            if matches!(v, Value::Null) {
                bitmap.set(i, true);
            }
        }

        let mut out = bitmap.to_bytes();
        for v in &self.values {
            match v {
                Value::Integer(i) => out.extend_from_slice(&i.to_le_bytes()),
                Value::Boolean(b) => out.push(if *b { 1 } else { 0 }),
                Value::Text(bytes) => {
                    out.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                    out.extend_from_slice(bytes);
                }
                Value::Null => {}
            }
        }
        out
    }

    pub fn deserialize(bytes: &[u8], schema: Arc<Schema>) -> Self {
        let n = schema.columns.len();
        let bitmap_len = Self::null_bitmap_len(n);
        let bitmap = BitVec::from_bytes(&bytes[0..bitmap_len]);
        let mut cursor = bitmap_len;
        let mut values = Vec::with_capacity(n);

        for (i, col) in schema.columns.iter().enumerate() {
            let is_null = bitmap.get(i).unwrap_or(false);
            if is_null {
                values.push(Value::Null);
                continue;
            }
            match col.data_type {
                DataType::Integer => {
                    let v = i64::from_le_bytes(bytes[cursor..cursor + 8].try_into().unwrap());
                    cursor += 8;
                    values.push(Value::Integer(v));
                }
                DataType::Boolean => {
                    let v = bytes[cursor] != 0;
                    cursor += 1;
                    values.push(Value::Boolean(v));
                }
                DataType::Text => {
                    let len =
                        u16::from_le_bytes(bytes[cursor..cursor + 2].try_into().unwrap()) as usize;
                    cursor += 2;
                    let s = bytes[cursor..cursor + len].to_vec();
                    cursor += len;
                    values.push(Value::Text(s));
                }
            }
        }

        Tuple { schema, values }
    }

    pub fn get(&self, index: usize) -> &Value {
        &self.values[index]
    }

    /// Deep-copies values at `indices` into a new tuple under `schema`,
    /// used by Project.
    pub fn project(&self, indices: &[usize], schema: Arc<Schema>) -> Tuple {
        let values = indices.iter().map(|&i| self.values[i].clone()).collect();
        Tuple { schema, values }
    }

    /// Deep-copies both tuples' values into one merged tuple, used by
    /// NestedLoopJoin.
    pub fn merge(left: &Tuple, right: &Tuple, schema: Arc<Schema>) -> Tuple {
        let mut values = left.values.clone();
        values.extend(right.values.clone());
        Tuple { schema, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Column::new("id", DataType::Integer, false),
            Column::new("name", DataType::Text, true),
            Column::new("active", DataType::Boolean, true),
        ]))
    }

    #[test]
    fn roundtrip_preserves_values_and_nulls() {
        let schema = schema();
        let t = Tuple::new(
            schema.clone(),
            vec![
                Value::Integer(42),
                Value::Text(b"hello".to_vec()),
                Value::Boolean(true),
            ],
        );
        let bytes = t.serialize();
        let back = Tuple::deserialize(&bytes, schema.clone());
        assert_eq!(back.values, t.values);
    }

    #[test]
    fn roundtrip_preserves_null_positions() {
        let schema = schema();
        let t = Tuple::new(
            schema.clone(),
            vec![Value::Integer(1), Value::Null, Value::Null],
        );
        let bytes = t.serialize();
        let back = Tuple::deserialize(&bytes, schema.clone());
        assert_eq!(back.values, t.values);
    }

    #[test]
    fn comparisons_with_null_are_false() {
        assert!(!Value::Null.compare(CompareOp::Eq, &Value::Integer(1)));
        assert!(!Value::Integer(1).compare(CompareOp::Eq, &Value::Null));
    }

    #[test]
    fn boolean_only_supports_eq_ne() {
        assert!(!Value::Boolean(true).compare(CompareOp::Lt, &Value::Boolean(false)));
        assert!(Value::Boolean(true).compare(CompareOp::Ne, &Value::Boolean(false)));
    }

    #[test]
    fn mismatched_types_are_false() {
        assert!(!Value::Integer(1).compare(CompareOp::Eq, &Value::Text(b"1".to_vec())));
    }
}
