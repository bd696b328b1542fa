//! Integration tests driving a database purely through SQL text. Each
//! test gets its own temp directory so parallel runs don't collide.

use minidb::session::ExecOutcome;
use minidb::{Catalog, Session, Value};
use std::path::PathBuf;

fn fresh_catalog() -> (tempfile::TempDir, Catalog) {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = Catalog::new(PathBuf::from(dir.path()), 16);
    (dir, catalog)
}

fn rows_of(outcome: ExecOutcome) -> Vec<Vec<Value>> {
    match outcome {
        ExecOutcome::Select { rows, .. } => rows.into_iter().map(|t| t.values).collect(),
        other => panic!("expected Select, got {:?}", other),
    }
}

#[test]
fn scenario_1_insert_then_select_preserves_insertion_order() {
    let (_dir, mut catalog) = fresh_catalog();
    let mut session = Session::new(&mut catalog);

    session
        .execute("CREATE TABLE users (id INT NOT NULL, name TEXT)")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (1, 'Alice')")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (2, 'Bob')")
        .unwrap();
    let outcome = session.execute("SELECT * FROM users").unwrap();

    let rows = rows_of(outcome);
    assert_eq!(
        rows,
        vec![
            vec![Value::Integer(1), Value::Text(b"Alice".to_vec())],
            vec![Value::Integer(2), Value::Text(b"Bob".to_vec())],
        ]
    );
}

#[test]
fn scenario_2_filter_without_index_returns_matching_rows_in_order() {
    let (_dir, mut catalog) = fresh_catalog();
    let mut session = Session::new(&mut catalog);

    session
        .execute("CREATE TABLE nums (val INT NOT NULL)")
        .unwrap();
    for v in [10, 20, 30] {
        session
            .execute(&format!("INSERT INTO nums VALUES ({})", v))
            .unwrap();
    }
    let outcome = session
        .execute("SELECT * FROM nums WHERE val > 15")
        .unwrap();

    let rows = rows_of(outcome);
    assert_eq!(
        rows,
        vec![vec![Value::Integer(20)], vec![Value::Integer(30)]]
    );
}

#[test]
fn scenario_3_indexed_equality_lookup_uses_index_scan() {
    let (_dir, mut catalog) = fresh_catalog();
    let mut session = Session::new(&mut catalog);

    session
        .execute("CREATE TABLE users (id INT NOT NULL, name TEXT)")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (10, 'Alice')")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (20, 'Bob')")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (30, 'Charlie')")
        .unwrap();
    session
        .execute("CREATE INDEX idx ON users (id)")
        .unwrap();

    let table = catalog.require_table("users").unwrap();
    assert!(table.borrow().has_index("id"));

    let outcome = session
        .execute("SELECT * FROM users WHERE id = 20")
        .unwrap();
    let rows = rows_of(outcome);
    assert_eq!(
        rows,
        vec![vec![Value::Integer(20), Value::Text(b"Bob".to_vec())]]
    );
}

#[test]
fn scenario_4_nested_loop_join_preserves_left_order_and_right_scan_order() {
    let (_dir, mut catalog) = fresh_catalog();
    let mut session = Session::new(&mut catalog);

    session
        .execute("CREATE TABLE users (id INT NOT NULL, name TEXT)")
        .unwrap();
    session
        .execute("CREATE TABLE orders (order_id INT NOT NULL, user_id INT NOT NULL)")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (1, 'Alice')")
        .unwrap();
    session
        .execute("INSERT INTO users VALUES (2, 'Bob')")
        .unwrap();
    session
        .execute("INSERT INTO orders VALUES (100, 1)")
        .unwrap();
    session
        .execute("INSERT INTO orders VALUES (101, 2)")
        .unwrap();
    session
        .execute("INSERT INTO orders VALUES (102, 1)")
        .unwrap();

    let outcome = session
        .execute("SELECT * FROM users JOIN orders ON users.id = orders.user_id")
        .unwrap();
    let rows = rows_of(outcome);
    assert_eq!(
        rows,
        vec![
            vec![
                Value::Integer(1),
                Value::Text(b"Alice".to_vec()),
                Value::Integer(100),
                Value::Integer(1),
            ],
            vec![
                Value::Integer(1),
                Value::Text(b"Alice".to_vec()),
                Value::Integer(102),
                Value::Integer(1),
            ],
            vec![
                Value::Integer(2),
                Value::Text(b"Bob".to_vec()),
                Value::Integer(101),
                Value::Integer(2),
            ],
        ]
    );
}

#[test]
fn scenario_5_recovery_skips_aborted_and_in_doubt_transactions() {
    use minidb::txn::recovery::replay;
    use minidb::txn::wal::{LogRecord, Wal};

    let (_dir, mut catalog) = fresh_catalog();
    catalog
        .create_table(
            "users",
            minidb::Schema::new(vec![minidb::Column::new(
                "id",
                minidb::DataType::Integer,
                false,
            )]),
        )
        .unwrap();

    let mut wal = Wal::new();
    wal.append(LogRecord::Begin(1));
    wal.append(LogRecord::Begin(2));
    wal.append(LogRecord::Insert {
        txn_id: 1,
        table_name: "users".to_string(),
        values: vec![Value::Integer(10)],
    });
    wal.append(LogRecord::Insert {
        txn_id: 2,
        table_name: "users".to_string(),
        values: vec![Value::Integer(20)],
    });
    wal.append(LogRecord::Commit(1));
    wal.append(LogRecord::Abort(2));

    replay(&wal, &mut catalog).unwrap();

    let table = catalog.require_table("users").unwrap();
    let rows = table.borrow_mut().scan().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].1.values, vec![Value::Integer(10)]);
}

#[test]
fn scenario_6_btree_insert_produces_three_pages_with_ascending_range_scan() {
    use minidb::storage::rid::Rid;

    let mut tree = minidb::btree::BTree::new();
    for (i, key) in [10, 20, 30, 40, 50].into_iter().enumerate() {
        tree.insert(key, Rid::new(i as u16, 0));
    }

    assert_eq!(tree.page_count(), 3);
    for key in [10, 20, 30, 40, 50] {
        assert!(tree.search(key).is_some());
    }

    let rids = tree.range_scan(10, 50);
    let page_ids: Vec<u16> = rids.iter().map(|r| r.page_id).collect();
    assert_eq!(page_ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn session_rejects_nested_begin_and_commit_without_begin() {
    let (_dir, mut catalog) = fresh_catalog();
    let mut session = Session::new(&mut catalog);

    session.execute("BEGIN").unwrap();
    assert!(matches!(session.execute("BEGIN"), Err(_)));
    session.execute("COMMIT").unwrap();
    assert!(matches!(session.execute("COMMIT"), Err(_)));
}
