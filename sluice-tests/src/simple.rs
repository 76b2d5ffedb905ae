use indoc::indoc;
use sluice_core::{
    AsValue, Connection, Cursor, FetchMode, FetchedRow, Result, Statement, Value, params,
};

pub fn simple<C: Connection>(connection: &mut C) {
    // Setup
    connection
        .execute("DROP TABLE IF EXISTS sluice_simple", params![])
        .expect("Failed to drop sluice_simple table");
    connection
        .execute(
            indoc! {"
                CREATE TABLE sluice_simple (
                    id INT AUTO_INCREMENT PRIMARY KEY,
                    label VARCHAR(64) NOT NULL,
                    amount DOUBLE,
                    counter BIGINT UNSIGNED
                )
            "},
            params![],
        )
        .expect("Failed to create sluice_simple table");

    // Insert
    let query = "INSERT INTO sluice_simple (label, amount, counter) VALUES (?, ?, ?)";
    let mut first_id = 0;
    for (label, amount, counter) in [
        ("alpha", Some(1.5), 10_u64),
        ("bravo", None, u64::MAX),
        ("charlie", Some(-0.25), 0),
    ] {
        let mut statement = connection
            .prepare(query.into())
            .expect("Failed to prepare the insert");
        statement
            .bind(params![label, amount, counter])
            .expect("Failed to bind the insert");
        let cursor = statement.execute().expect("Failed to execute the insert");
        assert_eq!(cursor.affected_rows(), 1);
        let id = cursor
            .last_inserted_id()
            .expect("The insert did not generate an id");
        if first_id == 0 {
            first_id = id;
        }
        drop(cursor);
        statement.close().expect("Failed to close the insert");
    }
    assert!(first_id > 0);
    connection.commit(false).expect("Failed to commit the inserts");

    // Labeled rows
    let select = "SELECT id, label, amount, counter FROM sluice_simple ORDER BY id";
    let mut statement = connection
        .prepare(select.into())
        .expect("Failed to prepare the select");
    statement.bind(params![]).expect("Failed to bind nothing");
    let mut cursor = statement.execute().expect("Failed to execute the select");
    let rows = cursor
        .rows(FetchMode::ASSOC)
        .expect("The select has no result set")
        .collect::<Result<Vec<_>>>()
        .expect("Failed to fetch the rows");
    assert_eq!(rows.len(), 3);
    let FetchedRow::Labeled(row) = &rows[0] else {
        panic!("Expected a labeled row");
    };
    assert_eq!(row.names(), ["id", "label", "amount", "counter"]);
    assert_eq!(row.get::<String>("label").unwrap(), "alpha");
    assert_eq!(row.get::<f64>("amount").unwrap(), 1.5);
    assert_eq!(row.get::<u64>("counter").unwrap(), 10);
    assert_eq!(rows[1].get_column("amount").map(Value::is_null), Some(true));
    assert_eq!(rows[1].get_column("counter"), Some(&Value::UInt64(Some(u64::MAX))));
    cursor.close().expect("Failed to close the cursor");
    cursor.close().expect("Closing the cursor twice must be harmless");
    drop(cursor);
    statement.close().expect("Failed to close the select");
    statement.close().expect("Closing the statement twice must be harmless");
    drop(statement);

    // Positional rows
    let mut statement = connection
        .prepare(select.into())
        .expect("Failed to prepare the select");
    let mut cursor = statement.execute().expect("Failed to execute the select");
    let labels = cursor
        .rows(FetchMode::NUM)
        .expect("The select has no result set")
        .map(|row| {
            let row = row.expect("Failed to fetch a row");
            assert!(matches!(row, FetchedRow::Positional(..)));
            assert!(row.get_column("label").is_none());
            String::try_from_value(row.get_index(1).cloned().unwrap_or_default())
                .expect("Unexpected label")
        })
        .collect::<Vec<_>>();
    assert_eq!(labels, ["alpha", "bravo", "charlie"]);
    drop(cursor);
    drop(statement);

    // Buffered rows
    let mut statement = connection
        .prepare("SELECT label FROM sluice_simple WHERE id >= ? ORDER BY id".into())
        .expect("Failed to prepare the select");
    statement
        .bind(params![first_id])
        .expect("Failed to bind the id");
    let mut cursor = statement.execute().expect("Failed to execute the select");
    cursor.buffer().expect("Failed to buffer the result");
    cursor.seek(2).expect("Failed to seek");
    let rest = cursor
        .rows(FetchMode::BOTH)
        .expect("The select has no result set")
        .map(|row| row.and_then(|row| String::try_from_value(row.into_values()[0].clone())))
        .collect::<Result<Vec<_>>>()
        .expect("Failed to fetch the rows");
    assert_eq!(rest, ["charlie"]);
}
