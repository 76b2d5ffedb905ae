use indoc::indoc;
use sluice_core::{Connection, Cursor, FetchMode, Parameter, Statement, Value, params};

pub fn lobs<C: Connection>(connection: &mut C) {
    connection
        .execute("DROP TABLE IF EXISTS sluice_lobs", params![])
        .expect("Failed to drop sluice_lobs table");
    connection
        .execute(
            indoc! {"
                CREATE TABLE sluice_lobs (
                    id INT PRIMARY KEY,
                    body LONGTEXT,
                    payload LONGBLOB
                )
            "},
            params![],
        )
        .expect("Failed to create sluice_lobs table");

    let text = "Lorem ipsum dolor sit amet ".repeat(4096);
    let payload = (0..=255u8).cycle().take(70_000).collect::<Vec<_>>();
    let mut statement = connection
        .prepare("INSERT INTO sluice_lobs (id, body, payload) VALUES (?, ?, ?)".into())
        .expect("Failed to prepare the insert");
    statement
        .bind(vec![
            1i32.into(),
            Parameter::text(text.as_bytes().chunks(8192)),
            Parameter::binary(payload.chunks(30_000)),
        ])
        .expect("Failed to bind the large objects");
    assert_eq!(
        statement
            .execute()
            .expect("Failed to stream the large objects")
            .affected_rows(),
        1
    );
    drop(statement);
    connection
        .execute(
            "INSERT INTO sluice_lobs (id, body, payload) VALUES (?, ?, ?)",
            vec![2i32.into(), Parameter::text(Vec::<&str>::new()), Parameter::binary([b""])],
        )
        .expect("Failed to insert the empty large objects");
    connection.commit(false).expect("Failed to commit");

    let mut statement = connection
        .prepare("SELECT body, payload FROM sluice_lobs WHERE id = ?".into())
        .expect("Failed to prepare the select");
    statement.bind(params![1]).expect("Failed to bind the id");
    let mut cursor = statement.execute().expect("Failed to execute the select");
    let row = cursor
        .rows(FetchMode::ASSOC)
        .expect("The select has no result set")
        .next()
        .expect("The row was not found")
        .expect("Failed to fetch the row");
    assert_eq!(row.get_column("body"), Some(&Value::Varchar(Some(text))));
    assert_eq!(
        row.get_column("payload"),
        Some(&Value::Blob(Some(payload.into())))
    );
    drop(cursor);
    drop(statement);

    // A lob without chunks is null, an empty chunk is an empty value
    let mut statement = connection
        .prepare("SELECT body, payload FROM sluice_lobs WHERE id = ?".into())
        .expect("Failed to prepare the select");
    statement.bind(params![2]).expect("Failed to bind the id");
    let mut cursor = statement.execute().expect("Failed to execute the select");
    let row = cursor
        .rows(FetchMode::NUM)
        .expect("The select has no result set")
        .next()
        .expect("The row was not found")
        .expect("Failed to fetch the row");
    assert_eq!(row.get_index(0).map(Value::is_null), Some(true));
    assert_eq!(row.get_index(1), Some(&Value::Blob(Some(Box::default()))));
}
