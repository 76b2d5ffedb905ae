use sluice_core::{AsValue, Connection, Cursor, FetchMode, Statement, params};

fn count<C: Connection>(connection: &mut C) -> i64 {
    let mut statement = connection
        .prepare("SELECT COUNT(*) FROM sluice_transactions".into())
        .expect("Failed to prepare the count");
    let mut cursor = statement.execute().expect("Failed to execute the count");
    let row = cursor
        .rows(FetchMode::NUM)
        .expect("The count has no result set")
        .next()
        .expect("The count has no rows")
        .expect("Failed to fetch the count");
    i64::try_from_value(row.into_values()[0].clone()).expect("Unexpected count")
}

pub fn transactions<C: Connection>(connection: &mut C) {
    connection
        .execute("DROP TABLE IF EXISTS sluice_transactions", params![])
        .expect("Failed to drop sluice_transactions table");
    connection
        .execute(
            "CREATE TABLE sluice_transactions (id INT PRIMARY KEY) ENGINE = InnoDB",
            params![],
        )
        .expect("Failed to create sluice_transactions table");
    let insert = "INSERT INTO sluice_transactions (id) VALUES (?)";

    // Rollback
    connection.start_transaction().expect("Failed to start");
    connection
        .execute(insert, params![1])
        .expect("Failed to insert 1");
    assert_eq!(count(connection), 1);
    connection.rollback().expect("Failed to rollback");
    assert_eq!(count(connection), 0);

    // Commit
    connection
        .execute(insert, params![2])
        .expect("Failed to insert 2");
    connection.commit(false).expect("Failed to commit");
    connection.rollback().expect("Failed to rollback");
    assert_eq!(count(connection), 1);

    // Autocommit
    connection.commit(true).expect("Failed to enable autocommit");
    connection
        .execute(insert, params![3])
        .expect("Failed to insert 3");
    connection.rollback().expect("Failed to rollback");
    assert_eq!(count(connection), 2);
    connection
        .start_transaction()
        .expect("Failed to disable autocommit");
    connection
        .execute(insert, params![4])
        .expect("Failed to insert 4");
    connection.rollback().expect("Failed to rollback");
    assert_eq!(count(connection), 2);
}
