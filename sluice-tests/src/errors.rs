use crate::silent_logs;
use sluice_core::{Connection, Statement, driver_error, params};

pub fn errors<C: Connection>(connection: &mut C) {
    connection
        .execute("DROP TABLE IF EXISTS sluice_errors", params![])
        .expect("Failed to drop sluice_errors table");
    connection
        .execute("CREATE TABLE sluice_errors (id INT PRIMARY KEY)", params![])
        .expect("Failed to create sluice_errors table");
    connection
        .execute("INSERT INTO sluice_errors VALUES (?)", params![1])
        .expect("Failed to insert 1");

    silent_logs! {
        // Rejected by prepare
        let error = connection
            .prepare("SELEC 1".into())
            .err()
            .expect("The query should not prepare");
        let found = driver_error(&error).expect("Expected a driver error");
        assert_eq!(found.code(), Some(1064));
        assert!(!found.is_syntax());

        // Rejected by execute
        let mut statement = connection
            .prepare("INSERT INTO sluice_errors VALUES (?)".into())
            .expect("Failed to prepare the insert");
        statement.bind(params![1]).expect("Failed to bind");
        let error = statement.execute().err().expect("The insert should fail");
        let found = driver_error(&error).expect("Expected a driver error");
        assert!(found.is_syntax());
        assert_eq!(found.code(), Some(1062));
        assert!(format!("{:#}", error).contains("INSERT INTO sluice_errors VALUES (?)"));

        // Unsupported
        let error = statement.set_fetch_size(100).expect_err("Fetch size is unsupported");
        assert!(driver_error(&error).unwrap().is_capability());
        statement.close().expect("Failed to close");
        let error = statement.bind(params![2]).expect_err("The statement is closed");
        assert!(driver_error(&error).unwrap().is_resource_state());
    }
    connection.rollback().expect("Failed to rollback");
}
