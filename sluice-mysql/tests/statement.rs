#[cfg(test)]
mod tests {
    use sluice_core::{
        Connection, Cursor, DriverError, Lob, Parameter, Statement, Value, driver_error, params,
    };
    use sluice_mysql::{MySqlConnection, State};
    use sluice_tests::{
        init_logs,
        scripted::{Call, Response, Script, ScriptedConnection},
        silent_logs,
    };

    fn connect(script: &Script) -> MySqlConnection<ScriptedConnection> {
        MySqlConnection::from_native(script.connection())
    }

    fn chunk(position: usize, chunk: &str) -> Call {
        Call::SendLongData {
            position,
            chunk: chunk.as_bytes().to_vec(),
        }
    }

    #[test]
    fn insert_scalars() {
        init_logs();
        let script = Script::new();
        script.respond(
            "INSERT INTO t VALUES (?, ?)",
            Response::new().affected_rows(1),
        );
        let mut connection = connect(&script);
        let mut statement = connection
            .prepare("INSERT INTO t VALUES (?, ?)".into())
            .unwrap();
        assert_eq!(statement.state(), State::Created);
        assert_eq!(statement.query().text(), "INSERT INTO t VALUES (?, ?)");
        statement.bind(params![42, "hello"]).unwrap();
        assert_eq!(statement.state(), State::Bound);
        assert!(statement.pending_lobs().is_empty());
        let cursor = statement.execute().unwrap();
        assert_eq!(cursor.affected_rows(), 1);
        assert_eq!(cursor.last_inserted_id(), None);
        drop(cursor);
        assert_eq!(statement.state(), State::Executed);
        statement.close().unwrap();
        assert_eq!(
            script.statement_calls(),
            [
                Call::BindParam {
                    types: "is".into(),
                    values: vec![Value::Int32(Some(42)), Value::Varchar(Some("hello".into()))],
                },
                Call::Execute,
                Call::FreeResult,
                Call::CloseStatement,
            ]
        );
    }

    #[test]
    fn text_lob() {
        init_logs();
        let script = Script::new();
        let mut connection = connect(&script);
        let mut statement = connection
            .prepare("INSERT INTO docs (body) VALUES (?)".into())
            .unwrap();
        statement
            .bind(vec![Parameter::text(["abc", "def"])])
            .unwrap();
        assert_eq!(statement.pending_lobs().len(), 1);
        assert_eq!(
            statement.pending_lobs()[&0],
            Lob::from_chunks(["abc", "def"])
        );
        statement.execute().unwrap();
        assert!(statement.pending_lobs().is_empty());
        assert_eq!(
            script.statement_calls()[..4],
            [
                Call::BindParam {
                    types: "b".into(),
                    values: vec![Value::Null],
                },
                chunk(0, "abc"),
                chunk(0, "def"),
                Call::Execute,
            ]
        );
    }

    #[test]
    fn lobs_in_position_order() {
        init_logs();
        let script = Script::new();
        let mut connection = connect(&script);
        let mut statement = connection
            .prepare("INSERT INTO files VALUES (?, ?, ?, ?, ?, ?)".into())
            .unwrap();
        statement
            .bind(vec![
                Parameter::Binary(Lob::new()),
                7i32.into(),
                Parameter::text(["p", "q"]),
                "name".into(),
                0.5f64.into(),
                Parameter::binary([b"x".to_vec()]),
            ])
            .unwrap();
        statement.execute().unwrap();
        let calls = script.statement_calls();
        assert_eq!(
            calls[0],
            Call::BindParam {
                types: "bibsdb".into(),
                values: vec![
                    Value::Null,
                    Value::Int32(Some(7)),
                    Value::Null,
                    Value::Varchar(Some("name".into())),
                    Value::Float64(Some(0.5)),
                    Value::Null,
                ],
            }
        );
        assert_eq!(
            calls[1..5],
            [chunk(2, "p"), chunk(2, "q"), chunk(5, "x"), Call::Execute]
        );
    }

    #[test]
    fn zero_parameters() {
        init_logs();
        let script = Script::new();
        script.respond(
            "SELECT 1",
            Response::new().columns(["1"]).row([Value::Int64(Some(1))]),
        );
        let mut connection = connect(&script);

        let mut statement = connection.prepare("SELECT 1".into()).unwrap();
        statement.bind(params![]).unwrap();
        assert_eq!(statement.state(), State::Bound);
        statement.bind(params![]).unwrap();
        statement.execute().unwrap();
        drop(statement);

        let mut statement = connection.prepare("SELECT 1".into()).unwrap();
        statement.execute().unwrap();
        drop(statement);

        assert!(
            !script
                .calls()
                .iter()
                .any(|v| matches!(v, Call::BindParam { .. }))
        );
        assert_eq!(
            script
                .calls()
                .iter()
                .filter(|v| **v == Call::Execute)
                .count(),
            2
        );
    }

    #[test]
    fn markers_need_binding() {
        init_logs();
        let script = Script::new();
        let mut connection = connect(&script);
        let mut statement = connection
            .prepare("DELETE FROM t WHERE id = ?".into())
            .unwrap();
        silent_logs! {
            let error = statement.execute().err().unwrap();
            assert!(driver_error(&error).unwrap().is_resource_state());
            let error = statement.bind(params![1, 2]).unwrap_err();
            let found = driver_error(&error).unwrap();
            assert!(matches!(found, DriverError::Execution { .. }));
            assert_eq!(found.code(), Some(2031));
            let source = found.database_error().unwrap();
            assert!(source.message.contains("expects 1 parameters but 2 were provided"));
            assert_eq!(source.query.as_deref(), Some("DELETE FROM t WHERE id = ?"));
            let error = statement.bind(params![]).unwrap_err();
            assert_eq!(driver_error(&error).unwrap().code(), Some(2031));
        }
        assert_eq!(statement.state(), State::Created);
        statement.bind(params![1]).unwrap();
        statement.execute().unwrap();
        assert_eq!(statement.state(), State::Executed);
    }

    #[test]
    fn syntax_error() {
        init_logs();
        let script = Script::new();
        let query = "INSERT INTO t VALUES (?, ?) ON DUPLICATE KEY UPDAT";
        script.respond(
            query,
            Response::new().execute_error(1064, "You have an error in your SQL syntax"),
        );
        let mut connection = connect(&script);
        let mut statement = connection.prepare(query.into()).unwrap();
        statement.bind(params![1, "x"]).unwrap();
        silent_logs! {
            let error = statement.execute().err().unwrap();
            let found = driver_error(&error).unwrap();
            assert!(found.is_syntax());
            assert_eq!(found.code(), Some(1064));
            let DriverError::Syntax { query: text, source } = found else {
                panic!("Expected a syntax error");
            };
            assert_eq!(text, query);
            let source = source.as_ref().unwrap();
            assert_eq!(source.query.as_deref(), Some(query));
            assert!(source.message.contains("You have an error in your SQL syntax"));
            assert!(source.message.contains(query));
            let printed = format!("{:#}", error);
            assert!(printed.contains("1064"));
            assert!(printed.contains(query));
        }
        assert_eq!(statement.state(), State::Bound);
        statement.close().unwrap();
        assert_eq!(statement.state(), State::Closed);
    }

    #[test]
    fn bind_once() {
        init_logs();
        let script = Script::new();
        let mut connection = connect(&script);
        let mut statement = connection
            .prepare("UPDATE t SET a = ? WHERE id = ?".into())
            .unwrap();
        statement.bind(params!["a", 1]).unwrap();
        silent_logs! {
            let error = statement.bind(params!["b", 2]).unwrap_err();
            assert!(driver_error(&error).unwrap().is_resource_state());
        }
        statement.bind(params![]).unwrap();
        statement.execute().unwrap();
        silent_logs! {
            let error = statement.bind(params![]).unwrap_err();
            assert!(driver_error(&error).unwrap().is_resource_state());
            let error = statement.execute().err().unwrap();
            assert_eq!(error.to_string(), "Cannot execute the statement: already executed");
        }
        let binds = script
            .calls()
            .into_iter()
            .filter(|v| matches!(v, Call::BindParam { .. }))
            .count();
        assert_eq!(binds, 1);
    }

    #[test]
    fn close_twice() {
        init_logs();
        let script = Script::new();
        let mut connection = connect(&script);
        {
            let mut statement = connection.prepare("SELECT ?".into()).unwrap();
            statement.close().unwrap();
            statement.close().unwrap();
            silent_logs! {
                let error = statement.bind(params![1]).unwrap_err();
                assert!(driver_error(&error).unwrap().is_resource_state());
                let error = statement.execute().err().unwrap();
                assert!(driver_error(&error).unwrap().is_resource_state());
            }
        }
        {
            let _statement = connection.prepare("SELECT ?".into()).unwrap();
        }
        let closes = script
            .calls()
            .into_iter()
            .filter(|v| *v == Call::CloseStatement)
            .count();
        assert_eq!(closes, 2);
    }

    #[test]
    fn fetch_size_unsupported() {
        init_logs();
        let script = Script::new();
        let mut connection = connect(&script);
        let mut statement = connection.prepare("SELECT ?".into()).unwrap();
        silent_logs! {
            let check = |result: sluice_core::Result<()>| {
                let error = result.unwrap_err();
                assert!(driver_error(&error).unwrap().is_capability());
                assert_eq!(error.to_string(), "Setting the fetch size is not supported by mysql");
            };
            check(statement.set_fetch_size(0));
            statement.bind(params![1]).unwrap();
            check(statement.set_fetch_size(10));
            statement.execute().unwrap();
            check(statement.set_fetch_size(100));
            statement.close().unwrap();
            check(statement.set_fetch_size(1000));
        }
    }

    #[test]
    fn native_failures() {
        init_logs();
        let script = Script::new();
        script
            .respond(
                "INSERT INTO a VALUES (?)",
                Response::new().bind_error(2036, "Using unsupported buffer type"),
            )
            .respond(
                "INSERT INTO b VALUES (?)",
                Response::new().long_data_error(2057, "Parameter data was too long"),
            );
        let mut connection = connect(&script);
        silent_logs! {
            let mut statement = connection.prepare("INSERT INTO a VALUES (?)".into()).unwrap();
            let error = statement.bind(params![1]).unwrap_err();
            let found = driver_error(&error).unwrap();
            assert!(matches!(found, DriverError::Execution { .. }));
            assert_eq!(found.code(), Some(2036));
            assert_eq!(statement.state(), State::Created);
            drop(statement);

            let mut statement = connection.prepare("INSERT INTO b VALUES (?)".into()).unwrap();
            statement.bind(vec![Parameter::text(["too", "long"])]).unwrap();
            let error = statement.execute().err().unwrap();
            let found = driver_error(&error).unwrap();
            assert!(matches!(found, DriverError::Execution { .. }));
            assert_eq!(found.code(), Some(2057));
            assert_eq!(statement.state(), State::Bound);
        }
        assert!(!script.calls().contains(&Call::Execute));
    }

    #[test]
    fn execute_convenience() {
        init_logs();
        let script = Script::new();
        script.respond(
            "DELETE FROM t WHERE flag = ?",
            Response::new().affected_rows(12),
        );
        let mut connection = connect(&script);
        assert_eq!(
            connection
                .execute("DELETE FROM t WHERE flag = ?", params![true])
                .unwrap(),
            12
        );
        assert_eq!(
            script.statement_calls(),
            [
                Call::BindParam {
                    types: "s".into(),
                    values: vec![Value::Boolean(Some(true))],
                },
                Call::Execute,
                Call::FreeResult,
                Call::CloseStatement,
            ]
        );
    }
}
