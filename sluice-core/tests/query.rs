#[cfg(test)]
mod tests {
    use indoc::indoc;
    use sluice_core::{
        DatabaseError, DriverError, Error, FetchMode, FetchedRow, Lob, Parameter, ParameterKind,
        QueryInfo, RowLabeled, Value, driver_error, params,
    };
    use std::sync::Arc;

    #[test]
    fn parameter_kinds() {
        let params = params![42, "hello", Parameter::text(["abc", "def"]), vec![1u8, 2]];
        assert_eq!(params.len(), 4);
        assert_eq!(params[0], Parameter::Scalar(Value::Int32(Some(42))));
        assert_eq!(params[1].kind(), ParameterKind::Scalar);
        assert_eq!(params[2].kind(), ParameterKind::Text);
        assert!(params[2].is_lob());
        assert_eq!(
            params[3],
            Parameter::Scalar(Value::Blob(Some([1u8, 2].into())))
        );
        assert!(params![].is_empty());
    }

    #[test]
    fn lob_chunks() {
        let mut lob = Lob::new();
        assert!(lob.is_empty());
        lob.push("abc").push(vec![0u8, 1]).push("");
        assert!(!lob.is_empty());
        assert_eq!(lob.len(), 5);
        assert_eq!(
            lob.chunks().collect::<Vec<_>>(),
            vec![b"abc".as_slice(), [0u8, 1].as_slice(), b"".as_slice()]
        );
        let lob: Lob = ["x", "y"].into_iter().collect();
        assert_eq!(Parameter::Binary(lob.clone()).kind(), ParameterKind::Binary);
        assert_eq!(lob.chunks().len(), 2);
    }

    #[test]
    fn query_info() {
        let query = QueryInfo::from("SELECT 1").named("ping");
        assert_eq!(query.text(), "SELECT 1");
        assert_eq!(query.name(), Some("ping"));
        assert_eq!(query.to_string(), "[ping] SELECT 1");
        let long = "é".repeat(400);
        let printed = QueryInfo::new(long.as_str()).to_string();
        assert!(printed.ends_with("..."));
        assert!(printed.len() < long.len());
    }

    #[test]
    fn fetch_modes() {
        assert!(FetchMode::BOTH.contains(FetchMode::ASSOC));
        assert!(FetchMode::BOTH.contains(FetchMode::NUM));
        assert!(!FetchMode::NUM.contains(FetchMode::ASSOC));
        assert_eq!(FetchMode::ASSOC | FetchMode::NUM, FetchMode::BOTH);
        assert!(FetchMode::ASSOC.is_labeled());
        assert!(!FetchMode::NUM.is_labeled());
        assert_eq!(FetchMode::default(), FetchMode::BOTH);
    }

    #[test]
    fn rows() {
        let labels: Arc<[String]> = ["id".to_string(), "name".to_string()].into();
        let row = RowLabeled::new(labels, [Value::Int64(Some(1)), "Ada".into()].into());
        assert_eq!(row.get_column("name"), Some(&Value::Varchar(Some("Ada".into()))));
        assert_eq!(row.get::<i32>("id").unwrap(), 1);
        assert!(row.get::<i32>("missing").is_err());
        let labeled = FetchedRow::Labeled(row.clone());
        assert_eq!(labeled.get_index(1), Some(&Value::Varchar(Some("Ada".into()))));
        assert_eq!(labeled.get_column("id"), Some(&Value::Int64(Some(1))));
        let positional = FetchedRow::Positional(row.values.clone());
        assert_eq!(positional.get_column("id"), None);
        assert_eq!(positional.get_index(0), Some(&Value::Int64(Some(1))));
        assert_eq!(positional.into_values().len(), 2);
    }

    #[test]
    fn driver_errors() {
        let mut database = DatabaseError::new(1064, indoc! {"
            You have an error in your SQL syntax
            SELEC 1
        "});
        database.query = Some("SELEC 1".into());
        let error = Error::new(DriverError::Syntax {
            query: "SELEC 1".into(),
            source: Some(database),
        })
        .context("While running the migration");
        let found = driver_error(&error).expect("Should find the driver error");
        assert!(found.is_syntax());
        assert_eq!(found.code(), Some(1064));
        let printed = format!("{:#}", error);
        assert!(printed.contains("SELEC 1"));
        assert!(printed.contains("[1064] You have an error in your SQL syntax"));

        let capability = Error::new(DriverError::Capability {
            operation: "Setting the fetch size",
            backend: "mysql",
        });
        let found = driver_error(&capability).unwrap();
        assert!(found.is_capability());
        assert_eq!(found.code(), None);
        assert_eq!(
            capability.to_string(),
            "Setting the fetch size is not supported by mysql"
        );
        assert!(driver_error(&Error::msg("plain")).is_none());
    }
}
