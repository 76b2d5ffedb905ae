#[cfg(all(test, feature = "mysqlclient"))]
mod tests {
    use sluice_core::Driver;
    use sluice_mysql::ffi::ClientDriver;
    use sluice_tests::{execute_tests, init_logs};
    use std::{env, sync::Mutex};

    static MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn mysql() {
        init_logs();
        let Ok(url) = env::var("SLUICE_MYSQL_TEST") else {
            log::warn!("Skipping the MySQL suite, SLUICE_MYSQL_TEST is not set");
            return;
        };
        let _guard = MUTEX.lock().unwrap();
        let connection = ClientDriver::new()
            .connect(&url)
            .expect("Could not open the database");
        execute_tests(connection);
    }
}
