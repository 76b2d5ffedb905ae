mod errors;
mod lobs;
pub mod scripted;
mod simple;
mod transactions;

pub use errors::errors;
pub use lobs::lobs;
pub use simple::simple;
pub use transactions::transactions;

use log::LevelFilter;
use sluice_core::Connection;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite against a live connection.
pub fn execute_tests<C: Connection>(mut connection: C) {
    simple(&mut connection);
    lobs(&mut connection);
    transactions(&mut connection);
    errors(&mut connection);
    connection
        .disconnect()
        .expect("Could not disconnect at the end of the suite");
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
