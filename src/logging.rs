//! Utilities for configuring logging
use std::io::Write;
use std::sync::Once;

use colored::Colorize;
use log::Level;

static ONCE_INIT: Once = Once::new();

/// Initializes logging for host applications. Filters are configured via the
/// `NES_HOST_LOG` environment variable using env_logger syntax.
pub fn init() {
    ONCE_INIT.call_once(|| {
        let filter_config = std::env::var("NES_HOST_LOG").unwrap_or("info".to_string());
        builder(&filter_config).init();
    });
}

/// Initializes logging for tests. Quieter by default and safe to call from
/// multiple tests.
pub fn test_init() {
    ONCE_INIT.call_once(|| {
        let filter_config = std::env::var("NES_HOST_LOG").unwrap_or("warn".to_string());
        builder(&filter_config).is_test(true).init();
    });
}

fn builder(filter_config: &str) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .parse_filters(filter_config)
        .format(|buf, record| {
            let tag = match record.level() {
                Level::Error => "E".red().bold(),
                Level::Warn => "W".yellow().bold(),
                Level::Info => "I".blue().bold(),
                Level::Debug => "D".blue(),
                Level::Trace => "T".dimmed(),
            };
            writeln!(buf, "{} {}", tag, record.args())
        });
    builder
}
