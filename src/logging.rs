use std::io::Write;
use std::time::Instant;

use env_logger::{Env, Target};

/// Installs the stdout logger:
/// `<timestamp> (<elapsed ms>) <LEVEL> <target> [<file>:<line>] <message>`.
pub fn init(verbose: bool) {
    let started = Instant::now();
    let default_level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Stdout)
        .format(move |buf, record| {
            writeln!(
                buf,
                "{} ({}) {} {} [{}:{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                started.elapsed().as_millis(),
                record.level(),
                record.target(),
                record.file().unwrap_or("<unknown>"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
