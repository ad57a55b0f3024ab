//! Startup entry point.
//!
//! # Responsibility
//! - Load `ENROLLBOOK_*` configuration, start logging and seed the
//!   administrator through `enrollbook_core::Core`.
//! - Print a deterministic status line for quick local checks.

use enrollbook_core::{init_from_config, Core, CoreConfig};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("enrollbook: {err}");
            return ExitCode::FAILURE;
        }
    };

    let file_logging = match init_from_config(&config) {
        Ok(active) => active,
        Err(err) => {
            eprintln!("enrollbook: {err}");
            return ExitCode::FAILURE;
        }
    };

    let core = match Core::start(&config) {
        Ok(core) => core,
        Err(err) => {
            error!(
                "event=app_start module=cli status=error kind={}",
                err.kind().as_str()
            );
            eprintln!("enrollbook: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "enrollbook_core version={}",
        enrollbook_core::core_version()
    );
    println!(
        "enrollbook admin_id={} users={} file_logging={}",
        core.admin_id,
        core.store.users.len(),
        file_logging
    );
    ExitCode::SUCCESS
}
