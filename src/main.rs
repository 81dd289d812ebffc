//! dexterity entry point
//!
//! Startup order matters: the shell connection is established before the
//! terminal is put into raw mode, so a connection failure is reported on
//! a normal terminal and aborts the run entirely.

use dexterity::config::AppConfig;
use dexterity::logging::init_logging;
use dexterity::presentation::{self, App};
use dexterity::shell::ShellSession;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("warning: {e}, falling back to defaults");
            AppConfig::default()
        }
    };

    init_logging(&config.logging);
    info!(version = env!("CARGO_PKG_VERSION"), "starting dexterity");

    let session = match ShellSession::connect(&config.shell) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "could not connect to the privileged shell");
            eprintln!("Error connecting to Shizuku: {e}");
            eprintln!("Is the Shizuku service running and authorized?");
            return ExitCode::FAILURE;
        }
    };

    presentation::install_panic_hook();
    let mut terminal = match presentation::init() {
        Ok(terminal) => terminal,
        Err(e) => {
            error!(error = %e, "terminal initialization failed");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut app = App::new(config, session);
    let result = app.run(&mut terminal);
    let _ = presentation::restore();

    app.into_session().close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "exited with error");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
