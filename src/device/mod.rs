//! Device operations
//!
//! The commands dexterity issues over the shell session: package listing,
//! the dexopt diagnostics dump, per-package compilation, and reboot.
//! Everything goes through [`ShellExecutor`] so it can run against a
//! scripted shell in tests.

use crate::dexopt::{classify, sort_records, CompileState, PackageRecord};
use crate::error::ShellResult;
use crate::shell::ShellExecutor;
use tracing::{debug, info, warn};

/// Lists user-installed packages, one `package:<id>` per line
pub const LIST_PACKAGES_CMD: &str = "pm list packages -3";

/// Dumps per-package compilation status
pub const DEXOPT_DUMP_CMD: &str = "dumpsys package dexopt";

/// Restarts the device
pub const REBOOT_CMD: &str = "reboot";

/// Fetch the identifiers of user-installed packages.
pub fn list_packages<E: ShellExecutor + ?Sized>(shell: &mut E) -> ShellResult<Vec<String>> {
    let output = shell.execute(LIST_PACKAGES_CMD)?;
    let packages: Vec<String> = output
        .lines()
        .filter_map(|line| line.trim().strip_prefix("package:"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    debug!(count = packages.len(), "listed packages");
    Ok(packages)
}

/// Fetch the raw dexopt diagnostics dump.
pub fn dexopt_dump<E: ShellExecutor + ?Sized>(shell: &mut E) -> ShellResult<String> {
    shell.execute(DEXOPT_DUMP_CMD)
}

/// List packages, fetch one dump, and classify every package against it.
///
/// A failed dump degrades to classifying everything `unknown` rather than
/// aborting the scan. The returned records are in display order.
pub fn scan_packages<E: ShellExecutor + ?Sized>(shell: &mut E) -> ShellResult<Vec<PackageRecord>> {
    let packages = list_packages(shell)?;

    let dump = match dexopt_dump(shell) {
        Ok(dump) => dump,
        Err(e) => {
            warn!(error = %e, "dexopt dump failed, statuses will be unknown");
            String::new()
        }
    };

    let mut records: Vec<PackageRecord> = packages
        .into_iter()
        .map(|package| {
            let state = classify(&package, &dump);
            PackageRecord::new(package, state)
        })
        .collect();
    sort_records(&mut records);

    info!(count = records.len(), "scanned packages");
    Ok(records)
}

/// Build the compile invocation for one package.
///
/// Profile and package are embedded as quoted arguments; identifiers
/// containing quote characters are a known unhandled edge case.
pub fn compile_command(profile: CompileState, package: &str) -> String {
    format!(
        "cmd package compile -m \"{}\" -f \"{}\"",
        profile.name(),
        package
    )
}

/// Ask the device to restart. The shell usually dies mid-command, so the
/// outcome is discarded.
pub fn reboot<E: ShellExecutor + ?Sized>(shell: &mut E) {
    info!("requesting device reboot");
    let _ = shell.execute(REBOOT_CMD);
}

/// The compile tool reports problems in prose; treat any mention of
/// "error" as a failure, as the output carries no exit status.
fn compile_failed(output: &str) -> bool {
    output.to_lowercase().contains("error")
}

/// Outcome of compiling one package
#[derive(Debug, Clone)]
pub struct StepReport {
    pub package: String,
    /// Zero-based position in the batch
    pub index: usize,
    pub success: bool,
    pub detail: String,
}

/// A sequential compilation batch.
///
/// One package is compiled per [`step`](CompileRun::step) call; a failure
/// (error text in the output, or any shell error including a per-command
/// timeout) counts one failed unit and never aborts the rest of the
/// batch.
#[derive(Debug)]
pub struct CompileRun {
    profile: CompileState,
    packages: Vec<String>,
    next: usize,
    succeeded: usize,
    failed: usize,
}

impl CompileRun {
    pub fn new(profile: CompileState, packages: Vec<String>) -> Self {
        Self {
            profile,
            packages,
            next: 0,
            succeeded: 0,
            failed: 0,
        }
    }

    pub fn profile(&self) -> CompileState {
        self.profile
    }

    pub fn total(&self) -> usize {
        self.packages.len()
    }

    pub fn completed(&self) -> usize {
        self.next
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn is_finished(&self) -> bool {
        self.next >= self.packages.len()
    }

    /// Packages in batch order
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Compile the next package. Returns `None` once the batch is done.
    pub fn step<E: ShellExecutor + ?Sized>(&mut self, shell: &mut E) -> Option<StepReport> {
        let package = self.packages.get(self.next)?.clone();
        let index = self.next;
        self.next += 1;

        let command = compile_command(self.profile, &package);
        info!(
            package = %package,
            profile = self.profile.name(),
            position = index + 1,
            total = self.packages.len(),
            "compiling"
        );

        let (success, detail) = match shell.execute(&command) {
            Ok(output) if compile_failed(&output) => (false, output),
            Ok(output) => (true, output),
            Err(e) => {
                warn!(package = %package, error = %e, "compile command failed");
                (false, e.to_string())
            }
        };

        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        Some(StepReport {
            package,
            index,
            success,
            detail,
        })
    }
}
