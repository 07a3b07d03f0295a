//! Pandoc integration: probing the installation and running the conversion.
//!
//! All process execution goes through the [`CommandRunner`] trait so the
//! build pipeline can be exercised in tests without a pandoc installation.

use anyhow::{bail, Context, Result};
use log::{debug, error, warn};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use crate::config::BuildConfig;

/// Name of the pandoc executable, resolved through `PATH`.
pub const PANDOC_BIN: &str = "pandoc";

/// Captured result of an external command.
///
/// A trimmed-down `std::process::Output`; the exit code is an `Option`
/// because a process killed by a signal has none.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands, capturing their output.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<CommandOutput>;
}

/// [`CommandRunner`] that spawns real processes.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Ensure pandoc is available and working by probing `pandoc --version`.
pub fn verify_installed(runner: &dyn CommandRunner) -> Result<()> {
    let args = [OsString::from("--version")];
    let output = runner.run(PANDOC_BIN, &args).with_context(|| {
        format!("Failed to run `{PANDOC_BIN} --version`; is pandoc installed and on your PATH?")
    })?;

    if !output.success() {
        error!("Pandoc installation issue! retcode={}", exit_code_text(&output));
        log_failed_command(PANDOC_BIN, &args, &output);
        bail!("`{PANDOC_BIN} --version` exited with code {}", exit_code_text(&output));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next().unwrap_or(PANDOC_BIN).trim();
    debug!("verified pandoc installation: {version}");
    Ok(())
}

/// Generate the ebook by handing the ordered chapter files to pandoc in one
/// invocation. `--toc` keeps the generated table of contents in sync with
/// the rewritten chapter titles.
pub fn convert(
    runner: &dyn CommandRunner,
    config: &BuildConfig,
    inputs: &[PathBuf],
) -> Result<()> {
    let mut args: Vec<OsString> = vec![
        "-o".into(),
        config.output_epub_path.clone().into(),
        "--css".into(),
        config.css_path.clone().into(),
        "--toc".into(),
        "--metadata-file".into(),
        config.metadata_path.clone().into(),
    ];
    args.extend(inputs.iter().map(|input| input.clone().into_os_string()));
    debug!(
        "generating {}: cmd={} {:?}",
        config.output_epub_path.display(),
        PANDOC_BIN,
        args
    );

    let output = runner.run(PANDOC_BIN, &args).with_context(|| {
        format!("Failed to run `{PANDOC_BIN}`; is pandoc installed and on your PATH?")
    })?;

    if !output.success() {
        error!("Pandoc failed! retcode={}", exit_code_text(&output));
        log_failed_command(PANDOC_BIN, &args, &output);
        bail!("pandoc exited with code {}", exit_code_text(&output));
    }

    // pandoc reports things like missing metadata on stderr even on success
    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        warn!("pandoc: {line}");
    }

    Ok(())
}

fn exit_code_text(output: &CommandOutput) -> String {
    match output.code {
        Some(code) => code.to_string(),
        None => String::from("none (killed by signal?)"),
    }
}

/// Error-level record of a failed invocation: the full command line and the
/// captured output streams.
fn log_failed_command(program: &str, args: &[OsString], output: &CommandOutput) {
    error!("    cmd: {program} {args:?}");
    error!(
        "    stdout: {}",
        String::from_utf8_lossy(&output.stdout).trim_end()
    );
    error!(
        "    stderr: {}",
        String::from_utf8_lossy(&output.stderr).trim_end()
    );
}
