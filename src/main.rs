use anyhow::{Context, Result};
use cli::Cli;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;

mod build;
mod cli;
mod config;
mod manifest;
mod pandoc;
mod reformat;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let base_dir =
        std::env::current_dir().with_context(|| "Failed to determine the current directory")?;
    let config = config::BuildConfig::resolve(&cli, &base_dir);

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("can parse progress style")
            .progress_chars("#>-"),
    );
    progress.set_message("Collating chapters...");

    build::run(&config, &pandoc::SystemRunner, &progress)?;

    println!();
    println!("  EPUB: {}", config.output_epub_path.display());

    Ok(())
}
