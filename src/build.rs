//! The build pipeline: prepare the output tree, reformat every chapter in
//! manifest order, and hand the ordered results to pandoc.

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use log::{debug, info};
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::manifest;
use crate::pandoc::{self, CommandRunner};
use crate::reformat;

/// Run the whole ebook build against an already-resolved configuration.
///
/// In order: verify pandoc responds, create the output directories, parse
/// the chapter manifest, reformat every chapter into the intermediate
/// directory, then invoke pandoc once over the full ordered file list. Any
/// failure along the way aborts the build.
pub fn run(config: &BuildConfig, runner: &dyn CommandRunner, progress: &ProgressBar) -> Result<()> {
    pandoc::verify_installed(runner)?;
    setup_output_dirs(config)?;

    let manifest_json = std::fs::read_to_string(&config.manifest_path).with_context(|| {
        format!(
            "Failed to read chapter manifest {}",
            config.manifest_path.display()
        )
    })?;
    let chapters = manifest::parse_manifest(&manifest_json).with_context(|| {
        format!(
            "Failed to parse chapter manifest {}",
            config.manifest_path.display()
        )
    })?;
    if chapters.is_empty() {
        // pandoc invoked with no input files would sit reading stdin
        bail!(
            "chapter manifest {} lists no chapters",
            config.manifest_path.display()
        );
    }

    progress.set_length(chapters.len() as u64);

    // chapter numbers are 1-based and follow manifest order
    let mut chapter_files: Vec<PathBuf> = Vec::new();
    for (index, chapter) in chapters.into_iter().enumerate() {
        let number = index + 1;
        let chapter = chapter.resolve(&config.chapters_root);
        progress.set_message(chapter_label(number, &chapter));

        let (main_file, supplement_file) =
            reformat::reformat_chapter(&config.output_int_dir, number, &chapter)?;
        chapter_files.push(main_file);
        chapter_files.extend(supplement_file);
        progress.inc(1);
    }
    debug!("formatted chapters files: {chapter_files:?}");
    progress.finish_with_message("Chapters collated");

    pandoc::convert(runner, config, &chapter_files)?;
    info!("generated {}", config.output_epub_path.display());
    Ok(())
}

/// Create the output directory tree, including the intermediate directory
/// the reformatted chapter files land in.
fn setup_output_dirs(config: &BuildConfig) -> Result<()> {
    for dir in [&config.output_dir, &config.output_int_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        debug!("setup {}", dir.display());
    }
    Ok(())
}

/// Short progress label for a chapter, using its root directory's name.
fn chapter_label(number: usize, chapter: &manifest::ChapterData) -> String {
    chapter
        .chapter_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("chapter {number}"))
}
