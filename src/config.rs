//! Build configuration resolution.
//!
//! Collects the CLI options and the fixed defaults into one set of absolute,
//! lexically normalized paths. Everything here is pure path arithmetic: the
//! filesystem is never touched, so paths that do not exist yet (the output
//! directories in particular) resolve the same way as paths that do.
//!
//! The base directory is the book's configuration directory, the place
//! holding `book_data.json`, `metadata.yml`, and `styles.css`. In practice
//! that is the directory the tool is run from.

use std::path::{Component, Path, PathBuf};

use crate::cli::Cli;

/// Fixed filename of the chapter manifest, relative to the base directory.
pub const MANIFEST_FILE: &str = "book_data.json";
/// Fixed filename of the pandoc metadata file, relative to the base directory.
pub const METADATA_FILE: &str = "metadata.yml";
/// Fixed filename of the book stylesheet, relative to the base directory.
pub const STYLE_FILE: &str = "styles.css";

const INT_DIR_NAME: &str = "int";
const DEFAULT_OUTPUT_DIR_NAME: &str = "output";

/// The collection of resolved paths used to configure one build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Base directory for generated output
    pub output_dir: PathBuf,
    /// Staging directory for the reformatted per-chapter files
    pub output_int_dir: PathBuf,
    /// The final EPUB artifact
    pub output_epub_path: PathBuf,
    /// Metadata file handed to pandoc
    pub metadata_path: PathBuf,
    /// Stylesheet handed to pandoc
    pub css_path: PathBuf,
    /// The chapter manifest
    pub manifest_path: PathBuf,
    /// Directory against which the manifest's relative paths are resolved
    pub chapters_root: PathBuf,
}

impl BuildConfig {
    /// Resolve the build configuration from the CLI options and the fixed
    /// defaults, rooted at `base_dir` (which must be absolute).
    ///
    /// Relative `--output-directory` and `--chapters-root` values are taken
    /// relative to `base_dir`; absolute values are used as given.
    pub fn resolve(cli: &Cli, base_dir: &Path) -> BuildConfig {
        let output_dir = match &cli.output_directory {
            Some(dir) => normalize_path(&base_dir.join(dir)),
            None => normalize_path(&base_dir.join(DEFAULT_OUTPUT_DIR_NAME)),
        };

        let chapters_root = match &cli.chapters_root {
            Some(root) => normalize_path(&base_dir.join(root)),
            None => normalize_path(&base_dir.join("..")),
        };

        BuildConfig {
            output_int_dir: output_dir.join(INT_DIR_NAME),
            output_epub_path: output_dir.join(&cli.output_epub_name),
            metadata_path: normalize_path(&base_dir.join(METADATA_FILE)),
            css_path: normalize_path(&base_dir.join(STYLE_FILE)),
            manifest_path: normalize_path(&base_dir.join(MANIFEST_FILE)),
            chapters_root,
            output_dir,
        }
    }
}

/// Fold `.` and `..` components out of a path without consulting the
/// filesystem. `..` never climbs above the root of an absolute path.
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(..) | Component::RootDir => {
                normalized.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    normalized
}
