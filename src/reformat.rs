//! Chapter reformatting for ebook presentation.
//!
//! Each chapter directory holds a `README.md` whose first line is a markdown
//! heading. For the assembled book that heading is rewritten into a uniform
//! numbered level-1 title (`# Ch 3. My Title`) so pandoc's table of contents
//! comes out flat and ordered, and any code files attached to the chapter are
//! collated into their own appendix-style "Supplements" chapter.
//!
//! Both generated files land in the intermediate output directory under
//! deterministic names derived from the chapter number and title
//! (`CHAPTER_03_My_Title_MAIN.md` / `..._SUPP.md`); the number prefix keeps
//! names collision-free even when two chapters share a title.
//!
//! A chapter whose content file is missing or does not open with a heading
//! line aborts the whole build: every chapter must carry a well-formed title
//! before the book is assembled.

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::manifest::ChapterData;

/// Fixed filename of a chapter's primary content file within its root.
pub const PRIMARY_FILE: &str = "README.md";

/// Fence marker opening each supplement code block.
const CODE_BLOCK_OPEN: &str = "```C";
/// Fence marker closing each supplement code block.
const CODE_BLOCK_CLOSE: &str = "```";

/// A chapter's first line: one or more `#`s, whitespace, then the title text.
static TITLE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#+\s+(\S.*)").expect("title line regex compiles"));

/// The ways a chapter's primary content file can fail validation. All of
/// them abort the build before any later chapter is processed.
#[derive(Debug, thiserror::Error)]
pub enum ChapterError {
    #[error("cannot read chapter file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing title line in {}", path.display())]
    MissingTitle { path: PathBuf },

    #[error("first line isn't a title line in {}: {line:?}", path.display())]
    NotATitle { path: PathBuf, line: String },
}

/// Reformat one chapter for nicer presentation in the ebook.
///
/// Rewrites the chapter heading into `# Ch <number>. <title>` and collates
/// the attached code supplement files into their own appendix chapter.
/// Returns the path of the written main chapter file, and of the supplement
/// file when the chapter has supplements attached. Existing files at either
/// path are overwritten.
pub fn reformat_chapter(
    int_dir: &Path,
    number: usize,
    chapter: &ChapterData,
) -> Result<(PathBuf, Option<PathBuf>)> {
    debug!(
        "formatting chapter {}: {}",
        number,
        chapter.chapter_root.display()
    );

    let content_path = chapter.chapter_root.join(PRIMARY_FILE);
    let contents = std::fs::read_to_string(&content_path).map_err(|source| {
        ChapterError::Unreadable {
            path: content_path.clone(),
            source,
        }
    })?;

    let mut lines: Vec<String> = contents
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect();

    let first = lines.first().ok_or_else(|| ChapterError::MissingTitle {
        path: content_path.clone(),
    })?;
    let title = extract_title(first)
        .ok_or_else(|| ChapterError::NotATitle {
            path: content_path.clone(),
            line: first.clone(),
        })?
        .to_string();

    lines[0] = format!("# Ch {number}. {title}");

    let prefix = chapter_file_prefix(number, &title);
    let main_path = int_dir.join(format!("{prefix}_MAIN.md"));
    write_lines(&main_path, &lines)
        .with_context(|| format!("Failed to write chapter file {}", main_path.display()))?;
    debug!("generated {}", main_path.display());

    let supplement_path = if chapter.code_supplements.is_empty() {
        None
    } else {
        let path = int_dir.join(format!("{prefix}_SUPP.md"));
        let supplement_lines = collate_supplements(&title, &chapter.code_supplements)?;
        write_lines(&path, &supplement_lines)
            .with_context(|| format!("Failed to write supplement file {}", path.display()))?;
        debug!("generated {}", path.display());
        Some(path)
    };

    Ok((main_path, supplement_path))
}

/// Extract the title text from a chapter's first line, if it is a heading.
fn extract_title(line: &str) -> Option<&str> {
    TITLE_LINE_RE
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|title| title.as_str())
}

/// Derive the deterministic intermediate-file prefix for a chapter.
fn chapter_file_prefix(number: usize, title: &str) -> String {
    format!("CHAPTER_{:02}_{}", number, title.replace(' ', "_"))
}

/// Collate the supplemental code files into one appendix-style document:
/// a level-1 title, then per file a level-2 heading and a fenced code block.
fn collate_supplements(title: &str, supplements: &[PathBuf]) -> Result<Vec<String>> {
    let mut lines = vec![format!("# Supplements: {title}")];

    for supplement in supplements {
        lines.push(String::new());
        lines.push(format!("## {}", file_name(supplement)));
        lines.push(String::new());

        lines.push(CODE_BLOCK_OPEN.to_string());
        let contents = std::fs::read_to_string(supplement)
            .with_context(|| format!("Failed to read code supplement {}", supplement.display()))?;
        lines.extend(contents.lines().map(|line| line.trim_end().to_string()));
        lines.push(CODE_BLOCK_CLOSE.to_string());
    }

    Ok(lines)
}

/// The final path component, used as the supplement's section heading.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write lines with uniform `\n` terminators, overwriting any existing file.
fn write_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}
