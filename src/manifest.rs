//! Chapter manifest parsing.
//!
//! The manifest is a JSON array of chapter entries, in book order. Each entry
//! names the directory holding the chapter's primary content file and,
//! optionally, a list of source files to collate into the chapter's
//! supplement appendix:
//!
//! ```json
//! [
//!   { "chapter_root": "ch1", "code_supplements": ["ch1/main.c"] },
//!   { "chapter_root": "ch2" }
//! ]
//! ```
//!
//! All paths in the manifest are relative to the chapters root; resolution to
//! absolute paths is a separate, pure step so the parser never touches the
//! filesystem. Whether a chapter root actually holds a usable content file is
//! checked later, by the reformatter.

use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// The files which are used to populate one section of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterData {
    /// Directory holding the chapter's primary content file
    pub chapter_root: PathBuf,
    /// Source files rendered into the chapter's supplement appendix, in order
    pub code_supplements: Vec<PathBuf>,
}

impl ChapterData {
    /// Rebase the manifest's root-relative paths onto the chapters root.
    ///
    /// Pure path arithmetic; missing files surface later when the
    /// reformatter tries to read them.
    pub fn resolve(self, chapters_root: &Path) -> ChapterData {
        ChapterData {
            chapter_root: chapters_root.join(&self.chapter_root),
            code_supplements: self
                .code_supplements
                .iter()
                .map(|supplement| chapters_root.join(supplement))
                .collect(),
        }
    }
}

/// The ways a chapter manifest can be malformed. All of them are fatal and
/// surface before any chapter file is touched.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("chapter manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chapter manifest malformed: expected a JSON list of chapter entries")]
    NotAList,

    #[error("chapter manifest malformed: entry #{index} is not a chapter object")]
    EntryNotAnObject { index: usize },

    #[error("chapter manifest malformed: entry #{index} is missing required 'chapter_root'")]
    MissingChapterRoot { index: usize },

    #[error("chapter manifest malformed: 'chapter_root' of entry #{index} is not a string")]
    ChapterRootNotAString { index: usize },

    #[error("chapter manifest malformed: 'code_supplements' of entry #{index} is not a list")]
    SupplementsNotAList { index: usize },

    #[error(
        "chapter manifest malformed: 'code_supplements[{supplement}]' of entry #{index} is not a string"
    )]
    SupplementNotAString { index: usize, supplement: usize },
}

/// Decode the manifest text into the ordered list of chapter descriptions.
///
/// Manifest order is preserved exactly; it becomes the chapter numbering
/// order. `code_supplements` may be omitted per entry and defaults to empty.
/// Unknown keys are ignored.
pub fn parse_manifest(json: &str) -> Result<Vec<ChapterData>, ManifestError> {
    let manifest: Value = serde_json::from_str(json)?;
    let entries = manifest.as_array().ok_or(ManifestError::NotAList)?;

    let mut chapters = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry = entry
            .as_object()
            .ok_or(ManifestError::EntryNotAnObject { index })?;

        let chapter_root = entry
            .get("chapter_root")
            .ok_or(ManifestError::MissingChapterRoot { index })?
            .as_str()
            .ok_or(ManifestError::ChapterRootNotAString { index })?;

        let mut code_supplements = Vec::new();
        if let Some(supplements) = entry.get("code_supplements") {
            let supplements = supplements
                .as_array()
                .ok_or(ManifestError::SupplementsNotAList { index })?;
            for (supplement, value) in supplements.iter().enumerate() {
                let path = value
                    .as_str()
                    .ok_or(ManifestError::SupplementNotAString { index, supplement })?;
                code_supplements.push(PathBuf::from(path));
            }
        }

        let chapter = ChapterData {
            chapter_root: PathBuf::from(chapter_root),
            code_supplements,
        };
        debug!("parsed chapter entry #{index}: {chapter:?}");
        chapters.push(chapter);
    }

    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_chapter_with_supplements() {
        let chapters =
            parse_manifest(r#"[{"chapter_root": "ch1", "code_supplements": ["ch1/main.c"]}]"#)
                .expect("manifest parses");

        assert_eq!(
            chapters,
            vec![ChapterData {
                chapter_root: PathBuf::from("ch1"),
                code_supplements: vec![PathBuf::from("ch1/main.c")],
            }]
        );
    }

    #[test]
    fn missing_supplements_default_to_empty() {
        let chapters = parse_manifest(r#"[{"chapter_root": "ch1"}]"#).expect("manifest parses");
        assert_eq!(chapters[0].code_supplements, Vec::<PathBuf>::new());
    }

    #[test]
    fn preserves_manifest_order() {
        let chapters = parse_manifest(
            r#"[
                {"chapter_root": "intro"},
                {"chapter_root": "middle"},
                {"chapter_root": "end"}
            ]"#,
        )
        .expect("manifest parses");

        let roots: Vec<_> = chapters.iter().map(|ch| ch.chapter_root.clone()).collect();
        assert_eq!(
            roots,
            vec![
                PathBuf::from("intro"),
                PathBuf::from("middle"),
                PathBuf::from("end")
            ]
        );
    }

    #[test]
    fn ignores_unknown_keys() {
        let chapters = parse_manifest(r#"[{"chapter_root": "ch1", "notes": "draft"}]"#)
            .expect("manifest parses");
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn rejects_top_level_object() {
        let err = parse_manifest(r#"{"chapter_root": "ch1"}"#).unwrap_err();
        assert!(matches!(err, ManifestError::NotAList));
    }

    #[test]
    fn rejects_non_object_entry() {
        let err = parse_manifest(r#"["ch1"]"#).unwrap_err();
        assert!(matches!(err, ManifestError::EntryNotAnObject { index: 0 }));
    }

    #[test]
    fn rejects_entry_without_chapter_root() {
        let err = parse_manifest(r#"[{"chapter_root": "ch1"}, {}]"#).unwrap_err();
        assert!(matches!(err, ManifestError::MissingChapterRoot { index: 1 }));
    }

    #[test]
    fn rejects_non_string_chapter_root() {
        let err = parse_manifest(r#"[{"chapter_root": 7}]"#).unwrap_err();
        assert!(matches!(err, ManifestError::ChapterRootNotAString { index: 0 }));
    }

    #[test]
    fn rejects_non_list_supplements() {
        let err =
            parse_manifest(r#"[{"chapter_root": "ch1", "code_supplements": "main.c"}]"#).unwrap_err();
        assert!(matches!(err, ManifestError::SupplementsNotAList { index: 0 }));
    }

    #[test]
    fn rejects_non_string_supplement() {
        let err = parse_manifest(r#"[{"chapter_root": "ch1", "code_supplements": ["main.c", 3]}]"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::SupplementNotAString {
                index: 0,
                supplement: 1
            }
        ));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_manifest("not json at all").unwrap_err();
        assert!(matches!(err, ManifestError::Json(_)));
    }

    #[test]
    fn resolve_joins_paths_against_chapters_root() {
        let chapter = ChapterData {
            chapter_root: PathBuf::from("ch1"),
            code_supplements: vec![PathBuf::from("ch1/main.c")],
        };

        let resolved = chapter.resolve(Path::new("/book"));
        assert_eq!(resolved.chapter_root, PathBuf::from("/book/ch1"));
        assert_eq!(
            resolved.code_supplements,
            vec![PathBuf::from("/book/ch1/main.c")]
        );
    }

    #[test]
    fn resolve_keeps_supplement_order() {
        let chapter = ChapterData {
            chapter_root: PathBuf::from("ch2"),
            code_supplements: vec![
                PathBuf::from("ch2/a.c"),
                PathBuf::from("ch2/b.c"),
                PathBuf::from("shared/util.c"),
            ],
        };

        let resolved = chapter.resolve(Path::new("/book"));
        assert_eq!(
            resolved.code_supplements,
            vec![
                PathBuf::from("/book/ch2/a.c"),
                PathBuf::from("/book/ch2/b.c"),
                PathBuf::from("/book/shared/util.c"),
            ]
        );
    }
}
