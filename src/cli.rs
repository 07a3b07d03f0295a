use clap::Parser;
use std::path::PathBuf;

/// Collate and format markdown book chapters into an EPUB ebook.
///
/// The tool expects to run from the book's configuration directory: the
/// directory holding `book_data.json`, `metadata.yml`, and `styles.css`.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// The directory where chapter data is stored. If none provided, the
    /// parent of the current directory is used
    #[clap(long)]
    pub chapters_root: Option<PathBuf>,

    /// The name of the generated EPUB book file
    #[clap(short = 'o', long, default_value = "book.epub")]
    pub output_epub_name: String,

    /// The directory where generated output is placed. If none provided,
    /// `output` under the current directory is used
    #[clap(long)]
    pub output_directory: Option<PathBuf>,

    /// Whether to log output verbosely or not
    #[clap(short, long)]
    pub verbose: bool,
}
