//! Document comparison helpers for refactoring tests.
//!
//! Comparisons work on line sequences, so `\n` and `\r\n` delimiters compare
//! equal and a missing trailing newline is not a difference.

use thiserror::Error;

use crate::handle::DocumentPath;
use crate::store::BackingStore;

const END_OF_TEXT: &str = "<end of text>";

/// First line at which two texts differ.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "line {line}: expected {}, found {}",
    show(.expected.as_deref()),
    show(.actual.as_deref())
)]
pub struct LineMismatch {
    /// One-based line number.
    pub line: usize,
    /// Expected line, `None` past the end of the expected text.
    pub expected: Option<String>,
    /// Actual line, `None` past the end of the actual text.
    pub actual: Option<String>,
}

/// Reasons a stored document does not match its expectation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentMismatch {
    /// The document does not exist.
    #[error("document '{path}' does not exist")]
    Missing {
        /// Requested document.
        path: DocumentPath,
    },

    /// The document content differs.
    #[error("document '{path}' differs at {mismatch}")]
    Content {
        /// Compared document.
        path: DocumentPath,
        /// First differing line.
        #[source]
        mismatch: LineMismatch,
    },
}

/// Compares two texts line by line.
///
/// # Errors
///
/// Returns the first [`LineMismatch`].
///
/// # Example
///
/// ```
/// use heddle_core::compare_lines;
///
/// assert!(compare_lines("a\r\nb\n", "a\nb").is_ok());
///
/// let mismatch = compare_lines("a\nb\n", "a\nc\n").expect_err("second line differs");
/// assert_eq!(mismatch.line, 2);
/// assert_eq!(mismatch.actual.as_deref(), Some("c"));
/// ```
pub fn compare_lines(expected: &str, actual: &str) -> Result<(), LineMismatch> {
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => return Ok(()),
            (left, right) if left == right => line += 1,
            (left, right) => {
                return Err(LineMismatch {
                    line,
                    expected: left.map(str::to_owned),
                    actual: right.map(str::to_owned),
                });
            }
        }
    }
}

pub(super) fn assert_document_eq<S: BackingStore + ?Sized>(
    store: &S,
    path: &str,
    expected: &str,
) -> Result<(), DocumentMismatch> {
    let path = DocumentPath::new(path);
    let Some(actual) = store.read(&path) else {
        return Err(DocumentMismatch::Missing { path });
    };
    compare_lines(expected, actual).map_err(|mismatch| DocumentMismatch::Content { path, mismatch })
}

fn show(line: Option<&str>) -> String {
    line.map_or_else(|| END_OF_TEXT.to_owned(), |text| format!("'{text}'"))
}
