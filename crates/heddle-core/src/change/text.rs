//! Text edits within a single document.
//!
//! Edits address the document by zero-based line and column, where columns
//! count UTF-8 bytes. All edits of a [`TextChange`] refer to the original
//! content. Applying them also yields the inverse edits, expressed against
//! the new content.

use heddle_status::Status;

use super::{Change, ChangeError, ContentStamp, validate_stamp};
use crate::handle::DocumentPath;
use crate::store::{BackingStore, StoreEdit, StoreError};

/// A position within a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// Line number (zero-based).
    pub line: u32,
    /// Column offset (zero-based, UTF-8 bytes).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Converts a byte offset in `content` to a position.
    ///
    /// Returns `None` when the offset lies past the end of the content or
    /// inside a multi-byte character.
    #[must_use]
    pub fn at_offset(content: &str, offset: usize) -> Option<Self> {
        let prefix = content.get(..offset)?;
        let line = prefix.bytes().filter(|byte| *byte == b'\n').count();
        let line_start = prefix.rfind('\n').map_or(0, |idx| idx + 1);
        Some(Self {
            line: u32::try_from(line).ok()?,
            column: u32::try_from(offset - line_start).ok()?,
        })
    }
}

/// A range within a text document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    /// Start of the range (inclusive).
    pub start: Position,
    /// End of the range (exclusive).
    pub end: Position,
}

impl TextRange {
    /// Creates a new range from start to end.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a zero-length range at the given position.
    #[must_use]
    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Creates the range covering `start..end` byte offsets of `content`.
    #[must_use]
    pub fn from_offsets(content: &str, start: usize, end: usize) -> Option<Self> {
        Some(Self::new(
            Position::at_offset(content, start)?,
            Position::at_offset(content, end)?,
        ))
    }
}

/// A single text replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    range: TextRange,
    new_text: String,
}

impl TextEdit {
    /// Builds a text edit from a range and replacement text.
    #[must_use]
    pub fn new(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    /// Builds a text edit from start and end positions.
    #[must_use]
    pub fn from_positions(start: Position, end: Position, new_text: impl Into<String>) -> Self {
        Self::new(TextRange::new(start, end), new_text)
    }

    /// Creates an insertion at the specified position.
    #[must_use]
    pub fn insert_at(position: Position, new_text: impl Into<String>) -> Self {
        Self::new(TextRange::point(position), new_text)
    }

    /// Creates a deletion spanning the given range.
    #[must_use]
    pub fn delete_range(start: Position, end: Position) -> Self {
        Self::new(TextRange::new(start, end), String::new())
    }

    /// Range being replaced.
    #[must_use]
    pub const fn range(&self) -> TextRange {
        self.range
    }

    /// Replacement text.
    #[must_use]
    pub fn new_text(&self) -> &str {
        &self.new_text
    }
}

/// Ordered set of edits against one document.
///
/// When created through [`TextChange::for_document`], the change carries a
/// stamp of the document's content and refuses to run once the document has
/// drifted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    name: String,
    path: DocumentPath,
    edits: Vec<TextEdit>,
    stamp: Option<ContentStamp>,
}

impl TextChange {
    /// Creates an unstamped change with no edits.
    #[must_use]
    pub fn new(name: impl Into<String>, path: DocumentPath) -> Self {
        Self {
            name: name.into(),
            path,
            edits: Vec::new(),
            stamp: None,
        }
    }

    /// Creates a change stamped with the document's current content.
    #[must_use]
    pub fn for_document(
        store: &dyn BackingStore,
        name: impl Into<String>,
        path: DocumentPath,
        edits: Vec<TextEdit>,
    ) -> Self {
        let stamp = store.read(&path).map(ContentStamp::of);
        Self {
            name: name.into(),
            path,
            edits,
            stamp,
        }
    }

    /// Appends an edit.
    pub fn add_edit(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    /// Stamps the change with the content it expects to find.
    #[must_use]
    pub fn with_expected_content(mut self, content: &str) -> Self {
        self.stamp = Some(ContentStamp::of(content));
        self
    }

    /// Document being edited.
    #[must_use]
    pub const fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// Edits in insertion order.
    #[must_use]
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Returns `true` when the change holds no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl Change for TextChange {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_valid(&self, store: &dyn BackingStore) -> Status {
        validate_stamp(store, &self.path, self.stamp.as_ref())
    }

    fn perform(
        self: Box<Self>,
        store: &mut dyn BackingStore,
    ) -> Result<Option<Box<dyn Change>>, ChangeError> {
        let Self {
            name,
            path,
            edits,
            stamp,
        } = *self;
        let original = store
            .read(&path)
            .ok_or_else(|| StoreError::Missing { path: path.clone() })?;
        if stamp.as_ref().is_some_and(|expected| !expected.matches(original)) {
            return Err(ChangeError::Failed {
                name,
                message: format!("document '{path}' has been modified since the change was created"),
            });
        }
        let (modified, inverse_edits) = apply_edits(&path, original, &edits)?;
        let stamp = ContentStamp::of(&modified);
        store.apply(StoreEdit::Replace {
            path: path.clone(),
            content: modified,
        })?;
        Ok(Some(Box::new(Self {
            name,
            path,
            edits: inverse_edits,
            stamp: Some(stamp),
        })))
    }

    fn affected_documents(&self) -> Vec<DocumentPath> {
        vec![self.path.clone()]
    }
}

/// Edit resolved to byte offsets in the original content.
struct ResolvedEdit<'a> {
    start: usize,
    end: usize,
    new_text: &'a str,
}

/// Applies `edits` to `original` and returns the new content together with
/// the edits that turn it back into `original`.
///
/// Handles both LF and CRLF line endings by computing byte offsets from the
/// original content rather than assuming fixed newline lengths.
fn apply_edits(
    path: &DocumentPath,
    original: &str,
    edits: &[TextEdit],
) -> Result<(String, Vec<TextEdit>), ChangeError> {
    let line_starts = compute_line_start_offsets(original);
    let mut resolved = edits
        .iter()
        .map(|edit| {
            let range = edit.range();
            let start = line_column_to_offset(&line_starts, original, range.start)
                .ok_or_else(|| position_error(path, range.start))?;
            let end = line_column_to_offset(&line_starts, original, range.end)
                .ok_or_else(|| position_error(path, range.end))?;
            if end < start {
                return Err(ChangeError::InvalidPosition {
                    path: path.clone(),
                    message: format!(
                        "range end {}:{} precedes start {}:{}",
                        range.end.line, range.end.column, range.start.line, range.start.column
                    ),
                });
            }
            Ok(ResolvedEdit {
                start,
                end,
                new_text: edit.new_text(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    resolved.sort_by_key(|edit| (edit.start, edit.end));

    let mut result = String::with_capacity(original.len());
    let mut cursor = 0;
    let mut inverse_spans = Vec::with_capacity(resolved.len());
    for edit in &resolved {
        if edit.start < cursor {
            return Err(ChangeError::OverlappingEdits { path: path.clone() });
        }
        let kept = slice(path, original, cursor, edit.start)?;
        let replaced = slice(path, original, edit.start, edit.end)?;
        result.push_str(kept);
        let new_start = result.len();
        result.push_str(edit.new_text);
        inverse_spans.push((new_start, result.len(), replaced));
        cursor = edit.end;
    }
    result.push_str(slice(path, original, cursor, original.len())?);

    let inverse = inverse_spans
        .into_iter()
        .map(|(start, end, old_text)| {
            TextRange::from_offsets(&result, start, end)
                .map(|range| TextEdit::new(range, old_text))
                .ok_or_else(|| ChangeError::InvalidPosition {
                    path: path.clone(),
                    message: format!("replacement at byte {start} splits a character"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((result, inverse))
}

fn slice<'a>(
    path: &DocumentPath,
    content: &'a str,
    start: usize,
    end: usize,
) -> Result<&'a str, ChangeError> {
    content
        .get(start..end)
        .ok_or_else(|| ChangeError::InvalidPosition {
            path: path.clone(),
            message: format!("byte range {start}..{end} splits a character"),
        })
}

fn position_error(path: &DocumentPath, position: Position) -> ChangeError {
    ChangeError::InvalidPosition {
        path: path.clone(),
        message: format!(
            "invalid position: line {}, column {}",
            position.line, position.column
        ),
    }
}

/// Computes the byte offset of each line start.
fn compute_line_start_offsets(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (idx, byte) in content.bytes().enumerate() {
        if byte == b'\n' {
            offsets.push(idx + 1);
        }
    }
    offsets
}

/// Converts a position to a byte offset. Columns may address any byte up to,
/// but excluding, the line's `\n` terminator.
fn line_column_to_offset(line_starts: &[usize], content: &str, position: Position) -> Option<usize> {
    let line_idx = usize::try_from(position.line).ok()?;
    let column = usize::try_from(position.column).ok()?;
    let line_start = *line_starts.get(line_idx)?;
    let line_end = line_starts
        .get(line_idx + 1)
        .map_or(content.len(), |next| next - 1);
    if column > line_end - line_start {
        return None;
    }
    line_start.checked_add(column)
}
