//! Minimal lexical model of Java-like source documents.
//!
//! Documents ending in `.java` are source documents. Each declares one
//! top-level type named after the file, in the package given by its parent
//! directory. The scanner only distinguishes identifiers found in code, in
//! comments and in string or character literals; it never builds a syntax
//! tree.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::CharIndices;

use heddle_core::{BackingStore, DocumentPath, TextChange, TextEdit, TextRange};
use heddle_status::Status;

const SOURCE_EXTENSION: &str = ".java";

/// Where an identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Region {
    Code,
    Comment,
    Literal,
}

/// One identifier token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) region: Region,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    LineComment,
    BlockComment,
    String,
    Char,
}

impl Scan {
    const fn region(self) -> Region {
        match self {
            Self::Code => Region::Code,
            Self::LineComment | Self::BlockComment => Region::Comment,
            Self::String | Self::Char => Region::Literal,
        }
    }
}

pub(crate) fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

pub(crate) fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Returns `true` for a non-empty identifier that is not a keyword.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(is_identifier_start)
        && chars.all(is_identifier_part)
        && !KEYWORDS.contains(&name)
}

const KEYWORDS: &[&str] = &[
    "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "continue",
    "default", "do", "double", "else", "enum", "extends", "false", "final", "float", "for", "if",
    "implements", "import", "instanceof", "int", "interface", "long", "new", "null", "package",
    "private", "protected", "public", "return", "short", "static", "super", "switch", "this",
    "throw", "true", "try", "void", "while",
];

pub(crate) fn is_source(path: &DocumentPath) -> bool {
    path.as_str().ends_with(SOURCE_EXTENSION)
}

/// Document declaring the qualified type `p.q.A`, namely `p/q/A.java`.
pub(crate) fn type_document(qualified: &str) -> DocumentPath {
    DocumentPath::new(format!("{}{SOURCE_EXTENSION}", qualified.replace('.', "/")))
}

/// Splits `p.q.A` into `("p.q", "A")`; the package is empty for `A`.
pub(crate) fn split_qualified(qualified: &str) -> (&str, &str) {
    qualified.rsplit_once('.').unwrap_or(("", qualified))
}

/// Qualified name of `name` in `package`.
pub(crate) fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_owned()
    } else {
        format!("{package}.{name}")
    }
}

/// Every identifier token in `content`, in document order.
pub(crate) fn tokens(content: &str) -> Vec<Token> {
    let mut found = Vec::new();
    let mut scan = Scan::Code;
    let mut chars = content.char_indices().peekable();
    while let Some((offset, ch)) = chars.next() {
        let next = chars.peek().map(|(_, upcoming)| *upcoming);
        match (scan, ch) {
            (_, start) if is_identifier_start(start) => {
                let end = identifier_end(&mut chars, offset + start.len_utf8());
                found.push(Token {
                    start: offset,
                    end,
                    region: scan.region(),
                });
            }
            (Scan::Code, '/') if next == Some('/') => {
                chars.next();
                scan = Scan::LineComment;
            }
            (Scan::Code, '/') if next == Some('*') => {
                chars.next();
                scan = Scan::BlockComment;
            }
            (Scan::Code, '"') => scan = Scan::String,
            (Scan::Code, '\'') => scan = Scan::Char,
            (Scan::Code, digit) if digit.is_ascii_digit() => {
                identifier_end(&mut chars, offset + 1);
            }
            (Scan::LineComment, '\n') => scan = Scan::Code,
            (Scan::BlockComment, '*') if next == Some('/') => {
                chars.next();
                scan = Scan::Code;
            }
            (Scan::String | Scan::Char, '\\') => {
                chars.next();
            }
            (Scan::String, '"') | (Scan::Char, '\'') => scan = Scan::Code,
            _ => {}
        }
    }
    found
}

fn identifier_end(chars: &mut Peekable<CharIndices<'_>>, mut end: usize) -> usize {
    while let Some(&(offset, ch)) = chars.peek() {
        if !is_identifier_part(ch) {
            break;
        }
        end = offset + ch.len_utf8();
        chars.next();
    }
    end
}

/// Tokens in `content` spelling exactly `name`.
pub(crate) fn occurrences(content: &str, name: &str) -> Vec<Token> {
    tokens(content)
        .into_iter()
        .filter(|token| content.get(token.start..token.end) == Some(name))
        .collect()
}

/// Offset and value of the first non-whitespace character at or after
/// `offset`.
pub(crate) fn next_significant(content: &str, offset: usize) -> Option<(usize, char)> {
    content
        .get(offset..)?
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map(|(index, ch)| (offset + index, ch))
}

/// Whether the code token before `token` spells `keyword`.
pub(crate) fn preceded_by(content: &str, all: &[Token], token: &Token, keyword: &str) -> bool {
    all.iter()
        .rev()
        .find(|candidate| candidate.region == Region::Code && candidate.end <= token.start)
        .is_some_and(|candidate| content.get(candidate.start..candidate.end) == Some(keyword))
}

/// Last non-whitespace character before `offset`.
pub(crate) fn previous_significant(content: &str, offset: usize) -> Option<char> {
    content
        .get(..offset)?
        .chars()
        .rev()
        .find(|ch| !ch.is_whitespace())
}

/// Whether `content` declares a class, interface or enum called `name`.
pub(crate) fn declares_type(content: &str, name: &str) -> bool {
    let all = tokens(content);
    occurrences(content, name)
        .iter()
        .filter(|token| token.region == Region::Code)
        .any(|token| {
            ["class", "interface", "enum"]
                .iter()
                .any(|keyword| preceded_by(content, &all, token, keyword))
        })
}

/// Whether `content` declares a field called `name`: a code occurrence
/// following a type name and followed by `;`, `=` or `,`.
pub(crate) fn declares_field(content: &str, name: &str) -> bool {
    occurrences(content, name)
        .iter()
        .filter(|token| token.region == Region::Code)
        .any(|token| {
            let follows_type = previous_significant(content, token.start)
                .is_some_and(|ch| is_identifier_part(ch) || ch == '>' || ch == ']');
            let terminated = next_significant(content, token.end)
                .is_some_and(|(_, ch)| matches!(ch, ';' | '=' | ','));
            follows_type && terminated
        })
}

/// A method name followed by its parenthesised list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) name: Token,
    pub(crate) list: ArgumentList,
    /// `true` for a declaration with a body, `false` for a call.
    pub(crate) declaration: bool,
}

/// Every declaration and call of a method called `name` in code.
pub(crate) fn invocations(content: &str, name: &str) -> Vec<Invocation> {
    occurrences(content, name)
        .into_iter()
        .filter(|token| token.region == Region::Code)
        .filter_map(|token| {
            let (open, ch) = next_significant(content, token.end)?;
            if ch != '(' {
                return None;
            }
            let list = argument_list(content, open)?;
            let declaration = next_significant(content, list.end).is_some_and(|(_, after)| after == '{')
                && previous_significant(content, token.start).is_some_and(is_identifier_part);
            Some(Invocation {
                name: token,
                list,
                declaration,
            })
        })
        .collect()
}

/// Whether `content` declares a method called `name`.
pub(crate) fn declares_method(content: &str, name: &str) -> bool {
    invocations(content, name)
        .iter()
        .any(|invocation| invocation.declaration)
}

/// Whether a source document can see the type `qualified` by its simple
/// name: it lives in the same package or names the type in full.
pub(crate) fn sees_type(path: &DocumentPath, content: &str, qualified: &str) -> bool {
    let (package, _) = split_qualified(qualified);
    path.parent() == package.replace('.', "/") || content.contains(qualified)
}

/// Occurrences of `qualified` bounded by non-name characters, for text that
/// is not Java source.
pub(crate) fn qualified_occurrences(content: &str, qualified: &str) -> Vec<usize> {
    let bounded =
        |neighbour: Option<char>| neighbour.is_none_or(|ch| !is_identifier_part(ch) && ch != '.');
    content
        .match_indices(qualified)
        .map(|(start, _)| start)
        .filter(|start| {
            let before = content.get(..*start).and_then(|text| text.chars().next_back());
            let after = content
                .get(start + qualified.len()..)
                .and_then(|text| text.chars().next());
            bounded(before) && bounded(after)
        })
        .collect()
}

/// A comma-separated, parenthesised list such as a parameter or argument
/// list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArgumentList {
    /// Trimmed `(start, end)` spans of the items.
    pub(crate) items: Vec<(usize, usize)>,
    /// Offset just past the closing parenthesis.
    pub(crate) end: usize,
}

/// Parses the list opened by the `(` at `open`.
///
/// Nested parentheses, brackets, braces and literals are skipped. Returns
/// `None` when `open` is not a `(` or the list is unterminated.
pub(crate) fn argument_list(content: &str, open: usize) -> Option<ArgumentList> {
    let rest = content.get(open..)?;
    let mut chars = rest.char_indices();
    if chars.next().map(|(_, ch)| ch) != Some('(') {
        return None;
    }
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut item_start = open + 1;
    let mut items = Vec::new();
    for (index, ch) in chars {
        let offset = open + index;
        if let Some(delimiter) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == delimiter {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' if depth == 0 => {
                push_item(content, &mut items, item_start, offset);
                return Some(ArgumentList {
                    items,
                    end: offset + 1,
                });
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                push_item(content, &mut items, item_start, offset);
                item_start = offset + 1;
            }
            _ => {}
        }
    }
    None
}

fn push_item(content: &str, items: &mut Vec<(usize, usize)>, start: usize, end: usize) {
    let Some(raw) = content.get(start..end) else {
        return;
    };
    let trimmed = raw.trim_start();
    let first = start + (raw.len() - trimmed.len());
    let last = first + trimmed.trim_end().len();
    if last > first || !items.is_empty() {
        items.push((first, last));
    }
}

// ---------------------------------------------------------------------------
// Edit collection
// ---------------------------------------------------------------------------

/// Replacements gathered per document, turned into one stamped
/// [`TextChange`] per document.
#[derive(Debug, Default)]
pub(crate) struct EditSet {
    edits: BTreeMap<DocumentPath, Vec<(usize, usize, String)>>,
}

impl EditSet {
    pub(crate) fn replace(
        &mut self,
        path: &DocumentPath,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) {
        let edits = self.edits.entry(path.clone()).or_default();
        if edits.iter().all(|(existing, _, _)| *existing != start) {
            edits.push((start, end, text.into()));
        }
    }

    pub(crate) fn into_changes(self, store: &dyn BackingStore) -> Result<Vec<TextChange>, Status> {
        let mut changes = Vec::with_capacity(self.edits.len());
        for (path, replacements) in self.edits {
            let content = store
                .read(&path)
                .ok_or_else(|| Status::fatal(format!("Document '{path}' does not exist")))?;
            let mut edits = Vec::with_capacity(replacements.len());
            for (start, end, text) in replacements {
                let range = TextRange::from_offsets(content, start, end).ok_or_else(|| {
                    Status::fatal(format!(
                        "Offsets {start}..{end} do not address text in '{path}'"
                    ))
                })?;
                edits.push(TextEdit::new(range, text));
            }
            changes.push(TextChange::for_document(
                store,
                format!("Update '{path}'"),
                path,
                edits,
            ));
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests;
