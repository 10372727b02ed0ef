//! Extraction of the first HTML table in a document.

use std::borrow::Cow;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::Event;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Cell text of a table, header row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Data rows, padded with empty cells to the header width.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|candidate| candidate.trim() == header.trim())
    }
}

#[derive(Default)]
struct TableBuilder {
    depth: usize,
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl TableBuilder {
    fn in_table(&self) -> bool {
        self.depth == 1
    }

    fn open_row(&mut self) {
        self.close_row();
        self.row = Some(Vec::new());
    }

    fn open_cell(&mut self) {
        self.close_cell();
        if self.row.is_none() {
            self.row = Some(Vec::new());
        }
        self.cell = Some(String::new());
    }

    fn close_cell(&mut self) {
        if let Some(text) = self.cell.take() {
            let normalized = normalize_cell(&text);
            self.row.get_or_insert_with(Vec::new).push(normalized);
        }
    }

    fn close_row(&mut self) {
        self.close_cell();
        if let Some(row) = self.row.take()
            && !row.is_empty()
        {
            self.rows.push(row);
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            cell.push_str(text);
        }
    }
}

fn normalize_cell(raw: &str) -> String {
    let trimmed = raw.trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn markup_error(path: &Path, err: impl std::fmt::Display) -> IngestError {
    IngestError::Markup {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Resolve `&name;` / `&#NN;` / `&#xNN;` into text, using the HTML5
/// named-entity table.
fn resolve_entity(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse::<u32>().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    resolve_html5_entity(name).map(String::from)
}

/// Escape the `&` and `<` that HTML treats as literal text so the tokenizer
/// does not read them as markup: an `&` not followed by `name;`, and a `<`
/// not followed by a tag name, `/`, `!` or `?`.
fn escape_stray_markup(html: &str) -> Cow<'_, str> {
    if !html.contains(['&', '<']) {
        return Cow::Borrowed(html);
    }
    let mut escaped = String::with_capacity(html.len());
    for (index, ch) in html.char_indices() {
        let rest = &html[index + ch.len_utf8()..];
        match ch {
            '&' if !starts_reference(rest) => escaped.push_str("&amp;"),
            '<' if !starts_tag(rest) => escaped.push_str("&lt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

fn starts_reference(rest: &str) -> bool {
    let name_len = rest
        .bytes()
        .take_while(|byte| byte.is_ascii_alphanumeric() || *byte == b'#')
        .count();
    name_len > 0 && rest.as_bytes().get(name_len) == Some(&b';')
}

fn starts_tag(rest: &str) -> bool {
    rest.bytes()
        .next()
        .is_some_and(|byte| byte.is_ascii_alphabetic() || matches!(byte, b'/' | b'!' | b'?'))
}

/// Fit a data row to the header width. Returns the non-empty cells that did
/// not fit.
fn fit_to_width(row: &mut Vec<String>, width: usize) -> usize {
    let dropped = row
        .iter()
        .skip(width)
        .filter(|cell| !cell.is_empty())
        .count();
    row.resize(width, String::new());
    dropped
}

/// Pull the first `<table>` out of an HTML document.
///
/// The first row (whether `<th>` or `<td>` cells) is the header. Tables nested
/// inside a cell are skipped, and closing `</td>`/`</tr>` tags may be omitted.
/// A bare `&` or a `<` that opens no tag is kept as cell text. Cells beyond the
/// header width are dropped with a warning.
pub fn extract_first_table(html: &str, path: &Path) -> Result<RawTable> {
    let html = escape_stray_markup(html);
    let mut reader = Reader::from_str(&html);
    {
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
    }

    let mut builder = TableBuilder::default();
    let mut found = false;
    loop {
        let event = reader
            .read_event()
            .map_err(|err| markup_error(path, err))?;
        match event {
            Event::Start(tag) => {
                let name = tag.local_name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"table" => {
                        builder.depth += 1;
                        found = true;
                    }
                    b"tr" if builder.in_table() => builder.open_row(),
                    b"td" | b"th" if builder.in_table() => builder.open_cell(),
                    b"br" if builder.in_table() => builder.push_text(" "),
                    _ => {}
                }
            }
            Event::Empty(tag) => {
                let name = tag.local_name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"td" | b"th" if builder.in_table() => {
                        builder.open_cell();
                        builder.close_cell();
                    }
                    b"br" if builder.in_table() => builder.push_text(" "),
                    _ => {}
                }
            }
            Event::End(tag) => {
                let name = tag.local_name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"table" if builder.depth == 1 => {
                        builder.close_row();
                        break;
                    }
                    b"table" => builder.depth = builder.depth.saturating_sub(1),
                    b"tr" if builder.in_table() => builder.close_row(),
                    b"td" | b"th" if builder.in_table() => builder.close_cell(),
                    _ => {}
                }
            }
            Event::Text(text) if builder.in_table() => {
                builder.push_text(&String::from_utf8_lossy(&text));
            }
            Event::CData(text) if builder.in_table() => {
                builder.push_text(&String::from_utf8_lossy(&text));
            }
            Event::GeneralRef(reference) if builder.in_table() => {
                let name = String::from_utf8_lossy(&reference);
                match resolve_entity(&name) {
                    Some(text) => builder.push_text(&text),
                    None => builder.push_text(&format!("&{name};")),
                }
            }
            Event::Eof => {
                builder.close_row();
                break;
            }
            _ => {}
        }
    }

    if !found || builder.rows.is_empty() {
        return Err(IngestError::NoTable {
            path: path.to_path_buf(),
        });
    }

    let mut rows = builder.rows;
    let headers = rows.remove(0);
    let width = headers.len();
    let rows = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .enumerate()
        .map(|(index, mut row)| {
            let dropped = fit_to_width(&mut row, width);
            if dropped > 0 {
                warn!(
                    path = %path.display(),
                    row = index + 1,
                    columns = width,
                    dropped,
                    "row is wider than the header; extra cells ignored"
                );
            }
            row
        })
        .collect::<Vec<_>>();

    debug!(
        path = %path.display(),
        columns = width,
        rows = rows.len(),
        "extracted html table"
    );
    Ok(RawTable { headers, rows })
}
