// Workbook normalization - CSV and Excel inputs to one CellMatrix shape

mod csv_import;
mod error;
mod xlsx;

pub use error::NormalizeError;

use payline_matrix::CellMatrix;

/// Uploads are buffered in memory, so cap them before touching the bytes.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// One decoded worksheet.
#[derive(Debug, Clone)]
pub struct NamedSheet {
    pub name: String,
    pub matrix: CellMatrix,
}

/// A normalized workbook: every sheet decoded to canonical matrices.
/// CSV input always yields exactly one sheet named `Sheet1`.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub sheets: Vec<NamedSheet>,
    pub warnings: Vec<String>,
}

impl Workbook {
    pub fn sheet_by_name(&self, name: &str) -> Option<&NamedSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn first_sheet(&self) -> Option<&NamedSheet> {
        self.sheets.first()
    }

    /// Commission worksheets accumulate one tab per month; the convention
    /// is that the last tab is the current one.
    pub fn last_sheet(&self) -> Option<&NamedSheet> {
        self.sheets.last()
    }

    /// Resolve an optional sheet hint: named sheet if present, otherwise
    /// the fallback picker (e.g. [`Workbook::first_sheet`]).
    pub fn resolve_sheet<'a>(
        &'a self,
        hint: Option<&str>,
        fallback: impl Fn(&'a Workbook) -> Option<&'a NamedSheet>,
    ) -> Option<&'a NamedSheet> {
        match hint {
            Some(name) => self.sheet_by_name(name),
            None => fallback(self),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Csv,
    Excel,
}

/// Identify the container format: magic-number signature first, filename
/// extension as a fallback hint, then a "looks like delimited text" check.
fn detect_container(bytes: &[u8], filename: &str) -> Option<Container> {
    // ZIP local-file header: modern .xlsx
    if bytes.starts_with(b"PK\x03\x04") {
        return Some(Container::Excel);
    }
    // OLE2 compound document: legacy .xls
    if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return Some(Container::Excel);
    }

    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        return Some(Container::Csv);
    }
    if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
        return Some(Container::Excel);
    }

    // No signature, no recognized extension: accept as CSV only if the
    // bytes decode as text with at least one delimiter and line break.
    if let Ok(text) = std::str::from_utf8(bytes) {
        if text.contains(',') && text.contains('\n') {
            return Some(Container::Csv);
        }
    }

    None
}

/// Normalize an uploaded file into a [`Workbook`].
///
/// The hard invariant here: identical logical content in CSV or Excel form
/// must produce bit-identical [`CellMatrix`] values, so every downstream
/// parser behaves the same for both formats.
pub fn normalize(bytes: &[u8], filename: &str) -> Result<Workbook, NormalizeError> {
    if bytes.is_empty() {
        return Err(NormalizeError::EmptyFile);
    }
    if bytes.len() > MAX_FILE_BYTES {
        return Err(NormalizeError::TooLarge { size: bytes.len() });
    }

    match detect_container(bytes, filename) {
        Some(Container::Csv) => csv_import::normalize_csv(bytes),
        Some(Container::Excel) => xlsx::normalize_excel(bytes),
        None => Err(NormalizeError::UnsupportedFormat),
    }
}
