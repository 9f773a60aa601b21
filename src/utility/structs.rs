//! The structs
//!
/// Collects rows of cells, and writes them out with every column right aligned to its widest cell.
///
/// Columns are separated by `column_padding` spaces.
#[derive(Debug, Default)]
pub struct GridWriter {
    pub column_padding: usize,
    pub rows: Vec<Vec<String>>,
    pub current_row: Vec<String>,
}
