//! Substitution score matrix reader.
//!
//! Reads whitespace-delimited matrices in the layout used by the NCBI
//! PAM/BLOSUM files:
//!
//! ```text
//! # PAM250 excerpt
//!    A  R  N
//! A  2 -2  0
//! R -2  6  0
//! N  0  0  2
//! ```
//!
//! ## Relaxed Parsing
//!
//! This reader is lenient about:
//! - Comments: `#` starts a comment running to the end of the line
//! - An optional corner label in front of the column symbols
//! - Cells that are not integers (decimals are truncated, anything else
//!   scores 0)
//! - Short rows (missing trailing cells score 0)
//! - Symbol case (symbols are uppercased)

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur during matrix parsing.
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty score matrix")]
    EmptyFile,

    #[error("Score matrix has a header but no rows")]
    NoRows,

    #[error("Line {line}: symbol '{symbol}' must be a single character")]
    InvalidSymbol { line: usize, symbol: String },

    #[error("Line {line}: duplicate symbol '{symbol}'")]
    DuplicateSymbol { line: usize, symbol: char },

    #[error("Line {line}: row '{symbol}' has {found} values but the header has {expected} columns")]
    RowTooLong {
        line: usize,
        symbol: char,
        expected: usize,
        found: usize,
    },
}

/// Result type for matrix operations.
pub type MatrixResult<T> = Result<T, MatrixError>;

/// A substitution score table indexed by (row symbol, column symbol).
///
/// Lookups are not symmetrised: `get(a, b)` reads row `a`, column `b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreMatrix {
    /// Column symbols in header order
    columns: Vec<u8>,
    /// Row symbols in file order
    rows: Vec<u8>,
    scores: HashMap<(u8, u8), i64>,
}

impl ScoreMatrix {
    /// Builds a matrix from explicit entries. Symbols are uppercased.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ((u8, u8), i64)>,
    {
        let mut matrix = Self::default();
        for ((a, b), score) in entries {
            matrix.insert(a, b, score);
        }
        matrix
    }

    /// Sets the score of row `a`, column `b`.
    pub fn insert(&mut self, a: u8, b: u8, score: i64) {
        let (a, b) = (a.to_ascii_uppercase(), b.to_ascii_uppercase());
        if !self.rows.contains(&a) {
            self.rows.push(a);
        }
        if !self.columns.contains(&b) {
            self.columns.push(b);
        }
        self.scores.insert((a, b), score);
    }

    /// Looks up the score of row `a`, column `b`.
    pub fn get(&self, a: u8, b: u8) -> Option<i64> {
        self.scores.get(&(a, b)).copied()
    }

    /// Column symbols in header order.
    pub fn symbols(&self) -> &[u8] {
        &self.columns
    }

    /// Row symbols in file order.
    pub fn row_symbols(&self) -> &[u8] {
        &self.rows
    }

    /// Number of (row, column) entries.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Reads a score matrix from a file.
pub fn parse_matrix_file<P: AsRef<Path>>(path: P) -> MatrixResult<ScoreMatrix> {
    let content = fs::read_to_string(path)?;
    parse_matrix_str(&content)
}

/// Parses score matrix content from a string.
pub fn parse_matrix_str(content: &str) -> MatrixResult<ScoreMatrix> {
    // (line number, tokens) for every line that survives comment stripping
    let lines: Vec<(usize, Vec<&str>)> = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, strip_comment(line).split_whitespace().collect::<Vec<_>>()))
        .filter(|(_, tokens)| !tokens.is_empty())
        .collect();

    let ((header_line, header), rows) = lines.split_first().ok_or(MatrixError::EmptyFile)?;
    if rows.is_empty() {
        return Err(MatrixError::NoRows);
    }

    // A header as wide as the widest row carries a corner label
    let widest_row = rows.iter().map(|(_, tokens)| tokens.len()).max().unwrap_or(0);
    let header = if header.len() > 1 && header.len() == widest_row {
        &header[1..]
    } else {
        &header[..]
    };

    let mut columns = Vec::with_capacity(header.len());
    for token in header {
        let symbol = parse_symbol(token, *header_line)?;
        if columns.contains(&symbol) {
            return Err(MatrixError::DuplicateSymbol {
                line: *header_line,
                symbol: symbol as char,
            });
        }
        columns.push(symbol);
    }

    let mut matrix = ScoreMatrix {
        columns,
        rows: Vec::with_capacity(rows.len()),
        scores: HashMap::with_capacity(header.len() * rows.len()),
    };

    for (line, tokens) in rows {
        let symbol = parse_symbol(tokens[0], *line)?;
        if matrix.rows.contains(&symbol) {
            return Err(MatrixError::DuplicateSymbol {
                line: *line,
                symbol: symbol as char,
            });
        }

        let values = &tokens[1..];
        if values.len() > matrix.columns.len() {
            return Err(MatrixError::RowTooLong {
                line: *line,
                symbol: symbol as char,
                expected: matrix.columns.len(),
                found: values.len(),
            });
        }

        for (idx, &column) in matrix.columns.iter().enumerate() {
            let score = match values.get(idx) {
                Some(cell) => coerce_score(cell, *line),
                None => 0,
            };
            matrix.scores.insert((symbol, column), score);
        }
        matrix.rows.push(symbol);
    }

    log::debug!(
        "Loaded score matrix: {} rows x {} columns",
        matrix.rows.len(),
        matrix.columns.len()
    );
    Ok(matrix)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_symbol(token: &str, line: usize) -> MatrixResult<u8> {
    match token.as_bytes() {
        [b] => Ok(b.to_ascii_uppercase()),
        _ => Err(MatrixError::InvalidSymbol {
            line,
            symbol: token.to_string(),
        }),
    }
}

/// Integers parse as-is, decimals truncate toward zero, anything else is 0.
fn coerce_score(cell: &str, line: usize) -> i64 {
    if let Ok(score) = cell.parse::<i64>() {
        return score;
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => value.trunc() as i64,
        _ => {
            log::debug!("Line {}: non-numeric cell '{}' scored as 0", line, cell);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "\
# toy matrix
   A  R  N
A  2 -2  0
R -2  6  0
N  0  0  2
";

    #[test]
    fn test_parse_simple_matrix() {
        let matrix = parse_matrix_str(SMALL).unwrap();

        assert_eq!(matrix.symbols(), b"ARN");
        assert_eq!(matrix.row_symbols(), b"ARN");
        assert_eq!(matrix.len(), 9);
        assert_eq!(matrix.get(b'A', b'A'), Some(2));
        assert_eq!(matrix.get(b'A', b'R'), Some(-2));
        assert_eq!(matrix.get(b'R', b'R'), Some(6));
        assert_eq!(matrix.get(b'N', b'N'), Some(2));
        assert_eq!(matrix.get(b'A', b'W'), None);
    }

    #[test]
    fn test_trailing_comments_and_blank_lines() {
        let content = "\n   A  C # columns\n\nA  1 -1  # first row\n# skipped\nC -1  1\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.get(b'A', b'C'), Some(-1));
        assert_eq!(matrix.get(b'C', b'C'), Some(1));
    }

    #[test]
    fn test_asymmetric_lookup_is_row_then_column() {
        let content = "  A C\nA 1 4\nC 7 1\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.get(b'A', b'C'), Some(4));
        assert_eq!(matrix.get(b'C', b'A'), Some(7));
    }

    #[test]
    fn test_corner_label_is_skipped() {
        let content = "X A C\nA 1 0\nC 0 1\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.symbols(), b"AC");
        assert_eq!(matrix.get(b'C', b'C'), Some(1));
    }

    #[test]
    fn test_non_numeric_cells_coerce_to_zero() {
        let content = "  A C\nA x 3.7\nC -2.9 NaN\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.get(b'A', b'A'), Some(0));
        assert_eq!(matrix.get(b'A', b'C'), Some(3));
        assert_eq!(matrix.get(b'C', b'A'), Some(-2));
        assert_eq!(matrix.get(b'C', b'C'), Some(0));
    }

    #[test]
    fn test_short_row_fills_with_zero() {
        let content = "  A C D\nA 5\nC 1 2 3\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.get(b'A', b'A'), Some(5));
        assert_eq!(matrix.get(b'A', b'D'), Some(0));
        assert_eq!(matrix.get(b'C', b'D'), Some(3));
    }

    #[test]
    fn test_lowercase_symbols_are_uppercased() {
        let content = "  a c\na 1 0\nc 0 1\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.get(b'A', b'A'), Some(1));
    }

    #[test]
    fn test_stop_symbol_column() {
        let content = "  A *\nA 2 -8\n* -8 1\n";
        let matrix = parse_matrix_str(content).unwrap();
        assert_eq!(matrix.get(b'*', b'A'), Some(-8));
    }

    #[test]
    fn test_empty_matrix() {
        assert!(matches!(parse_matrix_str(""), Err(MatrixError::EmptyFile)));
        assert!(matches!(
            parse_matrix_str("# only a comment\n"),
            Err(MatrixError::EmptyFile)
        ));
        assert!(matches!(parse_matrix_str("  A C\n"), Err(MatrixError::NoRows)));
    }

    #[test]
    fn test_row_too_long() {
        let content = "  A C\nA 1 2\nC 1 2 3 4\n";
        let result = parse_matrix_str(content);
        assert!(matches!(
            result,
            Err(MatrixError::RowTooLong { line: 3, expected: 2, found: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_and_duplicate_symbols() {
        let result = parse_matrix_str("  AA C\nA 1 2\nC 1 2\n");
        assert!(matches!(result, Err(MatrixError::InvalidSymbol { line: 1, .. })));

        let result = parse_matrix_str("  A C\nA 1 2\nA 1 2\n");
        assert!(matches!(
            result,
            Err(MatrixError::DuplicateSymbol { line: 3, symbol: 'A' })
        ));
    }

    #[test]
    fn test_from_entries() {
        let matrix = ScoreMatrix::from_entries([((b'a', b'a'), 5), ((b'A', b'C'), -1)]);
        assert_eq!(matrix.get(b'A', b'A'), Some(5));
        assert_eq!(matrix.get(b'A', b'C'), Some(-1));
        assert_eq!(matrix.get(b'C', b'A'), None);
        assert_eq!(matrix.row_symbols(), b"A");
    }
}
