//! Input readers.
//!
//! - [`fasta`]: aligned sequences (.fasta, .fa, .fas, ...)
//! - [`matrix`]: whitespace-delimited substitution matrices (PAM, BLOSUM)
//!
//! The loaders in this module wrap the raw parsers and add the checks the
//! scorer relies on: at least one sequence, and all sequences of one length.

pub mod fasta;
pub mod matrix;

use std::path::Path;

use thiserror::Error;

use crate::model::Alignment;
use matrix::ScoreMatrix;

/// Errors that can occur while loading scoring inputs.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("Score matrix error: {0}")]
    MatrixError(#[from] matrix::MatrixError),

    #[error("Alignment contains no sequences")]
    NoSequences,

    #[error("Invalid alignment: {0}")]
    UnequalLengths(String),
}

/// Result type for loading operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Loads an alignment and checks that it can be scored.
pub fn load_alignment<P: AsRef<Path>>(path: P) -> ParseResult<Alignment> {
    let alignment = fasta::parse_fasta_file(&path)?;
    check_alignment(&alignment)?;
    log::info!(
        "Loaded {} sequences of length {} from {}",
        alignment.sequence_count(),
        alignment.alignment_length(),
        path.as_ref().display()
    );
    Ok(alignment)
}

/// Loads a substitution score matrix.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> ParseResult<ScoreMatrix> {
    let matrix = matrix::parse_matrix_file(&path)?;
    log::info!(
        "Loaded {}x{} score matrix from {}",
        matrix.row_symbols().len(),
        matrix.symbols().len(),
        path.as_ref().display()
    );
    Ok(matrix)
}

/// Rejects empty alignments and sequences of differing lengths.
pub fn check_alignment(alignment: &Alignment) -> ParseResult<()> {
    if alignment.is_empty() {
        return Err(ParseError::NoSequences);
    }
    if !alignment.is_valid_alignment {
        let message = alignment
            .warning
            .clone()
            .unwrap_or_else(|| "sequences have different lengths".to_string());
        return Err(ParseError::UnequalLengths(message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::model::Sequence;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_alignment() {
        let file = write_temp(">s1\nAC-\n>s2\nA-C\n");
        let alignment = load_alignment(file.path()).unwrap();
        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.alignment_length(), 3);
    }

    #[test]
    fn test_load_alignment_unequal_lengths() {
        let file = write_temp(">s1\nACGT\n>s2\nAC\n");
        let result = load_alignment(file.path());
        assert!(matches!(result, Err(ParseError::UnequalLengths(_))));
    }

    #[test]
    fn test_load_alignment_empty_file() {
        let file = write_temp("");
        let result = load_alignment(file.path());
        assert!(matches!(
            result,
            Err(ParseError::FastaError(fasta::FastaError::EmptyFile))
        ));
    }

    #[test]
    fn test_load_alignment_missing_file() {
        let result = load_alignment("/nonexistent/aln.fasta");
        assert!(matches!(
            result,
            Err(ParseError::FastaError(fasta::FastaError::IoError(_)))
        ));
    }

    #[test]
    fn test_load_matrix() {
        let file = write_temp("  A C\nA 5 -1\nC -1 9\n");
        let matrix = load_matrix(file.path()).unwrap();
        assert_eq!(matrix.get(b'C', b'C'), Some(9));
    }

    #[test]
    fn test_load_matrix_missing_file() {
        let result = load_matrix("/nonexistent/pam250.txt");
        assert!(matches!(
            result,
            Err(ParseError::MatrixError(matrix::MatrixError::IoError(_)))
        ));
    }

    #[test]
    fn test_check_alignment_empty() {
        let alignment = Alignment::new(Vec::new());
        assert!(matches!(
            check_alignment(&alignment),
            Err(ParseError::NoSequences)
        ));

        let alignment = Alignment::new(vec![Sequence::new("s", "A")]);
        assert!(check_alignment(&alignment).is_ok());
    }
}
