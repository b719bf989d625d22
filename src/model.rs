//! Data model for alignment scoring.
//!
//! This module contains the data structures shared by the readers and the
//! scorer:
//! - Sequences and alignments
//! - Gap penalty parameters and the lookup-miss policy

/// The gap symbol used in aligned sequences.
pub const GAP: u8 = b'-';

/// Represents a single sequence with its identifier and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (from FASTA header, without '>')
    pub id: String,
    /// The aligned residues, gaps included
    data: Vec<u8>,
}

impl Sequence {
    /// Creates a new sequence from text.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into().into_bytes(),
        }
    }

    /// Creates a new sequence from raw bytes.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self { id: id.into(), data }
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Represents an alignment of multiple sequences.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// All sequences in the alignment
    pub sequences: Vec<Sequence>,
    /// The common length of all sequences (max length if not aligned)
    alignment_length: Option<usize>,
    /// Whether all sequences have the same length
    pub is_valid_alignment: bool,
    /// Warning message if sequences have different lengths
    pub warning: Option<String>,
}

impl Alignment {
    /// Creates a new alignment from a vector of sequences.
    pub fn new(sequences: Vec<Sequence>) -> Self {
        let (is_valid, alignment_length, warning) = Self::validate_alignment(&sequences);
        Self {
            sequences,
            alignment_length,
            is_valid_alignment: is_valid,
            warning,
        }
    }

    /// Validates that all sequences have the same length.
    fn validate_alignment(sequences: &[Sequence]) -> (bool, Option<usize>, Option<String>) {
        let Some(first) = sequences.first() else {
            return (true, None, None);
        };

        let first_len = first.len();
        if sequences.iter().all(|s| s.len() == first_len) {
            return (true, Some(first_len), None);
        }

        let min_len = sequences.iter().map(Sequence::len).min().unwrap_or(0);
        let max_len = sequences.iter().map(Sequence::len).max().unwrap_or(0);
        let warning = format!(
            "Sequences have different lengths (min: {}, max: {}). Not a valid alignment.",
            min_len, max_len
        );
        (false, Some(max_len), Some(warning))
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the alignment length (max sequence length).
    pub fn alignment_length(&self) -> usize {
        self.alignment_length.unwrap_or(0)
    }

    /// Gets a sequence by index.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    /// Returns true if the alignment is empty.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Number of unordered sequence pairs, C(N, 2).
    pub fn pair_count(&self) -> usize {
        let n = self.sequences.len();
        n * n.saturating_sub(1) / 2
    }

    /// All unordered index pairs `(i, j)` with `i < j`, in row-major order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.sequences.len();
        let mut pairs = Vec::with_capacity(self.pair_count());
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
        pairs
    }
}

/// Affine gap penalties.
///
/// `open` is charged for the first column of a gap run, `extend` for every
/// following column. Both are added to the score as given, so penalties are
/// usually negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapPenalties {
    pub open: i64,
    pub extend: i64,
}

impl GapPenalties {
    pub fn new(open: i64, extend: i64) -> Self {
        Self { open, extend }
    }
}

impl Default for GapPenalties {
    fn default() -> Self {
        Self {
            open: -10,
            extend: -2,
        }
    }
}

/// What to do when a residue pair is absent from the score matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPolicy {
    /// Log a warning and score the column as 0.
    #[default]
    Lenient,
    /// Abort scoring with an error.
    Strict,
}

/// Scoring configuration passed to the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoringParams {
    pub gaps: GapPenalties,
    pub policy: LookupPolicy,
}

impl ScoringParams {
    pub fn new(gap_open: i64, gap_extend: i64) -> Self {
        Self {
            gaps: GapPenalties::new(gap_open, gap_extend),
            policy: LookupPolicy::Lenient,
        }
    }

    pub fn strict(mut self) -> Self {
        self.policy = LookupPolicy::Strict;
        self
    }
}
