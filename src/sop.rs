//! Sum-of-Pairs scoring with affine gap penalties.
//!
//! Every unordered pair of sequences is walked column by column. Each
//! sequence of the pair carries its own gap state, so a gap run is charged
//! `open` on its first column and `extend` afterwards:
//!
//! | Column       | Charge                                   | Gap states after |
//! |--------------|------------------------------------------|------------------|
//! | `X` / `Y`    | `matrix[X, Y]` (0 and a warning if absent) | both closed    |
//! | `-` / `Y`    | `extend` if the first is open, else `open` | first open only |
//! | `X` / `-`    | `extend` if the second is open, else `open` | second open only |
//! | `-` / `-`    | `extend` if either is open, else `open`  | both open        |
//!
//! Double-gap columns are charged like single gaps, not skipped.
//!
//! Pairs are independent and are scored in parallel.

use std::path::Path;

use rayon::prelude::*;
use thiserror::Error;

use crate::formats::matrix::ScoreMatrix;
use crate::formats::{self, ParseError};
use crate::model::{Alignment, GapPenalties, LookupPolicy, ScoringParams, GAP};

/// Errors that can occur during scoring.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error(transparent)]
    Input(#[from] ParseError),

    #[error("No score for pair ({a}, {b}) at column {column}")]
    MissingScore { a: char, b: char, column: usize },

    #[error("Sequences have different lengths ({0} vs {1})")]
    LengthMismatch(usize, usize),
}

/// Result type for scoring operations.
pub type ScoreResult<T> = Result<T, ScoreError>;

/// Whether one sequence of a pair was inside a gap run at the previous column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapState {
    #[default]
    Closed,
    Open,
}

impl GapState {
    fn is_open(self) -> bool {
        self == GapState::Open
    }
}

/// Gap states of both sequences of one pair. Built fresh for every pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairState {
    pub first: GapState,
    pub second: GapState,
}

/// Classification of one alignment column of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Residues(u8, u8),
    GapInFirst,
    GapInSecond,
    DoubleGap,
}

impl Column {
    pub fn classify(a: u8, b: u8) -> Self {
        match (a == GAP, b == GAP) {
            (false, false) => Column::Residues(a, b),
            (true, false) => Column::GapInFirst,
            (false, true) => Column::GapInSecond,
            (true, true) => Column::DoubleGap,
        }
    }
}

impl PairState {
    /// Charges a gap column and moves to the next state.
    ///
    /// Returns `None` for residue columns, which are scored by the matrix.
    pub fn advance(&mut self, column: Column, gaps: GapPenalties) -> Option<i64> {
        let charge = |open: bool| if open { gaps.extend } else { gaps.open };
        let (score, next) = match column {
            Column::Residues(..) => (None, (GapState::Closed, GapState::Closed)),
            Column::GapInFirst => (
                Some(charge(self.first.is_open())),
                (GapState::Open, GapState::Closed),
            ),
            Column::GapInSecond => (
                Some(charge(self.second.is_open())),
                (GapState::Closed, GapState::Open),
            ),
            Column::DoubleGap => (
                Some(charge(self.first.is_open() || self.second.is_open())),
                (GapState::Open, GapState::Open),
            ),
        };
        (self.first, self.second) = next;
        score
    }
}

/// Score of one sequence pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairScore {
    /// Index of the first sequence
    pub first: usize,
    /// Index of the second sequence (`first < second` for alignment pairs)
    pub second: usize,
    pub score: i64,
    /// Residue columns whose pair was missing from the matrix
    pub lookup_misses: usize,
}

/// Scores alignments against one matrix and one set of parameters.
#[derive(Debug, Clone, Copy)]
pub struct SopScorer<'a> {
    matrix: &'a ScoreMatrix,
    params: ScoringParams,
}

impl<'a> SopScorer<'a> {
    pub fn new(matrix: &'a ScoreMatrix, params: ScoringParams) -> Self {
        Self { matrix, params }
    }

    pub fn params(&self) -> ScoringParams {
        self.params
    }

    /// Scores one pair of aligned sequences.
    ///
    /// The returned `PairScore` has indices `0` and `1`; use
    /// [`SopScorer::pair_scores`] for alignment indices.
    pub fn score_pair(&self, first: &[u8], second: &[u8]) -> ScoreResult<PairScore> {
        if first.len() != second.len() {
            return Err(ScoreError::LengthMismatch(first.len(), second.len()));
        }

        let mut state = PairState::default();
        let mut score = 0i64;
        let mut lookup_misses = 0;

        for (column, (&a, &b)) in first.iter().zip(second).enumerate() {
            let kind = Column::classify(a, b);
            if let Some(charge) = state.advance(kind, self.params.gaps) {
                score += charge;
                continue;
            }
            match self.matrix.get(a, b) {
                Some(value) => score += value,
                None => match self.params.policy {
                    LookupPolicy::Strict => {
                        return Err(ScoreError::MissingScore {
                            a: a as char,
                            b: b as char,
                            column,
                        })
                    }
                    LookupPolicy::Lenient => {
                        log::warn!(
                            "No score for pair ({}, {}) at column {}; scoring it as 0",
                            a as char,
                            b as char,
                            column
                        );
                        lookup_misses += 1;
                    }
                },
            }
        }

        Ok(PairScore {
            first: 0,
            second: 1,
            score,
            lookup_misses,
        })
    }

    /// Scores every unordered pair of the alignment, ordered by `(first, second)`.
    pub fn pair_scores(&self, alignment: &Alignment) -> ScoreResult<Vec<PairScore>> {
        formats::check_alignment(alignment)?;

        alignment
            .pairs()
            .into_par_iter()
            .map(|(i, j)| -> ScoreResult<PairScore> {
                let pair = self.score_pair(
                    alignment.sequences[i].as_bytes(),
                    alignment.sequences[j].as_bytes(),
                )?;
                log::debug!(
                    "Pair {} / {}: {}",
                    alignment.sequences[i].id,
                    alignment.sequences[j].id,
                    pair.score
                );
                Ok(PairScore {
                    first: i,
                    second: j,
                    ..pair
                })
            })
            .collect()
    }

    /// Sum-of-Pairs score of the alignment.
    pub fn score_alignment(&self, alignment: &Alignment) -> ScoreResult<i64> {
        formats::check_alignment(alignment)?;

        alignment
            .pairs()
            .into_par_iter()
            .map(|(i, j)| {
                self.score_pair(
                    alignment.sequences[i].as_bytes(),
                    alignment.sequences[j].as_bytes(),
                )
                .map(|pair| pair.score)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    }
}

/// Loads both inputs and returns the Sum-of-Pairs score.
pub fn score_files<P, Q>(alignment_path: P, matrix_path: Q, params: ScoringParams) -> ScoreResult<i64>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let alignment = formats::load_alignment(alignment_path)?;
    let matrix = formats::load_matrix(matrix_path)?;
    SopScorer::new(&matrix, params).score_alignment(&alignment)
}

/// Sum-of-Pairs score of an alignment file, or 0 if it cannot be computed.
///
/// Input errors are logged, not returned. Use [`score_files`] to get them.
pub fn calculate_sop<P, Q>(alignment_path: P, matrix_path: Q, gap_open: i64, gap_extend: i64) -> i64
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    match score_files(alignment_path, matrix_path, ScoringParams::new(gap_open, gap_extend)) {
        Ok(score) => score,
        Err(e) => {
            log::error!("Could not score alignment: {}", e);
            0
        }
    }
}
