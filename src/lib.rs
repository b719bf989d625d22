//! # sopscore - Sum-of-Pairs alignment scoring
//!
//! Scores an existing multiple sequence alignment against a substitution
//! matrix with affine gap penalties.
//!
//! ## Architecture
//!
//! - `model`: Sequences, alignments and scoring parameters
//! - `formats`: FASTA and score matrix readers
//! - `sop`: Pairwise affine-gap scorer and Sum-of-Pairs aggregation
//!
//! ## Example
//!
//! ```no_run
//! let score = sopscore::sop::calculate_sop("test1.fasta", "pam250.txt", -10, -2);
//! println!("{}", score);
//! ```

pub mod formats;
pub mod model;
pub mod sop;
