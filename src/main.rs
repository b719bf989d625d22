//! sopscore - Sum-of-Pairs alignment scorer
//!
//! ## Usage
//!
//! ```bash
//! sopscore <alignment.fasta> <matrix.txt>
//! sopscore -o -8 -e -2 <alignment.fasta> <pam100.txt>
//! sopscore --pairs --strict <alignment.fasta> <matrix.txt>
//! ```
//!
//! Prints the total score on stdout. Without `--strict`, an alignment or
//! matrix that cannot be loaded scores 0 and the reason is logged.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use sopscore::formats::{load_alignment, load_matrix};
use sopscore::model::{Alignment, ScoringParams};
use sopscore::sop::{PairScore, ScoreResult, SopScorer};

/// sopscore - Sum-of-Pairs score of a multiple sequence alignment
///
/// Every pair of sequences is scored with the substitution matrix and
/// affine gap penalties, and the pair scores are summed.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, allow_negative_numbers = true)]
struct Args {
    /// Aligned sequences in FASTA format
    alignment: PathBuf,

    /// Substitution score matrix (whitespace-delimited, '#' comments)
    matrix: PathBuf,

    /// Score added for the first column of a gap run
    #[arg(short = 'o', long = "gap-open", default_value = "-10")]
    gap_open: i64,

    /// Score added for every further column of a gap run
    #[arg(short = 'e', long = "gap-extend", default_value = "-2")]
    gap_extend: i64,

    /// Fail on residue pairs missing from the matrix and on unreadable input
    /// instead of scoring them as 0
    #[arg(long)]
    strict: bool,

    /// Print the score of every sequence pair before the total
    #[arg(short = 'p', long)]
    pairs: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match (quiet, verbose) {
        (true, _) => log::LevelFilter::Error,
        (false, 0) => log::LevelFilter::Warn,
        (false, 1) => log::LevelFilter::Info,
        (false, 2) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Loaded alignment with the score of every sequence pair.
struct Report {
    alignment: Alignment,
    pairs: Vec<PairScore>,
}

impl Report {
    fn total(&self) -> i64 {
        self.pairs.iter().map(|p| p.score).sum()
    }
}

fn score_inputs(args: &Args, params: ScoringParams) -> ScoreResult<Report> {
    let alignment = load_alignment(&args.alignment)?;
    let matrix = load_matrix(&args.matrix)?;
    let pairs = SopScorer::new(&matrix, params).pair_scores(&alignment)?;

    let misses: usize = pairs.iter().map(|p| p.lookup_misses).sum();
    if misses > 0 {
        log::warn!("{} residue pairs were missing from the matrix and scored as 0", misses);
    }

    Ok(Report { alignment, pairs })
}

/// Applies the failure policy: in strict mode errors propagate, otherwise
/// they are logged and the run scores 0 (`Ok(None)`).
fn settle(result: ScoreResult<Report>, strict: bool) -> ScoreResult<Option<Report>> {
    match result {
        Ok(report) => Ok(Some(report)),
        Err(e) if !strict => {
            log::error!("Could not score alignment: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn write_pairs<W: Write>(
    out: &mut W,
    alignment: &Alignment,
    pairs: &[PairScore],
) -> io::Result<()> {
    for pair in pairs {
        writeln!(
            out,
            "{}\t{}\t{}",
            alignment.sequences[pair.first].id,
            alignment.sequences[pair.second].id,
            pair.score
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let mut params = ScoringParams::new(args.gap_open, args.gap_extend);
    if args.strict {
        params = params.strict();
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let total = match settle(score_inputs(&args, params), args.strict)? {
        Some(report) => {
            if args.pairs {
                write_pairs(&mut handle, &report.alignment, &report.pairs)?;
            }
            report.total()
        }
        None => 0,
    };

    if args.pairs {
        writeln!(handle, "total\t{}", total)?;
    } else {
        writeln!(handle, "{}", total)?;
    }

    Ok(())
}
