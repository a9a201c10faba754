//! FASTA parser and writer.
//!
//! Sequences may span several lines; whitespace inside sequence lines is
//! dropped. Blank lines and `#` comments are allowed before the first taxon
//! line.
//!
//! ## FASTA Format
//!
//! ```text
//! >taxon_1
//! ACGTACGTACGT...
//! >taxon_2
//! TGCATGCATGCA...
//! ```

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::formats::FileFormat;
use crate::model::{describe_chars, find_duplicate_taxon, illegal_taxon_chars, Alignment, Sequence};

/// Default number of sites per line when writing.
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    #[error("No taxon lines ('>name') found")]
    EmptyFile,

    #[error("Empty taxon name at line {0}")]
    EmptyTaxonName(usize),

    #[error("Sequence data without a preceding '>' taxon line at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Taxon name '{name}' at line {line} contains illegal characters: {chars}")]
    IllegalTaxonName { line: usize, name: String, chars: String },

    #[error("Taxon name '{0}' is used more than once")]
    DuplicateTaxon(String),

    #[error("Sequence '{taxon}' has length {found}, but the first sequence has length {expected}")]
    LengthMismatch {
        taxon: String,
        found: usize,
        expected: usize,
    },

    #[error("All sequences are empty")]
    EmptySequences,
}

impl FastaError {
    /// Returns true if the error comes from the file content.
    pub fn is_user_fixable(&self) -> bool {
        !matches!(self, FastaError::IoError(_))
    }
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses FASTA content from a stream of lines.
pub fn parse_fasta_lines<I>(lines: I) -> FastaResult<Alignment>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut sequences: Vec<Sequence> = Vec::new();
    let mut current: Option<Sequence> = None;

    for (idx, line) in lines.into_iter().enumerate() {
        let line_number = idx + 1;
        let line = line?;

        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                sequences.push(done);
            }

            let taxon = header.trim();
            if taxon.is_empty() {
                return Err(FastaError::EmptyTaxonName(line_number));
            }
            let illegal = illegal_taxon_chars(taxon);
            if !illegal.is_empty() {
                return Err(FastaError::IllegalTaxonName {
                    line: line_number,
                    name: taxon.to_string(),
                    chars: describe_chars(&illegal),
                });
            }

            // Alignments have uniform length, so the previous sequence is a good guess.
            let capacity = sequences.last().map_or(0, |s| s.code.len());
            current = Some(Sequence::new(taxon, String::with_capacity(capacity)));
        } else if let Some(sequence) = current.as_mut() {
            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                sequence.code.push_str(&line);
            } else {
                sequence.code.extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        } else if !(line.trim().is_empty() || line.starts_with('#')) {
            return Err(FastaError::SequenceWithoutHeader(line_number));
        }
    }

    if let Some(done) = current {
        sequences.push(done);
    }

    let expected = match sequences.first() {
        Some(first) => first.len(),
        None => return Err(FastaError::EmptyFile),
    };
    if let Some(bad) = sequences.iter().find(|s| s.len() != expected) {
        return Err(FastaError::LengthMismatch {
            taxon: bad.taxon.clone(),
            found: bad.len(),
            expected,
        });
    }
    if expected == 0 {
        return Err(FastaError::EmptySequences);
    }
    if let Some(taxon) = find_duplicate_taxon(&sequences) {
        return Err(FastaError::DuplicateTaxon(taxon.to_string()));
    }

    debug!(sequences = sequences.len(), length = expected, "parsed FASTA");
    Ok(Alignment::new(sequences, FileFormat::Fasta, false))
}

/// Parses FASTA content from a reader.
pub fn parse_fasta<R: BufRead>(reader: R) -> FastaResult<Alignment> {
    parse_fasta_lines(reader.lines())
}

/// Parses FASTA content from a string.
///
/// Useful for testing or processing in-memory data.
pub fn parse_fasta_str(content: &str) -> FastaResult<Alignment> {
    parse_fasta(content.as_bytes())
}

/// Writes an alignment as FASTA, wrapping sequence lines at `line_width`
/// sites (0 disables wrapping).
pub fn write_fasta<W: Write>(writer: &mut W, alignment: &Alignment, line_width: usize) -> io::Result<()> {
    for seq in &alignment.sequences {
        writeln!(writer, ">{}", seq.taxon)?;
        if line_width == 0 {
            writeln!(writer, "{}", seq.code)?;
            continue;
        }
        let chars: Vec<char> = seq.code.chars().collect();
        for chunk in chars.chunks(line_width) {
            writeln!(writer, "{}", chunk.iter().collect::<String>())?;
        }
    }
    Ok(())
}
