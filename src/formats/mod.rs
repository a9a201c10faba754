//! Multi-format alignment file parser.
//!
//! Supports automatic format detection for:
//! - FASTA
//! - PHYLIP - strict or relaxed names, sequential or interleaved layout
//!
//! Format detection order:
//! 1. Explicit format specification (-f option)
//! 2. A PHYLIP header on line 1 (`ntax nchar [i|s]`)
//! 3. A FASTA `>` line before any other content
//!
//! Files are consumed as a stream of lines. Only the lines needed to decide
//! the format are buffered before the rest of the stream is handed over to
//! the chosen parser.

pub mod fasta;
pub mod phylip;

use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::model::Alignment;

/// The dialect an alignment was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Fasta,
    /// PHYLIP with fixed 10-character name fields
    PhylipStrict,
    /// PHYLIP with whitespace-delimited names
    PhylipRelaxed,
}

impl FileFormat {
    /// Returns the source format family.
    pub fn source(&self) -> SourceFormat {
        match self {
            FileFormat::Fasta => SourceFormat::Fasta,
            FileFormat::PhylipStrict | FileFormat::PhylipRelaxed => SourceFormat::Phylip,
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::PhylipStrict => write!(f, "PHYLIP (strict)"),
            FileFormat::PhylipRelaxed => write!(f, "PHYLIP (relaxed)"),
        }
    }
}

/// Format family decided by the sniffer, before the dialect is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Fasta,
    Phylip,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Fasta => write!(f, "FASTA"),
            SourceFormat::Phylip => write!(f, "PHYLIP"),
        }
    }
}

/// Errors that can occur during file parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    #[error("Line {line} is not valid UTF-8 text")]
    InvalidEncoding { line: usize },

    #[error("Empty file")]
    EmptyFile,

    #[error("Could not determine file format: expected a FASTA file ('>' taxon lines) \
             or a PHYLIP file (first line 'ntax nchar')")]
    UnknownFormat,

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("PHYLIP error: {0}")]
    PhylipError(#[from] phylip::PhylipError),
}

impl ParseError {
    /// Returns true if the error is caused by the content of the input file
    /// and can be fixed by the user editing it.
    pub fn is_user_fixable(&self) -> bool {
        match self {
            ParseError::IoError(_) => false,
            ParseError::InvalidEncoding { .. } | ParseError::EmptyFile | ParseError::UnknownFormat => true,
            ParseError::FastaError(e) => e.is_user_fixable(),
            ParseError::PhylipError(e) => e.is_user_fixable(),
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Returns true if the lines look like FASTA: a `>` line appears before any
/// content other than blank lines and `#` comments.
pub fn is_fasta<S: AsRef<str>>(lines: &[S]) -> bool {
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        return line.starts_with('>');
    }
    false
}

/// Returns true if the first line is a PHYLIP header.
pub fn is_phylip<S: AsRef<str>>(lines: &[S]) -> bool {
    lines
        .first()
        .is_some_and(|line| phylip::PhylipHeader::parse(line.as_ref()).is_some())
}

/// Detects the file format from its leading lines.
///
/// A matching PHYLIP header on line 1 wins; otherwise the lines are scanned
/// for a FASTA taxon line.
pub fn detect_format<S: AsRef<str>>(lines: &[S]) -> Option<SourceFormat> {
    if is_phylip(lines) {
        Some(SourceFormat::Phylip)
    } else if is_fasta(lines) {
        Some(SourceFormat::Fasta)
    } else {
        None
    }
}

/// Reads the lines needed to sniff the format: line 1, plus everything up to
/// and including the first line that is neither blank nor a `#` comment.
fn read_lookahead<I>(lines: &mut I) -> io::Result<Vec<String>>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut lookahead = Vec::new();
    for line in lines.by_ref() {
        let line = line?;
        let decisive = !(line.trim().is_empty() || line.starts_with('#'));
        lookahead.push(line);
        if decisive {
            break;
        }
    }
    Ok(lookahead)
}

/// Parses an alignment from a stream of lines.
///
/// When `forced_format` is `None`, the format is sniffed from the leading
/// lines. The returned alignment is not classified yet.
pub fn parse_lines<I>(lines: I, forced_format: Option<SourceFormat>) -> ParseResult<Alignment>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    // Undecodable lines surface from `BufRead::lines` as `InvalidData`
    let bad_line = Cell::new(None);
    let mut lines = lines.into_iter().enumerate().map(|(idx, line)| {
        line.inspect_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                bad_line.set(Some(idx + 1));
            }
        })
    });
    let input_error = |err: ParseError| match bad_line.get() {
        Some(line) => ParseError::InvalidEncoding { line },
        None => err,
    };

    let lookahead = read_lookahead(&mut lines).map_err(|e| input_error(e.into()))?;

    if lookahead.iter().all(|line| line.trim().is_empty()) {
        return Err(ParseError::EmptyFile);
    }

    let format = match forced_format {
        Some(format) => format,
        None => detect_format(&lookahead).ok_or(ParseError::UnknownFormat)?,
    };
    debug!(%format, forced = forced_format.is_some(), "detected source format");

    let lines = lookahead.into_iter().map(Ok).chain(lines);
    let result = match format {
        SourceFormat::Fasta => fasta::parse_fasta_lines(lines).map_err(ParseError::from),
        SourceFormat::Phylip => phylip::parse_phylip_lines(lines).map_err(ParseError::from),
    };
    result.map_err(input_error)
}

/// Parses an alignment from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R, forced_format: Option<SourceFormat>) -> ParseResult<Alignment> {
    parse_lines(reader.lines(), forced_format)
}

/// Parses an alignment from an in-memory string.
pub fn parse_str(content: &str, forced_format: Option<SourceFormat>) -> ParseResult<Alignment> {
    parse_reader(content.as_bytes(), forced_format)
}

/// Parses an alignment file, optionally forcing the format.
pub fn parse_file<P: AsRef<Path>>(path: P, forced_format: Option<SourceFormat>) -> ParseResult<Alignment> {
    let file = File::open(&path)?;
    let reader = BufReader::with_capacity(1024 * 1024, file);
    parse_reader(reader, forced_format)
}
