//! PHYLIP parser and writer.
//!
//! Supports strict and relaxed names in sequential or interleaved layout.
//! Neither is declared reliably by the file, so both are inferred from the
//! content before any sequence is extracted.
//!
//! ## PHYLIP Format
//!
//! The first line contains the number of sequences and the sequence length,
//! optionally followed by an `i` (interleaved) or `s` (sequential) hint:
//! ```text
//!  3 10
//! ```
//!
//! ### Sequential Format
//! Each taxon's data follows its name, on one or several lines:
//! ```text
//!  3 10
//! Seq1      ACGTACGTAC
//! Seq2      TGCATGCATG
//! Seq3      AAAACCCCGG
//! ```
//!
//! ### Interleaved Format
//! Names on first block, then data continues in blank-separated blocks:
//! ```text
//!  3 20
//! Seq1      ACGTACGTAC
//! Seq2      TGCATGCATG
//! Seq3      AAAACCCCGG
//!
//! GTGTGTGTGT
//! CACACACACA
//! TTTTTTTTTT
//! ```
//!
//! ### Names
//! Strict files use a fixed 10-character name field, so the data may start
//! right after the name. Relaxed files separate the name from the data with
//! whitespace and allow names of any length.

use std::io::{self, BufRead, Write};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::formats::FileFormat;
use crate::model::{describe_chars, find_duplicate_taxon, illegal_taxon_chars, Alignment, Sequence};

/// Width of the name field in strict PHYLIP.
pub const STRICT_NAME_WIDTH: usize = 10;

/// Default number of sites per block when writing interleaved files.
pub const DEFAULT_BLOCK_WIDTH: usize = 60;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s+(\d+)(?:\s+([is]))?\s*$").expect("valid PHYLIP header pattern"));

/// Errors that can occur during PHYLIP parsing.
#[derive(Error, Debug)]
pub enum PhylipError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] io::Error),

    #[error("Empty PHYLIP file")]
    EmptyFile,

    #[error("Invalid header: expected 'ntax nchar' (two integers), got '{0}'")]
    InvalidHeader(String),

    #[error("Invalid header: {num_sequences} sequences of length {length} (both must be at least 1)")]
    InvalidDimensions { num_sequences: usize, length: usize },

    #[error("No sequence lines after the header")]
    NoSequenceLines,

    #[error("Block at lines {first_line}-{last_line} has {found} lines, expected one per sequence ({expected})")]
    BlockSizeMismatch {
        first_line: usize,
        last_line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Found {found} sequence lines, which is not a multiple of the {expected} sequences declared in the header")]
    LineCountNotMultiple { found: usize, expected: usize },

    #[error("Cannot tell strict from relaxed names for sequence {index}: \
             strict reading gives {strict}; relaxed reading gives {relaxed}; expected length {expected}")]
    UndecidedNaming {
        index: usize,
        strict: String,
        relaxed: String,
        expected: usize,
    },

    #[error("No taxon name found for sequence {index} at line {line}")]
    MissingTaxonName { index: usize, line: usize },

    #[error("Taxon name '{name}' (sequence {index}) contains illegal characters: {chars}")]
    IllegalTaxonName { index: usize, name: String, chars: String },

    #[error("Sequence {index} ('{name}') has length {found}, expected {expected}")]
    LengthMismatch {
        index: usize,
        name: String,
        found: usize,
        expected: usize,
    },

    #[error("Taxon name '{0}' is used more than once")]
    DuplicateTaxon(String),
}

impl PhylipError {
    /// Returns true if the error comes from the file content.
    pub fn is_user_fixable(&self) -> bool {
        !matches!(self, PhylipError::IoError(_))
    }
}

/// Result type for PHYLIP operations.
pub type PhylipResult<T> = Result<T, PhylipError>;

/// Layout hint from the header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutHint {
    Interleaved,
    Sequential,
}

/// The header line of a PHYLIP file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhylipHeader {
    pub num_sequences: usize,
    pub length: usize,
    pub hint: Option<LayoutHint>,
}

impl PhylipHeader {
    /// Parses a header line, returning `None` if it does not match
    /// `ntax nchar [i|s]`.
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADER.captures(line)?;
        let num_sequences = caps[1].parse().ok()?;
        let length = caps[2].parse().ok()?;
        let hint = caps.get(3).map(|m| match m.as_str() {
            "i" => LayoutHint::Interleaved,
            _ => LayoutHint::Sequential,
        });
        Some(Self {
            num_sequences,
            length,
            hint,
        })
    }
}

/// How the physical lines are assigned to sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Exactly one line per sequence
    OneLine,
    /// Consecutive lines per sequence
    Sequential { lines_per_taxon: usize },
    /// Blocks of one line per sequence
    Interleaved { blocks: usize },
}

impl Layout {
    /// Returns the number of physical lines making up one sequence.
    pub fn lines_per_taxon(&self) -> usize {
        match self {
            Layout::OneLine => 1,
            Layout::Sequential { lines_per_taxon } => *lines_per_taxon,
            Layout::Interleaved { blocks } => *blocks,
        }
    }

    pub fn is_interleaved(&self) -> bool {
        matches!(self, Layout::Interleaved { .. })
    }

    /// Returns the index of the `part`-th line of sequence `taxon` among the
    /// non-blank lines of the block.
    fn line_index(&self, num_sequences: usize, taxon: usize, part: usize) -> usize {
        match self {
            Layout::Interleaved { .. } => part * num_sequences + taxon,
            _ => taxon * self.lines_per_taxon() + part,
        }
    }
}

/// How taxon names are separated from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    Strict,
    Relaxed,
}

/// Layout and naming decided for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhylipDialect {
    pub layout: Layout,
    pub naming: Naming,
}

impl PhylipDialect {
    pub fn file_format(&self) -> FileFormat {
        match self.naming {
            Naming::Strict => FileFormat::PhylipStrict,
            Naming::Relaxed => FileFormat::PhylipRelaxed,
        }
    }
}

/// A line of the sequence block with its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NumberedLine {
    number: usize,
    text: String,
}

/// One way of reading a name and its data.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reading {
    name: String,
    code: String,
}

impl Reading {
    fn sites(&self) -> usize {
        self.code.chars().count()
    }
}

fn strip_whitespace(text: &str, into: &mut String) {
    into.extend(text.chars().filter(|c| !c.is_whitespace()));
}

/// Reads the name from the fixed-width name field of the first line.
fn read_strict(lines: &[&str]) -> Option<Reading> {
    let first: &str = lines.first()?;
    if first.chars().count() < STRICT_NAME_WIDTH {
        return None;
    }
    let split = first
        .char_indices()
        .nth(STRICT_NAME_WIDTH)
        .map_or(first.len(), |(i, _)| i);
    let name = first[..split].trim();
    if name.is_empty() {
        return None;
    }
    let mut code = String::new();
    strip_whitespace(&first[split..], &mut code);
    for line in &lines[1..] {
        strip_whitespace(line, &mut code);
    }
    Some(Reading {
        name: name.to_string(),
        code,
    })
}

/// Reads the name as the first whitespace-delimited token of the first line.
fn read_relaxed(lines: &[&str]) -> Option<Reading> {
    let first: &str = lines.first()?;
    let first = first.trim_start();
    let split = first.find(char::is_whitespace).unwrap_or(first.len());
    let name = &first[..split];
    if name.is_empty() {
        return None;
    }
    let mut code = String::new();
    strip_whitespace(&first[split..], &mut code);
    for line in &lines[1..] {
        strip_whitespace(line, &mut code);
    }
    Some(Reading {
        name: name.to_string(),
        code,
    })
}

fn describe_reading(reading: &Option<Reading>) -> String {
    match reading {
        Some(r) => format!("name '{}' with {} sites", r.name, r.sites()),
        None => "no name".to_string(),
    }
}

/// Splits the block into runs of non-blank lines.
fn blocks(lines: &[NumberedLine]) -> Vec<&[NumberedLine]> {
    let mut blocks = Vec::new();
    let mut start = None;
    for (i, line) in lines.iter().enumerate() {
        let blank = line.text.trim().is_empty();
        match (blank, start) {
            (false, None) => start = Some(i),
            (true, Some(s)) => {
                blocks.push(&lines[s..i]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        blocks.push(&lines[s..]);
    }
    blocks
}

/// Decides how lines map to sequences from the shape of the block.
fn analyze_layout(header: &PhylipHeader, blocks: &[&[NumberedLine]]) -> PhylipResult<Layout> {
    let n = header.num_sequences;

    if blocks.len() > 1 {
        for block in blocks {
            if block.len() != n {
                return Err(PhylipError::BlockSizeMismatch {
                    first_line: block[0].number,
                    last_line: block[block.len() - 1].number,
                    found: block.len(),
                    expected: n,
                });
            }
        }
        return Ok(Layout::Interleaved { blocks: blocks.len() });
    }

    let count = blocks.first().map_or(0, |b| b.len());
    if count == n {
        return Ok(Layout::OneLine);
    }
    if count % n != 0 {
        return Err(PhylipError::LineCountNotMultiple { found: count, expected: n });
    }
    let k = count / n;
    // Without blank separators, only the header can tell interleaved blocks apart.
    if header.hint == Some(LayoutHint::Interleaved) {
        Ok(Layout::Interleaved { blocks: k })
    } else {
        Ok(Layout::Sequential { lines_per_taxon: k })
    }
}

/// Decides strict versus relaxed names.
///
/// A sequence decides the question when exactly one reading has the declared
/// length. Sequences where both readings agree are skipped; if every sequence
/// reads the same both ways, the names are relaxed.
fn analyze_naming(header: &PhylipHeader, taxa: &[Vec<&str>]) -> PhylipResult<Naming> {
    for (i, lines) in taxa.iter().enumerate() {
        let strict = read_strict(lines);
        let relaxed = read_relaxed(lines);
        let fits = |r: &Option<Reading>| r.as_ref().is_some_and(|r| r.sites() == header.length);

        match (fits(&strict), fits(&relaxed)) {
            (true, false) => return Ok(Naming::Strict),
            (false, true) => return Ok(Naming::Relaxed),
            (true, true) if strict == relaxed => continue,
            _ => {
                return Err(PhylipError::UndecidedNaming {
                    index: i + 1,
                    strict: describe_reading(&strict),
                    relaxed: describe_reading(&relaxed),
                    expected: header.length,
                })
            }
        }
    }
    Ok(Naming::Relaxed)
}

/// Groups the non-blank lines by sequence according to the layout.
fn taxon_lines<'a>(layout: Layout, num_sequences: usize, lines: &[&'a NumberedLine]) -> Vec<Vec<&'a NumberedLine>> {
    (0..num_sequences)
        .map(|taxon| {
            (0..layout.lines_per_taxon())
                .map(|part| lines[layout.line_index(num_sequences, taxon, part)])
                .collect()
        })
        .collect()
}

/// Analyzes the sequence block and returns the dialect it is written in.
///
/// This is a pure function of the header and the lines; nothing is extracted.
fn analyze(header: &PhylipHeader, block: &[NumberedLine]) -> PhylipResult<PhylipDialect> {
    let blocks = blocks(block);
    let layout = analyze_layout(header, &blocks)?;
    let flat: Vec<&NumberedLine> = blocks.iter().flat_map(|b| b.iter()).collect();
    let taxa: Vec<Vec<&str>> = taxon_lines(layout, header.num_sequences, &flat)
        .into_iter()
        .map(|lines| lines.into_iter().map(|l| l.text.as_str()).collect())
        .collect();
    let naming = analyze_naming(header, &taxa)?;
    Ok(PhylipDialect { layout, naming })
}

/// Extracts every sequence using an already decided dialect.
fn extract(header: &PhylipHeader, dialect: PhylipDialect, block: &[NumberedLine]) -> PhylipResult<Vec<Sequence>> {
    let blocks = blocks(block);
    let flat: Vec<&NumberedLine> = blocks.iter().flat_map(|b| b.iter()).collect();
    let mut sequences = Vec::new();

    for (i, lines) in taxon_lines(dialect.layout, header.num_sequences, &flat).into_iter().enumerate() {
        let index = i + 1;
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        let reading = match dialect.naming {
            Naming::Strict => read_strict(&texts),
            Naming::Relaxed => read_relaxed(&texts),
        }
        .ok_or(PhylipError::MissingTaxonName {
            index,
            line: lines[0].number,
        })?;

        let illegal = illegal_taxon_chars(&reading.name);
        if !illegal.is_empty() {
            return Err(PhylipError::IllegalTaxonName {
                index,
                name: reading.name,
                chars: describe_chars(&illegal),
            });
        }

        let found = reading.sites();
        if found != header.length {
            return Err(PhylipError::LengthMismatch {
                index,
                name: reading.name,
                found,
                expected: header.length,
            });
        }

        sequences.push(Sequence::new(reading.name, reading.code));
    }

    if let Some(taxon) = find_duplicate_taxon(&sequences) {
        return Err(PhylipError::DuplicateTaxon(taxon.to_string()));
    }
    Ok(sequences)
}

/// Parses PHYLIP content from a stream of lines.
pub fn parse_phylip_lines<I>(lines: I) -> PhylipResult<Alignment>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut lines = lines.into_iter().enumerate();

    // The header is the first non-empty line
    let header_line = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(PhylipError::EmptyFile),
        }
    };
    let header =
        PhylipHeader::parse(&header_line).ok_or_else(|| PhylipError::InvalidHeader(header_line.trim().to_string()))?;
    if header.num_sequences == 0 || header.length == 0 {
        return Err(PhylipError::InvalidDimensions {
            num_sequences: header.num_sequences,
            length: header.length,
        });
    }

    // Sized by the content; the header count is unchecked here
    let mut block = Vec::new();
    for (idx, line) in lines {
        block.push(NumberedLine {
            number: idx + 1,
            text: line?,
        });
    }

    // Trim blank lines around the block
    let first = block.iter().position(|l| !l.text.trim().is_empty());
    let last = block.iter().rposition(|l| !l.text.trim().is_empty());
    let block = match (first, last) {
        (Some(first), Some(last)) => &block[first..=last],
        _ => return Err(PhylipError::NoSequenceLines),
    };

    let dialect = analyze(&header, block)?;
    debug!(?dialect, sequences = header.num_sequences, length = header.length, "decided PHYLIP dialect");

    let sequences = extract(&header, dialect, block)?;
    Ok(Alignment::new(
        sequences,
        dialect.file_format(),
        dialect.layout.is_interleaved(),
    ))
}

/// Parses PHYLIP content from a reader.
pub fn parse_phylip<R: BufRead>(reader: R) -> PhylipResult<Alignment> {
    parse_phylip_lines(reader.lines())
}

/// Parses PHYLIP content from a string.
pub fn parse_phylip_str(content: &str) -> PhylipResult<Alignment> {
    parse_phylip(content.as_bytes())
}

/// Options for writing PHYLIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhylipWriteOptions {
    pub naming: Naming,
    pub interleaved: bool,
    /// Sites per block for interleaved output
    pub block_width: usize,
}

impl Default for PhylipWriteOptions {
    fn default() -> Self {
        Self {
            naming: Naming::Relaxed,
            interleaved: false,
            block_width: DEFAULT_BLOCK_WIDTH,
        }
    }
}

/// Writes an alignment as PHYLIP.
///
/// Strict output fails with `InvalidInput` if a taxon name is longer than
/// the 10-character name field.
pub fn write_phylip<W: Write>(writer: &mut W, alignment: &Alignment, options: PhylipWriteOptions) -> io::Result<()> {
    let name_width = match options.naming {
        Naming::Strict => {
            if let Some(seq) = alignment
                .sequences
                .iter()
                .find(|s| s.taxon.chars().count() > STRICT_NAME_WIDTH)
            {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("taxon name '{}' does not fit the strict PHYLIP name field", seq.taxon),
                ));
            }
            STRICT_NAME_WIDTH
        }
        Naming::Relaxed => alignment.max_taxon_length() + 1,
    };

    writeln!(writer, "{} {}", alignment.num_sequences(), alignment.length())?;

    let codes: Vec<Vec<char>> = alignment.sequences.iter().map(|s| s.code.chars().collect()).collect();
    let width = if options.interleaved && options.block_width > 0 {
        options.block_width
    } else {
        alignment.length().max(1)
    };

    for (block, start) in (0..alignment.length()).step_by(width).enumerate() {
        if block > 0 {
            writeln!(writer)?;
        }
        let end = (start + width).min(alignment.length());
        for (seq, code) in alignment.sequences.iter().zip(&codes) {
            let chunk: String = code[start..end].iter().collect();
            if block == 0 {
                writeln!(writer, "{:<name_width$}{}", seq.taxon, chunk)?;
            } else {
                writeln!(writer, "{}", chunk)?;
            }
        }
    }
    Ok(())
}
