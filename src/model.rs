//! Data model for parsed alignments.
//!
//! This module contains the records produced by the parsing pipeline:
//! - Sequences (one taxon and its characters)
//! - Alignments (the ordered sequences of one source file)
//!
//! An `Alignment` is built by one of the parsers in [`crate::formats`] and
//! typed once by [`crate::datatype::classify`]. After that it is treated as
//! read-only by the rest of the crate.

use crate::datatype::DataType;
use crate::formats::FileFormat;

/// Characters that may not appear in a taxon name, besides whitespace and
/// control characters.
pub const ILLEGAL_TAXON_CHARS: &[char] = &[':', ',', '.', '(', ')', '[', ']', ';', '\''];

/// Represents a single sequence with its taxon name and character data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The taxon name
    pub taxon: String,
    /// The raw characters, case preserved
    pub code: String,
    /// Per-sequence type, set by the classifier
    pub data_type: DataType,
}

impl Sequence {
    /// Creates a new, not yet classified, sequence.
    pub fn new(taxon: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            taxon: taxon.into(),
            code: code.into(),
            data_type: DataType::Unknown,
        }
    }

    /// Returns the number of sites in the sequence.
    pub fn len(&self) -> usize {
        self.code.chars().count()
    }

    /// Returns true if the sequence has no sites.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Returns true if every site holds the same character.
    pub fn is_invariant(&self) -> bool {
        let mut chars = self.code.chars().map(|c| c.to_ascii_uppercase());
        match chars.next() {
            Some(first) => chars.all(|c| c == first),
            None => false,
        }
    }
}

/// Represents the alignment read from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// All sequences in file order
    pub sequences: Vec<Sequence>,
    /// Number of sites shared by every sequence
    length: usize,
    /// The dialect the file was written in
    pub file_format: FileFormat,
    /// Whether the sequence block was interleaved
    pub interleaved: bool,
    /// Alignment-level type, `Unknown` until classified
    pub data_type: DataType,
    /// Whether at least one sequence has all sites identical
    pub has_invariant_sequences: bool,
}

impl Alignment {
    /// Creates a new, not yet classified, alignment.
    ///
    /// The parsers check that every sequence has the same length before
    /// calling this; the length is taken from the first sequence.
    pub fn new(sequences: Vec<Sequence>, file_format: FileFormat, interleaved: bool) -> Self {
        let length = sequences.first().map(Sequence::len).unwrap_or(0);
        Self {
            sequences,
            length,
            file_format,
            interleaved,
            data_type: DataType::Unknown,
            has_invariant_sequences: false,
        }
    }

    /// Returns the number of sequences.
    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the number of sites (columns).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the longest taxon name, in characters.
    pub fn max_taxon_length(&self) -> usize {
        self.sequences
            .iter()
            .map(|s| s.taxon.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Gets a sequence by index.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    /// Returns true if the alignment has no sequences.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Returns true once the classifier has assigned a usable type.
    pub fn is_typed(&self) -> bool {
        !matches!(self.data_type, DataType::Unknown | DataType::Invalid)
    }
}

/// Returns the distinct characters of `name` that are not allowed in a taxon
/// name, in order of first appearance.
pub fn illegal_taxon_chars(name: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in name.chars() {
        let illegal = c.is_whitespace() || c.is_control() || ILLEGAL_TAXON_CHARS.contains(&c);
        if illegal && !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

/// Formats a list of characters for an error message, escaping the invisible
/// ones.
pub fn describe_chars(chars: &[char]) -> String {
    chars
        .iter()
        .map(|c| match c {
            '\t' => "'\\t'".to_string(),
            '\r' => "'\\r'".to_string(),
            ' ' => "' ' (space)".to_string(),
            c if c.is_control() => format!("U+{:04X}", *c as u32),
            c => format!("'{}'", c),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns the first taxon name that occurs more than once.
pub fn find_duplicate_taxon(sequences: &[Sequence]) -> Option<&str> {
    let mut seen = std::collections::HashSet::with_capacity(sequences.len());
    sequences
        .iter()
        .map(|s| s.taxon.as_str())
        .find(|taxon| !seen.insert(*taxon))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_creation() {
        let seq = Sequence::new("seq1", "ACGT");
        assert_eq!(seq.taxon, "seq1");
        assert_eq!(seq.code, "ACGT");
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.data_type, DataType::Unknown);
    }

    #[test]
    fn test_sequence_invariant() {
        assert!(Sequence::new("a", "AAAA").is_invariant());
        assert!(Sequence::new("a", "aAaA").is_invariant());
        assert!(!Sequence::new("a", "AAAT").is_invariant());
        assert!(!Sequence::new("a", "").is_invariant());
    }

    #[test]
    fn test_alignment_length() {
        let seqs = vec![Sequence::new("seq1", "ACGT"), Sequence::new("seq2", "TGCA")];
        let alignment = Alignment::new(seqs, FileFormat::Fasta, false);
        assert_eq!(alignment.num_sequences(), 2);
        assert_eq!(alignment.length(), 4);
        assert_eq!(alignment.max_taxon_length(), 4);
        assert!(!alignment.is_typed());
    }

    #[test]
    fn test_illegal_taxon_chars() {
        assert!(illegal_taxon_chars("Homo_sapiens").is_empty());
        assert_eq!(illegal_taxon_chars("bad:name"), vec![':']);
        assert_eq!(illegal_taxon_chars("a b\tc::"), vec![' ', '\t', ':']);
        assert_eq!(illegal_taxon_chars("x(1);'"), vec!['(', ')', ';', '\'']);
    }

    #[test]
    fn test_describe_chars() {
        assert_eq!(describe_chars(&[':', '\t']), "':', '\\t'");
    }

    #[test]
    fn test_find_duplicate_taxon() {
        let seqs = vec![
            Sequence::new("a", "A"),
            Sequence::new("b", "A"),
            Sequence::new("a", "A"),
        ];
        assert_eq!(find_duplicate_taxon(&seqs), Some("a"));
        assert_eq!(find_duplicate_taxon(&seqs[..2]), None);
    }
}
