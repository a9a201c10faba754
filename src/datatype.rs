//! Molecular data type classification.
//!
//! Each sequence is classified on its own from the characters it contains.
//! The per-sequence types are then reconciled into one alignment type with
//! [`DataType::join`], and every sequence is checked against the alphabet of
//! that type.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::model::Alignment;

/// Number of characters shown on each side of an illegal character.
const EXCERPT_RADIUS: usize = 10;

static PROTEIN_SPECIFIC: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)[EFIJLOPQZX*]"));
static NUCLEOTIDE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)[ACG]"));
static BINARY: LazyLock<Regex> = LazyLock::new(|| pattern(r"[01]"));
static MULTISTATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"[2-9]"));

static ILLEGAL_BINARY: LazyLock<Regex> = LazyLock::new(|| pattern(r"[^01?\-]"));
static ILLEGAL_NUCLEOTIDE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)[^ABCDGHKMRSTUVWYNOX?\-]"));
static ILLEGAL_PROTEIN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)[^ARNDCQEGHILKMFPSTWYVBZX*?\-]"));
static ILLEGAL_MULTISTATE: LazyLock<Regex> = LazyLock::new(|| pattern(r"[^0-9A-Za-z?\-]"));

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("valid character class")
}

/// Type of the characters in a sequence or an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    Dna,
    Rna,
    Protein,
    Binary,
    Multistate,
    /// A concrete type mixed with binary or multistate characters
    Mixed,
    /// Only gaps, missing data or ambiguity codes
    #[default]
    Unknown,
    /// The result of joining incompatible types
    Invalid,
}

impl DataType {
    /// Lower-case name as shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Dna => "dna",
            DataType::Rna => "rna",
            DataType::Protein => "protein",
            DataType::Binary => "binary",
            DataType::Multistate => "multistate",
            DataType::Mixed => "mixed",
            DataType::Unknown => "unknown",
            DataType::Invalid => "invalid",
        }
    }

    pub fn is_nucleotide(&self) -> bool {
        matches!(self, DataType::Dna | DataType::Rna)
    }

    /// Least upper bound of two types.
    ///
    /// `Unknown` is the identity, binary characters are a subset of the
    /// multistate alphabet and DNA and RNA are both nucleotide. Any other pair
    /// of distinct types joins to `Invalid`.
    pub fn join(self, other: DataType) -> DataType {
        use DataType::*;
        match (self, other) {
            (Invalid, _) | (_, Invalid) => Invalid,
            (Unknown, t) | (t, Unknown) => t,
            (a, b) if a == b => a,
            (Binary, Multistate) | (Multistate, Binary) => Multistate,
            (Dna, Rna) | (Rna, Dna) => Dna,
            _ => Invalid,
        }
    }

    /// Pattern matching any character outside the legal alphabet.
    fn illegal_characters(&self) -> Option<&'static Regex> {
        match self {
            DataType::Binary => Some(&*ILLEGAL_BINARY),
            DataType::Dna | DataType::Rna => Some(&*ILLEGAL_NUCLEOTIDE),
            DataType::Protein => Some(&*ILLEGAL_PROTEIN),
            DataType::Multistate | DataType::Mixed => Some(&*ILLEGAL_MULTISTATE),
            DataType::Unknown | DataType::Invalid => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors that can occur while typing an alignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataTypeError {
    #[error("Cannot determine data type because all {count} sequences are of type unknown")]
    AllUnknown { count: usize },

    #[error("Sequences of incompatible data types in one alignment: {types}")]
    IncompatibleTypes { types: String },

    #[error("Illegal character '{character}' for data type {data_type} at site {site} \
             of sequence {index} ('{taxon}'): {excerpt}")]
    InvalidCharacter {
        character: char,
        data_type: DataType,
        site: usize,
        index: usize,
        taxon: String,
        excerpt: String,
    },
}

impl DataTypeError {
    pub fn is_user_fixable(&self) -> bool {
        true
    }
}

/// Classifies a single sequence from its characters.
pub fn classify_sequence(code: &str) -> DataType {
    let concrete = if PROTEIN_SPECIFIC.is_match(code) {
        Some(DataType::Protein)
    } else if NUCLEOTIDE.is_match(code) {
        let (t, u) = code.chars().fold((0usize, 0usize), |(t, u), c| match c {
            'T' | 't' => (t + 1, u),
            'U' | 'u' => (t, u + 1),
            _ => (t, u),
        });
        Some(if u > t { DataType::Rna } else { DataType::Dna })
    } else {
        None
    };

    let multistate = MULTISTATE.is_match(code);
    let binary = BINARY.is_match(code);

    match concrete {
        Some(_) if multistate || binary => DataType::Mixed,
        Some(data_type) => data_type,
        None if multistate => DataType::Multistate,
        None if binary => DataType::Binary,
        None => DataType::Unknown,
    }
}

/// Returns the 0-based index of the first character of `code` that is not
/// legal for `data_type`.
///
/// `Unknown` and `Invalid` have no alphabet and always return `None`.
pub fn find_invalid_character(code: &str, data_type: DataType) -> Option<usize> {
    let m = data_type.illegal_characters()?.find(code)?;
    Some(code[..m.start()].chars().count())
}

/// Returns the characters around `pos` with the character at `pos` bracketed.
fn excerpt(code: &str, pos: usize) -> String {
    let chars: Vec<char> = code.chars().collect();
    let start = pos.saturating_sub(EXCERPT_RADIUS);
    let end = (pos + 1 + EXCERPT_RADIUS).min(chars.len());
    let before: String = chars[start..pos].iter().collect();
    let after: String = chars[pos + 1..end].iter().collect();
    format!(
        "{}{}[{}]{}{}",
        if start > 0 { "..." } else { "" },
        before,
        chars[pos],
        after,
        if end < chars.len() { "..." } else { "" }
    )
}

/// Classifies every sequence and assigns the alignment type.
///
/// On error the alignment type is left untouched, so a failed alignment never
/// looks typed.
pub fn classify(alignment: &mut Alignment) -> Result<DataType, DataTypeError> {
    for seq in alignment.sequences.iter_mut() {
        seq.data_type = classify_sequence(&seq.code);
    }

    let joined = alignment
        .sequences
        .iter()
        .fold(DataType::Unknown, |acc, seq| acc.join(seq.data_type));
    debug!(data_type = %joined, sequences = alignment.num_sequences(), "joined sequence types");

    match joined {
        DataType::Unknown => {
            return Err(DataTypeError::AllUnknown {
                count: alignment.num_sequences(),
            })
        }
        DataType::Invalid => {
            let mut distinct: Vec<DataType> = Vec::new();
            for seq in &alignment.sequences {
                if seq.data_type != DataType::Unknown && !distinct.contains(&seq.data_type) {
                    distinct.push(seq.data_type);
                }
            }
            let types = distinct.iter().map(DataType::name).collect::<Vec<_>>().join(", ");
            return Err(DataTypeError::IncompatibleTypes { types });
        }
        _ => {}
    }

    for (i, seq) in alignment.sequences.iter().enumerate() {
        if let Some(pos) = find_invalid_character(&seq.code, joined) {
            let character = seq.code.chars().nth(pos).unwrap_or_default();
            return Err(DataTypeError::InvalidCharacter {
                character,
                data_type: joined,
                site: pos + 1,
                index: i + 1,
                taxon: seq.taxon.clone(),
                excerpt: excerpt(&seq.code, pos),
            });
        }
    }

    alignment.data_type = joined;
    alignment.has_invariant_sequences = alignment.sequences.iter().any(|s| s.is_invariant());
    Ok(joined)
}
