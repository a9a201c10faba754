//! Partition model.
//!
//! A partition splits the columns of an alignment into contiguous, named
//! parts, each with its own data type or substitution matrix and an optional
//! codon-position split. It renders to the partition file read by RAxML:
//!
//! ```text
//! DNA,      gene1 = 1-300
//! DNA,      gene2_codon1 = 301-600\3
//! DNA,      gene2_codon2 = 302-600\3
//! DNA,      gene2_codon3 = 303-600\3
//! ```
//!
//! Until the first part is added, a default part covers the whole
//! alignment. Parts are added from an editor ("the part to add") whose start
//! always follows the previous part, so parts never overlap or leave gaps.

use std::fmt;

use thiserror::Error;

use crate::datatype::DataType;
use crate::field::{Bounds, Choices, Domain, ValidatedField};
use crate::model::Alignment;

/// Width of the `TYPE,` column in rendered lines.
pub const TYPE_COLUMN_WIDTH: usize = 10;

/// Name of the default part and of the first part to add.
pub const DEFAULT_PART_NAME: &str = "part1";

/// Characters not allowed in a part name.
const ILLEGAL_PART_NAME_CHARS: &[char] = &[',', '=', '\\'];

/// Protein substitution matrices understood by RAxML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProteinModel {
    Dayhoff,
    DcMut,
    Jtt,
    MtRev,
    Wag,
    RtRev,
    CpRev,
    Vt,
    Blosum62,
    MtMam,
    Lg,
    MtArt,
    MtZoa,
    Pmb,
    HivB,
    HivW,
    JttDcMut,
    Flu,
    StmtRev,
    Gtr,
    Auto,
}

impl ProteinModel {
    pub const ALL: [ProteinModel; 21] = [
        ProteinModel::Wag,
        ProteinModel::Lg,
        ProteinModel::Jtt,
        ProteinModel::Dayhoff,
        ProteinModel::DcMut,
        ProteinModel::MtRev,
        ProteinModel::RtRev,
        ProteinModel::CpRev,
        ProteinModel::Vt,
        ProteinModel::Blosum62,
        ProteinModel::MtMam,
        ProteinModel::MtArt,
        ProteinModel::MtZoa,
        ProteinModel::Pmb,
        ProteinModel::HivB,
        ProteinModel::HivW,
        ProteinModel::JttDcMut,
        ProteinModel::Flu,
        ProteinModel::StmtRev,
        ProteinModel::Gtr,
        ProteinModel::Auto,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProteinModel::Dayhoff => "DAYHOFF",
            ProteinModel::DcMut => "DCMUT",
            ProteinModel::Jtt => "JTT",
            ProteinModel::MtRev => "MTREV",
            ProteinModel::Wag => "WAG",
            ProteinModel::RtRev => "RTREV",
            ProteinModel::CpRev => "CPREV",
            ProteinModel::Vt => "VT",
            ProteinModel::Blosum62 => "BLOSUM62",
            ProteinModel::MtMam => "MTMAM",
            ProteinModel::Lg => "LG",
            ProteinModel::MtArt => "MTART",
            ProteinModel::MtZoa => "MTZOA",
            ProteinModel::Pmb => "PMB",
            ProteinModel::HivB => "HIVB",
            ProteinModel::HivW => "HIVW",
            ProteinModel::JttDcMut => "JTTDCMUT",
            ProteinModel::Flu => "FLU",
            ProteinModel::StmtRev => "STMTREV",
            ProteinModel::Gtr => "GTR",
            ProteinModel::Auto => "AUTO",
        }
    }
}

/// Data sub-type or substitution matrix of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    Dna,
    Binary,
    Multistate,
    Protein(ProteinModel),
}

impl PartType {
    /// Label written in the type column.
    pub fn label(&self) -> &'static str {
        match self {
            PartType::Dna => "DNA",
            PartType::Binary => "BIN",
            PartType::Multistate => "MULTI",
            PartType::Protein(model) => model.label(),
        }
    }

    /// Looks a part type up by its label, ignoring case.
    pub fn from_label(label: &str) -> Option<PartType> {
        let label = label.trim().to_ascii_uppercase();
        match label.as_str() {
            "DNA" => Some(PartType::Dna),
            "BIN" => Some(PartType::Binary),
            "MULTI" => Some(PartType::Multistate),
            _ => ProteinModel::ALL
                .iter()
                .find(|m| m.label() == label)
                .map(|m| PartType::Protein(*m)),
        }
    }

    /// Types a part of an alignment of `data_type` may have; the first one
    /// is the default.
    pub fn options_for(data_type: DataType) -> Vec<PartType> {
        let proteins = ProteinModel::ALL.iter().map(|m| PartType::Protein(*m));
        match data_type {
            DataType::Dna | DataType::Rna => vec![PartType::Dna],
            DataType::Protein => proteins.collect(),
            DataType::Binary => vec![PartType::Binary],
            DataType::Multistate => vec![PartType::Multistate],
            DataType::Mixed | DataType::Unknown | DataType::Invalid => {
                let mut all = vec![PartType::Multistate, PartType::Binary, PartType::Dna];
                all.extend(proteins);
                all
            }
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How the columns of a part are split by codon position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodonMode {
    /// One range for the whole part
    #[default]
    None,
    /// One sub-part per codon position
    CodonSpecific,
    /// First and second positions together, third position alone
    ThirdCodon,
}

impl CodonMode {
    /// Extra columns needed beyond `start` for the split to make sense.
    fn min_span(&self) -> usize {
        match self {
            CodonMode::None => 0,
            CodonMode::CodonSpecific | CodonMode::ThirdCodon => 2,
        }
    }
}

/// A contiguous, named range of alignment columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub part_type: PartType,
    pub name: String,
    /// First column, 1-based, inclusive
    pub start: usize,
    /// Last column, 1-based, inclusive
    pub end: usize,
    pub codon_mode: CodonMode,
}

fn type_column(part_type: PartType) -> String {
    let column = format!("{},", part_type.label());
    let width = TYPE_COLUMN_WIDTH.max(column.len() + 1);
    format!("{:<width$}", column)
}

impl Part {
    /// Number of columns covered.
    pub fn len(&self) -> usize {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Renders the partition file lines for this part, with ranges shifted by
    /// `offset` and names prefixed by `prefix`.
    pub fn lines(&self, offset: usize, prefix: &str) -> Vec<String> {
        let head = format!("{}{}{}", type_column(self.part_type), prefix, self.name);
        let start = self.start + offset;
        let end = self.end + offset;
        match self.codon_mode {
            CodonMode::None => vec![format!("{head} = {start}-{end}")],
            CodonMode::CodonSpecific => (1..=3)
                .map(|position| format!("{head}_codon{position} = {}-{end}\\3", start + position - 1))
                .collect(),
            CodonMode::ThirdCodon => vec![
                format!("{head}_codon1and2 = {start}-{end}\\3, {}-{end}\\3", start + 1),
                format!("{head}_codon3 = {}-{end}\\3", start + 2),
            ],
        }
    }

    /// Renders the part without offset or prefix.
    pub fn text(&self) -> String {
        self.lines(0, "").join("\n")
    }
}

/// Legal part names: non-empty, without whitespace or partition file syntax,
/// and not used by another part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartName {
    taken: Vec<String>,
}

impl Domain<String> for PartName {
    fn check(&self, value: &String) -> Result<(), String> {
        if value.is_empty() {
            return Err("must not be empty".to_string());
        }
        if value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || ILLEGAL_PART_NAME_CHARS.contains(&c))
        {
            return Err("must not contain whitespace, ',', '=' or '\\'".to_string());
        }
        if self.taken.contains(value) {
            return Err(format!("'{}' is already used by another part", value));
        }
        Ok(())
    }
}

/// Returns `name` with its trailing number incremented, keeping any zero
/// padding, or with `_1` appended if it does not end in a number.
pub fn next_part_name(name: &str) -> String {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[stem.len()..];
    match digits.parse::<u64>() {
        Ok(n) if n < u64::MAX => format!("{stem}{:0width$}", n + 1, width = digits.len()),
        _ => format!("{name}_1"),
    }
}

/// Fields of the next part to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartEditor {
    part_type: ValidatedField<PartType, Choices<PartType>>,
    name: ValidatedField<String, PartName>,
    start: usize,
    end: ValidatedField<usize, Bounds>,
    codon_mode: CodonMode,
}

impl PartEditor {
    fn new(length: usize, data_type: DataType) -> Self {
        let options = PartType::options_for(data_type);
        let default_type = options[0];
        Self {
            part_type: ValidatedField::new("type", default_type, Choices(options)),
            name: ValidatedField::new("name", DEFAULT_PART_NAME.to_string(), PartName::default()),
            start: 1,
            end: ValidatedField::new("end", 1, Bounds::new(1, length)),
            codon_mode: CodonMode::None,
        }
    }

    pub fn part_type(&self) -> PartType {
        *self.part_type.value()
    }

    /// Types offered for this alignment.
    pub fn type_options(&self) -> &[PartType] {
        &self.part_type.domain().0
    }

    pub fn name(&self) -> &str {
        self.name.value()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        *self.end.value()
    }

    pub fn codon_mode(&self) -> CodonMode {
        self.codon_mode
    }

    /// Current legal range for `end`.
    pub fn end_bounds(&self) -> Bounds {
        *self.end.domain()
    }

    pub fn set_part_type(&mut self, part_type: PartType) {
        self.part_type.set(part_type);
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name.set(name.into());
    }

    pub fn set_end(&mut self, end: usize) {
        self.end.set(end);
    }

    pub fn set_codon_mode(&mut self, codon_mode: CodonMode) {
        self.codon_mode = codon_mode;
        self.refresh_bounds();
    }

    fn refresh_bounds(&mut self) {
        let max = self.end.domain().max;
        let min = self.start + self.codon_mode.min_span();
        self.end.set_domain(Bounds::new(min, max));
    }

    /// Field-level messages for every invalid field.
    pub fn errors(&self) -> Vec<String> {
        [self.part_type.error(), self.name.error(), self.end.error()]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.part_type.is_valid() && self.name.is_valid() && self.end.is_valid()
    }

    fn to_part(&self) -> Part {
        Part {
            part_type: self.part_type(),
            name: self.name().to_string(),
            start: self.start,
            end: self.end(),
            codon_mode: self.codon_mode,
        }
    }
}

/// Editing state of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// No part added; the default part covers the alignment
    Default,
    /// Some parts added, not reaching the last column yet
    InProgress,
    /// Parts cover every column
    Complete,
}

/// Why an edit was not applied. The partition is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("The partition already covers all {length} sites")]
    Complete { length: usize },

    #[error("{0}")]
    InvalidField(String),
}

/// The parts of one alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    length: usize,
    data_type: DataType,
    parts: Vec<Part>,
    default_part: Part,
    part_to_add: PartEditor,
}

impl Partition {
    /// Creates a partition in the default state for an alignment of
    /// `length` columns.
    pub fn new(length: usize, data_type: DataType) -> Self {
        let part_to_add = PartEditor::new(length, data_type);
        let default_part = Part {
            part_type: part_to_add.part_type(),
            name: DEFAULT_PART_NAME.to_string(),
            start: 1,
            end: length,
            codon_mode: CodonMode::None,
        };
        Self {
            length,
            data_type,
            parts: Vec::new(),
            default_part,
            part_to_add,
        }
    }

    pub fn for_alignment(alignment: &Alignment) -> Self {
        Self::new(alignment.length(), alignment.data_type)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Parts added so far.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn default_part(&self) -> &Part {
        &self.default_part
    }

    /// The parts the partition renders: the added ones, or the default part
    /// if none has been added.
    pub fn effective_parts(&self) -> &[Part] {
        if self.parts.is_empty() {
            std::slice::from_ref(&self.default_part)
        } else {
            &self.parts
        }
    }

    pub fn part_to_add(&self) -> &PartEditor {
        &self.part_to_add
    }

    pub fn part_to_add_mut(&mut self) -> &mut PartEditor {
        &mut self.part_to_add
    }

    /// True when the last part ends at the last column.
    pub fn is_complete(&self) -> bool {
        self.effective_parts().last().is_some_and(|p| p.end == self.length)
    }

    pub fn state(&self) -> EditState {
        if self.parts.is_empty() {
            EditState::Default
        } else if self.is_complete() {
            EditState::Complete
        } else {
            EditState::InProgress
        }
    }

    /// Whether `add_part` would be accepted.
    pub fn can_add_part(&self) -> bool {
        self.state() != EditState::Complete && self.part_to_add.is_valid()
    }

    /// Appends the part to add and prepares the editor for the next one.
    pub fn add_part(&mut self) -> Result<&Part, EditError> {
        if self.state() == EditState::Complete {
            return Err(EditError::Complete { length: self.length });
        }
        let errors = self.part_to_add.errors();
        if !errors.is_empty() {
            return Err(EditError::InvalidField(errors.join("; ")));
        }

        let part = self.part_to_add.to_part();
        let last_end = part.end;
        let next_name = next_part_name(&part.name);
        self.parts.push(part);

        let editor = &mut self.part_to_add;
        editor.name.set_domain(PartName {
            taken: self.parts.iter().map(|p| p.name.clone()).collect(),
        });
        editor.codon_mode = CodonMode::None;
        if last_end < self.length {
            editor.start = last_end + 1;
            editor.end.set(last_end + 1);
            editor.name.set(next_name);
        }
        editor.refresh_bounds();

        Ok(&self.parts[self.parts.len() - 1])
    }

    /// Removes every added part and restores the editor.
    pub fn reset(&mut self) {
        self.parts.clear();
        self.part_to_add = PartEditor::new(self.length, self.data_type);
    }

    /// Changes the type of the default part.
    pub fn set_default_part_type(&mut self, part_type: PartType) -> Result<(), EditError> {
        let options = Choices(PartType::options_for(self.data_type));
        options
            .check(&part_type)
            .map_err(|reason| EditError::InvalidField(format!("type {}", reason)))?;
        self.default_part.part_type = part_type;
        Ok(())
    }

    /// Changes the codon split of the default part.
    pub fn set_default_codon_mode(&mut self, codon_mode: CodonMode) -> Result<(), EditError> {
        let min = 1 + codon_mode.min_span();
        Bounds::new(min, self.length)
            .check(&self.length)
            .map_err(|reason| EditError::InvalidField(format!("end {}", reason)))?;
        self.default_part.codon_mode = codon_mode;
        Ok(())
    }

    /// Renders the partition file lines, shifted by `offset` columns and
    /// with names prefixed by `prefix`.
    pub fn lines(&self, offset: usize, prefix: &str) -> Vec<String> {
        self.effective_parts()
            .iter()
            .flat_map(|part| part.lines(offset, prefix))
            .collect()
    }

    /// Renders the partition file text.
    pub fn text(&self) -> String {
        self.lines(0, "").join("\n")
    }
}

/// Partition of several alignments concatenated in order.
#[derive(Debug, Clone)]
pub struct FinalPartition<'a> {
    partitions: Vec<&'a Partition>,
}

impl<'a> FinalPartition<'a> {
    pub fn new<I>(partitions: I) -> Self
    where
        I: IntoIterator<Item = &'a Partition>,
    {
        Self {
            partitions: partitions.into_iter().collect(),
        }
    }

    /// Column offset of each alignment in the concatenation.
    pub fn offsets(&self) -> Vec<usize> {
        self.partitions
            .iter()
            .scan(0, |offset, partition| {
                let current = *offset;
                *offset += partition.length();
                Some(current)
            })
            .collect()
    }

    pub fn total_length(&self) -> usize {
        self.partitions.iter().map(|p| p.length()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.partitions.iter().all(|p| p.is_complete())
    }

    /// Renders the concatenated partition file text.
    ///
    /// Names are prefixed with `aln<n>_` only when there is more than one
    /// alignment, so a single alignment renders exactly as its own partition.
    pub fn text(&self) -> String {
        let prefixed = self.partitions.len() > 1;
        self.partitions
            .iter()
            .zip(self.offsets())
            .enumerate()
            .flat_map(|(i, (partition, offset))| {
                let prefix = if prefixed { format!("aln{}_", i + 1) } else { String::new() };
                partition.lines(offset, &prefix)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(partition: &mut Partition, name: &str, end: usize, codon_mode: CodonMode) -> Result<Part, EditError> {
        let editor = partition.part_to_add_mut();
        editor.set_name(name);
        editor.set_codon_mode(codon_mode);
        editor.set_end(end);
        partition.add_part().cloned()
    }

    #[test]
    fn test_default_partition() {
        let partition = Partition::new(120, DataType::Dna);
        assert_eq!(partition.state(), EditState::Default);
        assert!(partition.is_complete());
        assert!(partition.can_add_part());
        assert_eq!(partition.text(), "DNA,      part1 = 1-120");
    }

    #[test]
    fn test_default_type_follows_data_type() {
        assert_eq!(Partition::new(5, DataType::Protein).default_part().part_type.label(), "WAG");
        assert_eq!(Partition::new(5, DataType::Binary).default_part().part_type, PartType::Binary);
        assert_eq!(
            Partition::new(5, DataType::Multistate).default_part().part_type,
            PartType::Multistate
        );
        assert_eq!(Partition::new(5, DataType::Rna).default_part().part_type, PartType::Dna);
    }

    #[test]
    fn test_part_lines() {
        let part = Part {
            part_type: PartType::Dna,
            name: "gene".to_string(),
            start: 10,
            end: 99,
            codon_mode: CodonMode::None,
        };
        assert_eq!(part.len(), 90);
        assert_eq!(part.text(), "DNA,      gene = 10-99");
        assert_eq!(part.lines(100, "aln2_"), vec!["DNA,      aln2_gene = 110-199"]);

        let codon = Part {
            codon_mode: CodonMode::CodonSpecific,
            ..part.clone()
        };
        assert_eq!(
            codon.text(),
            "DNA,      gene_codon1 = 10-99\\3\n\
             DNA,      gene_codon2 = 11-99\\3\n\
             DNA,      gene_codon3 = 12-99\\3"
        );

        let third = Part {
            codon_mode: CodonMode::ThirdCodon,
            ..part
        };
        assert_eq!(
            third.lines(0, ""),
            vec![
                "DNA,      gene_codon1and2 = 10-99\\3, 11-99\\3",
                "DNA,      gene_codon3 = 12-99\\3",
            ]
        );
    }

    #[test]
    fn test_reversed_part_is_empty() {
        let part = Part {
            part_type: PartType::Dna,
            name: "backwards".to_string(),
            start: 8,
            end: 3,
            codon_mode: CodonMode::None,
        };
        assert!(part.is_empty());
        assert_eq!(part.len(), 0);

        let single = Part { start: 3, ..part };
        assert!(!single.is_empty());
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_long_type_label_keeps_a_space() {
        let part = Part {
            part_type: PartType::Protein(ProteinModel::JttDcMut),
            name: "p".to_string(),
            start: 1,
            end: 3,
            codon_mode: CodonMode::None,
        };
        assert_eq!(part.text(), "JTTDCMUT, p = 1-3");
    }

    #[test]
    fn test_next_part_name() {
        assert_eq!(next_part_name("part1"), "part2");
        assert_eq!(next_part_name("gene9"), "gene10");
        assert_eq!(next_part_name("gene09"), "gene10");
        assert_eq!(next_part_name("gene"), "gene_1");
        assert_eq!(next_part_name("7"), "8");
    }

    #[test]
    fn test_add_parts_until_complete() {
        let mut partition = Partition::new(10, DataType::Dna);

        let first = add(&mut partition, "gene1", 4, CodonMode::None).unwrap();
        assert_eq!((first.start, first.end), (1, 4));
        assert_eq!(partition.state(), EditState::InProgress);
        assert!(!partition.is_complete());

        let editor = partition.part_to_add();
        assert_eq!(editor.start(), 5);
        assert_eq!(editor.end(), 5);
        assert_eq!(editor.name(), "gene2");
        assert_eq!(editor.codon_mode(), CodonMode::None);

        partition.part_to_add_mut().set_codon_mode(CodonMode::ThirdCodon);
        partition.part_to_add_mut().set_end(10);
        partition.add_part().unwrap();

        assert_eq!(partition.state(), EditState::Complete);
        assert!(partition.is_complete());
        assert!(!partition.can_add_part());
        assert_eq!(
            partition.text(),
            "DNA,      gene1 = 1-4\n\
             DNA,      gene2_codon1and2 = 5-10\\3, 6-10\\3\n\
             DNA,      gene2_codon3 = 7-10\\3"
        );
    }

    #[test]
    fn test_add_blocked_when_complete() {
        let mut partition = Partition::new(6, DataType::Dna);
        add(&mut partition, "all", 6, CodonMode::None).unwrap();
        let before = partition.clone();

        assert_eq!(partition.add_part(), Err(EditError::Complete { length: 6 }));
        assert_eq!(partition, before);
    }

    #[test]
    fn test_end_out_of_range() {
        let mut partition = Partition::new(4, DataType::Dna);
        let before = partition.clone();

        partition.part_to_add_mut().set_end(5);
        assert_eq!(
            partition.part_to_add().errors(),
            vec!["end must be in the range [1, 4]".to_string()]
        );
        let err = partition.add_part().unwrap_err();
        assert_eq!(err, EditError::InvalidField("end must be in the range [1, 4]".to_string()));
        assert!(err.to_string().contains("[1, 4]"));
        assert!(partition.parts().is_empty());
        assert_eq!(partition.state(), before.state());
    }

    #[test]
    fn test_codon_mode_needs_three_columns() {
        let mut partition = Partition::new(30, DataType::Dna);
        let err = add(&mut partition, "gene1", 2, CodonMode::CodonSpecific).unwrap_err();
        assert_eq!(err, EditError::InvalidField("end must be in the range [3, 30]".to_string()));

        partition.part_to_add_mut().set_end(3);
        assert!(partition.add_part().is_ok());
        assert_eq!(partition.part_to_add().end_bounds(), Bounds::new(4, 30));
    }

    #[test]
    fn test_duplicate_part_name_blocked() {
        let mut partition = Partition::new(10, DataType::Dna);
        add(&mut partition, "gene", 5, CodonMode::None).unwrap();
        assert_eq!(partition.part_to_add().name(), "gene_1");

        let err = add(&mut partition, "gene", 10, CodonMode::None).unwrap_err();
        assert_eq!(
            err,
            EditError::InvalidField("name 'gene' is already used by another part".to_string())
        );

        let err = add(&mut partition, "two words", 10, CodonMode::None).unwrap_err();
        assert!(matches!(err, EditError::InvalidField(_)));
        assert_eq!(partition.parts().len(), 1);
    }

    #[test]
    fn test_part_type_choices() {
        let mut partition = Partition::new(10, DataType::Dna);
        assert_eq!(partition.part_to_add().type_options(), &[PartType::Dna]);
        partition
            .part_to_add_mut()
            .set_part_type(PartType::Protein(ProteinModel::Lg));
        partition.part_to_add_mut().set_end(10);
        assert!(matches!(partition.add_part(), Err(EditError::InvalidField(msg)) if msg.starts_with("type must be one of")));

        let mut protein = Partition::new(10, DataType::Protein);
        protein.part_to_add_mut().set_part_type(PartType::Protein(ProteinModel::Lg));
        protein.part_to_add_mut().set_end(10);
        assert_eq!(protein.add_part().unwrap().part_type.label(), "LG");
    }

    #[test]
    fn test_reset() {
        let mut partition = Partition::new(10, DataType::Dna);
        add(&mut partition, "gene", 5, CodonMode::CodonSpecific).unwrap();
        partition.reset();
        assert_eq!(partition.state(), EditState::Default);
        assert_eq!(partition, Partition::new(10, DataType::Dna));
        assert_eq!(partition.text(), "DNA,      part1 = 1-10");
    }

    #[test]
    fn test_default_part_settings() {
        let mut partition = Partition::new(9, DataType::Dna);
        partition.set_default_codon_mode(CodonMode::CodonSpecific).unwrap();
        assert_eq!(partition.lines(0, "").len(), 3);
        assert!(partition.set_default_part_type(PartType::Binary).is_err());

        let mut short = Partition::new(2, DataType::Dna);
        assert!(short.set_default_codon_mode(CodonMode::ThirdCodon).is_err());
        assert_eq!(short.default_part().codon_mode, CodonMode::None);
    }

    #[test]
    fn test_final_partition_single_alignment() {
        let mut partition = Partition::new(12, DataType::Dna);
        add(&mut partition, "gene1", 6, CodonMode::None).unwrap();
        add(&mut partition, "gene2", 12, CodonMode::CodonSpecific).unwrap();
        assert!(partition.is_complete());

        let final_partition = FinalPartition::new([&partition]);
        assert!(final_partition.is_complete());
        assert_eq!(final_partition.text(), partition.text());
    }

    #[test]
    fn test_final_partition_offsets() {
        let mut first = Partition::new(10, DataType::Dna);
        add(&mut first, "gene1", 4, CodonMode::None).unwrap();
        add(&mut first, "gene2", 10, CodonMode::None).unwrap();
        let second = Partition::new(6, DataType::Protein);
        let third = Partition::new(3, DataType::Binary);

        let final_partition = FinalPartition::new([&first, &second, &third]);
        assert_eq!(final_partition.offsets(), vec![0, 10, 16]);
        assert_eq!(final_partition.total_length(), 19);
        assert_eq!(
            final_partition.text(),
            "DNA,      aln1_gene1 = 1-4\n\
             DNA,      aln1_gene2 = 5-10\n\
             WAG,      aln2_part1 = 11-16\n\
             BIN,      aln3_part1 = 17-19"
        );
    }

    #[test]
    fn test_final_partition_incomplete() {
        let mut first = Partition::new(10, DataType::Dna);
        add(&mut first, "gene1", 4, CodonMode::None).unwrap();
        let second = Partition::new(6, DataType::Dna);
        assert!(!FinalPartition::new([&first, &second]).is_complete());
    }
}
