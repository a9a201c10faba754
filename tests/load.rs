use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use phyprep::datatype::DataType;
use phyprep::formats::phylip::{write_phylip, Naming, PhylipWriteOptions};
use phyprep::formats::{FileFormat, ParseError, SourceFormat};
use phyprep::partition::{FinalPartition, Partition};
use phyprep::{load_alignment, load_alignments, Error};

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const FASTA: &str = ">alpha\nACGTACGT\n>beta\nACGAACGT\n>gamma\nACGGAC-T\n";

const RELAXED_INTERLEAVED: &str = "3 8\n\
alpha   ACGT\n\
beta    ACGA\n\
gamma   ACGG\n\
\n\
ACGT\n\
ACGT\n\
AC-T\n";

const STRICT_SEQUENTIAL: &str = " 2 6\n\
alpha00001MKLVAA\n\
beta000002MKIV-A\n";

#[test]
fn test_load_fasta_file() {
    let file = write_temp(".fasta", FASTA);
    let alignment = load_alignment(file.path(), None).unwrap();

    assert_eq!(alignment.file_format, FileFormat::Fasta);
    assert_eq!(alignment.data_type, DataType::Dna);
    assert_eq!(alignment.num_sequences(), 3);
    assert_eq!(alignment.length(), 8);
}

#[test]
fn test_load_phylip_files() {
    let interleaved = write_temp(".phy", RELAXED_INTERLEAVED);
    let alignment = load_alignment(interleaved.path(), None).unwrap();
    assert_eq!(alignment.file_format, FileFormat::PhylipRelaxed);
    assert!(alignment.interleaved);
    assert_eq!(alignment.get(2).unwrap().taxon, "gamma");
    assert_eq!(alignment.get(2).unwrap().code, "ACGGAC-T");

    let fasta = write_temp(".fasta", FASTA);
    let from_fasta = load_alignment(fasta.path(), None).unwrap();
    assert_eq!(alignment.sequences, from_fasta.sequences);

    let strict = write_temp(".phy", STRICT_SEQUENTIAL);
    let alignment = load_alignment(strict.path(), None).unwrap();
    assert_eq!(alignment.file_format, FileFormat::PhylipStrict);
    assert_eq!(alignment.data_type, DataType::Protein);
    assert_eq!(alignment.get(0).unwrap().taxon, "alpha00001");
    assert_eq!(alignment.get(1).unwrap().code, "MKIV-A");
}

#[test]
fn test_forced_format_mismatch() {
    let file = write_temp(".phy", RELAXED_INTERLEAVED);
    let err = load_alignment(file.path(), Some(SourceFormat::Fasta)).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::FastaError(_))));
    assert!(err.is_user_fixable());
}

#[test]
fn test_load_alignments_keeps_order() {
    let fasta = write_temp(".fasta", FASTA);
    let broken = write_temp(".fasta", ">t1\nACGT\n>t2\nMKLV\n");
    let strict = write_temp(".phy", STRICT_SEQUENTIAL);
    let missing = PathBuf::from("/nonexistent/phyprep/missing.phy");

    let paths = vec![
        fasta.path().to_path_buf(),
        broken.path().to_path_buf(),
        strict.path().to_path_buf(),
        missing,
    ];
    let results = load_alignments(&paths, None);
    assert_eq!(results.len(), 4);

    assert_eq!(results[0].as_ref().unwrap().data_type, DataType::Dna);

    let err = results[1].as_ref().unwrap_err();
    assert!(matches!(err, Error::DataType(_)));
    assert!(err.is_user_fixable());

    assert_eq!(results[2].as_ref().unwrap().file_format, FileFormat::PhylipStrict);

    let err = results[3].as_ref().unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::IoError(_))));
    assert!(!err.is_user_fixable());
}

#[test]
fn test_partition_of_loaded_alignments() {
    let fasta = write_temp(".fasta", FASTA);
    let strict = write_temp(".phy", STRICT_SEQUENTIAL);
    let paths = vec![fasta.path().to_path_buf(), strict.path().to_path_buf()];

    let partitions: Vec<Partition> = load_alignments(&paths, None)
        .into_iter()
        .map(|result| Partition::for_alignment(&result.unwrap()))
        .collect();

    let final_partition = FinalPartition::new(&partitions);
    assert!(final_partition.is_complete());
    assert_eq!(
        final_partition.text(),
        "DNA,      aln1_part1 = 1-8\n\
         WAG,      aln2_part1 = 9-14"
    );
}

#[test]
fn test_written_phylip_reloads() {
    // Ten-character names leave no space after the name field.
    let strict = write_temp(".phy", STRICT_SEQUENTIAL);
    let original = load_alignment(strict.path(), None).unwrap();
    assert!(!original.interleaved);

    let mut out = NamedTempFile::with_suffix(".phy").unwrap();
    let options = PhylipWriteOptions {
        naming: Naming::Strict,
        interleaved: true,
        block_width: 3,
    };
    write_phylip(&mut out, &original, options).unwrap();
    out.flush().unwrap();

    let reloaded = load_alignment(out.path(), None).unwrap();
    assert_eq!(reloaded.file_format, FileFormat::PhylipStrict);
    assert!(reloaded.interleaved);
    assert_eq!(reloaded.sequences, original.sequences);
    assert_eq!(reloaded.data_type, original.data_type);
}
