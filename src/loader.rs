//! Alignment loading: parse, then classify.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::info;

use crate::datatype::classify;
use crate::error::{Error, Result};
use crate::formats::{parse_file, parse_reader, SourceFormat};
use crate::model::Alignment;

fn typed(mut alignment: Alignment) -> Result<Alignment> {
    classify(&mut alignment)?;
    if !alignment.is_typed() {
        return Err(Error::Internal(format!(
            "alignment classified as {}",
            alignment.data_type
        )));
    }
    Ok(alignment)
}

/// Reads and classifies an alignment from a reader.
pub fn read_alignment<R: BufRead>(reader: R, forced_format: Option<SourceFormat>) -> Result<Alignment> {
    typed(parse_reader(reader, forced_format)?)
}

/// Loads and classifies an alignment file.
pub fn load_alignment<P: AsRef<Path>>(path: P, forced_format: Option<SourceFormat>) -> Result<Alignment> {
    let path = path.as_ref();
    let alignment = typed(parse_file(path, forced_format)?)?;
    info!(
        path = %path.display(),
        format = %alignment.file_format,
        data_type = %alignment.data_type,
        sequences = alignment.num_sequences(),
        length = alignment.length(),
        "loaded alignment"
    );
    Ok(alignment)
}

/// Loads several alignment files in parallel.
///
/// Returns one result per path, in the order of `paths`.
pub fn load_alignments(paths: &[PathBuf], forced_format: Option<SourceFormat>) -> Vec<Result<Alignment>> {
    paths
        .par_iter()
        .map(|path| load_alignment(path, forced_format))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::DataType;
    use crate::formats::{FileFormat, ParseError};

    #[test]
    fn test_read_alignment_classifies() {
        let alignment = read_alignment("2 6\nt1 MKLVAA\nt2 MKIV-A\n".as_bytes(), None).unwrap();
        assert_eq!(alignment.file_format, FileFormat::PhylipRelaxed);
        assert_eq!(alignment.data_type, DataType::Protein);
    }

    #[test]
    fn test_read_alignment_errors() {
        let err = read_alignment(">t1\nNNNN\n>t2\n----\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, Error::DataType(_)));
        assert!(err.is_user_fixable());

        let err = read_alignment("".as_bytes(), None).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::EmptyFile)));
    }
}
