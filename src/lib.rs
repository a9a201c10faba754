//! # phyprep - Alignment Ingestion for Phylogenetic Analyses
//!
//! Reads multiple sequence alignments, works out what kind of characters they
//! hold and builds the partition files used by maximum-likelihood tree
//! search.
//!
//! ## Architecture
//!
//! - `formats`: format sniffing, FASTA and PHYLIP parsers and writers
//! - `model`: sequences and alignments
//! - `datatype`: per-sequence classification and the alignment type join
//! - `field`: values checked against a domain, used by the partition editor
//! - `partition`: parts, the part editor and the concatenated partition
//! - `loader`: parse + classify, for one file or many in parallel
//! - `error`: crate-level error type

pub mod datatype;
pub mod error;
pub mod field;
pub mod formats;
pub mod loader;
pub mod model;
pub mod partition;

pub use datatype::{classify, DataType};
pub use error::{Error, Result};
pub use formats::{FileFormat, SourceFormat};
pub use loader::{load_alignment, load_alignments, read_alignment};
pub use model::{Alignment, Sequence};
pub use partition::{FinalPartition, Partition};
