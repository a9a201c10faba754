//! phyprep - Alignment and partition preparation
//!
//! Loads FASTA and PHYLIP alignments, reports their data type and writes the
//! default partition file for their concatenation.
//!
//! ## Usage
//!
//! ```bash
//! phyprep gene1.phy gene2.fasta -p partition.txt
//! phyprep -f phylip --codon third cds.phy -p -
//! phyprep aln.fasta -o aln.phy --output-format phylip-strict
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use clap_verbosity_flag::Verbosity;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

use phyprep::formats::fasta::{write_fasta, DEFAULT_LINE_WIDTH};
use phyprep::formats::phylip::{write_phylip, Naming, PhylipWriteOptions};
use phyprep::formats::SourceFormat;
use phyprep::loader::load_alignments;
use phyprep::model::Alignment;
use phyprep::partition::{CodonMode, FinalPartition, Partition};

/// File format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// FASTA format
    Fasta,
    /// PHYLIP format (strict or relaxed, sequential or interleaved)
    Phylip,
    /// Auto-detect from content
    Auto,
}

impl From<FormatArg> for Option<SourceFormat> {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Fasta => Some(SourceFormat::Fasta),
            FormatArg::Phylip => Some(SourceFormat::Phylip),
            FormatArg::Auto => None,
        }
    }
}

/// Output format for conversion
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// FASTA, 60 sites per line
    Fasta,
    /// Relaxed sequential PHYLIP
    Phylip,
    /// Strict sequential PHYLIP (names of at most 10 characters)
    PhylipStrict,
    /// Relaxed interleaved PHYLIP
    PhylipInterleaved,
}

/// Codon split of the default parts
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CodonArg {
    /// One range per alignment
    None,
    /// One part per codon position
    Codon,
    /// Positions 1 and 2 together, position 3 alone
    Third,
}

impl From<CodonArg> for CodonMode {
    fn from(arg: CodonArg) -> Self {
        match arg {
            CodonArg::None => CodonMode::None,
            CodonArg::Codon => CodonMode::CodonSpecific,
            CodonArg::Third => CodonMode::ThirdCodon,
        }
    }
}

/// phyprep - Check alignments and write partition files for phylogenetic analyses
///
/// Every file is parsed and classified. With -p/--partition, the default
/// partition of the concatenated alignments is written to a file (or stdout
/// with "-"). With -o/--output, a single alignment is converted.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Alignment files (FASTA or PHYLIP)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Force a specific file format (overrides auto-detection)
    #[arg(short = 'f', long = "format", value_enum, default_value = "auto")]
    format: FormatArg,

    /// Partition file for the concatenated alignments. Use "-" for stdout.
    #[arg(short = 'p', long = "partition")]
    partition: Option<String>,

    /// Codon split applied to each alignment's default part
    #[arg(long = "codon", value_enum, default_value = "none")]
    codon: CodonArg,

    /// Converted alignment file (single input only). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Format of the converted alignment
    #[arg(long = "output-format", value_enum, default_value = "phylip")]
    output_format: OutputFormat,

    #[command(flatten)]
    verbose: Verbosity,
}

/// Opens a file for writing, or stdout for "-".
fn open_output(target: &str) -> Result<Box<dyn Write>> {
    if target == "-" {
        Ok(Box::new(io::stdout().lock()))
    } else {
        let file = File::create(target).with_context(|| format!("Cannot create {}", target))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

fn write_partition(alignments: &[(PathBuf, Alignment)], codon: CodonMode, target: &str) -> Result<()> {
    let mut partitions = Vec::with_capacity(alignments.len());
    for (path, alignment) in alignments {
        let mut partition = Partition::for_alignment(alignment);
        partition
            .set_default_codon_mode(codon)
            .with_context(|| format!("{}", path.display()))?;
        partitions.push(partition);
    }

    let final_partition = FinalPartition::new(&partitions);
    let mut out = open_output(target)?;
    writeln!(out, "{}", final_partition.text())?;
    out.flush()?;

    info!(
        path = target,
        alignments = partitions.len(),
        length = final_partition.total_length(),
        "wrote partition file"
    );
    if target != "-" {
        eprintln!(
            "Wrote partition of {} alignment(s), {} sites, to {}",
            partitions.len(),
            final_partition.total_length(),
            target
        );
    }
    Ok(())
}

fn write_alignment(alignment: &Alignment, format: OutputFormat, target: &str) -> Result<()> {
    let mut out = open_output(target)?;
    match format {
        OutputFormat::Fasta => write_fasta(&mut out, alignment, DEFAULT_LINE_WIDTH)?,
        OutputFormat::Phylip => write_phylip(&mut out, alignment, PhylipWriteOptions::default())?,
        OutputFormat::PhylipStrict => write_phylip(
            &mut out,
            alignment,
            PhylipWriteOptions {
                naming: Naming::Strict,
                ..PhylipWriteOptions::default()
            },
        )?,
        OutputFormat::PhylipInterleaved => write_phylip(
            &mut out,
            alignment,
            PhylipWriteOptions {
                interleaved: true,
                ..PhylipWriteOptions::default()
            },
        )?,
    }
    out.flush()?;

    if target != "-" {
        eprintln!("Wrote {} sequences to {}", alignment.num_sequences(), target);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(io::stderr)
            .init(),
    };

    if args.output.is_some() && args.files.len() != 1 {
        bail!("-o/--output converts a single alignment (got {} files)", args.files.len());
    }

    let forced_format: Option<SourceFormat> = args.format.into();
    let results = load_alignments(&args.files, forced_format);

    let mut alignments = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (path, result) in args.files.iter().zip(results) {
        match result {
            Ok(alignment) => {
                eprintln!(
                    "{}: {}, {} sequences x {} sites, {}{}",
                    path.display(),
                    alignment.file_format,
                    alignment.num_sequences(),
                    alignment.length(),
                    alignment.data_type,
                    if alignment.has_invariant_sequences {
                        " (contains invariant sequences)"
                    } else {
                        ""
                    }
                );
                alignments.push((path.clone(), alignment));
            }
            Err(e) if e.is_user_fixable() => {
                eprintln!("{}: {}", path.display(), e);
                failed += 1;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to load {}", path.display())),
        }
    }
    if failed > 0 {
        bail!("{} of {} alignment(s) could not be loaded", failed, args.files.len());
    }

    if let Some(target) = &args.partition {
        write_partition(&alignments, args.codon.into(), target)?;
    }

    if let (Some(target), Some((_, alignment))) = (&args.output, alignments.first()) {
        write_alignment(alignment, args.output_format, target)?;
    }

    Ok(())
}
