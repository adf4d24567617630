use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use genjets::compression::{Compression, ParseCompressionErr};
use genjets::settings::DEFAULT_SEED;
use genjets::writer::OutputFormat;
use strum::{Display, EnumString};
use thiserror::Error;

fn parse_compr(s: &str) -> Result<Compression, ParseCompressionErr> {
    s.parse()
}

#[derive(Debug, Display, Default, Copy, Clone, ValueEnum, EnumString)]
#[clap(rename_all = "lower")]
pub(crate) enum FileFormat {
    #[default]
    Yoda,
    Yaml,
}

impl From<FileFormat> for OutputFormat {
    fn from(source: FileFormat) -> Self {
        match source {
            FileFormat::Yoda => OutputFormat::Yoda,
            FileFormat::Yaml => OutputFormat::Yaml,
        }
    }
}

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Number of events to generate.
    #[clap(short = 'n', long)]
    pub(crate) nevents: Option<u64>,

    /// HepMC2 event files to read instead of running the toy generator.
    ///
    /// Compressed files are decompressed on the fly.
    #[clap(short, long, num_args = 1..)]
    pub(crate) infiles: Vec<PathBuf>,

    /// Random number generator seed for the toy generator.
    #[clap(short, long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,

    /// Output file.
    #[clap(
        short,
        long,
        value_parser,
        default_value = "output/basic_pythia.yoda"
    )]
    pub(crate) outfile: PathBuf,

    /// Output format.
    #[clap(value_enum, long, default_value_t)]
    pub(crate) outformat: FileFormat,

    #[clap(short, long, value_parser = parse_compr,
                help = "Compress output file.
Possible settings are 'bzip2', 'gzip', 'zstd', 'lz4'.
Compression levels can be set with algorithm_level e.g. 'zstd_5'.
Maximum levels are 'gzip_9', 'zstd_19', 'lz4_16'.")]
    pub(crate) compression: Option<Compression>,

    /// Oversample high transverse momenta in the toy generator.
    ///
    /// Events are weighted to compensate.
    #[clap(long)]
    pub(crate) bias: bool,

    /// Write the generator settings as PYTHIA command file.
    #[clap(long, value_parser)]
    pub(crate) write_cmnd: Option<PathBuf>,

    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,
}

impl Opt {
    pub(crate) fn validate(self) -> Result<ValidOpt, ValidationError> {
        let Some(nevents) = self.nevents else {
            return Err(ValidationError::MissingEvents);
        };
        if !cfg!(feature = "hepmc2") && !self.infiles.is_empty() {
            return Err(ValidationError::HepMCUnsupported);
        }
        Ok(ValidOpt { nevents, opt: self })
    }
}

/// Options after checking for required values
#[derive(Debug)]
pub(crate) struct ValidOpt {
    pub(crate) nevents: u64,
    pub(crate) opt: Opt,
}

#[derive(Debug, Copy, Clone, Error)]
pub(crate) enum ValidationError {
    #[error("number of events must be specified; use option -n or --nevents")]
    MissingEvents,
    #[error("cannot read HepMC2 files. Reinstall genjets with `cargo install genjets --features hepmc2`")]
    HepMCUnsupported,
}
