use std::{
    fmt::{self, Display},
    io::Write,
    str::FromStr,
};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

const GZIP_DEFAULT_LEVEL: u8 = 6;
const LZ4_DEFAULT_LEVEL: u8 = 0;
const ZSTD_DEFAULT_LEVEL: u8 = 0;

lazy_static! {
    static ref COMPRESSION_RE: Regex =
        Regex::new(r"^(?P<algo>[[:alnum:]]+)(?P<lvl>_\d+)?$").unwrap();
}

/// Compression format
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Compression {
    /// The bzip2 format
    Bzip2,
    /// The gzip format with compression level as associated value
    Gzip(u8),
    /// The lz4 format with compression level as associated value
    Lz4(u8),
    /// The zstd format with compression level as associated value
    Zstd(u8),
}

impl Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bzip2 => write!(f, "bzip2"),
            Self::Gzip(lvl) => write!(f, "gzip_{lvl}"),
            Self::Lz4(lvl) => write!(f, "lz4_{lvl}"),
            Self::Zstd(lvl) => write!(f, "zstd_{lvl}"),
        }
    }
}

#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ParseCompressionErr {
    #[error("Unknown compression algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Level {1} not supported for {0} compression")]
    UnsupportedLevel(String, String),
}

impl FromStr for Compression {
    type Err = ParseCompressionErr;

    /// Parse `ALGORITHM[_LEVEL]`, e.g. `bzip2`, `gz_9`, or `zstd_19`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Compression::*;
        use ParseCompressionErr::*;

        let lower_case = s.to_ascii_lowercase();
        let Some(captures) = COMPRESSION_RE.captures(&lower_case) else {
            return Err(UnknownAlgorithm(s.to_owned()));
        };
        let algo = &captures["algo"];
        let lvl_str = captures.name("lvl").map(|lvl| lvl.as_str());
        let level = |max: u8, default: u8| match lvl_str {
            None => Ok(default),
            Some(lvl_str) => match lvl_str[1..].parse::<u8>() {
                Ok(lvl) if lvl <= max => Ok(lvl),
                _ => Err(UnsupportedLevel(algo.into(), lvl_str.to_owned())),
            },
        };
        match algo {
            "bzip2" | "bz2" => match lvl_str {
                Some(lvl_str) => {
                    Err(UnsupportedLevel(algo.into(), lvl_str.to_owned()))
                }
                None => Ok(Bzip2),
            },
            "gzip" | "gz" => level(9, GZIP_DEFAULT_LEVEL).map(Gzip),
            "lz4" => level(16, LZ4_DEFAULT_LEVEL).map(Lz4),
            "zstd" | "zstandard" => level(19, ZSTD_DEFAULT_LEVEL).map(Zstd),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Convert into a writer that compresses to the given format
pub fn compress_writer<'a, W: 'a + Write>(
    writer: W,
    compression: Option<Compression>,
) -> Result<Box<dyn Write + 'a>, std::io::Error> {
    match compression {
        Some(Compression::Bzip2) => {
            let encoder = BzEncoder::new(writer, bzip2::Compression::best());
            Ok(Box::new(encoder))
        }
        Some(Compression::Gzip(lvl)) => {
            let encoder =
                GzEncoder::new(writer, flate2::Compression::new(lvl.into()));
            Ok(Box::new(encoder))
        }
        Some(Compression::Lz4(lvl)) => {
            let encoder = lz4::EncoderBuilder::new()
                .auto_flush(true)
                .level(lvl.into())
                .build(writer)?;
            Ok(Box::new(encoder))
        }
        Some(Compression::Zstd(lvl)) => {
            let encoder = zstd::Encoder::new(writer, lvl.into())?;
            Ok(Box::new(encoder.auto_finish()))
        }
        None => Ok(Box::new(writer)),
    }
}
