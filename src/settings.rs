use std::{
    fmt::{self, Display},
    io::{BufRead, Write},
    str::FromStr,
};

use log::trace;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::cluster::{JetAlgorithm, JetDefinition};

/// Centre-of-mass collision energy in GeV
pub const DEFAULT_E_CM: f64 = 7000.;
/// Lower bound on the transverse momentum of the hard process in GeV
pub const DEFAULT_PT_HAT_MIN: f64 = 25.;
/// Parton distribution functions
pub const DEFAULT_PDF_SET: &str = "LHAPDF6:NNPDF31_lo_as_0118";
/// Jet radius parameter
pub const DEFAULT_JET_RADIUS: f64 = 0.4;
/// Random number seed
pub const DEFAULT_SEED: u64 = 19780503;

const DEFAULT_BIAS_POW: f64 = 4.;
const DEFAULT_BIAS_REF: f64 = 10.;

/// Source of parton distribution functions
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PdfSet {
    /// A named set provided by LHAPDF 6
    Lhapdf6(String),
    /// One of the sets built into the event generator
    Internal(u32),
}

impl Default for PdfSet {
    fn default() -> Self {
        DEFAULT_PDF_SET.parse().unwrap_or(Self::Internal(1))
    }
}

impl Display for PdfSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lhapdf6(name) => write!(f, "LHAPDF6:{name}"),
            Self::Internal(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for PdfSet {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const LHAPDF6_PREFIX: &str = "lhapdf6:";
        let s = s.trim();
        if s.len() > LHAPDF6_PREFIX.len()
            && s[..LHAPDF6_PREFIX.len()].eq_ignore_ascii_case(LHAPDF6_PREFIX)
        {
            let name = &s[LHAPDF6_PREFIX.len()..];
            if name.contains(char::is_whitespace) {
                return Err(SettingsError::InvalidPdfSet(s.to_owned()));
            }
            return Ok(Self::Lhapdf6(name.to_owned()));
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(Self::Internal(n)),
            _ => Err(SettingsError::InvalidPdfSet(s.to_owned())),
        }
    }
}

/// A single `Key:sub = value` configuration string
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Directive {
    pub key: String,
    pub value: String,
}

impl Directive {
    /// Parse a line, returning `None` for blank lines and comments
    pub fn parse_line(line: &str) -> Result<Option<Self>, SettingsError> {
        let line = match line.find(&['!', '#'][..]) {
            Some(pos) => &line[..pos],
            None => line,
        };
        if line.trim().is_empty() {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for Directive {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((key, value)) = s.split_once('=') else {
            return Err(SettingsError::MissingValue(s.trim().to_owned()));
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return Err(SettingsError::MissingValue(s.trim().to_owned()));
        }
        Ok(Self {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// Error in the event generator configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SettingsError {
    #[error("Expected `Key = value`, got `{0}`")]
    MissingValue(String),
    #[error("Unknown setting `{0}`")]
    UnknownKey(String),
    #[error("Invalid value `{value}` for setting `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("Invalid PDF set `{0}`: expected `LHAPDF6:<name>` or a positive integer")]
    InvalidPdfSet(String),
    #[error("Inconsistent settings: {0}")]
    Inconsistent(String),
}

/// Settings of the event generator
///
/// Internally everything is typed. The PYTHIA-style directive strings
/// produced by [directives](Self::directives) and read by
/// [read_string](Self::read_string) only exist at the boundary to
/// external generators and command files.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, TypedBuilder)]
pub struct GeneratorSettings {
    /// Whether hard QCD 2 -> 2 processes are switched on
    #[builder(default = true)]
    pub hard_qcd: bool,
    /// Centre-of-mass energy in GeV
    #[builder(default = DEFAULT_E_CM)]
    pub e_cm: f64,
    /// Minimum transverse momentum of the hard process in GeV
    #[builder(default = DEFAULT_PT_HAT_MIN)]
    pub pt_hat_min: f64,
    #[builder(default)]
    pub pdf: PdfSet,
    /// Oversample high transverse momenta, compensated by event weights
    #[builder(default)]
    pub bias2_selection: bool,
    #[builder(default = DEFAULT_BIAS_POW)]
    pub bias2_selection_pow: f64,
    #[builder(default = DEFAULT_BIAS_REF)]
    pub bias2_selection_ref: f64,
    /// Explicit random number seed
    #[builder(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GeneratorSettings {
    /// Apply a single directive, e.g. `Beams:eCM = 13000`
    ///
    /// Keys are case-insensitive. Consistency between settings is only
    /// checked by [validate](Self::validate).
    pub fn read_string(&mut self, line: &str) -> Result<(), SettingsError> {
        let Some(directive) = Directive::parse_line(line)? else {
            return Ok(());
        };
        trace!("Reading setting `{directive}`");
        let Directive { key, value } = directive;
        let invalid = || SettingsError::InvalidValue {
            key: key.clone(),
            value: value.clone(),
        };
        match key.to_ascii_lowercase().as_str() {
            "hardqcd:all" => self.hard_qcd = parse_flag(&value).ok_or_else(invalid)?,
            "beams:ecm" => self.e_cm = value.parse().map_err(|_| invalid())?,
            "phasespace:pthatmin" => {
                self.pt_hat_min = value.parse().map_err(|_| invalid())?
            }
            "pdf:pset" => self.pdf = value.parse()?,
            "phasespace:bias2selection" => {
                self.bias2_selection = parse_flag(&value).ok_or_else(invalid)?
            }
            "phasespace:bias2selectionpow" => {
                self.bias2_selection_pow =
                    value.parse().map_err(|_| invalid())?
            }
            "phasespace:bias2selectionref" => {
                self.bias2_selection_ref =
                    value.parse().map_err(|_| invalid())?
            }
            "random:setseed" => {
                let set_seed = parse_flag(&value).ok_or_else(invalid)?;
                self.seed = match (set_seed, self.seed) {
                    (true, None) => Some(DEFAULT_SEED),
                    (true, seed) => seed,
                    (false, _) => None,
                };
            }
            "random:seed" => {
                self.seed = Some(value.parse().map_err(|_| invalid())?)
            }
            _ => return Err(SettingsError::UnknownKey(key.clone())),
        }
        Ok(())
    }

    /// Read settings from a sequence of directives and validate them
    pub fn from_directives<I, S>(directives: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut settings = Self::default();
        for directive in directives {
            settings.read_string(directive.as_ref())?;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a command file with one directive per line
    pub fn read_cmnd<R: BufRead>(reader: R) -> Result<Self, CmndError> {
        let lines: Result<Vec<_>, _> = reader.lines().collect();
        Ok(Self::from_directives(lines?)?)
    }

    /// Check that the settings describe a physically sensible run
    pub fn validate(&self) -> Result<(), SettingsError> {
        use SettingsError::Inconsistent;

        if !self.hard_qcd {
            return Err(Inconsistent("no hard process switched on".to_owned()));
        }
        if !(self.e_cm > 0.) || !self.e_cm.is_finite() {
            return Err(Inconsistent(format!(
                "collision energy {} GeV is not positive",
                self.e_cm
            )));
        }
        if !(self.pt_hat_min >= 0.) {
            return Err(Inconsistent(format!(
                "minimum transverse momentum {} GeV is negative",
                self.pt_hat_min
            )));
        }
        if 2. * self.pt_hat_min >= self.e_cm {
            return Err(Inconsistent(format!(
                "minimum transverse momentum {} GeV is not reachable at a collision energy of {} GeV",
                self.pt_hat_min, self.e_cm
            )));
        }
        if self.bias2_selection {
            if !(self.bias2_selection_ref > 0.) {
                return Err(Inconsistent(format!(
                    "bias reference transverse momentum {} GeV is not positive",
                    self.bias2_selection_ref
                )));
            }
            if !(self.bias2_selection_pow >= 0.) {
                return Err(Inconsistent(format!(
                    "bias power {} is negative",
                    self.bias2_selection_pow
                )));
            }
        }
        Ok(())
    }

    /// The settings as PYTHIA-style directives
    pub fn directives(&self) -> Vec<Directive> {
        let mut res = vec![
            directive("HardQCD:all", on_off(self.hard_qcd)),
            directive("Beams:eCM", self.e_cm),
            directive("PhaseSpace:pTHatMin", self.pt_hat_min),
            directive("PDF:pSet", &self.pdf),
            directive("PhaseSpace:bias2Selection", on_off(self.bias2_selection)),
        ];
        if self.bias2_selection {
            res.push(directive(
                "PhaseSpace:bias2SelectionPow",
                self.bias2_selection_pow,
            ));
            res.push(directive(
                "PhaseSpace:bias2SelectionRef",
                self.bias2_selection_ref,
            ));
        }
        if let Some(seed) = self.seed {
            res.push(directive("Random:setSeed", "on"));
            res.push(directive("Random:seed", seed));
        }
        res
    }

    /// Write a command file that can be read by an external generator
    pub fn write_cmnd<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for directive in self.directives() {
            writeln!(out, "{directive}")?;
        }
        out.flush()
    }
}

/// Error reading a command file
#[derive(Debug, Error)]
pub enum CmndError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    SettingsError(#[from] SettingsError),
}

fn directive(key: &str, value: impl Display) -> Directive {
    Directive {
        key: key.to_owned(),
        value: value.to_string(),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Configuration of a complete run
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, TypedBuilder)]
pub struct RunConfig {
    /// Number of attempted events
    pub nevents: u64,
    #[builder(default)]
    pub generator: GeneratorSettings,
    #[builder(default = JetAlgorithm::AntiKt)]
    pub jet_algorithm: JetAlgorithm,
    #[builder(default = DEFAULT_JET_RADIUS)]
    pub jet_radius: f64,
}

impl RunConfig {
    /// Check generator and jet settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.generator.validate()?;
        if !(self.jet_radius > 0.) {
            return Err(SettingsError::Inconsistent(format!(
                "jet radius {} is not positive",
                self.jet_radius
            )));
        }
        Ok(())
    }

    /// Jet definition used for the whole run
    ///
    /// Jets are required to be at least as hard as the hard process.
    pub fn jet_definition(&self) -> JetDefinition {
        JetDefinition {
            algorithm: self.jet_algorithm,
            radius: self.jet_radius,
            min_pt: self.generator.pt_hat_min,
        }
    }
}
