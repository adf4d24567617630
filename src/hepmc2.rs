use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use ::hepmc2::{event::EnergyUnit, reader::LineParseError};
use audec::auto_decompress;
use log::{debug, info};
use noisy_float::prelude::*;
use particle_id::ParticleID;
use thiserror::Error;

use crate::{
    event::{CrossSection, Event, EventBuilder, Status},
    four_vector::FourVector,
    traits::{Classify, EventSource, Severity},
};

const HEPMC_OUTGOING: i32 = 1;
const HEPMC_INCOMING: i32 = 4;

// HepMC2 stores cross sections in pb
const PB_TO_MB: f64 = 1e-9;

/// Replays events from (potentially compressed) HepMC2 files
///
/// The files are read one after the other. The cross section is taken
/// from the most recent event that carries one.
pub struct FileSource {
    paths: Vec<PathBuf>,
    readers: Vec<::hepmc2::Reader<Box<dyn BufRead>>>,
    current: usize,
    xs: CrossSection,
}

impl FileSource {
    /// Open all given event files
    ///
    /// Fails if any of the files cannot be opened.
    pub fn from_files<I, P>(files: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut paths = Vec::new();
        let mut readers = Vec::new();
        for path in files {
            let path = path.as_ref().to_owned();
            debug!("Opening {path:?} as HepMC2 event file");
            let file = File::open(&path)
                .map_err(|err| SourceError::OpenErr(path.clone(), err))?;
            readers.push(::hepmc2::Reader::new(auto_decompress(
                BufReader::new(file),
            )));
            paths.push(path);
        }
        Ok(Self {
            paths,
            readers,
            current: 0,
            xs: CrossSection::default(),
        })
    }
}

impl EventSource for FileSource {
    type Error = SourceError;

    fn next_event(&mut self) -> Result<Event, Self::Error> {
        while let Some(reader) = self.readers.get_mut(self.current) {
            match reader.next() {
                Some(Ok(ev)) => {
                    if ev.xs.cross_section != 0. {
                        self.xs = CrossSection {
                            mean: PB_TO_MB * ev.xs.cross_section,
                            err: PB_TO_MB * ev.xs.cross_section_error,
                        };
                    }
                    return Ok(ev.into());
                }
                Some(Err(err)) => {
                    let path = self.paths[self.current].clone();
                    return Err(SourceError::ReadErr(path, err));
                }
                None => {
                    info!("Finished reading {:?}", self.paths[self.current]);
                    self.current += 1;
                }
            }
        }
        Err(SourceError::Exhausted)
    }

    fn sigma_gen(&self) -> CrossSection {
        self.xs
    }
}

impl From<::hepmc2::Event> for Event {
    fn from(source: ::hepmc2::Event) -> Self {
        let efact = if source.energy_unit == EnergyUnit::MEV {
            1e-3
        } else {
            1.
        };
        let id = usize::try_from(source.number).unwrap_or_default();
        let mut ev = EventBuilder::new(id);
        if let Some(&weight) = source.weights.first() {
            ev.weight(n64(weight));
        }
        for vx in source.vertices {
            // other incoming particles already appeared as outgoing
            // particles of their production vertex
            let beams = vx
                .particles_in
                .into_iter()
                .filter(|p| p.status == HEPMC_INCOMING);
            for particle in beams.chain(vx.particles_out) {
                let p = FourVector::from(particle.p.0.map(n64));
                ev.add_particle(
                    ParticleID::new(particle.id),
                    to_status(particle.status),
                    p,
                );
            }
        }
        if efact != 1. {
            ev.rescale_energies(n64(efact));
        }
        ev.build()
    }
}

// Only HepMC status 1 marks a final-state particle
fn to_status(status: i32) -> Status {
    if status == HEPMC_OUTGOING {
        Status(status)
    } else {
        Status(-status.abs())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to open event file {0:?}: {1}")]
    OpenErr(PathBuf, std::io::Error),
    #[error("Failed to read event from {0:?}: {1}")]
    ReadErr(PathBuf, LineParseError),
    #[error("No more events in input files")]
    Exhausted,
}

impl Classify for SourceError {
    fn severity(&self) -> Severity {
        match self {
            Self::OpenErr(..) => Severity::Fatal,
            Self::ReadErr(..) => Severity::Skip,
            Self::Exhausted => Severity::EndOfInput,
        }
    }
}
