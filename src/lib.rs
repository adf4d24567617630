//! `genjets` generates proton-proton collision events, clusters the
//! final-state particles into jets, and histograms the jet transverse
//! momenta.
//!
//! # How to use
//!
//! The `genjets-basic` binary runs the whole chain. As a library,
//! construct an [EventSource](traits::EventSource), a histogram sink
//! implementing [WriteHistogram](traits::WriteHistogram), and combine
//! them with a [RunConfig](settings::RunConfig):
//!
//! ```no_run
//! use genjets::prelude::*;
//!
//! let config = RunConfig::builder().nevents(1000).build();
//! let generator = ToyGenerator::new(config.generator.clone())?;
//! let writer = FileWriter::builder()
//!     .filename("output/basic_pythia.yoda")
//!     .build()
//!     .open()?;
//! let (hist, summary) = RunBuilder::from_config(&config, generator, writer)
//!     .build()
//!     .run()?;
//! println!("{}", summary.sigma);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [run] drives event generation, clustering, and histogramming
//! - [generator] and [hepmc2] provide event sources
//! - [settings] for the run configuration and generator directives
//! - [cluster] for jet definitions
//! - [writer] for histogram output

/// Jet clustering
pub mod cluster;
/// Output compression
pub mod compression;
/// Scattering event class
pub mod event;
/// Final-state particle selection
pub mod filter;
/// Four-vector class
pub mod four_vector;
/// Toy QCD event generator
pub mod generator;
/// HepMC2 event files as event source
#[cfg(feature = "hepmc2")]
pub mod hepmc2;
pub mod histogram;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Run driver
pub mod run;
/// Generator settings and run configuration
pub mod settings;
/// Common traits
pub mod traits;
/// Histogram output
pub mod writer;
/// YODA histogram format
pub mod yoda;

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
lazy_static! {
    pub static ref VERSION_MAJOR: u32 =
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap();
    pub static ref VERSION_MINOR: u32 =
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap();
    pub static ref VERSION_PATCH: u32 =
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap();
}
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");

pub const FEATURES: [&str; NFEATURES] = [
    #[cfg(feature = "hepmc2")]
    "hepmc2",
];

const NFEATURES: usize = {
    #[allow(unused_mut)]
    let mut nfeatures = 0;
    #[cfg(feature = "hepmc2")]
    {
        nfeatures += 1;
    }
    nfeatures
};
