#[cfg(feature = "hepmc2")]
pub use crate::hepmc2::FileSource;
pub use crate::{
    cluster::{JetAlgorithm, JetDefinition},
    compression::Compression,
    event::{CrossSection, Event, EventBuilder},
    generator::ToyGenerator,
    histogram::Histogram1D,
    run::{Run, RunBuilder, RunSummary},
    settings::{GeneratorSettings, RunConfig},
    traits::{EventSource, WriteHistogram},
    writer::{FileWriter, OutputFormat},
};
