use std::fmt::{self, Display};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cluster::JetDefinition,
    event::CrossSection,
    filter::select_final_state,
    histogram::Histogram1D,
    progress_bar::ProgressBar,
    settings::RunConfig,
    traits::{Classify, EventSource, Progress, Severity, WriteHistogram},
};

#[derive(Clone, PartialEq, Debug)]
pub struct RunBuilder<S, W> {
    pub source: S,
    pub jet_def: JetDefinition,
    pub histogram: Histogram1D,
    pub writer: W,
    pub nevents: u64,
}

impl<S, W> RunBuilder<S, W> {
    /// Set up a run with the jet definition, histogram binning and event
    /// count derived from `config`
    pub fn from_config(config: &RunConfig, source: S, writer: W) -> Self {
        Self {
            source,
            jet_def: config.jet_definition(),
            histogram: Histogram1D::jet_pt(config.generator.pt_hat_min),
            writer,
            nevents: config.nevents,
        }
    }

    pub fn build(self) -> Run<S, W> {
        Run {
            source: self.source,
            jet_def: self.jet_def,
            histogram: self.histogram,
            writer: self.writer,
            nevents: self.nevents,
        }
    }
}

impl<S, W> From<Run<S, W>> for RunBuilder<S, W> {
    fn from(r: Run<S, W>) -> Self {
        RunBuilder {
            source: r.source,
            jet_def: r.jet_def,
            histogram: r.histogram,
            writer: r.writer,
            nevents: r.nevents,
        }
    }
}

/// A configured run, ready to generate events
///
/// Running consumes it, so each run is executed at most once and the
/// histogram is written exactly once.
#[derive(Clone, PartialEq, Debug)]
pub struct Run<S, W> {
    source: S,
    jet_def: JetDefinition,
    histogram: Histogram1D,
    writer: W,
    nevents: u64,
}

impl<S, W> From<RunBuilder<S, W>> for Run<S, W> {
    fn from(b: RunBuilder<S, W>) -> Self {
        b.build()
    }
}

/// Bookkeeping of a finished run
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq,
)]
pub struct RunSummary {
    /// Number of events requested from the source
    pub attempted: u64,
    /// Events the source failed to produce
    pub failed: u64,
    /// Events without final-state particles
    pub empty: u64,
    /// Events without any jet above the threshold
    pub without_jets: u64,
    /// Number of histogrammed jets
    pub jets: u64,
    /// Whether the source ran out of events early
    pub exhausted: bool,
    pub sigma: CrossSection,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} events attempted, {} failed, {} without final-state particles, {} without jets, {} jets",
            self.attempted, self.failed, self.empty, self.without_jets, self.jets
        )
    }
}

#[derive(Debug, Error)]
pub enum RunError<E1, E2> {
    #[error("Failed to generate event: {0}")]
    SourceErr(E1),
    #[error("Failed to write histogram: {0}")]
    WriteErr(E2),
}

impl<S, W> Run<S, W>
where
    S: EventSource,
    S::Error: Display,
    W: WriteHistogram,
{
    /// Generate events, cluster jets, and fill and write the histogram
    ///
    /// Events the source fails to produce and events without
    /// final-state particles are skipped and only counted in the
    /// summary.
    pub fn run(
        self,
    ) -> Result<(Histogram1D, RunSummary), RunError<S::Error, W::Error>> {
        use RunError::*;

        let Self {
            mut source,
            jet_def,
            mut histogram,
            writer,
            nevents,
        } = self;
        debug!("Clustering with {jet_def:?}");
        let mut summary = RunSummary::default();
        let mut fatal = None;
        let progress = ProgressBar::new(nevents, "Events generated:");
        for n in 0..nevents {
            let event = match source.next_event() {
                Ok(event) => event,
                Err(err) => match err.severity() {
                    Severity::Skip => {
                        debug!("Skipping event {n}: {err}");
                        summary.attempted += 1;
                        summary.failed += 1;
                        progress.inc(1);
                        continue;
                    }
                    Severity::EndOfInput => {
                        summary.exhausted = true;
                        break;
                    }
                    Severity::Fatal => {
                        fatal = Some(err);
                        break;
                    }
                },
            };
            summary.attempted += 1;
            progress.inc(1);

            let particles = select_final_state(&event);
            if particles.is_empty() {
                debug!("Skipping event {n}: no final-state particles");
                summary.empty += 1;
                continue;
            }
            trace!("Clustering {} particles", particles.len());
            let jets = jet_def.jets(particles);
            if jets.is_empty() {
                summary.without_jets += 1;
            }
            let weight = event.weight.raw();
            for jet in &jets {
                histogram.fill(jet.pt().raw(), weight);
            }
            summary.jets += jets.len() as u64;
        }
        progress.finish();
        if let Some(err) = fatal {
            return Err(SourceErr(err));
        }
        if summary.exhausted {
            warn!(
                "Event source exhausted after {} of {nevents} events",
                summary.attempted
            );
        }
        summary.sigma = source.sigma_gen();
        info!("{summary}");
        writer.write(&histogram).map_err(WriteErr)?;
        Ok((histogram, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use noisy_float::prelude::*;
    use particle_id::ParticleID;

    use crate::{
        event::{Event, EventBuilder, Status},
        four_vector::FourVector,
        writer::InMemory,
    };

    #[derive(Debug, Error)]
    #[error("stub failure")]
    struct StubError(Severity);

    impl Classify for StubError {
        fn severity(&self) -> Severity {
            self.0
        }
    }

    // replays a fixed list of outcomes, then reports the end of input
    struct Stub(std::vec::IntoIter<Result<Event, StubError>>);

    impl EventSource for Stub {
        type Error = StubError;

        fn next_event(&mut self) -> Result<Event, Self::Error> {
            self.0
                .next()
                .unwrap_or(Err(StubError(Severity::EndOfInput)))
        }

        fn sigma_gen(&self) -> CrossSection {
            CrossSection {
                mean: 1e-2,
                err: 1e-4,
            }
        }
    }

    fn dijet(weight: f64) -> Event {
        let mut ev = EventBuilder::new(0);
        ev.weight(n64(weight));
        for phi in [0., 3.] {
            let p = FourVector::from_pt_rap_phi(41., 0., phi, 0.);
            ev.add_particle(ParticleID::new(211), Status(83), p);
        }
        ev.build()
    }

    fn run(
        outcomes: Vec<Result<Event, StubError>>,
        nevents: u64,
    ) -> Result<(Histogram1D, RunSummary), RunError<StubError, std::convert::Infallible>>
    {
        let config = RunConfig::builder().nevents(nevents).build();
        let mut out = None;
        let res = RunBuilder::from_config(
            &config,
            Stub(outcomes.into_iter()),
            InMemory(&mut out),
        )
        .build()
        .run();
        if let Ok((hist, _)) = &res {
            assert_eq!(out.as_ref(), Some(hist));
        }
        res
    }

    #[test]
    fn tst_skips() {
        let outcomes = vec![
            Ok(dijet(2.)),
            Err(StubError(Severity::Skip)),
            Ok(Event::new()),
            Ok(dijet(1.)),
        ];
        let (hist, summary) = run(outcomes, 4).unwrap();
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.empty, 1);
        assert_eq!(summary.jets, 4);
        assert!(!summary.exhausted);
        assert_eq!(hist.entries(), 4);
        assert!((hist.content_at(41.) - 6.).abs() < 1e-12);
        assert_eq!(summary.sigma.mean, 1e-2);
    }

    #[test]
    fn tst_exhausted() {
        let (hist, summary) = run(vec![Ok(dijet(1.))], 10).unwrap();
        assert!(summary.exhausted);
        assert_eq!(summary.attempted, 1);
        assert_eq!(hist.entries(), 2);
    }

    #[test]
    fn tst_fatal() {
        let outcomes = vec![Ok(dijet(1.)), Err(StubError(Severity::Fatal))];
        assert!(matches!(run(outcomes, 2), Err(RunError::SourceErr(_))));
    }

    #[test]
    fn tst_no_events() {
        let (hist, summary) = run(vec![Ok(dijet(1.))], 0).unwrap();
        assert_eq!(summary.attempted, 0);
        assert_eq!(hist.entries(), 0);
        assert_eq!(hist.nbins(), 1025);
    }
}
