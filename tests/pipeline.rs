use genjets::{
    event::{CrossSection, Event, EventBuilder, Status},
    four_vector::FourVector,
    generator::GenerationError,
    histogram::Histogram1D,
    prelude::*,
    run::RunSummary,
    writer::InMemory,
};
use noisy_float::prelude::*;
use particle_id::ParticleID;

const PION: i32 = 211;

// Replays fixed events, then produces empty ones
struct StubSource {
    events: std::vec::IntoIter<Event>,
}

impl StubSource {
    fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into_iter(),
        }
    }
}

impl EventSource for StubSource {
    type Error = GenerationError;

    fn next_event(&mut self) -> Result<Event, Self::Error> {
        Ok(self.events.next().unwrap_or_default())
    }

    fn sigma_gen(&self) -> CrossSection {
        CrossSection {
            mean: 0.25,
            err: 0.01,
        }
    }
}

// three collinear final-state pions forming a single jet with pT 30 GeV
fn one_jet_event() -> Event {
    let mut ev = EventBuilder::new(0);
    ev.weight(n64(1.));
    let beam = FourVector::from([n64(3500.), n64(0.), n64(0.), n64(3500.)]);
    ev.add_particle(ParticleID::new(2212), Status(-12), beam);
    for rap in [0., 0.1, 0.2] {
        let p = FourVector::from_pt_rap_phi(10., rap, 0., 0.);
        ev.add_particle(ParticleID::new(PION), Status(83), p);
    }
    ev.build()
}

fn config(nevents: u64) -> RunConfig {
    let generator = GeneratorSettings::builder()
        .e_cm(7000.)
        .pt_hat_min(25.)
        .build();
    RunConfig::builder()
        .nevents(nevents)
        .generator(generator)
        .jet_radius(0.4)
        .build()
}

fn run_stub(events: Vec<Event>, nevents: u64) -> (Histogram1D, RunSummary) {
    let mut out = None;
    let res = RunBuilder::from_config(
        &config(nevents),
        StubSource::new(events),
        InMemory(&mut out),
    )
    .build()
    .run();
    let (hist, summary) = res.unwrap();
    assert_eq!(out.as_ref(), Some(&hist));
    (hist, summary)
}

#[test]
fn single_jet_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let outfile = dir.path().join("output").join("basic_pythia.yoda");
    let writer = FileWriter::builder()
        .filename(outfile.clone())
        .build()
        .open()
        .unwrap();
    let (hist, summary) = RunBuilder::from_config(
        &config(1),
        StubSource::new(vec![one_jet_event()]),
        writer,
    )
    .build()
    .run()
    .unwrap();

    assert_eq!(summary.attempted, 1);
    assert_eq!(summary.jets, 1);
    assert_eq!(summary.sigma.mean, 0.25);
    assert_eq!(hist.content_at(30.), 1.);
    assert_eq!(hist.integral(), 1.);
    assert_eq!(hist.entries(), 1);
    let nonempty = hist.bins().iter().filter(|b| b.entries > 0).count();
    assert_eq!(nonempty, 1);
    assert_eq!(hist.underflow().entries, 0);
    assert_eq!(hist.overflow().entries, 0);

    let yoda = std::fs::read_to_string(outfile).unwrap();
    assert_eq!(yoda.matches("BEGIN YODA_HISTO1D_V2").count(), 1);
    assert!(yoda.contains("Path: /Jet pT"));
}

#[test]
fn no_events() {
    let (hist, summary) = run_stub(vec![one_jet_event()], 0);
    assert_eq!(summary.attempted, 0);
    assert_eq!(hist.entries(), 0);
    assert_eq!(hist.integral(), 0.);
}

#[test]
fn soft_particle_gives_no_jets() {
    let mut ev = EventBuilder::new(0);
    let p = FourVector::from_pt_rap_phi(5., 0.3, 1., 0.);
    ev.add_particle(ParticleID::new(PION), Status(83), p);
    let (hist, summary) = run_stub(vec![ev.build()], 1);
    assert_eq!(summary.jets, 0);
    assert_eq!(summary.without_jets, 1);
    assert_eq!(hist.entries(), 0);
}

#[test]
fn weights_and_jet_multiplicity() {
    let mut ev = EventBuilder::new(0);
    ev.weight(n64(0.5));
    for phi in [0., 2., 4.] {
        let p = FourVector::from_pt_rap_phi(50., 0., phi, 0.);
        ev.add_particle(ParticleID::new(PION), Status(83), p);
    }
    let events = vec![ev.build(), Event::new(), one_jet_event()];
    let (hist, summary) = run_stub(events, 3);
    assert_eq!(summary.empty, 1);
    assert_eq!(summary.jets, 4);
    assert_eq!(hist.entries(), 4);
    assert!((hist.integral() - 2.5).abs() < 1e-12);
}

#[test]
fn deterministic_stub() {
    let events = vec![one_jet_event(), one_jet_event()];
    assert_eq!(run_stub(events.clone(), 2), run_stub(events, 2));
}

#[test]
fn deterministic_toy_generator() {
    let run = || {
        let config = config(200);
        let mut settings = config.generator.clone();
        settings.seed = Some(42);
        let generator = ToyGenerator::new(settings).unwrap();
        let mut out = None;
        let (hist, summary) =
            RunBuilder::from_config(&config, generator, InMemory(&mut out))
                .build()
                .run()
                .unwrap();
        assert_eq!(summary.attempted, 200);
        (hist, summary)
    };
    let (hist, summary) = run();
    assert!(hist.entries() > 0);
    assert!(summary.sigma.mean > 0.);
    assert_eq!((hist, summary), run());
}
