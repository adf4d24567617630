//! A seeded toy generator for QCD dijet events
//!
//! The generator mimics the event record of a full shower Monte Carlo
//! run with hard QCD processes: a hard 2 -> 2 parton scattering with a
//! steeply falling transverse momentum spectrum, optional final-state
//! splittings, collimated hadrons along each outgoing parton, a soft
//! underlying event, and beam remnants. Only the qualitative features
//! are modelled. Absolute rates are order-of-magnitude estimates.
use std::f64::consts::PI;

use log::{debug, trace};
use noisy_float::prelude::*;
use particle_id::ParticleID;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use thiserror::Error;

use crate::{
    event::{CrossSection, Event, EventBuilder, Status},
    four_vector::FourVector,
    settings::{GeneratorSettings, SettingsError, DEFAULT_SEED},
    traits::{Classify, EventSource, Severity},
};

/// Maximum number of rejected phase space points per event
pub const MAX_TRIES: u64 = 10_000;

// dσ/dpT ∝ pT^-PT_POWER
const PT_POWER: f64 = 5.;
// the spectrum is regulated below this transverse momentum
const MIN_PT_HAT: f64 = 2.;
// hard cross section without parton luminosity suppression
const SIGMA_REF_MB: f64 = 0.5;
const SIGMA_REF_PT: f64 = 25.;
const MAX_RAP: f64 = 5.;
// parton luminosity ∝ (1 - x)^LUMI_POWER for each beam
const LUMI_POWER: i32 = 4;

const FSR_PROBABILITY: f64 = 0.3;
const MIN_SPLIT_ANGLE: f64 = 0.05;
const MAX_SPLIT_ANGLE: f64 = 0.5;
const MIN_HADRONS: usize = 2;
const MAX_HADRONS: usize = 6;
const HADRON_SPREAD: f64 = 0.08;
const MIN_UE_HADRONS: usize = 5;
const MAX_UE_HADRONS: usize = 20;
const UE_MEAN_PT: f64 = 0.7;
const REMNANT_MEAN_PT: f64 = 0.3;

const SYSTEM: i32 = 90;
const PROTON: i32 = 2212;
const GLUON: i32 = 21;
const DIQUARK: i32 = 2101;
const PROTON_MASS: f64 = 0.938272;

const PARTONS: [i32; 10] = [21, 21, 21, 21, 2, 1, -2, -1, 3, -3];
const HADRONS: [(i32, f64); 7] = [
    (211, 0.13957),
    (-211, 0.13957),
    (211, 0.13957),
    (-211, 0.13957),
    (22, 0.),
    (321, 0.493677),
    (-321, 0.493677),
];

// Status codes of the event record
const STATUS_SYSTEM: Status = Status(-11);
const STATUS_BEAM: Status = Status(-12);
const STATUS_INCOMING: Status = Status(-21);
const STATUS_OUTGOING: Status = Status(-23);
const STATUS_FSR_MOTHER_SIDE: Status = Status(-51);
const STATUS_FSR_EMISSION: Status = Status(-52);
const STATUS_REMNANT: Status = Status(-63);
const STATUS_JET_HADRON: Status = Status(83);
const STATUS_SOFT_HADRON: Status = Status(84);

/// Power law `x^-power` truncated to `[low, high]`
#[derive(Copy, Clone, Debug, PartialEq)]
struct PowerLaw {
    power: f64,
    low: f64,
    high: f64,
}

impl PowerLaw {
    fn exponent(&self) -> f64 {
        1. - self.power
    }

    fn is_logarithmic(&self) -> bool {
        self.exponent().abs() < 1e-12
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.gen();
        if self.is_logarithmic() {
            return self.low * (self.high / self.low).powf(u);
        }
        let k = self.exponent();
        let (a, b) = (self.low.powf(k), self.high.powf(k));
        (a + u * (b - a)).powf(1. / k).clamp(self.low, self.high)
    }

    /// Normalised probability density
    fn density(&self, x: f64) -> f64 {
        let norm = if self.is_logarithmic() {
            (self.high / self.low).ln()
        } else {
            let k = self.exponent();
            (self.high.powf(k) - self.low.powf(k)) / k
        };
        x.powf(-self.power) / norm
    }
}

/// Kinematics of an accepted hard scattering
#[derive(Copy, Clone, Debug, PartialEq)]
struct HardProcess {
    pt: f64,
    rap: [f64; 2],
    phi: f64,
    x: [f64; 2],
    weight: f64,
}

// Direction of a massless parton after the hard process
#[derive(Copy, Clone, Debug, PartialEq)]
struct Parton {
    pt: f64,
    rap: f64,
    phi: f64,
}

/// Toy generator for QCD dijet events
///
/// With `PhaseSpace:bias2Selection = on` hard transverse momenta are
/// sampled from a spectrum enhanced by `(pT / pTRef)^pow` and events
/// carry the compensating weight `(pTRef / pT)^pow`.
#[derive(Clone, Debug)]
pub struct ToyGenerator<R = Xoshiro256Plus> {
    settings: GeneratorSettings,
    rng: R,
    spectrum: PowerLaw,
    proposal: PowerLaw,
    sigma_max: f64,
    ntried: u64,
    sum_wt: f64,
    sum_wt2: f64,
    nevents: usize,
}

impl ToyGenerator {
    /// Set up a generator seeded with `Random:seed`, or a fixed
    /// default seed if none is set
    pub fn new(settings: GeneratorSettings) -> Result<Self, SettingsError> {
        let seed = settings.seed.unwrap_or(DEFAULT_SEED);
        debug!("Seeding toy generator with {seed}");
        Self::with_rng(settings, Xoshiro256Plus::seed_from_u64(seed))
    }
}

impl<R: Rng> ToyGenerator<R> {
    pub fn with_rng(
        settings: GeneratorSettings,
        rng: R,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let low = settings.pt_hat_min.max(MIN_PT_HAT);
        let high = settings.e_cm / 2.;
        if low >= high {
            return Err(SettingsError::Inconsistent(format!(
                "collision energy {} GeV is too low for hard scattering",
                settings.e_cm
            )));
        }
        let spectrum = PowerLaw {
            power: PT_POWER,
            low,
            high,
        };
        let proposal = if settings.bias2_selection {
            PowerLaw {
                power: PT_POWER - settings.bias2_selection_pow,
                ..spectrum
            }
        } else {
            spectrum
        };
        let sigma_max =
            SIGMA_REF_MB * (SIGMA_REF_PT / low).powf(PT_POWER - 1.);
        debug!("Toy generator initialised with PDF set {}", settings.pdf);
        debug!("Hard transverse momentum range: [{low}, {high}] GeV");
        Ok(Self {
            settings,
            rng,
            spectrum,
            proposal,
            sigma_max,
            ntried: 0,
            sum_wt: 0.,
            sum_wt2: 0.,
            nevents: 0,
        })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Number of sampled phase space points so far
    pub fn ntried(&self) -> u64 {
        self.ntried
    }

    fn try_hard_process(&mut self) -> Option<HardProcess> {
        self.ntried += 1;
        let pt = self.proposal.sample(&mut self.rng);
        let rap = [
            self.rng.gen_range(-MAX_RAP..MAX_RAP),
            self.rng.gen_range(-MAX_RAP..MAX_RAP),
        ];
        let phi = self.rng.gen_range(0. ..2. * PI);
        let xt = pt / self.settings.e_cm;
        let x = [
            xt * (rap[0].exp() + rap[1].exp()),
            xt * ((-rap[0]).exp() + (-rap[1]).exp()),
        ];
        if x[0] >= 1. || x[1] >= 1. {
            return None;
        }
        let lumi = ((1. - x[0]) * (1. - x[1])).powi(LUMI_POWER);
        if self.rng.gen::<f64>() >= lumi {
            return None;
        }
        let wt = self.spectrum.density(pt) / self.proposal.density(pt);
        self.sum_wt += wt;
        self.sum_wt2 += wt * wt;
        let weight = if self.settings.bias2_selection {
            (self.settings.bias2_selection_ref / pt)
                .powf(self.settings.bias2_selection_pow)
        } else {
            1.
        };
        Some(HardProcess {
            pt,
            rap,
            phi,
            x,
            weight,
        })
    }

    fn build_event(&mut self, hard: &HardProcess) -> Event {
        let half = self.settings.e_cm / 2.;
        let mut ev = EventBuilder::with_capacity(self.nevents, 64);
        self.nevents += 1;
        ev.weight(n64(hard.weight));

        ev.add_particle(
            ParticleID::new(SYSTEM),
            STATUS_SYSTEM,
            momentum(2. * half, 0., 0., 0.),
        );
        for dir in [1., -1.] {
            ev.add_particle(
                ParticleID::new(PROTON),
                STATUS_BEAM,
                momentum(half, 0., 0., dir * half),
            );
        }

        let flavours = [self.parton_flavour(), self.parton_flavour()];
        for ((id, x), dir) in flavours.iter().zip(hard.x).zip([1., -1.]) {
            let e = x * half;
            ev.add_particle(
                ParticleID::new(*id),
                STATUS_INCOMING,
                momentum(e, 0., 0., dir * e),
            );
        }
        let outgoing = [
            Parton {
                pt: hard.pt,
                rap: hard.rap[0],
                phi: hard.phi,
            },
            Parton {
                pt: hard.pt,
                rap: hard.rap[1],
                phi: hard.phi + PI,
            },
        ];
        for (id, parton) in flavours.iter().zip(outgoing) {
            ev.add_particle(
                ParticleID::new(*id),
                STATUS_OUTGOING,
                parton.momentum(),
            );
        }

        let mut partons = Vec::with_capacity(2 * outgoing.len());
        for (id, parton) in flavours.into_iter().zip(outgoing) {
            self.shower(&mut ev, ParticleID::new(id), parton, &mut partons);
        }
        for parton in partons {
            self.hadronise(&mut ev, parton);
        }
        self.underlying_event(&mut ev);
        self.beam_remnants(&mut ev, hard);
        ev.build()
    }

    fn parton_flavour(&mut self) -> i32 {
        PARTONS[self.rng.gen_range(0..PARTONS.len())]
    }

    fn shower(
        &mut self,
        ev: &mut EventBuilder,
        id: ParticleID,
        parton: Parton,
        out: &mut Vec<Parton>,
    ) {
        if self.rng.gen::<f64>() >= FSR_PROBABILITY {
            out.push(parton);
            return;
        }
        let z = self.rng.gen_range(0.2..0.8);
        let angle = self.rng.gen_range(MIN_SPLIT_ANGLE..MAX_SPLIT_ANGLE);
        let alpha = self.rng.gen_range(0. ..2. * PI);
        let (drap, dphi) = (angle * alpha.cos(), angle * alpha.sin());
        // the pT-weighted axis of the pair stays along the mother
        let mother_side = Parton {
            pt: z * parton.pt,
            rap: parton.rap + (1. - z) * drap,
            phi: parton.phi + (1. - z) * dphi,
        };
        let emission = Parton {
            pt: (1. - z) * parton.pt,
            rap: parton.rap - z * drap,
            phi: parton.phi - z * dphi,
        };
        ev.add_particle(id, STATUS_FSR_MOTHER_SIDE, mother_side.momentum());
        ev.add_particle(
            ParticleID::new(GLUON),
            STATUS_FSR_EMISSION,
            emission.momentum(),
        );
        out.push(mother_side);
        out.push(emission);
    }

    fn hadronise(&mut self, ev: &mut EventBuilder, parton: Parton) {
        let nhadrons = self.rng.gen_range(MIN_HADRONS..=MAX_HADRONS);
        let fractions: Vec<f64> =
            (0..nhadrons).map(|_| self.rng.gen_range(0.1..1.)).collect();
        let norm: f64 = fractions.iter().sum();
        for z in fractions {
            let (id, m) = self.hadron_species();
            let rap = parton.rap
                + self.rng.gen_range(-HADRON_SPREAD..HADRON_SPREAD);
            let phi = parton.phi
                + self.rng.gen_range(-HADRON_SPREAD..HADRON_SPREAD);
            let p = FourVector::from_pt_rap_phi(z / norm * parton.pt, rap, phi, m);
            ev.add_particle(id, STATUS_JET_HADRON, p);
        }
    }

    fn underlying_event(&mut self, ev: &mut EventBuilder) {
        let nhadrons = self.rng.gen_range(MIN_UE_HADRONS..=MAX_UE_HADRONS);
        for _ in 0..nhadrons {
            let pt = self.exponential(UE_MEAN_PT);
            let rap = self.rng.gen_range(-MAX_RAP..MAX_RAP);
            let phi = self.rng.gen_range(0. ..2. * PI);
            let (id, m) = self.hadron_species();
            let p = FourVector::from_pt_rap_phi(pt, rap, phi, m);
            ev.add_particle(id, STATUS_SOFT_HADRON, p);
        }
    }

    fn beam_remnants(&mut self, ev: &mut EventBuilder, hard: &HardProcess) {
        let half = self.settings.e_cm / 2.;
        for (x, dir) in hard.x.into_iter().zip([1., -1.]) {
            let e = (1. - x) * half;
            ev.add_particle(
                ParticleID::new(DIQUARK),
                STATUS_REMNANT,
                momentum(e, 0., 0., dir * e),
            );
            let pt = self.exponential(REMNANT_MEAN_PT);
            let mt = (pt * pt + PROTON_MASS * PROTON_MASS).sqrt();
            if e <= mt {
                trace!("No forward nucleon for remnant energy {e} GeV");
                continue;
            }
            let pz = dir * (e * e - mt * mt).sqrt();
            let phi = self.rng.gen_range(0. ..2. * PI);
            ev.add_particle(
                ParticleID::new(PROTON),
                STATUS_SOFT_HADRON,
                momentum(e, pt * phi.cos(), pt * phi.sin(), pz),
            );
        }
    }

    fn hadron_species(&mut self) -> (ParticleID, f64) {
        let (id, m) = HADRONS[self.rng.gen_range(0..HADRONS.len())];
        (ParticleID::new(id), m)
    }

    fn exponential(&mut self, mean: f64) -> f64 {
        let u: f64 = self.rng.gen();
        -mean * (1. - u).ln()
    }
}

impl Parton {
    fn momentum(&self) -> FourVector {
        FourVector::from_pt_rap_phi(self.pt, self.rap, self.phi, 0.)
    }
}

fn momentum(e: f64, px: f64, py: f64, pz: f64) -> FourVector {
    FourVector::from([n64(e), n64(px), n64(py), n64(pz)])
}

impl<R: Rng> EventSource for ToyGenerator<R> {
    type Error = GenerationError;

    fn next_event(&mut self) -> Result<Event, Self::Error> {
        for _ in 0..MAX_TRIES {
            if let Some(hard) = self.try_hard_process() {
                trace!("Accepted hard process {hard:?}");
                return Ok(self.build_event(&hard));
            }
        }
        Err(GenerationError::MaxTriesExceeded(MAX_TRIES))
    }

    /// Cross section estimate from all phase space points tried so far
    fn sigma_gen(&self) -> CrossSection {
        if self.ntried == 0 {
            return CrossSection::default();
        }
        let n = self.ntried as f64;
        let mean = self.sum_wt / n;
        let var = (self.sum_wt2 / n - mean * mean).max(0.) / n;
        CrossSection {
            mean: self.sigma_max * mean,
            err: self.sigma_max * var.sqrt(),
        }
    }
}

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum GenerationError {
    #[error("No phase space point accepted after {0} tries")]
    MaxTriesExceeded(u64),
}

impl Classify for GenerationError {
    fn severity(&self) -> Severity {
        Severity::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> ToyGenerator {
        let settings = GeneratorSettings::builder().seed(Some(seed)).build();
        ToyGenerator::new(settings).unwrap()
    }

    #[test]
    fn tst_power_law() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        for power in [5., 1., 0.5] {
            let law = PowerLaw {
                power,
                low: 25.,
                high: 3500.,
            };
            for _ in 0..1000 {
                let x = law.sample(&mut rng);
                assert!((25. ..=3500.).contains(&x));
            }
            // trapezoidal integration of the density on a log grid
            let npoints = 10_000;
            let grid: Vec<f64> = (0..=npoints)
                .map(|i| 25. * (3500f64 / 25.).powf(i as f64 / npoints as f64))
                .collect();
            let integral: f64 = grid
                .windows(2)
                .map(|w| 0.5 * (w[1] - w[0]) * (law.density(w[0]) + law.density(w[1])))
                .sum();
            assert!((integral - 1.).abs() < 1e-3, "{integral}");
        }
    }

    #[test]
    fn tst_reproducible() {
        let mut gen1 = generator(7);
        let mut gen2 = generator(7);
        for _ in 0..20 {
            assert_eq!(gen1.next_event().unwrap(), gen2.next_event().unwrap());
        }
        assert_eq!(gen1.sigma_gen(), gen2.sigma_gen());

        let mut gen3 = generator(8);
        assert_ne!(generator(7).next_event().unwrap(), gen3.next_event().unwrap());
    }

    #[test]
    fn tst_event_record() {
        let mut gen = generator(3);
        for id in 0..50 {
            let ev = gen.next_event().unwrap();
            assert_eq!(ev.id(), id);
            assert_eq!(ev.weight, 1.);
            let particles = ev.particles();
            assert_eq!(particles[0].status, STATUS_SYSTEM);
            assert_eq!(particles[1].id, ParticleID::new(PROTON));
            assert_eq!(particles[2].status, STATUS_BEAM);
            let outgoing: Vec<_> = particles
                .iter()
                .filter(|p| p.status == STATUS_OUTGOING)
                .collect();
            assert_eq!(outgoing.len(), 2);
            assert!(outgoing.iter().all(|p| p.p.pt() >= 25.));
            assert!((outgoing[0].p.pt() - outgoing[1].p.pt()).abs() < 1e-6);
            let nfinal = particles.iter().filter(|p| p.is_final()).count();
            assert!(nfinal >= 2 * MIN_HADRONS + MIN_UE_HADRONS);
            for p in particles.iter().filter(|p| p.is_final()) {
                assert!(p.p.e() > 0.);
                assert!(p.p.e() < 7000.);
            }
        }
    }

    #[test]
    fn tst_sigma() {
        let mut gen = generator(11);
        assert_eq!(gen.sigma_gen(), CrossSection::default());
        for _ in 0..100 {
            gen.next_event().unwrap();
        }
        let sigma = gen.sigma_gen();
        assert!(gen.ntried() >= 100);
        assert!(sigma.mean > 0.);
        assert!(sigma.err > 0.);
        assert!(sigma.mean <= gen.sigma_max);
    }

    #[test]
    fn tst_bias() {
        let settings = GeneratorSettings::builder()
            .bias2_selection(true)
            .seed(Some(5))
            .build();
        let mut gen = ToyGenerator::new(settings).unwrap();
        for _ in 0..20 {
            let ev = gen.next_event().unwrap();
            let pt = ev
                .particles()
                .iter()
                .find(|p| p.status == STATUS_OUTGOING)
                .unwrap()
                .p
                .pt()
                .raw();
            let expected = (10. / pt).powi(4);
            assert!((ev.weight - expected).abs() < 1e-9 * expected);
        }
    }

    #[test]
    fn tst_invalid_settings() {
        let settings = GeneratorSettings::builder().e_cm(40.).build();
        assert!(ToyGenerator::new(settings).is_err());
        let settings = GeneratorSettings::builder()
            .e_cm(3.)
            .pt_hat_min(0.)
            .build();
        assert!(ToyGenerator::new(settings).is_err());
    }
}
