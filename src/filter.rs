use jetty::PseudoJet;

use crate::event::Event;

/// Momenta of all final-state particles in `event`
///
/// Particles are visited once in the order of the event record, and
/// the output keeps that order. Only the momentum is kept; identity
/// and status are dropped. Events without final-state particles give
/// an empty vector.
pub fn select_final_state(event: &Event) -> Vec<PseudoJet> {
    event
        .particles()
        .iter()
        .filter(|p| p.is_final())
        .map(|p| PseudoJet::from(&p.p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use noisy_float::prelude::*;
    use particle_id::ParticleID;

    use crate::{
        event::{EventBuilder, Status},
        four_vector::FourVector,
    };

    fn event() -> Event {
        let mut ev = EventBuilder::new(0);
        let beam = FourVector::from([n64(3500.), n64(0.), n64(0.), n64(3500.)]);
        ev.add_particle(ParticleID::new(2212), Status(-12), beam);
        for (n, pt) in [10., 20., 30.].into_iter().enumerate() {
            let p = FourVector::from_pt_rap_phi(pt, 0.1 * n as f64, 0., 0.);
            ev.add_particle(ParticleID::new(211), Status(83), p);
            ev.add_particle(ParticleID::new(21), Status(-23), p);
        }
        ev.build()
    }

    fn pts(momenta: &[PseudoJet]) -> Vec<N64> {
        momenta.iter().map(|p| p.pt()).collect()
    }

    #[test]
    fn tst_keeps_final_state_in_order() {
        let selected = select_final_state(&event());
        assert_eq!(selected.len(), 3);
        for (sel, pt) in selected.iter().zip([10., 20., 30.]) {
            assert!((sel.pt() - pt).abs() < 1e-9);
        }
    }

    #[test]
    fn tst_idempotent() {
        let first = select_final_state(&event());
        let mut rebuilt = EventBuilder::new(1);
        for p in &first {
            rebuilt.add_particle(ParticleID::new(211), Status(1), FourVector::from(p.clone()));
        }
        let second = select_final_state(&rebuilt.build());
        assert_eq!(pts(&first), pts(&second));
    }

    #[test]
    fn tst_no_final_state() {
        let mut ev = EventBuilder::new(0);
        let p = FourVector::from_pt_rap_phi(30., 0., 0., 0.);
        ev.add_particle(ParticleID::new(21), Status(-23), p);
        assert!(select_final_state(&ev.build()).is_empty());
        assert!(select_final_state(&Event::new()).is_empty());
    }
}
