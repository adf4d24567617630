use jetty::PseudoJet;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components
#[derive(
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Default,
)]
pub struct FourVector {
    pt: N64,
    p: [N64; 4],
}

impl FourVector {
    /// Four-momentum of a particle with the given mass, transverse
    /// momentum, rapidity, and azimuthal angle
    pub fn from_pt_rap_phi(pt: f64, rap: f64, phi: f64, m: f64) -> Self {
        let mt = (pt * pt + m * m).sqrt();
        [
            n64(mt * rap.cosh()),
            n64(pt * phi.cos()),
            n64(pt * phi.sin()),
            n64(mt * rap.sinh()),
        ]
        .into()
    }

    /// Energy component
    pub fn e(&self) -> N64 {
        self.p[0]
    }

    /// Momentum component along the x axis
    pub fn px(&self) -> N64 {
        self.p[1]
    }

    /// Momentum component along the y axis
    pub fn py(&self) -> N64 {
        self.p[2]
    }

    /// Momentum component along the beam axis
    pub fn pz(&self) -> N64 {
        self.p[3]
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> N64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> N64 {
        self.p.iter().skip(1).map(|e| *e * *e).sum()
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> N64 {
        self.pt
    }

    /// The rapidity 1/2 ln((v_0 + v_3)/(v_0 - v_3))
    ///
    /// Returns ±∞ for momenta along the beam axis.
    pub fn rap(&self) -> f64 {
        let e: f64 = self.e().into();
        let pz: f64 = self.pz().into();
        0.5 * ((e + pz) / (e - pz)).ln()
    }

    /// The azimuthal angle in (-π, π]
    pub fn phi(&self) -> f64 {
        let px: f64 = self.px().into();
        let py: f64 = self.py().into();
        py.atan2(px)
    }

    fn update_pt(&mut self) {
        self.pt = (self.p[1] * self.p[1] + self.p[2] * self.p[2]).sqrt();
    }

    /// The invariant mass \sqrt{v_0^2 - \sum v_i^2} with i = 1,2,3
    ///
    /// Negative mass squares from rounding give zero.
    pub fn m(&self) -> N64 {
        self.m_sq().max(n64(0.)).sqrt()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> N64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// Multiply all components with a common factor
    pub fn rescale(&mut self, factor: N64) {
        for p in &mut self.p {
            *p *= factor;
        }
        self.update_pt();
    }
}

impl std::convert::From<[N64; 4]> for FourVector {
    fn from(p: [N64; 4]) -> FourVector {
        let mut res = FourVector {
            p,
            pt: std::default::Default::default(),
        };
        res.update_pt();
        res
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl From<PseudoJet> for FourVector {
    fn from(p: PseudoJet) -> Self {
        [p.e(), p.px(), p.py(), p.pz()].into()
    }
}

impl From<FourVector> for PseudoJet {
    fn from(p: FourVector) -> Self {
        (&p).into()
    }
}

impl From<&FourVector> for PseudoJet {
    fn from(p: &FourVector) -> Self {
        [p[0], p[1], p[2], p[3]].into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tst_pt_rap_phi() {
        let p = FourVector::from_pt_rap_phi(30., 0.5, 1.2, 0.);
        assert!((p.pt() - 30.).abs() < 1e-12);
        assert!((p.rap() - 0.5).abs() < 1e-12);
        assert!((p.phi() - 1.2).abs() < 1e-12);
        assert!(p.m_sq().abs() < 1e-9);
    }

    #[test]
    fn tst_massive() {
        let m = 0.13957;
        let p = FourVector::from_pt_rap_phi(1., -2., -3., m);
        assert!((p.m() - m).abs() < 1e-9);
        assert!((p.rap() + 2.).abs() < 1e-12);
    }

    #[test]
    fn tst_pseudojet_conversion() {
        let p: FourVector = [n64(50.), n64(30.), n64(0.), n64(40.)].into();
        let jet = PseudoJet::from(p);
        assert_eq!(jet.e(), p.e());
        assert_eq!(jet.px(), p.px());
        assert_eq!(jet.py(), p.py());
        assert_eq!(jet.pz(), p.pz());
        assert_eq!(FourVector::from(jet), p);
    }
}
