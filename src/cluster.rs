use std::{
    fmt::{self, Display},
    str::FromStr,
};

use jetty::{anti_kt_f, cambridge_aachen_f, kt_f, Cluster, PseudoJet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder for an unknown jet algorithm
#[derive(Debug, Clone, Error)]
pub struct UnknownJetAlgorithm(String);

impl Display for UnknownJetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown jet algorithm: {}", self.0)
    }
}

impl FromStr for JetAlgorithm {
    type Err = UnknownJetAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anti_kt" | "antikt" | "anti-kt" => Ok(Self::AntiKt),
            "kt" => Ok(Self::Kt),
            "Cambridge/Aachen" | "Cambridge-Aachen" | "Cambridge_Aachen"
            | "cambridge/aachen" | "cambridge-aachen" | "cambridge_aachen" => {
                Ok(Self::CambridgeAachen)
            }
            _ => Err(UnknownJetAlgorithm(s.to_string())),
        }
    }
}

impl Display for JetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AntiKt => "anti-kt",
            Self::CambridgeAachen => "Cambridge/Aachen",
            Self::Kt => "kt",
        };
        f.write_str(name)
    }
}

/// Jet clustering algorithms
#[derive(
    Deserialize,
    Serialize,
    Debug,
    Default,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[default]
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    Kt,
}

/// Definition of a jet
///
/// Defined once per run and reused for every event.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: f64,
    /// Minimum jet transverse momentum
    pub min_pt: f64,
}

impl JetDefinition {
    /// Cluster `particles` and keep the jets above the minimum transverse momentum
    pub fn jets(&self, particles: Vec<PseudoJet>) -> Vec<PseudoJet> {
        inclusive_jets(cluster(particles, self), self.min_pt)
    }
}

/// Cluster the given `particles` into jets
///
/// All inclusive jets are returned, regardless of their transverse
/// momentum. The result only depends on the input momenta and the
/// algorithm and radius in `jet_def`.
pub fn cluster(
    particles: Vec<PseudoJet>,
    jet_def: &JetDefinition,
) -> Vec<PseudoJet> {
    let all = |_: PseudoJet| true;
    let r = jet_def.radius;
    match jet_def.algorithm {
        JetAlgorithm::AntiKt => particles.cluster_if(anti_kt_f(r), all),
        JetAlgorithm::Kt => particles.cluster_if(kt_f(r), all),
        JetAlgorithm::CambridgeAachen => {
            particles.cluster_if(cambridge_aachen_f(r), all)
        }
    }
}

/// Select jets with a transverse momentum of at least `min_pt`
///
/// The order of the jets is preserved.
pub fn inclusive_jets(jets: Vec<PseudoJet>, min_pt: f64) -> Vec<PseudoJet> {
    jets.into_iter().filter(|jet| jet.pt() >= min_pt).collect()
}
