use crate::constants::ALPHAS_MZ;
use crate::error::{Error, Result};
use crate::phase_space_generator::CosThetaMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// `p p -> H` through `gg`, `b b̄` and flavour-changing `q b̄`
    Resonant,
    /// `p p -> H b` through `q g`
    Associated,
    /// `p p -> H⁺ b` through `u g`, `c g` and `p p -> H⁻ t` through `b g`
    Charged,
}

impl Process {
    pub fn is_resonant(&self) -> bool {
        *self == Process::Resonant
    }
}

impl FromStr for Process {
    type Err = Error;

    fn from_str(s: &str) -> Result<Process> {
        match s {
            "resonant" => Ok(Process::Resonant),
            "associated" => Ok(Process::Associated),
            "charged" => Ok(Process::Charged),
            _ => Err(Error::InvalidArgument {
                name: "process".to_owned(),
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Resonant => write!(f, "p p --> H"),
            Process::Associated => write!(f, "p p --> H b"),
            Process::Charged => write!(f, "p p --> H+ b, H- t"),
        }
    }
}

/// Run settings. Every field has a default, so a card only needs to list
/// what it overrides.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunCard {
    /// proton-proton CM energy in GeV
    pub collider_energy: f64,
    pub pdf_set: String,
    pub alphas_mz: f64,
    pub n_iterations: usize,
    pub batch_size: usize,
    /// 0 uses all available cores
    pub cores: usize,
    pub seed: u64,
    pub process: Process,
    /// total width as a fraction of the mass
    pub width_ratio: f64,
    /// width of the importance-sampling map as a fraction of the mass,
    /// defaults to the physical width for the resonant process
    pub sampler_width_ratio: Option<f64>,
    /// lower end of the `√ŝ` window as a fraction of the mass
    pub q_min_ratio: f64,
    /// renormalisation and factorisation scale as a fraction of the mass
    pub scale_ratio: f64,
    /// K-factor of the gluon fusion channel
    pub k_gg: f64,
    /// length of the sampled `cos θ` interval, starting at -1
    pub cos_theta_range: f64,
    /// distribution of the sampled `cos θ` in the `2 -> 2` processes
    pub cos_theta_map: CosThetaMap,
    /// add the configurations with the beams swapped for non-symmetric channels
    pub mirror_initial_states: bool,
}

impl Default for RunCard {
    fn default() -> RunCard {
        RunCard {
            collider_energy: 14000.,
            pdf_set: "toy".to_owned(),
            alphas_mz: ALPHAS_MZ,
            n_iterations: 8_500_000,
            batch_size: 100_000,
            cores: 0,
            seed: 1,
            process: Process::Resonant,
            width_ratio: 1e-4,
            sampler_width_ratio: None,
            q_min_ratio: 0.5,
            scale_ratio: 1.,
            k_gg: 2.5,
            cos_theta_range: 2.,
            cos_theta_map: CosThetaMap::Propagator,
            mirror_initial_states: true,
        }
    }
}

impl RunCard {
    pub fn from_file<P: AsRef<Path>>(filename: P) -> Result<RunCard> {
        let f = File::open(filename)?;
        let reader = BufReader::new(f);
        let card: RunCard = serde_yaml::from_reader(reader)?;
        card.validate()?;
        Ok(card)
    }

    pub fn from_yaml(s: &str) -> Result<RunCard> {
        let card: RunCard = serde_yaml::from_str(s)?;
        card.validate()?;
        Ok(card)
    }

    pub fn s_beam(&self) -> f64 {
        self.collider_energy * self.collider_energy
    }

    /// Width used by the `ŝ` importance-sampling map for a scalar of mass `m`.
    pub fn sampler_width(&self, m: f64) -> f64 {
        match (self.sampler_width_ratio, self.process) {
            (Some(r), _) => m * r,
            (None, Process::Resonant) => m * self.width_ratio,
            (None, _) => 0.5 * m,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("collider_energy", self.collider_energy),
            ("alphas_mz", self.alphas_mz),
            ("width_ratio", self.width_ratio),
            ("scale_ratio", self.scale_ratio),
            ("cos_theta_range", self.cos_theta_range),
        ];
        for (name, v) in positive.iter() {
            if !(v.is_finite() && *v > 0.) {
                return Err(Error::InvalidParameter(format!("{} must be positive, got {}", name, v)));
            }
        }

        if let Some(r) = self.sampler_width_ratio {
            if !(r > 0.) {
                return Err(Error::InvalidParameter(format!(
                    "sampler_width_ratio must be positive, got {}",
                    r
                )));
            }
        }
        if self.cos_theta_range > 2. {
            return Err(Error::InvalidParameter(format!(
                "cos_theta_range cannot exceed 2, got {}",
                self.cos_theta_range
            )));
        }
        if self.q_min_ratio < 0. || self.k_gg < 0. {
            return Err(Error::InvalidParameter(
                "q_min_ratio and k_gg cannot be negative".to_owned(),
            ));
        }
        if self.n_iterations == 0 || self.batch_size == 0 {
            return Err(Error::InvalidParameter(
                "n_iterations and batch_size must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_card_keeps_defaults() {
        let card = RunCard::from_yaml("n_iterations: 1000\nprocess: associated\nseed: 42\n").unwrap();
        assert_eq!(card.n_iterations, 1000);
        assert_eq!(card.process, Process::Associated);
        assert_eq!(card.seed, 42);
        assert_eq!(card.collider_energy, 14000.);
        assert_eq!(card.sampler_width(125.), 62.5);
    }

    #[test]
    fn resonant_sampler_follows_physical_width() {
        let card = RunCard::default();
        assert!((card.sampler_width(125.) - 0.0125).abs() < 1e-15);

        let card = RunCard::from_yaml("sampler_width_ratio: 1.0").unwrap();
        assert_eq!(card.sampler_width(125.), 125.);
    }

    #[test]
    fn rejects_bad_cards() {
        assert!(matches!(RunCard::from_yaml("width_ratio: -1"), Err(Error::InvalidParameter(_))));
        assert!(matches!(RunCard::from_yaml("cos_theta_range: 3"), Err(Error::InvalidParameter(_))));
        assert!(matches!(RunCard::from_yaml("n_iterations: 0"), Err(Error::InvalidParameter(_))));
        assert!(matches!(RunCard::from_yaml("no_such_field: 1"), Err(Error::RunCard(_))));
        assert!(matches!(RunCard::from_file("/nonexistent/card.yaml"), Err(Error::Io(_))));
    }

    #[test]
    fn cos_theta_map_from_card() {
        assert_eq!(RunCard::default().cos_theta_map, CosThetaMap::Propagator);
        let card = RunCard::from_yaml("process: charged\ncos_theta_map: flat\n").unwrap();
        assert_eq!(card.cos_theta_map, CosThetaMap::Flat);
        assert_eq!(card.sampler_width(300.), 150.);
        assert!(matches!(RunCard::from_yaml("cos_theta_map: peaked"), Err(Error::RunCard(_))));
    }

    #[test]
    fn process_from_str() {
        assert_eq!("resonant".parse::<Process>().unwrap(), Process::Resonant);
        assert_eq!("charged".parse::<Process>().unwrap(), Process::Charged);
        assert_eq!(Process::Charged.to_string(), "p p --> H+ b, H- t");
        assert!(!Process::Charged.is_resonant());
        assert!("higgs".parse::<Process>().is_err());
    }
}
