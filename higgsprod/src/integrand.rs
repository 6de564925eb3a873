use crate::couplings::CouplingSet;
use crate::error::{Error, Result};
use crate::matrix_elements::{Channel, Invariants, ScalarModel};
use crate::pdf::PdfProvider;
use crate::phase_space_generator::{
    CosThetaMap, InitialStates, PhaseSpacePoint, ResonanceSampler, TwoBodyGenerator, TwoBodyKinematics,
};
use crate::run_card::{Process, RunCard};
use rand::Rng;
use std::fmt;

/// Maximal number of random variables per point: `ŝ`, `y`, `cos θ`, `φ`.
pub const MAX_DIMENSIONS: usize = 4;

struct ChannelSetup {
    channel: Channel,
    generator: Option<TwoBodyGenerator>,
}

/// The hadronic integrand `Σ_channels L(x1, x2) σ̂ / (x1 x2)` times the
/// measure of the `(ρ, y)` map, for one scalar mass and coupling point.
///
/// Immutable after construction and shared by all workers.
pub struct Integrand<'a> {
    process: Process,
    channels: Vec<ChannelSetup>,
    model: ScalarModel,
    sampler: ResonanceSampler,
    pdf: &'a dyn PdfProvider,
    s_beam: f64,
    mu: f64,
    alpha_s: f64,
    k_gg: f64,
    mirror: bool,
}

impl<'a> Integrand<'a> {
    pub fn new(
        mass: f64,
        couplings: CouplingSet,
        run_card: &RunCard,
        pdf: &'a dyn PdfProvider,
    ) -> Result<Integrand<'a>> {
        if !(mass.is_finite() && mass > 0.) {
            return Err(Error::InvalidParameter(format!("scalar mass must be positive, got {}", mass)));
        }

        let s_beam = run_card.s_beam();
        let sampler = ResonanceSampler::new(
            mass * run_card.q_min_ratio,
            run_card.collider_energy,
            mass,
            run_card.sampler_width(mass),
            s_beam,
        )?;

        // fixed renormalisation and factorisation scale
        let mu = mass * run_card.scale_ratio;
        let alpha_s = pdf.alphas_q(mu);
        if !(alpha_s.is_finite() && alpha_s > 0.) {
            return Err(Error::Pdf(format!("alpha_s({}) = {} from {}", mu, alpha_s, pdf.name())));
        }

        let channels: &[Channel] = match run_card.process {
            Process::Resonant => &Channel::RESONANT,
            Process::Associated => &Channel::ASSOCIATED,
            Process::Charged => &Channel::CHARGED,
        };
        let channels = channels
            .iter()
            .map(|&channel| ChannelSetup {
                channel,
                generator: channel.two_body_masses().map(|(m_in, m_out)| {
                    TwoBodyGenerator::with_cos_range(mass, m_in, m_out, run_card.cos_theta_range)
                        .with_map(run_card.cos_theta_map)
                }),
            })
            .collect();

        if !run_card.process.is_resonant()
            && run_card.cos_theta_map == CosThetaMap::Flat
            && run_card.cos_theta_range >= TwoBodyGenerator::FULL_RANGE
        {
            warn!(
                "flat cos(theta) sampling does not resolve the quark exchange peak at cos(theta) = 1, \
                 the error estimate may be unreliable"
            );
        }

        debug!(
            "Integrand: m = {}, width = {}, mu = {}, alpha_s = {}, rho in {:?}",
            mass,
            mass * run_card.width_ratio,
            mu,
            alpha_s,
            sampler.bounds()
        );

        Ok(Integrand {
            process: run_card.process,
            channels,
            model: ScalarModel {
                couplings,
                mass,
                width: mass * run_card.width_ratio,
            },
            sampler,
            pdf,
            s_beam,
            mu,
            alpha_s,
            k_gg: run_card.k_gg,
            mirror: run_card.mirror_initial_states,
        })
    }

    pub fn get_dimensions(&self) -> usize {
        if self.process.is_resonant() {
            2
        } else {
            MAX_DIMENSIONS
        }
    }

    pub fn alpha_s(&self) -> f64 {
        self.alpha_s
    }

    pub fn model(&self) -> &ScalarModel {
        &self.model
    }

    pub fn sampler(&self) -> &ResonanceSampler {
        &self.sampler
    }

    /// Weight of one random point drawn from `rng`.
    pub fn evaluate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        let mut x = [0.; MAX_DIMENSIONS];
        for xi in x[..self.get_dimensions()].iter_mut() {
            *xi = rng.gen();
        }
        self.evaluate_at(&x[..self.get_dimensions()])
    }

    /// Weight at the unit-hypercube point `x = (u_ρ, u_y[, r_cos, r_φ])`.
    pub fn evaluate_at(&self, x: &[f64]) -> Result<f64> {
        self.check_dimensions(x)?;
        let (p, measure) = match self.phase_space_point(x) {
            Some(v) => v,
            None => return Ok(0.),
        };

        let mut wgt = 0.;
        for setup in &self.channels {
            wgt += self.channel_weight(setup, &p, x);
        }
        let wgt = wgt * measure / (p.x1 * p.x2);

        if !wgt.is_finite() {
            return Err(Error::NumericalDomain(format!(
                "weight {} at x = {:?} (shat = {}, x1 = {}, x2 = {})",
                wgt, x, p.shat, p.x1, p.x2
            )));
        }

        trace!("x = {:?}, shat = {:e}, weight = {:e}", x, p.shat, wgt);
        Ok(wgt)
    }

    /// Per-channel decomposition of the weight at `x`.
    pub fn inspect(&self, x: &[f64]) -> Result<Inspection> {
        self.check_dimensions(x)?;

        let (p, measure) = match self.phase_space_point(x) {
            Some(v) => v,
            None => {
                return Ok(Inspection {
                    point: None,
                    final_state: None,
                    channels: vec![],
                    total: 0.,
                })
            }
        };

        let channels = self
            .channels
            .iter()
            .map(|setup| {
                (
                    setup.channel,
                    self.channel_weight(setup, &p, x) * measure / (p.x1 * p.x2),
                )
            })
            .collect();

        // q g -> H b seen from the lab, for the first channel that is open
        let final_state = self
            .channels
            .iter()
            .filter_map(|setup| setup.generator.as_ref())
            .find(|gen| p.shat >= gen.threshold())
            .map(|gen| gen.kinematics(p.shat, x[2], x[3]).to_lab(p.y));

        Ok(Inspection {
            point: Some(p),
            final_state,
            channels,
            total: self.evaluate_at(x)?,
        })
    }

    fn check_dimensions(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.get_dimensions() {
            return Err(Error::InvalidParameter(format!(
                "the point has {} coordinates, the integrand has {} dimensions",
                x.len(),
                self.get_dimensions()
            )));
        }
        Ok(())
    }

    fn phase_space_point(&self, x: &[f64]) -> Option<(PhaseSpacePoint, f64)> {
        let rho = self.sampler.at(x[0]);
        let shat = self.sampler.shat(rho);
        let p = InitialStates::new(self.s_beam, shat).at(x[1]);
        if p.is_degenerate() {
            return None;
        }

        let measure = self.sampler.jacobian(rho) * self.sampler.interval_width() * p.delta_y;
        Some((p, measure))
    }

    /// `L(x1, x2) σ̂` of one channel, including the `cos θ` measure.
    fn channel_weight(&self, setup: &ChannelSetup, p: &PhaseSpacePoint, x: &[f64]) -> f64 {
        let mut inv = Invariants {
            s_hat: p.shat,
            t_hat: 0.,
            alpha_s: self.alpha_s,
        };

        let mut wgt = 1.;
        if let Some(gen) = &setup.generator {
            if p.shat < gen.threshold() {
                return 0.;
            }
            let (k, dcos) = gen.point(p.shat, x[2], x[3]);
            inv.t_hat = k.t_hat();
            wgt *= dcos;
        }

        let sigma_hat = setup.channel.sigma_hat(&self.model, &inv);
        if sigma_hat == 0. {
            return 0.;
        }

        let mut lumi = setup.channel.luminosity(self.pdf, p.x1, p.x2, self.mu, false);
        if self.mirror && !setup.channel.is_resonant() {
            lumi += setup.channel.luminosity(self.pdf, p.x1, p.x2, self.mu, true);
        }

        if setup.channel == Channel::GluonFusion {
            wgt *= self.k_gg;
        }

        wgt * lumi * sigma_hat
    }
}

/// Breakdown of a single point, printed by `--inspect`.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub point: Option<PhaseSpacePoint>,
    /// Lab-frame momenta of the associated final state.
    pub final_state: Option<TwoBodyKinematics>,
    pub channels: Vec<(Channel, f64)>,
    pub total: f64,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = match &self.point {
            Some(p) => p,
            None => return writeln!(f, "Degenerate point: shat is above the collider energy"),
        };

        writeln!(f, " shat = {:.16e}", p.shat)?;
        writeln!(f, " Bjorken x's: {:.16e}, {:.16e} (y = {:.6})", p.x1, p.x2, p.y)?;
        if let Some(k) = &self.final_state {
            writeln!(f, " H: y = {:.6}, pT = {:.6} GeV", k.k2.rapidity(), k.k2.pt())?;
            writeln!(
                f,
                " b: eta = {:.6}, phi = {:.6}, dR(H, b) = {:.6}",
                k.p2.pseudo_rap(),
                k.p2.phi(),
                k.k2.delta_r(&k.p2)
            )?;
        }
        writeln!(f, " ------------------------------------------------------------")?;
        for (channel, wgt) in &self.channels {
            writeln!(f, " {:<40}{:20.10e}", format!("{:?}", channel), wgt)?;
        }
        writeln!(f, " ------------------------------------------------------------")?;
        writeln!(f, " {:<40}{:20.10e}", "Total", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::ToyPdf;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn card(process: Process) -> RunCard {
        RunCard {
            process,
            ..RunCard::default()
        }
    }

    #[test]
    fn weights_are_finite_and_non_negative() {
        let pdf = ToyPdf::default();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        for &process in &[Process::Resonant, Process::Associated, Process::Charged] {
            let c = CouplingSet::new(2., 0.3).unwrap();
            let integrand = Integrand::new(300., c, &card(process), &pdf).unwrap();
            for _ in 0..2000 {
                let w = integrand.evaluate(&mut rng).unwrap();
                assert!(w.is_finite() && w >= 0.);
            }
        }
    }

    #[test]
    fn inspection_adds_up() {
        let pdf = ToyPdf::default();
        let c = CouplingSet::new(2., 0.3).unwrap();
        let integrand = Integrand::new(300., c, &card(Process::Associated), &pdf).unwrap();
        let x = [0.6, 0.4, 0.3, 0.7];
        let insp = integrand.inspect(&x).unwrap();
        let sum: f64 = insp.channels.iter().map(|(_, w)| w).sum();
        assert_eq!(insp.channels.len(), 3);
        assert_relative_eq!(sum, insp.total, max_relative = 1e-12);
        assert!(insp.total > 0.);
        assert!(format!("{}", insp).contains("Total"));

        // the Higgs rapidity in the lab is shifted by that of the partonic system
        let k = insp.final_state.unwrap();
        let p = insp.point.unwrap();
        let cm = TwoBodyGenerator::new(300., 0., crate::constants::MB)
            .with_map(CosThetaMap::Propagator)
            .kinematics(p.shat, x[2], x[3]);
        assert_relative_eq!(k.k2.rapidity(), cm.k2.rapidity() + p.y, epsilon = 1e-9);
        assert_relative_eq!(k.k2.pt(), k.p2.pt(), max_relative = 1e-9);

        assert!(integrand.inspect(&x[..2]).is_err());
    }

    #[test]
    fn short_points_are_rejected() {
        let pdf = ToyPdf::default();
        let c = CouplingSet::new(2., 0.3).unwrap();
        let associated = Integrand::new(300., c.clone(), &card(Process::Associated), &pdf).unwrap();
        assert!(matches!(associated.evaluate_at(&[0.5, 0.5]), Err(Error::InvalidParameter(_))));
        assert!(associated.evaluate_at(&[0.5, 0.5, 0.5, 0.5]).is_ok());

        let resonant = Integrand::new(125., c, &card(Process::Resonant), &pdf).unwrap();
        assert!(matches!(resonant.evaluate_at(&[0.5]), Err(Error::InvalidParameter(_))));
        assert!(resonant.evaluate_at(&[0.5, 0.5, 0.5]).is_err());
    }

    #[test]
    fn charged_process_reaches_the_top_channel() {
        let pdf = ToyPdf::default();
        let c = CouplingSet::new(5., 0.2).unwrap();
        let integrand = Integrand::new(300., c, &card(Process::Charged), &pdf).unwrap();
        assert_eq!(integrand.get_dimensions(), 4);

        // √ŝ well above m_H + m_t
        let mut x = [0.9, 0.5, 0.4, 0.2];
        while integrand.sampler().shat(integrand.sampler().at(x[0])) < 800f64.powi(2) {
            x[0] = 0.5 * (1. + x[0]);
        }
        let insp = integrand.inspect(&x).unwrap();
        assert_eq!(insp.channels.len(), 3);
        for (channel, w) in &insp.channels {
            assert!(*w > 0., "{:?} is closed", channel);
        }
        let sum: f64 = insp.channels.iter().map(|(_, w)| w).sum();
        assert_relative_eq!(sum, insp.total, max_relative = 1e-12);
    }

    #[test]
    fn mirroring_adds_the_swapped_beams() {
        let pdf = ToyPdf::default();
        let c = CouplingSet::new(2., 0.3).unwrap();
        let x = [0.6, 0.2, 0.3, 0.7];

        let with = Integrand::new(300., c.clone(), &card(Process::Associated), &pdf)
            .unwrap()
            .evaluate_at(&x)
            .unwrap();
        let mut no_mirror = card(Process::Associated);
        no_mirror.mirror_initial_states = false;
        let without = Integrand::new(300., c, &no_mirror, &pdf)
            .unwrap()
            .evaluate_at(&x)
            .unwrap();

        assert!(with > without);
    }

    #[test]
    fn k_factor_scales_gluon_fusion() {
        let pdf = ToyPdf::default();
        let c = CouplingSet::new(2., 0.3).unwrap();
        let x = [0.5, 0.5];

        let integrand = Integrand::new(125., c.clone(), &card(Process::Resonant), &pdf).unwrap();
        let insp = integrand.inspect(&x).unwrap();
        assert!(insp.final_state.is_none());
        let gg = insp.channels[0].1;

        let mut doubled = card(Process::Resonant);
        doubled.k_gg *= 2.;
        let insp2 = Integrand::new(125., c, &doubled, &pdf).unwrap().inspect(&x).unwrap();
        assert_relative_eq!(insp2.channels[0].1, 2. * gg, max_relative = 1e-12);
        assert_relative_eq!(insp2.channels[1].1, insp.channels[1].1, max_relative = 1e-12);
    }

    #[test]
    fn rejects_unphysical_mass() {
        let pdf = ToyPdf::default();
        let c = CouplingSet::new(2., 0.3).unwrap();
        assert!(Integrand::new(-1., c.clone(), &RunCard::default(), &pdf).is_err());
        // the lower end of the window is above the collider energy
        assert!(Integrand::new(30000., c, &RunCard::default(), &pdf).is_err());
    }
}
