use crate::constants::TWOPI;
use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use vector::{kallen_lambda, LorentzVector};

pub trait PhaseSpaceGenerator {
    /// Fill `ps` from the unit-hypercube point `x` and return the phase-space weight.
    fn generate(&self, e_cm: f64, x: &[f64], ps: &mut [LorentzVector<f64>]) -> f64;

    fn get_dimensions(&self) -> usize;
}

/// Maps a flat variable `rho` onto the partonic invariant mass `shat` so that
/// the induced density follows a Breit-Wigner of mass `m` and width `gamma`:
///
/// `shat = m Γ tan(rho) + m²`, `|dτ/dρ| = m Γ sec²(rho) / s`, `τ = shat / s`.
#[derive(Debug, Clone)]
pub struct ResonanceSampler {
    m: f64,
    gamma: f64,
    s_beam: f64,
    rho_min: f64,
    rho_max: f64,
}

impl ResonanceSampler {
    pub fn new(q_min: f64, q_max: f64, m: f64, gamma: f64, s_beam: f64) -> Result<ResonanceSampler> {
        if !(q_min >= 0. && q_min < q_max) {
            return Err(Error::InvalidParameter(format!(
                "resonance window needs 0 <= q_min < q_max, got [{}, {}]",
                q_min, q_max
            )));
        }
        if !(m > 0. && gamma > 0.) {
            return Err(Error::InvalidParameter(format!(
                "resonance mass and width must be positive, got m = {}, width = {}",
                m, gamma
            )));
        }
        if q_max * q_max > s_beam * (1. + 1e-12) {
            return Err(Error::InvalidParameter(format!(
                "q_max = {} exceeds the collider energy {}",
                q_max,
                s_beam.sqrt()
            )));
        }

        let gm = gamma * m;
        let m2 = m * m;
        Ok(ResonanceSampler {
            m,
            gamma,
            s_beam,
            rho_min: ((q_min * q_min - m2) / gm).atan(),
            rho_max: ((q_max * q_max - m2) / gm).atan(),
        })
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.at(rng.gen::<f64>())
    }

    /// Deterministic counterpart of `sample` for `u ∈ [0, 1)`.
    #[inline]
    pub fn at(&self, u: f64) -> f64 {
        self.rho_min + u * self.interval_width()
    }

    #[inline]
    pub fn shat(&self, rho: f64) -> f64 {
        self.m * self.gamma * rho.tan() + self.m * self.m
    }

    #[inline]
    pub fn jacobian(&self, rho: f64) -> f64 {
        let cosrho = rho.cos();
        self.m * self.gamma / (cosrho * cosrho * self.s_beam)
    }

    #[inline]
    pub fn interval_width(&self) -> f64 {
        self.rho_max - self.rho_min
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.rho_min, self.rho_max)
    }
}

/// A sampled point of the hadronic phase space: the Bjorken x's at fixed `shat`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSpacePoint {
    pub x1: f64,
    pub x2: f64,
    pub shat: f64,
    pub y: f64,
    pub delta_y: f64,
}

impl PhaseSpacePoint {
    /// True for the zero-measure point produced when `shat` is out of reach.
    pub fn is_degenerate(&self) -> bool {
        self.delta_y <= 0.
    }
}

/// Samples the rapidity of the partonic system at fixed `shat`, which fixes
/// `x1 = √τ e^y` and `x2 = √τ e^-y`.
#[derive(Debug, Clone, Copy)]
pub struct InitialStates {
    shat: f64,
    sqrt_tau: f64,
    y_max: f64,
}

impl InitialStates {
    pub fn new(s_beam: f64, shat: f64) -> InitialStates {
        if !(shat > 0. && shat <= s_beam) {
            return InitialStates {
                shat,
                sqrt_tau: 0.,
                y_max: 0.,
            };
        }

        let tau = shat / s_beam;
        InitialStates {
            shat,
            sqrt_tau: tau.sqrt(),
            y_max: -0.5 * tau.ln(),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PhaseSpacePoint {
        self.at(rng.gen::<f64>())
    }

    pub fn at(&self, u: f64) -> PhaseSpacePoint {
        let y = (2. * u - 1.) * self.y_max;
        PhaseSpacePoint {
            x1: self.sqrt_tau * y.exp(),
            x2: self.sqrt_tau * (-y).exp(),
            shat: self.shat,
            y,
            delta_y: self.delta_y(),
        }
    }

    pub fn delta_y(&self) -> f64 {
        2. * self.y_max
    }
}

/// On-shell momenta of `q(p1) g(k1) -> q'(p2) H(k2)` in the partonic CM frame.
#[derive(Debug, Clone, Copy)]
pub struct TwoBodyKinematics {
    pub p1: LorentzVector<f64>,
    pub k1: LorentzVector<f64>,
    pub p2: LorentzVector<f64>,
    pub k2: LorentzVector<f64>,
}

impl TwoBodyKinematics {
    #[inline]
    pub fn s_hat(&self) -> f64 {
        (self.p1 + self.k1).square()
    }

    #[inline]
    pub fn t_hat(&self) -> f64 {
        (self.p1 - self.k2).square()
    }

    #[inline]
    pub fn u_hat(&self) -> f64 {
        (self.k1 - self.k2).square()
    }

    /// The same configuration in the lab frame, where the partonic system has rapidity `y`.
    pub fn to_lab(&self, y: f64) -> TwoBodyKinematics {
        let beta = -y.tanh();
        TwoBodyKinematics {
            p1: self.p1.boost_z(beta),
            k1: self.k1.boost_z(beta),
            p2: self.p2.boost_z(beta),
            k2: self.k2.boost_z(beta),
        }
    }
}

/// How `cos θ` of the resonance is distributed over `[-1, -1 + delta_cos]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CosThetaMap {
    Flat,
    /// `ln(m_out² − t)` flat, following the quark propagator of the
    /// t-channel exchange, which peaks at `cos θ = 1`.
    Propagator,
}

/// Generator of 2 -> 2 configurations with a massless gluon in the initial state.
///
/// `cos θ` of the resonance lies in `[-1, -1 + delta_cos]` and `φ` is flat in
/// `[0, 2π)`. The returned weight is the `cos θ` measure.
#[derive(Debug, Clone)]
pub struct TwoBodyGenerator {
    m_resonance: f64,
    m_in: f64,
    m_out: f64,
    delta_cos: f64,
    map: CosThetaMap,
}

impl TwoBodyGenerator {
    pub const FULL_RANGE: f64 = 2.;

    pub fn new(m_resonance: f64, m_in: f64, m_out: f64) -> TwoBodyGenerator {
        TwoBodyGenerator::with_cos_range(m_resonance, m_in, m_out, TwoBodyGenerator::FULL_RANGE)
    }

    pub fn with_cos_range(m_resonance: f64, m_in: f64, m_out: f64, delta_cos: f64) -> TwoBodyGenerator {
        debug_assert!(delta_cos > 0. && delta_cos <= TwoBodyGenerator::FULL_RANGE);
        TwoBodyGenerator {
            m_resonance,
            m_in,
            m_out,
            delta_cos,
            map: CosThetaMap::Flat,
        }
    }

    pub fn with_map(mut self, map: CosThetaMap) -> TwoBodyGenerator {
        self.map = map;
        self
    }

    pub fn threshold(&self) -> f64 {
        (self.m_resonance + self.m_out).powi(2)
    }

    pub fn delta_cos(&self) -> f64 {
        self.delta_cos
    }

    pub fn sample<R: Rng + ?Sized>(&self, s: f64, rng: &mut R) -> (TwoBodyKinematics, f64) {
        self.point(s, rng.gen::<f64>(), rng.gen::<f64>())
    }

    /// Momenta for `s` above threshold; callers are responsible for checking it.
    pub fn kinematics(&self, s: f64, r_cos: f64, r_phi: f64) -> TwoBodyKinematics {
        self.point(s, r_cos, r_phi).0
    }

    /// Momenta and the `cos θ` measure `|dcos θ / dr_cos|`.
    pub fn point(&self, s: f64, r_cos: f64, r_phi: f64) -> (TwoBodyKinematics, f64) {
        let (cos_theta, weight) = self.cos_theta(s, r_cos);
        (self.momenta(s, cos_theta, r_phi), weight)
    }

    /// `cos θ` for the uniform number `r` and the measure `|dcos θ / dr|`.
    pub fn cos_theta(&self, s: f64, r: f64) -> (f64, f64) {
        let (cos_min, cos_max) = (-1., -1. + self.delta_cos);
        let flat = (cos_min + r * self.delta_cos, self.delta_cos);
        if self.map == CosThetaMap::Flat {
            return flat;
        }

        let e = 2. * s.sqrt();
        let pin = (s - self.m_in * self.m_in) / e;
        let e_out = (s - self.m_resonance.powi(2) + self.m_out.powi(2)) / e;
        let pout = kallen_lambda(s, self.m_resonance.powi(2), self.m_out.powi(2)).max(0.).sqrt() / e;

        // m_out² − t = 2 k1·p2, linear in cos θ
        let w = |c: f64| 2. * pin * (e_out - pout * c);
        let (w_lo, w_hi) = (w(cos_max), w(cos_min));
        if !(w_lo > 0. && w_hi > w_lo * (1. + 1e-12)) {
            return flat;
        }

        let log_ratio = (w_hi / w_lo).ln();
        let wr = w_lo * (r * log_ratio).exp();
        let cos_theta = ((e_out - wr / (2. * pin)) / pout).max(cos_min).min(cos_max);
        (cos_theta, wr * log_ratio / (2. * pin * pout))
    }

    fn momenta(&self, s: f64, cos_theta: f64, r_phi: f64) -> TwoBodyKinematics {
        let sqrt_s = s.sqrt();
        let e = 2. * sqrt_s;
        let mh2 = self.m_resonance * self.m_resonance;
        let min2 = self.m_in * self.m_in;
        let mout2 = self.m_out * self.m_out;

        let pin = (s - min2) / e;
        let pfin = kallen_lambda(s, mh2, mout2).max(0.).sqrt() / e;

        let sin_theta = (1. - cos_theta * cos_theta).max(0.).sqrt();
        let (sin_phi, cos_phi) = (TWOPI * r_phi).sin_cos();

        let dir = LorentzVector::from_args(0., sin_theta * cos_phi, sin_theta * sin_phi, cos_theta);

        TwoBodyKinematics {
            p1: LorentzVector::from_args((s + min2) / e, 0., 0., pin),
            k1: LorentzVector::from_args(pin, 0., 0., -pin),
            p2: LorentzVector::from_args((s - mh2 + mout2) / e, 0., 0., 0.) - dir * pfin,
            k2: LorentzVector::from_args((s + mh2 - mout2) / e, 0., 0., 0.) + dir * pfin,
        }
    }

    /// `dt / dcos θ = 2 |p_in| |p_out|`.
    pub fn dt_dcos(&self, s: f64) -> f64 {
        let lambda = kallen_lambda(s, self.m_resonance.powi(2), self.m_out.powi(2));
        0.5 * (s - self.m_in * self.m_in) * lambda.max(0.).sqrt() / s
    }
}

impl PhaseSpaceGenerator for TwoBodyGenerator {
    fn generate(&self, e_cm: f64, x: &[f64], ps: &mut [LorentzVector<f64>]) -> f64 {
        let s = e_cm * e_cm;
        if s < self.threshold() {
            return 0.;
        }

        let (k, weight) = self.point(s, x[0], x[1]);
        ps[0] = k.p1;
        ps[1] = k.k1;
        ps[2] = k.p2;
        ps[3] = k.k2;

        weight
    }

    fn get_dimensions(&self) -> usize {
        2
    }
}
