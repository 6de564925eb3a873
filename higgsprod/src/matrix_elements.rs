//! Partonic cross sections for single production of the neutral scalar.
//!
//! Resonant channels are total partonic cross sections carrying the
//! Breit-Wigner lineshape [`delta`]. Associated channels `q g -> H b`, and
//! their charged counterparts `u g -> H⁺ b` and `b g -> H⁻ t`, are
//! differential in the scattering angle of the scalar.

use crate::constants::*;
use crate::couplings::{CouplingSet, DownQuark, UpQuark};
use crate::loop_functions::f_triangle;
use crate::pdf::PdfProvider;
use vector::kallen_lambda;

/// Normalised Breit-Wigner with an `ŝ`-dependent width.
pub fn delta(shat: f64, mh: f64, gammah: f64) -> f64 {
    let sgammah = shat * gammah / mh;
    (1. / PI) * sgammah / ((shat - mh * mh).powi(2) + sgammah * sgammah)
}

/// `g g -> H` through top and bottom loops, stripped of the lineshape.
pub fn sigma0(mh: f64, alpha_s: f64, c: &CouplingSet) -> f64 {
    let c1 = c.ratio_alpha_beta();
    let c2 = c.fcnc_prefactor();
    let coup_u = c1 + c2 * c.h33u() / MT;
    let coup_d = c1 + c2 * c.hd(DownQuark::Bottom) / MB;

    let mh2 = mh * mh;
    let a12tau = coup_u * f_triangle(4. * MT2 / mh2) + coup_d * f_triangle(4. * MB2 / mh2);

    let coeff = alpha_s * alpha_s * mh2 / (576. * PI * VEW2);
    coeff * (9. / 4.) * a12tau.norm_sqr()
}

pub fn sigma_ggh(shat: f64, mh: f64, gammah: f64, alpha_s: f64, c: &CouplingSet) -> f64 {
    sigma0(mh, alpha_s, c) * delta(shat, mh, gammah)
}

/// `b b̄ -> H`, zero below the b pair threshold.
pub fn sigma_bbh(shat: f64, mh: f64, gammah: f64, c: &CouplingSet) -> f64 {
    let beta2 = 1. - 4. * MB2 / (mh * mh);
    if shat < 4. * MB2 || beta2 <= 0. {
        return 0.;
    }

    let coeff = PI * MB2 / (2. * NC * NC * VEW2);
    let coup = c.ratio_alpha_beta() + c.fcnc_prefactor() * c.hd(DownQuark::Bottom) / MB;
    coeff * coup * coup * beta2.sqrt() * delta(shat, mh, gammah)
}

/// Flavour-changing `q b̄ -> H` for a light down-type quark `q`.
pub fn sigma_qbh(shat: f64, mh: f64, gammah: f64, c: &CouplingSet, q: DownQuark) -> f64 {
    if shat < MB2 {
        return 0.;
    }

    let hq3 = match q {
        DownQuark::Bottom => 0.,
        light => c.hd(light),
    };
    let coup = c.angles.sin_alpha_beta() / c.angles.cos_beta() * hq3;
    PI / (8. * NC * NC) * coup * coup * delta(shat, mh, gammah)
}

/// `dσ/dt` of `q_in(p1) g(k1) -> q_out(p2) H(k2)` with scalar and pseudoscalar
/// Yukawa couplings `g` and `g̃`.
pub fn dsigma_dt(
    s: f64,
    t: f64,
    mh: f64,
    mqin: f64,
    mqout: f64,
    alpha_s: f64,
    g: f64,
    gtilde: f64,
) -> f64 {
    if s < (mh + mqout).powi(2) {
        return 0.;
    }

    let mh2 = mh * mh;
    let mqin2 = mqin * mqin;
    let mqout2 = mqout * mqout;

    let f1 = s * t - mqin2 * mqout2;
    let f2 = s + t - mqin2 - mqout2;
    let g1 = mh2 - mqout2 - s;
    let g2 = mh2 - mqin2 - t;
    let ss = s - mqin2;
    let tt = t - mqout2;
    let (gg, gt) = (g * g, gtilde * gtilde);

    let mut sigma = (gg + gt)
        * ((2. * f1 - f2 * f2 - 2. * g1 * g2) / (ss * tt)
            + 2. * mqin2 * g1 / (ss * ss)
            + 2. * mqout2 * g2 / (tt * tt));
    sigma += (gg - gt) * 4. * mqin * mqout * mh2 / (ss * tt) * (1. - f1 * f2 / (mh2 * ss * tt));

    sigma * alpha_s / (8. * NC * ss * ss)
}

/// [`dsigma_dt`] times `dt/dcos θ`.
pub fn dsigma_dcos(
    s: f64,
    t: f64,
    mh: f64,
    mqin: f64,
    mqout: f64,
    alpha_s: f64,
    g: f64,
    gtilde: f64,
) -> f64 {
    let dsigma = dsigma_dt(s, t, mh, mqin, mqout, alpha_s, g, gtilde);
    if dsigma == 0. {
        return 0.;
    }
    let jacobian = 0.5 * (s - mqin * mqin) * kallen_lambda(s, mh * mh, mqout * mqout).max(0.).sqrt() / s;
    dsigma * jacobian
}

/// The scalar under study: couplings plus its lineshape.
#[derive(Debug, Clone)]
pub struct ScalarModel {
    pub couplings: CouplingSet,
    pub mass: f64,
    pub width: f64,
}

/// Partonic invariants of one phase-space point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Invariants {
    pub s_hat: f64,
    /// Only used by the associated channels.
    pub t_hat: f64,
    pub alpha_s: f64,
}

/// A partonic subprocess contributing to `p p -> H (+ b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// `g g -> H`
    GluonFusion,
    /// `b b̄ -> H`
    BottomFusion,
    /// `q b̄ -> H` and `b q̄ -> H` for `q = d, s`
    FlavourChanging(DownQuark),
    /// `q g -> H b` and its charge conjugate, `q = d, s, b`
    QuarkGluon(DownQuark),
    /// `u g -> H⁺ b` and `c g -> H⁺ b` for an up or charm quark, `b g -> H⁻ t`
    /// for the top, plus the charge conjugates
    ChargedQuarkGluon(UpQuark),
}

impl Channel {
    pub const RESONANT: [Channel; 4] = [
        Channel::GluonFusion,
        Channel::BottomFusion,
        Channel::FlavourChanging(DownQuark::Down),
        Channel::FlavourChanging(DownQuark::Strange),
    ];

    pub const ASSOCIATED: [Channel; 3] = [
        Channel::QuarkGluon(DownQuark::Down),
        Channel::QuarkGluon(DownQuark::Strange),
        Channel::QuarkGluon(DownQuark::Bottom),
    ];

    pub const CHARGED: [Channel; 3] = [
        Channel::ChargedQuarkGluon(UpQuark::Up),
        Channel::ChargedQuarkGluon(UpQuark::Charm),
        Channel::ChargedQuarkGluon(UpQuark::Top),
    ];

    pub fn is_resonant(&self) -> bool {
        matches!(
            self,
            Channel::GluonFusion | Channel::BottomFusion | Channel::FlavourChanging(_)
        )
    }

    /// Masses of the incoming and the recoiling quark for `2 -> 2` channels.
    pub fn two_body_masses(&self) -> Option<(f64, f64)> {
        match self {
            Channel::QuarkGluon(DownQuark::Bottom) => Some((MB, MB)),
            Channel::QuarkGluon(_) => Some((0., MB)),
            Channel::ChargedQuarkGluon(UpQuark::Top) => Some((MB, MT)),
            Channel::ChargedQuarkGluon(q) => Some((q.mass(), MB)),
            _ => None,
        }
    }

    /// Scalar and pseudoscalar couplings `(g, g̃)` of the quark-scalar vertex.
    ///
    /// The neutral vertices are scalar-like, `g = g̃`. The charged ones follow
    /// from the chiral couplings as `g = (λ_L + λ_R)/2`, `g̃ = (λ_L − λ_R)/2`.
    fn yukawa(&self, c: &CouplingSet) -> (f64, f64) {
        match self {
            Channel::QuarkGluon(DownQuark::Bottom) => {
                let g = c.lambda_b() / (2. * SQRT2);
                (g, g)
            }
            Channel::QuarkGluon(q) => {
                let g = c.angles.sin_alpha_beta() / (2. * SQRT2 * c.angles.cos_beta()) * c.hd(*q);
                (g, g)
            }
            Channel::ChargedQuarkGluon(q) => {
                let (lambda_l, lambda_r) = c.charged_chiral(*q);
                (0.5 * (lambda_l + lambda_r), 0.5 * (lambda_l - lambda_r))
            }
            _ => (0., 0.),
        }
    }

    /// Partonic cross section, `dσ/dcos θ` for the associated channels.
    pub fn sigma_hat(&self, model: &ScalarModel, inv: &Invariants) -> f64 {
        let c = &model.couplings;
        let (mh, gammah) = (model.mass, model.width);
        match self {
            Channel::GluonFusion => sigma_ggh(inv.s_hat, mh, gammah, inv.alpha_s, c),
            Channel::BottomFusion => sigma_bbh(inv.s_hat, mh, gammah, c),
            Channel::FlavourChanging(q) => sigma_qbh(inv.s_hat, mh, gammah, c, *q),
            Channel::QuarkGluon(_) | Channel::ChargedQuarkGluon(_) => {
                let (mqin, mqout) = self.two_body_masses().unwrap_or((0., MB));
                let (g, gtilde) = self.yukawa(c);
                dsigma_dcos(inv.s_hat, inv.t_hat, mh, mqin, mqout, inv.alpha_s, g, gtilde)
            }
        }
    }

    /// Product of momentum-weighted densities `x1 f(x1) x2 f(x2)` for this
    /// channel. `mirrored` swaps the beams of non-symmetric channels.
    pub fn luminosity(&self, pdf: &dyn PdfProvider, x1: f64, x2: f64, mu: f64, mirrored: bool) -> f64 {
        let (x1, x2) = if mirrored { (x2, x1) } else { (x1, x2) };
        let f = |id: i32, x: f64| pdf.xfx_q(id, x, mu);

        match self {
            Channel::GluonFusion => f(pdg::GLUON, x1) * f(pdg::GLUON, x2),
            Channel::BottomFusion => {
                f(pdg::BOTTOM, x1) * f(-pdg::BOTTOM, x2) + f(-pdg::BOTTOM, x1) * f(pdg::BOTTOM, x2)
            }
            Channel::FlavourChanging(q) => {
                let q = Channel::pdg_code(*q);
                f(q, x1) * f(-pdg::BOTTOM, x2)
                    + f(-pdg::BOTTOM, x1) * f(q, x2)
                    + f(pdg::BOTTOM, x1) * f(-q, x2)
                    + f(-q, x1) * f(pdg::BOTTOM, x2)
            }
            Channel::QuarkGluon(q) => {
                pdf.xfx_q_pair(Channel::pdg_code(*q), x1, mu) * f(pdg::GLUON, x2)
            }
            Channel::ChargedQuarkGluon(q) => {
                let id = match q {
                    UpQuark::Up => pdg::UP,
                    UpQuark::Charm => pdg::CHARM,
                    UpQuark::Top => pdg::BOTTOM,
                };
                pdf.xfx_q_pair(id, x1, mu) * f(pdg::GLUON, x2)
            }
        }
    }

    fn pdg_code(q: DownQuark) -> i32 {
        match q {
            DownQuark::Down => pdg::DOWN,
            DownQuark::Strange => pdg::STRANGE,
            DownQuark::Bottom => pdg::BOTTOM,
        }
    }
}
