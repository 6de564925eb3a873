use crate::constants::*;
use crate::error::{Error, Result};
use std::f64::consts::FRAC_PI_2;

/// Mixing angles of the two Higgs doublets.
///
/// `alpha` is brought back into `[-π/2, π/2]` after being reconstructed from
/// `beta + acos(cos(α−β))`, and `sin(α−β)` follows the wrapped angle.
#[derive(Debug, Clone, Copy)]
pub struct Angles {
    sin_alpha: f64,
    cos_alpha: f64,
    sin_beta: f64,
    cos_beta: f64,
    tan_beta: f64,
    sin_alpha_beta: f64,
    cos_alpha_beta: f64,
}

impl Angles {
    pub fn new(tan_beta: f64, cos_alpha_beta: f64) -> Result<Angles> {
        if !tan_beta.is_finite() || tan_beta <= 0. {
            return Err(Error::InvalidParameter(format!(
                "tan(beta) must be positive, got {}",
                tan_beta
            )));
        }
        if !(-1.0..=1.0).contains(&cos_alpha_beta) {
            return Err(Error::NumericalDomain(format!(
                "cos(alpha-beta) = {} is outside [-1, 1]",
                cos_alpha_beta
            )));
        }

        let beta = tan_beta.atan();
        let cos_beta = beta.cos();
        let sin_beta = cos_beta * tan_beta;

        let alpha = Angles::wrap_half_pi(beta + cos_alpha_beta.acos());
        let (sin_alpha, cos_alpha) = alpha.sin_cos();

        Ok(Angles {
            sin_alpha,
            cos_alpha,
            sin_beta,
            cos_beta,
            tan_beta,
            sin_alpha_beta: (alpha - beta).sin(),
            cos_alpha_beta,
        })
    }

    fn wrap_half_pi(mut alpha: f64) -> f64 {
        while alpha > FRAC_PI_2 {
            alpha -= PI;
        }
        while alpha < -FRAC_PI_2 {
            alpha += PI;
        }
        alpha
    }

    pub fn sin_alpha(&self) -> f64 {
        self.sin_alpha
    }
    pub fn cos_alpha(&self) -> f64 {
        self.cos_alpha
    }
    pub fn sin_beta(&self) -> f64 {
        self.sin_beta
    }
    pub fn cos_beta(&self) -> f64 {
        self.cos_beta
    }
    pub fn tan_beta(&self) -> f64 {
        self.tan_beta
    }
    pub fn sin_alpha_beta(&self) -> f64 {
        self.sin_alpha_beta
    }
    pub fn cos_alpha_beta(&self) -> f64 {
        self.cos_alpha_beta
    }
}

/// Flavour of a down-type quark entering a flavour-changing vertex with the b.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownQuark {
    Down,
    Strange,
    Bottom,
}

/// Up-type quark meeting the b at a charged-scalar vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpQuark {
    Up,
    Charm,
    Top,
}

impl UpQuark {
    pub fn mass(&self) -> f64 {
        match self {
            UpQuark::Up => 0.,
            UpQuark::Charm => MC,
            UpQuark::Top => MT,
        }
    }

    /// CKM row `(V_qd, V_qs, V_qb)`.
    fn ckm(&self) -> [f64; 3] {
        match self {
            UpQuark::Up => [VUD, VUS, VUB],
            UpQuark::Charm => [VCD, VCS, VCB],
            UpQuark::Top => [VTD, VTS, VTB],
        }
    }
}

/// Everything the matrix elements need from the model: mixing angles and the
/// off-diagonal Yukawa entries of the second doublet.
///
/// Built once per run and shared by reference.
#[derive(Debug, Clone)]
pub struct CouplingSet {
    pub angles: Angles,
    h33u: f64,
    h13d: f64,
    h23d: f64,
    h33d: f64,
}

impl CouplingSet {
    pub fn new(tan_beta: f64, cos_alpha_beta: f64) -> Result<CouplingSet> {
        let angles = Angles::new(tan_beta, cos_alpha_beta)?;
        Ok(CouplingSet::from_angles(angles))
    }

    pub fn from_angles(angles: Angles) -> CouplingSet {
        let vew = *VEW;

        // third-generation up-type Yukawa at its SM-like value √2 m_t / v
        let y33u = SQRT2 * MT / vew;
        let h33u = (1.0 - VEW2 * angles.cos_beta().powi(2) * y33u * y33u / (2.0 * MT2))
            * SQRT2
            * MT
            / (vew * angles.sin_beta());

        let cfac = SQRT2 * MB / (vew * angles.sin_beta());

        CouplingSet {
            angles,
            h33u,
            h13d: cfac * (VUD * VUB + VCD * VCB),
            h23d: cfac * (VUS * VUB + VCS * VCB),
            h33d: cfac * (VUB * VUB + VCB * VCB),
        }
    }

    pub fn h33u(&self) -> f64 {
        self.h33u
    }

    /// Down-type entry `h_{q3}` coupling the quark `q` to the b.
    pub fn hd(&self, q: DownQuark) -> f64 {
        match q {
            DownQuark::Down => self.h13d,
            DownQuark::Strange => self.h23d,
            DownQuark::Bottom => self.h33d,
        }
    }

    /// `(V h^d)_{q3}`, the down-type entries rotated onto the up-type quark `q`.
    pub fn vhd(&self, q: UpQuark) -> f64 {
        let [vqd, vqs, vqb] = q.ckm();
        vqd * self.h13d + vqs * self.h23d + vqb * self.h33d
    }

    /// Left- and right-handed couplings `(λ_L, λ_R)` of the `H⁺ q̄ b` vertex.
    ///
    /// Only the top carries a second-doublet up-type entry.
    pub fn charged_chiral(&self, q: UpQuark) -> (f64, f64) {
        let (tan_beta, cos_beta) = (self.angles.tan_beta(), self.angles.cos_beta());
        let vqb = q.ckm()[2];
        let hu = match q {
            UpQuark::Top => self.h33u,
            _ => 0.,
        };

        let lambda_l = SQRT2 * MB * tan_beta * vqb / *VEW - self.vhd(q) / cos_beta;
        let lambda_r = -vqb * (SQRT2 * q.mass() * tan_beta / *VEW - hu / cos_beta);
        (lambda_l, lambda_r)
    }

    /// `cos α / cos β`, the rescaling of the type-I-like Yukawa.
    pub fn ratio_alpha_beta(&self) -> f64 {
        self.angles.cos_alpha() / self.angles.cos_beta()
    }

    /// `v sin(α−β) / (√2 cos β)`, multiplies the flavour-changing entries.
    pub fn fcnc_prefactor(&self) -> f64 {
        *VEW * self.angles.sin_alpha_beta() / (SQRT2 * self.angles.cos_beta())
    }

    /// Effective Hbb̄ coupling `λ_b`.
    pub fn lambda_b(&self) -> f64 {
        SQRT2 * MB * self.ratio_alpha_beta() / *VEW
            + self.h33d * self.angles.sin_alpha_beta() / self.angles.cos_beta()
    }
}
