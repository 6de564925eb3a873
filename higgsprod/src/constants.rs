//! Physical constants in GeV units.

pub const PI: f64 = std::f64::consts::PI;
pub const TWOPI: f64 = 2. * PI;
pub const SQRT2: f64 = std::f64::consts::SQRT_2;

/// top quark mass
pub const MT: f64 = 173.0;
pub const MT2: f64 = MT * MT;

/// bottom quark mass
pub const MB: f64 = 4.7;
pub const MB2: f64 = MB * MB;

/// charm quark mass
pub const MC: f64 = 1.27;

/// Z boson mass
pub const MZ: f64 = 91.188;

/// Fermi constant
pub const GF: f64 = 1.1663787e-5;

/// squared electroweak vacuum expectation value, `1/(√2 G_F)`
pub const VEW2: f64 = 1.0 / (SQRT2 * GF);

lazy_static! {
    /// electroweak vacuum expectation value, ~246 GeV
    pub static ref VEW: f64 = VEW2.sqrt();
}

/// strong coupling at the Z pole
pub const ALPHAS_MZ: f64 = 0.118;

pub const NC: f64 = 3.;

/// GeV^-2 -> pb
pub const PBCONV: f64 = 3.893793656e8;

// CKM matrix elements
pub const VUD: f64 = 0.97434;
pub const VUS: f64 = 0.22506;
pub const VUB: f64 = 0.00357;
pub const VCD: f64 = 0.22492;
pub const VCS: f64 = 0.97351;
pub const VCB: f64 = 0.0411;
pub const VTD: f64 = 0.00875;
pub const VTS: f64 = 0.0403;
pub const VTB: f64 = 0.99915;

/// PDG identifiers of the partons that enter the luminosities.
pub mod pdg {
    pub const DOWN: i32 = 1;
    pub const UP: i32 = 2;
    pub const STRANGE: i32 = 3;
    pub const CHARM: i32 = 4;
    pub const BOTTOM: i32 = 5;
    pub const GLUON: i32 = 21;
}
