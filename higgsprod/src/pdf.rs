//! Parton densities and the running coupling.
//!
//! All densities are momentum weighted, i.e. `xfx_q` returns `x f(x, Q)`.

use crate::constants::{pdg, ALPHAS_MZ, MB, MZ, PI};
use crate::error::{Error, Result};

pub trait PdfProvider: Send + Sync {
    /// `x f(x, Q)` for the parton with PDG code `pdg` (gluon = 21).
    fn xfx_q(&self, pdg: i32, x: f64, q: f64) -> f64;

    fn alphas_q(&self, q: f64) -> f64;

    fn name(&self) -> &str;

    /// Sum of quark and antiquark densities of one flavour.
    fn xfx_q_pair(&self, flavour: i32, x: f64, q: f64) -> f64 {
        self.xfx_q(flavour, x, q) + self.xfx_q(-flavour, x, q)
    }
}

/// Build the provider for `set`: `"toy"` selects the built-in parametrisation,
/// anything else is handed to LHAPDF.
pub fn make_pdf(set: &str, alphas_mz: f64) -> Result<Box<dyn PdfProvider>> {
    if set.eq_ignore_ascii_case(ToyPdf::NAME) {
        return Ok(Box::new(ToyPdf::new(alphas_mz)));
    }
    make_lhapdf(set)
}

#[cfg(feature = "lhapdf")]
fn make_lhapdf(set: &str) -> Result<Box<dyn PdfProvider>> {
    Ok(Box::new(lhapdf::Lhapdf::new(set, 0)?))
}

#[cfg(not(feature = "lhapdf"))]
fn make_lhapdf(set: &str) -> Result<Box<dyn PdfProvider>> {
    Err(Error::Pdf(format!(
        "PDF set '{}' needs LHAPDF; rebuild with `--features lhapdf` or use '{}'",
        set,
        ToyPdf::NAME
    )))
}

/// Les Houches toy densities at a fixed starting scale, with a b and c sea
/// switched on logarithmically above the quark mass, and a one-loop,
/// five-flavour running coupling.
#[derive(Debug, Clone)]
pub struct ToyPdf {
    alphas_mz: f64,
}

impl Default for ToyPdf {
    fn default() -> ToyPdf {
        ToyPdf::new(ALPHAS_MZ)
    }
}

impl ToyPdf {
    pub const NAME: &'static str = "toy";

    const BETA0: f64 = 23. / 3.;
    const MC: f64 = 1.4;

    pub fn new(alphas_mz: f64) -> ToyPdf {
        ToyPdf { alphas_mz }
    }

    fn xuv(x: f64) -> f64 {
        5.1072 * x.powf(0.8) * (1. - x).powi(3)
    }

    fn xdv(x: f64) -> f64 {
        3.06432 * x.powf(0.8) * (1. - x).powi(4)
    }

    fn xg(x: f64) -> f64 {
        1.7 * x.powf(-0.1) * (1. - x).powi(5)
    }

    fn xdbar(x: f64) -> f64 {
        0.1939875 * x.powf(-0.1) * (1. - x).powi(6)
    }

    fn xubar(x: f64) -> f64 {
        ToyPdf::xdbar(x) * (1. - x)
    }

    fn xs(x: f64) -> f64 {
        0.2 * (ToyPdf::xubar(x) + ToyPdf::xdbar(x))
    }

    /// Heavy sea as a fraction of the strange sea, zero below the quark mass.
    fn xheavy(x: f64, q: f64, m: f64) -> f64 {
        if q <= m {
            return 0.;
        }
        0.5 * ToyPdf::xs(x) * (q / m).ln() / (MZ / m).ln()
    }
}

impl PdfProvider for ToyPdf {
    fn xfx_q(&self, id: i32, x: f64, q: f64) -> f64 {
        if !(x > 0. && x < 1.) {
            return 0.;
        }

        match id {
            pdg::GLUON => ToyPdf::xg(x),
            pdg::UP => ToyPdf::xuv(x) + ToyPdf::xubar(x),
            pdg::DOWN => ToyPdf::xdv(x) + ToyPdf::xdbar(x),
            -2 => ToyPdf::xubar(x),
            -1 => ToyPdf::xdbar(x),
            pdg::STRANGE | -3 => ToyPdf::xs(x),
            pdg::CHARM | -4 => ToyPdf::xheavy(x, q, ToyPdf::MC),
            pdg::BOTTOM | -5 => ToyPdf::xheavy(x, q, MB),
            _ => 0.,
        }
    }

    fn alphas_q(&self, q: f64) -> f64 {
        let b0 = ToyPdf::BETA0 / (4. * PI);
        self.alphas_mz / (1. + self.alphas_mz * b0 * (q * q / (MZ * MZ)).ln())
    }

    fn name(&self) -> &str {
        ToyPdf::NAME
    }
}

#[cfg(feature = "lhapdf")]
pub mod lhapdf {
    use super::PdfProvider;
    use crate::constants::pdg;
    use crate::error::{Error, Result};
    use libc::{c_double, c_int};
    use std::ffi::CString;
    use std::sync::Mutex;

    #[allow(non_snake_case)]
    mod LHAPDF {
        use libc::{c_char, c_double, c_int};

        #[link(name = "LHAPDF", kind = "dylib")]
        extern "C" {
            pub fn initpdfsetbyname_(setname: *const c_char, setnamelength: c_int);
            pub fn initpdf_(index: *const c_int);
            pub fn alphaspdf_(scale: *const c_double) -> f64;
            pub fn evolvepdf_(x: *const c_double, q: *const c_double, f: *mut c_double) -> f64;
        }
    }

    lazy_static! {
        // the Fortran interface keeps a single global grid
        static ref LHAPDF_LOCK: Mutex<()> = Mutex::new(());
    }

    /// A PDF set loaded through the LHAPDF Fortran interface.
    ///
    /// Only one set can be active per process.
    pub struct Lhapdf {
        name: String,
    }

    impl Lhapdf {
        pub fn new(set: &str, member: i32) -> Result<Lhapdf> {
            let name = CString::new(set)
                .map_err(|_| Error::Pdf(format!("invalid PDF set name '{}'", set)))?;

            let _guard = LHAPDF_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            // note that if the set does not exist, lhapdf will abort without a clear error
            unsafe {
                LHAPDF::initpdfsetbyname_(name.as_ptr(), name.to_bytes().len() as c_int);
                let v = member as c_int;
                LHAPDF::initpdf_(&v as *const c_int);
            }
            info!("Loaded PDF set {} (member {})", set, member);

            Ok(Lhapdf {
                name: set.to_owned(),
            })
        }
    }

    impl PdfProvider for Lhapdf {
        fn xfx_q(&self, id: i32, x: f64, q: f64) -> f64 {
            if id != pdg::GLUON && (id == 0 || id.abs() > 6) {
                return 0.;
            }

            let mut f: [f64; 13] = [0.; 13];
            {
                let _guard = LHAPDF_LOCK.lock().unwrap_or_else(|e| e.into_inner());
                unsafe {
                    LHAPDF::evolvepdf_(
                        &x as *const c_double,
                        &q as *const c_double,
                        &mut f[0] as *mut c_double,
                    );
                }
            }

            match id {
                pdg::GLUON => f[6],
                a => f[(a + 6) as usize],
            }
        }

        fn alphas_q(&self, q: f64) -> f64 {
            let _guard = LHAPDF_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            unsafe { LHAPDF::alphaspdf_(&q as *const c_double) }
        }

        fn name(&self) -> &str {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn valence_sum_rules() {
        // ∫ u_v dx = 2 and ∫ d_v dx = 1, with x u_v as input
        let n = 200_000;
        let h = 1. / n as f64;
        let (mut nu, mut nd) = (0., 0.);
        for i in 0..n {
            let x = (i as f64 + 0.5) * h;
            nu += ToyPdf::xuv(x) / x * h;
            nd += ToyPdf::xdv(x) / x * h;
        }
        assert_relative_eq!(nu, 2., max_relative = 1e-3);
        assert_relative_eq!(nd, 1., max_relative = 1e-3);
    }

    #[test]
    fn heavy_flavours_vanish_below_threshold() {
        let pdf = ToyPdf::default();
        assert_eq!(pdf.xfx_q(pdg::BOTTOM, 0.1, 3.), 0.);
        assert!(pdf.xfx_q(pdg::BOTTOM, 0.1, 125.) > 0.);
        assert_eq!(pdf.xfx_q(pdg::BOTTOM, 0.1, 125.), pdf.xfx_q(-pdg::BOTTOM, 0.1, 125.));
        assert_eq!(pdf.xfx_q(6, 0.1, 1000.), 0.);
    }

    #[test]
    fn outside_unit_interval_is_zero() {
        let pdf = ToyPdf::default();
        assert_eq!(pdf.xfx_q(pdg::GLUON, 0., 100.), 0.);
        assert_eq!(pdf.xfx_q(pdg::GLUON, 1., 100.), 0.);
        assert!(pdf.xfx_q(pdg::GLUON, 1e-3, 100.) > 0.);
    }

    #[test]
    fn running_coupling() {
        let pdf = ToyPdf::default();
        assert_relative_eq!(pdf.alphas_q(MZ), ALPHAS_MZ, max_relative = 1e-12);
        assert!(pdf.alphas_q(1000.) < ALPHAS_MZ);
        assert!(pdf.alphas_q(10.) > ALPHAS_MZ);
    }

    #[test]
    fn unknown_set_without_lhapdf() {
        assert!(make_pdf("toy", 0.118).is_ok());
        if cfg!(not(feature = "lhapdf")) {
            assert!(matches!(make_pdf("NNPDF23_lo_as_0130_qed", 0.118), Err(Error::Pdf(_))));
        }
    }
}
