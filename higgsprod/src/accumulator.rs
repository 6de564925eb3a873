use crate::constants::PBCONV;
use std::ops::AddAssign;

/// Running first and second moments of the Monte Carlo weights.
///
/// Weights are in natural units (GeV⁻²); conversion to pb happens in
/// [`Accumulator::finalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    sum_w: f64,
    sum_w_sq: f64,
    n: usize,
    n_zero: usize,
}

impl Accumulator {
    pub fn new() -> Accumulator {
        Accumulator::default()
    }

    #[inline]
    pub fn ingest(&mut self, weight: f64) {
        self.sum_w += weight;
        self.sum_w_sq += weight * weight;
        self.n += 1;
        if weight == 0. {
            self.n_zero += 1;
        }
    }

    /// Fold in a partial accumulator, e.g. the one of another worker.
    pub fn merge(&mut self, other: &Accumulator) {
        self.sum_w += other.sum_w;
        self.sum_w_sq += other.sum_w_sq;
        self.n += other.n;
        self.n_zero += other.n_zero;
    }

    pub fn count(&self) -> usize {
        self.n
    }

    /// Number of points that contributed exactly zero.
    pub fn zero_count(&self) -> usize {
        self.n_zero
    }

    /// Mean and standard error of the mean in natural units.
    pub fn finalize_raw(&self) -> (f64, f64) {
        if self.n == 0 {
            return (0., 0.);
        }
        let n = self.n as f64;
        let mean = self.sum_w / n;
        // rounding may push a constant-weight variance slightly negative
        let variance = (self.sum_w_sq / n - mean * mean).max(0.);
        (mean, (variance / n).sqrt())
    }

    /// Cross section and its statistical error in pb.
    pub fn finalize(&self) -> (f64, f64) {
        let (mean, err) = self.finalize_raw();
        (mean * PBCONV, err * PBCONV)
    }
}

impl AddAssign<Accumulator> for Accumulator {
    fn add_assign(&mut self, other: Accumulator) {
        self.merge(&other);
    }
}

impl std::iter::FromIterator<f64> for Accumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Accumulator {
        let mut acc = Accumulator::new();
        for w in iter {
            acc.ingest(w);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn weights() -> Vec<f64> {
        (0..1000).map(|i| ((i * 37 % 101) as f64).sin().abs() * 1e-9).collect()
    }

    #[test]
    fn mean_and_error() {
        let acc: Accumulator = [1., 2., 3., 4.].iter().cloned().collect();
        let (mean, err) = acc.finalize_raw();
        assert_relative_eq!(mean, 2.5);
        // population variance 1.25
        assert_relative_eq!(err, (1.25f64 / 4.).sqrt());

        let (xsec, xerr) = acc.finalize();
        assert_relative_eq!(xsec, 2.5 * PBCONV);
        assert_relative_eq!(xerr, err * PBCONV);
    }

    #[test]
    fn finalize_is_idempotent() {
        let acc: Accumulator = weights().into_iter().collect();
        assert_eq!(acc.finalize(), acc.finalize());
        assert_eq!(acc.count(), 1000);
    }

    #[test]
    fn merge_matches_sequential() {
        let w = weights();
        let sequential: Accumulator = w.iter().cloned().collect();

        let mut merged: Accumulator = w[..400].iter().cloned().collect();
        merged += w[400..].iter().cloned().collect();

        assert_eq!(merged.count(), sequential.count());
        let (a, ea) = merged.finalize();
        let (b, eb) = sequential.finalize();
        assert_relative_eq!(a, b, max_relative = 1e-12);
        assert_relative_eq!(ea, eb, max_relative = 1e-9);
    }

    #[test]
    fn empty_and_constant() {
        assert_eq!(Accumulator::new().finalize(), (0., 0.));

        let acc: Accumulator = std::iter::repeat(0.1).take(10).collect();
        let (mean, err) = acc.finalize_raw();
        assert_relative_eq!(mean, 0.1, max_relative = 1e-12);
        assert!(err >= 0. && err < 1e-8);
    }

    #[test]
    fn zero_weights_are_counted() {
        let acc: Accumulator = vec![0., 1., 0., 2.].into_iter().collect();
        assert_eq!(acc.zero_count(), 2);
        assert_eq!(acc.count(), 4);
    }
}
