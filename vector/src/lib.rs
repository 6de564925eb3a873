//! Minkowski four-vectors with metric `(+, -, -, -)` and the handful of
//! collider observables needed to look at a 2 -> 2 configuration.

extern crate num;

use num::{Float, Num, NumCast};
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, Index, Mul, Neg, Sub};

pub trait Field
where
    Self: Num + Neg<Output = Self>,
    Self: Copy + Default + PartialEq + Debug,
{
}

impl<T> Field for T where T: Num + Neg<Output = T> + Copy + Default + PartialEq + Debug {}

/// Real scalars: everything that needs logarithms, angles or square roots.
pub trait RealNumberLike: Field + Float + NumCast {}

impl<T> RealNumberLike for T where T: Field + Float + NumCast {}

/// Källén function `λ(x, y, z) = x² + y² + z² − 2xy − 2yz − 2zx`.
#[inline]
pub fn kallen_lambda<T: Field>(x: T, y: T, z: T) -> T {
    let two = T::one() + T::one();
    x * x + y * y + z * z - two * (x * y + y * z + z * x)
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct LorentzVector<T: Field> {
    pub t: T,
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: Field> LorentzVector<T> {
    #[inline]
    pub fn from_args(t: T, x: T, y: T, z: T) -> LorentzVector<T> {
        LorentzVector { t, x, y, z }
    }

    #[inline]
    pub fn square(&self) -> T {
        self.dot(self)
    }

    #[inline]
    pub fn dot(&self, other: &LorentzVector<T>) -> T {
        self.t * other.t - self.spatial_dot(other)
    }

    #[inline]
    pub fn spatial_dot(&self, other: &LorentzVector<T>) -> T {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn pt_squared(&self) -> T {
        self.x * self.x + self.y * self.y
    }

    fn zip_with<F: Fn(T, T) -> T>(&self, other: &LorentzVector<T>, f: F) -> LorentzVector<T> {
        LorentzVector::from_args(
            f(self.t, other.t),
            f(self.x, other.x),
            f(self.y, other.y),
            f(self.z, other.z),
        )
    }
}

impl<T: RealNumberLike> LorentzVector<T> {
    #[inline]
    pub fn pt(&self) -> T {
        self.x.hypot(self.y)
    }

    /// Azimuth in `(-π, π]`, zero for a vector along the beam.
    #[inline]
    pub fn phi(&self) -> T {
        if self.pt_squared() == T::zero() {
            return T::zero();
        }
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn rapidity(&self) -> T {
        let half = T::one() / (T::one() + T::one());
        half * ((self.t + self.z) / (self.t - self.z)).ln()
    }

    /// Pseudorapidity, infinite along the beam axis.
    #[inline]
    pub fn pseudo_rap(&self) -> T {
        let pt = self.pt();
        if pt == T::zero() {
            return self.z.signum() * T::infinity();
        }
        (self.z / pt).asinh()
    }

    /// `φ_self − φ_other` brought into `[-π, π)`.
    pub fn delta_phi(&self, other: &LorentzVector<T>) -> T {
        let pi = <T as NumCast>::from(std::f64::consts::PI).unwrap_or_else(T::zero);
        let mut dphi = self.phi() - other.phi();
        while dphi >= pi {
            dphi = dphi - (pi + pi);
        }
        while dphi < -pi {
            dphi = dphi + (pi + pi);
        }
        dphi
    }

    /// Distance in the (rapidity, azimuth) plane.
    pub fn delta_r(&self, other: &LorentzVector<T>) -> T {
        (self.rapidity() - other.rapidity()).hypot(self.delta_phi(other))
    }

    /// The same vector seen from a frame moving with velocity `beta` along `z`.
    pub fn boost_z(&self, beta: T) -> LorentzVector<T> {
        let gamma = (T::one() - beta * beta).sqrt().recip();
        let gb = gamma * beta;
        LorentzVector::from_args(
            gamma * self.t - gb * self.z,
            self.x,
            self.y,
            gamma * self.z - gb * self.t,
        )
    }
}

impl<T: Field> Add for LorentzVector<T> {
    type Output = LorentzVector<T>;

    #[inline]
    fn add(self, other: LorentzVector<T>) -> LorentzVector<T> {
        self.zip_with(&other, |a, b| a + b)
    }
}

impl<T: Field> Sub for LorentzVector<T> {
    type Output = LorentzVector<T>;

    #[inline]
    fn sub(self, other: LorentzVector<T>) -> LorentzVector<T> {
        self.zip_with(&other, |a, b| a - b)
    }
}

impl<T: Field> Mul<T> for LorentzVector<T> {
    type Output = LorentzVector<T>;

    #[inline]
    fn mul(self, scale: T) -> LorentzVector<T> {
        LorentzVector::from_args(self.t * scale, self.x * scale, self.y * scale, self.z * scale)
    }
}

impl<T: Field> Sum for LorentzVector<T> {
    fn sum<I: Iterator<Item = LorentzVector<T>>>(iter: I) -> LorentzVector<T> {
        iter.fold(LorentzVector::default(), Add::add)
    }
}

impl<T: Field> Index<usize> for LorentzVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, mu: usize) -> &T {
        match mu {
            0 => &self.t,
            1 => &self.x,
            2 => &self.y,
            3 => &self.z,
            _ => panic!("Lorentz index {} out of range", mu),
        }
    }
}
