// measurement.rs - Values with first-order Gaussian error propagation

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A nominal value and its variance.
///
/// Operands are treated as independent: every binary operation adds the
/// linearised variance contributions of both sides and ignores covariance.
/// Scalars (`f64`) are exact.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurement {
    pub value: f64,
    pub variance: f64,
}

impl Measurement {
    /// Build from a nominal value and a standard deviation.
    pub fn new(value: f64, std_dev: f64) -> Self {
        Self { value, variance: std_dev * std_dev }
    }

    pub fn exact(value: f64) -> Self {
        Self { value, variance: 0.0 }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// ln(a): d/da = 1/a, so var = σ²/a².
    pub fn ln(self) -> Self {
        Self {
            value: self.value.ln(),
            variance: self.variance / (self.value * self.value),
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} ± {:.*}", p, self.value, p, self.std_dev()),
            None => write!(f, "{} ± {}", self.value, self.std_dev()),
        }
    }
}

impl From<f64> for Measurement {
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}

impl Neg for Measurement {
    type Output = Self;
    fn neg(self) -> Self {
        Self { value: -self.value, variance: self.variance }
    }
}

impl Add for Measurement {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            variance: self.variance + rhs.variance,
        }
    }
}

impl Sub for Measurement {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
            variance: self.variance + rhs.variance,
        }
    }
}

impl Add<f64> for Measurement {
    type Output = Self;
    fn add(self, rhs: f64) -> Self {
        Self { value: self.value + rhs, ..self }
    }
}

impl Sub<f64> for Measurement {
    type Output = Self;
    fn sub(self, rhs: f64) -> Self {
        Self { value: self.value - rhs, ..self }
    }
}

impl Mul<f64> for Measurement {
    type Output = Self;
    fn mul(self, k: f64) -> Self {
        Self {
            value: self.value * k,
            variance: self.variance * k * k,
        }
    }
}

impl Mul<Measurement> for f64 {
    type Output = Measurement;
    fn mul(self, m: Measurement) -> Measurement {
        m * self
    }
}

impl Div<f64> for Measurement {
    type Output = Self;
    fn div(self, k: f64) -> Self {
        Self {
            value: self.value / k,
            variance: self.variance / (k * k),
        }
    }
}

impl Mul for Measurement {
    type Output = Self;
    // var = b²σa² + a²σb²
    fn mul(self, rhs: Self) -> Self {
        Self {
            value: self.value * rhs.value,
            variance: rhs.value * rhs.value * self.variance
                + self.value * self.value * rhs.variance,
        }
    }
}

impl Div for Measurement {
    type Output = Self;
    // var = σa²/b² + a²σb²/b⁴
    fn div(self, rhs: Self) -> Self {
        let b2 = rhs.value * rhs.value;
        Self {
            value: self.value / rhs.value,
            variance: self.variance / b2 + self.value * self.value * rhs.variance / (b2 * b2),
        }
    }
}

impl Sum for Measurement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::exact(0.0), |acc, m| acc + m)
    }
}
