//! Three- and four-vector algebra plus the closed-form beam and momentum-transfer kinematics.
//!
//! Four-vectors use the `(px, py, pz, E)` convention with metric `(+, -, -, -)` applied as
//! `E² - |p|²`.

use std::f64::consts::PI;
use std::ops::{Add, Mul, Neg, Sub};

/// Cartesian three-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Transverse component with respect to the z axis.
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle; `0` for the null vector.
    pub fn theta(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 && self.z == 0.0 {
            0.0
        } else {
            self.perp().atan2(self.z)
        }
    }

    /// Azimuthal angle in `(-π, π]`; `0` for a vector along z.
    pub fn phi(&self) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            0.0
        } else {
            self.y.atan2(self.x)
        }
    }

    /// Unit vector in the same direction; the null vector stays null.
    pub fn unit(&self) -> Self {
        let m = self.mag();
        if m > 0.0 { *self * (1.0 / m) } else { *self }
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Energy-momentum four-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourVector {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourVector {
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Build from a momentum and an invariant mass; a negative mass yields a space-like vector
    /// (energy clamped at zero).
    pub fn from_xyzm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self::from_vect_m(Vector3::new(x, y, z), m)
    }

    pub fn from_vect_m(p: Vector3, m: f64) -> Self {
        let e = (p.mag2() + m * m.abs()).max(0.0).sqrt();
        Self::from_vect_e(p, e)
    }

    pub fn from_vect_e(p: Vector3, e: f64) -> Self {
        Self::new(p.x, p.y, p.z, e)
    }

    pub fn vect(&self) -> Vector3 {
        Vector3::new(self.px, self.py, self.pz)
    }

    /// Minkowski square `E² - |p|²`.
    pub fn mag2(&self) -> f64 {
        self.e * self.e - self.vect().mag2()
    }

    /// Invariant mass squared (alias of [`Self::mag2`]).
    pub fn m2(&self) -> f64 {
        self.mag2()
    }

    /// Invariant mass; negative for space-like vectors.
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 { -(-m2).sqrt() } else { m2.sqrt() }
    }

    /// Momentum magnitude.
    pub fn p(&self) -> f64 {
        self.vect().mag()
    }

    pub fn theta(&self) -> f64 {
        self.vect().theta()
    }

    pub fn phi(&self) -> f64 {
        self.vect().phi()
    }
}

impl Add for FourVector {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.px + rhs.px, self.py + rhs.py, self.pz + rhs.pz, self.e + rhs.e)
    }
}

impl Sub for FourVector {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.px - rhs.px, self.py - rhs.py, self.pz - rhs.pz, self.e - rhs.e)
    }
}

impl Neg for FourVector {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.px, -self.py, -self.pz, -self.e)
    }
}

pub fn radians_to_degrees(angle: f64) -> f64 {
    (angle / PI) * 180.0
}

/// Reconstruct the beam four-vector of an exclusive reaction `beam + target → X + recoil`.
///
/// The beam direction is `(grad_x, grad_y, 1)`; its momentum is solved from the requirement that
/// the recoil has the target mass, with the target at rest. If no physical solution exists the
/// beam at rest `(0, 0, 0, beam_mass)` is returned.
pub fn beam_four_vector(
    grad_x: f64,
    grad_y: f64,
    x: &FourVector,
    beam_mass: f64,
    target_mass: f64,
) -> FourVector {
    let direction = Vector3::new(grad_x, grad_y, 1.0).unit();
    let at_rest = FourVector::new(0.0, 0.0, 0.0, beam_mass);

    // E_b·d + k·a = c, with E_b = sqrt(k² + m_b²).
    let a = direction.dot(&x.vect());
    let d = target_mass - x.e;
    let c = target_mass * x.e - 0.5 * (beam_mass * beam_mass + x.m2());

    let quad = d * d - a * a;
    let lin = 2.0 * a * c;
    let cst = d * d * beam_mass * beam_mass - c * c;

    let candidates: Vec<f64> = if quad.abs() < f64::EPSILON * (d * d).max(1.0) {
        if lin == 0.0 { Vec::new() } else { vec![-cst / lin] }
    } else {
        let disc = lin * lin - 4.0 * quad * cst;
        if disc < 0.0 {
            Vec::new()
        } else {
            let root = disc.sqrt();
            vec![(-lin + root) / (2.0 * quad), (-lin - root) / (2.0 * quad)]
        }
    };

    // Squaring admits roots of E_b·d = -(c - k·a); keep only those of the original equation.
    let consistent = |k: f64| {
        let energy = (k * k + beam_mass * beam_mass).sqrt();
        let lhs = energy * d;
        let rhs = c - k * a;
        (lhs - rhs).abs() <= 1e-6 * lhs.abs().max(rhs.abs()).max(1.0)
    };
    let momentum = candidates
        .into_iter()
        .filter(|k| k.is_finite() && *k > 0.0 && consistent(*k))
        .fold(None, |best: Option<f64>, k| Some(best.map_or(k, |b| b.max(k))));

    match momentum {
        Some(k) => FourVector::from_vect_m(direction * k, beam_mass),
        None => at_rest,
    }
}

/// Squared four-momentum transfer `t`, its kinematic minimum `t_min` and `t' = t - t_min`.
///
/// `t_min` is `0` when the beam three-momentum vanishes.
pub fn momentum_transfer(beam: &FourVector, x: &FourVector) -> (f64, f64, f64) {
    let t = (*beam - *x).mag2().abs();
    let p2 = beam.vect().mag2();
    let t_min = if p2 == 0.0 {
        0.0
    } else {
        ((x.m2() - beam.m2()).powi(2) / (4.0 * p2)).abs()
    };
    (t, t_min, t - t_min)
}
