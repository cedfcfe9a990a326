use std::ops::{Add, Mul, Sub};

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn offset(self, amount: f64) -> Self {
        Self::new(self.x + amount, self.y + amount)
    }

    pub fn mag(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dist(self, target: Self) -> f64 {
        (target - self).mag()
    }

    /// Unit vector; the zero vector stays zero.
    pub fn normalize(self) -> Self {
        let m = self.mag();
        if m > 0.0 {
            Self::new(self.x / m, self.y / m)
        } else {
            self
        }
    }

    pub fn direction_to(self, target: Self) -> Self {
        (target - self).normalize()
    }

    pub fn lerp(&mut self, target: Self, t: f64) {
        self.x = (1.0 - t) * self.x + t * target.x;
        self.y = (1.0 - t) * self.y + t * target.y;
    }
}

impl Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn dist_is_symmetric() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(4.0, 6.0);
        assert!(approx_eq(a.dist(b), 5.0));
        assert!(approx_eq(b.dist(a), 5.0));
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        assert_eq!(Vector::ZERO.normalize(), Vector::ZERO);
        let unit = Vector::new(3.0, 4.0).normalize();
        assert!(approx_eq(unit.mag(), 1.0));
    }

    #[test]
    fn lerp_moves_fraction_of_the_way() {
        let mut pos = Vector::new(0.0, 0.0);
        pos.lerp(Vector::new(10.0, -10.0), 0.25);
        assert!(approx_eq(pos.x, 2.5));
        assert!(approx_eq(pos.y, -2.5));

        pos.lerp(Vector::new(10.0, -10.0), 1.0);
        assert_eq!(pos, Vector::new(10.0, -10.0));
    }

    #[test]
    fn direction_to_scales_into_velocity() {
        let from = Vector::new(0.0, 0.0);
        let vel = from.direction_to(Vector::new(0.0, 50.0)) * 2.0;
        assert_eq!(vel, Vector::new(0.0, 2.0));
        assert_eq!(from.offset(1.5), Vector::new(1.5, 1.5));
    }
}
