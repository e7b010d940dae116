use crate::error::RangeError;
use rand::Rng;

/// A raw position on the plane, in Braille dot units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Sample uniformly from `[min, max)`.
pub fn random_number<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> Result<f64, RangeError> {
    if !(max > min) {
        return Err(RangeError::InvalidRange { min, max });
    }
    Ok(rng.gen::<f64>() * (max - min) + min)
}

/// Like [`random_number`], rounded to the nearest integer. Can return `max`.
pub fn random_rounded<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> Result<f64, RangeError> {
    random_number(rng, min, max).map(f64::round)
}

pub fn distance_between(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}
