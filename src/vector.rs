//! 3-component numeric vector used by probabilistic vector parameters.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A 3-component vector of `f64`, the value shape of keys like
/// `Rocket.velocity (0 0 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// The input was not three numbers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a 3-component vector")]
pub struct ParseVec3Error {
    input: String,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Iterates over the components in `x`, `y`, `z` order.
    pub fn iter(&self) -> std::array::IntoIter<f64, 3> {
        [self.x, self.y, self.z].into_iter()
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(c: [f64; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl FromStr for Vec3 {
    type Err = ParseVec3Error;

    /// Parses three numbers separated by whitespace and/or commas, optionally
    /// wrapped in one pair of parentheses: `"(0 0 0)"`, `"0, 1.5, -2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVec3Error { input: s.to_string() };

        let trimmed = s.trim();
        let inner = match (trimmed.starts_with('('), trimmed.ends_with(')')) {
            (true, true) => &trimmed[1..trimmed.len() - 1],
            (false, false) => trimmed,
            _ => return Err(err()),
        };

        let mut components = [0.0f64; 3];
        let mut count = 0;
        for part in inner.split(|c: char| c.is_whitespace() || c == ',') {
            if part.is_empty() {
                continue;
            }
            if count == 3 {
                return Err(err());
            }
            components[count] = part.parse().map_err(|_| err())?;
            count += 1;
        }
        if count != 3 {
            return Err(err());
        }

        Ok(Vec3::from(components))
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.x, self.y, self.z)
    }
}
