use std::f64::consts::PI;

/// Numeric closeness used to classify rotation angles.
///
/// Matches the usual `isclose` rule: `|value - target| <= atol + rtol * |target|`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    pub rtol: f64,
    pub atol: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            rtol: 1e-5,
            atol: 1e-8,
        }
    }
}

impl Tolerance {
    pub fn is_close(&self, value: f64, target: f64) -> bool {
        (value - target).abs() <= self.atol + self.rtol * target.abs()
    }

    /// Compares two phase angles modulo `2π`.
    pub fn is_close_angle(&self, value: f64, target: f64) -> bool {
        let reduced = reduce_angle(value);
        // -π and π are the same phase
        self.is_close(reduced, target)
            || (target.abs() == PI && self.is_close(reduced.abs(), PI))
    }
}

/// Reduces an angle into `(-π, π]`.
pub fn reduce_angle(theta: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut r = theta.rem_euclid(two_pi);
    if r > PI {
        r -= two_pi;
    }
    r
}

#[derive(Clone, Debug, PartialEq)]
pub struct QotpConfig {
    pub tolerance: Tolerance,
    /// Smallest register a ciphertext may occupy, even for `ψ = 0`.
    pub min_register_width: usize,
    pub shots: usize,
}

impl Default for QotpConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            min_register_width: 2,
            shots: 1024,
        }
    }
}

impl QotpConfig {
    pub fn with_shots(shots: usize) -> Self {
        Self {
            shots,
            ..Default::default()
        }
    }
}
