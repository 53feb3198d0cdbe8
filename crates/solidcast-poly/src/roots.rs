//! Real-coefficient polynomial root finding, degree <= 4.
//!
//! Closed forms (Ferrari, Cardano) are tried first for quartics and cubics
//! and accepted only when every proposed root passes a residual check.
//! Otherwise roots are extracted one at a time by Laguerre iteration and
//! synthetic-division deflation until a quadratic remains.

use crate::complex::Complex;
use thiserror::Error;

/// Highest polynomial degree the solver accepts.
pub const MAX_DEGREE: usize = 4;

/// Coefficients below this magnitude are treated as zero.
const SMALL: f64 = 1.0e-10;

/// Residual magnitude a closed-form root must beat to be accepted.
const RESIDUAL_TOL: f64 = 1.0e-5;

/// Laguerre iteration cap.
const MAX_ITER: usize = 20;

/// Proportional convergence bound: squared step vs squared root magnitude.
const CONVERGENCE: f64 = 1.0e-20;

/// Errors from the root solver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RootsError {
    /// Laguerre iteration did not converge within the cap. The roots found
    /// before the failure are already in the output buffer; treat the short
    /// list as possibly incomplete, not as a hard error.
    #[error("root finder failed to converge ({found} roots found)")]
    NonConvergence {
        /// Number of roots written to the buffer before the failure.
        found: usize,
    },
    /// No non-zero coefficient of positive degree remained after reduction.
    #[error("degenerate polynomial, no roots to find")]
    Degenerate,
    /// The caller-supplied buffer is smaller than the polynomial degree.
    #[error("root buffer holds {got} entries, need {need}")]
    BufferTooSmall {
        /// Entries required (the reduced degree).
        need: usize,
        /// Entries supplied.
        got: usize,
    },
}

/// A real-coefficient polynomial of degree <= 4.
///
/// `cf[0]` is the leading coefficient; `cf[dgr]` the constant term.
/// The solver consumes the polynomial: reduction, normalization and
/// deflation all mutate it in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polynomial {
    /// Degree of the polynomial.
    pub dgr: usize,
    /// Coefficients, highest order first.
    pub cf: [f64; MAX_DEGREE + 1],
}

impl Polynomial {
    /// Build a polynomial from coefficients, highest order first.
    ///
    /// Panics if more than `MAX_DEGREE + 1` coefficients are supplied;
    /// primitives construct their intersection polynomials with fixed-size
    /// literals so this is a programming error, not a runtime condition.
    pub fn new(coeffs: &[f64]) -> Self {
        assert!(
            !coeffs.is_empty() && coeffs.len() <= MAX_DEGREE + 1,
            "polynomial must have 1..={} coefficients",
            MAX_DEGREE + 1
        );
        let mut cf = [0.0; MAX_DEGREE + 1];
        cf[..coeffs.len()].copy_from_slice(coeffs);
        Self {
            dgr: coeffs.len() - 1,
            cf,
        }
    }

    /// Build a quartic `a*x^4 + b*x^3 + c*x^2 + d*x + e`.
    pub fn quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Self {
        Self::new(&[a, b, c, d, e])
    }

    /// Build a quadratic `a*x^2 + b*x + c`.
    pub fn quadratic(a: f64, b: f64, c: f64) -> Self {
        Self::new(&[a, b, c])
    }

    /// Evaluate at a real argument by Horner's rule.
    pub fn eval(&self, x: f64) -> f64 {
        let mut acc = self.cf[0];
        for i in 1..=self.dgr {
            acc = acc * x + self.cf[i];
        }
        acc
    }

    /// Evaluate at a complex argument by Horner's rule.
    pub fn eval_complex(&self, z: Complex) -> Complex {
        let mut acc = Complex::real(self.cf[0]);
        for i in 1..=self.dgr {
            acc = acc * z + Complex::real(self.cf[i]);
        }
        acc
    }

    /// Synthetic division: `self = quotient * divisor + remainder`.
    ///
    /// Returns `(quotient, remainder)`. The divisor's degree must not
    /// exceed the dividend's.
    pub fn synthetic_division(&self, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        debug_assert!(divisor.dgr <= self.dgr);
        let mut rem = *self;
        let mut quo = Polynomial {
            dgr: self.dgr - divisor.dgr,
            cf: [0.0; MAX_DEGREE + 1],
        };
        for i in 0..=quo.dgr {
            quo.cf[i] = rem.cf[i] / divisor.cf[0];
            for j in 0..=divisor.dgr {
                rem.cf[i + j] -= quo.cf[i] * divisor.cf[j];
            }
        }
        rem.dgr = divisor.dgr.saturating_sub(1);
        // shift the surviving remainder coefficients down to the front
        let lead = self.dgr - rem.dgr;
        for j in 0..=rem.dgr {
            rem.cf[j] = rem.cf[j + lead];
        }
        for c in rem.cf[rem.dgr + 1..].iter_mut() {
            *c = 0.0;
        }
        (quo, rem)
    }

    /// Find all roots of the polynomial.
    ///
    /// Roots are written to `out`, which must hold at least `dgr` entries
    /// after degenerate-leading-coefficient reduction. Real roots have a
    /// zero imaginary part; complex roots appear in conjugate pairs.
    ///
    /// On [`RootsError::NonConvergence`] the roots found so far are already
    /// in `out` (the count is carried in the error); the caller decides
    /// whether a partial set is usable. Non-convergence is logged here and
    /// must not be escalated to a panic.
    pub fn find_roots(mut self, out: &mut [Complex]) -> Result<usize, RootsError> {
        // Strip degenerate leading coefficients.
        while self.dgr > 0 && self.cf[0].abs() < SMALL {
            for i in 0..self.dgr {
                self.cf[i] = self.cf[i + 1];
            }
            self.cf[self.dgr] = 0.0;
            self.dgr -= 1;
        }
        if self.dgr == 0 {
            return Err(RootsError::Degenerate);
        }
        if out.len() < self.dgr {
            return Err(RootsError::BufferTooSmall {
                need: self.dgr,
                got: out.len(),
            });
        }

        let mut n = 0;

        // A zero constant term is an exact root at the origin.
        while self.dgr > 0 && self.cf[self.dgr] == 0.0 {
            out[n] = Complex::ZERO;
            n += 1;
            self.dgr -= 1;
        }
        if self.dgr == 0 {
            return Ok(n);
        }

        // Normalize to monic form.
        if self.cf[0] != 1.0 {
            let lead = self.cf[0];
            for c in self.cf[..=self.dgr].iter_mut() {
                *c /= lead;
            }
        }

        // Closed forms first, gated on a residual check against the
        // (still undeflated) monic polynomial.
        if self.dgr == 4 {
            if self.quartic_roots(&mut out[n..]) && self.roots_pass_residual(&out[n..n + 4]) {
                return Ok(n + 4);
            }
        } else if self.dgr == 3
            && self.cubic_roots(&mut out[n..])
            && self.roots_pass_residual(&out[n..n + 3])
        {
            return Ok(n + 3);
        }

        // Laguerre iteration with deflation until a quadratic remains.
        while self.dgr > 2 {
            let z = match self.laguerre(Complex::new(0.0, SMALL)) {
                Some(z) => z,
                None => {
                    log::warn!(
                        "polynomial root finder failed to converge, {} of {} roots found",
                        n,
                        n + self.dgr
                    );
                    return Err(RootsError::NonConvergence { found: n });
                }
            };
            if z.im.abs() > 1.0e-5 * z.re.abs() {
                // Real coefficients: complex roots come in conjugate pairs,
                // so the second root is free.
                out[n] = z;
                out[n + 1] = z.conj();
                n += 2;
                let divisor =
                    Polynomial::quadratic(1.0, -2.0 * z.re, z.re * z.re + z.im * z.im);
                self = self.synthetic_division(&divisor).0;
            } else {
                out[n] = Complex::real(z.re);
                n += 1;
                let divisor = Polynomial::new(&[1.0, -z.re]);
                self = self.synthetic_division(&divisor).0;
            }
        }

        match self.dgr {
            2 => {
                self.quadratic_roots(&mut out[n..]);
                n += 2;
            }
            1 => {
                out[n] = Complex::real(-self.cf[1]);
                n += 1;
            }
            _ => {}
        }
        Ok(n)
    }

    /// One Laguerre root search from the given seed.
    fn laguerre(&self, mut z: Complex) -> Option<Complex> {
        let n = self.dgr as f64;
        for _ in 0..MAX_ITER {
            let (p0, p1, p2) = self.eval_with_derivs(z);
            if p0.mag_sq() < 1.0e-24 {
                return Some(z);
            }
            let g = p1 / p0;
            let g2 = g * g;
            let h = g2 - p2 / p0;
            let sq = ((h.scale(n) - g2).scale(n - 1.0)).sqrt();
            let d1 = g + sq;
            let d2 = g - sq;
            // The larger denominator gives the smaller, safer step.
            let denom = if d1.mag_sq() >= d2.mag_sq() { d1 } else { d2 };
            if denom.mag_sq() == 0.0 {
                return None;
            }
            let step = Complex::real(n) / denom;
            z = z - step;
            if step.mag_sq() < CONVERGENCE * z.mag_sq() {
                return Some(z);
            }
        }
        None
    }

    /// Polynomial value and first two derivatives at `z`, by synthetic
    /// (Horner-style) division.
    fn eval_with_derivs(&self, z: Complex) -> (Complex, Complex, Complex) {
        let mut p0 = Complex::real(self.cf[0]);
        let mut p1 = Complex::ZERO;
        let mut p2 = Complex::ZERO;
        for i in 1..=self.dgr {
            p2 = p2 * z + p1;
            p1 = p1 * z + p0;
            p0 = p0 * z + Complex::real(self.cf[i]);
        }
        (p0, p1, p2.scale(2.0))
    }

    /// Residual gate for closed-form candidates.
    fn roots_pass_residual(&self, roots: &[Complex]) -> bool {
        roots
            .iter()
            .all(|&r| self.eval_complex(r).magnitude() < RESIDUAL_TOL)
    }

    /// Roots of the monic quadratic `x^2 + cf[1]*x + cf[2]`. Writes 2 roots.
    fn quadratic_roots(&self, out: &mut [Complex]) {
        let b = self.cf[1];
        let c = self.cf[2];
        let disc = b * b - 4.0 * c;
        if disc >= 0.0 {
            let sq = disc.sqrt();
            out[0] = Complex::real((-b - sq) / 2.0);
            out[1] = Complex::real((-b + sq) / 2.0);
        } else {
            let im = (-disc).sqrt() / 2.0;
            out[0] = Complex::new(-b / 2.0, im);
            out[1] = Complex::new(-b / 2.0, -im);
        }
    }

    /// Cardano roots of the monic cubic. Writes 3 roots; returns success.
    fn cubic_roots(&self, out: &mut [Complex]) -> bool {
        let a = self.cf[1];
        let b = self.cf[2];
        let c = self.cf[3];
        let shift = a / 3.0;

        // Depressed cubic t^3 + p*t + q via x = t - a/3.
        let p = b - a * a / 3.0;
        let q = c + (2.0 * a * a * a - 9.0 * a * b) / 27.0;
        let delta = q * q / 4.0 + p * p * p / 27.0;

        if delta > SMALL {
            // One real root, one conjugate pair.
            let sd = delta.sqrt();
            let u = (-q / 2.0 + sd).cbrt();
            let v = (-q / 2.0 - sd).cbrt();
            out[0] = Complex::real(u + v - shift);
            let re = -(u + v) / 2.0 - shift;
            let im = (u - v) * 3.0_f64.sqrt() / 2.0;
            out[1] = Complex::new(re, im);
            out[2] = Complex::new(re, -im);
        } else if delta.abs() <= SMALL {
            // Multiple roots.
            let u = (-q / 2.0).cbrt();
            out[0] = Complex::real(2.0 * u - shift);
            out[1] = Complex::real(-u - shift);
            out[2] = Complex::real(-u - shift);
        } else {
            // Three distinct real roots (trigonometric form).
            let m = 2.0 * (-p / 3.0).sqrt();
            let theta = (3.0 * q / (p * m)).clamp(-1.0, 1.0).acos() / 3.0;
            let third = 2.0 * std::f64::consts::PI / 3.0;
            out[0] = Complex::real(m * theta.cos() - shift);
            out[1] = Complex::real(m * (theta - third).cos() - shift);
            out[2] = Complex::real(m * (theta + third).cos() - shift);
        }
        true
    }

    /// Ferrari roots of the monic quartic via a resolvent cubic.
    ///
    /// Writes 4 roots on success. Returns `false` when no workable real
    /// resolvent root or factor pairing exists; the caller falls back to
    /// Laguerre iteration.
    fn quartic_roots(&self, out: &mut [Complex]) -> bool {
        let a = self.cf[1];
        let b = self.cf[2];
        let c = self.cf[3];
        let d = self.cf[4];

        let resolvent = Polynomial::new(&[
            1.0,
            -b,
            a * c - 4.0 * d,
            -c * c - d * a * a + 4.0 * d * b,
        ]);
        let mut cube = [Complex::ZERO; 3];
        if !resolvent.cubic_roots(&mut cube) {
            return false;
        }
        let y = match cube
            .iter()
            .find(|r| r.im.abs() < 1.0e-8 * (1.0 + r.re.abs()))
        {
            Some(r) => r.re,
            None => return false,
        };

        let p = a * a / 4.0 - b + y;
        let q = y * y / 4.0 - d;
        if p < -SMALL || q < -SMALL {
            return false;
        }
        let sp = p.max(0.0).sqrt();
        let sq = q.max(0.0).sqrt();

        let q1 = a / 2.0 - sp;
        let q2 = a / 2.0 + sp;
        let q3 = y / 2.0 - sq;
        let q4 = y / 2.0 + sq;

        // The x-coefficient decides how the constant terms pair up.
        let pair_tol = 1.0e-4 * c.abs().max(1.0);
        let (k1, k2) = if (q1 * q3 + q2 * q4 - c).abs() < pair_tol {
            (q4, q3)
        } else if (q1 * q4 + q2 * q3 - c).abs() < pair_tol {
            (q3, q4)
        } else {
            return false;
        };

        Polynomial::quadratic(1.0, q1, k1).quadratic_roots(&mut out[0..2]);
        Polynomial::quadratic(1.0, q2, k2).quadratic_roots(&mut out[2..4]);
        true
    }
}
