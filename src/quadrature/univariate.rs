//! Gauss-Legendre quadrature for the reference interval `[-1, 1]`.
use std::f64::consts::PI;

/// Evaluates the Legendre polynomial `P_n` and its derivative at `x`.
///
/// The derivative formula divides by `x^2 - 1`, so this is only valid in the
/// open interval `(-1, 1)`. That is sufficient here since all Gauss points are
/// interior.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    // Recurrence: m P_m(x) = (2m - 1) x P_{m-1}(x) - (m - 1) P_{m-2}(x)
    let mut current = 1.0;
    let mut previous = 0.0;
    for m in 1..=n {
        let m = m as f64;
        let next = ((2.0 * m - 1.0) * x * current - (m - 1.0) * previous) / m;
        previous = current;
        current = next;
    }
    let derivative = if n == 0 {
        0.0
    } else {
        (n as f64) * (x * current - previous) / (x * x - 1.0)
    };
    (current, derivative)
}

/// The Gauss-Legendre rule with the given number of points on `[-1, 1]`.
///
/// Returns `(weights, points)`. An `n`-point rule integrates polynomials of
/// degree up to `2n - 1` exactly.
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> (Vec<f64>, Vec<f64>) {
    let n = num_points;
    assert!(n > 0, "number of quadrature points must be positive");

    let mut weights = vec![0.0; n];
    let mut points = vec![0.0; n];

    // Roots come in symmetric pairs, so only the first half needs Newton iteration
    let m = (n + 1) / 2;
    for i in 0..m {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp;
        loop {
            let (p, dp_new) = legendre(n, x);
            dp = dp_new;
            let dx = -p / dp;
            x += dx;
            if dx.abs() <= 1e-15 {
                break;
            }
        }

        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        points[i] = x;
        weights[i] = w;
        points[n - 1 - i] = -x;
        weights[n - 1 - i] = w;
    }

    (weights, points)
}
