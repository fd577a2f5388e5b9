//! Vector and matrix operations used by the analysers and taste operations.
//!
//! Coordinates are stored as `f32`; accumulation happens in `f64` to keep
//! the error of long sums below what the rating scale can resolve.

/// Creates and returns a transposed copy of the provided row-major matrix.
pub fn transpose(matrix: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let n = matrix.len();
    let k = matrix.first().map_or(0, |row| row.len());
    let mut transposed = vec![vec![0.0f32; n]; k];
    for (i, row) in matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            transposed[j][i] = value;
        }
    }
    transposed
}

/// Applies an `R^n -> R` function to each column of an `n x d` matrix and
/// collects the results into a `d`-dimensional vector.
pub fn by_col<F>(matrix: &[Vec<f32>], f: F) -> Vec<f32>
where
    F: Fn(&[f32]) -> f64,
{
    transpose(matrix).iter().map(|col| f(col) as f32).collect()
}

/// Euclidean norm between two points of equal dimensionality.
pub fn norm2(p1: &[f32], p2: &[f32]) -> f32 {
    let mut result = 0.0f64;
    for (&a, &b) in p1.iter().zip(p2) {
        let (a, b) = (a as f64, b as f64);
        result += a * a - 2.0 * a * b + b * b;
    }
    result.sqrt() as f32
}

/// Mean value of the provided vector.
pub fn mean(x: &[f32]) -> f64 {
    let total: f64 = x.iter().map(|&v| v as f64).sum();
    total / x.len() as f64
}

/// Sum of all values, using Kahan's summation algorithm for numerical
/// stability on long inputs.
pub fn sum(x: &[f32]) -> f32 {
    let mut total = 0.0f64;
    let mut c = 0.0f64;
    for &v in x {
        let y = v as f64 - c;
        let t = total + y;
        c = (t - total) - y;
        total = t;
    }
    total as f32
}

/// Scale and translate a vector: `a*x + b` element-wise.
pub fn axpb(x: &[f32], a: f32, b: f32) -> Vec<f32> {
    x.iter().map(|&v| a * v + b).collect()
}

/// In-place element-wise addition; the result lands in `x1`.
pub fn addi(x1: &mut [f32], x2: &[f32]) {
    for (a, &b) in x1.iter_mut().zip(x2) {
        *a += b;
    }
}

/// Sum of squared deviations from the provided target value.
pub fn sum_of_squared(x: &[f32], target: f64) -> f64 {
    x.iter()
        .map(|&v| {
            let d = v as f64 - target;
            d * d
        })
        .sum()
}

/// Population variance via Welford's online algorithm.
/// Returns NaN for inputs shorter than two elements.
pub fn variance(x: &[f32]) -> f32 {
    let mut count = 0usize;
    let mut mean = 0.0f64;
    let mut m2 = 0.0f64;
    for &v in x {
        count += 1;
        let delta = v as f64 - mean;
        mean += delta / count as f64;
        let delta2 = v as f64 - mean;
        m2 += delta * delta2;
    }
    if count > 1 {
        (m2 / count as f64) as f32
    } else {
        f32::NAN
    }
}
