/// Euclidean length of `v`, accumulated in f64 so long f32 vectors keep precision.
#[must_use]
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt()
}

/// Rescale `v` to unit length.
///
/// Returns `None` for a zero (or non-finite) norm; callers turn that into a
/// typed error carrying the offending entry.
#[must_use]
pub fn normalize(v: &[f32]) -> Option<Vec<f32>> {
    let norm = l2_norm(v);
    if norm == 0.0 || !norm.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    Some(v.iter().map(|x| (f64::from(*x) / norm) as f32).collect())
}

/// Dot product; equals cosine similarity when both sides are unit vectors.
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_vectors_have_unit_length() {
        for raw in [
            vec![3.0, 4.0],
            vec![0.5, 0.0],
            vec![-1e-3, 2e-3, 7e-4],
            vec![1e6, -2e6, 3e6, 4e6],
        ] {
            let unit = normalize(&raw).unwrap();
            assert!((l2_norm(&unit) - 1.0).abs() < 1e-6, "{raw:?}");
        }
    }

    #[test]
    fn normalization_preserves_direction() {
        let unit = normalize(&[3.0, 4.0]).unwrap();
        assert!((unit[0] - 0.6).abs() < 1e-6);
        assert!((unit[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_cannot_be_normalized() {
        assert!(normalize(&[0.0, 0.0, 0.0]).is_none());
        assert!(normalize(&[]).is_none());
        assert!(normalize(&[f32::NAN, 1.0]).is_none());
    }

    #[test]
    fn dot_of_unit_vectors_is_cosine() {
        let a = normalize(&[1.0, 1.0]).unwrap();
        let b = normalize(&[1.0, 0.0]).unwrap();
        assert!((dot(&a, &b) - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((dot(&a, &a) - 1.0).abs() < 1e-6);
    }
}
