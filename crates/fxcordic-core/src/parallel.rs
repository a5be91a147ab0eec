//! Parallel Batch Conversion
//!
//! Independent driver calls share nothing but the read-only micro-step table
//! and gain constant, so batches split across Rayon's pool without locking.
//! Enable with the `parallel` feature flag (on by default).
//!
//! For a handful of samples the sequential drivers are faster; the pool only
//! pays off on large stimulus sets.

use rayon::prelude::*;

use crate::angle::FixedAngle;
use crate::driver::{PolarSample, RectSample, RotationDriver, VectoringDriver};
use crate::fixed::FixedScalar;

/// Rotate many `(magnitude, angle)` pairs in parallel; output order matches input.
pub fn rotate_batch(driver: &RotationDriver, inputs: &[(FixedScalar, FixedAngle)]) -> Vec<RectSample> {
    inputs
        .par_iter()
        .map(|&(magnitude, angle)| driver.run(magnitude, angle))
        .collect()
}

/// Vector many `(x, y)` pairs in parallel; output order matches input.
pub fn vector_batch(driver: &VectoringDriver, inputs: &[(FixedScalar, FixedScalar)]) -> Vec<PolarSample> {
    inputs
        .par_iter()
        .map(|&(x, y)| driver.run(x, y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CordicConfig, CordicEngine};

    #[test]
    fn test_batches_match_sequential() {
        let engine = CordicEngine::new(CordicConfig::new(32, 16)).unwrap();
        let s = engine.scalar_format();
        let a = engine.angle_format();

        let rot_inputs: Vec<_> = (0..64)
            .map(|k| (s.wrap(500 + 100 * k), a.from_degrees(k as f64 * 5.5).unwrap()))
            .collect();
        let rotation = engine.rotation();
        let parallel = rotate_batch(&rotation, &rot_inputs);
        let sequential: Vec<_> = rot_inputs.iter().map(|&(m, t)| rotation.run(m, t)).collect();
        assert_eq!(parallel, sequential);

        let vec_inputs: Vec<_> = (0..64)
            .map(|k| (s.wrap(4000 - 120 * k), s.wrap(-3000 + 90 * k)))
            .collect();
        let vectoring = engine.vectoring();
        let parallel = vector_batch(&vectoring, &vec_inputs);
        let sequential: Vec<_> = vec_inputs.iter().map(|&(x, y)| vectoring.run(x, y)).collect();
        assert_eq!(parallel, sequential);
    }
}
