//! Least-squares rigid superposition (Kabsch).
//!
//! Finds the rotation and translation that bring a mobile point set onto a
//! reference point set with minimal RMSD, using the SVD of the 3×3
//! covariance matrix. Improper rotations are corrected by flipping the axis
//! of the smallest singular value.

use nalgebra::{Matrix3, Vector3};

/// Rigid transform taking mobile coordinates onto the reference
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// RMSD after applying the transform (Å)
    pub rmsd: f64,
}

impl Superposition {
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let moved = self.rotation * Vector3::from(*point) + self.translation;
        [moved.x, moved.y, moved.z]
    }
}

fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p);
    sum / points.len() as f64
}

/// Superimposes `mobile` onto `reference`.
///
/// Returns `None` for empty or mismatched inputs, or when the SVD fails.
pub fn superimpose(reference: &[[f64; 3]], mobile: &[[f64; 3]]) -> Option<Superposition> {
    if reference.is_empty() || reference.len() != mobile.len() {
        return None;
    }

    let reference: Vec<Vector3<f64>> = reference.iter().map(|p| Vector3::from(*p)).collect();
    let mobile: Vec<Vector3<f64>> = mobile.iter().map(|p| Vector3::from(*p)).collect();
    let ref_center = centroid(&reference);
    let mobile_center = centroid(&mobile);

    let mut covariance = Matrix3::<f64>::zeros();
    for (m, r) in mobile.iter().zip(&reference) {
        covariance += (m - mobile_center) * (r - ref_center).transpose();
    }

    let svd = covariance.svd(true, true);
    let u = svd.u?;
    let v = svd.v_t?.transpose();

    let mut rotation = v * u.transpose();
    if rotation.determinant() < 0.0 {
        let weakest = svd.singular_values.imin();
        let mut v_fixed = v;
        v_fixed.column_mut(weakest).neg_mut();
        rotation = v_fixed * u.transpose();
    }
    let translation = ref_center - rotation * mobile_center;

    let sum_sq: f64 = mobile
        .iter()
        .zip(&reference)
        .map(|(m, r)| (rotation * m + translation - r).norm_squared())
        .sum();
    let rmsd = (sum_sq / reference.len() as f64).sqrt();

    Some(Superposition {
        rotation,
        translation,
        rmsd,
    })
}

/// Superposition RMSD, or +∞ when fewer than two point pairs are given
/// or the sets differ in length.
pub fn superposition_rmsd(reference: &[[f64; 3]], mobile: &[[f64; 3]]) -> f64 {
    if reference.len() < 2 || reference.len() != mobile.len() {
        return f64::INFINITY;
    }
    superimpose(reference, mobile).map_or(f64::INFINITY, |s| s.rmsd)
}
