//! Coordinate bounds checks for new points

/// Decides whether a point coordinate lies inside a dataset.
pub trait PointValidator {
    fn validate_point(&self, coordinate: &[i64]) -> bool;
}

/// Voxel bounds of the MICrONS minnie65 volume (inclusive).
#[derive(Debug, Clone, Copy, Default)]
pub struct Minnie65Validator;

impl Minnie65Validator {
    pub const X: (i64, i64) = (13_824, 226_816);
    pub const Y: (i64, i64) = (13_824, 194_048);
    pub const Z: (i64, i64) = (14_816, 27_904);
}

impl PointValidator for Minnie65Validator {
    fn validate_point(&self, coordinate: &[i64]) -> bool {
        let [x, y, z] = coordinate else {
            return false;
        };
        (Self::X.0..=Self::X.1).contains(x)
            && (Self::Y.0..=Self::Y.1).contains(y)
            && (Self::Z.0..=Self::Z.1).contains(z)
    }
}
