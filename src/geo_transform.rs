use crate::errors::{GdalError, Result};

/// An affine transform.
///
/// A six-element array storing the coefficients of an [affine transform]
/// used in mapping coordinates between pixel/line `(P, L)` (raster) space,
/// and `(Xp,Yp)` (projection) space.
///
/// # Interpretation
///
/// A `GeoTransform`'s components have the following meanings:
///
///   * `GeoTransform[0]`: x-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[1]`: W-E pixel resolution (pixel width).
///   * `GeoTransform[2]`: row rotation (typically zero).
///   * `GeoTransform[3]`: y-coordinate of the upper-left corner of the upper-left pixel.
///   * `GeoTransform[4]`: column rotation (typically zero).
///   * `GeoTransform[5]`: N-S pixel resolution (pixel height), negative value for a North-up image.
///
/// so that
///
/// ```text
/// Xp = gt[0] + P * gt[1] + L * gt[2]
/// Yp = gt[3] + P * gt[4] + L * gt[5]
/// ```
///
/// # Usage
///  *  [`apply`](GeoTransformEx::apply): perform a `(P,L) -> (Xp,Yp)` transformation
///  *  [`invert`](GeoTransformEx::invert):  construct the inverse transformation coefficients
///     for computing `(Xp,Yp) -> (P,L)` transformations
///
/// # Example
///
/// ```rust
/// use geoaccess::{GeoTransform, GeoTransformEx};
///
/// let transform: GeoTransform = [768269.0, 1.0, 0.0, 4057292.0, 0.0, -1.0];
/// let (x, y) = transform.apply(0.0, 0.0);
/// assert_eq!((x, y), (768269.0, 4057292.0));
///
/// let inverse = transform.invert().into_result().unwrap();
/// assert_eq!(inverse.apply(x, y), (0.0, 0.0));
/// ```
///
/// [affine transform]: https://en.wikipedia.org/wiki/Affine_transformation
pub type GeoTransform = [f64; 6];

/// Below this (relative) magnitude the linear part of a transform is treated
/// as singular. Same threshold as `GDALInvGeoTransform`.
pub const DEGENERATE_DET_EPSILON: f64 = 1e-10;

/// The result of [`GeoTransformEx::invert`].
///
/// A non-invertible transform is an expected outcome, so it is reported through
/// [`status`](Self::status) rather than as an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvertedGeoTransform {
    transform: GeoTransform,
    status: i32,
}

impl InvertedGeoTransform {
    fn degenerate() -> Self {
        InvertedGeoTransform {
            transform: [0.0; 6],
            status: 0,
        }
    }

    /// `1` if the inversion succeeded, `0` if the input was degenerate.
    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == 1
    }

    /// The inverted coefficients. All zeros when [`is_valid`](Self::is_valid) is false.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Converts a degenerate inversion into an error.
    pub fn into_result(self) -> Result<GeoTransform> {
        if !self.is_valid() {
            return Err(GdalError::BadArgument(
                "Geo transform is uninvertible".to_string(),
            ));
        }
        Ok(self.transform)
    }
}

/// Extension methods on [`GeoTransform`]
pub trait GeoTransformEx {
    /// Apply GeoTransform to x/y coordinate.
    ///
    /// # Example
    ///
    /// See [`GeoTransform`](GeoTransform#example)
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64);

    /// Apply GeoTransform to an `(x, y)` point.
    fn apply_point(&self, point: (f64, f64)) -> (f64, f64) {
        self.apply(point.0, point.1)
    }

    /// Invert a [`GeoTransform`].
    ///
    /// Converts the equation from being pixel to geo to being geo to pixel.
    ///
    /// # Example
    ///
    /// See [`GeoTransform`](GeoTransform#example)
    fn invert(&self) -> InvertedGeoTransform;
}

impl GeoTransformEx for GeoTransform {
    fn apply(&self, pixel: f64, line: f64) -> (f64, f64) {
        let geo_x = self[0] + pixel * self[1] + line * self[2];
        let geo_y = self[3] + pixel * self[4] + line * self[5];
        (geo_x, geo_y)
    }

    fn invert(&self) -> InvertedGeoTransform {
        let gt = self;

        // No rotation: skip the determinant to avoid its precision loss.
        if gt[2] == 0.0 && gt[4] == 0.0 && gt[1] != 0.0 && gt[5] != 0.0 {
            return InvertedGeoTransform {
                transform: [
                    -gt[0] / gt[1],
                    1.0 / gt[1],
                    0.0,
                    -gt[3] / gt[5],
                    0.0,
                    1.0 / gt[5],
                ],
                status: 1,
            };
        }

        let det = gt[1] * gt[5] - gt[2] * gt[4];
        let magnitude = gt[1].abs().max(gt[2].abs()).max(gt[4].abs().max(gt[5].abs()));

        // `!(a > b)` rather than `a <= b` so a NaN determinant is rejected too.
        if !(det.abs() > DEGENERATE_DET_EPSILON * magnitude * magnitude) {
            return InvertedGeoTransform::degenerate();
        }

        let inv_det = 1.0 / det;

        InvertedGeoTransform {
            transform: [
                (gt[2] * gt[3] - gt[0] * gt[5]) * inv_det,
                gt[5] * inv_det,
                -gt[2] * inv_det,
                (-gt[1] * gt[3] + gt[0] * gt[4]) * inv_det,
                -gt[4] * inv_det,
                gt[1] * inv_det,
            ],
            status: 1,
        }
    }
}

fn geo_transform_from_slice(gt: &[f64]) -> Result<GeoTransform> {
    gt.try_into().map_err(|_| {
        GdalError::BadArgument(format!(
            "Input geotransform array length must equal 6, got {}",
            gt.len()
        ))
    })
}

/// Apply a geotransform given as a slice of coefficients to `(x, y)`.
///
/// Fails with [`GdalError::BadArgument`] unless `gt` holds exactly 6 values.
pub fn apply_geo_transform(gt: &[f64], x: f64, y: f64) -> Result<(f64, f64)> {
    Ok(geo_transform_from_slice(gt)?.apply(x, y))
}

/// Invert a geotransform given as a slice of coefficients.
///
/// Fails with [`GdalError::BadArgument`] unless `gt` holds exactly 6 values.
/// A degenerate transform is *not* an error; check
/// [`InvertedGeoTransform::status`].
pub fn inv_geo_transform(gt: &[f64]) -> Result<InvertedGeoTransform> {
    Ok(geo_transform_from_slice(gt)?.invert())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(actual: (f64, f64), expected: (f64, f64)) {
        let tolerance = 1e-6 * (1.0 + expected.0.abs().max(expected.1.abs()));
        assert!(
            (actual.0 - expected.0).abs() < tolerance && (actual.1 - expected.1).abs() < tolerance,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_identity_apply() {
        let gt: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        assert_eq!(gt.apply(3.0, 4.0), (3.0, 4.0));
        assert_eq!(apply_geo_transform(&gt, 3.0, 4.0).unwrap(), (3.0, 4.0));
    }

    #[test]
    fn test_apply_with_rotation() {
        let gt: GeoTransform = [10.0, 2.0, 0.5, 20.0, -0.25, -3.0];
        // X = 10 + 2*4 + 0.5*6, Y = 20 - 0.25*4 - 3*6
        assert_eq!(gt.apply(4.0, 6.0), (21.0, 1.0));
        assert_eq!(gt.apply_point((4.0, 6.0)), (21.0, 1.0));
    }

    #[test]
    fn test_invert_north_up() {
        let gt: GeoTransform = [768269.0, 1.0, 0.0, 4057292.0, 0.0, -1.0];
        let inv = gt.invert();
        assert_eq!(inv.status(), 1);
        assert_eq!(
            *inv.transform(),
            [-768269.0, 1.0, 0.0, 4057292.0, 0.0, -1.0]
        );
    }

    #[test]
    fn test_invert_round_trip_rotated() {
        let transforms: [GeoTransform; 3] = [
            [440720.0, 60.0, 0.0, 3751320.0, 0.0, -60.0],
            [100.0, 0.7, 0.3, -50.0, -0.2, 0.9],
            [-180.0, 0.0, 0.5, 90.0, -0.5, 0.0],
        ];
        let points = [(0.0, 0.0), (10.0, 20.0), (-3.5, 1e4), (1234.5, -678.25)];
        for gt in &transforms {
            let inv = gt.invert();
            assert!(inv.is_valid(), "{gt:?}");
            for &(x, y) in &points {
                assert_near(inv.transform().apply_point(gt.apply(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn test_invert_zero_linear_part() {
        let gt: GeoTransform = [5.0, 0.0, 0.0, 7.0, 0.0, 0.0];
        let inv = gt.invert();
        assert_eq!(inv.status(), 0);
        assert_eq!(*inv.transform(), [0.0; 6]);
        assert!(inv.into_result().is_err());
    }

    #[test]
    fn test_invert_singular_and_near_singular() {
        // Rows are linearly dependent.
        let singular: GeoTransform = [0.0, 1.0, 2.0, 0.0, 2.0, 4.0];
        assert_eq!(singular.invert().status(), 0);

        // det = 1e-12 with unit magnitude, below the 1e-10 threshold.
        let tiny: GeoTransform = [0.0, 1.0, 1.0, 0.0, 1.0, 1.0 + 1e-12];
        assert_eq!(tiny.invert().status(), 0);

        // Small but well-conditioned transforms still invert.
        let scaled: GeoTransform = [0.0, 1e-6, 1e-7, 0.0, 1e-7, 1e-6];
        assert_eq!(scaled.invert().status(), 1);
    }

    #[test]
    fn test_invert_nan_is_degenerate() {
        let gt: GeoTransform = [0.0, f64::NAN, 1.0, 0.0, 1.0, 1.0];
        assert_eq!(gt.invert().status(), 0);
    }

    #[test]
    fn test_slice_length_is_checked() {
        assert!(matches!(
            apply_geo_transform(&[0.0, 1.0, 0.0, 0.0, 0.0], 1.0, 1.0),
            Err(GdalError::BadArgument(_))
        ));
        assert!(matches!(
            inv_geo_transform(&[0.0; 7]),
            Err(GdalError::BadArgument(_))
        ));
        assert!(matches!(inv_geo_transform(&[]), Err(GdalError::BadArgument(_))));
        assert_eq!(
            inv_geo_transform(&[0.0, 2.0, 0.0, 0.0, 0.0, 4.0])
                .unwrap()
                .status(),
            1
        );
    }
}
