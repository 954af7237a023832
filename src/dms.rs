//! Degrees/minutes/seconds formatting of geographic angles.
//!
//! The output follows GDAL's `GDALDecToDMS` byte for byte:
//!
//! ```
//! use geoaccess::dms::{dec_to_dms, Axis};
//!
//! assert_eq!(dec_to_dms(-45.5, Axis::Longitude, 0).unwrap(), " 45d30'  0\"W");
//! assert_eq!(dec_to_dms(12.345, Axis::Latitude, 2).unwrap(), " 12d20'42.00\"N");
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::{GdalError, Result};

/// Number of fractional-second digits used when no precision is given.
pub const DEFAULT_DMS_PRECISION: usize = 2;

/// Largest accepted number of fractional-second digits.
pub const MAX_DMS_PRECISION: usize = 30;

/// Beyond this magnitude (degrees) an angle is rejected.
const MAX_ANGLE: f64 = 361.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Latitude => "Lat",
            Axis::Longitude => "Long",
        }
    }

    /// The hemisphere letter for an angle on this axis.
    ///
    /// `-0.0` counts as non-negative.
    pub fn hemisphere(&self, angle: f64) -> char {
        match (self, angle < 0.0) {
            (Axis::Longitude, true) => 'W',
            (Axis::Longitude, false) => 'E',
            (Axis::Latitude, true) => 'S',
            (Axis::Latitude, false) => 'N',
        }
    }
}

impl FromStr for Axis {
    type Err = GdalError;

    /// Parses `"lat"` or `"long"`. Only the first character is case-normalized,
    /// so `"Lat"` is accepted while `"LAT"` is not.
    fn from_str(axis: &str) -> Result<Self> {
        let mut chars = axis.chars();
        let normalized: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        match normalized.as_str() {
            "Lat" => Ok(Axis::Latitude),
            "Long" => Ok(Axis::Longitude),
            _ => Err(GdalError::BadArgument(format!(
                "Axis must be 'lat' or 'long', got '{axis}'"
            ))),
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert decimal degrees to a degrees, minutes, and seconds string.
///
/// The result has the shape `DDDdMM'SS.ss"H`: degrees right-aligned to three
/// columns, minutes to two, seconds to `precision + 3` with `precision`
/// fractional digits, and the hemisphere letter (`N`/`S` or `E`/`W`).
///
/// Half a unit of the last printed seconds digit is added before splitting the
/// angle, so seconds that would print as `60` carry into the minutes, and
/// minutes into the degrees.
///
/// Fails with [`GdalError::BadArgument`] for NaN angles, magnitudes above 361°
/// or a `precision` above [`MAX_DMS_PRECISION`].
pub fn dec_to_dms(angle: f64, axis: Axis, precision: usize) -> Result<String> {
    if precision > MAX_DMS_PRECISION {
        return Err(GdalError::BadArgument(format!(
            "precision must be at most {MAX_DMS_PRECISION}, got {precision}"
        )));
    }
    let epsilon = (0.5 / 3600.0) * 0.1f64.powi(precision as i32);
    let abs_angle = angle.abs() + epsilon;
    if angle.is_nan() || abs_angle > MAX_ANGLE {
        return Err(GdalError::BadArgument(format!("Invalid angle: {angle}")));
    }

    let degrees = abs_angle.trunc();
    let minutes = ((abs_angle - degrees) * 60.0).trunc();
    let mut seconds = abs_angle * 3600.0 - degrees * 3600.0 - minutes * 60.0;
    if seconds > epsilon * 3600.0 {
        seconds -= epsilon * 3600.0;
    }

    Ok(format!(
        "{:3}d{:2}'{:width$.precision$}\"{}",
        degrees as i32,
        minutes as i32,
        seconds,
        axis.hemisphere(angle),
        width = precision + 3,
        precision = precision,
    ))
}

/// [`dec_to_dms`] taking the axis as a `"lat"` / `"long"` token.
pub fn dec_to_dms_str(angle: f64, axis: &str, precision: usize) -> Result<String> {
    dec_to_dms(angle, axis.parse()?, precision)
}
