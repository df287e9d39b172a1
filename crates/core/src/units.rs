//! Unit conversion between EMUs, pixels and points.
//!
//! PowerPoint stores geometry in English Metric Units (914400 per inch).
//! Components are reported in 96 DPI pixels.

/// EMUs per inch.
pub const EMUS_PER_INCH: i64 = 914_400;

/// Pixels per inch used for all reported geometry.
pub const PIXELS_PER_INCH: i64 = 96;

/// EMUs per pixel at 96 DPI.
pub const EMUS_PER_PIXEL: i64 = EMUS_PER_INCH / PIXELS_PER_INCH;

/// Font size used when a run carries no usable size.
pub const DEFAULT_FONT_SIZE_PT: u32 = 12;

/// Converted geometry above this magnitude most likely skipped EMU conversion.
pub const DEFAULT_EMU_LEAK_THRESHOLD: i64 = 50_000;

/// OOXML angles are stored in 60000ths of a degree.
pub const ANGLE_UNITS_PER_DEGREE: f64 = 60_000.0;

/// Convert EMUs to whole pixels, rounding half away from zero.
#[inline]
pub fn emu_to_pixels(emu: i64) -> i64 {
    (emu as f64 * PIXELS_PER_INCH as f64 / EMUS_PER_INCH as f64).round() as i64
}

/// Convert EMUs to fractional pixels rounded to two decimals.
///
/// Stroke widths are usually a fraction of a pixel, so whole-pixel rounding
/// would collapse them to zero.
#[inline]
pub fn emu_to_pixels_f64(emu: i64) -> f64 {
    let px = emu as f64 * PIXELS_PER_INCH as f64 / EMUS_PER_INCH as f64;
    (px * 100.0).round() / 100.0
}

/// Convert pixels back to EMUs.
#[inline]
pub fn pixels_to_emu(px: i64) -> i64 {
    px.saturating_mul(EMUS_PER_PIXEL)
}

/// Convert a font size in hundredths of a point to whole points.
///
/// Missing, unparsable or non-positive sizes fall back to 12pt.
pub fn font_size_to_points(hundredths: Option<&str>) -> u32 {
    hundredths
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| (v / 100.0).round() as u32)
        .filter(|pt| *pt > 0)
        .unwrap_or(DEFAULT_FONT_SIZE_PT)
}

/// Convert an OOXML angle (60000ths of a degree) to degrees.
#[inline]
pub fn angle_to_degrees(raw: i64) -> f64 {
    raw as f64 / ANGLE_UNITS_PER_DEGREE
}

/// Convert an OOXML percentage (1000ths of a percent) to a percentage.
#[inline]
pub fn thousandths_to_percent(raw: i64) -> f64 {
    raw as f64 / 1000.0
}

/// Report whether a converted pixel value looks like a raw EMU that escaped
/// conversion. Logs a warning when it does; never fails.
pub fn check_emu_leak(value: i64, threshold: i64, what: &str) -> bool {
    if value.abs() > threshold {
        log::warn!(
            "{} = {} px exceeds {} px; likely an unconverted EMU value",
            what,
            value,
            threshold
        );
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_to_pixels() {
        assert_eq!(emu_to_pixels(914_400), 96);
        assert_eq!(emu_to_pixels(9_144_000), 960);
        assert_eq!(emu_to_pixels(6_858_000), 720);
        assert_eq!(emu_to_pixels(0), 0);
        assert_eq!(emu_to_pixels(-914_400), -96);
        // 4762.5 EMU is exactly half a pixel
        assert_eq!(emu_to_pixels(4_763), 1);
        assert_eq!(emu_to_pixels(4_762), 0);
    }

    #[test]
    fn test_pixel_round_trip_within_one_unit() {
        for emu in [0_i64, 1, 9_524, 9_525, 12_700, 457_200, 914_400, 1_234_567, 12_192_000, 51_206_400] {
            let back = pixels_to_emu(emu_to_pixels(emu));
            assert!(
                (back - emu).abs() <= EMUS_PER_PIXEL,
                "{} -> {} drifted more than one pixel",
                emu,
                back
            );
        }
    }

    #[test]
    fn test_emu_to_pixels_f64() {
        assert_eq!(emu_to_pixels_f64(12_700), 1.33);
        assert_eq!(emu_to_pixels_f64(9_525), 1.0);
    }

    #[test]
    fn test_font_size_to_points() {
        assert_eq!(font_size_to_points(Some("1800")), 18);
        assert_eq!(font_size_to_points(Some("2400")), 24);
        assert_eq!(font_size_to_points(Some("1050")), 11);
        assert_eq!(font_size_to_points(None), 12);
        assert_eq!(font_size_to_points(Some("abc")), 12);
        assert_eq!(font_size_to_points(Some("-200")), 12);
        assert_eq!(font_size_to_points(Some("0")), 12);
    }

    #[test]
    fn test_angles_and_percentages() {
        assert_eq!(angle_to_degrees(5_400_000), 90.0);
        assert_eq!(angle_to_degrees(0), 0.0);
        assert_eq!(thousandths_to_percent(25_000), 25.0);
    }

    #[test]
    fn test_check_emu_leak() {
        assert!(!check_emu_leak(960, DEFAULT_EMU_LEAK_THRESHOLD, "x"));
        assert!(check_emu_leak(914_400, DEFAULT_EMU_LEAK_THRESHOLD, "x"));
        assert!(check_emu_leak(-60_000, DEFAULT_EMU_LEAK_THRESHOLD, "y"));
    }
}
