//! Human-readable measurement values for labels and the log.

use foundation::math::Geodetic;

use crate::config::UnitSystem;

const FEET_PER_METER: f64 = 3.280_839_895;
const FEET_PER_MILE: f64 = 5280.0;

pub fn format_distance(meters: f64, units: UnitSystem, decimals: usize) -> String {
    if !meters.is_finite() {
        return "--".to_string();
    }
    let sign = if meters < 0.0 { "-" } else { "" };
    let m = meters.abs();
    match units {
        UnitSystem::Metric if m < 1000.0 => format!("{sign}{m:.decimals$} m"),
        UnitSystem::Metric => format!("{sign}{:.decimals$} km", m / 1000.0),
        UnitSystem::Imperial => {
            let ft = m * FEET_PER_METER;
            if ft < FEET_PER_MILE {
                format!("{sign}{ft:.decimals$} ft")
            } else {
                format!("{sign}{:.decimals$} mi", ft / FEET_PER_MILE)
            }
        }
    }
}

pub fn format_area(square_meters: f64, units: UnitSystem, decimals: usize) -> String {
    if !square_meters.is_finite() {
        return "--".to_string();
    }
    let a = square_meters.abs();
    match units {
        UnitSystem::Metric if a < 1.0e6 => format!("{a:.decimals$} m²"),
        UnitSystem::Metric => format!("{:.decimals$} km²", a / 1.0e6),
        UnitSystem::Imperial => {
            let ft2 = a * FEET_PER_METER * FEET_PER_METER;
            let mi2 = FEET_PER_MILE * FEET_PER_MILE;
            if ft2 < mi2 {
                format!("{ft2:.decimals$} ft²")
            } else {
                format!("{:.decimals$} mi²", ft2 / mi2)
            }
        }
    }
}

/// `47.37690°N, 8.54170°E`
pub fn format_lat_lon(geo: Geodetic) -> String {
    let lat = geo.lat_deg();
    let lon = geo.lon_deg();
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.5}°{ns}, {:.5}°{ew}", lat.abs(), lon.abs())
}

/// Coordinate label for a bookmarked point: lat/lon on the first line,
/// height on the second.
pub fn format_point(geo: Geodetic, units: UnitSystem, decimals: usize) -> String {
    format!(
        "{}\n{}",
        format_lat_lon(geo),
        format_distance(geo.alt_m, units, decimals)
    )
}

#[cfg(test)]
mod tests {
    use super::{format_area, format_distance, format_lat_lon, format_point};
    use crate::config::UnitSystem;
    use foundation::math::Geodetic;
    use pretty_assertions::assert_eq;

    #[test]
    fn metric_distances_switch_to_km() {
        assert_eq!(format_distance(12.346, UnitSystem::Metric, 2), "12.35 m");
        assert_eq!(format_distance(999.0, UnitSystem::Metric, 0), "999 m");
        assert_eq!(format_distance(1500.0, UnitSystem::Metric, 2), "1.50 km");
        assert_eq!(format_distance(-3.0, UnitSystem::Metric, 1), "-3.0 m");
    }

    #[test]
    fn imperial_distances_switch_to_miles() {
        assert_eq!(format_distance(10.0, UnitSystem::Imperial, 1), "32.8 ft");
        assert_eq!(format_distance(3218.688, UnitSystem::Imperial, 2), "2.00 mi");
    }

    #[test]
    fn areas() {
        assert_eq!(format_area(2500.0, UnitSystem::Metric, 1), "2500.0 m²");
        assert_eq!(format_area(2.5e6, UnitSystem::Metric, 2), "2.50 km²");
        assert_eq!(format_area(1.0, UnitSystem::Imperial, 2), "10.76 ft²");
    }

    #[test]
    fn non_finite_values_render_as_dashes() {
        assert_eq!(format_distance(f64::NAN, UnitSystem::Metric, 2), "--");
        assert_eq!(format_area(f64::INFINITY, UnitSystem::Metric, 2), "--");
    }

    #[test]
    fn coordinates_use_hemispheres() {
        let geo = Geodetic::from_degrees(-33.8688, 151.2093, 58.0);
        assert_eq!(format_lat_lon(geo), "33.86880°S, 151.20930°E");
        assert_eq!(format_point(geo, UnitSystem::Metric, 1), "33.86880°S, 151.20930°E\n58.0 m");
    }
}
