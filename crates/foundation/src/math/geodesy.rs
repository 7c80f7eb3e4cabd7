use serde::{Deserialize, Serialize};

use super::Vec3;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
/// IUGG mean Earth radius (meters).
pub const MEAN_EARTH_RADIUS: f64 = (2.0 * WGS84_A + WGS84_B) / 3.0;

const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }

    pub fn with_alt(self, alt_m: f64) -> Self {
        Self { alt_m, ..self }
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Vec3 {
    let sin_lat = geo.lat_rad.sin();
    let cos_lat = geo.lat_rad.cos();
    let sin_lon = geo.lon_rad.sin();
    let cos_lon = geo.lon_rad.cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let x = (n + geo.alt_m) * cos_lat * cos_lon;
    let y = (n + geo.alt_m) * cos_lat * sin_lon;
    let z = (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat;

    Vec3::new(x, y, z)
}

/// Bowring's closed-form inverse. Accurate to well under a millimeter for
/// near-surface points.
pub fn ecef_to_geodetic(ecef: Vec3) -> Geodetic {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta * sin_theta * sin_theta)
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta * cos_theta * cos_theta);

    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let alt = if cos_lat.abs() > 1e-10 {
        p / cos_lat - n
    } else {
        // Polar: fall back to the z-axis expression.
        ecef.z.abs() / sin_lat.abs() - n * (1.0 - WGS84_E2)
    };

    Geodetic::new(lat, lon, alt)
}

/// Great-circle distance on a sphere of `MEAN_EARTH_RADIUS` (meters).
pub fn haversine_distance(a: Geodetic, b: Geodetic) -> f64 {
    let dlat = b.lat_rad - a.lat_rad;
    let dlon = b.lon_rad - a.lon_rad;
    let h = (dlat * 0.5).sin().powi(2)
        + a.lat_rad.cos() * b.lat_rad.cos() * (dlon * 0.5).sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS * h.sqrt().min(1.0).asin()
}

/// Ellipsoidal surface distance between two geodetic positions (meters).
///
/// Uses Vincenty's inverse formula on WGS84; altitude is ignored. Nearly
/// antipodal inputs where the iteration does not converge fall back to
/// `haversine_distance`.
pub fn geodesic_distance(a: Geodetic, b: Geodetic) -> f64 {
    let f = WGS84_F;
    let l = b.lon_rad - a.lon_rad;
    let u1 = ((1.0 - f) * a.lat_rad.tan()).atan();
    let u2 = ((1.0 - f) * b.lat_rad.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            return 0.0;
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sigma_m = if cos2_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            // Equatorial line.
            0.0
        };
        let c = f / 16.0 * cos2_alpha * (4.0 + f * (4.0 - 3.0 * cos2_alpha));
        let prev = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - prev).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos2_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
            let big_a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = big_b
                * sin_sigma
                * (cos_2sigma_m
                    + big_b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - big_b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return WGS84_B * big_a * (sigma - delta_sigma);
        }
    }

    haversine_distance(a, b)
}

#[cfg(test)]
mod tests {
    use super::{
        Geodetic, WGS84_A, ecef_to_geodetic, geodesic_distance, geodetic_to_ecef,
        haversine_distance,
    };

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let ecef = geodetic_to_ecef(Geodetic::new(0.0, 0.0, 0.0));
        assert_close(ecef.x, WGS84_A, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_equator_90e() {
        let ecef = geodetic_to_ecef(Geodetic::new(0.0, std::f64::consts::FRAC_PI_2, 0.0));
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.y, WGS84_A, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn round_trip_geodetic_ecef() {
        let geo = Geodetic::new(
            std::f64::consts::FRAC_PI_6,
            -std::f64::consts::FRAC_PI_3,
            120.0,
        );
        let geo_rt = ecef_to_geodetic(geodetic_to_ecef(geo));
        assert_close(geo_rt.lat_rad, geo.lat_rad, 1e-9);
        assert_close(geo_rt.lon_rad, geo.lon_rad, 1e-9);
        assert_close(geo_rt.alt_m, geo.alt_m, 1e-6);
    }

    #[test]
    fn degree_helpers() {
        let geo = Geodetic::from_degrees(45.0, -120.0, 10.0);
        assert_close(geo.lat_deg(), 45.0, 1e-12);
        assert_close(geo.lon_deg(), -120.0, 1e-12);
        assert_eq!(geo.with_alt(3.0).alt_m, 3.0);
    }

    #[test]
    fn one_degree_of_longitude_on_equator() {
        let a = Geodetic::from_degrees(0.0, 0.0, 0.0);
        let b = Geodetic::from_degrees(0.0, 1.0, 0.0);
        // 2 * pi * a / 360
        assert_close(geodesic_distance(a, b), 111_319.490_793, 1e-3);
    }

    #[test]
    fn vincenty_matches_known_baseline() {
        // Flinders Peak -> Buninyong (Vincenty 1975 test line).
        let a = Geodetic::from_degrees(-37.951_033_42, 144.424_867_89, 0.0);
        let b = Geodetic::from_degrees(-37.652_821_14, 143.926_495_53, 0.0);
        assert_close(geodesic_distance(a, b), 54_972.271, 0.01);
    }

    #[test]
    fn coincident_points_are_zero() {
        let a = Geodetic::from_degrees(12.0, 34.0, 0.0);
        assert_eq!(geodesic_distance(a, a), 0.0);
    }

    #[test]
    fn haversine_is_close_to_vincenty_for_short_lines() {
        let a = Geodetic::from_degrees(48.0, 11.0, 0.0);
        let b = Geodetic::from_degrees(48.01, 11.01, 0.0);
        let v = geodesic_distance(a, b);
        let h = haversine_distance(a, b);
        assert!((v - h).abs() / v < 0.005);
    }
}
