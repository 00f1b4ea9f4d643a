//! Atmospheric formulas.
//!
//! Standard-atmosphere and psychrometric conversions used to turn forecast
//! fields into simulator values. All temperatures are Celsius, altitudes
//! metres, pressures millibar unless noted.

/// ISA sea-level pressure in millibar.
const ISA_SEA_LEVEL_MB: f64 = 1013.25;

/// Magnus formula constants for dewpoint over water.
const MAGNUS_A: f64 = 17.625;
const MAGNUS_B: f64 = 243.04;

/// Converts a pressure level to altitude via the ICAO troposphere formula.
pub fn pressure_to_altitude(mb: f64) -> f64 {
    (1.0 - (mb / ISA_SEA_LEVEL_MB).powf(0.190284)) * 44_307.0
}

/// Reduce an outside air temperature to mean sea level.
///
/// Below 11 km the ISA lapse rate of 6.5 °C/km applies; above, the
/// deviation stays constant at -71.5 °C.
pub fn oat_to_msl_temp(oat_c: f64, alt_m: f64) -> f64 {
    if alt_m > 11_000.0 {
        oat_c + 71.5
    } else {
        oat_c + 0.0065 * alt_m
    }
}

/// Dewpoint from temperature and relative humidity (Magnus formula).
pub fn dewpoint(temp_c: f64, rh: f64) -> f64 {
    let gamma = (rh / 100.0).ln() + (MAGNUS_A * temp_c) / (MAGNUS_B + temp_c);
    MAGNUS_B * gamma / (MAGNUS_A - gamma)
}

/// Relative humidity from temperature and dewpoint (Magnus formula).
pub fn dewpoint_to_rh(temp_c: f64, dew_c: f64) -> f64 {
    100.0
        * (((MAGNUS_A * dew_c) / (MAGNUS_B + dew_c)).exp()
            / ((MAGNUS_A * temp_c) / (MAGNUS_B + temp_c)).exp())
}

/// Surface visibility in metres estimated from relative humidity.
///
/// Empirical fit from Gultepe et al., J. Appl. Meteor. Climatol. 2009.
pub fn rh_to_visibility(rh: f64) -> f64 {
    1000.0 * (-5.19e-10 * rh.powf(5.44) + 40.10)
}

/// Depth of a saturation fog layer in metres for a given relative humidity.
pub fn fog_layer_depth(rh: f64) -> f64 {
    (80.0 - rh) / 20.0 * 24_634.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressure_to_altitude_sea_level() {
        assert!(pressure_to_altitude(1013.25).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_to_altitude_fl180() {
        // 500 mb sits near 5 574 m in the ICAO atmosphere
        let alt = pressure_to_altitude(500.0);
        assert!((alt - 5574.0).abs() < 5.0, "got {}", alt);
    }

    #[test]
    fn test_pressure_to_altitude_monotonic() {
        assert!(pressure_to_altitude(300.0) > pressure_to_altitude(500.0));
        assert!(pressure_to_altitude(500.0) > pressure_to_altitude(850.0));
    }

    #[test]
    fn test_oat_to_msl_temp_lapse() {
        assert_eq!(oat_to_msl_temp(-20.0, 0.0), -20.0);
        assert!((oat_to_msl_temp(-20.0, 1000.0) - (-13.5)).abs() < 1e-9);
    }

    #[test]
    fn test_oat_to_msl_temp_above_tropopause() {
        assert_eq!(oat_to_msl_temp(-56.5, 12_000.0), 15.0);
    }

    #[test]
    fn test_dewpoint_saturated_air() {
        // At 100% RH the dewpoint equals the temperature
        assert!((dewpoint(15.0, 100.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_dewpoint_rh_roundtrip() {
        let temp = 22.0;
        let rh = 65.0;
        let dew = dewpoint(temp, rh);
        assert!(dew < temp);
        assert!((dewpoint_to_rh(temp, dew) - rh).abs() < 1e-6);
    }

    #[test]
    fn test_rh_to_visibility_drops_when_humid() {
        assert!(rh_to_visibility(30.0) > rh_to_visibility(95.0));
        // Dry air: effectively unlimited (~40 km)
        assert!(rh_to_visibility(10.0) > 39_000.0);
    }

    #[test]
    fn test_fog_layer_depth_sign() {
        assert!(fog_layer_depth(90.0) < 0.0);
        assert!(fog_layer_depth(70.0) > 0.0);
    }
}
