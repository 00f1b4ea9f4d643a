//! Unit conversions and lookup tables.
//!
//! Provides the scalar conversions used when translating forecast data into
//! simulator values, tolerant numeric parsing for user-supplied strings, and
//! the METAR precipitation lookup table.

/// Converts metres per second to knots.
#[inline]
pub fn ms_to_knots(v: f64) -> f64 {
    v * 1.94384
}

/// Converts kelvin to degrees Celsius.
#[inline]
pub fn kelvin_to_celsius(v: f64) -> f64 {
    v - 273.15
}

/// Converts pascals to inches of mercury.
#[inline]
pub fn pa_to_inhg(v: f64) -> f64 {
    v * 0.000_295_299_801_647_123_2
}

/// Converts metres to feet.
#[inline]
pub fn m_to_ft(v: f64) -> f64 {
    v * 3.280_839_895_013_123
}

/// Converts feet to metres.
#[inline]
pub fn ft_to_m(v: f64) -> f64 {
    v * 0.3048
}

/// Converts statute miles to metres.
#[inline]
pub fn sm_to_m(v: f64) -> f64 {
    v * 1609.344
}

/// Converts metres to statute miles.
#[inline]
pub fn m_to_sm(v: f64) -> f64 {
    v * 0.000_621_371_192_237_333_9
}

/// Converts nautical miles to metres.
#[inline]
pub fn nm_to_m(v: f64) -> f64 {
    v * 1852.0
}

/// A unit conversion selected at compile time.
///
/// Callers pick a variant instead of dispatching on a conversion name, so an
/// unknown conversion cannot exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    MsToKnots,
    KelvinToCelsius,
    PaToInhg,
    MetresToFeet,
    FeetToMetres,
    StatuteMilesToMetres,
    MetresToStatuteMiles,
    NauticalMilesToMetres,
}

impl Conversion {
    /// Apply the conversion to a value.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Conversion::MsToKnots => ms_to_knots(v),
            Conversion::KelvinToCelsius => kelvin_to_celsius(v),
            Conversion::PaToInhg => pa_to_inhg(v),
            Conversion::MetresToFeet => m_to_ft(v),
            Conversion::FeetToMetres => ft_to_m(v),
            Conversion::StatuteMilesToMetres => sm_to_m(v),
            Conversion::MetresToStatuteMiles => m_to_sm(v),
            Conversion::NauticalMilesToMetres => nm_to_m(v),
        }
    }
}

/// Parse a float from user input, falling back to `default` when malformed.
pub fn parse_f64_or(s: &str, default: f64) -> f64 {
    s.trim().parse().unwrap_or(default)
}

/// Parse an integer from user input, falling back to `default` when malformed.
pub fn parse_i64_or(s: &str, default: i64) -> i64 {
    s.trim().parse().unwrap_or(default)
}

/// Limit a value to an optional range.
///
/// A `None` bound leaves that side unconstrained.
pub fn clamp_opt(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    if let Some(max) = max {
        if value > max {
            return max;
        }
    }
    if let Some(min) = min {
        if value < min {
            return min;
        }
    }
    value
}

/// Maps a percentage cloud cover to a coverage category.
///
/// Categories follow the standard aviation buckets: 0 = clear, 1 = few,
/// 2 = scattered, 3 = broken, 4 = overcast.
pub fn cloud_cover_category(percent: f64) -> u8 {
    if percent < 1.0 {
        0
    } else if percent < 30.0 {
        1
    } else if percent < 55.0 {
        2
    } else if percent < 90.0 {
        3
    } else {
        4
    }
}

/// Precipitation kind, from the METAR phenomenon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipKind {
    Drizzle,
    Rain,
    Snow,
    Showers,
}

impl PrecipKind {
    /// Resolve a METAR phenomenon code, honouring the `SH` descriptor.
    ///
    /// A `SH` descriptor reclassifies any phenomenon as showers. Unknown
    /// codes yield `None`.
    pub fn from_metar(code: &str, descriptor: Option<&str>) -> Option<Self> {
        if descriptor == Some("SH") {
            return Some(PrecipKind::Showers);
        }
        match code {
            "DZ" => Some(PrecipKind::Drizzle),
            "RA" => Some(PrecipKind::Rain),
            "SN" => Some(PrecipKind::Snow),
            "SH" => Some(PrecipKind::Showers),
            _ => None,
        }
    }
}

/// Precipitation intensity, from the METAR qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipIntensity {
    Light,
    Moderate,
    Heavy,
}

impl PrecipIntensity {
    /// Resolve a METAR intensity qualifier (`-`, empty, or `+`).
    pub fn from_qualifier(qualifier: &str) -> Option<Self> {
        match qualifier {
            "-" => Some(PrecipIntensity::Light),
            "" => Some(PrecipIntensity::Moderate),
            "+" => Some(PrecipIntensity::Heavy),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            PrecipIntensity::Light => 0,
            PrecipIntensity::Moderate => 1,
            PrecipIntensity::Heavy => 2,
        }
    }
}

/// Runway surface state implied by a precipitation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunwaySurface {
    Wet,
    SnowCovered,
}

/// Simulator-facing precipitation effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipEffects {
    /// Precipitation intensity in `[0, 1]`.
    pub intensity: f64,
    /// Surface contamination to apply.
    pub surface: RunwaySurface,
}

/// Intensity rows per kind: light, moderate, heavy.
const PRECIP_INTENSITY: [(PrecipKind, [f64; 3]); 4] = [
    (PrecipKind::Drizzle, [0.1, 0.2, 0.3]),
    (PrecipKind::Rain, [0.3, 0.5, 0.8]),
    (PrecipKind::Snow, [0.25, 0.5, 0.8]),
    (PrecipKind::Showers, [0.7, 0.8, 1.0]),
];

/// Look up the simulator effects of a reported precipitation.
///
/// `recent` marks phenomena that have ended (METAR `RE` groups): the surface
/// state still applies but the falling intensity is zero.
pub fn precipitation_effects(
    kind: PrecipKind,
    intensity: PrecipIntensity,
    recent: bool,
) -> PrecipEffects {
    let row = PRECIP_INTENSITY
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, row)| row)
        .unwrap_or(&[0.0; 3]);

    let surface = match kind {
        PrecipKind::Snow => RunwaySurface::SnowCovered,
        _ => RunwaySurface::Wet,
    };

    PrecipEffects {
        intensity: if recent { 0.0 } else { row[intensity.index()] },
        surface,
    }
}
