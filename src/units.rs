const METERS_PER_KILOMETER: f64 = 1000.0;
const METERS_PER_MILE: f64 = 1609.344;
const FEET_PER_METER: f64 = 3.280_84;
const POUNDS_PER_KILOGRAM: f64 = 2.204_62;
const MPS_TO_KMH: f64 = 3.6;
const MPS_TO_MPH: f64 = 2.236_936;
const MPS_TO_KNOTS: f64 = 1.943_844;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindUnit {
    #[default]
    KilometersPerHour,
    MilesPerHour,
    MetersPerSecond,
    Knots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitPreferences {
    pub system: UnitSystem,
    pub temperature: TemperatureUnit,
    pub wind: WindUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreferenceHints {
    pub system: Option<UnitSystem>,
    pub temperature: Option<TemperatureUnit>,
    pub wind: Option<WindUnit>,
}

impl PreferenceHints {
    pub fn or(self, fallback: PreferenceHints) -> PreferenceHints {
        PreferenceHints {
            system: self.system.or(fallback.system),
            temperature: self.temperature.or(fallback.temperature),
            wind: self.wind.or(fallback.wind),
        }
    }

    pub fn resolve(self) -> UnitPreferences {
        UnitPreferences {
            system: self.system.unwrap_or_default(),
            temperature: self.temperature.unwrap_or_default(),
            wind: self.wind.unwrap_or_default(),
        }
    }
}

impl From<UnitPreferences> for PreferenceHints {
    fn from(prefs: UnitPreferences) -> Self {
        Self {
            system: Some(prefs.system),
            temperature: Some(prefs.temperature),
            wind: Some(prefs.wind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Seconds,
    Milliseconds,
    Meters,
    Kilometers,
    Miles,
    Feet,
    MetersPerSecond,
    KilometersPerHour,
    MilesPerHour,
    Knots,
    Watts,
    WattsPerKg,
    Bpm,
    Rpm,
    Percent,
    Score,
    Ratio,
    Kilograms,
    Pounds,
    Celsius,
    Fahrenheit,
    Kilocalories,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Miles => "mi",
            Self::Feet => "ft",
            Self::MetersPerSecond => "m/s",
            Self::KilometersPerHour => "km/h",
            Self::MilesPerHour => "mph",
            Self::Knots => "kn",
            Self::Watts => "W",
            Self::WattsPerKg => "W/kg",
            Self::Bpm => "bpm",
            Self::Rpm => "rpm",
            Self::Percent => "%",
            Self::Score | Self::Ratio => "",
            Self::Kilograms => "kg",
            Self::Pounds => "lb",
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kilocalories => "kcal",
        }
    }
}

pub fn distance(meters: f64, system: UnitSystem) -> (f64, Unit) {
    match system {
        UnitSystem::Metric => (meters / METERS_PER_KILOMETER, Unit::Kilometers),
        UnitSystem::Imperial => (meters / METERS_PER_MILE, Unit::Miles),
    }
}

pub fn elevation(meters: f64, system: UnitSystem) -> (f64, Unit) {
    match system {
        UnitSystem::Metric => (meters, Unit::Meters),
        UnitSystem::Imperial => (meters * FEET_PER_METER, Unit::Feet),
    }
}

pub fn speed(meters_per_second: f64, system: UnitSystem) -> (f64, Unit) {
    match system {
        UnitSystem::Metric => (meters_per_second * MPS_TO_KMH, Unit::KilometersPerHour),
        UnitSystem::Imperial => (meters_per_second * MPS_TO_MPH, Unit::MilesPerHour),
    }
}

pub fn wind(meters_per_second: f64, unit: WindUnit) -> (f64, Unit) {
    match unit {
        WindUnit::KilometersPerHour => (meters_per_second * MPS_TO_KMH, Unit::KilometersPerHour),
        WindUnit::MilesPerHour => (meters_per_second * MPS_TO_MPH, Unit::MilesPerHour),
        WindUnit::MetersPerSecond => (meters_per_second, Unit::MetersPerSecond),
        WindUnit::Knots => (meters_per_second * MPS_TO_KNOTS, Unit::Knots),
    }
}

pub fn temperature(celsius: f64, unit: TemperatureUnit) -> (f64, Unit) {
    match unit {
        TemperatureUnit::Celsius => (celsius, Unit::Celsius),
        TemperatureUnit::Fahrenheit => (celsius * 9.0 / 5.0 + 32.0, Unit::Fahrenheit),
    }
}

pub fn weight(kilograms: f64, system: UnitSystem) -> (f64, Unit) {
    match system {
        UnitSystem::Metric => (kilograms, Unit::Kilograms),
        UnitSystem::Imperial => (kilograms * POUNDS_PER_KILOGRAM, Unit::Pounds),
    }
}

pub fn pace(meters_per_second: f64, system: UnitSystem) -> Option<String> {
    if !meters_per_second.is_finite() || meters_per_second <= 0.0 {
        return None;
    }
    let (leg, label) = match system {
        UnitSystem::Metric => (METERS_PER_KILOMETER, "/km"),
        UnitSystem::Imperial => (METERS_PER_MILE, "/mi"),
    };
    let total_secs = (leg / meters_per_second).round() as u64;
    Some(format!("{}:{:02} {}", total_secs / 60, total_secs % 60, label))
}

pub fn parse_unit_system(raw: Option<&str>) -> Option<UnitSystem> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "metric" | "meters" => Some(UnitSystem::Metric),
        "imperial" | "feet" => Some(UnitSystem::Imperial),
        _ => None,
    }
}

pub fn parse_temperature_unit(raw: Option<&str>) -> Option<TemperatureUnit> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "c" | "celsius" => Some(TemperatureUnit::Celsius),
        "f" | "fahrenheit" => Some(TemperatureUnit::Fahrenheit),
        _ => None,
    }
}

pub fn parse_wind_unit(raw: Option<&str>) -> Option<WindUnit> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "kmh" | "km/h" | "kph" => Some(WindUnit::KilometersPerHour),
        "mph" => Some(WindUnit::MilesPerHour),
        "ms" | "m/s" | "mps" => Some(WindUnit::MetersPerSecond),
        "kn" | "kt" | "knots" => Some(WindUnit::Knots),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        PreferenceHints, TemperatureUnit, Unit, UnitPreferences, UnitSystem, WindUnit, distance,
        pace, parse_temperature_unit, parse_unit_system, parse_wind_unit, temperature, wind,
    };

    #[test]
    fn distance_converts_to_preferred_system() {
        assert_eq!(distance(5000.0, UnitSystem::Metric), (5.0, Unit::Kilometers));
        let (miles, unit) = distance(1609.344, UnitSystem::Imperial);
        assert!((miles - 1.0).abs() < 1e-9);
        assert_eq!(unit, Unit::Miles);
    }

    #[test]
    fn temperature_and_wind_follow_their_own_units() {
        assert_eq!(temperature(20.0, TemperatureUnit::Fahrenheit), (68.0, Unit::Fahrenheit));
        let (kmh, unit) = wind(10.0, WindUnit::KilometersPerHour);
        assert!((kmh - 36.0).abs() < 1e-9);
        assert_eq!(unit, Unit::KilometersPerHour);
        assert_eq!(wind(4.0, WindUnit::MetersPerSecond), (4.0, Unit::MetersPerSecond));
    }

    #[test]
    fn pace_formats_minutes_per_leg() {
        // 4:00 per km
        assert_eq!(pace(1000.0 / 240.0, UnitSystem::Metric).as_deref(), Some("4:00 /km"));
        assert_eq!(pace(0.0, UnitSystem::Metric), None);
        assert_eq!(pace(f64::NAN, UnitSystem::Imperial), None);
    }

    #[test]
    fn hints_prefer_self_then_fallback_then_defaults() {
        let env = PreferenceHints {
            system: Some(UnitSystem::Imperial),
            ..PreferenceHints::default()
        };
        let profile = PreferenceHints {
            system: Some(UnitSystem::Metric),
            temperature: Some(TemperatureUnit::Fahrenheit),
            wind: None,
        };

        assert_eq!(
            env.or(profile).resolve(),
            UnitPreferences {
                system: UnitSystem::Imperial,
                temperature: TemperatureUnit::Fahrenheit,
                wind: WindUnit::KilometersPerHour,
            }
        );
    }

    #[test]
    fn parsers_accept_known_spellings_only() {
        assert_eq!(parse_unit_system(Some(" Imperial ")), Some(UnitSystem::Imperial));
        assert_eq!(parse_unit_system(Some("feet")), Some(UnitSystem::Imperial));
        assert_eq!(parse_unit_system(Some("cubits")), None);
        assert_eq!(parse_temperature_unit(Some("F")), Some(TemperatureUnit::Fahrenheit));
        assert_eq!(parse_wind_unit(Some("KNOTS")), Some(WindUnit::Knots));
        assert_eq!(parse_wind_unit(None), None);
    }
}
