use serde_json::Value;

use crate::units::{self, Unit, UnitPreferences};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    // activity
    MovingTime,
    ElapsedTime,
    Distance,
    AvgHr,
    MaxHr,
    AvgPower,
    NormalizedPower,
    TrainingLoad,
    Intensity,
    EfficiencyFactor,
    Decoupling,
    Cadence,
    ElevationGain,
    AvgSpeed,
    AvgTemperature,
    WindSpeed,
    Calories,
    // profile
    Ctl,
    Atl,
    RampRate,
    Ftp,
    FtpPerKg,
    Lthr,
    ThresholdPace,
    Weight,
    RestingHr,
    // wellness
    Hrv,
    SleepDuration,
    SleepScore,
    Readiness,
    Soreness,
    Fatigue,
    Stress,
    Mood,
    Motivation,
    SpO2,
}

impl Field {
    pub fn canonical_unit(&self) -> Unit {
        match self {
            Self::MovingTime | Self::ElapsedTime | Self::SleepDuration => Unit::Seconds,
            Self::Distance | Self::ElevationGain => Unit::Meters,
            Self::AvgSpeed | Self::WindSpeed | Self::ThresholdPace => Unit::MetersPerSecond,
            Self::AvgHr | Self::MaxHr | Self::Lthr | Self::RestingHr => Unit::Bpm,
            Self::AvgPower | Self::NormalizedPower | Self::Ftp => Unit::Watts,
            Self::FtpPerKg => Unit::WattsPerKg,
            Self::Cadence => Unit::Rpm,
            Self::Intensity | Self::Decoupling | Self::SpO2 => Unit::Percent,
            Self::EfficiencyFactor => Unit::Ratio,
            Self::AvgTemperature => Unit::Celsius,
            Self::Calories => Unit::Kilocalories,
            Self::Weight => Unit::Kilograms,
            Self::Hrv => Unit::Milliseconds,
            Self::TrainingLoad
            | Self::Ctl
            | Self::Atl
            | Self::RampRate
            | Self::SleepScore
            | Self::Readiness
            | Self::Soreness
            | Self::Fatigue
            | Self::Stress
            | Self::Mood
            | Self::Motivation => Unit::Score,
        }
    }
}

const FIELD_TABLE: &[(&str, Field)] = &[
    ("moving_time", Field::MovingTime),
    ("elapsed_time", Field::ElapsedTime),
    ("distance", Field::Distance),
    ("average_heartrate", Field::AvgHr),
    ("average_hr", Field::AvgHr),
    ("max_heartrate", Field::MaxHr),
    ("max_hr", Field::MaxHr),
    ("icu_average_watts", Field::AvgPower),
    ("average_watts", Field::AvgPower),
    ("icu_weighted_avg_watts", Field::NormalizedPower),
    ("weighted_average_watts", Field::NormalizedPower),
    ("icu_training_load", Field::TrainingLoad),
    ("training_load", Field::TrainingLoad),
    ("icu_intensity", Field::Intensity),
    ("icu_efficiency_factor", Field::EfficiencyFactor),
    ("decoupling", Field::Decoupling),
    ("average_cadence", Field::Cadence),
    ("total_elevation_gain", Field::ElevationGain),
    ("average_speed", Field::AvgSpeed),
    ("average_temp", Field::AvgTemperature),
    ("average_wind_speed", Field::WindSpeed),
    ("calories", Field::Calories),
    ("ctl", Field::Ctl),
    ("icu_ctl", Field::Ctl),
    ("atl", Field::Atl),
    ("icu_atl", Field::Atl),
    ("rampRate", Field::RampRate),
    ("ftp", Field::Ftp),
    ("icu_ftp", Field::Ftp),
    ("ftpWattsPerKg", Field::FtpPerKg),
    ("lthr", Field::Lthr),
    ("threshold_pace", Field::ThresholdPace),
    ("pace", Field::ThresholdPace),
    ("icu_weight", Field::Weight),
    ("weight", Field::Weight),
    ("icu_resting_hr", Field::RestingHr),
    ("restingHR", Field::RestingHr),
    ("hrv", Field::Hrv),
    ("sleepSecs", Field::SleepDuration),
    ("sleepScore", Field::SleepScore),
    ("readiness", Field::Readiness),
    ("soreness", Field::Soreness),
    ("fatigue", Field::Fatigue),
    ("stress", Field::Stress),
    ("mood", Field::Mood),
    ("motivation", Field::Motivation),
    ("spO2", Field::SpO2),
];

pub fn lookup(key: &str) -> Option<Field> {
    FIELD_TABLE
        .iter()
        .find(|(raw, _)| *raw == key)
        .map(|(_, field)| *field)
}

/// One normalized reading. `value` is `None` when the API sent the key without
/// a usable number, which is not the same as a reading of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedField {
    pub field: Field,
    pub value: Option<f64>,
    pub unit: Unit,
}

impl NormalizedField {
    pub fn convert(self, prefs: &UnitPreferences) -> NormalizedField {
        let Some(value) = self.value else {
            return self;
        };
        let (value, unit) = match self.field {
            Field::Distance => units::distance(value, prefs.system),
            Field::ElevationGain => units::elevation(value, prefs.system),
            Field::AvgSpeed => units::speed(value, prefs.system),
            Field::WindSpeed => units::wind(value, prefs.wind),
            Field::AvgTemperature => units::temperature(value, prefs.temperature),
            Field::Weight => units::weight(value, prefs.system),
            _ => (value, self.unit),
        };
        NormalizedField {
            field: self.field,
            value: Some(value),
            unit,
        }
    }
}

pub fn normalize_field(key: &str, value: &Value) -> Option<NormalizedField> {
    let field = lookup(key)?;
    Some(NormalizedField {
        field,
        value: numeric(value),
        unit: field.canonical_unit(),
    })
}

pub fn normalize_object(object: &Value) -> Vec<NormalizedField> {
    object
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| normalize_field(key, value))
                .collect()
        })
        .unwrap_or_default()
}

fn numeric(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Field, NormalizedField, lookup, normalize_field, normalize_object};
    use crate::units::{TemperatureUnit, Unit, UnitPreferences, UnitSystem, WindUnit};

    #[test]
    fn aliases_resolve_to_the_same_field() {
        assert_eq!(lookup("average_hr"), Some(Field::AvgHr));
        assert_eq!(lookup("average_heartrate"), Some(Field::AvgHr));
        assert_eq!(lookup("icu_training_load"), Some(Field::TrainingLoad));
        assert_eq!(lookup("icu_efficiency_factor"), Some(Field::EfficiencyFactor));
    }

    #[test]
    fn unrecognized_keys_are_dropped() {
        assert_eq!(normalize_field("gear_id", &json!("b123")), None);
        assert_eq!(normalize_field("AVERAGE_HR", &json!(140)), None);
    }

    #[test]
    fn null_and_garbage_values_are_absent_not_zero() {
        let null = normalize_field("average_hr", &json!(null)).expect("known key");
        assert_eq!(null.value, None);
        let text = normalize_field("average_hr", &json!("n/a")).expect("known key");
        assert_eq!(text.value, None);
        let zero = normalize_field("average_hr", &json!(0)).expect("known key");
        assert_eq!(zero.value, Some(0.0));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let field = normalize_field("distance", &json!(" 5000 ")).expect("known key");
        assert_eq!(field.value, Some(5000.0));
        assert_eq!(field.unit, Unit::Meters);
    }

    #[test]
    fn convert_uses_preferences() {
        let imperial = UnitPreferences {
            system: UnitSystem::Imperial,
            temperature: TemperatureUnit::Fahrenheit,
            wind: WindUnit::MetersPerSecond,
        };
        let temp = normalize_field("average_temp", &json!(10))
            .expect("known key")
            .convert(&imperial);
        assert_eq!(temp.value, Some(50.0));
        assert_eq!(temp.unit, Unit::Fahrenheit);

        let wind = normalize_field("average_wind_speed", &json!(3.5))
            .expect("known key")
            .convert(&imperial);
        assert_eq!(wind.unit, Unit::MetersPerSecond);

        let hr = normalize_field("max_hr", &json!(181))
            .expect("known key")
            .convert(&imperial);
        assert_eq!(hr.unit, Unit::Bpm);
    }

    #[test]
    fn convert_keeps_absent_values_absent() {
        let absent = NormalizedField {
            field: Field::Distance,
            value: None,
            unit: Unit::Meters,
        };
        assert_eq!(absent.convert(&UnitPreferences::default()), absent);
    }

    #[test]
    fn normalize_object_skips_unknown_and_non_objects() {
        let fields = normalize_object(&json!({
            "id": "i1",
            "type": "Run",
            "distance": 5000,
            "icu_training_load": 45
        }));
        let names: Vec<Field> = fields.iter().map(|f| f.field).collect();
        assert_eq!(names, vec![Field::Distance, Field::TrainingLoad]);
        assert!(normalize_object(&json!([1, 2])).is_empty());
    }
}
