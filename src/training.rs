use chrono::{Days, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::normalize::{Field, NormalizedField, normalize_object};
use crate::units::{
    PreferenceHints, TemperatureUnit, UnitSystem, parse_unit_system, parse_wind_unit,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivityType {
    Run,
    Ride,
    Swim,
    Workout,
    Other(String),
}

impl ActivityType {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "Run" | "TrailRun" | "VirtualRun" => Self::Run,
            "Swim" | "OpenWaterSwim" => Self::Swim,
            "Workout" | "WeightTraining" => Self::Workout,
            other if other.ends_with("Ride") => Self::Ride,
            "" => Self::Other("Unknown".to_string()),
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Run => "Run",
            Self::Ride => "Ride",
            Self::Swim => "Swim",
            Self::Workout => "Workout",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub oldest: NaiveDate,
    pub newest: NaiveDate,
    pub days: u32,
}

impl DateWindow {
    /// Returns `None` for a zero-day window.
    pub fn ending_on(today: NaiveDate, days: u32) -> Option<Self> {
        if days == 0 {
            return None;
        }
        let oldest = today.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self {
            oldest,
            newest: today,
            days,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.oldest <= date && date <= self.newest
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AthleteProfile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ctl: Option<f64>,
    pub atl: Option<f64>,
    pub ramp_rate: Option<f64>,
    pub ftp: Option<f64>,
    pub ftp_per_kg: Option<f64>,
    pub lthr: Option<f64>,
    pub threshold_pace: Option<f64>,
    pub weight: Option<f64>,
    pub resting_hr: Option<f64>,
    pub preferences: PreferenceHints,
}

impl AthleteProfile {
    pub fn from_raw(raw: &Value) -> Self {
        let mut profile = Self {
            id: text_field(raw, "id"),
            name: text_field(raw, "name"),
            preferences: preference_hints(raw),
            ..Self::default()
        };
        for field in normalize_object(raw) {
            profile.apply(field);
        }

        // Thresholds often live only in the per-sport settings.
        if let Some(settings) = raw.get("sportSettings").and_then(Value::as_array) {
            for entry in settings {
                let types = sport_types(entry);
                let fields = normalize_object(entry);
                if profile.ftp.is_none() && types.contains(&ActivityType::Ride) {
                    profile.ftp = find_value(&fields, Field::Ftp);
                }
                if profile.threshold_pace.is_none() && types.contains(&ActivityType::Run) {
                    profile.threshold_pace = find_value(&fields, Field::ThresholdPace);
                }
                if profile.lthr.is_none() {
                    profile.lthr = find_value(&fields, Field::Lthr);
                }
            }
        }
        profile
    }

    pub fn form(&self) -> Option<f64> {
        Some(self.ctl? - self.atl?)
    }

    fn apply(&mut self, field: NormalizedField) {
        let slot = match field.field {
            Field::Ctl => &mut self.ctl,
            Field::Atl => &mut self.atl,
            Field::RampRate => &mut self.ramp_rate,
            Field::Ftp => &mut self.ftp,
            Field::FtpPerKg => &mut self.ftp_per_kg,
            Field::Lthr => &mut self.lthr,
            Field::ThresholdPace => &mut self.threshold_pace,
            Field::Weight => &mut self.weight,
            Field::RestingHr => &mut self.resting_hr,
            _ => return,
        };
        if field.value.is_some() || slot.is_none() {
            *slot = field.value;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub name: Option<String>,
    pub kind: ActivityType,
    pub start: NaiveDateTime,
    pub moving_time: Option<f64>,
    pub distance: Option<f64>,
    pub avg_hr: Option<f64>,
    pub max_hr: Option<f64>,
    pub avg_power: Option<f64>,
    pub normalized_power: Option<f64>,
    pub training_load: Option<f64>,
    pub intensity: Option<f64>,
    pub efficiency_factor: Option<f64>,
    pub decoupling: Option<f64>,
    pub cadence: Option<f64>,
    pub elevation_gain: Option<f64>,
    pub avg_speed: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub calories: Option<f64>,
}

impl Activity {
    pub fn new(id: impl Into<String>, kind: ActivityType, start: NaiveDateTime) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            start,
            moving_time: None,
            distance: None,
            avg_hr: None,
            max_hr: None,
            avg_power: None,
            normalized_power: None,
            training_load: None,
            intensity: None,
            efficiency_factor: None,
            decoupling: None,
            cadence: None,
            elevation_gain: None,
            avg_speed: None,
            avg_temperature: None,
            wind_speed: None,
            calories: None,
        }
    }

    pub fn from_raw(raw: &Value) -> Option<Self> {
        let Some(id) = id_field(raw) else {
            warn!("skipping activity without an id");
            return None;
        };
        let Some(start) = raw
            .get("start_date_local")
            .and_then(Value::as_str)
            .and_then(parse_local_timestamp)
        else {
            warn!(activity_id = %id, "skipping activity without a readable start_date_local");
            return None;
        };
        let kind = ActivityType::from_raw(raw.get("type").and_then(Value::as_str).unwrap_or(""));

        let mut activity = Self::new(id, kind, start);
        activity.name = text_field(raw, "name");
        for field in normalize_object(raw) {
            activity.apply(field);
        }
        Some(activity)
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    fn apply(&mut self, field: NormalizedField) {
        let slot = match field.field {
            Field::MovingTime => &mut self.moving_time,
            Field::Distance => &mut self.distance,
            Field::AvgHr => &mut self.avg_hr,
            Field::MaxHr => &mut self.max_hr,
            Field::AvgPower => &mut self.avg_power,
            Field::NormalizedPower => &mut self.normalized_power,
            Field::TrainingLoad => &mut self.training_load,
            Field::Intensity => &mut self.intensity,
            Field::EfficiencyFactor => &mut self.efficiency_factor,
            Field::Decoupling => &mut self.decoupling,
            Field::Cadence => &mut self.cadence,
            Field::ElevationGain => &mut self.elevation_gain,
            Field::AvgSpeed => &mut self.avg_speed,
            Field::AvgTemperature => &mut self.avg_temperature,
            Field::WindSpeed => &mut self.wind_speed,
            Field::Calories => &mut self.calories,
            // elapsed time only stands in when moving time is missing
            Field::ElapsedTime => {
                if self.moving_time.is_none() {
                    self.moving_time = field.value;
                }
                return;
            }
            _ => return,
        };
        if field.value.is_some() || slot.is_none() {
            *slot = field.value;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WellnessRecord {
    pub date: NaiveDate,
    pub resting_hr: Option<f64>,
    pub hrv: Option<f64>,
    pub sleep_secs: Option<f64>,
    pub sleep_score: Option<f64>,
    pub readiness: Option<f64>,
    pub soreness: Option<f64>,
    pub fatigue: Option<f64>,
    pub stress: Option<f64>,
    pub mood: Option<f64>,
    pub motivation: Option<f64>,
    pub weight: Option<f64>,
    pub spo2: Option<f64>,
    pub ctl: Option<f64>,
    pub atl: Option<f64>,
}

impl WellnessRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            resting_hr: None,
            hrv: None,
            sleep_secs: None,
            sleep_score: None,
            readiness: None,
            soreness: None,
            fatigue: None,
            stress: None,
            mood: None,
            motivation: None,
            weight: None,
            spo2: None,
            ctl: None,
            atl: None,
        }
    }

    pub fn from_raw(raw: &Value) -> Option<Self> {
        let date = raw
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| NaiveDate::parse_from_str(id, "%Y-%m-%d").ok())?;
        let mut record = Self::empty(date);
        for field in normalize_object(raw) {
            record.apply(field);
        }
        Some(record)
    }

    pub fn has_data(&self) -> bool {
        [
            self.resting_hr,
            self.hrv,
            self.sleep_secs,
            self.sleep_score,
            self.readiness,
            self.soreness,
            self.fatigue,
            self.stress,
            self.mood,
            self.motivation,
            self.weight,
            self.spo2,
            self.ctl,
            self.atl,
        ]
        .iter()
        .any(Option::is_some)
    }

    fn apply(&mut self, field: NormalizedField) {
        let slot = match field.field {
            Field::RestingHr => &mut self.resting_hr,
            Field::Hrv => &mut self.hrv,
            Field::SleepDuration => &mut self.sleep_secs,
            Field::SleepScore => &mut self.sleep_score,
            Field::Readiness => &mut self.readiness,
            Field::Soreness => &mut self.soreness,
            Field::Fatigue => &mut self.fatigue,
            Field::Stress => &mut self.stress,
            Field::Mood => &mut self.mood,
            Field::Motivation => &mut self.motivation,
            Field::Weight => &mut self.weight,
            Field::SpO2 => &mut self.spo2,
            Field::Ctl => &mut self.ctl,
            Field::Atl => &mut self.atl,
            _ => return,
        };
        if field.value.is_some() || slot.is_none() {
            *slot = field.value;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSnapshot {
    pub profile: AthleteProfile,
    pub activities: Vec<Activity>,
    pub wellness: Vec<WellnessRecord>,
    pub window: DateWindow,
}

pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

fn text_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn id_field(raw: &Value) -> Option<String> {
    match raw.get("id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn sport_types(entry: &Value) -> Vec<ActivityType> {
    entry
        .get("types")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(Value::as_str)
                .map(ActivityType::from_raw)
                .collect()
        })
        .unwrap_or_default()
}

fn find_value(fields: &[NormalizedField], wanted: Field) -> Option<f64> {
    fields
        .iter()
        .find(|field| field.field == wanted)
        .and_then(|field| field.value)
}

fn preference_hints(raw: &Value) -> PreferenceHints {
    let system = parse_unit_system(raw.get("measurement_preference").and_then(Value::as_str));
    let temperature = raw.get("fahrenheit").and_then(Value::as_bool).map(|fahrenheit| {
        if fahrenheit {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        }
    });
    let wind = parse_wind_unit(raw.get("wind_speed").and_then(Value::as_str));
    PreferenceHints {
        system: system.or_else(|| {
            raw.get("imperial")
                .and_then(Value::as_bool)
                .map(|imperial| if imperial { UnitSystem::Imperial } else { UnitSystem::Metric })
        }),
        temperature,
        wind,
    }
}
