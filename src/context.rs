use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::normalize::{Field, NormalizedField};
use crate::query::QueryFocus;
use crate::training::{Activity, ActivityType, AthleteProfile, TrainingSnapshot, WellnessRecord};
use crate::units::{self, PreferenceHints, Unit, UnitPreferences};

pub const NO_ACTIVITIES_LINE: &str = "No activities in this period.";
const NOT_AVAILABLE: &str = "not available";
const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
    text: String,
    pub activities_rendered: usize,
    pub activities_omitted: usize,
    pub wellness_rendered: usize,
}

impl PromptContext {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for PromptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// Display-unit overrides win over the athlete's own preferences, which win
// over metric defaults.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    overrides: PreferenceHints,
    max_chars: usize,
}

struct Renderer {
    prefs: UnitPreferences,
}

struct Sections {
    head: String,
    activity_summary: Vec<String>,
    activity_lines: Vec<String>,
    wellness_lines: Vec<String>,
}

impl ContextBuilder {
    pub fn new(overrides: impl Into<PreferenceHints>, max_chars: usize) -> Self {
        Self {
            overrides: overrides.into(),
            max_chars,
        }
    }

    pub fn build(&self, snapshot: &TrainingSnapshot, user_query: &str) -> PromptContext {
        let focus = QueryFocus::parse(user_query);
        let window = snapshot.window;
        let renderer = Renderer {
            prefs: self.overrides.or(snapshot.profile.preferences).resolve(),
        };

        let mut in_window: Vec<&Activity> = snapshot
            .activities
            .iter()
            .filter(|activity| window.contains(activity.date()))
            .collect();
        in_window.sort_by(|a, b| chronological(a, b));
        let selected = focus.select(&in_window);

        let mut wellness: Vec<&WellnessRecord> = snapshot
            .wellness
            .iter()
            .filter(|record| window.contains(record.date) && record.has_data())
            .collect();
        wellness.sort_by_key(|record| record.date);

        let sections = Sections {
            head: renderer.render_head(snapshot, &focus),
            activity_summary: renderer.render_summary(&selected),
            activity_lines: selected
                .iter()
                .map(|activity| renderer.render_activity(activity))
                .collect(),
            wellness_lines: wellness
                .iter()
                .map(|record| renderer.render_wellness(record))
                .collect(),
        };

        let (text, skipped_activities, skipped_wellness) = self.fit_to_budget(&sections);
        PromptContext {
            text,
            activities_rendered: sections.activity_lines.len() - skipped_activities,
            activities_omitted: skipped_activities,
            wellness_rendered: sections.wellness_lines.len() - skipped_wellness,
        }
    }

    fn fit_to_budget(&self, sections: &Sections) -> (String, usize, usize) {
        let activity_count = sections.activity_lines.len();
        let wellness_count = sections.wellness_lines.len();
        let mut skip_activities = 0;
        let mut skip_wellness = 0;

        loop {
            let text = assemble(sections, skip_activities, skip_wellness);
            let len = text.chars().count();
            let exhausted = skip_activities >= activity_count && skip_wellness >= wellness_count;
            if len <= self.max_chars || exhausted {
                return (text, skip_activities, skip_wellness);
            }

            // Drop roughly enough lines to cover the excess; the next pass
            // re-measures because the omission notice changes length too.
            let mut excess = len - self.max_chars;
            while excess > 0
                && (skip_activities < activity_count || skip_wellness < wellness_count)
            {
                let freed = if skip_activities < activity_count {
                    skip_activities += 1;
                    sections.activity_lines[skip_activities - 1].chars().count() + 1
                } else {
                    skip_wellness += 1;
                    sections.wellness_lines[skip_wellness - 1].chars().count() + 1
                };
                excess = excess.saturating_sub(freed);
            }
        }
    }
}

impl Renderer {
    fn render_head(&self, snapshot: &TrainingSnapshot, focus: &QueryFocus) -> String {
        let window = snapshot.window;
        let mut lines = vec![
            "# Training Data".to_string(),
            format!(
                "Period: {} to {} ({} days)",
                window.oldest, window.newest, window.days
            ),
            format!("Focus: {}", focus.describe()),
            String::new(),
            "## Athlete Profile".to_string(),
        ];
        let profile_lines = self.render_profile(&snapshot.profile);
        if profile_lines.is_empty() {
            lines.push("No profile metrics available.".to_string());
        } else {
            lines.extend(profile_lines);
        }
        lines.join("\n")
    }

    fn render_profile(&self, profile: &AthleteProfile) -> Vec<String> {
        let mut lines = Vec::new();
        match (&profile.name, &profile.id) {
            (Some(name), Some(id)) => {
                lines.push(format!("Athlete: {} ({})", sanitize(name), sanitize(id)));
            }
            (Some(name), None) => lines.push(format!("Athlete: {}", sanitize(name))),
            (None, Some(id)) => lines.push(format!("Athlete: {}", sanitize(id))),
            (None, None) => {}
        }
        if let Some(ctl) = profile.ctl {
            lines.push(format!("Fitness (CTL): {}", compact(ctl)));
        }
        if let Some(atl) = profile.atl {
            lines.push(format!("Fatigue (ATL): {}", compact(atl)));
        }
        if let Some(form) = profile.form() {
            lines.push(format_form(form));
        }
        if let Some(ftp) = profile.ftp {
            lines.push(format!("FTP: {:.0} W", ftp));
        }
        if let Some(pace) = profile
            .threshold_pace
            .and_then(|mps| units::pace(mps, self.prefs.system))
        {
            lines.push(format!("Threshold pace: {pace}"));
        }
        if let Some(per_kg) = profile.ftp_per_kg {
            lines.push(format!("FTP per kg: {:.2} W/kg", per_kg));
        }
        if let Some(lthr) = profile.lthr {
            lines.push(format!("LTHR: {:.0} bpm", lthr));
        }
        if let Some(resting_hr) = profile.resting_hr {
            lines.push(format!("Resting HR: {:.0} bpm", resting_hr));
        }
        if let Some((weight, unit)) = self.shown(Field::Weight, profile.weight) {
            lines.push(format!("Weight: {:.1} {}", weight, unit.symbol()));
        }
        if let Some(ramp_rate) = profile.ramp_rate {
            lines.push(format!("Ramp rate: {}", compact(ramp_rate)));
        }
        lines
    }

    fn render_summary(&self, selected: &[&Activity]) -> Vec<String> {
        if selected.is_empty() {
            return vec![NO_ACTIVITIES_LINE.to_string()];
        }

        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        for activity in selected {
            *by_type.entry(activity.kind.label()).or_default() += 1;
        }
        let counts: Vec<String> = by_type
            .iter()
            .map(|(label, count)| format!("{label} {count}"))
            .collect();

        let noun = if selected.len() == 1 { "activity" } else { "activities" };
        let mut totals = vec![format!("{} {noun}", selected.len())];
        if let Some(secs) = sum_present(selected.iter().map(|a| a.moving_time)) {
            totals.push(format_duration(secs));
        }
        if let Some((distance, unit)) =
            self.shown(Field::Distance, sum_present(selected.iter().map(|a| a.distance)))
        {
            totals.push(format!("{:.1} {}", distance, unit.symbol()));
        }
        if let Some(load) = sum_present(selected.iter().map(|a| a.training_load)) {
            totals.push(format!("load {:.0}", load));
        }

        vec![
            format!("Total: {}", totals.join("; ")),
            format!("By type: {}", counts.join(", ")),
        ]
    }

    fn render_activity(&self, activity: &Activity) -> String {
        let mut label = activity.kind.label().to_string();
        if let Some(name) = &activity.name {
            label.push_str(&format!(" \"{}\"", sanitize(name)));
        }
        let mut parts = vec![activity.start.format("%Y-%m-%d %H:%M").to_string(), label];

        if let Some(secs) = activity.moving_time {
            parts.push(format_duration(secs));
        }
        if let Some((distance, unit)) = self.shown(Field::Distance, activity.distance) {
            parts.push(format!("{:.2} {}", distance, unit.symbol()));
        }
        if let Some(speed) = self.render_speed(activity) {
            parts.push(speed);
        }
        match (activity.avg_hr, activity.max_hr) {
            (Some(avg), Some(max)) => parts.push(format!("HR {:.0}/{:.0} bpm", avg, max)),
            (Some(avg), None) => parts.push(format!("HR {:.0} bpm", avg)),
            (None, Some(max)) => parts.push(format!("HR max {:.0} bpm", max)),
            (None, None) => {}
        }
        match (activity.avg_power, activity.normalized_power) {
            (Some(avg), Some(np)) => parts.push(format!("{:.0} W (NP {:.0} W)", avg, np)),
            (Some(avg), None) => parts.push(format!("{:.0} W", avg)),
            (None, Some(np)) => parts.push(format!("NP {:.0} W", np)),
            (None, None) => {}
        }
        if let Some(load) = activity.training_load {
            parts.push(format!("load {:.0}", load));
        }
        if let Some(intensity) = activity.intensity {
            parts.push(format!("intensity {:.0}%", intensity));
        }
        if let Some(ef) = activity.efficiency_factor {
            parts.push(format!("EF {:.2}", ef));
        }
        if let Some(decoupling) = activity.decoupling {
            parts.push(format!("decoupling {:.1}%", decoupling));
        }
        if let Some(cadence) = activity.cadence {
            parts.push(format!("cadence {:.0} rpm", cadence));
        }
        if let Some((gain, unit)) = self.shown(Field::ElevationGain, activity.elevation_gain) {
            parts.push(format!("elev +{:.0} {}", gain, unit.symbol()));
        }
        if let Some((temp, unit)) = self.shown(Field::AvgTemperature, activity.avg_temperature) {
            parts.push(format!("{:.0}{}", temp, unit.symbol()));
        }
        if let Some((wind, unit)) = self.shown(Field::WindSpeed, activity.wind_speed) {
            parts.push(format!("wind {:.0} {}", wind, unit.symbol()));
        }
        if let Some(calories) = activity.calories {
            parts.push(format!("{:.0} kcal", calories));
        }
        parts.join(SEPARATOR)
    }

    // Runners read pace, everyone else reads speed.
    fn render_speed(&self, activity: &Activity) -> Option<String> {
        if activity.kind == ActivityType::Run {
            let pace = units::pace(activity.avg_speed?, self.prefs.system)?;
            return Some(format!("pace {pace}"));
        }
        let (speed, unit) = self.shown(Field::AvgSpeed, activity.avg_speed)?;
        Some(format!("{:.1} {}", speed, unit.symbol()))
    }

    fn render_wellness(&self, record: &WellnessRecord) -> String {
        let or_missing = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let mut parts = vec![
            record.date.to_string(),
            format!(
                "resting HR {}",
                or_missing(record.resting_hr.map(|hr| format!("{:.0} bpm", hr)))
            ),
            format!("HRV {}", or_missing(record.hrv.map(|hrv| format!("{:.0} ms", hrv)))),
            format!("sleep {}", or_missing(record.sleep_secs.map(format_sleep))),
            format!("readiness {}", or_missing(record.readiness.map(compact))),
        ];

        let extras = [
            ("sleep score", record.sleep_score),
            ("soreness", record.soreness),
            ("fatigue", record.fatigue),
            ("stress", record.stress),
            ("mood", record.mood),
            ("motivation", record.motivation),
        ];
        for (label, value) in extras {
            if let Some(value) = value {
                parts.push(format!("{label} {}", compact(value)));
            }
        }
        if let Some(spo2) = record.spo2 {
            parts.push(format!("SpO2 {:.0}%", spo2));
        }
        if let Some((weight, unit)) = self.shown(Field::Weight, record.weight) {
            parts.push(format!("weight {:.1} {}", weight, unit.symbol()));
        }
        if let (Some(ctl), Some(atl)) = (record.ctl, record.atl) {
            parts.push(format!("CTL {} / ATL {}", compact(ctl), compact(atl)));
        }
        parts.join(SEPARATOR)
    }

    fn shown(&self, field: Field, value: Option<f64>) -> Option<(f64, Unit)> {
        let converted = NormalizedField {
            field,
            value,
            unit: field.canonical_unit(),
        }
        .convert(&self.prefs);
        converted.value.map(|value| (value, converted.unit))
    }
}

fn assemble(sections: &Sections, skip_activities: usize, skip_wellness: usize) -> String {
    let mut out = sections.head.clone();

    out.push_str("\n\n## Activities (oldest first)\n");
    out.push_str(&sections.activity_summary.join("\n"));
    if skip_activities > 0 {
        out.push_str(&format!(
            "\n({} older activities omitted to fit the context budget)",
            skip_activities
        ));
    }
    for line in &sections.activity_lines[skip_activities..] {
        out.push('\n');
        out.push_str(line);
    }

    if !sections.wellness_lines.is_empty() {
        out.push_str("\n\n## Wellness (oldest first)");
        if skip_wellness > 0 {
            out.push_str(&format!(
                "\n({} older wellness records omitted to fit the context budget)",
                skip_wellness
            ));
        }
        for line in &sections.wellness_lines[skip_wellness..] {
            out.push('\n');
            out.push_str(line);
        }
    }
    out.push('\n');
    out
}

fn chronological(a: &Activity, b: &Activity) -> Ordering {
    a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id))
}

pub fn format_form(form: f64) -> String {
    let rounded = form.round() as i64;
    let label = match rounded.cmp(&0) {
        Ordering::Greater => "fresh",
        Ordering::Less => "fatigued",
        Ordering::Equal => "neutral",
    };
    format!("Form: {:+} ({})", rounded, label)
}

fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

fn format_sleep(secs: f64) -> String {
    let minutes = (secs.max(0.0) / 60.0).round() as u64;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

// Whole numbers without decimals, everything else with one. Adding 0.0 turns -0 into 0.
fn compact(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0 + 0.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

fn sum_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |acc, value| Some(acc.unwrap_or(0.0) + value))
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() || c == '|' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
