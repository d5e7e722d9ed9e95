use crate::training::{Activity, ActivityType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Range,
    SingleActivity,
    Comparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    Week,
    Month,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFocus {
    pub scope: Scope,
    pub timeframe: Timeframe,
    pub activity_type: Option<ActivityType>,
    pub activity_count: Option<usize>,
}

impl QueryFocus {
    pub fn parse(question: &str) -> Self {
        let lowered = question.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        let timeframe = if words.contains(&"today") {
            Timeframe::Today
        } else if words.contains(&"week") {
            Timeframe::Week
        } else if words.contains(&"month") {
            Timeframe::Month
        } else {
            Timeframe::Default
        };

        let activity_type = words.iter().find_map(|word| sport_keyword(word));
        let activity_count = words
            .windows(2)
            .find(|pair| pair[0] == "last")
            .and_then(|pair| pair[1].parse::<usize>().ok())
            .filter(|count| *count > 0);

        let asks_for_latest = words.windows(2).any(|pair| {
            matches!(pair[0], "last" | "latest" | "recent") && sport_keyword(pair[1]).is_some()
        });

        let scope = if activity_count.is_some() || words.contains(&"compare") {
            Scope::Comparison
        } else if timeframe == Timeframe::Today || asks_for_latest {
            Scope::SingleActivity
        } else {
            Scope::Range
        };

        Self {
            scope,
            timeframe,
            activity_type,
            activity_count,
        }
    }

    pub fn days_hint(&self) -> Option<u32> {
        match self.timeframe {
            Timeframe::Today => Some(1),
            Timeframe::Week => Some(7),
            Timeframe::Month => Some(30),
            Timeframe::Default => None,
        }
    }

    pub fn select<'a>(&self, sorted: &[&'a Activity]) -> Vec<&'a Activity> {
        let matching: Vec<&'a Activity> = sorted
            .iter()
            .copied()
            .filter(|activity| {
                self.activity_type
                    .as_ref()
                    .is_none_or(|wanted| activity.kind == *wanted)
            })
            .collect();

        let keep = match (self.scope, self.activity_count) {
            (_, Some(count)) => count,
            (Scope::SingleActivity, None) => 1,
            _ => matching.len(),
        };
        let skip = matching.len().saturating_sub(keep);
        matching[skip..].to_vec()
    }

    pub fn describe(&self) -> String {
        let sport = self
            .activity_type
            .as_ref()
            .map(|kind| format!("{kind} activities"))
            .unwrap_or_else(|| "activities".to_string());
        match (self.scope, self.activity_count) {
            (_, Some(count)) => format!("last {count} {sport}"),
            (Scope::SingleActivity, None) => match &self.activity_type {
                Some(kind) => format!("most recent {kind} activity"),
                None => "most recent activity".to_string(),
            },
            _ => format!("all {sport} in the period"),
        }
    }
}

fn sport_keyword(word: &str) -> Option<ActivityType> {
    match word {
        "run" | "runs" | "running" | "jog" | "jogs" => Some(ActivityType::Run),
        "ride" | "rides" | "riding" | "bike" | "biking" | "cycling" => Some(ActivityType::Ride),
        "swim" | "swims" | "swimming" => Some(ActivityType::Swim),
        _ => None,
    }
}
