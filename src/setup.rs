use std::fmt;

use tracing::info;

use crate::config::Config;
use crate::error::Error;
use crate::model_gateway::HostModelGateway;
use crate::providers::intervals::IntervalsClient;
use crate::training::AthleteProfile;

pub const SETUP_INSTRUCTIONS: &str = "\
pacer setup

1. intervals.icu credentials
   Log in at https://intervals.icu, open Settings and find the API section.
   Copy your API key and your athlete id (it looks like i12345).

2. OpenRouter key
   Sign in at https://openrouter.ai and create an API key.

3. Create a .env file in the directory you run pacer from:

   INTERVALS_API=your_intervals_api_key
   ATHLETE_ID=your_athlete_id
   OPENROUTER=your_openrouter_api_key
   OPENROUTER_MODEL=google/gemini-2.5-flash

   Optional: UNITS=imperial, TEMPERATURE_UNIT=fahrenheit, WIND_UNIT=mph,
   DEFAULT_DAYS=30, LOG_FORMAT=json, LOG_OUTPUT=file.

4. Verify with: pacer --setup

Example questions:
   pacer \"How's my training this month?\"
   pacer \"Analyze my last 5 runs\"
   pacer --days 60 \"Compare my fitness trends\"
   pacer \"Am I overtraining?\"";

#[derive(Debug)]
pub struct SetupReport {
    pub athlete_id: String,
    pub model: String,
    pub profile: Result<AthleteProfile, Error>,
    pub gateway: Result<(), Error>,
}

impl SetupReport {
    pub fn is_ok(&self) -> bool {
        self.profile.is_ok() && self.gateway.is_ok()
    }
}

impl fmt::Display for SetupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration loaded")?;
        match &self.profile {
            Ok(profile) => {
                let who = profile.name.as_deref().unwrap_or("unnamed athlete");
                writeln!(f, "  intervals.icu: OK, {who} ({})", self.athlete_id)?;
            }
            Err(err) => writeln!(f, "  intervals.icu: FAILED, {err}")?,
        }
        match &self.gateway {
            Ok(()) => write!(f, "  LLM gateway: OK, key accepted (model {})", self.model),
            Err(err) => write!(f, "  LLM gateway: FAILED, {err}"),
        }
    }
}

pub async fn check_connectivity(cfg: &Config) -> Result<SetupReport, Error> {
    let intervals = IntervalsClient::from_config(cfg)?;
    let gateway = HostModelGateway::from_config(cfg)?;

    let profile = intervals.profile().await;
    let key = gateway.check_key().await;
    info!(
        profile_ok = profile.is_ok(),
        gateway_ok = key.is_ok(),
        "setup check finished"
    );

    Ok(SetupReport {
        athlete_id: cfg.athlete_id.clone(),
        model: cfg.settings.model.clone(),
        profile,
        gateway: key,
    })
}
