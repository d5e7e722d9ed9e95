use clap::Parser;

const EXAMPLES: &str = concat!(
    "Examples:\n",
    "  pacer \"How's my training this month?\"\n",
    "  pacer \"Analyze my last 5 runs\"\n",
    "  pacer --days 60 \"Compare my fitness trends\"",
);

#[derive(Debug, Parser)]
#[command(name = "pacer", version)]
#[command(about = "Ask questions about your intervals.icu training data")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Question about your training
    #[arg(required_unless_present = "setup", num_args = 1..)]
    pub question: Vec<String>,

    /// Days of history to include (default: from the question, else DEFAULT_DAYS)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub days: Option<u32>,

    /// Log debug details to stderr
    #[arg(long)]
    pub debug: bool,

    /// Show setup instructions and check credentials
    #[arg(long)]
    pub setup: bool,
}

impl Cli {
    pub fn question_text(&self) -> String {
        self.question.join(" ").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn joins_question_words() {
        let cli = Cli::try_parse_from(["pacer", "how", "was", "my", "week?"]).expect("valid args");
        assert_eq!(cli.question_text(), "how was my week?");
        assert_eq!(cli.days, None);
        assert!(!cli.debug);
    }

    #[test]
    fn parses_flags_around_the_question() {
        let cli = Cli::try_parse_from(["pacer", "--days", "60", "--debug", "compare trends"])
            .expect("valid args");
        assert_eq!(cli.days, Some(60));
        assert!(cli.debug);
        assert_eq!(cli.question_text(), "compare trends");
    }

    #[test]
    fn rejects_zero_days() {
        assert!(Cli::try_parse_from(["pacer", "--days", "0", "question"]).is_err());
    }

    #[test]
    fn question_is_required_without_setup() {
        assert!(Cli::try_parse_from(["pacer"]).is_err());
        let cli = Cli::try_parse_from(["pacer", "--setup"]).expect("setup alone is valid");
        assert!(cli.setup);
        assert!(cli.question.is_empty());
    }
}
