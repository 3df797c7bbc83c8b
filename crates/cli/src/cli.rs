use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lurker")]
#[command(about = "Unattended forum session keeper - visits topics and occasionally likes them")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", default_value = "lurker.toml")]
    pub config: PathBuf,

    /// Run the browser with a visible window
    #[arg(long)]
    pub headful: bool,

    /// Cap on topics visited this run (overrides config)
    #[arg(long, value_name = "N")]
    pub max_topics: Option<usize>,

    /// Per-topic like probability in [0,1] (overrides config)
    #[arg(long, value_name = "P")]
    pub like_probability: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["lurker"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.config, PathBuf::from("lurker.toml"));
        assert!(!cli.headful);
        assert!(cli.max_topics.is_none());
        assert!(cli.like_probability.is_none());
    }

    #[test]
    fn parse_overrides() {
        let cli = Cli::try_parse_from([
            "lurker",
            "-vv",
            "--config",
            "/etc/lurker.toml",
            "--max-topics",
            "5",
            "--like-probability",
            "0.5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, PathBuf::from("/etc/lurker.toml"));
        assert_eq!(cli.max_topics, Some(5));
        assert_eq!(cli.like_probability, Some(0.5));
    }

    #[test]
    fn invalid_flag_fails() {
        assert!(Cli::try_parse_from(["lurker", "--unknown"]).is_err());
    }
}
