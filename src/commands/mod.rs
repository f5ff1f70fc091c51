use clap::{Args, Parser, Subcommand};
use pagecal::components::extractor::Selection;
use pagecal::config::Config;
use pagecal::error::AppResult;
use std::path::PathBuf;

// Export submodules
pub mod calendar;
pub mod page;

/// Type alias for command result
pub type CommandResult = AppResult<()>;

#[derive(Debug, Parser)]
#[command(name = "pagecal")]
#[command(about = "Turn a saved web page into a calendar event")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe the configured calendar server
    Check,

    /// Save calendar server connection settings
    Configure {
        /// URL of the calendar collection
        server_url: String,
        username: String,
        password: String,
    },

    /// Print everything the page suggests for a new event
    Suggest(PageArgs),

    /// Build an event from the page and publish it
    Publish(EventArgs),

    /// Build an event from the page and print its ICS text
    Show(EventArgs),
}

/// The page snapshot and how the user reached it
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Saved HTML page
    pub file: PathBuf,

    /// Page URL, written as URL and Source footer
    #[arg(long)]
    pub url: Option<String>,

    /// Text the user selected on the page
    #[arg(long = "select", value_name = "TEXT")]
    pub select: Option<String>,
}

impl PageArgs {
    pub fn selection(&self) -> Option<Selection> {
        self.select.clone().map(Selection::Quote)
    }
}

/// Event fields given on the command line
#[derive(Debug, Clone, Args)]
pub struct EventArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Event title (default: first title suggestion)
    #[arg(long)]
    pub title: Option<String>,

    /// Start instant, or YYYY-MM-DD with --all-day
    #[arg(long)]
    pub start: Option<String>,

    /// End instant, or inclusive last day with --all-day
    #[arg(long)]
    pub end: Option<String>,

    /// Create an all-day event
    #[arg(long)]
    pub all_day: bool,

    /// Use date suggestion N (1-based)
    #[arg(long = "date", value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub date: Option<u64>,

    /// Description body
    #[arg(long)]
    pub description: Option<String>,
}

impl EventArgs {
    /// Zero-based index of the chosen date suggestion
    pub fn date_index(&self) -> Option<usize> {
        self.date.map(|n| (n - 1) as usize)
    }
}

/// Execute a parsed command
pub async fn run(command: Command, config: Config) -> CommandResult {
    match command {
        Command::Check => calendar::check(&config).await,
        Command::Configure {
            server_url,
            username,
            password,
        } => calendar::configure(&config, server_url, username, password),
        Command::Suggest(args) => page::suggest(&config, args).await,
        Command::Publish(args) => calendar::publish(&config, args, false).await,
        Command::Show(args) => calendar::publish(&config, args, true).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("pagecal").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_publish_options() {
        let cli = parse(&[
            "publish", "page.html", "--title", "Concert", "--all-day", "--date", "2", "--select",
            "Doors open",
        ])
        .unwrap();

        let Command::Publish(args) = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(args.page.file, PathBuf::from("page.html"));
        assert_eq!(args.title.as_deref(), Some("Concert"));
        assert!(args.all_day);
        assert_eq!(args.date_index(), Some(1));
        assert_eq!(
            args.page.selection(),
            Some(Selection::Quote("Doors open".to_string()))
        );
    }

    #[test]
    fn test_parse_configure() {
        let cli = parse(&["configure", "https://dav.example.com/cal", "user", "pass"]).unwrap();
        let Command::Configure {
            server_url,
            username,
            password,
        } = cli.command
        else {
            panic!("expected configure");
        };
        assert_eq!(server_url, "https://dav.example.com/cal");
        assert_eq!(username, "user");
        assert_eq!(password, "pass");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["publish"]).is_err());
        assert!(parse(&["publish", "a.html", "--date", "0"]).is_err());
        assert!(parse(&["publish", "a.html", "--date", "two"]).is_err());
        assert!(parse(&["publish", "a.html", "--bogus"]).is_err());
        assert!(parse(&["suggest", "a.html", "--title", "x"]).is_err());
        assert!(parse(&["configure", "https://x"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&[]).is_err());
    }
}
