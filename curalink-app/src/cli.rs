use clap::{Args, Parser, Subcommand, ValueEnum};
use curalink_catalog::summary::SUMMARY_FILE_NAME;
use std::path::PathBuf;

/// CuraLink: find medical experts, publications and clinical trials.
#[derive(Parser, Debug)]
#[command(name = "curalink", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "curalink.yaml")]
    pub config: PathBuf,

    /// Duplicate logs to stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a profile and set the account type for this device
    Onboard {
        #[command(subcommand)]
        account: OnboardAccount,
    },
    /// Show or update the stored profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Search the catalog
    Search {
        /// Free-text query (empty lists everything)
        query: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = SearchKind::All)]
        kind: SearchKind,
    },
    /// Toggle a favorite
    Favorite {
        /// researchers, publications or trials
        category: String,
        id: String,
    },
    /// List favorites, or print the research summary export
    Favorites {
        #[arg(long)]
        summary: bool,

        /// Write the summary to a file instead of stdout
        /// (medical-research-summary.txt when no path is given)
        #[arg(
            short,
            long,
            requires = "summary",
            num_args = 0..=1,
            default_missing_value = SUMMARY_FILE_NAME
        )]
        output: Option<PathBuf>,
    },
    /// Plain-language summary of a publication or trial
    Summarize {
        #[arg(value_enum)]
        kind: SummaryKind,
        id: String,
    },
    /// Talk to the assistant (interactive when no message is given)
    Chat {
        message: Vec<String>,

        /// Clear the conversation before starting
        #[arg(long)]
        reset: bool,
    },
    /// Ask a researcher for a meeting
    Meet(MeetArgs),
    /// Community discussions
    Forum {
        #[command(subcommand)]
        action: ForumAction,
    },
    /// Forget the profile, favorites and conversation on this device
    Logout,
}

#[derive(Subcommand, Debug)]
pub enum OnboardAccount {
    Patient(PatientArgs),
    Researcher(ResearcherArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct PatientArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    /// Condition of interest
    #[arg(long, default_value = "")]
    pub disease: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long, default_value = "")]
    pub info: String,
}

#[derive(Args, Debug, Default, Clone)]
pub struct ResearcherArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub institution: String,
    #[arg(long, default_value = "")]
    pub specialties: String,
    #[arg(long, default_value = "")]
    pub interests: String,
    #[arg(long, default_value = "")]
    pub location: String,
    #[arg(long, default_value = "")]
    pub orcid: String,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    Show,
    /// Change individual fields; omitted fields keep their value
    Edit(ProfileEdit),
}

#[derive(Args, Debug, Default, Clone)]
pub struct ProfileEdit {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub disease: Option<String>,
    #[arg(long)]
    pub info: Option<String>,
    #[arg(long)]
    pub institution: Option<String>,
    #[arg(long)]
    pub specialties: Option<String>,
    #[arg(long)]
    pub interests: Option<String>,
    #[arg(long)]
    pub orcid: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    All,
    Researchers,
    Publications,
    Trials,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::All => "all",
            SearchKind::Researchers => "researchers",
            SearchKind::Publications => "publications",
            SearchKind::Trials => "trials",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Publication,
    Trial,
}

#[derive(Args, Debug, Default, Clone)]
pub struct MeetArgs {
    /// Researcher id from search results
    pub researcher_id: String,
    /// Preferred date, YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub date: String,
    /// Preferred time, HH:MM
    #[arg(long, default_value = "")]
    pub time: String,
    /// Minutes: 15, 30, 45 or 60
    #[arg(long, default_value_t = 30)]
    pub duration: u32,
    #[arg(long, default_value = "")]
    pub message: String,
}

#[derive(Subcommand, Debug)]
pub enum ForumAction {
    List {
        query: Vec<String>,

        /// Category name (any case), or "all"
        #[arg(long)]
        category: Option<String>,
    },
    /// Show the categories available for new posts
    Categories,
    Post {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        content: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_joins_words_and_defaults_to_all() {
        let cli = Cli::try_parse_from(["curalink", "search", "deep", "brain"]).unwrap();
        match cli.command {
            Command::Search { query, kind } => {
                assert_eq!(query.join(" "), "deep brain");
                assert_eq!(kind, SearchKind::All);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn onboarding_fields_may_be_left_blank() {
        let cli = Cli::try_parse_from(["curalink", "onboard", "patient", "--name", "Ann"]).unwrap();
        match cli.command {
            Command::Onboard {
                account: OnboardAccount::Patient(args),
            } => {
                assert_eq!(args.name, "Ann");
                assert!(args.disease.is_empty());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bare_output_flag_uses_the_summary_file_name() {
        let cli = Cli::try_parse_from(["curalink", "favorites", "--summary", "-o"]).unwrap();
        match cli.command {
            Command::Favorites { summary, output } => {
                assert!(summary);
                assert_eq!(output, Some(PathBuf::from(SUMMARY_FILE_NAME)));
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["curalink", "favorites", "--summary"]).unwrap();
        assert!(matches!(cli.command, Command::Favorites { output: None, .. }));
    }
}
