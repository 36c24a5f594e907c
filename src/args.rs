use clap::{Parser, Subcommand};

/// Prediction ballot pool for awards night.
///
/// Fill out a ballot, save it under a shareable link, mark winners as
/// they are announced and compare scores across every ballot you know
/// about.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (directory path, optional) Where the local ballot index lives. Defaults to
    /// $OSCARPOOL_DATA, then ~/.oscarpool.
    #[clap(long, value_parser)]
    pub data_dir: Option<String>,

    /// (file path, optional) Location of the ballot store. Point this at a shared or
    /// synced file to play with others; defaults to ballots.json inside the data
    /// directory.
    #[clap(long, value_parser)]
    pub store: Option<String>,

    /// (URL, optional) Base URL used when printing share links.
    #[clap(long, value_parser)]
    pub base_url: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print a blank ballot template (all categories and nominees) in JSON format.
    Blank {
        /// (file path or empty) Where to write the template. Prints to stdout when
        /// not specified.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Save a ballot and print its share link.
    Save {
        /// Your name, shown on the leaderboard.
        #[clap(short, long, value_parser)]
        name: String,

        /// (file path) The filled-in picks file, as produced by `blank`.
        #[clap(short, long, value_parser)]
        picks: String,

        /// (ballot id, optional) Re-save an existing ballot instead of creating a
        /// new one.
        #[clap(short, long, value_parser)]
        id: Option<String>,

        /// Save even when some categories have no "will win" pick.
        #[clap(long, takes_value = false)]
        force: bool,
    },

    /// Display a ballot by id or share link.
    View {
        /// A ballot id or a share link carrying ?ballot=<id>.
        #[clap(value_parser)]
        ballot: String,
    },

    /// Record the announced winner of a category on a ballot.
    Mark {
        /// A ballot id or a share link.
        #[clap(value_parser)]
        ballot: String,

        /// The category name, e.g. "Best Picture".
        #[clap(short, long, value_parser)]
        category: String,

        /// The winning nominee, exactly as listed on the ballot.
        #[clap(short, long, value_parser)]
        nominee: String,
    },

    /// Clear the announced winner of a category on a ballot.
    Unmark {
        /// A ballot id or a share link.
        #[clap(value_parser)]
        ballot: String,

        /// The category name, e.g. "Best Picture".
        #[clap(short, long, value_parser)]
        category: String,
    },

    /// List the ballots known to this device.
    List,

    /// Delete one of my ballots. The stored record is deleted too; this cannot be
    /// undone.
    Delete {
        #[clap(value_parser)]
        id: String,
    },

    /// Drop a shared ballot from the local list. The stored record is untouched.
    Remove {
        #[clap(value_parser)]
        id: String,
    },

    /// Show the leaderboard and winner-mismatch report across all known ballots.
    Scoreboard,
}
