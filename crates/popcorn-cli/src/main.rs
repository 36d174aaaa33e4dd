use clap::{ArgAction, Parser, Subcommand};
use commands::{config, context::AppContext, interactive, rate, search, show, watched};

mod commands;
mod logging;
mod output;
mod ui;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "popcorn - search movies and keep a rated list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search the movie database by title. Queries shorter than the configured minimum (3 characters by default) are not sent.")]
    Search {
        /// Title to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show details for one title
    Show {
        /// IMDb identifier, e.g. tt1375666
        imdb_id: String,
    },
    /// Rate a title and add it to the watched list
    #[command(long_about = "Fetch a title, rate it on the configured scale (1-10 by default) and add it to the watched list. Titles already on the list are left alone unless --update is given.")]
    Rate {
        /// IMDb identifier, e.g. tt1375666
        imdb_id: String,

        /// Your rating
        rating: u8,

        /// Replace the rating of a title already on the list
        #[arg(long, action = ArgAction::SetTrue)]
        update: bool,
    },
    /// Manage the watched list
    Watched {
        #[command(subcommand)]
        cmd: Option<WatchedCommands>,
    },
    /// Interactive search session
    #[command(long_about = "Start a line-based session: typing text searches as you go, ':open N' shows a result, ':rate N' and ':add' put it on the watched list. Type ':help' inside the session for all commands.")]
    Interactive,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum WatchedCommands {
    /// List watched titles with summary statistics
    List,
    /// Show summary statistics only
    Summary,
    /// Remove a title from the list
    Remove {
        /// IMDb identifier
        imdb_id: String,
    },
    /// Export the list as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(long, short = 'o')]
        file: Option<std::path::PathBuf>,
    },
    /// Remove every title from the list
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short = 'y', action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Store the OMDb API key in the credentials file
    #[command(long_about = "Store the OMDb API key in the credentials file. Get a free key at https://www.omdbapi.com/apikey.aspx. If no key is given you will be prompted for it.")]
    ApiKey {
        /// API key (if not provided, will prompt)
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let ctx = AppContext::load()?;

    logging::init_logging(cli.verbose, cli.quiet, &ctx.config.logging)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(&query.join(" "), &ctx, &output).await,
        Commands::Show { imdb_id } => show::run_show(&imdb_id, &ctx, &output).await,
        Commands::Rate { imdb_id, rating, update } => rate::run_rate(&imdb_id, rating, update, &ctx, &output).await,
        Commands::Watched { cmd } => {
            let cmd = cmd.unwrap_or(WatchedCommands::List);
            watched::run_watched(cmd, &ctx, &output).await
        }
        Commands::Interactive => interactive::run_interactive(&ctx, output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, ctx, &output).await
        }
    }
}
