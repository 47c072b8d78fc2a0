use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use coinboard::core::TimePeriod;
use coinboard::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List the top cryptocurrencies
    Coins {
        /// Number of coins to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show details for a single coin
    Coin {
        /// Coin id
        id: String,
    },
    /// Compare the price history of two coins
    Compare {
        /// First coin id or symbol
        first: String,
        /// Second coin id or symbol
        second: String,
        /// History period (3h, 24h, 7d, 30d, 3m, 1y, 3y, 5y)
        #[arg(short, long)]
        period: Option<TimePeriod>,
        /// Show percentage returns instead of prices
        #[arg(long)]
        percent: bool,
    },
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        /// Source coin or fiat currency
        from: String,
        /// Target coin or fiat currency
        to: String,
        /// Swap source and target before converting
        #[arg(long)]
        swap: bool,
    },
    /// List exchanges by trading volume
    Exchanges {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show recent cryptocurrency news
    News {
        /// Search query
        #[arg(short, long)]
        query: Option<String>,
        /// Number of articles
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
}

impl TryFrom<Commands> for coinboard::AppCommand {
    type Error = anyhow::Error;

    fn try_from(cmd: Commands) -> Result<coinboard::AppCommand> {
        Ok(match cmd {
            Commands::Coins { limit } => coinboard::AppCommand::Coins { limit },
            Commands::Coin { id } => coinboard::AppCommand::Coin { id },
            Commands::Compare {
                first,
                second,
                period,
                percent,
            } => coinboard::AppCommand::Compare {
                first,
                second,
                period,
                percent,
            },
            Commands::Convert {
                amount,
                from,
                to,
                swap,
            } => coinboard::AppCommand::Convert {
                amount,
                from,
                to,
                swap,
            },
            Commands::Exchanges { limit } => coinboard::AppCommand::Exchanges { limit },
            Commands::News { query, count } => coinboard::AppCommand::News { query, count },
            Commands::Setup => anyhow::bail!("Setup command is handled separately"),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => coinboard::cli::setup::setup_at_path(path),
            None => coinboard::cli::setup::setup(),
        },
        Some(cmd) => match coinboard::AppCommand::try_from(cmd) {
            Ok(command) => coinboard::run_command(command, cli.config_path.as_deref()).await,
            Err(e) => Err(e),
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
