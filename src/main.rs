//! travel-rag CLI entry point.

use anyhow::Result;
use clap::Parser;
use travel_rag::cli::commands::{self, ExportOptions};
use travel_rag::cli::{Cli, Commands};
use travel_rag::config::Settings;
use travel_rag::logging::{self, Verbosity};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (.env, config file, environment)
    let settings = Settings::load_from(cli.config.as_ref())?;

    // Initialize logging
    let verbosity = Verbosity::from_flags(cli.verbose, cli.command.quiet_by_default());
    logging::init(verbosity, settings.log_dir().as_deref());

    // Execute command
    match cli.command {
        Commands::Convert { input, output } => {
            commands::run_convert(&input, output.as_deref())?;
        }

        Commands::Export {
            city,
            limit,
            output,
            min_rating,
            min_reviews,
            batch_size,
        } => {
            let options = ExportOptions {
                city,
                limit,
                output,
                min_rating,
                min_reviews,
                batch_size,
            };
            commands::run_export(options, &settings).await?;
        }

        Commands::Import {
            input,
            limit,
            working_dir,
            use_postgres,
        } => {
            commands::run_import(&input, limit, working_dir, use_postgres, &settings).await?;
        }

        Commands::Query { query, mode, local } => {
            commands::run_query(&query, mode, local, verbosity, &settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }
    }

    Ok(())
}
