// ABOUTME: Operator CLI for running fractal searches and property chats from a terminal
// ABOUTME: Creates themes, searches and homes, progresses searches and prints stored results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Create a theme and a search
//! honing-search theme create --name "Parks"
//! honing-search search create --theme <THEME_ID> --location Christchurch --query "Parks in Christchurch by size"
//!
//! # Show the request a round would send, without calling the API
//! honing-search search progress <SEARCH_ID> --dry-run
//!
//! # Run rounds until the assistant reports the list complete (at most 5)
//! honing-search search progress <SEARCH_ID> --rounds 5
//!
//! # Print groups and points
//! honing-search search show <SEARCH_ID>
//!
//! # Rate a home against every chat type of a theme
//! honing-search chat run <HOME_ID> --theme <THEME_ID>
//! ```

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use honing_inn::chat::{clean_address, ChatService};
use honing_inn::config::ServerConfig;
use honing_inn::database::{ChatStore, Database, SearchStore};
use honing_inn::llm::PerplexityClient;
use honing_inn::logging::{LogFormat, LoggingConfig};
use honing_inn::models::{NewChatType, NewHome, NewSearchQuery, NewTheme};
use honing_inn::search::{RoundRequest, SearchEngine};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "honing-search",
    about = "Honing Inn search CLI",
    long_about = "Run LLM fractal searches and property chats against the Honing Inn database."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Theme management
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },
    /// Fractal searches
    Search {
        #[command(subcommand)]
        action: SearchCommand,
    },
    /// Homes and property chats
    Chat {
        #[command(subcommand)]
        action: ChatCommand,
    },
}

#[derive(Subcommand)]
enum ThemeCommand {
    /// Create a theme
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Replacement system prompt for searches
        #[arg(long)]
        geo_prompt: Option<String>,

        /// Replacement system prompt for property chats
        #[arg(long)]
        chat_prompt: Option<String>,
    },
}

#[derive(Subcommand)]
enum SearchCommand {
    /// Create a search
    Create {
        /// Theme ID
        #[arg(long)]
        theme: String,

        /// Location the query is scoped to
        #[arg(long)]
        location: String,

        /// Free-text query sent to the model
        #[arg(long)]
        query: String,
    },

    /// Run rounds of a search
    Progress {
        /// Search ID
        search_id: String,

        /// Build the request without calling the API or saving anything
        #[arg(long)]
        dry_run: bool,

        /// Maximum rounds; stops early once the list is complete
        #[arg(long, default_value = "1")]
        rounds: u32,
    },

    /// Print a search with its groups and points
    Show {
        /// Search ID
        search_id: String,
    },

    /// Delete a search and everything it produced
    Delete {
        /// Search ID
        search_id: String,
    },
}

#[derive(Subcommand)]
enum ChatCommand {
    /// Register a home from a listing title
    AddHome {
        /// Listing title, cleaned into the street address
        #[arg(long)]
        title: String,

        /// Suburb
        #[arg(long)]
        suburb: String,

        /// Latitude
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Listing URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Define a chat type for a theme
    AddType {
        /// Theme ID
        #[arg(long)]
        theme: String,

        /// Topic name
        #[arg(long)]
        name: String,

        /// Prompt template using {address}, {suburb}, {addressType}, {topic}
        #[arg(long)]
        prompt: String,

        /// Value for {addressType}
        #[arg(long, default_value = "address")]
        address_type: String,
    },

    /// Run every chat type of a theme against a home
    Run {
        /// Home ID
        home_id: String,

        /// Theme ID
        #[arg(long)]
        theme: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    logging.format = LogFormat::Compact;
    if cli.verbose {
        "debug".clone_into(&mut logging.level);
    }
    logging.init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    info!("Connecting to database: {}", config.database_url);
    let database = Arc::new(Database::new(&config.database_url).await?);

    match cli.command {
        Command::Theme { action } => match action {
            ThemeCommand::Create {
                name,
                geo_prompt,
                chat_prompt,
            } => {
                let theme = database
                    .create_theme(&NewTheme {
                        name,
                        start_geo_system_prompt: geo_prompt,
                        start_system_prompt: chat_prompt,
                    })
                    .await?;
                println!("Created theme {} ({})", theme.name, theme.id);
            }
        },
        Command::Search { action } => run_search_command(action, database, &config).await?,
        Command::Chat { action } => run_chat_command(action, database, &config).await?,
    }

    Ok(())
}

async fn run_search_command(
    action: SearchCommand,
    database: Arc<Database>,
    config: &ServerConfig,
) -> Result<()> {
    match action {
        SearchCommand::Create {
            theme,
            location,
            query,
        } => {
            if database.get_theme(&theme).await?.is_none() {
                bail!("Theme {theme} not found");
            }
            let search = database
                .create_search(&NewSearchQuery {
                    theme_id: theme,
                    display_name: location,
                    query,
                })
                .await?;
            println!("Created search {}", search.id);
        }
        SearchCommand::Progress {
            search_id,
            dry_run,
            rounds,
        } => {
            let client = Arc::new(PerplexityClient::new(config.completion.clone())?);
            let engine = SearchEngine::new(database, client, config.completion.clone());
            let request = RoundRequest { dry_run };

            for round in 1..=rounds.max(1) {
                let outcome = engine
                    .progress(&search_id, request)
                    .await
                    .with_context(|| format!("Round {round} of search {search_id} failed"))?;

                if dry_run {
                    println!("Dry run: {} messages would be sent", outcome.prompt.messages.len());
                    for message in &outcome.prompt.messages {
                        println!("[{}] {}", message.role, message.content);
                    }
                    break;
                }

                println!(
                    "Round {round}: {} groups, {} points, status {}",
                    outcome.groups.len(),
                    outcome.points.len(),
                    outcome
                        .search
                        .status
                        .map_or("unset", |status| status.as_str())
                );
                if outcome.is_complete {
                    break;
                }
            }
        }
        SearchCommand::Show { search_id } => {
            let Some(search) = database.get_search(&search_id).await? else {
                bail!("Search {search_id} not found");
            };
            println!("{} ({})", search.query, search.display_name);
            println!(
                "Status: {}",
                search.status.map_or("unset", |status| status.as_str())
            );

            let points = database.list_result_points(&search.id).await?;
            for group in database.list_result_groups(&search.id).await? {
                println!("\n# {}", group.display_name);
                for point in points.iter().filter(|p| p.group_id == group.id) {
                    match (point.lat, point.lng) {
                        (Some(lat), Some(lng)) => {
                            println!("- {} - {} ({lat:.5}, {lng:.5})", point.title, point.description);
                        }
                        _ => println!("- {} - {}", point.title, point.description),
                    }
                }
            }
        }
        SearchCommand::Delete { search_id } => {
            if database.delete_search(&search_id).await? {
                println!("Deleted search {search_id}");
            } else {
                bail!("Search {search_id} not found");
            }
        }
    }
    Ok(())
}

async fn run_chat_command(
    action: ChatCommand,
    database: Arc<Database>,
    config: &ServerConfig,
) -> Result<()> {
    match action {
        ChatCommand::AddHome {
            title,
            suburb,
            lat,
            lng,
            url,
        } => {
            let home = database
                .create_home(&NewHome {
                    clean_address: clean_address(&title).trim().to_owned(),
                    title,
                    url,
                    clean_suburb: suburb,
                    lat,
                    lng,
                })
                .await?;
            println!("Created home {} ({})", home.clean_address, home.id);
        }
        ChatCommand::AddType {
            theme,
            name,
            prompt,
            address_type,
        } => {
            let chat_type = database
                .create_chat_type(&NewChatType {
                    theme_id: theme,
                    name,
                    prompt,
                    address_type,
                    start_system_prompt_override: None,
                })
                .await?;
            println!("Created chat type {} ({})", chat_type.name, chat_type.id);
        }
        ChatCommand::Run { home_id, theme } => {
            let Some(home) = database.get_home(&home_id).await? else {
                bail!("Home {home_id} not found");
            };
            let Some(theme) = database.get_theme(&theme).await? else {
                bail!("Theme {theme} not found");
            };

            let client = Arc::new(PerplexityClient::new(config.completion.clone())?);
            let service = ChatService::new(database, client, config.completion.clone());
            for chat in service.run_all_chats(&home, &theme).await? {
                println!("{}: rating {}", chat.chat_type_title, chat.rating);
            }
        }
    }
    Ok(())
}
