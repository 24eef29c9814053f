use std::{fmt::Display, fs, path::PathBuf, sync::Arc};

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use database::{
    DatabaseConfig, DatabaseError, DatabaseSettings, SqliteCityleagueRepository,
    SqliteDeckRepository, SqliteMatchRepository, SqliteRecordRepository,
};
use itertools::Itertools;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use types::{IdGenerator, Identifier, LeagueType, MatchValues};
use usecase::{CityleagueUsecase, DeckUsecase, MatchUsecase, RecordUsecase, UsecaseError};

#[derive(Parser, Debug)]
#[command(name = "matchlog", about = "Card game match history")]
struct Params {
    /// Overrides DATABASE_URL and the config file
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// YAML file with database_url, pool_size and acquire_timeout_secs
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the tables and exit
    Init,
    #[command(subcommand)]
    Match(MatchCommand),
    #[command(subcommand)]
    Record(RecordCommand),
    #[command(subcommand)]
    Deck(DeckCommand),
    #[command(subcommand)]
    Cityleague(CityleagueCommand),
}

#[derive(Subcommand, Debug)]
enum MatchCommand {
    Show {
        id: Identifier,
        /// Print a game-by-game summary instead of JSON
        #[arg(long)]
        text: bool,
    },
    List {
        #[arg(long)]
        record_id: Identifier,
        #[arg(long)]
        text: bool,
    },
    Create {
        /// YAML match values, games included
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: Identifier,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        id: Identifier,
    },
}

#[derive(Args, Debug)]
struct Page {
    #[arg(long, default_value_t = 20)]
    limit: u32,
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
    List {
        #[arg(long)]
        user_id: String,
        /// Include every record's matches and games
        #[arg(long)]
        with_matches: bool,
        #[command(flatten)]
        page: Page,
    },
    Show {
        id: Identifier,
    },
}

#[derive(Subcommand, Debug)]
enum DeckCommand {
    Show {
        id: Identifier,
        /// Print name and latest code instead of JSON
        #[arg(long)]
        text: bool,
    },
    List {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        archived: Option<bool>,
        #[arg(long)]
        text: bool,
        #[command(flatten)]
        page: Page,
    },
}

#[derive(Subcommand, Debug)]
enum CityleagueCommand {
    Results {
        #[arg(long, conflicts_with = "date", required_unless_present = "date")]
        schedule_id: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        league_type: Option<LeagueType>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to render output: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Usecase(#[from] UsecaseError),
}

fn read_yaml<T: DeserializeOwned>(path: &PathBuf) -> Result<T, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| CliError::Yaml {
        path: path.clone(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_one<T: Serialize + Display>(value: &T, text: bool) -> Result<(), CliError> {
    if text {
        println!("{value}");
        Ok(())
    } else {
        print_json(value)
    }
}

fn print_all<T: Serialize + Display>(values: &[T], text: bool) -> Result<(), CliError> {
    if text {
        println!("{}", values.iter().join("\n\n"));
        Ok(())
    } else {
        print_json(&values)
    }
}

async fn connect(params: &Params) -> Result<SqlitePool, CliError> {
    let settings = match &params.config {
        Some(path) => Some(read_yaml::<DatabaseSettings>(path)?),
        None => None,
    };
    let config = DatabaseConfig::from_cli_or_env_or_yaml(params.database_url.clone(), settings);
    log::info!("Connecting to {}", config.url);
    Ok(config.connect().await?)
}

async fn run_match(
    command: MatchCommand,
    pool: SqlitePool,
    ids: Arc<IdGenerator>,
) -> Result<(), CliError> {
    let matches = MatchUsecase::new(
        SqliteMatchRepository::new(pool.clone()),
        SqliteRecordRepository::new(pool),
        ids,
    );
    match command {
        MatchCommand::Show { id, text } => print_one(&matches.find_by_id(id).await?, text),
        MatchCommand::List { record_id, text } => {
            print_all(&matches.find_by_record_id(record_id).await?, text)
        }
        MatchCommand::Create { file } => {
            let values: MatchValues = read_yaml(&file)?;
            print_json(&matches.create(values, Utc::now()).await?)
        }
        MatchCommand::Update { id, file } => {
            let values: MatchValues = read_yaml(&file)?;
            print_json(&matches.update(id, values, Utc::now()).await?)
        }
        MatchCommand::Delete { id } => Ok(matches.delete(id).await?),
    }
}

async fn run_record(
    command: RecordCommand,
    pool: SqlitePool,
    ids: Arc<IdGenerator>,
) -> Result<(), CliError> {
    let records = RecordUsecase::new(SqliteRecordRepository::new(pool), ids);
    match command {
        RecordCommand::List {
            user_id,
            with_matches: true,
            page,
        } => print_json(
            &records
                .find_with_matches_by_user_id(&user_id, page.limit, page.offset)
                .await?,
        ),
        RecordCommand::List {
            user_id,
            with_matches: false,
            page,
        } => print_json(
            &records
                .find_by_user_id(&user_id, page.limit, page.offset)
                .await?,
        ),
        RecordCommand::Show { id } => print_json(&records.find_by_id(id).await?),
    }
}

async fn run_deck(
    command: DeckCommand,
    pool: SqlitePool,
    ids: Arc<IdGenerator>,
) -> Result<(), CliError> {
    let decks = DeckUsecase::new(SqliteDeckRepository::new(pool), ids);
    match command {
        DeckCommand::Show { id, text } => print_one(&decks.find_by_id(id).await?, text),
        DeckCommand::List {
            user_id,
            archived,
            text,
            page,
        } => print_all(
            &decks
                .find_by_user_id(&user_id, archived, page.limit, page.offset)
                .await?,
            text,
        ),
    }
}

async fn run_cityleague(command: CityleagueCommand, pool: SqlitePool) -> Result<(), CliError> {
    let cityleague = CityleagueUsecase::new(SqliteCityleagueRepository::new(pool));
    match command {
        CityleagueCommand::Results {
            schedule_id: Some(schedule_id),
            league_type,
            ..
        } => print_json(
            &cityleague
                .find_by_schedule_id(&schedule_id, league_type)
                .await?,
        ),
        CityleagueCommand::Results {
            date: Some(date),
            league_type,
            ..
        } => print_json(&cityleague.find_by_date(date, league_type).await?),
        CityleagueCommand::Results { .. } => print_json(&Vec::<()>::new()),
    }
}

async fn run(params: Params) -> Result<(), CliError> {
    let pool = connect(&params).await?;
    let ids = Arc::new(IdGenerator::new());

    match params.command {
        Command::Init => {
            log::info!("Schema ready");
            Ok(())
        }
        Command::Match(command) => run_match(command, pool, ids).await,
        Command::Record(command) => run_record(command, pool, ids).await,
        Command::Deck(command) => run_deck(command, pool, ids).await,
        Command::Cityleague(command) => run_cityleague(command, pool).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let params = Params::parse();
    log::info!("args: {params:?}");

    if let Err(e) = run(params).await {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
