use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cinematheque::{
    AppState,
    auth,
    config::Config,
    db,
    importer::{BatchReport, CommitMode, ImportError, ImportOutcome, Importer, SkipReason},
    models::Role,
    routes,
    store::accounts::{self, NewAccount},
    tmdb::TmdbClient,
};
use sea_orm::DatabaseConnection;

#[derive(Parser)]
#[command(name = "cinematheque")]
#[command(about = "Cinema catalog backend with TMDB import")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve,
    /// Add a movie and its director from a TMDB movie id
    AddMovie {
        /// TMDB id of the movie
        tmdb_id: i32,
    },
    /// Add every popular TMDB movie of one page and their directors
    Populate {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, value_enum, default_value_t = CommitMode::PerItem)]
        commit: CommitMode,
    },
    /// Create a staff account for the admin-only endpoints
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Admin")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,cinematheque=debug,sqlx=warn".to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env()?);
    let db = db::connect_and_migrate(&config.database_url)
        .await
        .context("open database")?;

    match cli.command {
        Command::Serve => serve(config, db).await,
        Command::AddMovie { tmdb_id } => add_movie(&config, &db, tmdb_id).await,
        Command::Populate { page, commit } => populate(&config, &db, page, commit).await,
        Command::CreateAdmin { email, password, first_name, last_name } => {
            create_admin(&db, email, password, first_name, last_name).await
        },
    }
}

async fn serve(config: Arc<Config>, db: DatabaseConnection) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.clone(), db));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn tmdb_client(config: &Config) -> anyhow::Result<TmdbClient> {
    let http = reqwest::Client::builder()
        .user_agent("cinematheque/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;
    TmdbClient::new(
        http,
        config.tmdb_access_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    )
    .context("set TMDB_API_KEY to import from TMDB")
}

async fn add_movie(config: &Config, db: &DatabaseConnection, tmdb_id: i32) -> anyhow::Result<()> {
    let tmdb = tmdb_client(config)?;
    println!("Getting details for movie with TMDB ID: {tmdb_id}...");

    let outcome = Importer::new(&tmdb, db).import_film(tmdb_id).await;
    match outcome {
        Ok(outcome) => {
            print_outcome(&outcome);
            println!("Command completed successfully!");
            Ok(())
        },
        Err(err) => Err(anyhow::Error::new(err).context(format!("import of movie {tmdb_id}"))),
    }
}

async fn populate(
    config: &Config,
    db: &DatabaseConnection,
    page: u32,
    commit: CommitMode,
) -> anyhow::Result<()> {
    let tmdb = tmdb_client(config)?;
    println!("Getting popular movies from TMDB (page {page})");

    let report = Importer::new(&tmdb, db)
        .import_popular(page, commit)
        .await
        .context("fetch popular movies")?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    if report.items.is_empty() {
        println!("WARNING: no popular movies found on TMDB");
        return;
    }
    for item in &report.items {
        let title = item.title.as_deref().unwrap_or("?");
        println!("Film: '{title}' (TMDB ID: {})", item.tmdb_id);
        match &item.outcome {
            Ok(outcome) => print_outcome(outcome),
            Err(err) => print_failure(item.tmdb_id, err),
        }
    }
    println!(
        "Finished importing popular movies: {} imported, {} skipped, {} failed",
        report.imported(),
        report.skipped(),
        report.failed()
    );
}

fn print_outcome(outcome: &ImportOutcome) {
    match outcome {
        ImportOutcome::Skipped(SkipReason::NoDirector) => {
            println!("WARNING: no director credited, skipped")
        },
        ImportOutcome::Skipped(SkipReason::DirectorWithoutId) => {
            println!("WARNING: director has no TMDB id, skipped")
        },
        ImportOutcome::Imported(imported) => {
            let director = imported.director.account.display_name();
            if imported.director.account_created {
                println!("Created new user for director {director}");
            }
            if imported.director.author_created {
                println!("Created new author: {director}");
            } else {
                println!("Updated author: {director}");
            }
            if imported.film_created {
                println!("Added film: '{}'", imported.film.title);
            } else {
                println!("Updated film: '{}'", imported.film.title);
            }
            println!("Associated director '{director}' with film '{}'", imported.film.title);
        },
    }
}

fn print_failure(tmdb_id: i32, err: &ImportError) {
    eprintln!("ERROR: failed to process movie ID {tmdb_id}: {err}");
}

async fn create_admin(
    db: &DatabaseConnection,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> anyhow::Result<()> {
    auth::validate_password(&password).map_err(anyhow::Error::msg)?;
    if accounts::find_by_email(db, &email).await?.is_some() {
        anyhow::bail!("an account with email {email} already exists");
    }
    let password_hash = auth::hash_password(&password)?;
    let user = accounts::create(
        db,
        NewAccount {
            email: email.clone(),
            username: accounts::normalize_email(&email),
            first_name,
            last_name,
            role: Role::Author,
            password_hash,
            date_of_birth: None,
            is_staff: true,
        },
    )
    .await?;
    println!("Created staff account {} (id {})", user.email, user.id);
    Ok(())
}
