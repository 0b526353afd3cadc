//! Reconciles TMDB films and their directors with local records.

use jiff::civil::Date;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use tracing::{debug, info, warn};

use crate::{
    entities::{author, film, user},
    models::{ExternalFilmRecord, ExternalPersonRecord, Role},
    store::{
        accounts::{self, NewAccount},
        authors::{self, AuthorProfile},
        films::{self, FilmFields},
    },
    tmdb::{Catalog, TmdbError},
};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Catalog(#[from] TmdbError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("cannot split director name {name:?} into first and last name")]
    UnsplittableName { name: String },
    #[error("invalid {field} {value:?}: {source}")]
    InvalidDate {
        field: &'static str,
        value: String,
        #[source]
        source: jiff::Error,
    },
}

/// How a popular-films page is committed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum CommitMode {
    /// Every film commits on its own.
    #[default]
    PerItem,
    /// One transaction for the page, one savepoint per film.
    PerBatch,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SkipReason {
    NoDirector,
    DirectorWithoutId,
}

#[derive(Clone, Debug)]
pub struct ResolvedDirector {
    pub account: user::Model,
    pub author: author::Model,
    pub account_created: bool,
    pub author_created: bool,
}

#[derive(Clone, Debug)]
pub struct ImportedFilm {
    pub film: film::Model,
    pub film_created: bool,
    pub director: ResolvedDirector,
    pub newly_linked: bool,
}

#[derive(Clone, Debug)]
pub enum ImportOutcome {
    Imported(Box<ImportedFilm>),
    Skipped(SkipReason),
}

#[derive(Debug)]
pub struct ItemReport {
    pub tmdb_id: i32,
    pub title: Option<String>,
    pub outcome: Result<ImportOutcome, ImportError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub page: u32,
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn imported(&self) -> usize {
        self.items.iter().filter(|i| matches!(i.outcome, Ok(ImportOutcome::Imported(_)))).count()
    }

    pub fn skipped(&self) -> usize {
        self.items.iter().filter(|i| matches!(i.outcome, Ok(ImportOutcome::Skipped(_)))).count()
    }

    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_err()).count()
    }
}

pub struct Importer<'a, K: Catalog + ?Sized> {
    catalog: &'a K,
    db: &'a DatabaseConnection,
}

impl<'a, K: Catalog + ?Sized> Importer<'a, K> {
    pub fn new(catalog: &'a K, db: &'a DatabaseConnection) -> Self {
        Self { catalog, db }
    }

    /// Imports one film and its director. Local writes are all-or-nothing.
    pub async fn import_film(&self, tmdb_id: i32) -> Result<ImportOutcome, ImportError> {
        reconcile(self.catalog, self.db, tmdb_id).await
    }

    /// Imports every film of one popular-films page. Only a failure to fetch
    /// the page itself aborts the run.
    pub async fn import_popular(
        &self,
        page: u32,
        mode: CommitMode,
    ) -> Result<BatchReport, ImportError> {
        info!(page, "fetching popular films");
        let popular = self.catalog.popular_films(page).await?;
        if popular.results.is_empty() {
            warn!(page, "no popular films returned");
        }

        let entries: Vec<(i32, Option<String>)> = popular
            .results
            .iter()
            .filter_map(|entry| match entry.id {
                Some(tmdb_id) => Some((tmdb_id, entry.title.clone())),
                None => {
                    debug!(title = ?entry.title, "popular entry without id");
                    None
                },
            })
            .collect();

        let items = match mode {
            CommitMode::PerItem => {
                let mut items = Vec::with_capacity(entries.len());
                for (tmdb_id, title) in entries {
                    info!(tmdb_id, title = ?title, "importing film");
                    let outcome = reconcile(self.catalog, self.db, tmdb_id).await;
                    items.push(report_item(tmdb_id, title, outcome));
                }
                items
            },
            CommitMode::PerBatch => {
                // Every remote lookup completes before the page transaction opens.
                let mut fetched = Vec::with_capacity(entries.len());
                for (tmdb_id, title) in entries {
                    info!(tmdb_id, title = ?title, "fetching film");
                    fetched.push((tmdb_id, title, fetch(self.catalog, tmdb_id).await));
                }

                let txn = self.db.begin().await?;
                let mut items = Vec::with_capacity(fetched.len());
                for (tmdb_id, title, result) in fetched {
                    let outcome = match result {
                        Ok(fetched) => persist(&txn, tmdb_id, fetched).await,
                        Err(err) => Err(err),
                    };
                    items.push(report_item(tmdb_id, title, outcome));
                }
                txn.commit().await?;
                items
            },
        };

        let report = BatchReport { page, items };
        info!(
            page,
            imported = report.imported(),
            skipped = report.skipped(),
            failed = report.failed(),
            "popular films import finished"
        );
        Ok(report)
    }
}

fn report_item(
    tmdb_id: i32,
    title: Option<String>,
    outcome: Result<ImportOutcome, ImportError>,
) -> ItemReport {
    if let Err(err) = &outcome {
        warn!(tmdb_id, error = %err, "failed to import film");
    }
    ItemReport { tmdb_id, title, outcome }
}

/// Remote data for one film, gathered before any local write.
enum Fetched {
    Skip(SkipReason),
    Ready { details: ExternalFilmRecord, director_id: i32, person: ExternalPersonRecord },
}

async fn fetch<K: Catalog + ?Sized>(catalog: &K, tmdb_id: i32) -> Result<Fetched, ImportError> {
    let details = catalog.film_details(tmdb_id).await?;
    let credits = catalog.film_credits(tmdb_id).await?;

    let Some(director) = credits.director() else {
        info!(tmdb_id, "no director credited, skipping");
        return Ok(Fetched::Skip(SkipReason::NoDirector));
    };
    let Some(director_id) = director.id else {
        info!(tmdb_id, "director has no TMDB id, skipping");
        return Ok(Fetched::Skip(SkipReason::DirectorWithoutId));
    };
    let person = catalog.person_details(director_id).await?;
    Ok(Fetched::Ready { details, director_id, person })
}

/// Writes one fetched film inside its own transaction, or savepoint when
/// `conn` is already a transaction.
async fn persist<C>(conn: &C, tmdb_id: i32, fetched: Fetched) -> Result<ImportOutcome, ImportError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let (details, director_id, person) = match fetched {
        Fetched::Skip(reason) => return Ok(ImportOutcome::Skipped(reason)),
        Fetched::Ready { details, director_id, person } => (details, director_id, person),
    };

    let txn = conn.begin().await?;
    match apply(&txn, tmdb_id, &details, director_id, &person).await {
        Ok(imported) => {
            txn.commit().await?;
            Ok(ImportOutcome::Imported(Box::new(imported)))
        },
        Err(err) => {
            txn.rollback().await?;
            Err(err)
        },
    }
}

async fn reconcile<K, C>(catalog: &K, conn: &C, tmdb_id: i32) -> Result<ImportOutcome, ImportError>
where
    K: Catalog + ?Sized,
    C: ConnectionTrait + TransactionTrait,
{
    let fetched = fetch(catalog, tmdb_id).await?;
    persist(conn, tmdb_id, fetched).await
}

async fn apply<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
    details: &ExternalFilmRecord,
    director_id: i32,
    person: &ExternalPersonRecord,
) -> Result<ImportedFilm, ImportError> {
    let director = resolve_director(conn, director_id, person).await?;
    let (film, film_created) = upsert_film(conn, tmdb_id, details).await?;
    let newly_linked = films::link_author(conn, film.id, director.author.user_id).await?;

    info!(
        tmdb_id,
        film_id = film.id,
        film_created,
        director = %director.account.display_name(),
        "linked director to film"
    );
    Ok(ImportedFilm { film, film_created, director, newly_linked })
}

pub fn director_username(person_id: i32) -> String {
    format!("author_{person_id}")
}

fn director_email(person_id: i32) -> String {
    format!("author_{person_id}@example.com")
}

/// First and second space-separated tokens. Extra tokens are dropped.
pub fn split_full_name(name: &str) -> Result<(String, String), ImportError> {
    let mut tokens = name.split(' ');
    let first = tokens.next().unwrap_or_default();
    let last = tokens
        .next()
        .ok_or_else(|| ImportError::UnsplittableName { name: name.to_string() })?;
    Ok((first.to_string(), last.to_string()))
}

/// Finds or creates the account for the TMDB person, then upserts its author
/// row keyed by the TMDB id.
pub async fn resolve_director<C: ConnectionTrait>(
    conn: &C,
    person_id: i32,
    person: &ExternalPersonRecord,
) -> Result<ResolvedDirector, ImportError> {
    let username = director_username(person_id);
    let (account, account_created) = accounts::get_or_create(conn, &username, || {
        let (first_name, last_name) = split_full_name(&person.name)?;
        Ok::<_, ImportError>(NewAccount {
            email: director_email(person_id),
            username: username.clone(),
            first_name,
            last_name,
            role: Role::Author,
            password_hash: accounts::UNUSABLE_PASSWORD.to_string(),
            date_of_birth: None,
            is_staff: false,
        })
    })
    .await?;
    if account_created {
        info!(person_id, name = %person.name, "created account for director");
    }

    let profile = AuthorProfile {
        popularity: person.popularity,
        website: person.homepage.clone(),
        death_date: normalize_date("death date", person.deathday.as_deref())?,
        gender: person.gender,
        department: person.known_for_department.clone(),
    };
    let (author, author_created) =
        authors::upsert_by_tmdb_id(conn, person_id, account.id, profile).await?;
    info!(person_id, author_created, "director author row stored");

    Ok(ResolvedDirector { account, author, account_created, author_created })
}

/// Upserts the local film keyed by its TMDB id.
pub async fn upsert_film<C: ConnectionTrait>(
    conn: &C,
    tmdb_id: i32,
    details: &ExternalFilmRecord,
) -> Result<(film::Model, bool), ImportError> {
    let fields = FilmFields {
        title: details.title.clone(),
        description: details.overview.clone(),
        release_date: normalize_date("release date", details.release_date.as_deref())?,
        budget: details.budget,
        revenue: details.revenue,
    };
    Ok(films::upsert_by_tmdb_id(conn, tmdb_id, fields).await?)
}

fn normalize_date(field: &'static str, value: Option<&str>) -> Result<Option<String>, ImportError> {
    value
        .map(|raw| {
            raw.parse::<Date>().map(|date| date.to_string()).map_err(|source| {
                ImportError::InvalidDate { field, value: raw.to_string(), source }
            })
        })
        .transpose()
}
