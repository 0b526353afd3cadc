use std::ops::RangeInclusive;

use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{author, film, user};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Spectator,
    Author,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Spectator => "SPECTATOR",
            Role::Author => "AUTHOR",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "SPECTATOR" => Some(Role::Spectator),
            "AUTHOR" => Some(Role::Author),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilmStatus {
    Draft,
    Released,
    Archived,
}

impl FilmStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FilmStatus::Draft => "DRAFT",
            FilmStatus::Released => "RELEASED",
            FilmStatus::Archived => "ARCHIVED",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "DRAFT" => Some(FilmStatus::Draft),
            "RELEASED" => Some(FilmStatus::Released),
            "ARCHIVED" => Some(FilmStatus::Archived),
            _ => None,
        }
    }
}

/// TMDB gender codes, stored as-is on authors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gender {
    NotSpecified,
    Female,
    Male,
    NonBinary,
}

impl Gender {
    pub fn as_code(self) -> i32 {
        match self {
            Gender::NotSpecified => 0,
            Gender::Female => 1,
            Gender::Male => 2,
            Gender::NonBinary => 3,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Gender::NotSpecified),
            1 => Some(Gender::Female),
            2 => Some(Gender::Male),
            3 => Some(Gender::NonBinary),
            _ => None,
        }
    }
}

pub const FILM_NOTE_RANGE: RangeInclusive<i32> = 1..=5;
pub const AUTHOR_NOTE_RANGE: RangeInclusive<i32> = 1..=10;

// TMDB payloads. Only the fields the importer maps are decoded.

#[derive(Clone, Debug, Deserialize)]
pub struct PopularPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<PopularFilm>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PopularFilm {
    pub id: Option<i32>,
    pub title: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExternalFilmRecord {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub release_date: Option<String>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FilmCredits {
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CrewMember {
    pub id: Option<i32>,
    pub job: Option<String>,
    pub name: Option<String>,
}

impl FilmCredits {
    /// First crew member credited as "Director", in list order.
    pub fn director(&self) -> Option<&CrewMember> {
        self.crew.iter().find(|member| member.job.as_deref() == Some("Director"))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExternalPersonRecord {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub popularity: f64,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub homepage: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub deathday: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: i32,
    pub known_for_department: Option<String>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    }))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// API views.

#[derive(Clone, Debug, Serialize)]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<&user::Model> for UserView {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AuthorView {
    pub user: UserView,
    pub popularity: f64,
    pub tmdb_id: Option<i32>,
    pub website: Option<String>,
    pub death_date: Option<String>,
    pub gender: i32,
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub films_count: Option<u64>,
}

impl AuthorView {
    pub fn new(author: &author::Model, user: &user::Model) -> Self {
        Self {
            user: UserView::from(user),
            popularity: author.popularity,
            tmdb_id: author.tmdb_id,
            website: author.website.clone(),
            death_date: author.death_date.clone(),
            gender: author.gender,
            department: author.department.clone(),
            films_count: None,
        }
    }

    pub fn with_films_count(mut self, count: u64) -> Self {
        self.films_count = Some(count);
        self
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FilmView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub release_date: Option<String>,
    pub status: String,
    pub tmdb_id: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

impl From<&film::Model> for FilmView {
    fn from(film: &film::Model) -> Self {
        Self {
            id: film.id,
            title: film.title.clone(),
            description: film.description.clone(),
            release_date: film.release_date.clone(),
            status: film.status.clone(),
            tmdb_id: film.tmdb_id,
            budget: film.budget,
            revenue: film.revenue,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FilmDetailView {
    #[serde(flatten)]
    pub film: FilmView,
    pub authors: Vec<AuthorView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RatingView {
    pub id: i32,
    pub spectator: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub film: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<i32>,
    pub note: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn film_record_treats_empty_release_date_as_missing() {
        let record: ExternalFilmRecord = serde_json::from_str(
            r#"{"id": 9, "title": "Untitled", "overview": null, "release_date": "", "budget": 0}"#,
        )
        .unwrap();
        assert_eq!(record.release_date, None);
        assert_eq!(record.overview, "");
        assert_eq!(record.budget, Some(0));
        assert_eq!(record.revenue, None);
    }

    #[test]
    fn person_record_defaults_optional_fields() {
        let record: ExternalPersonRecord =
            serde_json::from_str(r#"{"id": 7, "name": "David Fincher", "homepage": null}"#)
                .unwrap();
        assert_eq!(record.popularity, 0.0);
        assert_eq!(record.gender, 0);
        assert_eq!(record.homepage, None);
        assert_eq!(record.deathday, None);
        assert_eq!(record.known_for_department, None);
    }

    #[test]
    fn person_record_tolerates_null_popularity_and_gender() {
        let record: ExternalPersonRecord = serde_json::from_str(
            r#"{"id": 7, "name": "David Fincher", "popularity": null, "gender": null}"#,
        )
        .unwrap();
        assert_eq!(record.popularity, 0.0);
        assert_eq!(record.gender, 0);
    }

    #[test]
    fn director_is_first_crew_member_with_exact_job() {
        let credits: FilmCredits = serde_json::from_str(
            r#"{"crew": [
                {"id": 1, "job": "Assistant Director"},
                {"id": 7, "job": "Director", "name": "David Fincher"},
                {"id": 8, "job": "Director"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(credits.director().and_then(|d| d.id), Some(7));
    }

    #[test]
    fn credits_without_crew_have_no_director() {
        let credits: FilmCredits = serde_json::from_str(r#"{"cast": []}"#).unwrap();
        assert!(credits.director().is_none());
    }

    #[test]
    fn status_and_role_codes() {
        assert_eq!(FilmStatus::from_db("ARCHIVED"), Some(FilmStatus::Archived));
        assert_eq!(FilmStatus::from_db("released"), None);
        assert_eq!(Role::from_db(Role::Author.as_str()), Some(Role::Author));
        assert_eq!(Gender::from_code(Gender::NonBinary.as_code()), Some(Gender::NonBinary));
        assert_eq!(Gender::from_code(4), None);
    }
}
