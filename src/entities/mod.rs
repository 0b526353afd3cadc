pub mod author;
pub mod author_rating;
pub mod favorite_author;
pub mod favorite_film;
pub mod film;
pub mod film_author;
pub mod film_rating;
pub mod revoked_token;
pub mod spectator;
pub mod user;
