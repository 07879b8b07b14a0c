//! Café repository for database operations.

use sqlx::SqlitePool;

use cafe_and_wifi_core::{CafeId, CoffeePrice, Location, SeatRange, UserId};

use super::RepositoryError;
use crate::models::cafe::{Cafe, NewCafe};

const CAFE_COLUMNS: &str = "id, name, map_url, img_url, location, has_sockets, has_toilet, \
     has_wifi, can_take_calls, seats, coffee_price, description, opening_time, likes, author_id";

#[derive(sqlx::FromRow)]
struct CafeRow {
    id: i64,
    name: String,
    map_url: String,
    img_url: String,
    location: String,
    has_sockets: bool,
    has_toilet: bool,
    has_wifi: bool,
    can_take_calls: bool,
    seats: String,
    coffee_price: String,
    description: String,
    opening_time: Option<String>,
    likes: i64,
    author_id: i64,
}

impl TryFrom<CafeRow> for Cafe {
    type Error = RepositoryError;

    fn try_from(row: CafeRow) -> Result<Self, Self::Error> {
        let location: Location = row
            .location
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("cafe {}: {e}", row.id)))?;
        let seats: SeatRange = row
            .seats
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("cafe {}: {e}", row.id)))?;
        let coffee_price = CoffeePrice::parse(&row.coffee_price).map_err(|e| {
            RepositoryError::DataCorruption(format!("cafe {}: invalid price: {e}", row.id))
        })?;

        Ok(Self {
            id: CafeId::new(row.id),
            name: row.name,
            map_url: row.map_url,
            img_url: row.img_url,
            location,
            has_sockets: row.has_sockets,
            has_toilet: row.has_toilet,
            has_wifi: row.has_wifi,
            can_take_calls: row.can_take_calls,
            seats,
            coffee_price,
            description: row.description,
            opening_time: row.opening_time,
            likes: row.likes,
            author_id: UserId::new(row.author_id),
        })
    }
}

fn into_cafes(rows: Vec<CafeRow>) -> Result<Vec<Cafe>, RepositoryError> {
    rows.into_iter().map(Cafe::try_from).collect()
}

/// Repository for café database operations.
pub struct CafeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CafeRepository<'a> {
    /// Create a new café repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a café. Likes start at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a café with the same name exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, cafe: &NewCafe) -> Result<Cafe, RepositoryError> {
        let row: CafeRow = sqlx::query_as(&format!(
            r"
            INSERT INTO cafes (name, map_url, img_url, location, has_sockets, has_toilet,
                               has_wifi, can_take_calls, seats, coffee_price, description,
                               opening_time, author_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {CAFE_COLUMNS}
            "
        ))
        .bind(&cafe.name)
        .bind(&cafe.map_url)
        .bind(cafe.img_url.as_str())
        .bind(cafe.location.label())
        .bind(cafe.has_sockets)
        .bind(cafe.has_toilet)
        .bind(cafe.has_wifi)
        .bind(cafe.can_take_calls)
        .bind(cafe.seats.label())
        .bind(cafe.coffee_price.to_string())
        .bind(&cafe.description)
        .bind(cafe.opening_time.as_deref())
        .bind(cafe.author_id.as_i64())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "cafe name already exists"))?;

        row.try_into()
    }

    /// Get a café by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored choice or price is invalid.
    pub async fn get_by_id(&self, id: CafeId) -> Result<Option<Cafe>, RepositoryError> {
        let row: Option<CafeRow> =
            sqlx::query_as(&format!("SELECT {CAFE_COLUMNS} FROM cafes WHERE id = ?"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        row.map(Cafe::try_from).transpose()
    }

    /// List every café in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Cafe>, RepositoryError> {
        let rows: Vec<CafeRow> =
            sqlx::query_as(&format!("SELECT {CAFE_COLUMNS} FROM cafes ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        into_cafes(rows)
    }

    /// List the cafés in one location, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_location(&self, location: Location) -> Result<Vec<Cafe>, RepositoryError> {
        let rows: Vec<CafeRow> = sqlx::query_as(&format!(
            "SELECT {CAFE_COLUMNS} FROM cafes WHERE location = ? ORDER BY id"
        ))
        .bind(location.label())
        .fetch_all(self.pool)
        .await?;

        into_cafes(rows)
    }

    /// Whether a café with this exact name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cafes WHERE name = ?)")
            .bind(name)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// Number of distinct locations that have at least one café.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distinct_location_count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT location) FROM cafes")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Add one like to a café.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the café does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment_likes(&self, id: CafeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cafes SET likes = likes + 1 WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
