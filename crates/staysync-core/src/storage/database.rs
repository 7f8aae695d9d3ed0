//! SQLite-backed store for hotels, guests and stays.
//!
//! Keys and uniqueness:
//! - Hotel: `pms_hotel_id`
//! - Guest: `phone` (E.164)
//! - Stay: `(pms_hotel_id, pms_reservation_id)`
//!
//! Uniqueness violations surface as [`DatabaseError::Conflict`] so callers
//! can treat a lost insert race as "already exists".

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::data_dir;
use super::migrations;
use crate::error::DatabaseError;
use crate::models::{Guest, Hotel, Language, Stay, StayStatus};

const DATE_FORMAT: &str = "%Y-%m-%d";

const GUEST_COLUMNS: &str = "id, phone, name, language, created_at, updated_at";
const STAY_COLUMNS: &str = "id, pms_hotel_id, hotel_id, guest_id, pms_reservation_id, pms_guest_id,
     status, checkin, checkout, created_at, updated_at";

// === Helper Functions ===

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Parse a stored `YYYY-MM-DD` column.
fn parse_date_column(idx: usize, value: &str) -> Result<NaiveDate, rusqlite::Error> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn row_to_hotel(row: &rusqlite::Row) -> Result<Hotel, rusqlite::Error> {
    Ok(Hotel {
        id: row.get(0)?,
        pms_hotel_id: row.get(1)?,
        name: row.get(2)?,
    })
}

fn row_to_guest(row: &rusqlite::Row) -> Result<Guest, rusqlite::Error> {
    let language: Option<String> = row.get(3)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;

    Ok(Guest {
        id: row.get(0)?,
        phone: row.get(1)?,
        name: row.get(2)?,
        language: language.as_deref().and_then(Language::from_code),
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

fn row_to_stay(row: &rusqlite::Row) -> Result<Stay, rusqlite::Error> {
    let status: String = row.get(6)?;
    let checkin: String = row.get(7)?;
    let checkout: String = row.get(8)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    Ok(Stay {
        id: row.get(0)?,
        pms_hotel_id: row.get(1)?,
        hotel_id: row.get(2)?,
        guest_id: row.get(3)?,
        pms_reservation_id: row.get(4)?,
        pms_guest_id: row.get(5)?,
        status: StayStatus::from_db(&status),
        checkin: parse_date_column(7, &checkin)?,
        checkout: parse_date_column(8, &checkout)?,
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

/// SQLite database for reservation storage.
pub struct StayDb {
    conn: Connection,
}

impl StayDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open (or create) the database at `path` and apply migrations.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open the database at `~/.config/staysync/staysync.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open_default() -> Result<Self, crate::error::CoreError> {
        let path = data_dir()?.join("staysync.db");
        Ok(Self::open(&path)?)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Run `f` inside a single immediate transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Self) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE TRANSACTION;")
            .map_err(DatabaseError::from)?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT;")
                    .map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK;") {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    // === Hotels ===

    /// Provision a hotel. Hotels are read-only to reconciliation.
    pub fn insert_hotel(&self, hotel: &Hotel) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO hotels (id, pms_hotel_id, name) VALUES (?1, ?2, ?3)",
            params![hotel.id, hotel.pms_hotel_id, hotel.name],
        )?;
        Ok(())
    }

    pub fn hotel_by_pms_id(&self, pms_hotel_id: &str) -> Result<Option<Hotel>, DatabaseError> {
        let hotel = self
            .conn
            .query_row(
                "SELECT id, pms_hotel_id, name FROM hotels WHERE pms_hotel_id = ?1",
                params![pms_hotel_id],
                row_to_hotel,
            )
            .optional()?;
        Ok(hotel)
    }

    pub fn list_hotels(&self) -> Result<Vec<Hotel>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, pms_hotel_id, name FROM hotels ORDER BY pms_hotel_id")?;
        let hotels = stmt
            .query_map([], row_to_hotel)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hotels)
    }

    // === Guests ===

    pub fn guest_by_phone(&self, phone: &str) -> Result<Option<Guest>, DatabaseError> {
        let guest = self
            .conn
            .query_row(
                &format!("SELECT {GUEST_COLUMNS} FROM guests WHERE phone = ?1"),
                params![phone],
                row_to_guest,
            )
            .optional()?;
        Ok(guest)
    }

    pub fn phone_exists(&self, phone: &str) -> Result<bool, DatabaseError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM guests WHERE phone = ?1)",
            params![phone],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a new guest. Fails with `Conflict` if the phone is taken.
    pub fn insert_guest(&self, guest: &Guest) -> Result<(), DatabaseError> {
        self.conn.execute(
            &format!("INSERT INTO guests ({GUEST_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                guest.id,
                guest.phone,
                guest.name,
                guest.language.map(|l| l.as_str()),
                guest.created_at.to_rfc3339(),
                guest.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_guests(&self) -> Result<Vec<Guest>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {GUEST_COLUMNS} FROM guests ORDER BY created_at, phone"))?;
        let guests = stmt
            .query_map([], row_to_guest)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(guests)
    }

    pub fn count_guests(&self) -> Result<u64, DatabaseError> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM guests", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Stays ===

    pub fn stay_by_reservation(
        &self,
        pms_hotel_id: &str,
        pms_reservation_id: &str,
    ) -> Result<Option<Stay>, DatabaseError> {
        let stay = self
            .conn
            .query_row(
                &format!(
                    "SELECT {STAY_COLUMNS} FROM stays
                     WHERE pms_hotel_id = ?1 AND pms_reservation_id = ?2"
                ),
                params![pms_hotel_id, pms_reservation_id],
                row_to_stay,
            )
            .optional()?;
        Ok(stay)
    }

    /// Insert a new stay. Fails with `Conflict` if the reservation exists.
    pub fn insert_stay(&self, stay: &Stay) -> Result<(), DatabaseError> {
        self.conn.execute(
            &format!(
                "INSERT INTO stays ({STAY_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                stay.id,
                stay.pms_hotel_id,
                stay.hotel_id,
                stay.guest_id,
                stay.pms_reservation_id,
                stay.pms_guest_id,
                stay.status.as_str(),
                format_date(stay.checkin),
                format_date(stay.checkout),
                stay.created_at.to_rfc3339(),
                stay.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Overwrite the mutable fields of an existing stay (matched by id).
    pub fn update_stay(&self, stay: &Stay) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE stays
             SET hotel_id = ?2, guest_id = ?3, pms_guest_id = ?4, status = ?5,
                 checkin = ?6, checkout = ?7, updated_at = ?8
             WHERE id = ?1",
            params![
                stay.id,
                stay.hotel_id,
                stay.guest_id,
                stay.pms_guest_id,
                stay.status.as_str(),
                format_date(stay.checkin),
                format_date(stay.checkout),
                stay.updated_at.to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::QueryFailed(format!(
                "stay {} does not exist",
                stay.id
            )));
        }
        Ok(())
    }

    pub fn list_stays(&self) -> Result<Vec<Stay>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STAY_COLUMNS} FROM stays ORDER BY checkin, pms_hotel_id, pms_reservation_id"
        ))?;
        let stays = stmt
            .query_map([], row_to_stay)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stays)
    }

    /// Stays whose check-in date equals `date`.
    pub fn stays_checking_in(&self, date: NaiveDate) -> Result<Vec<Stay>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STAY_COLUMNS} FROM stays WHERE checkin = ?1
             ORDER BY pms_hotel_id, pms_reservation_id"
        ))?;
        let stays = stmt
            .query_map(params![format_date(date)], row_to_stay)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(stays)
    }

    pub fn count_stays(&self) -> Result<u64, DatabaseError> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM stays", [], |row| row.get(0))?;
        Ok(count)
    }
}
