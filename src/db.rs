use crate::schema::check_ins;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::dsl::{count_star, sum};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use serde::Serialize;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, Copy)]
struct ConnectionCustomizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        configure_connection(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn establish_pool(database_url: &str, max_size: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionCustomizer))
        .build(manager)
        .context("Failed to create pool")
}

pub fn configure_connection(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute("PRAGMA busy_timeout = 2000;")?;
    conn.batch_execute("PRAGMA journal_mode = WAL;")?;
    conn.batch_execute("PRAGMA synchronous = NORMAL;")?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// Applies pending migrations and returns how many ran.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<usize> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {e}"))?;
    Ok(applied.len())
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = check_ins)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CheckInRow {
    pub id: i32,
    pub owner: String,
    pub created_at: i64,
    pub mood_score: i32,
    pub stress_score: i32,
    pub full_text: String,
    pub recommendations: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = check_ins)]
pub struct NewCheckIn<'a> {
    pub owner: &'a str,
    pub created_at: i64,
    pub mood_score: i32,
    pub stress_score: i32,
    pub full_text: &'a str,
    pub recommendations: String,
}

impl<'a> NewCheckIn<'a> {
    pub fn new(
        owner: &'a str,
        created_at: DateTime<Utc>,
        mood_score: u8,
        stress_score: u8,
        full_text: &'a str,
        recommendations: &[String],
    ) -> Result<Self> {
        Ok(Self {
            owner,
            created_at: created_at.timestamp_millis(),
            mood_score: mood_score.into(),
            stress_score: stress_score.into(),
            full_text,
            recommendations: serde_json::to_string(recommendations)?,
        })
    }
}

/// A stored check-in with its recommendations decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInRecord {
    pub id: i32,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub mood_score: i32,
    pub stress_score: i32,
    pub full_text: String,
    pub recommendations: Vec<String>,
}

impl TryFrom<CheckInRow> for CheckInRecord {
    type Error = anyhow::Error;

    fn try_from(row: CheckInRow) -> Result<Self> {
        let created_at = DateTime::from_timestamp_millis(row.created_at)
            .ok_or_else(|| anyhow!("Invalid timestamp {} on check-in {}", row.created_at, row.id))?;
        let recommendations = serde_json::from_str(&row.recommendations)
            .with_context(|| format!("Invalid recommendations on check-in {}", row.id))?;

        Ok(Self {
            id: row.id,
            owner: row.owner,
            created_at,
            mood_score: row.mood_score,
            stress_score: row.stress_score,
            full_text: row.full_text,
            recommendations,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CheckInStats {
    pub count: i64,
    pub average_mood: Option<f64>,
    pub average_stress: Option<f64>,
}

pub fn insert_check_in(conn: &mut SqliteConnection, new: &NewCheckIn) -> QueryResult<CheckInRow> {
    use crate::schema::check_ins::dsl::*;

    diesel::insert_into(check_ins)
        .values(new)
        .returning(CheckInRow::as_returning())
        .get_result(conn)
}

/// Newest first; rows sharing a timestamp come back in reverse insertion order.
pub fn get_check_ins_for_owner(
    conn: &mut SqliteConnection,
    owner_id: &str,
    limit: i64,
) -> QueryResult<Vec<CheckInRow>> {
    use crate::schema::check_ins::dsl::*;

    check_ins
        .filter(owner.eq(owner_id))
        .order((created_at.desc(), id.desc()))
        .limit(limit)
        .select(CheckInRow::as_select())
        .load(conn)
}

/// Count and average scores, across every owner when `owner_id` is `None`.
pub fn check_in_stats(
    conn: &mut SqliteConnection,
    owner_id: Option<&str>,
) -> QueryResult<CheckInStats> {
    use crate::schema::check_ins::dsl::*;

    let (total, mood_total, stress_total): (i64, Option<i64>, Option<i64>) = match owner_id {
        Some(owner_id) => check_ins
            .filter(owner.eq(owner_id))
            .select((count_star(), sum(mood_score), sum(stress_score)))
            .first(conn)?,
        None => check_ins
            .select((count_star(), sum(mood_score), sum(stress_score)))
            .first(conn)?,
    };

    let average = |sum_value: Option<i64>| {
        (total > 0).then(|| round_one_decimal(sum_value.unwrap_or(0) as f64 / total as f64))
    };

    Ok(CheckInStats {
        count: total,
        average_mood: average(mood_total),
        average_stress: average(stress_total),
    })
}

pub fn delete_check_ins_for_owner(
    conn: &mut SqliteConnection,
    owner_id: &str,
) -> QueryResult<usize> {
    use crate::schema::check_ins::dsl::*;

    diesel::delete(check_ins.filter(owner.eq(owner_id))).execute(conn)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
