use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use super::StoreError;
use crate::models::{Conference, Domain, Principal, PrincipalKind};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS conferences (
        id TEXT PRIMARY KEY,
        document JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS principals (
        id TEXT PRIMARY KEY,
        kind TEXT NOT NULL,
        name TEXT NOT NULL,
        email TEXT,
        groups TEXT[] NOT NULL DEFAULT '{}'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS domains (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        filters TEXT[] NOT NULL DEFAULT '{}'
    )
    "#,
];

#[derive(FromRow)]
struct PrincipalRow {
    id: String,
    kind: String,
    name: String,
    email: Option<String>,
    groups: Vec<String>,
}

impl From<PrincipalRow> for Principal {
    fn from(row: PrincipalRow) -> Self {
        Principal {
            id: row.id,
            kind: if row.kind == "group" {
                PrincipalKind::Group
            } else {
                PrincipalKind::User
            },
            name: row.name,
            email: row.email,
            groups: row.groups,
        }
    }
}

#[derive(FromRow)]
struct DomainRow {
    id: String,
    name: String,
    filters: Vec<String>,
}

/// PostgreSQL backend; conferences are kept as JSONB documents
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        Ok(PgStore { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PgStore { pool }
    }

    /// Create the tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn load_conference(&self, id: &str) -> Result<Option<Conference>, StoreError> {
        let row = sqlx::query_as::<_, (Json<Conference>,)>(
            "SELECT document FROM conferences WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(Json(conference),)| conference))
    }

    pub async fn save_conference(&self, conference: &Conference) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conferences (id, document, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()
            "#,
        )
        .bind(&conference.id)
        .bind(Json(conference))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn principal(&self, id: &str) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            "SELECT id, kind, name, email, groups FROM principals WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Principal::from))
    }

    pub async fn principals(&self) -> Result<Vec<Principal>, StoreError> {
        let rows = sqlx::query_as::<_, PrincipalRow>(
            "SELECT id, kind, name, email, groups FROM principals ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Principal::from).collect())
    }

    pub async fn domains(&self) -> Result<Vec<Domain>, StoreError> {
        let rows = sqlx::query_as::<_, DomainRow>("SELECT id, name, filters FROM domains ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Domain {
                id: row.id,
                name: row.name,
                filters: row.filters,
            })
            .collect())
    }
}
