//! Connector repository
//!
//! SQL access to `woo_backends`, `countries` and `woo_shipping_zones`.
//! Rows are plain `FromRow` structs; conversion to domain types happens in
//! the adapter.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Row of `woo_backends`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BackendRow {
    pub backend_id: Uuid,
    pub name: String,
    pub location: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub version: String,
    pub verify_ssl: bool,
}

/// Row of `countries`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CountryRow {
    pub country_id: Uuid,
    pub name: String,
    pub code: String,
    pub sync_data: bool,
    pub woo_backend_id: Option<Uuid>,
}

/// Row of `woo_shipping_zones`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BindingRow {
    pub binding_id: Uuid,
    pub odoo_id: Uuid,
    pub backend_id: Option<Uuid>,
    pub external_id: Option<i64>,
    pub sync_date: Option<DateTime<Utc>>,
}

const BACKEND_COLUMNS: &str =
    "backend_id, name, location, consumer_key, consumer_secret, version, verify_ssl";
const COUNTRY_COLUMNS: &str = "country_id, name, code, sync_data, woo_backend_id";
const BINDING_COLUMNS: &str = "binding_id, odoo_id, backend_id, external_id, sync_date";

/// Repository for the connector tables
#[derive(Debug, Clone)]
pub struct ConnectorRepository {
    pool: PgPool,
}

impl ConnectorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ------------------------------------------------------------------
    // Backends
    // ------------------------------------------------------------------

    pub async fn get_backend(&self, backend_id: Uuid) -> Result<BackendRow, DatabaseError> {
        sqlx::query_as::<_, BackendRow>(&format!(
            "SELECT {BACKEND_COLUMNS} FROM woo_backends WHERE backend_id = $1"
        ))
        .bind(backend_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Backend", backend_id))
    }

    pub async fn list_backends(&self) -> Result<Vec<BackendRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, BackendRow>(&format!(
            "SELECT {BACKEND_COLUMNS} FROM woo_backends ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_backend(&self, row: &BackendRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO woo_backends
                (backend_id, name, location, consumer_key, consumer_secret, version, verify_ssl)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (backend_id) DO UPDATE SET
                name = EXCLUDED.name,
                location = EXCLUDED.location,
                consumer_key = EXCLUDED.consumer_key,
                consumer_secret = EXCLUDED.consumer_secret,
                version = EXCLUDED.version,
                verify_ssl = EXCLUDED.verify_ssl,
                updated_at = now()
            "#,
        )
        .bind(row.backend_id)
        .bind(&row.name)
        .bind(&row.location)
        .bind(&row.consumer_key)
        .bind(&row.consumer_secret)
        .bind(&row.version)
        .bind(row.verify_ssl)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Countries
    // ------------------------------------------------------------------

    pub async fn get_country(&self, country_id: Uuid) -> Result<CountryRow, DatabaseError> {
        sqlx::query_as::<_, CountryRow>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE country_id = $1"
        ))
        .bind(country_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Country", country_id))
    }

    pub async fn upsert_country(&self, row: &CountryRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO countries (country_id, name, code, sync_data, woo_backend_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (country_id) DO UPDATE SET
                name = EXCLUDED.name,
                code = EXCLUDED.code,
                sync_data = EXCLUDED.sync_data,
                woo_backend_id = EXCLUDED.woo_backend_id,
                updated_at = now()
            "#,
        )
        .bind(row.country_id)
        .bind(&row.name)
        .bind(&row.code)
        .bind(row.sync_data)
        .bind(row.woo_backend_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_sync_settings(
        &self,
        country_id: Uuid,
        sync_data: bool,
        woo_backend_id: Option<Uuid>,
    ) -> Result<CountryRow, DatabaseError> {
        sqlx::query_as::<_, CountryRow>(&format!(
            r#"
            UPDATE countries
            SET sync_data = $2, woo_backend_id = $3, updated_at = now()
            WHERE country_id = $1
            RETURNING {COUNTRY_COLUMNS}
            "#
        ))
        .bind(country_id)
        .bind(sync_data)
        .bind(woo_backend_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Country", country_id))
    }

    pub async fn find_marked_for_sync(&self, backend_id: Uuid) -> Result<Vec<CountryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CountryRow>(&format!(
            r#"
            SELECT {COUNTRY_COLUMNS} FROM countries
            WHERE sync_data AND woo_backend_id = $1
            ORDER BY code
            "#
        ))
        .bind(backend_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Deletes a country; its bindings go with it (`ON DELETE CASCADE`)
    pub async fn delete_country(&self, country_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM countries WHERE country_id = $1")
            .bind(country_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Country", country_id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bindings
    // ------------------------------------------------------------------

    pub async fn get_binding(&self, binding_id: Uuid) -> Result<BindingRow, DatabaseError> {
        sqlx::query_as::<_, BindingRow>(&format!(
            "SELECT {BINDING_COLUMNS} FROM woo_shipping_zones WHERE binding_id = $1"
        ))
        .bind(binding_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Binding", binding_id))
    }

    pub async fn bindings_for_country(&self, country_id: Uuid) -> Result<Vec<BindingRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, BindingRow>(&format!(
            "SELECT {BINDING_COLUMNS} FROM woo_shipping_zones WHERE odoo_id = $1 ORDER BY created_at"
        ))
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_binding(
        &self,
        country_id: Uuid,
        backend_id: Uuid,
    ) -> Result<Option<BindingRow>, DatabaseError> {
        let row = sqlx::query_as::<_, BindingRow>(&format!(
            "SELECT {BINDING_COLUMNS} FROM woo_shipping_zones WHERE odoo_id = $1 AND backend_id = $2"
        ))
        .bind(country_id)
        .bind(backend_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_binding(&self, row: &BindingRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO woo_shipping_zones (binding_id, odoo_id, backend_id, external_id, sync_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.binding_id)
        .bind(row.odoo_id)
        .bind(row.backend_id)
        .bind(row.external_id)
        .bind(row.sync_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn record_export(
        &self,
        binding_id: Uuid,
        external_id: i64,
        sync_date: DateTime<Utc>,
    ) -> Result<BindingRow, DatabaseError> {
        sqlx::query_as::<_, BindingRow>(&format!(
            r#"
            UPDATE woo_shipping_zones
            SET external_id = $2, sync_date = $3, updated_at = now()
            WHERE binding_id = $1
            RETURNING {BINDING_COLUMNS}
            "#
        ))
        .bind(binding_id)
        .bind(external_id)
        .bind(sync_date)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Binding", binding_id))
    }

    /// Simple round trip used by health checks
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
