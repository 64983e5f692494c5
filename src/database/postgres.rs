use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{NewTenantDomain, Tenant, TenantDomain, TenantDomainChanges};
use super::store::TenantStore;

const TENANT_COLUMNS: &str = "id, name, slug, is_active, status, created_at, updated_at";

const DOMAIN_COLUMNS: &str = r#"
    id, tenant_id, domain, domain_type, is_primary,
    verification_status, verification_token, verification_requested_at, verified_at,
    ssl_status, ssl_expires_at, is_active, created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct TenantRow {
    id: i32,
    name: String,
    slug: String,
    is_active: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = DatabaseError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        Ok(Tenant {
            id: row.id,
            name: row.name,
            slug: row.slug,
            is_active: row.is_active,
            status: row.status.parse().map_err(DatabaseError::Decode)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
            domains: Vec::new(),
        })
    }
}

#[derive(Debug, FromRow)]
struct TenantDomainRow {
    id: i32,
    tenant_id: i32,
    domain: String,
    domain_type: String,
    is_primary: bool,
    verification_status: String,
    verification_token: Option<String>,
    verification_requested_at: Option<DateTime<Utc>>,
    verified_at: Option<DateTime<Utc>>,
    ssl_status: String,
    ssl_expires_at: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenantDomainRow> for TenantDomain {
    type Error = DatabaseError;

    fn try_from(row: TenantDomainRow) -> Result<Self, Self::Error> {
        Ok(TenantDomain {
            id: row.id,
            tenant_id: row.tenant_id,
            domain: row.domain,
            domain_type: row.domain_type.parse().map_err(DatabaseError::Decode)?,
            is_primary: row.is_primary,
            verification_status: row.verification_status.parse().map_err(DatabaseError::Decode)?,
            verification_token: row.verification_token,
            verification_requested_at: row.verification_requested_at,
            verified_at: row.verified_at,
            ssl_status: row.ssl_status.parse().map_err(DatabaseError::Decode)?,
            ssl_expires_at: row.ssl_expires_at,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed [`TenantStore`]
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the tenant row so primary changes for one tenant run one at a time
    async fn lock_tenant(tx: &mut Transaction<'_, Postgres>, tenant_id: i32) -> Result<(), DatabaseError> {
        sqlx::query("SELECT id FROM tenants WHERE id = $1 FOR UPDATE")
            .bind(tenant_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Clear `is_primary` on the tenant's domains other than `keep_id`.
    /// Must run before the new primary is written.
    async fn demote_primaries(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: i32,
        keep_id: Option<i32>,
    ) -> Result<(), DatabaseError> {
        Self::lock_tenant(tx, tenant_id).await?;
        sqlx::query(
            "UPDATE tenant_domains SET is_primary = FALSE, updated_at = NOW() \
             WHERE tenant_id = $1 AND ($2::INTEGER IS NULL OR id <> $2) AND is_primary",
        )
        .bind(tenant_id)
        .bind(keep_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn map_unique(err: sqlx::Error, domain: &str) -> DatabaseError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            DatabaseError::UniqueViolation(domain.to_string())
        }
        _ => DatabaseError::Sqlx(err),
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find_tenant_by_id(&self, id: i32, active_only: bool) -> Result<Option<Tenant>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tenants WHERE id = $1 AND ($2 = FALSE OR is_active)",
            TENANT_COLUMNS
        );
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(id)
            .bind(active_only)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tenant::try_from).transpose()
    }

    async fn find_tenant_by_slug(&self, slug: &str) -> Result<Option<Tenant>, DatabaseError> {
        let sql = format!("SELECT {} FROM tenants WHERE slug = $1", TENANT_COLUMNS);
        let row = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Tenant::try_from).transpose()
    }

    async fn find_tenant_domain_by_domain(&self, domain: &str) -> Result<Option<TenantDomain>, DatabaseError> {
        let sql = format!("SELECT {} FROM tenant_domains WHERE domain = $1", DOMAIN_COLUMNS);
        let row = sqlx::query_as::<_, TenantDomainRow>(&sql)
            .bind(domain)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TenantDomain::try_from).transpose()
    }

    async fn list_tenant_domains(&self, tenant_id: i32) -> Result<Vec<TenantDomain>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM tenant_domains WHERE tenant_id = $1 ORDER BY is_primary DESC, id",
            DOMAIN_COLUMNS
        );
        let rows = sqlx::query_as::<_, TenantDomainRow>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TenantDomain::try_from).collect()
    }

    async fn create_tenant_domain(&self, input: NewTenantDomain) -> Result<TenantDomain, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if input.is_primary {
            Self::demote_primaries(&mut tx, input.tenant_id, None).await?;
        }

        let sql = format!(
            r#"
            INSERT INTO tenant_domains
                (tenant_id, domain, domain_type, is_primary, verification_status, verification_token, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DOMAIN_COLUMNS
        );
        let row = sqlx::query_as::<_, TenantDomainRow>(&sql)
            .bind(input.tenant_id)
            .bind(&input.domain)
            .bind(input.domain_type.as_str())
            .bind(input.is_primary)
            .bind(input.verification_status.as_str())
            .bind(&input.verification_token)
            .bind(input.is_active)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique(e, &input.domain))?;

        tx.commit().await?;
        TenantDomain::try_from(row)
    }

    async fn update_tenant_domain(
        &self,
        id: i32,
        changes: TenantDomainChanges,
    ) -> Result<TenantDomain, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        if changes.is_primary == Some(true) {
            let tenant_id: i32 = sqlx::query_scalar("SELECT tenant_id FROM tenant_domains WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("tenant domain {}", id)))?;
            Self::demote_primaries(&mut tx, tenant_id, Some(id)).await?;
        }

        let sql = format!(
            r#"
            UPDATE tenant_domains SET
                is_primary                = COALESCE($2, is_primary),
                is_active                 = COALESCE($3, is_active),
                verification_status       = COALESCE($4, verification_status),
                verification_token        = COALESCE($5, verification_token),
                verification_requested_at = COALESCE($6, verification_requested_at),
                verified_at               = COALESCE($7, verified_at),
                ssl_status                = COALESCE($8, ssl_status),
                ssl_expires_at            = COALESCE($9, ssl_expires_at),
                updated_at                = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            DOMAIN_COLUMNS
        );
        let row = sqlx::query_as::<_, TenantDomainRow>(&sql)
            .bind(id)
            .bind(changes.is_primary)
            .bind(changes.is_active)
            .bind(changes.verification_status.map(|s| s.as_str()))
            .bind(&changes.verification_token)
            .bind(changes.verification_requested_at)
            .bind(changes.verified_at)
            .bind(changes.ssl_status.map(|s| s.as_str()))
            .bind(changes.ssl_expires_at)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("tenant domain {}", id)))?;

        tx.commit().await?;
        TenantDomain::try_from(row)
    }

    async fn delete_tenant_domain(&self, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM tenant_domains WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("tenant domain {}", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
