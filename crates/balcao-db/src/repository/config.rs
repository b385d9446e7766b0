//! # Payment Configuration Repository
//!
//! Loads the store's payment-method configuration as one immutable
//! snapshot. The checkout path loads it exactly once per commit attempt,
//! before the transaction opens, and never re-reads it mid-transaction -
//! a fee edit during a commit affects the next sale, not the in-flight one.

use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use balcao_core::{Adjustment, FeeResponsibility, MethodConfig, PaymentConfig, TenderKind};

/// Raw `payment_methods` row. `fee_value` is basis points for percent
/// fees, cents for fixed fees.
#[derive(Debug, FromRow)]
struct MethodRow {
    method: TenderKind,
    enabled: bool,
    fee_kind: String,
    fee_value: i64,
    fee_responsibility: FeeResponsibility,
}

impl MethodRow {
    fn into_config(self) -> DbResult<(TenderKind, MethodConfig)> {
        let fee = match self.fee_kind.as_str() {
            "percent" => {
                let bps = u32::try_from(self.fee_value).map_err(|_| {
                    DbError::Internal(format!(
                        "fee_value {} out of range for percent fee on method {}",
                        self.fee_value, self.method
                    ))
                })?;
                Adjustment::Percent(bps)
            }
            "fixed" => Adjustment::Fixed(self.fee_value),
            other => {
                return Err(DbError::Internal(format!(
                    "unknown fee_kind '{other}' for method {}",
                    self.method
                )))
            }
        };

        Ok((
            self.method,
            MethodConfig {
                enabled: self.enabled,
                fee,
                fee_responsibility: self.fee_responsibility,
            },
        ))
    }
}

/// Repository for the payment-method configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfigRepository {
    pool: SqlitePool,
}

impl PaymentConfigRepository {
    /// Creates a new PaymentConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentConfigRepository { pool }
    }

    /// Loads the full configuration snapshot.
    pub async fn load(&self) -> DbResult<PaymentConfig> {
        let rows = sqlx::query_as::<_, MethodRow>(
            "SELECT method, enabled, fee_kind, fee_value, fee_responsibility
             FROM payment_methods",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut config = PaymentConfig::allow_all();
        for row in rows {
            let (kind, method) = row.into_config()?;
            config.methods.insert(kind, method);
        }

        debug!(methods = config.methods.len(), "Loaded payment configuration");
        Ok(config)
    }

    /// Updates one method's configuration.
    pub async fn set_method(&self, kind: TenderKind, config: MethodConfig) -> DbResult<()> {
        let (fee_kind, fee_value) = match config.fee {
            Adjustment::Percent(bps) => ("percent", bps as i64),
            Adjustment::Fixed(cents) => ("fixed", cents),
        };

        let result = sqlx::query(
            "UPDATE payment_methods
             SET enabled = ?, fee_kind = ?, fee_value = ?, fee_responsibility = ?
             WHERE method = ?",
        )
        .bind(config.enabled)
        .bind(fee_kind)
        .bind(fee_value)
        .bind(config.fee_responsibility)
        .bind(kind)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PaymentMethod", kind.to_string()));
        }

        Ok(())
    }
}

// =============================================================================
// Integration Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_load_seeded_defaults() {
        let db = test_db().await;
        let config = db.payment_config().load().await.unwrap();

        // Every seeded method is enabled and fee-free out of the box
        for kind in [TenderKind::Cash, TenderKind::Pix, TenderKind::DeferredCredit] {
            let method = config.method(kind);
            assert!(method.enabled);
            assert_eq!(method.fee.amount_on(balcao_core::Money::from_cents(10000)).cents(), 0);
        }
    }

    #[tokio::test]
    async fn test_set_method_round_trips() {
        let db = test_db().await;
        db.payment_config()
            .set_method(
                TenderKind::Credit,
                MethodConfig {
                    enabled: true,
                    fee: Adjustment::Percent(300),
                    fee_responsibility: FeeResponsibility::Customer,
                },
            )
            .await
            .unwrap();

        let config = db.payment_config().load().await.unwrap();
        let credit = config.method(TenderKind::Credit);
        assert_eq!(credit.fee, Adjustment::Percent(300));
        assert_eq!(credit.fee_responsibility, FeeResponsibility::Customer);
    }

    #[tokio::test]
    async fn test_percent_fee_value_out_of_range_rejected() {
        // A row value outside u32 (negative, or above u32::MAX) must fail
        // loudly instead of being silently clamped into a wrong fee.
        let db = test_db().await;
        sqlx::query("UPDATE payment_methods SET fee_kind = 'percent', fee_value = -1 WHERE method = 'credit'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.payment_config().load().await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));

        sqlx::query("UPDATE payment_methods SET fee_value = 5000000000 WHERE method = 'credit'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.payment_config().load().await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
    }

    #[tokio::test]
    async fn test_unknown_fee_kind_rejected() {
        let db = test_db().await;
        sqlx::query("UPDATE payment_methods SET fee_kind = 'surcharge' WHERE method = 'debit'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.payment_config().load().await.unwrap_err();
        assert!(matches!(err, DbError::Internal(_)));
    }
}
