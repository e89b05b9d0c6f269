//! Snapshot store: backup-and-replace persistence for association records
//!
//! The live `associations` table is replaced wholesale every refresh cycle.
//! A refresh runs inside one SQLite transaction: back up the live table, clear
//! it, accumulate upserts, commit. Readers either see the previous complete
//! snapshot or the new one, never a half-written table, and a refresh that
//! dies before commit rolls back to the prior state. `associations_backup`
//! always holds exactly the pre-refresh snapshot, kept for manual recovery.

use crate::model::AssociationRecord;
use crate::Result;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Handle on the shared snapshot table
#[derive(Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a refresh cycle: drop the previous backup, copy the live table
    /// into the backup, and clear the live table, all inside one transaction
    /// that stays open until [`RefreshTransaction::commit`].
    pub async fn begin_refresh(&self) -> Result<RefreshTransaction> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DROP TABLE IF EXISTS associations_backup")
            .execute(&mut *tx)
            .await?;
        sqlx::query("CREATE TABLE associations_backup AS SELECT * FROM associations")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM associations")
            .execute(&mut *tx)
            .await?;

        tracing::debug!("Refresh transaction opened; live table backed up and cleared");

        Ok(RefreshTransaction { tx })
    }
}

/// One in-flight refresh cycle
///
/// Dropping this without calling [`commit`](Self::commit) rolls the database
/// back to the pre-refresh snapshot.
pub struct RefreshTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl RefreshTransaction {
    /// Insert a record keyed by IP, replacing any record already written for
    /// the same IP in this cycle. Duplicates are replaced, never rejected.
    pub async fn upsert(&mut self, record: &AssociationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO associations (
                ip, mac, name, ap_name, age, essid_bssid_phy,
                forward_mode, profile, roaming, role, connection_type, user_type
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ip) DO UPDATE SET
                mac = excluded.mac,
                name = excluded.name,
                ap_name = excluded.ap_name,
                age = excluded.age,
                essid_bssid_phy = excluded.essid_bssid_phy,
                forward_mode = excluded.forward_mode,
                profile = excluded.profile,
                roaming = excluded.roaming,
                role = excluded.role,
                connection_type = excluded.connection_type,
                user_type = excluded.user_type
            "#,
        )
        .bind(&record.ip)
        .bind(&record.mac)
        .bind(&record.name)
        .bind(&record.ap_name)
        .bind(&record.age)
        .bind(&record.essid_bssid_phy)
        .bind(&record.forward_mode)
        .bind(&record.profile)
        .bind(&record.roaming)
        .bind(&record.role)
        .bind(&record.connection_type)
        .bind(&record.user_type)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    /// Make the backup and every upsert since `begin_refresh` durable
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
