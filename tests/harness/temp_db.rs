use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use valuator::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteValuationStore};
use valuator::domain::{OwnershipEdge, Participant};

/// Temporary SQLite database for integration tests, removed on drop.
pub struct TempDb {
    dir: TempDir,
    path: PathBuf,
    store: Arc<SqliteValuationStore>,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(format!("valuator-{name}.db"));
        let pool = create_pool(&path.to_string_lossy()).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");

        Self {
            dir,
            path,
            store: Arc::new(SqliteValuationStore::new(pool)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> Arc<SqliteValuationStore> {
        Arc::clone(&self.store)
    }

    /// Write participants and edges the way the surrounding system would:
    /// one external position per participant holding its bid and ask value,
    /// one instrument row per leader and one holding row per edge.
    pub fn seed(&self, participants: &[Participant], edges: &[OwnershipEdge]) {
        for p in participants {
            self.store
                .insert_participant(p.id, p.cash, p.provision_balance)
                .expect("insert participant");
            if !p.external_value_bid.is_zero() || !p.external_value_ask.is_zero() {
                self.store
                    .insert_external_holding(
                        p.id,
                        "ext",
                        rust_decimal::Decimal::ONE,
                        p.external_value_bid,
                        p.external_value_ask,
                    )
                    .expect("insert external holding");
            }
        }
        for p in participants {
            if let Some(instrument) = p.instrument {
                self.store
                    .insert_leader_instrument(instrument, p.id)
                    .expect("insert leader instrument");
            }
        }
        for e in edges {
            let instrument = participants
                .iter()
                .find(|p| p.id == e.leader())
                .and_then(|p| p.instrument)
                .expect("edge leader has an instrument");
            self.store
                .insert_leader_holding(e.follower(), instrument, e.shares())
                .expect("insert leader holding");
        }
    }
}
