//! Embedded PostgreSQL helpers for integration suites.
//!
//! A [`TestCluster`] is bootstrapped per suite context; databases are
//! created through `postgres` on the maintenance database and migrated with
//! the crate's embedded migrations, so tests never drift from the schema the
//! server applies.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use calendar_backend::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const BOOTSTRAP_ATTEMPTS: u32 = 3;
const BOOTSTRAP_RETRY_DELAY: Duration = Duration::from_millis(500);

fn scratch_dirs() -> std::io::Result<(PathBuf, PathBuf)> {
    let target = std::env::var_os("CARGO_TARGET_DIR").map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../target"),
        PathBuf::from,
    );
    let base = target
        .join("pg-embed")
        .join(format!("{}-{}", std::process::id(), Uuid::new_v4()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

fn looks_transient(reason: &str) -> bool {
    let reason = reason.to_lowercase();
    ["connection reset", "timed out", "timeout", "error decoding response body"]
        .iter()
        .any(|pattern| reason.contains(pattern))
}

/// Start an embedded cluster, pointing its directories under `target/` unless
/// `PG_RUNTIME_DIR` and `PG_DATA_DIR` are both set.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let _env = if std::env::var_os("PG_RUNTIME_DIR").is_some()
        && std::env::var_os("PG_DATA_DIR").is_some()
    {
        None
    } else {
        let (runtime_dir, data_dir) = scratch_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    };

    let mut attempt = 1;
    loop {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                let reason = format!("{err:?}");
                if attempt >= BOOTSTRAP_ATTEMPTS || !looks_transient(&reason) {
                    return Err(reason);
                }
                std::thread::sleep(BOOTSTRAP_RETRY_DELAY * attempt);
                attempt += 1;
            }
        }
    }
}

/// Create `name` on the cluster and apply every migration to it.
///
/// Returns the new database's URL.
pub fn migrated_database(
    cluster: &TestCluster,
    runtime: &Runtime,
    name: &str,
) -> Result<String, String> {
    let maintenance_url = cluster.connection().database_url("postgres");
    let mut client =
        Client::connect(&maintenance_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    // Separate statements: DROP DATABASE refuses to run in an implicit transaction.
    for statement in [
        format!("DROP DATABASE IF EXISTS \"{name}\""),
        format!("CREATE DATABASE \"{name}\""),
    ] {
        client
            .batch_execute(&statement)
            .map_err(|err| format_postgres_error(&err))?;
    }

    let url = cluster.connection().database_url(name);
    runtime
        .block_on(run_pending_migrations(&url))
        .map_err(|err| err.to_string())?;
    Ok(url)
}

/// Honour `SKIP_TEST_CLUSTER`; otherwise fail loudly so CI breakage shows.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    let skip = std::env::var("SKIP_TEST_CLUSTER")
        .is_ok_and(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"));
    if skip {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Render a `postgres` error with its SQLSTATE and message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => format!("postgres error {:?}: {}", db.code(), db.message()),
        None => error.to_string(),
    }
}
