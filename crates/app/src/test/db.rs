//! Per-test databases inside one shared `PostgreSQL` container.

use once_cell::sync::Lazy;
use sqlx::{Connection, PgConnection, PgPool};
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres as PostgresImage;
use tokio::sync::{OnceCell, mpsc};

const TEST_USER: &str = "dishpatch_test";
const TEST_PASSWORD: &str = "dishpatch_test_password";

/// Database names must be valid unquoted identifiers so they can be interpolated into DDL.
fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 63 {
        return Err("Database name must be 1-63 characters long".to_string());
    }

    let Some(first) = name.chars().next() else {
        return Err("Database name must not be empty".to_string());
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return Err("Database name must start with a letter or underscore".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Database name can only contain letters, digits and underscores".to_string());
    }

    Ok(())
}

async fn init_postgres_container() -> ContainerAsync<PostgresImage> {
    PostgresImage::default()
        .with_user(TEST_USER)
        .with_password(TEST_PASSWORD)
        .with_db_name("dishpatch_test")
        .with_env_var("POSTGRES_INITDB_ARGS", "--auth-host=trust")
        .start()
        .await
        .expect("Failed to start PostgreSQL container")
}

static POSTGRES_CONTAINER: Lazy<OnceCell<ContainerAsync<PostgresImage>>> = Lazy::new(OnceCell::new);

static CLEANUP_SENDER: Lazy<OnceCell<mpsc::UnboundedSender<String>>> = Lazy::new(OnceCell::new);

async fn init_cleanup_task() -> mpsc::UnboundedSender<String> {
    let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(db_name) = receiver.recv().await {
            if let Err(err) = drop_database(&db_name).await {
                eprintln!("Failed to cleanup database '{db_name}': {err}");
            }
        }
    });

    sender
}

async fn admin_url() -> Option<String> {
    let container = POSTGRES_CONTAINER.get()?;
    let port = container.get_host_port_ipv4(5432).await.ok()?;

    Some(database_url(port, "postgres"))
}

fn database_url(port: u16, db_name: &str) -> String {
    let host =
        std::env::var("TESTCONTAINERS_HOST_OVERRIDE").unwrap_or_else(|_| "localhost".to_string());

    format!("postgresql://{TEST_USER}:{TEST_PASSWORD}@{host}:{port}/{db_name}")
}

async fn drop_database(db_name: &str) -> Result<(), sqlx::Error> {
    if validate_database_name(db_name).is_err() {
        return Ok(());
    }

    if let Some(url) = admin_url().await {
        let mut conn = PgConnection::connect(&url).await?;

        sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
            .execute(&mut conn)
            .await?;

        conn.close().await?;
    }

    Ok(())
}

/// A uniquely named, fully migrated database, dropped again when the value goes out of scope.
#[derive(Debug)]
pub struct TestDb {
    pool: PgPool,
    name: String,
}

impl Drop for TestDb {
    fn drop(&mut self) {
        if let Some(sender) = CLEANUP_SENDER.get() {
            let _ = sender.send(self.name.clone());
        }
    }
}

impl TestDb {
    pub async fn new() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();

        let thread_id = std::thread::current().id();

        let name = format!("dishpatch_test_{nanos}_{thread_id:?}")
            .replace([':', ' ', '(', ')'], "")
            .to_lowercase();

        Self::with_name(&name).await
    }

    async fn with_name(db_name: &str) -> Self {
        CLEANUP_SENDER.get_or_init(init_cleanup_task).await;

        if let Err(error) = validate_database_name(db_name) {
            panic!("Invalid database name '{db_name}': {error}");
        }

        let container = POSTGRES_CONTAINER
            .get_or_init(init_postgres_container)
            .await;

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get container port");

        let mut conn = PgConnection::connect(&database_url(port, "postgres"))
            .await
            .expect("Failed to connect to postgres database");

        sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");

        conn.close()
            .await
            .expect("Failed to close admin connection");

        let pool = PgPool::connect(&database_url(port, db_name))
            .await
            .expect("Failed to create pool for database");

        sqlx::migrate!("../../migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations on database");

        Self {
            pool,
            name: db_name.to_string(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_identifier_names() {
        assert!(validate_database_name("valid_name").is_ok());
        assert!(validate_database_name("_underscore_start").is_ok());
        assert!(validate_database_name("dishpatch_test_123").is_ok());
    }

    #[test]
    fn rejects_empty_and_long_names() {
        assert!(validate_database_name("").is_err());
        assert!(validate_database_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn rejects_names_that_need_quoting() {
        assert!(validate_database_name("123invalid").is_err());
        assert!(validate_database_name("invalid-hyphen").is_err());
        assert!(validate_database_name("invalid space").is_err());
        assert!(validate_database_name("quote\"d").is_err());
    }

    #[tokio::test]
    async fn migrated_database_accepts_queries() {
        let test_db = TestDb::new().await;

        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(test_db.pool())
            .await
            .expect("Failed to query orders");

        assert_eq!(orders, 0);
    }
}
