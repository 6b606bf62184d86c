use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Open the sqlite database (path from config.toml) and bootstrap the
/// schema. Both bags are stored as JSON text; `'null'` means "no bag
/// yet" and decodes to `Value::Null`.
pub async fn initialize_database() -> anyhow::Result<()> {
    let config = crate::shared::config::load_config()?;
    let db_file = crate::shared::config::get_database_path(&config)?;
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Normalize path separators and ensure proper URL form on Windows
    let normalized = db_file.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    let create_user_type = r#"
        CREATE TABLE IF NOT EXISTS a101_user_type (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            additional_config TEXT NOT NULL DEFAULT 'null',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#;
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        create_user_type.to_string(),
    ))
    .await?;

    let create_user = r#"
        CREATE TABLE IF NOT EXISTS a102_user (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            email TEXT NOT NULL DEFAULT '',
            user_type_id TEXT,
            additional_data TEXT NOT NULL DEFAULT 'null',
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
    "#;
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        create_user.to_string(),
    ))
    .await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("database already initialized"))?;

    tracing::info!("Database ready at {}", db_file.display());
    Ok(())
}

/// Connection accessor for repositories. Panics when called before
/// `initialize_database`, which main runs at startup.
pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN.get().expect("database not initialized")
}
