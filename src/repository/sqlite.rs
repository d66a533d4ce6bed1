use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::model::repository::{Repository, RepositoryTarget, RepositoryType};
use crate::repository::error::StoreError;
use crate::repository::store::{RepositoryStore, default_repositories, repository_id};

/// Schema version written once the default repositories are seeded
const SCHEMA_VERSION: i32 = 1;

/// Repository store persisted in SQLite, one row per (target, repository)
pub struct SqliteRepositoryStore {
    conn: Mutex<Connection>,
}

impl SqliteRepositoryStore {
    /// Opens (or creates) the store at `db_path`. A fresh database is seeded
    /// with the default repositories, using `local_repository` for LOCAL ones.
    pub fn open(db_path: &Path, local_repository: &Path) -> Result<Self, StoreError> {
        info!("Opening repository store at {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema(local_repository)?;

        Ok(store)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self, local_repository: &Path) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS repositories (
                target TEXT NOT NULL,
                id TEXT NOT NULL,
                position INTEGER NOT NULL,
                json TEXT NOT NULL,
                PRIMARY KEY(target, id)
            )
            "#,
            [],
        )?;

        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        if current_version < SCHEMA_VERSION {
            for (target, repositories) in default_repositories(local_repository) {
                for repository in repositories {
                    Self::upsert(&conn, &repository, target)?;
                }
            }
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            info!("Seeded default repositories");
        }

        Ok(())
    }

    fn upsert(
        conn: &Connection,
        repository: &Repository,
        target: RepositoryTarget,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(repository)?;
        conn.execute(
            r#"
            INSERT INTO repositories (target, id, position, json)
            VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM repositories WHERE target = ?1),
                ?3
            )
            ON CONFLICT(target, id) DO UPDATE SET json = excluded.json
            "#,
            (
                target.id(),
                repository_id(target, &repository.name),
                json,
            ),
        )?;
        Ok(())
    }
}

impl RepositoryStore for SqliteRepositoryStore {
    fn get_repositories(&self, target: RepositoryTarget) -> Result<Vec<Repository>, StoreError> {
        let conn = self.lock_conn()?;
        let mut stmt =
            conn.prepare("SELECT json FROM repositories WHERE target = ?1 ORDER BY position")?;

        let rows = stmt
            .query_map([target.id()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let mut repositories = Vec::with_capacity(rows.len());
        for json in rows {
            let repository: Repository = serde_json::from_str(&json)?;
            if repository.active {
                repositories.push(repository);
            }
        }
        Ok(repositories)
    }

    fn get_repository(
        &self,
        name: &str,
        target: RepositoryTarget,
    ) -> Result<Option<Repository>, StoreError> {
        let conn = self.lock_conn()?;
        let json: Option<String> = conn
            .query_row(
                "SELECT json FROM repositories WHERE target = ?1 AND id = ?2",
                (target.id(), repository_id(target, name)),
                |row| row.get(0),
            )
            .optional()?;

        json.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(StoreError::from)
    }

    fn add_repository(
        &self,
        repository: Repository,
        target: RepositoryTarget,
    ) -> Result<(), StoreError> {
        if repository.repository_type == RepositoryType::Local {
            let path = Path::new(&repository.url);
            if !path.exists() {
                std::fs::create_dir_all(path).map_err(|source| StoreError::Io {
                    path: repository.url.clone(),
                    source,
                })?;
                debug!("Created local repository directory {:?}", path);
            }
        }

        let conn = self.lock_conn()?;
        Self::upsert(&conn, &repository, target)?;
        info!("Saved repository {} for {}", repository.name, target);
        Ok(())
    }

    fn remove_repository(&self, name: &str, target: RepositoryTarget) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        let removed = conn.execute(
            "DELETE FROM repositories WHERE target = ?1 AND id = ?2",
            (target.id(), repository_id(target, name)),
        )?;
        if removed > 0 {
            info!("Removed repository {} from {}", name, target);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(temp_dir: &TempDir) -> SqliteRepositoryStore {
        SqliteRepositoryStore::open(
            &temp_dir.path().join("sdk").join("repositories.db"),
            &temp_dir.path().join("m2"),
        )
        .unwrap()
    }

    #[test]
    fn fresh_store_is_seeded_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        let search = store.get_repositories(RepositoryTarget::Search).unwrap();
        let names: Vec<&str> = search.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["local", "cuba-nexus", "jmix-nexus"]);
        assert_eq!(store.get_repositories(RepositoryTarget::Source).unwrap().len(), 4);
        assert!(store.get_repositories(RepositoryTarget::Target).unwrap().is_empty());
    }

    #[test]
    fn reopening_does_not_reseed_removed_defaults() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = open_store(&temp_dir);
            store
                .remove_repository("cuba-nexus", RepositoryTarget::Search)
                .unwrap();
        }

        let store = open_store(&temp_dir);

        assert_eq!(
            store
                .get_repository("cuba-nexus", RepositoryTarget::Search)
                .unwrap(),
            None
        );
    }

    #[test]
    fn add_upserts_by_name_and_keeps_position() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store
            .add_repository(
                Repository::new("Local", RepositoryType::Nexus3, "https://replaced"),
                RepositoryTarget::Search,
            )
            .unwrap();

        let search = store.get_repositories(RepositoryTarget::Search).unwrap();
        assert_eq!(search.len(), 3);
        assert_eq!(search[0].url, "https://replaced");
    }

    #[test]
    fn add_local_repository_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        let target_dir = temp_dir.path().join("published");

        store
            .add_repository(
                Repository::new(
                    "published",
                    RepositoryType::Local,
                    &target_dir.display().to_string(),
                ),
                RepositoryTarget::Target,
            )
            .unwrap();

        assert!(target_dir.is_dir());
        assert_eq!(store.get_repositories(RepositoryTarget::Target).unwrap().len(), 1);
    }

    #[test]
    fn inactive_repository_is_stored_but_not_listed() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        store
            .add_repository(
                Repository::new("mirror", RepositoryType::Nexus2, "https://mirror").inactive(),
                RepositoryTarget::Source,
            )
            .unwrap();

        assert_eq!(store.get_repositories(RepositoryTarget::Source).unwrap().len(), 4);
        assert!(!store
            .get_repository("MIRROR", RepositoryTarget::Source)
            .unwrap()
            .unwrap()
            .active);
    }
}
