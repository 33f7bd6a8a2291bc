// db.rs
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    chatmodels::Message,
    listingmodel::{Listing, Payment},
    reportmodel::Report,
    usermodel::{User, UserRole},
    verificationmodels::Verification,
};

pub mod chatdb;
pub mod listingdb;
pub mod reportdb;
pub mod verificationdb;

const USERS_FILE: &str = "users.json";
const LISTINGS_FILE: &str = "listings.json";
const MESSAGES_FILE: &str = "messages.json";
const REPORTS_FILE: &str = "reports.json";
const VERIFICATIONS_FILE: &str = "verifications.json";
const PAYMENTS_FILE: &str = "payments.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt data in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("An account with email {0} already exists")]
    EmailExists(String),
}

/// Every collection the application keeps. Users, verifications and
/// payments are keyed by id (verifications by owner id); the rest are
/// append-ordered lists.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Collections {
    pub users: HashMap<Uuid, User>,
    pub listings: Vec<Listing>,
    pub messages: Vec<Message>,
    pub reports: Vec<Report>,
    pub verifications: HashMap<Uuid, Verification>,
    pub payments: HashMap<Uuid, Payment>,
}

impl Collections {
    pub fn listing(&self, listing_id: Uuid) -> Option<&Listing> {
        self.listings.iter().find(|l| l.id == listing_id)
    }

    pub fn listing_mut(&mut self, listing_id: Uuid) -> Option<&mut Listing> {
        self.listings.iter_mut().find(|l| l.id == listing_id)
    }

    pub fn payment_for_listing(&self, listing_id: Uuid) -> Option<&Payment> {
        self.payments.values().find(|p| p.listing_id == listing_id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim().to_lowercase();
        self.users.values().find(|u| u.email == email)
    }
}

#[derive(Debug, Clone)]
pub struct DBClient {
    data_dir: PathBuf,
    state: Arc<RwLock<Collections>>,
}

impl DBClient {
    /// Loads every collection from `data_dir`. Missing files are treated as
    /// empty collections.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| StoreError::Io { path: data_dir.clone(), source })?;

        let collections = Collections {
            users: load(&data_dir, USERS_FILE).await?,
            listings: load(&data_dir, LISTINGS_FILE).await?,
            messages: load(&data_dir, MESSAGES_FILE).await?,
            reports: load(&data_dir, REPORTS_FILE).await?,
            verifications: load(&data_dir, VERIFICATIONS_FILE).await?,
            payments: load(&data_dir, PAYMENTS_FILE).await?,
        };

        tracing::info!(
            "Loaded store from {}: {} users, {} listings, {} payments",
            data_dir.display(),
            collections.users.len(),
            collections.listings.len(),
            collections.payments.len()
        );

        Ok(DBClient {
            data_dir,
            state: Arc::new(RwLock::new(collections)),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Runs `f` against a read-only view of the store.
    pub async fn read<R>(&self, f: impl FnOnce(&Collections) -> R) -> R {
        let guard = self.state.read().await;
        f(&guard)
    }

    /// Runs `f` against a scratch copy of the store. When `f` succeeds the
    /// copy replaces the live collections and every file is rewritten; when
    /// it fails nothing changes.
    pub async fn write<R, E>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.state.write().await;
        let mut scratch = guard.clone();
        let result = f(&mut scratch)?;
        self.persist(&scratch).await?;
        *guard = scratch;
        Ok(result)
    }

    /// Writes every collection to a `.tmp` sibling first and only renames
    /// them into place once all six are on disk, so a failed write leaves
    /// the previous files intact.
    async fn persist(&self, c: &Collections) -> Result<(), StoreError> {
        let staged = [
            (USERS_FILE, to_json(&self.data_dir, USERS_FILE, &c.users)?),
            (LISTINGS_FILE, to_json(&self.data_dir, LISTINGS_FILE, &c.listings)?),
            (MESSAGES_FILE, to_json(&self.data_dir, MESSAGES_FILE, &c.messages)?),
            (REPORTS_FILE, to_json(&self.data_dir, REPORTS_FILE, &c.reports)?),
            (VERIFICATIONS_FILE, to_json(&self.data_dir, VERIFICATIONS_FILE, &c.verifications)?),
            (PAYMENTS_FILE, to_json(&self.data_dir, PAYMENTS_FILE, &c.payments)?),
        ];

        for (file, raw) in &staged {
            let tmp = tmp_path(&self.data_dir, file);
            if let Err(source) = tokio::fs::write(&tmp, raw).await {
                self.discard_staged(&staged).await;
                return Err(StoreError::Io { path: tmp, source });
            }
        }

        for (index, (file, _)) in staged.iter().enumerate() {
            let path = self.data_dir.join(file);
            if let Err(source) = tokio::fs::rename(tmp_path(&self.data_dir, file), &path).await {
                tracing::error!(
                    "Store left partially written: {} of {} files replaced before {} failed",
                    index,
                    staged.len(),
                    path.display()
                );
                self.discard_staged(&staged[index..]).await;
                return Err(StoreError::Io { path, source });
            }
        }

        Ok(())
    }

    async fn discard_staged(&self, staged: &[(&str, Vec<u8>)]) {
        for (file, _) in staged {
            let _ = tokio::fs::remove_file(tmp_path(&self.data_dir, file)).await;
        }
    }
}

async fn load<T>(dir: &Path, file: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    let path = dir.join(file);
    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(source) => return Err(StoreError::Io { path, source }),
    };

    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(&raw).map_err(|source| StoreError::Json { path, source })
}

fn to_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: dir.join(file),
        source,
    })
}

fn tmp_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(format!("{}.tmp", file))
}

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Option<User>;

    async fn get_users(&self) -> Vec<User>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        phone: T,
        password: T,
        is_owner: bool,
        role: UserRole,
    ) -> Result<User, StoreError>;

    async fn get_user_count(&self) -> usize;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Option<User> {
        self.read(|c| {
            if let Some(user_id) = user_id {
                c.users.get(&user_id).cloned()
            } else if let Some(email) = email {
                c.user_by_email(email).cloned()
            } else {
                None
            }
        })
        .await
    }

    async fn get_users(&self) -> Vec<User> {
        self.read(|c| {
            let mut users: Vec<User> = c.users.values().cloned().collect();
            users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            users
        })
        .await
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        phone: T,
        password: T,
        is_owner: bool,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            email: email.into().trim().to_lowercase(),
            phone: phone.into().trim().to_string(),
            password: password.into(),
            role,
            is_owner,
            verification_id: None,
            listing_ids: Vec::new(),
            created_at: Utc::now(),
        };

        self.write(|c| {
            if c.user_by_email(&user.email).is_some() {
                return Err(StoreError::EmailExists(user.email.clone()));
            }
            c.users.insert(user.id, user.clone());
            Ok(())
        })
        .await?;

        Ok(user)
    }

    async fn get_user_count(&self) -> usize {
        self.read(|c| c.users.len()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::listingmodel::PaymentStatus, service::error::ServiceError};

    #[tokio::test]
    async fn test_open_empty_dir_yields_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let db = DBClient::open(dir.path()).await.unwrap();

        assert_eq!(db.get_user_count().await, 0);
        assert!(db.read(|c| c.listings.is_empty()).await);
    }

    #[tokio::test]
    async fn test_round_trip_reload_matches() {
        let dir = tempfile::tempdir().unwrap();
        let db = DBClient::open(dir.path()).await.unwrap();

        let user = db
            .save_user("Mary Banda", "Mary@Example.com", "+260971234567", "hash", true, UserRole::User)
            .await
            .unwrap();
        assert_eq!(user.email, "mary@example.com");

        db.write(|c| {
            let payment_id = Uuid::new_v4();
            c.payments.insert(
                payment_id,
                Payment {
                    id: payment_id,
                    listing_id: Uuid::new_v4(),
                    owner_id: user.id,
                    amount: 250.0,
                    reference: "UHOUSE_X_Y".to_string(),
                    status: PaymentStatus::Pending,
                    proof_image: None,
                    proof_submitted_at: None,
                    verified_at: None,
                    created_at: Utc::now(),
                },
            );
            Ok::<_, StoreError>(())
        })
        .await
        .unwrap();

        let before = db.read(|c| c.clone()).await;
        let reopened = DBClient::open(dir.path()).await.unwrap();
        let after = reopened.read(|c| c.clone()).await;

        assert_eq!(before, after);
        assert!(dir.path().join(USERS_FILE).exists());
        assert!(dir.path().join(REPORTS_FILE).exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let db = DBClient::open(dir.path()).await.unwrap();

        let result: Result<(), ServiceError> = db
            .write(|c| {
                c.listings.clear();
                c.users.clear();
                Err(ServiceError::Validation("refused".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert!(!dir.path().join(USERS_FILE).exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_email_unique() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(DBClient::open(dir.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..8 {
            let db = db.clone();
            let email = if i % 2 == 0 { "Chanda@Example.com" } else { "chanda@example.com" };
            handles.push(tokio::spawn(async move {
                db.save_user("Chanda", email, "+260971234567", "hash", false, UserRole::User)
                    .await
            }));
        }

        let mut saved = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => saved += 1,
                Err(StoreError::EmailExists(email)) => assert_eq!(email, "chanda@example.com"),
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(saved, 1);
        assert_eq!(db.get_user_count().await, 1);
        let reopened = DBClient::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get_user_count().await, 1);
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_previous_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = DBClient::open(dir.path()).await.unwrap();
        db.save_user("Mary Banda", "mary@example.com", "+260971234567", "hash", true, UserRole::User)
            .await
            .unwrap();
        let users_before = std::fs::read(dir.path().join(USERS_FILE)).unwrap();

        // a directory where the staging file should go makes that write fail
        std::fs::create_dir(dir.path().join(format!("{}.tmp", PAYMENTS_FILE))).unwrap();
        let result = db
            .save_user("John Phiri", "john@example.com", "+260971234568", "hash", false, UserRole::User)
            .await;

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(std::fs::read(dir.path().join(USERS_FILE)).unwrap(), users_before);
        assert!(!dir.path().join(format!("{}.tmp", USERS_FILE)).exists());
        assert_eq!(db.get_user_count().await, 1);

        let reopened = DBClient::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get_user_count().await, 1);
    }

    #[tokio::test]
    async fn test_missing_keys_default_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        let raw = format!(
            r#"{{"{id}": {{"id": "{id}", "name": "Old Record", "email": "old@example.com",
                "password": "hash", "createdAt": "2024-01-01T00:00:00Z"}}}}"#
        );
        std::fs::write(dir.path().join(USERS_FILE), raw).unwrap();

        let db = DBClient::open(dir.path()).await.unwrap();
        let user = db.get_user(Some(id), None).await.unwrap();

        assert!(!user.is_owner);
        assert_eq!(user.role, UserRole::User);
        assert!(user.listing_ids.is_empty());
        assert_eq!(user.phone, "");
    }
}
