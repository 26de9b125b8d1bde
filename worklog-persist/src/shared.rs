use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::PersistError;
use crate::error::Result;
use crate::export::ExportFormat;
use crate::repository::SessionRepository;
use crate::session::Session;
use crate::session::SessionPatch;

/// Cloneable handle that serializes every repository call behind one lock,
/// so a mutation never starts while another one is still saving.
#[derive(Debug, Clone)]
pub struct SharedSessionRepository {
    inner: Arc<Mutex<SessionRepository>>,
}

impl SharedSessionRepository {
    pub fn new(repository: SessionRepository) -> Self {
        Self {
            inner: Arc::new(Mutex::new(repository)),
        }
    }

    pub fn open(config: &StoreConfig) -> Result<Self> {
        Ok(Self::new(SessionRepository::open(config)?))
    }

    /// Exclusive access for multi-step work.
    pub fn lock(&self) -> Result<MutexGuard<'_, SessionRepository>> {
        self.inner.lock().map_err(|_| PersistError::LockPoisoned)
    }

    /// Copy of the current collection.
    pub fn snapshot(&self) -> Result<Vec<Session>> {
        Ok(self.lock()?.sessions().to_vec())
    }

    pub fn create(
        &self,
        project_name: &str,
        seconds: f64,
        start_date: DateTime<Utc>,
        note: &str,
    ) -> Result<Session> {
        Ok(self
            .lock()?
            .create(project_name, seconds, start_date, note))
    }

    pub fn update(&self, id: Uuid, patch: SessionPatch) -> Result<Option<Session>> {
        Ok(self.lock()?.update(id, patch))
    }

    pub fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.lock()?.delete(id))
    }

    pub fn clear_all(&self) -> Result<()> {
        self.lock()?.clear_all();
        Ok(())
    }

    pub fn export(&self, format: ExportFormat) -> Result<PathBuf> {
        self.lock()?.export(format)
    }

    pub fn import_file(&self, path: &Path, format: ExportFormat) -> Result<usize> {
        self.lock()?.import_file(path, format)
    }
}
