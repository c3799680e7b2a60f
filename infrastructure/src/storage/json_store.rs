//! JSON file session store.
//!
//! All sessions live in a single `sessions.json` under the data
//! directory, pretty-printed so the file stays hand-inspectable. A
//! process-wide mutex serializes read-modify-write cycles; the file is
//! small enough that rewriting it wholesale is fine.

use async_trait::async_trait;
use roundtable_application::{SessionStore, StoreError};
use roundtable_domain::Session;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::debug;

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

pub struct JsonSessionStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonSessionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join("sessions.json"),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<Vec<Session>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, sessions: &[Session]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(sessions)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Generate a session id: millisecond timestamp in base 36 plus a
    /// process-local counter, so ids created in the same millisecond
    /// still differ.
    fn generate_id() -> String {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) % 1296;
        format!("{}{:0>2}", to_base36(millis), to_base36(u64::from(counter)))
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn list(&self) -> Result<Vec<Session>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut sessions = self.read_all()?;
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn create(&self, title: &str) -> Result<Session, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let session = Session::new(Self::generate_id(), title);
        let mut sessions = self.read_all()?;
        sessions.push(session.clone());
        self.write_all(&sessions)?;
        debug!(id = %session.id, "created session");
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Session, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_all()?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, session: &Session) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut sessions = self.read_all()?;
        let slot = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or_else(|| StoreError::NotFound(session.id.clone()))?;
        *slot = session.clone();
        self.write_all(&sessions)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut sessions = self.read_all()?;
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.write_all(&sessions)
    }
}
