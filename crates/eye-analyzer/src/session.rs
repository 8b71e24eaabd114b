use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap};
use eye_common::diagnosis::DiagnosticRecord;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "eye_session";

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub type SessionId = String;

/// Outcome of one successful analysis, handed from the analyze handler to the result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub record: DiagnosticRecord,
    /// Public URL of the stored image (`/static/<name>`).
    pub image_url: String,
}

#[derive(Debug)]
struct Entry {
    analysis: Analysis,
    stored_at: Instant,
}

/// In-memory, per-session slot holding the latest analysis.
///
/// A write replaces the whole slot; two analyses racing in one session resolve to
/// whichever finishes last.
#[derive(Clone)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<SessionId, Entry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn put(&self, session_id: &str, analysis: Analysis) {
        let mut entries = self.entries.lock().await;
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);
        entries.insert(
            session_id.to_string(),
            Entry {
                analysis,
                stored_at: Instant::now(),
            },
        );
    }

    pub async fn get(&self, session_id: &str) -> Option<Analysis> {
        let mut entries = self.entries.lock().await;
        let expired = entries
            .get(session_id)
            .map(|e| e.stored_at.elapsed() >= self.ttl)?;
        if expired {
            entries.remove(session_id);
            return None;
        }
        entries.get(session_id).map(|e| e.analysis.clone())
    }

    pub async fn active_sessions(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Read the session id from the request's `Cookie` header(s).
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && is_valid_session_id(value))
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value binding the browser to `session_id`.
pub fn session_cookie(session_id: &str, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

pub fn new_session_id() -> SessionId {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let counter = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();

    let mut h = Sha256::new();
    h.update(now.as_nanos().to_le_bytes());
    h.update(pid.to_le_bytes());
    h.update(counter.to_le_bytes());
    let digest = h.finalize();
    hex_lower(&digest[..16])
}

fn is_valid_session_id(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn hex_lower(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}
