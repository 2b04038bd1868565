// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Bookkeeping for one interactive session.  The conversation itself is
/// owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    /// Completed user turns.
    pub message_count: usize,
    pub work_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub active: usize,
}

/// In-memory session registry.  Nothing is persisted.
#[derive(Debug)]
pub struct SessionManager {
    sessions: HashMap<String, Session>,
    active: Option<String>,
    work_dir: PathBuf,
}

impl SessionManager {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self { sessions: HashMap::new(), active: None, work_dir: work_dir.into() }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Create a session and make it the active one.  Without a name it is
    /// called `会话 {n}`.
    pub fn create(&mut self, name: Option<&str>) -> &Session {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n.to_string(),
            None => format!("会话 {}", self.sessions.len() + 1),
        };
        info!(session = %id, name = %name, "session created");

        self.active = Some(id.clone());
        self.sessions.entry(id.clone()).or_insert(Session {
            id,
            name,
            created_at: now,
            last_active_at: now,
            message_count: 0,
            work_dir: self.work_dir.clone(),
        })
    }

    pub fn active(&self) -> Option<&Session> {
        self.active.as_deref().and_then(|id| self.sessions.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Switch to `id`.  Returns `false` (and changes nothing) when unknown.
    pub fn set_active(&mut self, id: &str) -> bool {
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        session.last_active_at = Utc::now();
        self.active = Some(id.to_string());
        debug!(session = %id, "session activated");
        true
    }

    /// Count one turn on `id`, or on the active session when `None`.
    pub fn increment_message_count(&mut self, id: Option<&str>) {
        let Some(id) = id.or(self.active.as_deref()) else {
            return;
        };
        if let Some(session) = self.sessions.get_mut(id) {
            session.message_count += 1;
            session.last_active_at = Utc::now();
        }
    }

    /// All sessions, most recently active first.
    pub fn list(&self) -> Vec<&Session> {
        let mut all: Vec<&Session> = self.sessions.values().collect();
        all.sort_by(|a, b| {
            b.last_active_at
                .cmp(&a.last_active_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.name.cmp(&b.name))
        });
        all
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let existed = self.sessions.remove(id).is_some();
        if existed {
            info!(session = %id, "session deleted");
            if self.active.as_deref() == Some(id) {
                self.active = None;
            }
        }
        existed
    }

    /// Drop every inactive session idle for longer than `timeout`.
    pub fn cleanup_expired(&mut self, timeout: Duration) -> usize {
        self.cleanup_expired_at(Utc::now(), timeout)
    }

    /// [`cleanup_expired`](Self::cleanup_expired) against an explicit clock.
    /// The active session is never removed.
    pub fn cleanup_expired_at(&mut self, now: DateTime<Utc>, timeout: Duration) -> usize {
        let active = self.active.clone();
        let before = self.sessions.len();
        self.sessions.retain(|id, s| {
            if active.as_deref() == Some(id.as_str()) {
                return true;
            }
            let expired = now
                .signed_duration_since(s.last_active_at)
                .to_std()
                .is_ok_and(|idle| idle > timeout);
            if expired {
                info!(session = %id, "expired session removed");
            }
            !expired
        });
        before - self.sessions.len()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats { total: self.sessions.len(), active: usize::from(self.active().is_some()) }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
