//! Click decoding and per-session selection state.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// One decoded field of a click payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr<T> {
    /// Key missing or `null`.
    Absent,
    Present(T),
    /// Key present with a value of the wrong shape.
    Malformed,
}

/// Fields carried by a case marker besides its position and label.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAttrs {
    pub url: Attr<String>,
    pub district: Attr<String>,
    pub firm: Attr<String>,
}

/// A click on a case marker, as sent by the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    /// The marker label, i.e. the case name.
    pub text: Attr<String>,
    pub lat: Attr<f64>,
    pub lon: Attr<f64>,
    pub attrs: PointAttrs,
}

impl ClickEvent {
    /// Decodes `{case|text, lat, lon, url, district, firm}`. Never fails: a
    /// payload that is not an object decodes to an event with every field absent.
    pub fn from_json(payload: &Value) -> Self {
        let get = |key: &str| payload.get(key).filter(|v| !v.is_null());
        let text = match get("case") {
            Some(v) => string_attr(Some(v)),
            None => string_attr(get("text")),
        };
        ClickEvent {
            text,
            lat: number_attr(get("lat")),
            lon: number_attr(get("lon")),
            attrs: PointAttrs {
                url: link_attr(get("url")),
                district: string_attr(get("district")),
                firm: string_attr(get("firm")),
            },
        }
    }
}

fn string_attr(value: Option<&Value>) -> Attr<String> {
    match value {
        None => Attr::Absent,
        Some(Value::String(s)) => Attr::Present(s.clone()),
        Some(_) => Attr::Malformed,
    }
}

/// Only `http`/`https` links are kept; the page inserts them as live anchors.
fn link_attr(value: Option<&Value>) -> Attr<String> {
    match string_attr(value) {
        Attr::Present(url) => {
            let trimmed = url.trim();
            let scheme = trimmed.split_once(':').map(|(scheme, _)| scheme.to_ascii_lowercase());
            match scheme.as_deref() {
                _ if trimmed.is_empty() => Attr::Present(url),
                Some("http") | Some("https") => Attr::Present(url),
                _ => Attr::Malformed,
            }
        }
        other => other,
    }
}

fn number_attr(value: Option<&Value>) -> Attr<f64> {
    let parsed = match value {
        None => return Attr::Absent,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Attr::Present(v),
        _ => Attr::Malformed,
    }
}

/// What a session currently has selected on the map.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    Selected(ClickEvent),
}

impl SelectionState {
    /// The only transition. Valid from either state; there is no way back to `Empty`.
    pub fn on_map_click(&mut self, event: ClickEvent) {
        *self = SelectionState::Selected(event);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Shared by every request that does not identify itself.
    pub fn anonymous() -> Self {
        SessionId("anonymous".to_string())
    }

    /// Blank or oversized identifiers are treated as anonymous.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(id) if !id.is_empty() && id.len() <= 128 => SessionId(id.to_string()),
            _ => Self::anonymous(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub const MAX_SESSIONS: usize = 1024;

struct Session {
    state: SelectionState,
    touched: Instant,
}

/// One `SelectionState` per session, created on first click.
///
/// Holds at most `limit` sessions; a new session past the limit evicts the
/// one touched least recently.
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionId, Session>>,
    limit: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limit(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            limit: limit.max(1),
        }
    }

    /// Applies a click to the session and returns the resulting state.
    pub fn select(&self, id: &SessionId, event: ClickEvent) -> SelectionState {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if !sessions.contains_key(id) && sessions.len() >= self.limit {
            let stalest = sessions
                .iter()
                .min_by_key(|(_, session)| session.touched)
                .map(|(key, _)| key.clone());
            if let Some(key) = stalest {
                tracing::debug!(session = key.as_str(), "Evicting least recently used session");
                sessions.remove(&key);
            }
        }

        let session = sessions.entry(id.clone()).or_insert_with(|| Session {
            state: SelectionState::Empty,
            touched: now,
        });
        session.state.on_map_click(event);
        session.touched = now;
        session.state.clone()
    }

    pub fn get(&self, id: &SessionId) -> SelectionState {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(id)
            .map(|session| session.state.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
