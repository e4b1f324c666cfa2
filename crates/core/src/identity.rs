//! Subject identity used to name per-participant staging directories.

use std::path::PathBuf;

/// Anything that can name a participant's staging directory.
pub trait SubjectIdentity {
    /// File-name prefix for this subject, e.g. `sub-01_ses-02`.
    fn prefix(&self) -> String;
}

impl SubjectIdentity for str {
    fn prefix(&self) -> String {
        self.to_string()
    }
}

impl SubjectIdentity for String {
    fn prefix(&self) -> String {
        self.clone()
    }
}

/// A BIDS participant, optionally scoped to one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    name: String,
    session: Option<String>,
}

impl Participant {
    /// Build a participant, adding the `sub-` and `ses-` entity labels
    /// when they are missing. An empty session is treated as no session.
    pub fn new(name: &str, session: Option<&str>) -> Self {
        Self {
            name: with_label("sub-", name),
            session: session
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| with_label("ses-", s)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// Relative BIDS directory: `sub-X` or `sub-X/ses-Y`.
    pub fn directory(&self) -> PathBuf {
        let mut dir = PathBuf::from(&self.name);
        if let Some(session) = &self.session {
            dir.push(session);
        }
        dir
    }
}

impl SubjectIdentity for Participant {
    fn prefix(&self) -> String {
        match &self.session {
            Some(session) => format!("{}_{}", self.name, session),
            None => self.name.clone(),
        }
    }
}

fn with_label(label: &str, value: &str) -> String {
    let value = value.trim();
    if value.starts_with(label) {
        value.to_string()
    } else {
        format!("{label}{value}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
