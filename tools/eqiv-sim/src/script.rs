//! Session scripts: a JSON array of steps replayed against a board.
//!
//! ```json
//! [
//!   {"action": "connect"},
//!   {"action": "create", "category": "cleaning", "title": "Deep clean",
//!    "description": "2 rooms", "budget": 50, "location": "NYC"},
//!   {"action": "bid", "request": 0, "amount": 40, "message": "I can do it"},
//!   {"action": "list", "category": "cleaning"}
//! ]
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use eqiv_common::media::MediaItem;
use eqiv_common::request::RequestDraft;

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSpec {
    pub mime: String,
    pub locator: String,
}

impl From<&MediaSpec> for MediaItem {
    fn from(spec: &MediaSpec) -> Self {
        MediaItem::from_mime(&spec.mime, spec.locator.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    Connect,
    SwitchNetwork {
        chain_id: u64,
    },
    Create {
        #[serde(default)]
        category: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        description: String,
        /// Number or string; passed through as form input.
        #[serde(default)]
        budget: Value,
        #[serde(default)]
        location: String,
        #[serde(default)]
        media: Vec<MediaSpec>,
    },
    Bid {
        /// Position in the ledger (0 = first request created).
        #[serde(default)]
        request: Option<usize>,
        /// Explicit request id; wins over `request`.
        #[serde(default)]
        id: Option<u64>,
        amount: Value,
        #[serde(default)]
        message: Option<String>,
    },
    List {
        #[serde(default)]
        category: Option<String>,
    },
    Detail {
        request: usize,
    },
}

impl Step {
    pub fn draft(&self) -> Option<RequestDraft> {
        match self {
            Step::Create {
                category,
                title,
                description,
                budget,
                location,
                ..
            } => Some(RequestDraft {
                category: category.clone(),
                title: title.clone(),
                description: description.clone(),
                budget: raw_input(budget),
                location: location.clone(),
            }),
            _ => None,
        }
    }
}

/// Render a JSON scalar the way a form field would hold it.
pub fn raw_input(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing script {}", path.display()))
}

pub fn parse(text: &str) -> anyhow::Result<Vec<Step>> {
    Ok(serde_json::from_str(text)?)
}

/// Built-in session: a create refused before connecting, then the happy path.
pub fn demo() -> Vec<Step> {
    let clean = || Step::Create {
        category: "cleaning".into(),
        title: "Deep clean".into(),
        description: "2 rooms".into(),
        budget: Value::from(50),
        location: "NYC".into(),
        media: Vec::new(),
    };
    vec![
        clean(),
        Step::Connect,
        clean(),
        Step::Create {
            category: "home-repair".into(),
            title: "Fix porch steps".into(),
            description: "Two loose boards".into(),
            budget: Value::from(120.5),
            location: "Brooklyn".into(),
            media: vec![MediaSpec {
                mime: "image/jpeg".into(),
                locator: "blob:porch.jpg".into(),
            }],
        },
        Step::Bid {
            request: Some(0),
            id: None,
            amount: Value::from(40),
            message: Some("I can do it".into()),
        },
        Step::Bid {
            request: Some(1),
            id: None,
            amount: Value::from(0),
            message: None,
        },
        Step::List {
            category: Some("cleaning".into()),
        },
        Step::Detail { request: 0 },
    ]
}
