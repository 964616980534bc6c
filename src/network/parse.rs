use anyhow::{Context, Result};
use serde::Deserialize;

/// Node ids show up both as JSON strings and as bare integers.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    pub(super) fn into_key(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawAuthor {
    pub(super) id: RawId,
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) country: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct RawLink {
    pub(super) source: RawId,
    pub(super) target: RawId,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawNetwork {
    #[serde(default)]
    pub(super) nodes: Vec<RawAuthor>,
    #[serde(default)]
    pub(super) links: Vec<RawLink>,
}

pub(super) fn parse_network_json(raw: &str) -> Result<RawNetwork> {
    serde_json::from_str(raw).context("invalid author network JSON")
}
