use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::graph::AuthorNetwork;

pub fn load_author_network(path: &Path) -> Result<AuthorNetwork> {
    tracing::info!(path = %path.display(), "loading author network");

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read author network from {}", path.display()))?;
    let network = AuthorNetwork::from_json(&raw)
        .with_context(|| format!("failed to build author network from {}", path.display()))?;

    tracing::info!(
        authors = network.author_count(),
        links = network.link_count(),
        "author network loaded"
    );
    Ok(network)
}
