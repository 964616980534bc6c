use std::collections::HashMap;

use anyhow::{Result, bail};

use super::parse::{RawNetwork, parse_network_json};

#[derive(Clone, Debug)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub country: String,
    pub degree: usize,
}

/// Static co-authorship dataset. Degrees and adjacency are derived once when
/// the network is built and never change afterwards.
#[derive(Clone, Debug)]
pub struct AuthorNetwork {
    pub authors: Vec<AuthorRecord>,
    pub links: Vec<(usize, usize)>,
    pub coauthors: Vec<Vec<usize>>,
}

impl AuthorNetwork {
    pub fn from_json(raw: &str) -> Result<Self> {
        Self::from_raw(parse_network_json(raw)?)
    }

    fn from_raw(raw: RawNetwork) -> Result<Self> {
        let mut authors = Vec::with_capacity(raw.nodes.len());
        let mut index_by_id = HashMap::with_capacity(raw.nodes.len());

        for node in raw.nodes {
            let id = node.id.into_key();
            if index_by_id.insert(id.clone(), authors.len()).is_some() {
                bail!("duplicate author id {id:?}");
            }
            authors.push(AuthorRecord {
                id,
                name: node.name,
                country: node.country,
                degree: 0,
            });
        }

        let mut links = Vec::with_capacity(raw.links.len());
        for link in raw.links {
            let source_id = link.source.into_key();
            let target_id = link.target.into_key();
            let Some(&source) = index_by_id.get(&source_id) else {
                bail!("link references unknown source author {source_id:?}");
            };
            let Some(&target) = index_by_id.get(&target_id) else {
                bail!("link references unknown target author {target_id:?}");
            };
            links.push((source, target));
        }

        let mut coauthors = vec![Vec::new(); authors.len()];
        for &(source, target) in &links {
            authors[source].degree += 1;
            if source == target {
                continue;
            }
            authors[target].degree += 1;
            coauthors[source].push(target);
            coauthors[target].push(source);
        }
        for neighbors in &mut coauthors {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        Ok(Self {
            authors,
            links,
            coauthors,
        })
    }

    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn degree_range(&self) -> Option<(usize, usize)> {
        let min = self.authors.iter().map(|author| author.degree).min()?;
        let max = self.authors.iter().map(|author| author.degree).max()?;
        Some((min, max))
    }

    /// Countries ordered by descending author count. Equal counts keep the
    /// order in which the country first appears in the dataset.
    pub fn country_counts(&self) -> Vec<(String, usize)> {
        let mut position_by_country: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();

        for author in &self.authors {
            match position_by_country.get(author.country.as_str()) {
                Some(&position) => counts[position].1 += 1,
                None => {
                    position_by_country.insert(author.country.as_str(), counts.len());
                    counts.push((author.country.clone(), 1));
                }
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(raw: &str) -> AuthorNetwork {
        AuthorNetwork::from_json(raw).expect("valid network")
    }

    #[test]
    fn chain_of_three_has_expected_degrees() {
        let network = network(
            r#"{
                "nodes": [
                    {"id": "A", "name": "Alice", "country": "NL"},
                    {"id": "B", "name": "Bob", "country": "NL"},
                    {"id": "C", "name": "Carol", "country": "DE"}
                ],
                "links": [
                    {"source": "A", "target": "B"},
                    {"source": "B", "target": "C"}
                ]
            }"#,
        );

        let degrees = network
            .authors
            .iter()
            .map(|author| author.degree)
            .collect::<Vec<_>>();
        assert_eq!(degrees, vec![1, 2, 1]);
        assert_eq!(network.degree_range(), Some((1, 2)));
        assert_eq!(network.coauthors[1], vec![0, 2]);
    }

    #[test]
    fn degree_matches_incident_link_count() {
        let network = network(
            r#"{
                "nodes": [
                    {"id": 1, "name": "n1", "country": "A"},
                    {"id": 2, "name": "n2", "country": "A"},
                    {"id": 3, "name": "n3", "country": "B"},
                    {"id": 4, "name": "n4", "country": "C"}
                ],
                "links": [
                    {"source": 1, "target": 2},
                    {"source": 1, "target": 3},
                    {"source": 2, "target": 1},
                    {"source": 3, "target": 3}
                ]
            }"#,
        );

        for (index, author) in network.authors.iter().enumerate() {
            let incident = network
                .links
                .iter()
                .filter(|(source, target)| *source == index || *target == index)
                .count();
            assert_eq!(author.degree, incident, "author {}", author.id);
        }
        assert_eq!(network.authors[3].degree, 0);
        assert!(network.coauthors[3].is_empty());
        assert_eq!(network.coauthors[0], vec![1, 2]);
    }

    #[test]
    fn unknown_link_target_is_an_error() {
        let raw = parse_network_json(
            r#"{
                "nodes": [{"id": "A", "name": "Alice", "country": "NL"}],
                "links": [{"source": "A", "target": "Z"}]
            }"#,
        )
        .expect("valid json");

        let error = AuthorNetwork::from_raw(raw).expect_err("dangling link");
        assert!(error.to_string().contains("\"Z\""));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let raw = parse_network_json(
            r#"{
                "nodes": [
                    {"id": "A", "name": "Alice", "country": "NL"},
                    {"id": "A", "name": "Alias", "country": "BE"}
                ]
            }"#,
        )
        .expect("valid json");

        assert!(AuthorNetwork::from_raw(raw).is_err());
    }

    #[test]
    fn country_counts_break_ties_by_first_appearance() {
        let network = network(
            r#"{
                "nodes": [
                    {"id": "1", "name": "a", "country": "Peru"},
                    {"id": "2", "name": "b", "country": "Chile"},
                    {"id": "3", "name": "c", "country": "Chile"},
                    {"id": "4", "name": "d", "country": "Bolivia"},
                    {"id": "5", "name": "e", "country": "Peru"},
                    {"id": "6", "name": "f", "country": "Ecuador"}
                ]
            }"#,
        );

        assert_eq!(
            network.country_counts(),
            vec![
                ("Peru".to_string(), 2),
                ("Chile".to_string(), 2),
                ("Bolivia".to_string(), 1),
                ("Ecuador".to_string(), 1),
            ]
        );
    }

    #[test]
    fn empty_network_has_no_degree_range() {
        let network = network("{}");
        assert_eq!(network.author_count(), 0);
        assert_eq!(network.degree_range(), None);
    }
}
