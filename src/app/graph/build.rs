use crate::network::AuthorNetwork;

use super::super::encoding::VisualEncoding;
use super::super::physics::{ForceParams, ForceSimulation};
use super::super::{RenderGraph, ViewScratch};

impl RenderGraph {
    /// Maps every author through the visual encoding and seeds a fresh
    /// simulation with the resulting radii and the resolved links.
    pub(in crate::app) fn build(
        network: &AuthorNetwork,
        encoding: &VisualEncoding,
        params: ForceParams,
    ) -> Self {
        let radii = network
            .authors
            .iter()
            .map(|author| encoding.node_radius(author))
            .collect::<Vec<_>>();
        let colors = network
            .authors
            .iter()
            .map(|author| encoding.node_color(author))
            .collect::<Vec<_>>();

        let simulation = ForceSimulation::new(&radii, &network.links, params);
        tracing::debug!(
            bodies = simulation.len(),
            links = network.link_count(),
            "force simulation initialized"
        );

        Self {
            simulation,
            radii,
            colors,
            view_scratch: ViewScratch::default(),
        }
    }
}
