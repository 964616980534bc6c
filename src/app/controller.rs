use eframe::egui::{Pos2, Vec2};

use crate::network::AuthorNetwork;

use super::physics::{ForceParameter, ForceSimulation};

pub(in crate::app) const DIMMED_OPACITY: f32 = 0.2;

/// Everything the canvas and the control panel can ask of the graph. Events
/// are applied one at a time on the UI thread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum GraphEvent {
    DragStart { node: usize },
    DragMove { node: usize, world: Vec2 },
    DragEnd { node: usize },
    HoverEnter { node: usize },
    HoverLeave,
    NodeClicked { node: usize, anchor: Pos2 },
    BackgroundClicked,
    SelectAuthor { node: usize },
    ParameterChanged { parameter: ForceParameter, value: f32 },
    Reheat,
}

impl GraphEvent {
    /// A primary click anywhere in the window produces exactly one event. A
    /// node hit on the canvas opens its popup; empty canvas, the side panels
    /// and the top bar all count as background.
    pub(in crate::app) fn for_click(
        clicked: bool,
        canvas_hit: Option<(usize, Pos2)>,
    ) -> Option<Self> {
        if !clicked {
            return None;
        }
        Some(match canvas_hit {
            Some((node, anchor)) => Self::NodeClicked { node, anchor },
            None => Self::BackgroundClicked,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Tooltip {
    pub(in crate::app) node: usize,
    pub(in crate::app) anchor: Pos2,
}

impl Tooltip {
    pub(in crate::app) fn lines(&self, network: &AuthorNetwork) -> Option<(String, String)> {
        let author = network.authors.get(self.node)?;
        Some((
            format!("Author: {}", author.name),
            format!("Country: {}", author.country),
        ))
    }
}

#[derive(Debug, Default)]
pub(in crate::app) struct InteractionState {
    hovered: Option<usize>,
    tooltip: Option<Tooltip>,
    selected: Option<usize>,
    active_drags: Vec<usize>,
}

impl InteractionState {
    pub(in crate::app) fn dispatch(
        &mut self,
        event: GraphEvent,
        simulation: &mut ForceSimulation,
        network: &AuthorNetwork,
    ) {
        let in_range = |node: usize| node < network.author_count();

        match event {
            GraphEvent::DragStart { node } if in_range(node) => {
                if self.active_drags.is_empty() {
                    simulation.hold_active();
                }
                if !self.active_drags.contains(&node) {
                    self.active_drags.push(node);
                }
                if let Some(position) = simulation.position(node) {
                    simulation.pin(node, position);
                }
                tracing::trace!(node, "drag started");
            }
            GraphEvent::DragMove { node, world } if self.active_drags.contains(&node) => {
                simulation.pin(node, world);
            }
            GraphEvent::DragEnd { node } if self.active_drags.contains(&node) => {
                self.active_drags.retain(|&active| active != node);
                if self.active_drags.is_empty() {
                    simulation.release_active();
                }
                simulation.unpin(node);
                tracing::trace!(node, "drag ended");
            }
            GraphEvent::HoverEnter { node } if in_range(node) => {
                self.hovered = Some(node);
            }
            GraphEvent::HoverLeave => {
                self.hovered = None;
            }
            GraphEvent::NodeClicked { node, anchor } if in_range(node) => {
                self.tooltip = Some(Tooltip { node, anchor });
                self.selected = Some(node);
            }
            GraphEvent::BackgroundClicked => {
                self.tooltip = None;
            }
            GraphEvent::SelectAuthor { node } if in_range(node) => {
                self.selected = Some(node);
            }
            GraphEvent::ParameterChanged { parameter, value } => {
                tracing::debug!(parameter = parameter.label(), value, "force parameter changed");
                simulation.set_parameter(parameter, value);
                simulation.restart();
            }
            GraphEvent::Reheat => {
                tracing::debug!("layout reheated from controls");
                simulation.restart();
            }
            _ => {}
        }
    }

    pub(in crate::app) fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub(in crate::app) fn tooltip(&self) -> Option<Tooltip> {
        self.tooltip
    }

    pub(in crate::app) fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub(in crate::app) fn is_dragging(&self) -> bool {
        !self.active_drags.is_empty()
    }

    pub(in crate::app) fn is_dragging_node(&self, node: usize) -> bool {
        self.active_drags.contains(&node)
    }

    /// Hovering an author fades out every author from a different country.
    pub(in crate::app) fn node_opacity(&self, node: usize, network: &AuthorNetwork) -> f32 {
        let Some(hovered) = self.hovered.and_then(|index| network.authors.get(index)) else {
            return 1.0;
        };

        match network.authors.get(node) {
            Some(author) if author.country == hovered.country => 1.0,
            Some(_) => DIMMED_OPACITY,
            None => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::app::physics::ForceParams;
    use crate::app::test_support::{CHAIN_OF_THREE, network_from_json};

    fn setup() -> (InteractionState, ForceSimulation, AuthorNetwork) {
        let network = network_from_json(CHAIN_OF_THREE);
        let simulation = ForceSimulation::new(
            &[3.0, 12.0, 3.0],
            &network.links,
            ForceParams::default(),
        );
        (InteractionState::default(), simulation, network)
    }

    #[test]
    fn dragging_pins_then_releases_a_node() {
        let (mut state, mut simulation, network) = setup();
        simulation.tick();
        let start = simulation.position(0).expect("node exists");

        state.dispatch(GraphEvent::DragStart { node: 0 }, &mut simulation, &network);
        assert!(state.is_dragging_node(0));
        assert!(simulation.is_pinned(0));
        assert_eq!(simulation.alpha_target(), 0.3);
        simulation.tick();
        assert_eq!(simulation.position(0), Some(start));

        let target = vec2(240.0, -80.0);
        state.dispatch(
            GraphEvent::DragMove {
                node: 0,
                world: target,
            },
            &mut simulation,
            &network,
        );
        simulation.tick();
        assert_eq!(simulation.position(0), Some(target));

        state.dispatch(GraphEvent::DragEnd { node: 0 }, &mut simulation, &network);
        assert!(!state.is_dragging());
        assert!(!simulation.is_pinned(0));
        assert_eq!(simulation.alpha_target(), 0.0);

        for _ in 0..3 {
            simulation.tick();
        }
        assert_ne!(simulation.position(0), Some(target));
    }

    #[test]
    fn overlapping_drags_keep_energy_up_until_the_last_ends() {
        let (mut state, mut simulation, network) = setup();

        state.dispatch(GraphEvent::DragStart { node: 0 }, &mut simulation, &network);
        state.dispatch(GraphEvent::DragStart { node: 2 }, &mut simulation, &network);
        state.dispatch(GraphEvent::DragEnd { node: 0 }, &mut simulation, &network);
        assert_eq!(simulation.alpha_target(), 0.3);
        assert!(simulation.is_pinned(2));
        assert!(!simulation.is_pinned(0));

        state.dispatch(GraphEvent::DragEnd { node: 2 }, &mut simulation, &network);
        assert_eq!(simulation.alpha_target(), 0.0);
    }

    #[test]
    fn drag_start_wakes_a_settled_layout() {
        let (mut state, mut simulation, network) = setup();
        simulation.run_until_settled(1_000);
        assert!(!simulation.is_running());

        state.dispatch(GraphEvent::DragStart { node: 1 }, &mut simulation, &network);
        assert!(simulation.is_running());
        assert!(simulation.tick());
    }

    #[test]
    fn moves_for_nodes_not_being_dragged_are_ignored() {
        let (mut state, mut simulation, network) = setup();
        state.dispatch(
            GraphEvent::DragMove {
                node: 1,
                world: vec2(10.0, 10.0),
            },
            &mut simulation,
            &network,
        );
        assert!(!simulation.is_pinned(1));
    }

    #[test]
    fn hover_dims_other_countries() {
        let (mut state, mut simulation, network) = setup();

        assert_eq!(state.node_opacity(2, &network), 1.0);

        state.dispatch(GraphEvent::HoverEnter { node: 0 }, &mut simulation, &network);
        assert_eq!(state.node_opacity(0, &network), 1.0);
        assert_eq!(state.node_opacity(1, &network), 1.0);
        assert_eq!(state.node_opacity(2, &network), DIMMED_OPACITY);

        state.dispatch(GraphEvent::HoverLeave, &mut simulation, &network);
        for node in 0..3 {
            assert_eq!(state.node_opacity(node, &network), 1.0);
        }
    }

    #[test]
    fn hover_does_not_touch_the_simulation() {
        let (mut state, mut simulation, network) = setup();
        simulation.run_until_settled(1_000);

        state.dispatch(GraphEvent::HoverEnter { node: 1 }, &mut simulation, &network);
        assert!(!simulation.is_running());
        assert!(!simulation.is_pinned(1));
    }

    #[test]
    fn clicking_a_node_opens_tooltip_and_background_closes_it() {
        let (mut state, mut simulation, network) = setup();

        let click = GraphEvent::for_click(true, Some((0, pos2(120.0, 80.0)))).expect("click");
        state.dispatch(click, &mut simulation, &network);
        let tooltip = state.tooltip().expect("tooltip open");
        assert_eq!(tooltip.anchor, pos2(120.0, 80.0));
        let (author_line, country_line) = tooltip.lines(&network).expect("author exists");
        assert!(author_line.contains("Alice"));
        assert!(country_line.contains("NL"));
        assert_eq!(state.selected(), Some(0));

        let miss = GraphEvent::for_click(true, None).expect("click");
        assert_eq!(miss, GraphEvent::BackgroundClicked);
        state.dispatch(miss, &mut simulation, &network);
        assert!(state.tooltip().is_none());
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn node_click_never_closes_its_own_tooltip() {
        let (mut state, mut simulation, network) = setup();
        for event in [
            GraphEvent::for_click(true, Some((1, pos2(10.0, 10.0)))),
            GraphEvent::for_click(true, Some((2, pos2(20.0, 20.0)))),
        ]
        .into_iter()
        .flatten()
        {
            state.dispatch(event, &mut simulation, &network);
        }
        assert_eq!(state.tooltip().map(|tooltip| tooltip.node), Some(2));
    }

    #[test]
    fn clicks_outside_the_canvas_close_the_tooltip() {
        let (mut state, mut simulation, network) = setup();
        let open = GraphEvent::for_click(true, Some((2, pos2(60.0, 60.0)))).expect("click");
        state.dispatch(open, &mut simulation, &network);
        assert!(state.tooltip().is_some());

        assert_eq!(GraphEvent::for_click(false, None), None);
        assert!(state.tooltip().is_some());

        // A click on a side panel never reaches the canvas, so there is no hit.
        let panel_click = GraphEvent::for_click(true, None).expect("click");
        state.dispatch(panel_click, &mut simulation, &network);
        assert!(state.tooltip().is_none());
    }

    #[test]
    fn drag_move_relocates_node_without_ticking() {
        let (mut state, mut simulation, network) = setup();
        let target = vec2(-310.0, 95.0);

        state.dispatch(GraphEvent::DragStart { node: 2 }, &mut simulation, &network);
        state.dispatch(
            GraphEvent::DragMove {
                node: 2,
                world: target,
            },
            &mut simulation,
            &network,
        );
        assert_eq!(simulation.position(2), Some(target));
    }

    #[test]
    fn reheat_restarts_a_settled_layout() {
        let (mut state, mut simulation, network) = setup();
        simulation.run_until_settled(1_000);

        state.dispatch(GraphEvent::Reheat, &mut simulation, &network);
        assert_eq!(simulation.alpha(), 1.0);
        assert!(simulation.tick());
    }

    #[test]
    fn padding_change_mid_run_spreads_the_layout() {
        let (mut state, mut simulation, network) = setup();
        let min_distance = |simulation: &ForceSimulation| {
            let positions = simulation.positions().collect::<Vec<_>>();
            let mut min = f32::INFINITY;
            for (offset, a) in positions.iter().enumerate() {
                for b in &positions[offset + 1..] {
                    min = min.min((*a - *b).length());
                }
            }
            min
        };

        for _ in 0..20 {
            simulation.tick();
        }
        simulation.run_until_settled(1_000);
        let before = min_distance(&simulation);

        state.dispatch(
            GraphEvent::ParameterChanged {
                parameter: ForceParameter::CollisionPadding,
                value: 30.0,
            },
            &mut simulation,
            &network,
        );
        simulation.run_until_settled(1_000);
        let after = min_distance(&simulation);

        assert!(after > before + 5.0, "before {before}, after {after}");
    }

    #[test]
    fn parameter_change_updates_and_restarts_simulation() {
        let (mut state, mut simulation, network) = setup();
        simulation.run_until_settled(1_000);

        state.dispatch(
            GraphEvent::ParameterChanged {
                parameter: ForceParameter::CollisionPadding,
                value: 9.5,
            },
            &mut simulation,
            &network,
        );

        assert_eq!(simulation.params().collision_padding, 9.5);
        assert_eq!(simulation.alpha(), 1.0);
        assert!(simulation.is_running());
    }

    #[test]
    fn out_of_range_nodes_are_ignored() {
        let (mut state, mut simulation, network) = setup();
        state.dispatch(GraphEvent::HoverEnter { node: 99 }, &mut simulation, &network);
        state.dispatch(GraphEvent::DragStart { node: 99 }, &mut simulation, &network);
        assert_eq!(state.hovered(), None);
        assert!(!state.is_dragging());
    }
}
