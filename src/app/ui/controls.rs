use std::ops::RangeInclusive;

use eframe::egui::{self, Align, Color32, Key, Layout, Response, RichText, Ui};

use super::super::ViewModel;
use super::super::controller::GraphEvent;
use super::super::physics::{ForceParameter, ForceParams};

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;
const SEARCH_RESULT_LIMIT: usize = 12;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn default_slider_key_step(range: &RangeInclusive<f32>) -> f32 {
    ((range.end() - range.start()) / 200.0).max(0.0005)
}

/// Holding an arrow key on a focused slider moves it faster the longer the
/// key stays down.
fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    range: &RangeInclusive<f32>,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold_state.positive_secs = if increase_down {
        hold_state.positive_secs + delta_time
    } else {
        0.0
    };
    hold_state.negative_secs = if decrease_down {
        hold_state.negative_secs + delta_time
    } else {
        0.0
    };
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    let delta = direction as f32 * default_slider_key_step(range) * speed * delta_time;

    let old_value = *value;
    *value = step_within_hint(*value, delta, range);
    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

/// Keyboard steps stay inside the slider range, except for a value typed
/// outside it, which moves freely instead of snapping to the nearest end.
fn step_within_hint(value: f32, delta: f32, range: &RangeInclusive<f32>) -> f32 {
    if range.contains(&value) {
        (value + delta).clamp(*range.start(), *range.end())
    } else {
        value + delta
    }
}

/// A slider and a text field bound to the same force parameter. Whichever one
/// the user edits, the other is brought in line without emitting a second
/// change.
#[derive(Clone, Debug)]
pub(in crate::app) struct LinkedParameter {
    parameter: ForceParameter,
    value: f32,
    text: String,
    slider_range: RangeInclusive<f32>,
}

impl LinkedParameter {
    fn new(parameter: ForceParameter, value: f32) -> Self {
        Self {
            parameter,
            value,
            text: format_value(value),
            slider_range: slider_range(parameter),
        }
    }

    pub(in crate::app) fn set_from_slider(&mut self, value: f32) -> Option<GraphEvent> {
        self.commit(value)
    }

    /// Ignores input that does not parse as a finite number; the text stays as
    /// typed so the user can keep editing.
    pub(in crate::app) fn set_from_text(&mut self, text: &str) -> Option<GraphEvent> {
        self.text = text.to_owned();
        let value = text.trim().parse::<f32>().ok().filter(|value| value.is_finite())?;
        if value == self.value {
            return None;
        }
        self.value = value;
        Some(GraphEvent::ParameterChanged {
            parameter: self.parameter,
            value,
        })
    }

    /// Drops an unparsable draft once the field loses focus.
    pub(in crate::app) fn normalize_text(&mut self) {
        self.text = format_value(self.value);
    }

    fn commit(&mut self, value: f32) -> Option<GraphEvent> {
        if !value.is_finite() || value == self.value {
            return None;
        }
        self.value = value;
        self.text = format_value(value);
        Some(GraphEvent::ParameterChanged {
            parameter: self.parameter,
            value,
        })
    }

    fn draw(&mut self, ui: &mut Ui) -> Option<GraphEvent> {
        let mut event = None;
        ui.label(RichText::new(self.parameter.label()).strong());

        ui.horizontal(|ui| {
            let mut slider_value = self.value;
            let slider = ui
                .add(
                    egui::Slider::new(&mut slider_value, self.slider_range.clone())
                        .clamping(egui::SliderClamping::Never)
                        .show_value(false),
                )
                .on_hover_text(parameter_hint(self.parameter));
            if slider.hovered() {
                slider.request_focus();
            }
            apply_slider_arrow_acceleration(ui, &slider, &mut slider_value, &self.slider_range);
            if slider_value != self.value {
                event = self.set_from_slider(slider_value);
            }

            let mut draft = self.text.clone();
            let field = ui.add(egui::TextEdit::singleline(&mut draft).desired_width(64.0));
            if field.changed() {
                event = event.or(self.set_from_text(&draft));
            }
            if field.lost_focus() {
                self.normalize_text();
            }
        });

        event
    }
}

fn format_value(value: f32) -> String {
    format!("{value}")
}

fn slider_range(parameter: ForceParameter) -> RangeInclusive<f32> {
    match parameter {
        ForceParameter::ChargeStrength => -300.0..=0.0,
        ForceParameter::CollisionPadding => 0.0..=30.0,
        ForceParameter::LinkStrength => 0.0..=2.0,
    }
}

fn parameter_hint(parameter: ForceParameter) -> &'static str {
    match parameter {
        ForceParameter::ChargeStrength => "Negative values push authors apart, positive values pull.",
        ForceParameter::CollisionPadding => "Extra spacing kept around every node.",
        ForceParameter::LinkStrength => "How stiffly co-authorship links hold their length.",
    }
}

#[derive(Clone, Debug)]
pub(in crate::app) struct ParameterPanel {
    parameters: Vec<LinkedParameter>,
}

impl ParameterPanel {
    pub(in crate::app) fn new(params: ForceParams) -> Self {
        Self {
            parameters: ForceParameter::ALL
                .into_iter()
                .map(|parameter| LinkedParameter::new(parameter, params.get(parameter)))
                .collect(),
        }
    }

    pub(in crate::app) fn draw(&mut self, ui: &mut Ui) -> Vec<GraphEvent> {
        self.parameters
            .iter_mut()
            .filter_map(|parameter| {
                let event = parameter.draw(ui);
                ui.add_space(4.0);
                event
            })
            .collect()
    }

    #[cfg(test)]
    fn get_mut(&mut self, parameter: ForceParameter) -> Option<&mut LinkedParameter> {
        self.parameters
            .iter_mut()
            .find(|linked| linked.parameter == parameter)
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Forces");
        ui.separator();
        ui.add_space(4.0);

        let mut events = self.parameters.draw(ui);

        ui.separator();

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Keep stepping the layout every frame.");

        ui.horizontal(|ui| {
            if ui
                .button("Reheat")
                .on_hover_text("Restart the layout with full energy.")
                .clicked()
            {
                events.push(GraphEvent::Reheat);
            }
            ui.label(format!(
                "alpha {:.3} (target {:.1})",
                self.graph.simulation.alpha(),
                self.graph.simulation.alpha_target()
            ));
        });

        ui.checkbox(&mut self.show_quadtree_overlay, "Show quadtree overlay")
            .on_hover_text("Draw the Barnes-Hut partitions over the canvas.");

        ui.separator();

        ui.label("Search authors")
            .on_hover_text("Fuzzy-highlight matching authors on the canvas.");
        ui.text_edit_singleline(&mut self.search);
        self.draw_search_results(ui, &mut events);

        ui.separator();

        egui::CollapsingHeader::new("Countries")
            .default_open(true)
            .show(ui, |ui| self.draw_legend(ui));

        self.apply_events(events);
    }

    fn draw_search_results(&mut self, ui: &mut Ui, events: &mut Vec<GraphEvent>) {
        let ranked = self.ranked_search_matches(SEARCH_RESULT_LIMIT);
        if self.search.trim().is_empty() {
            return;
        }
        if ranked.is_empty() {
            ui.weak("No matching authors");
            return;
        }

        let selected = self.interaction.selected();
        egui::ScrollArea::vertical()
            .id_salt("author_search_results")
            .max_height(180.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for node in ranked {
                    let Some(author) = self.network.authors.get(node) else {
                        continue;
                    };
                    let clicked = ui
                        .horizontal(|ui| {
                            let clicked = ui
                                .selectable_label(selected == Some(node), author.name.as_str())
                                .clicked();
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                ui.weak(author.country.as_str());
                            });
                            clicked
                        })
                        .inner;
                    if clicked {
                        events.push(GraphEvent::SelectAuthor { node });
                    }
                }
            });
    }

    fn draw_legend(&self, ui: &mut Ui) {
        let palette = &self.encoding.palette;
        for entry in palette.legend() {
            legend_row(ui, entry.color, &entry.country, entry.count);
        }
        if palette.other_count() > 0 {
            legend_row(ui, palette.fallback(), "Other", palette.other_count());
        }
    }
}

fn legend_row(ui: &mut Ui, color: Color32, label: &str, count: usize) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 5.0, color);
        ui.label(label);
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.weak(count.to_string());
        });
    });
}
