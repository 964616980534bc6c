use std::collections::HashMap;

use eframe::egui::Color32;

use crate::network::{AuthorNetwork, AuthorRecord};

pub(in crate::app) const RADIUS_RANGE: (f32, f32) = (3.0, 12.0);

/// Tableau 10 categorical palette.
pub(in crate::app) const CATEGORY_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x4e, 0x79, 0xa7),
    Color32::from_rgb(0xf2, 0x8e, 0x2c),
    Color32::from_rgb(0xe1, 0x57, 0x59),
    Color32::from_rgb(0x76, 0xb7, 0xb2),
    Color32::from_rgb(0x59, 0xa1, 0x4f),
    Color32::from_rgb(0xed, 0xc9, 0x49),
    Color32::from_rgb(0xaf, 0x7a, 0xa1),
    Color32::from_rgb(0xff, 0x9d, 0xa7),
    Color32::from_rgb(0x9c, 0x75, 0x5f),
    Color32::from_rgb(0xba, 0xb0, 0xab),
];

pub(in crate::app) const FALLBACK_COLOR: Color32 = Color32::from_rgb(0xa9, 0xa9, 0xa9);

#[derive(Clone, Copy, Debug)]
pub struct EncodingSettings {
    pub top_countries: usize,
    pub fallback_color: Color32,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            top_countries: CATEGORY_PALETTE.len(),
            fallback_color: FALLBACK_COLOR,
        }
    }
}

/// Square-root scale from the observed degree domain onto a pixel range, so a
/// node's area grows linearly with its degree.
#[derive(Clone, Copy, Debug)]
pub(in crate::app) struct RadiusScale {
    sqrt_min: f32,
    sqrt_max: f32,
    range: (f32, f32),
}

impl RadiusScale {
    pub(in crate::app) fn new(min_degree: usize, max_degree: usize) -> Self {
        Self {
            sqrt_min: (min_degree as f32).sqrt(),
            sqrt_max: (max_degree.max(min_degree) as f32).sqrt(),
            range: RADIUS_RANGE,
        }
    }

    pub(in crate::app) fn radius(&self, degree: usize) -> f32 {
        let (low, high) = self.range;
        let span = self.sqrt_max - self.sqrt_min;
        if span <= f32::EPSILON {
            return (low + high) * 0.5;
        }

        let t = ((degree as f32).sqrt() - self.sqrt_min) / span;
        low + (t * (high - low))
    }
}

#[derive(Clone, Debug)]
pub(in crate::app) struct LegendEntry {
    pub(in crate::app) country: String,
    pub(in crate::app) count: usize,
    pub(in crate::app) color: Color32,
}

/// Distinct colors for the most common countries; everyone else shares the
/// fallback. Built once per loaded network.
#[derive(Clone, Debug)]
pub(in crate::app) struct CountryPalette {
    ranked: Vec<LegendEntry>,
    color_by_country: HashMap<String, Color32>,
    fallback: Color32,
    other_count: usize,
}

impl CountryPalette {
    pub(in crate::app) fn new(network: &AuthorNetwork, settings: EncodingSettings) -> Self {
        let counts = network.country_counts();
        let mut ranked = Vec::with_capacity(settings.top_countries.min(counts.len()));
        let mut color_by_country = HashMap::new();
        let mut other_count = 0;

        for (slot, (country, count)) in counts.into_iter().enumerate() {
            if slot >= settings.top_countries {
                other_count += count;
                continue;
            }

            let color = CATEGORY_PALETTE[slot % CATEGORY_PALETTE.len()];
            color_by_country.insert(country.clone(), color);
            ranked.push(LegendEntry {
                country,
                count,
                color,
            });
        }

        Self {
            ranked,
            color_by_country,
            fallback: settings.fallback_color,
            other_count,
        }
    }

    pub(in crate::app) fn color_for(&self, country: &str) -> Color32 {
        self.color_by_country
            .get(country)
            .copied()
            .unwrap_or(self.fallback)
    }

    pub(in crate::app) fn legend(&self) -> &[LegendEntry] {
        &self.ranked
    }

    pub(in crate::app) fn fallback(&self) -> Color32 {
        self.fallback
    }

    pub(in crate::app) fn other_count(&self) -> usize {
        self.other_count
    }
}

pub(in crate::app) struct VisualEncoding {
    pub(in crate::app) radius: RadiusScale,
    pub(in crate::app) palette: CountryPalette,
}

impl VisualEncoding {
    pub(in crate::app) fn new(network: &AuthorNetwork, settings: EncodingSettings) -> Self {
        let (min_degree, max_degree) = network.degree_range().unwrap_or((0, 0));
        Self {
            radius: RadiusScale::new(min_degree, max_degree),
            palette: CountryPalette::new(network, settings),
        }
    }

    pub(in crate::app) fn node_radius(&self, author: &AuthorRecord) -> f32 {
        self.radius.radius(author.degree)
    }

    pub(in crate::app) fn node_color(&self, author: &AuthorRecord) -> Color32 {
        self.palette.color_for(&author.country)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::app::test_support::network_from_json;

    #[test]
    fn radius_grows_with_degree() {
        let scale = RadiusScale::new(1, 25);
        let mut previous = 0.0;
        for degree in 1..=25 {
            let radius = scale.radius(degree);
            assert!(radius >= previous, "degree {degree}");
            previous = radius;
        }
        assert!((scale.radius(1) - 3.0).abs() < 1e-5);
        assert!((scale.radius(25) - 12.0).abs() < 1e-5);
    }

    #[test]
    fn radius_follows_square_root_law() {
        let scale = RadiusScale::new(0, 16);
        // From a zero-based domain the radius above the floor is proportional to sqrt(degree).
        let r4 = scale.radius(4) - RADIUS_RANGE.0;
        let r16 = scale.radius(16) - RADIUS_RANGE.0;
        assert!((r16 / r4 - 2.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_domain_uses_range_midpoint() {
        let scale = RadiusScale::new(3, 3);
        assert_eq!(scale.radius(3), 7.5);
    }

    #[test]
    fn chain_middle_node_is_larger() {
        let network = network_from_json(
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
        let encoding = VisualEncoding::new(&network, EncodingSettings::default());

        let radii = network
            .authors
            .iter()
            .map(|author| encoding.node_radius(author))
            .collect::<Vec<_>>();
        assert!(radii[1] > radii[0]);
        assert_eq!(radii[0], radii[2]);
    }

    #[test]
    fn only_top_ten_countries_get_palette_colors() {
        // Twelve countries; "K" and "L" tie with "J" on count but appear later.
        let mut nodes = Vec::new();
        let mut id = 0;
        for (country, count) in [
            ("A", 9),
            ("B", 8),
            ("C", 7),
            ("D", 6),
            ("E", 5),
            ("F", 4),
            ("G", 3),
            ("H", 3),
            ("I", 2),
            ("J", 1),
            ("K", 1),
            ("L", 1),
        ] {
            for _ in 0..count {
                nodes.push(format!(
                    r#"{{"id": "n{id}", "name": "n{id}", "country": "{country}"}}"#
                ));
                id += 1;
            }
        }
        let raw = format!(r#"{{"nodes": [{}], "links": []}}"#, nodes.join(","));
        let network = network_from_json(&raw);
        let palette = CountryPalette::new(&network, EncodingSettings::default());

        let top = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
        let colors = top
            .iter()
            .map(|country| palette.color_for(country))
            .collect::<Vec<_>>();
        assert_eq!(colors, CATEGORY_PALETTE.to_vec());
        assert_eq!(colors.iter().collect::<HashSet<_>>().len(), 10);

        assert_eq!(palette.color_for("K"), FALLBACK_COLOR);
        assert_eq!(palette.color_for("L"), FALLBACK_COLOR);
        assert_eq!(palette.color_for("Atlantis"), FALLBACK_COLOR);
        assert_eq!(palette.legend().len(), 10);
        assert_eq!(palette.other_count(), 2);
    }

    #[test]
    fn top_country_limit_is_configurable() {
        let network = network_from_json(
            r#"{
                "nodes": [
                    {"id": "1", "name": "a", "country": "X"},
                    {"id": "2", "name": "b", "country": "X"},
                    {"id": "3", "name": "c", "country": "Y"}
                ]
            }"#,
        );
        let settings = EncodingSettings {
            top_countries: 1,
            fallback_color: Color32::BLACK,
        };
        let palette = CountryPalette::new(&network, settings);

        assert_eq!(palette.color_for("X"), CATEGORY_PALETTE[0]);
        assert_eq!(palette.color_for("Y"), Color32::BLACK);
        assert_eq!(palette.fallback(), Color32::BLACK);
    }
}
