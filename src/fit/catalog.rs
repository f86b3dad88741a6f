use crate::geometry::Transform;
use crate::math::Point2;

/// Where one sub-element sits inside a configuration's footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRule {
    pub element: String,
    pub position: Point2,
    /// Counter-clockwise rotation in radians.
    pub rotation: f64,
}

/// A sub-element placed in level space.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedElement {
    pub element: String,
    pub transform: Transform,
}

/// A named rectangular arrangement of content.
///
/// The footprint spans `(0, 0)` to `(width, depth)` in its local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentConfiguration {
    pub name: String,
    pub width: f64,
    pub depth: f64,
    pub rules: Vec<PlacementRule>,
}

impl ContentConfiguration {
    #[must_use]
    pub fn new(name: impl Into<String>, width: f64, depth: f64) -> Self {
        Self {
            name: name.into(),
            width,
            depth,
            rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rule(mut self, element: impl Into<String>, position: Point2, rotation: f64) -> Self {
        self.rules.push(PlacementRule {
            element: element.into(),
            position,
            rotation,
        });
        self
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.depth
    }

    /// Places every rule's element through `transform`.
    #[must_use]
    pub fn instantiate(&self, transform: &Transform) -> Vec<PlacedElement> {
        self.rules
            .iter()
            .map(|rule| PlacedElement {
                element: rule.element.clone(),
                transform: Transform::new(rule.position, rule.rotation).concatenated(transform),
            })
            .collect()
    }
}

/// An ordered, read-only set of content configurations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<ContentConfiguration>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a configuration, replacing any existing entry with the same name
    /// in place.
    pub fn insert(&mut self, config: ContentConfiguration) {
        match self.entries.iter_mut().find(|c| c.name == config.name) {
            Some(existing) => *existing = config,
            None => self.entries.push(config),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContentConfiguration> {
        self.entries.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentConfiguration> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The largest configuration that fits strictly inside `width` x `depth`.
    ///
    /// Entries are tried by descending footprint area; equal areas keep
    /// catalog order. An exact fit is rejected.
    #[must_use]
    pub fn select_best_fit(&self, width: f64, depth: f64) -> Option<&ContentConfiguration> {
        let mut ordered: Vec<&ContentConfiguration> = self.entries.iter().collect();
        ordered.sort_by(|a, b| b.area().total_cmp(&a.area()));
        ordered
            .into_iter()
            .find(|c| c.width < width && c.depth < depth)
    }
}

impl FromIterator<ContentConfiguration> for Catalog {
    fn from_iter<I: IntoIterator<Item = ContentConfiguration>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for config in iter {
            catalog.insert(config);
        }
        catalog
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn catalog() -> Catalog {
        [
            ContentConfiguration::new("small", 2.0, 2.0),
            ContentConfiguration::new("wide", 6.0, 2.0),
            ContentConfiguration::new("large", 4.0, 4.0),
            ContentConfiguration::new("tall", 2.0, 6.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn picks_largest_fitting() {
        let c = catalog();
        assert_eq!(c.select_best_fit(5.0, 5.0).unwrap().name, "large");
        // wide and tall tie on area; catalog order decides.
        assert_eq!(c.select_best_fit(7.0, 7.0).unwrap().name, "wide");
        assert_eq!(c.select_best_fit(3.0, 7.0).unwrap().name, "tall");
    }

    #[test]
    fn exact_fit_is_rejected() {
        let c = catalog();
        assert_eq!(c.select_best_fit(4.0, 4.0).unwrap().name, "small");
        assert!(c.select_best_fit(2.0, 2.0).is_none());
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut c = catalog();
        c.insert(ContentConfiguration::new("small", 1.0, 1.0));
        assert_eq!(c.len(), 4);
        assert_relative_eq!(c.get("small").unwrap().width, 1.0);
        assert_eq!(c.iter().next().unwrap().name, "small");
    }

    #[test]
    fn instantiate_applies_rules_then_transform() {
        let config = ContentConfiguration::new("desk", 2.0, 1.0).with_rule(
            "chair",
            Point2::new(1.0, 0.0),
            0.0,
        );
        let placed = config.instantiate(&Transform::new(Point2::new(5.0, 5.0), FRAC_PI_2));
        assert_eq!(placed.len(), 1);
        let origin = placed[0].transform.origin();
        assert_relative_eq!(origin.x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(origin.y, 6.0, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn best_fit_is_strictly_smaller(
            sizes in prop::collection::vec((0.5f64..6.0, 0.5f64..6.0), 0..8),
            width in 0.5f64..8.0,
            depth in 0.5f64..8.0,
        ) {
            let c: Catalog = sizes
                .iter()
                .enumerate()
                .map(|(i, (w, d))| ContentConfiguration::new(format!("c{i}"), *w, *d))
                .collect();
            if let Some(fit) = c.select_best_fit(width, depth) {
                prop_assert!(fit.width < width && fit.depth < depth);
                for other in c.iter() {
                    if other.width < width && other.depth < depth {
                        prop_assert!(other.area() <= fit.area());
                    }
                }
            } else {
                prop_assert!(c.iter().all(|o| o.width >= width || o.depth >= depth));
            }
        }
    }
}
