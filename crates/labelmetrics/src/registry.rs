//! Feature registry: owns the feature implementations known to a tool.

use std::collections::HashMap;

use crate::error::{MeasureError, MeasureResult};
use crate::feature::{FeatureImpl, FeatureInformation};
use crate::features;

/// Case-sensitive name → feature-implementation registry.
///
/// `Default` installs the built-in catalog; [`register`](Self::register)
/// accepts additional implementations. Registration while a measurement is in
/// flight is prevented by the borrow checker (the tool holds `&mut self`).
pub struct FeatureRegistry {
    features: Vec<FeatureImpl>,
    feature_indices: HashMap<String, usize>,
}

impl FeatureRegistry {
    /// Empty registry with no features at all.
    pub fn empty() -> Self {
        Self {
            features: Vec::new(),
            feature_indices: HashMap::new(),
        }
    }

    /// Register a feature implementation, taking ownership.
    ///
    /// If a feature with the same name is already registered the argument is
    /// silently dropped; the first registration wins.
    pub fn register(&mut self, feature: FeatureImpl) {
        let name = feature.information().name;
        if self.feature_indices.contains_key(&name) {
            return;
        }
        self.feature_indices.insert(name, self.features.len());
        self.features.push(feature);
    }

    /// True if a feature with this name is registered.
    pub fn exists(&self, name: &str) -> bool {
        self.feature_indices.contains_key(name)
    }

    /// Registry index of the named feature.
    pub fn index(&self, name: &str) -> MeasureResult<usize> {
        self.feature_indices
            .get(name)
            .copied()
            .ok_or_else(|| MeasureError::UnknownFeature { name: name.into() })
    }

    /// Information records for all registered features, registration order.
    pub fn information(&self) -> Vec<FeatureInformation> {
        self.features.iter().map(|f| f.information()).collect()
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True if no features are registered.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> &FeatureImpl {
        &self.features[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut FeatureImpl {
        &mut self.features[index]
    }
}

impl Default for FeatureRegistry {
    /// Registry pre-loaded with the built-in feature catalog.
    fn default() -> Self {
        let mut registry = Self::empty();
        for feature in features::builtin_catalog() {
            registry.register(feature);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contains_catalog() {
        let reg = FeatureRegistry::default();
        for name in [
            "Size",
            "Mass",
            "Center",
            "Identifier",
            "Perimeter",
            "Feret",
            "ConvexArea",
            "ConvexPerimeter",
            "Mean",
            "Roundness",
        ] {
            assert!(reg.exists(name), "missing builtin {name}");
        }
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let mut reg = FeatureRegistry::empty();
        let first: Vec<FeatureImpl> = crate::features::builtin_catalog()
            .into_iter()
            .filter(|f| f.information().name == "Size")
            .collect();
        let second: Vec<FeatureImpl> = crate::features::builtin_catalog()
            .into_iter()
            .filter(|f| f.information().name == "Size")
            .collect();
        for f in first {
            reg.register(f);
        }
        let before = reg.len();
        for f in second {
            reg.register(f);
        }
        assert_eq!(reg.len(), before);
        let infos = reg.information();
        assert_eq!(infos.iter().filter(|i| i.name == "Size").count(), 1);
    }

    #[test]
    fn index_miss_is_unknown_feature() {
        let reg = FeatureRegistry::default();
        assert!(matches!(
            reg.index("NotAFeature"),
            Err(MeasureError::UnknownFeature { .. })
        ));
        assert!(reg.index("Size").is_ok());
    }
}
