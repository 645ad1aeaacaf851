//! Object roundness, derived from Size and Perimeter.

use crate::error::MeasureResult;
use crate::feature::{
    CompositeFeature, FeatureBase, FeatureInformation, ValueInformation,
};
use crate::raster::{IntensityImage, LabelImage};
use crate::table::Dependencies;
use crate::units::Units;

/// `4π·Size / Perimeter²`; 1 for a disk, smaller for everything else.
#[derive(Default)]
pub struct Roundness;

impl FeatureBase for Roundness {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Roundness", "Circularity of the object (4πA/P²)", false)
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        Ok(vec![ValueInformation::new("Roundness", Units::None)])
    }

    fn cleanup(&mut self) {}
}

impl CompositeFeature for Roundness {
    fn dependencies(&self) -> Vec<String> {
        vec!["Size".into(), "Perimeter".into()]
    }

    fn measure(&mut self, dependencies: &Dependencies<'_>, output: &mut [f64]) {
        let size = dependencies.cell("Size").map(|c| c[0]).unwrap_or(0.0);
        let perimeter = dependencies.cell("Perimeter").map(|c| c[0]).unwrap_or(0.0);
        output[0] = if perimeter > 0.0 {
            4.0 * std::f64::consts::PI * size / (perimeter * perimeter)
        } else {
            0.0
        };
    }
}
