//! Mean object intensity, derived from Mass and Size.

use crate::error::MeasureResult;
use crate::feature::{
    CompositeFeature, FeatureBase, FeatureInformation, ValueInformation,
};
use crate::raster::{IntensityImage, LabelImage};
use crate::table::Dependencies;
use crate::units::Units;

/// Mass divided by Size.
///
/// With a unit pixel size this is the mean grey value of the object;
/// otherwise it is intensity per physical area or volume.
#[derive(Default)]
pub struct Mean;

impl FeatureBase for Mean {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Mean", "Mean object intensity (Mass / Size)", true)
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        Ok(vec![ValueInformation::new("Mean", Units::Intensity)])
    }

    fn cleanup(&mut self) {}
}

impl CompositeFeature for Mean {
    fn dependencies(&self) -> Vec<String> {
        vec!["Mass".into(), "Size".into()]
    }

    fn measure(&mut self, dependencies: &Dependencies<'_>, output: &mut [f64]) {
        let mass = dependencies.cell("Mass").map(|c| c[0]).unwrap_or(0.0);
        let size = dependencies.cell("Size").map(|c| c[0]).unwrap_or(0.0);
        output[0] = if size > 0.0 { mass / size } else { 0.0 };
    }
}
