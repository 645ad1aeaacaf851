//! Feret diameters from the boundary chain code.

use crate::boundary::{ChainCode, ConvexHull};
use crate::error::MeasureResult;
use crate::feature::{
    require_2d, ChainCodeFeature, FeatureBase, FeatureInformation, ValueInformation,
};
use crate::features::isotropic_scale;
use crate::raster::{IntensityImage, LabelImage};
use crate::units::Units;

/// Extremal caliper diameters of each object.
///
/// Five values: maximum diameter, minimum diameter, the diameter
/// perpendicular to the minimum one, and the angles of the maximum and
/// minimum diameters.
#[derive(Default)]
pub struct Feret {
    scale: f64,
}

impl FeatureBase for Feret {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Feret", "Maximum and minimum object diameters", false)
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(&self.information(), label)?;
        self.scale = isotropic_scale(label);
        Ok(vec![
            ValueInformation::new("Max", Units::Pixels(1)),
            ValueInformation::new("Min", Units::Pixels(1)),
            ValueInformation::new("PerpMin", Units::Pixels(1)),
            ValueInformation::new("MaxAng", Units::Radians),
            ValueInformation::new("MinAng", Units::Radians),
        ])
    }

    fn cleanup(&mut self) {}
}

impl ChainCodeFeature for Feret {
    fn measure(&mut self, chain: &ChainCode, output: &mut [f64]) {
        let feret = ConvexHull::from_chain_code(chain).feret();
        output[0] = feret.max * self.scale;
        output[1] = feret.min * self.scale;
        output[2] = feret.perp_min * self.scale;
        output[3] = feret.max_angle;
        output[4] = feret.min_angle;
    }
}
