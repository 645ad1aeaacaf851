//! Object perimeter from the boundary chain code.

use crate::boundary::ChainCode;
use crate::error::MeasureResult;
use crate::feature::{
    require_2d, ChainCodeFeature, FeatureBase, FeatureInformation, ValueInformation,
};
use crate::features::isotropic_scale;
use crate::raster::{IntensityImage, LabelImage};
use crate::units::Units;

/// Corner-corrected boundary length of each object.
///
/// Objects whose boundary could not be traced keep a zero cell; a
/// single-pixel object measures π.
#[derive(Default)]
pub struct Perimeter {
    scale: f64,
}

impl FeatureBase for Perimeter {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Perimeter", "Length of the object boundary", false)
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(&self.information(), label)?;
        self.scale = isotropic_scale(label);
        Ok(vec![ValueInformation::new("Perimeter", Units::Pixels(1))])
    }

    fn cleanup(&mut self) {}
}

impl ChainCodeFeature for Perimeter {
    fn measure(&mut self, chain: &ChainCode, output: &mut [f64]) {
        output[0] = chain.length() * self.scale;
    }
}
