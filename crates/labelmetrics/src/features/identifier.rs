//! The object identifier as a measurement value.

use crate::error::MeasureResult;
use crate::feature::{FeatureBase, FeatureInformation, ValueInformation, WholeImageFeature};
use crate::raster::{IntensityImage, LabelImage};
use crate::table::FeatureColumnMut;
use crate::units::Units;

/// Writes each object's identifier into its cell.
///
/// Painting this feature back onto the label image reproduces the label
/// image, which makes it a useful sanity probe for the whole pipeline.
#[derive(Default)]
pub struct Identifier;

impl FeatureBase for Identifier {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Identifier", "Object identifier", false)
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        Ok(vec![ValueInformation::new("ID", Units::None)])
    }

    fn cleanup(&mut self) {}
}

impl WholeImageFeature for Identifier {
    fn measure(
        &mut self,
        _label: &LabelImage,
        _grey: Option<&IntensityImage>,
        output: &mut FeatureColumnMut<'_>,
    ) -> MeasureResult<()> {
        for row in 0..output.number_of_objects() {
            let id = output.object_id(row);
            output.cell_mut(row)[0] = f64::from(id);
        }
        Ok(())
    }
}
