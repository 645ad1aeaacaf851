//! Object mass: sum of intensity over the object.

use crate::error::MeasureResult;
use crate::feature::{
    require_scalar_grey, FeatureBase, FeatureInformation, ObjectIndexMap, ScanlineFeature,
    ValueInformation,
};
use crate::raster::{IntensityImage, LabelImage};
use crate::units::Units;

/// Sum of the intensity image over each object.
#[derive(Default)]
pub struct Mass {
    sums: Vec<f64>,
}

impl FeatureBase for Mass {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Mass", "Mass of object (sum of object intensity)", true)
    }

    fn initialize(
        &mut self,
        _label: &LabelImage,
        grey: Option<&IntensityImage>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_scalar_grey(&self.information(), grey)?;
        self.sums.clear();
        self.sums.resize(n_objects, 0.0);
        Ok(vec![ValueInformation::new("Mass", Units::Intensity)])
    }

    fn cleanup(&mut self) {
        self.sums.clear();
        self.sums.shrink_to_fit();
    }
}

impl ScanlineFeature for Mass {
    fn scan_line(
        &mut self,
        labels: &[u32],
        grey: Option<&[f64]>,
        _coords: &[usize],
        _dimension: usize,
        object_index: &ObjectIndexMap,
    ) {
        let Some(grey) = grey else { return };
        // If the label equals the previous one we keep the cached slot.
        let mut current = 0u32;
        let mut slot: Option<usize> = None;
        for (&label, &value) in labels.iter().zip(grey) {
            if label == 0 {
                continue;
            }
            if label != current {
                current = label;
                slot = object_index.get(&label).copied();
            }
            if let Some(index) = slot {
                self.sums[index] += value;
            }
        }
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        output[0] = self.sums[object_index];
    }
}
