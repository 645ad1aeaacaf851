//! Object size: pixel count scaled by the pixel volume.

use crate::error::MeasureResult;
use crate::feature::{
    FeatureBase, FeatureInformation, ObjectIndexMap, ScanlineFeature, ValueInformation,
};
use crate::raster::{IntensityImage, LabelImage};
use crate::units::Units;

/// Number of object pixels, scaled by the physical pixel volume.
#[derive(Default)]
pub struct Size {
    counts: Vec<f64>,
    pixel_volume: f64,
    dimensionality: usize,
}

impl FeatureBase for Size {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Size", "Area or volume of the object", false)
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&IntensityImage>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        self.pixel_volume = label.pixel_volume();
        self.dimensionality = label.dimensionality();
        self.counts.clear();
        self.counts.resize(n_objects, 0.0);
        Ok(vec![ValueInformation::new(
            "Size",
            Units::Pixels(self.dimensionality as i32),
        )])
    }

    fn cleanup(&mut self) {
        self.counts.clear();
        self.counts.shrink_to_fit();
    }
}

impl ScanlineFeature for Size {
    fn scan_line(
        &mut self,
        labels: &[u32],
        _grey: Option<&[f64]>,
        _coords: &[usize],
        _dimension: usize,
        object_index: &ObjectIndexMap,
    ) {
        // Runs of one label cost a single hash probe.
        let mut current = 0u32;
        let mut slot: Option<usize> = None;
        for &label in labels {
            if label == 0 {
                continue;
            }
            if label != current {
                current = label;
                slot = object_index.get(&label).copied();
            }
            if let Some(index) = slot {
                self.counts[index] += 1.0;
            }
        }
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        output[0] = self.counts[object_index] * self.pixel_volume;
    }
}
