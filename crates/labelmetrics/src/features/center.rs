//! Object centroid.

use crate::error::MeasureResult;
use crate::feature::{
    FeatureBase, FeatureInformation, ObjectIndexMap, ScanlineFeature, ValueInformation,
};
use crate::features::coordinate_name;
use crate::raster::{IntensityImage, LabelImage};
use crate::units::Units;

/// Centroid of each object, one value per dimension, pixel-size scaled.
#[derive(Default)]
pub struct Center {
    /// Per object: one coordinate sum per dimension, then the pixel count.
    accumulator: Vec<f64>,
    dimensionality: usize,
    pixel_size: Vec<f64>,
}

impl FeatureBase for Center {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("Center", "Coordinates of the geometric mean of the object", false)
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&IntensityImage>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        self.dimensionality = label.dimensionality();
        self.pixel_size = label.pixel_size().to_vec();
        self.accumulator.clear();
        self.accumulator
            .resize(n_objects * (self.dimensionality + 1), 0.0);
        Ok((0..self.dimensionality)
            .map(|d| ValueInformation::new(&coordinate_name(d), Units::Pixels(1)))
            .collect())
    }

    fn cleanup(&mut self) {
        self.accumulator.clear();
        self.accumulator.shrink_to_fit();
        self.pixel_size.clear();
    }
}

impl ScanlineFeature for Center {
    fn scan_line(
        &mut self,
        labels: &[u32],
        _grey: Option<&[f64]>,
        coords: &[usize],
        dimension: usize,
        object_index: &ObjectIndexMap,
    ) {
        let width = self.dimensionality + 1;
        let mut current = 0u32;
        let mut slot: Option<usize> = None;
        for (j, &label) in labels.iter().enumerate() {
            if label == 0 {
                continue;
            }
            if label != current {
                current = label;
                slot = object_index.get(&label).copied();
            }
            let Some(index) = slot else { continue };
            let acc = &mut self.accumulator[index * width..(index + 1) * width];
            for (d, &c) in coords.iter().enumerate() {
                let c = if d == dimension { c + j } else { c };
                acc[d] += c as f64;
            }
            acc[self.dimensionality] += 1.0;
        }
    }

    fn finish(&mut self, object_index: usize, output: &mut [f64]) {
        let width = self.dimensionality + 1;
        let acc = &self.accumulator[object_index * width..(object_index + 1) * width];
        let count = acc[self.dimensionality];
        if count == 0.0 {
            output.fill(0.0);
            return;
        }
        for d in 0..self.dimensionality {
            output[d] = acc[d] / count * self.pixel_size[d];
        }
    }
}
