//! Measurements on the convex hull of an object.

use crate::boundary::ConvexHull;
use crate::error::MeasureResult;
use crate::feature::{
    require_2d, ConvexHullFeature, FeatureBase, FeatureInformation, ValueInformation,
};
use crate::features::isotropic_scale;
use crate::raster::{IntensityImage, LabelImage};
use crate::units::Units;

/// Area of each object's convex hull.
#[derive(Default)]
pub struct ConvexArea {
    scale: f64,
}

impl FeatureBase for ConvexArea {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new("ConvexArea", "Area of the convex hull of the object", false)
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(&self.information(), label)?;
        self.scale = isotropic_scale(label);
        Ok(vec![ValueInformation::new("ConvexArea", Units::Pixels(2))])
    }

    fn cleanup(&mut self) {}
}

impl ConvexHullFeature for ConvexArea {
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]) {
        output[0] = hull.area() * self.scale * self.scale;
    }
}

/// Boundary length of each object's convex hull.
#[derive(Default)]
pub struct ConvexPerimeter {
    scale: f64,
}

impl FeatureBase for ConvexPerimeter {
    fn information(&self) -> FeatureInformation {
        FeatureInformation::new(
            "ConvexPerimeter",
            "Perimeter of the convex hull of the object",
            false,
        )
    }

    fn initialize(
        &mut self,
        label: &LabelImage,
        _grey: Option<&IntensityImage>,
        _n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        require_2d(&self.information(), label)?;
        self.scale = isotropic_scale(label);
        Ok(vec![ValueInformation::new(
            "ConvexPerimeter",
            Units::Pixels(1),
        )])
    }

    fn cleanup(&mut self) {}
}

impl ConvexHullFeature for ConvexPerimeter {
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]) {
        output[0] = hull.perimeter() * self.scale;
    }
}
