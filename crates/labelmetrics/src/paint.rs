//! Painting measurement values back onto the labeled image.

use crate::error::{MeasureError, MeasureResult};
use crate::raster::{IntensityImage, LabelImage};
use crate::table::{Cell, FeatureView};

/// Paint each object with its measurement values.
///
/// The output has the geometry and pixel size of `label` and one channel per
/// value of the viewed feature (scalar when the feature has a single value).
/// Labeled pixels whose identifier is present in the view receive that
/// object's cell; background and unknown identifiers become zeros. The view
/// is assumed to come from a measurement of this `label` image; that is a
/// caller contract, not checked.
pub fn object_to_measurement(
    label: &LabelImage,
    view: &FeatureView<'_>,
) -> MeasureResult<IntensityImage> {
    let mut out = IntensityImage::with_tensor(label.sizes(), view.number_values());
    out.set_pixel_size(label.pixel_size())?;
    object_to_measurement_into(label, &mut out, view)?;
    Ok(out)
}

/// In-place variant of [`object_to_measurement`]; `out` must already have
/// `label`'s sizes and one channel per feature value.
pub fn object_to_measurement_into(
    label: &LabelImage,
    out: &mut IntensityImage,
    view: &FeatureView<'_>,
) -> MeasureResult<()> {
    if !label.is_scalar() {
        return Err(MeasureError::invalid("label image must be scalar"));
    }
    if out.sizes() != label.sizes() {
        return Err(MeasureError::invalid(format!(
            "output sizes {:?} do not match label image sizes {:?}",
            out.sizes(),
            label.sizes()
        )));
    }
    let number_values = view.number_values();
    if out.tensor_len() != number_values {
        return Err(MeasureError::invalid(format!(
            "output has {} channels, feature {} produces {} values",
            out.tensor_len(),
            view.name(),
            number_values
        )));
    }

    // One table lookup per label transition.
    let mut current = 0u32;
    let mut cell: Option<Cell<'_>> = None;
    for (&id, pixel) in label
        .data()
        .iter()
        .zip(out.data_mut().chunks_exact_mut(number_values))
    {
        if id == 0 {
            pixel.fill(0.0);
            continue;
        }
        if id != current {
            current = id;
            cell = view.cell(id).ok();
        }
        match &cell {
            Some(cell) => pixel.copy_from_slice(cell.values()),
            None => pixel.fill(0.0),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::MeasurementTool;
    use approx::assert_relative_eq;

    fn scenario_label() -> LabelImage {
        LabelImage::from_vec(&[3, 3], vec![0, 1, 1, 0, 1, 2, 2, 2, 0]).unwrap()
    }

    #[test]
    fn identifier_round_trip_reproduces_label() {
        let label = scenario_label();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Identifier"], &[], 2).unwrap();
        let painted = object_to_measurement(&label, &table.feature("Identifier").unwrap()).unwrap();
        assert_eq!(painted.sizes(), label.sizes());
        assert!(painted.is_scalar());
        for (&id, &value) in label.data().iter().zip(painted.data()) {
            assert_relative_eq!(value, f64::from(id));
        }
    }

    #[test]
    fn multi_value_feature_paints_channels() {
        let label = scenario_label();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Center"], &[], 2).unwrap();
        let painted = object_to_measurement(&label, &table.feature("Center").unwrap()).unwrap();
        assert_eq!(painted.tensor_len(), 2);
        // Pixel (1,0) belongs to object 1.
        let center = table.feature("Center").unwrap().cell(1).unwrap();
        assert_eq!(painted.tensor_at(&[1, 0]), center.values());
        // Background stays zero in every channel.
        assert_eq!(painted.tensor_at(&[0, 0]), &[0.0, 0.0]);
    }

    #[test]
    fn unmeasured_objects_paint_to_zero() {
        let label = scenario_label();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Size"], &[1], 2).unwrap();
        let painted = object_to_measurement(&label, &table.feature("Size").unwrap()).unwrap();
        assert_relative_eq!(painted.at(&[1, 0]), 3.0);
        assert_relative_eq!(painted.at(&[2, 1]), 0.0);
    }

    #[test]
    fn in_place_variant_checks_geometry() {
        let label = scenario_label();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Size"], &[], 2).unwrap();
        let view = table.feature("Size").unwrap();

        let mut wrong_size = IntensityImage::new(&[4, 4]);
        assert!(object_to_measurement_into(&label, &mut wrong_size, &view).is_err());

        let mut wrong_channels = IntensityImage::with_tensor(&[3, 3], 2);
        assert!(object_to_measurement_into(&label, &mut wrong_channels, &view).is_err());

        // A dirty buffer of the right shape is fully overwritten.
        let mut out = IntensityImage::new(&[3, 3]);
        out.data_mut().fill(99.0);
        object_to_measurement_into(&label, &mut out, &view).unwrap();
        assert_relative_eq!(out.at(&[0, 0]), 0.0);
        assert_relative_eq!(out.at(&[1, 1]), 3.0);
    }
}
