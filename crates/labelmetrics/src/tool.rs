//! Measurement driver: schedules features over a labeled image.
//!
//! [`MeasurementTool`] owns the feature registry and drives one measurement
//! per call: resolve the requested features, initialize them against the
//! concrete images, forge the result table, then run one pass per
//! computation style — scanline, chain-code, convex-hull, whole-image,
//! composite — feeding each style's data source exactly once.

use std::collections::HashSet;

use crate::boundary::{extract_chain_codes, ConvexHull};
use crate::error::{MeasureError, MeasureResult};
use crate::feature::{FeatureImpl, FeatureInformation, FeatureKind};
use crate::raster::{IntensityImage, LabelImage};
use crate::registry::FeatureRegistry;
use crate::resolve::resolve;
use crate::table::Measurement;

/// Performs measurements on labeled images.
///
/// Knows the registered measurement features and applies them through
/// [`measure`](Self::measure). Feature instances carry per-run state, so the
/// tool takes `&mut self` during a measurement; two independent tools are
/// fully independent.
pub struct MeasurementTool {
    registry: FeatureRegistry,
}

impl Default for MeasurementTool {
    fn default() -> Self {
        Self {
            registry: FeatureRegistry::default(),
        }
    }
}

impl MeasurementTool {
    /// Tool with the built-in feature catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool with a caller-provided registry.
    pub fn with_registry(registry: FeatureRegistry) -> Self {
        Self { registry }
    }

    /// Register an additional feature implementation; the first registration
    /// of a name wins.
    pub fn register(&mut self, feature: FeatureImpl) {
        self.registry.register(feature);
    }

    /// Information records of all registered features, registration order.
    pub fn features(&self) -> Vec<FeatureInformation> {
        self.registry.information()
    }

    /// Measure the requested features over the objects of `label`.
    ///
    /// `grey` is an optional intensity image with the same sizes as `label`;
    /// it must be present if any resolved feature needs it. `object_ids`
    /// selects the rows of the result: an empty list measures all labels
    /// present in the image (ascending), otherwise the list is used verbatim
    /// (de-duplicated, order preserved) and identifiers without pixels keep
    /// all-zero rows. `connectivity` must match the connectivity used when
    /// labeling and is only consulted for boundary extraction.
    ///
    /// Composite features pull their dependencies into the result table; the
    /// resolved order is the table's column order.
    pub fn measure(
        &mut self,
        label: &LabelImage,
        grey: Option<&IntensityImage>,
        features: &[&str],
        object_ids: &[u32],
        connectivity: usize,
    ) -> MeasureResult<Measurement> {
        if !label.is_scalar() {
            return Err(MeasureError::invalid("label image must be scalar"));
        }
        if !(1..=label.dimensionality()).contains(&connectivity) {
            return Err(MeasureError::invalid(format!(
                "connectivity must be in 1..={}, got {connectivity}",
                label.dimensionality()
            )));
        }

        let mut requested: Vec<String> = Vec::new();
        for &name in features {
            if !requested.iter().any(|n| n == name) {
                requested.push(name.to_string());
            }
        }
        if requested.is_empty() {
            return Err(MeasureError::invalid("no features requested"));
        }
        let resolved = resolve(&self.registry, &requested)?;

        let needs_grey = resolved
            .iter()
            .any(|&i| self.registry.get(i).information().needs_intensity);
        if needs_grey {
            let grey = grey.ok_or_else(|| {
                MeasureError::invalid("selected features require an intensity image")
            })?;
            if grey.sizes() != label.sizes() {
                return Err(MeasureError::invalid(format!(
                    "intensity image sizes {:?} do not match label image sizes {:?}",
                    grey.sizes(),
                    label.sizes()
                )));
            }
        }

        let objects: Vec<u32> = if object_ids.is_empty() {
            collect_labels(label)
        } else {
            let mut seen = HashSet::new();
            object_ids
                .iter()
                .copied()
                .filter(|id| seen.insert(*id))
                .collect()
        };

        let mut table = Measurement::new();
        table.add_object_ids(&objects)?;
        let mut initialized: Vec<usize> = Vec::new();
        let mut failure: Option<MeasureError> = None;
        for &i in &resolved {
            let info = self.registry.get(i).information();
            let feature_grey = if info.needs_intensity { grey } else { None };
            match self
                .registry
                .get_mut(i)
                .initialize(label, feature_grey, objects.len())
            {
                Ok(values) => {
                    initialized.push(i);
                    if let Err(e) = table.add_feature(&info.name, values) {
                        failure = Some(e);
                        break;
                    }
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if failure.is_none() {
            if let Err(e) = table.forge() {
                failure = Some(e);
            }
        }
        if failure.is_none() {
            if let Err(e) = self.run_passes(label, grey, &resolved, &mut table, connectivity) {
                failure = Some(e);
            }
        }
        // Cleanup runs on every initialized feature, also on failure paths.
        for &i in initialized.iter().rev() {
            self.registry.get_mut(i).cleanup();
        }
        match failure {
            Some(e) => Err(e),
            None => Ok(table),
        }
    }

    fn run_passes(
        &mut self,
        label: &LabelImage,
        grey: Option<&IntensityImage>,
        resolved: &[usize],
        table: &mut Measurement,
        connectivity: usize,
    ) -> MeasureResult<()> {
        // Partition by computation style; the position in the resolved order
        // is the feature's index in the table.
        let mut scanline: Vec<(usize, usize)> = Vec::new();
        let mut whole_image: Vec<(usize, usize)> = Vec::new();
        let mut chain_code: Vec<(usize, usize)> = Vec::new();
        let mut convex_hull: Vec<(usize, usize)> = Vec::new();
        let mut composite: Vec<(usize, usize)> = Vec::new();
        for (pos, &i) in resolved.iter().enumerate() {
            match self.registry.get(i).kind() {
                FeatureKind::Scanline => scanline.push((pos, i)),
                FeatureKind::WholeImage => whole_image.push((pos, i)),
                FeatureKind::ChainCode => chain_code.push((pos, i)),
                FeatureKind::ConvexHull => convex_hull.push((pos, i)),
                FeatureKind::Composite => composite.push((pos, i)),
            }
        }
        tracing::debug!(
            scanline = scanline.len(),
            whole_image = whole_image.len(),
            chain_code = chain_code.len(),
            convex_hull = convex_hull.len(),
            composite = composite.len(),
            objects = table.number_of_objects(),
            "measurement passes"
        );

        if !scanline.is_empty() {
            let grey_wanted = scanline
                .iter()
                .any(|&(_, i)| self.registry.get(i).information().needs_intensity);
            for line in label.lines() {
                let labels = label.line(&line);
                let grey_line = if grey_wanted {
                    grey.map(|g| g.line_at(&line.coords))
                } else {
                    None
                };
                for &(_, i) in &scanline {
                    if let FeatureImpl::Scanline(f) = self.registry.get_mut(i) {
                        f.scan_line(labels, grey_line, &line.coords, 0, table.object_index_map());
                    }
                }
            }
            for row in 0..table.number_of_objects() {
                for &(pos, i) in &scanline {
                    if let FeatureImpl::Scanline(f) = self.registry.get_mut(i) {
                        f.finish(row, table.cell_mut(row, pos));
                    }
                }
            }
        }

        if !chain_code.is_empty() || !convex_hull.is_empty() {
            let objects = table.objects().to_vec();
            let chains = extract_chain_codes(label, &objects, connectivity)?;
            for (row, id) in objects.iter().copied().enumerate() {
                let Some(chain) = chains.get(&id) else {
                    tracing::debug!(id, "no boundary for object; cells stay zero");
                    continue;
                };
                for &(pos, i) in &chain_code {
                    if let FeatureImpl::ChainCode(f) = self.registry.get_mut(i) {
                        f.measure(chain, table.cell_mut(row, pos));
                    }
                }
                if !convex_hull.is_empty() {
                    let hull = ConvexHull::from_chain_code(chain);
                    for &(pos, i) in &convex_hull {
                        if let FeatureImpl::ConvexHull(f) = self.registry.get_mut(i) {
                            f.measure(&hull, table.cell_mut(row, pos));
                        }
                    }
                }
            }
        }

        for &(pos, i) in &whole_image {
            let info = self.registry.get(i).information();
            let feature_grey = if info.needs_intensity { grey } else { None };
            if let FeatureImpl::WholeImage(f) = self.registry.get_mut(i) {
                let mut column = table.feature_column_mut(pos);
                f.measure(label, feature_grey, &mut column)?;
            }
        }

        for row in 0..table.number_of_objects() {
            for &(pos, i) in &composite {
                if let FeatureImpl::Composite(f) = self.registry.get_mut(i) {
                    let (dependencies, output) = table.split_row_mut(row, pos);
                    f.measure(&dependencies, output);
                }
            }
        }

        Ok(())
    }
}

/// All distinct positive labels in the image, ascending.
fn collect_labels(label: &LabelImage) -> Vec<u32> {
    let mut seen: HashSet<u32> = HashSet::new();
    for &v in label.data() {
        if v > 0 {
            seen.insert(v);
        }
    }
    let mut out: Vec<u32> = seen.into_iter().collect();
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{
        CompositeFeature, FeatureBase, ScanlineFeature, ValueInformation,
    };
    use crate::feature::ObjectIndexMap;
    use crate::table::Dependencies;
    use crate::units::Units;
    use approx::assert_relative_eq;

    /// `L = [[0,1,1],[0,1,2],[2,2,0]]` from the scenarios.
    fn scenario_label() -> LabelImage {
        LabelImage::from_vec(&[3, 3], vec![0, 1, 1, 0, 1, 2, 2, 2, 0]).unwrap()
    }

    fn scenario_grey() -> IntensityImage {
        IntensityImage::from_vec(
            &[3, 3],
            vec![0.0, 4.0, 2.0, 0.0, 6.0, 8.0, 3.0, 5.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn size_of_all_objects() {
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(&scenario_label(), None, &["Size"], &[], 2)
            .unwrap();
        assert_eq!(table.objects(), &[1, 2]);
        assert_relative_eq!(table.feature("Size").unwrap().cell(1).unwrap()[0], 3.0);
        assert_relative_eq!(table.feature("Size").unwrap().cell(2).unwrap()[0], 3.0);
    }

    #[test]
    fn mass_sums_intensity() {
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(&scenario_label(), Some(&scenario_grey()), &["Mass"], &[], 2)
            .unwrap();
        assert_relative_eq!(table.feature("Mass").unwrap().cell(1).unwrap()[0], 12.0);
        assert_relative_eq!(table.feature("Mass").unwrap().cell(2).unwrap()[0], 16.0);
    }

    #[test]
    fn requested_ids_are_kept_verbatim_with_zero_rows() {
        // Objects 5, 7, 9 in separate corners; 7 is a single pixel.
        let mut data = vec![0u32; 25];
        data[0] = 5;
        data[1] = 5;
        data[12] = 7;
        data[24] = 9;
        let label = LabelImage::from_vec(&[5, 5], data).unwrap();
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(&label, None, &["Size", "Perimeter"], &[7, 99], 2)
            .unwrap();
        assert_eq!(table.objects(), &[7, 99]);
        assert_eq!(table.number_of_objects(), 2);
        assert_relative_eq!(table.feature("Size").unwrap().cell(7).unwrap()[0], 1.0);
        assert_relative_eq!(
            table.feature("Perimeter").unwrap().cell(7).unwrap()[0],
            std::f64::consts::PI
        );
        let row: Vec<f64> = table
            .object(99)
            .unwrap()
            .cells()
            .flat_map(|c| c.values().to_vec())
            .collect();
        assert!(row.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn duplicate_ids_and_features_are_deduplicated() {
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(&scenario_label(), None, &["Size", "Size"], &[2, 1, 2], 2)
            .unwrap();
        assert_eq!(table.objects(), &[2, 1]);
        assert_eq!(table.number_of_features(), 1);
    }

    /// S4: `Ratio = Size / Perimeter`, registered by the caller.
    struct Ratio;

    impl FeatureBase for Ratio {
        fn information(&self) -> crate::feature::FeatureInformation {
            crate::feature::FeatureInformation::new("Ratio", "Size over Perimeter", false)
        }

        fn initialize(
            &mut self,
            _label: &LabelImage,
            _grey: Option<&IntensityImage>,
            _n_objects: usize,
        ) -> MeasureResult<Vec<ValueInformation>> {
            Ok(vec![ValueInformation::new("Ratio", Units::Pixels(1))])
        }

        fn cleanup(&mut self) {}
    }

    impl CompositeFeature for Ratio {
        fn dependencies(&self) -> Vec<String> {
            vec!["Size".into(), "Perimeter".into()]
        }

        fn measure(&mut self, dependencies: &Dependencies<'_>, output: &mut [f64]) {
            let size = dependencies.cell("Size").map(|c| c[0]).unwrap_or(0.0);
            let perimeter = dependencies.cell("Perimeter").map(|c| c[0]).unwrap_or(0.0);
            output[0] = if perimeter > 0.0 { size / perimeter } else { 0.0 };
        }
    }

    #[test]
    fn composite_pulls_dependencies_in_column_order() {
        let mut tool = MeasurementTool::new();
        tool.register(FeatureImpl::Composite(Box::new(Ratio)));
        let table = tool
            .measure(&scenario_label(), None, &["Ratio"], &[], 2)
            .unwrap();
        let names: Vec<&str> = table.features().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Size", "Perimeter", "Ratio"]);
        for &id in table.objects() {
            let object = table.object(id).unwrap();
            let size = object.cell("Size").unwrap()[0];
            let perimeter = object.cell("Perimeter").unwrap()[0];
            let ratio = object.cell("Ratio").unwrap()[0];
            assert_relative_eq!(ratio, size / perimeter);
        }
    }

    #[test]
    fn builtin_composites_match_their_definition() {
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(
                &scenario_label(),
                Some(&scenario_grey()),
                &["Mean", "Roundness"],
                &[],
                2,
            )
            .unwrap();
        for &id in table.objects() {
            let object = table.object(id).unwrap();
            let mass = object.cell("Mass").unwrap()[0];
            let size = object.cell("Size").unwrap()[0];
            let perimeter = object.cell("Perimeter").unwrap()[0];
            assert_relative_eq!(object.cell("Mean").unwrap()[0], mass / size);
            assert_relative_eq!(
                object.cell("Roundness").unwrap()[0],
                4.0 * std::f64::consts::PI * size / (perimeter * perimeter)
            );
        }
    }

    #[test]
    fn missing_intensity_image_fails_before_initialize() {
        let mut tool = MeasurementTool::new();
        let err = tool
            .measure(&scenario_label(), None, &["Mass"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::InvalidArgument(_)));
        // Composite features propagate the requirement through dependencies.
        let err = tool
            .measure(&scenario_label(), None, &["Mean"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::InvalidArgument(_)));
    }

    #[test]
    fn mismatched_grey_sizes_are_rejected() {
        let mut tool = MeasurementTool::new();
        let grey = IntensityImage::new(&[4, 4]);
        let err = tool
            .measure(&scenario_label(), Some(&grey), &["Mass"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::InvalidArgument(_)));
    }

    #[test]
    fn tensor_grey_is_refused_by_builtin_mass() {
        let mut tool = MeasurementTool::new();
        let grey = IntensityImage::with_tensor(&[3, 3], 2);
        let err = tool
            .measure(&scenario_label(), Some(&grey), &["Mass"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::UnsupportedInput { .. }));
    }

    #[test]
    fn connectivity_is_validated() {
        let mut tool = MeasurementTool::new();
        for bad in [0usize, 3] {
            let err = tool
                .measure(&scenario_label(), None, &["Size"], &[], bad)
                .unwrap_err();
            assert!(matches!(err, MeasureError::InvalidArgument(_)));
        }
        // A 3-D image admits connectivity 3.
        let mut volume = LabelImage::new(&[2, 2, 2]);
        volume.data_mut()[0] = 1;
        assert!(tool.measure(&volume, None, &["Size"], &[], 3).is_ok());
    }

    #[test]
    fn chain_code_features_refuse_volumes() {
        let mut volume = LabelImage::new(&[2, 2, 2]);
        volume.data_mut()[0] = 1;
        let mut tool = MeasurementTool::new();
        let err = tool
            .measure(&volume, None, &["Perimeter"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::UnsupportedInput { .. }));
    }

    #[test]
    fn unknown_feature_is_reported() {
        let mut tool = MeasurementTool::new();
        let err = tool
            .measure(&scenario_label(), None, &["Frobnicate"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::UnknownFeature { .. }));
    }

    #[test]
    fn centroid_accounts_for_pixel_size() {
        let mut label = scenario_label();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Center"], &[1], 2).unwrap();
        let center = table.feature("Center").unwrap().cell(1).unwrap();
        assert_relative_eq!(center[0], 4.0 / 3.0);
        assert_relative_eq!(center[1], 1.0 / 3.0);

        label.set_pixel_size(&[0.5, 2.0]).unwrap();
        let table = tool.measure(&label, None, &["Center"], &[1], 2).unwrap();
        let center = table.feature("Center").unwrap().cell(1).unwrap();
        assert_relative_eq!(center[0], 4.0 / 6.0);
        assert_relative_eq!(center[1], 2.0 / 3.0);
    }

    #[test]
    fn size_scales_with_pixel_volume() {
        let mut label = scenario_label();
        label.set_pixel_size(&[0.5, 0.5]).unwrap();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Size"], &[], 2).unwrap();
        assert_relative_eq!(table.feature("Size").unwrap().cell(1).unwrap()[0], 0.75);
    }

    #[test]
    fn whole_image_identifier_column() {
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(&scenario_label(), None, &["Identifier"], &[2, 1], 2)
            .unwrap();
        assert_eq!(table.feature("Identifier").unwrap().cell(2).unwrap()[0], 2.0);
        assert_eq!(table.feature("Identifier").unwrap().cell(1).unwrap()[0], 1.0);
    }

    #[test]
    fn convex_features_on_a_square() {
        // 3x3 square: hull of the boundary pixel corners is the full square.
        let mut data = vec![0u32; 25];
        for y in 1..4 {
            for x in 1..4 {
                data[y * 5 + x] = 1;
            }
        }
        let label = LabelImage::from_vec(&[5, 5], data).unwrap();
        let mut tool = MeasurementTool::new();
        let table = tool
            .measure(&label, None, &["ConvexArea", "ConvexPerimeter", "Feret"], &[], 2)
            .unwrap();
        assert_relative_eq!(table.feature("ConvexArea").unwrap().cell(1).unwrap()[0], 9.0);
        assert_relative_eq!(
            table.feature("ConvexPerimeter").unwrap().cell(1).unwrap()[0],
            12.0
        );
        let feret = table.feature("Feret").unwrap().cell(1).unwrap();
        assert_relative_eq!(feret[0], 18.0f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(feret[1], 3.0, epsilon = 1e-12);
        assert_relative_eq!(feret[2], 3.0, epsilon = 1e-12);
    }

    /// A feature whose `initialize` always fails, to probe cleanup paths.
    struct Broken;

    impl FeatureBase for Broken {
        fn information(&self) -> crate::feature::FeatureInformation {
            crate::feature::FeatureInformation::new("Broken", "Always refuses", false)
        }

        fn initialize(
            &mut self,
            _label: &LabelImage,
            _grey: Option<&IntensityImage>,
            _n_objects: usize,
        ) -> MeasureResult<Vec<ValueInformation>> {
            Err(MeasureError::unsupported("Broken", "always refuses"))
        }

        fn cleanup(&mut self) {}
    }

    impl ScanlineFeature for Broken {
        fn scan_line(
            &mut self,
            _labels: &[u32],
            _grey: Option<&[f64]>,
            _coords: &[usize],
            _dimension: usize,
            _object_index: &ObjectIndexMap,
        ) {
        }

        fn finish(&mut self, _object_index: usize, _output: &mut [f64]) {}
    }

    #[test]
    fn initialize_failure_aborts_and_tool_stays_usable() {
        let mut tool = MeasurementTool::new();
        tool.register(FeatureImpl::Scanline(Box::new(Broken)));
        let err = tool
            .measure(&scenario_label(), None, &["Size", "Broken"], &[], 2)
            .unwrap_err();
        assert!(matches!(err, MeasureError::UnsupportedInput { .. }));
        // The failed run must not poison later runs.
        let table = tool
            .measure(&scenario_label(), None, &["Size"], &[], 2)
            .unwrap();
        assert_relative_eq!(table.feature("Size").unwrap().cell(1).unwrap()[0], 3.0);
    }

    #[test]
    fn empty_label_image_cannot_forge() {
        let label = LabelImage::new(&[3, 3]);
        let mut tool = MeasurementTool::new();
        let err = tool.measure(&label, None, &["Size"], &[], 2).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidArgument(_)));
    }

    #[test]
    fn one_dimensional_scanline_measurement() {
        let label = LabelImage::from_vec(&[6], vec![0, 1, 1, 0, 2, 2]).unwrap();
        let mut tool = MeasurementTool::new();
        let table = tool.measure(&label, None, &["Size", "Center"], &[], 1).unwrap();
        assert_relative_eq!(table.feature("Size").unwrap().cell(1).unwrap()[0], 2.0);
        assert_relative_eq!(table.feature("Center").unwrap().cell(2).unwrap()[0], 4.5);
    }
}
