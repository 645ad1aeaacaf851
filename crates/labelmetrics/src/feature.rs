//! Measurement feature contracts.
//!
//! Five computation styles share a common lifecycle ([`FeatureBase`]) and are
//! closed over by [`FeatureImpl`], so the driver can partition a feature set
//! by style without introspection:
//!
//! 1. **Scanline** – accumulate per object over image lines.
//! 2. **Whole-image** – one call that fills the feature's table column.
//! 3. **Chain-code** – one call per object with its boundary chain code.
//! 4. **Convex-hull** – one call per object with its convex hull.
//! 5. **Composite** – one call per object over previously computed features.

use std::collections::HashMap;

use crate::boundary::{ChainCode, ConvexHull};
use crate::error::MeasureResult;
use crate::raster::{IntensityImage, LabelImage};
use crate::table::{Dependencies, FeatureColumnMut};
use crate::units::Units;

/// Map from object identifier to table row index, shared by the driver with
/// scanline features for the duration of one measurement.
pub type ObjectIndexMap = HashMap<u32, usize>;

/// Static description of a measurement feature.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeatureInformation {
    /// Name identifying the feature; byte-exact, case-sensitive.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// True if the feature needs an intensity image.
    pub needs_intensity: bool,
}

impl FeatureInformation {
    /// Convenience constructor.
    pub fn new(name: &str, description: &str, needs_intensity: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            needs_intensity,
        }
    }
}

/// Description of one value column a feature produces.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValueInformation {
    /// Short label identifying the value.
    pub name: String,
    /// Units of the value.
    pub units: Units,
}

impl ValueInformation {
    /// Convenience constructor.
    pub fn new(name: &str, units: Units) -> Self {
        Self {
            name: name.into(),
            units,
        }
    }
}

/// The computation style of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FeatureKind {
    /// Accumulates over image scanlines.
    Scanline,
    /// Computes from the whole images in one call.
    WholeImage,
    /// Computes from an object's boundary chain code.
    ChainCode,
    /// Computes from an object's convex hull.
    ConvexHull,
    /// Computes from the values of other features.
    Composite,
}

/// Lifecycle shared by all feature styles.
///
/// `initialize` must validate that the images satisfy the feature's
/// requirements (scalar label, real grey, dimensionality) and fail with
/// [`UnsupportedInput`](crate::MeasureError::UnsupportedInput) otherwise. It
/// declares the feature's value columns for this run and may cache per-run
/// state (pixel size, accumulators sized to `n_objects`). `cleanup` releases
/// all per-run state; the driver calls it even on failure paths.
pub trait FeatureBase {
    /// Static information about the feature.
    fn information(&self) -> FeatureInformation;

    /// Prepare for one measurement run; declare the value columns.
    fn initialize(
        &mut self,
        label: &LabelImage,
        grey: Option<&IntensityImage>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>>;

    /// Release per-run state.
    fn cleanup(&mut self);
}

/// Feature accumulating additive quantities line by line.
///
/// `scan_line` is called once per image scanline, never concurrently for one
/// instance; pixels arrive in ascending index order. Accumulators are indexed
/// by table row index via `object_index`; implementations cache the last
/// `(label, slot)` pair so runs of one label cost a single hash probe.
pub trait ScanlineFeature: FeatureBase {
    /// Accumulate one scanline.
    ///
    /// `labels` holds one sample per pixel; `grey`, when present, holds
    /// `tensor_len` samples per pixel. `coords` is the coordinate of the first
    /// pixel and `dimension` the dimension the line runs along.
    fn scan_line(
        &mut self,
        labels: &[u32],
        grey: Option<&[f64]>,
        coords: &[usize],
        dimension: usize,
        object_index: &ObjectIndexMap,
    );

    /// Write the final values for the object at `object_index` (row index).
    fn finish(&mut self, object_index: usize, output: &mut [f64]);
}

/// Feature computing all objects from the whole images in a single call.
pub trait WholeImageFeature: FeatureBase {
    /// Fill the feature's table column.
    fn measure(
        &mut self,
        label: &LabelImage,
        grey: Option<&IntensityImage>,
        output: &mut FeatureColumnMut<'_>,
    ) -> MeasureResult<()>;
}

/// Feature computed from one object's boundary chain code. 2-D only.
pub trait ChainCodeFeature: FeatureBase {
    /// Write the values for the chain code's object.
    fn measure(&mut self, chain: &ChainCode, output: &mut [f64]);
}

/// Feature computed from one object's convex hull. 2-D only.
pub trait ConvexHullFeature: FeatureBase {
    /// Write the values for the hull's object.
    fn measure(&mut self, hull: &ConvexHull, output: &mut [f64]);
}

/// Feature computed from the values of other features.
pub trait CompositeFeature: FeatureBase {
    /// Names of the features this one depends on. The driver computes them
    /// first and lays their columns out before this feature's.
    fn dependencies(&self) -> Vec<String>;

    /// Write the values for one object from its dependency cells.
    fn measure(&mut self, dependencies: &Dependencies<'_>, output: &mut [f64]);
}

/// A feature implementation of any style.
///
/// The closed sum carries the style tag; the driver partitions on it and the
/// registry owns the boxed instance for its whole lifetime.
pub enum FeatureImpl {
    /// See [`ScanlineFeature`].
    Scanline(Box<dyn ScanlineFeature>),
    /// See [`WholeImageFeature`].
    WholeImage(Box<dyn WholeImageFeature>),
    /// See [`ChainCodeFeature`].
    ChainCode(Box<dyn ChainCodeFeature>),
    /// See [`ConvexHullFeature`].
    ConvexHull(Box<dyn ConvexHullFeature>),
    /// See [`CompositeFeature`].
    Composite(Box<dyn CompositeFeature>),
}

impl FeatureImpl {
    /// The style tag.
    pub fn kind(&self) -> FeatureKind {
        match self {
            Self::Scanline(_) => FeatureKind::Scanline,
            Self::WholeImage(_) => FeatureKind::WholeImage,
            Self::ChainCode(_) => FeatureKind::ChainCode,
            Self::ConvexHull(_) => FeatureKind::ConvexHull,
            Self::Composite(_) => FeatureKind::Composite,
        }
    }

    /// Static information about the feature.
    pub fn information(&self) -> FeatureInformation {
        match self {
            Self::Scanline(f) => f.information(),
            Self::WholeImage(f) => f.information(),
            Self::ChainCode(f) => f.information(),
            Self::ConvexHull(f) => f.information(),
            Self::Composite(f) => f.information(),
        }
    }

    /// Dispatch [`FeatureBase::initialize`].
    pub fn initialize(
        &mut self,
        label: &LabelImage,
        grey: Option<&IntensityImage>,
        n_objects: usize,
    ) -> MeasureResult<Vec<ValueInformation>> {
        match self {
            Self::Scanline(f) => f.initialize(label, grey, n_objects),
            Self::WholeImage(f) => f.initialize(label, grey, n_objects),
            Self::ChainCode(f) => f.initialize(label, grey, n_objects),
            Self::ConvexHull(f) => f.initialize(label, grey, n_objects),
            Self::Composite(f) => f.initialize(label, grey, n_objects),
        }
    }

    /// Dispatch [`FeatureBase::cleanup`].
    pub fn cleanup(&mut self) {
        match self {
            Self::Scanline(f) => f.cleanup(),
            Self::WholeImage(f) => f.cleanup(),
            Self::ChainCode(f) => f.cleanup(),
            Self::ConvexHull(f) => f.cleanup(),
            Self::Composite(f) => f.cleanup(),
        }
    }
}

/// Validation helper: exactly two-dimensional label image.
pub(crate) fn require_2d(info: &FeatureInformation, label: &LabelImage) -> MeasureResult<()> {
    if label.dimensionality() != 2 {
        return Err(crate::MeasureError::unsupported(
            &info.name,
            format!(
                "requires a 2-dimensional label image, got {} dimensions",
                label.dimensionality()
            ),
        ));
    }
    Ok(())
}

/// Validation helper: scalar intensity image present.
pub(crate) fn require_scalar_grey<'a>(
    info: &FeatureInformation,
    grey: Option<&'a IntensityImage>,
) -> MeasureResult<&'a IntensityImage> {
    let grey = grey.ok_or_else(|| {
        crate::MeasureError::unsupported(&info.name, "requires an intensity image")
    })?;
    if !grey.is_scalar() {
        return Err(crate::MeasureError::unsupported(
            &info.name,
            "requires a scalar intensity image, got a tensor image",
        ));
    }
    Ok(grey)
}
