//! labelmetrics — per-object measurement engine for labeled raster images.
//!
//! Given a labeled image (connected regions tagged with positive integer
//! identifiers, zero background) and optionally a co-registered intensity
//! image, compute a selected set of per-object quantities and return them in
//! a dense column-oriented table. The stages are:
//!
//! 1. **Resolve** – expand the requested features by composite dependencies.
//! 2. **Initialize** – each feature validates the images and declares its
//!    value columns; the table is forged.
//! 3. **Passes** – one scanline sweep, one boundary extraction feeding the
//!    chain-code and convex-hull features, whole-image features, then
//!    composites over the already-computed columns.
//! 4. **Paint** – optionally project a feature's values back onto the image.
//!
//! # Example
//!
//! ```
//! use labelmetrics::{LabelImage, MeasurementTool};
//!
//! let label = LabelImage::from_vec(&[3, 3], vec![0, 1, 1, 0, 1, 2, 2, 2, 0]).unwrap();
//! let mut tool = MeasurementTool::new();
//! let table = tool.measure(&label, None, &["Size"], &[], 2).unwrap();
//! assert_eq!(table.feature("Size").unwrap().cell(1).unwrap()[0], 3.0);
//! ```
//!
//! Feature implementations plug in through [`FeatureImpl`] and the five
//! traits it closes over; see the [`features`] module for the built-in
//! catalog.

pub mod boundary;
mod error;
mod feature;
pub mod features;
mod paint;
mod raster;
mod registry;
mod resolve;
mod table;
mod tool;
mod units;

pub use error::{MeasureError, MeasureResult};
pub use feature::{
    ChainCodeFeature, CompositeFeature, ConvexHullFeature, FeatureBase, FeatureImpl,
    FeatureInformation, FeatureKind, ObjectIndexMap, ScanlineFeature, ValueInformation,
    WholeImageFeature,
};
pub use paint::{object_to_measurement, object_to_measurement_into};
pub use raster::{IntensityImage, LabelImage, Raster, ScanLine, ScanLines};
pub use registry::FeatureRegistry;
pub use table::{
    Cell, Dependencies, FeatureColumnMut, FeatureInfo, FeatureView, Measurement, ObjectView,
};
pub use tool::MeasurementTool;
pub use units::Units;
