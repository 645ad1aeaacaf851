//! Built-in measurement features.
//!
//! The canonical catalog registered by
//! [`FeatureRegistry::default`](crate::FeatureRegistry): one or more features
//! per computation style, each small enough to double as a template for
//! external implementations.

mod center;
mod convex;
mod feret;
mod identifier;
mod mass;
mod mean;
mod perimeter;
mod roundness;
mod size;

pub use center::Center;
pub use convex::{ConvexArea, ConvexPerimeter};
pub use feret::Feret;
pub use identifier::Identifier;
pub use mass::Mass;
pub use mean::Mean;
pub use perimeter::Perimeter;
pub use roundness::Roundness;
pub use size::Size;

use crate::feature::FeatureImpl;
use crate::raster::LabelImage;

/// All built-in features, in registration order.
pub(crate) fn builtin_catalog() -> Vec<FeatureImpl> {
    vec![
        FeatureImpl::Scanline(Box::new(Size::default())),
        FeatureImpl::Scanline(Box::new(Mass::default())),
        FeatureImpl::Scanline(Box::new(Center::default())),
        FeatureImpl::WholeImage(Box::new(Identifier::default())),
        FeatureImpl::ChainCode(Box::new(Perimeter::default())),
        FeatureImpl::ChainCode(Box::new(Feret::default())),
        FeatureImpl::ConvexHull(Box::new(ConvexArea::default())),
        FeatureImpl::ConvexHull(Box::new(ConvexPerimeter::default())),
        FeatureImpl::Composite(Box::new(Mean::default())),
        FeatureImpl::Composite(Box::new(Roundness::default())),
    ]
}

/// Pixel size for isotropic scaling; anisotropic images fall back to pure
/// pixel units.
pub(crate) fn isotropic_scale(label: &LabelImage) -> f64 {
    if label.is_isotropic() {
        label.pixel_size()[0]
    } else {
        1.0
    }
}

/// Conventional name for a coordinate value column.
pub(crate) fn coordinate_name(dim: usize) -> String {
    match dim {
        0 => "x".into(),
        1 => "y".into(),
        2 => "z".into(),
        d => format!("dim{d}"),
    }
}
