//! Dependency resolution for composite features.
//!
//! Expands a requested feature list so that every composite feature's
//! dependencies appear strictly before it, transitively. The expansion order
//! is both the column order of the result table and the order features are
//! initialized and finished in.

use crate::error::{MeasureError, MeasureResult};
use crate::feature::FeatureImpl;
use crate::registry::FeatureRegistry;

/// Expand `requested` into resolved registry indices, dependencies first.
pub(crate) fn resolve(
    registry: &FeatureRegistry,
    requested: &[String],
) -> MeasureResult<Vec<usize>> {
    let mut resolved: Vec<usize> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    for name in requested {
        visit(registry, name, &mut resolved, &mut open)?;
    }
    Ok(resolved)
}

fn visit(
    registry: &FeatureRegistry,
    name: &str,
    resolved: &mut Vec<usize>,
    open: &mut Vec<usize>,
) -> MeasureResult<()> {
    let index = registry.index(name)?;
    if resolved.contains(&index) {
        return Ok(());
    }
    if open.contains(&index) {
        return Err(MeasureError::CyclicDependency { name: name.into() });
    }
    if let FeatureImpl::Composite(feature) = registry.get(index) {
        open.push(index);
        for dependency in feature.dependencies() {
            visit(registry, &dependency, resolved, open)?;
        }
        open.pop();
    }
    resolved.push(index);
    Ok(())
}
