//! Column-oriented measurement table with build-then-freeze lifecycle.
//!
//! A newly constructed [`Measurement`] accepts [`add_feature`] and
//! [`add_object_ids`] in any order. [`forge`] then allocates the dense value
//! buffer; after that the schema is frozen and only the cell values remain
//! writable (by the measurement driver).
//!
//! The table is indexed two ways: a [`FeatureView`] addresses one column
//! group and yields a [`Cell`] per object, an [`ObjectView`] addresses one
//! row and yields the same cell per feature name. Both views can be advanced
//! to their sibling column group / row.
//!
//! [`add_feature`]: Measurement::add_feature
//! [`add_object_ids`]: Measurement::add_object_ids
//! [`forge`]: Measurement::forge

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use crate::error::{MeasureError, MeasureResult};
use crate::feature::ValueInformation;

/// Location of one feature's column group inside a [`Measurement`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FeatureInfo {
    /// Feature name.
    pub name: String,
    /// Index of the feature's first value column.
    pub start_column: usize,
    /// Number of contiguous value columns.
    pub number_values: usize,
}

/// Per-object measurement results in a dense row-major table.
///
/// Rows are objects (insertion order), columns are grouped by feature
/// (insertion order); the row stride is the total value-column count.
#[derive(Debug, Clone, Default)]
pub struct Measurement {
    objects: Vec<u32>,
    object_indices: HashMap<u32, usize>,
    features: Vec<FeatureInfo>,
    feature_indices: HashMap<String, usize>,
    values: Vec<ValueInformation>,
    data: Vec<f64>,
}

impl Measurement {
    /// Empty, mutable table.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once [`forge`](Self::forge) has allocated the value buffer.
    pub fn is_forged(&self) -> bool {
        !self.data.is_empty()
    }

    /// Add a feature column group to a non-forged table.
    pub fn add_feature(&mut self, name: &str, values: Vec<ValueInformation>) -> MeasureResult<()> {
        if self.is_forged() {
            return Err(MeasureError::AlreadyForged);
        }
        if name.is_empty() {
            return Err(MeasureError::invalid("no feature name given"));
        }
        if values.is_empty() {
            return Err(MeasureError::invalid("a feature needs at least one value"));
        }
        if self.feature_exists(name) {
            return Err(MeasureError::DuplicateFeature { name: name.into() });
        }
        self.push_feature(name, values);
        Ok(())
    }

    /// Like [`add_feature`](Self::add_feature), but a name collision is a
    /// silent no-op.
    pub fn ensure_feature(
        &mut self,
        name: &str,
        values: Vec<ValueInformation>,
    ) -> MeasureResult<()> {
        if self.is_forged() {
            return Err(MeasureError::AlreadyForged);
        }
        if name.is_empty() {
            return Err(MeasureError::invalid("no feature name given"));
        }
        if self.feature_exists(name) {
            return Ok(());
        }
        if values.is_empty() {
            return Err(MeasureError::invalid("a feature needs at least one value"));
        }
        self.push_feature(name, values);
        Ok(())
    }

    fn push_feature(&mut self, name: &str, values: Vec<ValueInformation>) {
        let start_column = self.values.len();
        let number_values = values.len();
        self.values.extend(values);
        self.feature_indices
            .insert(name.to_string(), self.features.len());
        self.features.push(FeatureInfo {
            name: name.to_string(),
            start_column,
            number_values,
        });
    }

    /// Append object rows to a non-forged table.
    pub fn add_object_ids(&mut self, ids: &[u32]) -> MeasureResult<()> {
        if self.is_forged() {
            return Err(MeasureError::AlreadyForged);
        }
        for &id in ids {
            if self.object_exists(id) {
                return Err(MeasureError::DuplicateObject { id });
            }
            self.object_indices.insert(id, self.objects.len());
            self.objects.push(id);
        }
        Ok(())
    }

    /// Allocate the zero-initialized value buffer. Idempotent.
    pub fn forge(&mut self) -> MeasureResult<()> {
        if !self.is_forged() {
            let n = self.values.len() * self.objects.len();
            if n == 0 {
                return Err(MeasureError::invalid("attempting to forge a zero-sized table"));
            }
            self.data = vec![0.0; n];
        }
        Ok(())
    }

    // ── raw access ─────────────────────────────────────────────────────────

    /// Raw table values; all values for one object are contiguous.
    pub fn data(&self) -> MeasureResult<&[f64]> {
        if !self.is_forged() {
            return Err(MeasureError::NotForged);
        }
        Ok(&self.data)
    }

    /// Mutable raw table values.
    pub fn data_mut(&mut self) -> MeasureResult<&mut [f64]> {
        if !self.is_forged() {
            return Err(MeasureError::NotForged);
        }
        Ok(&mut self.data)
    }

    /// Row stride: the total number of value columns.
    pub fn stride(&self) -> usize {
        self.values.len()
    }

    // ── feature lookup ─────────────────────────────────────────────────────

    /// True if a feature with this name is present.
    pub fn feature_exists(&self, name: &str) -> bool {
        self.feature_indices.contains_key(name)
    }

    /// Index of the feature with this name.
    pub fn feature_index(&self, name: &str) -> MeasureResult<usize> {
        self.feature_indices
            .get(name)
            .copied()
            .ok_or_else(|| MeasureError::UnknownFeature { name: name.into() })
    }

    /// Column groups, in feature insertion order.
    pub fn features(&self) -> &[FeatureInfo] {
        &self.features
    }

    /// Number of features.
    pub fn number_of_features(&self) -> usize {
        self.features.len()
    }

    /// Column index of the feature's first value.
    pub fn value_index(&self, name: &str) -> MeasureResult<usize> {
        Ok(self.features[self.feature_index(name)?].start_column)
    }

    /// Name and units for every value column, in column order.
    pub fn value_information(&self) -> &[ValueInformation] {
        &self.values
    }

    /// Name and units for the feature's value columns (copied out).
    pub fn feature_value_information(
        &self,
        name: &str,
    ) -> MeasureResult<Vec<ValueInformation>> {
        let info = &self.features[self.feature_index(name)?];
        Ok(self.values[info.start_column..info.start_column + info.number_values].to_vec())
    }

    /// Total number of value columns.
    pub fn number_of_values(&self) -> usize {
        self.values.len()
    }

    /// Number of value columns of one feature.
    pub fn feature_number_of_values(&self, name: &str) -> MeasureResult<usize> {
        Ok(self.features[self.feature_index(name)?].number_values)
    }

    // ── object lookup ──────────────────────────────────────────────────────

    /// True if a row for this object identifier is present.
    pub fn object_exists(&self, id: u32) -> bool {
        self.object_indices.contains_key(&id)
    }

    /// Row index of this object identifier.
    pub fn object_index(&self, id: u32) -> MeasureResult<usize> {
        self.object_indices
            .get(&id)
            .copied()
            .ok_or(MeasureError::UnknownObject { id })
    }

    /// Object identifiers in row order.
    pub fn objects(&self) -> &[u32] {
        &self.objects
    }

    /// Number of object rows.
    pub fn number_of_objects(&self) -> usize {
        self.objects.len()
    }

    /// The identifier→row-index map (shared with scanline features).
    pub fn object_index_map(&self) -> &HashMap<u32, usize> {
        &self.object_indices
    }

    // ── views ──────────────────────────────────────────────────────────────

    /// View over the first feature column group.
    pub fn first_feature(&self) -> MeasureResult<FeatureView<'_>> {
        if !self.is_forged() {
            return Err(MeasureError::NotForged);
        }
        Ok(FeatureView {
            meas: self,
            index: 0,
        })
    }

    /// View over the named feature column group.
    pub fn feature(&self, name: &str) -> MeasureResult<FeatureView<'_>> {
        if !self.is_forged() {
            return Err(MeasureError::NotForged);
        }
        Ok(FeatureView {
            meas: self,
            index: self.feature_index(name)?,
        })
    }

    /// View over the first object row.
    pub fn first_object(&self) -> MeasureResult<ObjectView<'_>> {
        if !self.is_forged() {
            return Err(MeasureError::NotForged);
        }
        Ok(ObjectView {
            meas: self,
            index: 0,
        })
    }

    /// View over the row of the given object identifier.
    pub fn object(&self, id: u32) -> MeasureResult<ObjectView<'_>> {
        if !self.is_forged() {
            return Err(MeasureError::NotForged);
        }
        Ok(ObjectView {
            meas: self,
            index: self.object_index(id)?,
        })
    }

    // ── driver-side mutation ───────────────────────────────────────────────

    fn cell_range(&self, row: usize, feature_index: usize) -> std::ops::Range<usize> {
        let info = &self.features[feature_index];
        let start = row * self.stride() + info.start_column;
        start..start + info.number_values
    }

    /// Writable cell of one feature for one row. Table must be forged.
    pub(crate) fn cell_mut(&mut self, row: usize, feature_index: usize) -> &mut [f64] {
        debug_assert!(self.is_forged());
        let range = self.cell_range(row, feature_index);
        &mut self.data[range]
    }

    /// Split one row at a feature's start column: the columns laid out before
    /// the feature (shared) and the feature's own writable cell.
    pub(crate) fn split_row_mut(
        &mut self,
        row: usize,
        feature_index: usize,
    ) -> (Dependencies<'_>, &mut [f64]) {
        debug_assert!(self.is_forged());
        let info = &self.features[feature_index];
        let number_values = info.number_values;
        let row_start = row * self.values.len();
        let split = row_start + info.start_column;
        let (head, tail) = self.data.split_at_mut(split);
        (
            Dependencies {
                features: &self.features,
                feature_indices: &self.feature_indices,
                row: &head[row_start..],
                object_id: self.objects[row],
            },
            &mut tail[..number_values],
        )
    }

    /// Writable column view for a whole-image feature.
    pub(crate) fn feature_column_mut(&mut self, feature_index: usize) -> FeatureColumnMut<'_> {
        debug_assert!(self.is_forged());
        FeatureColumnMut {
            meas: self,
            index: feature_index,
        }
    }
}

// ── cells and read views ───────────────────────────────────────────────────

/// The contiguous block of values produced by one feature for one object.
///
/// Dereferences to `&[f64]`.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    values: &'a [f64],
    name: &'a str,
    object_id: u32,
}

impl<'a> Cell<'a> {
    /// Name of the feature this cell belongs to.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Identifier of the object this cell belongs to.
    pub fn object_id(&self) -> u32 {
        self.object_id
    }

    /// The cell values.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }
}

impl Deref for Cell<'_> {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        self.values
    }
}

/// View over one feature column group; yields a [`Cell`] per object.
#[derive(Debug, Clone, Copy)]
pub struct FeatureView<'a> {
    meas: &'a Measurement,
    index: usize,
}

impl<'a> FeatureView<'a> {
    fn info(&self) -> &'a FeatureInfo {
        &self.meas.features[self.index]
    }

    /// Feature name.
    pub fn name(&self) -> &'a str {
        &self.info().name
    }

    /// Number of value columns in this group.
    pub fn number_values(&self) -> usize {
        self.info().number_values
    }

    /// Number of object rows.
    pub fn number_of_objects(&self) -> usize {
        self.meas.number_of_objects()
    }

    /// Object identifiers in row order.
    pub fn objects(&self) -> &'a [u32] {
        self.meas.objects()
    }

    /// True if the view's table has a row for this identifier.
    pub fn contains(&self, id: u32) -> bool {
        self.meas.object_exists(id)
    }

    fn cell_at(&self, row: usize) -> Cell<'a> {
        let range = self.meas.cell_range(row, self.index);
        Cell {
            values: &self.meas.data[range],
            name: &self.info().name,
            object_id: self.meas.objects[row],
        }
    }

    /// Cell of the given object.
    pub fn cell(&self, id: u32) -> MeasureResult<Cell<'a>> {
        Ok(self.cell_at(self.meas.object_index(id)?))
    }

    /// Iterate over this feature's cells in row order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'a>> + '_ {
        let view = *self;
        (0..self.meas.number_of_objects()).map(move |row| view.cell_at(row))
    }

    /// Step to the next feature column group.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// True once the view has stepped past the last feature.
    pub fn is_at_end(&self) -> bool {
        self.index >= self.meas.number_of_features()
    }
}

/// View over one object row; yields a [`Cell`] per feature.
#[derive(Debug, Clone, Copy)]
pub struct ObjectView<'a> {
    meas: &'a Measurement,
    index: usize,
}

impl<'a> ObjectView<'a> {
    /// Identifier of this row's object.
    pub fn object_id(&self) -> u32 {
        self.meas.objects[self.index]
    }

    /// Number of features in the table.
    pub fn number_of_features(&self) -> usize {
        self.meas.number_of_features()
    }

    fn cell_at(&self, feature_index: usize) -> Cell<'a> {
        let range = self.meas.cell_range(self.index, feature_index);
        Cell {
            values: &self.meas.data[range],
            name: &self.meas.features[feature_index].name,
            object_id: self.object_id(),
        }
    }

    /// Cell of the named feature.
    pub fn cell(&self, name: &str) -> MeasureResult<Cell<'a>> {
        Ok(self.cell_at(self.meas.feature_index(name)?))
    }

    /// Iterate over this row's cells in feature order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'a>> + '_ {
        let view = *self;
        (0..self.meas.number_of_features()).map(move |i| view.cell_at(i))
    }

    /// Step to the next object row.
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// True once the view has stepped past the last row.
    pub fn is_at_end(&self) -> bool {
        self.index >= self.meas.number_of_objects()
    }
}

// ── driver-side write views ────────────────────────────────────────────────

/// Writable view over one feature column group, handed to whole-image
/// features so they can fill their column directly.
pub struct FeatureColumnMut<'a> {
    meas: &'a mut Measurement,
    index: usize,
}

impl FeatureColumnMut<'_> {
    /// Feature name.
    pub fn name(&self) -> &str {
        &self.meas.features[self.index].name
    }

    /// Number of value columns in this group.
    pub fn number_values(&self) -> usize {
        self.meas.features[self.index].number_values
    }

    /// Number of object rows.
    pub fn number_of_objects(&self) -> usize {
        self.meas.number_of_objects()
    }

    /// Object identifier of the given row.
    pub fn object_id(&self, row: usize) -> u32 {
        self.meas.objects[row]
    }

    /// Writable cell of the given row.
    pub fn cell_mut(&mut self, row: usize) -> &mut [f64] {
        self.meas.cell_mut(row, self.index)
    }

    /// Writable cell of the given object identifier.
    pub fn cell_for_mut(&mut self, id: u32) -> MeasureResult<&mut [f64]> {
        let row = self.meas.object_index(id)?;
        Ok(self.meas.cell_mut(row, self.index))
    }
}

/// Read view over the columns of one object row that were laid out before a
/// composite feature. Handed to composite features; dependency ordering
/// guarantees every declared dependency is addressable.
pub struct Dependencies<'a> {
    features: &'a [FeatureInfo],
    feature_indices: &'a HashMap<String, usize>,
    row: &'a [f64],
    object_id: u32,
}

impl<'a> Dependencies<'a> {
    /// Identifier of the object whose row this is.
    pub fn object_id(&self) -> u32 {
        self.object_id
    }

    /// Cell values of the named feature for this object.
    pub fn cell(&self, name: &str) -> MeasureResult<&'a [f64]> {
        let index = self
            .feature_indices
            .get(name)
            .copied()
            .ok_or_else(|| MeasureError::UnknownFeature { name: name.into() })?;
        let info = &self.features[index];
        if info.start_column + info.number_values > self.row.len() {
            return Err(MeasureError::UnknownFeature { name: name.into() });
        }
        Ok(&self.row[info.start_column..info.start_column + info.number_values])
    }
}

// ── textual stream-out ─────────────────────────────────────────────────────

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_forged() {
            return writeln!(
                f,
                "measurement table (not forged): {} features, {} objects",
                self.features.len(),
                self.objects.len()
            );
        }
        let widths: Vec<usize> = self
            .values
            .iter()
            .map(|v| v.name.len().max(v.units.to_string().len()).max(10))
            .collect();
        let group_width = |info: &FeatureInfo| -> usize {
            widths[info.start_column..info.start_column + info.number_values]
                .iter()
                .sum::<usize>()
                + (info.number_values - 1)
        };

        write!(f, "{:>8} |", "")?;
        for info in &self.features {
            write!(f, " {:^1$} |", info.name, group_width(info))?;
        }
        writeln!(f)?;

        write!(f, "{:>8} |", "ID")?;
        for info in &self.features {
            for (k, &w) in widths[info.start_column..info.start_column + info.number_values]
                .iter()
                .enumerate()
            {
                write!(f, " {:^w$}", self.values[info.start_column + k].name, w = w)?;
            }
            write!(f, " |")?;
        }
        writeln!(f)?;

        write!(f, "{:>8} |", "")?;
        for info in &self.features {
            for (k, &w) in widths[info.start_column..info.start_column + info.number_values]
                .iter()
                .enumerate()
            {
                write!(
                    f,
                    " {:^w$}",
                    self.values[info.start_column + k].units.to_string(),
                    w = w
                )?;
            }
            write!(f, " |")?;
        }
        writeln!(f)?;

        let total: usize = 10 + self
            .features
            .iter()
            .map(|i| group_width(i) + 4)
            .sum::<usize>();
        writeln!(f, "{:-<total$}", "")?;

        for (row, &id) in self.objects.iter().enumerate() {
            write!(f, "{id:>8} |")?;
            for (fi, info) in self.features.iter().enumerate() {
                let range = self.cell_range(row, fi);
                for (k, &v) in self.data[range].iter().enumerate() {
                    write!(f, " {:>w$.4}", v, w = widths[info.start_column + k])?;
                }
                write!(f, " |")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Units;

    fn value(name: &str) -> ValueInformation {
        ValueInformation {
            name: name.into(),
            units: Units::Pixels(1),
        }
    }

    fn forged_two_by_two() -> Measurement {
        let mut m = Measurement::new();
        m.add_feature("A", vec![value("a")]).unwrap();
        m.add_feature("B", vec![value("b0"), value("b1")]).unwrap();
        m.add_object_ids(&[5, 9]).unwrap();
        m.forge().unwrap();
        m
    }

    #[test]
    fn forge_freezes_schema() {
        let mut m = forged_two_by_two();
        assert!(matches!(
            m.add_feature("C", vec![value("c")]),
            Err(MeasureError::AlreadyForged)
        ));
        assert!(matches!(
            m.add_object_ids(&[11]),
            Err(MeasureError::AlreadyForged)
        ));
        // forge is idempotent
        m.forge().unwrap();
        assert_eq!(m.data().unwrap().len(), 6);
    }

    #[test]
    fn forge_rejects_zero_sized_table() {
        let mut m = Measurement::new();
        m.add_object_ids(&[1]).unwrap();
        assert!(m.forge().is_err());
        let mut m = Measurement::new();
        m.add_feature("A", vec![value("a")]).unwrap();
        assert!(m.forge().is_err());
    }

    #[test]
    fn schema_insertion_conflicts() {
        let mut m = Measurement::new();
        m.add_feature("A", vec![value("a")]).unwrap();
        assert!(matches!(
            m.add_feature("A", vec![value("a")]),
            Err(MeasureError::DuplicateFeature { .. })
        ));
        assert!(m.add_feature("", vec![value("a")]).is_err());
        assert!(m.add_feature("B", vec![]).is_err());
        m.add_object_ids(&[3]).unwrap();
        assert!(matches!(
            m.add_object_ids(&[3]),
            Err(MeasureError::DuplicateObject { id: 3 })
        ));
    }

    #[test]
    fn ensure_feature_is_noop_on_collision() {
        let mut m = Measurement::new();
        m.add_feature("A", vec![value("a")]).unwrap();
        m.ensure_feature("A", vec![value("x"), value("y")]).unwrap();
        assert_eq!(m.feature_number_of_values("A").unwrap(), 1);
        m.ensure_feature("B", vec![value("b")]).unwrap();
        assert_eq!(m.number_of_features(), 2);
    }

    #[test]
    fn layout_stride_and_start_columns() {
        let m = forged_two_by_two();
        assert_eq!(m.stride(), 3);
        assert_eq!(
            m.stride(),
            m.features().iter().map(|f| f.number_values).sum::<usize>()
        );
        assert_eq!(m.value_index("A").unwrap(), 0);
        assert_eq!(m.value_index("B").unwrap(), 1);
        assert_eq!(m.number_of_values(), 3);
        assert_eq!(m.feature_value_information("B").unwrap().len(), 2);
    }

    #[test]
    fn data_access_requires_forge() {
        let mut m = Measurement::new();
        m.add_feature("A", vec![value("a")]).unwrap();
        m.add_object_ids(&[1]).unwrap();
        assert!(matches!(m.data(), Err(MeasureError::NotForged)));
        assert!(matches!(m.first_feature(), Err(MeasureError::NotForged)));
        assert!(matches!(m.object(1), Err(MeasureError::NotForged)));
        m.forge().unwrap();
        assert!(m.data().is_ok());
        assert!(m.first_feature().is_ok());
    }

    #[test]
    fn view_duality() {
        let mut m = forged_two_by_two();
        for (i, v) in m.data_mut().unwrap().iter_mut().enumerate() {
            *v = i as f64;
        }
        for &id in &[5u32, 9] {
            for name in ["A", "B"] {
                let by_feature = m.feature(name).unwrap().cell(id).unwrap();
                let by_object = m.object(id).unwrap().cell(name).unwrap();
                assert_eq!(by_feature.values(), by_object.values());
                assert_eq!(by_feature.object_id(), id);
                assert_eq!(by_object.name(), name);
            }
        }
        // Both routes address the raw buffer.
        let cell = m.feature("B").unwrap().cell(9).unwrap();
        let row = m.object_index(9).unwrap();
        let start = row * m.stride() + m.value_index("B").unwrap();
        assert_eq!(cell.values(), &m.data().unwrap()[start..start + 2]);
    }

    #[test]
    fn view_stepping() {
        let m = forged_two_by_two();
        let mut fv = m.first_feature().unwrap();
        assert_eq!(fv.name(), "A");
        fv.advance();
        assert_eq!(fv.name(), "B");
        assert!(!fv.is_at_end());
        fv.advance();
        assert!(fv.is_at_end());

        let mut ov = m.first_object().unwrap();
        assert_eq!(ov.object_id(), 5);
        ov.advance();
        assert_eq!(ov.object_id(), 9);
        ov.advance();
        assert!(ov.is_at_end());
    }

    #[test]
    fn cell_iteration() {
        let mut m = forged_two_by_two();
        for (i, v) in m.data_mut().unwrap().iter_mut().enumerate() {
            *v = i as f64;
        }
        let fv = m.feature("B").unwrap();
        let cells: Vec<_> = fv.cells().collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].values(), &[1.0, 2.0]);
        assert_eq!(cells[1].values(), &[4.0, 5.0]);
        let total: usize = m.object(5).unwrap().cells().map(|c| c.len()).sum();
        assert_eq!(total, m.stride());
    }

    #[test]
    fn lookup_misses() {
        let m = forged_two_by_two();
        assert!(matches!(
            m.feature_index("Nope"),
            Err(MeasureError::UnknownFeature { .. })
        ));
        assert!(matches!(
            m.object_index(42),
            Err(MeasureError::UnknownObject { id: 42 })
        ));
        assert!(m.feature_value_information("Nope").is_err());
        assert!(m.feature("Nope").is_err());
        assert!(m.object(42).is_err());
    }

    #[test]
    fn split_row_exposes_earlier_columns_only() {
        let mut m = forged_two_by_two();
        for (i, v) in m.data_mut().unwrap().iter_mut().enumerate() {
            *v = i as f64;
        }
        let b = m.feature_index("B").unwrap();
        let (deps, out) = m.split_row_mut(1, b);
        assert_eq!(deps.object_id(), 9);
        assert_eq!(deps.cell("A").unwrap(), &[3.0]);
        assert!(deps.cell("B").is_err());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn stream_out_contains_headers_and_rows() {
        let mut m = forged_two_by_two();
        m.data_mut().unwrap()[0] = 3.5;
        let text = m.to_string();
        assert!(text.contains("A"));
        assert!(text.contains("b1"));
        assert!(text.contains("px"));
        assert!(text.contains("3.5"));
        assert!(text.lines().count() >= 6);
    }
}
