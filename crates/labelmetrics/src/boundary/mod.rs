//! Object boundaries: chain-code extraction from labeled images.
//!
//! The measurement core consumes chain codes and convex hulls; this module
//! produces them. Boundaries are traced with Moore neighbor tracing over the
//! 4- or 8-neighborhood, matching the connectivity used during labeling.
//! Only the first boundary encountered in raster order is traced per object,
//! so objects that are not compact under the chosen connectivity yield the
//! boundary of their first component.

mod hull;

pub use hull::{ConvexHull, FeretDiameters};

use std::collections::{HashMap, HashSet};

use nalgebra::Point2;

use crate::error::{MeasureError, MeasureResult};
use crate::raster::LabelImage;

/// Step deltas for 8-connected chain codes, index = code.
const DELTAS_8: [(i64, i64); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Step deltas for 4-connected chain codes, index = code.
const DELTAS_4: [(i64, i64); 4] = [(1, 0), (0, -1), (-1, 0), (0, 1)];

/// One object's boundary as an ordered list of direction codes.
///
/// An empty code list means a single-pixel object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCode {
    /// Identifier of the traced object.
    pub object_id: u32,
    /// Coordinates of the start pixel (first in raster order).
    pub start: [usize; 2],
    /// Direction codes; indices into the 4- or 8-neighborhood delta table.
    pub codes: Vec<u8>,
    /// Neighborhood connectivity the codes refer to: 1 (4 directions) or
    /// 2 (8 directions).
    pub connectivity: usize,
}

impl ChainCode {
    /// True for a single-pixel object.
    pub fn is_point(&self) -> bool {
        self.codes.is_empty()
    }

    fn deltas(&self) -> &'static [(i64, i64)] {
        if self.connectivity == 1 {
            &DELTAS_4
        } else {
            &DELTAS_8
        }
    }

    /// Boundary pixel coordinates in trace order, starting pixel first.
    ///
    /// Pixels of thin structures can appear more than once.
    pub fn pixels(&self) -> Vec<[i64; 2]> {
        let deltas = self.deltas();
        let mut out = Vec::with_capacity(self.codes.len() + 1);
        let (mut x, mut y) = (self.start[0] as i64, self.start[1] as i64);
        out.push([x, y]);
        for &code in &self.codes {
            let (dx, dy) = deltas[code as usize];
            x += dx;
            y += dy;
            out.push([x, y]);
        }
        out
    }

    /// Corner-corrected boundary length in pixels.
    ///
    /// Cardinal steps weigh 0.980, diagonal steps 1.406, and each direction
    /// change discounts 0.091 (Vossepoel–Smeulders). A single-pixel object
    /// has length π.
    pub fn length(&self) -> f64 {
        if self.codes.is_empty() {
            return std::f64::consts::PI;
        }
        let diagonal = |code: u8| self.connectivity == 2 && code % 2 == 1;
        let mut even = 0usize;
        let mut odd = 0usize;
        let mut corners = 0usize;
        let mut previous = *self.codes.last().expect("non-empty");
        for &code in &self.codes {
            if diagonal(code) {
                odd += 1;
            } else {
                even += 1;
            }
            if code != previous {
                corners += 1;
            }
            previous = code;
        }
        0.980 * even as f64 + 1.406 * odd as f64 - 0.091 * corners as f64
    }

    /// The four unit-square corners of every boundary pixel.
    ///
    /// This is the point set the object's convex hull is built from; a
    /// single-pixel object yields its four corners.
    pub fn boundary_corners(&self) -> Vec<Point2<f64>> {
        let mut out = Vec::with_capacity(4 * (self.codes.len() + 1));
        for [x, y] in self.pixels() {
            let (x, y) = (x as f64, y as f64);
            out.push(Point2::new(x - 0.5, y - 0.5));
            out.push(Point2::new(x + 0.5, y - 0.5));
            out.push(Point2::new(x - 0.5, y + 0.5));
            out.push(Point2::new(x + 0.5, y + 0.5));
        }
        out
    }
}

/// Extract boundary chain codes for the requested objects of a 2-D labeled
/// image.
///
/// Identifiers that do not occur in the image are absent from the result.
/// `connectivity` is 1 (4-neighborhood) or 2 (8-neighborhood) and should
/// match the connectivity used when the image was labeled.
pub fn extract_chain_codes(
    label: &LabelImage,
    ids: &[u32],
    connectivity: usize,
) -> MeasureResult<HashMap<u32, ChainCode>> {
    if label.dimensionality() != 2 || !label.is_scalar() {
        return Err(MeasureError::invalid(format!(
            "chain codes require a scalar 2-dimensional label image, got {} dimensions",
            label.dimensionality()
        )));
    }
    if !(1..=2).contains(&connectivity) {
        return Err(MeasureError::invalid(format!(
            "connectivity must be 1 or 2 for chain codes, got {connectivity}"
        )));
    }
    let wanted: HashSet<u32> = ids.iter().copied().collect();
    let mut chains = HashMap::new();
    let (w, h) = (label.size(0), label.size(1));
    let data = label.data();
    for y in 0..h {
        for x in 0..w {
            let id = data[y * w + x];
            if id > 0 && wanted.contains(&id) && !chains.contains_key(&id) {
                chains.insert(id, trace_boundary(label, [x, y], id, connectivity));
            }
        }
    }
    Ok(chains)
}

/// Moore neighbor tracing from the object's first raster-order pixel.
///
/// The start pixel's west neighbor is guaranteed background, which seeds the
/// sweep; tracing stops when the start pixel is re-entered with the first
/// move's direction (Jacob's stopping criterion).
fn trace_boundary(
    label: &LabelImage,
    start: [usize; 2],
    id: u32,
    connectivity: usize,
) -> ChainCode {
    let deltas: &[(i64, i64)] = if connectivity == 1 {
        &DELTAS_4
    } else {
        &DELTAS_8
    };
    let n = deltas.len();
    let (w, h) = (label.size(0) as i64, label.size(1) as i64);
    let data = label.data();
    let is_object = |x: i64, y: i64| {
        x >= 0 && x < w && y >= 0 && y < h && data[(y * w + x) as usize] == id
    };
    let direction_to = |from: (i64, i64), to: (i64, i64)| {
        deltas
            .iter()
            .position(|&(dx, dy)| (from.0 + dx, from.1 + dy) == to)
            .expect("backtrack pixel is a neighbor")
    };

    let start_i = (start[0] as i64, start[1] as i64);
    let mut codes: Vec<u8> = Vec::new();
    let mut current = start_i;
    // Virtual arrival from the west background neighbor.
    let mut back_dir = direction_to(current, (current.0 - 1, current.1));
    let mut first_move: Option<u8> = None;
    let max_steps = 4 * label.num_pixels() + 4;

    while codes.len() <= max_steps {
        let mut moved = false;
        for k in 1..=n {
            let dir = (back_dir + k) % n;
            let (dx, dy) = deltas[dir];
            let next = (current.0 + dx, current.1 + dy);
            if !is_object(next.0, next.1) {
                continue;
            }
            if current == start_i && first_move == Some(dir as u8) {
                // Closed the boundary.
                return ChainCode {
                    object_id: id,
                    start,
                    codes,
                    connectivity,
                };
            }
            codes.push(dir as u8);
            first_move.get_or_insert(dir as u8);
            back_dir = direction_to(next, current);
            current = next;
            moved = true;
            break;
        }
        if !moved {
            // Isolated pixel.
            break;
        }
    }
    if codes.len() > max_steps {
        tracing::warn!(id, "boundary tracing did not close, truncating");
    }
    ChainCode {
        object_id: id,
        start,
        codes,
        connectivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_3x3_in_5x5() -> LabelImage {
        let mut data = vec![0u32; 25];
        for y in 1..4 {
            for x in 1..4 {
                data[y * 5 + x] = 1;
            }
        }
        LabelImage::from_vec(&[5, 5], data).unwrap()
    }

    #[test]
    fn single_pixel_is_point() {
        let mut data = vec![0u32; 9];
        data[4] = 7;
        let label = LabelImage::from_vec(&[3, 3], data).unwrap();
        let chains = extract_chain_codes(&label, &[7], 2).unwrap();
        let chain = &chains[&7];
        assert!(chain.is_point());
        assert_eq!(chain.start, [1, 1]);
        assert_relative_eq!(chain.length(), std::f64::consts::PI);
        assert_eq!(chain.boundary_corners().len(), 4);
    }

    #[test]
    fn square_boundary_closes() {
        let label = square_3x3_in_5x5();
        let chains = extract_chain_codes(&label, &[1], 2).unwrap();
        let chain = &chains[&1];
        assert_eq!(chain.start, [1, 1]);
        // 3x3 square: 8 boundary moves, all cardinal.
        assert_eq!(chain.codes.len(), 8);
        assert!(chain.codes.iter().all(|&c| c % 2 == 0));
        let pixels = chain.pixels();
        assert_eq!(pixels.first(), pixels.last());
        // Four direction changes around a square.
        assert_relative_eq!(chain.length(), 8.0 * 0.980 - 4.0 * 0.091);
    }

    #[test]
    fn square_boundary_4_connected() {
        let label = square_3x3_in_5x5();
        let chains = extract_chain_codes(&label, &[1], 1).unwrap();
        let chain = &chains[&1];
        assert_eq!(chain.connectivity, 1);
        assert_eq!(chain.codes.len(), 8);
        assert!(chain.codes.iter().all(|&c| c < 4));
    }

    #[test]
    fn diagonal_pair_connects_under_8_connectivity() {
        // Pixels (1,1) and (2,2): one object under connectivity 2.
        let mut data = vec![0u32; 16];
        data[5] = 3;
        data[10] = 3;
        let label = LabelImage::from_vec(&[4, 4], data).unwrap();
        let chains = extract_chain_codes(&label, &[3], 2).unwrap();
        let chain = &chains[&3];
        assert_eq!(chain.codes.len(), 2);
        assert!(chain.codes.iter().all(|&c| c % 2 == 1));
        // Under connectivity 1 only the first pixel is traced.
        let chains = extract_chain_codes(&label, &[3], 1).unwrap();
        assert!(chains[&3].is_point());
    }

    #[test]
    fn absent_ids_are_missing_not_errors() {
        let label = square_3x3_in_5x5();
        let chains = extract_chain_codes(&label, &[1, 99], 2).unwrap();
        assert!(chains.contains_key(&1));
        assert!(!chains.contains_key(&99));
    }

    #[test]
    fn input_validation() {
        let label = LabelImage::new(&[4]);
        assert!(extract_chain_codes(&label, &[1], 2).is_err());
        let label = square_3x3_in_5x5();
        assert!(extract_chain_codes(&label, &[1], 3).is_err());
        assert!(extract_chain_codes(&label, &[1], 0).is_err());
    }

    #[test]
    fn two_pixel_bar_goes_there_and_back() {
        let mut data = vec![0u32; 12];
        data[1] = 2;
        data[2] = 2;
        let label = LabelImage::from_vec(&[4, 3], data).unwrap();
        let chain = &extract_chain_codes(&label, &[2], 2).unwrap()[&2];
        assert_eq!(chain.codes, vec![0, 4]);
    }
}
