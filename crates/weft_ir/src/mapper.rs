//! Structural type mapping.
//!
//! A [`TypeMapper`] relates the flattened forms of two types through a
//! [`MappingMatrix`]: rows index the A-side flattened list, columns the
//! B-side list, and a non-zero cell means those two entries carry the
//! same wires. Registration order is preserved in the cell values so the
//! backends can concatenate multiple contributors deterministically.

use crate::design::Design;
use crate::flatten::{flatten, list_to_string, FlatType};
use crate::ids::{NodeId, TypeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use weft_common::{Error, Result};

/// A height x width matrix of registration orders. Zero means unmapped;
/// a non-zero cell holds the order in which the mapping was registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingMatrix {
    height: usize,
    width: usize,
    elements: Vec<usize>,
}

impl MappingMatrix {
    /// Creates an all-zero matrix.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            elements: vec![0; height * width],
        }
    }

    /// Creates a square matrix with the diagonal set 1, 2, 3, ...
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::new(dim, dim);
        for i in 0..dim {
            m.elements[i * dim + i] = i + 1;
        }
        m
    }

    /// The number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    fn bounds_check(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.height || col >= self.width {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                height: self.height,
                width: self.width,
            });
        }
        Ok(())
    }

    /// Returns the cell at (row, col).
    pub fn get(&self, row: usize, col: usize) -> Result<usize> {
        self.bounds_check(row, col)?;
        Ok(self.elements[row * self.width + col])
    }

    /// The largest value in a row.
    pub fn max_of_row(&self, row: usize) -> usize {
        (0..self.width)
            .map(|c| self.elements[row * self.width + c])
            .max()
            .unwrap_or(0)
    }

    /// The largest value in a column.
    pub fn max_of_col(&self, col: usize) -> usize {
        (0..self.height)
            .map(|r| self.elements[r * self.width + col])
            .max()
            .unwrap_or(0)
    }

    fn count_nonzero_in_row(&self, row: usize) -> usize {
        (0..self.width)
            .filter(|&c| self.elements[row * self.width + c] != 0)
            .count()
    }

    fn count_nonzero_in_col(&self, col: usize) -> usize {
        (0..self.height)
            .filter(|&r| self.elements[r * self.width + col] != 0)
            .count()
    }

    /// Whether setting (row, col) would leave some cell belonging to
    /// both a row group and a column group.
    fn would_cross(&self, row: usize, col: usize) -> bool {
        let rn = self.count_nonzero_in_row(row);
        let cn = self.count_nonzero_in_col(col);
        if rn > 0 && cn > 0 {
            return true;
        }
        // Extending a column: cells already in it must not sit in a
        // multi-cell row, and vice versa.
        if cn > 0
            && (0..self.height).any(|r| {
                self.elements[r * self.width + col] != 0 && self.count_nonzero_in_row(r) > 1
            })
        {
            return true;
        }
        if rn > 0
            && (0..self.width).any(|c| {
                self.elements[row * self.width + c] != 0 && self.count_nonzero_in_col(c) > 1
            })
        {
            return true;
        }
        false
    }

    /// Marks (row, col) with the next order value for its row and column:
    /// one past the largest value already present in either.
    pub fn set_next(&mut self, row: usize, col: usize) -> Result<()> {
        self.bounds_check(row, col)?;
        let next = self.max_of_row(row).max(self.max_of_col(col)) + 1;
        self.elements[row * self.width + col] = next;
        Ok(())
    }

    /// The non-zero cells of a row as (column, order), sorted by order.
    pub fn mapping_row(&self, row: usize) -> Vec<(usize, usize)> {
        let mut cells: Vec<(usize, usize)> = (0..self.width)
            .filter_map(|c| {
                let v = self.elements[row * self.width + c];
                (v != 0).then_some((c, v))
            })
            .collect();
        cells.sort_by_key(|&(_, v)| v);
        cells
    }

    /// The non-zero cells of a column as (row, order), sorted by order.
    pub fn mapping_col(&self, col: usize) -> Vec<(usize, usize)> {
        let mut cells: Vec<(usize, usize)> = (0..self.height)
            .filter_map(|r| {
                let v = self.elements[r * self.width + col];
                (v != 0).then_some((r, v))
            })
            .collect();
        cells.sort_by_key(|&(_, v)| v);
        cells
    }

    /// Returns the matrix with rows and columns swapped.
    pub fn transpose(&self) -> Self {
        let mut t = Self::new(self.width, self.height);
        for r in 0..self.height {
            for c in 0..self.width {
                t.elements[c * self.height + r] = self.elements[r * self.width + c];
            }
        }
        t
    }
}

/// One side of a [`MappingPair`]: a flattened-list index and its entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSide {
    /// Index into the flattened list of this side's type.
    pub index: usize,
    /// The flattened entry at that index.
    pub flat: FlatType,
}

/// A group of A-side and B-side flattened entries that carry the same
/// wires. Exactly one side has a single entry; the other side's entries
/// concatenate onto it in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingPair {
    /// The A-side entries, in concatenation order.
    pub a: Vec<MapSide>,
    /// The B-side entries, in concatenation order.
    pub b: Vec<MapSide>,
}

impl MappingPair {
    /// The number of A-side entries.
    pub fn num_a(&self) -> usize {
        self.a.len()
    }

    /// The number of B-side entries.
    pub fn num_b(&self) -> usize {
        self.b.len()
    }

    fn side_width(
        side: &[MapSide],
        design: &mut Design,
        no_width: NodeId,
    ) -> NodeId {
        let mut total = design.int_literal(0);
        for entry in side {
            let w = design.type_width(entry.flat.ty).unwrap_or(no_width);
            total = design.add_nodes(total, w);
        }
        total
    }

    /// The summed width of the A side, substituting `no_width` for
    /// entries without one.
    pub fn width_a(&self, design: &mut Design, no_width: NodeId) -> NodeId {
        Self::side_width(&self.a, design, no_width)
    }

    /// The summed width of the B side, substituting `no_width` for
    /// entries without one.
    pub fn width_b(&self, design: &mut Design, no_width: NodeId) -> NodeId {
        Self::side_width(&self.b, design, no_width)
    }
}

/// Relates the flattened forms of two types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeMapper {
    name: String,
    a: TypeId,
    b: TypeId,
    fa: Vec<FlatType>,
    fb: Vec<FlatType>,
    matrix: MappingMatrix,
}

impl TypeMapper {
    /// Creates an empty mapper between two types. Mappings are added
    /// with [`TypeMapper::add`].
    pub fn new(design: &Design, a: TypeId, b: TypeId) -> Result<Self> {
        let fa = flatten(design, a)?;
        let fb = flatten(design, b)?;
        Ok(Self {
            name: format!(
                "{}_to_{}",
                design.types[a].name, design.types[b].name
            ),
            a,
            b,
            matrix: MappingMatrix::new(fa.len(), fb.len()),
            fa,
            fb,
        })
    }

    /// The identity mapper of a type onto itself.
    pub fn identity(design: &Design, ty: TypeId) -> Result<Self> {
        let mut m = Self::new(design, ty, ty)?;
        m.matrix = MappingMatrix::identity(m.fa.len());
        Ok(m)
    }

    /// Synthesizes the 1:1 mapper between two structurally equal types.
    /// Fails if their flattened lists have different lengths.
    pub fn implicit(design: &Design, a: TypeId, b: TypeId) -> Result<Self> {
        let mut m = Self::new(design, a, b)?;
        if m.fa.len() != m.fb.len() {
            return Err(Error::InconsistentMapping {
                a: design.type_label(a),
                b: design.type_label(b),
                reason: format!(
                    "structurally equal types flatten to {} and {} entries",
                    m.fa.len(),
                    m.fb.len()
                ),
            });
        }
        m.matrix = MappingMatrix::identity(m.fa.len());
        Ok(m)
    }

    /// The mapper name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The A-side type.
    pub fn a(&self) -> TypeId {
        self.a
    }

    /// The B-side type.
    pub fn b(&self) -> TypeId {
        self.b
    }

    /// The A-side flattened list.
    pub fn flat_a(&self) -> &[FlatType] {
        &self.fa
    }

    /// The B-side flattened list.
    pub fn flat_b(&self) -> &[FlatType] {
        &self.fb
    }

    /// The mapping matrix.
    pub fn matrix(&self) -> &MappingMatrix {
        &self.matrix
    }

    /// Given one of the mapper's two types, returns the other.
    pub fn other_side(&self, ty: TypeId) -> TypeId {
        if ty == self.a {
            self.b
        } else {
            self.a
        }
    }

    /// Whether this mapper converts `from` into `to`, in that order.
    pub fn maps(&self, from: TypeId, to: TypeId) -> bool {
        self.a == from && self.b == to
    }

    /// Whether this mapper relates the two types in either order.
    pub fn can_convert(&self, x: TypeId, y: TypeId) -> bool {
        self.maps(x, y) || self.maps(y, x)
    }

    /// Registers that flattened entries `a_idx` and `b_idx` carry the
    /// same wires.
    ///
    /// Rejects out-of-bounds indices, duplicate registrations, and
    /// crossings: a cell whose row and column each already hold another
    /// mapping would belong to two groups at once, so the registration
    /// is inconsistent.
    pub fn add(&mut self, design: &Design, a_idx: usize, b_idx: usize) -> Result<&mut Self> {
        if self.matrix.get(a_idx, b_idx)? != 0 {
            return Err(Error::InconsistentMapping {
                a: design.type_label(self.a),
                b: design.type_label(self.b),
                reason: format!("entries ({a_idx}, {b_idx}) are already mapped"),
            });
        }
        if self.matrix.would_cross(a_idx, b_idx) {
            return Err(Error::InconsistentMapping {
                a: design.type_label(self.a),
                b: design.type_label(self.b),
                reason: format!(
                    "entries ({a_idx}, {b_idx}) would join a row group and a \
                     column group at once"
                ),
            });
        }
        self.matrix.set_next(a_idx, b_idx)?;
        Ok(self)
    }

    /// The mapper converting B into A, sharing this mapper's matrix
    /// transposed.
    pub fn inverse(&self) -> Self {
        Self {
            name: format!("{}_inverse", self.name),
            a: self.b,
            b: self.a,
            fa: self.fb.clone(),
            fb: self.fa.clone(),
            matrix: self.matrix.transpose(),
        }
    }

    /// Partitions the registered cells into [`MappingPair`]s:
    ///
    /// 1. cells alone in both their row and column become 1:1 pairs;
    /// 2. rows with several cells become one A entry with B contributors
    ///    in registration order;
    /// 3. columns with several cells become one B entry with A
    ///    contributors in registration order.
    pub fn unique_mapping_pairs(&self) -> Vec<MappingPair> {
        let mut pairs = Vec::new();
        let m = &self.matrix;
        for r in 0..m.height() {
            for c in 0..m.width() {
                if m.elements[r * m.width + c] != 0
                    && m.count_nonzero_in_row(r) == 1
                    && m.count_nonzero_in_col(c) == 1
                {
                    pairs.push(MappingPair {
                        a: vec![self.side_a(r)],
                        b: vec![self.side_b(c)],
                    });
                }
            }
        }
        for r in 0..m.height() {
            if m.count_nonzero_in_row(r) > 1 {
                pairs.push(MappingPair {
                    a: vec![self.side_a(r)],
                    b: m.mapping_row(r)
                        .into_iter()
                        .map(|(c, _)| self.side_b(c))
                        .collect(),
                });
            }
        }
        for c in 0..m.width() {
            if m.count_nonzero_in_col(c) > 1 {
                pairs.push(MappingPair {
                    a: m.mapping_col(c)
                        .into_iter()
                        .map(|(r, _)| self.side_a(r))
                        .collect(),
                    b: vec![self.side_b(c)],
                });
            }
        }
        pairs
    }

    fn side_a(&self, index: usize) -> MapSide {
        MapSide {
            index,
            flat: self.fa[index].clone(),
        }
    }

    fn side_b(&self, index: usize) -> MapSide {
        MapSide {
            index,
            flat: self.fb[index].clone(),
        }
    }

    /// Renders the matrix with flattened names as headers, for logs.
    pub fn dump(&self, design: &Design) -> String {
        let mut out = format!("TypeMapper {}\n", self.name);
        out.push_str("A side:\n");
        out.push_str(&list_to_string(design, &self.fa));
        out.push_str("B side:\n");
        out.push_str(&list_to_string(design, &self.fb));
        out.push_str("matrix:\n");
        for r in 0..self.matrix.height() {
            for c in 0..self.matrix.width() {
                let v = self.matrix.elements[r * self.matrix.width + c];
                out.push_str(&format!(" {v:3}"));
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for MappingMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.height {
            for c in 0..self.width {
                write!(f, " {:3}", self.elements[r * self.width + c])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::Design;
    use crate::types::Field;

    #[test]
    fn set_next_orders_by_row_and_column() {
        let mut m = MappingMatrix::new(2, 3);
        m.set_next(0, 0).unwrap();
        m.set_next(0, 1).unwrap();
        m.set_next(1, 2).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), 1);
        assert_eq!(m.get(0, 1).unwrap(), 2);
        assert_eq!(m.get(1, 2).unwrap(), 1);
        assert_eq!(m.mapping_row(0), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn get_out_of_bounds_is_an_error() {
        let m = MappingMatrix::new(2, 2);
        assert!(matches!(
            m.get(2, 0),
            Err(weft_common::Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn transpose_swaps_axes() {
        let mut m = MappingMatrix::new(2, 3);
        m.set_next(0, 2).unwrap();
        let t = m.transpose();
        assert_eq!(t.height(), 3);
        assert_eq!(t.width(), 2);
        assert_eq!(t.get(2, 0).unwrap(), 1);
        assert_eq!(t.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn identity_mapper_is_diagonal() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let rec = d.record("r", vec![Field::new("x", v8), Field::new("y", bit)]);
        let m = TypeMapper::identity(&d, rec).unwrap();
        assert_eq!(m.flat_a().len(), 3);
        assert_eq!(m.matrix().get(0, 0).unwrap(), 1);
        assert_eq!(m.matrix().get(1, 1).unwrap(), 2);
        assert_eq!(m.matrix().get(0, 1).unwrap(), 0);
    }

    #[test]
    fn add_rejects_duplicates_and_crossings() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let ra = d.record("ra", vec![Field::new("x", v8), Field::new("y", bit)]);
        let rb = d.record("rb", vec![Field::new("p", v8), Field::new("q", bit)]);
        let mut m = TypeMapper::new(&d, ra, rb).unwrap();
        m.add(&d, 1, 1).unwrap();
        assert!(m.add(&d, 1, 1).is_err());
        m.add(&d, 1, 2).unwrap();
        // (2, 2): column 2 is taken by (1, 2) and row 1 already spans two
        // columns, so (2, 2) would belong to two groups at once.
        assert!(m.add(&d, 2, 2).is_err());
    }

    #[test]
    fn unique_pairs_partition_the_cells() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let ra = d.record(
            "ra",
            vec![Field::new("x", v8), Field::new("y", bit), Field::new("z", bit)],
        );
        let rb = d.record("rb", vec![Field::new("p", v8), Field::new("q", v8)]);
        let mut m = TypeMapper::new(&d, ra, rb).unwrap();
        // x <-> p one to one; y and z both concatenate into q.
        m.add(&d, 1, 1).unwrap();
        m.add(&d, 2, 2).unwrap();
        m.add(&d, 3, 2).unwrap();
        let pairs = m.unique_mapping_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].num_a(), 1);
        assert_eq!(pairs[0].num_b(), 1);
        assert_eq!(pairs[1].num_a(), 2);
        assert_eq!(pairs[1].num_b(), 1);
        // Contributors appear in registration order.
        assert_eq!(pairs[1].a[0].index, 2);
        assert_eq!(pairs[1].a[1].index, 3);
        let cells: usize = pairs.iter().map(|p| p.num_a().max(p.num_b())).sum();
        assert_eq!(cells, 3);
    }

    #[test]
    fn inverse_is_involutive() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let ra = d.record("ra", vec![Field::new("x", v8), Field::new("y", bit)]);
        let rb = d.record("rb", vec![Field::new("p", v8), Field::new("q", bit)]);
        let mut m = TypeMapper::new(&d, ra, rb).unwrap();
        m.add(&d, 1, 2).unwrap();
        m.add(&d, 2, 1).unwrap();
        let inv = m.inverse();
        assert_eq!(inv.a(), rb);
        assert_eq!(inv.b(), ra);
        assert_eq!(inv.matrix().get(2, 1).unwrap(), m.matrix().get(1, 2).unwrap());
        let back = inv.inverse();
        assert_eq!(back.matrix().get(1, 2).unwrap(), m.matrix().get(1, 2).unwrap());
        assert_eq!(back.a(), ra);
    }

    #[test]
    fn implicit_mapper_requires_equal_lengths() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let ra = d.record("ra", vec![Field::new("x", v8), Field::new("y", bit)]);
        let rb = d.record("rb", vec![Field::new("p", v8), Field::new("q", bit)]);
        let m = TypeMapper::implicit(&d, ra, rb).unwrap();
        assert_eq!(m.unique_mapping_pairs().len(), 3);
    }

    #[test]
    fn pair_widths_sum_contributors() {
        let mut d = Design::new();
        let v8 = d.vec_type(8);
        let bit = d.bit_type();
        let ra = d.record("ra", vec![Field::new("y", bit), Field::new("z", bit)]);
        let rb = d.record("rb", vec![Field::new("q", v8)]);
        let mut m = TypeMapper::new(&d, ra, rb).unwrap();
        m.add(&d, 1, 1).unwrap();
        m.add(&d, 2, 1).unwrap();
        let pairs = m.unique_mapping_pairs();
        assert_eq!(pairs.len(), 1);
        let zero = d.int_literal(0);
        let wa = pairs[0].width_a(&mut d, zero);
        let wa = d.minimize(wa).unwrap();
        assert_eq!(d.node_text(wa), "2");
    }
}
