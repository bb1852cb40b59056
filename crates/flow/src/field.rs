//! Grid of unit direction vectors sampled from 3-D noise.
//!
//! The grid covers the canvas in square cells of `cell_size` pixels. Every
//! frame the whole grid is overwritten from noise at the current time
//! coordinate; nothing is carried over between frames.

use flowfield_core::error::EngineError;
use flowfield_core::noise_source::NoiseSource;
use flowfield_core::params::require_positive;
use glam::DVec2;

/// Noise-space distance between adjacent cells, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldShape {
    /// Cell edge length in pixels.
    pub cell_size: f64,
    /// Noise-space step between columns.
    pub step_x: f64,
    /// Noise-space step between rows.
    pub step_y: f64,
    /// Multiplier from a [0, 1] noise value to an angle in radians.
    pub angle_scale: f64,
}

/// A `columns x rows` grid of unit vectors, stored row-major.
///
/// After [`FlowField::new`] or [`FlowField::resize`] the grid is empty and
/// every lookup is absent until the next [`FlowField::regenerate`].
#[derive(Debug, Clone)]
pub struct FlowField {
    shape: FieldShape,
    columns: usize,
    rows: usize,
    vectors: Vec<DVec2>,
}

impl FlowField {
    /// Creates an empty field covering a `width x height` canvas.
    ///
    /// Returns `EngineError::InvalidParameter` if `cell_size` is not a
    /// positive finite number.
    pub fn new(width: usize, height: usize, shape: FieldShape) -> Result<Self, EngineError> {
        require_positive("cell_size", shape.cell_size)?;
        let mut field = Self {
            shape,
            columns: 0,
            rows: 0,
            vectors: Vec::new(),
        };
        field.resize(width, height);
        Ok(field)
    }

    /// Recomputes the grid dimensions for a new canvas size and discards all
    /// vectors. The next `regenerate` refills the grid.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.columns = (width as f64 / self.shape.cell_size).floor() as usize;
        self.rows = (height as f64 / self.shape.cell_size).floor() as usize;
        self.vectors = Vec::new();
    }

    /// Overwrites every cell from `noise` at time coordinate `time`.
    ///
    /// Cell (x, y) samples `noise(x * step_x, y * step_y, time)`, turns the
    /// value into `angle = value * angle_scale`, and stores the unit vector
    /// at that angle.
    pub fn regenerate(&mut self, noise: &dyn NoiseSource, time: f64) {
        let FieldShape {
            step_x,
            step_y,
            angle_scale,
            ..
        } = self.shape;
        let columns = self.columns;
        self.vectors.clear();
        self.vectors.extend((0..self.rows).flat_map(|y| {
            (0..columns).map(move |x| {
                let value = noise.sample(x as f64 * step_x, y as f64 * step_y, time);
                DVec2::from_angle(value * angle_scale)
            })
        }));
    }

    /// Linear cell index for a canvas position, if it falls inside the grid
    /// storage range `[0, columns * rows)`.
    ///
    /// The index is `floor(x / cell) + floor(y / cell) * columns`, so an x
    /// past the last column spills into the next row, matching a flat lookup.
    pub fn index_of(&self, pos: DVec2) -> Option<usize> {
        let cell = self.shape.cell_size;
        let x = (pos.x / cell).floor();
        let y = (pos.y / cell).floor();
        let index = x + y * self.columns as f64;
        let len = self.columns.saturating_mul(self.rows) as f64;
        (index.is_finite() && index >= 0.0 && index < len).then_some(index as usize)
    }

    /// The vector stored at `index`, or `None` if out of range or not yet computed.
    pub fn get(&self, index: usize) -> Option<DVec2> {
        self.vectors.get(index).copied()
    }

    /// The force a particle at `pos` receives, if any.
    pub fn lookup(&self, pos: DVec2) -> Option<DVec2> {
        self.index_of(pos).and_then(|i| self.get(i))
    }

    /// Number of grid columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of grid rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// All computed vectors in row-major order (empty before the first regenerate).
    pub fn vectors(&self) -> &[DVec2] {
        &self.vectors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowfield_core::noise_source::{ConstantNoise, PerlinNoise};
    use std::f64::consts::TAU;

    fn shape(cell_size: f64) -> FieldShape {
        FieldShape {
            cell_size,
            step_x: 0.1,
            step_y: 0.1,
            angle_scale: 2.0 * TAU,
        }
    }

    #[test]
    fn grid_dimensions_are_floored() {
        let field = FlowField::new(205, 99, shape(20.0)).unwrap();
        assert_eq!(field.columns(), 10);
        assert_eq!(field.rows(), 4);
    }

    #[test]
    fn new_rejects_non_positive_cell_size() {
        for bad in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                FlowField::new(100, 100, shape(bad)),
                Err(EngineError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn new_field_is_empty_until_regenerated() {
        let field = FlowField::new(100, 100, shape(10.0)).unwrap();
        assert!(field.vectors().is_empty());
        assert_eq!(field.lookup(DVec2::new(5.0, 5.0)), None);
    }

    #[test]
    fn constant_half_noise_gives_angle_two_pi_everywhere() {
        let mut field = FlowField::new(100, 100, shape(10.0)).unwrap();
        field.regenerate(&ConstantNoise(0.5), 0.0);
        assert_eq!(field.vectors().len(), 100);
        let angle = 0.5 * 2.0 * TAU;
        let expected = DVec2::new(angle.cos(), angle.sin());
        for (i, v) in field.vectors().iter().enumerate() {
            assert!(
                (*v - expected).length() < 1e-12,
                "cell {i} = {v}, expected {expected}"
            );
        }
    }

    #[test]
    fn regenerate_is_idempotent_for_same_time() {
        let noise = PerlinNoise::new(9, 4, 0.5);
        let mut a = FlowField::new(200, 120, shape(20.0)).unwrap();
        let mut b = FlowField::new(200, 120, shape(20.0)).unwrap();
        a.regenerate(&noise, 0.42);
        b.regenerate(&noise, 0.42);
        a.regenerate(&noise, 0.42);
        assert_eq!(a.vectors(), b.vectors());
    }

    #[test]
    fn regenerate_changes_with_time() {
        let noise = PerlinNoise::new(9, 4, 0.5);
        let mut field = FlowField::new(200, 120, shape(20.0)).unwrap();
        field.regenerate(&noise, 0.0);
        let before = field.vectors().to_vec();
        field.regenerate(&noise, 0.5);
        assert_ne!(before, field.vectors());
    }

    #[test]
    fn cells_are_stored_row_major() {
        struct ColumnNoise;
        impl NoiseSource for ColumnNoise {
            // Encodes the column index (x = col * 0.1) into the angle.
            fn sample(&self, x: f64, _y: f64, _z: f64) -> f64 {
                x / 100.0
            }
        }
        let mut field = FlowField::new(40, 20, shape(10.0)).unwrap();
        field.regenerate(&ColumnNoise, 0.0);
        let angle_of = |i: usize| field.get(i).unwrap().to_angle();
        // Index 5 is column 1 of row 1 in a 4-column grid.
        assert!((angle_of(5) - angle_of(1)).abs() < 1e-12);
        assert!((angle_of(1) - angle_of(0)).abs() > 1e-6);
    }

    #[test]
    fn index_of_maps_position_to_cell() {
        let field = FlowField::new(100, 50, shape(10.0)).unwrap();
        assert_eq!(field.index_of(DVec2::new(0.0, 0.0)), Some(0));
        assert_eq!(field.index_of(DVec2::new(15.0, 25.0)), Some(1 + 2 * 10));
        assert_eq!(field.index_of(DVec2::new(99.9, 49.9)), Some(49));
    }

    #[test]
    fn index_of_out_of_range_is_none() {
        let field = FlowField::new(100, 50, shape(10.0)).unwrap();
        assert_eq!(field.index_of(DVec2::new(-0.1, 0.0)), None);
        assert_eq!(field.index_of(DVec2::new(0.0, -3.0)), None);
        assert_eq!(field.index_of(DVec2::new(5.0, 50.0)), None);
        assert_eq!(field.index_of(DVec2::new(f64::NAN, 1.0)), None);
    }

    #[test]
    fn index_past_last_column_spills_into_next_row() {
        let field = FlowField::new(100, 50, shape(10.0)).unwrap();
        assert_eq!(field.index_of(DVec2::new(101.0, 5.0)), Some(10));
    }

    #[test]
    fn resize_discards_vectors_and_recomputes_grid() {
        let mut field = FlowField::new(100, 100, shape(10.0)).unwrap();
        field.regenerate(&ConstantNoise(0.1), 0.0);
        field.resize(50, 30);
        assert_eq!((field.columns(), field.rows()), (5, 3));
        assert!(field.vectors().is_empty());
        field.regenerate(&ConstantNoise(0.1), 0.0);
        assert_eq!(field.vectors().len(), 15);
    }

    #[test]
    fn canvas_smaller_than_a_cell_has_no_cells() {
        let mut field = FlowField::new(5, 5, shape(10.0)).unwrap();
        field.regenerate(&ConstantNoise(0.3), 0.0);
        assert!(field.vectors().is_empty());
        assert_eq!(field.lookup(DVec2::new(1.0, 1.0)), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_cell_is_a_unit_vector(
                w in 10_usize..300,
                h in 10_usize..300,
                cell in 3.0_f64..40.0,
                seed: u32,
                time in 0.0_f64..10.0,
            ) {
                let mut field = FlowField::new(w, h, shape(cell)).unwrap();
                field.regenerate(&PerlinNoise::new(seed, 4, 0.5), time);
                prop_assert_eq!(field.vectors().len(), field.columns() * field.rows());
                for v in field.vectors() {
                    prop_assert!((v.length() - 1.0).abs() < 1e-9, "|{v}| != 1");
                }
            }
        }
    }
}
