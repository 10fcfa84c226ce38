//! Minimal grid view: cartesian dimensions plus the active-cell map.
//!
//! The engine never touches geometry; it only needs to translate (i,j,k)
//! block requests into global indices and to skip vectors configured in
//! deactivated cells.

#[derive(Clone, Debug)]
pub struct Grid {
    dims: [usize; 3],
    active: Vec<bool>,
}

impl Grid {
    /// All cells active.
    pub fn cartesian(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            dims: [nx, ny, nz],
            active: vec![true; nx * ny * nz],
        }
    }

    pub fn with_active(nx: usize, ny: usize, nz: usize, active: Vec<bool>) -> Self {
        debug_assert_eq!(active.len(), nx * ny * nz);
        Self {
            dims: [nx, ny, nz],
            active,
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn num_cells(&self) -> usize {
        self.active.len()
    }

    /// Global 0-based index from 0-based (i,j,k).
    pub fn global_index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    pub fn cell_active(&self, global_index: usize) -> bool {
        self.active.get(global_index).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_index_is_i_fastest() {
        let g = Grid::cartesian(3, 4, 5);
        assert_eq!(g.global_index(0, 0, 0), 0);
        assert_eq!(g.global_index(2, 0, 0), 2);
        assert_eq!(g.global_index(0, 1, 0), 3);
        assert_eq!(g.global_index(0, 0, 1), 12);
    }

    #[test]
    fn inactive_and_out_of_range_cells() {
        let mut active = vec![true; 8];
        active[5] = false;
        let g = Grid::with_active(2, 2, 2, active);
        assert!(g.cell_active(0));
        assert!(!g.cell_active(5));
        assert!(!g.cell_active(100));
    }
}
