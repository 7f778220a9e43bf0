//! Fixed route topology and buildable cell set.

use thiserror::Error;
use tower_defence_core::{CellCoord, RouteId, WorldPoint};

/// Largest number of cells a grid may hold.
pub const MAX_GRID_CELLS: u64 = 1 << 20;

/// Fault detected while building the grid topology.
///
/// These are configuration errors: the world refuses to start rather than run
/// with an undefined route.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The grid has no columns or no rows.
    #[error("grid must have at least one column and one row")]
    EmptyGrid,
    /// The grid holds more than [`MAX_GRID_CELLS`] cells.
    #[error("grid of {columns}x{rows} cells exceeds the limit of {MAX_GRID_CELLS}")]
    TooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The cell size is zero, negative or not finite.
    #[error("cell size must be a positive finite number")]
    InvalidCellSize,
    /// No route was authored.
    #[error("at least one route is required")]
    NoRoutes,
    /// A route has no waypoints.
    #[error("route {route} has no waypoints")]
    EmptyRoute {
        /// Index of the offending route.
        route: usize,
    },
    /// A route corner lies outside the grid.
    #[error("route {route} leaves the grid at {cell:?}")]
    OutOfBounds {
        /// Index of the offending route.
        route: usize,
        /// Corner outside the grid.
        cell: CellCoord,
    },
    /// Two consecutive corners do not share a row or a column.
    #[error("route {route} jumps from {from:?} to {to:?} without an axis-aligned segment")]
    Disconnected {
        /// Index of the offending route.
        route: usize,
        /// Corner the segment starts from.
        from: CellCoord,
        /// Corner the segment should reach.
        to: CellCoord,
    },
}

/// Ordered waypoints of every route, concatenated with recorded split points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    waypoints: Vec<CellCoord>,
    route_starts: Vec<usize>,
}

impl Path {
    /// Every waypoint of every route, route after route.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Offsets into [`Path::waypoints`] at which each route begins.
    #[must_use]
    pub fn split_points(&self) -> &[usize] {
        &self.route_starts
    }

    /// Number of disjoint routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.route_starts.len()
    }

    /// Waypoints of a single route, if it exists.
    #[must_use]
    pub fn route(&self, route: RouteId) -> Option<&[CellCoord]> {
        let index = usize::try_from(route.get()).ok()?;
        let start = *self.route_starts.get(index)?;
        let end = self
            .route_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.waypoints.len());
        self.waypoints.get(start..end)
    }

    /// Iterator over every route with its identifier.
    pub fn routes(&self) -> impl Iterator<Item = (RouteId, &[CellCoord])> + '_ {
        (0..self.route_count()).filter_map(move |index| {
            let id = RouteId::new(u32::try_from(index).ok()?);
            self.route(id).map(|cells| (id, cells))
        })
    }
}

/// Dense membership grid of cells that may hold a tower.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildableSet {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl BuildableSet {
    fn excluding(columns: u32, rows: u32, path: &Path) -> Self {
        let len = u64::from(columns) * u64::from(rows);
        let mut set = Self {
            columns,
            rows,
            cells: vec![true; usize::try_from(len).unwrap_or(0)],
        };
        for &cell in path.waypoints() {
            let Some(index) = set.index(cell) else {
                continue;
            };
            if let Some(slot) = set.cells.get_mut(index) {
                *slot = false;
            }
        }
        set
    }

    /// Reports whether the cell is inside the grid and off every route.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Iterator over buildable cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, buildable)| **buildable)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(CellCoord::new(index % columns, index / columns))
            })
    }

    /// Number of buildable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|buildable| **buildable).count()
    }

    /// Reports whether no cell is buildable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable grid dimensions, routes and buildable cells.
#[derive(Clone, Debug, PartialEq)]
pub struct GridTopology {
    columns: u32,
    rows: u32,
    cell_size: f32,
    path: Path,
    buildable: BuildableSet,
}

impl GridTopology {
    /// Builds the topology from routes authored as axis-aligned corner lists.
    ///
    /// Each route is expanded cell by cell between consecutive corners;
    /// repeated corners collapse. Every route must be non-empty, stay inside
    /// the grid and only turn at right angles.
    pub fn build(
        columns: u32,
        rows: u32,
        cell_size: f32,
        routes: &[Vec<CellCoord>],
    ) -> Result<Self, GridError> {
        if columns == 0 || rows == 0 {
            return Err(GridError::EmptyGrid);
        }
        if u64::from(columns) * u64::from(rows) > MAX_GRID_CELLS {
            return Err(GridError::TooLarge { columns, rows });
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize);
        }
        if routes.is_empty() {
            return Err(GridError::NoRoutes);
        }

        let mut waypoints = Vec::new();
        let mut route_starts = Vec::with_capacity(routes.len());
        for (route, corners) in routes.iter().enumerate() {
            route_starts.push(waypoints.len());
            expand_route(route, corners, columns, rows, &mut waypoints)?;
        }

        let path = Path {
            waypoints,
            route_starts,
        };
        let buildable = BuildableSet::excluding(columns, rows, &path);

        Ok(Self {
            columns,
            rows,
            cell_size,
            path,
            buildable,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of one cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Routes enemies follow.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Cells that may hold a tower when unoccupied.
    #[must_use]
    pub const fn buildable(&self) -> &BuildableSet {
        &self.buildable
    }

    /// O(1) membership test against the buildable set.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.buildable.contains(cell)
    }

    /// Upper-left corner of the cell in world units.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> WorldPoint {
        WorldPoint::new(
            cell.column() as f32 * self.cell_size,
            cell.row() as f32 * self.cell_size,
        )
    }

    /// Centre of the cell in world units.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        let origin = self.cell_origin(cell);
        let half = self.cell_size / 2.0;
        WorldPoint::new(origin.x() + half, origin.y() + half)
    }

    /// World position of a route's waypoint, if both exist.
    #[must_use]
    pub fn waypoint_position(&self, route: RouteId, index: u32) -> Option<WorldPoint> {
        let cells = self.path.route(route)?;
        let cell = cells.get(usize::try_from(index).ok()?)?;
        Some(self.cell_center(*cell))
    }
}

/// Serpentine route crossing the default 8 x 6 grid, as corner cells.
#[must_use]
pub fn default_routes() -> Vec<Vec<CellCoord>> {
    vec![vec![
        CellCoord::new(0, 3),
        CellCoord::new(7, 3),
        CellCoord::new(7, 5),
        CellCoord::new(0, 5),
    ]]
}

fn expand_route(
    route: usize,
    corners: &[CellCoord],
    columns: u32,
    rows: u32,
    out: &mut Vec<CellCoord>,
) -> Result<(), GridError> {
    let Some(first) = corners.first().copied() else {
        return Err(GridError::EmptyRoute { route });
    };

    for &corner in corners {
        if corner.column() >= columns || corner.row() >= rows {
            return Err(GridError::OutOfBounds {
                route,
                cell: corner,
            });
        }
    }

    out.push(first);
    for pair in corners.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if from.column() != to.column() && from.row() != to.row() {
            return Err(GridError::Disconnected { route, from, to });
        }

        let mut cursor = from;
        while cursor != to {
            cursor = step_toward(cursor, to);
            out.push(cursor);
        }
    }

    Ok(())
}

fn step_toward(from: CellCoord, to: CellCoord) -> CellCoord {
    let column = if to.column() > from.column() {
        from.column() + 1
    } else if to.column() < from.column() {
        from.column() - 1
    } else {
        from.column()
    };
    let row = if column != from.column() {
        from.row()
    } else if to.row() > from.row() {
        from.row() + 1
    } else if to.row() < from.row() {
        from.row() - 1
    } else {
        from.row()
    };
    CellCoord::new(column, row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(coords: &[(u32, u32)]) -> Vec<CellCoord> {
        coords
            .iter()
            .map(|&(column, row)| CellCoord::new(column, row))
            .collect()
    }

    #[test]
    fn default_route_expands_into_serpentine_cells() {
        let topology = GridTopology::build(8, 6, 100.0, &default_routes()).expect("valid grid");
        let route = topology.path().route(RouteId::new(0)).expect("route 0");

        assert_eq!(route.len(), 17);
        assert_eq!(route[0], CellCoord::new(0, 3));
        assert_eq!(route[7], CellCoord::new(7, 3));
        assert_eq!(route[8], CellCoord::new(7, 4));
        assert_eq!(route[9], CellCoord::new(7, 5));
        assert_eq!(route[16], CellCoord::new(0, 5));
        for pair in route.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn buildable_set_excludes_every_path_cell() {
        let topology = GridTopology::build(8, 6, 100.0, &default_routes()).expect("valid grid");

        assert_eq!(topology.buildable().len(), 8 * 6 - 17);
        assert!(!topology.is_buildable(CellCoord::new(3, 3)));
        assert!(!topology.is_buildable(CellCoord::new(7, 4)));
        assert!(topology.is_buildable(CellCoord::new(0, 0)));
        assert!(topology.is_buildable(CellCoord::new(0, 4)));
        assert!(!topology.is_buildable(CellCoord::new(8, 0)));
        assert!(topology
            .buildable()
            .iter()
            .all(|cell| !topology.path().waypoints().contains(&cell)));
    }

    #[test]
    fn repeated_corners_collapse() {
        let routes = vec![cells(&[(0, 0), (0, 0), (2, 0), (2, 0), (2, 1)])];
        let topology = GridTopology::build(3, 2, 10.0, &routes).expect("valid grid");

        assert_eq!(
            topology.path().waypoints(),
            cells(&[(0, 0), (1, 0), (2, 0), (2, 1)]).as_slice()
        );
    }

    #[test]
    fn multiple_routes_record_split_points() {
        let routes = vec![cells(&[(0, 0), (3, 0)]), cells(&[(0, 2), (3, 2)])];
        let topology = GridTopology::build(4, 3, 10.0, &routes).expect("valid grid");
        let path = topology.path();

        assert_eq!(path.route_count(), 2);
        assert_eq!(path.split_points(), &[0, 4]);
        assert_eq!(path.route(RouteId::new(1)).map(<[_]>::len), Some(4));
        assert_eq!(
            path.route(RouteId::new(1)).and_then(|route| route.first().copied()),
            Some(CellCoord::new(0, 2))
        );
        assert!(path.route(RouteId::new(2)).is_none());
        assert_eq!(path.routes().count(), 2);
    }

    #[test]
    fn diagonal_segment_is_rejected() {
        let routes = vec![cells(&[(0, 0), (2, 2)])];
        assert_eq!(
            GridTopology::build(4, 4, 10.0, &routes),
            Err(GridError::Disconnected {
                route: 0,
                from: CellCoord::new(0, 0),
                to: CellCoord::new(2, 2),
            })
        );
    }

    #[test]
    fn malformed_configurations_are_rejected() {
        assert_eq!(
            GridTopology::build(0, 4, 10.0, &default_routes()),
            Err(GridError::EmptyGrid)
        );
        assert_eq!(
            GridTopology::build(u32::MAX, u32::MAX, 10.0, &default_routes()),
            Err(GridError::TooLarge {
                columns: u32::MAX,
                rows: u32::MAX,
            })
        );
        assert_eq!(
            GridTopology::build(8, 6, 0.0, &default_routes()),
            Err(GridError::InvalidCellSize)
        );
        assert_eq!(
            GridTopology::build(8, 6, 10.0, &[]),
            Err(GridError::NoRoutes)
        );
        assert_eq!(
            GridTopology::build(8, 6, 10.0, &[Vec::new()]),
            Err(GridError::EmptyRoute { route: 0 })
        );
        assert_eq!(
            GridTopology::build(4, 4, 10.0, &default_routes()),
            Err(GridError::OutOfBounds {
                route: 0,
                cell: CellCoord::new(7, 3),
            })
        );
    }

    #[test]
    fn cell_geometry_scales_with_cell_size() {
        let topology = GridTopology::build(8, 6, 100.0, &default_routes()).expect("valid grid");

        assert_eq!(
            topology.cell_origin(CellCoord::new(2, 1)),
            WorldPoint::new(200.0, 100.0)
        );
        assert_eq!(
            topology.cell_center(CellCoord::new(2, 1)),
            WorldPoint::new(250.0, 150.0)
        );
        assert_eq!(
            topology.waypoint_position(RouteId::new(0), 16),
            Some(WorldPoint::new(50.0, 550.0))
        );
        assert_eq!(topology.waypoint_position(RouteId::new(0), 17), None);
    }
}
