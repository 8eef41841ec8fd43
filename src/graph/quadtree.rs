//! Barnes-Hut quadtree for O(n log n) repulsion.
//!
//! Summing repulsion over all vertex pairs is O(n²); distant groups are
//! instead approximated by their centroid. Every vertex carries the same
//! unit charge, so cells only need a centroid and a count.

use egui::{Pos2, Vec2};

/// Coincident vertices would otherwise subdivide forever.
const MAX_DEPTH: u32 = 50;

/// A cell of the tree - empty, a single vertex, or four subdivided children.
#[derive(Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Leaf {
        pos: Pos2,
    },
    Internal {
        /// Centroid of every vertex below this cell
        centroid: Pos2,
        /// Number of vertices below this cell
        count: u32,
        /// Children: NW, NE, SW, SE
        children: Box<[Cell; 4]>,
    },
}

/// Square region covered by a cell.
#[derive(Debug, Clone, Copy)]
pub struct Quad {
    pub min: Pos2,
    pub max: Pos2,
}

impl Quad {
    pub fn new(min: Pos2, max: Pos2) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Pos2 {
        Pos2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn size(&self) -> f32 {
        (self.max.x - self.min.x).max(self.max.y - self.min.y)
    }

    /// Quadrant index for a position (0=NW, 1=NE, 2=SW, 3=SE)
    pub fn quadrant(&self, pos: Pos2) -> usize {
        let center = self.center();
        let east = pos.x >= center.x;
        let south = pos.y >= center.y;
        match (south, east) {
            (false, false) => 0, // NW
            (false, true) => 1,  // NE
            (true, false) => 2,  // SW
            (true, true) => 3,   // SE
        }
    }

    /// Bounds of a specific quadrant
    pub fn child(&self, quadrant: usize) -> Quad {
        let center = self.center();
        match quadrant {
            0 => Quad::new(self.min, center), // NW
            1 => Quad::new(Pos2::new(center.x, self.min.y), Pos2::new(self.max.x, center.y)), // NE
            2 => Quad::new(Pos2::new(self.min.x, center.y), Pos2::new(center.x, self.max.y)), // SW
            3 => Quad::new(center, self.max), // SE
            _ => unreachable!(),
        }
    }
}

/// Barnes-Hut quadtree over unit-charge vertices.
pub struct Quadtree {
    root: Cell,
    quad: Quad,
    /// Acceptance ratio (cell size over distance). Higher is faster and
    /// less accurate; 1.0 is plenty for layout work.
    theta: f32,
}

impl Quadtree {
    /// Build a tree over `positions`.
    pub fn build(positions: &[Pos2], theta: f32) -> Self {
        if positions.is_empty() {
            return Self {
                root: Cell::Empty,
                quad: Quad::new(Pos2::ZERO, Pos2::ZERO),
                theta,
            };
        }

        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for pos in positions {
            min_x = min_x.min(pos.x);
            min_y = min_y.min(pos.y);
            max_x = max_x.max(pos.x);
            max_y = max_y.max(pos.y);
        }

        // pad, then square up; subdivision needs positive extent
        let padding = 1.0;
        min_x -= padding;
        min_y -= padding;
        max_x += padding;
        max_y += padding;
        let size = (max_x - min_x).max(max_y - min_y);

        let quad = Quad::new(
            Pos2::new(min_x, min_y),
            Pos2::new(min_x + size, min_y + size),
        );

        let mut tree = Self {
            root: Cell::Empty,
            quad,
            theta,
        };
        for &pos in positions {
            tree.insert(pos);
        }
        tree
    }

    fn insert(&mut self, pos: Pos2) {
        self.root = Self::insert_into(std::mem::take(&mut self.root), pos, self.quad, 0);
    }

    fn insert_into(cell: Cell, pos: Pos2, quad: Quad, depth: u32) -> Cell {
        // stacked vertices bottom out here; the layout nudges them apart
        if depth > MAX_DEPTH {
            return cell;
        }

        match cell {
            Cell::Empty => Cell::Leaf { pos },

            Cell::Leaf { pos: existing } => {
                // subdivide and reinsert both bodies
                let mut children = Box::new([Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty]);

                let eq = quad.quadrant(existing);
                children[eq] = Self::insert_into(Cell::Empty, existing, quad.child(eq), depth + 1);

                let nq = quad.quadrant(pos);
                children[nq] = Self::insert_into(
                    std::mem::take(&mut children[nq]),
                    pos,
                    quad.child(nq),
                    depth + 1,
                );

                Cell::Internal {
                    centroid: Pos2::new((existing.x + pos.x) / 2.0, (existing.y + pos.y) / 2.0),
                    count: 2,
                    children,
                }
            }

            Cell::Internal {
                centroid,
                count,
                mut children,
            } => {
                let q = quad.quadrant(pos);
                children[q] = Self::insert_into(
                    std::mem::take(&mut children[q]),
                    pos,
                    quad.child(q),
                    depth + 1,
                );

                // running average over one more body
                let total = count + 1;
                let centroid = Pos2::new(
                    (centroid.x * count as f32 + pos.x) / total as f32,
                    (centroid.y * count as f32 + pos.y) / total as f32,
                );

                Cell::Internal {
                    centroid,
                    count: total,
                    children,
                }
            }
        }
    }

    /// Net Coulomb-style repulsion on a unit charge at `pos`. `strength`
    /// scales the whole field; `min_distance` caps the near-field blowup.
    pub fn repulsion_at(&self, pos: Pos2, strength: f32, min_distance: f32) -> Vec2 {
        self.force_from(&self.root, pos, strength, min_distance, self.quad)
    }

    fn force_from(
        &self,
        cell: &Cell,
        pos: Pos2,
        strength: f32,
        min_distance: f32,
        quad: Quad,
    ) -> Vec2 {
        match cell {
            Cell::Empty => Vec2::ZERO,

            Cell::Leaf { pos: body } => {
                let delta = pos - *body;
                // the querying vertex meets itself as a leaf; skip it
                if delta.length_sq() < 1e-4 {
                    return Vec2::ZERO;
                }
                let distance = delta.length().max(min_distance);
                // F = k / r², directed away from the body
                (delta / distance) * (strength / (distance * distance))
            }

            Cell::Internal {
                centroid,
                count,
                children,
            } => {
                let delta = pos - *centroid;
                let distance = delta.length().max(min_distance);

                // acceptance test: a far-enough cell acts as one body of
                // `count` charges at its centroid
                if quad.size() / distance < self.theta {
                    (delta / distance) * (strength * *count as f32 / (distance * distance))
                } else {
                    let mut force = Vec2::ZERO;
                    for (i, child) in children.iter().enumerate() {
                        force += self.force_from(child, pos, strength, min_distance, quad.child(i));
                    }
                    force
                }
            }
        }
    }
}
