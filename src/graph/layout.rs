//! Force-directed graph layout.
//!
//! A spring-electrical model:
//! - Repulsion between all vertices (Coulomb's law) - O(n log n) via Barnes-Hut
//! - Attraction along edges toward a target length (Hooke's law)
//! - Weak centering force toward the canvas center
//! - Damped integration, clamped to the canvas bounds
//!
//! The simulation reheats whenever the graph is edited and idles once
//! kinetic energy falls below a threshold, so a resting sketch costs
//! nothing per frame.

use super::model::Graph;
use super::quadtree::Quadtree;
use egui::{Pos2, Rect, Vec2};
use std::f32::consts::TAU;

/// Ticks the simulation must stay active after a reheat. Fresh vertices
/// start at zero velocity, so the energy test alone would declare the
/// layout settled before motion ever begins.
const WARMUP_TICKS: u32 = 60;

/// Barnes-Hut acceptance ratio.
const THETA: f32 = 1.0;

/// Vertices closer than this are treated as stacked and nudged apart on
/// reheat; repulsion has no direction to act on at zero distance.
const STACKED_DISTANCE_SQ: f32 = 1.0;

/// Force-directed layout parameters plus per-vertex simulation state.
///
/// The public fields are bound to the sidebar sliders. Velocity slots
/// track the vertex vector by index, so the simulation must hear about
/// deletions through [`ForceLayout::forget`].
pub struct ForceLayout {
    /// Repulsion strength between vertices
    pub repulsion: f32,
    /// Attraction strength along edges
    pub attraction: f32,
    /// Centering force strength
    pub centering: f32,
    /// Damping factor (0.0 - 1.0)
    pub damping: f32,
    /// Minimum distance to prevent division by zero
    pub min_distance: f32,
    /// Maximum velocity per tick
    pub max_velocity: f32,
    /// Ideal edge length
    pub link_distance: f32,
    /// Mean squared speed below which the layout counts as settled
    pub idle_threshold: f32,

    velocities: Vec<Vec2>,
    pinned: Option<usize>,
    warmup: u32,
    energy: f32,
}

impl Default for ForceLayout {
    fn default() -> Self {
        Self {
            repulsion: 8000.0,    // enough spread for a dozen vertices
            attraction: 0.08,
            centering: 0.001,
            damping: 0.85,
            min_distance: 30.0,
            max_velocity: 50.0,
            link_distance: 150.0,
            idle_threshold: 0.25, // squared speed, i.e. half a pixel per tick
            velocities: Vec::new(),
            pinned: None,
            warmup: 0,
            energy: 0.0,
        }
    }
}

impl ForceLayout {
    /// Reactivate the simulation after a structural change. Safe to call
    /// while already running; that only restarts the warmup window.
    /// Exactly stacked vertices get a small random nudge so repulsion has
    /// a direction to work with.
    pub fn reheat(&mut self, graph: &mut Graph) {
        use rand::Rng;

        self.velocities.resize(graph.vertex_count(), Vec2::ZERO);
        self.warmup = WARMUP_TICKS;

        let positions: Vec<Pos2> = graph.vertices().iter().map(|v| v.pos).collect();
        let mut rng = rand::thread_rng();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                if (positions[i] - positions[j]).length_sq() < STACKED_DISTANCE_SQ {
                    // move the one that is not being dragged
                    let target = if self.pinned == Some(j) { i } else { j };
                    let nudge = Vec2::angled(rng.gen_range(0.0..TAU)) * 2.0;
                    graph.move_vertex(target, positions[target] + nudge);
                }
            }
        }
    }

    /// Drop the simulation state of a deleted vertex. Indices above it
    /// shift down by one, mirroring the model's renumbering.
    pub fn forget(&mut self, index: usize) {
        if index < self.velocities.len() {
            self.velocities.remove(index);
        }
        self.pinned = match self.pinned {
            Some(p) if p == index => None,
            Some(p) if p > index => Some(p - 1),
            other => other,
        };
    }

    /// Pin a vertex for the duration of a drag: it stops integrating but
    /// keeps pushing and pulling on everything else.
    pub fn pin(&mut self, index: usize) {
        self.pinned = Some(index);
    }

    /// Release the dragged vertex. It rejoins the simulation at zero
    /// velocity rather than inheriting pointer speed.
    pub fn unpin(&mut self) {
        self.pinned = None;
    }

    pub fn pinned(&self) -> Option<usize> {
        self.pinned
    }

    /// Mean squared vertex speed after the last tick.
    pub fn kinetic_energy(&self) -> f32 {
        self.energy
    }

    /// True once the warmup window has elapsed and motion has died down.
    /// The app stops requesting repaints at that point, which freezes the
    /// simulation until the next reheat.
    pub fn is_settled(&self) -> bool {
        self.warmup == 0 && self.energy < self.idle_threshold
    }

    /// Run one tick: accumulate forces, integrate with damping, clamp to
    /// `bounds` inset by the vertex draw radius. A settled simulation or
    /// an empty graph makes this a no-op.
    pub fn step(&mut self, graph: &mut Graph, bounds: Rect, vertex_radius: f32) {
        let n = graph.vertex_count();
        if n == 0 {
            self.energy = 0.0;
            self.warmup = 0;
            return;
        }
        if self.is_settled() {
            return;
        }
        self.velocities.resize(n, Vec2::ZERO);

        let positions: Vec<Pos2> = graph.vertices().iter().map(|v| v.pos).collect();
        let mut forces: Vec<Vec2> = vec![Vec2::ZERO; n];

        // Repulsion via Barnes-Hut - O(n log n) instead of O(n²)
        let tree = Quadtree::build(&positions, THETA);
        for (i, &pos) in positions.iter().enumerate() {
            forces[i] += tree.repulsion_at(pos, self.repulsion, self.min_distance);
        }

        // Spring per edge; a self-loop has no length to correct
        for edge in graph.edges() {
            if edge.is_loop() {
                continue;
            }
            let delta = positions[edge.target] - positions[edge.source];
            let distance = delta.length().max(self.min_distance);
            let displacement = distance - self.link_distance;
            let force = (delta / distance) * (displacement * self.attraction);
            forces[edge.source] += force;
            forces[edge.target] -= force;
        }

        // Centering keeps disconnected pieces from parking at the walls
        let center = bounds.center();
        for (i, &pos) in positions.iter().enumerate() {
            forces[i] += (center - pos) * self.centering;
        }

        // Integrate; the pinned vertex holds still
        let mut energy = 0.0;
        for i in 0..n {
            if self.pinned == Some(i) {
                self.velocities[i] = Vec2::ZERO;
                continue;
            }

            let vel = &mut self.velocities[i];
            *vel = (*vel + forces[i]) * self.damping;

            // Clamp velocity
            if vel.length() > self.max_velocity {
                *vel = vel.normalized() * self.max_velocity;
            }
            energy += vel.length_sq();

            let next = clamp_to_bounds(positions[i] + *vel, bounds, vertex_radius);
            graph.move_vertex(i, next);
        }
        self.energy = energy / n as f32;
        self.warmup = self.warmup.saturating_sub(1);
    }
}

/// Keep the whole vertex disc visible inside the canvas.
fn clamp_to_bounds(pos: Pos2, bounds: Rect, radius: f32) -> Pos2 {
    let x0 = bounds.left() + radius;
    let x1 = (bounds.right() - radius).max(x0);
    let y0 = bounds.top() + radius;
    let y1 = (bounds.bottom() - radius).max(y0);
    Pos2::new(pos.x.clamp(x0, x1), pos.y.clamp(y0, y1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn bounds() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(850.0, 575.0))
    }

    /// Two vertices `gap` apart, centered on the canvas.
    fn pair(gap: f32, connected: bool) -> Graph {
        let mut g = Graph::new();
        g.add_vertex(pos2(425.0 - gap / 2.0, 287.0));
        g.add_vertex(pos2(425.0 + gap / 2.0, 287.0));
        if connected {
            g.add_edge(0, 1);
        }
        g
    }

    fn gap(g: &Graph) -> f32 {
        (g.vertices()[0].pos - g.vertices()[1].pos).length()
    }

    #[test]
    fn repulsion_pushes_unconnected_vertices_apart() {
        let mut g = pair(40.0, false);
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);

        let before = gap(&g);
        for _ in 0..10 {
            layout.step(&mut g, bounds(), 16.0);
        }
        assert!(gap(&g) > before, "{} -> {}", before, gap(&g));
    }

    #[test]
    fn springs_pull_a_stretched_edge_shorter() {
        let mut g = pair(500.0, true);
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);

        let before = gap(&g);
        for _ in 0..10 {
            layout.step(&mut g, bounds(), 16.0);
        }
        assert!(gap(&g) < before, "{} -> {}", before, gap(&g));
    }

    #[test]
    fn settles_within_bounded_ticks() {
        let mut g = Graph::new();
        g.add_polygon(4, pos2(425.0, 287.0), 120.0);
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);

        let mut ticks = 0;
        while !layout.is_settled() && ticks < 2000 {
            layout.step(&mut g, bounds(), 16.0);
            ticks += 1;
        }
        assert!(
            layout.is_settled(),
            "still moving after {} ticks, energy {}",
            ticks,
            layout.kinetic_energy()
        );
    }

    #[test]
    fn pinned_vertex_holds_still_but_still_repels() {
        let mut g = pair(40.0, false);
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);
        layout.pin(0);

        let held = g.vertices()[0].pos;
        let other = g.vertices()[1].pos;
        for _ in 0..5 {
            layout.step(&mut g, bounds(), 16.0);
        }
        assert_eq!(g.vertices()[0].pos, held);
        assert_ne!(g.vertices()[1].pos, other);
    }

    #[test]
    fn positions_stay_inside_the_canvas() {
        let mut g = Graph::new();
        // crowd a corner so repulsion slams vertices toward the walls
        for i in 0..6 {
            g.add_vertex(pos2(20.0 + i as f32, 20.0));
        }
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);

        for _ in 0..50 {
            layout.step(&mut g, bounds(), 16.0);
        }
        for v in g.vertices() {
            assert!(v.pos.x >= 16.0 && v.pos.x <= 834.0, "{:?}", v.pos);
            assert!(v.pos.y >= 16.0 && v.pos.y <= 559.0, "{:?}", v.pos);
        }
    }

    #[test]
    fn empty_graph_settles_immediately() {
        let mut g = Graph::new();
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);
        layout.step(&mut g, bounds(), 16.0);
        assert!(layout.is_settled());
        assert_eq!(layout.kinetic_energy(), 0.0);
    }

    #[test]
    fn settled_simulation_leaves_positions_alone() {
        let mut g = pair(40.0, false);
        let before = g.vertices()[0].pos;
        // never reheated, so the simulation starts settled
        let mut layout = ForceLayout::default();
        layout.step(&mut g, bounds(), 16.0);
        assert_eq!(g.vertices()[0].pos, before);
    }

    #[test]
    fn reheat_mid_run_keeps_velocities() {
        let mut g = pair(40.0, false);
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);
        for _ in 0..3 {
            layout.step(&mut g, bounds(), 16.0);
        }

        let before = layout.velocities.clone();
        layout.reheat(&mut g);
        assert_eq!(layout.velocities, before);
        assert!(!layout.is_settled());
    }

    #[test]
    fn reheat_splits_stacked_vertices() {
        let mut g = Graph::new();
        g.add_vertex(pos2(100.0, 100.0));
        g.add_vertex(pos2(100.0, 100.0));
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);
        assert!(gap(&g) > 0.0);
    }

    #[test]
    fn forget_drops_state_and_fixes_the_pin() {
        let mut g = Graph::new();
        for i in 0..3 {
            g.add_vertex(pos2(i as f32 * 100.0, 100.0));
        }
        let mut layout = ForceLayout::default();
        layout.reheat(&mut g);
        layout.pin(2);

        layout.forget(0);
        assert_eq!(layout.pinned(), Some(1));
        assert_eq!(layout.velocities.len(), 2);

        layout.forget(1);
        assert_eq!(layout.pinned(), None);
    }
}
