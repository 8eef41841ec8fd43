//! Graph model: vertices, edges, and the edit protocol.
//!
//! Vertex indices are dense (`0..n-1`) and double as positions in the
//! vertex vector, so lookups are O(1) and deleting a vertex renumbers
//! everything above it.

use egui::{Pos2, Vec2};
use std::f32::consts::TAU;

/// Smallest polygon the editor will generate.
pub const MIN_POLYGON_SIDES: u32 = 3;
/// Largest polygon the editor will generate; bigger rings stop being legible.
pub const MAX_POLYGON_SIDES: u32 = 10;

/// A vertex of the sketch.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Dense index; always equals the vertex's slot in the vector.
    pub index: usize,
    /// Display label derived from the index (`v1`, `v2`, ...), re-derived
    /// whenever deletion renumbers the vertex.
    pub label: String,
    /// Number of edge endpoints touching this vertex; a self-loop counts 2.
    pub degree: usize,
    /// Canvas position. Written by the model once at spawn; afterwards the
    /// layout simulation owns it through [`Graph::move_vertex`].
    pub pos: Pos2,
}

/// An undirected edge between two vertex indices. `source == target` is a
/// self-loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

impl Edge {
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }

    /// True when at least one endpoint is `v`.
    pub fn touches(&self, v: usize) -> bool {
        self.source == v || self.target == v
    }

    /// Unordered endpoint comparison.
    pub fn connects(&self, a: usize, b: usize) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// What a primary click on a vertex did to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The vertex became the selection.
    Selected,
    /// The vertex was the selection and no longer is.
    Deselected,
    /// An edge to the previously selected vertex was created.
    EdgeAdded,
    /// The pair was already connected; only the selection changed.
    DuplicateEdge,
}

/// The editable graph. Owns the vertex and edge collections outright; the
/// layout simulation only gets the positions-only channel in
/// [`Graph::move_vertex`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The starting sketch: a three-vertex path (v1-v2, v2-v3) scattered
    /// around `center` so the first layout pass has something to do.
    pub fn seed(center: Pos2, scatter: f32) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        let mut graph = Self::new();
        for _ in 0..3 {
            let offset = Vec2::new(
                rng.gen_range(-scatter..scatter),
                rng.gen_range(-scatter..scatter),
            );
            graph.add_vertex(center + offset);
        }
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Comma-joined degree sequence for the info panel (`"2, 1, 1"`).
    pub fn degree_summary(&self) -> String {
        self.vertices
            .iter()
            .map(|v| v.degree.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True when the unordered pair `a`/`b` already has an edge. Also
    /// answers loop existence when called with `a == b`.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    pub fn has_loop(&self, v: usize) -> bool {
        self.has_edge(v, v)
    }

    /// Move a vertex. The only position write after spawn; both the layout
    /// simulation and the drag override go through here.
    pub fn move_vertex(&mut self, index: usize, pos: Pos2) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            vertex.pos = pos;
        }
    }

    /// Create a vertex at `pos` with the next sequential index and a
    /// degree of zero. Cannot fail.
    pub fn add_vertex(&mut self, pos: Pos2) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex {
            index,
            label: vertex_label(index),
            degree: 0,
            pos,
        });
        self.debug_check();
        index
    }

    /// Delete a vertex along with every incident edge (loops included),
    /// then renumber: indices above the removed one shift down by one, in
    /// the vertex vector and in every surviving edge endpoint, and shifted
    /// labels are re-derived. Returns false (nothing changes) when the
    /// index is out of range.
    pub fn delete_vertex(&mut self, index: usize) -> bool {
        if index >= self.vertices.len() {
            return false;
        }
        self.vertices.remove(index);
        self.edges.retain(|e| !e.touches(index));
        for edge in &mut self.edges {
            if edge.source > index {
                edge.source -= 1;
            }
            if edge.target > index {
                edge.target -= 1;
            }
        }
        for (i, vertex) in self.vertices.iter_mut().enumerate().skip(index) {
            vertex.index = i;
            vertex.label = vertex_label(i);
        }
        self.recompute_degrees();
        self.debug_check();
        true
    }

    /// Connect two distinct vertices. Rejected (false, nothing changes)
    /// when an index is out of range, when the endpoints are equal (loops
    /// go through [`Graph::add_loop`]), or when the unordered pair already
    /// has an edge.
    pub fn add_edge(&mut self, a: usize, b: usize) -> bool {
        let n = self.vertices.len();
        if a >= n || b >= n || a == b || self.has_edge(a, b) {
            return false;
        }
        self.push_edge(Edge { source: a, target: b });
        true
    }

    /// Remove the edge in `slot`, giving its endpoint degrees back. A loop
    /// gives both of its endpoint slots back to the one vertex.
    pub fn delete_edge(&mut self, slot: usize) -> bool {
        if slot >= self.edges.len() {
            return false;
        }
        let edge = self.edges.remove(slot);
        self.vertices[edge.source].degree -= 1;
        self.vertices[edge.target].degree -= 1;
        self.debug_check();
        true
    }

    /// Attach a self-loop to `v`. At most one loop per vertex.
    pub fn add_loop(&mut self, v: usize) -> bool {
        if v >= self.vertices.len() || self.has_loop(v) {
            return false;
        }
        self.push_edge(Edge { source: v, target: v });
        true
    }

    /// Spawn `k` vertices on a circle of `radius` around `center` and
    /// connect consecutive pairs into a closed cycle. Rejected outside
    /// [`MIN_POLYGON_SIDES`]..=[`MAX_POLYGON_SIDES`]. The center is passed
    /// in by the caller so the model stays free of canvas knowledge.
    pub fn add_polygon(&mut self, k: u32, center: Pos2, radius: f32) -> bool {
        if !(MIN_POLYGON_SIDES..=MAX_POLYGON_SIDES).contains(&k) {
            return false;
        }
        let first = self.vertices.len();
        let k = k as usize;
        for i in 0..k {
            let angle = TAU * i as f32 / k as f32;
            let pos = Pos2::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            self.add_vertex(pos);
        }
        for i in 0..k {
            self.add_edge(first + i, first + (i + 1) % k);
        }
        self.debug_check();
        true
    }

    /// Rebuild every degree from the edge set: zero them all, then count
    /// endpoints (+2 for a loop's single vertex). Idempotent; the
    /// authoritative reconciliation after any batch of edits.
    pub fn recompute_degrees(&mut self) {
        for vertex in &mut self.vertices {
            vertex.degree = 0;
        }
        for edge in &self.edges {
            self.vertices[edge.source].degree += 1;
            self.vertices[edge.target].degree += 1;
        }
    }

    /// Selection state machine for a primary click on `clicked`.
    ///
    /// With no selection the vertex becomes selected. Clicking the selected
    /// vertex again deselects it. Clicking a different vertex attempts an
    /// edge between the two, and the selection is cleared whether or not
    /// the edge was accepted.
    pub fn handle_vertex_click(
        &mut self,
        selection: Option<usize>,
        clicked: usize,
    ) -> (Option<usize>, ClickOutcome) {
        debug_assert!(clicked < self.vertices.len());
        match selection {
            None => (Some(clicked), ClickOutcome::Selected),
            Some(v) if v == clicked => (None, ClickOutcome::Deselected),
            Some(v) => {
                if self.add_edge(v, clicked) {
                    (None, ClickOutcome::EdgeAdded)
                } else {
                    (None, ClickOutcome::DuplicateEdge)
                }
            }
        }
    }

    /// Single shared append path; every edge-creating operation funnels
    /// through here so degree bookkeeping cannot diverge.
    fn push_edge(&mut self, edge: Edge) {
        self.vertices[edge.source].degree += 1;
        self.vertices[edge.target].degree += 1;
        self.edges.push(edge);
        self.debug_check();
    }

    /// Debug-build invariant sweep: endpoint validity, unordered-pair
    /// uniqueness, degree agreement with a recount, dense index/label
    /// numbering.
    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        {
            let n = self.vertices.len();
            for (i, vertex) in self.vertices.iter().enumerate() {
                debug_assert_eq!(vertex.index, i, "vertex index desynced from slot");
                debug_assert_eq!(vertex.label, vertex_label(i), "label desynced from index");
            }
            let mut recount = vec![0usize; n];
            for (slot, edge) in self.edges.iter().enumerate() {
                debug_assert!(
                    edge.source < n && edge.target < n,
                    "edge {} endpoint out of range",
                    slot
                );
                recount[edge.source] += 1;
                recount[edge.target] += 1;
                for other in &self.edges[slot + 1..] {
                    debug_assert!(
                        !other.connects(edge.source, edge.target),
                        "duplicate edge {}-{}",
                        edge.source,
                        edge.target
                    );
                }
            }
            for (vertex, expected) in self.vertices.iter().zip(recount) {
                debug_assert_eq!(vertex.degree, expected, "degree drift on {}", vertex.label);
            }
        }
    }
}

/// Labels count from 1 (`v1`) while indices count from 0.
fn vertex_label(index: usize) -> String {
    format!("v{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    /// Path graph v1-v2-...-vn at distinct positions.
    fn path(n: usize) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_vertex(pos2(i as f32 * 50.0, 0.0));
        }
        for i in 1..n {
            g.add_edge(i - 1, i);
        }
        g
    }

    fn degrees(g: &Graph) -> Vec<usize> {
        g.vertices().iter().map(|v| v.degree).collect()
    }

    fn labels(g: &Graph) -> Vec<&str> {
        g.vertices().iter().map(|v| v.label.as_str()).collect()
    }

    /// Release-mode twin of the debug_check sweep, used by the edit-burst
    /// test below.
    fn assert_invariants(g: &Graph) {
        let n = g.vertex_count();
        let mut recount = vec![0usize; n];
        for (slot, edge) in g.edges().iter().enumerate() {
            assert!(edge.source < n && edge.target < n);
            recount[edge.source] += 1;
            recount[edge.target] += 1;
            for other in &g.edges()[slot + 1..] {
                assert!(!other.connects(edge.source, edge.target));
            }
        }
        for (i, vertex) in g.vertices().iter().enumerate() {
            assert_eq!(vertex.index, i);
            assert_eq!(vertex.degree, recount[i]);
        }
    }

    #[test]
    fn labels_follow_indices() {
        let g = path(3);
        assert_eq!(labels(&g), ["v1", "v2", "v3"]);
    }

    #[test]
    fn add_edge_rejects_duplicates_in_both_orientations() {
        let mut g = path(2);
        assert!(!g.add_edge(0, 1));
        assert!(!g.add_edge(1, 0));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn add_edge_rejects_self_connection() {
        let mut g = path(2);
        assert!(!g.add_edge(0, 0));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn add_edge_rejects_missing_endpoints() {
        let mut g = path(2);
        assert!(!g.add_edge(0, 5));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn loop_counts_two_toward_degree() {
        let mut g = path(1);
        assert!(g.add_loop(0));
        assert_eq!(degrees(&g), [2]);
    }

    #[test]
    fn at_most_one_loop_per_vertex() {
        let mut g = path(1);
        assert!(g.add_loop(0));
        assert!(!g.add_loop(0));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn delete_edge_gives_degrees_back() {
        let mut g = path(3); // degrees 1, 2, 1
        assert!(g.delete_edge(0));
        assert_eq!(degrees(&g), [0, 1, 1]);
        assert!(!g.delete_edge(7));
    }

    #[test]
    fn delete_loop_gives_back_both_endpoint_slots() {
        let mut g = path(2);
        g.add_loop(1);
        assert_eq!(degrees(&g), [1, 3]);
        assert!(g.delete_edge(1));
        assert_eq!(degrees(&g), [1, 1]);
    }

    #[test]
    fn delete_vertex_cascades_and_renumbers() {
        // v1-v2-v3; deleting the middle vertex takes both edges with it
        let mut g = path(3);
        assert!(g.delete_vertex(1));
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(labels(&g), ["v1", "v2"]);
        assert_eq!(degrees(&g), [0, 0]);
    }

    #[test]
    fn delete_vertex_shifts_surviving_endpoints() {
        let mut g = path(4); // edges (0,1) (1,2) (2,3)
        g.add_edge(0, 3);
        assert!(g.delete_vertex(1));
        // survivors were (2,3) and (0,3); endpoints past the hole shift down
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert!(g.has_edge(1, 2));
        assert!(g.has_edge(0, 2));
        assert_eq!(degrees(&g), [1, 1, 2]);
    }

    #[test]
    fn delete_vertex_out_of_range_is_a_no_op() {
        let mut g = path(2);
        assert!(!g.delete_vertex(2));
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn polygon_forms_one_closed_cycle() {
        let mut g = Graph::new();
        assert!(g.add_polygon(4, pos2(100.0, 100.0), 80.0));
        assert_eq!(g.vertex_count(), 4);
        assert_eq!(g.edge_count(), 4);
        assert!(degrees(&g).iter().all(|&d| d == 2));

        // walking over fresh edges from v1 must visit everything and come home
        let mut visited = [false; 4];
        let mut at = 0usize;
        let mut prev = usize::MAX;
        for _ in 0..4 {
            visited[at] = true;
            let next = g
                .edges()
                .iter()
                .filter_map(|e| {
                    if e.source == at {
                        Some(e.target)
                    } else if e.target == at {
                        Some(e.source)
                    } else {
                        None
                    }
                })
                .find(|&w| w != prev)
                .expect("degree-2 vertex must have an onward edge");
            prev = at;
            at = next;
        }
        assert_eq!(at, 0);
        assert!(visited.iter().all(|&v| v));
    }

    #[test]
    fn polygon_rejects_out_of_range_sizes() {
        let mut g = path(2);
        assert!(!g.add_polygon(2, pos2(0.0, 0.0), 80.0));
        assert!(!g.add_polygon(11, pos2(0.0, 0.0), 80.0));
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn polygon_appends_after_existing_vertices() {
        let mut g = path(2);
        assert!(g.add_polygon(3, pos2(0.0, 0.0), 50.0));
        assert_eq!(g.vertex_count(), 5);
        assert_eq!(g.edge_count(), 4);
        assert!(g.has_edge(2, 3) && g.has_edge(3, 4) && g.has_edge(2, 4));
    }

    #[test]
    fn recompute_agrees_with_incremental_bookkeeping() {
        let mut g = path(5);
        g.add_loop(2);
        g.add_edge(0, 4);
        g.delete_edge(1);
        g.delete_vertex(3);
        let incremental = degrees(&g);
        g.recompute_degrees();
        assert_eq!(degrees(&g), incremental);
        // and it is idempotent
        g.recompute_degrees();
        assert_eq!(degrees(&g), incremental);
    }

    #[test]
    fn click_selects_then_deselects() {
        let mut g = path(2);
        let (sel, outcome) = g.handle_vertex_click(None, 0);
        assert_eq!(sel, Some(0));
        assert_eq!(outcome, ClickOutcome::Selected);
        let (sel, outcome) = g.handle_vertex_click(sel, 0);
        assert_eq!(sel, None);
        assert_eq!(outcome, ClickOutcome::Deselected);
    }

    #[test]
    fn click_pair_creates_exactly_one_edge() {
        let mut g = Graph::new();
        g.add_vertex(pos2(0.0, 0.0));
        g.add_vertex(pos2(50.0, 0.0));

        let (sel, _) = g.handle_vertex_click(None, 0);
        let (sel, outcome) = g.handle_vertex_click(sel, 1);
        assert_eq!(sel, None);
        assert_eq!(outcome, ClickOutcome::EdgeAdded);
        assert!(g.has_edge(0, 1));

        // the second attempt trips the duplicate check and still clears
        let (sel, _) = g.handle_vertex_click(None, 1);
        let (sel, outcome) = g.handle_vertex_click(sel, 0);
        assert_eq!(sel, None);
        assert_eq!(outcome, ClickOutcome::DuplicateEdge);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn seed_graph_is_a_three_vertex_path() {
        let g = Graph::seed(pos2(425.0, 287.0), 120.0);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree_summary(), "1, 2, 1");
    }

    #[test]
    fn invariants_hold_across_an_edit_burst() {
        // a scripted session touching every operation
        let mut g = Graph::seed(pos2(400.0, 300.0), 100.0);
        assert_invariants(&g);
        g.add_polygon(5, pos2(400.0, 300.0), 150.0);
        assert_invariants(&g);
        g.add_loop(4);
        assert_invariants(&g);
        g.add_edge(0, 6);
        assert_invariants(&g);
        g.delete_edge(0);
        assert_invariants(&g);
        g.delete_vertex(2);
        assert_invariants(&g);
        let last = g.add_vertex(pos2(10.0, 10.0));
        g.add_edge(last, 0);
        assert_invariants(&g);
    }
}
