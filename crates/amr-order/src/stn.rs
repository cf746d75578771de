//! The Simple Temporal Network underneath the order management.
//!
//! Vertices are the start/finish events of queued orders plus a single
//! origin (always index 0, representing "now").  A directed edge `u → v`
//! with weight `w` encodes `time(v) − time(u) ≤ w`.
//!
//! Edges are *multi-weight*: a positive edge collects latest-bound weights
//! (effective weight is their maximum), a negative edge collects
//! earliest-bound weights (effective weight is their minimum).  The
//! get-to-start travel constraint shares an edge with the plain ordering
//! constraint and is re-tightened in place, which is what the multi-weight
//! representation exists for.
//!
//! Solving is Floyd–Warshall over the effective weights; the network is
//! consistent exactly when the distance matrix diagonal is non-negative.

use amr_core::{Duration, OrderId};

// ── VertexKey ─────────────────────────────────────────────────────────────────

/// Identifies one STN vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexKey {
    /// The time origin ("now"); always index 0.
    Origin,
    /// The start or finish event of one order.
    Order { order: OrderId, start: bool },
}

impl VertexKey {
    pub fn start_of(order: OrderId) -> Self {
        VertexKey::Order { order, start: true }
    }

    pub fn finish_of(order: OrderId) -> Self {
        VertexKey::Order { order, start: false }
    }
}

// ── StnEdge ───────────────────────────────────────────────────────────────────

/// A multi-weight edge; all weights share one sign class.
#[derive(Clone, Debug)]
pub(crate) struct StnEdge {
    weights: Vec<f64>,
    all_positive: bool,
}

impl StnEdge {
    fn new(all_positive: bool) -> Self {
        Self {
            weights: Vec::new(),
            all_positive,
        }
    }

    fn add_weight(&mut self, weight: f64) {
        debug_assert!(
            if self.all_positive { weight >= 0.0 } else { weight <= 0.0 },
            "weight {weight} does not fit the edge sign class"
        );
        self.weights.push(weight);
    }

    /// The binding weight: max of the latest bounds, min of the earliest.
    fn effective(&self) -> f64 {
        let iter = self.weights.iter().copied();
        if self.all_positive {
            iter.fold(f64::NEG_INFINITY, f64::max)
        } else {
            iter.fold(f64::INFINITY, f64::min)
        }
    }

    fn update_weight(&mut self, index: usize, weight: f64) {
        debug_assert!(
            if self.all_positive { weight >= 0.0 } else { weight <= 0.0 },
            "weight {weight} does not fit the edge sign class"
        );
        self.weights[index] = weight;
    }

    fn last_index(&self) -> usize {
        self.weights.len() - 1
    }
}

// ── Stn ───────────────────────────────────────────────────────────────────────

/// The constraint graph plus its latest solved distance matrix.
#[derive(Clone, Debug)]
pub(crate) struct Stn {
    vertices: Vec<VertexKey>,
    adjacency: Vec<Vec<Option<StnEdge>>>,
    d_graph: Vec<Vec<f64>>,
}

impl Stn {
    pub fn new() -> Self {
        Self {
            vertices: vec![VertexKey::Origin],
            adjacency: vec![vec![None]],
            d_graph: Vec::new(),
        }
    }

    pub fn index_of(&self, key: VertexKey) -> Option<usize> {
        self.vertices.iter().position(|&v| v == key)
    }

    /// Number of vertices including the origin.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn expect_index(&self, key: VertexKey) -> usize {
        self.index_of(key).expect("vertex is not part of the STN")
    }

    pub fn add_vertex(&mut self, key: VertexKey) {
        debug_assert!(self.index_of(key).is_none(), "vertex already present");
        self.vertices.push(key);
        for row in &mut self.adjacency {
            row.push(None);
        }
        self.adjacency.push(vec![None; self.vertices.len()]);
    }

    pub fn remove_vertex(&mut self, key: VertexKey) {
        let index = self.expect_index(key);
        debug_assert!(index != 0, "the origin cannot be removed");
        self.vertices.remove(index);
        self.adjacency.remove(index);
        for row in &mut self.adjacency {
            row.remove(index);
        }
        self.d_graph.clear();
    }

    // ── Constraints ───────────────────────────────────────────────────────

    fn add_weight(&mut self, from: usize, to: usize, weight: f64, all_positive: bool) {
        let edge = self.adjacency[from][to].get_or_insert_with(|| StnEdge::new(all_positive));
        edge.add_weight(weight);
    }

    /// Bound one vertex against the origin: `earliest <= time(v) <= latest`
    /// (either side optional), both relative to the origin.
    pub fn add_unary_constraint(
        &mut self,
        key: VertexKey,
        earliest: Option<Duration>,
        latest: Option<Duration>,
    ) {
        let v = self.expect_index(key);
        if let Some(earliest) = earliest {
            self.add_weight(v, 0, -earliest, false);
        }
        if let Some(latest) = latest {
            self.add_weight(0, v, latest, true);
        }
    }

    /// Bound the gap between two vertices:
    /// `lower <= time(to) − time(from) <= upper` (upper optional).
    pub fn add_binary_constraint(
        &mut self,
        from: VertexKey,
        to: VertexKey,
        lower: Duration,
        upper: Option<Duration>,
    ) {
        let f = self.expect_index(from);
        let t = self.expect_index(to);
        self.add_weight(t, f, -lower, false);
        if let Some(upper) = upper {
            self.add_weight(f, t, upper, true);
        }
    }

    /// Re-tighten the most recently added lower bound on `from → to`.
    ///
    /// # Panics
    /// Panics if no lower-bound edge exists between the two vertices.
    pub fn update_last_lower_bound(&mut self, from: VertexKey, to: VertexKey, lower: Duration) {
        let f = self.expect_index(from);
        let t = self.expect_index(to);
        let edge = self.adjacency[t][f]
            .as_mut()
            .expect("no lower-bound edge to update");
        edge.update_weight(edge.last_index(), -lower);
    }

    // ── Time origin ───────────────────────────────────────────────────────

    /// Shift the origin forward by `delta` seconds: origin-outgoing weights
    /// grow by `delta`, origin-incoming weights shrink by `delta`,
    /// preserving each edge's sign convention.
    pub fn advance_origin(&mut self, delta: Duration) {
        if delta < 0.0 {
            return;
        }
        let n = self.vertices.len();
        for j in 1..n {
            if let Some(edge) = self.adjacency[0][j].as_mut() {
                let weight = edge.weights[0];
                edge.update_weight(0, weight + delta);
            }
        }
        for i in 1..n {
            if let Some(edge) = self.adjacency[i][0].as_mut() {
                let weight = edge.weights[0];
                edge.update_weight(0, weight - delta);
            }
        }
    }

    // ── Solving ───────────────────────────────────────────────────────────

    /// All-pairs shortest paths over the effective weights.
    ///
    /// Returns `false` (leaving the previous distance matrix untouched) when
    /// the constraints are inconsistent.
    pub fn solve(&mut self) -> bool {
        let n = self.vertices.len();
        let mut d = vec![vec![f64::INFINITY; n]; n];
        for (i, row) in self.adjacency.iter().enumerate() {
            d[i][i] = 0.0;
            for (j, edge) in row.iter().enumerate() {
                if let Some(edge) = edge {
                    d[i][j] = d[i][j].min(edge.effective());
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                if d[i][k].is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let via = d[i][k] + d[k][j];
                    if via < d[i][j] {
                        d[i][j] = via;
                    }
                }
            }
        }

        let consistent = (0..n).all(|i| d[i][i] >= 0.0);
        if consistent {
            self.d_graph = d;
        }
        consistent
    }

    /// Shortest-path distance from the latest solve.
    ///
    /// `distance(v, 0)` is the negated earliest start of `v` relative to the
    /// origin.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.d_graph[from][to]
    }

    /// The distance matrix of the latest successful solve.
    pub fn d_graph(&self) -> &[Vec<f64>] {
        &self.d_graph
    }
}
