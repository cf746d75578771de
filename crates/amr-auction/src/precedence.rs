//! The layered precedence graph — the initiator's view of task readiness.
//!
//! Tasks sit on one of four layers:
//!
//! - **Free** — every predecessor is scheduled; only these are auctionable;
//! - **Second** — some predecessor unscheduled, but all predecessors are
//!   scheduled or free;
//! - **Hidden** — anything deeper;
//! - **Scheduled** — awarded in a previous iteration.
//!
//! [`next`][LayeredPrecedenceGraph::next] advances one auction iteration:
//! the whole free layer moves to scheduled atomically, then the second and
//! hidden layers are refreshed.  The per-vertex `scheduled` *flag* is
//! orthogonal to the layer: it marks free tasks already awarded within the
//! current iteration, before the layers move.

use amr_core::{Duration, TaskId};
use amr_flow::{MaterialFlow, Task};
use rustc_hash::FxHashMap;

use crate::error::{AuctionError, AuctionResult};

/// The layer a task currently sits on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrecedenceLayer {
    Free,
    Second,
    Hidden,
    Scheduled,
    None,
}

/// One task plus its auction bookkeeping.
#[derive(Clone, Debug)]
struct LpgVertex {
    task: Task,
    layer: PrecedenceLayer,
    /// F[t]: latest finish time recorded when the task was awarded.
    latest_finish: Option<Duration>,
    /// PC[t]: earliest valid start, set once all predecessors are scheduled.
    earliest_valid_start: Option<Duration>,
    /// Awarded in the current iteration (free-layer tasks only).
    scheduled: bool,
}

/// Directed precedence graph with layer bookkeeping.
#[derive(Clone, Debug)]
pub struct LayeredPrecedenceGraph {
    vertices: Vec<LpgVertex>,
    /// `edges[i]` lists the successor indices of vertex `i`.
    edges: Vec<Vec<usize>>,
    index: FxHashMap<TaskId, usize>,
}

impl LayeredPrecedenceGraph {
    /// Build the graph from a validated material flow and initialize layers.
    pub fn new(flow: &MaterialFlow) -> Self {
        let mut index = FxHashMap::default();
        let vertices: Vec<LpgVertex> = flow
            .tasks()
            .iter()
            .enumerate()
            .map(|(i, task)| {
                index.insert(task.id(), i);
                LpgVertex {
                    task: task.clone(),
                    layer: PrecedenceLayer::None,
                    latest_finish: None,
                    earliest_valid_start: None,
                    scheduled: false,
                }
            })
            .collect();

        let mut edges = vec![Vec::new(); vertices.len()];
        for (i, vertex) in vertices.iter().enumerate() {
            for predecessor in vertex.task.preceding_tasks() {
                let p = index[predecessor];
                edges[p].push(i);
            }
        }

        let mut graph = Self { vertices, edges, index };
        graph.init_layers();
        graph
    }

    /// Free = no incoming edges; Second = successors of Free; Hidden = rest.
    fn init_layers(&mut self) {
        for i in 0..self.vertices.len() {
            if self.vertices[i].task.preceding_tasks().is_empty() {
                self.vertices[i].layer = PrecedenceLayer::Free;
            }
        }
        for i in 0..self.vertices.len() {
            if self.vertices[i].layer != PrecedenceLayer::Free {
                continue;
            }
            for &child in &self.edges[i].clone() {
                if self.vertices[child].layer != PrecedenceLayer::Free {
                    self.vertices[child].layer = PrecedenceLayer::Second;
                }
            }
        }
        for vertex in &mut self.vertices {
            if vertex.layer == PrecedenceLayer::None {
                vertex.layer = PrecedenceLayer::Hidden;
            }
        }
    }

    // ── Iteration advance ─────────────────────────────────────────────────

    /// Advance one iteration: every free task becomes scheduled, then second
    /// and hidden layers are promoted where their predecessors allow it.
    pub fn next(&mut self) {
        let previously_free: Vec<usize> = (0..self.vertices.len())
            .filter(|&i| self.vertices[i].layer == PrecedenceLayer::Free)
            .collect();
        for &i in &previously_free {
            self.vertices[i].layer = PrecedenceLayer::Scheduled;
        }
        for &i in &previously_free {
            self.promote_second_children(i);
        }
    }

    /// Children of the newly scheduled vertex whose predecessors are all
    /// scheduled move Second → Free; `PC[t'] = max over parents of F[p]`.
    fn promote_second_children(&mut self, scheduled: usize) {
        for child in self.edges[scheduled].clone() {
            if self.vertices[child].layer != PrecedenceLayer::Second {
                continue;
            }
            let parents = self.parents_of(child);
            let all_scheduled = parents
                .iter()
                .all(|&p| self.vertices[p].layer == PrecedenceLayer::Scheduled);
            if !all_scheduled {
                continue;
            }

            self.vertices[child].layer = PrecedenceLayer::Free;
            let earliest = parents
                .iter()
                .filter_map(|&p| self.vertices[p].latest_finish)
                .fold(f64::NEG_INFINITY, f64::max);
            if earliest.is_finite() {
                self.vertices[child].earliest_valid_start = Some(earliest);
            }

            self.promote_hidden_children(child);
        }
    }

    /// Children of a freshly freed vertex whose predecessors are all
    /// scheduled-or-free move Hidden → Second.
    fn promote_hidden_children(&mut self, freed: usize) {
        for child in self.edges[freed].clone() {
            if self.vertices[child].layer != PrecedenceLayer::Hidden {
                continue;
            }
            let ready = self.parents_of(child).iter().all(|&p| {
                matches!(
                    self.vertices[p].layer,
                    PrecedenceLayer::Scheduled | PrecedenceLayer::Free
                )
            });
            if ready {
                self.vertices[child].layer = PrecedenceLayer::Second;
            }
        }
    }

    fn parents_of(&self, child: usize) -> Vec<usize> {
        self.vertices[child]
            .task
            .preceding_tasks()
            .iter()
            .map(|id| self.index[id])
            .collect()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// All free-layer tasks — the auctionable set of this iteration.
    pub fn auctionable_tasks(&self) -> Vec<Task> {
        self.layer_tasks(PrecedenceLayer::Free)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.vertices.iter().map(|v| v.task.clone()).collect()
    }

    fn layer_tasks(&self, layer: PrecedenceLayer) -> Vec<Task> {
        self.vertices
            .iter()
            .filter(|v| v.layer == layer)
            .map(|v| v.task.clone())
            .collect()
    }

    pub fn task(&self, id: TaskId) -> AuctionResult<&Task> {
        self.vertex(id).map(|v| &v.task)
    }

    pub fn layer_of(&self, id: TaskId) -> AuctionResult<PrecedenceLayer> {
        self.vertex(id).map(|v| v.layer)
    }

    /// Every task sits on the scheduled layer (the per-iteration flag is
    /// not considered).
    pub fn are_all_tasks_scheduled(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.layer == PrecedenceLayer::Scheduled)
    }

    /// Every free task has been awarded; the current iteration is done.
    pub fn are_all_free_tasks_scheduled(&self) -> bool {
        self.vertices
            .iter()
            .filter(|v| v.layer == PrecedenceLayer::Free)
            .all(|v| v.scheduled)
    }

    /// `true` iff the task is on the free layer and already awarded in this
    /// iteration.
    pub fn is_free_task_scheduled(&self, id: TaskId) -> AuctionResult<bool> {
        self.vertex(id)
            .map(|v| v.layer == PrecedenceLayer::Free && v.scheduled)
    }

    pub fn is_task_free(&self, id: TaskId) -> AuctionResult<bool> {
        self.vertex(id).map(|v| v.layer == PrecedenceLayer::Free)
    }

    // ── Setters (called as winners come and go) ───────────────────────────

    pub fn set_latest_finish_time(&mut self, id: TaskId, time: Duration) -> AuctionResult<()> {
        self.vertex_mut(id)?.latest_finish = Some(time);
        Ok(())
    }

    pub fn latest_finish_time(&self, id: TaskId) -> AuctionResult<Option<Duration>> {
        self.vertex(id).map(|v| v.latest_finish)
    }

    pub fn set_earliest_valid_start_time(
        &mut self,
        id: TaskId,
        time: Duration,
    ) -> AuctionResult<()> {
        self.vertex_mut(id)?.earliest_valid_start = Some(time);
        Ok(())
    }

    pub fn earliest_valid_start_time(&self, id: TaskId) -> AuctionResult<Option<Duration>> {
        self.vertex(id).map(|v| v.earliest_valid_start)
    }

    pub fn set_task_scheduled(&mut self, id: TaskId) -> AuctionResult<()> {
        self.vertex_mut(id)?.scheduled = true;
        Ok(())
    }

    /// Roll an awarded-but-rejected task back so it can be auctioned again
    /// within the same iteration.
    pub fn set_task_unscheduled(&mut self, id: TaskId) -> AuctionResult<()> {
        self.vertex_mut(id)?.scheduled = false;
        Ok(())
    }

    fn vertex(&self, id: TaskId) -> AuctionResult<&LpgVertex> {
        self.index
            .get(&id)
            .map(|&i| &self.vertices[i])
            .ok_or(AuctionError::UnknownTask(id))
    }

    fn vertex_mut(&mut self, id: TaskId) -> AuctionResult<&mut LpgVertex> {
        match self.index.get(&id) {
            Some(&i) => Ok(&mut self.vertices[i]),
            None => Err(AuctionError::UnknownTask(id)),
        }
    }
}
