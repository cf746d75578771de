//! `MaterialFlow` — a validated precedence DAG of tasks.

use std::collections::HashMap;

use amr_core::TaskId;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};
use crate::task::Task;

/// A finite, acyclic collection of tasks with precedence edges.
///
/// Edges are stored on the tasks themselves (`Task::preceding_tasks`);
/// construction validates that every referenced predecessor exists, IDs are
/// unique, every task has orders, and the graph is acyclic.  Holding a
/// `MaterialFlow` is therefore proof of a well-formed workload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialFlow {
    tasks: Vec<Task>,
}

impl MaterialFlow {
    pub fn new(tasks: Vec<Task>) -> FlowResult<Self> {
        let mut index: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            if task.orders().is_empty() {
                return Err(FlowError::EmptyTask(task.id()));
            }
            if index.insert(task.id(), i).is_some() {
                return Err(FlowError::DuplicateTask(task.id()));
            }
        }
        for task in &tasks {
            for &predecessor in task.preceding_tasks() {
                if !index.contains_key(&predecessor) {
                    return Err(FlowError::UnknownPredecessor {
                        task: task.id(),
                        predecessor,
                    });
                }
            }
        }

        // Kahn's algorithm: if not every task can be popped, there is a cycle.
        let mut in_degree: Vec<usize> =
            tasks.iter().map(|t| t.preceding_tasks().len()).collect();
        let mut ready: Vec<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut popped = 0;
        while let Some(i) = ready.pop() {
            popped += 1;
            let id = tasks[i].id();
            for (j, task) in tasks.iter().enumerate() {
                if task.preceding_tasks().contains(&id) {
                    in_degree[j] -= 1;
                    if in_degree[j] == 0 {
                        ready.push(j);
                    }
                }
            }
        }
        if popped != tasks.len() {
            return Err(FlowError::Cyclic);
        }

        Ok(Self { tasks })
    }

    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    /// Stamp `spawn_time` onto every task's time window.
    pub fn anchor_time_windows(&mut self, spawn_time: f64) {
        for task in &mut self.tasks {
            task.anchor_time_window(spawn_time);
        }
    }
}
