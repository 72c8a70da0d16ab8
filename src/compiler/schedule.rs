//! Dependency ordering for workflow nodes.
//!
//! Kahn's algorithm over the workflow's edges. Nodes that are ready at the
//! same time are visited in FIFO order: declaration order for the initial
//! frontier, discovery order afterwards. Cycles are never fatal; nodes the
//! traversal cannot reach are reported back instead of scheduled.

use crate::workflow::WorkflowDefinition;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A cooperative limit on traversal, checked once before every dequeue.
pub trait Budget {
    /// `steps` is the number of nodes visited so far. Returning `true`
    /// stops the traversal before the next node.
    fn exhausted(&mut self, steps: usize) -> bool;
}

impl<F> Budget for F
where
    F: FnMut(usize) -> bool,
{
    fn exhausted(&mut self, steps: usize) -> bool {
        self(steps)
    }
}

/// Never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl Budget for Unlimited {
    fn exhausted(&mut self, _steps: usize) -> bool {
        false
    }
}

/// Allows at most `max_steps` nodes to be visited.
#[derive(Debug, Clone, Copy)]
pub struct StepBudget {
    max_steps: usize,
}

impl StepBudget {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

impl Budget for StepBudget {
    fn exhausted(&mut self, steps: usize) -> bool {
        steps >= self.max_steps
    }
}

/// Wall-clock limit measured from a fixed start instant.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(started: Instant, limit: Duration) -> Self {
        Self { started, limit }
    }

    pub fn starting_now(limit: Duration) -> Self {
        Self::new(Instant::now(), limit)
    }
}

impl Budget for Deadline {
    fn exhausted(&mut self, _steps: usize) -> bool {
        self.started.elapsed() > self.limit
    }
}

/// What a traversal managed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleOutcome {
    /// Visited node ids, in visit order.
    pub order: Vec<String>,
    /// Node ids never visited, in declaration order.
    pub unprocessed: Vec<String>,
    /// Whether the budget stopped the traversal before the queue drained.
    pub timed_out: bool,
}

/// Owns the in-degree table and ready queue for one traversal.
#[derive(Debug, Clone)]
pub struct Scheduler {
    declared: Vec<String>,
    in_degree: AHashMap<String, usize>,
    successors: AHashMap<String, Vec<String>>,
}

impl Scheduler {
    pub fn new(workflow: &WorkflowDefinition) -> Self {
        let mut declared = Vec::with_capacity(workflow.nodes.len());
        let mut in_degree: AHashMap<String, usize> = AHashMap::new();
        for node in &workflow.nodes {
            if !in_degree.contains_key(&node.id) {
                in_degree.insert(node.id.clone(), 0);
                declared.push(node.id.clone());
            }
        }

        let mut successors: AHashMap<String, Vec<String>> = AHashMap::new();
        for edge in &workflow.edges {
            if let Some(degree) = in_degree.get_mut(&edge.dest) {
                *degree += 1;
            }
            successors
                .entry(edge.origin.clone())
                .or_default()
                .push(edge.dest.clone());
        }

        Self {
            declared,
            in_degree,
            successors,
        }
    }

    /// Nodes with no incoming edges, in declaration order.
    pub fn initial_frontier(&self) -> Vec<String> {
        self.declared
            .iter()
            .filter(|id| self.in_degree.get(*id) == Some(&0))
            .cloned()
            .collect()
    }

    /// Runs the traversal, calling `visit` once per node in dependency order.
    ///
    /// `visit` always finishes its node before the budget is checked again.
    pub fn run<F>(mut self, budget: &mut dyn Budget, mut visit: F) -> ScheduleOutcome
    where
        F: FnMut(&str),
    {
        let mut queue: VecDeque<String> = self.initial_frontier().into();
        let mut visited: AHashSet<String> = AHashSet::with_capacity(self.declared.len());
        let mut order = Vec::with_capacity(self.declared.len());
        let mut timed_out = false;

        while !queue.is_empty() {
            if budget.exhausted(order.len()) {
                tracing::warn!(visited = order.len(), "scheduling budget exhausted");
                timed_out = true;
                break;
            }
            let Some(current) = queue.pop_front() else {
                break;
            };

            visit(&current);
            visited.insert(current.clone());

            if let Some(successors) = self.successors.get(&current) {
                for dest in successors {
                    if let Some(degree) = self.in_degree.get_mut(dest) {
                        if *degree > 0 {
                            *degree -= 1;
                            if *degree == 0 {
                                queue.push_back(dest.clone());
                            }
                        }
                    }
                }
            }
            order.push(current);
        }

        let unprocessed = self
            .declared
            .iter()
            .filter(|id| !visited.contains(*id))
            .cloned()
            .collect();

        ScheduleOutcome {
            order,
            unprocessed,
            timed_out,
        }
    }
}

/// Dependency order of `workflow` with no budget and no per-node work.
pub fn topological_order(workflow: &WorkflowDefinition) -> ScheduleOutcome {
    Scheduler::new(workflow).run(&mut Unlimited, |_| {})
}
