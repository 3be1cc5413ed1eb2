//! Tasks observed from agents, with request fencing.
//!
//! Every outbound request for a task is issued a [`RequestTicket`] carrying a
//! per-task sequence number. A response is applied only if its ticket is newer
//! than the last applied one, so a slow reply can never overwrite the result
//! of a request started after it. Once a terminal state has been applied, the
//! task only accepts further terminal reads.

use a2a_playground_protocol::{Task, TaskState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::registry::Registry;

/// Oldest events are dropped once the log reaches this length
pub const MAX_EVENTS: usize = 500;

/// Proof that a request was started, presented when applying its response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestTicket {
    pub task_id: String,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request for the task was already applied
    Stale,
    /// The task already reached a terminal state
    TerminalLocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTask {
    pub task_id: String,
    pub agent_url: String,
    /// Latest applied response; `None` when the agent answered without a task
    pub task: Option<Task>,
    pub last_applied_seq: u64,
    pub next_seq: u64,
    pub updated_at: DateTime<Utc>,
}

impl TrackedTask {
    fn new(task_id: &str, agent_url: &str) -> Self {
        Self {
            task_id: task_id.to_string(),
            agent_url: agent_url.to_string(),
            task: None,
            last_applied_seq: 0,
            next_seq: 1,
            updated_at: Utc::now(),
        }
    }

    pub fn state(&self) -> Option<TaskState> {
        self.task.as_ref().map(Task::state)
    }

    pub fn is_terminal(&self) -> bool {
        self.state().is_some_and(|state| state.is_terminal())
    }
}

/// One applied response, for the event list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub task_id: String,
    pub seq: u64,
    pub state: Option<TaskState>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    tasks: Vec<TrackedTask>,
    events: Vec<TaskEvent>,
}

impl AgentState {
    /// Tracked tasks in the order they were first seen
    pub fn tasks(&self) -> &[TrackedTask] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&TrackedTask> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn events(&self) -> &[TaskEvent] {
        &self.events
    }

    fn task_mut(&mut self, task_id: &str) -> Option<&mut TrackedTask> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }

    fn issue(&mut self, task_id: &str, agent_url: &str) -> RequestTicket {
        let index = match self.tasks.iter().position(|t| t.task_id == task_id) {
            Some(index) => index,
            None => {
                self.tasks.push(TrackedTask::new(task_id, agent_url));
                self.tasks.len() - 1
            }
        };
        let tracked = &mut self.tasks[index];
        tracked.agent_url = agent_url.to_string();
        let seq = tracked.next_seq;
        tracked.next_seq += 1;
        RequestTicket {
            task_id: task_id.to_string(),
            seq,
        }
    }

    fn apply(&mut self, ticket: &RequestTicket, task: Option<Task>) -> ApplyOutcome {
        let Some(tracked) = self.task_mut(&ticket.task_id) else {
            return ApplyOutcome::Stale;
        };
        if ticket.seq <= tracked.last_applied_seq {
            return ApplyOutcome::Stale;
        }
        let incoming_terminal = task.as_ref().is_some_and(Task::is_terminal);
        if tracked.is_terminal() && !incoming_terminal {
            return ApplyOutcome::TerminalLocked;
        }

        let now = Utc::now();
        let state = task.as_ref().map(Task::state);
        tracked.task = task;
        tracked.last_applied_seq = ticket.seq;
        tracked.updated_at = now;
        if self.events.len() >= MAX_EVENTS {
            let overflow = self.events.len() + 1 - MAX_EVENTS;
            self.events.drain(..overflow);
        }
        self.events.push(TaskEvent {
            task_id: ticket.task_id.clone(),
            seq: ticket.seq,
            state,
            at: now,
        });
        ApplyOutcome::Applied
    }
}

impl Registry<AgentState> {
    /// Start tracking `task_id` if needed and reserve the next sequence number
    pub fn issue_ticket(&self, task_id: &str, agent_url: &str) -> RequestTicket {
        self.update_with(|state| {
            let mut next = state.clone();
            let ticket = next.issue(task_id, agent_url);
            (Some(next), ticket)
        })
    }

    pub fn apply(&self, ticket: &RequestTicket, task: Option<Task>) -> ApplyOutcome {
        let outcome = self.update_with(|state| {
            let mut next = state.clone();
            match next.apply(ticket, task) {
                ApplyOutcome::Applied => (Some(next), ApplyOutcome::Applied),
                other => (None, other),
            }
        });
        match outcome {
            ApplyOutcome::Applied => {
                debug!(task_id = %ticket.task_id, seq = ticket.seq, "Applied task response");
            }
            ApplyOutcome::Stale | ApplyOutcome::TerminalLocked => {
                warn!(
                    task_id = %ticket.task_id,
                    seq = ticket.seq,
                    ?outcome,
                    "Discarded task response"
                );
            }
        }
        outcome
    }

    pub fn task(&self, task_id: &str) -> Option<TrackedTask> {
        self.snapshot().task(task_id).cloned()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        self.snapshot().events().to_vec()
    }
}
