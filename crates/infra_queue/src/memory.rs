//! In-memory job queue

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use core_kernel::{Job, JobId, JobQueue, JobState, PortError};

/// Finished jobs kept readable unless configured otherwise
pub const DEFAULT_FINISHED_CAPACITY: usize = 1000;

#[derive(Debug, Default)]
struct QueueState {
    jobs: HashMap<JobId, Job>,
    pending: HashMap<String, VecDeque<JobId>>,
    /// Finished job ids, oldest first
    finished: VecDeque<JobId>,
}

impl QueueState {
    fn push(&mut self, job: Job) {
        self.pending
            .entry(job.channel.clone())
            .or_default()
            .push_back(job.id);
        self.jobs.insert(job.id, job);
    }

    /// Records `id` as finished, forgetting the oldest finished jobs
    /// beyond `capacity`
    fn retire(&mut self, id: JobId, capacity: usize) {
        self.finished.push_back(id);
        while self.finished.len() > capacity {
            if let Some(oldest) = self.finished.pop_front() {
                self.jobs.remove(&oldest);
            }
        }
    }
}

/// Job queue holding jobs in process memory
///
/// Each channel is a FIFO of pending job ids; `dequeue` takes the oldest
/// job that is due. Only the most recent `finished_capacity` finished jobs
/// stay readable through `get`, older ones are dropped.
#[derive(Debug)]
pub struct InMemoryJobQueue {
    state: Mutex<QueueState>,
    finished_capacity: usize,
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::with_finished_capacity(DEFAULT_FINISHED_CAPACITY)
    }
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` finished jobs
    pub fn with_finished_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            finished_capacity: capacity,
        }
    }

    /// Every job known to the queue, oldest first
    pub async fn jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<_> = self.state.lock().await.jobs.values().cloned().collect();
        jobs.sort_by_key(|job| job.created_at);
        jobs
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, job: Job) -> Result<JobId, PortError> {
        if job.state != JobState::Pending {
            return Err(PortError::validation(format!(
                "job {} is {:?}, only pending jobs can be queued",
                job.id, job.state
            )));
        }
        let id = job.id;
        let mut state = self.state.lock().await;
        if state.jobs.contains_key(&id) {
            return Err(PortError::conflict(format!("job {id} is already queued")));
        }
        state.push(job);
        Ok(id)
    }

    async fn dequeue(&self, channel: &str) -> Result<Option<Job>, PortError> {
        let now = Utc::now();
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let Some(queue) = state.pending.get_mut(channel) else {
            return Ok(None);
        };
        let jobs = &state.jobs;
        let Some(position) = queue
            .iter()
            .position(|id| jobs.get(id).map_or(true, |job| job.is_due(now)))
        else {
            return Ok(None);
        };
        let Some(id) = queue.remove(position) else {
            return Ok(None);
        };
        let job = state
            .jobs
            .get_mut(&id)
            .ok_or_else(|| PortError::internal(format!("queued job {id} has no record")))?;
        job.state = JobState::Started;
        job.date_started = Some(Utc::now());
        Ok(Some(job.clone()))
    }

    async fn update(&self, job: &Job) -> Result<(), PortError> {
        let mut state = self.state.lock().await;
        let was_finished = state
            .jobs
            .get(&job.id)
            .map(Job::is_finished)
            .ok_or_else(|| PortError::not_found("Job", job.id))?;
        if job.state == JobState::Pending {
            state.push(job.clone());
        } else {
            state.jobs.insert(job.id, job.clone());
            if job.is_finished() && !was_finished {
                state.retire(job.id, self.finished_capacity);
            }
        }
        Ok(())
    }

    async fn get(&self, id: JobId) -> Result<Job, PortError> {
        self.state
            .lock()
            .await
            .jobs
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Job", id))
    }

    async fn pending_count(&self, channel: &str) -> Result<usize, PortError> {
        Ok(self
            .state
            .lock()
            .await
            .pending
            .get(channel)
            .map_or(0, VecDeque::len))
    }
}
