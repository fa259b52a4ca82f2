use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

struct Job {
    name: String,
    period: Duration,
    next_run: Instant,
    task: Box<dyn FnMut()>,
}

/// Runs registered tasks at fixed periods on the calling thread.
///
/// Jobs never overlap: due jobs run one after another inside
/// `run_pending`, and each is rescheduled one period after it ran.
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<Job>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` to run every `period`, first one period from now.
    pub fn every<F>(&mut self, period: Duration, name: &str, task: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.jobs.push(Job {
            name: name.to_string(),
            period,
            next_run: Instant::now() + period,
            task: Box::new(task),
        });
        self
    }

    /// When the earliest job is next due.
    pub fn next_due(&self) -> Option<Instant> {
        self.jobs.iter().map(|job| job.next_run).min()
    }

    /// Runs every job due now. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        self.run_pending_at(Instant::now())
    }

    pub fn run_pending_at(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        for job in self.jobs.iter_mut().filter(|job| job.next_run <= now) {
            debug!("Running scheduled job '{}'", job.name);
            (job.task)();
            job.next_run = now + job.period;
            ran += 1;
        }
        ran
    }

    /// How long to sleep before the next check: until the earliest job is
    /// due, but never longer than `check_every`.
    pub fn idle_time(&self, now: Instant, check_every: Duration) -> Duration {
        match self.next_due() {
            Some(due) => due.saturating_duration_since(now).min(check_every),
            None => check_every,
        }
    }

    /// Runs due jobs until the process is killed, waking at least every
    /// `check_every`.
    pub fn run_forever(&mut self, check_every: Duration) -> ! {
        loop {
            self.run_pending();
            thread::sleep(self.idle_time(Instant::now(), check_every));
        }
    }
}
