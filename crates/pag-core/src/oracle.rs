//! Independence-oracle seam and the per-call timeout guard, which runs
//! timed calls on a fixed worker pool.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::defaults::DEFAULT_TEST_WORKERS;
use crate::data::DataType;
use crate::errors::{PagError, PagResult, SearchError};

const JOB_QUEUE_CAPACITY: usize = 1024;

/// Outcome of one conditional independence test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndependenceResult {
    pub independent: bool,
    pub p_value: f64,
}

impl IndependenceResult {
    pub fn independent(p_value: f64) -> Self {
        Self {
            independent: true,
            p_value,
        }
    }

    pub fn dependent(p_value: f64) -> Self {
        Self {
            independent: false,
            p_value,
        }
    }
}

/// `test(x, y, Z)`. Implementations must be safe to call from several
/// threads at once.
pub trait IndependenceTest: Send + Sync {
    fn check_independence(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult>;

    /// Variables the oracle can answer about.
    fn variables(&self) -> Vec<String>;

    /// Significance level used to turn p-values into decisions.
    fn alpha(&self) -> f64 {
        0.05
    }

    /// Fail with `UnsupportedDataType` if the oracle cannot test this kind of data.
    fn check_data_type(&self, data_type: DataType) -> PagResult<()> {
        let _ = data_type;
        Ok(())
    }
}

/// Validating, optionally time-limited wrapper around an oracle.
#[derive(Clone)]
pub struct GuardedOracle {
    inner: Arc<dyn IndependenceTest>,
    timeout: Option<Duration>,
    workers: usize,
    // Started on the first timed call and shared by clones.
    pool: Arc<OnceLock<TestPool>>,
}

impl std::fmt::Debug for GuardedOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardedOracle")
            .field("timeout", &self.timeout)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl GuardedOracle {
    pub fn new(inner: Arc<dyn IndependenceTest>) -> Self {
        Self {
            inner,
            timeout: None,
            workers: DEFAULT_TEST_WORKERS,
            pool: Arc::new(OnceLock::new()),
        }
    }

    /// Bound every call to `timeout_ms`; 0 disables the bound.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        self.pool = Arc::new(OnceLock::new());
        self
    }

    /// Number of threads serving timed calls. A call that overruns keeps
    /// its thread busy until the oracle returns.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self.pool = Arc::new(OnceLock::new());
        self
    }

    pub fn inner(&self) -> &Arc<dyn IndependenceTest> {
        &self.inner
    }

    pub fn variables(&self) -> Vec<String> {
        self.inner.variables()
    }

    pub fn alpha(&self) -> f64 {
        self.inner.alpha()
    }

    /// Run one test. Rejects malformed conditioning sets and reports an
    /// overrun as `OracleTimeout`.
    pub fn test(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult> {
        validate_conditioning_set(x, y, z)?;
        match self.timeout {
            None => self.inner.check_independence(x, y, z),
            Some(limit) => self.test_with_deadline(x, y, z, limit),
        }
    }

    /// Like [`GuardedOracle::test`], but a timeout degrades to "dependent"
    /// so the caller keeps the edge.
    pub fn test_or_dependent(&self, x: &str, y: &str, z: &[String]) -> PagResult<IndependenceResult> {
        match self.test(x, y, z) {
            Err(e) if e.is_recoverable() => {
                warn!(x, y, conditioning = z.len(), error = %e, "independence test timed out; treating as dependent");
                Ok(IndependenceResult::dependent(0.0))
            }
            other => other,
        }
    }

    /// Time spent queued for a worker counts against `limit`.
    fn test_with_deadline(
        &self,
        x: &str,
        y: &str,
        z: &[String],
        limit: Duration,
    ) -> PagResult<IndependenceResult> {
        let pool = self.pool.get_or_init(|| TestPool::start(&self.inner, self.workers));
        let deadline = Instant::now() + limit;
        let (reply, answer) = bounded(1);
        let job = TestJob {
            x: x.to_string(),
            y: y.to_string(),
            z: z.to_vec(),
            deadline,
            reply,
        };

        match pool.jobs.send_timeout(job, limit) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(timed_out(x, y, limit)),
            Err(SendTimeoutError::Disconnected(_)) => return Err(no_workers(x, y)),
        }
        match answer.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(timed_out(x, y, limit)),
            Err(RecvTimeoutError::Disconnected) => Err(SearchError::OracleFailure {
                x: x.to_string(),
                y: y.to_string(),
                reason: "oracle worker exited without an answer".to_string(),
            }
            .into()),
        }
    }
}

fn timed_out(x: &str, y: &str, limit: Duration) -> PagError {
    SearchError::OracleTimeout {
        x: x.to_string(),
        y: y.to_string(),
        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }
    .into()
}

fn no_workers(x: &str, y: &str) -> PagError {
    SearchError::OracleFailure {
        x: x.to_string(),
        y: y.to_string(),
        reason: "no oracle worker is running".to_string(),
    }
    .into()
}

struct TestJob {
    x: String,
    y: String,
    z: Vec<String>,
    deadline: Instant,
    reply: Sender<PagResult<IndependenceResult>>,
}

/// Fixed set of threads draining a bounded job queue. Jobs whose caller
/// already timed out are skipped. Dropping the pool closes the queue and
/// the workers exit once their current call returns.
struct TestPool {
    jobs: Sender<TestJob>,
}

impl TestPool {
    fn start(inner: &Arc<dyn IndependenceTest>, workers: usize) -> Self {
        let (jobs, queue) = bounded::<TestJob>(JOB_QUEUE_CAPACITY);
        let mut started = 0;
        for i in 0..workers {
            let queue: Receiver<TestJob> = queue.clone();
            let inner = Arc::clone(inner);
            let spawned = std::thread::Builder::new()
                .name(format!("pag-oracle-{i}"))
                .spawn(move || {
                    for job in queue.iter() {
                        if Instant::now() >= job.deadline {
                            continue;
                        }
                        // The caller may have given up; a closed reply channel is fine.
                        let _ = job.reply.send(inner.check_independence(&job.x, &job.y, &job.z));
                    }
                });
            match spawned {
                Ok(_) => started += 1,
                Err(e) => warn!(worker = i, error = %e, "failed to start oracle worker"),
            }
        }
        debug!(workers = started, capacity = JOB_QUEUE_CAPACITY, "oracle worker pool started");
        Self { jobs }
    }
}

/// Reject a conditioning set that contains `x`, `y`, or a repeated name.
pub fn validate_conditioning_set(x: &str, y: &str, z: &[String]) -> PagResult<()> {
    let invalid = |reason: String| -> PagResult<()> {
        Err(SearchError::InvalidConditioningSet {
            x: x.to_string(),
            y: y.to_string(),
            reason,
        }
        .into())
    };
    if x == y {
        return invalid("x and y are the same variable".to_string());
    }
    for (i, v) in z.iter().enumerate() {
        if v == x || v == y {
            return invalid(format!("{v} is one of the tested variables"));
        }
        if z[..i].contains(v) {
            return invalid(format!("{v} appears more than once"));
        }
    }
    Ok(())
}
