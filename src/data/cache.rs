use crate::engines::evaluation::FitnessMetric;
use crate::engines::generation::Chromosome;
use crate::types::Fitness;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Memoises fitness by chromosome content for the lifetime of a run.
///
/// Each distinct chromosome gets one `OnceLock` cell. The map lock is only held
/// to find or create the cell; the metric runs outside it, and concurrent
/// callers for the same chromosome block on the cell until the single
/// in-flight evaluation finishes. Failures are stored like any other result.
pub struct FitnessCache {
    metric: Arc<dyn FitnessMetric>,
    data: Mutex<HashMap<Chromosome, Arc<OnceLock<Fitness>>>>,
    evaluations: AtomicU64,
    hits: AtomicU64,
}

impl FitnessCache {
    pub fn new(metric: Arc<dyn FitnessMetric>) -> Self {
        Self {
            metric,
            data: Mutex::new(HashMap::new()),
            evaluations: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    pub fn get_or_compute(&self, chromosome: &Chromosome) -> Fitness {
        let cell = self.cell(chromosome);
        let mut computed = false;
        let fitness = *cell.get_or_init(|| {
            computed = true;
            self.evaluate(chromosome)
        });
        if !computed {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        fitness
    }

    /// Cached fitness, without evaluating.
    pub fn get(&self, chromosome: &Chromosome) -> Option<Fitness> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.get(chromosome).and_then(|cell| cell.get().copied())
    }

    /// Number of metric invocations so far.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Lookups answered without invoking the metric.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of chromosomes with a stored result.
    pub fn len(&self) -> usize {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cell(&self, chromosome: &Chromosome) -> Arc<OnceLock<Fitness>> {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cell) = data.get(chromosome) {
            return Arc::clone(cell);
        }
        let cell = Arc::new(OnceLock::new());
        data.insert(chromosome.clone(), Arc::clone(&cell));
        cell
    }

    fn evaluate(&self, chromosome: &Chromosome) -> Fitness {
        self.evaluations.fetch_add(1, Ordering::Relaxed);

        match panic::catch_unwind(AssertUnwindSafe(|| self.metric.evaluate(chromosome))) {
            Ok(Ok(cost)) => {
                log::debug!("Evaluated {:?}: cost {}", chromosome.encode(), cost);
                Fitness::Cost(cost)
            }
            Ok(Err(e)) => {
                log::warn!("Evaluation of {:?} failed: {}", chromosome.encode(), e);
                Fitness::Failed
            }
            Err(_) => {
                log::warn!("Fitness metric panicked on {:?}", chromosome.encode());
                Fitness::Failed
            }
        }
    }
}
