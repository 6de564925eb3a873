//! Plain Monte Carlo driver over the importance-sampled integrand.
//!
//! The iterations are split over a fixed number of workers. Each worker owns
//! a xoshiro256++ stream obtained from the seed by `jump()`, so a run is
//! reproducible for a given `(seed, cores, batch_size)`.

use crate::accumulator::Accumulator;
use crate::error::{Error, Result};
use crate::integrand::Integrand;
use crate::run_card::RunCard;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorState {
    Initialized,
    Running,
    Finalized,
    /// A batch failed. The points merged before the failure are kept for
    /// `estimate`, but the run cannot be resumed or finalized.
    Failed,
}

#[derive(Debug, Clone)]
pub struct IntegratorSettings {
    pub n_iterations: usize,
    pub batch_size: usize,
    pub cores: usize,
    pub seed: u64,
}

impl Default for IntegratorSettings {
    fn default() -> IntegratorSettings {
        IntegratorSettings::from(&RunCard::default())
    }
}

impl<'a> From<&'a RunCard> for IntegratorSettings {
    fn from(card: &'a RunCard) -> IntegratorSettings {
        IntegratorSettings {
            n_iterations: card.n_iterations,
            batch_size: card.batch_size,
            cores: card.cores,
            seed: card.seed,
        }
    }
}

/// Cross section and statistical error in pb.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationResult {
    pub cross_section: f64,
    pub error: f64,
    pub n_points: usize,
    pub n_zero: usize,
}

impl IntegrationResult {
    /// Fixed-width row `mass  cross_section  error` of the output file.
    pub fn to_row(&self, mass: f64) -> String {
        format!("{:7.2}{:14.9}{:14.9}", mass, self.cross_section, self.error)
    }
}

pub struct Integrator<'a> {
    integrand: Integrand<'a>,
    settings: IntegratorSettings,
    state: IntegratorState,
    accumulator: Accumulator,
    streams: Vec<Xoshiro256PlusPlus>,
    pool: rayon::ThreadPool,
}

impl<'a> Integrator<'a> {
    pub fn new(integrand: Integrand<'a>, settings: IntegratorSettings) -> Result<Integrator<'a>> {
        if settings.n_iterations == 0 || settings.batch_size == 0 {
            return Err(Error::InvalidParameter(
                "the number of iterations and the batch size must be at least 1".to_owned(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.cores)
            .build()
            .map_err(|e| Error::InvalidParameter(format!("cannot start the worker pool: {}", e)))?;
        let n_workers = pool.current_num_threads().max(1);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(settings.seed);
        let streams = (0..n_workers)
            .map(|_| {
                let stream = rng.clone();
                rng.jump();
                stream
            })
            .collect();

        Ok(Integrator {
            integrand,
            settings,
            state: IntegratorState::Initialized,
            accumulator: Accumulator::new(),
            streams,
            pool,
        })
    }

    pub fn state(&self) -> IntegratorState {
        self.state
    }

    pub fn n_workers(&self) -> usize {
        self.streams.len()
    }

    pub fn integrand(&self) -> &Integrand<'a> {
        &self.integrand
    }

    /// Current estimate in pb, available in every state.
    pub fn estimate(&self) -> (f64, f64) {
        self.accumulator.finalize()
    }

    /// Run the full iteration budget and finalize.
    pub fn run(&mut self) -> Result<IntegrationResult> {
        if self.state != IntegratorState::Initialized {
            return Err(Error::State {
                expected: IntegratorState::Initialized,
                found: self.state,
            });
        }
        self.state = IntegratorState::Running;

        info!(
            "Integrating {} points on {} workers ...",
            self.settings.n_iterations,
            self.n_workers()
        );
        let now = Instant::now();

        let mut remaining = self.settings.n_iterations;
        while remaining > 0 {
            let batch = remaining.min(self.settings.batch_size);
            if let Err(e) = self.run_batch(batch) {
                self.state = IntegratorState::Failed;
                error!(
                    "integration stopped after {} points: {}",
                    self.accumulator.count(),
                    e
                );
                return Err(e);
            }
            remaining -= batch;

            let (xsec, err) = self.accumulator.finalize();
            info!(
                "{:>10}/{} points: {:.9} +- {:.9} pb",
                self.accumulator.count(),
                self.settings.n_iterations,
                xsec,
                err
            );
        }

        self.state = IntegratorState::Finalized;
        debug!(
            "Integration took {:#?}, {} points had zero weight",
            now.elapsed(),
            self.accumulator.zero_count()
        );
        self.result()
    }

    /// Result of a finished run.
    pub fn result(&self) -> Result<IntegrationResult> {
        if self.state != IntegratorState::Finalized {
            return Err(Error::State {
                expected: IntegratorState::Finalized,
                found: self.state,
            });
        }

        let (cross_section, error) = self.accumulator.finalize();
        Ok(IntegrationResult {
            cross_section,
            error,
            n_points: self.accumulator.count(),
            n_zero: self.accumulator.zero_count(),
        })
    }

    fn run_batch(&mut self, batch: usize) -> Result<()> {
        let n_workers = self.streams.len();
        let integrand = &self.integrand;
        let streams = &mut self.streams;

        let partials: Vec<Result<Accumulator>> = self.pool.install(|| {
            streams
                .par_iter_mut()
                .enumerate()
                .map(|(i, rng)| {
                    // the first `batch % n_workers` workers take one extra point
                    let n = batch / n_workers + if i < batch % n_workers { 1 } else { 0 };
                    let mut acc = Accumulator::new();
                    for _ in 0..n {
                        acc.ingest(integrand.evaluate(rng)?);
                    }
                    Ok(acc)
                })
                .collect()
        });

        // a failed batch is dropped as a whole
        let partials = partials.into_iter().collect::<Result<Vec<Accumulator>>>()?;

        // merge in worker order so the sum does not depend on scheduling
        for partial in &partials {
            self.accumulator.merge(partial);
        }
        Ok(())
    }
}
