//! Phase-setting helpers
//!
//! An amplifier chain runs one engine per phase setting, all loaded with the
//! same program. Each engine receives its phase as its first input, engine 0
//! additionally receives the initial signal, and the answer is the terminal
//! engine's last output. [`max_signal`] tries every ordering of a set of phase
//! settings and keeps the best one.

use super::{Pipeline, PipelineConfig, PipelineError, Topology};
use crate::interpreter::engine::Engine;
use crate::program::Program;
use tracing::debug;

/// Best result of a phase-permutation search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestSignal {
    pub signal: i64,
    pub phases: Vec<i64>,
}

/// Lazily yields every ordering of a slice in lexicographic position order.
///
/// Only the current ordering is held in memory, so the search space may be far
/// larger than what could be collected up front. Repeated values are treated as
/// distinct positions, so `n` values always yield `n!` orderings.
#[derive(Debug, Clone)]
pub struct Permutations<'a> {
    values: &'a [i64],
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for Permutations<'_> {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Vec<i64>> {
        if self.done {
            return None;
        }
        let current = self.indices.iter().map(|&i| self.values[i]).collect();

        // Advance to the next index ordering, or finish after the last one
        match self.indices.windows(2).rposition(|pair| pair[0] < pair[1]) {
            Some(pivot) => {
                let swap = self
                    .indices
                    .iter()
                    .rposition(|&i| i > self.indices[pivot])
                    .unwrap_or(pivot);
                self.indices.swap(pivot, swap);
                self.indices[pivot + 1..].reverse();
            }
            None => self.done = true,
        }

        Some(current)
    }
}

/// Every ordering of `values`
pub fn permutations(values: &[i64]) -> Permutations<'_> {
    Permutations {
        values,
        indices: (0..values.len()).collect(),
        done: false,
    }
}

/// Run one amplifier chain and return the terminal engine's last output
pub fn amplify(
    program: &Program,
    phases: &[i64],
    signal: i64,
    topology: Topology,
    config: PipelineConfig,
) -> Result<i64, PipelineError> {
    let engines: Vec<Engine> = phases.iter().map(|_| Engine::new(program)).collect();
    let mut pipeline = Pipeline::new(engines, topology)?.with_config(config);

    for (index, &phase) in phases.iter().enumerate() {
        pipeline.prime(index, &[phase])?;
    }
    pipeline.prime(0, &[signal])?;

    pipeline.run()?.last().ok_or(PipelineError::NoOutput)
}

/// Try every ordering of `phase_values` and return the highest signal
pub fn max_signal(
    program: &Program,
    phase_values: &[i64],
    signal: i64,
    topology: Topology,
    config: PipelineConfig,
) -> Result<BestSignal, PipelineError> {
    if phase_values.is_empty() {
        return Err(PipelineError::Configuration(
            "at least one phase setting is required".to_string(),
        ));
    }

    let mut best: Option<BestSignal> = None;
    for phases in permutations(phase_values) {
        let result = amplify(program, &phases, signal, topology, config)?;
        if best.as_ref().map_or(true, |b| result > b.signal) {
            best = Some(BestSignal {
                signal: result,
                phases,
            });
        }
    }

    let best = best.ok_or(PipelineError::NoOutput)?;
    debug!(signal = best.signal, phases = ?best.phases, "best phase ordering");
    Ok(best)
}
