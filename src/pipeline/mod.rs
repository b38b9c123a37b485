//! Pipeline orchestration over several engines
//!
//! A [`Pipeline`] wires engines into a line or a ring of queues: engine `i`'s
//! outputs are queued as engine `i + 1`'s inputs, and in [`Topology::Feedback`]
//! the last engine feeds back into the first.
//!
//! # Scheduling
//!
//! Scheduling is cooperative round-robin, never parallel. On its turn an engine
//! is handed everything currently queued for it and driven until it either
//! emits one output or starves on input; control then passes to the next engine
//! in ring order. The interleaving is therefore fully deterministic.
//!
//! The run ends when every engine has halted. A full round in which no engine
//! makes progress means every live engine is starved with nothing in flight;
//! that is reported as [`PipelineError::Deadlock`] instead of spinning forever.
//!
//! - [`search`]: phase-setting helpers built on top of the pipeline

pub mod search;

pub use search::{amplify, max_signal, permutations, BestSignal, Permutations};

use crate::interpreter::engine::{Engine, OutputEvent, RunStatus};
use crate::interpreter::errors::RuntimeError;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Pipeline failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("invalid pipeline configuration: {0}")]
    Configuration(String),

    #[error("engine {engine} failed: {source}")]
    Engine {
        engine: usize,
        #[source]
        source: RuntimeError,
    },

    #[error("engine {engine} did not halt within {limit} steps")]
    NonTermination { engine: usize, limit: u64 },

    #[error("pipeline deadlocked: engines {starved:?} are waiting for input that never arrives")]
    Deadlock { starved: Vec<usize> },

    #[error("terminal engine halted without producing output")]
    NoOutput,
}

impl PipelineError {
    fn from_engine(engine: usize, err: RuntimeError) -> Self {
        match err {
            RuntimeError::StepLimitExceeded { limit, .. } => {
                PipelineError::NonTermination { engine, limit }
            }
            source => PipelineError::Engine { engine, source },
        }
    }
}

/// How engine queues are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Topology {
    /// Engine i feeds engine i + 1; the last engine's output leaves the pipeline
    #[default]
    Linear,
    /// As linear, and the last engine also feeds the first
    Feedback,
}

/// Pipeline-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    /// Per-engine step ceiling; breaching it is [`PipelineError::NonTermination`]
    pub max_steps: Option<u64>,
}

/// Every value the terminal engine emitted, in order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalOutputs {
    pub values: Vec<i64>,
}

impl TerminalOutputs {
    /// The pipeline's answer: the terminal engine's last output
    pub fn last(&self) -> Option<i64> {
        self.values.last().copied()
    }
}

/// Engines wired by single-producer single-consumer queues
#[derive(Debug, Clone)]
pub struct Pipeline {
    engines: Vec<Engine>,
    /// `queues[i]` is engine i's input queue
    queues: Vec<VecDeque<i64>>,
    topology: Topology,
    rounds: u64,
}

impl Pipeline {
    pub fn new(engines: Vec<Engine>, topology: Topology) -> Result<Self, PipelineError> {
        if engines.is_empty() {
            return Err(PipelineError::Configuration(
                "a pipeline needs at least one engine".to_string(),
            ));
        }

        let queues = vec![VecDeque::new(); engines.len()];
        Ok(Pipeline {
            engines,
            queues,
            topology,
            rounds: 0,
        })
    }

    /// Apply `config` to every engine
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        for engine in &mut self.engines {
            engine.set_step_limit(config.max_steps);
        }
        self
    }

    /// Queue initial values on one engine's input
    pub fn prime(&mut self, engine: usize, values: &[i64]) -> Result<(), PipelineError> {
        let queue = self.queues.get_mut(engine).ok_or_else(|| {
            PipelineError::Configuration(format!("no engine at index {}", engine))
        })?;
        queue.extend(values.iter().copied());
        Ok(())
    }

    /// Index of the engine whose outputs form the pipeline's result
    pub fn terminal(&self) -> usize {
        self.engines.len() - 1
    }

    fn downstream(&self, engine: usize) -> Option<usize> {
        if engine + 1 < self.engines.len() {
            Some(engine + 1)
        } else {
            match self.topology {
                Topology::Feedback => Some(0),
                Topology::Linear => None,
            }
        }
    }

    /// Drive every engine round-robin until all have halted
    pub fn run(&mut self) -> Result<TerminalOutputs, PipelineError> {
        let terminal = self.terminal();
        let mut outputs = TerminalOutputs::default();

        debug!(
            engines = self.engines.len(),
            topology = ?self.topology,
            "pipeline starting"
        );

        while !self.engines.iter().all(Engine::is_halted) {
            let mut progressed = false;

            for index in 0..self.engines.len() {
                if self.engines[index].is_halted() {
                    continue;
                }

                let fed: Vec<i64> = self.queues[index].drain(..).collect();
                let was_ready = self.engines[index].status() == RunStatus::Ready;

                let event = self.engines[index]
                    .run_until_output(&fed)
                    .map_err(|e| PipelineError::from_engine(index, e))?;
                trace!(round = self.rounds, engine = index, fed = fed.len(), ?event, "turn");

                match event {
                    OutputEvent::Value(value) => {
                        progressed = true;
                        if index == terminal {
                            outputs.values.push(value);
                        }
                        if let Some(next) = self.downstream(index) {
                            self.queues[next].push_back(value);
                        }
                    }
                    OutputEvent::Halted => progressed = true,
                    OutputEvent::AwaitingInput => {
                        progressed |= was_ready || !fed.is_empty();
                    }
                }
            }

            if !progressed {
                let starved: Vec<usize> = self
                    .engines
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| !e.is_halted())
                    .map(|(i, _)| i)
                    .collect();
                warn!(?starved, round = self.rounds, "pipeline deadlocked");
                return Err(PipelineError::Deadlock { starved });
            }

            self.rounds += 1;
        }

        debug!(
            rounds = self.rounds,
            outputs = outputs.values.len(),
            "pipeline finished"
        );
        Ok(outputs)
    }

    pub fn engines(&self) -> &[Engine] {
        &self.engines
    }

    /// Completed scheduling rounds
    pub fn rounds(&self) -> u64 {
        self.rounds
    }
}

/// Wire `engines` in order, prime each with its initial inputs, and run to completion.
///
/// `initial_inputs[i]` is queued on engine `i` before the first round.
pub fn run_ring(
    engines: Vec<Engine>,
    initial_inputs: &[Vec<i64>],
    feedback: bool,
) -> Result<TerminalOutputs, PipelineError> {
    if initial_inputs.len() != engines.len() {
        return Err(PipelineError::Configuration(format!(
            "{} engines but {} initial input lists",
            engines.len(),
            initial_inputs.len()
        )));
    }

    let topology = if feedback {
        Topology::Feedback
    } else {
        Topology::Linear
    };

    let mut pipeline = Pipeline::new(engines, topology)?;
    for (index, values) in initial_inputs.iter().enumerate() {
        pipeline.prime(index, values)?;
    }
    pipeline.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Program;

    const ECHO: &str = "3,0,4,0,99";
    const DOUBLER: &str = "3,0,1002,0,2,0,4,0,99";

    fn engines(text: &str, count: usize) -> Vec<Engine> {
        let program = Program::parse(text).unwrap();
        (0..count).map(|_| Engine::new(&program)).collect()
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert!(matches!(
            Pipeline::new(Vec::new(), Topology::Linear),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_linear_chain_of_doublers() {
        let outputs = run_ring(engines(DOUBLER, 3), &[vec![5], vec![], vec![]], false).unwrap();
        assert_eq!(outputs.values, vec![40]);
        assert_eq!(outputs.last(), Some(40));
    }

    #[test]
    fn test_single_engine_linear() {
        let outputs = run_ring(engines(ECHO, 1), &[vec![7]], false).unwrap();
        assert_eq!(outputs.last(), Some(7));
    }

    #[test]
    fn test_input_count_mismatch() {
        assert!(matches!(
            run_ring(engines(ECHO, 2), &[vec![1]], false),
            Err(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_prime_out_of_range() {
        let mut pipeline = Pipeline::new(engines(ECHO, 2), Topology::Linear).unwrap();
        assert!(pipeline.prime(2, &[1]).is_err());
    }

    #[test]
    fn test_starved_chain_deadlocks() {
        // Second engine needs two inputs but only ever receives one
        let first = Engine::from_text(ECHO).unwrap();
        let second = Engine::from_text("3,0,3,1,4,0,99").unwrap();
        let err = run_ring(vec![first, second], &[vec![1], vec![]], false).unwrap_err();
        assert_eq!(err, PipelineError::Deadlock { starved: vec![1] });
    }

    #[test]
    fn test_engine_fault_is_attributed() {
        let good = Engine::from_text(ECHO).unwrap();
        let bad = Engine::from_text("3,0,42").unwrap();
        let err = run_ring(vec![good, bad], &[vec![1], vec![]], false).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Engine {
                engine: 1,
                source: RuntimeError::IllegalOpcode { opcode: 42, .. }
            }
        ));
    }

    #[test]
    fn test_step_ceiling_reports_non_termination() {
        let looping = Engine::from_text("1105,1,0").unwrap();
        let mut pipeline = Pipeline::new(vec![looping], Topology::Linear)
            .unwrap()
            .with_config(PipelineConfig {
                max_steps: Some(1000),
            });
        assert_eq!(
            pipeline.run(),
            Err(PipelineError::NonTermination {
                engine: 0,
                limit: 1000
            })
        );
    }

    #[test]
    fn test_feedback_ring_counts_down() {
        // Each engine: read n; if n == 0 pass it on and halt, else emit n - 1 and loop.
        // 0: in [100]  2: jz [100], #14  5: add [100], #-1, [100]  9: out [100]
        // 11: jnz #1, #0  14: out [100]  16: halt
        let program = "3,100,1006,100,14,1001,100,-1,100,4,100,1105,1,0,4,100,99";
        let outputs = run_ring(engines(program, 2), &[vec![6], vec![]], true).unwrap();
        assert_eq!(outputs.values, vec![4, 2, 0, 0]);
        assert_eq!(outputs.last(), Some(0));
    }
}
