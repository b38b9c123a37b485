// Integration tests for engine pipelines and phase search

use intcode::interpreter::{Engine, RuntimeError};
use intcode::pipeline::{
    amplify, max_signal, run_ring, Pipeline, PipelineConfig, PipelineError, Topology,
};
use intcode::program::Program;

const LINEAR_43210: &str = "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0";
const LINEAR_54321: &str =
    "3,23,3,24,1002,24,10,24,1002,23,-1,23,101,5,23,23,1,24,23,23,4,23,99,0,0";
const LINEAR_65210: &str = "3,31,3,32,1002,32,10,32,1001,31,-2,31,1007,31,0,33,\
                            1002,33,7,33,1,33,31,31,1,32,31,31,4,31,99,0,0,0";

const FEEDBACK_139629729: &str =
    "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5";
const FEEDBACK_18216: &str = "3,52,1001,52,-5,52,3,53,1,52,56,54,1007,54,5,55,1005,55,26,\
                              1001,54,-5,54,1105,1,12,1,53,54,53,1008,54,0,55,1001,55,1,55,\
                              2,53,55,53,4,53,1001,56,-1,56,1005,56,6,99,0,0,0,0,10";

fn program(text: &str) -> Program {
    text.parse().expect("program should parse")
}

fn linear(text: &str, phases: &[i64]) -> Result<i64, PipelineError> {
    amplify(
        &program(text),
        phases,
        0,
        Topology::Linear,
        PipelineConfig::default(),
    )
}

fn feedback(text: &str, phases: &[i64]) -> Result<i64, PipelineError> {
    amplify(
        &program(text),
        phases,
        0,
        Topology::Feedback,
        PipelineConfig::default(),
    )
}

// ========== Linear chains ==========

#[test]
fn test_linear_chains() {
    assert_eq!(linear(LINEAR_43210, &[4, 3, 2, 1, 0]), Ok(43210));
    assert_eq!(linear(LINEAR_54321, &[0, 1, 2, 3, 4]), Ok(54321));
    assert_eq!(linear(LINEAR_65210, &[1, 0, 4, 3, 2]), Ok(65210));
}

#[test]
fn test_linear_search_finds_best_ordering() {
    let cases: [(&str, i64, [i64; 5]); 3] = [
        (LINEAR_43210, 43210, [4, 3, 2, 1, 0]),
        (LINEAR_54321, 54321, [0, 1, 2, 3, 4]),
        (LINEAR_65210, 65210, [1, 0, 4, 3, 2]),
    ];

    for (text, signal, phases) in cases {
        let best = max_signal(
            &program(text),
            &[0, 1, 2, 3, 4],
            0,
            Topology::Linear,
            PipelineConfig::default(),
        )
        .unwrap();
        assert_eq!(best.signal, signal);
        assert_eq!(best.phases, phases.to_vec());
    }
}

#[test]
fn test_single_engine_pipeline() {
    // Doubles its input
    let signal = amplify(
        &program("3,11,3,12,1002,12,2,12,4,12,99,0,0"),
        &[0],
        21,
        Topology::Linear,
        PipelineConfig::default(),
    );
    assert_eq!(signal, Ok(42));
}

#[test]
fn test_multiple_outputs_flow_downstream() {
    // in, out, out, halt
    let echo = "3,0,4,0,4,0,99";
    let engines = vec![Engine::from_text(echo).unwrap(), Engine::from_text(echo).unwrap()];
    let outputs = run_ring(engines, &[vec![7], vec![]], false).unwrap();
    assert_eq!(outputs.values, vec![7, 7]);
    assert_eq!(outputs.last(), Some(7));
}

// ========== Feedback rings ==========

#[test]
fn test_feedback_rings() {
    assert_eq!(feedback(FEEDBACK_139629729, &[9, 8, 7, 6, 5]), Ok(139629729));
    assert_eq!(feedback(FEEDBACK_18216, &[9, 7, 8, 5, 6]), Ok(18216));
}

#[test]
fn test_feedback_search_finds_best_ordering() {
    let best = max_signal(
        &program(FEEDBACK_139629729),
        &[5, 6, 7, 8, 9],
        0,
        Topology::Feedback,
        PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(best.signal, 139629729);
    assert_eq!(best.phases, vec![9, 8, 7, 6, 5]);

    let best = max_signal(
        &program(FEEDBACK_18216),
        &[5, 6, 7, 8, 9],
        0,
        Topology::Feedback,
        PipelineConfig::default(),
    )
    .unwrap();
    assert_eq!(best.signal, 18216);
    assert_eq!(best.phases, vec![9, 7, 8, 5, 6]);
}

#[test]
fn test_feedback_terminal_collects_every_output() {
    let phases = [9, 8, 7, 6, 5];
    let engines: Vec<Engine> = phases
        .iter()
        .map(|_| Engine::from_text(FEEDBACK_139629729).unwrap())
        .collect();
    let mut inputs: Vec<Vec<i64>> = phases.iter().map(|&p| vec![p]).collect();
    inputs[0].push(0);

    let outputs = run_ring(engines, &inputs, true).unwrap();
    // The program loops five times before halting
    assert_eq!(outputs.values.len(), 5);
    assert_eq!(outputs.last(), Some(139629729));
}

// ========== Failures ==========

#[test]
fn test_deadlock_is_reported() {
    let echo = "3,0,4,0,99";
    let engines = vec![Engine::from_text(echo).unwrap(), Engine::from_text(echo).unwrap()];
    let mut pipeline = Pipeline::new(engines, Topology::Feedback).unwrap();
    assert_eq!(
        pipeline.run(),
        Err(PipelineError::Deadlock {
            starved: vec![0, 1]
        })
    );
}

#[test]
fn test_engine_fault_names_the_engine() {
    let engines = vec![
        Engine::from_text("3,0,4,0,99").unwrap(),
        Engine::from_text("3,0,4,-1,99").unwrap(),
    ];
    let result = run_ring(engines, &[vec![1], vec![]], false);
    assert_eq!(
        result,
        Err(PipelineError::Engine {
            engine: 1,
            source: RuntimeError::OutOfBounds { address: -1 },
        })
    );
}

#[test]
fn test_step_limit_reports_non_termination() {
    let result = amplify(
        &program("3,0,1105,1,2"),
        &[0, 1],
        0,
        Topology::Linear,
        PipelineConfig {
            max_steps: Some(100),
        },
    );
    assert_eq!(
        result,
        Err(PipelineError::NonTermination {
            engine: 0,
            limit: 100
        })
    );
}

#[test]
fn test_invalid_configurations() {
    assert!(matches!(
        Pipeline::new(Vec::new(), Topology::Linear),
        Err(PipelineError::Configuration(_))
    ));

    let engines = vec![Engine::from_text("99").unwrap()];
    assert!(matches!(
        run_ring(engines, &[], false),
        Err(PipelineError::Configuration(_))
    ));

    let result = max_signal(
        &program(LINEAR_43210),
        &[],
        0,
        Topology::Linear,
        PipelineConfig::default(),
    );
    assert!(matches!(result, Err(PipelineError::Configuration(_))));
}

#[test]
fn test_silent_pipeline_has_no_output() {
    assert_eq!(
        linear("3,0,99", &[1, 2]),
        Err(PipelineError::NoOutput)
    );
}
