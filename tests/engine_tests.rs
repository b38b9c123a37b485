// Integration tests for the single-engine interpreter

use intcode::interpreter::{Engine, OutputEvent, RunStatus, RuntimeError, Step};
use intcode::program::Program;

fn engine(text: &str) -> Engine {
    Engine::from_text(text).expect("program should parse")
}

fn run(text: &str, inputs: &[i64]) -> Vec<i64> {
    let mut engine = engine(text);
    let outputs = engine.run_to_halt(inputs).expect("execution failed");
    assert!(engine.is_halted(), "program did not halt");
    outputs
}

fn final_memory(text: &str) -> Vec<i64> {
    let mut engine = engine(text);
    engine.run_to_halt(&[]).expect("execution failed");
    engine.memory().words().to_vec()
}

// ========== Basic execution ==========

#[test]
fn test_halt_only_program() {
    let mut engine = engine("99");
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Halted));
    assert_eq!(engine.status(), RunStatus::Halted);
    assert_eq!(engine.steps_executed(), 1);
    assert_eq!(engine.memory().words(), &[99]);
}

#[test]
fn test_add_writes_result() {
    assert_eq!(final_memory("1,0,0,0,99"), vec![2, 0, 0, 0, 99]);
}

#[test]
fn test_position_mode_arithmetic() {
    assert_eq!(
        final_memory("1,9,10,3,2,3,11,0,99,30,40,50"),
        vec![3500, 9, 10, 70, 2, 3, 11, 0, 99, 30, 40, 50]
    );
    assert_eq!(final_memory("2,3,0,3,99"), vec![2, 3, 0, 6, 99]);
    assert_eq!(final_memory("2,4,4,5,99,0"), vec![2, 4, 4, 5, 99, 9801]);
    assert_eq!(
        final_memory("1,1,1,4,99,5,6,0,99"),
        vec![30, 1, 1, 4, 2, 5, 6, 0, 99]
    );
}

#[test]
fn test_immediate_mode_and_negative_operands() {
    assert_eq!(final_memory("1002,4,3,4,33"), vec![1002, 4, 3, 4, 99]);
    assert_eq!(final_memory("1101,100,-1,4,0"), vec![1101, 100, -1, 4, 99]);
}

#[test]
fn test_patched_program() {
    let program: Program = "1,0,0,3,1,1,2,3,1,3,4,3,1,5,0,3,2,1,10,19,99".parse().unwrap();
    let patched = program.patched(&[(1, 12), (2, 2)]).unwrap();
    let mut engine = Engine::new(&patched);
    engine.run_to_halt(&[]).unwrap();
    assert_eq!(engine.peek(1), 12);
    assert_eq!(engine.peek(2), 2);
    assert_eq!(engine.peek(3), 2);
    assert_eq!(engine.peek(19), 48);
    assert!(engine.is_halted());
}

// ========== Comparisons and jumps ==========

#[test]
fn test_equal_to_eight() {
    for program in ["3,9,8,9,10,9,4,9,99,-1,8", "3,3,1108,-1,8,3,4,3,99"] {
        assert_eq!(run(program, &[8]), vec![1]);
        assert_eq!(run(program, &[7]), vec![0]);
    }
}

#[test]
fn test_less_than_eight() {
    for program in ["3,9,7,9,10,9,4,9,99,-1,8", "3,3,1107,-1,8,3,4,3,99"] {
        assert_eq!(run(program, &[5]), vec![1]);
        assert_eq!(run(program, &[8]), vec![0]);
        assert_eq!(run(program, &[9]), vec![0]);
    }
}

#[test]
fn test_jumps_report_nonzero_input() {
    for program in [
        "3,12,6,12,15,1,13,14,13,4,13,99,-1,0,1,9",
        "3,3,1105,-1,9,1101,0,0,12,4,12,99,1",
    ] {
        assert_eq!(run(program, &[0]), vec![0]);
        assert_eq!(run(program, &[3]), vec![1]);
    }
}

#[test]
fn test_compare_against_eight() {
    let program = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
                   1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,\
                   999,1105,1,46,1101,1000,1,20,4,20,1105,1,46,98,99";
    assert_eq!(run(program, &[7]), vec![999]);
    assert_eq!(run(program, &[8]), vec![1000]);
    assert_eq!(run(program, &[9]), vec![1001]);
}

// ========== Relative base and large numbers ==========

#[test]
fn test_quine_outputs_itself() {
    let text = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";
    let expected: Vec<i64> = text.split(',').map(|w| w.parse().unwrap()).collect();
    assert_eq!(run(text, &[]), expected);
}

#[test]
fn test_sixteen_digit_product() {
    let outputs = run("1102,34915192,34915192,7,4,7,99,0", &[]);
    assert_eq!(outputs, vec![1219070632396864]);
    assert_eq!(outputs[0].to_string().len(), 16);
}

#[test]
fn test_large_immediate_output() {
    assert_eq!(run("104,1125899906842624,99", &[]), vec![1125899906842624]);
}

#[test]
fn test_relative_base_offsets() {
    // Store 77 at 1985, then rb = 2000 + 19 and output [rb-34]
    let outputs = run("1101,0,77,1985,109,2000,109,19,204,-34,99", &[]);
    assert_eq!(outputs, vec![77]);
}

#[test]
fn test_relative_mode_destination() {
    // rb = 10; in [rb+5]; out 15
    let mut engine = engine("109,10,203,5,4,15,99");
    assert_eq!(engine.run_to_halt(&[-3]).unwrap(), vec![-3]);
    assert_eq!(engine.relative_base(), 10);
    assert_eq!(engine.peek(15), -3);
}

// ========== Memory growth ==========

#[test]
fn test_read_beyond_extent_is_zero() {
    let mut engine = engine("4,1000,99");
    assert_eq!(engine.run_to_halt(&[]).unwrap(), vec![0]);
    assert_eq!(engine.memory().len(), 3);
}

#[test]
fn test_write_beyond_extent_grows_memory() {
    let mut engine = engine("1101,2,3,1000,99");
    engine.run_to_halt(&[]).unwrap();
    assert_eq!(engine.peek(1000), 5);
    assert_eq!(engine.memory().len(), 1001);
    assert_eq!(engine.peek(999), 0);
}

#[test]
fn test_write_far_past_extent_does_not_allocate_the_gap() {
    // add 1+1 into 2^62, then print it back
    let mut engine = engine("1101,1,1,4611686018427387904,4,4611686018427387904,99");
    assert_eq!(engine.run_to_halt(&[]).unwrap(), vec![2]);
    assert_eq!(engine.peek(1 << 62), 2);
    assert_eq!(engine.memory().len(), 7);
}

// ========== Suspension ==========

#[test]
fn test_awaiting_input_is_idempotent() {
    let mut engine = engine("3,0,4,0,99");

    for _ in 0..3 {
        assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::AwaitingInput));
        assert_eq!(engine.status(), RunStatus::AwaitingInput);
        assert_eq!(engine.ip(), 0);
        assert_eq!(engine.steps_executed(), 0);
        assert_eq!(engine.memory().words(), &[3, 0, 4, 0, 99]);
    }

    assert_eq!(engine.run_until_output(&[41]), Ok(OutputEvent::Value(41)));
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Halted));
}

#[test]
fn test_resume_preserves_state_between_outputs() {
    // Output 1, 2, 3 one at a time
    let mut engine = engine("104,1,104,2,104,3,99");
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Value(1)));
    assert_eq!(engine.ip(), 2);
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Value(2)));
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Value(3)));
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Halted));
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Halted));
}

#[test]
fn test_unconsumed_inputs_stay_queued() {
    let mut engine = engine("3,10,4,10,3,10,4,10,99");
    assert_eq!(engine.run_until_output(&[5, 6]), Ok(OutputEvent::Value(5)));
    assert_eq!(engine.pending_inputs().len(), 1);
    assert_eq!(engine.run_until_output(&[]), Ok(OutputEvent::Value(6)));
}

#[test]
fn test_single_steps() {
    let mut engine = engine("3,5,4,5,99,0");
    assert_eq!(engine.step(), Ok(Step::NeedsInput));
    engine.push_input(9);
    assert_eq!(engine.step(), Ok(Step::Input(9)));
    assert_eq!(engine.step(), Ok(Step::Output(9)));
    assert_eq!(engine.step(), Ok(Step::Halted));
    assert_eq!(engine.steps_executed(), 3);
}

// ========== Faults ==========

#[test]
fn test_negative_address_faults() {
    let mut engine = engine("4,-1,99");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::OutOfBounds { address: -1 })
    );

    let mut engine = crate::engine("204,-1,99");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::OutOfBounds { address: -1 })
    );
}

#[test]
fn test_negative_jump_target_faults() {
    let mut engine = engine("1105,1,-4");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::OutOfBounds { address: -4 })
    );
    assert_eq!(engine.ip(), 0);
}

#[test]
fn test_illegal_opcode_faults() {
    let mut engine = engine("1101,1,1,5,42,0");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::IllegalOpcode {
            opcode: 42,
            word: 42,
            ip: 4
        })
    );
    assert_eq!(engine.peek(5), 2);
}

#[test]
fn test_unknown_mode_faults() {
    let mut engine = engine("301,0,0,0,99");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::UnknownMode {
            mode: 3,
            word: 301,
            ip: 0
        })
    );
}

#[test]
fn test_immediate_destination_freezes_state() {
    let mut engine = engine("11101,1,1,0,99");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::InvalidDestinationMode {
            param: 3,
            word: 11101,
            ip: 0
        })
    );
    assert_eq!(engine.ip(), 0);
    assert_eq!(engine.steps_executed(), 0);
    assert_eq!(engine.memory().words(), &[11101, 1, 1, 0, 99]);
}

#[test]
fn test_overflow_faults() {
    let mut engine = engine("1101,9223372036854775807,1,0,99");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::ArithmeticOverflow {
            operation: "add",
            ip: 0
        })
    );
    assert_eq!(engine.peek(0), 1101);

    let mut engine = crate::engine("1102,4611686018427387904,2,0,99");
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::ArithmeticOverflow {
            operation: "multiply",
            ip: 0
        })
    );
}

#[test]
fn test_step_limit_stops_infinite_loop() {
    let mut engine = engine("1105,1,0").with_step_limit(10);
    assert_eq!(
        engine.run_until_output(&[]),
        Err(RuntimeError::StepLimitExceeded { limit: 10, ip: 0 })
    );
    assert_eq!(engine.steps_executed(), 10);
}
