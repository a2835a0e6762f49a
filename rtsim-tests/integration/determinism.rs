//! Identical configurations must produce identical observable output.

use rtsim_core::{Simulation, SimulationConfig, TaskSpec};

fn json_transcript(config: SimulationConfig) -> String {
    let mut sim = Simulation::new(config).unwrap();
    let mut lines = Vec::new();
    while !sim.is_finished() {
        let snapshot = sim.step().unwrap();
        lines.push(serde_json::to_string(&snapshot).unwrap());
    }
    lines.push(serde_json::to_string(&sim.report()).unwrap());
    lines.join("\n")
}

#[test]
fn test_reference_transcript_is_byte_identical() {
    let first = json_transcript(SimulationConfig::reference());
    let second = json_transcript(SimulationConfig::reference());

    assert_eq!(first, second);
}

#[test]
fn test_stepwise_and_batch_runs_agree() {
    let config = SimulationConfig {
        tasks: vec![
            TaskSpec::new(5, 3, 1, true),
            TaskSpec::new(5, 7, 3, true),
            TaskSpec::new(-2, 5, 2, false),
        ],
        horizon: 40,
        display_window: 10,
    };

    let mut stepped = Simulation::new(config.clone()).unwrap();
    let mut observed = Vec::new();
    while !stepped.is_finished() {
        observed.push(stepped.step().unwrap());
    }

    let mut batch = Simulation::new(config).unwrap();
    let mut collected = Vec::new();
    let report = batch.run(&mut collected).unwrap();

    assert_eq!(observed, collected);
    assert_eq!(stepped.report(), report);
}

#[test]
fn test_reloaded_config_reproduces_run() {
    let original = SimulationConfig::reference();
    let reloaded = SimulationConfig::from_json_str(&original.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json_transcript(original), json_transcript(reloaded));
}
