//! Property-based checks over random valid task sets.

use proptest::prelude::*;
use rtsim_core::{Simulation, SimulationConfig, SimulationState, TaskSpec, TaskState};

fn task_spec() -> impl Strategy<Value = TaskSpec> {
    (-3i32..6, 1u64..12, any::<bool>())
        .prop_flat_map(|(priority, period, needs_resource)| {
            (1..=period).prop_map(move |execution_time| {
                TaskSpec::new(priority, period, execution_time, needs_resource)
            })
        })
}

fn simulation_config() -> impl Strategy<Value = SimulationConfig> {
    (prop::collection::vec(task_spec(), 1..7), 1u64..60, 1u64..30).prop_map(
        |(tasks, horizon, display_window)| SimulationConfig {
            tasks,
            horizon,
            display_window,
        },
    )
}

/// Properties of a settled tick relative to the one before it.
fn check_tick(previous: &SimulationState, current: &SimulationState) {
    let mut running_resource_users = Vec::new();

    for (before, after) in previous.tasks.iter().zip(current.tasks.iter()) {
        assert!(after.remaining_time <= after.execution_time());
        assert!(after.deadline >= before.deadline);
        assert!(after.missed_deadlines - before.missed_deadlines <= 1);
        if after.state == TaskState::Suspended {
            assert!(after.needs_resource());
        }
        if after.state == TaskState::Running && after.needs_resource() {
            running_resource_users.push(after.id());
        }
        if after.state != TaskState::Running {
            assert_eq!(after.remaining_time, 0, "task {} idle with work", after.id());
        }
    }

    assert!(running_resource_users.len() <= 1);
    assert_eq!(current.lock.owner(), running_resource_users.first().copied());
}

proptest! {
    #[test]
    fn prop_invariants_hold_every_tick(config in simulation_config()) {
        let mut sim = Simulation::new(config).unwrap();
        let mut tick = 0;

        while !sim.is_finished() {
            let previous = sim.state().clone();
            let snapshot = sim.step().unwrap();

            prop_assert_eq!(snapshot.current_time, tick);
            check_tick(&previous, sim.state());
            for (view, task) in snapshot.tasks.iter().zip(sim.state().tasks.iter()) {
                prop_assert_eq!(view.state, task.state);
                prop_assert_eq!(view.missed_deadlines, task.missed_deadlines);
            }
            tick += 1;
        }
    }

    #[test]
    fn prop_report_counters_consistent(config in simulation_config()) {
        let horizon = config.horizon;
        let report = Simulation::new(config).unwrap().run_to_completion().unwrap();

        prop_assert_eq!(report.ticks_executed, horizon);
        prop_assert!(report.idle_ticks <= horizon);

        let dispatches: u64 = report.tasks.iter().map(|t| t.dispatches).sum();
        prop_assert_eq!(dispatches, horizon - report.idle_ticks);

        for task in &report.tasks {
            prop_assert!(task.completions <= task.dispatches);
            prop_assert!(task.dispatches - task.completions <= 1);
        }
    }

    #[test]
    fn prop_runs_are_deterministic(config in simulation_config()) {
        let mut first = Simulation::new(config.clone()).unwrap();
        let mut second = Simulation::new(config).unwrap();
        let mut a = Vec::new();
        let mut b = Vec::new();

        let report_a = first.run(&mut a).unwrap();
        let report_b = second.run(&mut b).unwrap();

        prop_assert_eq!(a, b);
        prop_assert_eq!(report_a, report_b);
    }

    #[test]
    fn prop_timeline_bounded_by_window(config in simulation_config()) {
        let window = config.display_window;
        let mut sim = Simulation::new(config).unwrap();
        let mut snapshots = Vec::new();
        sim.run(&mut snapshots).unwrap();

        for snapshot in &snapshots {
            let expected = (snapshot.current_time + 1).min(window) as usize;
            for timeline in &snapshot.timeline {
                prop_assert_eq!(timeline.marks.len(), expected);
            }
        }
    }
}
