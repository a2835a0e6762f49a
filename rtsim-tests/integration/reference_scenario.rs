//! The reference five-task run, observed tick by tick.

use rtsim_core::{
    Simulation, SimulationConfig, Snapshot, TaskId, TaskState, TimelineMark,
};

fn run_reference() -> (Vec<Snapshot>, rtsim_core::SimulationReport) {
    let mut sim = Simulation::new(SimulationConfig::reference()).unwrap();
    let mut snapshots = Vec::new();
    let report = sim.run(&mut snapshots).unwrap();
    (snapshots, report)
}

#[test]
fn test_one_snapshot_per_tick() {
    let (snapshots, report) = run_reference();

    assert_eq!(snapshots.len(), 20);
    for (tick, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.current_time, tick as u64);
        assert_eq!(snapshot.tasks.len(), 5);
    }
    assert_eq!(report.horizon, 20);
    assert_eq!(report.ticks_executed, 20);
}

#[test]
fn test_final_miss_counts() {
    let (snapshots, report) = run_reference();

    let from_report: Vec<u64> = report.tasks.iter().map(|t| t.missed_deadlines).collect();
    let from_snapshot: Vec<u64> = snapshots
        .last()
        .unwrap()
        .tasks
        .iter()
        .map(|view| view.missed_deadlines)
        .collect();

    assert_eq!(from_report, vec![4, 2, 1, 1, 0]);
    assert_eq!(from_snapshot, from_report);
    assert_eq!(report.total_missed_deadlines(), 8);
}

#[test]
fn test_lock_handoff_sequence() {
    let (snapshots, _) = run_reference();

    let owners: Vec<Option<usize>> = snapshots
        .iter()
        .map(|s| s.lock.owner.map(TaskId::as_index))
        .collect();

    // T0 takes and returns the lock within tick 0
    assert_eq!(owners[0], None);
    assert_eq!(&owners[2..4], &[Some(2), Some(2)]);
    assert_eq!(owners[4], None);
    assert_eq!(&owners[5..8], &[Some(4), Some(4), Some(4)]);
    // T4 releases in the monitor at tick 8; T0 takes and returns it
    assert_eq!(owners[8], None);
}

#[test]
fn test_low_priority_resource_user_suspends_once() {
    let (snapshots, report) = run_reference();
    let t4 = TaskId::new(4);

    let suspended_ticks: Vec<u64> = snapshots
        .iter()
        .filter(|s| s.task(t4).unwrap().state == TaskState::Suspended)
        .map(|s| s.current_time)
        .collect();

    assert_eq!(suspended_ticks, vec![3]);
    assert_eq!(report.tasks[4].suspensions, 1);
    assert_eq!(
        snapshots.last().unwrap().timeline[4].marks[3],
        TimelineMark::Suspended
    );
}

#[test]
fn test_summary_text() {
    let (_, report) = run_reference();

    assert_eq!(
        report.summary(),
        "Simulation Complete. Deadline Miss Summary:\n\
         Task 0: 4 missed deadlines\n\
         Task 1: 2 missed deadlines\n\
         Task 2: 1 missed deadlines\n\
         Task 3: 1 missed deadlines\n\
         Task 4: 0 missed deadlines\n"
    );
}
