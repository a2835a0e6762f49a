//! Console and JSON renderers for simulation snapshots.

use std::io::{self, Write};

use rtsim_core::{Snapshot, SimulationReport, TaskState, TimelineMark};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn state_bar(state: TaskState) -> &'static str {
    match state {
        TaskState::Ready => "[=====]",
        TaskState::Running => "[*****]",
        TaskState::Waiting => "[     ]",
        TaskState::Suspended => "[~~~~~]",
    }
}

fn timeline_glyph(mark: TimelineMark) -> char {
    match mark {
        TimelineMark::Running => '*',
        TimelineMark::Inactive => '-',
        TimelineMark::Suspended => '~',
        TimelineMark::Idle => ' ',
    }
}

/// Human-readable per-tick view.
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    clear: bool,
}

impl TextRenderer {
    pub fn new(clear: bool) -> Self {
        Self { clear }
    }

    /// Writes the full view of one tick.
    pub fn render<W: Write>(&mut self, out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
        if self.clear {
            write!(out, "{CLEAR_SCREEN}")?;
        }

        writeln!(out, "RTOS Scheduler Simulator - Tick {}", snapshot.current_time)?;
        writeln!(out, "----------------------------------------")?;
        for view in &snapshot.tasks {
            writeln!(
                out,
                "Task {} (P{}): {} {:<9} | Misses: {} | Resource: {}",
                view.id,
                view.priority,
                state_bar(view.state),
                view.state.as_str(),
                view.missed_deadlines,
                if view.needs_resource { "Yes" } else { "No" }
            )?;
        }

        writeln!(out)?;
        match snapshot.lock.owner {
            Some(owner) => writeln!(out, "Semaphore: [X] Taken (Task {owner})")?,
            None => writeln!(out, "Semaphore: [ ] Free")?,
        }

        writeln!(out)?;
        writeln!(out, "Timeline:")?;
        for timeline in &snapshot.timeline {
            let glyphs: String = timeline.marks.iter().copied().map(timeline_glyph).collect();
            writeln!(out, "T{}: |{glyphs}|", timeline.id)?;
        }
        writeln!(out)?;

        Ok(())
    }

    /// Writes the end-of-run miss summary.
    pub fn render_summary<W: Write>(
        &mut self,
        out: &mut W,
        report: &SimulationReport,
    ) -> io::Result<()> {
        write!(out, "{}", report.summary())?;
        writeln!(
            out,
            "Ticks: {} ({} idle)",
            report.ticks_executed, report.idle_ticks
        )
    }
}

/// Line-delimited JSON output.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Writes one snapshot as a single JSON line.
    pub fn render<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
        serde_json::to_writer(&mut *out, snapshot)?;
        writeln!(out)
    }

    /// Writes the final report as a single JSON line.
    pub fn render_report<W: Write>(out: &mut W, report: &SimulationReport) -> io::Result<()> {
        serde_json::to_writer(&mut *out, report)?;
        writeln!(out)
    }
}
