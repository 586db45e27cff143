/// ----- DEBUG MODULE -----
/// Live terminal status table for the running simulation, repainted in
/// place on every refresh.

use std::io::{stdout, Stdout, Write};

use crossterm::{cursor, terminal, ExecutableCommand, Result};

use crate::stats::SystemStatistics;

pub struct Monitor {
    stdout: Stdout,
    lines: u16,
}

impl Monitor {
    pub fn new() -> Self {
        Monitor {
            stdout: stdout(),
            lines: 0,
        }
    }

    pub fn print_status(&mut self, statistics: &SystemStatistics) -> Result<()> {
        if self.lines > 0 {
            self.stdout.execute(cursor::MoveUp(self.lines))?;
            self.stdout
                .execute(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        }
        let mut lines: u16 = 0;

        writeln!(self.stdout, "+----+------------+-------------+-------+------+---------+")?;
        writeln!(self.stdout, "| {0:<2} | {1:<10} | {2:<11} | {3:<5} | {4:<4} | {5:<7} |",
            "ID", "NAME", "STATUS", "FLOOR", "PASS", "TARGETS")?;
        writeln!(self.stdout, "+----+------------+-------------+-------+------+---------+")?;
        lines += 3;

        for elevator in &statistics.elevators {
            writeln!(self.stdout, "| {0:<2} | {1:<10} | {2:<11} | {3:<5} | {4:<4} | {5:<7} |",
                elevator.id,
                elevator.name,
                elevator.status,
                elevator.current_floor,
                elevator.passengers,
                elevator.statistics.target_floors_count)?;
            lines += 1;
        }
        writeln!(self.stdout, "+----+------------+-------------+-------+------+---------+")?;
        writeln!(self.stdout, "strategy: {}, processed: {}, rejected: {}, pending: {}",
            statistics.strategy,
            statistics.processed_requests,
            statistics.rejected_requests,
            statistics.pending_requests)?;
        lines += 2;

        self.lines = lines;
        Ok(())
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Monitor::new()
    }
}
