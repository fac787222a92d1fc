//! Interactive terminal front end.
//!
//! Screen layout, top to bottom:
//!
//! - status line (generation, population, timer state, pattern);
//! - the board, two terminal columns per cell;
//! - the population chart, one bar per history entry;
//! - the key legend.
//!
//! [`Layout`] owns the geometry so mouse clicks in [`crate::input`] map back
//! to the same cells that were drawn.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{self, MoveTo};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use lifegrid_core::chart;
use lifegrid_core::config::EngineConfig;
use lifegrid_core::control::Controller;
use lifegrid_core::frame::FrameView;
use lifegrid_core::runner::{self, FrameCallback, SessionResult};
use lifegrid_types::CellCoord;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::EngineError;
use crate::input;

/// Terminal columns per grid cell.
pub const CELL_WIDTH: u16 = 2;

/// First screen row of the board.
pub const BOARD_TOP: u16 = 2;

/// Height of the population chart in rows.
pub const CHART_HEIGHT: u16 = 8;

/// Queued commands between the input task and the session loop.
const COMMAND_BUFFER: usize = 64;

const LIVE_GLYPH: &str = "██";
const DEAD_GLYPH: &str = " ·";
const BAR_GLYPH: &str = "█";

const LEGEND: &str = "space start/stop  n step  r reset  1 blank  2 random  3 glider gun  \
                      4 nebula  +/- speed  click toggle  q quit";

/// Screen geometry for a board of a given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    rows: u16,
    cols: u16,
}

impl Layout {
    /// Geometry for a `rows` x `cols` board. Oversized boards are clipped.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: u16::try_from(rows).unwrap_or(u16::MAX),
            cols: u16::try_from(cols).unwrap_or(u16::MAX),
        }
    }

    /// Grid cell under the screen position, if any.
    pub fn cell_at(self, column: u16, row: u16) -> Option<CellCoord> {
        let r = row.checked_sub(BOARD_TOP)?;
        let c = column.checked_div(CELL_WIDTH)?;
        if r >= self.rows || c >= self.cols {
            return None;
        }
        Some(CellCoord::new(usize::from(r), usize::from(c)))
    }

    /// Screen row of grid row `row`.
    const fn board_row(row: u16) -> u16 {
        BOARD_TOP.saturating_add(row)
    }

    /// Screen row of the chart caption.
    const fn chart_caption(self) -> u16 {
        Self::board_row(self.rows)
    }

    /// Screen row of the chart's top line.
    const fn chart_top(self) -> u16 {
        self.chart_caption().saturating_add(1)
    }

    /// Screen row of the legend.
    const fn legend(self) -> u16 {
        self.chart_top().saturating_add(CHART_HEIGHT)
    }
}

/// Raw mode, alternate screen and mouse capture for as long as it lives.
struct TerminalGuard {
    out: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        Ok(Self { out })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Draws every frame onto a crossterm writer.
pub struct TerminalRenderer<W> {
    out: W,
    layout: Layout,
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Create a renderer writing to `out`.
    pub const fn new(out: W, layout: Layout) -> Self {
        Self { out, layout }
    }

    fn draw_status(&mut self, frame: &FrameView<'_>) -> io::Result<()> {
        let timer = frame.interval.map_or_else(
            || format!("paused ({} ms)", frame.speed.as_millis()),
            |interval| format!("running every {} ms", interval.as_millis()),
        );
        let line = format!(
            "Lifegrid  generation {}  population {}  {}  pattern: {}",
            frame.generation(),
            frame.population(),
            timer,
            frame.pattern.label()
        );
        queue!(
            self.out,
            MoveTo(0, 0),
            SetForegroundColor(Color::White),
            Print(line)
        )
    }

    fn draw_board(&mut self, frame: &FrameView<'_>) -> io::Result<()> {
        let grid = frame.grid;
        for (y, row) in (0..self.layout.rows).zip(0..grid.rows()) {
            queue!(self.out, MoveTo(0, Layout::board_row(y)))?;
            let mut current: Option<bool> = None;
            for col in (0..grid.cols()).take(usize::from(self.layout.cols)) {
                let alive = grid.is_alive(row, col);
                if current != Some(alive) {
                    let color = if alive { Color::Green } else { Color::DarkGrey };
                    queue!(self.out, SetForegroundColor(color))?;
                    current = Some(alive);
                }
                queue!(self.out, Print(if alive { LIVE_GLYPH } else { DEAD_GLYPH }))?;
            }
        }
        Ok(())
    }

    fn draw_chart(&mut self, frame: &FrameView<'_>) -> io::Result<()> {
        let caption = format!(
            "population, last {} of {} generations",
            frame.history.len(),
            frame.history.capacity()
        );
        queue!(
            self.out,
            MoveTo(0, self.layout.chart_caption()),
            SetForegroundColor(Color::White),
            Print(caption)
        )?;

        let cell_count = u32::try_from(frame.grid.len()).unwrap_or(u32::MAX);
        let bars = chart::bars(frame.history, cell_count);
        for bar in &bars {
            let Some(x) = u16::try_from(bar.index)
                .ok()
                .and_then(|i| i.checked_mul(CELL_WIDTH))
            else {
                continue;
            };
            let height = bar.scaled_rows(CHART_HEIGHT);
            let color = Color::Rgb {
                r: bar.color.r,
                g: bar.color.g,
                b: bar.color.b,
            };
            queue!(self.out, SetForegroundColor(color))?;
            for level in 0..height {
                let y = self
                    .layout
                    .legend()
                    .saturating_sub(1)
                    .saturating_sub(level);
                queue!(self.out, MoveTo(x, y), Print(BAR_GLYPH))?;
            }
        }
        Ok(())
    }

    fn draw_legend(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(0, self.layout.legend()),
            SetForegroundColor(Color::DarkGrey),
            Print(LEGEND)
        )
    }
}

impl<W: Write + Send> FrameCallback for TerminalRenderer<W> {
    fn on_frame(&mut self, frame: &FrameView<'_>) -> io::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate, Clear(ClearType::All))?;
        self.draw_status(frame)?;
        self.draw_board(frame)?;
        self.draw_chart(frame)?;
        self.draw_legend()?;
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()
    }
}

/// Run an interactive session until the user quits.
///
/// The terminal is restored on every exit path, errors included.
///
/// # Errors
///
/// Returns [`EngineError::Io`] if the terminal cannot be set up, or
/// [`EngineError::Runner`] if the session fails.
pub async fn run(
    controller: &mut Controller,
    engine: &EngineConfig,
) -> Result<SessionResult, EngineError> {
    let grid = controller.simulation().grid();
    let layout = Layout::new(grid.rows(), grid.cols());
    let (tx, mut rx) = mpsc::channel(COMMAND_BUFFER);

    let guard = TerminalGuard::enter()?;
    info!("Terminal session started");

    if engine.autostart {
        controller.start(None);
    }
    let input = input::spawn(tx, layout);
    let mut renderer = TerminalRenderer::new(io::stdout(), layout);
    let result =
        runner::run_session(controller, &mut rx, &mut renderer, engine.max_generations).await;

    input.abort();
    drop(guard);
    Ok(result?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use lifegrid_core::config::{GridConfig, HistoryConfig};
    use lifegrid_core::generation::Simulation;
    use lifegrid_core::scheduler::Speed;
    use lifegrid_types::PatternName;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn clicks_map_to_cells() {
        let layout = Layout::new(40, 50);
        assert_eq!(layout.cell_at(0, BOARD_TOP), Some(CellCoord::new(0, 0)));
        assert_eq!(layout.cell_at(1, BOARD_TOP), Some(CellCoord::new(0, 0)));
        assert_eq!(layout.cell_at(7, BOARD_TOP + 3), Some(CellCoord::new(3, 3)));
        assert_eq!(layout.cell_at(99, BOARD_TOP + 39), Some(CellCoord::new(39, 49)));
    }

    #[test]
    fn clicks_outside_the_board_are_ignored() {
        let layout = Layout::new(40, 50);
        assert_eq!(layout.cell_at(0, 0), None);
        assert_eq!(layout.cell_at(0, BOARD_TOP - 1), None);
        assert_eq!(layout.cell_at(100, BOARD_TOP), None);
        assert_eq!(layout.cell_at(0, BOARD_TOP + 40), None);
    }

    #[test]
    fn sections_stack_below_the_board() {
        let layout = Layout::new(40, 50);
        assert_eq!(layout.chart_caption(), BOARD_TOP + 40);
        assert_eq!(layout.chart_top(), BOARD_TOP + 41);
        assert_eq!(layout.legend(), BOARD_TOP + 41 + CHART_HEIGHT);
    }

    #[test]
    fn renders_a_frame_to_a_buffer() {
        let mut sim = Simulation::with_rng(
            &GridConfig::default(),
            &HistoryConfig::default(),
            StdRng::seed_from_u64(3),
        )
        .unwrap();
        sim.seed(PatternName::GliderGun);
        sim.advance().unwrap();
        let controller = Controller::new(sim, Speed::default());

        let mut renderer = TerminalRenderer::new(Vec::new(), Layout::new(40, 50));
        renderer.on_frame(&controller.view()).unwrap();

        let text = String::from_utf8_lossy(&renderer.out);
        assert!(text.contains("generation 1"));
        assert!(text.contains("paused (200 ms)"));
        assert!(text.contains("pattern: Glider gun"));
        assert!(text.contains(LIVE_GLYPH));
        assert!(text.contains(LEGEND));
    }
}
