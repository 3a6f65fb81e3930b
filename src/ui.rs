use {
    crate::{
        app::Mode,
        history::{HistoryPoint, TIME_SCALES, TimeScale},
        stress::StressStatus,
        thermal::TempExtremes,
    },
    crossterm::{
        QueueableCommand, cursor,
        style::{Color, Print, PrintStyledContent, Stylize},
        terminal,
    },
    std::io::{self, Write},
};

/// everything one frame is drawn from.
///
/// drawing consumes the frame and mutates nothing the driver owns.
pub struct Frame<'a> {
    pub mode: Mode,
    /// per-core animated values.
    pub cores: &'a [f64],
    /// the latest package temperature; 0 when unavailable.
    pub temp: f64,
    /// the latest whole-system rolling average.
    pub total: f64,
    pub extremes: &'a TempExtremes,
    /// the constant-width history view.
    pub history: &'a [HistoryPoint],
    pub scale: &'a TimeScale,
    pub stress: StressStatus,
}

/// holds the terminal for the lifetime of the monitor.
///
/// construction switches to the alternate screen, enters raw mode, and
/// hides the cursor; `Drop` restores all three, so the terminal comes back
/// on every exit path.
pub struct Screen;

/// eighth-block glyphs for the per-core bars, lowest to highest.
const BARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const BLOCK: char = '█';

/// gradient stops for the usage color ramp: (percent, r, g, b).
const USAGE_STOPS: &[(f64, u8, u8, u8)] = &[
    (0.0, 0, 0, 128),
    (10.0, 0, 0, 255),
    (20.0, 0, 128, 255),
    (30.0, 0, 255, 255),
    (40.0, 0, 255, 0),
    (50.0, 128, 255, 0),
    (60.0, 255, 255, 0),
    (70.0, 255, 165, 0),
    (80.0, 255, 64, 0),
    (90.0, 255, 0, 0),
    (100.0, 255, 0, 0),
];

/// gradient stops for the temperature color ramp: (°c, r, g, b).
const TEMP_STOPS: &[(f64, u8, u8, u8)] = &[
    (35.0, 0, 0, 255),
    (40.0, 0, 128, 255),
    (45.0, 0, 255, 255),
    (50.0, 0, 255, 0),
    (60.0, 128, 255, 0),
    (65.0, 255, 255, 0),
    (70.0, 255, 192, 0),
    (75.0, 255, 128, 0),
    (80.0, 255, 64, 0),
    (85.0, 255, 0, 0),
    (90.0, 255, 0, 64),
    (95.0, 255, 0, 128),
    (100.0, 255, 0, 255),
];

/// reference temperatures shown in the legend.
const LEGEND: [(f64, &str); 6] = [
    (40.0, "Cool"),
    (50.0, "Normal"),
    (65.0, "Warm"),
    (75.0, "Hot"),
    (85.0, "Very Hot"),
    (95.0, "Critical"),
];

/// the five usage bands of the scrolling graph, top row first: a cell is
/// drawn when usage falls inside `(low, high]`.
const BANDS: [(&str, f64, f64); 5] = [
    ("81-100%", 80.0, 100.0),
    ("61-80% ", 60.0, 80.0),
    ("41-60% ", 40.0, 60.0),
    ("21-40% ", 20.0, 40.0),
    ("0-20%  ", -1.0, 20.0),
];

// === impl Screen ===

impl Screen {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        io::stdout()
            .queue(terminal::EnterAlternateScreen)?
            .queue(cursor::Hide)?
            .queue(terminal::Clear(terminal::ClearType::All))?
            .flush()?;

        // a panicking thread must give the terminal back before its
        // message prints, or the report lands on the alternate screen.
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            default_hook(info);
        }));

        Ok(Self)
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        restore();
    }
}

fn restore() {
    let mut stdout = io::stdout();
    let _ = stdout.queue(cursor::Show);
    let _ = stdout.queue(terminal::LeaveAlternateScreen);
    let _ = stdout.flush();
    let _ = terminal::disable_raw_mode();
}

/// draws one frame, with a single flush at the end.
pub fn draw(frame: &Frame<'_>) -> io::Result<()> {
    let mut out = io::stdout();
    out.queue(cursor::MoveTo(0, 0))?;

    match frame.mode {
        Mode::HelpOverlay => help_page(&mut out, frame)?,
        Mode::Running => main_view(&mut out, frame)?,
    }

    // drop whatever an earlier, taller frame left below us.
    out.queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;
    out.flush()
}

fn main_view(out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
    out.queue(PrintStyledContent("=== calor ===".green()))?
        .queue(PrintStyledContent("  Press H for help".yellow()))?;
    endl(out)?;

    status_line(out, frame)?;
    endl(out)?;

    core_grid(out, frame)?;
    endl(out)?;

    legend(out)?;
    endl(out)?;

    graph(out, frame)
}

fn status_line(out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
    let stress = match frame.stress {
        StressStatus::Unavailable => "[STRESS N/A]".dark_yellow(),
        StressStatus::On => "[STRESS ON]".red(),
        StressStatus::Off => "[STRESS OFF]".green(),
    };

    let degrees = |temp: Option<f64>| match temp {
        Some(temp) => format!("{temp:.1}°C"),
        None => "--".to_string(),
    };

    out.queue(Print("Status: "))?
        .queue(PrintStyledContent(stress))?
        .queue(PrintStyledContent("  Current: ".blue()))?
        .queue(PrintStyledContent(format!("{:.1}°C", frame.temp).yellow()))?
        .queue(PrintStyledContent("  Min: ".blue()))?
        .queue(PrintStyledContent(degrees(frame.extremes.min()).green()))?
        .queue(PrintStyledContent("  Max: ".blue()))?
        .queue(PrintStyledContent(
            degrees(frame.extremes.max()).with(temp_color(85.0)),
        ))?;
    endl(out)
}

/// the per-core bar grid, colored by estimated core temperature.
fn core_grid(out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
    let count = frame.cores.len();
    let (cols, rows) = grid(count);

    out.queue(PrintStyledContent(
        format!("CPU Cores ({count} cores):").cyan(),
    ))?;
    endl(out)?;

    for row in 0..rows {
        out.queue(Print("  "))?;
        for col in 0..cols {
            match frame.cores.get(row * cols + col) {
                Some(&usage) => {
                    let color = temp_color(core_temp(frame.temp, usage));
                    out.queue(PrintStyledContent(bar(usage).with(color)))?;
                }
                None => {
                    out.queue(Print(' '))?;
                }
            }
            if col < cols - 1 {
                out.queue(Print(' '))?;
            }
        }
        endl(out)?;
    }

    Ok(())
}

fn legend(out: &mut impl Write) -> io::Result<()> {
    out.queue(PrintStyledContent("Temperature Legend:".cyan()))?;
    endl(out)?;

    for (i, (temp, label)) in LEGEND.iter().enumerate() {
        out.queue(PrintStyledContent(BLOCK.with(temp_color(*temp))))?
            .queue(Print(format!("{label} {temp:.0}C")))?;
        if i < LEGEND.len() - 1 {
            out.queue(Print("  "))?;
        }
    }
    endl(out)
}

/// the scrolling usage graph: height encodes usage, color encodes the
/// temperature recorded at that instant.
fn graph(out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
    out.queue(PrintStyledContent("CPU Usage & Temperature Graph".cyan()))?
        .queue(Print(" Current: "))?
        .queue(PrintStyledContent(
            format!("{:.1}%", frame.total).with(usage_color(frame.total)),
        ))?
        .queue(Print(" / "))?
        .queue(PrintStyledContent(format!("{:.1}°C", frame.temp).yellow()))?;
    endl(out)?;

    for (label, low, high) in BANDS {
        out.queue(PrintStyledContent(label.cyan()))?;
        for point in frame.history {
            if point.usage > low && point.usage <= high {
                out.queue(PrintStyledContent(BLOCK.with(temp_color(point.temp))))?;
            } else {
                out.queue(Print(' '))?;
            }
        }
        endl(out)?;
    }

    out.queue(Print("        "))?
        .queue(PrintStyledContent(
            "Press W to zoom in, S to zoom out".yellow(),
        ))?;
    endl(out)?;
    out.queue(Print("        "))?
        .queue(PrintStyledContent(frame.scale.name.cyan()))?;
    endl(out)
}

fn help_page(out: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
    out.queue(PrintStyledContent("=== calor - Help ===".green()))?;
    endl(out)?;
    endl(out)?;

    out.queue(PrintStyledContent("Controls:".cyan()))?;
    endl(out)?;
    let stress = if frame.stress == StressStatus::Unavailable {
        "  SPACE  - Toggle stress test (stress command not available)".dark_yellow()
    } else {
        "  SPACE  - Toggle stress test ON/OFF".yellow()
    };
    out.queue(PrintStyledContent(stress))?;
    endl(out)?;
    for binding in [
        "  W      - Zoom in (shorter time scale)",
        "  S      - Zoom out (longer time scale)",
        "  H      - Toggle this help page",
        "  Q      - Quit application",
        "  ESC    - Exit help or quit application",
    ] {
        out.queue(PrintStyledContent(binding.yellow()))?;
        endl(out)?;
    }
    endl(out)?;

    out.queue(PrintStyledContent("Time Scales:".cyan()))?;
    endl(out)?;
    for scale in &TIME_SCALES {
        out.queue(Print(format!(
            "  {:6} - covers {}s, one point every {} poll(s)",
            scale.name, scale.seconds, scale.poll_interval,
        )))?;
        endl(out)?;
    }
    endl(out)?;

    out.queue(PrintStyledContent("CPU Core Bars:".cyan()))?;
    endl(out)?;
    for line in [
        "  Height - CPU usage (0-100%)",
        "  Color  - Estimated core temperature",
        "  Bars   - ▁▂▃▄▅▆▇█ (0% to 100%)",
    ] {
        out.queue(Print(line))?;
        endl(out)?;
    }
    endl(out)?;

    legend(out)?;
    endl(out)?;

    out.queue(PrintStyledContent(
        "Press H, ESC, or Q to return to main view".yellow(),
    ))?;
    endl(out)
}

/// ends a line: erase any residue to the right, then move to the next row.
fn endl(out: &mut impl Write) -> io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::UntilNewLine))?
        .queue(Print("\r\n"))?;
    Ok(())
}

/// estimated core temperature from the package reading and per-core load.
///
/// idle cores sit about 5°c below the package sensor; full load adds up to
/// 15°c on top of that baseline.
fn core_temp(package: f64, usage: f64) -> f64 {
    package - 5.0 + (usage / 100.0) * 15.0
}

/// maps usage to a bar glyph, one level per 12.5%; a busy-at-all core
/// always shows at least the lowest bar.
fn bar(usage: f64) -> char {
    let index = (usage / 12.5) as usize;
    BARS[index.clamp(1, 8)]
}

/// column layout for the per-core grid, stepped by core count.
fn grid(count: usize) -> (usize, usize) {
    match count {
        0..=4 => (2, count.div_ceil(2)),
        5..=6 => (3, 2),
        7..=8 => (4, 2),
        9..=12 => (4, 3),
        13..=16 => (4, 4),
        17..=20 => (5, 4),
        21..=25 => (5, 5),
        26..=30 => (6, 5),
        31..=36 => (6, 6),
        _ => {
            let cols = (count as f64).sqrt() as usize + 1;
            (cols, cols)
        }
    }
}

/// 24-bit color for a usage percentage.
pub fn usage_color(percent: f64) -> Color {
    ramp(USAGE_STOPS, percent)
}

/// 24-bit color for a temperature in °c.
pub fn temp_color(celsius: f64) -> Color {
    ramp(TEMP_STOPS, celsius)
}

/// piecewise-linear interpolation over a table of gradient stops.
fn ramp(stops: &[(f64, u8, u8, u8)], value: f64) -> Color {
    let rgb = |(_, r, g, b): (f64, u8, u8, u8)| Color::Rgb { r, g, b };

    let first = stops[0];
    let last = stops[stops.len() - 1];
    if value <= first.0 {
        return rgb(first);
    }
    if value >= last.0 {
        return rgb(last);
    }

    for pair in stops.windows(2) {
        let (low, high) = (pair[0], pair[1]);
        if value >= low.0 && value <= high.0 {
            let t = (value - low.0) / (high.0 - low.0);
            let lerp =
                |a: u8, b: u8| (f64::from(a) + t * (f64::from(b) - f64::from(a))).round() as u8;
            return Color::Rgb {
                r: lerp(low.1, high.1),
                g: lerp(low.2, high.2),
                b: lerp(low.3, high.3),
            };
        }
    }

    rgb(last)
}
