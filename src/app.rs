use {
    crate::{
        Error,
        history::{History, HistoryPoint},
        sampler::Probe,
        smooth::{Animator, SampleWindow},
        source::{ProcStatFile, StatsSource},
        stress::Stress,
        thermal::{TempExtremes, TempSource, Thermometer},
        ui::{self, Frame, Screen},
    },
    crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    signal_hook::{
        consts::{SIGINT, SIGTERM},
        iterator::Signals,
    },
    std::{
        sync::mpsc::{self, Receiver},
        thread,
        time::Duration,
    },
};

/// runtime configuration for the two cadences.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// time between metric samples.
    pub poll: Duration,
    /// time between drawn frames.
    pub frame: Duration,
    /// whether the load-generator binding is enabled at all.
    pub stress: bool,
}

/// which screen the monitor is showing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Running,
    HelpOverlay,
}

/// the events merged into the driver's single dispatch loop.
///
/// the tickers, the input reader, and the signal watcher run on their own
/// threads, but all of them funnel into one channel: the driver handles
/// one event at a time, so poll and render logic never interleave and no
/// state needs a lock.
enum Event {
    /// the coarse sampling cadence fired.
    Poll,
    /// the fine drawing cadence fired.
    Render,
    /// the user pressed a key.
    Key(KeyEvent),
    /// the process received a termination signal.
    Quit,
}

/// the driver: owns every piece of mutable monitor state.
pub struct App<S = ProcStatFile, T = Thermometer> {
    config: Config,
    probe: Probe<S>,
    thermometer: T,
    /// one rolling sample window per core.
    windows: Vec<SampleWindow>,
    /// the window averages the animator chases, refreshed each poll.
    targets: Vec<f64>,
    animator: Animator,
    history: History,
    extremes: TempExtremes,
    stress: Stress,
    mode: Mode,
    /// polls since startup or the last zoom; zooming resets it so the
    /// recording phase stays aligned with the new interval.
    poll_counter: u32,
    /// the latest package temperature.
    temp: f64,
    /// the latest whole-system rolling average.
    total: f64,
}

// === impl Config ===

impl Default for Config {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(500),
            frame: Duration::from_millis(16),
            stress: true,
        }
    }
}

// === impl App ===

impl App {
    /// builds a monitor against the real kernel sources.
    pub fn new(config: Config) -> Self {
        Self::with_sources(config, ProcStatFile, Thermometer)
    }
}

impl<S, T> App<S, T>
where
    S: StatsSource,
    T: TempSource,
{
    /// builds a monitor against the given metric sources.
    ///
    /// every per-core arena is sized here, from the probe's first read,
    /// and never resized afterwards.
    pub fn with_sources(config: Config, stats: S, thermometer: T) -> Self {
        let probe = Probe::new(stats);
        let cores = probe.cores();

        Self {
            config,
            windows: vec![SampleWindow::new(); cores],
            targets: vec![0.0; cores],
            animator: Animator::new(cores),
            history: History::new(),
            extremes: TempExtremes::default(),
            stress: Stress::new(cores, config.stress),
            mode: Mode::Running,
            poll_counter: 0,
            temp: 0.0,
            total: 0.0,
            probe,
            thermometer,
        }
    }

    /// runs the dispatch loop until the user quits.
    ///
    /// preparing the terminal is the one fatal step; everything after it
    /// recovers in place. the screen guard restores the terminal however
    /// the loop exits.
    pub fn run(mut self) -> Result<(), Error> {
        let _screen = Screen::enter().map_err(Error::Terminal)?;
        let events = spawn_producers(self.config);

        loop {
            let event = events.recv().map_err(|_| Error::Disconnected)?;
            if self.dispatch(event)? {
                return Ok(());
            }
        }
    }

    /// handles one event; returns true when the monitor should stop.
    ///
    /// a termination signal stops the loop the same way a quit key does,
    /// so the screen guard restores the terminal on that path too.
    fn dispatch(&mut self, event: Event) -> Result<bool, Error> {
        match event {
            Event::Poll => {
                self.on_poll();
                Ok(false)
            }
            Event::Render => self.on_render().map(|()| false),
            Event::Key(key) => Ok(self.on_key(key)),
            Event::Quit => Ok(true),
        }
    }

    /// one poll tick: sample both sources, fold the results into the
    /// rolling state, and record into the history when the active scale
    /// says it is due.
    fn on_poll(&mut self) {
        self.temp = self.thermometer.sample();
        self.extremes.record(self.temp);

        let usage = self.probe.observe();
        for (window, sample) in self.windows.iter_mut().zip(&usage) {
            window.push(*sample);
        }
        for (target, window) in self.targets.iter_mut().zip(&self.windows) {
            *target = window.average();
        }
        self.animator.prime(&self.targets);

        self.total = mean(&self.targets);
        self.poll_counter += 1;

        if self.poll_counter % self.history.scale().poll_interval == 0 {
            self.history.record(HistoryPoint {
                usage: self.total,
                temp: self.temp,
            });
        }
    }

    /// one render tick: advance the animation a frame and draw.
    fn on_render(&mut self) -> Result<(), Error> {
        let cores = self.animator.tick(&self.targets);

        let frame = Frame {
            mode: self.mode,
            cores,
            temp: self.temp,
            total: self.total,
            extremes: &self.extremes,
            history: self.history.display(),
            scale: self.history.scale(),
            stress: self.stress.status(),
        };

        ui::draw(&frame).map_err(Error::Terminal)
    }

    /// handles one key press; returns true when the monitor should quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match self.mode {
            Mode::HelpOverlay => match key.code {
                KeyCode::Char('h' | 'H') | KeyCode::Esc => {
                    self.mode = Mode::Running;
                    false
                }
                KeyCode::Char('q' | 'Q') => true,
                _ => false,
            },
            Mode::Running => match key.code {
                KeyCode::Char(' ') => {
                    self.stress.toggle();
                    false
                }
                KeyCode::Char('w' | 'W') => {
                    if self.history.zoom_in() {
                        self.poll_counter = 0;
                    }
                    false
                }
                KeyCode::Char('s' | 'S') => {
                    if self.history.zoom_out() {
                        self.poll_counter = 0;
                    }
                    false
                }
                KeyCode::Char('h' | 'H') => {
                    self.mode = Mode::HelpOverlay;
                    false
                }
                KeyCode::Char('q' | 'Q') | KeyCode::Esc => true,
                _ => false,
            },
        }
    }
}

/// starts the two tickers, the input reader, and the signal watcher.
///
/// each producer owns a clone of the sender; they exit on their own once
/// the driver drops the receiver.
fn spawn_producers(config: Config) -> Receiver<Event> {
    let (tx, rx) = mpsc::channel();

    let signals = tx.clone();
    thread::spawn(move || {
        let Ok(mut watcher) = Signals::new([SIGINT, SIGTERM]) else {
            return;
        };
        if watcher.forever().next().is_some() {
            let _ = signals.send(Event::Quit);
        }
    });

    let poll = tx.clone();
    thread::spawn(move || {
        loop {
            thread::sleep(config.poll);
            if poll.send(Event::Poll).is_err() {
                return;
            }
        }
    });

    let render = tx.clone();
    thread::spawn(move || {
        loop {
            thread::sleep(config.frame);
            if render.send(Event::Render).is_err() {
                return;
            }
        }
    });

    thread::spawn(move || {
        loop {
            match event::read() {
                Ok(TermEvent::Key(key)) => {
                    if tx.send(Event::Key(key)).is_err() {
                        return;
                    }
                }
                Ok(_) => {}
                Err(_) => return,
            }
        }
    });

    rx
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{history::TIME_SCALES, source::MockStatSource, stress::StressStatus},
    };

    /// a thermometer that replays a fixed sequence, then reads 0.
    struct ScriptedTemp(Vec<f64>);

    impl TempSource for ScriptedTemp {
        fn sample(&mut self) -> f64 {
            if self.0.is_empty() { 0.0 } else { self.0.remove(0) }
        }
    }

    const FIRST: &str = "\
cpu  100 0 100 800 0 0 0 0
cpu0 60 0 40 400 0 0 0 0
cpu1 40 0 60 400 0 0 0 0
";

    const SECOND: &str = "\
cpu  200 0 100 900 0 0 0 0
cpu0 160 0 40 400 0 0 0 0
cpu1 40 0 60 500 0 0 0 0
";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(tables: &[&str], temps: Vec<f64>) -> App<MockStatSource, ScriptedTemp> {
        let config = Config {
            stress: false,
            ..Config::default()
        };
        App::with_sources(config, MockStatSource::new(tables.to_vec()), ScriptedTemp(temps))
    }

    #[test]
    fn arenas_are_sized_from_the_first_read() {
        let app = app(&[FIRST], vec![]);
        assert_eq!(app.windows.len(), 2);
        assert_eq!(app.targets.len(), 2);
    }

    #[test]
    fn poll_updates_targets_and_extremes() {
        let mut app = app(&[FIRST, SECOND], vec![48.0]);
        app.on_poll();

        // one fully-busy and one fully-idle core, averaged system-wide.
        assert_eq!(app.targets, vec![100.0, 0.0]);
        assert_eq!(app.total, 50.0);
        assert_eq!(app.extremes.max(), Some(48.0));
    }

    #[test]
    fn unavailable_temperature_is_excluded_from_extremes() {
        let mut app = app(&[FIRST, SECOND], vec![0.0]);
        app.on_poll();
        assert_eq!(app.extremes.min(), None);
    }

    /// at the narrowest scale every poll records a history point.
    #[test]
    fn poll_records_history_at_the_active_interval() {
        let mut app = app(&[FIRST, SECOND], vec![48.0]);
        app.on_poll();

        let recorded = app.history.display().last().unwrap();
        assert_eq!(recorded.usage, 50.0);
        assert_eq!(recorded.temp, 48.0);
    }

    /// at a wider scale, polls between recording points leave the history
    /// untouched.
    #[test]
    fn wider_scales_skip_intermediate_polls() {
        let mut app = app(&[FIRST, SECOND, SECOND], vec![48.0, 48.0]);
        assert!(!app.on_key(key(KeyCode::Char('s'))));
        assert_eq!(app.history.scale().poll_interval, 2);

        // the first poll after a zoom is off-phase and records nothing.
        app.on_poll();
        assert_eq!(app.history.display().last().unwrap().temp, 0.0);

        app.on_poll();
        assert_eq!(app.history.display().last().unwrap().temp, 48.0);
    }

    #[test]
    fn zoom_resets_the_poll_phase() {
        let mut app = app(&[FIRST], vec![]);
        app.poll_counter = 7;

        assert!(!app.on_key(key(KeyCode::Char('s'))));
        assert_eq!(app.poll_counter, 0);
        assert_eq!(app.history.scale(), &TIME_SCALES[1]);
    }

    #[test]
    fn zoom_in_at_the_narrowest_scale_is_a_no_op() {
        let mut app = app(&[FIRST], vec![]);
        app.poll_counter = 7;

        assert!(!app.on_key(key(KeyCode::Char('w'))));
        assert_eq!(app.poll_counter, 7, "a clamped zoom must not reset phase");
        assert_eq!(app.history.scale(), &TIME_SCALES[0]);
    }

    #[test]
    fn help_toggles_and_cancels() {
        let mut app = app(&[FIRST], vec![]);
        assert_eq!(app.mode, Mode::Running);

        assert!(!app.on_key(key(KeyCode::Char('h'))));
        assert_eq!(app.mode, Mode::HelpOverlay);

        // zoom keys are inert while help is showing.
        assert!(!app.on_key(key(KeyCode::Char('s'))));
        assert_eq!(app.history.scale(), &TIME_SCALES[0]);

        assert!(!app.on_key(key(KeyCode::Esc)));
        assert_eq!(app.mode, Mode::Running);
    }

    #[test]
    fn quit_works_from_either_mode() {
        let mut app = app(&[FIRST], vec![]);
        assert!(app.on_key(key(KeyCode::Char('q'))));

        app.mode = Mode::HelpOverlay;
        assert!(app.on_key(key(KeyCode::Char('q'))));

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.on_key(ctrl_c));
    }

    /// a termination signal delivered from outside the terminal arrives
    /// as a quit event and stops the dispatch loop, so the screen guard
    /// still restores the terminal.
    #[test]
    fn termination_signal_stops_the_dispatch_loop() {
        let mut app = app(&[FIRST], vec![]);
        assert!(!app.dispatch(Event::Poll).unwrap());
        assert!(app.dispatch(Event::Quit).unwrap());
    }

    #[test]
    fn stress_binding_disabled_by_config() {
        let mut app = app(&[FIRST], vec![]);
        assert_eq!(app.stress.status(), StressStatus::Unavailable);

        assert!(!app.on_key(key(KeyCode::Char(' '))));
        assert_eq!(app.stress.status(), StressStatus::Unavailable);
    }
}
