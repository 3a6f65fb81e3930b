/// the fixed width of the display buffer, independent of the active scale.
pub const DISPLAY_WIDTH: usize = 60;

/// one recorded instant of whole-system usage and package temperature.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HistoryPoint {
    /// whole-system utilization, in `[0, 100]`.
    pub usage: f64,
    /// package temperature in °c; 0 when no sensor was readable.
    pub temp: f64,
}

/// an observation window over the scrolling graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeScale {
    pub name: &'static str,
    /// how many seconds of history the window covers.
    pub seconds: u32,
    /// how many points the timeline holds at this scale.
    pub width: usize,
    /// how many polls elapse between recorded points.
    pub poll_interval: u32,
}

/// the selectable observation windows, narrowest first.
///
/// each width is chosen so that `width × poll_interval × poll period`
/// covers the named span at the reference 500ms poll cadence.
pub const TIME_SCALES: [TimeScale; 4] = [
    TimeScale {
        name: "30s",
        seconds: 30,
        width: DISPLAY_WIDTH,
        poll_interval: 1,
    },
    TimeScale {
        name: "60s",
        seconds: 60,
        width: DISPLAY_WIDTH * 2,
        poll_interval: 2,
    },
    TimeScale {
        name: "5min",
        seconds: 300,
        width: DISPLAY_WIDTH * 10,
        poll_interval: 10,
    },
    TimeScale {
        name: "30min",
        seconds: 1800,
        width: DISPLAY_WIDTH * 60,
        poll_interval: 60,
    },
];

/// the multi-scale usage/temperature timeline behind the scrolling graph.
///
/// the timeline's width varies with the active scale, so its sampling rate
/// changes on zoom; the display buffer is a constant-width decimated view
/// of it, so the drawing code never re-derives its layout. between zooms
/// the two shift in lockstep.
pub struct History {
    /// index of the active scale in [`TIME_SCALES`].
    scale: usize,
    /// recorded points at the active scale's cadence; always exactly
    /// `scale.width` long.
    timeline: Vec<HistoryPoint>,
    /// the decimated view; always exactly [`DISPLAY_WIDTH`] long.
    display: Vec<HistoryPoint>,
}

// === impl History ===

impl History {
    /// creates a history at the narrowest scale, zero-filled.
    pub fn new() -> Self {
        Self {
            scale: 0,
            timeline: vec![HistoryPoint::default(); TIME_SCALES[0].width],
            display: vec![HistoryPoint::default(); DISPLAY_WIDTH],
        }
    }

    /// the active observation window.
    pub fn scale(&self) -> &'static TimeScale {
        &TIME_SCALES[self.scale]
    }

    /// the constant-width view consumed by the drawing code.
    pub fn display(&self) -> &[HistoryPoint] {
        &self.display
    }

    /// appends a point, evicting the oldest from both buffers.
    pub fn record(&mut self, point: HistoryPoint) {
        shift(&mut self.timeline, point);
        shift(&mut self.display, point);
    }

    /// selects the next narrower window; a no-op at the narrowest.
    pub fn zoom_in(&mut self) -> bool {
        if self.scale == 0 {
            return false;
        }
        self.scale -= 1;
        self.resize();
        true
    }

    /// selects the next wider window; a no-op at the widest.
    pub fn zoom_out(&mut self) -> bool {
        if self.scale == TIME_SCALES.len() - 1 {
            return false;
        }
        self.scale += 1;
        self.resize();
        true
    }

    /// resizes the timeline to the active scale's width.
    ///
    /// shrinking keeps the most recent points; growing left-pads with
    /// zero points, which stay visually blank until real data accumulates
    /// rather than replaying or interpolating history.
    fn resize(&mut self) {
        let width = self.scale().width;
        let len = self.timeline.len();
        if len == width {
            return;
        }

        if len > width {
            self.timeline = self.timeline.split_off(len - width);
        } else {
            let mut grown = vec![HistoryPoint::default(); width - len];
            grown.append(&mut self.timeline);
            self.timeline = grown;
        }

        self.rebuild();
    }

    /// rebuilds the display buffer by nearest-index decimation.
    fn rebuild(&mut self) {
        let len = self.timeline.len();
        for (i, slot) in self.display.iter_mut().enumerate() {
            let index = ((i * (len - 1)) as f64 / (DISPLAY_WIDTH - 1) as f64).round() as usize;
            *slot = self.timeline[index.min(len - 1)];
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn shift(buffer: &mut [HistoryPoint], point: HistoryPoint) {
    buffer.copy_within(1.., 0);
    let last = buffer.len() - 1;
    buffer[last] = point;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(usage: f64) -> HistoryPoint {
        HistoryPoint { usage, temp: 50.0 }
    }

    /// fills a history with a recognizable ascending sequence.
    fn filled(history: &mut History, count: usize) {
        for i in 0..count {
            history.record(point(i as f64));
        }
    }

    #[test]
    fn buffers_hold_their_configured_widths() {
        let history = History::new();
        assert_eq!(history.timeline.len(), TIME_SCALES[0].width);
        assert_eq!(history.display.len(), DISPLAY_WIDTH);
    }

    #[test]
    fn record_keeps_both_buffers_in_lockstep() {
        let mut history = History::new();
        filled(&mut history, 10);

        assert_eq!(history.timeline.last(), Some(&point(9.0)));
        assert_eq!(history.display.last(), Some(&point(9.0)));
        assert_eq!(history.timeline.len(), TIME_SCALES[0].width);
        assert_eq!(history.display.len(), DISPLAY_WIDTH);
    }

    #[test]
    fn growing_left_pads_with_zero_points() {
        let mut history = History::new();
        filled(&mut history, DISPLAY_WIDTH);

        assert!(history.zoom_out());
        let padding = TIME_SCALES[1].width - TIME_SCALES[0].width;
        assert!(
            history.timeline[..padding]
                .iter()
                .all(|p| *p == HistoryPoint::default())
        );

        // the original points are unchanged, in order, at the right edge.
        let recent = &history.timeline[padding..];
        let expected = (0..DISPLAY_WIDTH).map(|i| point(i as f64)).collect::<Vec<_>>();
        assert_eq!(recent, expected);
    }

    #[test]
    fn shrinking_keeps_the_most_recent_points() {
        let mut history = History::new();
        assert!(history.zoom_out());
        filled(&mut history, TIME_SCALES[1].width);

        assert!(history.zoom_in());
        let width = TIME_SCALES[0].width;
        let expected = (TIME_SCALES[1].width - width..TIME_SCALES[1].width)
            .map(|i| point(i as f64))
            .collect::<Vec<_>>();
        assert_eq!(history.timeline, expected);
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut history = History::new();
        assert!(!history.zoom_in());

        for _ in 0..TIME_SCALES.len() - 1 {
            assert!(history.zoom_out());
        }
        assert!(!history.zoom_out());
        assert_eq!(history.scale().name, "30min");
    }

    #[test]
    fn zoom_out_then_in_restores_the_original_window() {
        let mut history = History::new();
        let before = *history.scale();

        assert!(history.zoom_out());
        assert!(history.zoom_in());

        let after = *history.scale();
        assert_eq!(before.width, after.width);
        assert_eq!(before.poll_interval, after.poll_interval);
        assert_eq!(history.timeline.len(), before.width);
    }

    #[test]
    fn decimation_is_idempotent() {
        let mut history = History::new();
        assert!(history.zoom_out());
        filled(&mut history, 100);

        history.rebuild();
        let first = history.display.clone();
        history.rebuild();
        assert_eq!(history.display, first);
    }

    /// at the narrowest scale the timeline and display buffer have the
    /// same width, so decimation is the identity.
    #[test]
    fn decimation_at_unit_scale_is_identity() {
        let mut history = History::new();
        filled(&mut history, DISPLAY_WIDTH);

        history.rebuild();
        assert_eq!(history.display, history.timeline);
    }

    #[test]
    fn decimation_endpoints_pin_to_the_timeline_edges() {
        let mut history = History::new();
        assert!(history.zoom_out());
        filled(&mut history, TIME_SCALES[1].width);

        history.rebuild();
        assert_eq!(history.display[0], *history.timeline.first().unwrap());
        assert_eq!(
            history.display[DISPLAY_WIDTH - 1],
            *history.timeline.last().unwrap()
        );
    }
}
