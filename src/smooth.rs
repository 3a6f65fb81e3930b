use std::collections::VecDeque;

/// a fixed-capacity rolling window of recent samples for one core.
///
/// the window damps single-poll spikes before they reach the display while
/// staying responsive to sustained load changes within a few intervals.
#[derive(Clone, Debug)]
pub struct SampleWindow {
    /// the most recent samples, oldest first.
    samples: VecDeque<f64>,
    capacity: usize,
}

/// eases one displayed value per core toward its sampled target each frame.
///
/// frames arrive far more often than samples, so covering a fixed fraction
/// of the remaining distance every frame converges exponentially on the
/// slowly-updating target and reads as continuous motion.
#[derive(Clone, Debug)]
pub struct Animator {
    /// what is currently drawn for each core.
    current: Vec<f64>,
    /// the fraction of the remaining distance covered per frame.
    alpha: f64,
    /// whether the first sampled averages have been adopted yet.
    primed: bool,
}

// === impl SampleWindow ===

impl SampleWindow {
    /// how many samples the window retains.
    pub const CAPACITY: usize = 4;

    pub fn new() -> Self {
        Self::with_capacity(Self::CAPACITY)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// appends a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// the linearly recency-weighted mean of the window, in `[0, 100]`.
    ///
    /// the sample at position `j` (0 = oldest) carries weight `j + 1`, so
    /// the newest sample dominates without single-handedly deciding the
    /// value. an empty window reads as 0.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let (mut sum, mut weights) = (0.0, 0.0);
        for (j, sample) in self.samples.iter().enumerate() {
            let weight = (j + 1) as f64;
            sum += sample * weight;
            weights += weight;
        }

        (sum / weights).clamp(0.0, 100.0)
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

// === impl Animator ===

impl Animator {
    /// the reference smoothing factor: lower is smoother, higher is more
    /// responsive.
    pub const ALPHA: f64 = 0.08;

    pub fn new(cores: usize) -> Self {
        Self::with_alpha(cores, Self::ALPHA)
    }

    fn with_alpha(cores: usize, alpha: f64) -> Self {
        Self {
            current: vec![0.0; cores],
            alpha,
            primed: false,
        }
    }

    /// adopts the first sampled averages directly, skipping the ease-in
    /// from zero. only the first call has any effect; afterwards motion is
    /// owned by [`Animator::tick`].
    pub fn prime(&mut self, targets: &[f64]) {
        if self.primed {
            return;
        }
        for (current, target) in self.current.iter_mut().zip(targets) {
            *current = target.clamp(0.0, 100.0);
        }
        self.primed = true;
    }

    /// advances every core one frame toward its target.
    pub fn tick(&mut self, targets: &[f64]) -> &[f64] {
        for (current, target) in self.current.iter_mut().zip(targets) {
            let diff = target - *current;
            *current = (*current + diff * self.alpha).clamp(0.0, 100.0);
        }
        &self.current
    }
}
