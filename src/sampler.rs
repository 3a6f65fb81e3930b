use {
    crate::{
        source::{ProcStatFile, StatsSource},
        stat::{Snapshot, utilization},
    },
    tracing::{debug, warn},
};

/// observes the kernel's cpu accounting and reports per-interval
/// utilization, one value per core in `[0, 100]`.
///
/// the probe owns the previous snapshot. when the source cannot produce a
/// fresh one the previous snapshot is kept unchanged and the interval reads
/// as zero usage; a fresh read is attempted again at the very next poll, so
/// "use the last value" is the whole retry policy.
///
/// the aggregate "cpu" line anchors the table's shape but is not diffed:
/// the displayed system value is the mean of the per-core rolling
/// averages, which keeps it consistent with the scrolling graph.
pub struct Probe<S = ProcStatFile> {
    /// the underlying source of kernel statistics.
    source: S,
    /// the last observed snapshot.
    last: Snapshot,
}

// === impl Probe ===

impl<S: StatsSource> Probe<S> {
    /// creates a probe, taking the initial snapshot from the source.
    ///
    /// an unreadable source at startup is not fatal: the probe starts from
    /// an all-zero snapshot sized by the parallelism the runtime reports.
    pub fn new(source: S) -> Self {
        let last = match Snapshot::read(&source) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "cpu counters unreadable, starting from zero");
                Snapshot::zeroed(fallback_core_count())
            }
        };

        Self { source, last }
    }

    /// the number of cores the probe is tracking.
    pub fn cores(&self) -> usize {
        self.last.cores()
    }

    /// compares a fresh snapshot against the previous one.
    pub fn observe(&mut self) -> Vec<f64> {
        let Self { source, last } = self;

        let new = match Snapshot::read(source) {
            Ok(snapshot) if snapshot.cpus.len() == last.cpus.len() => snapshot,
            Ok(snapshot) => {
                // core renumbering; resynchronize and report nothing.
                debug!(
                    had = last.cpus.len(),
                    got = snapshot.cpus.len(),
                    "cpu line count changed",
                );
                *last = snapshot;
                return vec![0.0; last.cores()];
            }
            Err(error) => {
                debug!(%error, "cpu counters unavailable this interval");
                return vec![0.0; last.cores()];
            }
        };

        let cores = last.cpus[1..]
            .iter()
            .zip(&new.cpus[1..])
            .map(|(prev, curr)| utilization(prev, curr))
            .collect();

        *last = new;

        cores
    }
}

fn fallback_core_count() -> usize {
    std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockStatSource};

    const FIRST: &str = "\
cpu  100 0 100 800 0 0 0 0
cpu0 60 0 40 400 0 0 0 0
cpu1 40 0 60 400 0 0 0 0
";

    // core 0 fully busy over the interval, core 1 fully idle.
    const SECOND: &str = "\
cpu  200 0 100 900 0 0 0 0
cpu0 160 0 40 400 0 0 0 0
cpu1 40 0 60 500 0 0 0 0
";

    #[test]
    fn observes_per_core_deltas() {
        let mut probe = Probe::new(MockStatSource::new([FIRST, SECOND]));
        assert_eq!(probe.cores(), 2);
        assert_eq!(probe.observe(), vec![100.0, 0.0]);
    }

    /// the aggregate line shapes the table but contributes no sample.
    #[test]
    fn reports_one_value_per_core() {
        let mut probe = Probe::new(MockStatSource::new([FIRST, SECOND]));
        assert_eq!(probe.observe().len(), probe.cores());
    }

    #[test]
    fn unavailable_source_reads_as_zero_usage() {
        let mut probe = Probe::new(MockStatSource::new([FIRST]));

        // the mock is exhausted, so this interval falls back to zero.
        assert_eq!(probe.observe(), vec![0.0, 0.0]);
    }

    /// the stale snapshot survives an outage, so the next successful read
    /// still produces a meaningful delta.
    #[test]
    fn recovers_after_an_outage() {
        let mut probe = Probe::new(MockStatSource::new([FIRST]));
        let _ = probe.observe();

        probe.source = MockStatSource::new([SECOND]);
        assert_eq!(probe.observe(), vec![100.0, 0.0]);
    }

    #[test]
    fn duplicate_table_reads_as_zero_usage() {
        let mut probe = Probe::new(MockStatSource::new([FIRST, FIRST]));
        assert_eq!(probe.observe(), vec![0.0, 0.0]);
    }
}
