use {
    crate::source::StatsSource,
    std::io::{self, BufRead, BufReader},
    thiserror::Error,
};

pub use self::counters::{CpuCounters, utilization};

mod counters;


/// a snapshot of the cpus' accounting counters at a moment in time.
///
/// index 0 holds the aggregate "cpu" line; indices 1..=N hold the per-core
/// "cpuN" lines, in the order the kernel lists them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Snapshot {
    pub cpus: Vec<CpuCounters>,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    /// the source held no cpu lines at all.
    #[error("no cpu accounting lines found")]
    Empty,
    /// a counter field was not an unsigned integer.
    #[error("invalid counter value")]
    Counter(#[from] std::num::ParseIntError),
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

// === impl Snapshot ===

impl Snapshot {
    /// uses the given source to read a snapshot of the cpu counters.
    ///
    /// cpu lines sit at the top of the table; reading stops at the first
    /// line of any other kind.
    pub fn read(source: &impl StatsSource) -> Result<Self, ReadError> {
        let reader = source.open().map(BufReader::new)?;

        let mut cpus = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.starts_with("cpu") {
                break;
            }
            cpus.push(line.parse::<CpuCounters>().map_err(ParseError::from)?);
        }

        if cpus.is_empty() {
            return Err(ParseError::Empty.into());
        }

        Ok(Self { cpus })
    }

    /// a snapshot of all-zero counters for the given core count.
    pub fn zeroed(cores: usize) -> Self {
        Self {
            cpus: vec![CpuCounters::default(); cores + 1],
        }
    }

    /// the number of per-core entries, excluding the aggregate line.
    pub fn cores(&self) -> usize {
        self.cpus.len().saturating_sub(1)
    }
}
