use std::str::FromStr;

/// the accounting counters for one logical cpu.
///
/// each field is a cumulative tick count since boot, as exposed by the
/// kernel's statistics table; see `proc_stat(5)`. values are non-decreasing
/// between reads under normal operation, but a counter reset must read as
/// zero usage rather than underflowing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuCounters {
    /// time spent in user mode.
    pub user: u64,
    /// time spent in user mode with low priority (nice).
    pub nice: u64,
    /// time spent in system mode.
    pub system: u64,
    /// time spent in the idle task.
    pub idle: u64,
    /// time waiting for i/o to complete.
    pub iowait: u64,
    /// time servicing interrupts.
    pub irq: u64,
    /// time servicing softirqs.
    pub softirq: u64,
    /// time stolen by the hypervisor in a virtualized environment.
    pub steal: u64,
}

/// the percentage of an interval between two counter snapshots spent busy.
///
/// the interval length is the sum of the idle and busy deltas; a zero-length
/// interval (a duplicate poll) reads as 0% rather than dividing by zero, and
/// deltas saturate so a counter reset never goes negative. the result is
/// clamped to `[0, 100]`.
pub fn utilization(prev: &CpuCounters, curr: &CpuCounters) -> f64 {
    let idle = curr.idle_ticks().saturating_sub(prev.idle_ticks());
    let busy = curr.busy_ticks().saturating_sub(prev.busy_ticks());
    let total = idle + busy;

    if total == 0 {
        return 0.0;
    }

    let usage = ((total - idle) as f64 / total as f64) * 100.0;
    usage.clamp(0.0, 100.0)
}

// === impl CpuCounters ===

impl CpuCounters {
    /// ticks spent idle, counting time blocked on i/o as idle.
    fn idle_ticks(&self) -> u64 {
        self.idle + self.iowait
    }

    /// ticks spent busy.
    ///
    /// steal is parsed but left out of this sum: time taken by the
    /// hypervisor is not load generated by this guest.
    fn busy_ticks(&self) -> u64 {
        let Self {
            user,
            nice,
            system,
            irq,
            softirq,
            ..
        } = *self;

        user + nice + system + irq + softirq
    }
}

impl FromStr for CpuCounters {
    type Err = std::num::ParseIntError;

    /// parses a "cpu" or "cpuN" line.
    ///
    /// sources exposing fewer than eight counter fields are tolerated by
    /// zero-filling the missing ones; extra trailing fields are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_ascii_whitespace();
        let _label = fields.next();

        let mut values = [0u64; 8];
        for (value, token) in values.iter_mut().zip(fields) {
            *value = token.parse()?;
        }

        Ok(Self::from(values))
    }
}

impl From<[u64; 8]> for CpuCounters {
    fn from(
        [user, nice, system, idle, iowait, irq, softirq, steal]: [u64; 8],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
        }
    }
}
