use {
    std::{
        env,
        path::PathBuf,
        process::{Child, Command, Stdio},
    },
    tracing::{debug, warn},
};

/// handle to the optional external load generator.
///
/// the generator is a detached `stress` process; starting and stopping it
/// is fire-and-forget. the monitor tracks only whether the binary exists
/// and whether a child is currently running.
pub struct Stress {
    child: Option<Child>,
    available: bool,
    cores: usize,
}

/// what the header should say about the load generator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StressStatus {
    /// the `stress` binary is not on `PATH` (or the binding is disabled).
    Unavailable,
    Off,
    On,
}

// === impl Stress ===

impl Stress {
    const COMMAND: &str = "stress";

    /// binds the load generator, probing `PATH` for the binary once.
    pub fn new(cores: usize, enabled: bool) -> Self {
        let available = enabled && locate(Self::COMMAND).is_some();
        Self {
            child: None,
            available,
            cores,
        }
    }

    pub fn status(&self) -> StressStatus {
        match (self.available, &self.child) {
            (false, _) => StressStatus::Unavailable,
            (true, Some(_)) => StressStatus::On,
            (true, None) => StressStatus::Off,
        }
    }

    /// starts the generator if stopped, stops it if running.
    pub fn toggle(&mut self) {
        if !self.available {
            return;
        }

        match self.child.take() {
            Some(child) => Self::kill(child),
            None => self.spawn(),
        }
    }

    fn spawn(&mut self) {
        let spawned = Command::new(Self::COMMAND)
            .arg("--cpu")
            .arg(self.cores.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                debug!(pid = child.id(), "load generator started");
                self.child = Some(child);
            }
            Err(error) => warn!(%error, "load generator failed to start"),
        }
    }

    fn kill(mut child: Child) {
        debug!(pid = child.id(), "load generator stopped");
        if let Err(error) = child.kill() {
            warn!(%error, "load generator did not stop");
        }
        let _ = child.wait();
    }
}

impl Drop for Stress {
    /// quitting the monitor never leaks a running generator.
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            Self::kill(child);
        }
    }
}

/// searches `PATH` for an executable, like `which(1)`.
fn locate(command: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}
