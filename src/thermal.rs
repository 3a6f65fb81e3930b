use {
    std::{fs, path::Path, process::Command},
    tracing::debug,
};

/// a source of the cpu package temperature.
pub trait TempSource {
    /// samples the temperature in °c; 0 signals "unavailable".
    fn sample(&mut self) -> f64;
}

/// the standard acquisition chain.
///
/// tries the `sensors` utility first, then walks a fixed list of sysfs
/// sensor files. the first positive reading wins; when nothing is readable
/// the sample is 0 and the caller skips it.
#[derive(Default)]
pub struct Thermometer;

/// process-lifetime temperature extrema.
///
/// non-positive readings mean "no sensor was readable" and are ignored, so
/// the extrema stay unset until the first real observation and are monotone
/// afterwards. only a restart resets them.
#[derive(Clone, Copy, Debug, Default)]
pub struct TempExtremes {
    min: Option<f64>,
    max: Option<f64>,
}

/// sysfs fallbacks, tried in order after the `sensors` utility.
const SYSFS_SENSORS: &[&str] = &[
    "/sys/class/hwmon/hwmon0/temp1_input",
    "/sys/class/hwmon/hwmon1/temp1_input",
    "/sys/class/hwmon/hwmon2/temp1_input",
    "/sys/class/hwmon/hwmon3/temp1_input",
    "/sys/class/hwmon/hwmon4/temp1_input",
    "/sys/class/thermal/thermal_zone0/temp",
];

/// the package-level labels recognized in `sensors` output, in order of
/// confidence.
const SENSOR_LABELS: &[&str] = &["Tctl:", "Tdie:", "Package id 0:"];

// === impl Thermometer ===

impl TempSource for Thermometer {
    fn sample(&mut self) -> f64 {
        if let Some(temp) = sensors_command() {
            return temp;
        }

        for path in SYSFS_SENSORS {
            if let Some(temp) = read_millidegrees(Path::new(path)) {
                return temp;
            }
        }

        debug!("no temperature source was readable");
        0.0
    }
}

// === impl TempExtremes ===

impl TempExtremes {
    /// folds one observation into the extrema; non-positive readings are
    /// excluded.
    pub fn record(&mut self, temp: f64) {
        if temp <= 0.0 {
            return;
        }
        self.min = Some(self.min.map_or(temp, |min| min.min(temp)));
        self.max = Some(self.max.map_or(temp, |max| max.max(temp)));
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

/// runs `sensors` and scans its output for a package temperature.
fn sensors_command() -> Option<f64> {
    let output = Command::new("sensors").output().ok()?;
    if !output.status.success() {
        return None;
    }

    parse_sensors(&String::from_utf8_lossy(&output.stdout))
}

/// finds the first recognized package temperature line in `sensors` output.
fn parse_sensors(output: &str) -> Option<f64> {
    for line in output.lines() {
        let line = line.trim_start();
        let Some(label) = SENSOR_LABELS.iter().find(|label| line.starts_with(**label)) else {
            continue;
        };

        let reading = line[label.len()..].split_whitespace().next()?;
        if let Some(temp) = parse_reading(reading) {
            return Some(temp);
        }
    }

    None
}

/// parses a reading like `+55.1°C` into degrees; positive values only.
fn parse_reading(token: &str) -> Option<f64> {
    token
        .trim_start_matches('+')
        .trim_end_matches("°C")
        .parse::<f64>()
        .ok()
        .filter(|temp| *temp > 0.0)
}

/// reads a sysfs thermal file, which reports millidegrees.
fn read_millidegrees(path: &Path) -> Option<f64> {
    parse_millidegrees(&fs::read_to_string(path).ok()?)
}

/// converts a sysfs millidegree reading into degrees; positive values only.
fn parse_millidegrees(text: &str) -> Option<f64> {
    let milli = text.trim().parse::<f64>().ok()?;
    let temp = milli / 1000.0;
    (temp > 0.0).then_some(temp)
}
