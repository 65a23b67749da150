//! Test data builders for device lines

/// Builder for lines in the sensor hub's output format
#[derive(Debug, Clone)]
pub struct LineBuilder {
    body: String,
    anomaly: bool,
}

impl LineBuilder {
    pub fn mq2(raw: f64, smoothed: f64, rolling_avg: f64) -> Self {
        Self {
            body: format!(
                "[MQ-2 Sensor]\tRaw: {:.1}\tSmoothed: {:.1}\tRollingAvg: {:.1}",
                raw, smoothed, rolling_avg
            ),
            anomaly: false,
        }
    }

    pub fn light(level: u32, rolling_avg: f64) -> Self {
        Self {
            body: format!("[Light Sensor] Current: {} Rolling Avg: {:.1}", level, rolling_avg),
            anomaly: false,
        }
    }

    pub fn dht(temperature: f64, humidity: f64) -> Self {
        Self {
            body: format!(
                "[DHT Sensor] Temperature: {:.1} (feels warm) Humidity: {:.1}",
                temperature, humidity
            ),
            anomaly: false,
        }
    }

    pub fn rolling_timing(micros: u64) -> Self {
        Self {
            body: format!(
                "[MQ-2 Sensor] Execution time for rolling anomaly check: {} µs",
                micros
            ),
            anomaly: false,
        }
    }

    pub fn simple_timing(micros: u64) -> Self {
        Self {
            body: format!(
                "[MQ-2 Sensor] Execution time for simple anomaly check: {} µs",
                micros
            ),
            anomaly: false,
        }
    }

    /// Append the device's anomaly flag
    pub fn anomaly(mut self) -> Self {
        self.anomaly = true;
        self
    }

    pub fn build(self) -> String {
        if self.anomaly {
            format!("{} ANOMALY", self.body)
        } else {
            self.body
        }
    }
}

/// Join lines into newline-terminated stream text
pub fn stream(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_builder() {
        let line = LineBuilder::light(300, 280.5).anomaly().build();
        assert_eq!(line, "[Light Sensor] Current: 300 Rolling Avg: 280.5 ANOMALY");
        assert_eq!(stream(&[line.clone(), line]).lines().count(), 2);
    }
}
