//! Sensor collection and poll loop
//!
//! [`Monitor`] owns the sensors found at startup. Each tick reads every
//! sensor in place, summarizes, hands both to a [`Renderer`] and waits for
//! the next interval. Everything runs on the calling thread.

use crate::error::{Error, Result};
use crate::hwmon::{self, Sensor, SensorCategory, SensorSources};
use crate::shutdown::ShutdownToken;
use crate::stats::{self, SystemStats};
use log::{debug, info};
use std::time::Duration;

/// Update every sensor, then summarize the result.
pub fn poll_once(sensors: &mut [Sensor]) -> SystemStats {
    for sensor in sensors.iter_mut() {
        stats::update_sensor(sensor);
    }
    stats::summarize(sensors)
}

/// Output side of the poll loop
pub trait Renderer {
    /// Present one tick. Called after every poll with a consistent snapshot.
    fn render(&mut self, sensors: &[Sensor], stats: &SystemStats) -> Result<()>;

    /// Wait out the refresh interval.
    ///
    /// Interactive renderers override this to handle input while waiting and
    /// may cancel `shutdown` themselves.
    fn idle(&mut self, interval: Duration, shutdown: &ShutdownToken) -> Result<()> {
        shutdown.sleep(interval);
        Ok(())
    }
}

/// Owned sensor collection
#[derive(Debug, Clone)]
pub struct Monitor {
    sensors: Vec<Sensor>,
    sources: SensorSources,
}

impl Monitor {
    /// Discover sensors under `sources`.
    ///
    /// Fails with [`Error::NoSensors`] when nothing was found.
    pub fn discover(sources: SensorSources) -> Result<Self> {
        let sensors = hwmon::discover(&sources);
        if sensors.is_empty() {
            return Err(Error::NoSensors {
                hwmon_root: sources.hwmon_root,
                thermal_root: sources.thermal_root,
            });
        }
        Ok(Self { sensors, sources })
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Roots the sensors were discovered under
    pub fn sources(&self) -> &SensorSources {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Number of sensors in `category`
    pub fn count(&self, category: SensorCategory) -> usize {
        self.sensors.iter().filter(|s| s.category() == category).count()
    }

    /// One refresh tick
    pub fn poll_once(&mut self) -> SystemStats {
        poll_once(&mut self.sensors)
    }

    /// Poll, render and idle until `shutdown` is cancelled.
    ///
    /// The token is checked only between ticks, so a tick that has started
    /// always completes. Renderer errors end the loop.
    pub fn run<R: Renderer>(
        &mut self,
        renderer: &mut R,
        interval: Duration,
        shutdown: &ShutdownToken,
    ) -> Result<u64> {
        info!(
            "monitoring {} sensors every {}s",
            self.sensors.len(),
            interval.as_secs()
        );

        let mut ticks = 0;
        while !shutdown.is_cancelled() {
            let stats = self.poll_once();
            renderer.render(&self.sensors, &stats)?;
            ticks += 1;

            if shutdown.is_cancelled() {
                break;
            }
            renderer.idle(interval, shutdown)?;
        }

        debug!("poll loop stopped after {} ticks", ticks);
        Ok(ticks)
    }
}
