//! Time management utilities

/// One step of the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Absolute time of this tick in seconds
    pub now: f32,

    /// Seconds elapsed since the previous tick
    pub elapsed: f32,
}

impl Tick {
    /// Create a tick
    pub fn new(now: f32, elapsed: f32) -> Self {
        Self { now, elapsed }
    }
}

/// Turns absolute timestamps into ticks.
///
/// The first sample only primes the clock: there is no previous sample to
/// measure elapsed time against, so it yields no tick.
#[derive(Debug, Default)]
pub struct FrameClock {
    last: Option<f32>,
    frame_count: u64,
}

impl FrameClock {
    /// Create a clock that has not been sampled yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current time in seconds
    pub fn sample(&mut self, now: f32) -> Option<Tick> {
        let previous = self.last.replace(now)?;
        self.frame_count += 1;
        // A clock that runs backwards never produces negative steps
        Some(Tick::new(now, (now - previous).max(0.0)))
    }

    /// Time of the last sample
    pub fn now(&self) -> Option<f32> {
        self.last
    }

    /// Number of ticks produced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Fixed-rate timestamp source used for headless runs
#[derive(Debug, Clone, Copy)]
pub struct FixedStep {
    step: f32,
    frame: u32,
}

impl FixedStep {
    /// Create a source advancing `fps` frames per simulated second
    pub fn from_fps(fps: u32) -> Self {
        Self {
            step: 1.0 / fps.max(1) as f32,
            frame: 0,
        }
    }

    /// Duration of one frame in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Timestamp of the next frame
    pub fn next_timestamp(&mut self) -> f32 {
        let timestamp = self.frame as f32 * self.step;
        self.frame += 1;
        timestamp
    }
}
