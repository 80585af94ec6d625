use std::time::{Duration, Instant};

/// Gates auto-advance on the time elapsed since the previous advance.
///
/// The reference point moves to the instant of each advance, so a late frame
/// delays every following one instead of being caught up. The achieved rate is
/// capped by the target, never above it.
pub struct FramePacer {
    interval: Duration,
    last_advance: Instant,
}

impl FramePacer {
    pub fn new(target_fps: u32, now: Instant) -> Self {
        Self {
            interval: frame_interval(target_fps),
            last_advance: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` and resets the reference when a frame is due.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_advance) >= self.interval {
            self.last_advance = now;
            true
        } else {
            false
        }
    }

    /// Restart the interval, used when playback resumes after a pause.
    pub fn reset(&mut self, now: Instant) {
        self.last_advance = now;
    }
}

pub fn frame_interval(target_fps: u32) -> Duration {
    Duration::from_secs(1) / target_fps.max(1)
}

/// Counts advanced frames and reports the observed rate once per second.
pub struct FpsMeter {
    frames: u32,
    window_start: Instant,
}

impl FpsMeter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
        }
    }

    pub fn record_frame(&mut self) {
        self.frames += 1;
    }

    /// Frames per whole second elapsed, once at least one second has passed.
    pub fn sample(&mut self, now: Instant) -> Option<u32> {
        let seconds = now.saturating_duration_since(self.window_start).as_secs();
        if seconds == 0 {
            return None;
        }
        let fps = self.frames / seconds as u32;
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }

    pub fn reset(&mut self, now: Instant) {
        self.frames = 0;
        self.window_start = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_matches_target_rate() {
        assert_eq!(frame_interval(240), Duration::from_nanos(4_166_666));
        assert_eq!(frame_interval(1), Duration::from_secs(1));
        assert_eq!(frame_interval(0), Duration::from_secs(1));
    }

    #[test]
    fn pacer_waits_for_full_interval() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(100, start);
        assert!(!pacer.tick(start));
        assert!(!pacer.tick(start + Duration::from_millis(9)));
        assert!(pacer.tick(start + Duration::from_millis(10)));
    }

    #[test]
    fn pacer_measures_from_last_advance() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(100, start);

        // A late frame moves the reference; the next one is due 10ms later.
        let late = start + Duration::from_millis(25);
        assert!(pacer.tick(late));
        assert!(!pacer.tick(start + Duration::from_millis(30)));
        assert!(pacer.tick(late + Duration::from_millis(10)));
    }

    #[test]
    fn pacer_reset_restarts_interval() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(100, start);
        let resumed = start + Duration::from_secs(5);
        pacer.reset(resumed);
        assert!(!pacer.tick(resumed + Duration::from_millis(5)));
    }

    #[test]
    fn meter_waits_a_full_second() {
        let start = Instant::now();
        let mut meter = FpsMeter::new(start);
        meter.record_frame();
        assert_eq!(meter.sample(start + Duration::from_millis(999)), None);
    }

    #[test]
    fn meter_reports_and_resets() {
        let start = Instant::now();
        let mut meter = FpsMeter::new(start);
        for _ in 0..120 {
            meter.record_frame();
        }
        let tick = start + Duration::from_millis(1_200);
        assert_eq!(meter.sample(tick), Some(120));
        assert_eq!(meter.sample(tick + Duration::from_secs(1)), Some(0));
    }

    #[test]
    fn meter_divides_by_whole_seconds() {
        let start = Instant::now();
        let mut meter = FpsMeter::new(start);
        for _ in 0..90 {
            meter.record_frame();
        }
        assert_eq!(meter.sample(start + Duration::from_millis(3_500)), Some(30));
    }
}
