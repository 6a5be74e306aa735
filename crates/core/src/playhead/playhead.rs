/// Host-side playback position feeding the scheduler.
///
/// The engine never advances this on its own: the host driver reports every
/// time sample through `Engine::on_time_update`, and the playhead just holds
/// the latest value plus the media metadata cue defaulting needs.
#[derive(Debug, Clone)]
pub struct Playhead {
    time: f64,
    duration: Option<f64>,
    paused: bool,
    playback_rate: f64,
}

impl Default for Playhead {
    fn default() -> Self {
        Self {
            time: 0.0,
            duration: None,
            paused: true,
            playback_rate: 1.0,
        }
    }
}

impl Playhead {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn current_time(&self) -> f64 {
        self.time
    }

    pub(crate) fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Total media duration in seconds; `None` while still unknown.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub(crate) fn set_duration(&mut self, duration: f64) {
        self.duration = Some(duration);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn playback_rate(&self) -> f64 {
        self.playback_rate
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback_rate = rate;
    }

    /// Current time rounded to the nearest whole second.
    pub fn round_time(&self) -> i64 {
        self.time.round() as i64
    }

    /// Where the upper guard cue sits: one past the duration, or an
    /// effectively infinite bound while the duration is unknown.
    pub(crate) fn guard_bound(&self) -> f64 {
        match self.duration {
            Some(duration) => duration + 1.0,
            None => f64::MAX,
        }
    }
}
