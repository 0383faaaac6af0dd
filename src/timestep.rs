use std::time::Duration;

pub struct FixedTimestep {
    step: Duration,
    simulated: Duration,
}

impl FixedTimestep {
    pub fn new(step_ms: u64) -> Self {
        Self {
            step: Duration::from_millis(step_ms.max(1)),
            simulated: Duration::ZERO,
        }
    }

    pub fn simulated_time(&self) -> Duration {
        self.simulated
    }

    pub fn catch_up<F>(&mut self, real_time: Duration, mut advance: F) -> u32
    where
        F: FnMut(Duration),
    {
        let mut steps = 0;
        while self.simulated + self.step <= real_time {
            advance(self.step);
            self.simulated += self.step;
            steps += 1;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn fifty_ms_runs_three_steps() {
        let mut clock = FixedTimestep::new(16);
        let steps = clock.catch_up(ms(50), |_| {});
        assert_eq!(steps, 3);
        assert_eq!(clock.simulated_time(), ms(48));
        assert_eq!(ms(50) - clock.simulated_time(), ms(2));
    }

    #[test]
    fn remainder_carries_into_next_frame() {
        let mut clock = FixedTimestep::new(16);
        clock.catch_up(ms(50), |_| {});
        assert_eq!(clock.catch_up(ms(60), |_| {}), 0);
        assert_eq!(clock.catch_up(ms(64), |_| {}), 1);
        assert_eq!(clock.simulated_time(), ms(64));
    }

    #[test]
    fn step_count_matches_floor_and_never_overshoots() {
        let mut clock = FixedTimestep::new(16);
        let mut real = Duration::ZERO;
        for delta in [0u64, 1, 15, 16, 17, 31, 33, 250, 7, 1000, 3] {
            let before = clock.simulated_time();
            real += ms(delta);
            let expected = ((real - before).as_millis() / 16) as u32;
            let steps = clock.catch_up(real, |_| {});
            assert_eq!(steps, expected, "delta {delta}");
            assert!(clock.simulated_time() <= real);
        }
    }

    #[test]
    fn stall_runs_every_missed_step() {
        let mut clock = FixedTimestep::new(16);
        let mut seen = Vec::new();
        let steps = clock.catch_up(ms(16 * 5 + 9), |step| seen.push(step));
        assert_eq!(steps, 5);
        assert_eq!(seen, vec![ms(16); 5]);
        assert_eq!(clock.simulated_time(), ms(80));
    }

    #[test]
    fn zero_step_is_clamped() {
        let mut clock = FixedTimestep::new(0);
        let mut seen = Vec::new();
        assert_eq!(clock.catch_up(ms(3), |step| seen.push(step)), 3);
        assert_eq!(seen, vec![ms(1); 3]);
    }
}
