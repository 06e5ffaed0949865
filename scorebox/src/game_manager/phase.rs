use super::{GameManagerError, Result};
use hoops_common::{
    config::GameSettings,
    game_snapshot::{ClockState, Phase},
};
use time::OffsetDateTime;

/// Legal phase transitions and period navigation over a game's clock.
///
/// The caller is expected to have brought the clock up to date with
/// [`super::clock::tick`] before invoking any transition.
pub(crate) struct PhaseMachine<'a> {
    clock: &'a mut ClockState,
    settings: &'a GameSettings,
}

impl<'a> PhaseMachine<'a> {
    pub(crate) fn new(clock: &'a mut ClockState, settings: &'a GameSettings) -> Self {
        Self { clock, settings }
    }

    fn ensure_not_finished(&self) -> Result<()> {
        if self.clock.phase == Phase::Finished {
            Err(GameManagerError::GameFinished)
        } else {
            Ok(())
        }
    }

    fn ensure_stopped(&self, action: &'static str) -> Result<()> {
        self.ensure_not_finished()?;
        if self.clock.timer_running {
            Err(GameManagerError::ClockIsRunning(action))
        } else {
            Ok(())
        }
    }

    /// Starts the clock, entering play first when coming from warmup, a timeout, or an expired break
    pub(crate) fn start(&mut self, now: OffsetDateTime) -> Result<()> {
        self.ensure_not_finished()?;
        if self.clock.timer_running {
            return Err(GameManagerError::ClockAlreadyRunning);
        }

        match self.clock.phase {
            Phase::NotStarted | Phase::Warmup => {
                self.clock.current_period = 1;
                self.clock.is_overtime = false;
                self.clock.remaining_secs = self.settings.quarter_secs();
                self.clock.phase = Phase::InProgress;
            }
            Phase::Timeout => self.clock.phase = Phase::InProgress,
            phase if phase.is_break() && self.clock.remaining_secs <= 0.0 => {
                self.clock.remaining_secs = self.settings.period_secs(self.clock.is_overtime);
                self.clock.phase = Phase::InProgress;
            }
            // Play already underway, or a break with time left on it
            _ => {}
        }

        self.clock.timer_running = true;
        self.clock.last_tick_at = Some(now);
        Ok(())
    }

    /// Stops the clock. Play goes into a timeout, warmup and breaks keep their phase.
    pub(crate) fn pause(&mut self) -> Result<()> {
        self.ensure_not_finished()?;
        if !self.clock.timer_running {
            return Err(GameManagerError::ClockNotRunning);
        }

        if self.clock.phase == Phase::InProgress {
            self.clock.phase = Phase::Timeout;
        }
        self.clock.timer_running = false;
        Ok(())
    }

    pub(crate) fn reset(&mut self) -> Result<()> {
        self.ensure_stopped("reset the clock")?;
        self.clock.remaining_secs = self
            .clock
            .phase
            .reset_duration(self.settings, self.clock.is_overtime)
            .ok_or(GameManagerError::GameFinished)?;
        Ok(())
    }

    pub(crate) fn advance_period(&mut self) -> Result<()> {
        self.ensure_stopped("change the period")?;
        let next = self
            .clock
            .current_period
            .checked_add(1)
            .ok_or(GameManagerError::PeriodLimit)?;

        if !self.clock.is_overtime && self.clock.current_period < self.settings.quarters {
            self.clock.remaining_secs = self.settings.quarter_secs();
        } else {
            self.clock.is_overtime = true;
            self.clock.remaining_secs = self.settings.overtime_secs();
        }
        self.clock.current_period = next;
        self.enter_play();
        Ok(())
    }

    pub(crate) fn rewind_period(&mut self) -> Result<()> {
        self.ensure_stopped("change the period")?;
        if self.clock.current_period <= 1 && !self.clock.is_overtime {
            return Err(GameManagerError::AtFirstPeriod);
        }

        if self.clock.is_overtime
            && self.clock.current_period > self.settings.quarters.saturating_add(1)
        {
            self.clock.current_period -= 1;
            self.clock.remaining_secs = self.settings.overtime_secs();
        } else if self.clock.is_overtime {
            self.clock.is_overtime = false;
            self.clock.current_period = self.settings.quarters;
            self.clock.remaining_secs = self.settings.quarter_secs();
        } else {
            self.clock.current_period -= 1;
            self.clock.remaining_secs = self.settings.quarter_secs();
        }
        self.enter_play();
        Ok(())
    }

    /// Ends the current period of play and enters the break that follows it
    pub(crate) fn start_break(&mut self) -> Result<Phase> {
        self.ensure_not_finished()?;
        match self.clock.phase {
            Phase::InProgress | Phase::Timeout => {}
            phase => return Err(GameManagerError::WrongPhase("start a break", phase)),
        }

        let quarters = self.settings.quarters;
        let phase = if self.clock.is_overtime || self.clock.current_period >= quarters {
            Phase::OvertimeBreak
        } else if quarters % 2 == 0 && self.clock.current_period == quarters / 2 {
            Phase::Halftime
        } else {
            Phase::QuarterBreak
        };

        self.clock.phase = phase;
        self.clock.timer_running = false;
        self.clock.remaining_secs = phase
            .reset_duration(self.settings, self.clock.is_overtime)
            .ok_or(GameManagerError::GameFinished)?;
        Ok(phase)
    }

    pub(crate) fn finish(&mut self) -> Result<()> {
        self.ensure_not_finished()?;
        self.clock.timer_running = false;
        self.clock.phase = Phase::Finished;
        Ok(())
    }

    fn enter_play(&mut self) {
        self.clock.phase = Phase::InProgress;
        self.clock.timer_running = false;
    }
}

#[cfg(test)]
mod test {
    use super::GameManagerError as GMErr;
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-02-01 20:00:00 UTC);

    fn settings() -> GameSettings {
        GameSettings {
            quarters: 4,
            quarter_duration: 600,
            overtime_duration: 300,
            break_duration: 120,
            ..Default::default()
        }
    }

    fn clock_at(period: u8, settings: &GameSettings) -> ClockState {
        ClockState {
            current_period: period,
            is_overtime: period > settings.quarters,
            phase: Phase::InProgress,
            remaining_secs: settings.period_secs(period > settings.quarters),
            timer_running: false,
            last_tick_at: None,
        }
    }

    #[test]
    fn test_start_from_warmup() {
        let settings = settings();
        let mut clock = ClockState::warmup(&settings);
        clock.remaining_secs = 17.0;

        PhaseMachine::new(&mut clock, &settings).start(NOW).unwrap();
        assert_eq!(clock.phase, Phase::InProgress);
        assert_eq!(clock.current_period, 1);
        assert!(!clock.is_overtime);
        assert_eq!(clock.remaining_secs, 600.0);
        assert!(clock.timer_running);
        assert_eq!(clock.last_tick_at, Some(NOW));

        assert_eq!(
            PhaseMachine::new(&mut clock, &settings).start(NOW),
            Err(GMErr::ClockAlreadyRunning)
        );
    }

    #[test]
    fn test_pause_and_resume_from_timeout() {
        let settings = settings();
        let mut clock = clock_at(2, &settings);
        let mut machine = PhaseMachine::new(&mut clock, &settings);
        assert_eq!(machine.pause(), Err(GMErr::ClockNotRunning));
        machine.start(NOW).unwrap();
        machine.clock.remaining_secs = 321.5;
        machine.pause().unwrap();
        assert_eq!(machine.clock.phase, Phase::Timeout);
        assert!(!machine.clock.timer_running);
        assert_eq!(machine.clock.remaining_secs, 321.5);

        machine.start(NOW).unwrap();
        assert_eq!(machine.clock.phase, Phase::InProgress);
        assert_eq!(machine.clock.remaining_secs, 321.5);
    }

    #[test]
    fn test_start_from_breaks() {
        let settings = settings();
        for phase in [Phase::QuarterBreak, Phase::Halftime, Phase::OvertimeBreak] {
            let mut clock = clock_at(2, &settings);
            clock.phase = phase;
            clock.remaining_secs = 0.0;
            PhaseMachine::new(&mut clock, &settings).start(NOW).unwrap();
            assert_eq!(clock.phase, Phase::InProgress);
            assert_eq!(clock.remaining_secs, 600.0);

            let mut clock = clock_at(5, &settings);
            clock.phase = phase;
            clock.remaining_secs = 0.0;
            PhaseMachine::new(&mut clock, &settings).start(NOW).unwrap();
            assert_eq!(clock.remaining_secs, 300.0);

            // A break with time left runs its own countdown
            let mut clock = clock_at(2, &settings);
            clock.phase = phase;
            clock.remaining_secs = 45.0;
            let mut machine = PhaseMachine::new(&mut clock, &settings);
            machine.start(NOW).unwrap();
            assert_eq!(machine.clock.phase, phase);
            assert_eq!(machine.clock.remaining_secs, 45.0);
            assert!(machine.clock.timer_running);
            machine.pause().unwrap();
            assert_eq!(machine.clock.phase, phase);
        }
    }

    #[test]
    fn test_reset_per_phase() {
        let settings = settings();
        let cases = [
            (Phase::Warmup, false, 600.0),
            (Phase::InProgress, false, 600.0),
            (Phase::InProgress, true, 300.0),
            (Phase::Timeout, false, 600.0),
            (Phase::Timeout, true, 300.0),
            (Phase::QuarterBreak, false, 120.0),
            (Phase::OvertimeBreak, true, 120.0),
            (Phase::Halftime, false, 240.0),
        ];
        for (phase, overtime, expected) in cases {
            let mut clock = clock_at(if overtime { 5 } else { 2 }, &settings);
            clock.phase = phase;
            clock.remaining_secs = 1.25;
            PhaseMachine::new(&mut clock, &settings).reset().unwrap();
            assert_eq!(clock.remaining_secs, expected, "{phase:?} overtime={overtime}");
            assert_eq!(clock.phase, phase);
        }
    }

    #[test]
    fn test_guards_while_running() {
        let settings = settings();
        let mut clock = clock_at(2, &settings);
        let mut machine = PhaseMachine::new(&mut clock, &settings);
        machine.start(NOW).unwrap();
        assert_eq!(
            machine.reset(),
            Err(GMErr::ClockIsRunning("reset the clock"))
        );
        assert_eq!(
            machine.advance_period(),
            Err(GMErr::ClockIsRunning("change the period"))
        );
        assert_eq!(
            machine.rewind_period(),
            Err(GMErr::ClockIsRunning("change the period"))
        );
        assert_eq!(machine.clock.current_period, 2);
    }

    #[test]
    fn test_guards_when_finished() {
        let settings = settings();
        let mut clock = clock_at(3, &settings);
        let mut machine = PhaseMachine::new(&mut clock, &settings);
        machine.finish().unwrap();
        let before = machine.clock.clone();
        assert_eq!(machine.start(NOW), Err(GMErr::GameFinished));
        assert_eq!(machine.pause(), Err(GMErr::GameFinished));
        assert_eq!(machine.reset(), Err(GMErr::GameFinished));
        assert_eq!(machine.advance_period(), Err(GMErr::GameFinished));
        assert_eq!(machine.rewind_period(), Err(GMErr::GameFinished));
        assert_eq!(machine.start_break(), Err(GMErr::GameFinished));
        assert_eq!(machine.finish(), Err(GMErr::GameFinished));
        assert_eq!(*machine.clock, before);
    }

    #[test]
    fn test_advance_into_overtime() {
        let settings = settings();
        let mut clock = clock_at(1, &settings);
        let mut machine = PhaseMachine::new(&mut clock, &settings);
        for period in 2..=4 {
            machine.advance_period().unwrap();
            assert_eq!(machine.clock.current_period, period);
            assert!(!machine.clock.is_overtime);
            assert_eq!(machine.clock.remaining_secs, 600.0);
        }
        machine.advance_period().unwrap();
        assert_eq!(machine.clock.current_period, 5);
        assert!(machine.clock.is_overtime);
        assert_eq!(machine.clock.remaining_secs, 300.0);

        machine.advance_period().unwrap();
        assert_eq!(machine.clock.current_period, 6);
        assert!(machine.clock.is_overtime);
        assert_eq!(machine.clock.remaining_secs, 300.0);
        assert_eq!(machine.clock.phase, Phase::InProgress);
        assert!(!machine.clock.timer_running);
    }

    #[test]
    fn test_rewind_out_of_overtime() {
        let settings = settings();
        let mut clock = clock_at(6, &settings);
        let mut machine = PhaseMachine::new(&mut clock, &settings);
        machine.rewind_period().unwrap();
        assert_eq!(machine.clock.current_period, 5);
        assert!(machine.clock.is_overtime);
        assert_eq!(machine.clock.remaining_secs, 300.0);

        machine.rewind_period().unwrap();
        assert_eq!(machine.clock.current_period, 4);
        assert!(!machine.clock.is_overtime);
        assert_eq!(machine.clock.remaining_secs, 600.0);

        for period in (1..=3).rev() {
            machine.rewind_period().unwrap();
            assert_eq!(machine.clock.current_period, period);
        }
        assert_eq!(machine.rewind_period(), Err(GMErr::AtFirstPeriod));
        assert_eq!(machine.clock.current_period, 1);
    }

    #[test]
    fn test_next_prev_round_trip() {
        let settings = settings();
        for period in 1..=7 {
            let mut clock = clock_at(period, &settings);
            let before = clock.clone();
            let mut machine = PhaseMachine::new(&mut clock, &settings);
            machine.advance_period().unwrap();
            machine.rewind_period().unwrap();
            assert_eq!(machine.clock.current_period, before.current_period);
            assert_eq!(machine.clock.is_overtime, before.is_overtime);
            assert_eq!(machine.clock.remaining_secs, before.remaining_secs);
        }
    }

    #[test]
    fn test_overtime_flag_tracks_period() {
        let settings = GameSettings {
            quarters: 2,
            ..settings()
        };
        let mut clock = clock_at(1, &settings);
        let mut machine = PhaseMachine::new(&mut clock, &settings);
        for _ in 0..5 {
            machine.advance_period().unwrap();
            assert_eq!(
                machine.clock.is_overtime,
                machine.clock.current_period > settings.quarters
            );
        }
        for _ in 0..5 {
            machine.rewind_period().unwrap();
            assert_eq!(
                machine.clock.is_overtime,
                machine.clock.current_period > settings.quarters
            );
        }
    }

    #[test]
    fn test_start_break_picks_phase() {
        let settings = settings();
        let cases = [
            (1, Phase::QuarterBreak, 120.0),
            (2, Phase::Halftime, 240.0),
            (3, Phase::QuarterBreak, 120.0),
            (4, Phase::OvertimeBreak, 120.0),
            (5, Phase::OvertimeBreak, 120.0),
        ];
        for (period, phase, remaining) in cases {
            let mut clock = clock_at(period, &settings);
            clock.timer_running = true;
            let mut machine = PhaseMachine::new(&mut clock, &settings);
            assert_eq!(machine.start_break(), Ok(phase));
            assert_eq!(machine.clock.remaining_secs, remaining);
            assert!(!machine.clock.timer_running);
            assert_eq!(machine.clock.current_period, period);
        }

        let odd = GameSettings {
            quarters: 3,
            ..settings
        };
        let mut clock = clock_at(1, &odd);
        assert_eq!(
            PhaseMachine::new(&mut clock, &odd).start_break(),
            Ok(Phase::QuarterBreak)
        );

        let mut clock = ClockState::warmup(&settings);
        assert_eq!(
            PhaseMachine::new(&mut clock, &settings).start_break(),
            Err(GMErr::WrongPhase("start a break", Phase::Warmup))
        );
    }
}
