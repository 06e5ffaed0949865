use crate::{
    bundles::HomeAwayBundle,
    config::GameSettings,
    player::{Player, PlayerId},
    side::TeamSide,
    stats::{Direction, PlayerStats, StatKey},
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

#[derive(Derivative, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derivative(Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[derivative(Default)]
    NotStarted,
    Warmup,
    InProgress,
    Timeout,
    QuarterBreak,
    Halftime,
    OvertimeBreak,
    Finished,
}

impl Phase {
    /// Whether the countdown advances in this phase while the timer runs
    pub fn clock_runs(self) -> bool {
        match self {
            Self::Warmup
            | Self::InProgress
            | Self::QuarterBreak
            | Self::Halftime
            | Self::OvertimeBreak => true,
            Self::NotStarted | Self::Timeout | Self::Finished => false,
        }
    }

    /// Quarter breaks, halftime and overtime breaks
    pub fn is_break(self) -> bool {
        matches!(
            self,
            Self::QuarterBreak | Self::Halftime | Self::OvertimeBreak
        )
    }

    /// The time a reset restores for this phase. `None` once the game is over.
    pub fn reset_duration(self, settings: &GameSettings, is_overtime: bool) -> Option<f64> {
        match self {
            Self::NotStarted | Self::Warmup => Some(settings.quarter_secs()),
            Self::InProgress | Self::Timeout => Some(settings.period_secs(is_overtime)),
            Self::QuarterBreak | Self::OvertimeBreak => Some(settings.break_secs()),
            Self::Halftime => Some(settings.break_secs() * 2.0),
            Self::Finished => None,
        }
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Phase::NotStarted => write!(f, "Not Started"),
            Phase::Warmup => write!(f, "Warmup"),
            Phase::InProgress => write!(f, "In Progress"),
            Phase::Timeout => write!(f, "Timeout"),
            Phase::QuarterBreak => write!(f, "Quarter Break"),
            Phase::Halftime => write!(f, "Halftime"),
            Phase::OvertimeBreak => write!(f, "Overtime Break"),
            Phase::Finished => write!(f, "Finished"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    /// 1-based. Periods past `settings.quarters` are overtime.
    pub current_period: u8,
    pub is_overtime: bool,
    pub phase: Phase,
    /// Time left in the current phase
    pub remaining_secs: f64,
    pub timer_running: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_tick_at: Option<OffsetDateTime>,
}

impl ClockState {
    /// The clock of a freshly set up game, warming up before the first quarter
    pub fn warmup(settings: &GameSettings) -> Self {
        Self {
            current_period: 1,
            is_overtime: false,
            phase: Phase::Warmup,
            remaining_secs: settings.quarter_secs(),
            timer_running: false,
            last_tick_at: None,
        }
    }

    /// Whole seconds left, rounded up so that `0` is only shown once time has expired
    pub fn display_secs(&self) -> u32 {
        self.remaining_secs.max(0.0).ceil() as u32
    }

    /// Short name of the current period, such as `Q3` or `OT2`
    pub fn period_name(&self, settings: &GameSettings) -> String {
        if self.is_overtime {
            format!(
                "OT{}",
                self.current_period.saturating_sub(settings.quarters)
            )
        } else {
            format!("Q{}", self.current_period)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamGameInfo {
    pub name: String,
    pub players: Vec<Player>,
    pub on_court: Vec<PlayerId>,
    pub bench: Vec<PlayerId>,
    pub stats: BTreeMap<PlayerId, PlayerStats>,
    pub score: u32,
    pub fouls_this_quarter: u16,
    /// The opponent shoots bonus free throws on this team's fouls
    pub in_bonus: bool,
    pub timeouts_remaining: u8,
}

impl TeamGameInfo {
    /// Every player starts on the bench with a zeroed stat line
    pub fn new(name: String, players: Vec<Player>, timeouts: u8) -> Self {
        let bench = players.iter().map(|p| p.id).collect();
        let stats = players
            .iter()
            .map(|p| (p.id, PlayerStats::default()))
            .collect();
        Self {
            name,
            players,
            on_court: Vec::new(),
            bench,
            stats,
            score: 0,
            fouls_this_quarter: 0,
            in_bonus: false,
            timeouts_remaining: timeouts,
        }
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn stats_for(&self, id: PlayerId) -> Option<&PlayerStats> {
        self.stats.get(&id)
    }

    pub fn is_on_court(&self, id: PlayerId) -> bool {
        self.on_court.contains(&id)
    }

    pub fn is_on_bench(&self, id: PlayerId) -> bool {
        self.bench.contains(&id)
    }

    /// Team score counted from every player's made shots
    pub fn calculate_score(&self) -> u32 {
        self.stats.values().map(PlayerStats::points).sum()
    }

    pub fn is_fouled_out(&self, id: PlayerId, settings: &GameSettings) -> bool {
        settings.allow_foul_outs
            && self
                .stats
                .get(&id)
                .is_some_and(|s| s.personal_fouls >= settings.max_personal_fouls)
    }

    /// On-court and bench are disjoint and together hold exactly the player list
    pub fn partition_is_valid(&self) -> bool {
        let disjoint = self.on_court.iter().all(|id| !self.bench.contains(id));
        let no_dupes = |list: &[PlayerId]| {
            list.iter()
                .enumerate()
                .all(|(i, id)| !list[i + 1..].contains(id))
        };
        let covered = self
            .players
            .iter()
            .all(|p| self.on_court.contains(&p.id) || self.bench.contains(&p.id));
        let no_strangers = self
            .on_court
            .iter()
            .chain(self.bench.iter())
            .all(|id| self.has_player(*id));
        disjoint && covered && no_strangers && no_dupes(&self.on_court) && no_dupes(&self.bench)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinningTeam {
    Home,
    Away,
    Tie,
}

impl WinningTeam {
    pub fn from_scores(scores: HomeAwayBundle<u32>) -> Self {
        match scores.home.cmp(&scores.away) {
            core::cmp::Ordering::Greater => Self::Home,
            core::cmp::Ordering::Less => Self::Away,
            core::cmp::Ordering::Equal => Self::Tie,
        }
    }
}

impl core::fmt::Display for WinningTeam {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            Self::Home => write!(f, "Home"),
            Self::Away => write!(f, "Away"),
            Self::Tie => write!(f, "Tie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$type")]
pub enum GameEvent {
    #[serde(rename = "clockStarted")]
    ClockStarted { phase: Phase },
    #[serde(rename = "clockPaused")]
    ClockPaused { phase: Phase },
    #[serde(rename = "clockReset")]
    ClockReset,
    #[serde(rename = "periodAdvanced")]
    PeriodAdvanced,
    #[serde(rename = "periodRewound")]
    PeriodRewound,
    #[serde(rename = "breakStarted")]
    BreakStarted { phase: Phase },
    #[serde(rename = "statChanged")]
    StatChanged {
        team: TeamSide,
        player: PlayerId,
        stat: StatKey,
        direction: Direction,
        value: u16,
    },
    #[serde(rename = "fouledOut")]
    FouledOut { team: TeamSide, player: PlayerId },
    #[serde(rename = "substitution")]
    Substitution {
        team: TeamSide,
        #[serde(rename = "playerOut")]
        player_out: PlayerId,
        #[serde(rename = "playerIn")]
        player_in: PlayerId,
    },
    #[serde(rename = "playersAdded")]
    PlayersAdded {
        team: TeamSide,
        players: Vec<PlayerId>,
    },
    #[serde(rename = "timeoutCharged")]
    TimeoutCharged { team: TeamSide, remaining: u8 },
    #[serde(rename = "catchUp")]
    CatchUp {
        #[serde(rename = "elapsedSecs")]
        elapsed_secs: f64,
    },
    #[serde(rename = "gameEnded")]
    GameEnded { winner: WinningTeam },
}

/// One line of the chronological action log, stamped with where the clock stood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_on: OffsetDateTime,
    pub period: u8,
    pub is_overtime: bool,
    pub remaining_secs: f64,
    pub event: GameEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub settings: GameSettings,
    pub clock: ClockState,
    pub teams: HomeAwayBundle<TeamGameInfo>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub log: Vec<LogEntry>,
    pub winning_team: Option<WinningTeam>,
}

impl Game {
    pub fn is_finished(&self) -> bool {
        self.clock.phase == Phase::Finished
    }

    pub fn scores(&self) -> HomeAwayBundle<u32> {
        self.teams.map(|team| team.score)
    }

    pub fn team(&self, side: TeamSide) -> &TeamGameInfo {
        &self.teams[side]
    }

    pub fn log_event(&mut self, occurred_on: OffsetDateTime, event: GameEvent) {
        self.log.push(LogEntry {
            occurred_on,
            period: self.clock.current_period,
            is_overtime: self.clock.is_overtime,
            remaining_secs: self.clock.remaining_secs,
            event,
        });
    }
}
