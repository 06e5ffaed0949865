use hoops_common::{
    bundles::HomeAwayBundle,
    config::{GameSettings, SettingsError},
    game_snapshot::{ClockState, Game, Phase, TeamGameInfo},
    player::{Player, PlayerId, Team},
    side::TeamSide,
    stats::{Direction, StatKey},
};
use log::*;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;

mod action;
pub use action::*;

mod clock;

mod phase;
use phase::PhaseMachine;

mod roster;
use roster::RosterPartition;

mod stat_ledger;

/// How many players start on court when no lineup is given
pub const DEFAULT_LINEUP_SIZE: usize = 5;

/// Everything needed to put one team on the floor at game setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSetup {
    pub name: String,
    pub players: Vec<Player>,
    pub starters: Vec<PlayerId>,
}

impl TeamSetup {
    /// Builds a team's game roster from the registry. The first players on the team
    /// list start unless `starters` is given.
    pub fn from_registry(team: &Team, roster: &[Player], starters: Option<Vec<PlayerId>>) -> Self {
        let players: Vec<Player> = team
            .players
            .iter()
            .filter_map(|id| roster.iter().find(|p| p.id == *id))
            .cloned()
            .collect();
        let starters = starters.unwrap_or_else(|| {
            players
                .iter()
                .take(DEFAULT_LINEUP_SIZE)
                .map(|p| p.id)
                .collect()
        });
        Self {
            name: team.name.clone(),
            players,
            starters,
        }
    }
}

/// The result of an accepted action
#[derive(Debug)]
pub struct Applied<'a> {
    pub game: &'a Game,
    pub notices: Vec<Notice>,
}

/// Owns the snapshot of one live game and publishes a new one for every accepted action
#[derive(Debug)]
pub struct GameManager {
    game: Game,
    start_stop_tx: watch::Sender<bool>,
    start_stop_rx: watch::Receiver<bool>,
}

impl GameManager {
    pub fn new_game(
        settings: GameSettings,
        teams: HomeAwayBundle<TeamSetup>,
        now: OffsetDateTime,
    ) -> Result<Self> {
        settings.validate()?;

        let mut infos: HomeAwayBundle<TeamGameInfo> = Default::default();
        for (side, setup) in teams {
            let mut info = TeamGameInfo::new(
                setup.name,
                Vec::new(),
                settings.timeouts_per_game,
            );
            let mut roster = RosterPartition::new(side, &mut info);
            roster.add_players(&setup.players);
            roster.send_in_starters(&setup.starters)?;
            infos[side] = info;
        }

        let game = Game {
            clock: ClockState::warmup(&settings),
            settings,
            teams: infos,
            started_at: None,
            ended_at: None,
            log: Vec::new(),
            winning_team: None,
        };
        info!(
            "Set up {} (home) vs {} (away) at {now}",
            game.teams.home.name, game.teams.away.name
        );
        Ok(Self::from_game(game))
    }

    /// Takes over a previously saved game, catching the clock up with any time that
    /// passed while it was not being ticked
    pub fn resume(game: Game, now: OffsetDateTime) -> Self {
        let mut manager = Self::from_game(game);
        if manager.clock_is_running() {
            info!("{} Resuming a running clock", manager.status_string());
            if let Err(e) = manager.apply(Action::Tick, now) {
                warn!("Could not reconcile the resumed clock: {e}");
            }
        }
        manager
    }

    fn from_game(game: Game) -> Self {
        let (start_stop_tx, start_stop_rx) = watch::channel(game.clock.timer_running);
        Self {
            game,
            start_stop_tx,
            start_stop_rx,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &GameSettings {
        &self.game.settings
    }

    pub fn clock_is_running(&self) -> bool {
        self.game.clock.timer_running
    }

    pub fn get_start_stop_rx(&self) -> watch::Receiver<bool> {
        self.start_stop_rx.clone()
    }

    fn send_clock_running(&self, running: bool) {
        self.start_stop_tx.send_replace(running);
    }

    /// Applies one action. On rejection the current snapshot is left untouched and
    /// the error describes why.
    pub fn apply(&mut self, action: Action, now: OffsetDateTime) -> Result<Applied<'_>> {
        let was_running = self.clock_is_running();
        let reduced = match reduce(&self.game, &action, now) {
            Ok(reduced) => reduced,
            Err(e) => {
                if action != Action::Tick {
                    warn!("{} Rejected {action:?}: {e}", self.status_string());
                }
                return Err(e);
            }
        };

        self.game = reduced.game;
        if action == Action::Tick {
            trace!("{} Tick", self.status_string());
        } else {
            info!("{} Applied {action:?}", self.status_string());
        }
        for notice in &reduced.notices {
            match notice {
                Notice::FouledOut { team, player } => {
                    info!("{} {team} player {player} has fouled out", self.status_string())
                }
                Notice::CaughtUp { elapsed_secs } => info!(
                    "{} Clock caught up by {elapsed_secs:.3}s",
                    self.status_string()
                ),
            }
        }

        let running = self.clock_is_running();
        if running != was_running {
            self.send_clock_running(running);
        }
        if let Some(winner) = self.game.winning_team {
            if action == Action::EndGame {
                info!(
                    "{} Game over, final score {}, result: {winner}",
                    self.status_string(),
                    self.game.scores()
                );
            }
        }

        Ok(Applied {
            game: &self.game,
            notices: reduced.notices,
        })
    }

    pub fn tick(&mut self, now: OffsetDateTime) -> Result<Applied<'_>> {
        self.apply(Action::Tick, now)
    }

    pub fn start_timer(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::StartTimer, now).map(|a| a.game)
    }

    pub fn pause_timer(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::PauseTimer, now).map(|a| a.game)
    }

    pub fn reset_timer(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::ResetTimer, now).map(|a| a.game)
    }

    pub fn go_to_next_period(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::NextPeriod, now).map(|a| a.game)
    }

    pub fn go_to_prev_period(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::PrevPeriod, now).map(|a| a.game)
    }

    pub fn start_break(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::StartBreak, now).map(|a| a.game)
    }

    pub fn apply_stat(
        &mut self,
        team: TeamSide,
        player: PlayerId,
        stat: StatKey,
        direction: Direction,
        now: OffsetDateTime,
    ) -> Result<Applied<'_>> {
        self.apply(
            Action::ApplyStat {
                team,
                player,
                stat,
                direction,
            },
            now,
        )
    }

    pub fn substitute(
        &mut self,
        team: TeamSide,
        player_out: PlayerId,
        player_in: PlayerId,
        now: OffsetDateTime,
    ) -> Result<&Game> {
        self.apply(
            Action::Substitute {
                team,
                player_out,
                player_in,
            },
            now,
        )
        .map(|a| a.game)
    }

    pub fn add_players_to_team(
        &mut self,
        team: TeamSide,
        players: Vec<Player>,
        now: OffsetDateTime,
    ) -> Result<&Game> {
        self.apply(Action::AddPlayers { team, players }, now)
            .map(|a| a.game)
    }

    pub fn charge_timeout(&mut self, team: TeamSide, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::ChargeTimeout { team }, now)
            .map(|a| a.game)
    }

    pub fn end_game(&mut self, now: OffsetDateTime) -> Result<&Game> {
        self.apply(Action::EndGame, now).map(|a| a.game)
    }

    fn status_string(&self) -> String {
        let clock = &self.game.clock;
        let time = clock.remaining_secs.max(0.0);
        let phase = match clock.phase {
            Phase::NotStarted => "NOTSTRT",
            Phase::Warmup => "WARMUP ",
            Phase::InProgress => "INPLAY ",
            Phase::Timeout => "TIMEOUT",
            Phase::QuarterBreak => "QTRBRK ",
            Phase::Halftime => "HLFTIME",
            Phase::OvertimeBreak => "OTBREAK",
            Phase::Finished => "FINISHD",
        };
        format!(
            "[{:02.0}:{:06.3} {:>3} {phase}]",
            (time / 60.0).floor(),
            time % 60.0,
            clock.period_name(&self.game.settings),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameManagerError {
    #[error("The game is over, it can no longer be changed")]
    GameFinished,
    #[error("Can't {0} while the clock is running")]
    ClockIsRunning(&'static str),
    #[error("The clock is already running")]
    ClockAlreadyRunning,
    #[error("The clock is not running")]
    ClockNotRunning,
    #[error("Already at the first period")]
    AtFirstPeriod,
    #[error("No more periods can be added")]
    PeriodLimit,
    #[error("Can't {0} during {1}")]
    WrongPhase(&'static str, Phase),
    #[error("The {0} team has no player {1}")]
    UnknownPlayer(TeamSide, PlayerId),
    #[error("The {0} team's player {1} has fouled out")]
    PlayerFouledOut(TeamSide, PlayerId),
    #[error("The {0} team's player {1} is not on the court")]
    NotOnCourt(TeamSide, PlayerId),
    #[error("The {0} team's player {1} is not on the bench")]
    NotOnBench(TeamSide, PlayerId),
    #[error("The {0} team's player {1} is listed as a starter more than once")]
    DuplicateStarter(TeamSide, PlayerId),
    #[error("The {0} team has no more timeouts to use")]
    NoTimeoutsLeft(TeamSide),
    #[error("Invalid game settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

pub type Result<T> = std::result::Result<T, GameManagerError>;
