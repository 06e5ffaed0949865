use super::{
    Result,
    clock::{self, TickOutcome},
    phase::PhaseMachine,
    roster::RosterPartition,
    stat_ledger::StatLedger,
};
use hoops_common::{
    game_snapshot::{Game, GameEvent, WinningTeam},
    player::{Player, PlayerId},
    side::TeamSide,
    stats::{Direction, StatKey},
};
use log::*;
use time::OffsetDateTime;

/// Every way a game can be changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Bring the countdown up to date with the wall clock
    Tick,
    StartTimer,
    PauseTimer,
    ResetTimer,
    NextPeriod,
    PrevPeriod,
    StartBreak,
    ApplyStat {
        team: TeamSide,
        player: PlayerId,
        stat: StatKey,
        direction: Direction,
    },
    Substitute {
        team: TeamSide,
        player_out: PlayerId,
        player_in: PlayerId,
    },
    AddPlayers {
        team: TeamSide,
        players: Vec<Player>,
    },
    ChargeTimeout {
        team: TeamSide,
    },
    EndGame,
}

/// Informational results of an action, for the operator's attention
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    FouledOut { team: TeamSide, player: PlayerId },
    CaughtUp { elapsed_secs: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduced {
    pub game: Game,
    pub notices: Vec<Notice>,
}

/// Computes the snapshot that follows `game` once `action` is applied at `now`.
///
/// The countdown is always brought up to date first, so the action is stamped with
/// the correct clock. On `Err` the caller keeps `game` as it was.
pub fn reduce(game: &Game, action: &Action, now: OffsetDateTime) -> Result<Reduced> {
    if game.is_finished() {
        return Err(super::GameManagerError::GameFinished);
    }

    let mut next = game.clone();
    let mut notices = Vec::new();

    match clock::tick(&mut next.clock, now) {
        TickOutcome::CaughtUp(elapsed_secs) => {
            warn!("Caught up {elapsed_secs:.3}s of clock time after a gap in ticks");
            next.log_event(now, GameEvent::CatchUp { elapsed_secs });
            notices.push(Notice::CaughtUp { elapsed_secs });
        }
        TickOutcome::Idle | TickOutcome::Anchored | TickOutcome::Counted(_) => {}
    }

    let Game {
        ref settings,
        clock: ref mut clock_state,
        ref mut teams,
        ref mut started_at,
        ref mut ended_at,
        ..
    } = next;

    let event = match action {
        Action::Tick => None,
        Action::StartTimer => {
            PhaseMachine::new(clock_state, settings).start(now)?;
            if started_at.is_none() {
                *started_at = Some(now);
            }
            Some(GameEvent::ClockStarted {
                phase: clock_state.phase,
            })
        }
        Action::PauseTimer => {
            PhaseMachine::new(clock_state, settings).pause()?;
            Some(GameEvent::ClockPaused {
                phase: clock_state.phase,
            })
        }
        Action::ResetTimer => {
            PhaseMachine::new(clock_state, settings).reset()?;
            Some(GameEvent::ClockReset)
        }
        Action::NextPeriod => {
            PhaseMachine::new(clock_state, settings).advance_period()?;
            teams.iter_mut().for_each(|(_, t)| t.fouls_this_quarter = 0);
            Some(GameEvent::PeriodAdvanced)
        }
        Action::PrevPeriod => {
            PhaseMachine::new(clock_state, settings).rewind_period()?;
            teams.iter_mut().for_each(|(_, t)| t.fouls_this_quarter = 0);
            Some(GameEvent::PeriodRewound)
        }
        Action::StartBreak => {
            let phase = PhaseMachine::new(clock_state, settings).start_break()?;
            Some(GameEvent::BreakStarted { phase })
        }
        Action::ApplyStat {
            team,
            player,
            stat,
            direction,
        } => {
            let change = StatLedger::new(*team, &mut teams[*team], settings)
                .apply_delta(*player, *stat, *direction)?;
            if change.fouled_out {
                notices.push(Notice::FouledOut {
                    team: *team,
                    player: *player,
                });
            }
            Some(GameEvent::StatChanged {
                team: *team,
                player: *player,
                stat: *stat,
                direction: *direction,
                value: change.value,
            })
        }
        Action::Substitute {
            team,
            player_out,
            player_in,
        } => {
            RosterPartition::new(*team, &mut teams[*team]).substitute(*player_out, *player_in)?;
            Some(GameEvent::Substitution {
                team: *team,
                player_out: *player_out,
                player_in: *player_in,
            })
        }
        Action::AddPlayers { team, players } => {
            let added = RosterPartition::new(*team, &mut teams[*team]).add_players(players);
            if added.is_empty() {
                None
            } else {
                Some(GameEvent::PlayersAdded {
                    team: *team,
                    players: added,
                })
            }
        }
        Action::ChargeTimeout { team } => {
            let info = &mut teams[*team];
            info.timeouts_remaining = info
                .timeouts_remaining
                .checked_sub(1)
                .ok_or(super::GameManagerError::NoTimeoutsLeft(*team))?;
            Some(GameEvent::TimeoutCharged {
                team: *team,
                remaining: info.timeouts_remaining,
            })
        }
        Action::EndGame => {
            PhaseMachine::new(clock_state, settings).finish()?;
            *ended_at = Some(now);
            None
        }
    };

    refresh_derived(&mut next);

    if let Some(event) = event {
        next.log_event(now, event);
    }
    for notice in &notices {
        if let Notice::FouledOut { team, player } = notice {
            next.log_event(
                now,
                GameEvent::FouledOut {
                    team: *team,
                    player: *player,
                },
            );
        }
    }
    if let (Action::EndGame, Some(winner)) = (action, next.winning_team) {
        next.log_event(now, GameEvent::GameEnded { winner });
    }

    Ok(Reduced {
        game: next,
        notices,
    })
}

/// Recomputes the fields that are derived from the rest of the snapshot
fn refresh_derived(game: &mut Game) {
    let bonus_threshold = game.settings.fouls_for_bonus;
    for (_, team) in game.teams.iter_mut() {
        team.score = team.calculate_score();
        team.in_bonus = team.fouls_this_quarter >= bonus_threshold;
    }
    if game.is_finished() {
        game.winning_team = Some(WinningTeam::from_scores(game.scores()));
    }
}
