use super::{GameManagerError, Result};
use hoops_common::{
    config::GameSettings,
    game_snapshot::TeamGameInfo,
    player::PlayerId,
    side::TeamSide,
    stats::{Direction, ShotKind, StatKey},
};
use std::cmp::{max, min};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatChange {
    pub(crate) value: u16,
    /// This change took the player to the personal foul limit
    pub(crate) fouled_out: bool,
}

/// Per-player counters of one team, kept consistent on every change
pub(crate) struct StatLedger<'a> {
    side: TeamSide,
    team: &'a mut TeamGameInfo,
    settings: &'a GameSettings,
}

impl<'a> StatLedger<'a> {
    pub(crate) fn new(side: TeamSide, team: &'a mut TeamGameInfo, settings: &'a GameSettings) -> Self {
        Self {
            side,
            team,
            settings,
        }
    }

    pub(crate) fn apply_delta(
        &mut self,
        player: PlayerId,
        key: StatKey,
        direction: Direction,
    ) -> Result<StatChange> {
        if !self.team.has_player(player) {
            return Err(GameManagerError::UnknownPlayer(self.side, player));
        }
        if direction == Direction::Increment
            && key != StatKey::PersonalFouls
            && self.team.is_fouled_out(player, self.settings)
        {
            return Err(GameManagerError::PlayerFouledOut(self.side, player));
        }

        let stats = self.team.stats.entry(player).or_default();
        let old = stats.get(key);
        let new = u16::try_from((i32::from(old) + direction.delta()).max(0)).unwrap_or(u16::MAX);
        *stats.get_mut(key) = new;

        match (key.shot_kind(), direction) {
            (Some(ShotKind::Made(cat)), Direction::Increment) => {
                let attempted = stats.get_mut(cat.attempted());
                *attempted = max(*attempted, new);
            }
            (Some(ShotKind::Attempted(cat)), Direction::Decrement) => {
                let made = stats.get_mut(cat.made());
                *made = min(*made, new);
            }
            _ => {}
        }

        let fouled_out = key == StatKey::PersonalFouls
            && self.settings.allow_foul_outs
            && new > old
            && new == self.settings.max_personal_fouls;

        if key == StatKey::PersonalFouls && new > old {
            self.team.fouls_this_quarter = self.team.fouls_this_quarter.saturating_add(new - old);
        }
        self.team.score = self.team.calculate_score();

        Ok(StatChange { value: new, fouled_out })
    }
}
