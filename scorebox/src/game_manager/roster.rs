use super::{GameManagerError, Result};
use hoops_common::{
    game_snapshot::TeamGameInfo,
    player::{Player, PlayerId},
    side::TeamSide,
    stats::PlayerStats,
};

/// The on-court/bench split of one team
pub(crate) struct RosterPartition<'a> {
    side: TeamSide,
    team: &'a mut TeamGameInfo,
}

impl<'a> RosterPartition<'a> {
    pub(crate) fn new(side: TeamSide, team: &'a mut TeamGameInfo) -> Self {
        Self { side, team }
    }

    /// Swaps a player on court with one on the bench. The incoming player takes the
    /// outgoing player's place in the lineup.
    pub(crate) fn substitute(&mut self, player_out: PlayerId, player_in: PlayerId) -> Result<()> {
        let out_idx = self
            .team
            .on_court
            .iter()
            .position(|id| *id == player_out)
            .ok_or(GameManagerError::NotOnCourt(self.side, player_out))?;
        let in_idx = self
            .team
            .bench
            .iter()
            .position(|id| *id == player_in)
            .ok_or(GameManagerError::NotOnBench(self.side, player_in))?;

        self.team.on_court[out_idx] = player_in;
        self.team.bench[in_idx] = player_out;
        Ok(())
    }

    /// Adds players who are not yet on the team to the bench, returning the ids that were added
    pub(crate) fn add_players(&mut self, players: &[Player]) -> Vec<PlayerId> {
        let mut added = Vec::new();
        for player in players {
            if self.team.has_player(player.id) {
                continue;
            }
            self.team.players.push(player.clone());
            self.team.bench.push(player.id);
            self.team.stats.insert(player.id, PlayerStats::default());
            added.push(player.id);
        }
        added
    }

    /// Moves the starting lineup from the bench onto the court at game setup
    pub(crate) fn send_in_starters(&mut self, starters: &[PlayerId]) -> Result<()> {
        for (i, id) in starters.iter().enumerate() {
            if starters[..i].contains(id) {
                return Err(GameManagerError::DuplicateStarter(self.side, *id));
            }
            if !self.team.has_player(*id) {
                return Err(GameManagerError::UnknownPlayer(self.side, *id));
            }
        }
        self.team.bench.retain(|id| !starters.contains(id));
        self.team.on_court.extend_from_slice(starters);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::GameManagerError as GMErr;
    use super::*;

    fn player(id: u32) -> Player {
        Player {
            id: PlayerId(id),
            name: format!("Player {id}"),
            number: id as u8,
        }
    }

    fn team_with_starters() -> TeamGameInfo {
        let mut team = TeamGameInfo::new("Rockets".to_string(), (1..=8).map(player).collect(), 5);
        RosterPartition::new(TeamSide::Away, &mut team)
            .send_in_starters(&[PlayerId(1), PlayerId(2), PlayerId(3), PlayerId(4), PlayerId(5)])
            .unwrap();
        team
    }

    #[test]
    fn test_send_in_starters() {
        let team = team_with_starters();
        assert_eq!(team.on_court.len(), 5);
        assert_eq!(team.bench, vec![PlayerId(6), PlayerId(7), PlayerId(8)]);
        assert!(team.partition_is_valid());
    }

    #[test]
    fn test_bad_starters() {
        let mut team = TeamGameInfo::new("Rockets".to_string(), (1..=3).map(player).collect(), 5);
        let mut roster = RosterPartition::new(TeamSide::Away, &mut team);
        assert_eq!(
            roster.send_in_starters(&[PlayerId(1), PlayerId(1)]),
            Err(GMErr::DuplicateStarter(TeamSide::Away, PlayerId(1)))
        );
        assert_eq!(
            roster.send_in_starters(&[PlayerId(1), PlayerId(12)]),
            Err(GMErr::UnknownPlayer(TeamSide::Away, PlayerId(12)))
        );
        assert!(team.on_court.is_empty());
        assert!(team.partition_is_valid());
    }

    #[test]
    fn test_substitute() {
        let mut team = team_with_starters();
        RosterPartition::new(TeamSide::Away, &mut team)
            .substitute(PlayerId(3), PlayerId(7))
            .unwrap();
        assert_eq!(
            team.on_court,
            vec![PlayerId(1), PlayerId(2), PlayerId(7), PlayerId(4), PlayerId(5)]
        );
        assert_eq!(team.bench, vec![PlayerId(6), PlayerId(3), PlayerId(8)]);
        assert!(team.partition_is_valid());
    }

    #[test]
    fn test_substitute_rejections_leave_partition() {
        let mut team = team_with_starters();
        let before = team.clone();
        let mut roster = RosterPartition::new(TeamSide::Away, &mut team);

        // Player already on court can't come in
        assert_eq!(
            roster.substitute(PlayerId(1), PlayerId(2)),
            Err(GMErr::NotOnBench(TeamSide::Away, PlayerId(2)))
        );
        // Bench player can't go out
        assert_eq!(
            roster.substitute(PlayerId(6), PlayerId(7)),
            Err(GMErr::NotOnCourt(TeamSide::Away, PlayerId(6)))
        );
        assert_eq!(
            roster.substitute(PlayerId(40), PlayerId(7)),
            Err(GMErr::NotOnCourt(TeamSide::Away, PlayerId(40)))
        );
        assert_eq!(
            roster.substitute(PlayerId(1), PlayerId(40)),
            Err(GMErr::NotOnBench(TeamSide::Away, PlayerId(40)))
        );
        assert_eq!(team, before);
    }

    #[test]
    fn test_add_players_is_idempotent() {
        let mut team = team_with_starters();
        let mut roster = RosterPartition::new(TeamSide::Away, &mut team);
        let added = roster.add_players(&[player(9), player(2), player(9), player(10)]);
        assert_eq!(added, vec![PlayerId(9), PlayerId(10)]);
        let added = roster.add_players(&[player(9)]);
        assert!(added.is_empty());

        assert_eq!(team.players.len(), 10);
        assert_eq!(
            team.bench,
            vec![PlayerId(6), PlayerId(7), PlayerId(8), PlayerId(9), PlayerId(10)]
        );
        assert_eq!(team.stats[&PlayerId(10)], PlayerStats::default());
        assert_eq!(team.on_court.len(), 5);
        assert!(team.partition_is_valid());
    }
}
