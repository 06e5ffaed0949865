use crate::game_manager::{Action, Notice};
use hoops_common::{
    config::GameSettings,
    game_snapshot::{Game, TeamGameInfo},
    player::PlayerId,
    side::{TeamSide, UnknownSide},
    stats::{Direction, StatKey, UnknownStatKey},
};
use std::{fmt::Write, str::FromStr};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  start | pause | reset          control the clock
  next | prev                    move to the next or previous period
  break                          end the period and start the break that follows
  stat <home|away> <id> <stat> [+|-]
                                 record or correct a stat, e.g. `stat home 7 2PM +`
  sub <home|away> <out> <in>     substitute a player on court for one on the bench
  add <home|away> <id>...        add registered players to a team's bench
  timeout <home|away>            charge a timeout
  status                         show the score and clock
  box [home|away]                show the box score
  end                            end the game
  quit                           save and exit";

/// One line of operator input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Apply(Action),
    /// Players are looked up in the roster registry before being added
    AddPlayers {
        team: TeamSide,
        players: Vec<PlayerId>,
    },
    Status,
    BoxScore(Option<TeamSide>),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let mut args = Args(words);

        let command = match verb.as_str() {
            "start" => Command::Apply(Action::StartTimer),
            "pause" | "stop" => Command::Apply(Action::PauseTimer),
            "reset" => Command::Apply(Action::ResetTimer),
            "next" => Command::Apply(Action::NextPeriod),
            "prev" => Command::Apply(Action::PrevPeriod),
            "break" => Command::Apply(Action::StartBreak),
            "end" => Command::Apply(Action::EndGame),
            "stat" => {
                let team = args.side()?;
                let player = args.player("player")?;
                let stat = args.next("stat")?.parse()?;
                let direction = match args.0.next() {
                    None | Some("+") => Direction::Increment,
                    Some("-") => Direction::Decrement,
                    Some(other) => return Err(CommandError::BadDirection(other.to_string())),
                };
                Command::Apply(Action::ApplyStat {
                    team,
                    player,
                    stat,
                    direction,
                })
            }
            "sub" => Command::Apply(Action::Substitute {
                team: args.side()?,
                player_out: args.player("outgoing player")?,
                player_in: args.player("incoming player")?,
            }),
            "add" => {
                let team = args.side()?;
                let mut players = vec![args.player("player")?];
                while args.has_more() {
                    players.push(args.player("player")?);
                }
                return Ok(Command::AddPlayers { team, players });
            }
            "timeout" => Command::Apply(Action::ChargeTimeout { team: args.side()? }),
            "status" => Command::Status,
            "box" => {
                let side = match args.0.next() {
                    Some(s) => Some(s.parse()?),
                    None => None,
                };
                Command::BoxScore(side)
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CommandError::UnknownCommand(verb)),
        };

        if args.has_more() {
            return Err(CommandError::TooManyArguments);
        }
        Ok(command)
    }
}

struct Args<'a>(std::str::SplitWhitespace<'a>);

impl<'a> Args<'a> {
    fn next(&mut self, what: &'static str) -> Result<&'a str, CommandError> {
        self.0.next().ok_or(CommandError::MissingArgument(what))
    }

    fn side(&mut self) -> Result<TeamSide, CommandError> {
        Ok(self.next("team")?.parse()?)
    }

    fn player(&mut self, what: &'static str) -> Result<PlayerId, CommandError> {
        let word = self.next(what)?;
        word.parse()
            .map_err(|_| CommandError::BadPlayer(word.to_string()))
    }

    fn has_more(&self) -> bool {
        self.0.clone().next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Type a command, or `help` to list them")]
    Empty,
    #[error("Unknown command `{0}`, type `help` to list the commands")]
    UnknownCommand(String),
    #[error("Missing the {0}")]
    MissingArgument(&'static str),
    #[error("Too many arguments")]
    TooManyArguments,
    #[error(transparent)]
    BadSide(#[from] UnknownSide),
    #[error(transparent)]
    BadStat(#[from] UnknownStatKey),
    #[error("`{0}` is not a player id")]
    BadPlayer(String),
    #[error("`{0}` is not a direction, expected `+` or `-`")]
    BadDirection(String),
}

fn clock_text(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// The scoreboard view of a game
pub fn render_status(game: &Game) -> String {
    let clock = &game.clock;
    let mut out = format!(
        "{} {} - {} {}\n{} {} {}{}",
        game.teams.home.name,
        game.teams.home.score,
        game.teams.away.score,
        game.teams.away.name,
        clock.period_name(&game.settings),
        clock_text(clock.display_secs()),
        clock.phase,
        if clock.timer_running { " (running)" } else { "" },
    );
    for (side, team) in game.teams.iter() {
        let _ = write!(
            out,
            "\n{side}: fouls {}{}, timeouts left {}",
            team.fouls_this_quarter,
            if team.in_bonus { " (bonus)" } else { "" },
            team.timeouts_remaining,
        );
    }
    if let Some(winner) = game.winning_team {
        let _ = write!(out, "\nFinal: {winner}");
    }
    out
}

/// One line per player with the headline counters, starting with those on court
pub fn render_box_score(team: &TeamGameInfo, settings: &GameSettings) -> String {
    let mut out = format!(
        "{}\n    {:<24} {:>3} {:>5} {:>5} {:>5} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}",
        team.name, "PLAYER", "PTS", "FT", "2P", "3P", "REB", "AST", "STL", "BLK", "TOV", "PF"
    );
    for id in team.on_court.iter().chain(team.bench.iter()) {
        let Some(player) = team.player(*id) else {
            continue;
        };
        let s = team.stats_for(*id).copied().unwrap_or_default();
        let marker = if team.is_on_court(*id) { '*' } else { ' ' };
        let _ = write!(
            out,
            "\n{marker} {:>2} {:<21} {:>3} {:>5} {:>5} {:>5} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3}{}",
            player.number,
            format!("{} ({})", player.name, player.id),
            s.points(),
            format!("{}/{}", s.free_throws_made, s.free_throws_attempted),
            format!("{}/{}", s.two_pointers_made, s.two_pointers_attempted),
            format!("{}/{}", s.three_pointers_made, s.three_pointers_attempted),
            s.total_rebounds(),
            s.assists,
            s.steals,
            s.blocks,
            s.turnovers,
            s.personal_fouls,
            if team.is_fouled_out(*id, settings) {
                " FOULED OUT"
            } else {
                ""
            },
        );
    }
    let _ = write!(out, "\nTotal: {}", team.score);
    out
}

pub fn render_notice(game: &Game, notice: &Notice) -> String {
    match notice {
        Notice::FouledOut { team, player } => {
            let info = game.team(*team);
            match info.player(*player) {
                Some(p) => format!("{} {p} has fouled out", info.name),
                None => format!("{} player {player} has fouled out", info.name),
            }
        }
        Notice::CaughtUp { elapsed_secs } => {
            format!("Clock caught up by {elapsed_secs:.1}s after a delay")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game_manager::{GameManager, TeamSetup};
    use hoops_common::{bundles::HomeAwayBundle, player::Player};
    use indoc::indoc;
    use time::macros::datetime;

    #[test]
    fn test_parse_clock_commands() {
        assert_eq!("start".parse(), Ok(Command::Apply(Action::StartTimer)));
        assert_eq!(" PAUSE ".parse(), Ok(Command::Apply(Action::PauseTimer)));
        assert_eq!("next".parse(), Ok(Command::Apply(Action::NextPeriod)));
        assert_eq!("prev".parse(), Ok(Command::Apply(Action::PrevPeriod)));
        assert_eq!("break".parse(), Ok(Command::Apply(Action::StartBreak)));
        assert_eq!("end".parse(), Ok(Command::Apply(Action::EndGame)));
        assert_eq!("quit".parse(), Ok(Command::Quit));
        assert_eq!(
            "reset now".parse::<Command>(),
            Err(CommandError::TooManyArguments)
        );
    }

    #[test]
    fn test_parse_stat() {
        assert_eq!(
            "stat home 7 2PM +".parse(),
            Ok(Command::Apply(Action::ApplyStat {
                team: TeamSide::Home,
                player: PlayerId(7),
                stat: StatKey::TwoPointersMade,
                direction: Direction::Increment,
            }))
        );
        assert_eq!(
            "stat a #12 pf -".parse(),
            Ok(Command::Apply(Action::ApplyStat {
                team: TeamSide::Away,
                player: PlayerId(12),
                stat: StatKey::PersonalFouls,
                direction: Direction::Decrement,
            }))
        );
        assert_eq!(
            "stat away 3 dreb".parse(),
            Ok(Command::Apply(Action::ApplyStat {
                team: TeamSide::Away,
                player: PlayerId(3),
                stat: StatKey::DefensiveRebounds,
                direction: Direction::Increment,
            }))
        );
        assert_eq!(
            "stat home 7 4PM".parse::<Command>(),
            Err(CommandError::BadStat(UnknownStatKey("4PM".to_string())))
        );
        assert_eq!(
            "stat home 7 AST x".parse::<Command>(),
            Err(CommandError::BadDirection("x".to_string()))
        );
        assert_eq!(
            "stat home seven AST".parse::<Command>(),
            Err(CommandError::BadPlayer("seven".to_string()))
        );
        assert_eq!(
            "stat guests 7 AST".parse::<Command>(),
            Err(CommandError::BadSide(UnknownSide("guests".to_string())))
        );
        assert_eq!(
            "stat home 7".parse::<Command>(),
            Err(CommandError::MissingArgument("stat"))
        );
    }

    #[test]
    fn test_parse_roster_commands() {
        assert_eq!(
            "sub away 4 11".parse(),
            Ok(Command::Apply(Action::Substitute {
                team: TeamSide::Away,
                player_out: PlayerId(4),
                player_in: PlayerId(11),
            }))
        );
        assert_eq!(
            "add home 23 24".parse(),
            Ok(Command::AddPlayers {
                team: TeamSide::Home,
                players: vec![PlayerId(23), PlayerId(24)],
            })
        );
        assert_eq!(
            "add home".parse::<Command>(),
            Err(CommandError::MissingArgument("player"))
        );
        assert_eq!(
            "timeout h".parse(),
            Ok(Command::Apply(Action::ChargeTimeout {
                team: TeamSide::Home
            }))
        );
        assert_eq!("box".parse(), Ok(Command::BoxScore(None)));
        assert_eq!(
            "box away".parse(),
            Ok(Command::BoxScore(Some(TeamSide::Away)))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dunk".parse::<Command>(),
            Err(CommandError::UnknownCommand("dunk".to_string()))
        );
        assert_eq!(
            CommandError::MissingArgument("team").to_string(),
            "Missing the team"
        );
    }

    fn game() -> GameManager {
        let setup = |name: &str, first: u32| {
            let players: Vec<Player> = (first..first + 2)
                .map(|id| Player {
                    id: PlayerId(id),
                    name: format!("P{id}"),
                    number: id as u8 + 10,
                })
                .collect();
            TeamSetup {
                name: name.to_string(),
                starters: vec![players[0].id],
                players,
            }
        };
        GameManager::new_game(
            GameSettings::default(),
            HomeAwayBundle::new(setup("Hawks", 1), setup("Owls", 3)),
            datetime!(2026-01-10 12:00:00 UTC),
        )
        .unwrap()
    }

    #[test]
    fn test_render_status() {
        let gm = game();
        assert_eq!(
            render_status(gm.game()),
            indoc!(
                "Hawks 0 - 0 Owls
                Q1 10:00 Warmup
                Home: fouls 0, timeouts left 5
                Away: fouls 0, timeouts left 5"
            )
        );
    }

    #[test]
    fn test_render_box_score() {
        let mut gm = game();
        let now = datetime!(2026-01-10 12:00:00 UTC);
        gm.apply_stat(
            TeamSide::Home,
            PlayerId(2),
            StatKey::ThreePointersMade,
            Direction::Increment,
            now,
        )
        .unwrap();
        let game = gm.game();
        let rendered = render_box_score(&game.teams.home, &game.settings);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Hawks");
        assert!(lines[2].starts_with("* 11 P1 (1)"));
        assert!(lines[3].starts_with("  12 P2 (2)"));
        assert!(lines[3].contains("  3   0/0   0/0   1/1"));
        assert_eq!(lines[4], "Total: 3");
    }

    #[test]
    fn test_render_notice() {
        let gm = game();
        assert_eq!(
            render_notice(
                gm.game(),
                &Notice::FouledOut {
                    team: TeamSide::Away,
                    player: PlayerId(4)
                }
            ),
            "Owls #14 P4 has fouled out"
        );
        assert_eq!(
            render_notice(gm.game(), &Notice::CaughtUp { elapsed_secs: 4.5 }),
            "Clock caught up by 4.5s after a delay"
        );
    }
}
