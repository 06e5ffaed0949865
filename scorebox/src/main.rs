use clap::Parser;
use hoops_common::{bundles::HomeAwayBundle, player::Player};
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::{
    error::Error,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use time::OffsetDateTime;
use tokio::{
    io::{AsyncBufReadExt, BufReader, stdin},
    sync::mpsc::unbounded_channel,
};

mod config;
use config::Config;

mod console;
use console::{Command, HELP, render_box_score, render_notice, render_status};

mod game_manager;
use game_manager::{Action, GameManager, TeamSetup};

mod persistence;
use persistence::{GameStore, JsonFileStore};

mod ticker;
use ticker::{Ticker, system_clock};

const APP_NAME: &str = "scorebox";

type AppResult<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long, default_value = "Home")]
    /// Home team, looked up by name in the team registry
    home: String,

    #[clap(long, default_value = "Away")]
    /// Away team, looked up by name in the team registry
    away: String,

    #[clap(long, short)]
    /// Set up a new game even if an unfinished one was saved
    new_game: bool,

    #[clap(long)]
    /// Directory holding the game, roster and team files, overrides the config file
    data_dir: Option<PathBuf>,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn init_logging(args: &Cli) -> AppResult<()> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match &args.log_location {
        Some(path) => path.clone(),
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("scorebox-logs");
            path
        }
    };
    let log_path = log_base_path.join(format!("{APP_NAME}-log.txt"));
    let archived_log_path = log_base_path.join(format!("{APP_NAME}-log-{{}}.txt.gz"));

    // Only log to the console in debug mode, stdout belongs to the operator
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("The log location is not valid unicode")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(&log_path, Box::new(file_policy))?;

    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();

    info!("Logging to {}", log_path.display());
    Ok(())
}

fn load_config() -> AppResult<Config> {
    info!(
        "Reading config file from {:?}",
        confy::get_configuration_file_path(APP_NAME, None)?
    );

    Ok(match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            confy::store(APP_NAME, None, &config)?;
            config
        }
    })
}

fn set_up_game(
    args: &Cli,
    config: &Config,
    store: &impl GameStore,
    now: OffsetDateTime,
) -> AppResult<GameManager> {
    let roster = store.load_roster()?;
    let teams = store.load_teams()?;

    let setup = |name: &str| match teams.iter().find(|t| t.name.eq_ignore_ascii_case(name)) {
        Some(team) => TeamSetup::from_registry(team, &roster, None),
        None => {
            warn!("{name} is not in the team registry, starting with an empty roster");
            TeamSetup {
                name: name.to_string(),
                players: Vec::new(),
                starters: Vec::new(),
            }
        }
    };

    Ok(GameManager::new_game(
        config.game.clone(),
        HomeAwayBundle::new(setup(&args.home), setup(&args.away)),
        now,
    )?)
}

fn lock(gm: &Mutex<GameManager>) -> AppResult<MutexGuard<'_, GameManager>> {
    gm.lock().map_err(|_| "The game manager lock was poisoned".into())
}

/// Carries out one operator command, saving the game after every accepted action
fn handle_command(
    command: Command,
    gm: &Mutex<GameManager>,
    store: &impl GameStore,
    roster: &[Player],
) -> AppResult<()> {
    let mut gm = lock(gm)?;

    let action = match command {
        Command::Apply(action) => action,
        Command::AddPlayers { team, players } => {
            let mut found = Vec::with_capacity(players.len());
            for id in players {
                match roster.iter().find(|p| p.id == id) {
                    Some(player) => found.push(player.clone()),
                    None => {
                        println!("Player {id} is not in the roster registry");
                        return Ok(());
                    }
                }
            }
            Action::AddPlayers {
                team,
                players: found,
            }
        }
        Command::Status => {
            println!("{}", render_status(gm.game()));
            return Ok(());
        }
        Command::BoxScore(side) => {
            for (s, team) in gm.game().teams.iter() {
                if side.is_none_or(|side| side == s) {
                    println!("{}\n", render_box_score(team, gm.settings()));
                }
            }
            return Ok(());
        }
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        }
        Command::Quit => return Ok(()),
    };

    match gm.apply(action, OffsetDateTime::now_utc()) {
        Ok(applied) => {
            for notice in &applied.notices {
                println!("{}", render_notice(applied.game, notice));
            }
            println!("{}", render_status(applied.game));
            if let Err(e) = store.save(applied.game) {
                error!("Failed to save the game: {e}");
                println!("Could not save the game: {e}");
            }
        }
        Err(e) => println!("Rejected: {e}"),
    }
    Ok(())
}

async fn run_console(gm: GameManager, store: &JsonFileStore, cadence: Duration) -> AppResult<()> {
    let roster = store.load_roster()?;
    let gm = Arc::new(Mutex::new(gm));

    let (notice_tx, mut notice_rx) = unbounded_channel();
    let mut ticker = Ticker::new();
    ticker.start(gm.clone(), cadence, system_clock(), notice_tx);

    println!("{}", render_status(lock(&gm)?.game()));
    println!("Type `help` to list the commands");

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        tokio::select! {
            Some(notice) = notice_rx.recv() => {
                let gm = lock(&gm)?;
                println!("{}", render_notice(gm.game(), &notice));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle_command(command, &gm, store, &roster)?,
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    if !ticker.is_active() {
        warn!("The ticker stopped before the console did");
    }
    ticker.stop();
    let gm = lock(&gm)?;
    store.save(gm.game())?;
    info!("Saved the game to {}", store.dir().display());
    Ok(())
}

fn main() -> AppResult<()> {
    let args = Cli::parse();
    init_logging(&args)?;
    info!("Starting Scorebox");

    let config = load_config()?;
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .or_else(JsonFileStore::default_dir)
        .ok_or("Could not find a directory to store game data")?;
    let store = JsonFileStore::open(data_dir)?;
    if store.load_teams()?.is_empty() {
        info!("Creating empty team and roster registries");
        store.save_teams(&[])?;
        store.save_roster(&store.load_roster()?)?;
    }

    let now = OffsetDateTime::now_utc();
    let gm = match store.load()? {
        Some(game) if !args.new_game && !game.is_finished() => {
            info!("Resuming the saved game");
            GameManager::resume(game, now)
        }
        Some(_) | None => set_up_game(&args, &config, &store, now)?,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_console(gm, &store, config.ticker.cadence()))
}
