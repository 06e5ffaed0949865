use crate::game_manager::{GameManager, GameManagerError, Notice};
use log::*;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use time::OffsetDateTime;
use tokio::{
    sync::{mpsc::UnboundedSender, watch},
    task::{self, JoinHandle},
    time::{MissedTickBehavior, interval},
};

/// Source of the wall-clock time handed to the game manager on every tick
pub type WallClock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

pub fn system_clock() -> WallClock {
    Arc::new(OffsetDateTime::now_utc)
}

/// Drives the countdown of a running game at a fixed cadence.
///
/// The spawned task sleeps on the manager's clock-running channel while the clock is
/// stopped. Restarting or dropping the ticker aborts the task.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(
        &mut self,
        gm: Arc<Mutex<GameManager>>,
        cadence: Duration,
        wall_clock: WallClock,
        notice_tx: UnboundedSender<Notice>,
    ) {
        self.stop();

        let running_rx = gm
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_start_stop_rx();

        debug!("Ticker started with a cadence of {cadence:?}");
        self.handle = Some(task::spawn(run(
            gm, running_rx, cadence, wall_clock, notice_tx,
        )));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("Stopping the ticker");
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    gm: Arc<Mutex<GameManager>>,
    mut running_rx: watch::Receiver<bool>,
    cadence: Duration,
    wall_clock: WallClock,
    notice_tx: UnboundedSender<Notice>,
) {
    let mut ticks = interval(cadence);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut clock_running = *running_rx.borrow_and_update();

    loop {
        if clock_running {
            tokio::select! {
                biased;
                changed = running_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    clock_running = *running_rx.borrow_and_update();
                    debug!("Received clock running message: {clock_running}");
                }
                _ = ticks.tick() => {
                    if !tick_once(&gm, &wall_clock, &notice_tx) {
                        break;
                    }
                }
            }
        } else {
            debug!("Awaiting a new clock running message");
            if running_rx.changed().await.is_err() {
                break;
            }
            clock_running = *running_rx.borrow_and_update();
            debug!("Received clock running message: {clock_running}");
            if clock_running {
                ticks.reset_immediately();
            }
        }
    }

    debug!("Ticker ended");
}

/// Returns `false` once ticking can no longer make progress
fn tick_once(
    gm: &Mutex<GameManager>,
    wall_clock: &WallClock,
    notice_tx: &UnboundedSender<Notice>,
) -> bool {
    let mut gm = match gm.lock() {
        Ok(gm) => gm,
        Err(e) => {
            error!("Game manager is unusable: {e}");
            return false;
        }
    };

    match gm.tick(wall_clock()) {
        Ok(applied) => {
            for notice in applied.notices {
                if notice_tx.send(notice).is_err() {
                    trace!("No one is listening for notices");
                }
            }
            true
        }
        Err(GameManagerError::GameFinished) => {
            debug!("Game is over, ticker has nothing left to do");
            false
        }
        Err(e) => {
            warn!("Tick failed: {e}");
            true
        }
    }
}
