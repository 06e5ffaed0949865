pub mod bundles;

pub mod config;

pub mod game_snapshot;

pub mod player;

pub mod side;

pub mod stats;

