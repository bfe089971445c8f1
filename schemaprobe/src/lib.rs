#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod kafka;
pub mod logger;
pub mod runner;
pub mod serdes;
pub mod shutdown;

pub const BANNER: &str = r"
           _                                         _
  ___  ___| |__   ___ _ __ ___   __ _ _ __  _ __ ___ | |__   ___
 / __|/ __| '_ \ / _ \ '_ ` _ \ / _` | '_ \| '__/ _ \| '_ \ / _ \
 \__ \ (__| | | |  __/ | | | | | (_| | |_) | | | (_) | |_) |  __/
 |___/\___|_| |_|\___|_| |_| |_|\__,_| .__/|_|  \___/|_.__/ \___|
                                     |_|
";
