use std::{fmt, rc::Rc, time::Duration};
use twitzy_tweet::Zone;

use crate::clipboard::{Clipboard, MemoryClipboard};

pub const COPIED_RESET: Duration = Duration::from_secs(5);

pub struct Config {
    /// Zone `tweet::TimeStamp` formats in.
    pub time_zone: Zone,
    pub clipboard: Rc<dyn Clipboard>,
    /// How long `tweet::CopyLink` reports `copied` after a click.
    pub copied_reset: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_zone: Zone::Local,
            clipboard: Rc::new(MemoryClipboard::new()),
            copied_reset: COPIED_RESET,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("time_zone", &self.time_zone)
            .field("copied_reset", &self.copied_reset)
            .finish()
    }
}
