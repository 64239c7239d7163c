use log::debug;

use crate::transport::{Transport, TransportError};
use super::structs::{Telegram, EOT_CHAR, SOT_CHAR};

#[derive(Debug, Clone, Copy, PartialEq)]
enum FramerState {
    /// Discarding lines until a start marker shows up
    Hunting,
    Collecting,
}

/// Assembles telegrams from a stream of lines.
///
/// Lines before the first `/` are dropped. A `/` seen while collecting throws
/// away the partial telegram and starts over with the new line.
pub struct TelegramFramer {
    state: FramerState,
    telegram: Telegram,
}

impl Default for TelegramFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelegramFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::Hunting,
            telegram: Telegram::default(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.telegram.lines.clear();
        self.telegram.crc_input.clear();
    }

    pub fn append_line(&mut self, line: &str) {
        self.telegram.lines.push(line.trim().to_string());
        if !line.starts_with(EOT_CHAR) {
            self.telegram.crc_input.push_str(line);
        }
    }

    /// Feeds one line, returns the telegram once its end marker was appended
    pub fn push_line(&mut self, line: &str) -> Option<Telegram> {
        if line.starts_with(SOT_CHAR) {
            if self.state == FramerState::Collecting {
                debug!("Start of telegram while collecting, dropping {} lines", self.telegram.lines.len());
            } else {
                debug!("Start of new telegram detected");
            }
            self.begin_frame();
            self.append_line(line);
            self.state = FramerState::Collecting;
            return None;
        }

        if self.state == FramerState::Hunting {
            return None;
        }

        self.append_line(line);
        if line.starts_with(EOT_CHAR) {
            debug!("End of telegram found after {} lines", self.telegram.lines.len());
            self.state = FramerState::Hunting;
            return Some(std::mem::take(&mut self.telegram));
        }

        None
    }

    /// Reads lines until one complete telegram was framed. A missing end
    /// marker ends in whatever error the transport reports (timeout, EOF).
    pub async fn read_telegram<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Result<Telegram, TransportError> {
        self.state = FramerState::Hunting;
        self.begin_frame();

        loop {
            let line = transport.read_line().await?;
            if let Some(telegram) = self.push_line(&line) {
                return Ok(telegram);
            }
        }
    }
}
