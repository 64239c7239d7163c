//! Scripted transport for tests
//!
//! Every successful `open` hands out the next script of lines; once a script
//! is exhausted `read_line` reports end of stream.

use std::collections::VecDeque;
use async_trait::async_trait;

use super::{Transport, TransportError};

pub struct ScriptedTransport {
    scripts: VecDeque<Vec<String>>,
    current: VecDeque<String>,
    failing_opens: usize,
    is_open: bool,
    pub open_calls: usize,
    pub successful_opens: usize,
    pub close_calls: usize,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<Vec<&str>>) -> Self {
        Self {
            scripts: scripts.into_iter()
                .map(|s| s.into_iter().map(|l| l.to_string()).collect())
                .collect(),
            current: VecDeque::new(),
            failing_opens: 0,
            is_open: false,
            open_calls: 0,
            successful_opens: 0,
            close_calls: 0,
        }
    }

    pub fn from_telegrams(telegrams: Vec<String>) -> Self {
        let mut transport = Self::new(Vec::new());
        transport.scripts = telegrams.into_iter()
            .map(|t| t.split_inclusive('\n').map(|l| l.to_string()).collect())
            .collect();
        transport
    }

    /// The next `count` calls to `open` fail
    pub fn fail_opens(mut self, count: usize) -> Self {
        self.failing_opens = count;
        self
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.open_calls += 1;
        if self.failing_opens > 0 {
            self.failing_opens -= 1;
            return Err(TransportError::Open("device busy".to_string()));
        }

        self.successful_opens += 1;
        self.is_open = true;
        self.current = self.scripts.pop_front().unwrap_or_default().into();
        Ok(())
    }

    async fn close(&mut self) {
        self.close_calls += 1;
        self.is_open = false;
        self.current.clear();
    }

    async fn read_line(&mut self) -> Result<String, TransportError> {
        if !self.is_open {
            return Err(TransportError::NotOpen);
        }
        self.current.pop_front().ok_or(TransportError::Eof)
    }
}
