//! In-memory byte sources and a hand-driven clock for tests.
use chrono::{Duration, Local, TimeZone};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use super::containers::Timestamp;
use super::source::ByteSource;
use super::utils::Clock;

/// Queue of bytes; an exhausted queue behaves like a read timeout.
/// Clones share the queue so tests can feed a source owned by the sniffer.
#[derive(Clone, Default)]
pub struct MemorySource {
    bytes: Rc<RefCell<VecDeque<u8>>>,
    fail: Rc<Cell<bool>>,
    /// Clock moved forward after every byte read.
    tick: Option<(ManualClock, i64)>,
}

impl MemorySource {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let source = Self::default();
        source.push(bytes);
        source
    }

    pub fn push(&self, bytes: &[u8]) {
        self.bytes.borrow_mut().extend(bytes.iter().copied());
    }

    /// Advances `clock` by `ms` after each byte handed out.
    pub fn ticking(mut self, clock: &ManualClock, ms: i64) -> Self {
        self.tick = Some((clock.clone(), ms));
        self
    }

    /// Makes every further call fail like an unplugged device.
    pub fn unplug(&self) {
        self.fail.set(true);
    }

    fn check(&self) -> io::Result<()> {
        if self.fail.get() {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
        } else {
            Ok(())
        }
    }
}

impl ByteSource for MemorySource {
    fn has_data(&mut self) -> io::Result<bool> {
        self.check()?;
        Ok(!self.bytes.borrow().is_empty())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.check()?;
        let byte = self.bytes.borrow_mut().pop_front();
        if let (Some(_), Some((clock, ms))) = (byte, &self.tick) {
            clock.advance_ms(*ms);
        }
        Ok(byte)
    }
}

/// Clock that only moves when told to. Clones share the current time.
#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        let start = Local.with_ymd_and_hms(2024, 5, 17, 10, 30, 0).unwrap();
        Self { now: Rc::new(Cell::new(start)) }
    }
}

impl ManualClock {
    pub fn advance_ms(&self, ms: i64) {
        self.now.set(self.now.get() + Duration::milliseconds(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
