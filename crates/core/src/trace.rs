//! Access tracing for EEPROM storage.
//!
//! [`TraceStorage`] wraps any [`EepromStorage`] and records every byte
//! primitive that passes through it. Watchpoints count hits on specific
//! addresses and remember the first one that fired, so a caller can stop
//! and inspect the device.

use crate::EepromStorage;

/// Primitive that touched the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// Watchpoint trigger type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// Trigger on write
    Write,
    /// Trigger on read
    Read,
    /// Trigger on read or write
    ReadWrite,
}

impl WatchKind {
    fn matches(self, access: AccessKind) -> bool {
        match self {
            WatchKind::ReadWrite => true,
            WatchKind::Read => access == AccessKind::Read,
            WatchKind::Write => access == AccessKind::Write,
        }
    }
}

/// One recorded byte access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub addr: usize,
    pub kind: AccessKind,
    /// Byte read back, or byte written
    pub value: u8,
}

/// An EEPROM address watchpoint.
#[derive(Debug, Clone)]
pub struct Watchpoint {
    pub addr: usize,
    pub kind: WatchKind,
    /// Optional: only trigger when this value is read or written
    pub value_match: Option<u8>,
    pub hits: u64,
    pub enabled: bool,
}

/// Recording wrapper around a storage device.
pub struct TraceStorage<S> {
    inner: S,
    log: Vec<Access>,
    /// Stop recording after this many entries (watchpoints still count)
    limit: Option<usize>,
    pub watchpoints: Vec<Watchpoint>,
    /// First watchpoint hit not yet taken: (watchpoint index, access)
    hit: Option<(usize, Access)>,
}

impl<S: EepromStorage> TraceStorage<S> {
    pub fn new(inner: S) -> Self {
        TraceStorage {
            inner,
            log: Vec::new(),
            limit: None,
            watchpoints: Vec::new(),
            hit: None,
        }
    }

    /// Keep at most `limit` log entries.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn accesses(&self) -> &[Access] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.hit = None;
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Add a watchpoint. Returns its index.
    pub fn add_watchpoint(&mut self, addr: usize, kind: WatchKind) -> usize {
        let idx = self.watchpoints.len();
        self.watchpoints.push(Watchpoint {
            addr, kind, value_match: None, hits: 0, enabled: true,
        });
        idx
    }

    /// Remove a watchpoint by index.
    pub fn remove_watchpoint(&mut self, idx: usize) -> bool {
        if idx < self.watchpoints.len() {
            self.watchpoints.remove(idx);
            true
        } else { false }
    }

    /// Take pending watchpoint hit (returns and clears it).
    pub fn take_hit(&mut self) -> Option<(usize, Access)> {
        self.hit.take()
    }

    fn record(&mut self, access: Access) {
        if self.limit.map_or(true, |l| self.log.len() < l) {
            self.log.push(access);
        }
        for (i, wp) in self.watchpoints.iter_mut().enumerate() {
            if !wp.enabled || wp.addr != access.addr || !wp.kind.matches(access.kind) {
                continue;
            }
            if let Some(v) = wp.value_match {
                if access.value != v { continue; }
            }
            wp.hits += 1;
            if self.hit.is_none() {
                self.hit = Some((i, access));
            }
        }
    }
}

impl<S: EepromStorage> EepromStorage for TraceStorage<S> {
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn read_byte(&mut self, addr: usize) -> u8 {
        let value = self.inner.read_byte(addr);
        self.record(Access { addr, kind: AccessKind::Read, value });
        value
    }

    fn write_byte(&mut self, addr: usize, value: u8) {
        self.inner.write_byte(addr, value);
        self.record(Access { addr, kind: AccessKind::Write, value });
    }
}
