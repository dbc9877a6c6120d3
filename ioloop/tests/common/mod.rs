#![allow(dead_code)]

use ioloop::poller::{FdSet, FdSets, Poller};
use ioloop::{Connection, Context, Descriptors, Interval, Outcome, Readiness};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::os::fd::RawFd;
use std::rc::Rc;

/// Shared call log.
pub type Log = Rc<RefCell<Vec<String>>>;

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// What the scripted poller reports for one wait.
pub enum Step {
    /// Report these descriptors ready (intersected with the interest).
    Ready { read: Vec<RawFd>, write: Vec<RawFd> },
    /// Nothing ready.
    Timeout,
    /// The wait fails.
    Fail(io::ErrorKind),
}

impl Step {
    pub fn ready(read: &[RawFd], write: &[RawFd]) -> Self {
        Step::Ready {
            read: read.to_vec(),
            write: write.to_vec(),
        }
    }
}

/// One recorded wait.
#[derive(Clone, Debug)]
pub struct Wait {
    pub read: Vec<RawFd>,
    pub write: Vec<RawFd>,
    pub timeout: Interval,
}

/// A poller that replays a script and records every wait.
///
/// Once the script is exhausted every wait times out.
pub struct ScriptedPoller {
    steps: VecDeque<Step>,
    waits: Rc<RefCell<Vec<Wait>>>,
}

impl ScriptedPoller {
    pub fn new(steps: Vec<Step>) -> (Self, Rc<RefCell<Vec<Wait>>>) {
        let waits = Rc::new(RefCell::new(Vec::new()));
        let poller = Self {
            steps: steps.into(),
            waits: waits.clone(),
        };
        (poller, waits)
    }
}

fn keep(set: &mut FdSet, ready: &[RawFd]) {
    let interest: Vec<_> = set.iter().collect();
    set.clear();
    for fd in interest.into_iter().filter(|fd| ready.contains(fd)) {
        set.insert(fd);
    }
}

impl Poller for ScriptedPoller {
    fn wait(&mut self, sets: &mut FdSets, timeout: Interval) -> ioloop::Result<usize> {
        self.waits.borrow_mut().push(Wait {
            read: sets.read.iter().collect(),
            write: sets.write.iter().collect(),
            timeout,
        });

        match self.steps.pop_front().unwrap_or(Step::Timeout) {
            Step::Timeout => Ok(0),
            Step::Fail(kind) => Err(io::Error::from(kind).into()),
            Step::Ready { read, write } => {
                keep(&mut sets.read, &read);
                keep(&mut sets.write, &write);
                Ok(sets.len())
            }
        }
    }
}

pub type Hook = Box<dyn FnMut(&mut Descriptors, &mut Context<'_>)>;

/// A connection with fixed answers that logs every call as `name:op`.
pub struct MockConn {
    name: &'static str,
    fds: Descriptors,
    log: Log,
    probe_write: Readiness,
    probe_read: Readiness,
    write: Outcome,
    read: Outcome,
    /// Terminate from `probe_write` after this many passes.
    passes: Option<usize>,
    on_probe: Option<Hook>,
    on_write: Option<Hook>,
    on_read: Option<Hook>,
}

impl MockConn {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            fds: Descriptors::disabled(),
            log: log.clone(),
            probe_write: Readiness::Idle,
            probe_read: Readiness::Idle,
            write: Outcome::Continue,
            read: Outcome::Continue,
            passes: None,
            on_probe: None,
            on_write: None,
            on_read: None,
        }
    }

    pub fn fds(mut self, read: RawFd, write: RawFd) -> Self {
        self.fds = Descriptors::new(read, write);
        self
    }

    pub fn probes(mut self, write: Readiness, read: Readiness) -> Self {
        self.probe_write = write;
        self.probe_read = read;
        self
    }

    pub fn write_returns(mut self, outcome: Outcome) -> Self {
        self.write = outcome;
        self
    }

    pub fn read_returns(mut self, outcome: Outcome) -> Self {
        self.read = outcome;
        self
    }

    pub fn passes(mut self, passes: usize) -> Self {
        self.passes = Some(passes);
        self
    }

    pub fn on_probe(mut self, hook: impl FnMut(&mut Descriptors, &mut Context<'_>) + 'static) -> Self {
        self.on_probe = Some(Box::new(hook));
        self
    }

    pub fn on_write(mut self, hook: impl FnMut(&mut Descriptors, &mut Context<'_>) + 'static) -> Self {
        self.on_write = Some(Box::new(hook));
        self
    }

    pub fn on_read(mut self, hook: impl FnMut(&mut Descriptors, &mut Context<'_>) + 'static) -> Self {
        self.on_read = Some(Box::new(hook));
        self
    }

    fn record(&self, op: &str) {
        self.log.borrow_mut().push(format!("{}:{}", self.name, op));
    }
}

impl Connection for MockConn {
    fn descriptors(&self) -> &Descriptors {
        &self.fds
    }

    fn descriptors_mut(&mut self) -> &mut Descriptors {
        &mut self.fds
    }

    fn probe_write(&mut self, cx: &mut Context<'_>) -> Readiness {
        self.record("probe_write");

        if let Some(hook) = self.on_probe.as_mut() {
            hook(&mut self.fds, cx);
        }

        if let Some(passes) = self.passes.as_mut() {
            if *passes == 0 {
                return Readiness::Terminate;
            }
            *passes -= 1;
        }

        self.probe_write
    }

    fn probe_read(&mut self, _cx: &mut Context<'_>) -> Readiness {
        self.record("probe_read");
        self.probe_read
    }

    fn write(&mut self, cx: &mut Context<'_>) -> Outcome {
        self.record("write");

        if let Some(hook) = self.on_write.as_mut() {
            hook(&mut self.fds, cx);
        }

        self.write
    }

    fn read(&mut self, cx: &mut Context<'_>) -> Outcome {
        self.record("read");

        if let Some(hook) = self.on_read.as_mut() {
            hook(&mut self.fds, cx);
        }

        self.read
    }
}

impl Drop for MockConn {
    fn drop(&mut self) {
        self.record("drop");
    }
}
