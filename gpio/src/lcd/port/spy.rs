//! Recording port for tests.
//!
//! [SpyPort] keeps every bus transition in a journal, and [SpyDelay] writes into the same journal,
//! so a test can check the exact order of line changes, bus values and waits.
//! Reads are answered from a script, then from an idle value.
use crate::GpioResult;
use crate::lcd::port::{BusWidth, ControlLine, DataDirection, LcdPort, LineState};
use embedded_hal::delay::DelayNs;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A single observable action on the bus.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PortEvent {
    Line(ControlLine, LineState),
    Direction(BusWidth, DataDirection),
    Out(BusWidth, u8),
    /// A sample of the data lines, with the value that was returned.
    In(BusWidth, u8),
    DelayUs(u32),
}

#[derive(Debug, Default)]
struct Journal {
    events: Vec<PortEvent>,
}

type SharedJournal = Rc<RefCell<Journal>>;

#[derive(Debug)]
pub struct SpyPort {
    journal: SharedJournal,
    reads: VecDeque<u8>,
    idle_read: u8,
    width: Option<BusWidth>,
    rs: LineState,
    rw: LineState,
    ce: LineState,
    direction: DataDirection,
}

impl SpyPort {
    pub fn new() -> Self {
        SpyPort {
            journal: SharedJournal::default(),
            reads: VecDeque::new(),
            idle_read: 0x00,
            width: None,
            rs: LineState::Undefined,
            rw: LineState::Undefined,
            ce: LineState::Undefined,
            direction: DataDirection::Undefined,
        }
    }

    /// Sets the value returned once the scripted reads run out.
    pub fn with_idle_read(mut self, value: u8) -> Self {
        self.idle_read = value;
        self
    }

    /// Creates a delay that records into this port's journal.
    pub fn delay(&self) -> SpyDelay {
        SpyDelay {
            journal: Rc::clone(&self.journal),
        }
    }

    /// Queues values for the next samples of the data lines, in order.
    pub fn queue_reads(&mut self, values: impl IntoIterator<Item = u8>) {
        self.reads.extend(values);
    }

    pub fn pending_reads(&self) -> usize {
        self.reads.len()
    }

    pub fn events(&self) -> Vec<PortEvent> {
        self.journal.borrow().events.clone()
    }

    /// Returns the recorded events and starts a fresh journal.
    pub fn take_events(&mut self) -> Vec<PortEvent> {
        std::mem::take(&mut self.journal.borrow_mut().events)
    }

    pub fn width(&self) -> Option<BusWidth> {
        self.width
    }

    pub fn line(&self, line: ControlLine) -> LineState {
        match line {
            ControlLine::Rs => self.rs,
            ControlLine::Rw => self.rw,
            ControlLine::Ce => self.ce,
        }
    }

    pub fn direction(&self) -> DataDirection {
        self.direction
    }

    fn record(&self, event: PortEvent) {
        self.journal.borrow_mut().events.push(event);
    }
}

impl Default for SpyPort {
    fn default() -> Self {
        Self::new()
    }
}

impl LcdPort for SpyPort {
    fn init(&mut self, width: BusWidth) -> GpioResult<()> {
        self.width = Some(width);
        self.ce = LineState::Deasserted;
        self.rs = LineState::Deasserted;
        self.rw = LineState::Asserted;
        self.direction = DataDirection::Input;
        Ok(())
    }

    fn deinit(&mut self) -> GpioResult<()> {
        self.width = None;
        self.ce = LineState::Undefined;
        self.rs = LineState::Undefined;
        self.rw = LineState::Undefined;
        self.direction = DataDirection::Undefined;
        Ok(())
    }

    fn set_line(&mut self, line: ControlLine, asserted: bool) -> GpioResult<()> {
        let state = LineState::from(asserted);
        match line {
            ControlLine::Rs => self.rs = state,
            ControlLine::Rw => self.rw = state,
            ControlLine::Ce => self.ce = state,
        }
        self.record(PortEvent::Line(line, state));
        Ok(())
    }

    fn set_direction(&mut self, width: BusWidth, direction: DataDirection) -> GpioResult<()> {
        self.direction = direction;
        self.record(PortEvent::Direction(width, direction));
        Ok(())
    }

    fn write_bus(&mut self, width: BusWidth, value: u8) -> GpioResult<()> {
        self.record(PortEvent::Out(width, value & width.mask()));
        Ok(())
    }

    fn read_bus(&mut self, width: BusWidth) -> GpioResult<u8> {
        let value = self.reads.pop_front().unwrap_or(self.idle_read) & width.mask();
        self.record(PortEvent::In(width, value));
        Ok(value)
    }
}

/// Delay that does not wait, it only records the requested time into a [SpyPort] journal.
#[derive(Debug, Clone)]
pub struct SpyDelay {
    journal: SharedJournal,
}

impl DelayNs for SpyDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.journal
            .borrow_mut()
            .events
            .push(PortEvent::DelayUs(ns.div_ceil(1000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.journal.borrow_mut().events.push(PortEvent::DelayUs(us));
    }
}
