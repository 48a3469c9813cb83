use super::Word;
use std::collections::VecDeque;

/// Identifies a read that could not be satisfied immediately.
pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    Ready(Word),
    Pending(Ticket),
}

pub trait ChannelObserver {
    /// A value was written with no reader waiting for it.
    fn buffered(&mut self) {}
    /// A reader found nothing to read and is now waiting.
    fn waiting(&mut self) {}
}

/// ## Rendezvous channel
///
/// Unbounded FIFO between the running program and the outside world.
/// A pending read is a ticket; it is redeemed with `poll` once a write has
/// been handed to it. Values go to readers in the order both were issued.
/// Either values are buffered or readers are waiting, never both.

#[derive(Default)]
pub struct Channel {
    buffer: VecDeque<Word>,
    waiting: VecDeque<Ticket>,
    delivered: VecDeque<(Ticket, Word)>,
    next_ticket: Ticket,
    observers: Vec<Box<dyn ChannelObserver>>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("buffer", &self.buffer)
            .field("waiting", &self.waiting)
            .finish()
    }
}

impl Channel {
    pub fn new() -> Channel {
        Channel::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn ChannelObserver>) {
        self.observers.push(observer);
    }

    pub fn write(&mut self, value: Word) {
        match self.waiting.pop_front() {
            Some(ticket) => self.delivered.push_back((ticket, value)),
            None => {
                self.buffer.push_back(value);
                for observer in self.observers.iter_mut() {
                    observer.buffered();
                }
            }
        }
    }

    pub fn read(&mut self) -> Read {
        if let Some(value) = self.buffer.pop_front() {
            return Read::Ready(value);
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.waiting.push_back(ticket);
        for observer in self.observers.iter_mut() {
            observer.waiting();
        }
        Read::Pending(ticket)
    }

    /// Collects the value handed to a pending read, if it has arrived.
    pub fn poll(&mut self, ticket: Ticket) -> Option<Word> {
        let pos = self.delivered.iter().position(|(t, _)| *t == ticket)?;
        self.delivered.remove(pos).map(|(_, value)| value)
    }

    /// Takes a buffered value without ever becoming a waiting reader.
    pub fn try_read(&mut self) -> Option<Word> {
        self.buffer.pop_front()
    }

    pub fn is_waiting(&self) -> bool {
        !self.waiting.is_empty()
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<&'static str>>>);

    impl ChannelObserver for Recorder {
        fn buffered(&mut self) {
            self.0.borrow_mut().push("buffered");
        }
        fn waiting(&mut self) {
            self.0.borrow_mut().push("waiting");
        }
    }

    #[test]
    fn test_buffered_values_in_order() {
        let mut c = Channel::new();
        c.write(1);
        c.write(2);
        c.write(3);
        assert_eq!(c.read(), Read::Ready(1));
        assert_eq!(c.read(), Read::Ready(2));
        assert_eq!(c.read(), Read::Ready(3));
    }

    #[test]
    fn test_waiting_readers_in_order() {
        let mut c = Channel::new();
        let first = match c.read() {
            Read::Pending(t) => t,
            Read::Ready(_) => panic!("nothing was written"),
        };
        let second = match c.read() {
            Read::Pending(t) => t,
            Read::Ready(_) => panic!("nothing was written"),
        };
        assert_eq!(c.poll(first), None);
        c.write(1);
        c.write(2);
        c.write(3);
        assert!(!c.is_waiting());
        assert_eq!(c.buffered(), 1);
        assert_eq!(c.poll(second), Some(2));
        assert_eq!(c.poll(first), Some(1));
        assert_eq!(c.poll(first), None);
        assert_eq!(c.read(), Read::Ready(3));
    }

    #[test]
    fn test_notifications() {
        let log = Rc::new(RefCell::new(vec![]));
        let mut c = Channel::new();
        c.subscribe(Box::new(Recorder(log.clone())));
        c.write(5);
        assert_eq!(c.read(), Read::Ready(5));
        let _ = c.read();
        c.write(6);
        assert_eq!(*log.borrow(), vec!["buffered", "waiting"]);
    }

    #[test]
    fn test_try_read_never_waits() {
        let mut c = Channel::new();
        assert_eq!(c.try_read(), None);
        assert!(!c.is_waiting());
        c.write(9);
        assert_eq!(c.try_read(), Some(9));
    }
}
