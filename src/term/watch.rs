use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use tokiwen::lang::Program;
use tokiwen::mach::{Address, ChannelObserver, MemoryObserver, ProcessorObserver, Word};

/// Traces register changes at the `trace` log level.
pub struct Registers;

impl ProcessorObserver for Registers {
    fn program_loaded(&mut self, program: &Program) {
        log::debug!("program with {} statements", program.metadata.statement_boundaries.len());
    }

    fn pc_changed(&mut self, pc: Address) {
        log::trace!("pc <- {}", pc);
    }

    fn x_changed(&mut self, x: Word) {
        log::trace!("x <- {}", x);
    }
}

/// Collects the address of every word written since the last reset. `mem`
/// shows these next to the declared variables when given no range.
#[derive(Clone, Default)]
pub struct Touched(Rc<RefCell<BTreeSet<Address>>>);

impl Touched {
    pub fn addresses(&self) -> BTreeSet<Address> {
        self.0.borrow().clone()
    }
}

impl MemoryObserver for Touched {
    fn reset(&mut self) {
        self.0.borrow_mut().clear();
    }

    fn word_written(&mut self, address: Address, word: Word) {
        log::trace!("mem[{}] <- {}", address, word);
        self.0.borrow_mut().insert(address);
    }
}

/// Logs channel traffic under the channel's name.
pub struct Traffic(pub &'static str);

impl ChannelObserver for Traffic {
    fn buffered(&mut self) {
        log::trace!("{}: value buffered", self.0);
    }

    fn waiting(&mut self) {
        log::debug!("{}: reader waiting", self.0);
    }
}
