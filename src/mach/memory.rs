use super::{Address, Word};

/// Receives every change made to a [`Memory`].
pub trait MemoryObserver {
    fn reset(&mut self) {}
    fn byte_written(&mut self, _address: Address, _byte: u8) {}
    fn word_written(&mut self, _address: Address, _word: Word) {}
}

/// ## Word memory
///
/// A flat byte array addressed in 8-byte little-endian words. Addresses come
/// from the compiler and are trusted; an access past the end panics.

pub struct Memory {
    data: Vec<u8>,
    observers: Vec<Box<dyn MemoryObserver>>,
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory {{ size: {} }}", self.data.len())
    }
}

impl Memory {
    pub fn new(size: usize) -> Memory {
        Memory {
            data: vec![0; size],
            observers: vec![],
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn subscribe(&mut self, observer: Box<dyn MemoryObserver>) {
        self.observers.push(observer);
    }

    pub fn read(&self, addr: Address) -> Word {
        let mut word = [0u8; 8];
        word.copy_from_slice(&self.data[addr..addr + 8]);
        Word::from_le_bytes(word)
    }

    pub fn write(&mut self, addr: Address, value: Word) {
        for (i, byte) in value.to_le_bytes().iter().enumerate() {
            self.data[addr + i] = *byte;
            for observer in self.observers.iter_mut() {
                observer.byte_written(addr + i, *byte);
            }
        }
        for observer in self.observers.iter_mut() {
            observer.word_written(addr, value);
        }
    }

    pub fn reset(&mut self) {
        for byte in self.data.iter_mut() {
            *byte = 0;
        }
        for observer in self.observers.iter_mut() {
            observer.reset();
        }
    }

    /// Copies a program's data segment to the start of memory. Observers
    /// are not told about individual bytes.
    pub fn load(&mut self, image: &[u8]) {
        let len = if image.len() > self.data.len() {
            log::warn!(
                "data segment of {} bytes truncated to memory size {}",
                image.len(),
                self.data.len()
            );
            self.data.len()
        } else {
            image.len()
        };
        self.data[..len].copy_from_slice(&image[..len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl MemoryObserver for Recorder {
        fn reset(&mut self) {
            self.0.borrow_mut().push("reset".into());
        }
        fn byte_written(&mut self, address: Address, byte: u8) {
            self.0.borrow_mut().push(format!("b{}={}", address, byte));
        }
        fn word_written(&mut self, address: Address, word: Word) {
            self.0.borrow_mut().push(format!("w{}={}", address, word));
        }
    }

    #[test]
    fn test_little_endian_layout() {
        let mut m = Memory::new(16);
        m.write(4, 0x0102);
        assert_eq!(&m.bytes()[4..12], &[2, 1, 0, 0, 0, 0, 0, 0]);
        m.write(8, -1);
        assert_eq!(m.read(8), -1);
        assert_eq!(m.read(4), 0xffff_ffff_0000_0102u64 as Word);
    }

    #[test]
    fn test_byte_events_precede_word_event() {
        let log = Rc::new(RefCell::new(vec![]));
        let mut m = Memory::new(8);
        m.subscribe(Box::new(Recorder(log.clone())));
        m.write(0, 258);
        assert_eq!(
            *log.borrow(),
            vec!["b0=2", "b1=1", "b2=0", "b3=0", "b4=0", "b5=0", "b6=0", "b7=0", "w0=258"]
        );
        log.borrow_mut().clear();
        m.reset();
        assert_eq!(*log.borrow(), vec!["reset"]);
        assert_eq!(m.read(0), 0);
    }

    #[test]
    fn test_load_is_silent() {
        let log = Rc::new(RefCell::new(vec![]));
        let mut m = Memory::new(16);
        m.subscribe(Box::new(Recorder(log.clone())));
        m.write(8, 99);
        log.borrow_mut().clear();
        m.load(&[7, 0, 0, 0, 0, 0, 0, 0]);
        assert!(log.borrow().is_empty());
        assert_eq!(m.read(0), 7);
        assert_eq!(m.read(8), 99);
    }

    #[test]
    fn test_load_truncates_oversized_image() {
        let mut m = Memory::new(8);
        m.load(&[1; 12]);
        assert_eq!(m.read(0), 0x0101_0101_0101_0101);
    }
}
