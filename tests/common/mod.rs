use std::rc::Rc;
use tokiwen::lang::Program;
use tokiwen::mach::{Config, Event, Processor};

#[allow(dead_code)]
pub fn load(listing: &str) -> Processor {
    let program: Program = listing.parse().unwrap();
    let mut processor = Processor::new(Config { memory_size: 256 });
    processor.set_program(Rc::new(program)).unwrap();
    processor
}

/// Runs until the program ends or stops, then returns everything written to
/// the output channel, one value per line. A wait for input shows as `? `
/// and an error as its message.
#[allow(dead_code)]
pub fn exec(processor: &mut Processor) -> String {
    let result = processor.run_program();
    let mut s = drain(processor);
    match result {
        Ok(Event::Input) => s.push_str("? "),
        Ok(_) => {}
        Err(error) => s.push_str(&format!("{}\n", error)),
    }
    s
}

#[allow(dead_code)]
pub fn drain(processor: &mut Processor) -> String {
    let mut s = String::new();
    while let Some(value) = processor.output().try_read() {
        s.push_str(&format!("{}\n", value));
    }
    s
}
