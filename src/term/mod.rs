extern crate ansi_term;
extern crate ctrlc;
extern crate linefeed;
use ansi_term::Style;
use clap::Parser;
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use tokiwen::error;
use tokiwen::lang::{Error, Program};
use tokiwen::mach::{
    Address, Config, Event, Opcode, Processor, Syscall, Word, DEFAULT_MEMORY_SIZE,
};

mod logger;
mod table;
mod watch;

type Result<T> = std::result::Result<T, Error>;

#[derive(Parser)]
#[command(name = "tokiwen", version, about = "Step through and undo Tokiwen programs")]
struct Cli {
    /// Bytes of word memory.
    #[arg(long, default_value_t = DEFAULT_MEMORY_SIZE)]
    memory_size: usize,

    /// Print diagnostics on stderr; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Program listing to load at startup.
    program: Option<PathBuf>,
}

#[derive(EnumIter, EnumString, IntoStaticStr, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
enum Command {
    Step,
    Next,
    Run,
    Undo,
    Back,
    Reset,
    Clear,
    Regs,
    Mem,
    Vars,
    List,
    Hist,
    Ops,
    Load,
    Help,
    #[strum(to_string = "quit", serialize = "exit")]
    Quit,
}

impl Command {
    fn usage(self) -> &'static str {
        use Command::*;
        match self {
            Step => "run one instruction",
            Next => "run one statement",
            Run => "run until the end, an input or Ctrl-C",
            Undo => "undo one instruction",
            Back => "undo one statement",
            Reset => "undo everything",
            Clear => "zero the whole memory",
            Regs => "show the registers",
            Mem => "mem [ADDR [COUNT]]: show memory words",
            Vars => "show the program variables",
            List => "show the program",
            Hist => "hist [COUNT]: show the last executed instructions",
            Ops => "show the instruction set",
            Load => "load FILE: load a program listing",
            Help => "show this help",
            Quit => "leave",
        }
    }
}

pub fn main() {
    let cli = Cli::parse();
    logger::init(cli.verbose);
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");
    if let Err(error) = main_loop(cli, interrupted) {
        eprintln!("{}", error);
    }
}

struct Session {
    config: Config,
    processor: Processor,
    touched: watch::Touched,
    declared: BTreeSet<Address>,
    until: Until,
    interrupted: Arc<AtomicBool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Until {
    Instruction,
    Statement,
    End,
}

impl Session {
    fn new(config: Config, interrupted: Arc<AtomicBool>) -> Session {
        let touched = watch::Touched::default();
        Session {
            config,
            processor: processor(config, &touched),
            touched,
            declared: BTreeSet::new(),
            until: Until::End,
            interrupted,
        }
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_str(&text)
    }

    /// Starts over with a fresh machine running `listing`.
    fn load_str(&mut self, listing: &str) -> Result<()> {
        let program = Program::from_str(listing)?;
        check_addresses(&program, self.config.memory_size)?;
        let touched = watch::Touched::default();
        let mut processor = processor(self.config, &touched);
        processor.set_program(Rc::new(program))?;
        self.declared = match processor.program() {
            Some(program) => program.metadata.variables.keys().copied().collect(),
            None => BTreeSet::new(),
        };
        self.touched = touched;
        self.processor = processor;
        Ok(())
    }

    /// Runs instruction by instruction so that Ctrl-C can stop the loop.
    fn advance(&mut self, until: Until) -> Result<Event> {
        self.until = until;
        self.interrupted.store(false, Ordering::SeqCst);
        loop {
            if self.interrupted.swap(false, Ordering::SeqCst) {
                return Ok(Event::Stopped);
            }
            self.check_input_address()?;
            let event = self.processor.run_one_instruction()?;
            match (event, until) {
                (Event::Stopped, Until::End) => {}
                (Event::Stopped, Until::Statement)
                    if !self.processor.is_boundary(self.processor.pc()) => {}
                (event, _) => return Ok(event),
            }
        }
    }

    /// The address an `INTERRUPT(0)` stores to comes from X at run time.
    fn check_input_address(&self) -> Result<()> {
        let next = self
            .processor
            .program()
            .and_then(|p| p.instruction(self.processor.pc()));
        if let Some(instruction) = next {
            if instruction.op() == Some(Opcode::Interrupt)
                && instruction.operand(0) == Syscall::Read as Word
                && !in_range(self.processor.x(), self.config.memory_size)
            {
                return Err(error!(AddressOutOfRange; &format!(
                    "INPUT TO {} WITH MEMORY SIZE {}",
                    self.processor.x(),
                    self.config.memory_size
                ))
                .at_instruction(self.processor.pc()));
            }
        }
        Ok(())
    }

    fn memory_range(&self, args: &[&str]) -> Result<Vec<Address>> {
        if args.is_empty() {
            let mut addresses = self.touched.addresses();
            addresses.extend(self.declared.iter().copied());
            return Ok(addresses.into_iter().collect());
        }
        let start = parse_number(args[0])?;
        let count = match args.get(1) {
            Some(count) => parse_number(count)?,
            None => 1,
        };
        let last = count
            .checked_sub(1)
            .and_then(|words| words.checked_mul(8))
            .and_then(|len| len.checked_add(start))
            .unwrap_or(-1);
        let size = self.config.memory_size;
        if count < 1 || !in_range(start, size) || !in_range(last, size) {
            return Err(error!(AddressOutOfRange; &format!(
                "MEMORY ENDS AT {}",
                size
            )));
        }
        Ok((start as Address..=last as Address).step_by(8).collect())
    }
}

/// A whole word at `address` fits in memory.
fn in_range(address: Word, size: usize) -> bool {
    address >= 0
        && (address as Address)
            .checked_add(8)
            .map_or(false, |end| end <= size)
}

/// Rejects a listing whose variables or address operands lie outside memory.
fn check_addresses(program: &Program, size: usize) -> Result<()> {
    for variable in program.metadata.variables.values() {
        if !in_range(variable.address as Word, size) {
            return Err(error!(AddressOutOfRange, variable.declared_at.begin.line; &format!(
                "VARIABLE {} AT {}",
                variable.name, variable.address
            )));
        }
    }
    for (index, instruction) in program.instructions.iter().enumerate() {
        let addressed = instruction.op().map_or(false, |op| op.has_address_operand());
        if addressed && !in_range(instruction.operand(0), size) {
            let error = error!(AddressOutOfRange; &instruction.to_string()).at_instruction(index);
            return Err(match program.metadata.source_line(index) {
                Some(line) => error.in_line_number(line),
                None => error,
            });
        }
    }
    Ok(())
}

fn processor(config: Config, touched: &watch::Touched) -> Processor {
    let mut processor = Processor::new(config);
    processor.subscribe(Box::new(watch::Registers));
    processor.memory_mut().subscribe(Box::new(touched.clone()));
    processor.input().subscribe(Box::new(watch::Traffic("input")));
    processor.output().subscribe(Box::new(watch::Traffic("output")));
    processor
}

fn main_loop(cli: Cli, interrupted: Arc<AtomicBool>) -> std::io::Result<()> {
    let config = Config {
        memory_size: cli.memory_size,
    };
    let mut session = Session::new(config, interrupted);
    let command = Interface::new("tokiwen")?;
    command.set_prompt("> ")?;
    let input = Interface::new("input")?;
    input.set_prompt("? ")?;
    input.set_report_signal(Signal::Interrupt, true);

    if let Some(path) = cli.program {
        if let Err(error) = session.load(&path) {
            print_error(&command, &error)?;
        }
    }

    let mut ask_input = false;
    loop {
        if ask_input && session.processor.is_waiting() {
            ask_input = false;
            match input.read_line()? {
                ReadResult::Input(string) => match parse_number(&string) {
                    Ok(value) => {
                        input.add_history_unique(string);
                        session.processor.input().write(value);
                        let result = session.advance(session.until);
                        match report(&command, &mut session, result) {
                            Ok(waiting) => ask_input = waiting,
                            Err(error) => print_error(&command, &error)?,
                        }
                    }
                    Err(error) => {
                        print_error(&command, &error)?;
                        ask_input = true;
                    }
                },
                ReadResult::Signal(Signal::Interrupt) => {
                    input.set_buffer("")?;
                    input.lock_reader().cancel_read_line()?;
                }
                ReadResult::Signal(_) | ReadResult::Eof => break,
            }
            continue;
        }
        let string = match command.read_line()? {
            ReadResult::Input(string) => string,
            ReadResult::Signal(_) | ReadResult::Eof => break,
        };
        let words: Vec<&str> = string.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        command.add_history_unique(string.clone());
        let cmd = match Command::from_str(&words[0].to_lowercase()) {
            Ok(cmd) => cmd,
            Err(_) => {
                let error = error!(SyntaxError; &format!("UNKNOWN COMMAND `{}`", words[0]));
                print_error(&command, &error)?;
                continue;
            }
        };
        match execute(&command, &mut session, cmd, &words[1..]) {
            Ok(Some(waiting)) => ask_input = waiting,
            Ok(None) => break,
            Err(error) => print_error(&command, &error)?,
        }
    }
    Ok(())
}

/// Runs one command. `None` ends the session; otherwise tells whether the
/// program now waits for input.
fn execute(
    term: &Interface<DefaultTerminal>,
    session: &mut Session,
    cmd: Command,
    args: &[&str],
) -> Result<Option<bool>> {
    use Command::*;
    let processor = &mut session.processor;
    match cmd {
        Step => {
            let result = session.advance(Until::Instruction);
            return Ok(Some(report(term, session, result)?));
        }
        Next => {
            let result = session.advance(Until::Statement);
            return Ok(Some(report(term, session, result)?));
        }
        Run => {
            let result = session.advance(Until::End);
            return Ok(Some(report(term, session, result)?));
        }
        Undo => processor.undo_one_instruction()?,
        Back => processor.undo_one_statement()?,
        Reset => processor.reset()?,
        Clear => processor.memory_mut().reset(),
        Regs => {}
        Mem => {
            let addresses = session.memory_range(args)?;
            let table = table::memory(&session.processor, addresses);
            term.write_fmt(format_args!("{}", table))?;
            return Ok(Some(false));
        }
        Vars => {
            let table = table::variables(processor);
            term.write_fmt(format_args!("{}", table))?;
            return Ok(Some(false));
        }
        List => {
            match processor.program() {
                Some(program) => {
                    let table = table::listing(program, processor.pc());
                    term.write_fmt(format_args!("{}", table))?;
                }
                None => return Err(error!(NoProgram)),
            }
            return Ok(Some(false));
        }
        Hist => {
            let count = match args.first() {
                Some(count) => parse_number(count)?.max(0) as usize,
                None => 10,
            };
            let table = table::history(processor, count);
            term.write_fmt(format_args!("{}", table))?;
            return Ok(Some(false));
        }
        Ops => {
            term.write_fmt(format_args!("{}", table::opcodes()))?;
            return Ok(Some(false));
        }
        Load => {
            match args.first() {
                Some(path) => session.load(Path::new(path))?,
                None => return Err(error!(SyntaxError; "EXPECTED `load FILE`")),
            }
            let program = session.processor.program().map(|p| p.len()).unwrap_or(0);
            term.write_fmt(format_args!("{} instructions loaded\n", program))?;
            return Ok(Some(false));
        }
        Help => {
            for cmd in Command::iter() {
                let name: &'static str = cmd.into();
                term.write_fmt(format_args!("{:<6} {}\n", name, cmd.usage()))?;
            }
            return Ok(Some(false));
        }
        Quit => return Ok(None),
    }
    term.write_fmt(format_args!("{}", table::registers(&session.processor)))?;
    Ok(Some(false))
}

/// Prints the program output and the registers after a run. Returns whether
/// the program waits for input.
fn report(
    term: &Interface<DefaultTerminal>,
    session: &mut Session,
    result: Result<Event>,
) -> Result<bool> {
    while let Some(value) = session.processor.output().try_read() {
        term.write_fmt(format_args!("{}\n", value))?;
    }
    let event = result?;
    term.write_fmt(format_args!("{}", table::registers(&session.processor)))?;
    match event {
        Event::Stopped => Ok(false),
        Event::Input => Ok(true),
        Event::End => {
            term.write_fmt(format_args!("{}\n", Style::new().bold().paint("END")))?;
            Ok(false)
        }
    }
}

fn print_error(term: &Interface<DefaultTerminal>, error: &Error) -> std::io::Result<()> {
    term.write_fmt(format_args!(
        "{}\n",
        Style::new().bold().paint(error.to_string())
    ))
}

fn parse_number(s: &str) -> Result<Word> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x") {
        Some(hex) => Word::from_str_radix(hex, 16),
        None => s.parse::<Word>(),
    };
    parsed.map_err(|_| error!(SyntaxError; &format!("EXPECTED A NUMBER, GOT `{}`", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokiwen::lang::ErrorCode;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 ").unwrap(), 42);
        assert_eq!(parse_number("-7").unwrap(), -7);
        assert_eq!(parse_number("0x10").unwrap(), 16);
        assert!(parse_number("ten").is_err());
    }

    fn session(memory_size: usize) -> Session {
        Session::new(Config { memory_size }, Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::from_str("back").ok(), Some(Command::Back));
        assert_eq!(Command::from_str("exit").ok(), Some(Command::Quit));
        assert_eq!(Command::from_str("quit").ok(), Some(Command::Quit));
        assert!(Command::from_str("jump").is_err());
        let name: &'static str = Command::Quit.into();
        assert_eq!(name, "quit");
    }

    #[test]
    fn test_memory_range() {
        let session = session(32);
        assert_eq!(session.memory_range(&["8", "2"]).unwrap(), vec![8, 16]);
        assert_eq!(session.memory_range(&["24"]).unwrap(), vec![24]);
        assert!(session.memory_range(&["25"]).is_err());
        assert!(session.memory_range(&["-8"]).is_err());
        assert!(session.memory_range(&["0", "0"]).is_err());
        assert!(session.memory_range(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_declared_variables_survive_clear() {
        let mut session = session(64);
        session
            .load_str(".var count 16 8 1.1-1.5\n* 1: LOAD_I(3)\n* 1: SET(40)")
            .unwrap();
        assert_eq!(session.memory_range(&[]).unwrap(), vec![16]);
        session.advance(Until::End).unwrap();
        assert_eq!(session.memory_range(&[]).unwrap(), vec![16, 40]);
        session.processor.memory_mut().reset();
        assert_eq!(session.memory_range(&[]).unwrap(), vec![16]);
    }

    #[test]
    fn test_listing_addresses_checked_on_load() {
        let mut session = session(64);
        let error = session.load_str("* 1: NOOP()\n* 2: SET(70000)").unwrap_err();
        assert_eq!(error.code(), ErrorCode::AddressOutOfRange);
        assert_eq!(error.line_number(), Some(2));
        assert_eq!(error.instruction(), Some(1));
        let error = session.load_str(".var big 60 8 3.1-3.4\n* 1: NOOP()").unwrap_err();
        assert_eq!(error.code(), ErrorCode::AddressOutOfRange);
        assert_eq!(error.line_number(), Some(3));
        assert!(session.processor.program().is_none());
        session.load_str("* 1: LOAD(56)\n* 1: JUMP(70000)").unwrap();
    }

    #[test]
    fn test_input_address_checked_before_read() {
        let mut session = session(64);
        session.load_str("* 1: LOAD_I(64)\n* 2: INTERRUPT(0)").unwrap();
        session.processor.input().write(5);
        let error = session.advance(Until::End).unwrap_err();
        assert_eq!(error.code(), ErrorCode::AddressOutOfRange);
        assert_eq!(error.instruction(), Some(1));
        assert_eq!(session.processor.pc(), 1);
        assert!(!session.processor.is_waiting());
    }

    #[test]
    fn test_advance_by_statement() {
        let mut session = session(64);
        session
            .load_str("* 1: LOAD_I(0)\n  1: INTERRUPT(0)\n* 2: LOAD(0)\n  2: INTERRUPT(1)")
            .unwrap();
        assert_eq!(session.advance(Until::Statement).unwrap(), Event::Input);
        session.processor.input().write(7);
        assert_eq!(session.advance(session.until).unwrap(), Event::Stopped);
        assert_eq!(session.processor.pc(), 2);
        assert_eq!(session.advance(Until::Instruction).unwrap(), Event::Stopped);
        assert_eq!(session.advance(Until::End).unwrap(), Event::End);
        assert_eq!(session.processor.output().try_read(), Some(7));
    }
}
