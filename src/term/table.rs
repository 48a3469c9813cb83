use prettytable::format::{self, TableFormat};
use prettytable::{row, Table};
use strum::IntoEnumIterator;
use tokiwen::lang::Program;
use tokiwen::mach::{Address, Opcode, Processor};

fn new_table() -> Table {
    let mut table = Table::new();
    let table_format: TableFormat = *format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR;
    table.set_format(table_format);
    table
}

pub fn registers(processor: &Processor) -> Table {
    let mut table = new_table();
    table.set_titles(row![b->"PC", b->"X", b->"Line", b->"History", b->"State"]);
    let line = match processor.current_line() {
        Some(line) => line.to_string(),
        None => String::from("-"),
    };
    let state = if processor.program().is_none() {
        "no program"
    } else if processor.is_waiting() {
        "input"
    } else if processor.is_done() {
        "done"
    } else {
        "ready"
    };
    table.add_row(row![
        r->processor.pc(),
        r->processor.x(),
        r->line,
        r->processor.history().len(),
        state
    ]);
    table
}

pub fn variables(processor: &Processor) -> Table {
    let mut table = new_table();
    table.set_titles(row![b->"Variable", b->"Declared", b->"Address", b->"Size", b->"Value"]);
    if let Some(program) = processor.program() {
        for variable in program.metadata.variables.values() {
            table.add_row(row![
                variable.name,
                variable.declared_at,
                r->variable.address,
                r->variable.size,
                r->variable.value(processor.memory())
            ]);
        }
    }
    table
}

/// Instructions with the next one marked `->` and statement starts `*`.
pub fn listing(program: &Program, pc: Address) -> Table {
    let mut table = new_table();
    table.set_titles(row![b->"Next", b->"Index", b->"Line", b->"Instruction"]);
    for (index, instruction) in program.instructions.iter().enumerate() {
        let next = if index == pc { "->" } else { "" };
        let boundary = if program.is_boundary(index) { "*" } else { " " };
        let line = match program.metadata.source_line(index) {
            Some(line) => line.to_string(),
            None => String::new(),
        };
        table.add_row(row![
            next,
            r->index,
            r->line,
            format!("{} {}", boundary, instruction)
        ]);
    }
    table
}

/// One row per word, named after the variable stored there if any.
pub fn memory<I>(processor: &Processor, addresses: I) -> Table
where
    I: IntoIterator<Item = Address>,
{
    let mut table = new_table();
    table.set_titles(row![b->"Variable", b->"Address", b->"Contents", b->"Bytes"]);
    for address in addresses {
        let name = processor
            .program()
            .and_then(|p| p.metadata.variables.get(&address))
            .map(|v| v.name.clone())
            .unwrap_or_default();
        let bytes: Vec<String> = processor.memory().bytes()[address..address + 8]
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        table.add_row(row![
            name,
            r->address,
            r->processor.memory().read(address),
            bytes.join(" ")
        ]);
    }
    table
}

pub fn opcodes() -> Table {
    let mut table = new_table();
    table.set_titles(row![b->"Code", b->"Mnemonic", b->"Operands", b->"Description"]);
    for op in Opcode::iter() {
        let operands = match (op.arity(), op.has_address_operand()) {
            (0, _) => "",
            (_, true) => "address",
            (_, false) => "value",
        };
        let description = if op.is_reserved() {
            format!("(reserved) {}", op.description())
        } else {
            op.description().to_string()
        };
        table.add_row(row![r->op.code(), op, operands, description]);
    }
    table
}

/// The most recent `count` executions, oldest first.
pub fn history(processor: &Processor, count: usize) -> Table {
    let mut table = new_table();
    table.set_titles(row![b->"Step", b->"Index", b->"Line", b->"Instruction"]);
    let history = processor.history();
    let skip = history.len().saturating_sub(count);
    for (step, execution) in history.iter().enumerate().skip(skip) {
        let line = processor
            .program()
            .and_then(|p| p.metadata.source_line(execution.index()))
            .map(|line| line.to_string())
            .unwrap_or_default();
        table.add_row(row![
            r->step + 1,
            r->execution.index(),
            r->line,
            execution.instruction()
        ]);
    }
    table
}
