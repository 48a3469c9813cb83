//! # Tokiwen workbench
//!
//! Loads a program listing and steps through it from the terminal.
//!

mod term;

fn main() {
    term::main();
}
