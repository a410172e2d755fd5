//! # An MC68000 instruction set generator written in Rust.
//!
//! Runs every 16-bit opcode through an ordered list of instruction patterns
//! and writes the matching semantics out as C for an interpreter to include:
//! a `switch (opcode)` with one case per implemented opcode, and a
//! `generated_instructions[]` bitmap telling which opcodes have a case.
//!
//! ## Getting Started
//! ```
//! cargo run -- -o /path/to/interpreter/src
//! ```
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod macros;
mod bits;
mod conditions;
mod config;
mod emit;
mod error;
mod instructions;
mod ir;
#[cfg(test)]
mod machine;
mod modes;
mod operands;
mod pattern;
mod size;
mod table;
use pattern::Pattern;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use table::{OpcodeTable, OPCODE_COUNT};
pub(crate) use {crate::error::*, modes::*, size::*};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // generate does all the work
    if let Err(e) = generate() {
        println!("{}", e);
        return Err(Box::new(e));
    }
    Ok(())
}

/// Build the opcode table from the pattern list, report on it, then write both artifacts.
/// Nothing is written unless the whole table was built.
fn generate() -> Result<(), Error> {
    let patterns = instructions::patterns()?;
    verbose_println!("{} patterns in the specification list", patterns.len());
    let start = Instant::now();
    let table = OpcodeTable::build(&patterns)?;
    info!(
        "{} of {} opcodes implemented ({:.2?})",
        table.count(),
        OPCODE_COUNT,
        start.elapsed()
    );
    if config::ARGS.list {
        for (opcode, entry) in table.iter() {
            println!("{:04x}  {}", opcode, entry.instruction.mnemonic);
        }
    }
    if config::ARGS.stats {
        for (family, count) in table.stats() {
            println!("{:6} {:6}", family, count);
        }
    }
    if let Some(opcode) = config::ARGS.explain {
        explain(&patterns, &table, opcode);
    }
    if config::write() {
        write_artifacts(&table, &config::switch_path(), &config::bitmap_path())?;
    }
    Ok(())
}

fn explain(patterns: &[Pattern], table: &OpcodeTable, opcode: u16) {
    info!("Opcode 0x{:04x} ({:016b})", opcode, opcode);
    let mut matched = false;
    for (p, verdict) in table::explain(patterns, opcode) {
        let verdict = match verdict {
            Ok(()) if !matched => {
                matched = true;
                green!("match").to_string()
            }
            Ok(()) => yellow!("match (shadowed)").to_string(),
            Err(m) => m.to_string(),
        };
        println!("{:6} {}  {}", p.name, p.format.text, verdict);
    }
    match table.get(opcode) {
        Some(entry) => print!("{}", emit::case(opcode, &entry.instruction)),
        None => warn!("0x{:04x} is not implemented", opcode),
    }
}

fn write_artifacts(table: &OpcodeTable, switch: &Path, bitmap: &Path) -> Result<(), Error> {
    let mut file = File::create(switch)?;
    emit::write_dispatch(table, &mut file)?;
    info!("wrote dispatch switch: {}", switch.display());
    file = File::create(bitmap)?;
    emit::write_bitmap(table, &mut file)?;
    info!("wrote opcode bitmap: {}", bitmap.display());
    Ok(())
}
