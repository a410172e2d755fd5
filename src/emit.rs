//! Serializes an [OpcodeTable] into the two C artifacts the interpreter includes:
//! the dispatch `switch` and the `generated_instructions` bitmap.
use super::instructions::Instruction;
use super::table::OpcodeTable;
use super::*;
use std::io;

const CASE_INDENT: usize = 4;
const BODY_INDENT: usize = 8;
const BITMAP_PER_LINE: usize = 16;

/// One `case` of the dispatch switch.
pub fn case(opcode: u16, inst: &Instruction) -> String {
    let pad = " ".repeat(CASE_INDENT);
    let mut c = format!("{pad}case 0x{:04x}: /* {} */\n{pad}{{\n", opcode, inst.mnemonic);
    for step in inst.steps() {
        step.render(&mut c, BODY_INDENT);
    }
    c.push_str(&format!("{}return 0;\n{pad}}}\n", " ".repeat(BODY_INDENT)));
    c
}

/// The dispatch artifact: one case per implemented opcode, ascending.
pub fn write_dispatch(table: &OpcodeTable, f: &mut dyn io::Write) -> Result<(), Error> {
    writeln!(f, "switch (opcode)\n{{")?;
    for (opcode, entry) in table.iter() {
        f.write_all(case(opcode, &entry.instruction).as_bytes())?;
    }
    writeln!(f, "}}")?;
    Ok(())
}

/// The bitmap artifact, index = opcode.
pub fn write_bitmap(table: &OpcodeTable, f: &mut dyn io::Write) -> Result<(), Error> {
    writeln!(f, "bool generated_instructions[] = {{")?;
    for row in table.implemented().chunks(BITMAP_PER_LINE) {
        let row: Vec<&str> = row.iter().map(|&b| if b { "true" } else { "false" }).collect();
        writeln!(f, "    {},", row.join(", "))?;
    }
    writeln!(f, "}};")?;
    Ok(())
}

#[cfg(test)]
pub fn dispatch(table: &OpcodeTable) -> Result<String, Error> {
    let mut out = Vec::new();
    write_dispatch(table, &mut out)?;
    String::from_utf8(out).map_err(|e| general_err!(e))
}

#[cfg(test)]
pub fn bitmap(table: &OpcodeTable) -> Result<String, Error> {
    let mut out = Vec::new();
    write_bitmap(table, &mut out)?;
    String::from_utf8(out).map_err(|e| general_err!(e))
}
