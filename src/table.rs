//! The opcode table: every 16-bit opcode run through the ordered pattern list.
use super::instructions::Instruction;
use super::ir::Temps;
use super::pattern::Pattern;
use super::*;
use std::collections::BTreeMap;

pub const OPCODE_COUNT: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// name of the pattern that matched
    pub family: &'static str,
    pub instruction: Instruction,
}

pub struct OpcodeTable {
    entries: Vec<Option<Entry>>,
}
impl OpcodeTable {
    /// Scan 0..=0xFFFF. The first matching pattern generates the entry; opcodes
    /// nothing matches stay absent. Generator errors abort the whole build.
    pub fn build(patterns: &[Pattern]) -> Result<OpcodeTable, Error> {
        let mut temps = Temps::new();
        let mut entries = Vec::with_capacity(OPCODE_COUNT);
        for opcode in 0..=u16::MAX {
            let entry = match patterns.iter().find(|p| p.matches(opcode)) {
                Some(p) => Some(Entry {
                    family: p.name,
                    instruction: (p.generator)(opcode, &mut temps).map_err(|e| e.with_opcode(opcode))?,
                }),
                None => None,
            };
            entries.push(entry);
        }
        verbose_println!("scanned {} opcodes against {} patterns", OPCODE_COUNT, patterns.len());
        Ok(OpcodeTable { entries })
    }
    pub fn get(&self, opcode: u16) -> Option<&Entry> { self.entries[opcode as usize].as_ref() }
    /// Present entries in ascending opcode order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(op, e)| e.as_ref().map(|e| (op as u16, e)))
    }
    /// One flag per opcode, true where an entry exists.
    pub fn implemented(&self) -> Vec<bool> { self.entries.iter().map(Option::is_some).collect() }
    pub fn count(&self) -> usize { self.iter().count() }
    /// Implemented opcodes per family, sorted by family name.
    pub fn stats(&self) -> BTreeMap<&'static str, usize> {
        let mut stats = BTreeMap::new();
        for (_, entry) in self.iter() {
            *stats.entry(entry.family).or_insert(0) += 1;
        }
        stats
    }
}

/// Every pattern's verdict on one opcode, in list order.
pub fn explain(patterns: &[Pattern], opcode: u16) -> Vec<(&Pattern, Result<(), Mismatch>)> {
    patterns.iter().map(|p| (p, p.check(opcode))).collect()
}
