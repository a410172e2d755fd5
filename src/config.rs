use clap::Parser;
use clap_num::maybe_hex;
use lazy_static::lazy_static;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Directory receiving the generated files
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Name of the generated dispatch switch
    #[arg(long, default_value = "instructions_switch.gen")]
    pub switch_file: String,

    /// Name of the generated implemented-opcode bitmap
    #[arg(long, default_value = "instructions_generated.gen")]
    pub bitmap_file: String,

    /// Build the opcode table but don't write anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print every implemented opcode with its mnemonic
    #[arg(short, long)]
    pub list: bool,

    /// Print the number of implemented opcodes per instruction family
    #[arg(short, long)]
    pub stats: bool,

    /// Show how each pattern treats one opcode (hex ok with '0x')
    #[arg(short, long, value_parser=maybe_hex::<u16>)]
    pub explain: Option<u16>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test", "--dry-run"])
    } else {
        Args::parse()
    };
}

pub fn switch_path() -> PathBuf { ARGS.out_dir.join(&ARGS.switch_file) }
pub fn bitmap_path() -> PathBuf { ARGS.out_dir.join(&ARGS.bitmap_file) }
/// `--dry-run` and `--explain` build the table without writing either file.
pub fn write() -> bool { !ARGS.dry_run && ARGS.explain.is_none() }
