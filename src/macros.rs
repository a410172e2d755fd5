#![allow(unused_macros, dead_code)]
macro_rules! verbose_println {
    ($($p:expr),+) => {
        if (crate::config::ARGS.verbose) {
            println!($($p),+);
        }
    }
}
macro_rules! info {
    ($($p:expr),+) => {
        println!(concat!(blue!("INFO"),": {}"),format_args!($($p),+))
    }
}

macro_rules! warn {
    ($($p:expr),+) => {
        eprintln!(concat!(red!("WARNING"),": {}"),format_args!($($p),+))
    }
}
macro_rules! general_err {
    ($msg:expr) => {
        crate::Error::new(crate::ErrorKind::General, None, format!("{}", $msg).as_str())
    };
}
macro_rules! token_err {
    ($format:expr, $pos:expr) => {
        crate::Error::new(
            crate::ErrorKind::UnrecognizedToken,
            None,
            format!(
                "{} in \"{}\" at column {}",
                red!("Unrecognized token"),
                $format,
                $pos
            )
            .as_str(),
        )
    };
}
macro_rules! spec_err {
    ($opcode:expr, $($msg:expr),*) => {
        crate::Error::new(
            crate::ErrorKind::Specification,
            $opcode,
            format!("{} {}", red!("Specification Error"), format!($($msg),*)).as_str(),
        )
    };
}
macro_rules! color {
    ($color: literal, $msg: expr) => {
        concat!("\x1b[", $color, "m", $msg, "\x1b[0m")
    };
}
macro_rules! red {
    ($msg:expr) => {
        color!(91, $msg)
    };
}
macro_rules! green {
    ($msg:expr) => {
        color!(92, $msg)
    };
}
macro_rules! yellow {
    ($msg:expr) => {
        color!(93, $msg)
    };
}
macro_rules! blue {
    ($msg:expr) => {
        color!(94, $msg)
    };
}
