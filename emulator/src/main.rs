mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use session::Session;

fn main() -> io::Result<()> {
    let time_scale = parse_time_scale().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: interlock-emulator [--time-scale <n>]");
        process::exit(2);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new(time_scale)?;
    let mut line = String::new();

    writeln!(
        writer,
        "Interlock Tester Emulator ready (time x{time_scale}). Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_time_scale() -> Result<u32, String> {
    let mut args = env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(1);
    };

    let value = if let Some(value) = arg.strip_prefix("--time-scale=") {
        value.to_string()
    } else if arg == "--time-scale" {
        args.next()
            .ok_or_else(|| "Expected value after --time-scale".to_string())?
    } else {
        return Err(format!("Unknown argument `{arg}`"));
    };

    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument `{extra}`"));
    }

    match value.parse::<u32>() {
        Ok(scale) if scale > 0 => Ok(scale),
        _ => Err(format!("Invalid time scale `{value}`")),
    }
}
