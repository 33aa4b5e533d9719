use anyhow::Error;
use clap::Parser;
use deskcalc::{Calculator, ErrorStyle, Tokenizer};
use std::io::BufRead;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Desk calculator driven by key sequences.
///
/// Keys: digits, `.`, `+ - * /` (or `× ÷ x`), `%`, `=` or `enter`,
/// `d` or `backspace`, `c` or `esc`, `n` or `neg` to flip the sign.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Options {
    /// Keys to press. Without keys every stdin line is a key sequence.
    keys: Vec<String>,

    /// How failed evaluations are shown
    #[arg(long, value_enum, default_value_t = ErrorStyle::Specific)]
    errors: ErrorStyle,

    /// Print the display after every key
    #[arg(short, long)]
    steps: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Options::parse()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<(), Error> {
    let mut tokenizer = Tokenizer::default();
    let mut calculator = Calculator::with_error_style(options.errors);

    let stdout = std::io::stdout();
    let lock = stdout.lock();
    let mut w = std::io::BufWriter::new(lock);

    if !options.keys.is_empty() {
        let keys = options.keys.join(" ");
        feed(&keys, &mut tokenizer, &mut calculator, options.steps, &mut w)?;
    } else {
        let stdin = std::io::stdin();
        let reader = std::io::BufReader::new(stdin);
        let is_interactive = atty::is(atty::Stream::Stdin);

        if is_interactive {
            write!(&mut w, ">>> ")?;
            w.flush()?;
        }

        for line in reader.lines() {
            let line = line?;
            if let Err(e) = feed(&line, &mut tokenizer, &mut calculator, options.steps, &mut w) {
                if !is_interactive {
                    return Err(e);
                }
                tokenizer.reset();
                writeln!(&mut w, "{}", e)?;
            }

            if is_interactive {
                write!(&mut w, ">>> ")?;
                w.flush()?;
            }
        }
    }
    w.flush()?;

    Ok(())
}

/// Presses every key in `keys`, printing the display after each token when
/// `steps` is set and once at the end otherwise.
fn feed(
    keys: &str,
    tokenizer: &mut Tokenizer,
    calculator: &mut Calculator,
    steps: bool,
    w: &mut impl Write,
) -> Result<(), Error> {
    for char in keys.chars() {
        if let Some(token) = tokenizer.update(char)? {
            let display = calculator.handle_token(token);
            if steps {
                writeln!(w, "{}", display)?;
            }
        }
    }

    if let Some(token) = tokenizer.finalize()? {
        let display = calculator.handle_token(token);
        if steps {
            writeln!(w, "{}", display)?;
        }
    }
    if !steps {
        writeln!(w, "{}", calculator.display())?;
    }
    Ok(())
}
