//! ctext - render catalog strings as styled terminal text

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use composite_text::config::Config;
use composite_text::render::{terminal, Styled};
use composite_text::{Catalog, FormatArg, Result, Text, TextError};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    catalog: Option<PathBuf>,
    config: Option<PathBuf>,
    count: Option<i64>,
    plain: bool,
    ranges: bool,
    key: Option<String>,
    args: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if options.key.is_some() {
            options.args.push(arg);
            continue;
        }
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--catalog" => options.catalog = Some(PathBuf::from(value_of(&arg, args.next())?)),
            "--config" => options.config = Some(PathBuf::from(value_of(&arg, args.next())?)),
            "--count" => {
                let value = value_of(&arg, args.next())?;
                let count = value
                    .parse()
                    .map_err(|_| TextError::Message(format!("invalid count: {value}")))?;
                options.count = Some(count);
            }
            "--plain" => options.plain = true,
            "--ranges" => options.ranges = true,
            _ if arg.starts_with('-') => {
                return Err(TextError::Message(format!("unknown option: {arg}")));
            }
            _ => options.key = Some(arg),
        }
    }
    Ok(Some(options))
}

/// Format arguments: the plural count first, then the positional ARGs
fn format_args(options: &Options) -> Vec<FormatArg> {
    options
        .count
        .map(FormatArg::from)
        .into_iter()
        .chain(options.args.iter().map(|arg| FormatArg::from(arg.as_str())))
        .collect()
}

fn value_of(option: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| TextError::Message(format!("{option} needs a value")))
}

fn run() -> Result<()> {
    let Some(options) = parse_args(env::args().skip(1))? else {
        return Ok(());
    };
    let Some(key) = options.key.clone() else {
        print_usage();
        return Err(TextError::Message("no string key given".to_string()));
    };

    let config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let catalog_path = options
        .catalog
        .clone()
        .or_else(|| config.catalog.clone())
        .ok_or_else(|| TextError::Message("no catalog given (use --catalog)".to_string()))?;
    let catalog = Catalog::load(&catalog_path)?;

    let text = match options.count {
        Some(count) => Text::plural(key, count),
        None => Text::reference(key),
    };
    let text = text.format_string(format_args(&options));
    let rendered = text.render(&catalog)?;
    let ranges = rendered.ranges.clone();

    if options.plain {
        println!("{}", rendered.text);
    } else {
        let mut resolver = terminal::default_resolver::<()>();
        config.register_aliases(resolver.strings_mut());
        let styled = Styled::new(rendered, &(), &resolver);
        let mut stdout = io::stdout();
        terminal::write_styled(&mut stdout, &styled)?;
        println!();
    }

    if options.ranges {
        for range in &ranges {
            println!("{}..={} {:?}", range.start, range.end, range.style);
        }
    }

    Ok(())
}

fn print_usage() {
    println!("ctext {} - render catalog strings as styled text", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: ctext [OPTIONS] KEY [ARG...]");
    println!();
    println!("Options:");
    println!("  --catalog PATH  String catalog (TOML)");
    println!("  --config PATH   Config file (default ~/.ctext.toml)");
    println!("  --count N       Render KEY as a plural for quantity N (N fills the first placeholder)");
    println!("  --plain         Print the flattened string without styles");
    println!("  --ranges        List the collected style ranges");
    println!("  -h, --help      Show this help message");
    println!("  -V, --version   Show version information");
    println!();
    println!("Arguments fill the %s/%d placeholders of the string in order.");
}

fn print_version() {
    println!("ctext {}", env!("CARGO_PKG_VERSION"));
}
