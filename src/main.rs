use std::env;
use std::fs;
use std::process;

use log::{debug, error, info, warn};

use huffman_codebook::{FrequencyTable, HuffmanCode, Symbol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Char,
    Byte,
}

struct Options {
    input_filepath: String,
    unit: Unit,
    show_tree: bool,
}

fn parse_args(args: &[String]) -> Option<Options> {
    let input_filepath = args.get(1)?.clone();
    let mut unit = Unit::Char;
    let mut show_tree = false;

    for arg in &args[2..] {
        if let Some(value) = arg.strip_prefix("--unit=") {
            match value {
                "char" => unit = Unit::Char,
                "byte" => unit = Unit::Byte,
                other => warn!("Unknown unit '{}', keeping {:?}", other, unit),
            }
        } else if arg == "--show-tree" {
            show_tree = true;
        } else {
            warn!("Ignoring unrecognised argument '{}'", arg);
        }
    }

    Some(Options {
        input_filepath,
        unit,
        show_tree,
    })
}

fn report<S: Symbol>(symbols: &[S], show_tree: bool) -> huffman_codebook::Result<()> {
    let freq = FrequencyTable::from_symbols(symbols.iter().cloned());
    let code = HuffmanCode::from_frequencies(&freq)?;

    if show_tree {
        println!("{}", code.tree());
    }

    println!("{:<12} {:>10}  code", "symbol", "count");
    for (symbol, bits) in code.codes().iter() {
        println!(
            "{:<12} {:>10}  {}",
            format!("{:?}", symbol),
            freq.get(symbol).unwrap_or(0),
            bits
        );
    }

    let bits = code.encode(symbols)?;
    let decoded = code.decode(&bits)?;
    if decoded != symbols {
        error!("Round trip produced different symbols!");
        process::exit(1);
    }
    debug!("Round trip verified over {} symbols", decoded.len());

    println!(
        "\nSymbols:     {} ({} unique)\n\
         Encoded:     {} bits\n\
         Entropy:     {:.4} bits/symbol\n\
         Average:     {:.4} bits/symbol\n\
         Weighted:    {} (weighted path length)",
        symbols.len(),
        freq.len(),
        bits.len(),
        freq.entropy(),
        code.codes().average_code_length(&freq),
        code.codes()
            .weighted_path_length(&freq)
            .map_or_else(|| "exceeds u64".to_string(), |wpl| wpl.to_string())
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(options) = parse_args(&args) else {
        error!(
            "Usage: {} <input_file> [--unit=char|byte] [--show-tree]",
            args.first().map_or("huffman", String::as_str)
        );
        process::exit(1);
    };

    info!(
        "Reading {} as {:?} symbols",
        options.input_filepath, options.unit
    );
    let raw_data = match fs::read(&options.input_filepath) {
        Ok(data) => data,
        Err(e) => {
            error!("Failed to read {}: {}", options.input_filepath, e);
            process::exit(1);
        }
    };

    let result = match options.unit {
        Unit::Byte => report(&raw_data, options.show_tree),
        Unit::Char => match String::from_utf8(raw_data) {
            Ok(text) => {
                let chars: Vec<char> = text.chars().collect();
                report(&chars, options.show_tree)
            }
            Err(e) => {
                error!("Input is not valid UTF-8 ({}); try --unit=byte", e);
                process::exit(1);
            }
        },
    };

    if let Err(e) = result {
        error!("Could not build code: {}", e);
        process::exit(1);
    }
}
