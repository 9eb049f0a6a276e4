use std::{env, fs, process};

use cmmc::ir::translate::generate;
use cmmc::lexer::lexer::tokenize;
use cmmc::parser::parser::parse;
use cmmc::semantic::analyzer::analyze;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <source-file>", args[0]);
        process::exit(2);
    }

    let source = match fs::read_to_string(&args[1]) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("{}: {}", args[1], err);
            process::exit(2);
        }
    };

    let tokens = match tokenize(&source) {
        Ok(tokens) => tokens,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let program = match parse(tokens) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let (table, errors) = analyze(&program);
    if !errors.is_empty() {
        for error in &errors {
            println!("{}", error);
        }
        process::exit(1);
    }

    match generate(&program, table) {
        Ok(code) => print!("{}", code),
        Err(err) => {
            eprintln!("Cannot translate: {}", err);
            process::exit(1);
        }
    }
}
