use std::io::{self, Read, Write};

use anyhow::Context;
use clap::{App, Arg};
use kaleido_front::{
    lexer::{Lexer, Token},
    ASTNode, Parser, PrecedenceTable,
};

struct Options {
    tokens: bool,
    prompt: bool,
}

fn prompt(options: &Options) -> anyhow::Result<()> {
    if options.prompt {
        let mut stderr = io::stderr();
        write!(stderr, "ready> ")?;
        stderr.flush()?;
    }
    Ok(())
}

fn describe(node: &ASTNode) -> &'static str {
    match node {
        ASTNode::Extern(_) => "Parsed an extern.",
        ASTNode::Function(func) if func.prototype.is_anonymous() => "Parsed a top-level expr.",
        ASTNode::Function(_) => "Parsed a function definition.",
    }
}

fn run<I: Iterator<Item = char>>(
    chars: I,
    precedence: &PrecedenceTable,
    options: &Options,
) -> anyhow::Result<()> {
    if options.tokens {
        for (position, token) in Lexer::new(chars) {
            println!("{}\t{}", position, token);
        }
        return Ok(());
    }

    prompt(options)?;
    let mut parser = Parser::new(chars, precedence);

    loop {
        match parser.current() {
            Token::Eof => break,
            Token::Char(';') => parser.skip_token(),
            _ => match parser.parse_top_level() {
                Ok(node) => {
                    println!("{}", describe(&node));
                    println!("{}", node);
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    parser.skip_token();
                }
            },
        }
        prompt(options)?;
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let matches = App::new("kaleido")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(
            Arg::with_name("precedence")
                .short("p")
                .long("precedence")
                .value_name("OP=PREC")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("sets the precedence of a binary operator, 0 disables it"),
        )
        .arg(
            Arg::with_name("tokens")
                .long("tokens")
                .help("prints the token stream instead of parsing"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("does not print the ready> prompt"),
        )
        .arg(
            Arg::with_name("SOURCE")
                .multiple(true)
                .help("source to parse, read from stdin when omitted"),
        )
        .get_matches();

    let mut precedence = PrecedenceTable::seeded();
    for entry in matches.values_of("precedence").into_iter().flatten() {
        precedence
            .apply_override(entry)
            .with_context(|| format!("invalid --precedence {}", entry))?;
    }

    match matches.values_of("SOURCE") {
        Some(words) => {
            let source = words.collect::<Vec<&str>>().join(" ");
            let options = Options {
                tokens: matches.is_present("tokens"),
                prompt: false,
            };
            run(source.chars(), &precedence, &options)
        }
        None => {
            let options = Options {
                tokens: matches.is_present("tokens"),
                prompt: !matches.is_present("quiet"),
            };
            let stdin = io::stdin();
            // bytes are taken as Latin-1, so non-ASCII UTF-8 shows up as one char per byte
            let chars = stdin.lock().bytes().map_while(Result::ok).map(char::from);
            run(chars, &precedence, &options)
        }
    }
}
