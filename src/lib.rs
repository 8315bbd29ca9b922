//! rulox is an implementation of the Lox language in Rust.

#![warn(rust_2018_idioms)]

pub mod analizer;
pub mod ast;
pub mod lexer;
pub mod runtime;

use log::debug;

use crate::analizer::resolver::Resolver;
use crate::ast::PrettyPrint;
use crate::lexer::{parser::Parser, scanner::Scanner};
use crate::runtime::Interpreter;

use std::fs;
use std::io::{self, BufRead, BufWriter, Write};

pub const EXIT_OK: i32 = 0;
/// Exit code for scan, parse and resolve errors
pub const EXIT_DATAERR: i32 = 65;
/// Exit code for runtime errors
pub const EXIT_SOFTWARE: i32 = 70;

// ***** cli / arg parse *****

#[derive(Default)]
pub struct RunContext {
    /// If true, tokens and AST are printed
    pub is_debug: bool,
    pub is_repl: bool,
}

#[derive(Default)]
pub struct Cli {
    pub cx: RunContext,
    pub run_file: Option<String>,
}

impl Cli {
    /// Returns the process exit code
    pub fn run(&self) -> i32 {
        if let Some(file) = self.run_file.as_ref() {
            self::run_file(file, &self.cx)
        } else {
            self::run_repl(&self.cx);
            EXIT_OK
        }
    }
}

pub fn parse_args() -> Cli {
    let mut cli = Cli::default();

    let args: Vec<String> = ::std::env::args().collect();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "-d" | "--debug" => cli.cx.is_debug = true,
            arg => {
                if cli.run_file.is_none() {
                    cli.run_file = Some(arg.to_string());
                } else {
                    eprintln!("Given more than one argument");
                    ::std::process::exit(1);
                }
            }
        }
    }

    cli.cx.is_repl = cli.run_file.is_none();
    cli
}

// ***** run file *****

pub fn run_file(path: &str, cx: &RunContext) -> i32 {
    use anyhow::Context;
    let source = match fs::read_to_string(path).with_context(|| format!("failed to read `{}`", path))
    {
        Err(why) => {
            eprintln!("{:#}", why);
            return 1;
        }
        Ok(s) => s,
    };
    let mut interpreter = Interpreter::new();
    match self::run_string(&source, cx, &mut interpreter) {
        None => EXIT_DATAERR,
        Some(Err(_)) => EXIT_SOFTWARE,
        Some(Ok(())) => EXIT_OK,
    }
}

/// Runs the full pipeline over a source string
///
/// Returns `None` when scanning, parsing or resolving failed (nothing is
/// executed then); otherwise the result of interpretation.
pub fn run_string(
    source: &str,
    cx: &RunContext,
    interpreter: &mut Interpreter,
) -> Option<runtime::Result<()>> {
    // scanning
    let (tokens, scan_errors) = Scanner::new(source).scan();
    if cx.is_debug {
        self::print_all_debug(&tokens, "====== tokens =====");
    }
    if scan_errors.len() > 0 {
        self::print_all_debug(&scan_errors, "====== scan errors =====");
        return None;
    }

    // parsing
    let (stmts, parse_errors) = Parser::new(&tokens).parse();
    if cx.is_debug {
        self::print_all_display(
            stmts
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{} {}", i, s.pretty_print())),
            "===== AST =====",
        );
    }
    if parse_errors.len() > 0 {
        self::print_all_display(parse_errors.iter(), "===== parse errors =====");
        return None;
    }

    // analizing
    {
        let mut resolver = Resolver::new(&mut interpreter.caches);
        if let Err(why) = resolver.resolve_stmts(&stmts) {
            eprintln!("{}", why);
            return None;
        }
    }
    debug!("resolved {} variable uses", interpreter.caches.len());

    // interpretation
    let result = interpreter.execute(&stmts);
    if let Err(ref why) = result {
        eprintln!("{}", why);
    }
    Some(result)
}

fn print_all_debug<T, U>(items: U, header: &str)
where
    T: ::std::fmt::Debug,
    U: IntoIterator<Item = T>,
{
    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    writeln!(out, "{}", header).unwrap();

    for i in items {
        writeln!(out, "{:?}", i).unwrap();
    }
    writeln!(out).unwrap();
}

fn print_all_display<T, U>(items: U, header: &str)
where
    T: ::std::fmt::Display,
    U: IntoIterator<Item = T>,
{
    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    writeln!(out, "{}", header).unwrap();

    for i in items {
        writeln!(out, "{}", i).unwrap();
    }
    writeln!(out).unwrap();
}

// ********** REPL **********

pub fn run_repl(cx: &RunContext) {
    println!("Entered rulox REPL (press q<Enter> or Ctrl-c to quit)");
    let prompt_str = "> ";

    let mut line = String::new();
    let out = io::stdout();
    let mut out = BufWriter::new(out.lock());
    let handle = io::stdin();
    let mut handle = handle.lock();

    let mut interpreter = Interpreter::new();
    loop {
        print!("{}", prompt_str);
        out.flush().expect("error when flushing stdout");
        line.clear();
        handle
            .read_line(&mut line)
            .expect("error when reading stdin");
        match line.trim_end() {
            "q" | "quit" => {
                break;
            }
            line => {
                // errors were already reported; the REPL just goes on
                let _ = self::run_string(line, cx, &mut interpreter);
            }
        }
    }
}
