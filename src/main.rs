use blang::interp::builtins::global_environment;
use blang::interp::environment::Environment;
use blang::interp::{interpret, Interpreter, InterpreterError, Scanner, StdioRuntime};

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::{fs, io};

#[derive(Parser)]
#[clap(name = "blang", about = "Interpreter for the blang language.")]
struct Cli {
    /// Script to run. Starts an interactive prompt when omitted.
    script: Option<PathBuf>,

    /// Dump the token stream of the script instead of running it.
    #[clap(long, requires = "script")]
    tokenize: bool,
}

fn main() {
    let cli = Cli::parse();

    match cli.script {
        Some(script) => {
            let source = fs::read_to_string(script).expect("Failed to read file.");
            if cli.tokenize {
                tokenize(&source);
            } else {
                run_file(&source);
            }
        }
        None => run_prompt(),
    }
}

fn run_file(source: &str) {
    let mut runtime = StdioRuntime;
    if let Err(e) = interpret(source, &mut runtime) {
        report_error(&e);
    }
}

fn run_prompt() {
    let mut runtime = StdioRuntime;
    let globals = global_environment();
    let top_level = Environment::with_enclosing(&globals);

    loop {
        let mut input = String::new();

        print!("> ");
        io::stdout().flush().unwrap();
        let bytes = io::stdin()
            .read_line(&mut input)
            .expect("Failed to read line.");
        if bytes == 0 {
            break;
        }

        // Each line runs as its own pass against the shared top-level scope.
        let mut interpreter = Interpreter::new(&input, top_level.clone(), &mut runtime);
        if let Err(e) = interpreter.run() {
            report_error(&e);
        }
    }
}

fn tokenize(source: &str) {
    let mut scanner = Scanner::new(source);
    loop {
        match scanner.next_token() {
            Ok(Some(spanned)) => println!("{:?}", spanned.token),
            Ok(None) => break,
            Err(e) => {
                report_error(&e);
                break;
            }
        }
    }
}

fn report_error(error: &InterpreterError) {
    eprintln!("An error: {}", error);
}
