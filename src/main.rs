use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::error::ErrorKind;
use clap::Parser as ArgParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use plox::error::{Error, Reporter};
use plox::interpreter::Interpreter;
use plox::parser::Parser;
use plox::resolver::Resolver;
use plox::scanner::Scanner;
use plox::syntax::Stmt;

/// Tree-walking interpreter for the Lox scripting language.
#[derive(ArgParser, Debug)]
#[command(name = "plox", version)]
#[command(about = "Run a Lox script, or start an interactive prompt when no script is given")]
struct CliArgs {
    /// Lox script to execute; omit to start the prompt
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,
}

struct Lox {
    interpreter: Interpreter,
    reporter: Reporter,
    // high-water mark for parser node ids, so every prompt line keeps its
    // own entries in the resolver side table
    next_node_id: usize,
}

impl Lox {
    fn new() -> Self {
        Lox {
            interpreter: Interpreter::new(),
            reporter: Reporter::new(),
            next_node_id: 0,
        }
    }

    fn run_file(&mut self, path: &Path) {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("problem accessing {}: {error}", path.display());
                exit(66);
            }
        };

        self.run(&source, false);
        if self.reporter.had_error || self.reporter.had_runtime_error {
            exit(65);
        }
    }

    fn run_prompt(&mut self) -> Result<(), ReadlineError> {
        let mut editor = DefaultEditor::new()?;

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    let mut line = line.trim_end().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    if !line.ends_with(';') {
                        line.push(';');
                    }
                    self.run(&line, true);
                    // one bad line must not poison the next one
                    self.reporter.reset();
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("k thx byeee");
                    return Ok(());
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn run(&mut self, source: &str, show_expression_values: bool) {
        let tokens = Scanner::new(source, &mut self.reporter).scan_tokens();

        let mut parser = Parser::new(&tokens, self.next_node_id, &mut self.reporter);
        let statements = parser.parse();
        self.next_node_id = parser.next_node_id();
        if self.reporter.had_error {
            return;
        }

        // The syntax is clean, so the resolver gets to poke scope depths
        // into the interpreter. Execution is skipped if it found semantic
        // errors.
        Resolver::new(&mut self.interpreter, &mut self.reporter).resolve(&statements);
        if self.reporter.had_error {
            return;
        }

        // Desk-calculator mode: a lone expression at the prompt echoes its
        // value instead of being executed for effect.
        let result = match &statements[..] {
            [Stmt::Expression { expression }] if show_expression_values => self
                .interpreter
                .interpret_expression(expression)
                .map(|value| println!("{value}")),
            _ => self.interpreter.interpret(&statements),
        };

        match result {
            Ok(()) => {}
            Err(Error::Runtime { token, message }) => {
                self.reporter.runtime_error(&token, &message);
            }
            Err(_) => unreachable!("return and break cannot unwind past the resolver's checks"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(error)
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            error.print()?;
            return Ok(());
        }
        Err(_) => {
            eprintln!("Usage: plox [script]");
            exit(64);
        }
    };

    let mut lox = Lox::new();
    match args.script {
        Some(script) => lox.run_file(&script),
        None => lox.run_prompt()?,
    }
    Ok(())
}
