//! Post-processing sandbox.
//!
//! Runs stored post-process function sources against extracted text. The
//! language is a small restricted statement language — assignments,
//! `print`, string expressions, string methods, and calls into the builtin
//! library — with no imports, no I/O, and no loops. Sources are scanned
//! against a denylist and fully parsed before anything executes.
//!
//! The caller binds the extracted text to `input_text` and reads the
//! processed value back from `result`. Each invocation gets a fresh
//! namespace and its own captured-output buffer, so concurrent invocations
//! cannot observe each other.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::functions;

/// Source patterns rejected before parsing.
const DENYLIST: &[&str] = &["import os", "import sys", "open(", "__import__"];

/// Sandbox validation or execution failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SandboxError {
    /// The source contains a denylisted pattern.
    #[error("forbidden pattern in source: {0}")]
    Denylist(String),

    /// The source failed to parse.
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// A statement failed during evaluation.
    #[error("runtime error at line {line}: {message}")]
    Runtime { line: usize, message: String },
}

/// Result of one sandbox invocation. Failures are data, never panics.
#[derive(Debug, Clone, PartialEq)]
pub struct SandboxOutcome {
    pub success: bool,
    /// Value of `result` after execution, when set.
    pub result: Option<String>,
    /// Text captured from `print` calls.
    pub output: String,
    pub error: Option<String>,
    /// The statement that failed, for diagnostics.
    pub trace: Option<String>,
}

/// Denylist scan, then a full parse.
fn compile(source: &str) -> Result<Vec<Stmt>, SandboxError> {
    for pattern in DENYLIST {
        if source.contains(pattern) {
            return Err(SandboxError::Denylist(pattern.to_string()));
        }
    }
    parse(&tokenize(source)?)
}

/// Check a source without executing it.
pub fn validate(source: &str) -> Result<(), SandboxError> {
    compile(source).map(|_| ())
}

/// Execute a source against an input value.
///
/// Validation failures and runtime errors both come back as a failed
/// outcome; this function never returns `Err` to the extraction flow.
pub fn execute(source: &str, input: &str) -> SandboxOutcome {
    let program = match compile(source) {
        Ok(program) => program,
        Err(e) => {
            debug!(error = %e, "sandbox source rejected");
            return SandboxOutcome {
                success: false,
                result: None,
                output: String::new(),
                error: Some(e.to_string()),
                trace: None,
            };
        }
    };

    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("input_text".to_string(), input.to_string());
    let mut output = String::new();

    for stmt in &program {
        if let Err(e) = exec_stmt(stmt, &mut env, &mut output) {
            debug!(error = %e, "sandbox execution failed");
            return SandboxOutcome {
                success: false,
                result: env.get("result").cloned(),
                output,
                error: Some(e.to_string()),
                trace: Some(format!("line {}", stmt.line)),
            };
        }
    }

    SandboxOutcome {
        success: true,
        result: env.get("result").cloned(),
        output,
        error: None,
        trace: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Plus,
    Equals,
    Dot,
    LParen,
    RParen,
    Comma,
    Newline,
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    line: usize,
}

fn tokenize(source: &str) -> Result<Vec<Spanned>, SandboxError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Newline,
                    line,
                });
                line += 1;
            }
            ' ' | '\t' | '\r' => {
                chars.next();
            }
            '#' => {
                // Comment to end of line.
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '+' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Plus,
                    line,
                });
            }
            '=' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Equals,
                    line,
                });
            }
            '.' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Dot,
                    line,
                });
            }
            '(' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::LParen,
                    line,
                });
            }
            ')' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::RParen,
                    line,
                });
            }
            ',' => {
                chars.next();
                tokens.push(Spanned {
                    token: Token::Comma,
                    line,
                });
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some('\\') => value.push('\\'),
                            Some(c) if c == quote => value.push(c),
                            Some(c) => {
                                return Err(SandboxError::Syntax {
                                    line,
                                    message: format!("unknown escape: \\{c}"),
                                });
                            }
                            None => {
                                return Err(SandboxError::Syntax {
                                    line,
                                    message: "unterminated string".to_string(),
                                });
                            }
                        },
                        Some(c) if c == quote => break,
                        Some('\n') | None => {
                            return Err(SandboxError::Syntax {
                                line,
                                message: "unterminated string".to_string(),
                            });
                        }
                        Some(c) => value.push(c),
                    }
                }
                tokens.push(Spanned {
                    token: Token::Str(value),
                    line,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Spanned {
                    token: Token::Ident(ident),
                    line,
                });
            }
            c => {
                return Err(SandboxError::Syntax {
                    line,
                    message: format!("unexpected character: {c}"),
                });
            }
        }
    }
    Ok(tokens)
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Str(String),
    Var(String),
    Concat(Box<Expr>, Box<Expr>),
    Call { name: String, args: Vec<Expr> },
    Method { recv: Box<Expr>, name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
enum StmtKind {
    Assign { name: String, expr: Expr },
    Print(Expr),
}

#[derive(Debug, Clone, PartialEq)]
struct Stmt {
    kind: StmtKind,
    line: usize,
}

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |s| s.line)
    }

    fn next(&mut self) -> Option<&Spanned> {
        let s = self.tokens.get(self.pos);
        if s.is_some() {
            self.pos += 1;
        }
        s
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), SandboxError> {
        let line = self.line();
        match self.next() {
            Some(s) if &s.token == expected => Ok(()),
            _ => Err(SandboxError::Syntax {
                line,
                message: format!("expected {what}"),
            }),
        }
    }

    fn parse_program(&mut self) -> Result<Vec<Stmt>, SandboxError> {
        let mut stmts = Vec::new();
        while self.peek().is_some() {
            if self.peek() == Some(&Token::Newline) {
                self.next();
                continue;
            }
            stmts.push(self.parse_stmt()?);
            match self.peek() {
                Some(Token::Newline) => {
                    self.next();
                }
                None => {}
                _ => {
                    return Err(SandboxError::Syntax {
                        line: self.line(),
                        message: "expected end of statement".to_string(),
                    });
                }
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SandboxError> {
        let line = self.line();
        let name = match self.next() {
            Some(Spanned {
                token: Token::Ident(name),
                ..
            }) => name.clone(),
            _ => {
                return Err(SandboxError::Syntax {
                    line,
                    message: "expected assignment or print".to_string(),
                });
            }
        };

        if name == "print" && self.peek() == Some(&Token::LParen) {
            self.next();
            let expr = self.parse_expr()?;
            self.expect(&Token::RParen, "closing parenthesis")?;
            return Ok(Stmt {
                kind: StmtKind::Print(expr),
                line,
            });
        }

        self.expect(&Token::Equals, "'=' after identifier")?;
        let expr = self.parse_expr()?;
        Ok(Stmt {
            kind: StmtKind::Assign { name, expr },
            line,
        })
    }

    fn parse_expr(&mut self) -> Result<Expr, SandboxError> {
        let mut expr = self.parse_postfix()?;
        while self.peek() == Some(&Token::Plus) {
            self.next();
            let rhs = self.parse_postfix()?;
            expr = Expr::Concat(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<Expr, SandboxError> {
        let mut expr = self.parse_atom()?;
        while self.peek() == Some(&Token::Dot) {
            self.next();
            let line = self.line();
            let name = match self.next() {
                Some(Spanned {
                    token: Token::Ident(name),
                    ..
                }) => name.clone(),
                _ => {
                    return Err(SandboxError::Syntax {
                        line,
                        message: "expected method name after '.'".to_string(),
                    });
                }
            };
            self.expect(&Token::LParen, "'(' after method name")?;
            let args = self.parse_args()?;
            expr = Expr::Method {
                recv: Box::new(expr),
                name,
                args,
            };
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr, SandboxError> {
        let line = self.line();
        match self.next().cloned() {
            Some(Spanned {
                token: Token::Str(value),
                ..
            }) => Ok(Expr::Str(value)),
            Some(Spanned {
                token: Token::Ident(name),
                ..
            }) => {
                if self.peek() == Some(&Token::LParen) {
                    self.next();
                    let args = self.parse_args()?;
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            _ => Err(SandboxError::Syntax {
                line,
                message: "expected expression".to_string(),
            }),
        }
    }

    /// Parse a comma-separated argument list, consuming the closing paren.
    fn parse_args(&mut self) -> Result<Vec<Expr>, SandboxError> {
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.next();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            match self.peek() {
                Some(Token::Comma) => {
                    self.next();
                }
                Some(Token::RParen) => {
                    self.next();
                    return Ok(args);
                }
                _ => {
                    return Err(SandboxError::Syntax {
                        line: self.line(),
                        message: "expected ',' or ')' in argument list".to_string(),
                    });
                }
            }
        }
    }
}

fn parse(tokens: &[Spanned]) -> Result<Vec<Stmt>, SandboxError> {
    Parser { tokens, pos: 0 }.parse_program()
}

fn exec_stmt(
    stmt: &Stmt,
    env: &mut HashMap<String, String>,
    output: &mut String,
) -> Result<(), SandboxError> {
    match &stmt.kind {
        StmtKind::Assign { name, expr } => {
            let value = eval(expr, env, stmt.line)?;
            env.insert(name.clone(), value);
        }
        StmtKind::Print(expr) => {
            let value = eval(expr, env, stmt.line)?;
            output.push_str(&value);
            output.push('\n');
        }
    }
    Ok(())
}

fn eval(expr: &Expr, env: &HashMap<String, String>, line: usize) -> Result<String, SandboxError> {
    match expr {
        Expr::Str(value) => Ok(value.clone()),
        Expr::Var(name) => env.get(name).cloned().ok_or_else(|| SandboxError::Runtime {
            line,
            message: format!("undefined variable: {name}"),
        }),
        Expr::Concat(lhs, rhs) => {
            let mut value = eval(lhs, env, line)?;
            value.push_str(&eval(rhs, env, line)?);
            Ok(value)
        }
        Expr::Call { name, args } => {
            let f = functions::builtin(name).ok_or_else(|| SandboxError::Runtime {
                line,
                message: format!("unknown function: {name}"),
            })?;
            if args.len() != 1 {
                return Err(SandboxError::Runtime {
                    line,
                    message: format!("{name} takes exactly one argument"),
                });
            }
            let input = eval(&args[0], env, line)?;
            Ok(f(&input))
        }
        Expr::Method { recv, name, args } => {
            let value = eval(recv, env, line)?;
            let mut arg_values = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(eval(arg, env, line)?);
            }
            eval_method(&value, name, &arg_values, line)
        }
    }
}

fn eval_method(value: &str, name: &str, args: &[String], line: usize) -> Result<String, SandboxError> {
    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(SandboxError::Runtime {
                line,
                message: format!("{name} takes {expected} argument(s), got {}", args.len()),
            })
        }
    };

    match name {
        "upper" => {
            arity(0)?;
            Ok(value.to_uppercase())
        }
        "lower" => {
            arity(0)?;
            Ok(value.to_lowercase())
        }
        "strip" => {
            arity(0)?;
            Ok(value.trim().to_string())
        }
        "title" => {
            arity(0)?;
            Ok(value
                .split_whitespace()
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => {
                            first.to_uppercase().collect::<String>()
                                + &chars.as_str().to_lowercase()
                        }
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "))
        }
        "replace" => {
            arity(2)?;
            Ok(value.replace(&args[0], &args[1]))
        }
        _ => Err(SandboxError::Runtime {
            line,
            message: format!("unknown method: {name}"),
        }),
    }
}
