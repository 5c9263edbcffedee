use super::span::CodePosition;
use super::token::Token;

use std::fmt;

/// Every way a parse/evaluate pass can fail. All variants are fatal to the
/// pass; nothing downgrades to a warning or recovers.
#[derive(Debug, PartialEq, Clone)]
pub enum InterpreterError {
    // Scanning. End of input is Ok(None) from the scanner, never an error,
    // so malformed trailing input can no longer masquerade as end-of-program.
    UnrecognizedChar(char, CodePosition),
    UnterminatedString(CodePosition),
    UnterminatedComment(CodePosition),

    // Syntax.
    UnexpectedEndOfInput,
    ExpectedToken(Token, CodePosition, Token),
    ExpectedValue(CodePosition, Token),
    ExpectedStatement(CodePosition, Token),
    ExpectedIdentifier(CodePosition, Token),

    // Names.
    UndeclaredName(String),
    Redeclaration(String),
    NotAFunction(String),
    NotABinding(String),

    // Types.
    AssignmentTypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    ArityMismatch {
        callee: String,
        expected: usize,
        actual: usize,
    },
    ArgumentTypeMismatch {
        callee: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },
    ConditionNotBoolean(&'static str),

    // Method dispatch.
    UnknownMethod {
        type_name: &'static str,
        method: String,
    },
    StaticMethodOnInstance {
        type_name: &'static str,
        method: String,
    },
    InstanceMethodOnType {
        type_name: &'static str,
        method: String,
    },

    // Host runtime.
    Io(String),
    OutOfInput,
}

pub type InterpretResult<T> = Result<T, InterpreterError>;

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InterpreterError::UnrecognizedChar(ch, pos) => {
                write!(f, "Unrecognized character `{}` at {}.", ch, pos)
            }
            InterpreterError::UnterminatedString(pos) => {
                write!(f, "Unterminated string starting at {}.", pos)
            }
            InterpreterError::UnterminatedComment(pos) => {
                write!(f, "Unterminated comment starting at {}.", pos)
            }
            InterpreterError::UnexpectedEndOfInput => {
                write!(f, "Unexpected end of input.")
            }
            InterpreterError::ExpectedToken(expected, pos, got) => {
                write!(f, "Expected {} at {}, but instead got {}.", expected, pos, got)
            }
            InterpreterError::ExpectedValue(pos, got) => {
                write!(f, "Expected a value at {}, but instead got {}.", pos, got)
            }
            InterpreterError::ExpectedStatement(pos, got) => {
                write!(f, "Expected a statement at {}, but instead got {}.", pos, got)
            }
            InterpreterError::ExpectedIdentifier(pos, got) => {
                write!(f, "Expected an identifier at {}, but instead got {}.", pos, got)
            }
            InterpreterError::UndeclaredName(name) => {
                write!(f, "Name `{}` is not declared.", name)
            }
            InterpreterError::Redeclaration(name) => {
                write!(f, "Name `{}` is already declared.", name)
            }
            InterpreterError::NotAFunction(name) => {
                write!(f, "Name `{}` is not a function.", name)
            }
            InterpreterError::NotABinding(name) => {
                write!(f, "Name `{}` is not a binding.", name)
            }
            InterpreterError::AssignmentTypeMismatch {
                name,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Cannot assign {} value to `{}` declared as {}.",
                    actual, name, expected
                )
            }
            InterpreterError::ArityMismatch {
                callee,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "`{}` takes {} argument(s), but got {}.",
                    callee, expected, actual
                )
            }
            InterpreterError::ArgumentTypeMismatch {
                callee,
                index,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Argument {} of `{}` must be {}, but got {}.",
                    index + 1,
                    callee,
                    expected,
                    actual
                )
            }
            InterpreterError::ConditionNotBoolean(actual) => {
                write!(f, "Condition must be boolean, but got {}.", actual)
            }
            InterpreterError::UnknownMethod { type_name, method } => {
                write!(f, "Type {} has no method `{}`.", type_name, method)
            }
            InterpreterError::StaticMethodOnInstance { type_name, method } => {
                write!(
                    f,
                    "Static method `{}` of {} cannot be called on an instance.",
                    method, type_name
                )
            }
            InterpreterError::InstanceMethodOnType { type_name, method } => {
                write!(
                    f,
                    "Instance method `{}` of {} cannot be called on the type itself.",
                    method, type_name
                )
            }
            InterpreterError::Io(message) => {
                write!(f, "Host I/O failed: {}.", message)
            }
            InterpreterError::OutOfInput => {
                write!(f, "No input left for readln.")
            }
        }
    }
}
