pub mod builtins;
pub mod cursor;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod runtime;
pub mod scanner;
pub mod span;
pub mod token;
pub mod types;
pub mod value;

pub use errors::{InterpretResult, InterpreterError};
pub use interpreter::{interpret, Interpreter};
pub use runtime::{BufferedRuntime, HostRuntime, StdioRuntime};
pub use scanner::Scanner;
