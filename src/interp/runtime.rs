use super::errors::{InterpretResult, InterpreterError};

use std::io::{BufRead, Write};

/// The host collaborator the interpreter performs side effects through.
/// `readln` blocks until the host produces a line; timeouts and cancellation
/// are the host's concern, not the interpreter's.
pub trait HostRuntime {
    fn write(&mut self, text: &str) -> InterpretResult<()>;
    fn writeln(&mut self, text: &str) -> InterpretResult<()>;
    fn readln(&mut self) -> InterpretResult<String>;
}

/// Runtime wired to the process stdio, used by the CLI.
pub struct StdioRuntime;

impl HostRuntime for StdioRuntime {
    fn write(&mut self, text: &str) -> InterpretResult<()> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| InterpreterError::Io(e.to_string()))
    }

    fn writeln(&mut self, text: &str) -> InterpretResult<()> {
        self.write(text)?;
        self.write("\n")
    }

    fn readln(&mut self) -> InterpretResult<String> {
        let mut line = String::new();
        let bytes = std::io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| InterpreterError::Io(e.to_string()))?;
        if bytes == 0 {
            return Err(InterpreterError::OutOfInput);
        }
        if line.ends_with('\n') {
            line.pop();
        }
        Ok(line)
    }
}

/// Runtime that captures output in memory and serves `readln` from a
/// preloaded buffer, one line per call. Used by the test harnesses.
pub struct BufferedRuntime {
    output: String,
    input: String,
}

impl BufferedRuntime {
    pub fn new() -> Self {
        BufferedRuntime::with_input("")
    }

    pub fn with_input(input: &str) -> Self {
        BufferedRuntime {
            output: String::new(),
            input: input.to_owned(),
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

impl HostRuntime for BufferedRuntime {
    fn write(&mut self, text: &str) -> InterpretResult<()> {
        self.output.push_str(text);
        Ok(())
    }

    fn writeln(&mut self, text: &str) -> InterpretResult<()> {
        self.output.push_str(text);
        self.output.push('\n');
        Ok(())
    }

    fn readln(&mut self) -> InterpretResult<String> {
        if self.input.is_empty() {
            return Err(InterpreterError::OutOfInput);
        }
        match self.input.find('\n') {
            None => Ok(std::mem::take(&mut self.input)),
            Some(endln) => {
                let line = self.input[..endln].to_owned();
                self.input = self.input[endln + 1..].to_owned();
                Ok(line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_output() {
        let mut runtime = BufferedRuntime::new();
        runtime.write("a").unwrap();
        runtime.writeln("b").unwrap();
        assert_eq!(runtime.output(), "ab\n");
    }

    #[test]
    fn test_buffered_readln_consumes_lines() {
        let mut runtime = BufferedRuntime::with_input("first\nsecond");
        assert_eq!(runtime.readln(), Ok("first".to_owned()));
        assert_eq!(runtime.readln(), Ok("second".to_owned()));
        assert_eq!(runtime.readln(), Err(InterpreterError::OutOfInput));
    }
}
