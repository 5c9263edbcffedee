use super::builtins::global_environment;
use super::environment::{Binding, Declaration, Environment};
use super::errors::{InterpretResult, InterpreterError};
use super::runtime::HostRuntime;
use super::scanner::Scanner;
use super::token::{SpannedToken, Token};
use super::types::TypeDescriptor;
use super::value::Value;

use std::rc::Rc;

/// Runs a whole program against a fresh top-level scope whose parent is the
/// builtin registry.
pub fn interpret<R: HostRuntime>(source: &str, runtime: &mut R) -> InterpretResult<()> {
    let globals = global_environment();
    let top_level = Environment::with_enclosing(&globals);
    Interpreter::new(source, top_level, runtime).run()
}

/// Where the interpreter pulls its tokens from: a live scanner over source
/// text, or the buffered tokens of a thunk being replayed.
enum TokenStream<'src> {
    Source(Scanner<'src>),
    Replay(std::vec::IntoIter<SpannedToken>),
}

impl TokenStream<'_> {
    fn next_token(&mut self) -> InterpretResult<Option<SpannedToken>> {
        match self {
            TokenStream::Source(scanner) => scanner.next_token(),
            TokenStream::Replay(tokens) => Ok(tokens.next()),
        }
    }
}

/// Combined parser and evaluator. Holds exactly one token of lookahead and
/// evaluates each statement as parsing completes it; no syntax tree is ever
/// built. Blocks and `else if` guards are buffered into thunks instead and
/// replayed through a nested interpreter only when taken.
pub struct Interpreter<'src, 'rt, R: HostRuntime> {
    tokens: TokenStream<'src>,
    lookahead: Option<SpannedToken>,
    primed: bool,
    env: Environment,
    runtime: &'rt mut R,
}

/// A deferred block body: the buffered tokens between matching braces plus
/// the scope active when the enclosing statement was parsed. Every run forks
/// an independent child scope, so nothing declared inside leaks out.
pub struct BlockThunk {
    tokens: Vec<SpannedToken>,
    env: Environment,
}

impl BlockThunk {
    pub fn run<R: HostRuntime>(&self, runtime: &mut R) -> InterpretResult<()> {
        let scope = Environment::with_enclosing(&self.env);
        Interpreter::replay(self.tokens.clone(), scope, runtime).run()
    }
}

/// A deferred `else if` guard: buffered tokens replayed as a single message
/// evaluation sharing the scope it was parsed in. Guards declare nothing, so
/// no child scope is forked.
pub struct ConditionThunk {
    tokens: Vec<SpannedToken>,
    env: Environment,
}

impl ConditionThunk {
    pub fn eval<R: HostRuntime>(&self, runtime: &mut R) -> InterpretResult<bool> {
        let mut interpreter = Interpreter::replay(self.tokens.clone(), self.env.clone(), runtime);
        let value = interpreter.parse_message()?;
        if let Some(spanned) = interpreter.peek()? {
            return Err(InterpreterError::ExpectedToken(
                Token::LeftBrace,
                spanned.span.start_pos,
                spanned.token.clone(),
            ));
        }
        match value {
            Value::Boolean(b) => Ok(b),
            value => Err(InterpreterError::ConditionNotBoolean(value.type_name())),
        }
    }
}

impl<'src, 'rt, R: HostRuntime> Interpreter<'src, 'rt, R> {
    pub fn new(source: &'src str, env: Environment, runtime: &'rt mut R) -> Self {
        Interpreter {
            tokens: TokenStream::Source(Scanner::new(source)),
            lookahead: None,
            primed: false,
            env,
            runtime,
        }
    }

    fn replay(tokens: Vec<SpannedToken>, env: Environment, runtime: &'rt mut R) -> Self {
        Interpreter {
            tokens: TokenStream::Replay(tokens.into_iter()),
            lookahead: None,
            primed: false,
            env,
            runtime,
        }
    }

    /// Runs the statement loop until the token stream is exhausted.
    pub fn run(&mut self) -> InterpretResult<()> {
        while self.peek()?.is_some() {
            self.parse_statement()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Token plumbing.
    // ------------------------------------------------------------------

    /// Returns the lookahead token without consuming it.
    fn peek(&mut self) -> InterpretResult<Option<&SpannedToken>> {
        if !self.primed {
            self.lookahead = self.tokens.next_token()?;
            self.primed = true;
        }
        Ok(self.lookahead.as_ref())
    }

    /// Returns the lookahead token and pulls the next one.
    fn advance(&mut self) -> InterpretResult<SpannedToken> {
        self.peek()?;
        match self.lookahead.take() {
            Some(spanned) => {
                self.lookahead = self.tokens.next_token()?;
                Ok(spanned)
            }
            None => Err(InterpreterError::UnexpectedEndOfInput),
        }
    }

    /// Consumes a token, asserting that it equals the expected token.
    fn expect(&mut self, expected: Token) -> InterpretResult<()> {
        let (token, span) = self.advance()?.split();
        if token == expected {
            Ok(())
        } else {
            Err(InterpreterError::ExpectedToken(
                expected,
                span.start_pos,
                token,
            ))
        }
    }

    /// Consumes a token, asserting that it is an identifier.
    fn expect_identifier(&mut self) -> InterpretResult<String> {
        let (token, span) = self.advance()?.split();
        match token {
            Token::Identifier(name) => Ok(name),
            other => Err(InterpreterError::ExpectedIdentifier(span.start_pos, other)),
        }
    }

    /// Whether the lookahead token matches the given token.
    fn peek_is(&mut self, target: &Token) -> InterpretResult<bool> {
        Ok(matches!(self.peek()?, Some(spanned) if spanned.token == *target))
    }

    /// Whether the lookahead token is the given bare identifier.
    fn peek_is_word(&mut self, word: &str) -> InterpretResult<bool> {
        Ok(matches!(
            self.peek()?,
            Some(SpannedToken {
                token: Token::Identifier(name),
                ..
            }) if name == word
        ))
    }

    /// Consumes the lookahead token if it matches, reporting whether it did.
    fn check_consume(&mut self, target: &Token) -> InterpretResult<bool> {
        if self.peek_is(target)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    // ------------------------------------------------------------------
    // Statements.
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> InterpretResult<()> {
        let (token, span) = self.advance()?.split();
        let name = match token {
            Token::Identifier(name) => name,
            other => {
                return Err(InterpreterError::ExpectedStatement(span.start_pos, other));
            }
        };

        if name == "let" {
            return self.parse_let();
        }
        if name == "if" {
            return self.parse_conditional();
        }
        if self.peek_is(&Token::Equals)? {
            return self.parse_assignment(name);
        }
        if self.peek_is(&Token::LeftParen)? {
            self.call_function(&name)?;
            return self.expect(Token::Semicolon);
        }

        match self.peek()? {
            Some(spanned) => Err(InterpreterError::ExpectedStatement(
                spanned.span.start_pos,
                spanned.token.clone(),
            )),
            None => Err(InterpreterError::UnexpectedEndOfInput),
        }
    }

    /// `let [mutable] <name> = <message> ;`
    fn parse_let(&mut self) -> InterpretResult<()> {
        let mut name = self.expect_identifier()?;
        let mut mutable = false;

        // `let mutable x = ...;` declares x as mutable, while a plain
        // `let mutable = ...;` declares a binding named `mutable`.
        if name == "mutable" && matches!(self.peek()?, Some(t) if matches!(t.token, Token::Identifier(_)))
        {
            mutable = true;
            name = self.expect_identifier()?;
        }

        self.expect(Token::Equals)?;
        let value = self.parse_message()?;
        self.expect(Token::Semicolon)?;

        if self.env.is_declared(&name) {
            return Err(InterpreterError::Redeclaration(name));
        }

        let binding = Binding {
            type_name: value.type_name(),
            value,
            mutable,
        };
        self.env.define(name, Declaration::Binding(binding));
        Ok(())
    }

    /// `<name> = <message> ;` — the binding must already exist and the new
    /// value must resolve to its declared type.
    fn parse_assignment(&mut self, name: String) -> InterpretResult<()> {
        let declared = match self.env.resolve(&name) {
            Some(Declaration::Binding(binding)) => binding.type_name,
            Some(_) => return Err(InterpreterError::NotABinding(name)),
            None => return Err(InterpreterError::UndeclaredName(name)),
        };

        self.expect(Token::Equals)?;
        let value = self.parse_message()?;
        self.expect(Token::Semicolon)?;

        if value.type_name() != declared {
            return Err(InterpreterError::AssignmentTypeMismatch {
                name,
                expected: declared,
                actual: value.type_name(),
            });
        }
        self.env.assign(&name, value)
    }

    /// `if <message> <block> (else if <cond> <block>)* (else <block>)?`
    ///
    /// Every branch is scanned exactly once, matched or not, but at most one
    /// block thunk is ever run. Errors buried in an untaken branch's tokens
    /// never surface.
    fn parse_conditional(&mut self) -> InterpretResult<()> {
        // The first guard is always reachable, so it evaluates eagerly.
        let guard = self.parse_message()?;
        let mut matched = match guard {
            Value::Boolean(b) => b,
            value => return Err(InterpreterError::ConditionNotBoolean(value.type_name())),
        };

        let block = self.parse_block()?;
        if matched {
            block.run(self.runtime)?;
        }

        while self.peek_is_word("else")? {
            self.advance()?;
            if self.peek_is_word("if")? {
                self.advance()?;
                let condition = self.parse_condition()?;
                let block = self.parse_block()?;
                if !matched && condition.eval(self.runtime)? {
                    block.run(self.runtime)?;
                    matched = true;
                }
            } else {
                let block = self.parse_block()?;
                if !matched {
                    block.run(self.runtime)?;
                }
                break;
            }
        }
        Ok(())
    }

    /// Consumes `{ ... }`, buffering the body verbatim up to the matching
    /// brace. The end of the buffer marks the end of the replayed sequence.
    fn parse_block(&mut self) -> InterpretResult<BlockThunk> {
        self.expect(Token::LeftBrace)?;

        let mut tokens = vec![];
        let mut depth = 1usize;
        loop {
            let spanned = self.advance()?;
            match &spanned.token {
                Token::LeftBrace => depth += 1,
                Token::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            tokens.push(spanned);
        }

        Ok(BlockThunk {
            tokens,
            env: self.env.clone(),
        })
    }

    /// Buffers an `else if` guard up to, but not including, the next `{`.
    fn parse_condition(&mut self) -> InterpretResult<ConditionThunk> {
        let mut tokens = vec![];
        loop {
            if self.peek()?.is_none() {
                return Err(InterpreterError::UnexpectedEndOfInput);
            }
            if self.peek_is(&Token::LeftBrace)? {
                break;
            }
            tokens.push(self.advance()?);
        }

        Ok(ConditionThunk {
            tokens,
            env: self.env.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Messages and values.
    // ------------------------------------------------------------------

    /// `<message>` = `<value> ('.' <name> '(' <args> ')')*`
    fn parse_message(&mut self) -> InterpretResult<Value> {
        let mut value = self.parse_value()?;
        while self.check_consume(&Token::Dot)? {
            let method_name = self.expect_identifier()?;
            value = self.dispatch_method(value, method_name)?;
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> InterpretResult<Value> {
        let (token, span) = self.advance()?.split();
        match token {
            Token::Number(n) => Ok(Value::Number(n)),
            Token::String(s) => Ok(Value::String(s)),
            Token::Boolean(b) => Ok(Value::Boolean(b)),
            Token::LeftParen => {
                let value = self.parse_message()?;
                self.expect(Token::RightParen)?;
                Ok(value)
            }
            Token::Identifier(name) => match self.env.resolve(&name) {
                Some(Declaration::Function(_)) => self.call_function(&name),
                Some(Declaration::Type(descriptor)) => Ok(Value::Type(descriptor)),
                Some(Declaration::Binding(binding)) => Ok(binding.value),
                None => Err(InterpreterError::UndeclaredName(name)),
            },
            other => Err(InterpreterError::ExpectedValue(span.start_pos, other)),
        }
    }

    /// Applies a free function: parses the argument list, checks it against
    /// the signature, and invokes the host implementation.
    fn call_function(&mut self, name: &str) -> InterpretResult<Value> {
        let function = match self.env.resolve(name) {
            Some(Declaration::Function(function)) => function,
            Some(_) => return Err(InterpreterError::NotAFunction(name.to_owned())),
            None => return Err(InterpreterError::UndeclaredName(name.to_owned())),
        };

        let args = self.parse_arguments()?;
        check_signature(function.name, &function.params, &args)?;
        (function.func)(self.runtime, args)
    }

    /// Resolves a method against the receiver's descriptor before the
    /// arguments are parsed, then checks the signature and invokes it.
    /// Static receivers take static methods with only the explicit
    /// arguments; ordinary receivers take instance methods with the
    /// receiver prepended.
    fn dispatch_method(&mut self, receiver: Value, method_name: String) -> InterpretResult<Value> {
        let (descriptor, static_call) = match &receiver {
            Value::Type(descriptor) => (descriptor.clone(), true),
            value => (self.primitive_descriptor(value.type_name())?, false),
        };

        let method = match descriptor.method(&method_name) {
            Some(method) => method.clone(),
            None => {
                return Err(InterpreterError::UnknownMethod {
                    type_name: descriptor.name,
                    method: method_name,
                });
            }
        };

        if static_call && !method.is_static {
            return Err(InterpreterError::InstanceMethodOnType {
                type_name: descriptor.name,
                method: method_name,
            });
        }
        if !static_call && method.is_static {
            return Err(InterpreterError::StaticMethodOnInstance {
                type_name: descriptor.name,
                method: method_name,
            });
        }

        let mut args = self.parse_arguments()?;
        check_signature(method.name, &method.params, &args)?;
        if !static_call {
            args.insert(0, receiver);
        }
        (method.func)(args)
    }

    /// `( <message> (, <message>)* )` with zero or more arguments.
    fn parse_arguments(&mut self) -> InterpretResult<Vec<Value>> {
        self.expect(Token::LeftParen)?;

        let mut args = vec![];
        if !self.peek_is(&Token::RightParen)? {
            loop {
                args.push(self.parse_message()?);
                if !self.check_consume(&Token::Comma)? {
                    break;
                }
            }
        }

        self.expect(Token::RightParen)?;
        Ok(args)
    }

    /// Looks up a primitive's type descriptor through the scope chain; the
    /// registry at the root always has it.
    fn primitive_descriptor(&self, type_name: &'static str) -> InterpretResult<Rc<TypeDescriptor>> {
        match self.env.resolve(type_name) {
            Some(Declaration::Type(descriptor)) => Ok(descriptor),
            _ => Err(InterpreterError::UndeclaredName(type_name.to_owned())),
        }
    }
}

/// Strict signature check shared by free-function and method calls: exact
/// argument count, exact type-name match per position.
fn check_signature(callee: &str, params: &[&'static str], args: &[Value]) -> InterpretResult<()> {
    if params.len() != args.len() {
        return Err(InterpreterError::ArityMismatch {
            callee: callee.to_owned(),
            expected: params.len(),
            actual: args.len(),
        });
    }
    for (index, (&expected, arg)) in params.iter().zip(args).enumerate() {
        if expected != arg.type_name() {
            return Err(InterpreterError::ArgumentTypeMismatch {
                callee: callee.to_owned(),
                index,
                expected,
                actual: arg.type_name(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::runtime::BufferedRuntime;

    fn run_source(source: &str) -> InterpretResult<String> {
        let mut runtime = BufferedRuntime::new();
        interpret(source, &mut runtime)?;
        Ok(runtime.output().to_owned())
    }

    fn run_source_with_input(source: &str, input: &str) -> InterpretResult<String> {
        let mut runtime = BufferedRuntime::with_input(input);
        interpret(source, &mut runtime)?;
        Ok(runtime.output().to_owned())
    }

    #[test]
    fn test_hello_world() {
        assert_eq!(
            run_source("writeln('Hello World');"),
            Ok("Hello World\n".to_owned())
        );
    }

    #[test]
    fn test_add_through_bindings() {
        let source = "let x = 3; let y = x.add(4); writeln(y.toString());";
        assert_eq!(run_source(source), Ok("7\n".to_owned()));
    }

    #[test]
    fn test_chained_method_calls() {
        let source = "writeln(2.add(3).subtract(1).toString());";
        assert_eq!(run_source(source), Ok("4\n".to_owned()));
    }

    #[test]
    fn test_parenthesized_message() {
        let source = "writeln((1.add(2)).toString());";
        assert_eq!(run_source(source), Ok("3\n".to_owned()));
    }

    #[test]
    fn test_write_without_newline() {
        assert_eq!(run_source("write('a'); write('b');"), Ok("ab".to_owned()));
    }

    #[test]
    fn test_function_call_in_value_position() {
        let source = "let line = readln(); writeln(line.concat('!'));";
        assert_eq!(
            run_source_with_input(source, "hello\n"),
            Ok("hello!\n".to_owned())
        );
    }

    #[test]
    fn test_if_takes_only_first_matching_branch() {
        let source = "
            if false { writeln('A'); }
            else if true { writeln('B'); }
            else if true { writeln('C'); }
            else { writeln('D'); }
        ";
        assert_eq!(run_source(source), Ok("B\n".to_owned()));
    }

    #[test]
    fn test_else_branch_when_nothing_matches() {
        let source = "if false { writeln('A'); } else { writeln('B'); }";
        assert_eq!(run_source(source), Ok("B\n".to_owned()));
    }

    #[test]
    fn test_untaken_branch_errors_are_never_surfaced() {
        // `no_such_name` would be a name error, but the branch is not taken.
        let source = "if true { writeln('A'); } else { writeln(no_such_name); }";
        assert_eq!(run_source(source), Ok("A\n".to_owned()));
    }

    #[test]
    fn test_untaken_else_if_guard_is_never_evaluated() {
        let source = "if true { writeln('A'); } else if missing_guard { writeln('B'); }";
        assert_eq!(run_source(source), Ok("A\n".to_owned()));
    }

    #[test]
    fn test_condition_must_be_boolean() {
        assert_eq!(
            run_source("if 1 { writeln('A'); }"),
            Err(InterpreterError::ConditionNotBoolean("number"))
        );
    }

    #[test]
    fn test_deferred_guard_type_error_when_reached() {
        let source = "if false { } else if 1 { }";
        assert_eq!(
            run_source(source),
            Err(InterpreterError::ConditionNotBoolean("number"))
        );
    }

    #[test]
    fn test_nested_blocks() {
        let source = "
            if true {
                if true { writeln('inner'); }
                writeln('outer');
            }
        ";
        assert_eq!(run_source(source), Ok("inner\nouter\n".to_owned()));
    }

    #[test]
    fn test_block_bindings_do_not_leak() {
        let source = "if true { let inner = 1; } writeln(inner.toString());";
        assert_eq!(
            run_source(source),
            Err(InterpreterError::UndeclaredName("inner".to_owned()))
        );
    }

    #[test]
    fn test_block_can_assign_outer_binding() {
        let source = "
            let x = 1;
            if true { x = 2; }
            writeln(x.toString());
        ";
        assert_eq!(run_source(source), Ok("2\n".to_owned()));
    }

    #[test]
    fn test_redeclaration_in_same_scope() {
        assert_eq!(
            run_source("let x = 1; let x = 2;"),
            Err(InterpreterError::Redeclaration("x".to_owned()))
        );
    }

    #[test]
    fn test_redeclaration_across_scope_boundary() {
        // Shadowing an outer binding from a nested block is also rejected.
        let source = "let x = 1; if true { let x = 2; }";
        assert_eq!(
            run_source(source),
            Err(InterpreterError::Redeclaration("x".to_owned()))
        );
    }

    #[test]
    fn test_builtin_names_cannot_be_redeclared() {
        assert_eq!(
            run_source("let writeln = 1;"),
            Err(InterpreterError::Redeclaration("writeln".to_owned()))
        );
    }

    #[test]
    fn test_assignment_requires_existing_binding() {
        assert_eq!(
            run_source("x = 1;"),
            Err(InterpreterError::UndeclaredName("x".to_owned()))
        );
    }

    #[test]
    fn test_assignment_type_mismatch() {
        assert_eq!(
            run_source("let x = 1; x = 'one';"),
            Err(InterpreterError::AssignmentTypeMismatch {
                name: "x".to_owned(),
                expected: "number",
                actual: "string",
            })
        );
    }

    #[test]
    fn test_mutable_flag_is_not_enforced() {
        // Bindings declared without `mutable` are still assignable.
        let source = "let x = 1; x = 2; let mutable y = 3; y = 4; writeln(x.add(y).toString());";
        assert_eq!(run_source(source), Ok("6\n".to_owned()));
    }

    #[test]
    fn test_static_method_through_type_receiver() {
        let source = "let n = number.parse('41'); writeln(n.add(1).toString());";
        assert_eq!(run_source(source), Ok("42\n".to_owned()));
    }

    #[test]
    fn test_static_method_on_instance_fails() {
        assert_eq!(
            run_source("let n = 1.parse('2');"),
            Err(InterpreterError::StaticMethodOnInstance {
                type_name: "number",
                method: "parse".to_owned(),
            })
        );
    }

    #[test]
    fn test_instance_method_on_type_fails() {
        assert_eq!(
            run_source("let s = number.toString();"),
            Err(InterpreterError::InstanceMethodOnType {
                type_name: "number",
                method: "toString".to_owned(),
            })
        );
    }

    #[test]
    fn test_unknown_method() {
        assert_eq!(
            run_source("let x = 1.multiply(2);"),
            Err(InterpreterError::UnknownMethod {
                type_name: "number",
                method: "multiply".to_owned(),
            })
        );
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            run_source("writeln('a', 'b');"),
            Err(InterpreterError::ArityMismatch {
                callee: "writeln".to_owned(),
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_argument_type_mismatch() {
        assert_eq!(
            run_source("writeln(1);"),
            Err(InterpreterError::ArgumentTypeMismatch {
                callee: "writeln".to_owned(),
                index: 0,
                expected: "string",
                actual: "number",
            })
        );
    }

    #[test]
    fn test_calling_a_binding_fails() {
        assert_eq!(
            run_source("let x = 1; x();"),
            Err(InterpreterError::NotAFunction("x".to_owned()))
        );
    }

    #[test]
    fn test_missing_semicolon() {
        assert!(matches!(
            run_source("writeln('a')"),
            Err(InterpreterError::UnexpectedEndOfInput)
        ));
    }

    #[test]
    fn test_boolean_operators() {
        let source = "writeln(true.and(false.not()).toString());";
        assert_eq!(run_source(source), Ok("true\n".to_owned()));
    }

    #[test]
    fn test_readln_out_of_input() {
        assert_eq!(
            run_source("let line = readln();"),
            Err(InterpreterError::OutOfInput)
        );
    }
}
