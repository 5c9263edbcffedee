use super::environment::{Declaration, Environment};
use super::errors::InterpretResult;
use super::runtime::HostRuntime;
use super::types::{Method, TypeDescriptor};
use super::value::Value;

use std::fmt;
use std::rc::Rc;

pub type NativeFnType = fn(&mut dyn HostRuntime, Vec<Value>) -> InterpretResult<Value>;

/// A free function registered in the root environment. Invoked against the
/// host runtime; users cannot define their own.
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub params: Vec<&'static str>,
    pub returns: &'static str,
    pub func: NativeFnType,
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<native-func {}>", self.name)
    }
}

/// Builds the root environment: the three primitive type descriptors plus
/// the free functions. Constructed once at startup and only ever read after
/// that; every scope chain bottoms out here.
pub fn global_environment() -> Environment {
    let env = Environment::new();

    for descriptor in [number_type(), string_type(), boolean_type()] {
        let name = descriptor.name.to_owned();
        env.define(name, Declaration::Type(Rc::new(descriptor)));
    }

    for function in native_functions() {
        let name = function.name.to_owned();
        env.define(name, Declaration::Function(Rc::new(function)));
    }

    env
}

fn native_functions() -> Vec<FunctionDescriptor> {
    vec![
        FunctionDescriptor {
            name: "write",
            params: vec!["string"],
            returns: "void",
            func: native_write,
        },
        FunctionDescriptor {
            name: "writeln",
            params: vec!["string"],
            returns: "void",
            func: native_writeln,
        },
        FunctionDescriptor {
            name: "readln",
            params: vec![],
            returns: "string",
            func: native_readln,
        },
    ]
}

fn native_write(runtime: &mut dyn HostRuntime, args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::String(text)] => {
            runtime.write(text)?;
            Ok(Value::String(String::new()))
        }
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn native_writeln(runtime: &mut dyn HostRuntime, args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::String(text)] => {
            runtime.writeln(text)?;
            Ok(Value::String(String::new()))
        }
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn native_readln(runtime: &mut dyn HostRuntime, _args: Vec<Value>) -> InterpretResult<Value> {
    Ok(Value::String(runtime.readln()?))
}

fn number_type() -> TypeDescriptor {
    TypeDescriptor::new(
        "number",
        vec![
            Method::instance("add", vec!["number"], "number", number_add),
            Method::instance("subtract", vec!["number"], "number", number_subtract),
            Method::instance("equals", vec!["number"], "boolean", number_equals),
            Method::instance("toString", vec![], "string", value_to_string),
            Method::static_method("parse", vec!["string"], "number", number_parse),
        ],
    )
}

fn string_type() -> TypeDescriptor {
    TypeDescriptor::new(
        "string",
        vec![
            Method::instance("concat", vec!["string"], "string", string_concat),
            Method::instance("equals", vec!["string"], "boolean", string_equals),
            Method::instance("toString", vec![], "string", value_to_string),
        ],
    )
}

fn boolean_type() -> TypeDescriptor {
    TypeDescriptor::new(
        "boolean",
        vec![
            Method::instance("not", vec![], "boolean", boolean_not),
            Method::instance("and", vec!["boolean"], "boolean", boolean_and),
            Method::instance("or", vec!["boolean"], "boolean", boolean_or),
            Method::instance("equals", vec!["boolean"], "boolean", boolean_equals),
            Method::instance("toString", vec![], "string", value_to_string),
        ],
    )
}

fn value_to_string(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [receiver] => Ok(Value::String(receiver.to_string())),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn number_add(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Number(a), Value::Number(b)] => Ok(Value::Number(a + b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn number_subtract(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Number(a), Value::Number(b)] => Ok(Value::Number(a - b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn number_equals(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Number(a), Value::Number(b)] => Ok(Value::Boolean(a == b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn number_parse(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        // The original host parses with `+text`, which never fails; an
        // unparsable string becomes NaN.
        [Value::String(text)] => {
            let parsed = text.trim().parse().unwrap_or(f64::NAN);
            Ok(Value::Number(parsed))
        }
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn string_concat(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::String(a), Value::String(b)] => Ok(Value::String(format!("{}{}", a, b))),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn string_equals(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::String(a), Value::String(b)] => Ok(Value::Boolean(a == b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn boolean_not(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Boolean(b)] => Ok(Value::Boolean(!b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn boolean_and(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Boolean(a), Value::Boolean(b)] => Ok(Value::Boolean(*a && *b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn boolean_or(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Boolean(a), Value::Boolean(b)] => Ok(Value::Boolean(*a || *b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

fn boolean_equals(args: Vec<Value>) -> InterpretResult<Value> {
    match args.as_slice() {
        [Value::Boolean(a), Value::Boolean(b)] => Ok(Value::Boolean(a == b)),
        _ => unreachable!("arguments are checked against the signature"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_environment_contents() {
        let env = global_environment();

        assert!(matches!(env.resolve("number"), Some(Declaration::Type(_))));
        assert!(matches!(env.resolve("string"), Some(Declaration::Type(_))));
        assert!(matches!(env.resolve("boolean"), Some(Declaration::Type(_))));
        assert!(matches!(
            env.resolve("writeln"),
            Some(Declaration::Function(_))
        ));
        assert!(env.resolve("print").is_none());
    }

    #[test]
    fn test_number_methods() {
        assert_eq!(
            number_add(vec![Value::Number(3.0), Value::Number(4.0)]),
            Ok(Value::Number(7.0))
        );
        assert_eq!(
            value_to_string(vec![Value::Number(7.0)]),
            Ok(Value::String("7".to_owned()))
        );
        assert_eq!(
            number_parse(vec![Value::String("42".to_owned())]),
            Ok(Value::Number(42.0))
        );
    }

    #[test]
    fn test_static_flag() {
        let number = number_type();
        assert!(number.method("parse").unwrap().is_static);
        assert!(!number.method("add").unwrap().is_static);
        assert!(number.method("multiply").is_none());
    }

    #[test]
    fn test_boolean_methods() {
        assert_eq!(
            boolean_and(vec![Value::Boolean(true), Value::Boolean(false)]),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            boolean_not(vec![Value::Boolean(false)]),
            Ok(Value::Boolean(true))
        );
    }
}
