use super::errors::InterpretResult;
use super::value::Value;

use std::collections::HashMap;
use std::fmt;

pub type MethodFnType = fn(Vec<Value>) -> InterpretResult<Value>;

/// A method registered on a type descriptor. Instance methods receive the
/// receiver prepended to the explicit arguments; static methods receive the
/// explicit arguments only.
#[derive(Clone)]
pub struct Method {
    pub name: &'static str,
    pub params: Vec<&'static str>,
    pub returns: &'static str,
    pub is_static: bool,
    pub func: MethodFnType,
}

impl Method {
    pub fn instance(
        name: &'static str,
        params: Vec<&'static str>,
        returns: &'static str,
        func: MethodFnType,
    ) -> Self {
        Method {
            name,
            params,
            returns,
            is_static: false,
            func,
        }
    }

    pub fn static_method(
        name: &'static str,
        params: Vec<&'static str>,
        returns: &'static str,
        func: MethodFnType,
    ) -> Self {
        Method {
            name,
            params,
            returns,
            is_static: true,
            func,
        }
    }
}

/// Describes one of the three primitive kinds: its name and the methods that
/// can be dispatched on its values. The three instances are built once at
/// startup and never change.
pub struct TypeDescriptor {
    pub name: &'static str,
    methods: HashMap<&'static str, Method>,
}

impl TypeDescriptor {
    pub fn new(name: &'static str, methods: Vec<Method>) -> Self {
        let methods = methods.into_iter().map(|m| (m.name, m)).collect();
        TypeDescriptor { name, methods }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<type {}>", self.name)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = if self.is_static { "static" } else { "instance" };
        write!(
            f,
            "<{} method {}({}) -> {}>",
            kind,
            self.name,
            self.params.join(", "),
            self.returns
        )
    }
}
