use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::builtins::FunctionDescriptor;
use super::errors::{InterpretResult, InterpreterError};
use super::types::TypeDescriptor;
use super::value::Value;

/// What a name can resolve to in a scope chain.
#[derive(Debug, Clone)]
pub enum Declaration {
    Function(Rc<FunctionDescriptor>),
    Type(Rc<TypeDescriptor>),
    Binding(Binding),
}

/// A named storage cell created by a `let` statement. The declared type
/// never changes after creation. The mutable flag is recorded but not
/// consulted on assignment; see the crate design notes.
#[derive(Debug, Clone)]
pub struct Binding {
    pub type_name: &'static str,
    pub value: Value,
    pub mutable: bool,
}

/// A scope: name-to-declaration map with a parent link. Lookup walks the
/// chain outward; declaration targets the current scope only. Cloning an
/// Environment clones the handle, not the map.
#[derive(Clone)]
pub struct Environment {
    env_ptr: Rc<RefCell<EnvironmentData>>,
}

struct EnvironmentData {
    values: HashMap<String, Declaration>,
    enclosing: Option<Environment>,
}

impl Environment {
    pub fn new() -> Self {
        let env_data = EnvironmentData {
            values: HashMap::new(),
            enclosing: None,
        };
        Environment {
            env_ptr: Rc::new(RefCell::new(env_data)),
        }
    }

    pub fn with_enclosing(env: &Environment) -> Self {
        let env_data = EnvironmentData {
            values: HashMap::new(),
            enclosing: Some(env.clone()),
        };
        Environment {
            env_ptr: Rc::new(RefCell::new(env_data)),
        }
    }

    pub fn define(&self, name: String, declaration: Declaration) {
        self.env_ptr.borrow_mut().values.insert(name, declaration);
    }

    /// Resolves a name anywhere along the chain, innermost scope first.
    pub fn resolve(&self, name: &str) -> Option<Declaration> {
        let data = self.env_ptr.borrow();
        match data.values.get(name) {
            Some(declaration) => Some(declaration.clone()),
            None => data.enclosing.as_ref().and_then(|env| env.resolve(name)),
        }
    }

    /// Whether the name resolves anywhere along the chain. Redeclaration is
    /// rejected against the whole chain, so inner scopes cannot shadow.
    pub fn is_declared(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Overwrites the value of an existing binding, wherever along the chain
    /// it was declared. The caller checks the declared type first.
    pub fn assign(&self, name: &str, value: Value) -> InterpretResult<()> {
        let mut data = self.env_ptr.borrow_mut();
        match data.values.get_mut(name) {
            Some(Declaration::Binding(binding)) => {
                binding.value = value;
                Ok(())
            }
            Some(_) => Err(InterpreterError::NotABinding(name.to_owned())),
            None => match &data.enclosing {
                Some(env) => env.assign(name, value),
                None => Err(InterpreterError::UndeclaredName(name.to_owned())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(value: Value) -> Declaration {
        Declaration::Binding(Binding {
            type_name: value.type_name(),
            value,
            mutable: false,
        })
    }

    #[test]
    fn test_lookup_walks_the_chain() {
        let root = Environment::new();
        root.define("x".to_owned(), bind(Value::Number(1.0)));

        let child = Environment::with_enclosing(&root);
        assert!(child.is_declared("x"));
        assert!(matches!(
            child.resolve("x"),
            Some(Declaration::Binding(Binding {
                value: Value::Number(n),
                ..
            })) if n == 1.0
        ));
    }

    #[test]
    fn test_child_declarations_do_not_leak() {
        let root = Environment::new();
        let child = Environment::with_enclosing(&root);
        child.define("y".to_owned(), bind(Value::Boolean(true)));

        assert!(child.is_declared("y"));
        assert!(!root.is_declared("y"));
    }

    #[test]
    fn test_assign_reaches_ancestor_binding() {
        let root = Environment::new();
        root.define("x".to_owned(), bind(Value::Number(1.0)));

        let child = Environment::with_enclosing(&root);
        child.assign("x", Value::Number(2.0)).unwrap();

        assert!(matches!(
            root.resolve("x"),
            Some(Declaration::Binding(Binding {
                value: Value::Number(n),
                ..
            })) if n == 2.0
        ));
    }

    #[test]
    fn test_assign_to_undeclared_name() {
        let env = Environment::new();
        assert_eq!(
            env.assign("missing", Value::Number(0.0)),
            Err(InterpreterError::UndeclaredName("missing".to_owned()))
        );
    }

    #[test]
    fn test_sibling_scopes_are_independent() {
        let root = Environment::new();
        let left = Environment::with_enclosing(&root);
        let right = Environment::with_enclosing(&root);

        left.define("only_left".to_owned(), bind(Value::Number(1.0)));
        assert!(!right.is_declared("only_left"));
    }
}
