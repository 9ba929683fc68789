use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::function::Function;
use crate::object::Object;
use crate::token::Token;

/// The class stores behaviour, the instance stores state. A class's method
/// table never changes once built, so classes are plain `Rc` values.
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Function>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Function>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// A method on this class, or the nearest one up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<&Function> {
        self.methods.get(name).or_else(|| {
            self.superclass
                .as_deref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }

    /// Calling a class takes whatever its initializer takes.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, Function::arity)
    }
}

#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, Object>,
}

impl LoxInstance {
    /// Returns the new `LoxInstance` already wrapped as an `Object`, since
    /// every use needs the shared handle.
    pub fn new(class: &Rc<LoxClass>) -> Object {
        Object::Instance(Rc::new(RefCell::new(LoxInstance {
            class: Rc::clone(class),
            fields: HashMap::new(),
        })))
    }

    /// Property access: fields shadow methods, and a found method comes
    /// back bound to `instance` (this same object, passed back in as the
    /// shared handle).
    pub fn get(&self, name: &Token, instance: &Object) -> Result<Object, Error> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            Ok(field.clone())
        } else if let Some(method) = self.class.find_method(&name.lexeme) {
            Ok(Object::Callable(method.bind(instance.clone())))
        } else {
            Err(Error::Runtime {
                token: name.clone(),
                message: format!("Undefined property '{}'.", name.lexeme),
            })
        }
    }

    /// Lox freely creates fields on assignment, so there is nothing to
    /// check here.
    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
