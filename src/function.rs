use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::object::Object;
use crate::syntax::Stmt;
use crate::token::Token;

/// A callable value: either a native implemented in the host, or a user
/// function carrying its declaration and the environment it closed over.
/// Methods are user functions too; binding a receiver just wraps the
/// closure (see [`Function::bind`]).
#[derive(Clone)]
pub enum Function {
    Native {
        name: &'static str,
        arity: usize,
        body: fn(&[Object]) -> Object,
    },
    User {
        name: Token,
        params: Rc<Vec<Token>>,
        body: Rc<Vec<Stmt>>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    },
}

impl Function {
    /// Arity was checked by the caller, so params and arguments zip up
    /// exactly. Each call gets a fresh environment whose parent is the
    /// closure; without that, recursion would break, since simultaneous
    /// calls to the same function would share parameter slots.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: &[Object],
    ) -> Result<Object, Error> {
        match self {
            Function::Native { body, .. } => Ok(body(arguments)),
            Function::User {
                params,
                body,
                closure,
                is_initializer,
                ..
            } => {
                let environment = Rc::new(RefCell::new(Environment::from(closure)));
                for (param, argument) in params.iter().zip(arguments.iter()) {
                    environment
                        .borrow_mut()
                        .define(param.lexeme.clone(), argument.clone());
                }

                match interpreter.execute_block(body, environment) {
                    // a return statement unwound out of the body
                    Err(Error::Return { value }) => {
                        if *is_initializer {
                            // init() answers with its instance no matter
                            // how the body returned; the resolver already
                            // rejected `return <value>` in initializers
                            Ok(Environment::get_at(closure, 0, "this"))
                        } else {
                            Ok(value)
                        }
                    }
                    Err(other) => Err(other),
                    Ok(()) => {
                        if *is_initializer {
                            Ok(Environment::get_at(closure, 0, "this"))
                        } else {
                            Ok(Object::Nil)
                        }
                    }
                }
            }
        }
    }

    /// A closure-within-a-closure: a one-entry environment binding `this`
    /// to the receiver, slid between the method and its original closure.
    /// That is all it takes for a method to know its instance.
    pub fn bind(&self, instance: Object) -> Function {
        match self {
            Function::Native { .. } => unreachable!("native functions are never methods"),
            Function::User {
                name,
                params,
                body,
                closure,
                is_initializer,
            } => {
                let environment = Rc::new(RefCell::new(Environment::from(closure)));
                environment
                    .borrow_mut()
                    .define("this".to_string(), instance);
                Function::User {
                    name: name.clone(),
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                    closure: environment,
                    is_initializer: *is_initializer,
                }
            }
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Function::Native { arity, .. } => *arity,
            Function::User { params, .. } => params.len(),
        }
    }

    /// Equality on callables is identity: two closures made from the same
    /// declaration are distinct, and a bound method is distinct from the
    /// method it came from.
    pub fn is_same(&self, other: &Function) -> bool {
        match (self, other) {
            (Function::Native { name: left, .. }, Function::Native { name: right, .. }) => {
                left == right
            }
            (
                Function::User {
                    body: left_body,
                    closure: left_closure,
                    ..
                },
                Function::User {
                    body: right_body,
                    closure: right_closure,
                    ..
                },
            ) => Rc::ptr_eq(left_body, right_body) && Rc::ptr_eq(left_closure, right_closure),
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Native { name, .. } => write!(f, "fun {name}()"),
            Function::User { name, .. } => write!(f, "fun {}()", name.lexeme),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
