use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::object::Object;
use crate::token::Token;

/// One runtime scope: a name→value map plus a parent pointer forming the
/// scope chain. Environments are shared (a closure keeps its defining
/// environment alive), hence the `Rc<RefCell<_>>` handles. Cycles through
/// captured class environments leak; that is an accepted cost for scripts.
pub struct Environment {
    values: HashMap<String, Object>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// The global environment, the only one with no parent.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child scope. The parent is fixed for the life of the environment.
    pub fn from(enclosing: &Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(Rc::clone(enclosing)),
        }
    }

    /// Unconditionally bind at this scope. Defining an existing name again
    /// replaces it; only the resolver cares about redeclaration.
    pub fn define(&mut self, name: String, value: Object) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &Token) -> Result<Object, Error> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(ref enclosing) = self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(Error::Runtime {
                token: name.clone(),
                message: format!("Undefined variable '{}'.", name.lexeme),
            })
        }
    }

    /// Set the name at the nearest scope that already contains it.
    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), Error> {
        if self.values.contains_key(&name.lexeme) {
            self.values.insert(name.lexeme.clone(), value);
            Ok(())
        } else if let Some(ref enclosing) = self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(Error::Runtime {
                token: name.clone(),
                message: format!("Undefined variable '{}'.", name.lexeme),
            })
        }
    }

    /// The environment `distance` hops up the parent chain, 0 being this
    /// one. Associated function rather than method because it must hand
    /// back a shareable handle, not a borrow.
    pub fn ancestor(
        environment: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Rc<RefCell<Environment>> {
        let mut environment = Rc::clone(environment);
        for _ in 0..distance {
            let enclosing = environment
                .borrow()
                .enclosing
                .clone()
                .expect("a resolved depth stays within the scope chain");
            environment = enclosing;
        }
        environment
    }

    /// Depth-exact read, used when the resolver has fixed a distance. No
    /// chain walk, and a miss is impossible when the resolver was right.
    pub fn get_at(environment: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Object {
        Environment::ancestor(environment, distance)
            .borrow()
            .values
            .get(name)
            .expect("a resolved name exists at its depth")
            .clone()
    }

    /// Depth-exact write.
    pub fn assign_at(
        environment: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Object,
    ) {
        Environment::ancestor(environment, distance)
            .borrow_mut()
            .values
            .insert(name.to_string(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
