use std::collections::HashMap;
use std::mem;

use crate::error::Reporter;
use crate::interpreter::Interpreter;
use crate::syntax::{Expr, Stmt};
use crate::token::Token;

// Tracks what kind of function body the walk is currently inside, so that
// `return` outside a function and `return <value>` inside an initializer
// can be diagnosed before anything runs.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

// A name moves Declared → Defined → Used. Reading a name that is still
// Declared means its own initializer mentions it; a name that never reaches
// Used draws a warning when its scope dies.
#[derive(Debug, Clone, Copy, PartialEq)]
enum VarState {
    Declared,
    Defined,
    Used,
}

struct Local {
    line: i32,
    state: VarState,
}

/// Static pre-pass over the parsed program. For every local variable
/// reference it records, directly into the interpreter, how many scopes lie
/// between the use and the declaration. Names that match no local scope are
/// left alone and resolved dynamically in the globals at runtime.
pub struct Resolver<'i, 'r> {
    interpreter: &'i mut Interpreter,
    reporter: &'r mut Reporter,
    // one map per block scope, innermost last; the global scope is not here
    scopes: Vec<HashMap<String, Local>>,
    current_function: FunctionType,
    current_class: ClassType,
}

impl<'i, 'r> Resolver<'i, 'r> {
    pub fn new(interpreter: &'i mut Interpreter, reporter: &'r mut Reporter) -> Self {
        Resolver {
            interpreter,
            reporter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Block { statements } => {
                self.begin_scope();
                self.resolve(statements);
                self.end_scope();
            }
            Stmt::Break => {}
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
            Stmt::Expression { expression } => self.resolve_expr(expression),
            Stmt::Function { name, params, body } => {
                // the name is defined eagerly so the body can recurse
                self.declare(name);
                self.define(name);
                self.resolve_function(params, body, FunctionType::Function);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Print { expression } => self.resolve_expr(expression),
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.reporter
                        .error(keyword, "Cannot return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.reporter
                            .error(keyword, "Cannot return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Var { name, initializer } => {
                // Declaring and defining are split so that the initializer
                // is resolved while the name exists but is not yet legal to
                // reference; that is what catches `var a = a;`.
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
        }
    }

    fn resolve_class(&mut self, name: &Token, superclass: Option<&Expr>, methods: &[Stmt]) {
        let enclosing_class = mem::replace(&mut self.current_class, ClassType::Class);

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: superclass_name,
                ..
            } = superclass
            {
                if superclass_name.lexeme == name.lexeme {
                    self.reporter
                        .error(superclass_name, "A class cannot inherit from itself.");
                }
            }
            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            // methods of a subclass close over one extra scope holding
            // `super`; the interpreter builds the matching environment
            self.begin_scope();
            self.insert_implicit("super");
        }

        self.begin_scope();
        self.insert_implicit("this");

        for method in methods {
            if let Stmt::Function { name, params, body } = method {
                let declaration = if name.lexeme == "init" {
                    FunctionType::Initializer
                } else {
                    FunctionType::Method
                };
                self.resolve_function(params, body, declaration);
            }
        }

        self.end_scope();
        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expression: &Expr) {
        match expression {
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }
            // the property name is dispatched dynamically; only the object
            // expression has anything to resolve
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Grouping { expression } => self.resolve_expr(expression),
            Expr::Literal { .. } => {}
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::Super { id, keyword, .. } => match self.current_class {
                ClassType::None => self
                    .reporter
                    .error(keyword, "Cannot use 'super' outside of a class."),
                ClassType::Class => self
                    .reporter
                    .error(keyword, "Cannot use 'super' in a class with no superclass."),
                ClassType::Subclass => self.resolve_local(*id, keyword),
            },
            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.reporter
                        .error(keyword, "Cannot use 'this' outside of a class.");
                } else {
                    self.resolve_local(*id, keyword);
                }
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(local) = scope.get(&name.lexeme) {
                        if local.state == VarState::Declared {
                            self.reporter.error(
                                name,
                                "Cannot refer to local variable in its own initializer",
                            );
                        }
                    }
                }
                self.resolve_local(*id, name);
            }
        }
    }

    // Parameters are declared and defined in one go; unlike variables there
    // is no initializer that could observe them half-made.
    fn resolve_function(&mut self, params: &[Token], body: &[Stmt], declaration: FunctionType) {
        let enclosing_function = mem::replace(&mut self.current_function, declaration);
        self.begin_scope();
        for param in params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(body);
        self.end_scope();
        self.current_function = enclosing_function;
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    // A dying scope gets one last look: anything that was never read or
    // assigned is probably a mistake, but not one worth refusing to run for.
    fn end_scope(&mut self) {
        let scope = self.scopes.pop().expect("scope stack is not empty");
        for (name, local) in scope {
            if local.state != VarState::Used {
                self.reporter.warning(
                    local.line,
                    &format!("Variable {name} never referenced in its scope"),
                );
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.reporter.error(
                    name,
                    "Variable with this name already declared in this scope.",
                );
            }
            scope.insert(
                name.lexeme.clone(),
                Local {
                    line: name.line,
                    state: VarState::Declared,
                },
            );
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(local) = scope.get_mut(&name.lexeme) {
                if local.state == VarState::Declared {
                    local.state = VarState::Defined;
                }
            }
        }
    }

    // `this` and `super` are bindings the interpreter makes up; they are
    // exempt from the unused check.
    fn insert_implicit(&mut self, name: &str) {
        self.scopes
            .last_mut()
            .expect("a scope was just opened")
            .insert(
                name.to_string(),
                Local {
                    line: 0,
                    state: VarState::Used,
                },
            );
    }

    // Walk from the innermost scope outward; the first hit fixes the depth
    // for this reference node. No hit means the name is (or will be) a
    // global.
    fn resolve_local(&mut self, id: usize, name: &Token) {
        for (distance, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(local) = scope.get_mut(&name.lexeme) {
                local.state = VarState::Used;
                self.interpreter.resolve(id, distance);
                return;
            }
        }
    }
}
