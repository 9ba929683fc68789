use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::Error;
use crate::function::Function;
use crate::object::Object;
use crate::syntax::{Expr, LiteralValue, Stmt};
use crate::token::{Token, TokenType};

/// Executes the statement tree. Owns the global environment and the
/// resolver's side table; the `environment` field always points at the
/// scope currently in force.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    // reference-node id → scope depth; absence means the name is global
    locals: HashMap<usize, usize>,
}

fn clock_native(_arguments: &[Object]) -> Object {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("the system clock is past the epoch");
    Object::Number(now.as_secs_f64())
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define(
            "clock".to_string(),
            Object::Callable(Function::Native {
                name: "clock",
                arity: 0,
                body: clock_native,
            }),
        );

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), Error> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// Evaluate one expression and hand back its printed form. The REPL
    /// uses this to echo the value of an expression line.
    pub fn interpret_expression(&mut self, expression: &Expr) -> Result<String, Error> {
        self.evaluate(expression).map(|value| value.to_string())
    }

    /// Called by the resolver as it walks: the reference node `id` lives
    /// `depth` scopes away from its declaration.
    pub fn resolve(&mut self, id: usize, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Run statements inside `environment`, putting the previous scope back
    /// on every exit path. Return/break unwinds and runtime errors pass
    /// through here, so this restore is what keeps invariant scope state.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), Error> {
        let previous = mem::replace(&mut self.environment, environment);
        let result = statements
            .iter()
            .try_for_each(|statement| self.execute(statement));
        self.environment = previous;
        result
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), Error> {
        match statement {
            Stmt::Block { statements } => {
                let environment = Rc::new(RefCell::new(Environment::from(&self.environment)));
                self.execute_block(statements, environment)
            }
            Stmt::Break => Err(Error::Break),
            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods),
            Stmt::Expression { expression } => self.evaluate(expression).map(|_| ()),
            Stmt::Function { name, params, body } => {
                let function = Function::User {
                    name: name.clone(),
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme.clone(), Object::Callable(function));
                Ok(())
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::Print { expression } => {
                let value = self.evaluate(expression)?;
                println!("{value}");
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Object::Nil,
                };
                // unwinds to the nearest function call, which turns it back
                // into the call's result
                Err(Error::Return { value })
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    None => Object::Nil,
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme.clone(), value);
                Ok(())
            }
            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body) {
                        Err(Error::Break) => break,
                        other => other?,
                    }
                }
                Ok(())
            }
        }
    }

    // Declaration order matters here:
    //   1. the superclass expression runs first and must name a class;
    //   2. the class name is pre-defined as nil so methods can mention it;
    //   3. with a superclass, methods close over an extra scope binding
    //      `super`, so super dispatch starts at the declaring class;
    //   4. the finished class object is assigned back over the nil.
    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Stmt],
    ) -> Result<(), Error> {
        let superclass = match superclass {
            Some(expression) => match self.evaluate(expression)? {
                Object::Class(class) => Some(class),
                _ => {
                    let token = match expression {
                        Expr::Variable { name, .. } => name.clone(),
                        _ => name.clone(),
                    };
                    return Err(Error::Runtime {
                        token,
                        message: "Superclass must be a class.".to_string(),
                    });
                }
            },
            None => None,
        };

        self.environment
            .borrow_mut()
            .define(name.lexeme.clone(), Object::Nil);

        let enclosing = if let Some(ref superclass) = superclass {
            let previous = Rc::clone(&self.environment);
            let environment = Rc::new(RefCell::new(Environment::from(&previous)));
            environment
                .borrow_mut()
                .define("super".to_string(), Object::Class(Rc::clone(superclass)));
            self.environment = environment;
            Some(previous)
        } else {
            None
        };

        let mut class_methods: HashMap<String, Function> = HashMap::new();
        for method in methods {
            if let Stmt::Function {
                name: method_name,
                params,
                body,
            } = method
            {
                let function = Function::User {
                    name: method_name.clone(),
                    params: Rc::clone(params),
                    body: Rc::clone(body),
                    closure: Rc::clone(&self.environment),
                    is_initializer: method_name.lexeme == "init",
                };
                class_methods.insert(method_name.lexeme.clone(), function);
            }
        }

        let class = Rc::new(LoxClass::new(
            name.lexeme.clone(),
            superclass,
            class_methods,
        ));

        if let Some(previous) = enclosing {
            self.environment = previous;
        }
        self.environment
            .borrow_mut()
            .assign(name, Object::Class(class))?;
        Ok(())
    }

    fn evaluate(&mut self, expression: &Expr) -> Result<Object, Error> {
        match expression {
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                    ),
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }
                // an assignment expression has the value of its right side
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(&left, operator, &right)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                // strictly left to right
                let mut evaluated: Vec<Object> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push(self.evaluate(argument)?);
                }

                self.call(callee, &evaluated, paren)
            }
            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;
                if let Object::Instance(ref instance) = object {
                    instance.borrow().get(name, &object)
                } else {
                    Err(Error::Runtime {
                        token: name.clone(),
                        message: "Only instances have properties.".to_string(),
                    })
                }
            }
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Literal { value } => Ok(match value {
                LiteralValue::Boolean(value) => Object::Boolean(*value),
                LiteralValue::Nil => Object::Nil,
                LiteralValue::Number(value) => Object::Number(*value),
                LiteralValue::String(value) => Object::String(value.clone()),
            }),
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                // short-circuit: the result is an operand's own value, not
                // a coerced boolean
                let take_left = match operator.token_type {
                    TokenType::Or => is_truthy(&left),
                    _ => !is_truthy(&left),
                };
                if take_left {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }
            Expr::Set {
                object,
                name,
                value,
            } => {
                // the object is evaluated before the value
                let object = self.evaluate(object)?;
                if let Object::Instance(instance) = object {
                    let value = self.evaluate(value)?;
                    instance.borrow_mut().set(name, value.clone());
                    Ok(value)
                } else {
                    Err(Error::Runtime {
                        token: name.clone(),
                        message: "Only instances have fields.".to_string(),
                    })
                }
            }
            Expr::Super { id, method, .. } => self.evaluate_super(*id, method),
            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.token_type {
                    TokenType::Minus => match right {
                        Object::Number(value) => Ok(Object::Number(-value)),
                        _ => Err(Error::Runtime {
                            token: operator.clone(),
                            message: "Operand must be a number.".to_string(),
                        }),
                    },
                    TokenType::Bang => Ok(Object::Boolean(!is_truthy(&right))),
                    _ => unreachable!("the parser only makes unary nodes for '!' and '-'"),
                }
            }
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
        }
    }

    fn call(
        &mut self,
        callee: Object,
        arguments: &[Object],
        paren: &Token,
    ) -> Result<Object, Error> {
        match callee {
            Object::Callable(function) => {
                if arguments.len() != function.arity() {
                    return Err(Error::Runtime {
                        token: paren.clone(),
                        message: format!(
                            "Expected {} arguments but got {}.",
                            function.arity(),
                            arguments.len()
                        ),
                    });
                }
                function.call(self, arguments)
            }
            Object::Class(class) => {
                if arguments.len() != class.arity() {
                    return Err(Error::Runtime {
                        token: paren.clone(),
                        message: format!(
                            "Expected {} arguments but got {}.",
                            class.arity(),
                            arguments.len()
                        ),
                    });
                }
                let instance = LoxInstance::new(&class);
                if let Some(initializer) = class.find_method("init") {
                    initializer.bind(instance.clone()).call(self, arguments)?;
                }
                Ok(instance)
            }
            _ => Err(Error::Runtime {
                token: paren.clone(),
                message: "Only functions and classes can be called.".to_string(),
            }),
        }
    }

    fn evaluate_super(&mut self, id: usize, method: &Token) -> Result<Object, Error> {
        let distance = *self
            .locals
            .get(&id)
            .expect("the resolver fixed a depth for every 'super'");
        let superclass = match Environment::get_at(&self.environment, distance, "super") {
            Object::Class(class) => class,
            _ => unreachable!("'super' always binds a class"),
        };
        // the `this` scope sits exactly one environment inside the `super`
        // scope, by construction
        let object = Environment::get_at(&self.environment, distance - 1, "this");

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Object::Callable(found.bind(object))),
            None => Err(Error::Runtime {
                token: method.clone(),
                message: format!("Undefined property '{}'.", method.lexeme),
            }),
        }
    }

    // Resolved references go straight to their depth; everything else is a
    // global looked up dynamically.
    fn look_up_variable(&mut self, id: usize, name: &Token) -> Result<Object, Error> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(Environment::get_at(&self.environment, distance, &name.lexeme)),
            None => self.globals.borrow().get(name),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

// nil and false are the only values that are not truthy; zero and the empty
// string count as true.
fn is_truthy(value: &Object) -> bool {
    match value {
        Object::Nil => false,
        Object::Boolean(value) => *value,
        _ => true,
    }
}

fn number_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), Error> {
    match (left, right) {
        (Object::Number(left), Object::Number(right)) => Ok((*left, *right)),
        _ => Err(Error::Runtime {
            token: operator.clone(),
            message: "Operands must be numbers.".to_string(),
        }),
    }
}

fn binary(left: &Object, operator: &Token, right: &Object) -> Result<Object, Error> {
    match operator.token_type {
        TokenType::BangEqual => Ok(Object::Boolean(!left.equals(right))),
        TokenType::EqualEqual => Ok(Object::Boolean(left.equals(right))),

        // + is overloaded: numeric addition or string concatenation
        TokenType::Plus => match (left, right) {
            (Object::Number(left), Object::Number(right)) => Ok(Object::Number(left + right)),
            (Object::String(left), Object::String(right)) => {
                Ok(Object::String(format!("{left}{right}")))
            }
            _ => Err(Error::Runtime {
                token: operator.clone(),
                message: "Operands must be two numbers or two strings.".to_string(),
            }),
        },

        TokenType::Minus => {
            let (left, right) = number_operands(operator, left, right)?;
            Ok(Object::Number(left - right))
        }
        TokenType::Slash => {
            let (left, right) = number_operands(operator, left, right)?;
            if right == 0.0 {
                return Err(Error::Runtime {
                    token: operator.clone(),
                    message: "Cannot divide by zero.".to_string(),
                });
            }
            Ok(Object::Number(left / right))
        }
        TokenType::Star => {
            let (left, right) = number_operands(operator, left, right)?;
            Ok(Object::Number(left * right))
        }

        TokenType::Greater => {
            let (left, right) = number_operands(operator, left, right)?;
            Ok(Object::Boolean(left > right))
        }
        TokenType::GreaterEqual => {
            let (left, right) = number_operands(operator, left, right)?;
            Ok(Object::Boolean(left >= right))
        }
        TokenType::Less => {
            let (left, right) = number_operands(operator, left, right)?;
            Ok(Object::Boolean(left < right))
        }
        TokenType::LessEqual => {
            let (left, right) = number_operands(operator, left, right)?;
            Ok(Object::Boolean(left <= right))
        }

        _ => unreachable!("the parser only makes binary nodes for binary operators"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reporter;
    use crate::parser::Parser;
    use crate::resolver::Resolver;
    use crate::scanner::Scanner;

    // Run the whole pipeline over `source`, whose last statement must be an
    // expression statement; return that expression's printed value. Keeping
    // the observable value out of `print` keeps stdout quiet in tests.
    fn eval(source: &str) -> Result<String, Error> {
        let mut reporter = Reporter::new();
        let tokens = Scanner::new(source, &mut reporter).scan_tokens();
        let statements = Parser::new(&tokens, 0, &mut reporter).parse();
        assert!(!reporter.had_error, "source does not parse: {source}");

        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter, &mut reporter).resolve(&statements);
        assert!(!reporter.had_error, "source does not resolve: {source}");

        let (last, rest) = statements.split_last().expect("at least one statement");
        interpreter.interpret(rest)?;
        match last {
            Stmt::Expression { expression } => interpreter.interpret_expression(expression),
            _ => panic!("the last statement must be an expression statement"),
        }
    }

    fn eval_err(source: &str) -> String {
        match eval(source) {
            Err(Error::Runtime { message, .. }) => message,
            other => panic!("expected a runtime error, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_and_number_formatting() {
        assert_eq!(eval("1 + 2 * 3;").unwrap(), "7");
        assert_eq!(eval("(1 + 2) * 3;").unwrap(), "9");
        assert_eq!(eval("10 / 4;").unwrap(), "2.5");
        assert_eq!(eval("6 / 2;").unwrap(), "3");
        assert_eq!(eval("0 - 0.5;").unwrap(), "-0.5");
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(eval("\"foo\" + \"bar\";").unwrap(), "foobar");
    }

    #[test]
    fn plus_rejects_mixed_operands() {
        assert_eq!(
            eval_err("1 + \"a\";"),
            "Operands must be two numbers or two strings."
        );
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(eval_err("1 / 0;"), "Cannot divide by zero.");
    }

    #[test]
    fn comparisons_need_numbers() {
        assert_eq!(eval("2 <= 2;").unwrap(), "true");
        assert_eq!(eval_err("\"a\" < \"b\";"), "Operands must be numbers.");
    }

    #[test]
    fn unary_minus_needs_a_number() {
        assert_eq!(eval("-(3);").unwrap(), "-3");
        assert_eq!(eval_err("-\"a\";"), "Operand must be a number.");
    }

    #[test]
    fn equality_rules() {
        assert_eq!(eval("nil == nil;").unwrap(), "true");
        assert_eq!(eval("nil == false;").unwrap(), "false");
        assert_eq!(eval("1 == 1;").unwrap(), "true");
        assert_eq!(eval("1 == \"1\";").unwrap(), "false");
        assert_eq!(eval("\"a\" != \"b\";").unwrap(), "true");
    }

    #[test]
    fn truthiness_follows_ruby_not_c() {
        assert_eq!(eval("!nil;").unwrap(), "true");
        assert_eq!(eval("!false;").unwrap(), "true");
        assert_eq!(eval("!0;").unwrap(), "false");
        assert_eq!(eval("!\"\";").unwrap(), "false");
    }

    #[test]
    fn logical_operators_return_operand_values() {
        assert_eq!(eval("\"a\" or \"b\";").unwrap(), "a");
        assert_eq!(eval("nil or \"b\";").unwrap(), "b");
        assert_eq!(eval("nil and 2;").unwrap(), "nil");
        assert_eq!(eval("1 and 2;").unwrap(), "2");
    }

    #[test]
    fn or_short_circuits_side_effects() {
        let source = "
            var a = 1;
            fun side() { a = 2; return true; }
            true or side();
            a;
        ";
        assert_eq!(eval(source).unwrap(), "1");
    }

    #[test]
    fn assignment_yields_its_value_and_is_right_associative() {
        assert_eq!(eval("var a; var b; a = b = 3;").unwrap(), "3");
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        assert_eq!(eval_err("missing;"), "Undefined variable 'missing'.");
    }

    #[test]
    fn fibonacci_by_recursion() {
        let source = "
            fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
            fib(10);
        ";
        assert_eq!(eval(source).unwrap(), "55");
    }

    #[test]
    fn closures_capture_their_environment() {
        let source = "
            fun makeCounter() {
                var i = 0;
                fun count() { i = i + 1; return i; }
                return count;
            }
            var counter = makeCounter();
            counter();
            counter();
            counter();
        ";
        assert_eq!(eval(source).unwrap(), "3");
    }

    #[test]
    fn resolution_is_fixed_at_declaration_not_call() {
        let source = "
            var a = \"global\";
            var first;
            var second;
            {
                fun show() { return a; }
                first = show();
                var a = \"local\";
                a;
                second = show();
            }
            first + second;
        ";
        assert_eq!(eval(source).unwrap(), "globalglobal");
    }

    #[test]
    fn functions_return_nil_without_a_return_statement() {
        assert_eq!(eval("fun noop() {} noop();").unwrap(), "nil");
    }

    #[test]
    fn calling_a_non_callable_is_an_error() {
        assert_eq!(eval_err("\"hi\"();"), "Only functions and classes can be called.");
    }

    #[test]
    fn arity_is_checked() {
        assert_eq!(
            eval_err("fun f(a) { return a; } f(1, 2);"),
            "Expected 1 arguments but got 2."
        );
    }

    #[test]
    fn while_loops_and_break() {
        let source = "
            var i = 0;
            while (true) {
                i = i + 1;
                if (i == 3) break;
            }
            i;
        ";
        assert_eq!(eval(source).unwrap(), "3");
    }

    #[test]
    fn break_leaves_only_the_innermost_loop() {
        let source = "
            var total = 0;
            for (var i = 0; i < 3; i = i + 1) {
                for (var j = 0; j < 10; j = j + 1) {
                    if (j == 2) break;
                    total = total + 1;
                }
            }
            total;
        ";
        assert_eq!(eval(source).unwrap(), "6");
    }

    #[test]
    fn for_loops_desugar_and_run() {
        let source = "
            var sum = 0;
            for (var i = 1; i <= 4; i = i + 1) sum = sum + i;
            sum;
        ";
        assert_eq!(eval(source).unwrap(), "10");
    }

    #[test]
    fn block_scopes_restore_on_every_exit() {
        let source = "
            var x = 1;
            fun f() { var x = 2; return x; }
            f();
            x;
        ";
        assert_eq!(eval(source).unwrap(), "1");
    }

    #[test]
    fn fields_and_methods() {
        let source = "
            class Box {
                init(v) { this.v = v; }
                get() { return this.v; }
            }
            Box(7).get();
        ";
        assert_eq!(eval(source).unwrap(), "7");
    }

    #[test]
    fn bound_methods_remember_their_receiver() {
        let source = "
            class Box {
                init(v) { this.v = v; }
                get() { return this.v; }
            }
            var box = Box(9);
            var getter = box.get;
            getter();
        ";
        assert_eq!(eval(source).unwrap(), "9");
    }

    #[test]
    fn initializers_always_yield_the_instance() {
        let source = "
            class P { init() { this.x = 1; return; } }
            P().x;
        ";
        assert_eq!(eval(source).unwrap(), "1");

        // re-invoking init through the instance still answers the instance
        let source = "
            class P { init() {} }
            var p = P();
            p == p.init();
        ";
        assert_eq!(eval(source).unwrap(), "true");
    }

    #[test]
    fn fields_shadow_methods() {
        let source = "
            class C { f() { return \"method\"; } }
            var c = C();
            c.f = 1;
            c.f;
        ";
        assert_eq!(eval(source).unwrap(), "1");
    }

    #[test]
    fn inheritance_and_super() {
        let source = "
            class A { greet() { return \"A\"; } }
            class B < A { greet() { return super.greet() + \"B\"; } }
            B().greet();
        ";
        assert_eq!(eval(source).unwrap(), "AB");
    }

    #[test]
    fn methods_are_inherited() {
        let source = "
            class A { greet() { return \"hi\"; } }
            class B < A {}
            B().greet();
        ";
        assert_eq!(eval(source).unwrap(), "hi");
    }

    #[test]
    fn super_dispatch_starts_at_the_declaring_class() {
        // C inherits B.test, whose super must mean A even when called on C
        let source = "
            class A { f() { return \"A\"; } }
            class B < A { f() { return \"B\"; } test() { return super.f(); } }
            class C < B {}
            C().test();
        ";
        assert_eq!(eval(source).unwrap(), "A");
    }

    #[test]
    fn superclass_must_be_a_class() {
        assert_eq!(
            eval_err("var NotAClass = 1; class B < NotAClass {} nil;"),
            "Superclass must be a class."
        );
    }

    #[test]
    fn properties_need_an_instance() {
        assert_eq!(eval_err("var x = 3; x.y;"), "Only instances have properties.");
        assert_eq!(eval_err("var x = 3; x.y = 1;"), "Only instances have fields.");
    }

    #[test]
    fn unknown_property_is_an_error() {
        assert_eq!(
            eval_err("class C {} C().missing;"),
            "Undefined property 'missing'."
        );
    }

    #[test]
    fn clock_is_a_number_of_seconds() {
        assert_eq!(eval("clock() > 0;").unwrap(), "true");
    }

    #[test]
    fn printed_forms_of_callables_and_instances() {
        assert_eq!(eval("fun f() {} f;").unwrap(), "fun f()");
        assert_eq!(eval("class C {} C;").unwrap(), "class C");
        assert_eq!(eval("class C {} C();").unwrap(), "C instance");
        assert_eq!(eval("clock;").unwrap(), "fun clock()");
    }

    #[test]
    fn instances_compare_by_identity() {
        let source = "
            class C {}
            var a = C();
            var b = C();
            a == b;
        ";
        assert_eq!(eval(source).unwrap(), "false");
        assert_eq!(eval("class C {} var a = C(); a == a;").unwrap(), "true");
    }

    #[test]
    fn set_evaluates_object_before_value() {
        // the value expression mutates `target`; the store must still land
        // in the instance chosen beforehand
        let source = "
            class C {}
            var first = C();
            var second = C();
            var target = first;
            fun swap() { target = second; return 5; }
            target.field = swap();
            first.field;
        ";
        assert_eq!(eval(source).unwrap(), "5");
    }
}
