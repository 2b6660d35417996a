//! Tree-walking reference interpreter for MIR.
//!
//! This is not a JIT, not a production execution engine, and not the
//! in-process engine §6 describes loading the generated object file into —
//! real codegen is out of scope for this compiler (see `SPEC_FULL.md`'s
//! note on the backend boundary). It exists purely to validate, in tests,
//! that the pipeline up through MIR lowering and the transformation passes
//! produces a function that behaves the way §8's concrete scenarios say it
//! should, without requiring a real code generator to exist.
//!
//! Execution walks a function's flat instruction list with a program
//! counter rather than recursing on structure: `Label`/`If`/`JumpOver`
//! become PC jumps, exactly mirroring how a backend would lower them to
//! real branches.

use std::collections::HashMap;
use std::rc::Rc;

use roc_base::{Interner, Symbol};
use roc_mir::{MIRModule, MIRValue, MIRValueId};
use roc_types::TypeDescriptor;

/// A runtime value during reference interpretation. `Wrapper` models a
/// boxed primitive (the result of `ToWrapper`) without actually laying out
/// an object header — there's no backend here to read one.
#[derive(Debug, Clone)]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Bool(bool),
    RawString(Rc<str>),
    Array(Rc<Vec<Value>>),
    Wrapper(Box<Value>),
    Unit,
}

impl Value {
    pub fn as_i32(&self) -> i32 {
        match self {
            Value::Int32(v) => *v,
            Value::Wrapper(inner) => inner.as_i32(),
            other => panic!("expected Int32, found {other:?}"),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            Value::Wrapper(inner) => inner.as_bool(),
            other => panic!("expected Bool, found {other:?}"),
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Int64(v) => *v,
            Value::Wrapper(inner) => inner.as_i64(),
            other => panic!("expected Int64, found {other:?}"),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Float64(v) => *v,
            Value::Wrapper(inner) => inner.as_f64(),
            other => panic!("expected Float64, found {other:?}"),
        }
    }

    /// The `toString` method every builtin exposes through its vtable
    /// entry (`MethodId::ToString`), modeled directly rather than through
    /// an actual dispatch table since there is no real vtable here.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::Float64(v) => format!("{v}"),
            Value::Bool(v) => v.to_string(),
            Value::RawString(s) => s.to_string(),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_display_string()).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Wrapper(inner) => inner.to_display_string(),
            Value::Unit => "()".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum InterpError {
    UnknownFunction(String),
    UnresolvedCall,
    Unsupported(String),
}

impl std::fmt::Display for InterpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpError::UnknownFunction(name) => write!(f, "no function named `{name}`"),
            InterpError::UnresolvedCall => write!(f, "call site has no resolved target"),
            InterpError::Unsupported(what) => write!(f, "reference interpreter cannot run {what}"),
        }
    }
}

impl std::error::Error for InterpError {}

/// Runs one module's functions by name, collecting `println` output the
/// way a real process's stdout would receive it.
pub struct Interpreter<'a> {
    module: &'a MIRModule,
    interner: &'a Interner,
    by_name: HashMap<Symbol, usize>,
    println: Symbol,
    to_string: Symbol,
    pub output: Vec<String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(module: &'a MIRModule, interner: &'a Interner) -> Self {
        let by_name = module
            .functions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name, i))
            .collect();
        Interpreter {
            module,
            interner,
            by_name,
            println: interner.lookup("println").unwrap_or(Symbol::EMPTY),
            to_string: interner.lookup("toString").unwrap_or(Symbol::EMPTY),
            output: Vec::new(),
        }
    }

    /// Invokes the named function with `args` and returns its result
    /// (`Value::Unit` for a void return).
    pub fn call_by_name(&mut self, name: Symbol, args: Vec<Value>) -> Result<Value, InterpError> {
        let index = *self
            .by_name
            .get(&name)
            .ok_or(InterpError::UnknownFunction(format!("{name:?}")))?;
        self.call_index(index, args)
    }

    fn call_index(&mut self, index: usize, args: Vec<Value>) -> Result<Value, InterpError> {
        let func = &self.module.functions[index];
        let mut locals: Vec<Value> = vec![Value::Unit; func.local_count];
        for (i, arg) in args.into_iter().enumerate() {
            if i < locals.len() {
                locals[i] = arg;
            }
        }

        let block = &func.blocks[0];
        let label_positions: HashMap<u32, usize> = block
            .instructions
            .iter()
            .enumerate()
            .filter_map(|(pos, (_, v))| match v {
                MIRValue::Label(id) => Some((*id, pos)),
                _ => None,
            })
            .collect();

        let mut values: HashMap<MIRValueId, Value> = HashMap::new();
        let mut pc = 0usize;

        while pc < block.instructions.len() {
            let (id, instr) = &block.instructions[pc];
            match instr {
                MIRValue::ConstantInt32(v) => {
                    values.insert(*id, Value::Int32(*v));
                }
                MIRValue::ConstantInt64(v) => {
                    values.insert(*id, Value::Int64(*v));
                }
                MIRValue::ConstantFloat64(v) => {
                    values.insert(*id, Value::Float64(*v));
                }
                MIRValue::True => {
                    values.insert(*id, Value::Bool(true));
                }
                MIRValue::False => {
                    values.insert(*id, Value::Bool(false));
                }
                MIRValue::RawString(sym) => {
                    values.insert(*id, Value::RawString(Rc::from(self.interner.resolve(*sym))));
                }
                MIRValue::LocalVariableAccess(local) => {
                    values.insert(*id, locals[local.0 as usize].clone());
                }
                MIRValue::LocalVariableSet(local, src) => {
                    let v = values[src].clone();
                    locals[local.0 as usize] = v.clone();
                    values.insert(*id, v);
                }
                MIRValue::Int32Add(a, b) => {
                    values.insert(*id, Value::Int32(values[a].as_i32() + values[b].as_i32()));
                }
                MIRValue::Int32Sub(a, b) => {
                    values.insert(*id, Value::Int32(values[a].as_i32() - values[b].as_i32()));
                }
                MIRValue::Int32Mul(a, b) => {
                    values.insert(*id, Value::Int32(values[a].as_i32() * values[b].as_i32()));
                }
                MIRValue::Int32Div(a, b) => {
                    values.insert(*id, Value::Int32(values[a].as_i32() / values[b].as_i32()));
                }
                MIRValue::Int32Mod(a, b) => {
                    values.insert(*id, Value::Int32(values[a].as_i32() % values[b].as_i32()));
                }
                MIRValue::Int32Pow(a, b) => {
                    values.insert(
                        *id,
                        Value::Int32(values[a].as_i32().pow(values[b].as_i32() as u32)),
                    );
                }
                MIRValue::Int32Eq(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i32() == values[b].as_i32()));
                }
                MIRValue::Int32NotEq(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i32() != values[b].as_i32()));
                }
                MIRValue::Int32Gt(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i32() > values[b].as_i32()));
                }
                MIRValue::Int32Lt(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i32() < values[b].as_i32()));
                }
                MIRValue::Int32Le(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i32() <= values[b].as_i32()));
                }
                MIRValue::Int32Ge(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i32() >= values[b].as_i32()));
                }
                MIRValue::Int64Add(a, b) => {
                    values.insert(*id, Value::Int64(values[a].as_i64() + values[b].as_i64()));
                }
                MIRValue::Int64Sub(a, b) => {
                    values.insert(*id, Value::Int64(values[a].as_i64() - values[b].as_i64()));
                }
                MIRValue::Int64Mul(a, b) => {
                    values.insert(*id, Value::Int64(values[a].as_i64() * values[b].as_i64()));
                }
                MIRValue::Int64Div(a, b) => {
                    values.insert(*id, Value::Int64(values[a].as_i64() / values[b].as_i64()));
                }
                MIRValue::Int64Mod(a, b) => {
                    values.insert(*id, Value::Int64(values[a].as_i64() % values[b].as_i64()));
                }
                MIRValue::Int64Pow(a, b) => {
                    values.insert(
                        *id,
                        Value::Int64(values[a].as_i64().pow(values[b].as_i64() as u32)),
                    );
                }
                MIRValue::Int64Eq(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i64() == values[b].as_i64()));
                }
                MIRValue::Int64NotEq(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i64() != values[b].as_i64()));
                }
                MIRValue::Int64Gt(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i64() > values[b].as_i64()));
                }
                MIRValue::Int64Lt(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i64() < values[b].as_i64()));
                }
                MIRValue::Int64Le(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i64() <= values[b].as_i64()));
                }
                MIRValue::Int64Ge(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_i64() >= values[b].as_i64()));
                }
                MIRValue::Float64Add(a, b) => {
                    values.insert(*id, Value::Float64(values[a].as_f64() + values[b].as_f64()));
                }
                MIRValue::Float64Sub(a, b) => {
                    values.insert(*id, Value::Float64(values[a].as_f64() - values[b].as_f64()));
                }
                MIRValue::Float64Mul(a, b) => {
                    values.insert(*id, Value::Float64(values[a].as_f64() * values[b].as_f64()));
                }
                MIRValue::Float64Div(a, b) => {
                    values.insert(*id, Value::Float64(values[a].as_f64() / values[b].as_f64()));
                }
                MIRValue::Float64Pow(a, b) => {
                    values.insert(*id, Value::Float64(values[a].as_f64().powf(values[b].as_f64())));
                }
                MIRValue::Float64Eq(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_f64() == values[b].as_f64()));
                }
                MIRValue::Float64NotEq(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_f64() != values[b].as_f64()));
                }
                MIRValue::Float64Gt(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_f64() > values[b].as_f64()));
                }
                MIRValue::Float64Lt(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_f64() < values[b].as_f64()));
                }
                MIRValue::Float64Le(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_f64() <= values[b].as_f64()));
                }
                MIRValue::Float64Ge(a, b) => {
                    values.insert(*id, Value::Bool(values[a].as_f64() >= values[b].as_f64()));
                }
                MIRValue::Not(a) => {
                    values.insert(*id, Value::Bool(!values[a].as_bool()));
                }
                MIRValue::Neg(a) => {
                    values.insert(*id, Value::Int32(-values[a].as_i32()));
                }
                MIRValue::ToWrapper(a) => {
                    values.insert(*id, Value::Wrapper(Box::new(values[a].clone())));
                }
                MIRValue::ToPtr(a) => {
                    values.insert(*id, values[a].clone());
                }
                MIRValue::StringToRaw(a) => {
                    values.insert(*id, values[a].clone());
                }
                MIRValue::CastTo(a, target_type) => {
                    let casted = match (&values[a], target_type) {
                        (Value::Int32(v), TypeDescriptor::Float64) => Value::Float64(*v as f64),
                        (Value::Int64(v), TypeDescriptor::Float64) => Value::Float64(*v as f64),
                        (Value::Int32(v), TypeDescriptor::Int64) => Value::Int64(*v as i64),
                        (Value::Int64(v), TypeDescriptor::Int32) => Value::Int32(*v as i32),
                        (Value::Float64(v), TypeDescriptor::Int32) => Value::Int32(*v as i32),
                        (Value::Float64(v), TypeDescriptor::Int64) => Value::Int64(*v as i64),
                        (other, _) => other.clone(),
                    };
                    values.insert(*id, casted);
                }
                MIRValue::StringConcat(a, b) => {
                    let concatenated = format!(
                        "{}{}",
                        values[a].to_display_string(),
                        values[b].to_display_string()
                    );
                    values.insert(*id, Value::RawString(Rc::from(concatenated)));
                }
                MIRValue::ArrayLit { elements, .. } => {
                    let items = elements.iter().map(|e| values[e].clone()).collect();
                    values.insert(*id, Value::Array(Rc::new(items)));
                }
                MIRValue::ArrayGet { array, index } => {
                    let Value::Array(items) = &values[array] else {
                        return Err(InterpError::Unsupported("indexing a non-array value".into()));
                    };
                    values.insert(*id, items[values[index].as_i32() as usize].clone());
                }
                MIRValue::ArrayLen(array) => {
                    let Value::Array(items) = &values[array] else {
                        return Err(InterpError::Unsupported("len of a non-array value".into()));
                    };
                    values.insert(*id, Value::Int32(items.len() as i32));
                }
                MIRValue::FunctionCall { name, args, .. } => {
                    let arg_values: Vec<Value> = args.iter().map(|a| values[a].clone()).collect();
                    let result = self.call_builtin_or_user(*name, arg_values)?;
                    values.insert(*id, result);
                }
                MIRValue::FunctionInstanceCall {
                    receiver,
                    name,
                    args,
                    ..
                } => {
                    let mut arg_values = vec![values[receiver].clone()];
                    arg_values.extend(args.iter().map(|a| values[a].clone()));
                    let result = self.call_builtin_or_user(*name, arg_values)?;
                    values.insert(*id, result);
                }
                MIRValue::If {
                    cond,
                    then_label: _,
                    else_label,
                } => {
                    if !values[cond].as_bool() {
                        pc = label_positions[else_label];
                        continue;
                    }
                }
                MIRValue::JumpOver { target_label } => {
                    pc = label_positions[target_label];
                    continue;
                }
                MIRValue::Label(_) => {}
                MIRValue::ReturnValue(v) => {
                    return Ok(values[v].clone());
                }
                MIRValue::ReturnVoid => {
                    return Ok(Value::Unit);
                }
                other => {
                    return Err(InterpError::Unsupported(format!("{other:?}")));
                }
            }
            pc += 1;
        }

        Ok(Value::Unit)
    }

    fn call_builtin_or_user(&mut self, name: Symbol, args: Vec<Value>) -> Result<Value, InterpError> {
        if name == Symbol::EMPTY {
            return Err(InterpError::UnresolvedCall);
        }
        if let Some(&index) = self.by_name.get(&name) {
            return self.call_index(index, args);
        }
        if name == self.println {
            self.output.push(args[0].to_display_string());
            return Ok(Value::Unit);
        }
        if name == self.to_string {
            return Ok(Value::RawString(Rc::from(args[0].to_display_string())));
        }
        Err(InterpError::Unsupported(format!(
            "builtin `{}`",
            self.interner.resolve(name)
        )))
    }
}

/// Convenience entry point for tests: builds an interpreter over `module`
/// and invokes `name` once.
pub fn run(
    module: &MIRModule,
    interner: &Interner,
    name: Symbol,
    args: Vec<Value>,
) -> Result<(Value, Vec<String>), InterpError> {
    let mut interp = Interpreter::new(module, interner);
    let result = interp.call_by_name(name, args)?;
    Ok((result, interp.output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roc_base::Interner;
    use roc_syntax::{Ast, Parser};

    fn build(src: &str) -> (MIRModule, Interner) {
        let mut interner = Interner::new();
        let ast = Ast::new();
        let mut parser = Parser::new(src, Symbol::EMPTY, &ast);
        let module = parser.parse_module(&mut interner).expect("parses");
        let analysis = roc_sema::analyze_module(&module, &mut interner).expect("analyzes");
        let mir = roc_mir::build_module(&module, &analysis, &interner);
        (mir, interner)
    }

    #[test]
    fn literal_return_evaluates_to_three() {
        let (mir, mut interner) = build("package main\nfun test() -> Int32 {\nret 3\n}");
        let name = interner.intern("test");
        let (result, _) = run(&mir, &interner, name, vec![]).expect("runs");
        assert_eq!(result.as_i32(), 3);
    }

    #[test]
    fn integer_division_lifts_to_float() {
        let (mir, mut interner) = build("package main\nfun test() -> Float64 {\nret 8 / 2\n}");
        let name = interner.intern("test");
        let (result, _) = run(&mir, &interner, name, vec![]).expect("runs");
        assert_eq!(result.as_f64(), 4.0);
    }

    #[test]
    fn integer_division_truncates_before_the_float_cast() {
        let (mir, mut interner) = build("package main\nfun test() -> Float64 {\nret 7 / 2\n}");
        let name = interner.intern("test");
        let (result, _) = run(&mir, &interner, name, vec![]).expect("runs");
        assert_eq!(result.as_f64(), 3.0);
    }

    #[test]
    fn two_arguments_add_to_the_expected_sum() {
        let (mir, mut interner) = build(
            "package main\nfun test(a: Int32, b: Int32) -> Int32 {\nret a + b\n}",
        );
        let name = interner.intern("test");
        let (result, _) = run(&mir, &interner, name, vec![Value::Int32(12), Value::Int32(56)]).expect("runs");
        assert_eq!(result.as_i32(), 68);
    }

    #[test]
    fn equal_arguments_take_the_true_branch() {
        let (mir, mut interner) = build(
            "package main\nfun test(a: Int32, b: Int32) -> Bool {\nif a == b {\nret true\n}\nret false\n}",
        );
        let name = interner.intern("test");
        let (equal, _) = run(&mir, &interner, name, vec![Value::Int32(78), Value::Int32(78)]).expect("runs");
        assert!(equal.as_bool());
        let (unequal, _) = run(&mir, &interner, name, vec![Value::Int32(79), Value::Int32(78)]).expect("runs");
        assert!(!unequal.as_bool());
    }

    #[test]
    fn exponent_operator_raises_to_the_power() {
        let (mir, mut interner) = build("package main\nfun test() -> Int32 {\nret 2 ^ 5\n}");
        let name = interner.intern("test");
        let (result, _) = run(&mir, &interner, name, vec![]).expect("runs");
        assert_eq!(result.as_i32(), 32);
    }

    #[test]
    fn println_call_is_captured_as_output() {
        let (mir, mut interner) = build(
            "package main\nfun test(a: Int32) -> Int32 {\nprintln(a.toString())\nret 1\n}",
        );
        let name = interner.intern("test");
        let (result, output) = run(&mir, &interner, name, vec![Value::Int32(123)]).expect("runs");
        assert_eq!(result.as_i32(), 1);
        assert_eq!(output, vec!["123".to_string()]);
    }
}
