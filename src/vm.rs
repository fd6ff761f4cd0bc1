//! Stack machine that executes a compiled instruction stream.
//!
//! Dispatch-loop shape (`ip`, a `match` over the current instruction, advance
//! unless a jump fired) grounded on `aeryz-bci/src/vm.rs`'s `BciVm::run`/
//! `next_instruction` and its `push_stack`/`pop_stack` helpers, stripped of
//! BCI's call-frame machinery (this language has no functions) and
//! re-targeted from BCI's fixed `[i32; 1000]` packed-string stack to a plain
//! `Vec<i64>` — this language's stack only ever holds integers, so BCI's
//! byte-packing scheme (built to let strings live on the same stack as
//! numbers) has no reason to carry over.

use std::collections::HashMap;

use crate::compiler::Instruction;
use crate::error::OilError;

/// A stack machine: read-only `code`, an `ip`, an operand `stack`, a flat
/// `env`, and an `output_lines` transcript of everything `PRINT` wrote.
pub struct Vm<'a> {
    code: &'a [Instruction],
    ip: usize,
    stack: Vec<i64>,
    env: HashMap<String, i64>,
    pub output_lines: Vec<String>,
}

impl<'a> Vm<'a> {
    pub fn new(code: &'a [Instruction]) -> Self {
        Vm {
            code,
            ip: 0,
            stack: Vec::new(),
            env: HashMap::new(),
            output_lines: Vec::new(),
        }
    }

    /// Runs to completion (until `HALT` or the instruction stream runs out).
    pub fn run(&mut self) -> Result<(), OilError> {
        while self.ip < self.code.len() {
            if !self.step()? {
                break;
            }
        }
        Ok(())
    }

    /// Executes one instruction. Returns `false` after `HALT`.
    fn step(&mut self) -> Result<bool, OilError> {
        let instr = &self.code[self.ip];
        self.ip += 1;

        match instr {
            Instruction::Const(v) => self.stack.push(*v),
            Instruction::Load(name) => {
                let value = *self.env.get(name).unwrap_or(&0);
                self.stack.push(value);
            }
            Instruction::Store(name) => {
                let value = self.pop()?;
                self.env.insert(name.clone(), value);
            }
            Instruction::Add => self.binary(|a, b| Ok(a + b))?,
            Instruction::Sub => self.binary(|a, b| Ok(a - b))?,
            Instruction::Mul => self.binary(|a, b| Ok(a * b))?,
            // Floor division: -7 / 2 == -4, not -3.
            Instruction::Div => self.binary(|a, b| {
                if b == 0 {
                    Err(OilError::runtime("Division by zero"))
                } else {
                    Ok(floor_div(a, b))
                }
            })?,
            Instruction::Eq => self.binary(|a, b| Ok(bool_to_int(a == b)))?,
            Instruction::Ne => self.binary(|a, b| Ok(bool_to_int(a != b)))?,
            Instruction::Lt => self.binary(|a, b| Ok(bool_to_int(a < b)))?,
            Instruction::Le => self.binary(|a, b| Ok(bool_to_int(a <= b)))?,
            Instruction::Gt => self.binary(|a, b| Ok(bool_to_int(a > b)))?,
            Instruction::Ge => self.binary(|a, b| Ok(bool_to_int(a >= b)))?,
            // Both operands are always popped and evaluated: AND/OR are not
            // short-circuiting.
            Instruction::And => self.binary(|a, b| Ok(bool_to_int(a != 0 && b != 0)))?,
            Instruction::Or => self.binary(|a, b| Ok(bool_to_int(a != 0 || b != 0)))?,
            Instruction::Not => {
                let a = self.pop()?;
                self.stack.push(bool_to_int(a == 0));
            }
            Instruction::JumpIfFalse(target) => {
                let cond = self.pop()?;
                if cond == 0 {
                    self.ip = *target;
                }
            }
            Instruction::Jump(target) => self.ip = *target,
            Instruction::Print => {
                let value = self.pop()?;
                self.output_lines.push(value.to_string());
                println!("{value}");
            }
            Instruction::Halt => return Ok(false),
        }

        Ok(true)
    }

    fn pop(&mut self) -> Result<i64, OilError> {
        self.stack
            .pop()
            .ok_or_else(|| OilError::runtime("Stack underflow"))
    }

    fn binary(&mut self, f: impl FnOnce(i64, i64) -> Result<i64, OilError>) -> Result<(), OilError> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.stack.push(f(a, b)?);
        Ok(())
    }
}

fn bool_to_int(b: bool) -> i64 {
    if b {
        1
    } else {
        0
    }
}

/// Rounds toward negative infinity, matching Python's `//` rather than
/// Rust's truncating `/`. `i64::div_euclid` only agrees with this for
/// positive divisors, so the negative-divisor case is adjusted by hand.
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::parser::parse;

    fn run(source: &str) -> Vec<String> {
        let program = parse(source).unwrap();
        let code = compile(&program).unwrap();
        let mut vm = Vm::new(&code);
        vm.run().unwrap();
        vm.output_lines
    }

    #[test]
    fn scenario_arithmetic() {
        assert_eq!(run("x = 5; print x + 3;"), vec!["8"]);
    }

    #[test]
    fn scenario_while_loop() {
        assert_eq!(
            run("x = 0; while (x < 3) { print x; x += 1; }"),
            vec!["0", "1", "2"]
        );
    }

    #[test]
    fn scenario_if_else() {
        assert_eq!(run("if (1) { print 1; } else { print 2; }"), vec!["1"]);
        assert_eq!(run("if (0) { print 1; } else { print 2; }"), vec!["2"]);
    }

    #[test]
    fn scenario_precedence() {
        assert_eq!(run("print 2 + 3 * 4;"), vec!["14"]);
        assert_eq!(run("print (2 + 3) * 4;"), vec!["20"]);
    }

    #[test]
    fn scenario_division_and_not() {
        assert_eq!(run("print 7 / 2;"), vec!["3"]);
        assert_eq!(run("print !0;"), vec!["1"]);
        assert_eq!(run("print !5;"), vec!["0"]);
    }

    #[test]
    fn scenario_compound_assign() {
        assert_eq!(run("a = 10; b = 3; a -= b; print a;"), vec!["7"]);
    }

    #[test]
    fn floor_division_rounds_toward_negative_infinity() {
        // -7 / 2 floors to -4, not truncates to -3.
        assert_eq!(run("print (0 - 7) / 2;"), vec!["-4"]);
        assert_eq!(run("print (0 - 7) / -2;"), vec!["3"]);
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let program = parse("print 1 / 0;").unwrap();
        let code = compile(&program).unwrap();
        let mut vm = Vm::new(&code);
        let err = vm.run().unwrap_err();
        assert!(matches!(err, OilError::Runtime { .. }));
    }

    #[test]
    fn unassigned_variable_reads_as_zero() {
        assert_eq!(run("print x;"), vec!["0"]);
    }

    #[test]
    fn logical_and_or_truth_table() {
        assert_eq!(run("print 1 && 1;"), vec!["1"]);
        assert_eq!(run("print 1 && 0;"), vec!["0"]);
        assert_eq!(run("print 0 || 0;"), vec!["0"]);
        assert_eq!(run("print 0 || 1;"), vec!["1"]);
    }

    #[test]
    fn operand_stack_is_balanced_at_every_statement_boundary() {
        // Every statement leaves the stack exactly as deep as it found it;
        // after a whole program only HALT remains to execute.
        let code = compile(&parse("x = 1; y = 2; print x + y; while (x < 3) { x += 1; }").unwrap()).unwrap();
        let mut vm = Vm::new(&code);
        vm.run().unwrap();
        assert!(vm.stack.is_empty());
    }
}
