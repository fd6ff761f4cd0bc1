//! Lowers an AST into a flat, backpatched instruction stream.
//!
//! One variant per opcode, each carrying exactly the argument it needs,
//! instead of an opcode string plus an untyped optional argument. Jumps are
//! emitted as a placeholder target and overwritten once the real one is
//! known (`emit` records the index, `patch` rewrites it in place).

use crate::ast::{BinOpKind, CompoundOpKind, Expr, Program, Stmt, UnOpKind};
use crate::error::OilError;

/// One bytecode instruction. Jump targets are absolute instruction indices,
/// filled in by `Compiler::patch` once known.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Const(i64),
    Load(String),
    Store(String),
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    JumpIfFalse(usize),
    Jump(usize),
    Print,
    Halt,
}

impl Instruction {
    /// The opcode name, for the `NNN: (OPCODE, ARG)` diagnostic listing.
    pub fn opcode(&self) -> &'static str {
        match self {
            Instruction::Const(_) => "CONST",
            Instruction::Load(_) => "LOAD",
            Instruction::Store(_) => "STORE",
            Instruction::Add => "ADD",
            Instruction::Sub => "SUB",
            Instruction::Mul => "MUL",
            Instruction::Div => "DIV",
            Instruction::Eq => "EQ",
            Instruction::Ne => "NE",
            Instruction::Lt => "LT",
            Instruction::Le => "LE",
            Instruction::Gt => "GT",
            Instruction::Ge => "GE",
            Instruction::And => "AND",
            Instruction::Or => "OR",
            Instruction::Not => "NOT",
            Instruction::JumpIfFalse(_) => "JUMP_IF_FALSE",
            Instruction::Jump(_) => "JUMP",
            Instruction::Print => "PRINT",
            Instruction::Halt => "HALT",
        }
    }
}

/// Compiles a whole program, ending with exactly one `Halt`.
pub fn compile(program: &Program) -> Result<Vec<Instruction>, OilError> {
    let mut compiler = Compiler::new();
    compiler.compile_program(program)?;
    Ok(compiler.code)
}

struct Compiler {
    code: Vec<Instruction>,
}

impl Compiler {
    fn new() -> Self {
        Compiler { code: Vec::new() }
    }

    fn emit(&mut self, instr: Instruction) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    /// Overwrites a previously emitted placeholder jump with its real target.
    fn patch(&mut self, pos: usize, target: usize) {
        self.code[pos] = match self.code[pos] {
            Instruction::JumpIfFalse(_) => Instruction::JumpIfFalse(target),
            Instruction::Jump(_) => Instruction::Jump(target),
            ref other => unreachable!("patch() called on non-jump instruction {other:?}"),
        };
    }

    fn compile_program(&mut self, program: &Program) -> Result<(), OilError> {
        for stmt in program {
            self.compile_stmt(stmt)?;
        }
        self.emit(Instruction::Halt);
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), OilError> {
        match stmt {
            Stmt::Assign { name, expr } => {
                self.compile_expr(expr)?;
                self.emit(Instruction::Store(name.clone()));
            }
            Stmt::CompoundAssign { name, op, expr } => {
                let op_instr = compound_op_instruction(*op)?;
                self.emit(Instruction::Load(name.clone()));
                self.compile_expr(expr)?;
                self.emit(op_instr);
                self.emit(Instruction::Store(name.clone()));
            }
            Stmt::Print(expr) => {
                self.compile_expr(expr)?;
                self.emit(Instruction::Print);
            }
            Stmt::While { cond, body } => {
                let loop_start = self.code.len();
                self.compile_expr(cond)?;
                let jump_if_false = self.emit(Instruction::JumpIfFalse(0));
                for stmt in body {
                    self.compile_stmt(stmt)?;
                }
                self.emit(Instruction::Jump(loop_start));
                self.patch(jump_if_false, self.code.len());
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.compile_expr(cond)?;
                let jump_if_false = self.emit(Instruction::JumpIfFalse(0));
                for stmt in then_block {
                    self.compile_stmt(stmt)?;
                }
                match else_block {
                    Some(else_stmts) => {
                        let jump_over_else = self.emit(Instruction::Jump(0));
                        self.patch(jump_if_false, self.code.len());
                        for stmt in else_stmts {
                            self.compile_stmt(stmt)?;
                        }
                        self.patch(jump_over_else, self.code.len());
                    }
                    None => self.patch(jump_if_false, self.code.len()),
                }
            }
        }
        Ok(())
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), OilError> {
        match expr {
            Expr::Number(value) => {
                self.emit(Instruction::Const(*value));
            }
            Expr::Var(name) => {
                self.emit(Instruction::Load(name.clone()));
            }
            Expr::BinOp { op, left, right } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit(bin_op_instruction(*op));
            }
            Expr::UnOp { op, expr } => {
                self.compile_expr(expr)?;
                match op {
                    UnOpKind::Not => self.emit(Instruction::Not),
                };
            }
        }
        Ok(())
    }
}

fn bin_op_instruction(op: BinOpKind) -> Instruction {
    match op {
        BinOpKind::Add => Instruction::Add,
        BinOpKind::Sub => Instruction::Sub,
        BinOpKind::Mul => Instruction::Mul,
        BinOpKind::Div => Instruction::Div,
        BinOpKind::Eq => Instruction::Eq,
        BinOpKind::Ne => Instruction::Ne,
        BinOpKind::Lt => Instruction::Lt,
        BinOpKind::Le => Instruction::Le,
        BinOpKind::Gt => Instruction::Gt,
        BinOpKind::Ge => Instruction::Ge,
        BinOpKind::And => Instruction::And,
        BinOpKind::Or => Instruction::Or,
    }
}

/// The lexer recognizes `%= &= |= ^=` as `COMPOUND_OP` lexemes too, but the
/// compiler has no instruction to lower them to and rejects them here.
fn compound_op_instruction(op: CompoundOpKind) -> Result<Instruction, OilError> {
    match op {
        CompoundOpKind::Add => Ok(Instruction::Add),
        CompoundOpKind::Sub => Ok(Instruction::Sub),
        CompoundOpKind::Mul => Ok(Instruction::Mul),
        CompoundOpKind::Div => Ok(Instruction::Div),
        CompoundOpKind::Mod => Err(OilError::compile("Unsupported compound operator '%='")),
        CompoundOpKind::BitAnd => Err(OilError::compile("Unsupported compound operator '&='")),
        CompoundOpKind::BitOr => Err(OilError::compile("Unsupported compound operator '|='")),
        CompoundOpKind::BitXor => Err(OilError::compile("Unsupported compound operator '^='")),
    }
}
