//! ES2025 syntax tree consumed and produced by the engine.
//!
//! The tree is produced by an external parser and handed back to an external
//! printer. Every node struct carries a [`NodeMeta`] (`meta`) holding the
//! source span the parser attached and any leading comments. The engine
//! passes spans through untouched; comments are merged when a node is
//! replaced (see [`crate::transform::edit`]).
//!
//! # Structure
//!
//! - [`Program`]: root node.
//! - [`Stmt`]: statement nodes.
//! - [`Expr`]: expression nodes.
//! - [`Pat`]: binding/assignment pattern nodes.
//! - [`ModuleDecl`]: `import`/`export` module declarations.
//! - [`Function`] and [`Class`] are shared by their declaration, expression
//!   and method forms.

// ─────────────────────────────────────────────────────────────────────────────
// Source metadata
// ─────────────────────────────────────────────────────────────────────────────

/// A position in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the start of the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
}

/// A half-open `[start, end)` span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// First position covered by the node.
    pub start: Position,
    /// Position just past the node.
    pub end: Position,
}

/// Whether a comment was written as `// line` or `/* block */`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// …`
    Line,
    /// `/* … */`
    Block,
}

/// A comment attached in front of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Line or block comment.
    pub kind: CommentKind,
    /// Comment text without the delimiters.
    pub text: String,
}

/// Metadata attached to every node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMeta {
    /// Source span; synthesized nodes carry the default span.
    pub loc: Span,
    /// Leading comments, in source order.
    pub comments: Vec<Comment>,
}

impl NodeMeta {
    /// Metadata for a node that only carries a span.
    pub fn at(loc: Span) -> Self {
        Self {
            loc,
            comments: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Program
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the source file is a classic script or an ES module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// A classic `<script>`.
    Script,
    /// An ES module.
    Module,
}

/// The root node of a parsed source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Whether the file is a script or a module.
    pub source_type: SourceType,
    /// Top-level statements and module declarations.
    pub body: Vec<ProgramItem>,
}

/// A top-level item inside a [`Program`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramItem {
    /// A regular statement.
    Stmt(Stmt),
    /// A module-level `import` or `export` declaration.
    ModuleDecl(ModuleDecl),
}

// ─────────────────────────────────────────────────────────────────────────────
// Common helpers
// ─────────────────────────────────────────────────────────────────────────────

/// An identifier (name, label, key, or binding).
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The identifier text.
    pub name: String,
}

/// A private identifier beginning with `#`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateIdent {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The identifier text, without the leading `#`.
    pub name: String,
}

/// A function parameter: a pattern with an optional default.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The binding pattern.
    pub pat: Pat,
    /// Default value (`= expr`), if present.
    pub default: Option<Expr>,
}

impl Param {
    /// `true` for a plain `name` parameter with no default.
    pub fn is_simple(&self) -> bool {
        self.default.is_none() && matches!(self.pat, Pat::Ident(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────────────

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `{ … }` block statement.
    Block(BlockStmt),
    /// `var / let / const` variable declaration.
    VarDecl(VarDecl),
    /// `function` declaration.
    FnDecl(Box<Function>),
    /// `class` declaration.
    ClassDecl(Box<Class>),
    /// Expression statement (`expr ;`).
    Expr(ExprStmt),
    /// `if (test) consequent else alternate`
    If(IfStmt),
    /// `for (init; test; update) body`
    For(ForStmt),
    /// `for (left in right) body`
    ForIn(ForInStmt),
    /// `for [await] (left of right) body`
    ForOf(ForOfStmt),
    /// `while (test) body`
    While(WhileStmt),
    /// `do body while (test);`
    DoWhile(DoWhileStmt),
    /// `switch (discriminant) { cases }`
    Switch(SwitchStmt),
    /// `try { … } catch (…) { … } finally { … }`
    Try(TryStmt),
    /// `return argument?;`
    Return(ReturnStmt),
    /// `throw argument;`
    Throw(ThrowStmt),
    /// `break label?;`
    Break(BreakStmt),
    /// `continue label?;`
    Continue(ContinueStmt),
    /// `label: body`
    Labeled(LabeledStmt),
    /// `debugger;`
    Debugger(DebuggerStmt),
    /// `with (object) body`
    With(WithStmt),
    /// Empty statement `;`.
    Empty(EmptyStmt),
}

impl Stmt {
    /// Returns the metadata of this statement.
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Stmt::Block(s) => &s.meta,
            Stmt::VarDecl(s) => &s.meta,
            Stmt::FnDecl(s) => &s.meta,
            Stmt::ClassDecl(s) => &s.meta,
            Stmt::Expr(s) => &s.meta,
            Stmt::If(s) => &s.meta,
            Stmt::For(s) => &s.meta,
            Stmt::ForIn(s) => &s.meta,
            Stmt::ForOf(s) => &s.meta,
            Stmt::While(s) => &s.meta,
            Stmt::DoWhile(s) => &s.meta,
            Stmt::Switch(s) => &s.meta,
            Stmt::Try(s) => &s.meta,
            Stmt::Return(s) => &s.meta,
            Stmt::Throw(s) => &s.meta,
            Stmt::Break(s) => &s.meta,
            Stmt::Continue(s) => &s.meta,
            Stmt::Labeled(s) => &s.meta,
            Stmt::Debugger(s) => &s.meta,
            Stmt::With(s) => &s.meta,
            Stmt::Empty(s) => &s.meta,
        }
    }

    /// Returns the mutable metadata of this statement.
    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Stmt::Block(s) => &mut s.meta,
            Stmt::VarDecl(s) => &mut s.meta,
            Stmt::FnDecl(s) => &mut s.meta,
            Stmt::ClassDecl(s) => &mut s.meta,
            Stmt::Expr(s) => &mut s.meta,
            Stmt::If(s) => &mut s.meta,
            Stmt::For(s) => &mut s.meta,
            Stmt::ForIn(s) => &mut s.meta,
            Stmt::ForOf(s) => &mut s.meta,
            Stmt::While(s) => &mut s.meta,
            Stmt::DoWhile(s) => &mut s.meta,
            Stmt::Switch(s) => &mut s.meta,
            Stmt::Try(s) => &mut s.meta,
            Stmt::Return(s) => &mut s.meta,
            Stmt::Throw(s) => &mut s.meta,
            Stmt::Break(s) => &mut s.meta,
            Stmt::Continue(s) => &mut s.meta,
            Stmt::Labeled(s) => &mut s.meta,
            Stmt::Debugger(s) => &mut s.meta,
            Stmt::With(s) => &mut s.meta,
            Stmt::Empty(s) => &mut s.meta,
        }
    }

    /// Returns the source span of this statement.
    pub fn loc(&self) -> Span {
        self.meta().loc
    }

    /// `true` for an expression statement consisting of a bare string
    /// literal, i.e. a directive such as `"use strict"` when it leads a
    /// body.
    pub fn is_directive(&self) -> bool {
        matches!(self, Stmt::Expr(s) if matches!(*s.expr, Expr::Str(_)))
    }
}

/// `{ statements }` block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Statements in the block.
    pub body: Vec<Stmt>,
}

/// Expression statement: `expr ;`
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The expression.
    pub expr: Box<Expr>,
}

/// `if (test) consequent else alternate`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Condition expression.
    pub test: Box<Expr>,
    /// Taken branch.
    pub consequent: Box<Stmt>,
    /// Not-taken branch, if present.
    pub alternate: Option<Box<Stmt>>,
}

/// `for (init; test; update) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Optional initializer.
    pub init: Option<ForInit>,
    /// Optional loop condition.
    pub test: Option<Box<Expr>>,
    /// Optional update expression.
    pub update: Option<Box<Expr>>,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// The initializer slot in a C-style `for` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// `var / let / const` declaration.
    VarDecl(VarDecl),
    /// Plain expression.
    Expr(Box<Expr>),
}

/// `for (left in right) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Left-hand side binding.
    pub left: ForInOfLeft,
    /// The object being iterated.
    pub right: Box<Expr>,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// `for [await] (left of right) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `true` for `for await (…)`.
    pub is_await: bool,
    /// Left-hand side binding.
    pub left: ForInOfLeft,
    /// The iterable.
    pub right: Box<Expr>,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// The left-hand side of a `for-in` or `for-of` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInOfLeft {
    /// `var / let / const` declaration.
    VarDecl(VarDecl),
    /// An assignment target.
    Pat(Pat),
}

/// `while (test) body`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Loop condition.
    pub test: Box<Expr>,
    /// Loop body.
    pub body: Box<Stmt>,
}

/// `do body while (test);`
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Loop body.
    pub body: Box<Stmt>,
    /// Loop condition.
    pub test: Box<Expr>,
}

/// `switch (discriminant) { cases }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The value being switched on.
    pub discriminant: Box<Expr>,
    /// The `case` / `default` clauses.
    pub cases: Vec<SwitchCase>,
}

/// A single `case expr:` or `default:` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `None` for the `default:` clause.
    pub test: Option<Expr>,
    /// Body statements for this clause.
    pub consequent: Vec<Stmt>,
}

/// `try { block } catch (param) { handler } finally { finalizer }`
#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The `try` block.
    pub block: BlockStmt,
    /// Optional `catch` clause.
    pub handler: Option<CatchClause>,
    /// Optional `finally` block.
    pub finalizer: Option<BlockStmt>,
}

/// `catch (param) body`
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Binding parameter; `None` for `catch { … }`.
    pub param: Option<Pat>,
    /// The catch block.
    pub body: BlockStmt,
}

/// `return argument?;`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Optional return value.
    pub argument: Option<Box<Expr>>,
}

/// `throw argument;`
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The thrown value.
    pub argument: Box<Expr>,
}

/// `break label?;`
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Optional target label.
    pub label: Option<Ident>,
}

/// `continue label?;`
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Optional target label.
    pub label: Option<Ident>,
}

/// `label: body`
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The label identifier.
    pub label: Ident,
    /// The labeled statement.
    pub body: Box<Stmt>,
}

/// `debugger;`
#[derive(Debug, Clone, PartialEq)]
pub struct DebuggerStmt {
    /// Position and comments.
    pub meta: NodeMeta,
}

/// `with (object) body`
#[derive(Debug, Clone, PartialEq)]
pub struct WithStmt {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The scope object.
    pub object: Box<Expr>,
    /// The body statement.
    pub body: Box<Stmt>,
}

/// Empty statement `;`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    /// Position and comments.
    pub meta: NodeMeta,
}

// ─────────────────────────────────────────────────────────────────────────────
// Variable declarations
// ─────────────────────────────────────────────────────────────────────────────

/// `var / let / const declarators`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Declaration keyword.
    pub kind: VarKind,
    /// One or more declarators.
    pub declarators: Vec<VarDeclarator>,
}

/// Whether a variable declaration uses `var`, `let`, or `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// `var`: function-scoped.
    Var,
    /// `let`: block-scoped, reassignable.
    Let,
    /// `const`: block-scoped, non-reassignable.
    Const,
}

/// A single `pattern [= initializer]` in a variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The binding pattern.
    pub id: Pat,
    /// Optional initializer expression.
    pub init: Option<Box<Expr>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Functions
// ─────────────────────────────────────────────────────────────────────────────

/// `function [id] (params) { body }` in declaration, expression, or method
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Name; always `Some` for declarations outside `export default`.
    pub id: Option<Ident>,
    /// `true` for `async function`.
    pub is_async: bool,
    /// `true` for generator functions (`function*`).
    pub is_generator: bool,
    /// Parameter list.
    pub params: Vec<Param>,
    /// Function body.
    pub body: BlockStmt,
}

/// `[async] (params) => body`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `true` for `async (…) => …`.
    pub is_async: bool,
    /// Parameter list.
    pub params: Vec<Param>,
    /// Either a block body `{ … }` or a concise expression body.
    pub body: ArrowBody,
}

/// The body of an arrow function.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    /// `{ statements }` block body.
    Block(BlockStmt),
    /// Concise expression body.
    Expr(Box<Expr>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────────────

/// `class [id] [extends superClass] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Class name; always `Some` for declarations outside `export default`.
    pub id: Option<Ident>,
    /// Optional super-class expression.
    pub super_class: Option<Box<Expr>>,
    /// Members: methods, fields, and static blocks.
    pub body: Vec<ClassMember>,
}

/// A member inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// A method definition (`constructor`, regular, getter, or setter).
    Method(MethodDef),
    /// A class field.
    Property(PropertyDef),
    /// A `static { … }` initialization block.
    StaticBlock(StaticBlock),
}

/// `[static] [get|set] key(params) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `true` for `static` methods.
    pub is_static: bool,
    /// `constructor`, `method`, `get`, or `set`.
    pub kind: MethodKind,
    /// The property key.
    pub key: PropKey,
    /// `true` when the key is a computed expression `[expr]`.
    pub is_computed: bool,
    /// The method's function value.
    pub value: Function,
}

/// The variant of a method definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// `constructor`.
    Constructor,
    /// Regular method.
    Method,
    /// Getter (`get key() { … }`).
    Get,
    /// Setter (`set key(v) { … }`).
    Set,
}

/// `[static] key [= value]`: class field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDef {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `true` for static fields.
    pub is_static: bool,
    /// The field key.
    pub key: PropKey,
    /// `true` when the key is a computed expression `[expr]`.
    pub is_computed: bool,
    /// Optional field initializer.
    pub value: Option<Box<Expr>>,
}

/// `static { … }` initialization block inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBlock {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Body statements.
    pub body: Vec<Stmt>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Module declarations
// ─────────────────────────────────────────────────────────────────────────────

/// A top-level module declaration (`import` or `export`).
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleDecl {
    /// `import … from "source"`
    Import(ImportDecl),
    /// `export { … } [from "source"]` or `export declaration`
    ExportNamed(ExportNamedDecl),
    /// `export default …`
    ExportDefault(ExportDefaultDecl),
    /// `export * [as name] from "source"`
    ExportAll(ExportAllDecl),
}

/// `import specifiers from "source"`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The imported bindings.
    pub specifiers: Vec<ImportSpecifier>,
    /// The module specifier string.
    pub source: StringLit,
}

/// Which form an import specifier takes.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportKind {
    /// `{ imported as local }` or `{ local }`.
    Named(ModuleExportName),
    /// `local`: the default export.
    Default,
    /// `* as local`.
    Namespace,
}

/// A single binding inside an `import` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Named, default, or namespace import.
    pub kind: ImportKind,
    /// The local binding name.
    pub local: Ident,
}

/// `export { specifiers } [from "source"]` or `export declaration`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNamedDecl {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Named export specifiers.
    pub specifiers: Vec<ExportSpecifier>,
    /// Re-export source, if present.
    pub source: Option<StringLit>,
    /// Inline declaration (`export function f() { … }`, etc.).
    pub declaration: Option<Box<Stmt>>,
}

/// `{ local as exported }`: named export specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The local (or re-exported) name.
    pub local: ModuleExportName,
    /// The exported name.
    pub exported: ModuleExportName,
}

/// `export default expression | function | class`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDefaultDecl {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The exported default value.
    pub declaration: ExportDefaultExpr,
}

/// The exported item in an `export default …` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefaultExpr {
    /// `export default function [id] (…) { … }`
    Fn(Box<Function>),
    /// `export default class [id] { … }`
    Class(Box<Class>),
    /// `export default expr`
    Expr(Box<Expr>),
}

/// `export * [as name] from "source"`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportAllDecl {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Optional re-export alias (`as name`).
    pub exported: Option<ModuleExportName>,
    /// The source module specifier.
    pub source: StringLit,
}

/// An identifier or string literal used as a module export/import name.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleExportName {
    /// Plain identifier.
    Ident(Ident),
    /// String literal.
    Str(StringLit),
}

// ─────────────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────────────

/// `null` literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NullLit {
    /// Position and comments.
    pub meta: NodeMeta,
}

/// `true` or `false` literal.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolLit {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The boolean value.
    pub value: bool,
}

/// Numeric literal. Always non-negative; negation is a unary minus.
#[derive(Debug, Clone, PartialEq)]
pub struct NumLit {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The numeric value.
    pub value: f64,
}

/// BigInt literal (e.g. `42n`).
#[derive(Debug, Clone, PartialEq)]
pub struct BigIntLit {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The digits, without the trailing `n`.
    pub value: String,
}

/// String literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The decoded string value.
    pub value: String,
}

/// Regular-expression literal `/pattern/flags`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegExpLit {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The pattern string.
    pub pattern: String,
    /// The flag characters.
    pub flags: String,
}

/// `` `quasis ${expressions} quasis` ``: template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLit {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The string parts (one more than `expressions`).
    pub quasis: Vec<TemplateElement>,
    /// The interpolated expressions.
    pub expressions: Vec<Expr>,
}

/// A static string fragment inside a template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Raw source text of this fragment.
    pub raw: String,
    /// Cooked value; `None` if the fragment has an invalid escape.
    pub cooked: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────────────

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // ── Literals ──────────────────────────────────────────────────────────
    /// `null`
    Null(NullLit),
    /// `true` / `false`
    Bool(BoolLit),
    /// Numeric literal.
    Num(NumLit),
    /// String literal.
    Str(StringLit),
    /// BigInt literal (`42n`).
    BigInt(BigIntLit),
    /// Regular-expression literal.
    Regexp(RegExpLit),
    /// Template literal.
    Template(Box<TemplateLit>),

    // ── Primary ───────────────────────────────────────────────────────────
    /// Identifier reference.
    Ident(Ident),
    /// `this`
    This(ThisExpr),
    /// `super` (only as a member object or call callee).
    Super(SuperExpr),
    /// Array literal `[elements]`.
    Array(Box<ArrayExpr>),
    /// Object literal `{ properties }`.
    Object(Box<ObjectExpr>),

    // ── Function-like ─────────────────────────────────────────────────────
    /// Function expression.
    Fn(Box<Function>),
    /// Arrow function expression.
    Arrow(Box<ArrowExpr>),
    /// Class expression.
    Class(Box<Class>),

    // ── Operators ─────────────────────────────────────────────────────────
    /// Unary prefix operator.
    Unary(Box<UnaryExpr>),
    /// `++` / `--` update expression.
    Update(Box<UpdateExpr>),
    /// Binary infix operator.
    Binary(Box<BinaryExpr>),
    /// Logical `&&` / `||` / `??` operator.
    Logical(Box<LogicalExpr>),
    /// `test ? consequent : alternate`
    Conditional(Box<ConditionalExpr>),
    /// Assignment expression (`=`, `+=`, …).
    Assign(Box<AssignExpr>),
    /// Comma-separated sequence `(a, b, c)`.
    Sequence(Box<SequenceExpr>),

    // ── Member / call ─────────────────────────────────────────────────────
    /// `object.property`, `object[expr]`, or the optional `?.` forms.
    Member(Box<MemberExpr>),
    /// `callee(args)` or `callee?.(args)`
    Call(Box<CallExpr>),
    /// `new callee(args)`
    New(Box<NewExpr>),
    /// `` tag`template` ``
    TaggedTemplate(Box<TaggedTemplateExpr>),
    /// `...argument` inside an array literal or argument list.
    Spread(Box<SpreadElement>),

    // ── Async / generator ─────────────────────────────────────────────────
    /// `yield [*] [argument]`
    Yield(Box<YieldExpr>),
    /// `await argument`
    Await(Box<AwaitExpr>),

    // ── Dynamic import / meta ─────────────────────────────────────────────
    /// `import(source)`
    Import(Box<ImportExpr>),
    /// `import.meta` or `new.target`
    MetaProp(MetaPropExpr),
}

impl Expr {
    /// Returns the metadata of this expression.
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Expr::Null(e) => &e.meta,
            Expr::Bool(e) => &e.meta,
            Expr::Num(e) => &e.meta,
            Expr::Str(e) => &e.meta,
            Expr::BigInt(e) => &e.meta,
            Expr::Regexp(e) => &e.meta,
            Expr::Template(e) => &e.meta,
            Expr::Ident(e) => &e.meta,
            Expr::This(e) => &e.meta,
            Expr::Super(e) => &e.meta,
            Expr::Array(e) => &e.meta,
            Expr::Object(e) => &e.meta,
            Expr::Fn(e) => &e.meta,
            Expr::Arrow(e) => &e.meta,
            Expr::Class(e) => &e.meta,
            Expr::Unary(e) => &e.meta,
            Expr::Update(e) => &e.meta,
            Expr::Binary(e) => &e.meta,
            Expr::Logical(e) => &e.meta,
            Expr::Conditional(e) => &e.meta,
            Expr::Assign(e) => &e.meta,
            Expr::Sequence(e) => &e.meta,
            Expr::Member(e) => &e.meta,
            Expr::Call(e) => &e.meta,
            Expr::New(e) => &e.meta,
            Expr::TaggedTemplate(e) => &e.meta,
            Expr::Spread(e) => &e.meta,
            Expr::Yield(e) => &e.meta,
            Expr::Await(e) => &e.meta,
            Expr::Import(e) => &e.meta,
            Expr::MetaProp(e) => &e.meta,
        }
    }

    /// Returns the mutable metadata of this expression.
    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Expr::Null(e) => &mut e.meta,
            Expr::Bool(e) => &mut e.meta,
            Expr::Num(e) => &mut e.meta,
            Expr::Str(e) => &mut e.meta,
            Expr::BigInt(e) => &mut e.meta,
            Expr::Regexp(e) => &mut e.meta,
            Expr::Template(e) => &mut e.meta,
            Expr::Ident(e) => &mut e.meta,
            Expr::This(e) => &mut e.meta,
            Expr::Super(e) => &mut e.meta,
            Expr::Array(e) => &mut e.meta,
            Expr::Object(e) => &mut e.meta,
            Expr::Fn(e) => &mut e.meta,
            Expr::Arrow(e) => &mut e.meta,
            Expr::Class(e) => &mut e.meta,
            Expr::Unary(e) => &mut e.meta,
            Expr::Update(e) => &mut e.meta,
            Expr::Binary(e) => &mut e.meta,
            Expr::Logical(e) => &mut e.meta,
            Expr::Conditional(e) => &mut e.meta,
            Expr::Assign(e) => &mut e.meta,
            Expr::Sequence(e) => &mut e.meta,
            Expr::Member(e) => &mut e.meta,
            Expr::Call(e) => &mut e.meta,
            Expr::New(e) => &mut e.meta,
            Expr::TaggedTemplate(e) => &mut e.meta,
            Expr::Spread(e) => &mut e.meta,
            Expr::Yield(e) => &mut e.meta,
            Expr::Await(e) => &mut e.meta,
            Expr::Import(e) => &mut e.meta,
            Expr::MetaProp(e) => &mut e.meta,
        }
    }

    /// Returns the source span of this expression.
    pub fn loc(&self) -> Span {
        self.meta().loc
    }

    /// `true` for function expressions and arrows.
    pub fn is_function(&self) -> bool {
        matches!(self, Expr::Fn(_) | Expr::Arrow(_))
    }
}

/// `this`
#[derive(Debug, Clone, PartialEq)]
pub struct ThisExpr {
    /// Position and comments.
    pub meta: NodeMeta,
}

/// `super`
#[derive(Debug, Clone, PartialEq)]
pub struct SuperExpr {
    /// Position and comments.
    pub meta: NodeMeta,
}

/// Array literal: `[elements]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Elements, where `None` represents an elision (`,`).
    pub elements: Vec<Option<Expr>>,
}

/// Object literal: `{ properties }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Property list.
    pub properties: Vec<ObjectProp>,
}

/// A single property (or spread) in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProp {
    /// `key: value`, shorthand, getter/setter, or method.
    Prop(Box<Prop>),
    /// `...expr` spread property.
    Spread(SpreadElement),
}

/// A concrete property in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The property key.
    pub key: PropKey,
    /// `true` when the key is a computed expression `[expr]`.
    pub is_computed: bool,
    /// The value/kind of this property.
    pub value: PropValue,
}

/// The key in an object property or class member.
#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    /// Identifier key.
    Ident(Ident),
    /// Private identifier key (`#name`).
    Private(PrivateIdent),
    /// String literal key.
    Str(StringLit),
    /// Numeric literal key.
    Num(NumLit),
    /// Computed key `[expr]`.
    Computed(Box<Expr>),
}

/// The value of a property in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// `key: value`: standard property.
    Value(Box<Expr>),
    /// `{ key }`: shorthand; the identifier key is also the value.
    Shorthand,
    /// `get key() { … }`: getter.
    Get(Function),
    /// `set key(v) { … }`: setter.
    Set(Function),
    /// `key(params) { … }`: method.
    Method(Function),
}

/// What a [`Prop`] defines, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// `key: value`
    Init,
    /// `{ key }`
    Shorthand,
    /// `get key() { … }`
    Get,
    /// `set key(v) { … }`
    Set,
    /// `key() { … }`
    Method,
}

impl PropValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> PropKind {
        match self {
            PropValue::Value(_) => PropKind::Init,
            PropValue::Shorthand => PropKind::Shorthand,
            PropValue::Get(_) => PropKind::Get,
            PropValue::Set(_) => PropKind::Set,
            PropValue::Method(_) => PropKind::Method,
        }
    }
}

/// `...argument`: spread element in array literals, calls, and objects.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadElement {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The spread argument.
    pub argument: Box<Expr>,
}

/// Unary prefix expression: `op argument`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The unary operator.
    pub op: UnaryOp,
    /// The operand.
    pub argument: Box<Expr>,
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `!`
    Not,
    /// `~`
    BitNot,
    /// `typeof`
    Typeof,
    /// `void`
    Void,
    /// `delete`
    Delete,
}

/// `++` / `--` update expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `++` or `--`.
    pub op: UpdateOp,
    /// `true` for prefix, `false` for postfix.
    pub prefix: bool,
    /// The operand (an identifier or member expression).
    pub argument: Box<Expr>,
}

/// The increment / decrement operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

/// Binary infix expression: `left op right`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The binary operator.
    pub op: BinaryOp,
    /// Left operand.
    pub left: Box<Expr>,
    /// Right operand.
    pub right: Box<Expr>,
}

/// A binary (non-assignment, non-logical) infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `===`
    StrictEq,
    /// `!==`
    StrictNotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `**`
    Exp,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `in`
    In,
    /// `instanceof`
    Instanceof,
}

/// Logical short-circuit expression: `left op right`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The logical operator.
    pub op: LogicalOp,
    /// Left operand.
    pub left: Box<Expr>,
    /// Right operand.
    pub right: Box<Expr>,
}

/// A logical (short-circuit) operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    NullishCoalesce,
}

/// `test ? consequent : alternate`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The condition.
    pub test: Box<Expr>,
    /// Taken branch.
    pub consequent: Box<Expr>,
    /// Not-taken branch.
    pub alternate: Box<Expr>,
}

/// Assignment expression: `left op right`.
///
/// The target is a pattern: a plain name is `Pat::Ident`, a member target is
/// `Pat::Expr`, and destructuring uses the array/object pattern forms.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The assignment operator.
    pub op: AssignOp,
    /// Assignment target.
    pub left: Pat,
    /// Right-hand side.
    pub right: Box<Expr>,
}

/// An assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    RemAssign,
    /// `**=`
    ExpAssign,
    /// `<<=`
    ShlAssign,
    /// `>>=`
    ShrAssign,
    /// `>>>=`
    UShrAssign,
    /// `|=`
    BitOrAssign,
    /// `^=`
    BitXorAssign,
    /// `&=`
    BitAndAssign,
    /// `&&=`
    LogicalAndAssign,
    /// `||=`
    LogicalOrAssign,
    /// `??=`
    NullishAssign,
}

/// Comma-separated sequence expression: `(a, b, c)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The expressions in order.
    pub expressions: Vec<Expr>,
}

/// `object.property`, `object[expr]`, `object?.property`, `object?.[expr]`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The object.
    pub object: Box<Expr>,
    /// The property key.
    pub property: MemberProp,
    /// `true` for the `?.` forms.
    pub optional: bool,
}

impl MemberExpr {
    /// `true` for computed access `object[expr]`.
    pub fn is_computed(&self) -> bool {
        matches!(self.property, MemberProp::Computed(_))
    }
}

/// The property part of a member expression.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    /// Static identifier (`.name`).
    Ident(Ident),
    /// Private identifier (`.#name`).
    Private(PrivateIdent),
    /// Computed expression (`[expr]`).
    Computed(Box<Expr>),
}

/// `callee(arguments)` or `callee?.(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The function being called.
    pub callee: Box<Expr>,
    /// Argument list.
    pub arguments: Vec<Expr>,
    /// `true` for `callee?.(…)`.
    pub optional: bool,
}

/// `new callee(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The constructor.
    pub callee: Box<Expr>,
    /// Argument list.
    pub arguments: Vec<Expr>,
}

/// `` tag`template` ``: tagged template expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTemplateExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The tag function.
    pub tag: Box<Expr>,
    /// The template literal.
    pub quasi: TemplateLit,
}

/// `yield [*] [argument]`
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// `true` for `yield*`.
    pub delegate: bool,
    /// Optional value to yield.
    pub argument: Option<Box<Expr>>,
}

/// `await argument`
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The awaited value.
    pub argument: Box<Expr>,
}

/// `import(source [, options])`: dynamic import expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The module specifier.
    pub source: Box<Expr>,
    /// Import attributes object.
    pub options: Option<Box<Expr>>,
}

/// `import.meta` or `new.target`
#[derive(Debug, Clone, PartialEq)]
pub struct MetaPropExpr {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The meta object (`import` or `new`).
    pub object: Ident,
    /// The property name (`meta` or `target`).
    pub property: Ident,
}

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// A binding or assignment pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pat {
    /// Simple identifier binding.
    Ident(Ident),
    /// Array destructuring `[a, b, ...rest]`.
    Array(Box<ArrayPat>),
    /// Object destructuring `{ a, b: c, ...rest }`.
    Object(Box<ObjectPat>),
    /// Rest element `...pattern`.
    Rest(Box<RestElement>),
    /// Default-value binding `pattern = default`.
    Assign(Box<AssignPat>),
    /// Member-expression target; only valid in assignment position.
    Expr(Box<Expr>),
}

impl Pat {
    /// Returns the metadata of this pattern.
    pub fn meta(&self) -> &NodeMeta {
        match self {
            Pat::Ident(p) => &p.meta,
            Pat::Array(p) => &p.meta,
            Pat::Object(p) => &p.meta,
            Pat::Rest(p) => &p.meta,
            Pat::Assign(p) => &p.meta,
            Pat::Expr(e) => e.meta(),
        }
    }

    /// Returns the mutable metadata of this pattern.
    pub fn meta_mut(&mut self) -> &mut NodeMeta {
        match self {
            Pat::Ident(p) => &mut p.meta,
            Pat::Array(p) => &mut p.meta,
            Pat::Object(p) => &mut p.meta,
            Pat::Rest(p) => &mut p.meta,
            Pat::Assign(p) => &mut p.meta,
            Pat::Expr(e) => e.meta_mut(),
        }
    }

    /// Returns the source span of this pattern.
    pub fn loc(&self) -> Span {
        self.meta().loc
    }
}

/// Array destructuring pattern: `[a, , b, ...rest]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPat {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Elements, where `None` represents an elision.
    pub elements: Vec<Option<Pat>>,
}

/// Object destructuring pattern: `{ a, b: c, ...rest }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPat {
    /// Position and comments.
    pub meta: NodeMeta,
    /// Property patterns.
    pub properties: Vec<ObjectPatProp>,
}

/// A single property inside an object destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatProp {
    /// `key: pat`: key-value property.
    KeyValue(KeyValuePatProp),
    /// `id [= default]`: shorthand property (key == binding name).
    Assign(AssignPatProp),
    /// `...rest`: rest property.
    Rest(RestElement),
}

/// `key: pattern` in an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePatProp {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The property key.
    pub key: PropKey,
    /// `true` when the key is a computed expression.
    pub is_computed: bool,
    /// The value pattern.
    pub value: Pat,
}

/// Shorthand `{ id [= default] }` in an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignPatProp {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The identifier used as both key and binding.
    pub key: Ident,
    /// Optional default value.
    pub value: Option<Box<Expr>>,
}

/// `...pattern`: rest element in patterns or parameter lists.
#[derive(Debug, Clone, PartialEq)]
pub struct RestElement {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The rest binding target.
    pub argument: Box<Pat>,
}

/// `pattern = default`: default-value pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignPat {
    /// Position and comments.
    pub meta: NodeMeta,
    /// The binding pattern.
    pub left: Box<Pat>,
    /// The default expression.
    pub right: Box<Expr>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
