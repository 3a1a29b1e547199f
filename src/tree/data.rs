use super::NodeId;
use crate::model::Modifiers;
use std::fmt;

/// Java primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Some(match s {
            "boolean" => PrimitiveKind::Boolean,
            "byte" => PrimitiveKind::Byte,
            "short" => PrimitiveKind::Short,
            "char" => PrimitiveKind::Char,
            "int" => PrimitiveKind::Int,
            "long" => PrimitiveKind::Long,
            "float" => PrimitiveKind::Float,
            "double" => PrimitiveKind::Double,
            _ => return None,
        })
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::Short
                | PrimitiveKind::Char
                | PrimitiveKind::Int
                | PrimitiveKind::Long
        )
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, PrimitiveKind::Boolean)
    }

    /// Fully qualified name of the wrapper class.
    pub fn boxed_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    /// Inclusive value range for integral kinds.
    pub fn range(&self) -> Option<(i64, i64)> {
        match self {
            PrimitiveKind::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            PrimitiveKind::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            PrimitiveKind::Char => Some((0, u16::MAX as i64)),
            PrimitiveKind::Int => Some((i32::MIN as i64, i32::MAX as i64)),
            PrimitiveKind::Long => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Rank in the widening chain `byte < short < int < long < float < double`.
    /// `char` widens to `int` but not from `byte`/`short`.
    pub(crate) fn widening_rank(&self) -> u8 {
        match self {
            PrimitiveKind::Boolean => 0,
            PrimitiveKind::Byte => 1,
            PrimitiveKind::Short | PrimitiveKind::Char => 2,
            PrimitiveKind::Int => 3,
            PrimitiveKind::Long => 4,
            PrimitiveKind::Float => 5,
            PrimitiveKind::Double => 6,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A compile-time constant value.
///
/// Floating point values are stored as raw bits so the type stays `Eq + Hash`
/// and can key the truthiness multisets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Int(i32),
    Long(i64),
    Char(u16),
    Bool(bool),
    Str(String),
    Float(u32),
    Double(u64),
}

impl ConstValue {
    pub fn float(v: f32) -> Self {
        ConstValue::Float(v.to_bits())
    }

    pub fn double(v: f64) -> Self {
        ConstValue::Double(v.to_bits())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral value widened to `i64`. `char` is treated as its code unit.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConstValue::Int(v) => Some(*v as i64),
            ConstValue::Long(v) => Some(*v),
            ConstValue::Char(c) => Some(*c as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            ConstValue::Int(_) => PrimitiveKind::Int,
            ConstValue::Long(_) => PrimitiveKind::Long,
            ConstValue::Char(_) => PrimitiveKind::Char,
            ConstValue::Bool(_) => PrimitiveKind::Boolean,
            ConstValue::Float(_) => PrimitiveKind::Float,
            ConstValue::Double(_) => PrimitiveKind::Double,
            ConstValue::Str(_) => return None,
        })
    }
}

impl fmt::Display for ConstValue {
    /// Renders the value as Java source.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::Long(v) => write!(f, "{v}L"),
            ConstValue::Char(c) => match char::from_u32(*c as u32) {
                Some('\'') => f.write_str("'\\''"),
                Some('\\') => f.write_str("'\\\\'"),
                Some(ch) if !ch.is_control() => write!(f, "'{ch}'"),
                _ => write!(f, "'\\u{c:04x}'"),
            },
            ConstValue::Bool(b) => write!(f, "{b}"),
            ConstValue::Str(s) => write!(f, "{s:?}"),
            ConstValue::Float(bits) => write!(f, "{}f", f32::from_bits(*bits)),
            ConstValue::Double(bits) => write!(f, "{}", f64::from_bits(*bits)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Value(ConstValue),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        })
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr)
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// Typed payload of a tree node. Child references are [`NodeId`]s into the
/// owning tree.
#[derive(Debug, Clone)]
pub enum NodeData {
    CompilationUnit {
        package: Option<NodeId>,
        imports: Vec<NodeId>,
        types: Vec<NodeId>,
    },
    Package {
        name: String,
    },
    Import {
        name: String,
        is_static: bool,
    },
    Class {
        name: String,
        class_kind: ClassKind,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        extends: Option<NodeId>,
        implements: Vec<NodeId>,
        members: Vec<NodeId>,
    },
    Method {
        name: String,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        /// `None` for constructors.
        return_type: Option<NodeId>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    Variable {
        name: String,
        modifiers: Modifiers,
        annotations: Vec<NodeId>,
        /// `None` for implicitly typed lambda parameters and `var`.
        var_type: Option<NodeId>,
        init: Option<NodeId>,
    },
    Block {
        stmts: Vec<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Vec<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    EnhancedFor {
        var: NodeId,
        expr: NodeId,
        body: NodeId,
    },
    Return {
        expr: Option<NodeId>,
    },
    Throw {
        expr: NodeId,
    },
    Break,
    Continue,
    ExpressionStatement {
        expr: NodeId,
    },
    Try {
        block: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch {
        param: NodeId,
        body: NodeId,
    },
    Switch {
        selector: NodeId,
        body: Vec<NodeId>,
    },
    Lambda {
        params: Vec<NodeId>,
        body: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Conditional {
        cond: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    Parenthesized {
        expr: NodeId,
    },
    Literal(Literal),
    Identifier {
        name: String,
    },
    MemberSelect {
        expr: NodeId,
        name: String,
    },
    MethodInvocation {
        receiver: Option<NodeId>,
        name: String,
        args: Vec<NodeId>,
    },
    NewClass {
        class_type: NodeId,
        args: Vec<NodeId>,
        body: Option<NodeId>,
    },
    NewArray {
        elem_type: Option<NodeId>,
        dims: Vec<NodeId>,
        elems: Vec<NodeId>,
    },
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    TypeCast {
        target: NodeId,
        expr: NodeId,
    },
    InstanceOf {
        expr: NodeId,
        target: NodeId,
    },
    Assignment {
        target: NodeId,
        value: NodeId,
    },
    CompoundAssignment {
        op: BinaryOp,
        target: NodeId,
        value: NodeId,
    },
    Annotation {
        name: String,
        args: Vec<NodeId>,
    },
    PrimitiveType(PrimitiveKind),
    VoidType,
    TypeName {
        name: String,
        args: Vec<NodeId>,
    },
    ArrayType {
        elem: NodeId,
    },
    /// Syntax the tree has no typed form for. Children are still traversed.
    Other {
        label: String,
        children: Vec<NodeId>,
    },
}

/// Field-less tag for [`NodeData`], used as the dispatch key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    CompilationUnit,
    Package,
    Import,
    Class,
    Method,
    Variable,
    Block,
    If,
    While,
    DoWhile,
    For,
    EnhancedFor,
    Return,
    Throw,
    Break,
    Continue,
    ExpressionStatement,
    Try,
    Catch,
    Switch,
    Lambda,
    Binary,
    Unary,
    Conditional,
    Parenthesized,
    Literal,
    Identifier,
    MemberSelect,
    MethodInvocation,
    NewClass,
    NewArray,
    ArrayAccess,
    TypeCast,
    InstanceOf,
    Assignment,
    CompoundAssignment,
    Annotation,
    PrimitiveType,
    VoidType,
    TypeName,
    ArrayType,
    Other,
}

impl NodeKind {
    pub const ALL: &'static [NodeKind] = &[
        NodeKind::CompilationUnit,
        NodeKind::Package,
        NodeKind::Import,
        NodeKind::Class,
        NodeKind::Method,
        NodeKind::Variable,
        NodeKind::Block,
        NodeKind::If,
        NodeKind::While,
        NodeKind::DoWhile,
        NodeKind::For,
        NodeKind::EnhancedFor,
        NodeKind::Return,
        NodeKind::Throw,
        NodeKind::Break,
        NodeKind::Continue,
        NodeKind::ExpressionStatement,
        NodeKind::Try,
        NodeKind::Catch,
        NodeKind::Switch,
        NodeKind::Lambda,
        NodeKind::Binary,
        NodeKind::Unary,
        NodeKind::Conditional,
        NodeKind::Parenthesized,
        NodeKind::Literal,
        NodeKind::Identifier,
        NodeKind::MemberSelect,
        NodeKind::MethodInvocation,
        NodeKind::NewClass,
        NodeKind::NewArray,
        NodeKind::ArrayAccess,
        NodeKind::TypeCast,
        NodeKind::InstanceOf,
        NodeKind::Assignment,
        NodeKind::CompoundAssignment,
        NodeKind::Annotation,
        NodeKind::PrimitiveType,
        NodeKind::VoidType,
        NodeKind::TypeName,
        NodeKind::ArrayType,
        NodeKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::CompilationUnit => "compilation_unit",
            NodeKind::Package => "package",
            NodeKind::Import => "import",
            NodeKind::Class => "class",
            NodeKind::Method => "method",
            NodeKind::Variable => "variable",
            NodeKind::Block => "block",
            NodeKind::If => "if",
            NodeKind::While => "while",
            NodeKind::DoWhile => "do_while",
            NodeKind::For => "for",
            NodeKind::EnhancedFor => "enhanced_for",
            NodeKind::Return => "return",
            NodeKind::Throw => "throw",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::ExpressionStatement => "expression_statement",
            NodeKind::Try => "try",
            NodeKind::Catch => "catch",
            NodeKind::Switch => "switch",
            NodeKind::Lambda => "lambda",
            NodeKind::Binary => "binary",
            NodeKind::Unary => "unary",
            NodeKind::Conditional => "conditional",
            NodeKind::Parenthesized => "parenthesized",
            NodeKind::Literal => "literal",
            NodeKind::Identifier => "identifier",
            NodeKind::MemberSelect => "member_select",
            NodeKind::MethodInvocation => "method_invocation",
            NodeKind::NewClass => "new_class",
            NodeKind::NewArray => "new_array",
            NodeKind::ArrayAccess => "array_access",
            NodeKind::TypeCast => "type_cast",
            NodeKind::InstanceOf => "instance_of",
            NodeKind::Assignment => "assignment",
            NodeKind::CompoundAssignment => "compound_assignment",
            NodeKind::Annotation => "annotation",
            NodeKind::PrimitiveType => "primitive_type",
            NodeKind::VoidType => "void_type",
            NodeKind::TypeName => "type_name",
            NodeKind::ArrayType => "array_type",
            NodeKind::Other => "other",
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Binary
                | NodeKind::Unary
                | NodeKind::Conditional
                | NodeKind::Parenthesized
                | NodeKind::Literal
                | NodeKind::Identifier
                | NodeKind::MemberSelect
                | NodeKind::MethodInvocation
                | NodeKind::NewClass
                | NodeKind::NewArray
                | NodeKind::ArrayAccess
                | NodeKind::TypeCast
                | NodeKind::InstanceOf
                | NodeKind::Assignment
                | NodeKind::CompoundAssignment
                | NodeKind::Lambda
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::CompilationUnit { .. } => NodeKind::CompilationUnit,
            NodeData::Package { .. } => NodeKind::Package,
            NodeData::Import { .. } => NodeKind::Import,
            NodeData::Class { .. } => NodeKind::Class,
            NodeData::Method { .. } => NodeKind::Method,
            NodeData::Variable { .. } => NodeKind::Variable,
            NodeData::Block { .. } => NodeKind::Block,
            NodeData::If { .. } => NodeKind::If,
            NodeData::While { .. } => NodeKind::While,
            NodeData::DoWhile { .. } => NodeKind::DoWhile,
            NodeData::For { .. } => NodeKind::For,
            NodeData::EnhancedFor { .. } => NodeKind::EnhancedFor,
            NodeData::Return { .. } => NodeKind::Return,
            NodeData::Throw { .. } => NodeKind::Throw,
            NodeData::Break => NodeKind::Break,
            NodeData::Continue => NodeKind::Continue,
            NodeData::ExpressionStatement { .. } => NodeKind::ExpressionStatement,
            NodeData::Try { .. } => NodeKind::Try,
            NodeData::Catch { .. } => NodeKind::Catch,
            NodeData::Switch { .. } => NodeKind::Switch,
            NodeData::Lambda { .. } => NodeKind::Lambda,
            NodeData::Binary { .. } => NodeKind::Binary,
            NodeData::Unary { .. } => NodeKind::Unary,
            NodeData::Conditional { .. } => NodeKind::Conditional,
            NodeData::Parenthesized { .. } => NodeKind::Parenthesized,
            NodeData::Literal(_) => NodeKind::Literal,
            NodeData::Identifier { .. } => NodeKind::Identifier,
            NodeData::MemberSelect { .. } => NodeKind::MemberSelect,
            NodeData::MethodInvocation { .. } => NodeKind::MethodInvocation,
            NodeData::NewClass { .. } => NodeKind::NewClass,
            NodeData::NewArray { .. } => NodeKind::NewArray,
            NodeData::ArrayAccess { .. } => NodeKind::ArrayAccess,
            NodeData::TypeCast { .. } => NodeKind::TypeCast,
            NodeData::InstanceOf { .. } => NodeKind::InstanceOf,
            NodeData::Assignment { .. } => NodeKind::Assignment,
            NodeData::CompoundAssignment { .. } => NodeKind::CompoundAssignment,
            NodeData::Annotation { .. } => NodeKind::Annotation,
            NodeData::PrimitiveType(_) => NodeKind::PrimitiveType,
            NodeData::VoidType => NodeKind::VoidType,
            NodeData::TypeName { .. } => NodeKind::TypeName,
            NodeData::ArrayType { .. } => NodeKind::ArrayType,
            NodeData::Other { .. } => NodeKind::Other,
        }
    }

    /// Child ids in source order.
    pub fn child_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeData::CompilationUnit {
                package,
                imports,
                types,
            } => {
                out.extend(package);
                out.extend(imports);
                out.extend(types);
            }
            NodeData::Class {
                annotations,
                extends,
                implements,
                members,
                ..
            } => {
                out.extend(annotations);
                out.extend(extends);
                out.extend(implements);
                out.extend(members);
            }
            NodeData::Method {
                annotations,
                return_type,
                params,
                body,
                ..
            } => {
                out.extend(annotations);
                out.extend(return_type);
                out.extend(params);
                out.extend(body);
            }
            NodeData::Variable {
                annotations,
                var_type,
                init,
                ..
            } => {
                out.extend(annotations);
                out.extend(var_type);
                out.extend(init);
            }
            NodeData::Block { stmts } => out.extend(stmts),
            NodeData::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.extend(else_branch);
            }
            NodeData::While { cond, body } => out.extend([*cond, *body]),
            NodeData::DoWhile { body, cond } => out.extend([*body, *cond]),
            NodeData::For {
                init,
                cond,
                update,
                body,
            } => {
                out.extend(init);
                out.extend(cond);
                out.extend(update);
                out.push(*body);
            }
            NodeData::EnhancedFor { var, expr, body } => out.extend([*var, *expr, *body]),
            NodeData::Return { expr } => out.extend(expr),
            NodeData::Throw { expr }
            | NodeData::ExpressionStatement { expr }
            | NodeData::Parenthesized { expr } => out.push(*expr),
            NodeData::Try {
                block,
                catches,
                finally,
            } => {
                out.push(*block);
                out.extend(catches);
                out.extend(finally);
            }
            NodeData::Catch { param, body } => out.extend([*param, *body]),
            NodeData::Switch { selector, body } => {
                out.push(*selector);
                out.extend(body);
            }
            NodeData::Lambda { params, body } => {
                out.extend(params);
                out.push(*body);
            }
            NodeData::Binary { lhs, rhs, .. } => out.extend([*lhs, *rhs]),
            NodeData::Unary { operand, .. } => out.push(*operand),
            NodeData::Conditional {
                cond,
                then_expr,
                else_expr,
            } => out.extend([*cond, *then_expr, *else_expr]),
            NodeData::MemberSelect { expr, .. } => out.push(*expr),
            NodeData::MethodInvocation { receiver, args, .. } => {
                out.extend(receiver);
                out.extend(args);
            }
            NodeData::NewClass {
                class_type,
                args,
                body,
            } => {
                out.push(*class_type);
                out.extend(args);
                out.extend(body);
            }
            NodeData::NewArray {
                elem_type,
                dims,
                elems,
            } => {
                out.extend(elem_type);
                out.extend(dims);
                out.extend(elems);
            }
            NodeData::ArrayAccess { array, index } => out.extend([*array, *index]),
            NodeData::TypeCast { target, expr } => out.extend([*target, *expr]),
            NodeData::InstanceOf { expr, target } => out.extend([*expr, *target]),
            NodeData::Assignment { target, value }
            | NodeData::CompoundAssignment { target, value, .. } => {
                out.extend([*target, *value])
            }
            NodeData::Annotation { args, .. } => out.extend(args),
            NodeData::TypeName { args, .. } => out.extend(args),
            NodeData::ArrayType { elem } => out.push(*elem),
            NodeData::Other { children, .. } => out.extend(children),
            NodeData::Package { .. }
            | NodeData::Import { .. }
            | NodeData::Break
            | NodeData::Continue
            | NodeData::Literal(_)
            | NodeData::Identifier { .. }
            | NodeData::PrimitiveType(_)
            | NodeData::VoidType => {}
        }
        out
    }
}
