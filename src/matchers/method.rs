use super::{Matcher, MatcherExt, any_of};
use crate::model::{SemanticModel, Symbol, SymbolKind, Type};
use crate::state::VisitorState;
use crate::tree::{Node, NodeKind, PrimitiveKind};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodKind {
    Instance,
    Static,
    Any,
    Constructor,
}

#[derive(Debug, Clone)]
enum ClassFilter {
    Any,
    /// Declaring class is exactly this one.
    Owner(&'static str),
    /// Receiver (or constructed) type is exactly this one.
    Exact(&'static str),
    Descendant(&'static str),
}

#[derive(Debug, Clone)]
enum NameFilter {
    Any,
    Exact(&'static str),
    AnyOf(&'static [&'static str]),
    Pattern(Regex),
}

impl NameFilter {
    fn accepts(&self, name: &str) -> bool {
        match self {
            NameFilter::Any => true,
            NameFilter::Exact(n) => *n == name,
            NameFilter::AnyOf(names) => names.contains(&name),
            NameFilter::Pattern(re) => re.is_match(name),
        }
    }
}

/// Matches method invocations (or constructor calls) by receiver class,
/// method name and erased parameter types.
///
/// ```
/// use java_clippy::matchers::{instance_method, static_method};
///
/// let get = instance_method().on_descendant_of("java.util.Map").named("get");
/// let eq = static_method()
///     .on_class("java.util.Objects")
///     .named("equals")
///     .with_parameters(&["java.lang.Object", "java.lang.Object"]);
/// # let _ = (get, eq);
/// ```
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    kind: MethodKind,
    class: ClassFilter,
    name: NameFilter,
    params: Option<Vec<&'static str>>,
}

fn start(kind: MethodKind) -> MethodMatcher {
    MethodMatcher {
        kind,
        class: ClassFilter::Any,
        name: NameFilter::Any,
        params: None,
    }
}

pub fn instance_method() -> MethodMatcher {
    start(MethodKind::Instance)
}

pub fn static_method() -> MethodMatcher {
    start(MethodKind::Static)
}

pub fn any_method() -> MethodMatcher {
    start(MethodKind::Any)
}

pub fn constructor() -> MethodMatcher {
    start(MethodKind::Constructor)
}

impl MethodMatcher {
    #[must_use]
    pub fn on_class(mut self, class: &'static str) -> Self {
        self.class = ClassFilter::Owner(class);
        self
    }

    #[must_use]
    pub fn on_exact_class(mut self, class: &'static str) -> Self {
        self.class = ClassFilter::Exact(class);
        self
    }

    #[must_use]
    pub fn on_descendant_of(mut self, class: &'static str) -> Self {
        self.class = ClassFilter::Descendant(class);
        self
    }

    #[must_use]
    pub fn any_class(mut self) -> Self {
        self.class = ClassFilter::Any;
        self
    }

    /// Constructors of exactly this class.
    #[must_use]
    pub fn for_class(mut self, class: &'static str) -> Self {
        self.class = ClassFilter::Exact(class);
        self
    }

    #[must_use]
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = NameFilter::Exact(name);
        self
    }

    #[must_use]
    pub fn named_any_of(mut self, names: &'static [&'static str]) -> Self {
        self.name = NameFilter::AnyOf(names);
        self
    }

    #[must_use]
    pub fn with_name_matching(mut self, pattern: Regex) -> Self {
        self.name = NameFilter::Pattern(pattern);
        self
    }

    #[must_use]
    pub fn with_any_name(mut self) -> Self {
        self.name = NameFilter::Any;
        self
    }

    /// Erased parameter types, qualified (`java.lang.Object`) or primitive.
    #[must_use]
    pub fn with_parameters(mut self, params: &[&'static str]) -> Self {
        self.params = Some(params.to_vec());
        self
    }

    #[must_use]
    pub fn with_no_parameters(mut self) -> Self {
        self.params = Some(Vec::new());
        self
    }

    fn kind_accepts(&self, node: Node<'_>, sym: Option<&Symbol>) -> bool {
        match self.kind {
            MethodKind::Constructor => node.kind() == NodeKind::NewClass,
            _ if node.kind() != NodeKind::MethodInvocation => false,
            MethodKind::Any => sym.is_some_and(|s| s.kind == SymbolKind::Method),
            MethodKind::Instance => {
                sym.is_some_and(|s| s.kind == SymbolKind::Method && !s.is_static())
            }
            MethodKind::Static => {
                sym.is_some_and(|s| s.kind == SymbolKind::Method && s.is_static())
            }
        }
    }

    /// Type the call is made on: the constructed type, the receiver's type,
    /// the enclosing class for an implicit `this`, or the declaring class of
    /// a static method.
    fn site_type(node: Node<'_>, sym: Option<&Symbol>) -> Option<Type> {
        if node.kind() == NodeKind::NewClass {
            return node.ty().cloned();
        }
        let sym = sym?;
        if sym.is_static() {
            return sym.owner.map(Type::class);
        }
        match node.receiver() {
            Some(r) => r.ty().cloned(),
            None => {
                let class = node.enclosing(NodeKind::Class)?;
                class.symbol().map(Type::class)
            }
        }
    }

    fn class_accepts(&self, node: Node<'_>, sym: Option<&Symbol>, model: &SemanticModel) -> bool {
        let qualified_is = |ty: &Type, name: &str| {
            model
                .erasure(&model.upper_bound(ty))
                .class_sym()
                .is_some_and(|s| model.qualified_name(s) == name)
        };
        match &self.class {
            ClassFilter::Any => true,
            ClassFilter::Owner(name) => match (node.kind(), sym) {
                (NodeKind::NewClass, _) => {
                    Self::site_type(node, sym).is_some_and(|t| qualified_is(&t, name))
                }
                (_, Some(s)) => s.owner.is_some_and(|o| model.qualified_name(o) == *name),
                _ => false,
            },
            ClassFilter::Exact(name) => {
                Self::site_type(node, sym).is_some_and(|t| qualified_is(&t, name))
            }
            ClassFilter::Descendant(name) => {
                let (Some(site), Some(target)) =
                    (Self::site_type(node, sym), model.resolve_class(name))
                else {
                    return false;
                };
                model
                    .upper_bound(&site)
                    .class_sym()
                    .is_some_and(|s| model.is_subclass(s, target))
            }
        }
    }

    fn params_accept(&self, sym: Option<&Symbol>, model: &SemanticModel) -> bool {
        let Some(want) = &self.params else {
            return true;
        };
        let Some(sym) = sym else {
            return false;
        };
        sym.params.len() == want.len()
            && sym.params.iter().zip(want).all(|(p, w)| {
                let erased = model.erasure(p);
                model.display_type_qualified(&erased) == *w || model.display_type(&erased) == *w
            })
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, node: Node<'_>, state: &VisitorState<'_>) -> bool {
        let sym = state.symbol(node);
        if !self.kind_accepts(node, sym) {
            return false;
        }
        let name = match (node.kind(), sym) {
            (NodeKind::NewClass, _) => "<init>",
            (_, Some(s)) => s.name.as_str(),
            _ => return false,
        };
        if self.kind != MethodKind::Constructor && !self.name.accepts(name) {
            return false;
        }
        self.class_accepts(node, sym, state.model()) && self.params_accept(sym, state.model())
    }
}

/// `Objects.equals(a, b)` or Guava's `Objects.equal(a, b)`.
pub fn static_equals_invocation() -> impl Matcher {
    any_of([
        static_method()
            .on_class("java.util.Objects")
            .named("equals")
            .with_parameters(&["java.lang.Object", "java.lang.Object"])
            .boxed(),
        static_method()
            .on_class("com.google.common.base.Objects")
            .named("equal")
            .with_parameters(&["java.lang.Object", "java.lang.Object"])
            .boxed(),
    ])
}

/// `a.equals(b)` resolving to a `boolean equals(Object)` method.
pub fn instance_equals_invocation() -> impl Matcher {
    let equals = instance_method()
        .any_class()
        .named("equals")
        .with_parameters(&["java.lang.Object"]);
    move |node: Node<'_>, state: &VisitorState<'_>| {
        equals.matches(node, state)
            && state
                .symbol(node)
                .is_some_and(|s| s.ty == Type::Primitive(PrimitiveKind::Boolean))
    }
}
