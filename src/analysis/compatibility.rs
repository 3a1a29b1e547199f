//! Whether values of two types can ever be `equals` to each other.

use crate::checker::Flags;
use crate::model::{SemanticModel, Symbol, Type};
use crate::tree::PrimitiveKind;

const WITHOUT_EQUALS_REASON: &str =
    ". Though these types are the same, the type doesn't implement equals.";

const COLLECTION: &str = "java.util.Collection";

/// Outcome of [`TypeCompatibility::compatibility_of_types`]. When
/// incompatible, `lhs`/`rhs` name the innermost pair that clashed, which may
/// be type arguments of the original operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCompatibilityReport {
    pub compatible: bool,
    pub lhs: Option<Type>,
    pub rhs: Option<Type>,
    pub extra_reason: String,
}

impl TypeCompatibilityReport {
    pub fn compatible() -> Self {
        Self {
            compatible: true,
            lhs: None,
            rhs: None,
            extra_reason: String::new(),
        }
    }

    pub fn incompatible(lhs: &Type, rhs: &Type) -> Self {
        Self::incompatible_because(lhs, rhs, "")
    }

    pub fn incompatible_because(lhs: &Type, rhs: &Type, reason: &str) -> Self {
        Self {
            compatible: false,
            lhs: Some(lhs.clone()),
            rhs: Some(rhs.clone()),
            extra_reason: reason.to_string(),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.compatible
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TypeCompatibility {
    treat_builders_as_incomparable: bool,
}

impl Default for TypeCompatibility {
    fn default() -> Self {
        Self {
            treat_builders_as_incomparable: true,
        }
    }
}

impl TypeCompatibility {
    pub fn new(flags: &Flags) -> Self {
        Self {
            treat_builders_as_incomparable: flags
                .get_bool("TypeCompatibility:TreatBuildersAsIncomparable")
                .unwrap_or(true),
        }
    }

    pub fn compatibility_of_types(
        &self,
        receiver: &Type,
        argument: &Type,
        model: &SemanticModel,
    ) -> TypeCompatibilityReport {
        self.compare(receiver, argument, &[], &[], model)
    }

    fn compare(
        &self,
        left: &Type,
        right: &Type,
        seen_left: &[Type],
        seen_right: &[Type],
        model: &SemanticModel,
    ) -> TypeCompatibilityReport {
        if matches!(left, Type::Null | Type::Void)
            || matches!(right, Type::Null | Type::Void)
            || left.contains_error()
            || right.contains_error()
        {
            return TypeCompatibilityReport::compatible();
        }

        let left_bound = model.upper_bound(left);
        let right_bound = model.upper_bound(right);
        if model.same_type(&left_bound, &right_bound) {
            if self.treat_builders_as_incomparable && is_builder_without_equals(&left_bound, model)
            {
                return TypeCompatibilityReport::incompatible_because(
                    left,
                    right,
                    WITHOUT_EQUALS_REASON,
                );
            }
            return TypeCompatibilityReport::compatible();
        }

        if left.is_primitive() && right.is_primitive() {
            return TypeCompatibilityReport::incompatible(left, right);
        }

        if !is_feasibly_compatible(left, right, model) {
            return TypeCompatibilityReport::incompatible(left, right);
        }

        // Compare type arguments as seen from the nearest shared generic
        // supertype: `Foo extends Super<String>` vs `Bar extends Super<Integer>`.
        let erased_left = model.erasure(left);
        let erased_right = model.erasure(right);
        let common = model.common_supertypes(&erased_left, &erased_right);
        if common.is_empty() {
            return TypeCompatibilityReport::compatible();
        }
        for sup in &common {
            let report = self.generics_mismatch(left, right, sup, seen_left, seen_right, model);
            if !report.is_compatible() {
                return report;
            }
        }

        if are_incompatible_collections(left, right, &common, model) {
            return TypeCompatibilityReport::incompatible(left, right);
        }
        TypeCompatibilityReport::compatible()
    }

    fn generics_mismatch(
        &self,
        left: &Type,
        right: &Type,
        sup: &Type,
        seen_left: &[Type],
        seen_right: &[Type],
        model: &SemanticModel,
    ) -> TypeCompatibilityReport {
        let Some(sup_sym) = sup.class_sym() else {
            return TypeCompatibilityReport::compatible();
        };
        let left_args = type_args_as_super(left, sup_sym, model);
        let right_args = type_args_as_super(right, sup_sym, model);

        let seen = |list: &[Type], t: &Type| list.iter().any(|s| model.same_type(s, t));
        for (l, r) in left_args.iter().zip(&right_args) {
            // f-bounds such as `Super<A extends Super<A, B>, B>` would recurse forever
            if seen(seen_left, l)
                || model.same_type(l, left)
                || seen(seen_right, r)
                || model.same_type(r, right)
            {
                continue;
            }
            let mut next_left = seen_left.to_vec();
            next_left.push(left.clone());
            let mut next_right = seen_right.to_vec();
            next_right.push(right.clone());
            let report = self.compare(l, r, &next_left, &next_right, model);
            if !report.is_compatible() {
                return report;
            }
        }
        TypeCompatibilityReport::compatible()
    }
}

fn type_args_as_super(ty: &Type, sup: crate::model::SymbolId, model: &SemanticModel) -> Vec<Type> {
    model
        .as_super(&model.upper_bound(ty), sup)
        .map(|t| t.type_args().to_vec())
        .unwrap_or_default()
}

/// Castable one way, or both sides inherit an `equals` override from a
/// class other than `Object`/`Enum`.
fn is_feasibly_compatible(left: &Type, right: &Type, model: &SemanticModel) -> bool {
    if model.is_castable(right, left) {
        return true;
    }
    let Some(right_class) = model.upper_bound(right).class_sym() else {
        return false;
    };
    model
        .find_matching_methods(left, "equals", |m| is_custom_equals(m, model))
        .into_iter()
        .filter_map(|m| model.symbol(m).owner)
        .any(|owner| model.is_subclass(right_class, owner))
}

/// An instance `boolean equals(Object)` not declared by `Object` or `Enum`.
pub fn is_custom_equals(method: &Symbol, model: &SemanticModel) -> bool {
    let object = model.object_type();
    let owner_is_root = method.owner.is_some_and(|o| {
        model.is_object(o) || model.qualified_name(o) == "java.lang.Enum"
    });
    !method.is_static()
        && method.name == "equals"
        && method.ty == Type::Primitive(PrimitiveKind::Boolean)
        && method.params.len() == 1
        && model.same_type(&method.params[0], &object)
        && !owner_is_root
}

fn is_builder_without_equals(ty: &Type, model: &SemanticModel) -> bool {
    let Some(sym) = ty.class_sym() else {
        return false;
    };
    let s = model.symbol(sym);
    !s.is_enum()
        && s.is_final()
        && s.name.ends_with("Builder")
        && model
            .find_matching_methods(ty, "equals", |m| is_custom_equals(m, model))
            .is_empty()
}

/// `List` vs `Set`: both inherit `Collection.equals`, yet never compare equal.
fn are_incompatible_collections(
    left: &Type,
    right: &Type,
    common: &[Type],
    model: &SemanticModel,
) -> bool {
    let Some(collection) = model.resolve_class(COLLECTION) else {
        return false;
    };
    let is_collection = |t: &Type| model.erasure(t).class_sym() == Some(collection);
    common.len() == 1 && is_collection(&common[0]) && !is_collection(left) && !is_collection(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(model: &SemanticModel, name: &str) -> Type {
        model
            .resolve_class(name)
            .map(Type::class)
            .unwrap_or(Type::Error)
    }

    #[test]
    fn unrelated_final_classes_are_incompatible() {
        let model = SemanticModel::with_jdk_stubs();
        let tc = TypeCompatibility::default();
        let report = tc.compatibility_of_types(
            &class(&model, "java.lang.String"),
            &class(&model, "java.lang.Integer"),
            &model,
        );
        assert!(!report.is_compatible());
        assert_eq!(report.lhs, Some(class(&model, "java.lang.String")));
    }

    #[test]
    fn list_and_set_are_incompatible_but_collection_is_not() {
        let model = SemanticModel::with_jdk_stubs();
        let tc = TypeCompatibility::default();
        let list = class(&model, "java.util.List");
        let set = class(&model, "java.util.Set");
        let collection = class(&model, COLLECTION);
        assert!(!tc.compatibility_of_types(&list, &set, &model).is_compatible());
        assert!(tc.compatibility_of_types(&list, &collection, &model).is_compatible());
    }

    #[test]
    fn unresolved_and_null_are_compatible() {
        let model = SemanticModel::with_jdk_stubs();
        let tc = TypeCompatibility::default();
        let string = class(&model, "java.lang.String");
        assert!(tc.compatibility_of_types(&string, &Type::Error, &model).is_compatible());
        assert!(tc.compatibility_of_types(&Type::Null, &string, &model).is_compatible());
    }

    #[test]
    fn boxed_and_primitive_are_compatible() {
        let model = SemanticModel::with_jdk_stubs();
        let tc = TypeCompatibility::default();
        let integer = class(&model, "java.lang.Integer");
        let int = Type::Primitive(PrimitiveKind::Int);
        assert!(tc.compatibility_of_types(&integer, &int, &model).is_compatible());
    }
}
