//! Semantic helpers shared by checkers.

pub mod compatibility;
pub mod constant;
pub mod equivalence;
pub mod overrides;
pub mod truthiness;

pub use compatibility::{TypeCompatibility, TypeCompatibilityReport};
pub use constant::{ConstantError, Number, constant_value, evaluate};
pub use equivalence::{same_symbol, same_variable};
pub use overrides::{MethodSignature, OverrideKind, is_override, overridden_methods};
pub use truthiness::{KnownConditions, Truthiness, TruthinessAnalyzer};
