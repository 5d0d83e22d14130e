pub mod config;
pub mod inject;
pub mod interpreter;
pub mod parser;
pub mod types;
pub mod xml;

pub use config::{ConfigError, ConfigProblem, GeneratorConfig};
pub use inject::{
    Ambiguity, AmbiguityStage, Choice, GroupPick, InjectError, InjectionResolver, Insertion,
    Picks, Resolution,
};
pub use interpreter::{
    RenderContext, RenderError, RenderOptions, RenderOutput, RenderWarning, RenderedFragment,
    RenderedLine, Renderer, TokenSet, compute_suggestions,
};
pub use types::{SectionPosition, TokenDefinition, TokenMap, TokenValue, XmlTargetSection};
pub use xml::{DocumentError, XmlDocument, XmlQuery};

/// Creates a [`TokenMap`] from name-value pairs.
///
/// A plain string sets both forms; a `(raw, clean)` pair sets them apart.
///
/// # Example
///
/// ```
/// use xfrag::tokens;
///
/// let t = tokens! { "entity" => "Order", "label" => (" Due Date ", "DueDate") };
/// assert_eq!(t.clean("entity"), Some("Order"));
/// assert_eq!(t.raw("label"), Some(" Due Date "));
/// ```
#[macro_export]
macro_rules! tokens {
    {} => {
        $crate::TokenMap::new()
    };
    { $($name:expr => $value:expr),+ $(,)? } => {
        {
            let mut map = $crate::TokenMap::new();
            $(
                map.insert($name, ::std::convert::Into::<$crate::TokenValue>::into($value));
            )+
            map
        }
    };
}
