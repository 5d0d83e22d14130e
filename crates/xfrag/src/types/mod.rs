mod section;
mod token;

pub use section::{SectionPosition, XmlTargetSection};
pub use token::{TokenDefinition, TokenMap, TokenValue};
