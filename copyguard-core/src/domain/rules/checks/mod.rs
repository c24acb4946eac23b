// Chaque règle est indépendante : (règles compilées, contenu, faits) -> violations.

pub mod dimensions;
pub mod markup;
pub mod numeric;
pub mod phrases;
pub mod placeholder;
pub mod structure;
