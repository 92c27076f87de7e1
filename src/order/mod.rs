mod de;
pub mod model;

pub(crate) use de::id_from_value;
pub use de::normalize_id;
pub use model::*;
