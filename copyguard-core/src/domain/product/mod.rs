pub mod extractor;
pub mod facts;
pub mod record;

pub use extractor::{ExtractorConfig, FactExtractor};
pub use facts::{Dimensions, LengthProfile, LengthUnit, ProductFacts, Warranty};
pub use record::RawRecord;
