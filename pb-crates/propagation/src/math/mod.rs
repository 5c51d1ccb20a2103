mod coefficient;
mod width;

pub use coefficient::Coefficient;
pub use coefficient::Degree;
pub use width::WeightedWidth;
