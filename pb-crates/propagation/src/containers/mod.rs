mod keyed_vec;
mod literal_set;

pub(crate) use keyed_vec::KeyedVec;
pub use keyed_vec::DenseKey;
pub use literal_set::LiteralSet;
pub use literal_set::LiteralSetPool;
