pub mod model;

pub use model::FactorModel;
