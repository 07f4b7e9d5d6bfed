pub mod classifier_trait;
pub mod factory;
pub mod gbdt;
pub mod logistic;
pub mod tree;

pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, Classifier};
