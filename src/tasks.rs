pub mod avl;
pub mod color;
pub mod dataset;
pub mod fit;
pub mod plot;
pub mod ubench;
