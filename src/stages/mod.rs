pub mod assign;
pub mod reconcile;

pub use assign::*;
pub use reconcile::*;
