mod ledger;
mod money;
mod movement;
mod product;

pub use ledger::*;
pub use money::*;
pub use movement::*;
pub use product::*;
