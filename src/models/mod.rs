pub mod basket;
pub mod recommendation;
pub mod rule;
pub mod run;
pub mod sale;
pub mod settings;

pub use basket::*;
pub use recommendation::*;
pub use rule::*;
pub use run::*;
pub use sale::*;
pub use settings::*;
