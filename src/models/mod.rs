pub mod conference;
pub mod contribution;
pub mod material;
pub mod principal;
pub mod review;
pub mod subcontribution;

pub use conference::*;
pub use contribution::*;
pub use material::*;
pub use principal::*;
pub use review::*;
pub use subcontribution::*;
