mod certificate;
mod chain;
mod policy;
mod thumbprint;

pub use certificate::*;
pub use chain::*;
pub use policy::*;
pub use thumbprint::*;
