pub mod align;
pub mod contrast;
pub mod design;
pub mod gibbs;
pub mod paired;
pub mod sampler;
pub mod stat;

pub use align::check_aligned;
pub use contrast::{contrast, Contrast, ContrastSummary};
pub use design::Design;
pub use gibbs::GibbsSampler;
pub use paired::{paired_contrast, PairedContrast};
pub use sampler::{Posterior, Priors, Sampler};
