pub mod artifact;
pub mod build_info;
pub mod status;

pub use artifact::{Artifact, ArtifactId, ArtifactKind, Side};
pub use build_info::JarBuildInfo;
pub use status::{Producer, Status};
