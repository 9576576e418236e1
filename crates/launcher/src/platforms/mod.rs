//! Platform variants and their sandbox backends.

pub mod sandbox;
pub mod short_video;
pub mod social_graph;

pub use short_video::ShortVideoLauncher;
pub use social_graph::SocialGraphLauncher;
