/// `git describe` output captured by `build.rs`, or `dev`.
pub const GIT_VERSION: &str = env!("GIT_VERSION");
