//! External collaborators of the imagepin update pipeline.
//!
//! Each collaborator is a narrow trait with one shell-out implementation:
//!
//! | trait | implementation | tool |
//! |---|---|---|
//! | [`ImageBuilder`] | [`MakeImageBuilder`] | `make <target>` |
//! | [`RegistryClient`] | [`CraneRegistry`] | `crane config` |
//! | [`VersionControl`] | [`GitCli`] | `git rev-parse` |
//!
//! All of them run through [`CommandExecutor`], so tests swap in mocks.

pub mod builder;
pub mod error;
pub mod executor;
pub mod registry;
pub mod vcs;

pub use builder::{BuildError, ImageBuilder, MakeImageBuilder};
pub use error::ExecError;
pub use executor::{CommandExecutor, CommandSpec, RealExecutor};
pub use registry::{CraneRegistry, RegistryClient, RegistryError};
pub use vcs::{GitCli, VcsError, VersionControl};
