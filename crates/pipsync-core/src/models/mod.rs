pub mod error;
pub mod intent;
pub mod options;
pub mod package;

pub use error::{CapturedOutput, CoreError, CoreErrorKind, InstallerResult};
pub use intent::{DefaultProvider, PackageAction, PackageIntent};
pub use options::Options;
pub use package::{InstallerAction, VersionInfo, VersionTable};
