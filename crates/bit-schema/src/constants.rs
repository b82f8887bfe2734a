//! Well-known file names and the defaults applied to missing manifest fields.

/// File name of the manifest inside a component (or consumer) directory.
pub const BIT_JSON: &str = "bit.json";

pub const DEFAULT_BIT_NAME: &str = "unnamed";
pub const DEFAULT_BOX_NAME: &str = "global";
pub const DEFAULT_BIT_VERSION: &str = "1";

/// Basename of the implementation source file.
pub const IMPL_FILE_NAME: &str = "impl.js";
/// Basename of the component's test source file.
pub const SPEC_FILE_NAME: &str = "spec.js";

/// Environment id meaning "no compiler/tester"; always considered installed.
pub const DEFAULT_COMPILER: &str = "none";
pub const DEFAULT_TESTER: &str = "none";
