//! CLI Exit Code Registry
//!
//! Single source of truth for `payrecon` exit codes. Scripts rely on them,
//! so codes are never renumbered.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, bad extension, bad settings)  |
//! | 3    | An input file could not be loaded                    |
//! | 4    | Column names collide after normalization            |
//! | 5    | A required key column is missing                     |
//! | 6    | Chart or workbook rendering failed                   |
//! | 7    | Artifacts could not be published                     |

use payrecon_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, disallowed file extension, invalid settings.
pub const EXIT_USAGE: u8 = 2;

/// Input file unreadable or not parseable as a table.
pub const EXIT_LOAD: u8 = 3;

/// Two columns normalize (or suffix) to the same name.
pub const EXIT_SCHEMA: u8 = 4;

/// The mode's key column is absent from one of the tables.
pub const EXIT_MISSING_COLUMN: u8 = 5;

/// Chart rasterization or workbook serialization failed.
pub const EXIT_RENDER: u8 = 6;

/// Writing into the result directory failed.
pub const EXIT_IO: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Load { .. } => EXIT_LOAD,
        ReconError::Schema { .. } => EXIT_SCHEMA,
        ReconError::MissingColumn { .. } => EXIT_MISSING_COLUMN,
        ReconError::Render(_) => EXIT_RENDER,
        ReconError::Io(_) => EXIT_IO,
    }
}
