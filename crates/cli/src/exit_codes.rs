//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, unknown sheet name)       |
//! | 3    | Bill config failed to parse or validate              |
//! | 4    | Required sheet missing or not tabular for its layout |
//! | 5    | Sheet payload missing a renderer-required field      |
//! | 6    | Rows skipped and `--strict` was given                |
//! | 7    | File read/write failure                              |

use billgrid_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config parse or validation failure (premium out of range, overlapping columns).
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Work Order / Bill Quantity sheet absent, or narrower than its column map.
pub const EXIT_INPUT_SHAPE: u8 = 4;

/// A sheet payload lacks a field its renderer template reads.
pub const EXIT_MISSING_FIELD: u8 = 5;

/// Malformed rows were skipped under `--strict`. Output is still written.
pub const EXIT_ROW_WARNINGS: u8 = 6;

/// Cannot read an input or write an output.
pub const EXIT_IO: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::MissingSheet { .. } | ReconError::SheetShape { .. } => EXIT_INPUT_SHAPE,
        ReconError::MissingField { .. } => EXIT_MISSING_FIELD,
        ReconError::Io(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_INVALID_CONFIG,
            EXIT_INPUT_SHAPE,
            EXIT_MISSING_FIELD,
            EXIT_ROW_WARNINGS,
            EXIT_IO,
        ];
        let unique: std::collections::HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn engine_errors_map() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
        assert_eq!(
            recon_exit_code(&ReconError::MissingSheet { sheet: "Work Order".into() }),
            EXIT_INPUT_SHAPE
        );
        assert_eq!(
            recon_exit_code(&ReconError::MissingField { sheet: "Last Page".into(), field: "amount_words".into() }),
            EXIT_MISSING_FIELD
        );
        assert_eq!(recon_exit_code(&ReconError::Io("gone".into())), EXIT_IO);
    }
}
