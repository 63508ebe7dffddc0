//! Storage size conversion for database and disk quota questions.

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{DatabaseSizeClass, StorageSize, StorageUnit};

const SMALL_DB_LIMIT_BYTES: f64 = 100.0 * 1_048_576.0;
const LARGE_DB_LIMIT_BYTES: f64 = 10.0 * 1_073_741_824.0;

/// Convert `value` in `unit` to every unit (1024 based).
pub fn convert_storage(value: f64, unit: StorageUnit) -> ToolboxResult<StorageSize> {
    if !value.is_finite() || value < 0.0 {
        return Err(ToolboxError::ValidationError(format!(
            "Size must be a non-negative number (got {value})"
        )));
    }

    let bytes = value * unit.multiplier();
    let class = if bytes < SMALL_DB_LIMIT_BYTES {
        DatabaseSizeClass::Small
    } else if bytes <= LARGE_DB_LIMIT_BYTES {
        DatabaseSizeClass::Medium
    } else {
        DatabaseSizeClass::Large
    };

    Ok(StorageSize {
        bytes,
        kb: bytes / StorageUnit::KB.multiplier(),
        mb: bytes / StorageUnit::MB.multiplier(),
        gb: bytes / StorageUnit::GB.multiplier(),
        tb: bytes / StorageUnit::TB.multiplier(),
        class,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_megabytes() {
        let size = convert_storage(1024.0, StorageUnit::MB).unwrap();
        assert_eq!(size.bytes, 1_073_741_824.0);
        assert_eq!(size.kb, 1_048_576.0);
        assert_eq!(size.gb, 1.0);
        assert_eq!(size.class, DatabaseSizeClass::Medium);
    }

    #[test]
    fn test_size_classes() {
        assert_eq!(
            convert_storage(99.0, StorageUnit::MB).unwrap().class,
            DatabaseSizeClass::Small
        );
        assert_eq!(
            convert_storage(100.0, StorageUnit::MB).unwrap().class,
            DatabaseSizeClass::Medium
        );
        assert_eq!(
            convert_storage(10.0, StorageUnit::GB).unwrap().class,
            DatabaseSizeClass::Medium
        );
        assert_eq!(
            convert_storage(1.0, StorageUnit::TB).unwrap().class,
            DatabaseSizeClass::Large
        );
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        assert!(convert_storage(-1.0, StorageUnit::Bytes).is_err());
        assert!(convert_storage(f64::NAN, StorageUnit::KB).is_err());
        assert!(convert_storage(f64::INFINITY, StorageUnit::KB).is_err());
    }
}
