//! Configuration and constants for the readers and the CLI.

/// Current output report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

// IBM J9 cycle start timestamps, e.g. "Thu Aug 30 14:23:10 2007".
// Some platforms drop the weekday, hence the secondary format.
pub const PRIMARY_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";
pub const SECONDARY_DATE_FORMAT: &str = "%b %d %H:%M:%S %Y";

// Element names for IBM J9 verbose GC parsing (older JVMs write "af")
pub const AF_ELEMENT_NAMES: &[&str] = &["af", "allocation-failure"];

/// The only allocation failure type the J9 reader fully understands
pub const EXPECTED_AF_TYPE: &str = "tenured";

/// GC type that marks a J9 record as a full collection
pub const GLOBAL_GC_TYPE: &str = "global";

// Tenured visit counter values: 1 = before snapshot, 3 = after snapshot.
// The middle snapshot (2) is skipped on purpose.
pub const TENURED_BEFORE_VISIT: u8 = 1;
pub const TENURED_AFTER_VISIT: u8 = 3;

pub const BYTES_PER_KB: i64 = 1024;
pub const MS_PER_SECOND: f64 = 1000.0;
