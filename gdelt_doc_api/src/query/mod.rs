mod common;
pub use self::common::{BoolOp, FilterValue, SortBy};

mod constraints;
pub use self::constraints::{Combined, Near, Repeat};

mod filters;
pub use self::filters::{
    parse_date, validate_timespan, validate_tone, Filters, MAX_RECORDS, VALID_TIMESPAN_UNITS,
};

mod mode;
pub use self::mode::QueryMode;
