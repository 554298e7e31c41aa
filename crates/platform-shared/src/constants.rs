//! Application-wide constants

pub const NAMESPACE_PREFIX: &str = "tenant-";
pub const NAMESPACE_SEPARATOR: char = '-';

pub const LABEL_CREATED_BY: &str = "created-by";
pub const LABEL_CREATED_BY_VALUE: &str = "platform-api";
pub const LABEL_TYPE: &str = "type";
pub const LABEL_TYPE_VALUE: &str = "tenant";
pub const LABEL_TENANT_ID: &str = "tenant-id";

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_GRANULARITY: &str = "DAILY";
pub const DEFAULT_GROUP_BY: &str = "SERVICE";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const CPU_USAGE_PLACEHOLDER: &str = "0m";
pub const MEMORY_USAGE_PLACEHOLDER: &str = "0Mi";
