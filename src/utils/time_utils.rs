use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// 导出文件名使用的时间戳格式
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 报告中显示的日期时间格式
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 今天的日期（ISO格式 `YYYY-MM-DD`）
#[inline]
pub fn today_iso() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// 导出文件名时间戳，例如 `20261019_142501`
#[inline]
pub fn file_stamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format(FILE_STAMP_FORMAT).to_string()
}

/// 校验服务日期字符串是否为ISO日期
pub fn parse_service_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
