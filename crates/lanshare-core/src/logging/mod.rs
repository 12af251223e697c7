//! 日志模块
//!
//! 库内部统一使用 `log` 门面输出日志，二进制程序负责安装订阅器。
//! 这里提供命令行可选的日志级别，以及对应的默认过滤指令。

use std::fmt;

/// 日志级别
///
/// 实现了 `PartialOrd` 以便比较详细程度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    #[default]
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// 获取显示名称
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    /// 未设置 `RUST_LOG` 时使用的过滤指令
    ///
    /// hyper 的连接级日志最多放开到 warn。
    pub fn filter_directive(&self) -> String {
        let level = self.name().to_lowercase();
        let hyper = (*self).min(LogLevel::Warn).name().to_lowercase();
        format!("{level},hyper={hyper}")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "TRACE" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
