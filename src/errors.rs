use std::fmt;

#[derive(Debug, Clone)]
pub enum MsgstatsError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    InvalidDateRange(String),
    OrgNotFound(String),
    NotFound(String),
    Validation(String),
    Serialization(String),
    FileOperation(String),
    DateParse(String),
}

impl MsgstatsError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            MsgstatsError::DatabaseConfig(_) => "E001",
            MsgstatsError::DatabaseConnection(_) => "E002",
            MsgstatsError::DatabaseOperation(_) => "E003",
            MsgstatsError::InvalidDateRange(_) => "E004",
            MsgstatsError::OrgNotFound(_) => "E005",
            MsgstatsError::NotFound(_) => "E006",
            MsgstatsError::Validation(_) => "E007",
            MsgstatsError::Serialization(_) => "E008",
            MsgstatsError::FileOperation(_) => "E009",
            MsgstatsError::DateParse(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            MsgstatsError::DatabaseConfig(_) => "Database Configuration Error",
            MsgstatsError::DatabaseConnection(_) => "Database Connection Error",
            MsgstatsError::DatabaseOperation(_) => "Database Operation Error",
            MsgstatsError::InvalidDateRange(_) => "Invalid Date Range",
            MsgstatsError::OrgNotFound(_) => "Organization Not Found",
            MsgstatsError::NotFound(_) => "Resource Not Found",
            MsgstatsError::Validation(_) => "Validation Error",
            MsgstatsError::Serialization(_) => "Serialization Error",
            MsgstatsError::FileOperation(_) => "File Operation Error",
            MsgstatsError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            MsgstatsError::DatabaseConfig(msg)
            | MsgstatsError::DatabaseConnection(msg)
            | MsgstatsError::DatabaseOperation(msg)
            | MsgstatsError::InvalidDateRange(msg)
            | MsgstatsError::OrgNotFound(msg)
            | MsgstatsError::NotFound(msg)
            | MsgstatsError::Validation(msg)
            | MsgstatsError::Serialization(msg)
            | MsgstatsError::FileOperation(msg)
            | MsgstatsError::DateParse(msg) => msg,
        }
    }

    /// 配置类错误：在任何计数查询之前发现，运行直接中止
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MsgstatsError::DatabaseConfig(_)
                | MsgstatsError::InvalidDateRange(_)
                | MsgstatsError::OrgNotFound(_)
                | MsgstatsError::Validation(_)
                | MsgstatsError::DateParse(_)
        )
    }

    /// 格式化为彩色输出
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for MsgstatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for MsgstatsError {}

// 便捷的构造函数
impl MsgstatsError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::DatabaseOperation(msg.into())
    }

    pub fn invalid_date_range<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::InvalidDateRange(msg.into())
    }

    pub fn org_not_found<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::OrgNotFound(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::NotFound(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::Validation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::FileOperation(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        MsgstatsError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for MsgstatsError {
    fn from(err: sea_orm::DbErr) -> Self {
        MsgstatsError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for MsgstatsError {
    fn from(err: std::io::Error) -> Self {
        MsgstatsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for MsgstatsError {
    fn from(err: serde_json::Error) -> Self {
        MsgstatsError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for MsgstatsError {
    fn from(err: chrono::ParseError) -> Self {
        MsgstatsError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MsgstatsError>;
