//! Errors - エラー型と分類
//!
//! # 分類
//! - **ApiError**: HTTP 境界で一度だけ decode される構造化エラー（status + message）
//! - **ValidationError**: 送信前のフォーム検証（ネットワーク呼び出しなし）
//! - **AuthError** / **TaskApiError**: 利用者向けメッセージに変換済みのゲートウェイエラー
//! - **TokenError**: token の decode 失敗（MalformedToken）
//!
//! 呼び出し側は `ClientError` だけを見ればよい。

use thiserror::Error;

/// HTTP 境界で decode したエラー
///
/// - `status_code`: レスポンスが無い（接続失敗など）なら `None`
/// - `message`: レスポンス body の `message` フィールド（あれば）
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", describe_api_error(.status_code, .message))]
pub struct ApiError {
    pub status_code: Option<u16>,
    pub message: Option<String>,
}

impl ApiError {
    pub fn status(status_code: u16, message: Option<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message,
        }
    }

    /// レスポンスを受け取れなかった
    pub fn transport() -> Self {
        Self::default()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }

    /// 空文字の message はフォールバック扱い
    pub fn message_or(&self, fallback: &str) -> String {
        match self.message.as_deref() {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => fallback.to_string(),
        }
    }
}

fn describe_api_error(status_code: &Option<u16>, message: &Option<String>) -> String {
    match (status_code, message.as_deref()) {
        (Some(code), Some(message)) => format!("status {code}: {message}"),
        (Some(code), None) => format!("status {code}"),
        (None, Some(message)) => format!("no response: {message}"),
        (None, None) => "no response".to_string(),
    }
}


/// MalformedToken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token: expected 3 dot-separated segments, found {0}")]
    Segments(usize),

    #[error("malformed token: payload is not base64 ({0})")]
    Base64(String),

    #[error("malformed token: payload is missing userId/email ({0})")]
    Payload(String),
}

/// フォーム検証エラー（1 フィールド 1 件）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid email address")]
    InvalidEmail,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("title is required")]
    EmptyTitle,
}

impl ValidationError {
    /// エラーが付くフォームフィールド名
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidEmail => "email",
            ValidationError::PasswordTooShort { .. } => "password",
            ValidationError::PasswordMismatch => "confirm_password",
            ValidationError::EmptyTitle => "title",
        }
    }
}

/// フォーム全体の検証結果
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// 空なら Ok
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    messages.join("; ")
}

/// 認証系の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    Login,
    Register,
}

impl AuthOp {
    pub fn fallback_message(self) -> &'static str {
        match self {
            AuthOp::Login => "failed to sign in",
            AuthOp::Register => "failed to register",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AuthError {
    pub op: AuthOp,
    pub status_code: Option<u16>,
    pub message: String,
}

impl AuthError {
    pub fn from_api(op: AuthOp, err: &ApiError) -> Self {
        Self {
            op,
            status_code: err.status_code,
            message: err.message_or(op.fallback_message()),
        }
    }
}

/// Task API の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOp {
    List,
    Create,
    Update,
    Delete,
}

impl TaskOp {
    pub fn fallback_message(self) -> &'static str {
        match self {
            TaskOp::List => "failed to load tasks",
            TaskOp::Create => "failed to create task",
            TaskOp::Update => "failed to update task",
            TaskOp::Delete => "failed to delete task",
        }
    }
}

/// 401 もそれ以外も同じ形に畳み込む（status は参考情報として残す）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TaskApiError {
    pub op: TaskOp,
    pub status_code: Option<u16>,
    pub message: String,
}

impl TaskApiError {
    pub fn from_api(op: TaskOp, err: &ApiError) -> Self {
        Self {
            op,
            status_code: err.status_code,
            message: err.message_or(op.fallback_message()),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }
}

/// token 保存先の I/O エラー
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// クライアント全体のエラー
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    TaskApi(#[from] TaskApiError),

    #[error(transparent)]
    MalformedToken(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// バナー表示用の分類
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Auth(_) => ErrorKind::Auth,
            ClientError::TaskApi(_) => ErrorKind::TaskApi,
            ClientError::MalformedToken(_) => ErrorKind::MalformedToken,
            ClientError::Storage(_) => ErrorKind::Storage,
            ClientError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    TaskApi,
    MalformedToken,
    Storage,
    Cancelled,
}
