//! Forms - 送信前のクライアント側検証
//!
//! 検証に失敗したフォームはネットワークに出ない。
//! 全フィールドを検証してからまとめて返す（最初の 1 件で止めない）。

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::errors::{ValidationError, ValidationErrors};
use super::task::{NewTask, TaskPatch, TaskStatus};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

fn check_email(email: &str, errors: &mut Vec<ValidationError>) {
    if !EMAIL_RE.is_match(email) {
        errors.push(ValidationError::InvalidEmail);
    }
}

fn check_password(password: &str, errors: &mut Vec<ValidationError>) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
}

/// `POST /auth/login` / `POST /auth/register` の body
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// ログインフォーム
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = Vec::new();
        check_email(self.email.trim(), &mut errors);
        check_password(&self.password, &mut errors);
        ValidationErrors(errors).into_result()?;
        Ok(Credentials::new(self.email.trim(), self.password.clone()))
    }
}

/// 登録フォーム（確認用パスワード付き）
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// 確認用パスワードはサーバーに送らない
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut errors = Vec::new();
        check_email(self.email.trim(), &mut errors);
        check_password(&self.password, &mut errors);
        if self.password != self.confirm_password {
            errors.push(ValidationError::PasswordMismatch);
        }
        ValidationErrors(errors).into_result()?;
        Ok(Credentials::new(self.email.trim(), self.password.clone()))
    }
}

/// タスク作成・編集フォーム
///
/// 空の description は作成時は送らず、編集時は空文字（消去）として送る。
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl TaskForm {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(ValidationError::EmptyTitle);
        }
        ValidationErrors(errors).into_result()
    }

    fn description(&self) -> Option<String> {
        let description = self.description.trim();
        (!description.is_empty()).then(|| description.to_string())
    }

    pub fn to_new_task(&self) -> Result<NewTask, ValidationErrors> {
        self.check()?;
        Ok(NewTask {
            title: self.title.trim().to_string(),
            description: self.description(),
            status: Some(self.status),
        })
    }

    /// 編集時はフォームの全項目を送る（空の説明は空文字として送り、消去を表す）
    pub fn to_patch(&self) -> Result<TaskPatch, ValidationErrors> {
        self.check()?;
        Ok(TaskPatch {
            title: Some(self.title.trim().to_string()),
            description: Some(self.description.trim().to_string()),
            status: Some(self.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::simple("a@b.com")]
    #[case::subdomain("first.last@mail.example.org")]
    #[case::plus("me+tag@example.io")]
    fn accepts_valid_emails(#[case] email: &str) {
        assert!(LoginForm::new(email, "secret").validate().is_ok());
    }

    #[rstest]
    #[case::no_at("ab.com")]
    #[case::no_domain_dot("a@b")]
    #[case::spaces("a b@c.com")]
    #[case::empty("")]
    #[case::trailing_dot("a@b.")]
    fn rejects_invalid_emails(#[case] email: &str) {
        let errors = LoginForm::new(email, "secret").validate().unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::InvalidEmail]);
    }

    #[test]
    fn short_password_is_rejected() {
        let errors = LoginForm::new("a@b.com", "12345").validate().unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::PasswordTooShort { min: 6 }]);
    }

    #[test]
    fn login_collects_every_error() {
        let errors = LoginForm::new("nope", "x").validate().unwrap_err();
        assert_eq!(errors.0.len(), 2);
        assert_eq!(errors.0[0].field(), "email");
        assert_eq!(errors.0[1].field(), "password");
    }

    #[test]
    fn registration_requires_matching_passwords() {
        let errors = RegistrationForm::new("a@b.com", "secret", "secreT")
            .validate()
            .unwrap_err();
        assert!(errors.contains(&ValidationError::PasswordMismatch));

        let creds = RegistrationForm::new(" a@b.com ", "secret", "secret")
            .validate()
            .unwrap();
        assert_eq!(creds, Credentials::new("a@b.com", "secret"));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("a@b.com", "hunter22");
        assert!(!format!("{creds:?}").contains("hunter22"));
    }

    #[test]
    fn task_form_requires_title() {
        let form = TaskForm::new("   ");
        let errors = form.to_new_task().unwrap_err();
        assert_eq!(errors.0, vec![ValidationError::EmptyTitle]);
    }

    #[test]
    fn task_form_blank_description_is_omitted_on_create_and_cleared_on_edit() {
        let form = TaskForm {
            title: " Write report ".into(),
            description: "  ".into(),
            status: TaskStatus::InProgress,
        };
        let new_task = form.to_new_task().unwrap();
        assert_eq!(new_task.title, "Write report");
        assert_eq!(new_task.description, None);
        assert_eq!(new_task.status, Some(TaskStatus::InProgress));

        let patch = form.to_patch().unwrap();
        assert_eq!(patch.title.as_deref(), Some("Write report"));
        assert_eq!(patch.description.as_deref(), Some(""));
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            serde_json::json!({
                "title": "Write report",
                "description": "",
                "status": "in-progress"
            })
        );
    }
}
