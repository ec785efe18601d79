//! Domain model (ids, session, tasks, forms, list state, errors).
//!
//! ネットワークにも保存先にも依存しない純粋な型だけを置く。

pub mod errors;
pub mod forms;
pub mod ids;
pub mod session;
pub mod state;
pub mod task;

pub use self::errors::{
    ApiError, AuthError, AuthOp, ClientError, ErrorKind, StorageError, TaskApiError, TaskOp,
    TokenError, ValidationError, ValidationErrors,
};
pub use self::forms::{Credentials, LoginForm, MIN_PASSWORD_LEN, RegistrationForm, TaskForm};
pub use self::ids::{TaskId, UserId};
pub use self::session::{BearerToken, Session};
pub use self::state::{TaskListPhase, TaskListSnapshot};
pub use self::task::{NewTask, StatusCounts, Task, TaskPatch, TaskStatus};
