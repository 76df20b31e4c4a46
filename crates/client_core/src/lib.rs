//! Client-side orchestration for the EduCloud dashboard: configuration,
//! session resolution, the task endpoint client, and the view controller.

pub mod config;
pub mod controller;
pub mod services;
pub mod session;
pub mod task_client;

pub use config::{load_config, AppConfig, ConfigError};
pub use controller::{
    BackendCommand, DashboardController, DashboardState, PendingSlot, Screen, ScreenKind, Tool,
    UiAction, UiError, UiErrorCategory, UiErrorContext, UiEvent,
};
pub use services::Services;
pub use session::{
    CognitoIdentityProvider, IdentityProvider, Session, SessionResolver, SessionStatus,
    StaticIdentityProvider,
};
pub use task_client::{TaskClient, TaskSubmitter};
