//! Administrator login and logout controls.

use super::ViewContext;
use crate::errors::AppError;

/// The login modal and logout button.
pub struct AdminControls {
    ctx: ViewContext,
}

impl AdminControls {
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    /// Sign in. Returns whether the account is the administrator.
    ///
    /// Only failures are announced; the page reacts to the session state.
    pub async fn login(&self, email: &str, password: &str) -> Result<bool, AppError> {
        match self.ctx.session.sign_in(email.trim(), password).await {
            Ok(is_admin) => Ok(is_admin),
            Err(e) => {
                self.ctx.failure("login_fail", &e);
                Err(e)
            }
        }
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        match self.ctx.session.logout().await {
            Ok(()) => {
                self.ctx.success("logout_success");
                Ok(())
            }
            Err(e) => {
                self.ctx.failure("logout_fail", &e);
                Err(e)
            }
        }
    }
}
