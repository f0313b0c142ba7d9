//! [`Command`] for authorizing an administrator.

use derive_more::{Display, Error, From};
use jsonwebtoken::{Algorithm, Validation};
use tracerr::Traced;

use crate::{
    domain::admin::{Session, Token},
    Service,
};

use super::Command;

/// [`Command`] for authorizing an administrator by the access [`Token`]
/// issued by the auth service.
#[derive(Clone, Debug, From)]
pub struct AuthorizeAdmin {
    /// Access [`Token`] to authorize.
    pub token: Token,
}

impl<Db, St> Command<AuthorizeAdmin> for Service<Db, St> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AuthorizeAdmin) -> Result<Self::Ok, Self::Err> {
        let AuthorizeAdmin { token } = cmd;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &validation,
        )
        .map_err(tracerr::from_and_wrap!(=> ExecutionError))?
        .claims)
    }
}

/// Error of [`AuthorizeAdmin`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}
