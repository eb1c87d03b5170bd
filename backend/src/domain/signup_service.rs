//! Sign-up domain service.
//!
//! Implements the driving port for the first step of authentication:
//! fetch or create the account for a (username, email) pair, derive its
//! confirmation code, and mail the code to the requester. The code is
//! derived, never stored, so repeating the request re-sends the same
//! code until the account state changes.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::confirmation::CodeSigner;
use crate::domain::error::Error;
use crate::domain::ports::{
    MailMessage, MailSink, SignupUseCase, UserRepository, UserRepositoryError,
};
use crate::domain::user::{EmailAddress, User, Username};

/// Subject line used for confirmation mail.
const MAIL_SUBJECT: &str = "Your confirmation code";

/// Sign-up service implementing [`SignupUseCase`].
#[derive(Clone)]
pub struct SignupService<R, M> {
    users: Arc<R>,
    mail: Arc<M>,
    signer: Arc<CodeSigner>,
    sender: String,
}

impl<R, M> SignupService<R, M> {
    /// Create a new service. `sender` is the from-address stamped on
    /// outbound confirmation mail.
    pub fn new(users: Arc<R>, mail: Arc<M>, signer: Arc<CodeSigner>, sender: String) -> Self {
        Self {
            users,
            mail,
            signer,
            sender,
        }
    }
}

impl<R, M> SignupService<R, M>
where
    R: UserRepository,
    M: MailSink,
{
    fn map_user_error(error: UserRepositoryError) -> Error {
        match error {
            UserRepositoryError::UsernameTaken => {
                Error::conflict("username already registered with a different email")
            }
            UserRepositoryError::EmailTaken => {
                Error::conflict("email already registered with a different username")
            }
            UserRepositoryError::Backend { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
        }
    }

    fn confirmation_mail(&self, user: &User) -> MailMessage {
        let code = self.signer.code_for(user);
        MailMessage {
            subject: MAIL_SUBJECT.to_owned(),
            body: format!(
                "Hello {username},\n\nYour confirmation code is: {code}\n",
                username = user.username(),
                code = code,
            ),
            from: self.sender.clone(),
            recipients: vec![user.email().to_string()],
        }
    }

    /// Undo account creation when confirmation mail cannot be delivered,
    /// so a retry starts from a clean slate.
    async fn roll_back_created(&self, user: &User) {
        if let Err(error) = self.users.delete(user.id()).await {
            tracing::error!(
                user_id = %user.id(),
                %error,
                "failed to roll back account after mail failure"
            );
        }
    }
}

#[async_trait]
impl<R, M> SignupUseCase for SignupService<R, M>
where
    R: UserRepository,
    M: MailSink,
{
    async fn sign_up(&self, username: Username, email: EmailAddress) -> Result<User, Error> {
        let (user, created) = self
            .users
            .get_or_create(&username, &email)
            .await
            .map_err(Self::map_user_error)?;

        let message = self.confirmation_mail(&user);
        if let Err(error) = self.mail.send(&message).await {
            if created {
                self.roll_back_created(&user).await;
            }
            tracing::error!(user_id = %user.id(), %error, "confirmation mail dispatch failed");
            return Err(Error::service_unavailable(
                "confirmation mail could not be sent; please retry sign-up",
            ));
        }

        tracing::info!(user_id = %user.id(), created, "confirmation code dispatched");
        Ok(user)
    }
}
