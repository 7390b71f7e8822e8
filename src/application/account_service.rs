use crate::auth::JwtKeys;
use crate::domain::account::{check_password, NewUser, ProfileUpdate, Registration, Role, User};
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;

/// A signed-in user and the bearer token issued for them.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct AccountService<R> {
    repo: R,
    keys: JwtKeys,
    bcrypt_cost: u32,
}

fn bcrypt_failure(e: bcrypt::BcryptError) -> DomainError {
    DomainError::Internal(format!("password hashing failed: {e}"))
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: R, keys: JwtKeys, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            keys,
            bcrypt_cost,
        }
    }

    fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(bcrypt_failure)
    }

    pub fn register(&self, registration: Registration) -> Result<User, DomainError> {
        let registration = registration.validate()?;
        let user = self.repo.create(NewUser {
            password_hash: self.hash(&registration.password)?,
            email: registration.email,
            name: registration.name,
            address: registration.address,
            role: Role::Customer,
        })?;
        log::info!("User {} registered as {}", user.id, user.email);
        Ok(user)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let email = email.trim().to_lowercase();
        let credentials = self
            .repo
            .credentials_by_email(&email)?
            .ok_or(DomainError::InvalidCredentials)?;
        if !bcrypt::verify(password, &credentials.password_hash).map_err(bcrypt_failure)? {
            log::warn!("Failed login for {}", email);
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.keys.issue(&credentials.user)?;
        Ok(Session {
            token,
            user: credentials.user,
        })
    }

    pub fn profile(&self, user_id: i32) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    pub fn update_profile(&self, user_id: i32, update: ProfileUpdate) -> Result<User, DomainError> {
        self.repo.update_profile(user_id, update.validate()?)
    }

    pub fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        check_password(new_password)?;
        let credentials = self
            .repo
            .credentials_by_id(user_id)?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        if !bcrypt::verify(current_password, &credentials.password_hash).map_err(bcrypt_failure)? {
            return Err(DomainError::InvalidInput(
                "current password is incorrect".into(),
            ));
        }

        self.repo
            .update_password_hash(user_id, &self.hash(new_password)?)?;
        log::info!("User {} changed their password", user_id);
        Ok(())
    }

    pub fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.repo.list()
    }

    pub fn delete_user(&self, user_id: i32) -> Result<(), DomainError> {
        self.repo.delete(user_id)?;
        log::info!("User {} deleted", user_id);
        Ok(())
    }

    pub fn set_role(&self, user_id: i32, role: Role) -> Result<User, DomainError> {
        let user = self.repo.update_role(user_id, role)?;
        log::info!("User {} is now {}", user_id, role);
        Ok(user)
    }

    /// Makes sure an admin account exists for `email`, creating it or
    /// promoting an existing account. An existing password is left alone.
    pub fn ensure_admin(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let email = email.trim().to_lowercase();
        match self.repo.credentials_by_email(&email)? {
            Some(credentials) if credentials.user.role == Role::Admin => Ok(credentials.user),
            Some(credentials) => {
                log::info!("Promoting {} to admin", email);
                self.repo.update_role(credentials.user.id, Role::Admin)
            }
            None => {
                check_password(password)?;
                let user = self.repo.create(NewUser {
                    password_hash: self.hash(password)?,
                    name: "Administrator".into(),
                    email,
                    address: None,
                    role: Role::Admin,
                })?;
                log::info!("Admin account {} created", user.email);
                Ok(user)
            }
        }
    }
}
