use bcrypt::{hash, verify, DEFAULT_COST};
use sea_orm::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::_entities::{prelude::*, users};

/// `employee` may only read/mutate resources they own; `supervisor` has
/// read access to everything and is the only role allowed for destructive
/// or policy operations (spec section 4.B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Supervisor,
}

impl Role {
    pub fn is_supervisor(self) -> bool {
        matches!(self, Role::Supervisor)
    }
}

impl std::str::FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Role::Employee),
            "supervisor" => Ok(Role::Supervisor),
            other => Err(AppError::validation(format!("unknown role: {other}"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Employee => write!(f, "employee"),
            Role::Supervisor => write!(f, "supervisor"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department: Option<String>,
}

impl TryFrom<users::Model> for User {
    type Error = AppError;

    fn try_from(model: users::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            email: model.email,
            role: model.role.parse()?,
            department: model.department,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl User {
    /// Register a user per spec section 4.B: unique email, work-factor
    /// bcrypt digest, `Conflict` on an existing email.
    pub async fn create(db: &DatabaseConnection, req: CreateUserRequest) -> AppResult<User> {
        if Self::find_by_email(db, &req.email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let digest = hash(&req.password, DEFAULT_COST)?;

        let model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(req.email),
            password_digest: Set(digest),
            role: Set(req.role.to_string()),
            department: Set(req.department),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().naive_utc()),
            updated_at: Set(chrono::Utc::now().naive_utc()),
        };

        let inserted = model.insert(db).await?;
        User::try_from(inserted)
    }

    pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<User>> {
        let model = Users::find().filter(users::Column::Email.eq(email)).one(db).await?;
        model.map(User::try_from).transpose()
    }

    pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<User>> {
        let model = Users::find_by_id(id).one(db).await?;
        model.map(User::try_from).transpose()
    }

    /// Raw row including the password digest, for login verification only.
    pub async fn find_raw_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<users::Model>> {
        Ok(Users::find().filter(users::Column::Email.eq(email)).one(db).await?)
    }

    pub async fn find_raw_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<users::Model>> {
        Ok(Users::find_by_id(id).one(db).await?)
    }

    pub fn verify_password(password: &str, digest: &str) -> AppResult<bool> {
        Ok(verify(password, digest)?)
    }

    pub async fn set_password(db: &DatabaseConnection, id: Uuid, new_password: &str) -> AppResult<()> {
        let model = Users::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        let mut active: users::ActiveModel = model.into();
        active.password_digest = Set(hash(new_password, DEFAULT_COST)?);
        active.updated_at = Set(chrono::Utc::now().naive_utc());
        active.update(db).await?;

        Ok(())
    }

    pub async fn list_employees(db: &DatabaseConnection) -> AppResult<Vec<User>> {
        let models = Users::find()
            .filter(users::Column::Role.eq("employee"))
            .order_by_asc(users::Column::Email)
            .all(db)
            .await?;

        models.into_iter().map(User::try_from).collect()
    }
}
