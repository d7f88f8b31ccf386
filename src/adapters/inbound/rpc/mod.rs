//! gRPC API, `identity.UserService`.
pub mod proto;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/identity.UserService.rs"));
}

use std::sync::Arc;

use tonic::{Request, Response, Status};

pub use generated::user_service_server::UserServiceServer;

use crate::application::dto::{AuthView, LoginInput, RegisterInput, UpdateUserInput, UserView};
use crate::application::error::IdentityError;
use crate::application::ports::inbound::UserUsecase;
use crate::domain::user::UserId;

/// tonic service delegating to a [`UserUsecase`].
#[derive(Clone)]
pub struct RpcUserService {
    usecase: Arc<dyn UserUsecase>,
}

impl RpcUserService {
    pub fn new(usecase: Arc<dyn UserUsecase>) -> Self {
        Self { usecase }
    }

    /// Wrap into the generated tonic server.
    pub fn into_server(self) -> UserServiceServer<Self> {
        UserServiceServer::new(self)
    }
}

impl From<UserView> for proto::User {
    fn from(user: UserView) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<AuthView> for proto::AuthReply {
    fn from(auth: AuthView) -> Self {
        Self {
            token: auth.token,
            user: Some(auth.user.into()),
        }
    }
}

fn user_id(id: i64) -> Result<UserId, Status> {
    UserId::try_from(id).map_err(|err| Status::invalid_argument(err.to_string()))
}

/// Map usecase failures to gRPC status codes.
fn status(err: IdentityError) -> Status {
    match err {
        IdentityError::Validation(ref errors) => {
            let mut fields = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect::<Vec<_>>();
            fields.sort();
            Status::invalid_argument(format!("{err}: {}", fields.join(", ")))
        },
        IdentityError::DuplicateEmail => Status::already_exists(err.to_string()),
        IdentityError::InvalidCredentials => Status::unauthenticated(err.to_string()),
        IdentityError::NotFound => Status::not_found(err.to_string()),
        IdentityError::Storage(_) | IdentityError::Hashing(_) | IdentityError::Token(_) => {
            tracing::error!(error = ?err, "rpc call failed");
            Status::internal("internal server error")
        },
    }
}

#[tonic::async_trait]
impl generated::user_service_server::UserService for RpcUserService {
    async fn register(
        &self,
        request: Request<proto::RegisterRequest>,
    ) -> Result<Response<proto::AuthReply>, Status> {
        let request = request.into_inner();
        let input = RegisterInput {
            name: request.name,
            email: request.email,
            password: request.password,
        };

        let auth = self.usecase.register(input).await.map_err(status)?;
        Ok(Response::new(auth.into()))
    }

    async fn login(
        &self,
        request: Request<proto::LoginRequest>,
    ) -> Result<Response<proto::AuthReply>, Status> {
        let request = request.into_inner();
        let input = LoginInput {
            email: request.email,
            password: request.password,
        };

        let auth = self.usecase.login(input).await.map_err(status)?;
        Ok(Response::new(auth.into()))
    }

    async fn get_user(
        &self,
        request: Request<proto::UserIdRequest>,
    ) -> Result<Response<proto::User>, Status> {
        let id = user_id(request.into_inner().id)?;

        let user = self.usecase.get_user(id).await.map_err(status)?;
        Ok(Response::new(user.into()))
    }

    async fn update_user(
        &self,
        request: Request<proto::UpdateUserRequest>,
    ) -> Result<Response<proto::User>, Status> {
        let request = request.into_inner();
        let id = user_id(request.id)?;
        let input = UpdateUserInput {
            name: request.name,
            email: request.email,
            password: request.password,
        };

        let user = self.usecase.update_user(id, input).await.map_err(status)?;
        Ok(Response::new(user.into()))
    }

    async fn delete_user(
        &self,
        request: Request<proto::UserIdRequest>,
    ) -> Result<Response<proto::DeleteUserReply>, Status> {
        let id = user_id(request.into_inner().id)?;

        self.usecase.delete_user(id).await.map_err(status)?;
        Ok(Response::new(proto::DeleteUserReply { success: true }))
    }
}
