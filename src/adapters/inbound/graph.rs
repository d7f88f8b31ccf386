//! GraphQL API served on `/query`.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, ID, InputObject, Object, Schema, SimpleObject,
    Value,
};
use axum::extract::State;
use axum::response::Html;

use super::http::Json;
use crate::AppState;
use crate::application::dto::{AuthView, LoginInput, RegisterInput, UpdateUserInput, UserView};
use crate::application::error::IdentityError;
use crate::application::ports::inbound::UserUsecase;
use crate::domain::user::UserId;

pub type IdentitySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around a usecase.
pub fn schema(usecase: Arc<dyn UserUsecase>) -> IdentitySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(usecase)
        .finish()
}

/// `POST /query`.
pub async fn handler(
    State(state): State<AppState>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request).await)
}

/// `GET /`, interactive playground.
pub async fn playground() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/query").finish())
}

#[derive(SimpleObject)]
#[graphql(name = "User")]
pub struct GraphUser {
    id: ID,
    name: String,
    email: String,
    created_at: String,
    updated_at: String,
}

impl From<UserView> for GraphUser {
    fn from(user: UserView) -> Self {
        Self {
            id: ID::from(user.id.to_string()),
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    token: String,
    user: GraphUser,
}

impl From<AuthView> for AuthPayload {
    fn from(auth: AuthView) -> Self {
        Self {
            token: auth.token,
            user: auth.user.into(),
        }
    }
}

#[derive(InputObject)]
#[graphql(name = "RegisterInput")]
pub struct RegisterArgs {
    name: String,
    email: String,
    password: String,
}

#[derive(InputObject)]
#[graphql(name = "LoginInput")]
pub struct LoginArgs {
    email: String,
    password: String,
}

#[derive(InputObject)]
#[graphql(name = "UpdateUserInput")]
pub struct UpdateArgs {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

fn usecase<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<dyn UserUsecase>> {
    ctx.data::<Arc<dyn UserUsecase>>()
}

fn parse_id(id: &ID) -> async_graphql::Result<UserId> {
    id.parse::<UserId>().map_err(|err| {
        async_graphql::Error::new(err.to_string())
            .extend_with(|_, e| e.set("code", "BAD_USER_INPUT"))
    })
}

/// Map usecase failures to GraphQL errors with `extensions.code`.
fn graph_error(err: IdentityError) -> async_graphql::Error {
    let code = err.kind();

    match err {
        IdentityError::Validation(ref errors) => {
            let mut fields = errors
                .field_errors()
                .keys()
                .map(|field| field.to_string())
                .collect::<Vec<_>>();
            fields.sort();

            async_graphql::Error::new(err.to_string()).extend_with(|_, e| {
                e.set("code", code);
                e.set("fields", Value::List(fields.into_iter().map(Value::String).collect()));
            })
        },
        IdentityError::Storage(_) | IdentityError::Hashing(_) | IdentityError::Token(_) => {
            tracing::error!(error = ?err, "graphql resolver failed");
            async_graphql::Error::new("internal server error")
                .extend_with(|_, e| e.set("code", code))
        },
        _ => async_graphql::Error::new(err.to_string()).extend_with(|_, e| e.set("code", code)),
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get a user by identifier.
    async fn user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<GraphUser> {
        let id = parse_id(&id)?;

        usecase(ctx)?
            .get_user(id)
            .await
            .map(GraphUser::from)
            .map_err(graph_error)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register(
        &self,
        ctx: &Context<'_>,
        input: RegisterArgs,
    ) -> async_graphql::Result<AuthPayload> {
        let input = RegisterInput {
            name: input.name,
            email: input.email,
            password: input.password,
        };

        usecase(ctx)?
            .register(input)
            .await
            .map(AuthPayload::from)
            .map_err(graph_error)
    }

    async fn login(&self, ctx: &Context<'_>, input: LoginArgs) -> async_graphql::Result<AuthPayload> {
        let input = LoginInput {
            email: input.email,
            password: input.password,
        };

        usecase(ctx)?
            .login(input)
            .await
            .map(AuthPayload::from)
            .map_err(graph_error)
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateArgs,
    ) -> async_graphql::Result<GraphUser> {
        let id = parse_id(&id)?;
        let input = UpdateUserInput {
            name: input.name,
            email: input.email,
            password: input.password,
        };

        usecase(ctx)?
            .update_user(id, input)
            .await
            .map(GraphUser::from)
            .map_err(graph_error)
    }

    /// Returns `true` once the user is removed.
    async fn delete_user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        let id = parse_id(&id)?;

        usecase(ctx)?
            .delete_user(id)
            .await
            .map(|_| true)
            .map_err(graph_error)
    }
}
