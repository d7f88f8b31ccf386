//! Protobuf messages of the `identity.UserService` service.
//!
//! Mirrors `proto/identity.proto`. Tags and wire types are checked against
//! that file in tests.

use std::fmt;

#[derive(Clone, PartialEq, prost::Message)]
#[prost(skip_debug)]
pub struct RegisterRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
#[prost(skip_debug)]
pub struct LoginRequest {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserIdRequest {
    #[prost(int64, tag = "1")]
    pub id: i64,
}

/// Absent fields are left unchanged.
#[derive(Clone, PartialEq, prost::Message)]
#[prost(skip_debug)]
pub struct UpdateUserRequest {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub email: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub password: Option<String>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(string, tag = "4")]
    pub created_at: String,
    #[prost(string, tag = "5")]
    pub updated_at: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthReply {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(message, optional, tag = "2")]
    pub user: Option<User>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteUserReply {
    #[prost(bool, tag = "1")]
    pub success: bool,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for UpdateUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateUserRequest")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
