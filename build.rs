use tonic_build::manual::{Builder, Method, Service};

const PROTO: &str = "crate::adapters::inbound::rpc::proto";

fn method(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("{PROTO}::{input}"))
        .output_type(format!("{PROTO}::{output}"))
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

// Messages are hand-written prost structs checked against `proto/identity.proto`
// in `rpc::proto` tests, so `protoc` is not needed at build time.
fn main() {
    println!("cargo:rerun-if-changed=proto/identity.proto");
    println!("cargo:rerun-if-changed=migrations");

    let service = Service::builder()
        .name("UserService")
        .package("identity")
        .method(method("register", "Register", "RegisterRequest", "AuthReply"))
        .method(method("login", "Login", "LoginRequest", "AuthReply"))
        .method(method("get_user", "GetUser", "UserIdRequest", "User"))
        .method(method("update_user", "UpdateUser", "UpdateUserRequest", "User"))
        .method(method("delete_user", "DeleteUser", "UserIdRequest", "DeleteUserReply"))
        .build();

    Builder::new().build_client(false).compile(&[service]);
}
