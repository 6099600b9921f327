//! gRPC bindings for services Vouch talks to.

pub mod identity {
    tonic::include_proto!("identity");
}
