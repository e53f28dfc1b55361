//! UserService gRPC implementation.

use crate::db::traits::UserRepository;
use crate::grpc::conversions::{
    gate_error_to_status, list_request_to_params, parse_uuid, update_request_to_patch,
};
use crate::grpc::proto;
use crate::grpc::proto::user_service_server::UserService as UserServiceTrait;
use healthgate_common::types::NewUser;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::debug;

/// gRPC User service implementation.
#[derive(Clone)]
pub struct UserServiceImpl {
    users: Arc<dyn UserRepository>,
}

impl UserServiceImpl {
    /// Create a new user service.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}

#[tonic::async_trait]
impl UserServiceTrait for UserServiceImpl {
    async fn get_user(
        &self,
        request: Request<proto::GetUserRequest>,
    ) -> Result<Response<proto::UserLookupResponse>, Status> {
        let id = parse_uuid(&request.get_ref().id)?;
        debug!(user_id = %id, "gRPC get user");

        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::UserLookupResponse {
            user: user.map(proto::User::from),
        }))
    }

    async fn get_user_by_email(
        &self,
        request: Request<proto::GetUserByEmailRequest>,
    ) -> Result<Response<proto::UserLookupResponse>, Status> {
        debug!("gRPC get user by email");

        let user = self
            .users
            .find_by_email(&request.get_ref().email)
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::UserLookupResponse {
            user: user.map(proto::User::from),
        }))
    }

    async fn create_user(
        &self,
        request: Request<proto::CreateUserRequest>,
    ) -> Result<Response<proto::User>, Status> {
        let req = request.into_inner();
        debug!("gRPC create user");

        let user = self
            .users
            .create(NewUser::new(req.full_name, req.email))
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::User::from(user)))
    }

    async fn update_user(
        &self,
        request: Request<proto::UpdateUserRequest>,
    ) -> Result<Response<proto::User>, Status> {
        let req = request.into_inner();
        let id = parse_uuid(&req.id)?;
        debug!(user_id = %id, "gRPC update user");

        let user = self
            .users
            .update(id, update_request_to_patch(&req))
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::User::from(user)))
    }

    async fn delete_user(
        &self,
        request: Request<proto::DeleteUserRequest>,
    ) -> Result<Response<proto::DeleteUserResponse>, Status> {
        let id = parse_uuid(&request.get_ref().id)?;
        debug!(user_id = %id, "gRPC delete user");

        self.users
            .delete(id)
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::DeleteUserResponse {}))
    }

    async fn list_users(
        &self,
        request: Request<proto::ListUsersRequest>,
    ) -> Result<Response<proto::ListUsersResponse>, Status> {
        let params = list_request_to_params(request.get_ref())?;
        debug!(skip = params.skip, take = params.take, "gRPC list users");

        let page = self
            .users
            .find_all(&params)
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::ListUsersResponse::from(page)))
    }

    async fn count_users(
        &self,
        _request: Request<proto::CountUsersRequest>,
    ) -> Result<Response<proto::CountUsersResponse>, Status> {
        debug!("gRPC count users");

        let count = self
            .users
            .count()
            .await
            .map_err(|e| gate_error_to_status(&e))?;

        Ok(Response::new(proto::CountUsersResponse { count }))
    }
}
