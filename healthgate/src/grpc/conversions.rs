//! ドメイン型とgRPCメッセージ型の相互変換

use chrono::{DateTime, SecondsFormat, Utc};
use healthgate_common::error::{CommonError, GateError};
use healthgate_common::types::{
    HealthReport, PaginatedResult, PaginationParams, SortDirection, SortField, SortOrder, User,
    UserPatch, DEFAULT_PAGE_SIZE,
};
use tonic::Status;
use tracing::error;
use uuid::Uuid;

use super::proto;

/// Parse a UUID from a request field.
pub fn parse_uuid(s: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(s.trim()).map_err(|e| Status::invalid_argument(format!("Invalid UUID: {e}")))
}

/// サービスエラーをgRPCステータスに変換
///
/// クライアント起因のエラーは内容をそのまま返す。
/// ストア・内部エラーは詳細をログに残し、汎用メッセージのみ返す。
pub fn gate_error_to_status(err: &GateError) -> Status {
    match err {
        GateError::Common(CommonError::Config(_)) => {
            error!(error = %err, "Configuration error while handling gRPC request");
            Status::internal(err.external_message())
        }
        GateError::Common(_) => Status::invalid_argument(err.to_string()),
        GateError::NotFound(_) => Status::not_found(err.to_string()),
        GateError::ConstraintViolation(_) => Status::already_exists(err.to_string()),
        GateError::StoreUnavailable(_) => {
            error!(error = %err, "Store unavailable while handling gRPC request");
            Status::unavailable(err.external_message())
        }
        GateError::Database(_) => {
            error!(error = %err, "Internal error while handling gRPC request");
            Status::internal(err.external_message())
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl From<User> for proto::User {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            created_at: format_timestamp(&user.created_at),
            updated_at: format_timestamp(&user.updated_at),
            full_name: user.full_name,
            email: user.email,
        }
    }
}

impl From<&HealthReport> for proto::HealthCheckResponse {
    fn from(report: &HealthReport) -> Self {
        Self {
            status: report.overall().as_str().to_string(),
            services: report
                .probes()
                .iter()
                .map(|(key, result)| (key.clone(), result.status().as_str().to_string()))
                .collect(),
        }
    }
}

impl From<PaginatedResult<User>> for proto::ListUsersResponse {
    fn from(page: PaginatedResult<User>) -> Self {
        Self {
            data: page.data.into_iter().map(proto::User::from).collect(),
            total: page.total,
            skip: page.skip,
            take: page.take,
        }
    }
}

/// 部分更新要求をドメインのパッチに変換
pub fn update_request_to_patch(req: &proto::UpdateUserRequest) -> UserPatch {
    UserPatch {
        full_name: req.full_name.clone(),
        email: req.email.clone(),
    }
}

/// 一覧要求をページネーション指定に変換
///
/// `take`が0の場合はデフォルト件数。未知のソート列・方向は`invalid_argument`。
pub fn list_request_to_params(req: &proto::ListUsersRequest) -> Result<PaginationParams, Status> {
    let take = if req.take == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        req.take
    };

    let order_by = req
        .order_by
        .iter()
        .map(|order| -> Result<SortOrder, CommonError> {
            let field: SortField = order.field.parse()?;
            let direction = if order.direction.trim().is_empty() {
                SortDirection::Asc
            } else {
                order.direction.parse()?
            };
            Ok(SortOrder { field, direction })
        })
        .collect::<Result<Vec<_>, CommonError>>()
        .map_err(|e| Status::invalid_argument(e.to_string()))?;

    Ok(PaginationParams {
        skip: req.skip,
        take,
        order_by,
    })
}
