//! Maps `BrokerError` into warp rejections and those rejections into the
//! HTTP status codes the spec's error taxonomy mandates.

use broker_core::BrokerError;
use serde::Serialize;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

#[derive(Debug)]
pub struct BrokerRejection(pub BrokerError);

impl warp::reject::Reject for BrokerRejection {}

pub fn reject(err: BrokerError) -> Rejection {
    warp::reject::custom(BrokerRejection(err))
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Recovery filter translating `BrokerRejection` (and warp's own built-in
/// rejections) into a JSON body and status code.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if let Some(BrokerRejection(broker_err)) = err.find() {
        match broker_err {
            BrokerError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            BrokerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            BrokerError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            BrokerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        }
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "no such route".to_string())
    } else if err.find::<warp::reject::MissingHeader>().is_some()
        || err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
    {
        (StatusCode::BAD_REQUEST, "malformed request".to_string())
    } else {
        tracing::error!(?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { error: message }),
        status,
    ))
}
