//! Method implementations and warp route wiring for the eight RPC endpoints.

use std::sync::Arc;

use broker_core::{BrokerError, Registry, SessionData, SessionId};
use bytes::Bytes;
use tracing::{debug, warn};
use warp::http::{HeaderMap, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::rejection::reject;
use crate::types::{
    EndSessionResponse, JoinSessionRequest, JoinSessionResponse, SendDataResponse,
    SessionCreatedResponse, VariableFlagResponse, VariableQuery, VariableSizeResponse,
};

/// Thin wrapper around the registry, mirroring the shape of a dispatchable
/// method table: one async method per spec §4.5 handler.
#[derive(Clone)]
pub struct BrokerService {
    registry: Arc<Registry>,
}

impl BrokerService {
    pub fn new(registry: Arc<Registry>) -> Self {
        BrokerService { registry }
    }

    pub async fn create_session(
        &self,
        data: SessionData,
    ) -> Result<SessionCreatedResponse, BrokerError> {
        let session_id = self.registry.create(data)?;
        debug!(client_id = %session_id.client_id, "session created");
        Ok(SessionCreatedResponse {
            status: 1,
            session_id,
        })
    }

    pub async fn join_session(
        &self,
        req: JoinSessionRequest,
    ) -> Result<JoinSessionResponse, BrokerError> {
        let status = self.registry.join(&req.session_id, req.invitee_id)?;
        Ok(JoinSessionResponse {
            status,
            session_id: req.session_id,
        })
    }

    pub async fn get_session_status(&self, id: SessionId) -> Result<i32, BrokerError> {
        self.registry.status(&id)
    }

    pub async fn send_data(
        &self,
        id: SessionId,
        var_id: i64,
        payload: Vec<f64>,
    ) -> Result<SendDataResponse, BrokerError> {
        self.registry.send_data(&id, var_id, payload)?;
        Ok(SendDataResponse {
            status: "ok".to_string(),
        })
    }

    pub async fn receive_data(&self, id: SessionId, var_id: i64) -> Result<Vec<f64>, BrokerError> {
        self.registry.receive_data(&id, var_id)
    }

    pub async fn get_variable_flag(
        &self,
        id: SessionId,
        var_id: i64,
    ) -> Result<VariableFlagResponse, BrokerError> {
        let flag_status = self.registry.peek_flag(&id, var_id)?;
        Ok(VariableFlagResponse { var_id, flag_status })
    }

    pub async fn get_variable_size(
        &self,
        id: SessionId,
        var_id: i64,
    ) -> Result<VariableSizeResponse, BrokerError> {
        let size = self.registry.peek_size(&id, var_id)?;
        Ok(VariableSizeResponse { var_id, size })
    }

    pub async fn end_session(
        &self,
        id: SessionId,
        participant_id: i64,
    ) -> Result<EndSessionResponse, BrokerError> {
        let status = self.registry.end_session(&id, participant_id)?;
        Ok(EndSessionResponse {
            status,
            session_id: id,
        })
    }
}

fn with_service(
    service: BrokerService,
) -> impl Filter<Extract = (BrokerService,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn header_i64(headers: &HeaderMap, name: &str) -> Result<i64, BrokerError> {
    let raw = headers
        .get(name)
        .ok_or_else(|| BrokerError::InvalidInput(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| BrokerError::InvalidInput(format!("malformed {name} header")))?;
    raw.parse::<i64>()
        .map_err(|_| BrokerError::InvalidInput(format!("malformed {name} header")))
}

fn header_session_id(headers: &HeaderMap, name: &str) -> Result<SessionId, BrokerError> {
    let raw = headers
        .get(name)
        .ok_or_else(|| BrokerError::InvalidInput(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| BrokerError::InvalidInput(format!("malformed {name} header")))?;
    SessionId::from_header_value(raw)
}

fn octet_stream_reply(bytes: Vec<u8>) -> Response {
    warp::http::Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/octet-stream")
        .body(bytes.into())
        .expect("static response headers are always valid")
}

/// Composes all eight endpoints into a single filter tree. Every branch's
/// success value is converted to `warp::reply::Response` so the `.or()`
/// chain unifies onto one concrete extract type.
pub fn routes(
    service: BrokerService,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let create_session = warp::path("create_session")
        .and(warp::post())
        .and(with_service(service.clone()))
        .and(warp::body::json())
        .and_then(|service: BrokerService, data: SessionData| async move {
            service
                .create_session(data)
                .await
                .map(|resp| warp::reply::json(&resp).into_response())
                .map_err(reject)
        });

    let get_session_status = warp::path("get_session_status")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and(warp::body::json())
        .and_then(|service: BrokerService, id: SessionId| async move {
            service
                .get_session_status(id)
                .await
                .map(|status| warp::reply::json(&status).into_response())
                .map_err(reject)
        });

    let join_session = warp::path("join_session")
        .and(warp::post())
        .and(with_service(service.clone()))
        .and(warp::body::json())
        .and_then(|service: BrokerService, req: JoinSessionRequest| async move {
            service
                .join_session(req)
                .await
                .map(|resp| warp::reply::json(&resp).into_response())
                .map_err(reject)
        });

    let send_data = warp::path("send_data")
        .and(warp::post())
        .and(with_service(service.clone()))
        .and(warp::header::headers_cloned())
        .and(warp::body::bytes())
        .and_then(
            |service: BrokerService, headers: HeaderMap, body: Bytes| async move {
                let parsed: Result<(SessionId, i64, Vec<f64>), BrokerError> = (|| {
                    let id = header_session_id(&headers, "Session-ID")?;
                    let var_id = header_i64(&headers, "Var-ID")?;
                    let values = broker_core::codec::decode(&body)?;
                    Ok((id, var_id, values))
                })();
                match parsed {
                    Ok((id, var_id, values)) => service
                        .send_data(id, var_id, values)
                        .await
                        .map(|resp| warp::reply::json(&resp).into_response())
                        .map_err(reject),
                    Err(err) => {
                        warn!(%err, "send_data request rejected before dispatch");
                        Err(reject(err))
                    }
                }
            },
        );

    let get_variable_flag = warp::path("get_variable_flag")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and(warp::query::<VariableQuery>())
        .and_then(|service: BrokerService, query: VariableQuery| async move {
            match SessionId::from_header_value(&query.session_id) {
                Ok(id) => service
                    .get_variable_flag(id, query.var_id)
                    .await
                    .map(|resp| warp::reply::json(&resp).into_response())
                    .map_err(reject),
                Err(err) => Err(reject(err)),
            }
        });

    let get_variable_size = warp::path("get_variable_size")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and(warp::query::<VariableQuery>())
        .and_then(|service: BrokerService, query: VariableQuery| async move {
            match SessionId::from_header_value(&query.session_id) {
                Ok(id) => service
                    .get_variable_size(id, query.var_id)
                    .await
                    .map(|resp| warp::reply::json(&resp).into_response())
                    .map_err(reject),
                Err(err) => Err(reject(err)),
            }
        });

    let receive_data = warp::path("receive_data")
        .and(warp::get())
        .and(with_service(service.clone()))
        .and(warp::query::<VariableQuery>())
        .and_then(|service: BrokerService, query: VariableQuery| async move {
            let id = match SessionId::from_header_value(&query.session_id) {
                Ok(id) => id,
                Err(err) => return Err(reject(err)),
            };
            service
                .receive_data(id, query.var_id)
                .await
                .map(|values| octet_stream_reply(broker_core::codec::encode(&values)))
                .map_err(reject)
        });

    let end_session = warp::path("end_session")
        .and(warp::post())
        .and(with_service(service.clone()))
        .and(warp::header::<i64>("Participant-ID"))
        .and(warp::body::json())
        .and_then(
            |service: BrokerService, participant_id: i64, id: SessionId| async move {
                service
                    .end_session(id, participant_id)
                    .await
                    .map(|resp| warp::reply::json(&resp).into_response())
                    .map_err(reject)
            },
        );

    create_session
        .or(get_session_status)
        .unify()
        .or(join_session)
        .unify()
        .or(send_data)
        .unify()
        .or(get_variable_flag)
        .unify()
        .or(get_variable_size)
        .unify()
        .or(receive_data)
        .unify()
        .or(end_session)
        .unify()
}
