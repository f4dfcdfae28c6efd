use std::sync::Arc;

use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
};

use crate::core::{
    executor::{BatchMode, Executor},
    normalize::normalize,
};

use super::protocol::{ClientRequest, ClientResponse, ResponseData};

/// Where responses for one inbound message go: the context that sent it.
pub type ReplyPort = mpsc::UnboundedSender<ClientResponse>;

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub data: serde_json::Value,
    pub reply: ReplyPort,
}

impl InboundMessage {
    pub fn new(data: serde_json::Value, reply: ReplyPort) -> Self {
        Self { data, reply }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Active,
    TornDown,
}

struct Subscription {
    executor: Arc<dyn Executor>,
    alive: watch::Sender<bool>,
    in_flight: JoinSet<()>,
}

impl Subscription {
    fn new(executor: Arc<dyn Executor>) -> Self {
        let (alive, _) = watch::channel(true);
        Self {
            executor,
            alive,
            in_flight: JoinSet::new(),
        }
    }

    fn close(mut self) {
        let _ = self.alive.send(false);
        self.in_flight.abort_all();
    }
}

/// Routes bridge requests from the embedded document to an executor.
///
/// Every accepted request runs on its own task; `dispatch` never waits for a
/// result, so responses are posted in completion order.
pub struct Dispatcher {
    state: BridgeState,
    subscription: Option<Subscription>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: BridgeState::Uninitialized,
            subscription: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Binds `executor`. A previous subscription is torn down first and its
    /// outstanding requests never answer.
    pub fn activate(&mut self, executor: Arc<dyn Executor>) {
        if let Some(old) = self.subscription.take() {
            tracing::info!(in_flight = old.in_flight.len(), "replacing bridge executor");
            old.close();
        }
        self.subscription = Some(Subscription::new(executor));
        self.state = BridgeState::Active;
        tracing::debug!("bridge active");
    }

    /// Stops processing. Responses for requests still in flight are dropped.
    pub fn teardown(&mut self) {
        if let Some(sub) = self.subscription.take() {
            tracing::debug!(dropped = sub.in_flight.len(), "bridge torn down");
            sub.close();
        }
        self.state = BridgeState::TornDown;
    }

    /// Number of requests of the current subscription not yet answered.
    pub fn in_flight(&self) -> usize {
        self.subscription.as_ref().map_or(0, |s| s.in_flight.len())
    }

    /// Waits for every request of the current subscription to be answered.
    pub async fn drain(&mut self) {
        if let Some(sub) = self.subscription.as_mut() {
            while let Some(res) = sub.in_flight.join_next().await {
                if let Err(e) = res {
                    if e.is_panic() {
                        tracing::error!(error = %e, "request task panicked");
                    }
                }
            }
        }
    }

    /// Handles one inbound message. Returns whether it was accepted as a
    /// bridge request.
    pub fn dispatch(&mut self, msg: InboundMessage) -> bool {
        let state = self.state;
        let Some(sub) = self.subscription.as_mut() else {
            tracing::trace!(state = ?state, "bridge not active; ignoring message");
            return false;
        };
        let Some(req) = ClientRequest::parse(&msg.data) else {
            tracing::trace!("ignoring non-bridge message");
            return false;
        };

        // Reap finished tasks so the set does not grow with the session.
        while sub.in_flight.try_join_next().is_some() {}

        tracing::debug!(id = %req.id(), kind = ?req.kind(), "dispatching request");
        let executor = Arc::clone(&sub.executor);
        let alive = sub.alive.subscribe();
        sub.in_flight.spawn(serve(executor, req, msg.reply, alive));
        true
    }
}

async fn serve(
    executor: Arc<dyn Executor>,
    req: ClientRequest,
    reply: ReplyPort,
    mut alive: watch::Receiver<bool>,
) {
    let kind = req.kind();
    let response = tokio::select! {
        resp = execute(executor.as_ref(), req) => resp,
        _ = alive.wait_for(|live| !*live) => return,
    };

    if !*alive.borrow() {
        tracing::debug!(id = %response.id, "subscription closed; dropping response");
        return;
    }
    if response.is_error() {
        tracing::debug!(id = %response.id, kind = ?kind, "request failed");
    }
    if reply.send(response).is_err() {
        tracing::debug!("reply port closed; response dropped");
    }
}

async fn execute(executor: &dyn Executor, req: ClientRequest) -> ClientResponse {
    let kind = req.kind();
    match req {
        ClientRequest::Query { id, statement } => match executor.execute_one(&statement).await {
            Ok(raw) => ClientResponse::ok(kind, id, ResponseData::Single(normalize(&raw))),
            Err(e) => ClientResponse::err(kind, id, e.to_string()),
        },
        ClientRequest::Transaction { id, statements } => {
            match executor.execute_batch(&statements, BatchMode::Write).await {
                Ok(raws) => {
                    let results = raws.iter().map(normalize).collect();
                    ClientResponse::ok(kind, id, ResponseData::Batch(results))
                }
                Err(e) => ClientResponse::err(kind, id, e.to_string()),
            }
        }
    }
}
