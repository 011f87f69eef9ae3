//! Cliente que reproduce una cola de turnos preparada y registra las peticiones.
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::model::{ModelClient, ModelError, ModelRequest, ModelTurn};

#[derive(Debug, Default)]
pub struct ScriptedModelClient {
    turns: Mutex<VecDeque<Result<ModelTurn, ModelError>>>,
    requests: Mutex<Vec<ModelRequest>>,
    delay: Option<Duration>,
}

impl ScriptedModelClient {
    pub fn new(turns: impl IntoIterator<Item = Result<ModelTurn, ModelError>>) -> Self {
        Self { turns: Mutex::new(turns.into_iter().collect()),
               requests: Mutex::new(Vec::new()),
               delay: None }
    }

    /// Cada respuesta espera `delay` antes de entregarse.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn remaining(&self) -> usize {
        self.turns.lock().await.len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn get_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelTurn, ModelError> {
        self.requests.lock().await.push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.turns
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Transport("no scripted turn left".into())))
    }
}
