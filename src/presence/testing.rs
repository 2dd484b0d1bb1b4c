//! Recording fake of the presence client

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::payload::PresencePayload;
use super::traits::{ClientError, PresenceConnection, PresenceConnector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Update(PresencePayload),
    Close,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    calls: Arc<Mutex<Vec<Call>>>,
    connect_error: Option<ClientError>,
    update_error: Option<ClientError>,
    close_error: Option<ClientError>,
}

impl FakeConnector {
    pub fn fail_connect(mut self, error: ClientError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn fail_update(mut self, error: ClientError) -> Self {
        self.update_error = Some(error);
        self
    }

    pub fn fail_close(mut self, error: ClientError) -> Self {
        self.close_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn payloads(&self) -> Vec<PresencePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Update(payload) => Some(payload),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PresenceConnector for FakeConnector {
    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn connect(&self, client_id: &str) -> Result<Box<dyn PresenceConnection>, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Connect(client_id.to_string()));

        if let Some(error) = &self.connect_error {
            return Err(error.clone());
        }

        Ok(Box::new(FakeConnection {
            calls: Arc::clone(&self.calls),
            update_error: self.update_error.clone(),
            close_error: self.close_error.clone(),
        }))
    }
}

struct FakeConnection {
    calls: Arc<Mutex<Vec<Call>>>,
    update_error: Option<ClientError>,
    close_error: Option<ClientError>,
}

#[async_trait]
impl PresenceConnection for FakeConnection {
    async fn update(&mut self, payload: &PresencePayload) -> Result<(), ClientError> {
        if let Some(error) = &self.update_error {
            return Err(error.clone());
        }
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(payload.clone()));
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(Call::Close);
        match self.close_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
