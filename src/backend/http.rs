use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::backend::{
    records_from, BackendError, BookingBackend, PackageRequest, RatingRequest, RideRequest, Session,
};

pub struct HttpBookingBackend {
    client: Client,
    base_url: String,
}

impl HttpBookingBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn authorized(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        match &session.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_list(&self, path: &str, session: &Session) -> Result<Vec<Value>, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching booking list");

        let response = self
            .authorized(self.client.get(&url), session)
            .send()
            .await?;
        let body: Value = ensure_success(response)?.json().await?;
        records_from(body)
    }

    async fn post<T: Serialize + Sync>(
        &self,
        path: &str,
        session: &Session,
        payload: &T,
    ) -> Result<(), BackendError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "posting to booking service");

        let response = self
            .authorized(self.client.post(&url), session)
            .json(payload)
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }
}

fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::HttpStatus(status.as_u16()))
    }
}

#[async_trait]
impl BookingBackend for HttpBookingBackend {
    async fn list_rides(&self, session: &Session) -> Result<Vec<Value>, BackendError> {
        self.fetch_list(&format!("/rides/customer/{}", session.customer_id), session)
            .await
    }

    async fn list_package_rides(&self, session: &Session) -> Result<Vec<Value>, BackendError> {
        self.fetch_list(
            &format!("/package-rides/customer/{}", session.customer_id),
            session,
        )
        .await
    }

    async fn book_ride(
        &self,
        session: &Session,
        request: &RideRequest,
    ) -> Result<(), BackendError> {
        self.post("/rides", session, request).await
    }

    async fn book_package(
        &self,
        session: &Session,
        request: &PackageRequest,
    ) -> Result<(), BackendError> {
        self.post("/package-rides", session, request).await
    }

    async fn rate_booking(
        &self,
        session: &Session,
        booking_id: &str,
        rating: &RatingRequest,
    ) -> Result<(), BackendError> {
        self.post(&format!("/rides/{booking_id}/rating"), session, rating)
            .await
    }
}
