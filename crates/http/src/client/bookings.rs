//! Booking methods

use carelink_core::{AppointmentSlot, Booking, BookingAck, BookingConfirmation};
use tracing::info;

use super::request::RequestOptions;
use super::{CareClient, ClientError};

impl CareClient {
    /// Confirm a booking, creating it when the backend has no pending one
    pub async fn confirm_booking(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<BookingAck, ClientError> {
        let url = self.endpoint(&["api", "bookings", "confirm"])?;
        let options = RequestOptions::put(url).json(confirmation)?;
        let ack: BookingAck = Self::parse(self.authorized(options).await?).await?;
        info!(
            provider_id = %confirmation.provider_id,
            booking_id = ack.booking_id.as_deref().unwrap_or("-"),
            "booking confirmed"
        );
        Ok(ack)
    }

    pub async fn user_bookings(&self, user_id: &str) -> Result<Vec<Booking>, ClientError> {
        let url = self.endpoint(&["api", "bookings", "user", user_id])?;
        Self::parse(self.authorized(RequestOptions::get(url)).await?).await
    }

    pub async fn all_bookings(&self) -> Result<Vec<Booking>, ClientError> {
        let url = self.endpoint(&["api", "bookings", ""])?;
        Self::parse(self.authorized(RequestOptions::get(url)).await?).await
    }

    pub async fn cancel_booking(&self, booking_id: &str) -> Result<BookingAck, ClientError> {
        let url = self.endpoint(&["api", "bookings", "cancel", booking_id])?;
        let ack = Self::parse(self.authorized(RequestOptions::delete(url)).await?).await?;
        info!(booking_id, "booking cancelled");
        Ok(ack)
    }

    /// Move a booking to `slot`
    pub async fn reschedule_booking(
        &self,
        booking_id: &str,
        slot: &AppointmentSlot,
    ) -> Result<BookingAck, ClientError> {
        let mut url = self.endpoint(&["api", "bookings", "reschedule", booking_id])?;
        url.query_pairs_mut().append_pair("new_time", &slot.to_wire());
        let ack = Self::parse(self.authorized(RequestOptions::put(url)).await?).await?;
        info!(booking_id, new_time = %slot, "booking rescheduled");
        Ok(ack)
    }
}
