//! Reservation history.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::Reservation;
use crate::search::DEFAULT_LIMIT;
use crate::sql::query;

const SELECT_PAST_FOR_GUEST: &str = "SELECT reservations.id AS reservation_id, \
     reservations.guest_id, reservations.start_date, reservations.end_date, \
     properties.*, avg(property_reviews.rating) AS average_rating \
     FROM reservations \
     JOIN properties ON reservations.property_id = properties.id \
     JOIN property_reviews ON properties.id = property_reviews.property_id \
     WHERE reservations.guest_id = $1 AND reservations.end_date < now()::date \
     GROUP BY reservations.id, properties.id \
     ORDER BY reservations.start_date \
     LIMIT $2";

/// Completed reservations of `guest_id`, oldest first, at most `limit` rows.
pub async fn get_all_reservations(
    conn: &impl GenericClient,
    guest_id: i32,
    limit: i64,
) -> DbResult<Vec<Reservation>> {
    query(SELECT_PAST_FOR_GUEST)
        .bind(guest_id)
        .bind(limit)
        .fetch_all_as(conn)
        .await
}

/// [`get_all_reservations`] with the default limit of 10.
pub async fn get_all_reservations_default(
    conn: &impl GenericClient,
    guest_id: i32,
) -> DbResult<Vec<Reservation>> {
    get_all_reservations(conn, guest_id, DEFAULT_LIMIT).await
}
