//! Property search and listing creation.

use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::{NewProperty, Property, PropertyListing};
use crate::search::{self, PropertyFilter};
use crate::sql::query;

const INSERT: &str = "INSERT INTO properties (\
     owner_id, title, description, thumbnail_photo_url, cover_photo_url, \
     cost_per_night, street, city, province, post_code, country, \
     parking_spaces, number_of_bathrooms, number_of_bedrooms) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
     RETURNING *";

/// Properties matching `filter`, cheapest first, at most `limit` rows.
pub async fn get_all_properties(
    conn: &impl GenericClient,
    filter: &PropertyFilter,
    limit: i64,
) -> DbResult<Vec<PropertyListing>> {
    search::build(filter, limit).fetch_all_as(conn).await
}

/// Insert a property and return the stored row.
pub async fn add_property(
    conn: &impl GenericClient,
    property: &NewProperty,
) -> DbResult<Property> {
    query(INSERT)
        .bind(property.owner_id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(&property.thumbnail_photo_url)
        .bind(&property.cover_photo_url)
        .bind(property.cost_per_night)
        .bind(&property.street)
        .bind(&property.city)
        .bind(&property.province)
        .bind(&property.post_code)
        .bind(&property.country)
        .bind(property.parking_spaces)
        .bind(property.number_of_bathrooms)
        .bind(property.number_of_bedrooms)
        .fetch_one_as(conn)
        .await
}
