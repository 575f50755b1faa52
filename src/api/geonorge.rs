//! [Kartverket address API](https://ws.geonorge.no/adresser/v1/) client.

use serde::Deserialize;

use crate::{
    api::{Client, HttpConfig, LocationResolver, UpstreamError},
    core::coordinates::Coordinates,
    prelude::*,
};

const SEARCH_URL: &str = "https://ws.geonorge.no/adresser/v1/sok";

pub struct Api(Client);

impl Api {
    pub fn new(config: &HttpConfig) -> Self {
        Self(Client::new(config))
    }
}

impl LocationResolver for Api {
    /// Find the best match for a Norwegian address.
    ///
    /// The address is flexible: `"Streetname Number, Postal Code, City"`,
    /// `"Streetname Number, City"`, or just `"Streetname Number"`.
    #[instrument(skip_all, fields(address = address))]
    fn resolve(&self, address: &str) -> Result<Coordinates, UpstreamError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(UpstreamError::EmptyAddress);
        }
        info!("resolving…");
        let response = self
            .0
            .get(SEARCH_URL)
            .query("sok", address)
            .query("treffPerSide", "1")
            .query("asciiKompatibel", "true")
            .query("utkoordsys", "4326")
            .call()?
            .body_mut()
            .read_json::<SearchResponse>()?;
        let coordinates = response.best_match(address)?;
        info!(%coordinates, "resolved");
        Ok(coordinates)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(rename = "adresser", default)]
    addresses: Vec<Address>,
}

impl SearchResponse {
    fn best_match(self, address: &str) -> Result<Coordinates, UpstreamError> {
        let best_match = self
            .addresses
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::NoMatches { address: address.to_owned() })?;
        best_match
            .point
            .and_then(|point| Some(Coordinates::new(point.lat?, point.lon?)))
            .filter(|coordinates| coordinates.latitude.is_finite() && coordinates.longitude.is_finite())
            .ok_or_else(|| UpstreamError::MissingCoordinates { address: address.to_owned() })
    }
}

#[derive(Deserialize)]
struct Address {
    #[serde(rename = "representasjonspunkt")]
    point: Option<Point>,
}

#[derive(Deserialize)]
struct Point {
    lat: Option<f64>,
    lon: Option<f64>,
}
