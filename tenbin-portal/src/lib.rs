//! Captive portal protocol layer
//!
//! Transport-independent pieces of the provisioning portal: HTTP request
//! parsing, form decoding, routing and response encoding, plus a wildcard
//! DNS responder. Whoever owns the sockets feeds raw bytes in and writes
//! the produced bytes back out.
//!
//! # Endpoints
//!
//! ```text
//! GET  /                      setup page
//! GET  /config?ssid=&password=  submit credentials (POST form body also accepted)
//! GET  /scan                  [{"ssid":..,"rssi":..,"secure":..}]
//! GET  /generate_204          302 -> portal      (Android)
//! GET  /hotspot-detect.html   setup page         (Apple)
//! GET  /connecttest.txt       "Microsoft Connect Test"
//! GET  /success.txt           "success"          (Firefox)
//! *                           302 -> portal
//! ```
//!
//! Every DNS A query is answered with the access point address.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod dns;
mod json;
pub mod page;
pub mod portal;
pub mod query;
pub mod request;
pub mod response;
pub mod routes;

pub use dns::{DnsError, DNS_TTL_SECS};
pub use portal::{CaptivePortal, ConfigRejection, Exchange, Outcome, SCAN_LIMIT};
pub use query::QueryError;
pub use request::{Method, Request, RequestError, MAX_HEAD_LEN};
pub use response::{Response, Status, LOCATION_LEN};
pub use routes::Route;
